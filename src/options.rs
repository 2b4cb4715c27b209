use crate::symbol_table::symbol_table::DEFAULT_MAX_SCOPE_DEPTH;

/// First address of the global data segment.
pub const DEFAULT_GLOBAL_BASE: u32 = 0x1000_0000;

/// Options affecting one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Interleave `#` comments describing each emitted section.
    pub trace_code: bool,
    pub global_base: u32,
    pub max_scope_depth: usize,
}

impl CompileOptions {
    pub fn with_trace_code(mut self, trace_code: bool) -> Self {
        self.trace_code = trace_code;
        self
    }

    pub fn with_global_base(mut self, global_base: u32) -> Self {
        self.global_base = global_base;
        self
    }

    pub fn with_max_scope_depth(mut self, max_scope_depth: usize) -> Self {
        self.max_scope_depth = max_scope_depth;
        self
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            trace_code: false,
            global_base: DEFAULT_GLOBAL_BASE,
            max_scope_depth: DEFAULT_MAX_SCOPE_DEPTH,
        }
    }
}
