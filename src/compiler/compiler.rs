//! Main code generation module.
//!
//! This module contains the `Compiler` state and the top-level pipeline:
//! global placement, the data segment, then one frame per function.

use log::{debug, info};

use crate::{
    ast::{Declaration, FunctionDecl, NodeType, Program},
    errors::InternalError,
    options::CompileOptions,
    symbol_table::{MemoryLocation, Symbol, SymbolId, SymbolTable},
};

use super::{assembly::Assembly, stmt::gen_compound};

/// Bytes between the frame pointer and the first local: saved `$fp`,
/// `$s0`-`$s7` and `$ra`.
pub const FRAME_HEADER_SIZE: u32 = 40;

const SAVED_REGISTERS: [(&str, u32); 10] = [
    ("$fp", 0),
    ("$s0", 4),
    ("$s1", 8),
    ("$s2", 12),
    ("$s3", 16),
    ("$s4", 20),
    ("$s5", 24),
    ("$s6", 28),
    ("$s7", 32),
    ("$ra", 36),
];

/// State of one code generation run.
///
/// Every run starts from a fresh `Compiler`, so label numbering and memory
/// placement are identical for identical trees.
#[derive(Debug)]
pub struct Compiler<'a> {
    /// Table filled in by the type checker; locations are written back here.
    pub table: &'a mut SymbolTable,
    pub options: CompileOptions,
    pub assembly: Assembly,
    /// Index of the function being generated.
    pub current_function: Option<usize>,
    /// Bytes between `$fp` and `$sp`, counting the frame header.
    stack_depth: u32,
    next_global: u32,
    next_label: u32,
    epilogue: String,
}

impl<'a> Compiler<'a> {
    pub fn new(table: &'a mut SymbolTable, options: CompileOptions) -> Self {
        Compiler {
            table,
            options,
            assembly: Assembly::new(),
            current_function: None,
            stack_depth: 0,
            next_global: options.global_base,
            next_label: 0,
            epilogue: String::new(),
        }
    }

    pub fn emit(&mut self, opcode: &str, operands: impl Into<String>) {
        self.assembly.instruction(opcode, operands);
    }

    pub fn comment(&mut self, comment: impl Into<String>) {
        if self.options.trace_code {
            self.assembly.comment(comment);
        }
    }

    pub fn new_label(&mut self) -> String {
        let label = format!("L{}", self.next_label);
        self.next_label += 1;
        label
    }

    pub fn epilogue_label(&self) -> &str {
        &self.epilogue
    }

    pub fn stack_depth(&self) -> u32 {
        self.stack_depth
    }

    /// Moves `$sp` down by `bytes` and returns the new depth.
    pub fn reserve(&mut self, bytes: u32, name: &str) -> Result<u32, InternalError> {
        let depth = self
            .stack_depth
            .checked_add(bytes)
            .filter(|depth| i32::try_from(*depth).is_ok())
            .ok_or_else(|| InternalError::StorageOverflow {
                name: name.to_string(),
            })?;
        self.emit("addiu", format!("$sp, $sp, -{}", bytes));
        self.stack_depth = depth;
        Ok(depth)
    }

    /// Moves `$sp` up by `bytes` and returns the new depth.
    pub fn release(&mut self, bytes: u32, context: &str) -> Result<u32, InternalError> {
        let depth =
            self.stack_depth
                .checked_sub(bytes)
                .ok_or_else(|| InternalError::StackImbalance {
                    context: context.to_string(),
                    expected: bytes,
                    actual: self.stack_depth,
                })?;
        if bytes > 0 {
            self.emit("addiu", format!("$sp, $sp, {}", bytes));
        }
        self.stack_depth = depth;
        Ok(depth)
    }

    /// Pushes `$v0` onto the stack.
    pub fn push_result(&mut self) -> Result<u32, InternalError> {
        let depth = self.reserve(4, "temporary")?;
        self.emit("sw", "$v0, 0($sp)");
        Ok(depth)
    }

    /// Pops the top of the stack into `register`.
    pub fn pop_into(&mut self, register: &str) -> Result<u32, InternalError> {
        self.emit("lw", format!("{}, 0($sp)", register));
        self.release(4, "temporary")
    }

    /// Nodes reaching code generation must carry a valid type.
    pub fn expect_type(&self, node_type: NodeType, line: u32) -> Result<(), InternalError> {
        match node_type {
            NodeType::NotResolved | NodeType::Error => Err(InternalError::UnresolvedType {
                line,
                found: node_type,
            }),
            _ => Ok(()),
        }
    }

    /// `depth` is what the caller believes the frame depth to be; it must
    /// match the words actually pushed.
    pub fn expect_stack(&self, depth: u32, context: &str) -> Result<(), InternalError> {
        self.expect_depth(depth, self.stack_depth, context)
    }

    pub fn expect_depth(&self, expected: u32, actual: u32, context: &str) -> Result<(), InternalError> {
        if expected != actual {
            return Err(InternalError::StackImbalance {
                context: context.to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Fetches the record `id` points at. Symbols owned by another function
    /// are rejected: their frame offsets mean nothing here.
    pub fn symbol(&self, id: Option<SymbolId>, name: &str, line: u32) -> Result<Symbol, InternalError> {
        let symbol = id
            .and_then(|id| self.table.get(id))
            .ok_or_else(|| InternalError::MissingSymbol {
                name: name.to_string(),
                line,
            })?;

        if let Some(owner) = symbol.owner {
            if self.current_function != Some(owner) {
                return Err(InternalError::StaleSymbol {
                    name: symbol.name.clone(),
                });
            }
        }
        Ok(symbol.clone())
    }

    pub fn place(
        &mut self,
        id: Option<SymbolId>,
        name: &str,
        line: u32,
        location: MemoryLocation,
    ) -> Result<(), InternalError> {
        let symbol = id
            .and_then(|id| self.table.get_mut(id))
            .ok_or_else(|| InternalError::MissingSymbol {
                name: name.to_string(),
                line,
            })?;

        debug!("Compiler: {:?} placed at {:?}", name, location);
        symbol.location = Some(location);
        Ok(())
    }

    fn gen_globals(&mut self, program: &Program) -> Result<(), InternalError> {
        self.assembly
            .directive(format!("data {:#x}", self.options.global_base));

        for declaration in &program.declarations {
            let Declaration::Variable(variable) = declaration else {
                continue;
            };
            self.expect_type(variable.node_type, variable.line)?;

            let overflow = || InternalError::StorageOverflow {
                name: variable.name.clone(),
            };
            let size = variable.size_in_bytes().ok_or_else(overflow)?;
            let address = self.next_global;
            let next = address.checked_add(size).ok_or_else(overflow)?;
            self.place(
                variable.symbol,
                &variable.name,
                variable.line,
                MemoryLocation::Global(address),
            )?;
            self.comment(format!("global {} at {:#x}", variable.name, address));
            self.assembly.directive(format!("space {}", size));
            self.next_global = next;
        }
        Ok(())
    }

    fn gen_function(&mut self, index: usize, function: &FunctionDecl) -> Result<(), InternalError> {
        self.expect_type(function.node_type, function.line)?;
        debug!("Compiler: generating function {:?}", function.name);

        self.current_function = Some(index);
        self.epilogue = format!("_{}_epilogue", function.name);

        let count = function.params.len();
        for (position, param) in function.params.iter().enumerate() {
            self.expect_type(param.node_type, param.line)?;
            let offset = 4 * (count - 1 - position) as i32;
            self.place(param.symbol, &param.name, param.line, MemoryLocation::Frame(offset))?;
        }

        self.assembly.label(function.name.as_str());
        self.comment(format!("prologue of {}", function.name));
        self.stack_depth = 0;
        self.reserve(FRAME_HEADER_SIZE, &function.name)?;
        for (register, offset) in SAVED_REGISTERS {
            self.emit("sw", format!("{}, {}($sp)", register, offset));
        }
        self.emit("addiu", format!("$fp, $sp, {}", FRAME_HEADER_SIZE));

        let depth = gen_compound(self, &function.body, FRAME_HEADER_SIZE)?;
        let context = format!("function {}", function.name);
        self.expect_depth(FRAME_HEADER_SIZE, depth, &context)?;
        self.expect_stack(FRAME_HEADER_SIZE, &context)?;

        let epilogue = self.epilogue.clone();
        self.assembly.label(epilogue);
        self.comment(format!("epilogue of {}", function.name));
        self.emit("addiu", format!("$sp, $fp, -{}", FRAME_HEADER_SIZE));
        for (register, offset) in SAVED_REGISTERS.iter().rev() {
            self.emit("lw", format!("{}, {}($sp)", register, offset));
        }
        self.release(FRAME_HEADER_SIZE, &context)?;
        self.emit("jr", "$ra");

        self.current_function = None;
        Ok(())
    }
}

/// Generates MIPS assembly for a checked program.
///
/// `table` must be the table the program was checked against. Memory
/// locations are (re)assigned on every call.
pub fn compile(
    program: &Program,
    table: &mut SymbolTable,
    options: CompileOptions,
) -> Result<Assembly, InternalError> {
    let mut compiler = Compiler::new(table, options);
    compiler.expect_type(program.node_type, 0)?;

    compiler.gen_globals(program)?;

    compiler.assembly.directive("text");
    compiler.assembly.directive("globl main");
    for (index, function) in program.functions() {
        compiler.gen_function(index, function)?;
    }

    info!(
        "Compiler: generated {} lines of assembly",
        compiler.assembly.len()
    );
    Ok(compiler.assembly)
}
