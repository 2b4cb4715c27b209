//! In-memory MIPS assembly listing.
//!
//! Code generation appends typed lines here instead of writing to a sink
//! directly, so the output can be inspected, compared, or written out later.

use std::{
    fmt::{self, Display},
    io::{self, Write},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Assembler directive without its leading dot, e.g. `text` or `space 8`.
    Directive(String),
    Label(String),
    Instruction { opcode: String, operands: String },
    Comment(String),
}

impl Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Directive(directive) => write!(f, ".{}", directive),
            Line::Label(label) => write!(f, "{}:", label),
            Line::Instruction { opcode, operands } if operands.is_empty() => {
                write!(f, "\t{}", opcode)
            }
            Line::Instruction { opcode, operands } => write!(f, "\t{} {}", opcode, operands),
            Line::Comment(comment) => write!(f, "# {}", comment),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    lines: Vec<Line>,
}

impl Assembly {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directive(&mut self, directive: impl Into<String>) {
        self.lines.push(Line::Directive(directive.into()));
    }

    pub fn label(&mut self, label: impl Into<String>) {
        self.lines.push(Line::Label(label.into()));
    }

    pub fn instruction(&mut self, opcode: &str, operands: impl Into<String>) {
        self.lines.push(Line::Instruction {
            opcode: opcode.to_string(),
            operands: operands.into(),
        });
    }

    pub fn comment(&mut self, comment: impl Into<String>) {
        self.lines.push(Line::Comment(comment.into()));
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// `(opcode, operands)` of every instruction, in emission order.
    pub fn instructions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| match line {
            Line::Instruction { opcode, operands } => Some((opcode.as_str(), operands.as_str())),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            Line::Label(label) => Some(label.as_str()),
            _ => None,
        })
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for line in &self.lines {
            writeln!(out, "{}", line)?;
        }
        out.flush()
    }
}

impl Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
