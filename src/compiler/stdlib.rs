//! Library routines available to every program.
//!
//! `input` and `output` are expanded inline into SPIM system calls rather
//! than called through a frame.

use crate::{ast::Expr, errors::InternalError, symbol_table::Builtin};

use super::{compiler::Compiler, expr::gen_expression};

const SYSCALL_PRINT_INT: i32 = 1;
const SYSCALL_READ_INT: i32 = 5;
const SYSCALL_PRINT_CHAR: i32 = 11;

pub fn gen_builtin(
    compiler: &mut Compiler<'_>,
    builtin: Builtin,
    args: &[Expr],
    line: u32,
    depth: u32,
) -> Result<u32, InternalError> {
    match builtin {
        Builtin::Input => {
            compiler.comment("input");
            compiler.emit("li", format!("$v0, {}", SYSCALL_READ_INT));
            compiler.emit("syscall", "");
        }
        Builtin::Output => {
            let [value] = args else {
                return Err(InternalError::UnexpectedNode {
                    node: format!("call to output with {} arguments", args.len()),
                    line,
                });
            };

            let after = gen_expression(compiler, value, depth)?;
            compiler.expect_depth(depth, after, "output argument")?;
            compiler.comment("output");
            compiler.emit("move", "$a0, $v0");
            compiler.emit("li", format!("$v0, {}", SYSCALL_PRINT_INT));
            compiler.emit("syscall", "");
            // Trailing newline.
            compiler.emit("li", "$a0, 10");
            compiler.emit("li", format!("$v0, {}", SYSCALL_PRINT_CHAR));
            compiler.emit("syscall", "");
        }
    }
    Ok(compiler.stack_depth())
}
