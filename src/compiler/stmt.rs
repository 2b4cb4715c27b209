use crate::{
    ast::{CompoundStmt, Stmt, StmtKind},
    errors::InternalError,
    symbol_table::MemoryLocation,
};

use super::{compiler::Compiler, expr::gen_expression};

/// Generates `statement` with the frame currently `depth` bytes deep and
/// returns the depth afterwards, which must equal `depth`.
pub fn gen_statement(
    compiler: &mut Compiler<'_>,
    statement: &Stmt,
    depth: u32,
) -> Result<u32, InternalError> {
    compiler.expect_type(statement.node_type, statement.line)?;
    compiler.expect_stack(depth, "statement")?;

    match &statement.kind {
        StmtKind::Compound(compound) => gen_compound(compiler, compound, depth),
        StmtKind::Expression(Some(expression)) => gen_expression(compiler, expression, depth),
        StmtKind::Expression(None) => Ok(depth),
        StmtKind::Selection(selection) => {
            compiler.comment("if");
            let after = gen_expression(compiler, &selection.condition, depth)?;
            compiler.expect_depth(depth, after, "if condition")?;

            let exit = compiler.new_label();
            let otherwise = compiler.new_label();
            compiler.emit("beqz", format!("$v0, {}", otherwise));

            let after = gen_statement(compiler, &selection.then_branch, depth)?;
            compiler.expect_depth(depth, after, "then branch")?;
            compiler.emit("j", exit.as_str());

            compiler.assembly.label(otherwise);
            if let Some(else_branch) = &selection.else_branch {
                let after = gen_statement(compiler, else_branch, depth)?;
                compiler.expect_depth(depth, after, "else branch")?;
            }
            compiler.assembly.label(exit);
            Ok(compiler.stack_depth())
        }
        StmtKind::Iteration(iteration) => {
            compiler.comment("while");
            let compare = compiler.new_label();
            let body = compiler.new_label();
            compiler.emit("j", compare.as_str());

            compiler.assembly.label(body.as_str());
            let after = gen_statement(compiler, &iteration.body, depth)?;
            compiler.expect_depth(depth, after, "loop body")?;

            compiler.assembly.label(compare);
            let after = gen_expression(compiler, &iteration.condition, depth)?;
            compiler.expect_depth(depth, after, "loop condition")?;
            compiler.emit("bnez", format!("$v0, {}", body));
            Ok(compiler.stack_depth())
        }
        StmtKind::Return(value) => {
            compiler.comment("return");
            if let Some(value) = value {
                let after = gen_expression(compiler, value, depth)?;
                compiler.expect_depth(depth, after, "return value")?;
            }
            let epilogue = compiler.epilogue_label().to_string();
            compiler.emit("j", epilogue);
            Ok(compiler.stack_depth())
        }
    }
}

/// Allocates the block's locals below `depth`, generates its statements
/// and releases the locals again.
pub fn gen_compound(
    compiler: &mut Compiler<'_>,
    compound: &CompoundStmt,
    depth: u32,
) -> Result<u32, InternalError> {
    compiler.expect_stack(depth, "compound statement")?;
    let mut current = depth;

    for local in &compound.locals {
        compiler.expect_type(local.node_type, local.line)?;
        let overflow = || InternalError::StorageOverflow {
            name: local.name.clone(),
        };
        let size = local.size_in_bytes().ok_or_else(overflow)?;
        current = compiler.reserve(size, &local.name)?;
        let offset = -i32::try_from(current).map_err(|_| overflow())?;
        compiler.place(
            local.symbol,
            &local.name,
            local.line,
            MemoryLocation::Frame(offset),
        )?;
        compiler.comment(format!("local {} at {}($fp)", local.name, offset));
    }

    for statement in &compound.statements {
        let after = gen_statement(compiler, statement, current)?;
        compiler.expect_depth(current, after, "statement")?;
    }

    let size = compound
        .locals_size()
        .ok_or_else(|| InternalError::StorageOverflow {
            name: "block locals".to_string(),
        })?;
    let expected = depth
        .checked_add(size)
        .ok_or_else(|| InternalError::StorageOverflow {
            name: "block locals".to_string(),
        })?;
    compiler.expect_depth(expected, current, "compound statement")?;
    compiler.release(size, "compound statement")
}
