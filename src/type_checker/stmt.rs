use crate::{
    ast::{CompoundStmt, Expr, NodeType, Stmt, StmtKind},
    errors::ErrorImpl,
    symbol_table::{StorageClass, SymbolTableError},
};

use super::type_checker::TypeChecker;

impl<'t> TypeChecker<'t> {
    pub fn check_stmt(&mut self, stmt: &mut Stmt) -> Result<NodeType, SymbolTableError> {
        if stmt.node_type.is_resolved() {
            return Ok(stmt.node_type);
        }

        match &mut stmt.kind {
            StmtKind::Compound(compound) => self.check_compound(compound, true)?,
            StmtKind::Expression(Some(expression)) => {
                self.check_expr(expression);
            }
            StmtKind::Expression(None) => {}
            StmtKind::Selection(selection) => {
                self.check_condition(&mut selection.condition);
                self.check_stmt(&mut selection.then_branch)?;
                if let Some(else_branch) = &mut selection.else_branch {
                    self.check_stmt(else_branch)?;
                }
            }
            StmtKind::Iteration(iteration) => {
                self.check_condition(&mut iteration.condition);
                self.check_stmt(&mut iteration.body)?;
            }
            StmtKind::Return(value) => self.check_return(value.as_mut(), stmt.line),
        }

        stmt.node_type = NodeType::None;
        Ok(stmt.node_type)
    }

    /// Checks a block. A function body passes `open_scope = false` because
    /// its locals live in the scope that already holds the parameters.
    pub fn check_compound(
        &mut self,
        compound: &mut CompoundStmt,
        open_scope: bool,
    ) -> Result<(), SymbolTableError> {
        if open_scope {
            self.table.push_scope()?;
        }

        for local in compound.locals.iter_mut() {
            self.check_variable_decl(local, StorageClass::Local)?;
        }
        for stmt in compound.statements.iter_mut() {
            self.check_stmt(stmt)?;
        }

        if open_scope {
            self.table.pop_scope()?;
        }
        Ok(())
    }

    fn check_condition(&mut self, condition: &mut Expr) {
        let received = self.check_expr(condition);
        if !received.is_error() && received != NodeType::Int {
            self.report(ErrorImpl::ConditionTypeMatchError { received }, condition.line);
        }
    }

    fn check_return(&mut self, value: Option<&mut Expr>, line: u32) {
        let expected = self.return_type.unwrap_or(NodeType::Void);
        let received = match value {
            Some(expression) => self.check_expr(expression),
            None => NodeType::Void,
        };

        if !received.is_error() && !expected.is_error() && received != expected {
            self.report(ErrorImpl::ReturnTypeMatchError { expected, received }, line);
        }
    }
}

/// Whether every path through `stmt` ends in a `return`.
pub fn always_returns(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Return(_) => true,
        StmtKind::Compound(compound) => compound_always_returns(compound),
        StmtKind::Selection(selection) => match &selection.else_branch {
            Some(else_branch) => {
                always_returns(&selection.then_branch) && always_returns(else_branch)
            }
            None => false,
        },
        // The loop body may never run.
        StmtKind::Iteration(_) | StmtKind::Expression(_) => false,
    }
}

pub fn compound_always_returns(compound: &CompoundStmt) -> bool {
    compound.statements.iter().any(always_returns)
}
