use crate::{
    ast::{ArrayRef, AssignExpr, CallExpr, Expr, ExprKind, NodeType, VariableRef},
    errors::ErrorImpl,
    symbol_table::SymbolId,
};

use super::type_checker::TypeChecker;

impl<'t> TypeChecker<'t> {
    /// Types `expr` and its children. An expression that already carries a
    /// type is returned as is, so a subtree is never reported twice.
    pub fn check_expr(&mut self, expr: &mut Expr) -> NodeType {
        if expr.node_type.is_resolved() {
            return expr.node_type;
        }

        let line = expr.line;
        let node_type = match &mut expr.kind {
            ExprKind::Constant(_) => NodeType::Int,
            ExprKind::Variable(variable) => self.check_variable(variable, line),
            ExprKind::Array(array) => self.check_array(array, line),
            ExprKind::Call(call) => self.check_call(call, line),
            ExprKind::Assign(assign) => self.check_assign(assign, line),
            ExprKind::Comparison(binary) => {
                self.check_binary(binary.op.to_string(), &mut binary.left, &mut binary.right, line)
            }
            ExprKind::Additive(binary) => {
                self.check_binary(binary.op.to_string(), &mut binary.left, &mut binary.right, line)
            }
            ExprKind::Multiplicative(binary) => {
                self.check_binary(binary.op.to_string(), &mut binary.left, &mut binary.right, line)
            }
        };

        expr.node_type = node_type;
        node_type
    }

    /// Resolves a use of `name`, recording the line on its symbol.
    fn lookup(&mut self, name: &str, line: u32) -> Option<SymbolId> {
        let symbol = self.table.record_reference(name, line);
        if symbol.is_none() {
            self.report(
                ErrorImpl::VariableNotDeclared {
                    name: name.to_string(),
                },
                line,
            );
        }
        symbol
    }

    fn check_variable(&mut self, variable: &mut VariableRef, line: u32) -> NodeType {
        variable.symbol = self.lookup(&variable.name, line);
        match variable.symbol.map(|id| self.symbol_type(id)) {
            Some(NodeType::Function) => {
                self.report(
                    ErrorImpl::FunctionAsValue {
                        name: variable.name.clone(),
                    },
                    line,
                );
                NodeType::Error
            }
            Some(node_type) => node_type,
            None => NodeType::Error,
        }
    }

    fn check_array(&mut self, array: &mut ArrayRef, line: u32) -> NodeType {
        array.symbol = self.lookup(&array.name, line);
        let index = self.check_expr(&mut array.index);

        let mut node_type = NodeType::Int;
        match array.symbol.map(|id| self.symbol_type(id)) {
            None | Some(NodeType::Error) => node_type = NodeType::Error,
            Some(NodeType::IntArray) => {}
            Some(_) => {
                self.report(
                    ErrorImpl::NotAnArray {
                        name: array.name.clone(),
                    },
                    line,
                );
                node_type = NodeType::Error;
            }
        }

        if index.is_error() {
            node_type = NodeType::Error;
        } else if index != NodeType::Int {
            self.report(ErrorImpl::IndexTypeMatchError { received: index }, array.index.line);
            node_type = NodeType::Error;
        }
        node_type
    }

    /// Arguments are always checked. Argument types are only compared once
    /// the count matches, so a call never gets both an arity and a type
    /// diagnostic.
    fn check_call(&mut self, call: &mut CallExpr, line: u32) -> NodeType {
        call.symbol = self.lookup(&call.name, line);
        let received: Vec<NodeType> = call.args.iter_mut().map(|arg| self.check_expr(arg)).collect();

        let Some(id) = call.symbol else {
            return NodeType::Error;
        };
        let (symbol_type, signature) = match self.table.get(id) {
            Some(symbol) => (symbol.node_type(), symbol.signature().cloned()),
            None => (NodeType::Error, None),
        };
        let Some(signature) = signature else {
            if !symbol_type.is_error() {
                self.report(
                    ErrorImpl::NotCallable {
                        name: call.name.clone(),
                    },
                    line,
                );
            }
            return NodeType::Error;
        };

        let expected = signature.params.len();
        if received.len() > expected {
            self.report(
                ErrorImpl::UnexpectedArguments {
                    function: call.name.clone(),
                    expected,
                    received: received.len(),
                },
                line,
            );
            return NodeType::Error;
        }
        if received.len() < expected {
            self.report(
                ErrorImpl::MissingArguments {
                    function: call.name.clone(),
                    expected,
                    received: received.len(),
                },
                line,
            );
            return NodeType::Error;
        }

        let mut node_type = signature.return_type;
        for (position, (&param, &arg)) in signature.params.iter().zip(&received).enumerate() {
            if param.is_error() || arg.is_error() || param == arg {
                continue;
            }
            self.report(
                ErrorImpl::ArgumentTypeMatchError {
                    function: call.name.clone(),
                    position: position + 1,
                    expected: param,
                    received: arg,
                },
                call.args[position].line,
            );
            node_type = NodeType::Error;
        }
        node_type
    }

    fn check_assign(&mut self, assign: &mut AssignExpr, line: u32) -> NodeType {
        let target = self.check_expr(&mut assign.target);
        let value = self.check_expr(&mut assign.value);

        if !matches!(assign.target.kind, ExprKind::Variable(_) | ExprKind::Array(_)) {
            self.report(ErrorImpl::InvalidAssignmentTarget, line);
            return NodeType::Error;
        }
        if target.is_error() || value.is_error() {
            return NodeType::Error;
        }
        if target != NodeType::Int || value != NodeType::Int {
            self.report(ErrorImpl::AssignmentTypeMatchError { target, value }, line);
            return NodeType::Error;
        }
        NodeType::Int
    }

    fn check_binary(&mut self, operator: String, left: &mut Expr, right: &mut Expr, line: u32) -> NodeType {
        let left = self.check_expr(left);
        let right = self.check_expr(right);

        if left.is_error() || right.is_error() {
            return NodeType::Error;
        }
        if left != NodeType::Int || right != NodeType::Int {
            self.report(
                ErrorImpl::OperandTypeMatchError {
                    operator,
                    left,
                    right,
                },
                line,
            );
            return NodeType::Error;
        }
        NodeType::Int
    }
}
