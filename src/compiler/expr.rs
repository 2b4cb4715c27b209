use crate::{
    ast::{
        AdditiveOp, ArrayRef, AssignExpr, CallExpr, ComparisonOp, Expr, ExprKind, MultiplicativeOp,
        VariableRef,
    },
    errors::InternalError,
    symbol_table::{MemoryLocation, StorageClass, Symbol, SymbolKind},
};

use super::{compiler::Compiler, stdlib::gen_builtin};

fn comparison_opcode(op: ComparisonOp) -> &'static str {
    match op {
        ComparisonOp::Lt => "slt",
        ComparisonOp::Le => "sle",
        ComparisonOp::Gt => "sgt",
        ComparisonOp::Ge => "sge",
        ComparisonOp::Eq => "seq",
        ComparisonOp::Ne => "sne",
    }
}

fn additive_opcode(op: AdditiveOp) -> &'static str {
    match op {
        AdditiveOp::Plus => "add",
        AdditiveOp::Minus => "sub",
    }
}

fn multiplicative_opcode(op: MultiplicativeOp) -> &'static str {
    match op {
        MultiplicativeOp::Times => "mul",
        MultiplicativeOp::Over => "div",
    }
}

/// Generates code leaving the value of `expression` in `$v0`.
///
/// `depth` is the frame depth on entry. Returns the depth left behind,
/// which equals `depth` once every temporary has been popped.
pub fn gen_expression(
    compiler: &mut Compiler<'_>,
    expression: &Expr,
    depth: u32,
) -> Result<u32, InternalError> {
    compiler.expect_type(expression.node_type, expression.line)?;
    compiler.expect_stack(depth, "expression")?;

    match &expression.kind {
        ExprKind::Constant(value) => {
            compiler.emit("li", format!("$v0, {}", value));
            Ok(depth)
        }
        ExprKind::Variable(variable) => {
            gen_variable(compiler, variable, expression.line)?;
            Ok(depth)
        }
        ExprKind::Array(array) => {
            let after = gen_element_address(compiler, array, expression.line, depth)?;
            compiler.emit("lw", "$v0, 0($v0)");
            Ok(after)
        }
        ExprKind::Call(call) => gen_call(compiler, call, expression.line, depth),
        ExprKind::Assign(assign) => gen_assign(compiler, assign, expression.line, depth),
        ExprKind::Comparison(binary) => gen_binary(
            compiler,
            comparison_opcode(binary.op),
            &binary.left,
            &binary.right,
            depth,
        ),
        ExprKind::Additive(binary) => gen_binary(
            compiler,
            additive_opcode(binary.op),
            &binary.left,
            &binary.right,
            depth,
        ),
        ExprKind::Multiplicative(binary) => gen_binary(
            compiler,
            multiplicative_opcode(binary.op),
            &binary.left,
            &binary.right,
            depth,
        ),
    }
}

/// Left operand is evaluated first and parked on the stack while the right
/// one is computed.
fn gen_binary(
    compiler: &mut Compiler<'_>,
    opcode: &str,
    left: &Expr,
    right: &Expr,
    depth: u32,
) -> Result<u32, InternalError> {
    let after = gen_expression(compiler, left, depth)?;
    compiler.expect_depth(depth, after, "left operand")?;
    let pushed = compiler.push_result()?;
    let after = gen_expression(compiler, right, pushed)?;
    compiler.expect_depth(pushed, after, "right operand")?;
    let after = compiler.pop_into("$t0")?;
    compiler.emit(opcode, "$v0, $t0, $v0");
    Ok(after)
}

fn location(symbol: &Symbol) -> Result<MemoryLocation, InternalError> {
    symbol.location.ok_or_else(|| InternalError::MissingLocation {
        name: symbol.name.clone(),
    })
}

/// Loads the address of element 0 of an array into `register`.
fn load_array_base(
    compiler: &mut Compiler<'_>,
    symbol: &Symbol,
    register: &str,
) -> Result<(), InternalError> {
    if !matches!(symbol.kind, SymbolKind::IntArray { .. }) {
        return Err(InternalError::UnexpectedSymbol {
            name: symbol.name.clone(),
            expected: "an array".to_string(),
        });
    }

    match (location(symbol)?, symbol.storage) {
        (MemoryLocation::Global(address), _) => {
            compiler.emit("li", format!("{}, {:#x}", register, address))
        }
        // Array parameters hold the caller's base address.
        (MemoryLocation::Frame(offset), StorageClass::Parameter) => {
            compiler.emit("lw", format!("{}, {}($fp)", register, offset))
        }
        (MemoryLocation::Frame(offset), _) => {
            compiler.emit("addiu", format!("{}, $fp, {}", register, offset))
        }
    }
    Ok(())
}

/// Operand addressing an `int` variable in a load or store.
fn scalar_operand(symbol: &Symbol) -> Result<String, InternalError> {
    if symbol.kind != SymbolKind::Int {
        return Err(InternalError::UnexpectedSymbol {
            name: symbol.name.clone(),
            expected: "an int variable".to_string(),
        });
    }

    Ok(match location(symbol)? {
        MemoryLocation::Global(address) => format!("{:#x}", address),
        MemoryLocation::Frame(offset) => format!("{}($fp)", offset),
    })
}

fn gen_variable(
    compiler: &mut Compiler<'_>,
    variable: &VariableRef,
    line: u32,
) -> Result<(), InternalError> {
    let symbol = compiler.symbol(variable.symbol, &variable.name, line)?;

    match symbol.kind {
        SymbolKind::IntArray { .. } => load_array_base(compiler, &symbol, "$v0"),
        _ => {
            let operand = scalar_operand(&symbol)?;
            compiler.emit("lw", format!("$v0, {}", operand));
            Ok(())
        }
    }
}

/// Leaves the address of `array[index]` in `$v0`. Clobbers `$t1`.
fn gen_element_address(
    compiler: &mut Compiler<'_>,
    array: &ArrayRef,
    line: u32,
    depth: u32,
) -> Result<u32, InternalError> {
    let symbol = compiler.symbol(array.symbol, &array.name, line)?;

    let after = gen_expression(compiler, &array.index, depth)?;
    compiler.emit("sll", "$v0, $v0, 2");
    load_array_base(compiler, &symbol, "$t1")?;
    compiler.emit("add", "$v0, $t1, $v0");
    Ok(after)
}

fn gen_assign(
    compiler: &mut Compiler<'_>,
    assign: &AssignExpr,
    line: u32,
    depth: u32,
) -> Result<u32, InternalError> {
    match &assign.target.kind {
        ExprKind::Variable(variable) => {
            let symbol = compiler.symbol(variable.symbol, &variable.name, line)?;
            let operand = scalar_operand(&symbol)?;

            let after = gen_expression(compiler, &assign.value, depth)?;
            compiler.comment(format!("store {}", variable.name));
            compiler.emit("sw", format!("$v0, {}", operand));
            Ok(after)
        }
        ExprKind::Array(array) => {
            let symbol = compiler.symbol(array.symbol, &array.name, line)?;

            let after = gen_expression(compiler, &array.index, depth)?;
            compiler.expect_depth(depth, after, "array index")?;
            compiler.emit("sll", "$v0, $v0, 2");
            let pushed = compiler.push_result()?;
            let after = gen_expression(compiler, &assign.value, pushed)?;
            compiler.expect_depth(pushed, after, "assigned value")?;
            let after = compiler.pop_into("$t0")?;

            compiler.comment(format!("store {}[]", array.name));
            load_array_base(compiler, &symbol, "$t1")?;
            compiler.emit("add", "$t1, $t1, $t0");
            compiler.emit("sw", "$v0, 0($t1)");
            Ok(after)
        }
        _ => Err(InternalError::UnexpectedNode {
            node: "assignment target".to_string(),
            line: assign.target.line,
        }),
    }
}

/// Arguments are pushed left to right and popped by the caller after the
/// call returns.
fn gen_call(
    compiler: &mut Compiler<'_>,
    call: &CallExpr,
    line: u32,
    depth: u32,
) -> Result<u32, InternalError> {
    let symbol = compiler.symbol(call.symbol, &call.name, line)?;
    if let Some(builtin) = symbol.builtin {
        return gen_builtin(compiler, builtin, &call.args, line, depth);
    }
    if symbol.signature().is_none() {
        return Err(InternalError::UnexpectedSymbol {
            name: symbol.name,
            expected: "a function".to_string(),
        });
    }

    compiler.comment(format!("call {}", call.name));
    let mut current = depth;
    for arg in &call.args {
        let after = gen_expression(compiler, arg, current)?;
        compiler.expect_depth(current, after, "call argument")?;
        current = compiler.push_result()?;
    }
    compiler.emit("jal", call.name.as_str());
    compiler.release(current - depth, "call arguments")
}
