//! Unit tests for code generation.
//!
//! This module contains tests for:
//! - Global, local and parameter placement
//! - Frame setup and teardown
//! - Expression, assignment and call sequences
//! - Branch label structure
//! - Internal errors on malformed input

use crate::{
    ast::{
        AdditiveOp, CompoundStmt, Declaration, Expr, ExprKind, FunctionDecl, Parameter, Program,
        Stmt, StmtKind, TypeSpecifier, VariableDecl,
    },
    errors::InternalError,
    options::CompileOptions,
    symbol_table::{MemoryLocation, SymbolTable},
    type_checker::type_check,
};

use super::{
    assembly::{Assembly, Line},
    compiler::{compile, Compiler, FRAME_HEADER_SIZE},
    expr::gen_expression,
    stmt::gen_compound,
};

use TypeSpecifier::{Int, Void};

fn function(
    line: u32,
    return_type: TypeSpecifier,
    name: &str,
    params: Vec<Parameter>,
    locals: Vec<VariableDecl>,
    statements: Vec<Stmt>,
) -> Declaration {
    FunctionDecl::new(line, return_type, name, params, CompoundStmt::new(locals, statements)).into()
}

fn main_function(locals: Vec<VariableDecl>, statements: Vec<Stmt>) -> Declaration {
    function(10, Void, "main", vec![], locals, statements)
}

fn output(line: u32, value: Expr) -> Stmt {
    Stmt::expression(line, Expr::call(line, "output", vec![value]))
}

fn assign(line: u32, name: &str, value: Expr) -> Stmt {
    Stmt::expression(line, Expr::assign(line, Expr::variable(line, name), value))
}

fn checked(declarations: Vec<Declaration>) -> (Program, SymbolTable) {
    let mut program = Program::new(declarations);
    let mut table = SymbolTable::default();
    let diagnostics = type_check(&mut program, &mut table).unwrap();
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    (program, table)
}

fn generate(declarations: Vec<Declaration>) -> Assembly {
    let (program, mut table) = checked(declarations);
    compile(&program, &mut table, CompileOptions::default()).unwrap()
}

fn instructions(assembly: &Assembly) -> Vec<String> {
    assembly
        .instructions()
        .map(|(opcode, operands)| format!("{} {}", opcode, operands).trim_end().to_string())
        .collect()
}

fn assert_sequence(assembly: &Assembly, expected: &[&str]) {
    let listing = instructions(assembly);
    assert!(
        listing
            .windows(expected.len())
            .any(|window| window.iter().zip(expected).all(|(a, b)| a == b)),
        "sequence {:?} not found in:\n{}",
        expected,
        assembly
    );
}

fn body_mut(program: &mut Program, index: usize) -> &mut CompoundStmt {
    match &mut program.declarations[index] {
        Declaration::Function(function) => &mut function.body,
        Declaration::Variable(_) => panic!("declaration {} is not a function", index),
    }
}

#[test]
fn test_empty_main_frame() {
    let assembly = generate(vec![main_function(vec![], vec![])]);
    let text = assembly.to_string();

    assert!(text.starts_with(".data 0x10000000\n.text\n.globl main\nmain:\n"));
    assert_sequence(
        &assembly,
        &[
            "addiu $sp, $sp, -40",
            "sw $fp, 0($sp)",
            "sw $s0, 4($sp)",
            "sw $s1, 8($sp)",
            "sw $s2, 12($sp)",
            "sw $s3, 16($sp)",
            "sw $s4, 20($sp)",
            "sw $s5, 24($sp)",
            "sw $s6, 28($sp)",
            "sw $s7, 32($sp)",
            "sw $ra, 36($sp)",
            "addiu $fp, $sp, 40",
            "addiu $sp, $fp, -40",
            "lw $ra, 36($sp)",
        ],
    );
    assert!(text.contains("_main_epilogue:\n"));
    assert!(text.ends_with("\taddiu $sp, $sp, 40\n\tjr $ra\n"));
}

#[test]
fn test_global_placement() {
    let (program, mut table) = checked(vec![
        VariableDecl::scalar(1, Int, "x").into(),
        VariableDecl::array(2, Int, "a", 10).into(),
        VariableDecl::scalar(3, Int, "y").into(),
        main_function(vec![], vec![assign(11, "y", Expr::variable(11, "x"))]),
    ]);

    let assembly = compile(&program, &mut table, CompileOptions::default()).unwrap();

    let spaces: Vec<&Line> = assembly
        .lines()
        .iter()
        .filter(|line| matches!(line, Line::Directive(d) if d.starts_with("space")))
        .collect();
    assert_eq!(
        spaces,
        vec![
            &Line::Directive("space 4".to_string()),
            &Line::Directive("space 40".to_string()),
            &Line::Directive("space 4".to_string()),
        ]
    );

    let locations: Vec<_> = table
        .symbols()
        .filter(|(_, symbol)| symbol.builtin.is_none() && symbol.signature().is_none())
        .map(|(_, symbol)| (symbol.name.clone(), symbol.location))
        .collect();
    assert_eq!(
        locations,
        vec![
            ("x".to_string(), Some(MemoryLocation::Global(0x1000_0000))),
            ("a".to_string(), Some(MemoryLocation::Global(0x1000_0004))),
            ("y".to_string(), Some(MemoryLocation::Global(0x1000_002c))),
        ]
    );
    assert_sequence(&assembly, &["lw $v0, 0x10000000", "sw $v0, 0x1000002c"]);
}

#[test]
fn test_global_base_option() {
    let (program, mut table) = checked(vec![
        VariableDecl::scalar(1, Int, "x").into(),
        main_function(vec![], vec![output(11, Expr::variable(11, "x"))]),
    ]);

    let options = CompileOptions::default().with_global_base(0x2000);
    let assembly = compile(&program, &mut table, options).unwrap();

    assert_eq!(
        assembly.lines().first(),
        Some(&Line::Directive("data 0x2000".to_string()))
    );
    assert_sequence(&assembly, &["lw $v0, 0x2000", "move $a0, $v0"]);
}

#[test]
fn test_globals_past_the_address_space() {
    let (program, mut table) = checked(vec![
        VariableDecl::array(1, Int, "a", 8).into(),
        main_function(vec![], vec![]),
    ]);

    let options = CompileOptions::default().with_global_base(0xffff_fff0);
    let result = compile(&program, &mut table, options);

    assert_eq!(
        result,
        Err(InternalError::StorageOverflow {
            name: "a".to_string()
        })
    );
}

#[test]
fn test_oversized_global_array() {
    let (mut program, mut table) = checked(vec![
        VariableDecl::array(1, Int, "a", 4).into(),
        main_function(vec![], vec![]),
    ]);
    if let Declaration::Variable(variable) = &mut program.declarations[0] {
        variable.array_length = Some(i32::MAX);
    }

    let result = compile(&program, &mut table, CompileOptions::default());

    assert_eq!(
        result,
        Err(InternalError::StorageOverflow {
            name: "a".to_string()
        })
    );
}

#[test]
fn test_oversized_local_array() {
    let (mut program, mut table) = checked(vec![main_function(
        vec![VariableDecl::array(11, Int, "b", 4)],
        vec![],
    )]);
    body_mut(&mut program, 0).locals[0].array_length = Some(600_000_000);

    let result = compile(&program, &mut table, CompileOptions::default());

    assert_eq!(
        result,
        Err(InternalError::StorageOverflow {
            name: "b".to_string()
        })
    );
}

#[test]
fn test_local_placement() {
    let assembly = generate(vec![main_function(
        vec![
            VariableDecl::scalar(11, Int, "a"),
            VariableDecl::array(12, Int, "b", 3),
        ],
        vec![
            assign(13, "a", Expr::constant(13, 1)),
            Stmt::expression(
                14,
                Expr::assign(
                    14,
                    Expr::array(14, "b", Expr::variable(14, "a")),
                    Expr::constant(14, 2),
                ),
            ),
        ],
    )]);

    assert_sequence(
        &assembly,
        &[
            "addiu $fp, $sp, 40",
            "addiu $sp, $sp, -4",
            "addiu $sp, $sp, -12",
            "li $v0, 1",
            "sw $v0, -44($fp)",
        ],
    );
    assert_sequence(
        &assembly,
        &[
            "lw $v0, -44($fp)",
            "sll $v0, $v0, 2",
            "addiu $sp, $sp, -4",
            "sw $v0, 0($sp)",
            "li $v0, 2",
            "lw $t0, 0($sp)",
            "addiu $sp, $sp, 4",
            "addiu $t1, $fp, -56",
            "add $t1, $t1, $t0",
            "sw $v0, 0($t1)",
            "addiu $sp, $sp, 16",
            "addiu $sp, $fp, -40",
        ],
    );
}

#[test]
fn test_parameters_and_call() {
    let body = vec![Stmt::ret(
        2,
        Some(Expr::additive(
            2,
            AdditiveOp::Plus,
            Expr::variable(2, "p"),
            Expr::array(2, "q", Expr::constant(2, 0)),
        )),
    )];
    let assembly = generate(vec![
        function(
            1,
            Int,
            "f",
            vec![Parameter::scalar(1, Int, "p"), Parameter::array(1, Int, "q")],
            vec![],
            body,
        ),
        main_function(
            vec![VariableDecl::array(11, Int, "a", 2)],
            vec![output(
                12,
                Expr::call(12, "f", vec![Expr::constant(12, 1), Expr::variable(12, "a")]),
            )],
        ),
    ]);

    assert_sequence(
        &assembly,
        &[
            "lw $v0, 4($fp)",
            "addiu $sp, $sp, -4",
            "sw $v0, 0($sp)",
            "li $v0, 0",
            "sll $v0, $v0, 2",
            "lw $t1, 0($fp)",
            "add $v0, $t1, $v0",
            "lw $v0, 0($v0)",
            "lw $t0, 0($sp)",
            "addiu $sp, $sp, 4",
            "add $v0, $t0, $v0",
            "j _f_epilogue",
        ],
    );
    assert_sequence(
        &assembly,
        &[
            "li $v0, 1",
            "addiu $sp, $sp, -4",
            "sw $v0, 0($sp)",
            "addiu $v0, $fp, -48",
            "addiu $sp, $sp, -4",
            "sw $v0, 0($sp)",
            "jal f",
            "addiu $sp, $sp, 8",
            "move $a0, $v0",
        ],
    );
}

#[test]
fn test_builtin_io() {
    let assembly = generate(vec![
        VariableDecl::scalar(1, Int, "x").into(),
        main_function(
            vec![],
            vec![
                assign(11, "x", Expr::call(11, "input", vec![])),
                output(12, Expr::variable(12, "x")),
            ],
        ),
    ]);

    assert_sequence(
        &assembly,
        &[
            "li $v0, 5",
            "syscall",
            "sw $v0, 0x10000000",
            "lw $v0, 0x10000000",
            "move $a0, $v0",
            "li $v0, 1",
            "syscall",
            "li $a0, 10",
            "li $v0, 11",
            "syscall",
        ],
    );
    assert!(!instructions(&assembly).iter().any(|i| i.starts_with("jal")));
}

#[test]
fn test_if_else_labels() {
    let assembly = generate(vec![
        VariableDecl::scalar(1, Int, "x").into(),
        main_function(
            vec![],
            vec![Stmt::selection(
                11,
                Expr::variable(11, "x"),
                output(12, Expr::constant(12, 1)),
                Some(output(13, Expr::constant(13, 2))),
            )],
        ),
    ]);

    let labels: Vec<&str> = assembly.labels().collect();
    assert_eq!(labels, vec!["main", "L1", "L0", "_main_epilogue"]);
    assert_sequence(&assembly, &["lw $v0, 0x10000000", "beqz $v0, L1"]);
    assert_sequence(&assembly, &["syscall", "j L0"]);
}

#[test]
fn test_while_labels() {
    let assembly = generate(vec![
        VariableDecl::scalar(1, Int, "x").into(),
        main_function(
            vec![],
            vec![Stmt::iteration(
                11,
                Expr::variable(11, "x"),
                assign(
                    12,
                    "x",
                    Expr::additive(12, AdditiveOp::Minus, Expr::variable(12, "x"), Expr::constant(12, 1)),
                ),
            )],
        ),
    ]);

    let text = assembly.to_string();
    let jump = text.find("\tj L0\n").unwrap();
    let body = text.find("L1:\n").unwrap();
    let compare = text.find("L0:\n").unwrap();
    let branch = text.find("\tbnez $v0, L1\n").unwrap();
    assert!(jump < body && body < compare && compare < branch);
}

#[test]
fn test_trace_comments() {
    let declarations = vec![
        VariableDecl::scalar(1, Int, "x").into(),
        main_function(vec![], vec![assign(11, "x", Expr::constant(11, 3))]),
    ];
    let (program, mut table) = checked(declarations);

    let quiet = compile(&program, &mut table, CompileOptions::default()).unwrap();
    let traced = compile(
        &program,
        &mut table,
        CompileOptions::default().with_trace_code(true),
    )
    .unwrap();

    let comments = |assembly: &Assembly| {
        assembly
            .lines()
            .iter()
            .filter(|line| matches!(line, Line::Comment(_)))
            .count()
    };
    assert_eq!(comments(&quiet), 0);
    assert!(comments(&traced) > 0);
    assert_eq!(
        instructions(&quiet),
        instructions(&traced),
        "comments must not change the code"
    );
}

#[test]
fn test_regeneration_is_identical() {
    let (program, mut table) = checked(vec![
        VariableDecl::array(1, Int, "a", 4).into(),
        main_function(
            vec![VariableDecl::scalar(11, Int, "i")],
            vec![Stmt::iteration(
                12,
                Expr::variable(12, "i"),
                output(13, Expr::array(13, "a", Expr::variable(13, "i"))),
            )],
        ),
    ]);

    let first = compile(&program, &mut table, CompileOptions::default()).unwrap();
    let second = compile(&program, &mut table, CompileOptions::default()).unwrap();

    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_unchecked_program_is_rejected() {
    let program = Program::new(vec![main_function(vec![], vec![])]);
    let mut table = SymbolTable::default();

    let result = compile(&program, &mut table, CompileOptions::default());

    assert!(matches!(result, Err(InternalError::UnresolvedType { .. })));
}

#[test]
fn test_missing_symbol() {
    let (mut program, mut table) = checked(vec![
        VariableDecl::scalar(1, Int, "x").into(),
        main_function(vec![], vec![output(11, Expr::variable(11, "x"))]),
    ]);
    if let StmtKind::Expression(Some(call)) = &mut body_mut(&mut program, 1).statements[0].kind {
        if let ExprKind::Call(call) = &mut call.kind {
            if let ExprKind::Variable(variable) = &mut call.args[0].kind {
                variable.symbol = None;
            }
        }
    }

    let result = compile(&program, &mut table, CompileOptions::default());

    assert_eq!(
        result,
        Err(InternalError::MissingSymbol {
            name: "x".to_string(),
            line: 11,
        })
    );
}

#[test]
fn test_stale_symbol() {
    let (mut program, mut table) = checked(vec![
        function(1, Void, "f", vec![Parameter::scalar(1, Int, "p")], vec![], vec![]),
        VariableDecl::scalar(2, Int, "x").into(),
        main_function(vec![], vec![output(11, Expr::variable(11, "x"))]),
    ]);
    let param = match &program.declarations[0] {
        Declaration::Function(function) => function.params[0].symbol,
        Declaration::Variable(_) => unreachable!(),
    };
    if let StmtKind::Expression(Some(call)) = &mut body_mut(&mut program, 2).statements[0].kind {
        if let ExprKind::Call(call) = &mut call.kind {
            if let ExprKind::Variable(variable) = &mut call.args[0].kind {
                variable.symbol = param;
            }
        }
    }

    let result = compile(&program, &mut table, CompileOptions::default());

    assert_eq!(
        result,
        Err(InternalError::StaleSymbol {
            name: "p".to_string()
        })
    );
}

#[test]
fn test_unbalanced_frame_is_fatal() {
    let (program, mut table) = checked(vec![main_function(
        vec![VariableDecl::scalar(11, Int, "a")],
        vec![assign(12, "a", Expr::constant(12, 7))],
    )]);
    let Declaration::Function(main) = &program.declarations[0] else {
        unreachable!()
    };
    let mut compiler = Compiler::new(&mut table, CompileOptions::default());
    compiler.current_function = Some(0);
    compiler.reserve(FRAME_HEADER_SIZE, "main").unwrap();

    // One word pushed ahead of the body and never popped.
    compiler.push_result().unwrap();
    let result = gen_compound(&mut compiler, &main.body, FRAME_HEADER_SIZE);

    assert_eq!(
        result,
        Err(InternalError::StackImbalance {
            context: "compound statement".to_string(),
            expected: 40,
            actual: 44,
        })
    );
}

#[test]
fn test_expression_leaves_depth_unchanged() {
    let (program, mut table) = checked(vec![main_function(
        vec![],
        vec![output(
            11,
            Expr::additive(
                11,
                AdditiveOp::Plus,
                Expr::constant(11, 1),
                Expr::additive(11, AdditiveOp::Minus, Expr::constant(11, 2), Expr::constant(11, 3)),
            ),
        )],
    )]);
    let Declaration::Function(main) = &program.declarations[0] else {
        unreachable!()
    };
    let StmtKind::Expression(Some(expression)) = &main.body.statements[0].kind else {
        unreachable!()
    };
    let mut compiler = Compiler::new(&mut table, CompileOptions::default());
    compiler.current_function = Some(0);
    compiler.reserve(FRAME_HEADER_SIZE, "main").unwrap();

    assert_eq!(gen_expression(&mut compiler, expression, FRAME_HEADER_SIZE), Ok(FRAME_HEADER_SIZE));
    assert_eq!(compiler.stack_depth(), FRAME_HEADER_SIZE);

    let result = gen_expression(&mut compiler, expression, FRAME_HEADER_SIZE + 8);
    assert_eq!(
        result,
        Err(InternalError::StackImbalance {
            context: "expression".to_string(),
            expected: 48,
            actual: 40,
        })
    );
}

#[test]
fn test_release_below_frame_is_fatal() {
    let mut table = SymbolTable::default();
    let mut compiler = Compiler::new(&mut table, CompileOptions::default());
    compiler.reserve(8, "temporaries").unwrap();

    let result = compiler.release(12, "call arguments");

    assert_eq!(
        result,
        Err(InternalError::StackImbalance {
            context: "call arguments".to_string(),
            expected: 12,
            actual: 8,
        })
    );
    assert_eq!(compiler.stack_depth(), 8);
}
