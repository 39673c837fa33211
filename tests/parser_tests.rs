use bee::ast::{Block, Expr, Op, Param, Stmt};
use bee::lexer::lex_with_span;
use bee::parser::{ParseError, Parser};

fn parse(source: &str) -> Block {
    let tokens = lex_with_span(source);
    Parser::new(&tokens).parse_program().expect("parse failed")
}

fn parse_err(source: &str) -> ParseError {
    let tokens = lex_with_span(source);
    Parser::new(&tokens)
        .parse_program()
        .expect_err("parse should fail")
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let program = parse("int x = 2 + 3 * 4;");
    assert_eq!(
        program.stmts,
        vec![Stmt::VarDecl {
            ty: "int".to_string(),
            name: "x".to_string(),
            init: Some(Expr::Binary {
                lhs: Box::new(Expr::Integer(2)),
                op: Op::Plus,
                rhs: Box::new(Expr::Binary {
                    lhs: Box::new(Expr::Integer(3)),
                    op: Op::Mul,
                    rhs: Box::new(Expr::Integer(4)),
                }),
            }),
        }]
    );
}

#[test]
fn comparison_binds_looser_than_addition() {
    let program = parse("bool b = 1 + 2 < 4;");
    let Stmt::VarDecl { init: Some(init), .. } = &program.stmts[0] else {
        panic!("expected a declaration");
    };
    assert_eq!(
        *init,
        Expr::Binary {
            lhs: Box::new(Expr::Binary {
                lhs: Box::new(Expr::Integer(1)),
                op: Op::Plus,
                rhs: Box::new(Expr::Integer(2)),
            }),
            op: Op::Lt,
            rhs: Box::new(Expr::Integer(4)),
        }
    );
}

#[test]
fn assignment_is_right_associative() {
    let program = parse("x = y = 1;");
    assert_eq!(
        program.stmts,
        vec![Stmt::Expr(Expr::Assign {
            target: "x".to_string(),
            op: Op::Assign,
            value: Box::new(Expr::Assign {
                target: "y".to_string(),
                op: Op::Assign,
                value: Box::new(Expr::Integer(1)),
            }),
        })]
    );
}

#[test]
fn compound_assignment_keeps_its_tag() {
    let program = parse("x += 2;");
    assert_eq!(
        program.stmts,
        vec![Stmt::Expr(Expr::Assign {
            target: "x".to_string(),
            op: Op::PlusAssign,
            value: Box::new(Expr::Integer(2)),
        })]
    );
}

#[test]
fn array_declaration_with_literal_initializer() {
    let program = parse("int[] a = [10, 20, 30];");
    assert_eq!(
        program.stmts,
        vec![Stmt::ArrayDecl {
            elem_ty: "int".to_string(),
            name: "a".to_string(),
            init: Some(Expr::Array(vec![
                Expr::Integer(10),
                Expr::Integer(20),
                Expr::Integer(30),
            ])),
        }]
    );
}

#[test]
fn indexed_write_with_compound_tag() {
    let program = parse("a[1] += 5;");
    assert_eq!(
        program.stmts,
        vec![Stmt::Expr(Expr::ArrayWrite {
            array: "a".to_string(),
            index: Box::new(Expr::Integer(1)),
            op: Op::PlusAssign,
            value: Box::new(Expr::Integer(5)),
        })]
    );
}

#[test]
fn indexed_read_stays_an_expression() {
    let program = parse("int x = a[0] + 1;");
    let Stmt::VarDecl { init: Some(init), .. } = &program.stmts[0] else {
        panic!("expected a declaration");
    };
    assert_eq!(
        *init,
        Expr::Binary {
            lhs: Box::new(Expr::ArrayRead {
                array: "a".to_string(),
                index: Box::new(Expr::Integer(0)),
            }),
            op: Op::Plus,
            rhs: Box::new(Expr::Integer(1)),
        }
    );
}

#[test]
fn if_without_else_still_carries_an_empty_else_block() {
    let program = parse("if (x == 1) { y = 2; }");
    let Stmt::If { else_block, .. } = &program.stmts[0] else {
        panic!("expected an if");
    };
    assert!(else_block.stmts.is_empty());
}

#[test]
fn while_loop_shape() {
    let program = parse("while (i < 3) { i = i + 1; }");
    let Stmt::Loop { cond, body } = &program.stmts[0] else {
        panic!("expected a loop");
    };
    assert_eq!(
        *cond,
        Expr::Binary {
            lhs: Box::new(Expr::Identifier("i".to_string())),
            op: Op::Lt,
            rhs: Box::new(Expr::Integer(3)),
        }
    );
    assert_eq!(body.stmts.len(), 1);
}

#[test]
fn function_declaration_with_parameters() {
    let program = parse("int add(int a, int b) { return a + b; }");
    let Stmt::FunctionDecl {
        ret_ty,
        name,
        params,
        body,
    } = &program.stmts[0]
    else {
        panic!("expected a function");
    };
    assert_eq!(ret_ty, "int");
    assert_eq!(name, "add");
    assert_eq!(
        *params,
        vec![
            Param {
                ty: "int".to_string(),
                name: "a".to_string(),
            },
            Param {
                ty: "int".to_string(),
                name: "b".to_string(),
            },
        ]
    );
    assert!(matches!(body.stmts[0], Stmt::Return(_)));
}

#[test]
fn extern_declaration_shape() {
    let program = parse("extern void print(string s);");
    assert_eq!(
        program.stmts,
        vec![Stmt::ExternDecl {
            ret_ty: "void".to_string(),
            name: "print".to_string(),
            params: vec![Param {
                ty: "string".to_string(),
                name: "s".to_string(),
            }],
        }]
    );
}

#[test]
fn unary_operators() {
    let program = parse("int x = -y; bool c = !d;");
    let Stmt::VarDecl { init: Some(neg), .. } = &program.stmts[0] else {
        panic!("expected a declaration");
    };
    assert_eq!(
        *neg,
        Expr::Unary {
            op: Op::Minus,
            operand: Box::new(Expr::Identifier("y".to_string())),
        }
    );
    let Stmt::VarDecl { init: Some(not), .. } = &program.stmts[1] else {
        panic!("expected a declaration");
    };
    assert_eq!(
        *not,
        Expr::Unary {
            op: Op::Not,
            operand: Box::new(Expr::Identifier("d".to_string())),
        }
    );
}

#[test]
fn nested_call_arguments_keep_their_order() {
    let program = parse("f(1, g(2), 3);");
    assert_eq!(
        program.stmts,
        vec![Stmt::Expr(Expr::Call {
            callee: "f".to_string(),
            args: vec![
                Expr::Integer(1),
                Expr::Call {
                    callee: "g".to_string(),
                    args: vec![Expr::Integer(2)],
                },
                Expr::Integer(3),
            ],
        })]
    );
}

#[test]
fn missing_semicolon_is_an_error() {
    let err = parse_err("int x = 1");
    assert!(err.message.contains("Semi"));
}

#[test]
fn missing_expression_is_an_error() {
    let err = parse_err("int x = ;");
    assert!(err.message.contains("expected expression"));
}

#[test]
fn unterminated_block_is_an_error() {
    let err = parse_err("if (x == 1) { y = 2;");
    assert!(err.message.contains("unterminated block"));
}
