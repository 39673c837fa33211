//these tests lower small programs and assert over the textual IR of the
//unoptimized module, plus the error cases the lowering must report

use bee::codegen::{self, context::Codegen, CodegenError};
use bee::lexer::lex_with_span;
use bee::parser::Parser;

fn lower(source: &str) -> Result<Codegen, CodegenError> {
    let tokens = lex_with_span(source);
    let program = Parser::new(&tokens).parse_program().expect("parse failed");
    codegen::lower_program(&program)
}

fn lower_ir(source: &str) -> String {
    let cg = lower(source).expect("lowering failed");
    codegen::verify(&cg).expect("module should verify");
    let ir = codegen::ir_to_string(&cg);
    cg.dispose();
    ir
}

fn lower_err(source: &str) -> CodegenError {
    match lower(source) {
        Ok(cg) => {
            cg.dispose();
            panic!("lowering should have failed");
        }
        Err(e) => e,
    }
}

#[test]
fn use_of_an_undeclared_variable_is_reported() {
    let err = lower_err("int x = y;");
    assert!(matches!(err, CodegenError::Undeclared(name) if name == "y"));
}

#[test]
fn redeclaration_in_the_same_block_is_reported() {
    let err = lower_err("int x = 1; int x = 2;");
    assert!(matches!(err, CodegenError::Redeclared(name) if name == "x"));
}

#[test]
fn unknown_type_names_are_reported() {
    let err = lower_err("foo x;");
    assert!(matches!(err, CodegenError::UnknownType(name) if name == "foo"));
}

#[test]
fn calls_to_unknown_functions_are_reported() {
    let err = lower_err("nope(1);");
    assert!(matches!(err, CodegenError::UnknownFunction(name) if name == "nope"));
}

#[test]
fn empty_array_literals_are_rejected() {
    let err = lower_err("int[] a = [];");
    assert!(matches!(err, CodegenError::EmptyArrayLiteral));
}

#[test]
fn assignment_to_an_undeclared_variable_is_reported() {
    let err = lower_err("x = 1;");
    assert!(matches!(err, CodegenError::Undeclared(name) if name == "x"));
}

#[test]
fn redeclaration_in_a_branch_scope_is_allowed() {
    let ir = lower_ir("int x = 1; if (x == 1) { int x = 2; }");
    assert!(ir.contains("define void @main()"));
}

#[test]
fn main_is_a_synthetic_void_entry() {
    let ir = lower_ir("");
    assert!(ir.contains("define void @main()"));
    assert!(ir.contains("ret void"));
}

#[test]
fn builtins_are_predeclared_externs() {
    let ir = lower_ir("");
    assert!(ir.contains("declare void @print(ptr)"));
    assert!(ir.contains("declare void @printi(i64)"));
    assert!(ir.contains("declare void @printd(double)"));
}

#[test]
fn user_externs_are_declared() {
    let ir = lower_ir("extern void record(int v);");
    assert!(ir.contains("declare void @record(i64)"));
}

#[test]
fn user_functions_get_internal_linkage() {
    let ir = lower_ir("int f() { return 1; }");
    assert!(ir.contains("define internal i64 @f()"));
}

#[test]
fn conditional_arms_all_branch_to_continue() {
    let ir = lower_ir("int f() { if (1 == 1) { return 7; } else { return 9; } }");
    // both arms and the entry conditional are terminated
    assert!(ir.contains("br i1"));
    assert!(ir.matches("br label %continue").count() >= 2);
}

#[test]
fn empty_conditional_arms_are_still_terminated() {
    let ir = lower_ir("int x = 1; if (x == 1) { }");
    assert!(ir.matches("br label %continue").count() == 2);
}

#[test]
fn compound_assignment_loads_before_it_stores() {
    let ir = lower_ir("int x = 1; x += 2;");
    let load = ir.find("= load i64").expect("expected a load");
    let add = ir.find("= add").expect("expected an add");
    let store = ir.rfind("store").expect("expected a store");
    assert!(load < add, "the current value must be loaded first");
    assert!(add < store, "the combined value must be stored last");
}

#[test]
fn binary_operands_lower_left_to_right() {
    let ir = lower_ir(
        "extern int first();\n\
         extern int second();\n\
         int x = first() - second();",
    );
    let lhs = ir.find("call i64 @first").expect("lhs call missing");
    let rhs = ir.find("call i64 @second").expect("rhs call missing");
    assert!(lhs < rhs);
}

#[test]
fn loop_condition_is_lowered_twice() {
    let ir = lower_ir("int i = 0; while (i < 3) { i = i + 1; }");
    assert_eq!(ir.matches("icmp slt").count(), 2);
}

#[test]
fn string_literals_become_private_globals() {
    let ir = lower_ir(r#"print("hi\n");"#);
    // 'h', 'i', newline, NUL
    assert!(ir.contains("private constant [4 x i8]"));
    assert!(ir.contains("c\"hi\\0A\\00\""));
}

#[test]
fn unrecognized_escapes_pass_through_verbatim() {
    let ir = lower_ir(r#"print("a\tb");"#);
    // backslash and 't' are kept as-is: a, \, t, b, NUL
    assert!(ir.contains("private constant [5 x i8]"));
    assert!(ir.contains("c\"a\\5Ctb\\00\""));
}

#[test]
fn array_literals_allocate_and_initialize_by_store() {
    let ir = lower_ir("int[] a = [10, 20, 30];");
    assert!(ir.contains("alloca [3 x i64]"));
    assert!(ir.contains("getelementptr"));
    // one store per element, plus the base pointer stored through the slot
    assert_eq!(ir.matches("store i64").count(), 3);
    assert!(ir.contains("store ptr"));
}

#[test]
fn indexed_writes_go_through_an_element_address() {
    let ir = lower_ir("int[] a = [10, 20, 30]; a[1] += 5;");
    let gep = ir.rfind("getelementptr").expect("expected a gep");
    let store = ir.rfind("store").expect("expected a store");
    assert!(gep < store);
}

#[test]
fn double_arithmetic_uses_float_instructions() {
    let ir = lower_ir("double d = 1.5; double e = d + 2.5;");
    assert!(ir.contains("fadd double"));
}

#[test]
fn mixed_operands_promote_the_integer_side() {
    let ir = lower_ir("double d = 1.5; int i = 2; double e = d * i;");
    assert!(ir.contains("sitofp i64"));
    assert!(ir.contains("fmul double"));
}

#[test]
fn double_comparisons_use_ordered_predicates() {
    let ir = lower_ir("double d = 1.5; bool b = d < 2.0;");
    assert!(ir.contains("fcmp olt"));
}

#[test]
fn unary_minus_and_not() {
    let ir = lower_ir("int x = 1; int y = -x; bool b = true; bool c = !b;");
    assert!(ir.contains("sub i64 0"));
    assert!(ir.contains("xor i1"));
}

#[test]
fn function_parameters_are_spilled_to_slots() {
    let ir = lower_ir("int add(int a, int b) { return a + b; }");
    assert!(ir.contains("%a = alloca i64"));
    assert!(ir.contains("%b = alloca i64"));
    assert!(ir.contains("store i64 %a"));
}

#[test]
fn locals_are_allocated_in_the_entry_block() {
    let ir = lower_ir("int f() { int x = 0; while (x < 3) { int y = 2; x += y; } return x; }");
    // the loop-body local must not re-alloca per iteration: its slot sits in
    // the entry block, before the first branch
    let entry_end = ir.find("br ").expect("expected a branch");
    let y_slot = ir.find("%y = alloca i64").expect("expected y's slot");
    assert!(y_slot < entry_end);
}

#[test]
fn lowered_modules_survive_the_optimizer() {
    let source = "int f() { int i = 0; while (i < 3) { i = i + 1; } return i; } int x = f();";
    let cg = lower(source).expect("lowering failed");
    codegen::verify(&cg).expect("module should verify before optimization");
    codegen::optimize(&cg).expect("optimization failed");
    codegen::verify(&cg).expect("module should verify after optimization");
    cg.dispose();
}
