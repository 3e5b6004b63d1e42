mod common;

use anyhow::Result;
use crunch::ast::{Expr, Program, Stmt};
use crunch::codegen::{host_triple, Codegen};
use crunch::error::{CodegenError, CompileError, ParseError, SemanticError};
use crunch::token::Pos;
use inkwell::context::Context as LlvmContext;

use common::{compile_error, emit_ir};

fn semantic(err: CompileError) -> SemanticError {
    match err {
        CompileError::Semantic(err) => err,
        other => panic!("expected a semantic error, got {other:?}"),
    }
}

#[test]
fn int_operand_is_promoted_when_mixed_with_double() -> Result<()> {
    let ir = emit_ir("int x = 5;\ndouble y = x + 2.0;")?;
    assert!(ir.contains("sitofp i32"), "{ir}");
    assert!(ir.contains("fadd double"), "{ir}");
    assert!(ir.contains("store double %fadd, ptr %y"), "{ir}");
    Ok(())
}

#[test]
fn declarations_without_initializer_store_zero() -> Result<()> {
    let ir = emit_ir("double d;\nint n;\nbool b;")?;
    assert!(ir.contains("%d = alloca double"), "{ir}");
    assert!(ir.contains("store double 0.000000e+00, ptr %d"), "{ir}");
    assert!(ir.contains("store i32 0, ptr %n"), "{ir}");
    assert!(ir.contains("store i1 false, ptr %b"), "{ir}");
    Ok(())
}

#[test]
fn integer_division_truncates_toward_zero() -> Result<()> {
    let ir = emit_ir(
        "int q = -7 / 2;\nint r = -7 % 2;\nint s = 7 % -2;\nint t = 7 / -2;\nint u = -7 / -2;",
    )?;
    assert!(ir.contains("store i32 -3, ptr %q"), "{ir}");
    assert!(ir.contains("store i32 -1, ptr %r"), "{ir}");
    assert!(ir.contains("store i32 1, ptr %s"), "{ir}");
    assert!(ir.contains("store i32 -3, ptr %t"), "{ir}");
    assert!(ir.contains("store i32 3, ptr %u"), "{ir}");
    Ok(())
}

#[test]
fn integer_division_uses_signed_instructions() -> Result<()> {
    let ir = emit_ir("int a = -7;\nint q = a / 2;\nint r = a % 2;")?;
    assert!(ir.contains("sdiv i32"), "{ir}");
    assert!(ir.contains("srem i32"), "{ir}");
    Ok(())
}

#[test]
fn double_initializer_narrows_into_int() -> Result<()> {
    let ir = emit_ir("int n = 3.9;\nint m = -3.9;\ndouble d = 2;")?;
    assert!(ir.contains("store i32 3, ptr %n"), "{ir}");
    assert!(ir.contains("store i32 -3, ptr %m"), "{ir}");
    assert!(ir.contains("store double 2.000000e+00, ptr %d"), "{ir}");
    Ok(())
}

#[test]
fn nested_block_shadows_outer_variable() -> Result<()> {
    let ir = emit_ir("int x = 1;\n{ double x = 2.5; print x; }\nprint x;")?;
    // inner slot is %x1, the outer one %x
    assert!(ir.contains("%x1 = alloca double"), "{ir}");
    assert!(ir.contains("load double, ptr %x1"), "{ir}");
    assert!(ir.contains("load i32, ptr %x,"), "{ir}");
    Ok(())
}

#[test]
fn duplicate_declaration_in_one_block_fails() {
    let err = semantic(compile_error("{ int x; int x; }"));
    assert_eq!(
        err,
        SemanticError::DuplicateDeclaration {
            name: "x".into(),
            pos: Pos::new(1, 10),
        }
    );
    assert!(matches!(
        semantic(compile_error("int y = 1;\nbool y;")),
        SemanticError::DuplicateDeclaration { name, .. } if name == "y"
    ));
}

#[test]
fn block_scope_ends_at_closing_brace() {
    assert_eq!(
        semantic(compile_error("{ int z = 1; }\nprint z;")),
        SemanticError::UndeclaredIdentifier {
            name: "z".into(),
            pos: Pos::new(2, 7),
        }
    );
    // sibling blocks may reuse a name
    assert!(emit_ir("{ int z = 1; }\n{ int z = 2; }").is_ok());
}

#[test]
fn undeclared_identifiers_are_rejected() {
    assert!(matches!(
        semantic(compile_error("print y;")),
        SemanticError::UndeclaredIdentifier { name, .. } if name == "y"
    ));
    assert!(matches!(
        semantic(compile_error("y = 1;")),
        SemanticError::UndeclaredIdentifier { .. }
    ));
    // the initializer is checked before the name is declared
    assert!(matches!(
        semantic(compile_error("int w = w + 1;")),
        SemanticError::UndeclaredIdentifier { .. }
    ));
}

#[test]
fn if_condition_must_be_boolean() {
    assert!(matches!(
        semantic(compile_error("if (1) print 1;")),
        SemanticError::TypeMismatch { expected, found, .. } if expected == "bool" && found == "int"
    ));
}

#[test]
fn operator_type_rules() {
    assert!(matches!(
        semantic(compile_error("string s = \"a\";\nprint s + 1;")),
        SemanticError::TypeMismatch { found, .. } if found == "string + int"
    ));
    assert!(matches!(
        semantic(compile_error("print !1;")),
        SemanticError::TypeMismatch { expected, .. } if expected == "bool"
    ));
    assert!(matches!(
        semantic(compile_error("print -true;")),
        SemanticError::TypeMismatch { .. }
    ));
    assert!(matches!(
        semantic(compile_error("print 1 && true;")),
        SemanticError::TypeMismatch { .. }
    ));
    assert!(matches!(
        semantic(compile_error("print true < false;")),
        SemanticError::TypeMismatch { .. }
    ));
    assert!(matches!(
        semantic(compile_error("print true == 1;")),
        SemanticError::TypeMismatch { .. }
    ));
    assert!(matches!(
        semantic(compile_error("int x = true;")),
        SemanticError::TypeMismatch { expected, found, .. } if expected == "int" && found == "bool"
    ));
    assert!(matches!(
        semantic(compile_error("print sin \"x\";")),
        SemanticError::TypeMismatch { .. }
    ));
}

#[test]
fn string_declarations_need_a_literal() -> Result<()> {
    let ir = emit_ir("string s = \"hi\";\nprint s;")?;
    assert!(ir.contains("%s = alloca [3 x i8]"), "{ir}");
    assert!(ir.contains(r#"store [3 x i8] c"hi\00", ptr %s"#), "{ir}");
    assert!(ir.contains("@printf(ptr @.fmt.str, ptr %s)"), "{ir}");

    assert!(matches!(
        semantic(compile_error("string s;")),
        SemanticError::UnsupportedInitializer { name, .. } if name == "s"
    ));
    assert!(matches!(
        semantic(compile_error("string a = \"x\";\nstring b = a;")),
        SemanticError::UnsupportedInitializer { name, .. } if name == "b"
    ));
    assert!(matches!(
        semantic(compile_error("string a = \"x\";\na = \"y\";")),
        SemanticError::UnsupportedInitializer { .. }
    ));
    assert!(matches!(
        semantic(compile_error("function f;")),
        SemanticError::UnsupportedInitializer { .. }
    ));
    Ok(())
}

#[test]
fn assignment_is_typed_and_chains() -> Result<()> {
    let ir = emit_ir("int a;\nint b;\na = b = 3;\ndouble d;\nd = a;\na = 2.5;")?;
    assert!(ir.contains("store i32 3, ptr %b"), "{ir}");
    assert!(ir.contains("store i32 3, ptr %a"), "{ir}");
    assert!(ir.contains("store i32 2, ptr %a"), "{ir}");
    assert!(ir.contains("sitofp i32"), "{ir}");
    Ok(())
}

#[test]
fn comma_yields_its_right_operand() -> Result<()> {
    let ir = emit_ir("int x = (1, 2);")?;
    assert!(ir.contains("store i32 2, ptr %x"), "{ir}");
    Ok(())
}

#[test]
fn print_selects_a_format_per_type() -> Result<()> {
    let ir = emit_ir("print 1;\nprint 1.5;\nprint \"hey\";\nbool b = true;\nprint b;")?;
    assert!(ir.contains("declare i32 @printf(ptr, ...)"), "{ir}");
    assert!(ir.contains("@printf(ptr @.fmt.int, i32 1)"), "{ir}");
    assert!(ir.contains("@printf(ptr @.fmt.double, double 1.500000e+00)"), "{ir}");
    assert!(ir.contains("c\"hey\\00\""), "{ir}");
    assert!(ir.contains("select i1"), "{ir}");
    Ok(())
}

#[test]
fn if_else_builds_branches() -> Result<()> {
    let ir = emit_ir("int x = 3;\nif (x > 2) { print x; } else print 0;\nif (x == 3) print 1;")?;
    assert!(ir.contains("icmp sgt i32"), "{ir}");
    assert!(ir.contains("if.then:"), "{ir}");
    assert!(ir.contains("if.else:"), "{ir}");
    assert!(ir.contains("if.end:"), "{ir}");
    assert!(ir.contains("br i1"), "{ir}");
    Ok(())
}

#[test]
fn unbraced_branch_declaration_is_local_to_the_branch() {
    assert!(matches!(
        semantic(compile_error("bool c = false;\nif (c) int x = 1;\nprint x;")),
        SemanticError::UndeclaredIdentifier { name, pos } if name == "x" && pos == Pos::new(3, 7)
    ));
    assert!(matches!(
        semantic(compile_error("bool c = true;\nif (c) print 1; else double y = 2.0;\ny = 1.0;")),
        SemanticError::UndeclaredIdentifier { name, .. } if name == "y"
    ));
}

#[test]
fn branches_may_declare_the_same_name() -> Result<()> {
    let ir = emit_ir("bool c = true;\nif (c) int x = 1; else int x = 2;\nint x = 3;\nprint x;")?;
    // slots are hoisted into the entry block, ahead of any branch
    let (entry, branches) = ir.split_once("if.then:").expect("then block");
    assert!(entry.contains("%x = alloca i32"), "{ir}");
    assert!(entry.contains("%x1 = alloca i32"), "{ir}");
    assert!(entry.contains("%x2 = alloca i32"), "{ir}");
    assert!(branches.contains("store i32 1, ptr %x,"), "{ir}");
    assert!(branches.contains("store i32 2, ptr %x1"), "{ir}");
    assert!(branches.contains("store i32 3, ptr %x2"), "{ir}");
    Ok(())
}

#[test]
fn logical_operators_short_circuit() -> Result<()> {
    let ir = emit_ir("bool a = true;\nbool b = false;\nprint a && b;\nprint a || b;")?;
    assert!(ir.contains("logic.rhs:"), "{ir}");
    assert!(ir.contains("logic.end:"), "{ir}");
    assert!(ir.contains("phi i1"), "{ir}");
    Ok(())
}

#[test]
fn comparisons_promote_mixed_operands() -> Result<()> {
    let ir = emit_ir("int i = 1;\nprint i < 2.5;\nbool f = false;\nprint f != true;")?;
    assert!(ir.contains("fcmp olt double"), "{ir}");
    assert!(ir.contains("icmp ne i1"), "{ir}");
    Ok(())
}

#[test]
fn math_operators_call_double_functions() -> Result<()> {
    let ir = emit_ir("double s = sin cos 1;\ndouble t = tan 0.5;\ndouble r = sqrt 4.0;\ndouble l = log exp 1.0;")?;
    assert!(ir.contains("call double @llvm.cos.f64("), "{ir}");
    assert!(ir.contains("call double @llvm.sin.f64("), "{ir}");
    assert!(ir.contains("call double @tan("), "{ir}");
    assert!(ir.contains("call double @llvm.sqrt.f64("), "{ir}");
    assert!(ir.contains("call double @llvm.exp.f64("), "{ir}");
    assert!(ir.contains("call double @llvm.log.f64("), "{ir}");
    Ok(())
}

#[test]
fn unary_negation_per_type() -> Result<()> {
    let ir = emit_ir("int i = 4;\nint j = -i;\ndouble d = 1.5;\ndouble m = -d;")?;
    assert!(ir.contains("sub i32 0"), "{ir}");
    assert!(ir.contains("fneg double"), "{ir}");
    Ok(())
}

#[test]
fn parse_errors_stop_before_codegen() {
    match compile_error("{ int x = 1;\nprint x;") {
        CompileError::Parse(ParseError::Expected { expected, .. }) => assert_eq!(expected, "`}`"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(compile_error("1 = 2;").kind(), "invalid-assignment-target");
    assert_eq!(compile_error("print \"open;").kind(), "lex");
}

#[test]
fn calls_are_reserved() {
    let at = Pos::new(1, 1);
    let program = Program {
        statements: vec![Stmt::Expression {
            expr: Expr::Call {
                callee: Box::new(Expr::Identifier {
                    name: "f".into(),
                    pos: at,
                }),
                args: vec![Expr::Int { value: 1, pos: at }],
                pos: at,
            },
            pos: at,
        }],
    };
    let ctx = LlvmContext::create();
    let mut codegen = Codegen::new(&ctx, "calls", &host_triple());
    let err = codegen.emit_program(&program).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Codegen(CodegenError::Unsupported { .. })
    ));
}

#[test]
fn emitted_module_defines_main() -> Result<()> {
    let ir = emit_ir("int x = 1;\nprint x;")?;
    assert!(ir.contains("define i32 @main()"), "{ir}");
    assert!(ir.contains("ret i32 0"), "{ir}");
    Ok(())
}
