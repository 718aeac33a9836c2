use super::*;
use aria_ir::{BinaryOp, SymbolId, UnaryOp};
use pretty_assertions::assert_eq;

fn parse_ok(source: &str) -> ParseOutput {
    let output = parse(source);
    assert!(output.errors.is_empty(), "unexpected errors: {:?}", output.errors);
    output
}

fn decls(output: &ParseOutput) -> Vec<NodeId> {
    output.arena.list(output.program).collect()
}

fn messages(source: &str) -> Vec<String> {
    parse(source).errors.iter().map(ToString::to_string).collect()
}

/// Statements in the body of the first function of `output`.
fn body_of_first_function(output: &ParseOutput) -> Vec<NodeId> {
    let first = decls(output)[0];
    let NodeKind::FuncDecl { body, .. } = *output.arena.kind(first) else {
        panic!("expected function, got {:?}", output.arena.kind(first));
    };
    let NodeKind::Block { first } = *output.arena.kind(body) else {
        panic!("expected block body");
    };
    output.arena.list(first).collect()
}

// ─── Declarations ───

#[test]
fn test_var_with_binary_initializer() {
    let output = parse_ok("var x = 1 + 2;");
    let items = decls(&output);
    assert_eq!(items.len(), 1);

    let NodeKind::VarDecl {
        name,
        id,
        init: Some(init),
        managed,
    } = *output.arena.kind(items[0])
    else {
        panic!("expected var decl");
    };
    assert_eq!(output.arena.name(name), "x");
    assert_eq!(id, SymbolId::GLOBAL);
    assert!(!managed);

    let NodeKind::Binary { op, left, right } = *output.arena.kind(init) else {
        panic!("expected binary initializer");
    };
    assert_eq!(op, BinaryOp::Add);
    assert_eq!(output.arena.kind(left), &NodeKind::Int(1));
    assert_eq!(output.arena.kind(right), &NodeKind::Int(2));
}

#[test]
fn test_managed_var() {
    let output = parse_ok("managed var cache = null;");
    let item = decls(&output)[0];
    assert!(matches!(
        output.arena.kind(item),
        NodeKind::VarDecl { managed: true, .. }
    ));
}

#[test]
fn test_main_is_renamed() {
    let output = parse_ok("func main() { return 0; }");
    let NodeKind::FuncDecl {
        name, source_name, ..
    } = *output.arena.kind(decls(&output)[0])
    else {
        panic!("expected function");
    };
    assert_eq!(output.arena.name(name), "aria_main");
    assert_eq!(output.arena.name(source_name), "main");
}

#[test]
fn test_function_params_are_locals() {
    let output = parse_ok("func f(a, b) { return a; }");
    let NodeKind::FuncDecl {
        params,
        arity,
        body,
        ..
    } = *output.arena.kind(decls(&output)[0])
    else {
        panic!("expected function");
    };
    assert_eq!(arity, 2);
    let ids: Vec<SymbolId> = output
        .arena
        .list(params)
        .map(|p| match *output.arena.kind(p) {
            NodeKind::Var { id, .. } => id,
            ref other => panic!("unexpected param {other:?}"),
        })
        .collect();
    assert_eq!(ids, vec![SymbolId::local(1), SymbolId::local(2)]);

    let NodeKind::Block { first } = *output.arena.kind(body) else {
        panic!("expected block");
    };
    let ret = first.unwrap();
    let NodeKind::Return { value: Some(value) } = *output.arena.kind(ret) else {
        panic!("expected return");
    };
    assert!(matches!(
        output.arena.kind(value),
        NodeKind::Var { id, .. } if *id == SymbolId::local(1)
    ));
}

#[test]
fn test_class_methods_are_mangled_with_this() {
    let output = parse_ok("class Point { func norm() { return this; } func scale(k) { return k; } }");
    let NodeKind::ClassDecl { name, methods } = *output.arena.kind(decls(&output)[0]) else {
        panic!("expected class");
    };
    assert_eq!(output.arena.name(name), "Point");

    let methods: Vec<NodeId> = output.arena.list(methods).collect();
    assert_eq!(methods.len(), 2);
    let NodeKind::FuncDecl {
        name,
        source_name,
        arity,
        params,
        ..
    } = *output.arena.kind(methods[1])
    else {
        panic!("expected method");
    };
    assert_eq!(output.arena.name(name), "Point_scale");
    assert_eq!(output.arena.name(source_name), "scale");
    assert_eq!(arity, 2);
    let NodeKind::Var { name: this, .. } = *output.arena.kind(params.unwrap()) else {
        panic!("expected this param");
    };
    assert_eq!(output.arena.name(this), "this");
}

#[test]
fn test_unresolved_call_target() {
    let output = parse_ok("func f(a) { return a; } func main() { return f(5); }");
    let body = body_of_first_function(&output);
    assert_eq!(body.len(), 1);

    let NodeKind::FuncDecl { body, .. } = *output.arena.kind(decls(&output)[1]) else {
        panic!("expected main");
    };
    let NodeKind::Block { first } = *output.arena.kind(body) else {
        panic!("expected block");
    };
    let NodeKind::Return { value: Some(call) } = *output.arena.kind(first.unwrap()) else {
        panic!("expected return");
    };
    let NodeKind::Call { callee, argc, args } = *output.arena.kind(call) else {
        panic!("expected call");
    };
    assert_eq!(argc, 1);
    assert_eq!(output.arena.kind(args.unwrap()), &NodeKind::Int(5));
    assert!(matches!(
        output.arena.kind(callee),
        NodeKind::Var { id, .. } if id.is_unresolved()
    ));
}

// ─── Expressions ───

#[test]
fn test_precedence_and_associativity() {
    let output = parse_ok("var x = 1 - 2 - 3 * 4;");
    let NodeKind::VarDecl { init: Some(init), .. } = *output.arena.kind(decls(&output)[0]) else {
        panic!("expected var");
    };
    // (1 - 2) - (3 * 4)
    let NodeKind::Binary {
        op: BinaryOp::Sub,
        left,
        right,
    } = *output.arena.kind(init)
    else {
        panic!("expected subtraction");
    };
    assert!(matches!(
        output.arena.kind(left),
        NodeKind::Binary { op: BinaryOp::Sub, .. }
    ));
    assert!(matches!(
        output.arena.kind(right),
        NodeKind::Binary { op: BinaryOp::Mul, .. }
    ));
}

#[test]
fn test_unary_and_logical() {
    let output = parse_ok("var x = !a && -b || c;");
    let NodeKind::VarDecl { init: Some(init), .. } = *output.arena.kind(decls(&output)[0]) else {
        panic!("expected var");
    };
    let NodeKind::Binary {
        op: BinaryOp::Or,
        left,
        ..
    } = *output.arena.kind(init)
    else {
        panic!("expected ||");
    };
    let NodeKind::Binary {
        op: BinaryOp::And,
        left: not,
        right: neg,
    } = *output.arena.kind(left)
    else {
        panic!("expected &&");
    };
    assert!(matches!(
        output.arena.kind(not),
        NodeKind::Unary { op: UnaryOp::Not, .. }
    ));
    assert!(matches!(
        output.arena.kind(neg),
        NodeKind::Unary { op: UnaryOp::Neg, .. }
    ));
}

#[test]
fn test_ternary_forms() {
    for source in ["var x = a ? 1 : 2;", "var x = a is 1 : 2;"] {
        let output = parse_ok(source);
        let NodeKind::VarDecl { init: Some(init), .. } = *output.arena.kind(decls(&output)[0])
        else {
            panic!("expected var");
        };
        let NodeKind::Ternary {
            then_expr,
            else_expr,
            ..
        } = *output.arena.kind(init)
        else {
            panic!("expected ternary for {source}");
        };
        assert_eq!(output.arena.kind(then_expr), &NodeKind::Int(1));
        assert_eq!(output.arena.kind(else_expr), &NodeKind::Int(2));
    }
}

#[test]
fn test_literals() {
    let output = parse_ok(r#"var a = 0x10; var b = 0b11; var c = 2.5; var d = "hi\n"; var e = [1, true, null];"#);
    let inits: Vec<NodeKind> = decls(&output)
        .into_iter()
        .map(|d| match *output.arena.kind(d) {
            NodeKind::VarDecl { init: Some(init), .. } => output.arena.kind(init).clone(),
            ref other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(inits[0], NodeKind::Int(16));
    assert_eq!(inits[1], NodeKind::Int(3));
    assert_eq!(inits[2], NodeKind::Float(2.5));
    let NodeKind::Str(text) = inits[3] else {
        panic!("expected string");
    };
    assert_eq!(output.arena.name(text), "hi\n");
    let NodeKind::Array { elements, count } = inits[4] else {
        panic!("expected array");
    };
    assert_eq!(count, 3);
    assert_eq!(output.arena.list(elements).count(), 3);
}

#[test]
fn test_compound_assignment_lowering() {
    let output = parse_ok("func f() { var n = 1; n += 2; }");
    let body = body_of_first_function(&output);
    let NodeKind::Assign { id, value, .. } = *output.arena.kind(body[1]) else {
        panic!("expected assignment");
    };
    assert_eq!(id, SymbolId::local(1));
    let NodeKind::Binary {
        op: BinaryOp::Add,
        left,
        right,
    } = *output.arena.kind(value)
    else {
        panic!("expected add");
    };
    assert!(matches!(output.arena.kind(left), NodeKind::Var { id, .. } if *id == SymbolId::local(1)));
    assert_eq!(output.arena.kind(right), &NodeKind::Int(2));
}

#[test]
fn test_property_and_index_access() {
    let output = parse_ok("func f(o) { o.x = o.y; o[0] = o[1]; }");
    let body = body_of_first_function(&output);
    let NodeKind::Set { value, .. } = *output.arena.kind(body[0]) else {
        panic!("expected set");
    };
    assert!(matches!(output.arena.kind(value), NodeKind::Get { .. }));
    let NodeKind::IndexSet { value, .. } = *output.arena.kind(body[1]) else {
        panic!("expected index set");
    };
    assert!(matches!(output.arena.kind(value), NodeKind::IndexGet { .. }));
}

#[test]
fn test_method_call_and_new() {
    let output = parse_ok("class C { func m() { return 1; } } func main() { var c = new C(); c.m(); }");
    let NodeKind::FuncDecl { body, .. } = *output.arena.kind(decls(&output)[1]) else {
        panic!("expected main");
    };
    let NodeKind::Block { first } = *output.arena.kind(body) else {
        panic!("expected block");
    };
    let stmts: Vec<NodeId> = output.arena.list(first).collect();
    let NodeKind::VarDecl { init: Some(init), .. } = *output.arena.kind(stmts[0]) else {
        panic!("expected var");
    };
    assert!(matches!(output.arena.kind(init), NodeKind::New { .. }));
    let NodeKind::Call { callee, argc: 0, .. } = *output.arena.kind(stmts[1]) else {
        panic!("expected call");
    };
    assert!(matches!(output.arena.kind(callee), NodeKind::Get { .. }));
}

// ─── Statements ───

#[test]
fn test_for_desugars_to_block_with_while() {
    let output = parse_ok("func f() { for (var i = 0; i < 3; i += 1) { print(i); } }");
    let body = body_of_first_function(&output);
    let NodeKind::Block { first } = *output.arena.kind(body[0]) else {
        panic!("expected desugared block");
    };
    let stmts: Vec<NodeId> = output.arena.list(first).collect();
    assert_eq!(stmts.len(), 2);
    assert!(matches!(output.arena.kind(stmts[0]), NodeKind::VarDecl { .. }));
    let NodeKind::While {
        cond,
        step: Some(step),
        ..
    } = *output.arena.kind(stmts[1])
    else {
        panic!("expected while with step");
    };
    assert!(matches!(
        output.arena.kind(cond),
        NodeKind::Binary { op: BinaryOp::Lt, .. }
    ));
    assert!(matches!(output.arena.kind(step), NodeKind::Assign { .. }));
}

#[test]
fn test_for_without_condition_loops_on_true() {
    let output = parse_ok("func f() { for (;;) { break; } }");
    let body = body_of_first_function(&output);
    let NodeKind::Block { first } = *output.arena.kind(body[0]) else {
        panic!("expected block");
    };
    let NodeKind::While { cond, step, .. } = *output.arena.kind(first.unwrap()) else {
        panic!("expected while");
    };
    assert_eq!(output.arena.kind(cond), &NodeKind::Bool(true));
    assert_eq!(step, None);
}

#[test]
fn test_if_else_and_while() {
    let output = parse_ok("func f(x) { if (x) { return 1; } else return 2; while (x) { continue; } }");
    let body = body_of_first_function(&output);
    assert!(matches!(
        output.arena.kind(body[0]),
        NodeKind::If { else_branch: Some(_), .. }
    ));
    assert!(matches!(
        output.arena.kind(body[1]),
        NodeKind::While { step: None, .. }
    ));
}

#[test]
fn test_block_scoped_locals() {
    let output = parse_ok("func f() { var a = 1; { var a = 2; } return a; }");
    let body = body_of_first_function(&output);
    let NodeKind::Return { value: Some(value) } = *output.arena.kind(body[2]) else {
        panic!("expected return");
    };
    assert!(matches!(output.arena.kind(value), NodeKind::Var { id, .. } if *id == SymbolId::local(1)));
}

#[test]
fn test_global_reference_resolves_to_global() {
    let output = parse_ok("var g = 1; func f() { return g; } func h() { return later; } var later = 2;");
    let items = decls(&output);
    let NodeKind::FuncDecl { body, .. } = *output.arena.kind(items[1]) else {
        panic!("expected function");
    };
    let NodeKind::Block { first } = *output.arena.kind(body) else {
        panic!("expected block");
    };
    let NodeKind::Return { value: Some(value) } = *output.arena.kind(first.unwrap()) else {
        panic!("expected return");
    };
    assert!(matches!(output.arena.kind(value), NodeKind::Var { id, .. } if id.is_global()));

    // Forward references stay unresolved; codegen maps them onto the global.
    let NodeKind::FuncDecl { body, .. } = *output.arena.kind(items[2]) else {
        panic!("expected function");
    };
    let NodeKind::Block { first } = *output.arena.kind(body) else {
        panic!("expected block");
    };
    let NodeKind::Return { value: Some(value) } = *output.arena.kind(first.unwrap()) else {
        panic!("expected return");
    };
    assert!(matches!(output.arena.kind(value), NodeKind::Var { id, .. } if id.is_unresolved()));
}

// ─── Errors ───

#[test]
fn test_duplicate_declaration_continues() {
    let output = parse("func f() { var a = 1; var a = 2; var b = 3; }");
    assert_eq!(output.errors.len(), 1);
    assert_eq!(
        output.errors[0].to_string(),
        "[line 1] Error at 'a': Variable 'a' already declared in this scope."
    );
    // The rest of the block still parsed.
    let body = body_of_first_function(&output);
    assert_eq!(body.len(), 3);
    let ids: Vec<SymbolId> = body
        .iter()
        .map(|&s| match *output.arena.kind(s) {
            NodeKind::VarDecl { id, .. } => id,
            ref other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(
        ids,
        vec![SymbolId::local(1), SymbolId::local(1), SymbolId::local(2)]
    );
}

#[test]
fn test_duplicate_declaration_keeps_later_syntax_errors() {
    assert_eq!(
        messages("func f() { var x = 1; var x = (; }"),
        vec![
            "[line 1] Error at 'x': Variable 'x' already declared in this scope.".to_owned(),
            "[line 1] Error at ';': Expect expression.".to_owned(),
        ]
    );
}

#[test]
fn test_duplicate_parameter_keeps_later_syntax_errors() {
    let errors = messages("func f(a, a) { return a }");
    assert_eq!(
        errors[..2].to_vec(),
        vec![
            "[line 1] Error at 'a': Variable 'a' already declared in this scope.".to_owned(),
            "[line 1] Error at '}': Expect ';' after return value.".to_owned(),
        ]
    );
}

#[test]
fn test_duplicate_declaration_does_not_skip_block_end() {
    let output = parse("func f(a, a) { return a; } func g() { return 1; }");
    assert_eq!(output.errors.len(), 1);
    assert_eq!(decls(&output).len(), 2);
}

#[test]
fn test_local_read_in_own_initializer() {
    assert_eq!(
        messages("func f() { var x = x; }"),
        vec!["[line 1] Error at 'x': Can't read local variable in its own initializer.".to_owned()]
    );
    assert_eq!(
        messages("func f() { var y = 1; { var y = y + 1; } }"),
        vec!["[line 1] Error at 'y': Can't read local variable in its own initializer.".to_owned()]
    );
}

#[test]
fn test_initialized_locals_and_globals_are_readable() {
    parse_ok("var g = g; func f(a) { var x = a; var y = x + 1; return y; }");
    parse_ok("class C { func m() { var self = this; return self; } }");
    parse_ok("func f() { for (var i = 0; i < 3; i += 1) { var j = i; } }");
}

#[test]
fn test_missing_expression() {
    assert_eq!(
        messages("var x = ;"),
        vec!["[line 1] Error at ';': Expect expression.".to_owned()]
    );
}

#[test]
fn test_error_at_end() {
    assert_eq!(
        messages("func f() {"),
        vec!["[line 1] Error at end: Expect '}' after block.".to_owned()]
    );
}

#[test]
fn test_invalid_assignment_target() {
    assert_eq!(
        messages("func f(a, b) { a + b = 3; }"),
        vec!["[line 1] Error at '3': Invalid assignment target.".to_owned()]
    );
}

#[test]
fn test_break_outside_loop() {
    assert_eq!(
        messages("func f() { break; }"),
        vec!["[line 1] Error at 'break': Can't use 'break' outside of a loop.".to_owned()]
    );
    assert!(messages("func f() { while (true) { if (x) break; } }").is_empty());
}

#[test]
fn test_integer_out_of_range() {
    assert_eq!(
        messages("var x = 99999999999999999999;"),
        vec!["[line 1] Error at '99999999999999999999': Integer literal out of range.".to_owned()]
    );
}

#[test]
fn test_statement_at_top_level() {
    let errors = messages("print(1);\nfunc main() { }");
    assert_eq!(errors, vec!["[line 1] Error at 'print': Expect declaration.".to_owned()]);
}

#[test]
fn test_lexical_error_reported_and_recovered() {
    let output = parse("var a = 1 @ 2;\nvar b = 3;");
    assert_eq!(
        output.errors[0].to_string(),
        "[line 1] Error: Unexpected character."
    );
    // Recovery reaches the second declaration.
    let last = decls(&output).into_iter().last().unwrap();
    let NodeKind::VarDecl { name, .. } = *output.arena.kind(last) else {
        panic!("expected var");
    };
    assert_eq!(output.arena.name(name), "b");
}

#[test]
fn test_multiple_errors_collected() {
    let output = parse("var a = ;\nvar b = ;\nvar c = 1;");
    assert_eq!(output.errors.len(), 2);
    assert_eq!(output.errors[1].line, 2);
    assert!(output.has_errors());
}

#[test]
fn test_deeply_nested_parentheses() {
    let depth = 5_000;
    let source = format!("var x = {}1{};", "(".repeat(depth), ")".repeat(depth));
    let output = parse_ok(&source);
    assert_eq!(decls(&output).len(), 1);
}
