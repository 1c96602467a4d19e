use crate::ast::{BinOp, Decl, Expr, GlobalItem, Stmt};
use crate::parse_source;

#[test]
fn minimal_main_function() {
    let cu = parse_source("int main() { return 0; }").unwrap();
    assert_eq!(cu.items.len(), 1);
    let GlobalItem::FuncDef(f) = &cu.items[0] else {
        panic!("expected a function definition");
    };
    assert_eq!(f.name, "main");
    assert!(f.params.is_empty());
    assert_eq!(f.body.items.len(), 1);
}

#[test]
fn precedence_climbing_builds_expected_tree_shape() {
    // 1 + 2 * 3 should parse as 1 + (2 * 3), i.e. the outer node is '+'.
    let cu = parse_source("int main() { return 1 + 2 * 3; }").unwrap();
    let GlobalItem::FuncDef(f) = &cu.items[0] else {
        unreachable!()
    };
    let crate::ast::BlockItem::Stmt(Stmt::Return(Some(expr), _)) = &f.body.items[0] else {
        panic!("expected a return statement");
    };
    let Expr::Binary(op, lhs, rhs) = expr else {
        panic!("expected a binary expression");
    };
    assert_eq!(*op, BinOp::Add);
    assert!(matches!(**lhs, Expr::Number(1)));
    assert!(matches!(**rhs, Expr::Binary(BinOp::Mul, _, _)));
}

#[test]
fn dangling_else_attaches_to_nearest_if() {
    let cu = parse_source(
        "int main() { if (1) if (0) return 1; else return 2; return 3; }",
    )
    .unwrap();
    let GlobalItem::FuncDef(f) = &cu.items[0] else {
        unreachable!()
    };
    let crate::ast::BlockItem::Stmt(Stmt::If(_, then_branch, else_branch)) = &f.body.items[0]
    else {
        panic!("expected an if statement");
    };
    assert!(else_branch.is_none(), "outer if has no else of its own");
    assert!(matches!(**then_branch, Stmt::If(_, _, Some(_))));
}

#[test]
fn array_param_and_multi_dim_decl_parse() {
    let cu = parse_source(
        "int sum(int a[], int b[][4]) { int c[2][3] = {{1, 2, 3}, {4, 5, 6}}; return 0; }",
    )
    .unwrap();
    let GlobalItem::FuncDef(f) = &cu.items[0] else {
        unreachable!()
    };
    assert_eq!(f.params.len(), 2);
    assert!(f.params[0].array_dims.as_ref().unwrap().is_empty());
    assert_eq!(f.params[1].array_dims.as_ref().unwrap().len(), 1);

    let crate::ast::BlockItem::Decl(Decl::Var(defs)) = &f.body.items[0] else {
        panic!("expected a variable declaration");
    };
    assert_eq!(defs[0].dims.len(), 2);
}

#[test]
fn assignment_vs_bare_expression_statement_disambiguation() {
    let cu = parse_source("int main() { int x; x = 1; x; return x; }").unwrap();
    let GlobalItem::FuncDef(f) = &cu.items[0] else {
        unreachable!()
    };
    assert!(matches!(
        &f.body.items[1],
        crate::ast::BlockItem::Stmt(Stmt::Assign(..))
    ));
    assert!(matches!(
        &f.body.items[2],
        crate::ast::BlockItem::Stmt(Stmt::ExprStmt(Some(_)))
    ));
}

#[test]
fn missing_semicolon_is_a_syntax_error() {
    let err = parse_source("int main() { return 0 }").unwrap_err();
    assert!(matches!(err, crate::error::CompileError::Syntax { .. }));
}
