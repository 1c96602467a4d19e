use crate::ast::{ConstInitVal, Decl, GlobalItem};
use crate::parse_source;
use crate::sema::{eval_const, SymbolTableStack};

fn eval(expr_src: &str) -> i32 {
    let cu = parse_source(&format!("const int _x = {expr_src};")).unwrap();
    let GlobalItem::Decl(Decl::Const(defs)) = &cu.items[0] else {
        panic!("expected a const declaration");
    };
    let ConstInitVal::Exp(expr) = &defs[0].init else {
        panic!("expected a scalar initializer");
    };
    eval_const(expr, &SymbolTableStack::new()).unwrap()
}

#[test]
fn arithmetic_folds() {
    assert_eq!(eval("1 + 2 * 3"), 7);
    assert_eq!(eval("(1 + 2) * 3"), 9);
    assert_eq!(eval("7 / 2"), 3);
    assert_eq!(eval("-7 / 2"), -3); // truncating division, not floor
    assert_eq!(eval("7 % 3"), 1);
}

#[test]
fn comparisons_and_logic_fold_to_zero_or_one() {
    assert_eq!(eval("1 < 2"), 1);
    assert_eq!(eval("1 > 2"), 0);
    assert_eq!(eval("1 == 1 && 2 == 2"), 1);
    assert_eq!(eval("0 || 0"), 0);
    assert_eq!(eval("!0"), 1);
}

#[test]
fn short_circuit_and_skips_division_by_zero() {
    // If '&&' evaluated the right-hand side unconditionally this would
    // fail with a division-by-zero NotConstant error instead of folding.
    assert_eq!(eval("0 && (1 / 0)"), 0);
    assert_eq!(eval("1 || (1 / 0)"), 1);
}

#[test]
fn division_by_zero_is_not_constant() {
    let cu = parse_source("const int _x = 1 / 0;").unwrap();
    let GlobalItem::Decl(Decl::Const(defs)) = &cu.items[0] else {
        unreachable!()
    };
    let ConstInitVal::Exp(expr) = &defs[0].init else {
        unreachable!()
    };
    let err = eval_const(expr, &SymbolTableStack::new()).unwrap_err();
    assert!(matches!(err, crate::error::CompileError::NotConstant { .. }));
}

#[test]
fn referencing_a_prior_const_folds_through() {
    let cu = parse_source("const int a = 3; const int b = a * a;").unwrap();
    let mut symtab = SymbolTableStack::new();
    for item in &cu.items {
        let GlobalItem::Decl(Decl::Const(defs)) = item else {
            unreachable!()
        };
        for def in defs {
            let ConstInitVal::Exp(expr) = &def.init else {
                unreachable!()
            };
            let v = eval_const(expr, &symtab).unwrap();
            symtab
                .insert(&def.name, crate::sema::SymbolKind::ConstScalar(v))
                .unwrap();
        }
    }
    assert_eq!(
        symtab.lookup("b").map(|s| match &s.kind {
            crate::sema::SymbolKind::ConstScalar(v) => *v,
            _ => unreachable!(),
        }),
        Some(9)
    );
}
