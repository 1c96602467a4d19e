//! `&&` and `||` short-circuit by branching, not by a single instruction.
//! Koopa has no phi, so the result is materialized through a one-word
//! stack slot: store 0 (or 1), conditionally overwrite it, then load it
//! back at the join point.

use crate::ast::Expr;
use crate::emit;
use crate::error::CompileResult;
use crate::irgen::context::{LowerCtx, ValueHandle};
use crate::irgen::expr::lower_expr;

pub fn lower_and(ctx: &mut LowerCtx, lhs: &Expr, rhs: &Expr) -> CompileResult<ValueHandle> {
    let id = ctx.fresh_logic_id();
    let slot = format!("@andRes_{id}");
    let rhs_bb = format!("%and_rhs_{id}");
    let end_bb = format!("%and_end_{id}");

    emit!(ctx, "{slot} = alloc i32");
    emit!(ctx, "store 0, {slot}");
    let l = lower_expr(ctx, lhs)?;
    let ltrue = ctx.fresh_vreg();
    emit!(ctx, "{} = ne {}, 0", ltrue.text(), l.text());
    emit!(ctx, "br {}, {rhs_bb}, {end_bb}", ltrue.text());

    emit!(ctx, "{rhs_bb}:");
    let r = lower_expr(ctx, rhs)?;
    let rtrue = ctx.fresh_vreg();
    emit!(ctx, "{} = ne {}, 0", rtrue.text(), r.text());
    emit!(ctx, "store {}, {slot}", rtrue.text());
    emit!(ctx, "jump {end_bb}");

    emit!(ctx, "{end_bb}:");
    let result = ctx.fresh_vreg();
    emit!(ctx, "{} = load {slot}", result.text());
    Ok(result)
}

pub fn lower_or(ctx: &mut LowerCtx, lhs: &Expr, rhs: &Expr) -> CompileResult<ValueHandle> {
    let id = ctx.fresh_logic_id();
    let slot = format!("@orRes_{id}");
    let rhs_bb = format!("%or_rhs_{id}");
    let end_bb = format!("%or_end_{id}");

    emit!(ctx, "{slot} = alloc i32");
    emit!(ctx, "store 1, {slot}");
    let l = lower_expr(ctx, lhs)?;
    let ltrue = ctx.fresh_vreg();
    emit!(ctx, "{} = ne {}, 0", ltrue.text(), l.text());
    emit!(ctx, "br {}, {end_bb}, {rhs_bb}", ltrue.text());

    emit!(ctx, "{rhs_bb}:");
    let r = lower_expr(ctx, rhs)?;
    let rtrue = ctx.fresh_vreg();
    emit!(ctx, "{} = ne {}, 0", rtrue.text(), r.text());
    emit!(ctx, "store {}, {slot}", rtrue.text());
    emit!(ctx, "jump {end_bb}");

    emit!(ctx, "{end_bb}:");
    let result = ctx.fresh_vreg();
    emit!(ctx, "{} = load {slot}", result.text());
    Ok(result)
}
