//! Expression lowering. `&&`/`||` are handled separately in
//! [`crate::irgen::shortcircuit`] since they need control flow, not a
//! single binary instruction.

use crate::ast::{BinOp, Expr, UnaryOp};
use crate::emit;
use crate::error::{CompileError, CompileResult};
use crate::irgen::context::{LowerCtx, ValueHandle};
use crate::irgen::lval::{lower_lval_load, LValResult};
use crate::irgen::shortcircuit::{lower_and, lower_or};
use crate::sema::symbol_table::SymbolKind;

pub fn lower_expr(ctx: &mut LowerCtx, expr: &Expr) -> CompileResult<ValueHandle> {
    match expr {
        Expr::Number(v) => Ok(ValueHandle::Literal(*v)),
        Expr::Unary(op, inner) => lower_unary(ctx, *op, inner),
        Expr::Binary(BinOp::And, lhs, rhs) => lower_and(ctx, lhs, rhs),
        Expr::Binary(BinOp::Or, lhs, rhs) => lower_or(ctx, lhs, rhs),
        Expr::Binary(op, lhs, rhs) => lower_binary(ctx, *op, lhs, rhs),
        Expr::LVal(lval) => match lower_lval_load(ctx, lval)? {
            LValResult::Scalar(v) => Ok(v),
            LValResult::ArrayAddr(v) => Ok(v),
        },
        Expr::Call(name, args, line) => lower_call(ctx, name, args, *line),
    }
}

/// Lowers an expression used as a call argument. Under-indexed
/// array/pointer lvalues decay to an address here rather than being
/// forced through a (meaningless) full load.
pub fn lower_call_arg(ctx: &mut LowerCtx, expr: &Expr) -> CompileResult<ValueHandle> {
    if let Expr::LVal(lval) = expr {
        return match lower_lval_load(ctx, lval)? {
            LValResult::Scalar(v) | LValResult::ArrayAddr(v) => Ok(v),
        };
    }
    lower_expr(ctx, expr)
}

fn lower_unary(ctx: &mut LowerCtx, op: UnaryOp, inner: &Expr) -> CompileResult<ValueHandle> {
    let v = lower_expr(ctx, inner)?;
    match op {
        UnaryOp::Pos => Ok(v),
        UnaryOp::Neg => {
            let dest = ctx.fresh_vreg();
            emit!(ctx, "{} = sub 0, {}", dest.text(), v.text());
            Ok(dest)
        }
        UnaryOp::Not => {
            let dest = ctx.fresh_vreg();
            emit!(ctx, "{} = eq {}, 0", dest.text(), v.text());
            Ok(dest)
        }
    }
}

fn lower_binary(
    ctx: &mut LowerCtx,
    op: BinOp,
    lhs: &Expr,
    rhs: &Expr,
) -> CompileResult<ValueHandle> {
    let l = lower_expr(ctx, lhs)?;
    let r = lower_expr(ctx, rhs)?;
    let opcode = match op {
        BinOp::Add => "add",
        BinOp::Sub => "sub",
        BinOp::Mul => "mul",
        BinOp::Div => "div",
        BinOp::Mod => "mod",
        BinOp::Lt => "lt",
        BinOp::Gt => "gt",
        BinOp::Le => "le",
        BinOp::Ge => "ge",
        BinOp::Eq => "eq",
        BinOp::Ne => "ne",
        BinOp::And | BinOp::Or => unreachable!("short-circuit ops handled separately"),
    };
    let dest = ctx.fresh_vreg();
    emit!(ctx, "{} = {} {}, {}", dest.text(), opcode, l.text(), r.text());
    Ok(dest)
}

fn lower_call(
    ctx: &mut LowerCtx,
    name: &str,
    args: &[Expr],
    line: usize,
) -> CompileResult<ValueHandle> {
    let sym = ctx.symtab.lookup_or_err(name)?.clone();
    let is_void = match sym.kind {
        SymbolKind::IntFunc => false,
        SymbolKind::VoidFunc => true,
        _ => {
            return Err(CompileError::Syntax {
                line,
                message: format!("'{name}' is not callable"),
            })
        }
    };
    let mut arg_vals = Vec::with_capacity(args.len());
    for a in args {
        arg_vals.push(lower_call_arg(ctx, a)?);
    }
    let arg_text = arg_vals
        .iter()
        .map(ValueHandle::text)
        .collect::<Vec<_>>()
        .join(", ");
    if is_void {
        emit!(ctx, "call @{}({})", name, arg_text);
        Ok(ValueHandle::Literal(0))
    } else {
        let dest = ctx.fresh_vreg();
        emit!(ctx, "{} = call @{}({})", dest.text(), name, arg_text);
        Ok(dest)
    }
}
