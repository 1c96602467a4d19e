//! Statement lowering. Each function returns a [`Flow`] that tells its
//! caller whether control can still fall off the end of whatever basic
//! block it just emitted into, replacing the original's "RETURN" /
//! "WHILE_END" string sentinels with a real enum.

use crate::ast::Stmt;
use crate::emit;
use crate::error::{CompileError, CompileResult};
use crate::irgen::context::LowerCtx;
use crate::irgen::expr::lower_expr;
use crate::irgen::lval::lower_lval_address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continues,
    Terminated,
}

pub fn lower_stmt(ctx: &mut LowerCtx, stmt: &Stmt) -> CompileResult<Flow> {
    match stmt {
        Stmt::Assign(lval, rhs) => {
            let val = lower_expr(ctx, rhs)?;
            let addr = lower_lval_address(ctx, lval)?;
            emit!(ctx, "store {}, {}", val.text(), addr);
            Ok(Flow::Continues)
        }
        Stmt::ExprStmt(None) => Ok(Flow::Continues),
        Stmt::ExprStmt(Some(e)) => {
            lower_expr(ctx, e)?;
            Ok(Flow::Continues)
        }
        Stmt::Block(block) => crate::irgen::block::lower_block(ctx, block),
        Stmt::If(cond, then_branch, else_branch) => {
            lower_if(ctx, cond, then_branch, else_branch.as_deref())
        }
        Stmt::While(cond, body) => lower_while(ctx, cond, body),
        Stmt::Break { line } => {
            let id = ctx.current_loop().ok_or_else(|| CompileError::Syntax {
                line: *line,
                message: "'break' outside of a loop".into(),
            })?;
            emit!(ctx, "jump %while_end_{id}");
            Ok(Flow::Terminated)
        }
        Stmt::Continue { line } => {
            let id = ctx.current_loop().ok_or_else(|| CompileError::Syntax {
                line: *line,
                message: "'continue' outside of a loop".into(),
            })?;
            emit!(ctx, "jump %while_entry_{id}");
            Ok(Flow::Terminated)
        }
        Stmt::Return(value, _line) => {
            match value {
                Some(e) => {
                    let v = lower_expr(ctx, e)?;
                    emit!(ctx, "ret {}", v.text());
                }
                None => emit!(ctx, "ret"),
            }
            Ok(Flow::Terminated)
        }
    }
}

fn lower_if(
    ctx: &mut LowerCtx,
    cond: &crate::ast::Expr,
    then_branch: &Stmt,
    else_branch: Option<&Stmt>,
) -> CompileResult<Flow> {
    let id = ctx.fresh_if_id();
    let then_bb = format!("%if_then_{id}");
    let else_bb = format!("%if_else_{id}");
    let end_bb = format!("%if_end_{id}");

    let c = lower_expr(ctx, cond)?;
    let false_target = if else_branch.is_some() {
        &else_bb
    } else {
        &end_bb
    };
    emit!(ctx, "br {}, {}, {}", c.text(), then_bb, false_target);

    emit!(ctx, "{then_bb}:");
    let then_flow = crate::irgen::stmt::lower_stmt(ctx, then_branch)?;
    if then_flow == Flow::Continues {
        emit!(ctx, "jump {end_bb}");
    }

    let overall = if let Some(else_stmt) = else_branch {
        emit!(ctx, "{else_bb}:");
        let else_flow = lower_stmt(ctx, else_stmt)?;
        if else_flow == Flow::Continues {
            emit!(ctx, "jump {end_bb}");
        }
        if then_flow == Flow::Terminated && else_flow == Flow::Terminated {
            Flow::Terminated
        } else {
            Flow::Continues
        }
    } else {
        Flow::Continues
    };

    if overall == Flow::Continues {
        emit!(ctx, "{end_bb}:");
    }
    Ok(overall)
}

fn lower_while(
    ctx: &mut LowerCtx,
    cond: &crate::ast::Expr,
    body: &Stmt,
) -> CompileResult<Flow> {
    let id = ctx.fresh_while_id();
    let entry_bb = format!("%while_entry_{id}");
    let body_bb = format!("%while_body_{id}");
    let end_bb = format!("%while_end_{id}");

    emit!(ctx, "jump {entry_bb}");
    emit!(ctx, "{entry_bb}:");
    let c = lower_expr(ctx, cond)?;
    emit!(ctx, "br {}, {body_bb}, {end_bb}", c.text());

    emit!(ctx, "{body_bb}:");
    ctx.push_loop(id);
    let body_flow = lower_stmt(ctx, body)?;
    ctx.pop_loop();
    if body_flow == Flow::Continues {
        emit!(ctx, "jump {entry_bb}");
    }

    emit!(ctx, "{end_bb}:");
    // The false edge out of the condition always reaches `end_bb`, so a
    // while loop never terminates its enclosing block by itself.
    Ok(Flow::Continues)
}
