//! Aggregate initializer shape recovery: flattens the brace-nested
//! `ConstInitVal`/`InitVal` trees SysY allows into row-major element
//! lists the size of the declared array, the same way a C initializer
//! list is allowed to under-nest and still bind to whole sub-arrays.
//!
//! A nested `{...}` at flat position `pos` binds to the *widest* aligned
//! sub-array boundary it can: the smallest `k` with `pos % w_k == 0`,
//! where `w_k` is the number of elements in a sub-array whose outermost
//! dimension is `dims[k]`. That sub-array is then zero-padded if the
//! brace group supplies fewer elements than it spans.

use crate::ast::{ConstInitVal, InitVal};
use crate::emit;
use crate::error::CompileResult;
use crate::irgen::context::{LowerCtx, ValueHandle};
use crate::irgen::expr::lower_expr;
use crate::sema::{eval_const, SymbolTableStack};

fn width(dims: &[usize], k: usize) -> usize {
    dims[k..].iter().product()
}

fn pick_level(dims: &[usize], pos: usize) -> usize {
    if dims.len() <= 1 {
        return dims.len();
    }
    (1..dims.len())
        .find(|&k| pos % width(dims, k) == 0)
        .unwrap_or(dims.len() - 1)
}

pub fn flatten_const_init(
    dims: &[usize],
    init: &ConstInitVal,
    symtab: &SymbolTableStack,
) -> CompileResult<Vec<i32>> {
    let total: usize = dims.iter().product::<usize>().max(1);
    let mut out = Vec::with_capacity(total);
    flatten_const_into(dims, init, symtab, &mut out)?;
    out.resize(total, 0);
    Ok(out)
}

fn flatten_const_into(
    dims: &[usize],
    init: &ConstInitVal,
    symtab: &SymbolTableStack,
    out: &mut Vec<i32>,
) -> CompileResult<()> {
    match init {
        ConstInitVal::Exp(e) => {
            out.push(eval_const(e, symtab)?);
            Ok(())
        }
        ConstInitVal::List(children) => {
            let start = out.len();
            for child in children {
                match child {
                    ConstInitVal::Exp(e) => out.push(eval_const(e, symtab)?),
                    ConstInitVal::List(_) => {
                        let pos = out.len() - start;
                        let k = pick_level(dims, pos);
                        let sub_dims = &dims[k..];
                        let w = width(dims, k);
                        let before = out.len();
                        flatten_const_into(sub_dims, child, symtab, out)?;
                        out.resize(before + w, 0);
                    }
                }
            }
            Ok(())
        }
    }
}

/// One slot of a local array's flattened initializer: either a literal
/// (the common case, or anything that happened to const-fold) or the
/// vreg a non-constant initializer expression was lowered into.
#[derive(Clone, Copy)]
pub enum InitElem {
    Const(i32),
    Dynamic(ValueHandle),
}

impl InitElem {
    pub fn text(&self) -> String {
        match self {
            InitElem::Const(v) => v.to_string(),
            InitElem::Dynamic(v) => v.text(),
        }
    }
}

/// Flattens a local (possibly non-constant) initializer, emitting IR for
/// each dynamic leaf the moment it is visited so evaluation order in the
/// source text matches evaluation order in the emitted instructions.
pub fn flatten_local_init(
    ctx: &mut LowerCtx,
    dims: &[usize],
    init: &InitVal,
) -> CompileResult<Vec<InitElem>> {
    let total: usize = dims.iter().product::<usize>().max(1);
    let mut out = Vec::with_capacity(total);
    flatten_local_into(ctx, dims, init, &mut out)?;
    out.resize(total, InitElem::Const(0));
    Ok(out)
}

fn flatten_local_into(
    ctx: &mut LowerCtx,
    dims: &[usize],
    init: &InitVal,
    out: &mut Vec<InitElem>,
) -> CompileResult<()> {
    match init {
        InitVal::Exp(e) => {
            let elem = match eval_const(e, &ctx.symtab) {
                Ok(v) => InitElem::Const(v),
                Err(_) => InitElem::Dynamic(lower_expr(ctx, e)?),
            };
            out.push(elem);
            Ok(())
        }
        InitVal::List(children) => {
            let start = out.len();
            for child in children {
                match child {
                    InitVal::Exp(e) => {
                        let elem = match eval_const(e, &ctx.symtab) {
                            Ok(v) => InitElem::Const(v),
                            Err(_) => InitElem::Dynamic(lower_expr(ctx, e)?),
                        };
                        out.push(elem);
                    }
                    InitVal::List(_) => {
                        let pos = out.len() - start;
                        let k = pick_level(dims, pos);
                        let sub_dims = &dims[k..];
                        let w = width(dims, k);
                        let before = out.len();
                        flatten_local_into(ctx, sub_dims, child, out)?;
                        out.resize(before + w, InitElem::Const(0));
                    }
                }
            }
            Ok(())
        }
    }
}

/// Koopa's nested array type syntax, innermost dimension first:
/// `[2, 3]` (row-major `a[2][3]`) becomes `[[i32, 3], 2]`.
pub fn array_type_text(dims: &[usize]) -> String {
    let mut ty = "i32".to_string();
    for &d in dims.iter().rev() {
        ty = format!("[{ty}, {d}]");
    }
    ty
}

/// Builds the textual nested-brace aggregate Koopa expects for a global
/// array's initializer, recovering the same nesting the element type
/// carries.
pub fn global_aggregate_text(flat: &[i32], dims: &[usize]) -> String {
    if dims.is_empty() {
        return flat[0].to_string();
    }
    let (&head, rest) = dims.split_first().unwrap();
    let chunk = flat.len() / head.max(1);
    let parts: Vec<String> = (0..head)
        .map(|i| global_aggregate_text(&flat[i * chunk..(i + 1) * chunk], rest))
        .collect();
    format!("{{{}}}", parts.join(", "))
}

/// Emits the recursive `getelemptr`+`store` chain that materializes a
/// local array's flattened initializer into its alloc'd storage.
pub fn emit_local_array_stores(
    ctx: &mut LowerCtx,
    base_addr: &str,
    flat: &[InitElem],
    dims: &[usize],
) {
    if dims.is_empty() {
        emit!(ctx, "store {}, {}", flat[0].text(), base_addr);
        return;
    }
    let (&head, rest) = dims.split_first().unwrap();
    let chunk = flat.len() / head.max(1);
    for i in 0..head {
        let dest = ctx.fresh_vreg();
        emit!(ctx, "{} = getelemptr {}, {}", dest.text(), base_addr, i);
        let slice = &flat[i * chunk..(i + 1) * chunk];
        emit_local_array_stores(ctx, &dest.text(), slice, rest);
    }
}
