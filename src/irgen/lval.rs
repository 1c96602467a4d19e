//! Lowers `LVal` uses. The same index-chain walk serves three different
//! callers - ordinary reads, assignment targets, and array arguments
//! passed by decayed pointer - so it lives in one place and each caller
//! picks the right tail step (load, nothing, or a decaying `getelemptr`).

use crate::ast::{Expr, LVal};
use crate::emit;
use crate::error::{CompileError, CompileResult};
use crate::irgen::context::{mangled, LowerCtx, ValueHandle};
use crate::irgen::expr::lower_expr;
use crate::sema::symbol_table::SymbolKind;

pub enum LValResult {
    /// A fully-indexed scalar value, already loaded.
    Scalar(ValueHandle),
    /// A pointer value - an under-indexed array/pointer used where an
    /// address is acceptable (function call arguments).
    ArrayAddr(ValueHandle),
}

/// The instruction a trailing zero-index decay must use to turn an
/// under-indexed chain result into the pointer a call argument expects.
/// An array (or a pointer chain that has already taken at least one
/// `getptr`/`getelemptr` step) is still array-shaped, so it decays with
/// `getelemptr`. A pointer chain with *no* steps taken is the bare
/// loaded pointer value itself - its pointee is not an array type, so
/// the matching decay is `getptr`, not `getelemptr`.
#[derive(Clone, Copy, PartialEq, Eq)]
enum DecayOp {
    GetElemPtr,
    GetPtr,
}

impl DecayOp {
    fn text(self) -> &'static str {
        match self {
            DecayOp::GetElemPtr => "getelemptr",
            DecayOp::GetPtr => "getptr",
        }
    }
}

/// Walks the index chain for an array-typed or pointer-typed symbol and
/// returns the address of the innermost indexed element, plus whether
/// every declared dimension was consumed.
struct Chain {
    addr: String,
    fully_indexed: bool,
    decay_op: DecayOp,
}

fn array_chain(
    ctx: &mut LowerCtx,
    name: &str,
    base: &str,
    arity: usize,
    indices: &[Expr],
) -> CompileResult<Chain> {
    if indices.len() > arity {
        return Err(CompileError::DimensionMismatch {
            name: name.to_string(),
            expected: arity,
            got: indices.len(),
        });
    }
    let mut cur = base.to_string();
    for idx_expr in indices {
        let idx = lower_expr(ctx, idx_expr)?;
        let dest = ctx.fresh_vreg();
        emit!(ctx, "{} = getelemptr {}, {}", dest.text(), cur, idx.text());
        cur = dest.text();
    }
    Ok(Chain {
        addr: cur,
        fully_indexed: indices.len() == arity,
        // An array's own storage is array-shaped no matter how many
        // dimensions have been indexed into so far.
        decay_op: DecayOp::GetElemPtr,
    })
}

fn pointer_chain(
    ctx: &mut LowerCtx,
    name: &str,
    base: &str,
    inner_arity: usize,
    indices: &[Expr],
) -> CompileResult<Chain> {
    let arity = inner_arity + 1;
    if indices.len() > arity {
        return Err(CompileError::DimensionMismatch {
            name: name.to_string(),
            expected: arity,
            got: indices.len(),
        });
    }
    if indices.is_empty() {
        let loaded = ctx.fresh_vreg();
        emit!(ctx, "{} = load {}", loaded.text(), base);
        return Ok(Chain {
            addr: loaded.text(),
            fully_indexed: false,
            // No `getptr`/`getelemptr` step has run yet: `loaded` is the
            // bare pointer value, not an array-shaped address.
            decay_op: DecayOp::GetPtr,
        });
    }
    let ptr_val = ctx.fresh_vreg();
    emit!(ctx, "{} = load {}", ptr_val.text(), base);
    let first = lower_expr(ctx, &indices[0])?;
    let head = ctx.fresh_vreg();
    emit!(
        ctx,
        "{} = getptr {}, {}",
        head.text(),
        ptr_val.text(),
        first.text()
    );
    let mut cur = head.text();
    for idx_expr in &indices[1..] {
        let idx = lower_expr(ctx, idx_expr)?;
        let dest = ctx.fresh_vreg();
        emit!(ctx, "{} = getelemptr {}, {}", dest.text(), cur, idx.text());
        cur = dest.text();
    }
    Ok(Chain {
        addr: cur,
        fully_indexed: indices.len() == arity,
        // At least one step has already run, so `cur` is array-shaped.
        decay_op: DecayOp::GetElemPtr,
    })
}

fn chain_for(ctx: &mut LowerCtx, lval: &LVal) -> CompileResult<(Chain, SymbolKind)> {
    let sym = ctx.symtab.lookup_or_err(&lval.name)?.clone();
    let base = mangled(&lval.name, sym.scope_id);
    let chain = match &sym.kind {
        SymbolKind::ConstArray { dims, .. } | SymbolKind::VarArray { dims } => {
            array_chain(ctx, &lval.name, &base, dims.len(), &lval.indices)?
        }
        SymbolKind::Pointer { inner_dims } => {
            pointer_chain(ctx, &lval.name, &base, inner_dims.len(), &lval.indices)?
        }
        _ => unreachable!("only array/pointer symbols reach chain_for"),
    };
    Ok((chain, sym.kind))
}

/// Reads the value an lvalue denotes: a scalar if it is fully indexed,
/// otherwise the decayed pointer to what remains.
pub fn lower_lval_load(ctx: &mut LowerCtx, lval: &LVal) -> CompileResult<LValResult> {
    let sym = ctx.symtab.lookup_or_err(&lval.name)?.clone();
    let base = mangled(&lval.name, sym.scope_id);
    match &sym.kind {
        SymbolKind::ConstScalar(v) => {
            check_scalar_indices(&lval.name, &lval.indices)?;
            Ok(LValResult::Scalar(ValueHandle::Literal(*v)))
        }
        SymbolKind::VarScalar => {
            check_scalar_indices(&lval.name, &lval.indices)?;
            let dest = ctx.fresh_vreg();
            emit!(ctx, "{} = load {}", dest.text(), base);
            Ok(LValResult::Scalar(dest))
        }
        SymbolKind::IntFunc | SymbolKind::VoidFunc => Err(CompileError::NotConstant {
            context: format!("'{}' names a function, not a variable", lval.name),
        }),
        SymbolKind::ConstArray { .. } | SymbolKind::VarArray { .. } | SymbolKind::Pointer { .. } => {
            let (chain, _) = chain_for(ctx, lval)?;
            if chain.fully_indexed {
                let dest = ctx.fresh_vreg();
                emit!(ctx, "{} = load {}", dest.text(), chain.addr);
                Ok(LValResult::Scalar(dest))
            } else {
                let dest = ctx.fresh_vreg();
                emit!(
                    ctx,
                    "{} = {} {}, 0",
                    dest.text(),
                    chain.decay_op.text(),
                    chain.addr
                );
                Ok(LValResult::ArrayAddr(dest))
            }
        }
    }
}

/// Computes the address an assignment should store into. Only scalars
/// (fully-indexed or bare) are ever valid assignment targets.
pub fn lower_lval_address(ctx: &mut LowerCtx, lval: &LVal) -> CompileResult<String> {
    let sym = ctx.symtab.lookup_or_err(&lval.name)?.clone();
    let base = mangled(&lval.name, sym.scope_id);
    match &sym.kind {
        SymbolKind::ConstScalar(_) => Err(CompileError::NotConstant {
            context: format!("cannot assign to const '{}'", lval.name),
        }),
        SymbolKind::VarScalar => {
            check_scalar_indices(&lval.name, &lval.indices)?;
            Ok(base)
        }
        SymbolKind::IntFunc | SymbolKind::VoidFunc => Err(CompileError::NotConstant {
            context: format!("'{}' names a function, not a variable", lval.name),
        }),
        SymbolKind::ConstArray { .. } | SymbolKind::VarArray { .. } | SymbolKind::Pointer { .. } => {
            let (chain, _) = chain_for(ctx, lval)?;
            if !chain.fully_indexed {
                return Err(CompileError::DimensionMismatch {
                    name: lval.name.to_string(),
                    expected: sym.kind.index_arity().unwrap_or(0),
                    got: lval.indices.len(),
                });
            }
            Ok(chain.addr)
        }
    }
}

fn check_scalar_indices(name: &str, indices: &[Expr]) -> CompileResult<()> {
    if indices.is_empty() {
        Ok(())
    } else {
        Err(CompileError::DimensionMismatch {
            name: name.to_string(),
            expected: 0,
            got: indices.len(),
        })
    }
}
