//! Recursive constant folding. SysY constants are plain two's-complement
//! `i32` arithmetic with truncating division/remainder and short-circuit
//! `&&`/`||`, exactly C's semantics restricted to `int`.

use crate::ast::{BinOp, Expr, UnaryOp};
use crate::error::{CompileError, CompileResult};
use crate::sema::symbol_table::SymbolKind;
use crate::sema::SymbolTableStack;

pub fn eval_const(expr: &Expr, symtab: &SymbolTableStack) -> CompileResult<i32> {
    match expr {
        Expr::Number(v) => Ok(*v),
        Expr::Unary(op, inner) => {
            let v = eval_const(inner, symtab)?;
            Ok(match op {
                UnaryOp::Pos => v,
                UnaryOp::Neg => v.wrapping_neg(),
                UnaryOp::Not => (v == 0) as i32,
            })
        }
        Expr::Binary(BinOp::And, lhs, rhs) => {
            let l = eval_const(lhs, symtab)?;
            if l == 0 {
                Ok(0)
            } else {
                Ok((eval_const(rhs, symtab)? != 0) as i32)
            }
        }
        Expr::Binary(BinOp::Or, lhs, rhs) => {
            let l = eval_const(lhs, symtab)?;
            if l != 0 {
                Ok(1)
            } else {
                Ok((eval_const(rhs, symtab)? != 0) as i32)
            }
        }
        Expr::Binary(op, lhs, rhs) => {
            let l = eval_const(lhs, symtab)?;
            let r = eval_const(rhs, symtab)?;
            apply_binop(*op, l, r)
        }
        Expr::Call(..) => Err(CompileError::NotConstant {
            context: "function call".into(),
        }),
        Expr::LVal(lval) => {
            let sym = symtab.lookup_or_err(&lval.name)?;
            match &sym.kind {
                SymbolKind::ConstScalar(v) => {
                    if lval.indices.is_empty() {
                        Ok(*v)
                    } else {
                        Err(CompileError::DimensionMismatch {
                            name: lval.name.to_string(),
                            expected: 0,
                            got: lval.indices.len(),
                        })
                    }
                }
                SymbolKind::ConstArray { dims, values } => {
                    if lval.indices.len() != dims.len() {
                        return Err(CompileError::NotConstant {
                            context: format!(
                                "partial index of const array '{}' is not a constant",
                                lval.name
                            ),
                        });
                    }
                    let idx = lval
                        .indices
                        .iter()
                        .map(|e| eval_const(e, symtab))
                        .collect::<CompileResult<Vec<_>>>()?;
                    let offset = flatten_index(dims, &idx);
                    values.get(offset).copied().ok_or(CompileError::Internal(
                        "const array index out of folded bounds",
                    ))
                }
                _ => Err(CompileError::NotConstant {
                    context: format!("'{}' is not a compile-time constant", lval.name),
                }),
            }
        }
    }
}

fn apply_binop(op: BinOp, l: i32, r: i32) -> CompileResult<i32> {
    Ok(match op {
        BinOp::Add => l.wrapping_add(r),
        BinOp::Sub => l.wrapping_sub(r),
        BinOp::Mul => l.wrapping_mul(r),
        BinOp::Div => l
            .checked_div(r)
            .ok_or(CompileError::NotConstant {
                context: "division by zero in constant expression".into(),
            })?,
        BinOp::Mod => l
            .checked_rem(r)
            .ok_or(CompileError::NotConstant {
                context: "modulo by zero in constant expression".into(),
            })?,
        BinOp::Lt => (l < r) as i32,
        BinOp::Gt => (l > r) as i32,
        BinOp::Le => (l <= r) as i32,
        BinOp::Ge => (l >= r) as i32,
        BinOp::Eq => (l == r) as i32,
        BinOp::Ne => (l != r) as i32,
        BinOp::And | BinOp::Or => unreachable!("handled by the short-circuit arms above"),
    })
}

/// Row-major flattening: `w_k = product(dims[k+1..])`, offset = sum(idx_k * w_k).
pub fn flatten_index(dims: &[usize], indices: &[i32]) -> usize {
    let mut offset = 0usize;
    for (k, &idx) in indices.iter().enumerate() {
        let stride: usize = dims[k + 1..].iter().product();
        offset += idx as usize * stride;
    }
    offset
}
