//! Function definitions. Parameters are copied into a shadow local slot
//! immediately on entry (`%x_param` -> `@x_3`) so that reassigning a
//! parameter inside the body is just an ordinary store, exactly like any
//! other local variable.

use crate::ast::{FuncDef, FuncRetTy};
use crate::emit;
use crate::error::CompileResult;
use crate::irgen::aggregate::array_type_text;
use crate::irgen::block::lower_block;
use crate::irgen::context::{mangled, LowerCtx};
use crate::irgen::stmt::Flow;
use crate::sema::eval_const;
use crate::sema::symbol_table::SymbolKind;

pub fn lower_func_def(ctx: &mut LowerCtx, f: &FuncDef) -> CompileResult<()> {
    let sym_kind = match f.ret_ty {
        FuncRetTy::Int => SymbolKind::IntFunc,
        FuncRetTy::Void => SymbolKind::VoidFunc,
    };
    ctx.symtab.insert(&f.name, sym_kind)?;
    ctx.reset_vreg_counter();
    ctx.cur_ret_ty = f.ret_ty;

    let param_scope = ctx.symtab.enter_scope();

    let mut sig_parts = Vec::with_capacity(f.params.len());
    for p in &f.params {
        let ty = match &p.array_dims {
            None => "i32".to_string(),
            Some(dims) => {
                let sizes = dims
                    .iter()
                    .map(|e| eval_const(e, &ctx.symtab).map(|v| v.max(0) as usize))
                    .collect::<CompileResult<Vec<_>>>()?;
                format!("*{}", array_type_text(&sizes))
            }
        };
        sig_parts.push(format!("%{}_param: {}", p.name, ty));
    }
    let ret_suffix = match f.ret_ty {
        FuncRetTy::Int => ": i32",
        FuncRetTy::Void => "",
    };
    emit!(ctx, "fun @{}({}){} {{", f.name, sig_parts.join(", "), ret_suffix);
    emit!(ctx, "%LHR_entry_{}:", f.name);

    for p in &f.params {
        let slot = mangled(&p.name, param_scope);
        match &p.array_dims {
            None => {
                emit!(ctx, "{} = alloc i32", slot);
                emit!(ctx, "store %{}_param, {}", p.name, slot);
                ctx.symtab.insert(&p.name, SymbolKind::VarScalar)?;
            }
            Some(dims) => {
                let sizes = dims
                    .iter()
                    .map(|e| eval_const(e, &ctx.symtab).map(|v| v.max(0) as usize))
                    .collect::<CompileResult<Vec<_>>>()?;
                emit!(ctx, "{} = alloc *{}", slot, array_type_text(&sizes));
                emit!(ctx, "store %{}_param, {}", p.name, slot);
                ctx.symtab
                    .insert(&p.name, SymbolKind::Pointer { inner_dims: sizes })?;
            }
        }
    }

    let flow = lower_block(ctx, &f.body)?;
    if flow == Flow::Continues {
        match f.ret_ty {
            FuncRetTy::Int => emit!(ctx, "ret 0"),
            FuncRetTy::Void => emit!(ctx, "ret"),
        }
    }
    emit!(ctx, "}}");
    ctx.symtab.exit_scope();
    Ok(())
}
