//! Lowers `const`/plain declarations, at both global and local scope.
//! Constant *scalars* never reach the IR at all - every use is resolved
//! straight off the symbol table - but constant *arrays* still need real
//! storage, since a non-constant index into one is a runtime load.

use crate::ast::{ConstDef, ConstInitVal, Decl, InitVal, VarDef};
use crate::emit;
use crate::error::{CompileError, CompileResult};
use crate::irgen::aggregate::{
    array_type_text, emit_local_array_stores, flatten_const_init, flatten_local_init,
    global_aggregate_text,
};
use crate::irgen::context::{mangled, LowerCtx};
use crate::irgen::expr::lower_expr;
use crate::sema::{eval_const, SymbolKind};

pub fn lower_decl(ctx: &mut LowerCtx, decl: &Decl) -> CompileResult<()> {
    match decl {
        Decl::Const(defs) => defs.iter().try_for_each(|d| lower_const_def(ctx, d)),
        Decl::Var(defs) => defs.iter().try_for_each(|d| lower_var_def(ctx, d)),
    }
}

fn eval_dims(ctx: &LowerCtx, dims: &[crate::ast::Expr]) -> CompileResult<Vec<usize>> {
    dims.iter()
        .map(|e| eval_const(e, &ctx.symtab).map(|v| v.max(0) as usize))
        .collect()
}

fn lower_const_def(ctx: &mut LowerCtx, def: &ConstDef) -> CompileResult<()> {
    let dims = eval_dims(ctx, &def.dims)?;
    if dims.is_empty() {
        let ConstInitVal::Exp(e) = &def.init else {
            return Err(CompileError::Syntax {
                line: def.line,
                message: format!("'{}' is a scalar const but has an aggregate initializer", def.name),
            });
        };
        let val = eval_const(e, &ctx.symtab)?;
        ctx.symtab.insert(&def.name, SymbolKind::ConstScalar(val))?;
        return Ok(());
    }

    let values = flatten_const_init(&dims, &def.init, &ctx.symtab)?;
    let scope_id = ctx.symtab.current_scope_id();
    let name = mangled(&def.name, scope_id);
    emit_array_storage(ctx, &name, &dims, Some(&values));
    ctx.symtab.insert(
        &def.name,
        SymbolKind::ConstArray {
            dims,
            values,
        },
    )?;
    Ok(())
}

fn lower_var_def(ctx: &mut LowerCtx, def: &VarDef) -> CompileResult<()> {
    let dims = eval_dims(ctx, &def.dims)?;
    if dims.is_empty() {
        lower_scalar_var(ctx, def)
    } else {
        lower_array_var(ctx, def, dims)
    }
}

fn lower_scalar_var(ctx: &mut LowerCtx, def: &VarDef) -> CompileResult<()> {
    let is_global = ctx.symtab.is_global_scope();
    if is_global {
        let init = match &def.init {
            None => 0,
            Some(InitVal::Exp(e)) => eval_const(e, &ctx.symtab)?,
            Some(InitVal::List(_)) => {
                return Err(CompileError::Syntax {
                    line: def.line,
                    message: format!("'{}' is a scalar but has an aggregate initializer", def.name),
                })
            }
        };
        let scope_id = ctx.symtab.current_scope_id();
        let name = mangled(&def.name, scope_id);
        emit!(ctx, "global {} = alloc i32, {}", name, init);
        ctx.symtab.insert(&def.name, SymbolKind::VarScalar)?;
        return Ok(());
    }

    // Evaluate the initializer before the name becomes visible, so
    // `int x = x;` resolves the right-hand `x` to an outer scope.
    let value = match &def.init {
        None => None,
        Some(InitVal::Exp(e)) => Some(lower_expr(ctx, e)?),
        Some(InitVal::List(_)) => {
            return Err(CompileError::Syntax {
                line: def.line,
                message: format!("'{}' is a scalar but has an aggregate initializer", def.name),
            })
        }
    };
    let scope_id = ctx.symtab.current_scope_id();
    let name = mangled(&def.name, scope_id);
    emit!(ctx, "{} = alloc i32", name);
    if let Some(v) = value {
        emit!(ctx, "store {}, {}", v.text(), name);
    }
    ctx.symtab.insert(&def.name, SymbolKind::VarScalar)?;
    Ok(())
}

fn lower_array_var(ctx: &mut LowerCtx, def: &VarDef, dims: Vec<usize>) -> CompileResult<()> {
    let is_global = ctx.symtab.is_global_scope();
    let scope_id = ctx.symtab.current_scope_id();
    let name = mangled(&def.name, scope_id);

    if is_global {
        let flat = match &def.init {
            None => None,
            Some(init) => Some(flatten_global_var_init(&dims, init, ctx)?),
        };
        emit_array_storage(ctx, &name, &dims, flat.as_deref());
        ctx.symtab
            .insert(&def.name, SymbolKind::VarArray { dims })?;
        return Ok(());
    }

    emit!(ctx, "{} = alloc {}", name, array_type_text(&dims));
    if let Some(init) = &def.init {
        let flat = flatten_local_init(ctx, &dims, init)?;
        emit_local_array_stores(ctx, &name, &flat, &dims);
    }
    ctx.symtab
        .insert(&def.name, SymbolKind::VarArray { dims })?;
    Ok(())
}

fn flatten_global_var_init(
    dims: &[usize],
    init: &InitVal,
    ctx: &LowerCtx,
) -> CompileResult<Vec<i32>> {
    // Global initializers must themselves be constant; reuse the const
    // flattener by eval'ing each `InitVal::Exp` leaf through `eval_const`.
    fn to_const_init(init: &InitVal) -> ConstInitVal {
        match init {
            InitVal::Exp(e) => ConstInitVal::Exp(e.clone()),
            InitVal::List(items) => ConstInitVal::List(items.iter().map(to_const_init).collect()),
        }
    }
    flatten_const_init(dims, &to_const_init(init), &ctx.symtab)
}

fn emit_array_storage(ctx: &mut LowerCtx, name: &str, dims: &[usize], values: Option<&[i32]>) {
    let ty = array_type_text(dims);
    match values {
        None => emit!(ctx, "global {} = alloc {}, zeroinit", name, ty),
        Some(values) if values.iter().all(|&v| v == 0) => {
            emit!(ctx, "global {} = alloc {}, zeroinit", name, ty)
        }
        Some(values) => {
            let text = global_aggregate_text(values, dims);
            emit!(ctx, "global {} = alloc {}, {}", name, ty, text);
        }
    }
}
