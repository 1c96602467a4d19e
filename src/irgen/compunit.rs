//! Whole-program entry point for the front end: declares the eight
//! runtime intrinsics every SysY program links against, then lowers each
//! top-level declaration and function definition in source order.

use crate::ast::{CompUnit, GlobalItem};
use crate::emit;
use crate::error::CompileResult;
use crate::irgen::context::LowerCtx;
use crate::irgen::decl::lower_decl;
use crate::irgen::func::lower_func_def;

const INTRINSICS: &[(&str, &str, &str)] = &[
    ("getint", "", ": i32"),
    ("getch", "", ": i32"),
    ("getarray", "*i32", ": i32"),
    ("putint", "i32", ""),
    ("putch", "i32", ""),
    ("putarray", "i32, *i32", ""),
    ("starttime", "", ""),
    ("stoptime", "", ""),
];

pub fn lower_program(ast: &CompUnit) -> CompileResult<String> {
    let mut ctx = LowerCtx::new();
    for (name, params, ret) in INTRINSICS {
        emit!(ctx, "decl @{}({}){}", name, params, ret);
    }
    ctx.emit("");

    for item in &ast.items {
        match item {
            GlobalItem::Decl(d) => lower_decl(&mut ctx, d)?,
            GlobalItem::FuncDef(f) => {
                lower_func_def(&mut ctx, f)?;
                ctx.emit("");
            }
        }
    }
    Ok(ctx.out)
}
