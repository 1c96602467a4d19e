use crate::ast::{Block, BlockItem};
use crate::error::CompileResult;
use crate::irgen::context::LowerCtx;
use crate::irgen::decl::lower_decl;
use crate::irgen::stmt::{lower_stmt, Flow};

/// Lowers a `{ ... }` block in its own scope. Statements after an
/// unconditional exit (`return`/`break`/`continue`, or an if/else where
/// both arms exit) are unreachable and dropped rather than lowered into
/// an already-terminated basic block.
pub fn lower_block(ctx: &mut LowerCtx, block: &Block) -> CompileResult<Flow> {
    ctx.symtab.enter_scope();
    let mut flow = Flow::Continues;
    for item in &block.items {
        match item {
            BlockItem::Decl(decl) => lower_decl(ctx, decl)?,
            BlockItem::Stmt(stmt) => {
                flow = lower_stmt(ctx, stmt)?;
                if flow == Flow::Terminated {
                    break;
                }
            }
        }
    }
    ctx.symtab.exit_scope();
    Ok(flow)
}
