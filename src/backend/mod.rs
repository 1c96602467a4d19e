//! Koopa IR -> RISC-V (RV32IM) assembly.

mod codegen;
mod frame;
mod types;

use koopa::front::Driver;

use crate::error::{CompileError, CompileResult};

/// Re-parses Koopa IR text into the real in-memory `koopa::ir::Program`
/// and walks it to RV32 assembly. Front end and back end meet only at
/// this text boundary, same as the two independently-invocable passes
/// the course tool exposes.
pub fn compile_to_riscv(ir_text: &str) -> CompileResult<String> {
    let program = Driver::from(ir_text)
        .generate_program()
        .map_err(|e| CompileError::IrParse(format!("{e:?}")))?;
    codegen::emit_program(&program)
}
