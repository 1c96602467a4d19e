// Test module organization
pub mod test_lexer;
pub mod test_parser;
pub mod test_const_eval;
pub mod test_codegen_koopa;
pub mod test_codegen_riscv;
