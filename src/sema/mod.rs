pub mod const_eval;
pub mod symbol_table;

pub use const_eval::eval_const;
pub use symbol_table::{Symbol, SymbolKind, SymbolTableStack};
