//! Compiler-wide error taxonomy.
//!
//! Every fatal condition the pipeline can hit funnels through [`CompileError`].
//! There is no recovery path: the driver prints the message and exits non-zero.

use std::fmt;

#[derive(Debug, Clone)]
pub enum CompileError {
    /// Lexer/parser failure, with a best-effort source line.
    Syntax { line: usize, message: String },
    /// Use of a name that was never declared in any enclosing scope.
    UndeclaredIdent { name: String },
    /// Re-declaration of a name already present in the *current* scope.
    Redeclaration { name: String },
    /// A context requiring a compile-time constant saw something that didn't fold.
    NotConstant { context: String },
    /// Indexing an array/pointer with the wrong number of subscripts.
    DimensionMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    /// The textual Koopa IR the front end emitted failed to re-parse.
    IrParse(String),
    Io(String),
    /// An internal invariant broke; this is a compiler bug, not a user error.
    Internal(&'static str),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Syntax { line, message } => {
                write!(f, "syntax error at line {line}: {message}")
            }
            CompileError::UndeclaredIdent { name } => {
                write!(f, "undeclared identifier '{name}'")
            }
            CompileError::Redeclaration { name } => {
                write!(f, "'{name}' is already declared in this scope")
            }
            CompileError::NotConstant { context } => {
                write!(f, "expression is not a compile-time constant ({context})")
            }
            CompileError::DimensionMismatch {
                name,
                expected,
                got,
            } => write!(
                f,
                "'{name}' expects {expected} index/indices, got {got}"
            ),
            CompileError::IrParse(msg) => write!(f, "failed to parse generated Koopa IR: {msg}"),
            CompileError::Io(msg) => write!(f, "I/O error: {msg}"),
            CompileError::Internal(msg) => write!(f, "internal compiler error: {msg}"),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<std::io::Error> for CompileError {
    fn from(e: std::io::Error) -> Self {
        CompileError::Io(e.to_string())
    }
}

pub type CompileResult<T> = Result<T, CompileError>;
