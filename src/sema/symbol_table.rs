//! Scoped symbol table. Each nested block gets its own frame on the stack;
//! leaving a block pops its frame so sibling blocks can reuse names freely.
//! Every frame carries a monotonically increasing id, used by the lowerer
//! to mangle IR names (`name_<scope id>`) so shadowed locals never collide.

use ahash::AHashMap;

use crate::error::{CompileError, CompileResult};

#[derive(Debug, Clone)]
pub enum SymbolKind {
    ConstScalar(i32),
    /// `dims` holds every declared dimension size; `values` is the
    /// fully-flattened element list in row-major order.
    ConstArray { dims: Vec<usize>, values: Vec<i32> },
    VarScalar,
    VarArray { dims: Vec<usize> },
    /// A decayed array parameter. `inner_dims` holds every dimension size
    /// *after* the first (which is erased by decay); its length plus one
    /// is the number of indices a use must supply.
    Pointer { inner_dims: Vec<usize> },
    IntFunc,
    VoidFunc,
}

impl SymbolKind {
    pub fn index_arity(&self) -> Option<usize> {
        match self {
            SymbolKind::ConstArray { dims, .. } | SymbolKind::VarArray { dims } => Some(dims.len()),
            SymbolKind::Pointer { inner_dims } => Some(inner_dims.len() + 1),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub scope_id: u32,
}

struct Scope {
    id: u32,
    names: AHashMap<String, Symbol>,
}

pub struct SymbolTableStack {
    scopes: Vec<Scope>,
    next_scope_id: u32,
}

impl SymbolTableStack {
    pub fn new() -> Self {
        let mut me = SymbolTableStack {
            scopes: Vec::new(),
            next_scope_id: 0,
        };
        me.enter_scope();
        me.install_runtime_intrinsics();
        me
    }

    fn install_runtime_intrinsics(&mut self) {
        for name in ["getint", "getch", "getarray"] {
            self.insert(name, SymbolKind::IntFunc).unwrap();
        }
        for name in ["putint", "putch", "putarray", "starttime", "stoptime"] {
            self.insert(name, SymbolKind::VoidFunc).unwrap();
        }
    }

    /// Pushes a new scope frame and returns its id.
    pub fn enter_scope(&mut self) -> u32 {
        let id = self.next_scope_id;
        self.next_scope_id += 1;
        self.scopes.push(Scope {
            id,
            names: AHashMap::default(),
        });
        id
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn current_scope_id(&self) -> u32 {
        self.scopes.last().expect("scope stack never empty").id
    }

    pub fn is_global_scope(&self) -> bool {
        self.scopes.len() == 1
    }

    pub fn insert(&mut self, name: &str, kind: SymbolKind) -> CompileResult<u32> {
        let scope = self.scopes.last_mut().expect("scope stack never empty");
        if scope.names.contains_key(name) {
            return Err(CompileError::Redeclaration {
                name: name.to_string(),
            });
        }
        let id = scope.id;
        scope.names.insert(
            name.to_string(),
            Symbol {
                kind,
                scope_id: id,
            },
        );
        Ok(id)
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.names.get(name))
    }

    pub fn lookup_or_err(&self, name: &str) -> CompileResult<&Symbol> {
        self.lookup(name).ok_or_else(|| CompileError::UndeclaredIdent {
            name: name.to_string(),
        })
    }
}

impl Default for SymbolTableStack {
    fn default() -> Self {
        Self::new()
    }
}
