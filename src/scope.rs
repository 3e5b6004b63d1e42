//! Lexical scopes for name resolution during code generation.
//!
//! The storage handle `S` is opaque here; the code generator decides what it
//! means (an LLVM stack slot in practice).

use std::collections::HashMap;

use crate::ty::ValueType;

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol<S> {
    pub name: String,
    pub ty: ValueType,
    pub storage: S,
}

/// Stack of scopes, innermost last.
#[derive(Debug)]
pub struct ScopeStack<S> {
    scopes: Vec<HashMap<String, Symbol<S>>>,
}

impl<S> Default for ScopeStack<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ScopeStack<S> {
    /// An empty stack; callers open the unit's outermost scope themselves.
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Adds `name` to the innermost scope. Returns `false` when that scope
    /// already holds the name; outer declarations are shadowed, not rejected.
    /// Also `false` when no scope is open.
    pub fn declare(&mut self, name: &str, ty: ValueType, storage: S) -> bool {
        let Some(innermost) = self.scopes.last_mut() else {
            return false;
        };
        if innermost.contains_key(name) {
            return false;
        }
        innermost.insert(
            name.to_string(),
            Symbol {
                name: name.to_string(),
                ty,
                storage,
            },
        );
        true
    }

    /// Innermost-to-outermost search.
    pub fn lookup(&self, name: &str) -> Option<&Symbol<S>> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}
