use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

use craftc_util::VarType;

/// A resolved variable: the internal id used in emitted commands, and the
/// variable's current type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub iid: String,
    pub ty: VarType,
}

impl Binding {
    pub fn new(iid: impl Into<String>, ty: VarType) -> Self {
        Binding { iid: iid.into(), ty }
    }
}

/// Scope id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

/// A single scope: its bindings and an optional parent.
#[derive(Debug)]
struct Scope {
    bindings: FxHashMap<String, Binding>,
    parent: Option<ScopeId>,
}

/// Tree of nested scopes with a cursor on the current one.
///
/// Lookups walk the parent chain starting at the current scope. Writes
/// come in two flavors, both available recursively or local-only:
///
/// - [`insert`](ScopeTree::insert) installs a prebuilt binding, overwriting
///   the nearest enclosing binding of that name (or shadowing in the
///   current scope when not recursive);
/// - [`bind`](ScopeTree::bind) is the assignment path: if the name is
///   already bound, the existing binding is re-typed in place and its
///   internal id reused; otherwise a fresh id is drawn from the supplied
///   generator and the binding is created in the current scope.
pub struct ScopeTree {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl ScopeTree {
    /// Creates a tree holding a single root scope.
    pub fn new() -> Self {
        ScopeTree {
            scopes: vec![Scope {
                bindings: FxHashMap::default(),
                parent: None,
            }],
            current: ScopeId(0),
        }
    }

    /// Enters a child of the current scope and returns its id.
    pub fn enter_scope(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            bindings: FxHashMap::default(),
            parent: Some(self.current),
        });
        self.current = id;
        id
    }

    /// Returns to the parent of the current scope. Leaving the root is a
    /// no-op.
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current.0 as usize].parent {
            self.current = parent;
        }
    }

    /// Looks up `name`, walking the parent chain when `recursive`.
    pub fn get(&self, name: &str, recursive: bool) -> Option<&Binding> {
        let mut scope = self.current;
        loop {
            let entry = &self.scopes[scope.0 as usize];
            if let Some(binding) = entry.bindings.get(name) {
                return Some(binding);
            }
            if !recursive {
                return None;
            }
            scope = entry.parent?;
        }
    }

    /// Returns true if `name` resolves.
    pub fn contains(&self, name: &str, recursive: bool) -> bool {
        self.get(name, recursive).is_some()
    }

    /// Installs `binding` under `name`. When `recursive`, the nearest
    /// enclosing scope already binding `name` is overwritten; otherwise (or
    /// when no scope binds it) the current scope is used.
    pub fn insert(&mut self, name: &str, binding: Binding, recursive: bool) {
        let target = if recursive {
            self.find_binding_scope(name).unwrap_or(self.current)
        } else {
            self.current
        };
        self.scopes[target.0 as usize]
            .bindings
            .insert(name.to_string(), binding);
    }

    /// The assignment path: re-types the nearest binding of `name` in place
    /// (reusing its internal id), or creates a fresh binding in the current
    /// scope with an id drawn from `fresh_iid`. Returns the resulting
    /// binding.
    pub fn bind(
        &mut self,
        name: &str,
        ty: VarType,
        fresh_iid: impl FnOnce() -> String,
        recursive: bool,
    ) -> &Binding {
        let target = if recursive {
            self.find_binding_scope(name).unwrap_or(self.current)
        } else {
            self.current
        };

        match self.scopes[target.0 as usize]
            .bindings
            .entry(name.to_string())
        {
            Entry::Occupied(occupied) => {
                let binding = occupied.into_mut();
                binding.ty = ty;
                binding
            }
            Entry::Vacant(vacant) => vacant.insert(Binding::new(fresh_iid(), ty)),
        }
    }

    fn find_binding_scope(&self, name: &str) -> Option<ScopeId> {
        let mut scope = self.current;
        loop {
            let entry = &self.scopes[scope.0 as usize];
            if entry.bindings.contains_key(name) {
                return Some(scope);
            }
            scope = entry.parent?;
        }
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}
