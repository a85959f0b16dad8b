//! Reference map: use → declaration, plus the scope tree.
//!
//! Populated by the resolver and cleared at the start of every resolution.
//! All entries are keyed by [`NodeId`]; the map never owns nodes.
//!
//! Scopes keep their declarations in insertion order so iteration (and
//! everything printed from it) is deterministic. The map also remembers every
//! declared name so it can mint fresh, unused names for synthesized
//! declarations.

use std::fmt;

use p4_ir::{Name, NodeId};
use rustc_hash::{FxHashMap, FxHashSet};

/// Index of a scope in a [`ReferenceMap`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ScopeId(u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

struct Scope {
    /// The scope-forming node.
    node: NodeId,
    parent: Option<ScopeId>,
    /// Declarations in insertion order.
    decls: Vec<(Name, NodeId)>,
    by_name: FxHashMap<Name, NodeId>,
}

/// Use → declaration map and scope tree.
#[derive(Default)]
pub struct ReferenceMap {
    scopes: Vec<Scope>,
    scope_of_node: FxHashMap<NodeId, ScopeId>,
    /// Scope each declaration was entered into.
    declared_in: FxHashMap<NodeId, ScopeId>,
    /// Traversal position of each declaration, for use-before-declaration.
    positions: FxHashMap<NodeId, u32>,
    refs: FxHashMap<NodeId, NodeId>,
    use_scopes: FxHashMap<NodeId, ScopeId>,
    used_names: FxHashSet<String>,
}

impl ReferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all scopes and references.
    ///
    /// Declared names survive: names minted by [`ReferenceMap::new_name`]
    /// stay reserved for the whole compilation.
    pub fn clear(&mut self) {
        self.scopes.clear();
        self.scope_of_node.clear();
        self.declared_in.clear();
        self.positions.clear();
        self.refs.clear();
        self.use_scopes.clear();
    }

    // === Scopes ===

    /// Open a scope for `node` nested in `parent`.
    pub fn new_scope(&mut self, node: NodeId, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(u32::try_from(self.scopes.len()).unwrap_or(u32::MAX));
        self.scopes.push(Scope {
            node,
            parent,
            decls: Vec::new(),
            by_name: FxHashMap::default(),
        });
        self.scope_of_node.insert(node, id);
        id
    }

    /// The scope formed by `node`, if it forms one.
    pub fn scope_of(&self, node: NodeId) -> Option<ScopeId> {
        self.scope_of_node.get(&node).copied()
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.index()].parent
    }

    /// The node that formed `scope`.
    pub fn scope_node(&self, scope: ScopeId) -> NodeId {
        self.scopes[scope.index()].node
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Enter `decl` under `name` in `scope` at traversal `position`.
    ///
    /// Returns the earlier declaration when the name is already taken in
    /// this scope; the map keeps the first one.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: Name,
        decl: NodeId,
        position: u32,
    ) -> Result<(), NodeId> {
        let entry = &mut self.scopes[scope.index()];
        if let Some(&previous) = entry.by_name.get(&name) {
            return Err(previous);
        }
        entry.by_name.insert(name, decl);
        entry.decls.push((name, decl));
        self.declared_in.insert(decl, scope);
        self.positions.insert(decl, position);
        Ok(())
    }

    /// Declaration of `name` in `scope` itself.
    pub fn lookup_local(&self, scope: ScopeId, name: Name) -> Option<NodeId> {
        self.scopes[scope.index()].by_name.get(&name).copied()
    }

    /// Nearest declaration of `name`, walking from `scope` to the root.
    pub fn lookup(&self, scope: ScopeId, name: Name) -> Option<(ScopeId, NodeId)> {
        let mut current = Some(scope);
        while let Some(s) = current {
            if let Some(decl) = self.lookup_local(s, name) {
                return Some((s, decl));
            }
            current = self.parent(s);
        }
        None
    }

    /// Declarations of `scope` in insertion order.
    pub fn declarations(&self, scope: ScopeId) -> impl Iterator<Item = (Name, NodeId)> + '_ {
        self.scopes[scope.index()].decls.iter().copied()
    }

    /// The scope a declaration was entered into.
    pub fn declaring_scope(&self, decl: NodeId) -> Option<ScopeId> {
        self.declared_in.get(&decl).copied()
    }

    /// Traversal position of a declaration.
    pub fn position(&self, decl: NodeId) -> Option<u32> {
        self.positions.get(&decl).copied()
    }

    // === References ===

    /// Record that `use_site`, seen in `scope`, refers to `decl`.
    pub fn set_declaration(&mut self, use_site: NodeId, decl: NodeId, scope: ScopeId) {
        self.refs.insert(use_site, decl);
        self.use_scopes.insert(use_site, scope);
    }

    pub fn get_declaration(&self, use_site: NodeId) -> Option<NodeId> {
        self.refs.get(&use_site).copied()
    }

    /// Scope in which `use_site` was resolved.
    pub fn use_scope(&self, use_site: NodeId) -> Option<ScopeId> {
        self.use_scopes.get(&use_site).copied()
    }

    /// Number of resolved uses.
    pub fn reference_count(&self) -> usize {
        self.refs.len()
    }

    /// Whether the declaration of `use_site` is visible by walking scopes
    /// upward from the use.
    pub fn is_reachable(&self, use_site: NodeId) -> bool {
        let (Some(decl), Some(scope)) = (self.get_declaration(use_site), self.use_scope(use_site))
        else {
            return false;
        };
        let Some(home) = self.declaring_scope(decl) else {
            return false;
        };
        let mut current = Some(scope);
        while let Some(s) = current {
            if s == home {
                return true;
            }
            current = self.parent(s);
        }
        false
    }

    // === Fresh names ===

    /// Reserve a name so [`ReferenceMap::new_name`] never returns it.
    pub fn add_used_name(&mut self, name: &str) {
        if !self.used_names.contains(name) {
            self.used_names.insert(name.to_owned());
        }
    }

    pub fn is_used_name(&self, name: &str) -> bool {
        self.used_names.contains(name)
    }

    /// A fresh name derived from `base`: `base_0`, `base_1`, ….
    pub fn new_name(&mut self, base: &str) -> String {
        let mut counter = 0u32;
        loop {
            let candidate = format!("{base}_{counter}");
            if !self.used_names.contains(&candidate) {
                self.used_names.insert(candidate.clone());
                return candidate;
            }
            counter += 1;
        }
    }
}

impl fmt::Debug for ReferenceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceMap")
            .field("scopes", &self.scopes.len())
            .field("references", &self.refs.len())
            .field("used_names", &self.used_names.len())
            .finish()
    }
}
