//! Node arena owning every IR node of a compilation unit.
//!
//! Nodes are append-only: rewriting allocates, nothing is freed until the
//! arena is dropped. A [`NodeId`] therefore names the same node for the whole
//! compilation, which is what the reference and type maps key on.

use crate::node::{Node, NodeId, NodeKind};
use crate::{Name, Span, StringInterner};

/// Convert a length to `u32` for id construction.
///
/// Saturates instead of panicking; four billion nodes is not a reachable size.
#[inline]
pub(crate) fn to_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX - 1)
}

/// The IR arena of one compilation unit.
pub struct Ir {
    nodes: Vec<Node>,
    interner: StringInterner,
}

impl Ir {
    /// Create an empty arena.
    pub fn new() -> Self {
        Ir {
            nodes: Vec::new(),
            interner: StringInterner::new(),
        }
    }

    /// Allocate a node, returning its identity.
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId::new(to_u32(self.nodes.len()));
        self.nodes.push(Node { kind, span });
        id
    }

    /// Allocate a node without a source position.
    pub fn synthesize(&mut self, kind: NodeKind) -> NodeId {
        self.alloc(kind, Span::SYNTHESIZED)
    }

    /// Get a node.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Get a node's kind.
    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    /// Get a node's source span.
    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    /// Number of nodes ever allocated.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Intern an identifier.
    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Text of an interned identifier.
    pub fn name_str(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    /// Declared name of a node as text, or `""` for anonymous kinds.
    pub fn decl_name_str(&self, id: NodeId) -> &'static str {
        self.kind(id)
            .declared_name()
            .map_or("", |name| self.name_str(name))
    }

    /// Rebuild `id` with children mapped through `f`.
    ///
    /// Returns `id` itself when no child changed, otherwise a fresh node with
    /// the same kind and span.
    pub fn rebuild<F: FnMut(NodeId) -> NodeId>(&mut self, id: NodeId, mut f: F) -> NodeId {
        let mut changed = false;
        let kind = self.kind(id).map_children(|child| {
            let new = f(child);
            changed |= new != child;
            new
        });
        if changed {
            let span = self.span(id);
            self.alloc(kind, span)
        } else {
            id
        }
    }

    /// Allocate a copy of `id` with a new kind, keeping its span.
    pub fn replace_kind(&mut self, id: NodeId, kind: NodeKind) -> NodeId {
        let span = self.span(id);
        self.alloc(kind, span)
    }

    /// Deep structural equality, ignoring identity and spans.
    pub fn structurally_equal(&self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return true;
        }
        let (ka, kb) = (self.kind(a), self.kind(b));
        if ka.map_children(|_| NodeId::PLACEHOLDER) != kb.map_children(|_| NodeId::PLACEHOLDER) {
            return false;
        }
        let (ca, cb) = (ka.children(), kb.children());
        ca.len() == cb.len()
            && ca
                .iter()
                .zip(&cb)
                .all(|(&x, &y)| self.structurally_equal(x, y))
    }

    /// Deep copy of a subtree with fresh identities for every node.
    ///
    /// `subst` is consulted on each original node before it is copied; a
    /// `Some(replacement)` is used verbatim in place of that subtree.
    pub fn deep_clone_with<F>(&mut self, id: NodeId, subst: &mut F) -> NodeId
    where
        F: FnMut(&mut Ir, NodeId) -> Option<NodeId>,
    {
        if let Some(replacement) = subst(self, id) {
            return replacement;
        }
        let children = self.kind(id).children();
        let mut copies = Vec::with_capacity(children.len());
        for child in children {
            copies.push(self.deep_clone_with(child, subst));
        }
        let mut copies = copies.into_iter();
        let kind = self
            .kind(id)
            .map_children(|old| copies.next().unwrap_or(old));
        let span = self.span(id);
        self.alloc(kind, span)
    }

    /// Deep copy of a subtree with fresh identities.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        self.deep_clone_with(id, &mut |_, _| None)
    }

    /// Whether the subtree rooted at `id` contains a method call.
    pub fn has_side_effects(&self, id: NodeId) -> bool {
        if matches!(self.kind(id), NodeKind::MethodCall { .. }) {
            return true;
        }
        let mut found = false;
        self.kind(id).for_each_child(|child| {
            found = found || self.has_side_effects(child);
        });
        found
    }
}

impl Default for Ir {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Ir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ir").field("nodes", &self.nodes.len()).finish()
    }
}
