//! Rewriting IR traversal with functional semantics.
//!
//! A [`Transform`] never mutates a node; it returns replacement ids. The
//! walker is change-preserving: when no hook rewrites a node and none of its
//! children changed, the original [`NodeId`] is returned, so callers detect
//! "nothing happened" by id equality. This is what fixpoint iteration in the
//! pass manager relies on.

use smallvec::SmallVec;

use crate::{Ir, NodeId};

/// Result of a transform's preorder hook.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Rewrite {
    /// Rewrite the children, then call `postorder`.
    Continue,
    /// Keep the node unchanged; skip children and `postorder`.
    Prune,
    /// Use this node instead; its children are not visited.
    Replace(NodeId),
}

/// Rewriting visitor over the IR.
pub trait Transform {
    fn preorder(&mut self, ir: &mut Ir, id: NodeId) -> Rewrite {
        let _ = (ir, id);
        Rewrite::Continue
    }

    /// Called after the children were rewritten.
    ///
    /// `original` is the node as it was before traversal; `id` is the same
    /// node, or a fresh copy carrying the rewritten children. Return `id` to
    /// keep it.
    fn postorder(&mut self, ir: &mut Ir, original: NodeId, id: NodeId) -> NodeId {
        let _ = (ir, original);
        id
    }
}

/// Rewrite the subtree rooted at `id`.
pub fn transform<T: Transform + ?Sized>(t: &mut T, ir: &mut Ir, id: NodeId) -> NodeId {
    match t.preorder(ir, id) {
        Rewrite::Prune => id,
        Rewrite::Replace(new) => new,
        Rewrite::Continue => {
            let rebuilt = transform_children(t, ir, id);
            t.postorder(ir, id, rebuilt)
        }
    }
}

/// Rewrite each child of `id` without calling hooks on `id` itself.
///
/// Returns `id` when no child changed.
pub fn transform_children<T: Transform + ?Sized>(t: &mut T, ir: &mut Ir, id: NodeId) -> NodeId {
    let children = ir.kind(id).children();
    let mut rewritten: SmallVec<[NodeId; 4]> = SmallVec::with_capacity(children.len());
    let mut changed = false;
    for child in children {
        let new = transform(t, ir, child);
        changed |= new != child;
        rewritten.push(new);
    }
    if !changed {
        return id;
    }
    let mut rewritten = rewritten.into_iter();
    let kind = ir
        .kind(id)
        .map_children(|old| rewritten.next().unwrap_or(old));
    ir.replace_kind(id, kind)
}

/// Rewrite a list of nodes, reporting whether any entry changed.
pub fn transform_list<T: Transform + ?Sized>(
    t: &mut T,
    ir: &mut Ir,
    ids: &[NodeId],
) -> (Vec<NodeId>, bool) {
    let mut changed = false;
    let out = ids
        .iter()
        .map(|&id| {
            let new = transform(t, ir, id);
            changed |= new != id;
            new
        })
        .collect();
    (out, changed)
}
