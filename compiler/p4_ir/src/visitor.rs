//! Read-only IR traversal.
//!
//! An [`Inspector`] observes the tree without rewriting it: its hooks receive
//! `&Ir`, so mutation is ruled out by the borrow checker. Inspectors may
//! update their own state (and any side channel they borrow).
//!
//! # Example
//!
//! ```text
//! struct CountPaths {
//!     count: usize,
//! }
//!
//! impl Inspector for CountPaths {
//!     fn preorder(&mut self, ir: &Ir, id: NodeId) -> Visit {
//!         if matches!(ir.kind(id), NodeKind::PathExpression { .. }) {
//!             self.count += 1;
//!         }
//!         Visit::Continue
//!     }
//! }
//! ```

use crate::{Ir, NodeId};

/// Result of an inspector's preorder hook.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Visit {
    /// Descend into the children, then call `postorder`.
    Continue,
    /// Skip the children and the `postorder` hook.
    Prune,
}

/// Read-only visitor over the IR.
///
/// Hooks dispatch on [`Ir::kind`]; the default implementations do nothing.
pub trait Inspector {
    fn preorder(&mut self, ir: &Ir, id: NodeId) -> Visit {
        let _ = (ir, id);
        Visit::Continue
    }

    fn postorder(&mut self, ir: &Ir, id: NodeId) {
        let _ = (ir, id);
    }
}

/// Walk the subtree rooted at `id` in preorder, children left to right.
pub fn inspect<I: Inspector + ?Sized>(inspector: &mut I, ir: &Ir, id: NodeId) {
    if inspector.preorder(ir, id) == Visit::Prune {
        return;
    }
    walk_children(inspector, ir, id);
    inspector.postorder(ir, id);
}

/// Inspect each child of `id` without calling hooks on `id` itself.
pub fn walk_children<I: Inspector + ?Sized>(inspector: &mut I, ir: &Ir, id: NodeId) {
    ir.kind(id)
        .for_each_child(|child| inspect(inspector, ir, child));
}
