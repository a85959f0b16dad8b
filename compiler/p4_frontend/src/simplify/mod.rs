//! Control-flow simplification.
//!
//! Statement-level cleanup: literal `if` pruning, block flattening, empty
//! statement removal and branch unwrapping. Expressions are never rewritten,
//! so type information recorded for them stays valid; block scopes do change,
//! which is why only the reference map goes stale.

use p4_ir::{transform, Ir, NodeId, NodeKind, Rewrite, Transform};
use tracing::{debug, trace};

use crate::context::FrontendContext;
use crate::pass_manager::{Analyses, Pass, PassError};

pub struct SimplifyControlFlow;

impl Pass for SimplifyControlFlow {
    fn name(&self) -> &str {
        "SimplifyControlFlow"
    }

    fn invalidates(&self) -> Analyses {
        Analyses::REFERENCES
    }

    fn run(&mut self, ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError> {
        Ok(simplify(&mut ctx.ir, root))
    }
}

#[tracing::instrument(level = "debug", skip_all)]
pub fn simplify(ir: &mut Ir, root: NodeId) -> NodeId {
    let mut simplifier = Simplifier { rewrites: 0 };
    let new_root = transform(&mut simplifier, ir, root);
    debug!(rewrites = simplifier.rewrites, "control flow simplified");
    new_root
}

struct Simplifier {
    rewrites: usize,
}

/// An `EmptyStatement` or a block with no components.
fn is_empty(ir: &Ir, id: NodeId) -> bool {
    match ir.kind(id) {
        NodeKind::EmptyStatement => true,
        NodeKind::BlockStatement { components } => components.is_empty(),
        _ => false,
    }
}

fn declares(ir: &Ir, components: &[NodeId]) -> bool {
    components.iter().any(|&c| {
        matches!(
            ir.kind(c),
            NodeKind::DeclVariable { .. } | NodeKind::DeclConstant { .. } | NodeKind::DeclInstance { .. }
        )
    })
}

fn literal_bool(ir: &Ir, id: NodeId) -> Option<bool> {
    match ir.kind(id) {
        NodeKind::BoolLiteral { value } => Some(*value),
        _ => None,
    }
}

impl Simplifier {
    fn block(&mut self, ir: &mut Ir, id: NodeId, components: &[NodeId]) -> NodeId {
        let mut flat = Vec::with_capacity(components.len());
        let mut changed = false;
        for &component in components {
            match ir.kind(component) {
                NodeKind::EmptyStatement => changed = true,
                NodeKind::BlockStatement { components: inner } if !declares(ir, inner) => {
                    flat.extend_from_slice(inner);
                    changed = true;
                }
                _ => flat.push(component),
            }
        }
        if !changed {
            return id;
        }
        self.rewrites += 1;
        ir.replace_kind(id, NodeKind::BlockStatement { components: flat })
    }

    /// Branch position: a single-statement block becomes that statement.
    fn unwrap_branch(ir: &Ir, branch: NodeId) -> NodeId {
        match ir.kind(branch) {
            NodeKind::BlockStatement { components } if components.len() == 1 => {
                let only = components[0];
                if ir.kind(only).is_statement() {
                    only
                } else {
                    branch
                }
            }
            _ => branch,
        }
    }

    fn if_statement(
        &mut self,
        ir: &mut Ir,
        id: NodeId,
        (cond, if_true, if_false): (NodeId, NodeId, Option<NodeId>),
    ) -> NodeId {
        if let Some(value) = literal_bool(ir, cond) {
            self.rewrites += 1;
            return match (value, if_false) {
                (true, _) => if_true,
                (false, Some(if_false)) => if_false,
                (false, None) => ir.replace_kind(id, NodeKind::EmptyStatement),
            };
        }

        let else_empty = if_false.map_or(true, |e| is_empty(ir, e));
        if is_empty(ir, if_true) && else_empty && !ir.has_side_effects(cond) {
            self.rewrites += 1;
            return ir.replace_kind(id, NodeKind::EmptyStatement);
        }

        let if_false = if_false.filter(|&e| !is_empty(ir, e));
        let mut new_true = Self::unwrap_branch(ir, if_true);
        // `if (a) if (b) s; else t;` would bind the else to the inner if.
        if if_false.is_some() && matches!(ir.kind(new_true), NodeKind::IfStatement { .. }) {
            new_true = if_true;
        }
        let new_false = if_false.map(|e| Self::unwrap_branch(ir, e));

        let NodeKind::IfStatement {
            if_false: old_false, ..
        } = *ir.kind(id)
        else {
            return id;
        };
        if new_true == if_true && new_false == old_false {
            return id;
        }
        self.rewrites += 1;
        ir.replace_kind(
            id,
            NodeKind::IfStatement {
                cond,
                if_true: new_true,
                if_false: new_false,
            },
        )
    }
}

impl Transform for Simplifier {
    fn preorder(&mut self, ir: &mut Ir, id: NodeId) -> Rewrite {
        if ir.kind(id).is_expression() {
            Rewrite::Prune
        } else {
            Rewrite::Continue
        }
    }

    fn postorder(&mut self, ir: &mut Ir, original: NodeId, id: NodeId) -> NodeId {
        let out = match ir.kind(id) {
            NodeKind::BlockStatement { components } => {
                let components = components.clone();
                self.block(ir, id, &components)
            }
            NodeKind::IfStatement {
                cond,
                if_true,
                if_false,
            } => {
                let parts = (*cond, *if_true, *if_false);
                self.if_statement(ir, id, parts)
            }
            _ => id,
        };
        if out != id {
            trace!(node = ?original, "simplified");
        }
        out
    }
}

#[cfg(test)]
mod tests;
