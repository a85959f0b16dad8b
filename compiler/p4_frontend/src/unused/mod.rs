//! Removal of unreachable declarations.
//!
//! Reachability starts from the roots (`main`, externs, packages, block
//! prototypes, `match_kind`; every top-level declaration when there is no
//! `main`) and follows the reference map. Scanning a reached declaration
//! skips the removable declarations nested in it: those count only once a
//! use reaches them.

use p4_ir::transform::transform_children;
use p4_ir::{inspect, transform, Inspector, Ir, NodeId, NodeKind, Rewrite, Transform, Visit};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::context::FrontendContext;
use crate::pass_manager::{Analyses, Pass, PassError};
use crate::ref_map::ReferenceMap;

const MAIN: &str = "main";
/// Parser states that exist whether or not a transition names them.
const FIXED_STATES: [&str; 3] = ["start", "accept", "reject"];

pub struct RemoveUnusedDeclarations;

impl Pass for RemoveUnusedDeclarations {
    fn name(&self) -> &str {
        "RemoveUnusedDeclarations"
    }

    fn reads(&self) -> Analyses {
        Analyses::REFERENCES
    }

    fn run(&mut self, ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError> {
        Ok(remove_unused(&mut ctx.ir, root, &ctx.ref_map))
    }
}

#[tracing::instrument(level = "debug", skip_all)]
pub fn remove_unused(ir: &mut Ir, root: NodeId, refs: &ReferenceMap) -> NodeId {
    let reached = reachable(ir, root, refs);
    let mut remover = Remover {
        reached: &reached,
        removed: 0,
    };
    let new_root = transform(&mut remover, ir, root);
    debug!(
        reached = reached.len(),
        removed = remover.removed,
        "unused declarations removed"
    );
    new_root
}

/// Whether `decl` is a declaration this pass may delete.
fn is_removable(ir: &Ir, decl: NodeId) -> bool {
    match ir.kind(decl) {
        NodeKind::Action { .. }
        | NodeKind::Table { .. }
        | NodeKind::Function { .. }
        | NodeKind::Control { .. }
        | NodeKind::Parser { .. }
        | NodeKind::DeclInstance { .. }
        | NodeKind::DeclConstant { .. }
        | NodeKind::TypeStruct { .. }
        | NodeKind::TypeHeader { .. }
        | NodeKind::TypeHeaderUnion { .. }
        | NodeKind::TypeEnum { .. }
        | NodeKind::TypeTypedef { .. } => true,
        NodeKind::DeclVariable { init, .. } => !init.is_some_and(|i| ir.has_side_effects(i)),
        NodeKind::ParserState { name, .. } => !FIXED_STATES.contains(&ir.name_str(*name)),
        _ => false,
    }
}

fn is_root_kind(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::TypeExtern { .. }
            | NodeKind::TypePackage { .. }
            | NodeKind::TypeControl { .. }
            | NodeKind::TypeParser { .. }
            | NodeKind::DeclMatchKind { .. }
    )
}

/// Every declaration reachable from the roots of the program.
pub fn reachable(ir: &Ir, root: NodeId, refs: &ReferenceMap) -> FxHashSet<NodeId> {
    let decls = match ir.kind(root) {
        NodeKind::Program { decls } => decls.as_slice(),
        _ => &[],
    };
    let has_main = decls
        .iter()
        .any(|&d| matches!(ir.kind(d), NodeKind::DeclInstance { name, .. } if ir.name_str(*name) == MAIN));

    let mut scan = Scan {
        refs,
        reached: FxHashSet::default(),
        worklist: Vec::new(),
        current: root,
    };
    for &decl in decls {
        let kind = ir.kind(decl);
        let is_main =
            matches!(kind, NodeKind::DeclInstance { name, .. } if ir.name_str(*name) == MAIN);
        if !has_main || is_main || is_root_kind(kind) {
            scan.reach(decl);
        }
    }
    while let Some(decl) = scan.worklist.pop() {
        scan.current = decl;
        inspect(&mut scan, ir, decl);
    }
    scan.reached
}

struct Scan<'a> {
    refs: &'a ReferenceMap,
    reached: FxHashSet<NodeId>,
    worklist: Vec<NodeId>,
    /// The declaration being scanned.
    current: NodeId,
}

impl Scan<'_> {
    fn reach(&mut self, decl: NodeId) {
        if self.reached.insert(decl) {
            self.worklist.push(decl);
        }
    }
}

impl Inspector for Scan<'_> {
    fn preorder(&mut self, ir: &Ir, id: NodeId) -> Visit {
        if id != self.current && is_removable(ir, id) {
            return Visit::Prune;
        }
        if let Some(decl) = self.refs.get_declaration(id) {
            self.reach(decl);
        }
        if let NodeKind::Parser { states, .. } = ir.kind(id) {
            for &state in states {
                if !is_removable(ir, state) {
                    self.reach(state);
                }
            }
        }
        Visit::Continue
    }
}

struct Remover<'a> {
    reached: &'a FxHashSet<NodeId>,
    removed: usize,
}

impl Remover<'_> {
    fn keep(&mut self, ir: &Ir, list: &[NodeId]) -> Option<Vec<NodeId>> {
        let kept: Vec<NodeId> = list
            .iter()
            .copied()
            .filter(|&d| !is_removable(ir, d) || self.reached.contains(&d))
            .collect();
        if kept.len() == list.len() {
            return None;
        }
        for &d in list.iter().filter(|d| !kept.contains(d)) {
            trace!(decl = ir.decl_name_str(d), kind = ir.kind(d).tag(), "removing");
        }
        self.removed += list.len() - kept.len();
        Some(kept)
    }

    /// The node with its unreachable declarations dropped, if any were.
    fn pruned(&mut self, ir: &Ir, id: NodeId) -> Option<NodeKind> {
        match ir.kind(id).clone() {
            NodeKind::Program { decls } => {
                let decls = self.keep(ir, &decls)?;
                Some(NodeKind::Program { decls })
            }
            NodeKind::BlockStatement { components } => {
                let components = self.keep(ir, &components)?;
                Some(NodeKind::BlockStatement { components })
            }
            NodeKind::Control {
                name,
                type_params,
                params,
                ctor_params,
                locals,
                body,
            } => {
                let locals = self.keep(ir, &locals)?;
                Some(NodeKind::Control {
                    name,
                    type_params,
                    params,
                    ctor_params,
                    locals,
                    body,
                })
            }
            NodeKind::Parser {
                name,
                type_params,
                params,
                ctor_params,
                locals,
                states,
            } => {
                let new_locals = self.keep(ir, &locals);
                let new_states = self.keep(ir, &states);
                if new_locals.is_none() && new_states.is_none() {
                    return None;
                }
                Some(NodeKind::Parser {
                    name,
                    type_params,
                    params,
                    ctor_params,
                    locals: new_locals.unwrap_or(locals),
                    states: new_states.unwrap_or(states),
                })
            }
            _ => None,
        }
    }
}

impl Transform for Remover<'_> {
    fn preorder(&mut self, ir: &mut Ir, id: NodeId) -> Rewrite {
        if ir.kind(id).is_expression() {
            return Rewrite::Prune;
        }
        match self.pruned(ir, id) {
            Some(kind) => {
                let smaller = ir.replace_kind(id, kind);
                Rewrite::Replace(transform_children(self, ir, smaller))
            }
            None => Rewrite::Continue,
        }
    }
}

#[cfg(test)]
mod tests;
