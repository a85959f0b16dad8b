//! Lifting of table parameters into control locals.
//!
//! ```text
//! control c(inout bit<8> y) {            control c(inout bit<8> y) {
//!     table t(inout bit<8> x) { .. }         bit<8> x_0;
//!     apply { t.apply(y); }          =>      table t() { .. }
//! }                                          apply { { x_0 = y; t.apply(); y = x_0; } }
//!                                        }
//! ```
//!
//! `in`, `inout` and directionless parameters are copied in before the apply;
//! `out` and `inout` parameters are copied out after it. When the apply sits
//! in an `if` condition the copy-out starts both branches; in a `switch` it
//! follows the statement.

use p4_ir::transform::{transform_children, transform_list};
use p4_ir::{transform, Direction, Ir, Name, NodeId, NodeKind, Path, Rewrite, Transform};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::context::FrontendContext;
use crate::pass_manager::{Analyses, Pass, PassError};
use crate::ref_map::ReferenceMap;

pub struct RemoveTableParameters;

impl Pass for RemoveTableParameters {
    fn name(&self) -> &str {
        "RemoveTableParameters"
    }

    fn reads(&self) -> Analyses {
        Analyses::REFERENCES
    }

    fn run(&mut self, ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError> {
        Ok(remove_table_parameters(&mut ctx.ir, root, &mut ctx.ref_map))
    }
}

#[tracing::instrument(level = "debug", skip_all)]
pub fn remove_table_parameters(ir: &mut Ir, root: NodeId, refs: &mut ReferenceMap) -> NodeId {
    let mut lifter = Lifter {
        refs,
        tables: FxHashMap::default(),
        renamed: FxHashMap::default(),
    };
    let new_root = transform(&mut lifter, ir, root);
    debug!(
        tables = lifter.tables.len(),
        parameters = lifter.renamed.len(),
        "table parameters lifted"
    );
    new_root
}

/// A table parameter turned into a control local.
#[derive(Copy, Clone)]
struct Lifted {
    direction: Direction,
    local: Name,
}

struct Lifter<'a> {
    refs: &'a mut ReferenceMap,
    /// Lifted parameters of each table, in declaration order.
    tables: FxHashMap<NodeId, Vec<Lifted>>,
    /// Parameter declaration → name of its local.
    renamed: FxHashMap<NodeId, Name>,
}

impl Lifter<'_> {
    fn control(&mut self, ir: &mut Ir, id: NodeId) -> Rewrite {
        let NodeKind::Control {
            name,
            type_params,
            params,
            ctor_params,
            locals,
            body,
        } = ir.kind(id).clone()
        else {
            return Rewrite::Continue;
        };
        let has_parameters = |ir: &Ir, decl: NodeId| {
            matches!(ir.kind(decl), NodeKind::Table { params, .. } if !params.is_empty())
        };
        if !locals.iter().any(|&l| has_parameters(ir, l)) {
            return Rewrite::Prune;
        }

        let mut new_locals = Vec::with_capacity(locals.len());
        for local in locals {
            if has_parameters(ir, local) {
                new_locals.extend(self.lift(ir, local));
            }
            new_locals.push(transform(self, ir, local));
        }
        let body = transform(self, ir, body);
        Rewrite::Replace(ir.replace_kind(
            id,
            NodeKind::Control {
                name,
                type_params,
                params,
                ctor_params,
                locals: new_locals,
                body,
            },
        ))
    }

    /// Declare a local per parameter of `table`.
    fn lift(&mut self, ir: &mut Ir, table: NodeId) -> Vec<NodeId> {
        let NodeKind::Table { params, .. } = ir.kind(table).clone() else {
            return Vec::new();
        };
        let mut decls = Vec::with_capacity(params.len());
        let mut lifted = Vec::with_capacity(params.len());
        for param in params {
            let NodeKind::Parameter {
                name,
                direction,
                ty,
                ..
            } = *ir.kind(param)
            else {
                continue;
            };
            let local = ir.intern(&self.refs.new_name(ir.name_str(name)));
            let ty = ir.deep_clone(ty);
            decls.push(ir.replace_kind(
                param,
                NodeKind::DeclVariable {
                    name: local,
                    ty,
                    init: None,
                },
            ));
            self.renamed.insert(param, local);
            lifted.push(Lifted { direction, local });
        }
        trace!(table = ir.decl_name_str(table), count = lifted.len(), "lifted");
        self.tables.insert(table, lifted);
        decls
    }

    /// The table a lifted `t.apply(..)` call applies.
    fn lifted_apply(&self, ir: &Ir, call: NodeId) -> Option<NodeId> {
        let NodeKind::MethodCall { method, .. } = ir.kind(call) else {
            return None;
        };
        let NodeKind::Member { expr, member } = ir.kind(*method) else {
            return None;
        };
        if ir.name_str(*member) != "apply" {
            return None;
        }
        let table = self.refs.get_declaration(*expr)?;
        self.tables.contains_key(&table).then_some(table)
    }

    /// First lifted apply call in the expression `expr`.
    fn find_apply(&self, ir: &Ir, expr: NodeId) -> Option<(NodeId, NodeId)> {
        if let Some(table) = self.lifted_apply(ir, expr) {
            return Some((expr, table));
        }
        ir.kind(expr)
            .children()
            .into_iter()
            .find_map(|child| self.find_apply(ir, child))
    }

    /// Copy-in and copy-out assignments of an apply of `table`, and the
    /// same call without arguments.
    fn split(&self, ir: &mut Ir, call: NodeId, table: NodeId) -> Split {
        let NodeKind::MethodCall { method, args, .. } = ir.kind(call).clone() else {
            return Split {
                copy_in: Vec::new(),
                call,
                copy_out: Vec::new(),
            };
        };
        let lifted = self.tables.get(&table).cloned().unwrap_or_default();
        let mut copy_in = Vec::new();
        let mut copy_out = Vec::new();
        for (param, arg) in lifted.iter().zip(args) {
            if param.direction.is_in() || param.direction == Direction::None {
                let local = local_path(ir, param.local);
                let value = ir.deep_clone(arg);
                copy_in.push(ir.assign(local, value));
            }
            if param.direction.is_out() {
                let local = local_path(ir, param.local);
                let target = ir.deep_clone(arg);
                copy_out.push(ir.assign(target, local));
            }
        }
        let call = ir.replace_kind(
            call,
            NodeKind::MethodCall {
                method,
                type_args: Vec::new(),
                args: Vec::new(),
            },
        );
        Split {
            copy_in,
            call,
            copy_out,
        }
    }

    fn if_statement(&mut self, ir: &mut Ir, id: NodeId) -> Rewrite {
        let NodeKind::IfStatement {
            cond,
            if_true,
            if_false,
        } = *ir.kind(id)
        else {
            return Rewrite::Continue;
        };
        let Some((call, table)) = self.find_apply(ir, cond) else {
            return Rewrite::Continue;
        };
        let split = self.split(ir, call, table);
        let cond = transform(&mut Swap { from: call, to: split.call }, ir, cond);
        let if_true = transform(self, ir, if_true);
        let if_true = prepend(ir, &split.copy_out, if_true);
        let if_false = match if_false {
            Some(branch) => {
                let branch = transform(self, ir, branch);
                let copy_out = clone_all(ir, &split.copy_out);
                Some(prepend(ir, &copy_out, branch))
            }
            None if split.copy_out.is_empty() => None,
            None => {
                let copy_out = clone_all(ir, &split.copy_out);
                Some(ir.block(copy_out))
            }
        };
        let statement = ir.replace_kind(
            id,
            NodeKind::IfStatement {
                cond,
                if_true,
                if_false,
            },
        );
        Rewrite::Replace(wrap(ir, split.copy_in, statement, Vec::new()))
    }

    fn switch_statement(&mut self, ir: &mut Ir, id: NodeId) -> Rewrite {
        let NodeKind::SwitchStatement { expr, cases } = ir.kind(id).clone() else {
            return Rewrite::Continue;
        };
        let Some((call, table)) = self.find_apply(ir, expr) else {
            return Rewrite::Continue;
        };
        let split = self.split(ir, call, table);
        let expr = transform(&mut Swap { from: call, to: split.call }, ir, expr);
        let (cases, _) = transform_list(self, ir, &cases);
        let statement = ir.replace_kind(id, NodeKind::SwitchStatement { expr, cases });
        Rewrite::Replace(wrap(ir, split.copy_in, statement, split.copy_out))
    }
}

struct Split {
    copy_in: Vec<NodeId>,
    call: NodeId,
    copy_out: Vec<NodeId>,
}

fn local_path(ir: &mut Ir, name: Name) -> NodeId {
    ir.synthesize(NodeKind::PathExpression {
        path: Path::new(name),
    })
}

fn clone_all(ir: &mut Ir, statements: &[NodeId]) -> Vec<NodeId> {
    statements.iter().map(|&s| ir.deep_clone(s)).collect()
}

/// `{ before; statement; after }`, or `statement` alone.
fn wrap(ir: &mut Ir, before: Vec<NodeId>, statement: NodeId, after: Vec<NodeId>) -> NodeId {
    if before.is_empty() && after.is_empty() {
        return statement;
    }
    let mut components = before;
    components.push(statement);
    components.extend(after);
    ir.block(components)
}

/// `statements` followed by `branch`, merged into one block.
fn prepend(ir: &mut Ir, statements: &[NodeId], branch: NodeId) -> NodeId {
    if statements.is_empty() {
        return branch;
    }
    let mut components = statements.to_vec();
    match ir.kind(branch) {
        NodeKind::BlockStatement { components: inner } => {
            components.extend(inner.iter().copied());
            ir.replace_kind(branch, NodeKind::BlockStatement { components })
        }
        _ => {
            components.push(branch);
            ir.block(components)
        }
    }
}

/// Replaces one node.
struct Swap {
    from: NodeId,
    to: NodeId,
}

impl Transform for Swap {
    fn preorder(&mut self, _ir: &mut Ir, id: NodeId) -> Rewrite {
        if id == self.from {
            Rewrite::Replace(self.to)
        } else {
            Rewrite::Continue
        }
    }
}

impl Transform for Lifter<'_> {
    fn preorder(&mut self, ir: &mut Ir, id: NodeId) -> Rewrite {
        match ir.kind(id) {
            NodeKind::Control { .. } => self.control(ir, id),
            NodeKind::Table {
                name, properties, ..
            } if self.tables.contains_key(&id) => {
                let kind = NodeKind::Table {
                    name: *name,
                    params: Vec::new(),
                    properties: properties.clone(),
                };
                let stripped = ir.replace_kind(id, kind);
                Rewrite::Replace(transform_children(self, ir, stripped))
            }
            NodeKind::MethodCallStatement { call } => {
                let call = *call;
                let Some(table) = self.lifted_apply(ir, call) else {
                    return Rewrite::Continue;
                };
                let split = self.split(ir, call, table);
                let statement = ir.replace_kind(id, NodeKind::MethodCallStatement { call: split.call });
                Rewrite::Replace(wrap(ir, split.copy_in, statement, split.copy_out))
            }
            NodeKind::IfStatement { .. } => self.if_statement(ir, id),
            NodeKind::SwitchStatement { .. } => self.switch_statement(ir, id),
            // Top-level declarations other than controls hold no tables.
            NodeKind::Parser { .. } | NodeKind::Function { .. } | NodeKind::Action { .. } => {
                Rewrite::Prune
            }
            _ => Rewrite::Continue,
        }
    }

    fn postorder(&mut self, ir: &mut Ir, original: NodeId, id: NodeId) -> NodeId {
        if !matches!(ir.kind(id), NodeKind::PathExpression { .. }) {
            return id;
        }
        let local = self
            .refs
            .get_declaration(original)
            .and_then(|decl| self.renamed.get(&decl).copied());
        match local {
            Some(name) => ir.replace_kind(
                id,
                NodeKind::PathExpression {
                    path: Path::new(name),
                },
            ),
            None => id,
        }
    }
}
