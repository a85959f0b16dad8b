//! Synthesis of the declarations every P4 program implicitly has.
//!
//! - `accept` / `reject` states in every parser
//! - `action NoAction() {}` and `match_kind { exact, ternary, lpm }` when the
//!   program does not declare them
//! - action-list entries as calls, and a `default_action = NoAction()` for
//!   tables that have none
//! - omitted trailing arguments filled in from parameter defaults, for calls
//!   of top-level functions and actions and for instantiations of top-level
//!   packages, externs, controls and parsers

use p4_ir::{transform, Ir, Name, NodeId, NodeKind, Path, Transform};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::context::FrontendContext;
use crate::pass_manager::{Pass, PassError};

pub const NO_ACTION: &str = "NoAction";
pub const DEFAULT_ACTION: &str = "default_action";
pub const ACTIONS: &str = "actions";
const MATCH_KINDS: [&str; 3] = ["exact", "ternary", "lpm"];

pub struct CreateBuiltins;

impl Pass for CreateBuiltins {
    fn name(&self) -> &str {
        "CreateBuiltins"
    }

    fn run(&mut self, ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError> {
        Ok(create_builtins(&mut ctx.ir, root))
    }
}

#[tracing::instrument(level = "debug", skip_all)]
pub fn create_builtins(ir: &mut Ir, root: NodeId) -> NodeId {
    let mut top_level = FxHashMap::default();
    if let NodeKind::Program { decls } = ir.kind(root) {
        for &decl in decls {
            if let Some(name) = ir.kind(decl).declared_name() {
                top_level.entry(name).or_insert(decl);
            }
        }
    }
    let mut builtins = Builtins {
        top_level,
        no_action: ir.intern(NO_ACTION),
        added: 0,
    };
    let new_root = transform(&mut builtins, ir, root);
    debug!(added = builtins.added, "builtins created");
    new_root
}

struct Builtins {
    /// Top-level declarations by name, for default arguments.
    top_level: FxHashMap<Name, NodeId>,
    no_action: Name,
    added: usize,
}

impl Builtins {
    fn program(&mut self, ir: &mut Ir, id: NodeId, decls: Vec<NodeId>) -> NodeId {
        let mut prelude = Vec::new();

        let has_no_action = decls.iter().any(|&d| {
            matches!(ir.kind(d), NodeKind::Action { name, .. } if *name == self.no_action)
        });
        if !has_no_action {
            let body = ir.block(vec![]);
            prelude.push(ir.action(NO_ACTION, vec![], body));
        }

        let declared: Vec<&str> = decls
            .iter()
            .filter_map(|&d| match ir.kind(d) {
                NodeKind::DeclMatchKind { members } => Some(members.clone()),
                _ => None,
            })
            .flatten()
            .map(|m| ir.decl_name_str(m))
            .collect();
        let missing: Vec<&str> = MATCH_KINDS
            .iter()
            .copied()
            .filter(|kind| !declared.contains(kind))
            .collect();
        if !missing.is_empty() {
            prelude.push(ir.match_kind(&missing));
        }

        if prelude.is_empty() {
            return id;
        }
        self.added += prelude.len();
        prelude.extend(decls);
        ir.replace_kind(id, NodeKind::Program { decls: prelude })
    }

    fn parser(&mut self, ir: &mut Ir, id: NodeId, kind: NodeKind) -> NodeId {
        let NodeKind::Parser {
            name,
            type_params,
            params,
            ctor_params,
            locals,
            mut states,
        } = kind
        else {
            return id;
        };
        let mut changed = false;
        for builtin in ["accept", "reject"] {
            if !states.iter().any(|&s| ir.decl_name_str(s) == builtin) {
                states.push(ir.state(builtin, vec![], None));
                changed = true;
            }
        }
        if !changed {
            return id;
        }
        self.added += 1;
        ir.replace_kind(
            id,
            NodeKind::Parser {
                name,
                type_params,
                params,
                ctor_params,
                locals,
                states,
            },
        )
    }

    fn action_list(ir: &mut Ir, id: NodeId, elements: &[NodeId]) -> NodeId {
        if !elements
            .iter()
            .any(|&e| matches!(ir.kind(e), NodeKind::PathExpression { .. }))
        {
            return id;
        }
        let elements = elements
            .iter()
            .map(|&e| {
                if matches!(ir.kind(e), NodeKind::PathExpression { .. }) {
                    ir.call(e, vec![])
                } else {
                    e
                }
            })
            .collect();
        ir.replace_kind(id, NodeKind::ActionList { elements })
    }

    fn is_no_action_call(&self, ir: &Ir, element: NodeId) -> bool {
        let NodeKind::MethodCall { method, .. } = ir.kind(element) else {
            return false;
        };
        matches!(ir.kind(*method), NodeKind::PathExpression { path } if path.name == self.no_action)
    }

    fn table(&mut self, ir: &mut Ir, id: NodeId, kind: NodeKind) -> NodeId {
        let NodeKind::Table {
            name,
            params,
            mut properties,
        } = kind
        else {
            return id;
        };
        if properties
            .iter()
            .any(|&p| property_named(ir, p, DEFAULT_ACTION))
        {
            return id;
        }

        let actions = properties
            .iter()
            .position(|&p| property_named(ir, p, ACTIONS));
        match actions {
            Some(index) => {
                let property = properties[index];
                if let NodeKind::Property {
                    name: prop_name,
                    value,
                    is_const,
                } = ir.kind(property).clone()
                {
                    if let NodeKind::ActionList { elements } = ir.kind(value).clone() {
                        if !elements.iter().any(|&e| self.is_no_action_call(ir, e)) {
                            let mut elements = elements;
                            let callee = ir.path(NO_ACTION);
                            elements.push(ir.call(callee, vec![]));
                            let list = ir.replace_kind(value, NodeKind::ActionList { elements });
                            properties[index] = ir.replace_kind(
                                property,
                                NodeKind::Property {
                                    name: prop_name,
                                    value: list,
                                    is_const,
                                },
                            );
                        }
                    }
                }
            }
            None => {
                let callee = ir.path(NO_ACTION);
                let call = ir.call(callee, vec![]);
                let list = ir.action_list(vec![call]);
                properties.push(ir.property(ACTIONS, list));
            }
        }

        let callee = ir.path(NO_ACTION);
        let call = ir.call(callee, vec![]);
        let value = ir.expression_value(call);
        properties.push(ir.property(DEFAULT_ACTION, value));
        self.added += 1;
        ir.replace_kind(
            id,
            NodeKind::Table {
                name,
                params,
                properties,
            },
        )
    }

    /// Parameters of the top-level callable or constructor named by `path`.
    ///
    /// For externs the constructor overload is picked by the argument count.
    fn callee_params(&self, ir: &Ir, path: Path, given: usize, construct: bool) -> Option<Vec<NodeId>> {
        let decl = *self.top_level.get(&path.name)?;
        match ir.kind(decl) {
            NodeKind::Function { params, .. } | NodeKind::Action { params, .. } if !construct => {
                Some(params.clone())
            }
            NodeKind::TypePackage { ctor_params, .. }
            | NodeKind::Control { ctor_params, .. }
            | NodeKind::Parser { ctor_params, .. }
                if construct =>
            {
                Some(ctor_params.clone())
            }
            NodeKind::TypeExtern { name, methods, .. } if construct => methods
                .iter()
                .filter_map(|&m| match ir.kind(m) {
                    NodeKind::Method {
                        name: method_name,
                        params,
                        ..
                    } if method_name == name && params.len() >= given => Some(params.clone()),
                    _ => None,
                })
                .min_by_key(Vec::len),
            _ => None,
        }
    }

    /// `args` extended with copies of the defaults of the omitted trailing
    /// parameters, or `None` when nothing can be filled in.
    fn fill_defaults(ir: &mut Ir, params: &[NodeId], args: &[NodeId]) -> Option<Vec<NodeId>> {
        if args.len() >= params.len() {
            return None;
        }
        let mut defaults = Vec::new();
        for &param in &params[args.len()..] {
            match ir.kind(param) {
                NodeKind::Parameter {
                    default_value: Some(value),
                    ..
                } => defaults.push(*value),
                _ => return None,
            }
        }
        let mut filled = args.to_vec();
        for value in defaults {
            filled.push(ir.deep_clone(value));
        }
        Some(filled)
    }

    fn call(&mut self, ir: &mut Ir, id: NodeId, kind: NodeKind) -> NodeId {
        let NodeKind::MethodCall {
            method,
            type_args,
            args,
        } = kind
        else {
            return id;
        };
        let NodeKind::PathExpression { path } = *ir.kind(method) else {
            return id;
        };
        let Some(params) = self.callee_params(ir, path, args.len(), false) else {
            return id;
        };
        let Some(args) = Self::fill_defaults(ir, &params, &args) else {
            return id;
        };
        self.added += 1;
        ir.replace_kind(
            id,
            NodeKind::MethodCall {
                method,
                type_args,
                args,
            },
        )
    }

    fn instance(&mut self, ir: &mut Ir, id: NodeId, kind: NodeKind) -> NodeId {
        let NodeKind::DeclInstance { name, ty, args } = kind else {
            return id;
        };
        let base = match ir.kind(ty) {
            NodeKind::TypeSpecialized { base, .. } => *base,
            _ => ty,
        };
        let NodeKind::TypeName { path } = *ir.kind(base) else {
            return id;
        };
        let Some(params) = self.callee_params(ir, path, args.len(), true) else {
            return id;
        };
        let Some(args) = Self::fill_defaults(ir, &params, &args) else {
            return id;
        };
        self.added += 1;
        ir.replace_kind(id, NodeKind::DeclInstance { name, ty, args })
    }
}

fn property_named(ir: &Ir, property: NodeId, wanted: &str) -> bool {
    matches!(ir.kind(property), NodeKind::Property { name, .. } if ir.name_str(*name) == wanted)
}

impl Transform for Builtins {
    fn postorder(&mut self, ir: &mut Ir, _original: NodeId, id: NodeId) -> NodeId {
        let kind = ir.kind(id).clone();
        match kind {
            NodeKind::Program { decls } => self.program(ir, id, decls),
            NodeKind::Parser { .. } => self.parser(ir, id, kind),
            NodeKind::ActionList { elements } => Self::action_list(ir, id, &elements),
            NodeKind::Table { .. } => self.table(ir, id, kind),
            NodeKind::MethodCall { .. } => self.call(ir, id, kind),
            NodeKind::DeclInstance { .. } => self.instance(ir, id, kind),
            _ => id,
        }
    }
}

#[cfg(test)]
mod tests;
