//! Ordered child enumeration and child substitution for every node kind.
//!
//! Both functions visit children in the same order; the walkers in
//! [`visitor`](crate::visitor) and [`transform`](crate::transform) rely on it.

use super::{NodeId, NodeKind};

fn each<F: FnMut(NodeId)>(ids: &[NodeId], f: &mut F) {
    for &id in ids {
        f(id);
    }
}

fn each_opt<F: FnMut(NodeId)>(id: Option<NodeId>, f: &mut F) {
    if let Some(id) = id {
        f(id);
    }
}

fn map<F: FnMut(NodeId) -> NodeId>(ids: &[NodeId], f: &mut F) -> Vec<NodeId> {
    ids.iter().map(|&id| f(id)).collect()
}

fn map_opt<F: FnMut(NodeId) -> NodeId>(id: Option<NodeId>, f: &mut F) -> Option<NodeId> {
    id.map(f)
}

impl NodeKind {
    /// Call `f` on each child in traversal order.
    pub fn for_each_child<F: FnMut(NodeId)>(&self, mut f: F) {
        let f = &mut f;
        match self {
            NodeKind::Program { decls } => each(decls, f),

            NodeKind::TypeBits { .. }
            | NodeKind::TypeBool
            | NodeKind::TypeVoid
            | NodeKind::TypeString
            | NodeKind::TypeInfInt
            | NodeKind::TypeName { .. }
            | NodeKind::TypeVar { .. }
            | NodeKind::DeclarationId { .. }
            | NodeKind::Constant { .. }
            | NodeKind::BoolLiteral { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::PathExpression { .. }
            | NodeKind::DefaultExpression
            | NodeKind::ExitStatement
            | NodeKind::EmptyStatement => {}

            NodeKind::TypeSpecialized { base, args } => {
                f(*base);
                each(args, f);
            }
            NodeKind::TypeTuple { components } | NodeKind::ListExpression { components } => {
                each(components, f);
            }
            NodeKind::StructField { ty, .. } | NodeKind::TypeTypedef { ty, .. } => f(*ty),
            NodeKind::TypeStruct { fields, .. }
            | NodeKind::TypeHeader { fields, .. }
            | NodeKind::TypeHeaderUnion { fields, .. } => each(fields, f),
            NodeKind::TypeEnum { members, .. } | NodeKind::DeclMatchKind { members } => {
                each(members, f);
            }
            NodeKind::TypeExtern {
                type_params,
                methods,
                ..
            } => {
                each(type_params, f);
                each(methods, f);
            }
            NodeKind::Method {
                type_params,
                params,
                return_type,
                ..
            } => {
                each(type_params, f);
                each(params, f);
                f(*return_type);
            }
            NodeKind::TypePackage {
                type_params,
                ctor_params,
                ..
            } => {
                each(type_params, f);
                each(ctor_params, f);
            }
            NodeKind::TypeControl {
                type_params,
                params,
                ..
            }
            | NodeKind::TypeParser {
                type_params,
                params,
                ..
            } => {
                each(type_params, f);
                each(params, f);
            }
            NodeKind::Parameter {
                ty, default_value, ..
            } => {
                f(*ty);
                each_opt(*default_value, f);
            }
            NodeKind::DeclVariable { ty, init, .. } => {
                f(*ty);
                each_opt(*init, f);
            }
            NodeKind::DeclConstant { ty, init, .. } => {
                f(*ty);
                f(*init);
            }
            NodeKind::DeclInstance { ty, args, .. } => {
                f(*ty);
                each(args, f);
            }
            NodeKind::Function {
                type_params,
                params,
                return_type,
                body,
                ..
            } => {
                each(type_params, f);
                each(params, f);
                f(*return_type);
                f(*body);
            }
            NodeKind::Action { params, body, .. } => {
                each(params, f);
                f(*body);
            }
            NodeKind::Control {
                type_params,
                params,
                ctor_params,
                locals,
                body,
                ..
            } => {
                each(type_params, f);
                each(params, f);
                each(ctor_params, f);
                each(locals, f);
                f(*body);
            }
            NodeKind::Parser {
                type_params,
                params,
                ctor_params,
                locals,
                states,
                ..
            } => {
                each(type_params, f);
                each(params, f);
                each(ctor_params, f);
                each(locals, f);
                each(states, f);
            }
            NodeKind::ParserState {
                components,
                transition,
                ..
            } => {
                each(components, f);
                each_opt(*transition, f);
            }
            NodeKind::Table {
                params, properties, ..
            } => {
                each(params, f);
                each(properties, f);
            }
            NodeKind::Property { value, .. } => f(*value),
            NodeKind::Key { elements } | NodeKind::ActionList { elements } => each(elements, f),
            NodeKind::KeyElement { expr, match_kind } => {
                f(*expr);
                f(*match_kind);
            }
            NodeKind::ExpressionValue { expr } => f(*expr),
            NodeKind::Member { expr, .. } => f(*expr),
            NodeKind::Slice { expr, high, low } => {
                f(*expr);
                f(*high);
                f(*low);
            }
            NodeKind::Unary { operand, .. } => f(*operand),
            NodeKind::Binary { left, right, .. } | NodeKind::Assignment { left, right } => {
                f(*left);
                f(*right);
            }
            NodeKind::Mux {
                cond,
                if_true,
                if_false,
            } => {
                f(*cond);
                f(*if_true);
                f(*if_false);
            }
            NodeKind::Cast { ty, expr } => {
                f(*ty);
                f(*expr);
            }
            NodeKind::MethodCall {
                method,
                type_args,
                args,
            } => {
                f(*method);
                each(type_args, f);
                each(args, f);
            }
            NodeKind::SelectExpression { select, cases } => {
                f(*select);
                each(cases, f);
            }
            NodeKind::SelectCase { keyset, state } => {
                f(*keyset);
                f(*state);
            }
            NodeKind::MethodCallStatement { call } => f(*call),
            NodeKind::IfStatement {
                cond,
                if_true,
                if_false,
            } => {
                f(*cond);
                f(*if_true);
                each_opt(*if_false, f);
            }
            NodeKind::BlockStatement { components } => each(components, f),
            NodeKind::ReturnStatement { expr } => each_opt(*expr, f),
            NodeKind::SwitchStatement { expr, cases } => {
                f(*expr);
                each(cases, f);
            }
            NodeKind::SwitchCase { label, stmt } => {
                f(*label);
                each_opt(*stmt, f);
            }
        }
    }

    /// Collect the children in traversal order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.for_each_child(|id| out.push(id));
        out
    }

    /// Rebuild this kind with every child replaced by `f(child)`.
    ///
    /// Leaf attributes are copied unchanged; `f` is called in traversal order.
    #[must_use]
    pub fn map_children<F: FnMut(NodeId) -> NodeId>(&self, mut f: F) -> NodeKind {
        let f = &mut f;
        match self {
            NodeKind::Program { decls } => NodeKind::Program {
                decls: map(decls, f),
            },

            NodeKind::TypeBits { .. }
            | NodeKind::TypeBool
            | NodeKind::TypeVoid
            | NodeKind::TypeString
            | NodeKind::TypeInfInt
            | NodeKind::TypeName { .. }
            | NodeKind::TypeVar { .. }
            | NodeKind::DeclarationId { .. }
            | NodeKind::Constant { .. }
            | NodeKind::BoolLiteral { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::PathExpression { .. }
            | NodeKind::DefaultExpression
            | NodeKind::ExitStatement
            | NodeKind::EmptyStatement => self.clone(),

            NodeKind::TypeSpecialized { base, args } => {
                let base = f(*base);
                NodeKind::TypeSpecialized {
                    base,
                    args: map(args, f),
                }
            }
            NodeKind::TypeTuple { components } => NodeKind::TypeTuple {
                components: map(components, f),
            },
            NodeKind::ListExpression { components } => NodeKind::ListExpression {
                components: map(components, f),
            },
            NodeKind::StructField { name, ty } => NodeKind::StructField {
                name: *name,
                ty: f(*ty),
            },
            NodeKind::TypeTypedef { name, ty } => NodeKind::TypeTypedef {
                name: *name,
                ty: f(*ty),
            },
            NodeKind::TypeStruct { name, fields } => NodeKind::TypeStruct {
                name: *name,
                fields: map(fields, f),
            },
            NodeKind::TypeHeader { name, fields } => NodeKind::TypeHeader {
                name: *name,
                fields: map(fields, f),
            },
            NodeKind::TypeHeaderUnion { name, fields } => NodeKind::TypeHeaderUnion {
                name: *name,
                fields: map(fields, f),
            },
            NodeKind::TypeEnum { name, members } => NodeKind::TypeEnum {
                name: *name,
                members: map(members, f),
            },
            NodeKind::DeclMatchKind { members } => NodeKind::DeclMatchKind {
                members: map(members, f),
            },
            NodeKind::TypeExtern {
                name,
                type_params,
                methods,
            } => {
                let type_params = map(type_params, f);
                NodeKind::TypeExtern {
                    name: *name,
                    type_params,
                    methods: map(methods, f),
                }
            }
            NodeKind::Method {
                name,
                type_params,
                params,
                return_type,
            } => {
                let type_params = map(type_params, f);
                let params = map(params, f);
                NodeKind::Method {
                    name: *name,
                    type_params,
                    params,
                    return_type: f(*return_type),
                }
            }
            NodeKind::TypePackage {
                name,
                type_params,
                ctor_params,
            } => {
                let type_params = map(type_params, f);
                NodeKind::TypePackage {
                    name: *name,
                    type_params,
                    ctor_params: map(ctor_params, f),
                }
            }
            NodeKind::TypeControl {
                name,
                type_params,
                params,
            } => {
                let type_params = map(type_params, f);
                NodeKind::TypeControl {
                    name: *name,
                    type_params,
                    params: map(params, f),
                }
            }
            NodeKind::TypeParser {
                name,
                type_params,
                params,
            } => {
                let type_params = map(type_params, f);
                NodeKind::TypeParser {
                    name: *name,
                    type_params,
                    params: map(params, f),
                }
            }
            NodeKind::Parameter {
                name,
                direction,
                ty,
                default_value,
            } => {
                let ty = f(*ty);
                NodeKind::Parameter {
                    name: *name,
                    direction: *direction,
                    ty,
                    default_value: map_opt(*default_value, f),
                }
            }
            NodeKind::DeclVariable { name, ty, init } => {
                let ty = f(*ty);
                NodeKind::DeclVariable {
                    name: *name,
                    ty,
                    init: map_opt(*init, f),
                }
            }
            NodeKind::DeclConstant { name, ty, init } => {
                let ty = f(*ty);
                NodeKind::DeclConstant {
                    name: *name,
                    ty,
                    init: f(*init),
                }
            }
            NodeKind::DeclInstance { name, ty, args } => {
                let ty = f(*ty);
                NodeKind::DeclInstance {
                    name: *name,
                    ty,
                    args: map(args, f),
                }
            }
            NodeKind::Function {
                name,
                type_params,
                params,
                return_type,
                body,
            } => {
                let type_params = map(type_params, f);
                let params = map(params, f);
                let return_type = f(*return_type);
                NodeKind::Function {
                    name: *name,
                    type_params,
                    params,
                    return_type,
                    body: f(*body),
                }
            }
            NodeKind::Action { name, params, body } => {
                let params = map(params, f);
                NodeKind::Action {
                    name: *name,
                    params,
                    body: f(*body),
                }
            }
            NodeKind::Control {
                name,
                type_params,
                params,
                ctor_params,
                locals,
                body,
            } => {
                let type_params = map(type_params, f);
                let params = map(params, f);
                let ctor_params = map(ctor_params, f);
                let locals = map(locals, f);
                NodeKind::Control {
                    name: *name,
                    type_params,
                    params,
                    ctor_params,
                    locals,
                    body: f(*body),
                }
            }
            NodeKind::Parser {
                name,
                type_params,
                params,
                ctor_params,
                locals,
                states,
            } => {
                let type_params = map(type_params, f);
                let params = map(params, f);
                let ctor_params = map(ctor_params, f);
                let locals = map(locals, f);
                NodeKind::Parser {
                    name: *name,
                    type_params,
                    params,
                    ctor_params,
                    locals,
                    states: map(states, f),
                }
            }
            NodeKind::ParserState {
                name,
                components,
                transition,
            } => {
                let components = map(components, f);
                NodeKind::ParserState {
                    name: *name,
                    components,
                    transition: map_opt(*transition, f),
                }
            }
            NodeKind::Table {
                name,
                params,
                properties,
            } => {
                let params = map(params, f);
                NodeKind::Table {
                    name: *name,
                    params,
                    properties: map(properties, f),
                }
            }
            NodeKind::Property {
                name,
                value,
                is_const,
            } => NodeKind::Property {
                name: *name,
                value: f(*value),
                is_const: *is_const,
            },
            NodeKind::Key { elements } => NodeKind::Key {
                elements: map(elements, f),
            },
            NodeKind::ActionList { elements } => NodeKind::ActionList {
                elements: map(elements, f),
            },
            NodeKind::KeyElement { expr, match_kind } => {
                let expr = f(*expr);
                NodeKind::KeyElement {
                    expr,
                    match_kind: f(*match_kind),
                }
            }
            NodeKind::ExpressionValue { expr } => NodeKind::ExpressionValue { expr: f(*expr) },
            NodeKind::Member { expr, member } => NodeKind::Member {
                expr: f(*expr),
                member: *member,
            },
            NodeKind::Slice { expr, high, low } => {
                let expr = f(*expr);
                let high = f(*high);
                NodeKind::Slice {
                    expr,
                    high,
                    low: f(*low),
                }
            }
            NodeKind::Unary { op, operand } => NodeKind::Unary {
                op: *op,
                operand: f(*operand),
            },
            NodeKind::Binary { op, left, right } => {
                let left = f(*left);
                NodeKind::Binary {
                    op: *op,
                    left,
                    right: f(*right),
                }
            }
            NodeKind::Assignment { left, right } => {
                let left = f(*left);
                NodeKind::Assignment {
                    left,
                    right: f(*right),
                }
            }
            NodeKind::Mux {
                cond,
                if_true,
                if_false,
            } => {
                let cond = f(*cond);
                let if_true = f(*if_true);
                NodeKind::Mux {
                    cond,
                    if_true,
                    if_false: f(*if_false),
                }
            }
            NodeKind::Cast { ty, expr } => {
                let ty = f(*ty);
                NodeKind::Cast { ty, expr: f(*expr) }
            }
            NodeKind::MethodCall {
                method,
                type_args,
                args,
            } => {
                let method = f(*method);
                let type_args = map(type_args, f);
                NodeKind::MethodCall {
                    method,
                    type_args,
                    args: map(args, f),
                }
            }
            NodeKind::SelectExpression { select, cases } => {
                let select = f(*select);
                NodeKind::SelectExpression {
                    select,
                    cases: map(cases, f),
                }
            }
            NodeKind::SelectCase { keyset, state } => {
                let keyset = f(*keyset);
                NodeKind::SelectCase {
                    keyset,
                    state: f(*state),
                }
            }
            NodeKind::MethodCallStatement { call } => {
                NodeKind::MethodCallStatement { call: f(*call) }
            }
            NodeKind::IfStatement {
                cond,
                if_true,
                if_false,
            } => {
                let cond = f(*cond);
                let if_true = f(*if_true);
                NodeKind::IfStatement {
                    cond,
                    if_true,
                    if_false: map_opt(*if_false, f),
                }
            }
            NodeKind::BlockStatement { components } => NodeKind::BlockStatement {
                components: map(components, f),
            },
            NodeKind::ReturnStatement { expr } => NodeKind::ReturnStatement {
                expr: map_opt(*expr, f),
            },
            NodeKind::SwitchStatement { expr, cases } => {
                let expr = f(*expr);
                NodeKind::SwitchStatement {
                    expr,
                    cases: map(cases, f),
                }
            }
            NodeKind::SwitchCase { label, stmt } => {
                let label = f(*label);
                NodeKind::SwitchCase {
                    label,
                    stmt: map_opt(*stmt, f),
                }
            }
        }
    }
}
