//! Statements and declarations.

use p4_diagnostic::ErrorCode;
use p4_ir::{Ir, NodeId, NodeKind};
use p4_types::{Type, TypeId};

use super::Checker;

impl Checker<'_> {
    pub(super) fn assignment(&mut self, ir: &mut Ir, id: NodeId, left: NodeId, right: NodeId) -> NodeId {
        let target = self.type_of(left);
        if target.is_error() {
            return id;
        }
        if !self.types.is_left_value(left) {
            self.error(
                ir,
                ErrorCode::E2006,
                left,
                "left side of an assignment must be assignable".to_owned(),
            );
            return id;
        }
        let new_right = self.coerce(ir, right, target);
        if new_right == right {
            return id;
        }
        ir.replace_kind(
            id,
            NodeKind::Assignment {
                left,
                right: new_right,
            },
        )
    }

    pub(super) fn return_statement(&mut self, ir: &mut Ir, id: NodeId, expr: Option<NodeId>) -> NodeId {
        let return_type = match self.enclosing_callable(ir) {
            Some(NodeKind::Function { return_type, .. }) => Some(*return_type),
            Some(_) => None,
            None => {
                self.error(
                    ir,
                    ErrorCode::E2010,
                    id,
                    "`return` outside of a function, action or block".to_owned(),
                );
                return id;
            }
        };
        let expected = match return_type {
            Some(syntax) => self.syntax_type(ir, syntax),
            None => TypeId::VOID,
        };
        match expr {
            Some(value) if expected == TypeId::VOID => {
                self.error(
                    ir,
                    ErrorCode::E2010,
                    value,
                    "cannot return a value here".to_owned(),
                );
                id
            }
            None if expected != TypeId::VOID && !expected.is_error() => {
                let ty = self.display(ir, expected);
                self.error(
                    ir,
                    ErrorCode::E2010,
                    id,
                    format!("missing return value of type `{ty}`"),
                );
                id
            }
            None => id,
            Some(value) => {
                let coerced = self.coerce(ir, value, expected);
                if coerced == value {
                    id
                } else {
                    ir.replace_kind(id, NodeKind::ReturnStatement { expr: Some(coerced) })
                }
            }
        }
    }

    pub(super) fn exit_statement(&mut self, ir: &Ir, id: NodeId) {
        let context = match self.enclosing_callable(ir) {
            Some(NodeKind::Parser { .. }) => "a parser",
            Some(NodeKind::Function { .. }) => "a function",
            Some(_) => return,
            None => "this context",
        };
        self.error(
            ir,
            ErrorCode::E2010,
            id,
            format!("`exit` is not allowed in {context}"),
        );
    }

    pub(super) fn switch_statement(&mut self, ir: &Ir, expr: NodeId) {
        let ty = self.type_of(expr);
        let switchable = ty.is_error()
            || matches!(
                self.types.pool().get(ty),
                Type::ActionEnum { .. } | Type::Enum { .. } | Type::Bits { .. }
            );
        if !switchable {
            let ty = self.display(ir, ty);
            self.error(
                ir,
                ErrorCode::E2001,
                expr,
                format!("cannot switch on a value of type `{ty}`"),
            );
        }
    }

    pub(super) fn parameter(
        &mut self,
        ir: &mut Ir,
        original: NodeId,
        id: NodeId,
        default_value: Option<NodeId>,
    ) -> NodeId {
        let ty = self.declared_type(ir, original);
        let mut out = id;
        if let Some(default) = default_value {
            let coerced = self.coerce(ir, default, ty);
            if coerced != default {
                if let NodeKind::Parameter {
                    name,
                    direction,
                    ty: syntax,
                    ..
                } = *ir.kind(id)
                {
                    out = ir.replace_kind(
                        id,
                        NodeKind::Parameter {
                            name,
                            direction,
                            ty: syntax,
                            default_value: Some(coerced),
                        },
                    );
                }
            }
        }
        self.set_type(out, ty);
        out
    }

    pub(super) fn variable(&mut self, ir: &mut Ir, id: NodeId, syntax: NodeId, init: Option<NodeId>) -> NodeId {
        let ty = self.syntax_type(ir, syntax);
        let mut out = id;
        if let Some(init) = init {
            let coerced = self.coerce(ir, init, ty);
            if coerced != init {
                if let NodeKind::DeclVariable { name, .. } = *ir.kind(id) {
                    out = ir.replace_kind(
                        id,
                        NodeKind::DeclVariable {
                            name,
                            ty: syntax,
                            init: Some(coerced),
                        },
                    );
                }
            }
        }
        self.set_type(out, ty);
        out
    }

    pub(super) fn constant(&mut self, ir: &mut Ir, id: NodeId, syntax: NodeId, init: NodeId) -> NodeId {
        let ty = self.syntax_type(ir, syntax);
        if !self.is_constant(init) && !self.type_of(init).is_error() {
            let name = ir.kind(id).declared_name().map_or("", |n| ir.name_str(n));
            self.error(
                ir,
                ErrorCode::E2013,
                init,
                format!("initializer of constant `{name}` is not a compile-time constant"),
            );
        }
        let coerced = self.coerce(ir, init, ty);
        let out = match *ir.kind(id) {
            NodeKind::DeclConstant { name, .. } if coerced != init => ir.replace_kind(
                id,
                NodeKind::DeclConstant {
                    name,
                    ty: syntax,
                    init: coerced,
                },
            ),
            _ => id,
        };
        self.set_type(out, ty);
        out
    }

    pub(super) fn instance(&mut self, ir: &mut Ir, id: NodeId, syntax: NodeId, args: Vec<NodeId>) -> NodeId {
        let declared = self.syntax_type(ir, syntax);
        let (new_args, ty) = self.construct(ir, id, declared, &args);
        let out = match *ir.kind(id) {
            NodeKind::DeclInstance { name, .. } if new_args != args => ir.replace_kind(
                id,
                NodeKind::DeclInstance {
                    name,
                    ty: syntax,
                    args: new_args,
                },
            ),
            _ => id,
        };
        if out != id {
            if let Some(bound) = self.types.type_args(id).map(<[TypeId]>::to_vec) {
                self.types.set_type_args(out, bound);
            }
        }
        self.set_type(out, ty);
        out
    }

    pub(super) fn key_element(&mut self, ir: &Ir, match_kind: NodeId) {
        let ty = self.type_of(match_kind);
        if ty != TypeId::MATCH_KIND && !ty.is_error() {
            self.mismatch(ir, match_kind, TypeId::MATCH_KIND, ty);
        }
    }
}
