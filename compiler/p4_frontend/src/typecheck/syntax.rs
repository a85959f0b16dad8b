//! Types of type syntax and of declarations.
//!
//! Both are computed on demand and cached, so a use may precede its
//! declaration in traversal order (parser states, forward references).

use p4_diagnostic::ErrorCode;
use p4_ir::{Ir, Name, NodeId, NodeKind};
use p4_types::{BlockType, CallableKind, Field, Param, StructKind, Type, TypeId};

use super::Checker;

/// A value-level view of a declaration, as seen by a path naming it.
#[derive(Copy, Clone, Debug)]
pub(super) struct ValueInfo {
    pub ty: TypeId,
    pub left_value: bool,
    pub constant: bool,
}

impl Checker<'_> {
    /// The type denoted by a type-syntax node.
    pub(super) fn syntax_type(&mut self, ir: &Ir, syntax: NodeId) -> TypeId {
        if let Some(&ty) = self.syntax_types.get(&syntax) {
            return ty;
        }
        let ty = match ir.kind(syntax) {
            NodeKind::TypeBits { width, signed } => self.pool().bits(*width, *signed),
            NodeKind::TypeBool => TypeId::BOOL,
            NodeKind::TypeVoid => TypeId::VOID,
            NodeKind::TypeString => TypeId::STRING,
            NodeKind::TypeInfInt => TypeId::INF_INT,
            NodeKind::TypeName { .. } => match self.refs.get_declaration(syntax) {
                Some(decl) if ir.kind(decl).is_type_declaration() => self.declared_type(ir, decl),
                _ => TypeId::ERROR,
            },
            NodeKind::TypeSpecialized { base, args } => {
                let base_ty = self.syntax_type(ir, *base);
                let args: Vec<TypeId> = args.iter().map(|&a| self.syntax_type(ir, a)).collect();
                self.specialize(ir, syntax, base_ty, args)
            }
            NodeKind::TypeTuple { components } => {
                let components = components
                    .iter()
                    .map(|&c| self.syntax_type(ir, c))
                    .collect();
                self.pool().tuple(components)
            }
            _ => TypeId::ERROR,
        };
        self.syntax_types.insert(syntax, ty);
        ty
    }

    /// `base<args>`, checking the argument count.
    fn specialize(&mut self, ir: &Ir, at: NodeId, base: TypeId, args: Vec<TypeId>) -> TypeId {
        if base.is_error() {
            return TypeId::ERROR;
        }
        let expected = self.types.pool().get(base).type_params().len();
        if expected != args.len() {
            let name = self.display(ir, base);
            self.error(
                ir,
                ErrorCode::E2011,
                at,
                format!(
                    "`{name}` expects {expected} type argument(s), found {}",
                    args.len()
                ),
            );
            return TypeId::ERROR;
        }
        self.pool().specialized(base, args)
    }

    /// The type of a declaration: the type it defines for type
    /// declarations, the type of its value otherwise.
    pub(super) fn declared_type(&mut self, ir: &Ir, decl: NodeId) -> TypeId {
        if let Some(&ty) = self.decl_types.get(&decl) {
            return ty;
        }
        // Cycles were reported by the resolver.
        if !self.in_progress.insert(decl) {
            return TypeId::ERROR;
        }
        let ty = self.compute_declared_type(ir, decl);
        self.in_progress.remove(&decl);
        self.decl_types.insert(decl, ty);
        ty
    }

    fn compute_declared_type(&mut self, ir: &Ir, decl: NodeId) -> TypeId {
        match ir.kind(decl) {
            NodeKind::TypeVar { name } => self.pool().intern(Type::Var { name: *name, decl }),
            NodeKind::TypeStruct { name, fields } => {
                self.aggregate(ir, decl, StructKind::Struct, *name, fields)
            }
            NodeKind::TypeHeader { name, fields } => {
                self.aggregate(ir, decl, StructKind::Header, *name, fields)
            }
            NodeKind::TypeHeaderUnion { name, fields } => {
                self.aggregate(ir, decl, StructKind::HeaderUnion, *name, fields)
            }
            NodeKind::TypeEnum { name, members } => {
                let members = members
                    .iter()
                    .filter_map(|&m| ir.kind(m).declared_name())
                    .collect();
                self.pool().intern(Type::Enum {
                    name: *name,
                    decl,
                    members,
                })
            }
            NodeKind::TypeTypedef { ty, .. } => self.syntax_type(ir, *ty),
            NodeKind::TypeExtern {
                name, type_params, ..
            } => {
                let type_params = self.type_params(ir, type_params);
                self.pool().intern(Type::Extern {
                    name: *name,
                    decl,
                    type_params,
                })
            }
            NodeKind::TypePackage {
                name,
                type_params,
                ctor_params,
            } => {
                let type_params = self.type_params(ir, type_params);
                let ctor_params = self.params(ir, ctor_params);
                self.pool().intern(Type::Package {
                    name: *name,
                    decl,
                    type_params,
                    ctor_params,
                })
            }
            NodeKind::TypeControl {
                name,
                type_params,
                params,
            } => {
                let block = self.block(ir, decl, *name, type_params, params, &[]);
                self.pool().intern(Type::Control(block))
            }
            NodeKind::TypeParser {
                name,
                type_params,
                params,
            } => {
                let block = self.block(ir, decl, *name, type_params, params, &[]);
                self.pool().intern(Type::Parser(block))
            }
            NodeKind::Control {
                name,
                type_params,
                params,
                ctor_params,
                ..
            } => {
                let block = self.block(ir, decl, *name, type_params, params, ctor_params);
                self.pool().intern(Type::Control(block))
            }
            NodeKind::Parser {
                name,
                type_params,
                params,
                ctor_params,
                ..
            } => {
                let block = self.block(ir, decl, *name, type_params, params, ctor_params);
                self.pool().intern(Type::Parser(block))
            }
            NodeKind::Table { name, .. } => self.pool().intern(Type::Table { name: *name, decl }),
            NodeKind::Function {
                type_params,
                params,
                return_type,
                ..
            } => {
                let type_params = self.type_params(ir, type_params);
                let params = self.params(ir, params);
                let ret = self.syntax_type(ir, *return_type);
                self.pool()
                    .function(CallableKind::Function, type_params, params, ret)
            }
            NodeKind::Action { params, .. } => {
                let params = self.params(ir, params);
                self.pool()
                    .function(CallableKind::Action, Vec::new(), params, TypeId::VOID)
            }
            NodeKind::Method {
                type_params,
                params,
                return_type,
                ..
            } => {
                let type_params = self.type_params(ir, type_params);
                let params = self.params(ir, params);
                let ret = self.syntax_type(ir, *return_type);
                self.pool()
                    .function(CallableKind::Method, type_params, params, ret)
            }
            NodeKind::Parameter { ty, .. }
            | NodeKind::DeclVariable { ty, .. }
            | NodeKind::DeclConstant { ty, .. }
            | NodeKind::DeclInstance { ty, .. } => self.syntax_type(ir, *ty),
            NodeKind::ParserState { .. } => TypeId::STATE,
            NodeKind::DeclarationId { .. } => match self.enum_of_member(ir, decl) {
                Some(enum_decl) => self.declared_type(ir, enum_decl),
                None => TypeId::MATCH_KIND,
            },
            _ => TypeId::ERROR,
        }
    }

    /// The enum declaring `member`, if it is an enum member rather than a
    /// `match_kind` member.
    pub(super) fn enum_of_member(&self, ir: &Ir, member: NodeId) -> Option<NodeId> {
        let scope = self.refs.declaring_scope(member)?;
        let node = self.refs.scope_node(scope);
        matches!(ir.kind(node), NodeKind::TypeEnum { .. }).then_some(node)
    }

    fn aggregate(
        &mut self,
        ir: &Ir,
        decl: NodeId,
        kind: StructKind,
        name: Name,
        fields: &[NodeId],
    ) -> TypeId {
        let mut typed = Vec::with_capacity(fields.len());
        for &field in fields {
            if let NodeKind::StructField { name, ty } = ir.kind(field) {
                typed.push(Field {
                    name: *name,
                    ty: self.syntax_type(ir, *ty),
                });
            }
        }
        let fields = typed;
        self.pool().intern(Type::Struct {
            kind,
            name,
            decl,
            fields,
        })
    }

    fn block(
        &mut self,
        ir: &Ir,
        decl: NodeId,
        name: Name,
        type_params: &[NodeId],
        params: &[NodeId],
        ctor_params: &[NodeId],
    ) -> BlockType {
        BlockType {
            name,
            decl,
            type_params: self.type_params(ir, type_params),
            apply_params: self.params(ir, params),
            ctor_params: self.params(ir, ctor_params),
        }
    }

    fn type_params(&mut self, ir: &Ir, type_params: &[NodeId]) -> Vec<TypeId> {
        type_params
            .iter()
            .map(|&tp| self.declared_type(ir, tp))
            .collect()
    }

    pub(super) fn params(&mut self, ir: &Ir, params: &[NodeId]) -> Vec<Param> {
        let mut out = Vec::with_capacity(params.len());
        for &param in params {
            if let NodeKind::Parameter {
                name,
                direction,
                ty,
                default_value,
            } = ir.kind(param)
            {
                out.push(Param {
                    name: *name,
                    direction: *direction,
                    ty: self.syntax_type(ir, *ty),
                    optional: default_value.is_some(),
                });
            }
        }
        out
    }

    /// How a path naming `decl` behaves as an expression.
    pub(super) fn value_of(&mut self, ir: &Ir, decl: NodeId) -> ValueInfo {
        let kind = ir.kind(decl);
        if kind.is_type_declaration() {
            let ty = self.declared_type(ir, decl);
            return ValueInfo {
                ty: self.pool().type_of(ty),
                left_value: false,
                constant: true,
            };
        }
        let (left_value, constant) = match kind {
            NodeKind::Parameter { direction, .. } => (direction.is_out(), false),
            NodeKind::DeclVariable { .. } => (true, false),
            NodeKind::DeclConstant { .. } | NodeKind::DeclarationId { .. } => (false, true),
            _ => (false, false),
        };
        ValueInfo {
            ty: self.declared_type(ir, decl),
            left_value,
            constant,
        }
    }
}
