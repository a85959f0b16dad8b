//! Method calls, generic inference and instantiation.

use p4_diagnostic::ErrorCode;
use p4_ir::{Direction, Ir, NodeId, NodeKind};
use p4_types::{FunctionType, Param, Type, TypeId, TypeSubst, Unifier};

use super::expr::accepts;
use super::Checker;

impl Checker<'_> {
    pub(super) fn call(
        &mut self,
        ir: &mut Ir,
        id: NodeId,
        method: NodeId,
        type_args: &[NodeId],
        args: Vec<NodeId>,
    ) -> NodeId {
        let mut callee = self.type_of(method);
        if callee.is_error() {
            self.set_type(id, TypeId::ERROR);
            return id;
        }

        // Extern methods may be overloaded on arity.
        if let NodeKind::Member { expr, member } = *ir.kind(method) {
            let prefix = self.type_of(expr);
            if self.is_extern(prefix) {
                if let Some(ty) = self.member_type(ir, prefix, member, Some(args.len())) {
                    callee = ty;
                    self.set_type(method, ty);
                }
            }
        }

        match self.types.pool().get(callee).clone() {
            Type::Function(function) => {
                self.call_function(ir, id, (method, type_args, args), callee, function)
            }
            Type::TypeOf(constructed) => {
                let explicit: Vec<TypeId> =
                    type_args.iter().map(|&t| self.syntax_type(ir, t)).collect();
                let ty = if explicit.is_empty() {
                    constructed
                } else {
                    self.pool().specialized(constructed, explicit)
                };
                let (new_args, result) = self.construct(ir, id, ty, &args);
                let out = if new_args == args {
                    id
                } else {
                    ir.replace_kind(
                        id,
                        NodeKind::MethodCall {
                            method,
                            type_args: type_args.to_vec(),
                            args: new_args,
                        },
                    )
                };
                self.move_type_args(id, out);
                self.set_type(out, result);
                out
            }
            _ => {
                let ty = self.display(ir, callee);
                self.error(
                    ir,
                    ErrorCode::E2012,
                    method,
                    format!("a value of type `{ty}` cannot be called"),
                );
                self.set_type(id, TypeId::ERROR);
                id
            }
        }
    }

    fn is_extern(&self, ty: TypeId) -> bool {
        let pool = self.types.pool();
        let base = match pool.get(ty) {
            Type::Specialized { base, .. } => *base,
            _ => ty,
        };
        matches!(pool.get(base), Type::Extern { .. })
    }

    /// Type arguments recorded on a call that was then rebuilt.
    fn move_type_args(&mut self, from: NodeId, to: NodeId) {
        if from == to {
            return;
        }
        if let Some(args) = self.types.type_args(from).map(<[TypeId]>::to_vec) {
            self.types.set_type_args(to, args);
        }
    }

    fn call_function(
        &mut self,
        ir: &mut Ir,
        id: NodeId,
        (method, type_args, args): (NodeId, &[NodeId], Vec<NodeId>),
        callee: TypeId,
        function: FunctionType,
    ) -> NodeId {
        let in_action_list = self.action_lists > 0;
        if !self.check_arity(ir, id, &function.params, args.len(), in_action_list) {
            self.set_type(id, TypeId::ERROR);
            return id;
        }

        let explicit: Vec<TypeId> = type_args.iter().map(|&t| self.syntax_type(ir, t)).collect();
        let (params, ret, bound) = if function.type_params.is_empty() {
            if !explicit.is_empty() {
                self.error(
                    ir,
                    ErrorCode::E2011,
                    id,
                    "call passes type arguments to a non-generic callee".to_owned(),
                );
            }
            (function.params, function.ret, None)
        } else {
            let bound = if explicit.is_empty() {
                match self.infer(ir, id, &function.type_params, &function.params, &args) {
                    Some(bound) => bound,
                    None => {
                        self.set_type(id, TypeId::ERROR);
                        return id;
                    }
                }
            } else if explicit.len() == function.type_params.len() {
                explicit
            } else {
                self.error(
                    ir,
                    ErrorCode::E2011,
                    id,
                    format!(
                        "expected {} type argument(s), found {}",
                        function.type_params.len(),
                        explicit.len()
                    ),
                );
                self.set_type(id, TypeId::ERROR);
                return id;
            };
            let subst = TypeSubst::from_pairs(&function.type_params, &bound);
            let instantiated = self.pool().substitute(callee, &subst);
            let Type::Function(f) = self.types.pool().get(instantiated).clone() else {
                self.set_type(id, TypeId::ERROR);
                return id;
            };
            (f.params, f.ret, Some(bound))
        };

        let new_args = self.check_arguments(ir, &params, &args);
        let out = if new_args == args {
            id
        } else {
            ir.replace_kind(
                id,
                NodeKind::MethodCall {
                    method,
                    type_args: type_args.to_vec(),
                    args: new_args,
                },
            )
        };
        if let Some(bound) = bound {
            self.types.set_type_args(out, bound);
        }
        self.set_type(out, ret);
        out
    }

    /// Whether `given` arguments can satisfy `params`. Inside an action list
    /// the directionless parameters are supplied by the control plane.
    fn check_arity(
        &mut self,
        ir: &Ir,
        at: NodeId,
        params: &[Param],
        given: usize,
        in_action_list: bool,
    ) -> bool {
        let required = params
            .iter()
            .filter(|p| !p.optional && !(in_action_list && p.direction == Direction::None))
            .count();
        if (required..=params.len()).contains(&given) {
            return true;
        }
        let expected = if required == params.len() {
            required.to_string()
        } else {
            format!("{required} to {}", params.len())
        };
        self.error(
            ir,
            ErrorCode::E2004,
            at,
            format!("expected {expected} argument(s), found {given}"),
        );
        false
    }

    /// Bind `type_params` from the argument types.
    fn infer(
        &mut self,
        ir: &Ir,
        at: NodeId,
        type_params: &[TypeId],
        params: &[Param],
        args: &[NodeId],
    ) -> Option<Vec<TypeId>> {
        let mut unifier = Unifier::new(type_params);
        for (param, &arg) in params.iter().zip(args) {
            let found = self.type_of(arg);
            if unifier.unify(self.pool(), param.ty, found).is_err() {
                let (expected, found) = (self.display(ir, param.ty), self.display(ir, found));
                self.error(
                    ir,
                    ErrorCode::E2005,
                    arg,
                    format!("cannot infer type arguments: `{found}` does not match `{expected}`"),
                );
                return None;
            }
        }
        let mut bound = Vec::with_capacity(type_params.len());
        for &tp in type_params {
            match unifier.binding(tp) {
                Some(ty) if ty != TypeId::INF_INT => bound.push(ty),
                Some(_) => {
                    let name = self.display(ir, tp);
                    self.error(
                        ir,
                        ErrorCode::E2005,
                        at,
                        format!("cannot infer a width for `{name}` from an unsized literal"),
                    );
                    return None;
                }
                None => {
                    let name = self.display(ir, tp);
                    self.error(
                        ir,
                        ErrorCode::E2005,
                        at,
                        format!("cannot infer type argument `{name}`"),
                    );
                    return None;
                }
            }
        }
        Some(bound)
    }

    /// Check each argument against its parameter, coercing `in` arguments.
    fn check_arguments(&mut self, ir: &mut Ir, params: &[Param], args: &[NodeId]) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(args.len());
        for (param, &arg) in params.iter().zip(args) {
            if !param.direction.is_out() {
                out.push(self.coerce(ir, arg, param.ty));
                continue;
            }
            let found = self.type_of(arg);
            if !found.is_error() && !self.types.is_left_value(arg) {
                let name = ir.name_str(param.name);
                self.error(
                    ir,
                    ErrorCode::E2006,
                    arg,
                    format!(
                        "argument for `{}` parameter `{name}` must be assignable",
                        param.direction.keyword()
                    ),
                );
            } else if !self.compatible(param.ty, found) {
                self.mismatch(ir, arg, param.ty, found);
            }
            out.push(arg);
        }
        out
    }

    /// Instantiate `ty` (possibly `Specialized`) with constructor `args`.
    ///
    /// Returns the coerced arguments and the type of the new instance. Type
    /// arguments, explicit or inferred, are recorded on `site`.
    pub(super) fn construct(
        &mut self,
        ir: &mut Ir,
        site: NodeId,
        ty: TypeId,
        args: &[NodeId],
    ) -> (Vec<NodeId>, TypeId) {
        if ty.is_error() {
            return (args.to_vec(), TypeId::ERROR);
        }
        let (base, explicit) = match self.types.pool().get(ty).clone() {
            Type::Specialized { base, args } => (base, Some(args)),
            _ => (ty, None),
        };
        let Some((type_params, params)) = self.constructor(ir, site, base, args.len()) else {
            return (args.to_vec(), TypeId::ERROR);
        };

        if !self.check_arity(ir, site, &params, args.len(), false) {
            return (args.to_vec(), TypeId::ERROR);
        }
        let bound = match explicit {
            Some(bound) => bound,
            None if type_params.is_empty() => Vec::new(),
            None => match self.infer(ir, site, &type_params, &params, args) {
                Some(bound) => bound,
                None => return (args.to_vec(), TypeId::ERROR),
            },
        };
        let subst = TypeSubst::from_pairs(&type_params, &bound);
        let params: Vec<Param> = params
            .iter()
            .map(|p| Param {
                ty: self.pool().substitute(p.ty, &subst),
                ..*p
            })
            .collect();
        let new_args = self.check_arguments(ir, &params, args);

        if bound.is_empty() {
            return (new_args, base);
        }
        self.types.set_type_args(site, bound.clone());
        (new_args, self.pool().specialized(base, bound))
    }

    /// Type parameters and constructor parameters of an instantiable type.
    fn constructor(
        &mut self,
        ir: &Ir,
        site: NodeId,
        base: TypeId,
        arity: usize,
    ) -> Option<(Vec<TypeId>, Vec<Param>)> {
        match self.types.pool().get(base).clone() {
            Type::Package {
                type_params,
                ctor_params,
                ..
            } => Some((type_params, ctor_params)),
            Type::Control(block) | Type::Parser(block) => {
                if matches!(
                    ir.kind(block.decl),
                    NodeKind::TypeControl { .. } | NodeKind::TypeParser { .. }
                ) {
                    let name = ir.name_str(block.name);
                    self.error(
                        ir,
                        ErrorCode::E2012,
                        site,
                        format!("`{name}` is a prototype and cannot be instantiated"),
                    );
                    return None;
                }
                Some((block.type_params, block.ctor_params))
            }
            Type::Extern {
                name,
                decl,
                type_params,
            } => {
                let NodeKind::TypeExtern { methods, .. } = ir.kind(decl) else {
                    return None;
                };
                let ctor = methods.iter().copied().find(|&m| {
                    matches!(ir.kind(m), NodeKind::Method { name: n, .. } if *n == name)
                        && accepts(ir, m, arity)
                });
                let Some(ctor) = ctor else {
                    let name = ir.name_str(name);
                    self.error(
                        ir,
                        ErrorCode::E2004,
                        site,
                        format!("no constructor of `{name}` takes {arity} argument(s)"),
                    );
                    return None;
                };
                let NodeKind::Method { params, .. } = ir.kind(ctor) else {
                    return None;
                };
                let params = self.params(ir, params);
                Some((type_params, params))
            }
            _ => {
                let ty = self.display(ir, base);
                self.error(
                    ir,
                    ErrorCode::E2012,
                    site,
                    format!("`{ty}` cannot be instantiated"),
                );
                None
            }
        }
    }
}
