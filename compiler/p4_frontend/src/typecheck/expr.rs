//! Expressions.

use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive};
use p4_diagnostic::{internal_error, ErrorCode};
use p4_ir::{BinaryOp, IntType, Ir, Name, NodeId, NodeKind, UnaryOp};
use p4_types::{CallableKind, StructKind, Type, TypeId, TypeSubst, Unifier};

use super::{CheckMode, Checker};

const IS_VALID: &str = "isValid";
const SET_VALID: &str = "setValid";
const SET_INVALID: &str = "setInvalid";
const APPLY: &str = "apply";

/// Whether `value` is representable in `width` bits.
pub(super) fn fits(value: &BigInt, width: u32, signed: bool) -> bool {
    if signed {
        let bound = BigInt::one() << width.saturating_sub(1);
        *value >= -bound.clone() && *value < bound
    } else {
        !value.is_negative() && *value < (BigInt::one() << width)
    }
}

impl Checker<'_> {
    pub(super) fn literal(&mut self, ir: &Ir, id: NodeId) {
        let ty = match ir.kind(id) {
            NodeKind::Constant { ty, .. } => match ty {
                IntType::Infinite => TypeId::INF_INT,
                IntType::Bits { width, signed } => self.pool().bits(*width, *signed),
            },
            NodeKind::BoolLiteral { .. } => TypeId::BOOL,
            _ => TypeId::STRING,
        };
        self.set_type(id, ty);
        self.types.set_compile_time_constant(id);
    }

    pub(super) fn path(&mut self, ir: &Ir, id: NodeId) {
        let Some(decl) = self.refs.get_declaration(id) else {
            self.set_type(id, TypeId::ERROR);
            return;
        };
        let info = self.value_of(ir, decl);
        self.set_type(id, info.ty);
        if info.left_value {
            self.types.set_left_value(id);
        }
        if info.constant {
            self.types.set_compile_time_constant(id);
        }
    }

    // === Coercion ===

    /// Whether a value of type `found` may be used where `expected` is
    /// wanted without conversion.
    pub(super) fn compatible(&mut self, expected: TypeId, found: TypeId) -> bool {
        if expected == found || expected.is_error() || found.is_error() {
            return true;
        }
        // `int` converts to bit-vectors only through a cast.
        if expected == TypeId::INF_INT || found == TypeId::INF_INT {
            return false;
        }
        Unifier::new(&[])
            .unify(self.pool(), expected, found)
            .is_ok()
    }

    /// `expr` as a value of type `target`: unchanged, or wrapped in a cast
    /// when it is an `int`. Reports a mismatch otherwise.
    pub(super) fn coerce(&mut self, ir: &mut Ir, expr: NodeId, target: TypeId) -> NodeId {
        let found = self.type_of(expr);
        if found == TypeId::INF_INT {
            if let Some((width, signed)) = self.types.pool().bits_of(target) {
                return self.insert_cast(ir, expr, target, (width, signed));
            }
        }
        if target == TypeId::DONT_CARE || found == TypeId::DONT_CARE {
            return expr;
        }
        if !self.compatible(target, found) {
            self.mismatch(ir, expr, target, found);
        }
        expr
    }

    fn insert_cast(
        &mut self,
        ir: &mut Ir,
        expr: NodeId,
        target: TypeId,
        (width, signed): (u32, bool),
    ) -> NodeId {
        if let NodeKind::Constant { value, .. } = ir.kind(expr) {
            if !fits(value, width, signed) {
                let ty = self.display(ir, target);
                let message = format!("literal `{value}` does not fit in `{ty}`");
                self.error(ir, ErrorCode::E2002, expr, message);
                return expr;
            }
        }
        if self.mode == CheckMode::Update {
            let ty = self.display(ir, target);
            self.report(internal_error(
                ir.span(expr),
                format!("conversion to `{ty}` missing after type inference"),
            ));
            return expr;
        }
        let syntax = if signed {
            ir.signed_bits(width)
        } else {
            ir.bits(width)
        };
        let span = ir.span(expr);
        let cast = ir.alloc(NodeKind::Cast { ty: syntax, expr }, span);
        self.set_type(cast, target);
        if self.is_constant(expr) {
            self.types.set_compile_time_constant(cast);
        }
        self.casts += 1;
        cast
    }

    pub(super) fn expect_bool(&mut self, ir: &Ir, expr: NodeId) {
        let found = self.type_of(expr);
        if found != TypeId::BOOL && !found.is_error() {
            self.mismatch(ir, expr, TypeId::BOOL, found);
        }
    }

    /// Bring two operands to a common type.
    fn unify_operands(&mut self, ir: &mut Ir, left: NodeId, right: NodeId) -> (NodeId, NodeId, TypeId) {
        let (lt, rt) = (self.type_of(left), self.type_of(right));
        if lt.is_error() || rt.is_error() {
            return (left, right, TypeId::ERROR);
        }
        if lt == rt {
            return (left, right, lt);
        }
        if lt == TypeId::INF_INT && self.types.pool().bits_of(rt).is_some() {
            let left = self.coerce(ir, left, rt);
            return (left, right, rt);
        }
        if rt == TypeId::INF_INT && self.types.pool().bits_of(lt).is_some() {
            let right = self.coerce(ir, right, lt);
            return (left, right, lt);
        }
        if self.compatible(lt, rt) {
            return (left, right, lt);
        }
        self.mismatch(ir, right, lt, rt);
        (left, right, TypeId::ERROR)
    }

    fn operator_error(&mut self, ir: &Ir, at: NodeId, symbol: &str, operand: TypeId) {
        let ty = self.display(ir, operand);
        self.error(
            ir,
            ErrorCode::E2003,
            at,
            format!("operator `{symbol}` cannot be applied to `{ty}`"),
        );
    }

    /// Record the result type; the node is constant when all operands are.
    fn finish(&mut self, id: NodeId, ty: TypeId, operands: &[NodeId]) {
        self.set_type(id, ty);
        if operands.iter().all(|&o| self.is_constant(o)) {
            self.types.set_compile_time_constant(id);
        }
    }

    // === Operators ===

    pub(super) fn unary(&mut self, ir: &mut Ir, id: NodeId, op: UnaryOp, operand: NodeId) -> NodeId {
        let ty = self.type_of(operand);
        let ok = ty.is_error()
            || match op {
                UnaryOp::Neg => self.types.pool().is_integral(ty),
                UnaryOp::Cmpl => self.types.pool().bits_of(ty).is_some(),
                UnaryOp::LNot => ty == TypeId::BOOL,
            };
        if ok {
            self.finish(id, ty, &[operand]);
        } else {
            self.operator_error(ir, id, op.symbol(), ty);
            self.set_type(id, TypeId::ERROR);
        }
        id
    }

    pub(super) fn binary(
        &mut self,
        ir: &mut Ir,
        id: NodeId,
        (op, left, right): (BinaryOp, NodeId, NodeId),
    ) -> NodeId {
        let (lt, rt) = (self.type_of(left), self.type_of(right));
        if lt.is_error() || rt.is_error() {
            self.set_type(id, TypeId::ERROR);
            return id;
        }
        let (new_left, new_right, ty) = match op {
            BinaryOp::LAnd | BinaryOp::LOr => {
                self.expect_bool(ir, left);
                self.expect_bool(ir, right);
                (left, right, TypeId::BOOL)
            }
            BinaryOp::Equ | BinaryOp::Neq => {
                let (l, r, common) = self.unify_operands(ir, left, right);
                let ty = if common.is_error() { common } else { TypeId::BOOL };
                (l, r, ty)
            }
            BinaryOp::Lss | BinaryOp::Leq | BinaryOp::Grt | BinaryOp::Geq => {
                if !self.integral_operands(ir, id, op, lt, rt) {
                    return id;
                }
                let (l, r, common) = self.unify_operands(ir, left, right);
                let ty = if common.is_error() { common } else { TypeId::BOOL };
                (l, r, ty)
            }
            BinaryOp::Shl | BinaryOp::Shr => {
                if !self.integral_operands(ir, id, op, lt, rt) {
                    return id;
                }
                if self.types.pool().bits_of(rt).is_some_and(|(_, signed)| signed) {
                    self.operator_error(ir, right, op.symbol(), rt);
                }
                (left, right, lt)
            }
            BinaryOp::Concat => {
                let (Some((lw, signed)), Some((rw, _))) =
                    (self.types.pool().bits_of(lt), self.types.pool().bits_of(rt))
                else {
                    let bad = if self.types.pool().bits_of(lt).is_none() { lt } else { rt };
                    self.operator_error(ir, id, op.symbol(), bad);
                    self.set_type(id, TypeId::ERROR);
                    return id;
                };
                let Some(width) = lw.checked_add(rw) else {
                    self.error(
                        ir,
                        ErrorCode::E2003,
                        id,
                        format!("concatenation of bit<{lw}> and bit<{rw}> is too wide"),
                    );
                    self.set_type(id, TypeId::ERROR);
                    return id;
                };
                let ty = self.pool().bits(width, signed);
                (left, right, ty)
            }
            BinaryOp::Add
            | BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Mod
            | BinaryOp::BAnd
            | BinaryOp::BOr
            | BinaryOp::BXor => {
                if !self.integral_operands(ir, id, op, lt, rt) {
                    return id;
                }
                let (l, r, common) = self.unify_operands(ir, left, right);
                let signed = self.types.pool().bits_of(common).is_some_and(|(_, s)| s);
                if matches!(op, BinaryOp::Div | BinaryOp::Mod) && signed {
                    self.operator_error(ir, id, op.symbol(), common);
                }
                (l, r, common)
            }
        };
        let out = if new_left == left && new_right == right {
            id
        } else {
            ir.replace_kind(
                id,
                NodeKind::Binary {
                    op,
                    left: new_left,
                    right: new_right,
                },
            )
        };
        self.finish(out, ty, &[new_left, new_right]);
        out
    }

    /// Report and type `id` as an error unless both operands are integral.
    fn integral_operands(&mut self, ir: &Ir, id: NodeId, op: BinaryOp, lt: TypeId, rt: TypeId) -> bool {
        for ty in [lt, rt] {
            if !self.types.pool().is_integral(ty) {
                self.operator_error(ir, id, op.symbol(), ty);
                self.set_type(id, TypeId::ERROR);
                return false;
            }
        }
        true
    }

    pub(super) fn mux(
        &mut self,
        ir: &mut Ir,
        id: NodeId,
        (cond, if_true, if_false): (NodeId, NodeId, NodeId),
    ) -> NodeId {
        self.expect_bool(ir, cond);
        let (t, f, ty) = self.unify_operands(ir, if_true, if_false);
        let out = if t == if_true && f == if_false {
            id
        } else {
            ir.replace_kind(
                id,
                NodeKind::Mux {
                    cond,
                    if_true: t,
                    if_false: f,
                },
            )
        };
        self.finish(out, ty, &[cond, t, f]);
        out
    }

    // === Casts and slices ===

    pub(super) fn cast(&mut self, ir: &Ir, id: NodeId, syntax: NodeId, expr: NodeId) -> NodeId {
        let target = self.syntax_type(ir, syntax);
        let found = self.type_of(expr);
        let pool = self.types.pool();
        let legal = target.is_error()
            || found.is_error()
            || target == found
            || match (pool.bits_of(found), pool.bits_of(target)) {
                (Some(_), Some(_)) => true,
                (Some((1, false)), None) => target == TypeId::BOOL,
                (None, Some((1, false))) => found == TypeId::BOOL,
                (None, Some(_)) => found == TypeId::INF_INT,
                _ => false,
            };
        if !legal {
            let (from, to) = (self.display(ir, found), self.display(ir, target));
            self.error(
                ir,
                ErrorCode::E2007,
                id,
                format!("cannot cast `{from}` to `{to}`"),
            );
            self.set_type(id, TypeId::ERROR);
            return id;
        }
        self.finish(id, target, &[expr]);
        id
    }

    pub(super) fn slice(&mut self, ir: &Ir, id: NodeId, (expr, high, low): (NodeId, NodeId, NodeId)) -> NodeId {
        let ty = self.type_of(expr);
        if ty.is_error() {
            self.set_type(id, TypeId::ERROR);
            return id;
        }
        let bound = |bound: NodeId| match ir.kind(bound) {
            NodeKind::Constant { value, .. } => value.to_u32(),
            _ => None,
        };
        let result = match (self.types.pool().bits_of(ty), bound(high), bound(low)) {
            (None, _, _) => Err(format!(
                "cannot slice a value of type `{}`",
                self.display(ir, ty)
            )),
            (Some(_), None, _) | (Some(_), _, None) => {
                Err("slice bounds must be non-negative compile-time constants".to_owned())
            }
            (Some((width, _)), Some(h), Some(l)) if h < l || h >= width => Err(format!(
                "slice [{h}:{l}] is out of range for a {width}-bit value"
            )),
            (Some(_), Some(h), Some(l)) => Ok(h - l + 1),
        };
        match result {
            Ok(width) => {
                let sliced = self.pool().bits(width, false);
                self.finish(id, sliced, &[expr]);
                if self.types.is_left_value(expr) {
                    self.types.set_left_value(id);
                }
            }
            Err(message) => {
                self.error(ir, ErrorCode::E2008, id, message);
                self.set_type(id, TypeId::ERROR);
            }
        }
        id
    }

    // === Members ===

    pub(super) fn member(&mut self, ir: &Ir, original: NodeId, id: NodeId, (expr, member): (NodeId, Name)) -> NodeId {
        // Qualified enum members were bound by the resolver.
        if let Some(decl) = self.refs.get_declaration(original) {
            let info = self.value_of(ir, decl);
            self.set_type(id, info.ty);
            self.types.set_compile_time_constant(id);
            return id;
        }
        let prefix = self.type_of(expr);
        if prefix.is_error() {
            self.set_type(id, TypeId::ERROR);
            return id;
        }
        match self.member_type(ir, prefix, member, None) {
            Some(ty) => {
                self.set_type(id, ty);
                let pool = self.types.pool();
                let field = matches!(pool.get(pool_base(pool, prefix)), Type::Struct { .. })
                    && !matches!(pool.get(ty), Type::Function(_));
                if field && self.types.is_left_value(expr) {
                    self.types.set_left_value(id);
                }
            }
            None => {
                let (ty, name) = (self.display(ir, prefix), ir.name_str(member));
                self.error(
                    ir,
                    ErrorCode::E2009,
                    id,
                    format!("type `{ty}` has no member `{name}`"),
                );
                self.set_type(id, TypeId::ERROR);
            }
        }
        id
    }

    /// Type of `prefix.member`. `arity` selects among overloaded extern
    /// methods; without it the first overload is used.
    pub(super) fn member_type(
        &mut self,
        ir: &Ir,
        prefix: TypeId,
        member: Name,
        arity: Option<usize>,
    ) -> Option<TypeId> {
        let name = ir.name_str(member);
        let (base, subst) = match self.types.pool().get(prefix).clone() {
            Type::Specialized { base, args } => {
                let params = self.types.pool().get(base).type_params().to_vec();
                (base, TypeSubst::from_pairs(&params, &args))
            }
            _ => (prefix, TypeSubst::new()),
        };
        match self.types.pool().get(base).clone() {
            Type::Struct { kind, fields, .. } => {
                if let Some(field) = fields.iter().find(|f| f.name == member) {
                    return Some(field.ty);
                }
                let ret = match (kind, name) {
                    (StructKind::Header | StructKind::HeaderUnion, IS_VALID) => TypeId::BOOL,
                    (StructKind::Header, SET_VALID | SET_INVALID) => TypeId::VOID,
                    _ => return None,
                };
                Some(
                    self.pool()
                        .function(CallableKind::Builtin, Vec::new(), Vec::new(), ret),
                )
            }
            Type::TypeOf(inner) => match self.types.pool().get(inner) {
                Type::Enum { members, .. } if members.contains(&member) => Some(inner),
                _ => None,
            },
            Type::Table { decl, .. } if name == APPLY => {
                let result = self.pool().intern(Type::TableApplyResult { table: decl });
                Some(
                    self.pool()
                        .function(CallableKind::Apply, Vec::new(), Vec::new(), result),
                )
            }
            Type::Control(block) | Type::Parser(block) if name == APPLY => {
                let params = block
                    .apply_params
                    .iter()
                    .map(|p| p4_types::Param {
                        ty: self.pool().substitute(p.ty, &subst),
                        ..*p
                    })
                    .collect();
                Some(
                    self.pool()
                        .function(CallableKind::Apply, Vec::new(), params, TypeId::VOID),
                )
            }
            Type::TableApplyResult { table } => match name {
                "hit" | "miss" => Some(TypeId::BOOL),
                "action_run" => Some(self.pool().intern(Type::ActionEnum { table })),
                _ => None,
            },
            Type::Extern { decl, name: extern_name, .. } => {
                let method = self.extern_method(ir, decl, extern_name, member, arity)?;
                let ty = self.declared_type(ir, method);
                Some(self.pool().substitute(ty, &subst))
            }
            _ => None,
        }
    }

    /// The method `member` of an extern; constructors are excluded.
    fn extern_method(
        &mut self,
        ir: &Ir,
        decl: NodeId,
        extern_name: Name,
        member: Name,
        arity: Option<usize>,
    ) -> Option<NodeId> {
        let NodeKind::TypeExtern { methods, .. } = ir.kind(decl) else {
            return None;
        };
        let mut candidates = methods.iter().copied().filter(|&m| {
            matches!(ir.kind(m), NodeKind::Method { name, .. } if *name == member && *name != extern_name)
        });
        match arity {
            None => candidates.next(),
            Some(given) => candidates.find(|&m| accepts(ir, m, given)),
        }
    }

    pub(super) fn list(&mut self, id: NodeId, components: &[NodeId]) -> NodeId {
        let tys = components.iter().map(|&c| self.type_of(c)).collect();
        let ty = self.pool().tuple(tys);
        self.finish(id, ty, components);
        id
    }

    pub(super) fn select(&mut self, ir: &mut Ir, id: NodeId, select: NodeId, cases: Vec<NodeId>) -> NodeId {
        let wanted = match self.types.pool().get(self.type_of(select)) {
            Type::Tuple(components) => components.clone(),
            _ => vec![self.type_of(select)],
        };
        let mut new_cases = Vec::with_capacity(cases.len());
        for &case in &cases {
            new_cases.push(self.select_case(ir, case, &wanted));
        }
        let out = if new_cases == cases {
            id
        } else {
            ir.replace_kind(
                id,
                NodeKind::SelectExpression {
                    select,
                    cases: new_cases,
                },
            )
        };
        self.set_type(out, TypeId::STATE);
        out
    }

    fn select_case(&mut self, ir: &mut Ir, case: NodeId, wanted: &[TypeId]) -> NodeId {
        let NodeKind::SelectCase { keyset, state } = *ir.kind(case) else {
            return case;
        };
        self.transition(ir, state);
        let new_keyset = match ir.kind(keyset).clone() {
            NodeKind::DefaultExpression => keyset,
            NodeKind::ListExpression { components } if components.len() == wanted.len() => {
                let coerced: Vec<NodeId> = components
                    .iter()
                    .zip(wanted)
                    .map(|(&c, &w)| self.coerce(ir, c, w))
                    .collect();
                if coerced == components {
                    keyset
                } else {
                    let tys = wanted.to_vec();
                    let list = ir.replace_kind(keyset, NodeKind::ListExpression { components: coerced });
                    let ty = self.pool().tuple(tys);
                    self.set_type(list, ty);
                    list
                }
            }
            _ if wanted.len() == 1 => self.coerce(ir, keyset, wanted[0]),
            _ => {
                let (expected, found) = (self.pool().tuple(wanted.to_vec()), self.type_of(keyset));
                self.mismatch(ir, keyset, expected, found);
                keyset
            }
        };
        if new_keyset == keyset {
            return case;
        }
        ir.replace_kind(
            case,
            NodeKind::SelectCase {
                keyset: new_keyset,
                state,
            },
        )
    }

    /// A transition target must name a parser state.
    pub(super) fn transition(&mut self, ir: &Ir, target: NodeId) {
        let ty = self.type_of(target);
        if ty != TypeId::STATE && !ty.is_error() {
            self.mismatch(ir, target, TypeId::STATE, ty);
        }
    }
}

/// The generic base of a specialized type, or the type itself.
fn pool_base(pool: &p4_types::TypePool, ty: TypeId) -> TypeId {
    match pool.get(ty) {
        Type::Specialized { base, .. } => *base,
        _ => ty,
    }
}

/// Whether the method or constructor `method` can be called with `given`
/// arguments.
pub(super) fn accepts(ir: &Ir, method: NodeId, given: usize) -> bool {
    let NodeKind::Method { params, .. } = ir.kind(method) else {
        return false;
    };
    let required = params
        .iter()
        .filter(|&&p| {
            matches!(
                ir.kind(p),
                NodeKind::Parameter {
                    default_value: None,
                    ..
                }
            )
        })
        .count();
    (required..=params.len()).contains(&given)
}
