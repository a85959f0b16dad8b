//! Strength reduction: algebraic identities and cheaper operators.
//!
//! A rule that would discard an operand only fires when that operand
//! contains no method call.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use p4_ir::{transform, BinaryOp, IntType, Ir, NodeId, NodeKind, Transform, UnaryOp};
use tracing::{debug, trace};

use crate::context::FrontendContext;
use crate::pass_manager::{Pass, PassError};

pub struct StrengthReduction;

impl Pass for StrengthReduction {
    fn name(&self) -> &str {
        "StrengthReduction"
    }

    fn run(&mut self, ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError> {
        Ok(reduce(&mut ctx.ir, root))
    }
}

#[tracing::instrument(level = "debug", skip_all)]
pub fn reduce(ir: &mut Ir, root: NodeId) -> NodeId {
    let mut reducer = Reducer { rewrites: 0 };
    let new_root = transform(&mut reducer, ir, root);
    debug!(rewrites = reducer.rewrites, "strength reduction done");
    new_root
}

struct Reducer {
    rewrites: usize,
}

fn constant(ir: &Ir, id: NodeId) -> Option<(&BigInt, IntType)> {
    match ir.kind(id) {
        NodeKind::Constant { value, ty, .. } => Some((value, *ty)),
        _ => None,
    }
}

fn is_zero(ir: &Ir, id: NodeId) -> bool {
    constant(ir, id).is_some_and(|(v, _)| v.is_zero())
}

fn is_one(ir: &Ir, id: NodeId) -> bool {
    constant(ir, id).is_some_and(|(v, _)| v.is_one())
}

/// `~0`, or a literal with every bit of its width set.
fn is_all_ones(ir: &Ir, id: NodeId) -> bool {
    match ir.kind(id) {
        NodeKind::Constant {
            value,
            ty: IntType::Bits { width, signed },
            ..
        } => {
            if *signed {
                *value == -BigInt::one()
            } else {
                *value == (BigInt::one() << *width) - 1
            }
        }
        NodeKind::Unary {
            op: UnaryOp::Cmpl,
            operand,
        } => is_zero(ir, *operand),
        _ => false,
    }
}

fn is_bool(ir: &Ir, id: NodeId, wanted: bool) -> bool {
    matches!(ir.kind(id), NodeKind::BoolLiteral { value } if *value == wanted)
}

/// `k` when `id` is the literal `2^k` with `k > 0`.
fn power_of_two(ir: &Ir, id: NodeId) -> Option<u64> {
    let (value, _) = constant(ir, id)?;
    if !value.is_positive() || value.is_one() {
        return None;
    }
    let k = value.bits() - 1;
    (*value == BigInt::one() << k).then_some(k)
}

fn is_unsigned_power_of_two(ir: &Ir, id: NodeId) -> Option<u64> {
    match constant(ir, id)? {
        (_, IntType::Bits { signed: false, .. }) => power_of_two(ir, id),
        _ => None,
    }
}

/// `keep`, provided `dropped` can be discarded.
fn drop_operand(ir: &Ir, keep: NodeId, dropped: NodeId) -> Option<NodeId> {
    (!ir.has_side_effects(dropped)).then_some(keep)
}

impl Reducer {
    fn binary(ir: &mut Ir, id: NodeId, op: BinaryOp, l: NodeId, r: NodeId) -> Option<NodeId> {
        match op {
            BinaryOp::Add if is_zero(ir, r) => Some(l),
            BinaryOp::Add if is_zero(ir, l) => Some(r),
            BinaryOp::Sub if is_zero(ir, r) => Some(l),
            BinaryOp::Mul if is_one(ir, r) => Some(l),
            BinaryOp::Mul if is_one(ir, l) => Some(r),
            BinaryOp::Mul if is_zero(ir, r) => drop_operand(ir, r, l),
            BinaryOp::Mul if is_zero(ir, l) => drop_operand(ir, l, r),
            BinaryOp::Mul => {
                let (x, k) = match (power_of_two(ir, r), power_of_two(ir, l)) {
                    (Some(k), _) => (l, k),
                    (None, Some(k)) => (r, k),
                    (None, None) => return None,
                };
                let amount = ir.int_lit(BigInt::from(k), IntType::Infinite);
                Some(ir.replace_kind(
                    id,
                    NodeKind::Binary {
                        op: BinaryOp::Shl,
                        left: x,
                        right: amount,
                    },
                ))
            }
            BinaryOp::Div if is_one(ir, r) => Some(l),
            BinaryOp::Div => {
                let k = is_unsigned_power_of_two(ir, r)?;
                let amount = ir.int_lit(BigInt::from(k), IntType::Infinite);
                Some(ir.replace_kind(
                    id,
                    NodeKind::Binary {
                        op: BinaryOp::Shr,
                        left: l,
                        right: amount,
                    },
                ))
            }
            BinaryOp::Mod => {
                let k = is_unsigned_power_of_two(ir, r)?;
                let (_, ty) = constant(ir, r)?;
                let mask = (BigInt::one() << k) - 1;
                let mask = ir.int_lit(mask, ty);
                Some(ir.replace_kind(
                    id,
                    NodeKind::Binary {
                        op: BinaryOp::BAnd,
                        left: l,
                        right: mask,
                    },
                ))
            }
            BinaryOp::BAnd if is_zero(ir, r) => drop_operand(ir, r, l),
            BinaryOp::BAnd if is_zero(ir, l) => drop_operand(ir, l, r),
            BinaryOp::BAnd if is_all_ones(ir, r) => Some(l),
            BinaryOp::BAnd if is_all_ones(ir, l) => Some(r),
            BinaryOp::BOr if is_zero(ir, r) => Some(l),
            BinaryOp::BOr if is_zero(ir, l) => Some(r),
            BinaryOp::BOr if is_all_ones(ir, r) => drop_operand(ir, r, l),
            BinaryOp::BOr if is_all_ones(ir, l) => drop_operand(ir, l, r),
            BinaryOp::BXor if is_zero(ir, r) => Some(l),
            BinaryOp::BXor if is_zero(ir, l) => Some(r),
            BinaryOp::Shl | BinaryOp::Shr if is_zero(ir, r) => Some(l),
            BinaryOp::LAnd if is_bool(ir, r, true) => Some(l),
            BinaryOp::LAnd if is_bool(ir, l, true) => Some(r),
            BinaryOp::LAnd if is_bool(ir, l, false) => drop_operand(ir, l, r),
            BinaryOp::LAnd if is_bool(ir, r, false) => drop_operand(ir, r, l),
            BinaryOp::LOr if is_bool(ir, r, false) => Some(l),
            BinaryOp::LOr if is_bool(ir, l, false) => Some(r),
            BinaryOp::LOr if is_bool(ir, l, true) => drop_operand(ir, l, r),
            BinaryOp::LOr if is_bool(ir, r, true) => drop_operand(ir, r, l),
            _ => None,
        }
    }

    /// `!!x`, `~~x` and `-(-x)`.
    fn unary(ir: &Ir, op: UnaryOp, operand: NodeId) -> Option<NodeId> {
        match ir.kind(operand) {
            NodeKind::Unary {
                op: inner,
                operand: x,
            } if *inner == op => Some(*x),
            _ => None,
        }
    }
}

impl Transform for Reducer {
    fn postorder(&mut self, ir: &mut Ir, original: NodeId, id: NodeId) -> NodeId {
        let reduced = match *ir.kind(id) {
            NodeKind::Binary { op, left, right } => Self::binary(ir, id, op, left, right),
            NodeKind::Unary { op, operand } => Self::unary(ir, op, operand),
            _ => None,
        };
        match reduced {
            Some(new) => {
                self.rewrites += 1;
                trace!(node = ?original, "reduced");
                new
            }
            None => id,
        }
    }
}
