//! Evaluation of operators on literal values.
//!
//! Integers are arbitrary precision. A bit-vector result is wrapped to its
//! width, two's complement for signed types. `int` operands adopt the type
//! of a sized operand.

use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};
use p4_diagnostic::ErrorCode;
use p4_ir::{BinaryOp, IntType, UnaryOp};

/// A literal operand or result.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Value {
    Int { value: BigInt, ty: IntType },
    Bool(bool),
}

impl Value {
    pub(crate) fn int(value: BigInt, ty: IntType) -> Self {
        Value::Int {
            value: wrap(value, ty),
            ty,
        }
    }
}

/// Why a literal operation cannot be evaluated.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum FoldError {
    DivisionByZero,
    NegativeShift,
    ShiftTooLarge,
    WidthMismatch,
    BadSlice,
    BadCast,
}

impl FoldError {
    pub(crate) fn code(self) -> ErrorCode {
        match self {
            FoldError::DivisionByZero => ErrorCode::E3001,
            FoldError::NegativeShift | FoldError::ShiftTooLarge => ErrorCode::E3002,
            FoldError::WidthMismatch => ErrorCode::E3003,
            FoldError::BadSlice | FoldError::BadCast => ErrorCode::E3004,
        }
    }

    pub(crate) fn message(self) -> &'static str {
        match self {
            FoldError::DivisionByZero => "division by zero",
            FoldError::NegativeShift => "shift by a negative amount",
            FoldError::ShiftTooLarge => "shift amount is too large",
            FoldError::WidthMismatch => "operands have different widths or signedness",
            FoldError::BadSlice => "slice bounds are out of range",
            FoldError::BadCast => "cast of a literal to an invalid type",
        }
    }
}

/// Reduce `value` into the range of `ty`.
pub(crate) fn wrap(value: BigInt, ty: IntType) -> BigInt {
    let IntType::Bits { width, signed } = ty else {
        return value;
    };
    let modulus = BigInt::one() << width;
    let mut v = value % &modulus;
    if v.is_negative() {
        v += &modulus;
    }
    if signed && v >= (&modulus >> 1u32) {
        v -= modulus;
    }
    v
}

/// The low `width` bits of `value` as a non-negative number.
pub(crate) fn unsigned_bits(value: &BigInt, width: u32) -> BigInt {
    wrap(value.clone(), IntType::bits(width))
}

/// Type shared by two integer operands.
fn common_type(a: IntType, b: IntType) -> Result<IntType, FoldError> {
    match (a, b) {
        (IntType::Infinite, other) | (other, IntType::Infinite) => Ok(other),
        (a, b) if a == b => Ok(a),
        _ => Err(FoldError::WidthMismatch),
    }
}

/// Evaluate `left op right`. `Ok(None)` means the operands are not of a
/// shape this operator folds.
pub(crate) fn fold_binary(
    op: BinaryOp,
    left: &Value,
    right: &Value,
) -> Result<Option<Value>, FoldError> {
    match (left, right) {
        (Value::Int { value: a, ty: ta }, Value::Int { value: b, ty: tb }) => {
            fold_int_binary(op, (a, *ta), (b, *tb))
        }
        (Value::Bool(a), Value::Bool(b)) => Ok(match op {
            BinaryOp::LAnd => Some(Value::Bool(*a && *b)),
            BinaryOp::LOr => Some(Value::Bool(*a || *b)),
            BinaryOp::Equ => Some(Value::Bool(a == b)),
            BinaryOp::Neq => Some(Value::Bool(a != b)),
            _ => None,
        }),
        _ => Ok(None),
    }
}

fn fold_int_binary(
    op: BinaryOp,
    (a, ta): (&BigInt, IntType),
    (b, tb): (&BigInt, IntType),
) -> Result<Option<Value>, FoldError> {
    let value = match op {
        BinaryOp::Add => Value::int(a + b, common_type(ta, tb)?),
        BinaryOp::Sub => Value::int(a - b, common_type(ta, tb)?),
        BinaryOp::Mul => Value::int(a * b, common_type(ta, tb)?),
        BinaryOp::BAnd => Value::int(a & b, common_type(ta, tb)?),
        BinaryOp::BOr => Value::int(a | b, common_type(ta, tb)?),
        BinaryOp::BXor => Value::int(a ^ b, common_type(ta, tb)?),
        BinaryOp::Div | BinaryOp::Mod => {
            let ty = common_type(ta, tb)?;
            if b.is_zero() {
                return Err(FoldError::DivisionByZero);
            }
            if op == BinaryOp::Div {
                Value::int(a / b, ty)
            } else {
                Value::int(a % b, ty)
            }
        }
        BinaryOp::Shl | BinaryOp::Shr => shift(op, a, ta, b)?,
        BinaryOp::Equ
        | BinaryOp::Neq
        | BinaryOp::Lss
        | BinaryOp::Leq
        | BinaryOp::Grt
        | BinaryOp::Geq => {
            let ty = common_type(ta, tb)?;
            let (a, b) = (wrap(a.clone(), ty), wrap(b.clone(), ty));
            Value::Bool(match op {
                BinaryOp::Equ => a == b,
                BinaryOp::Neq => a != b,
                BinaryOp::Lss => a < b,
                BinaryOp::Leq => a <= b,
                BinaryOp::Grt => a > b,
                _ => a >= b,
            })
        }
        BinaryOp::Concat => {
            let (
                IntType::Bits {
                    width: wa,
                    signed: sa,
                },
                IntType::Bits { width: wb, .. },
            ) = (ta, tb)
            else {
                return Ok(None);
            };
            let joined = (unsigned_bits(a, wa) << wb) | unsigned_bits(b, wb);
            Value::int(
                joined,
                IntType::Bits {
                    width: wa + wb,
                    signed: sa,
                },
            )
        }
        BinaryOp::LAnd | BinaryOp::LOr => return Ok(None),
    };
    Ok(Some(value))
}

/// Largest left shift folded on an `int` operand.
const MAX_INT_SHIFT: u32 = 4096;

fn shift(op: BinaryOp, a: &BigInt, ty: IntType, amount: &BigInt) -> Result<Value, FoldError> {
    if amount.is_negative() {
        return Err(FoldError::NegativeShift);
    }
    // Past `saturation` every bit has been shifted out.
    let saturation = match ty {
        IntType::Bits { width, .. } => Some(BigInt::from(width)),
        IntType::Infinite if op == BinaryOp::Shl => {
            if *amount > BigInt::from(MAX_INT_SHIFT) {
                return Err(FoldError::ShiftTooLarge);
            }
            None
        }
        IntType::Infinite => Some(BigInt::from(a.bits())),
    };
    if saturation.is_some_and(|limit| *amount >= limit) {
        let fill = if op == BinaryOp::Shr && a.is_negative() {
            -BigInt::one()
        } else {
            BigInt::zero()
        };
        return Ok(Value::int(fill, ty));
    }
    let amount = amount.to_u32().ok_or(FoldError::ShiftTooLarge)?;
    Ok(if op == BinaryOp::Shl {
        Value::int(a << amount, ty)
    } else {
        Value::int(a >> amount, ty)
    })
}

pub(crate) fn fold_unary(op: UnaryOp, operand: &Value) -> Option<Value> {
    match (op, operand) {
        (UnaryOp::Neg, Value::Int { value, ty }) => Some(Value::int(-value, *ty)),
        (UnaryOp::Cmpl, Value::Int { value, ty }) if *ty != IntType::Infinite => {
            Some(Value::int(!value, *ty))
        }
        (UnaryOp::LNot, Value::Bool(b)) => Some(Value::Bool(!b)),
        _ => None,
    }
}

/// Target of a literal cast.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum CastTarget {
    Int(IntType),
    Bool,
}

pub(crate) fn fold_cast(value: &Value, target: CastTarget) -> Result<Option<Value>, FoldError> {
    Ok(match (value, target) {
        (Value::Int { value, .. }, CastTarget::Int(ty)) => {
            if matches!(ty, IntType::Bits { width: 0, .. }) {
                return Err(FoldError::BadCast);
            }
            Some(Value::int(value.clone(), ty))
        }
        (Value::Int { value, ty }, CastTarget::Bool) => match ty {
            IntType::Bits {
                width: 1,
                signed: false,
            } => Some(Value::Bool(value.is_one())),
            _ => None,
        },
        (Value::Bool(b), CastTarget::Int(ty @ IntType::Bits { width: 1, .. })) => {
            Some(Value::int(BigInt::from(u8::from(*b)), ty))
        }
        (Value::Bool(b), CastTarget::Bool) => Some(Value::Bool(*b)),
        (Value::Bool(_), CastTarget::Int(_)) => None,
    })
}

/// `value[high:low]` as an unsigned bit-vector.
pub(crate) fn fold_slice(value: &Value, high: u32, low: u32) -> Result<Option<Value>, FoldError> {
    let Value::Int { value, ty } = value else {
        return Ok(None);
    };
    if high < low {
        return Err(FoldError::BadSlice);
    }
    let source_width = match *ty {
        IntType::Bits { width, .. } => {
            if high >= width {
                return Err(FoldError::BadSlice);
            }
            width
        }
        IntType::Infinite => high + 1,
    };
    let width = high - low + 1;
    let bits = unsigned_bits(value, source_width) >> low;
    Ok(Some(Value::int(bits, IntType::bits(width))))
}
