// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Operator semantics on runtime values.
//!
//! Ints are 64-bit and wrap on overflow. Int `/` and `%` round toward
//! negative infinity; float `/` is true division. Shift distances use their
//! low six bits.

use crate::ast::{BinaryOperator, IncrementOperator, UnaryOperator};

use super::value::Value;

/// Why an operator could not be applied. Becomes an
/// [`InvalidOperation`](super::RuntimeErrorKind::InvalidOperation).
pub type OperatorError = String;

fn unsupported(op: &str, lhs: &Value, rhs: &Value) -> OperatorError {
    format!("Operator '{op}' can't be applied to {lhs:?} and {rhs:?}")
}

fn floor_div(lhs: i64, rhs: i64) -> Result<i64, OperatorError> {
    if rhs == 0 {
        return Err("Integer division by zero".into());
    }
    let quotient = lhs.wrapping_div(rhs);
    if lhs.wrapping_rem(rhs) != 0 && ((lhs < 0) != (rhs < 0)) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

fn floor_rem(lhs: i64, rhs: i64) -> Result<i64, OperatorError> {
    if rhs == 0 {
        return Err("Integer division by zero".into());
    }
    let remainder = lhs.wrapping_rem(rhs);
    if remainder != 0 && ((remainder < 0) != (rhs < 0)) {
        Ok(remainder + rhs)
    } else {
        Ok(remainder)
    }
}

fn float_rem(lhs: f64, rhs: f64) -> f64 {
    lhs - rhs * (lhs / rhs).floor()
}

#[expect(clippy::cast_sign_loss, reason = "masked to 0..64")]
#[expect(clippy::cast_possible_truncation, reason = "masked to 0..64")]
fn distance(rhs: i64) -> u32 {
    (rhs & 63) as u32
}

/// Applies a binary operator.
///
/// # Errors
///
/// Fails on operand kinds the operator does not accept and on integer
/// division by zero.
#[expect(clippy::cast_sign_loss, reason = ">>> shifts the two's complement bits")]
#[expect(clippy::cast_possible_wrap, reason = ">>> shifts the two's complement bits")]
pub fn binary(op: BinaryOperator, lhs: &Value, rhs: &Value) -> Result<Value, OperatorError> {
    use BinaryOperator as Op;
    use Value::{Bool, Float, Int, Str};

    Ok(match (op, lhs, rhs) {
        (Op::Eq, _, _) => Bool(lhs.equals(rhs)),
        (Op::Ne, _, _) => Bool(!lhs.equals(rhs)),

        (Op::Add, Int(a), Int(b)) => Int(a.wrapping_add(*b)),
        (Op::Sub, Int(a), Int(b)) => Int(a.wrapping_sub(*b)),
        (Op::Mul, Int(a), Int(b)) => Int(a.wrapping_mul(*b)),
        (Op::Div, Int(a), Int(b)) => Int(floor_div(*a, *b)?),
        (Op::Rem, Int(a), Int(b)) => Int(floor_rem(*a, *b)?),

        (Op::Add, Float(a), Float(b)) => Float(a + b),
        (Op::Sub, Float(a), Float(b)) => Float(a - b),
        (Op::Mul, Float(a), Float(b)) => Float(a * b),
        (Op::Div, Float(a), Float(b)) => Float(a / b),
        (Op::Rem, Float(a), Float(b)) => Float(float_rem(*a, *b)),

        (Op::Add, Str(a), Str(b)) => {
            let mut joined = a.clone();
            joined.push_str(b);
            Str(joined)
        }

        (Op::Lt, Int(a), Int(b)) => Bool(a < b),
        (Op::Gt, Int(a), Int(b)) => Bool(a > b),
        (Op::Le, Int(a), Int(b)) => Bool(a <= b),
        (Op::Ge, Int(a), Int(b)) => Bool(a >= b),
        (Op::Lt, Float(a), Float(b)) => Bool(a < b),
        (Op::Gt, Float(a), Float(b)) => Bool(a > b),
        (Op::Le, Float(a), Float(b)) => Bool(a <= b),
        (Op::Ge, Float(a), Float(b)) => Bool(a >= b),
        (Op::Lt, Str(a), Str(b)) => Bool(a < b),
        (Op::Gt, Str(a), Str(b)) => Bool(a > b),
        (Op::Le, Str(a), Str(b)) => Bool(a <= b),
        (Op::Ge, Str(a), Str(b)) => Bool(a >= b),

        (Op::BitAnd, Int(a), Int(b)) => Int(a & b),
        (Op::BitOr, Int(a), Int(b)) => Int(a | b),
        (Op::BitXor, Int(a), Int(b)) => Int(a ^ b),
        (Op::Shl, Int(a), Int(b)) => Int(a.wrapping_shl(distance(*b))),
        (Op::Shr, Int(a), Int(b)) => Int(a >> distance(*b)),
        (Op::UShr, Int(a), Int(b)) => Int(((*a as u64) >> distance(*b)) as i64),

        (Op::And, Bool(a), Bool(b)) => Bool(*a && *b),
        (Op::Or, Bool(a), Bool(b)) => Bool(*a || *b),

        _ => return Err(unsupported(op.symbol(), lhs, rhs)),
    })
}

/// Applies a unary operator.
///
/// # Errors
///
/// Fails on operand kinds the operator does not accept.
pub fn unary(op: UnaryOperator, operand: &Value) -> Result<Value, OperatorError> {
    Ok(match (op, operand) {
        (UnaryOperator::Plus, Value::Int(_) | Value::Float(_)) => operand.clone(),
        (UnaryOperator::Minus, Value::Int(a)) => Value::Int(a.wrapping_neg()),
        (UnaryOperator::Minus, Value::Float(a)) => Value::Float(-a),
        (UnaryOperator::Not, Value::Bool(a)) => Value::Bool(!a),
        (UnaryOperator::BitNot, Value::Int(a)) => Value::Int(!a),
        _ => {
            return Err(format!(
                "Operator '{}' can't be applied to {operand:?}",
                op.symbol()
            ));
        }
    })
}

/// The value after `++` or `--`.
///
/// # Errors
///
/// Fails unless the value is numeric.
pub fn step(op: IncrementOperator, value: &Value) -> Result<Value, OperatorError> {
    let delta: i32 = match op {
        IncrementOperator::Increment => 1,
        IncrementOperator::Decrement => -1,
    };
    match value {
        Value::Int(a) => Ok(Value::Int(a.wrapping_add(i64::from(delta)))),
        Value::Float(a) => Ok(Value::Float(a + f64::from(delta))),
        other => Err(format!("Can't increment or decrement {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(op: BinaryOperator, a: i64, b: i64) -> Value {
        binary(op, &Value::Int(a), &Value::Int(b)).expect("int operands")
    }

    fn as_int(value: &Value) -> i64 {
        match value {
            Value::Int(v) => *v,
            other => panic!("expected int, got {other:?}"),
        }
    }

    #[test]
    fn integer_division_rounds_down() {
        assert_eq!(as_int(&int(BinaryOperator::Div, 7, 2)), 3);
        assert_eq!(as_int(&int(BinaryOperator::Div, -7, 2)), -4);
        assert_eq!(as_int(&int(BinaryOperator::Div, 7, -2)), -4);
        assert_eq!(as_int(&int(BinaryOperator::Rem, -7, 2)), 1);
        assert_eq!(as_int(&int(BinaryOperator::Rem, 7, -2)), -1);
        assert_eq!(as_int(&int(BinaryOperator::Rem, 6, 3)), 0);
    }

    #[test]
    fn division_by_zero_fails() {
        assert!(binary(BinaryOperator::Div, &Value::Int(1), &Value::Int(0)).is_err());
        assert!(binary(BinaryOperator::Rem, &Value::Int(1), &Value::Int(0)).is_err());
    }

    #[test]
    fn float_division_is_exact() {
        let Value::Float(result) =
            binary(BinaryOperator::Div, &Value::Float(7.0), &Value::Float(2.0)).expect("floats")
        else {
            panic!("expected float");
        };
        assert!((result - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn logical_shift_ignores_sign() {
        assert_eq!(as_int(&int(BinaryOperator::UShr, -1, 60)), 15);
        assert_eq!(as_int(&int(BinaryOperator::Shr, -16, 2)), -4);
        assert_eq!(as_int(&int(BinaryOperator::Shl, 1, 3)), 8);
    }

    #[test]
    fn strings_concatenate_and_compare() {
        let joined = binary(
            BinaryOperator::Add,
            &Value::Str("foo".into()),
            &Value::Str("bar".into()),
        )
        .expect("strings");
        assert_eq!(joined.to_string(), "foobar");
        assert!(binary(BinaryOperator::Sub, &Value::Str("a".into()), &Value::Str("b".into())).is_err());
    }

    #[test]
    fn mixed_operands_are_rejected() {
        assert!(binary(BinaryOperator::Add, &Value::Int(1), &Value::Float(1.0)).is_err());
        assert!(binary(BinaryOperator::And, &Value::Int(1), &Value::Bool(true)).is_err());
    }

    #[test]
    fn equality_works_on_anything() {
        assert!(matches!(
            binary(BinaryOperator::Eq, &Value::Null, &Value::Null),
            Ok(Value::Bool(true))
        ));
        assert!(matches!(
            binary(BinaryOperator::Ne, &Value::Int(1), &Value::Str("1".into())),
            Ok(Value::Bool(true))
        ));
    }

    #[test]
    fn unary_operators() {
        assert!(matches!(unary(UnaryOperator::Minus, &Value::Int(3)), Ok(Value::Int(-3))));
        assert!(matches!(unary(UnaryOperator::BitNot, &Value::Int(0)), Ok(Value::Int(-1))));
        assert!(matches!(unary(UnaryOperator::Not, &Value::Bool(true)), Ok(Value::Bool(false))));
        assert!(unary(UnaryOperator::Not, &Value::Int(1)).is_err());
    }

    #[test]
    fn increments_step_by_one() {
        assert!(matches!(step(IncrementOperator::Increment, &Value::Int(1)), Ok(Value::Int(2))));
        assert!(matches!(step(IncrementOperator::Decrement, &Value::Int(1)), Ok(Value::Int(0))));
        assert!(matches!(
            step(IncrementOperator::Decrement, &Value::Float(1.5)),
            Ok(Value::Float(v)) if (v - 0.5).abs() < f64::EPSILON
        ));
    }
}
