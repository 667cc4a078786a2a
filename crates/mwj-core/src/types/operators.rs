// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Operand typing rules for operators.
//!
//! The analyzer checks operands against these tables; the engine's
//! arithmetic in `interpreter::operators` accepts exactly the value kinds
//! listed here.

use super::ty::{BOOLEAN, FLOAT, INT, OBJECT, STRING, Ty};
use crate::ast::{BinaryOperator, UnaryOperator};

/// Which operand types an operator accepts and what it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorRule {
    /// Accepted operand types. Both operands of a binary operator must be
    /// acceptable as the same entry.
    pub operands: &'static [&'static str],
    /// The result type, or `None` when the result has the operand type.
    pub result: Option<&'static str>,
}

impl OperatorRule {
    /// The result type when the operands matched `operand`.
    #[must_use]
    pub fn result_type(&self, operand: &str) -> Ty {
        Ty::named(self.result.unwrap_or(operand))
    }

    /// The accepted operand types as `int, float`.
    #[must_use]
    pub fn describe(&self) -> String {
        self.operands.join(", ")
    }
}

const NUMERIC: &[&str] = &[INT, FLOAT];

#[must_use]
pub const fn binary_rule(operator: BinaryOperator) -> OperatorRule {
    use BinaryOperator as Op;
    match operator {
        Op::Add => OperatorRule {
            operands: &[INT, FLOAT, STRING],
            result: None,
        },
        Op::Sub | Op::Mul | Op::Div | Op::Rem => OperatorRule {
            operands: NUMERIC,
            result: None,
        },
        Op::Lt | Op::Gt | Op::Le | Op::Ge | Op::Eq | Op::Ne => OperatorRule {
            operands: &[OBJECT],
            result: Some(BOOLEAN),
        },
        Op::BitAnd | Op::BitOr | Op::BitXor | Op::Shl | Op::Shr | Op::UShr => OperatorRule {
            operands: &[INT],
            result: None,
        },
        Op::And | Op::Or => OperatorRule {
            operands: &[BOOLEAN],
            result: None,
        },
    }
}

#[must_use]
pub const fn unary_rule(operator: UnaryOperator) -> OperatorRule {
    match operator {
        UnaryOperator::Plus | UnaryOperator::Minus => OperatorRule {
            operands: NUMERIC,
            result: None,
        },
        UnaryOperator::Not => OperatorRule {
            operands: &[BOOLEAN],
            result: None,
        },
        UnaryOperator::BitNot => OperatorRule {
            operands: &[INT],
            result: None,
        },
    }
}

/// `++` and `--` apply to numeric variables and fields.
pub const INCREMENT_RULE: OperatorRule = OperatorRule {
    operands: NUMERIC,
    result: None,
};

/// `instanceof` accepts any object and yields a boolean.
pub const INSTANCE_OF_RULE: OperatorRule = OperatorRule {
    operands: &[OBJECT],
    result: Some(BOOLEAN),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparisons_yield_boolean() {
        let rule = binary_rule(BinaryOperator::Lt);
        assert_eq!(rule.result_type(INT), Ty::boolean());
    }

    #[test]
    fn arithmetic_keeps_operand_type() {
        let rule = binary_rule(BinaryOperator::Add);
        assert_eq!(rule.result_type(STRING), Ty::string());
        assert_eq!(rule.describe(), "int, float, java.lang.String");
    }

    #[test]
    fn bitwise_is_int_only() {
        assert_eq!(binary_rule(BinaryOperator::UShr).operands, &[INT]);
        assert_eq!(unary_rule(UnaryOperator::BitNot).operands, &[INT]);
    }
}
