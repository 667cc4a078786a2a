// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for operator precedence restructuring.
//!
//! 1. **Order preservation** - operands and operators keep their source order
//! 2. **Precedence shape** - no operator has a looser-binding operator as an
//!    ungrouped child, and equal precedence nests to the left
//! 3. **Idempotence** - restructuring a restructured tree changes nothing
//! 4. **Evaluation** - the regrouped tree evaluates like a reference
//!    precedence-climbing evaluator over the flat sequence
//!
//! **DDD Context:** Semantic Analysis

use proptest::prelude::*;

use super::precedence::reorder_expression;
use crate::ast::build::{binary, group, int};
use crate::ast::{BinaryOperator, Expression, Literal};
use crate::interpreter::{Value, binary as apply};

// ============================================================================
// Generators
// ============================================================================

const ARITHMETIC: &[BinaryOperator] = &[
    BinaryOperator::Add,
    BinaryOperator::Sub,
    BinaryOperator::Mul,
    BinaryOperator::BitAnd,
    BinaryOperator::BitOr,
    BinaryOperator::BitXor,
];

/// Arbitrarily nested binary trees over small integers, with occasional groups.
fn tree() -> impl Strategy<Value = Expression> {
    let leaf = (-20i64..20).prop_map(int);
    leaf.prop_recursive(5, 32, 2, |inner| {
        prop_oneof![
            4 => (inner.clone(), prop::sample::select(ARITHMETIC), inner.clone())
                .prop_map(|(lhs, op, rhs)| binary(lhs, op, rhs)),
            1 => inner.prop_map(group),
        ]
    })
}

// ============================================================================
// Helpers
// ============================================================================

/// In-order tokens of the top-level chain, with groups kept opaque.
fn tokens(expression: &Expression, out: &mut Vec<String>) {
    match expression {
        Expression::Binary {
            lhs, operator, rhs, ..
        } => {
            tokens(lhs, out);
            out.push(operator.symbol().to_owned());
            tokens(rhs, out);
        }
        other => out.push(format!("{other:?}")),
    }
}

fn well_shaped(expression: &Expression) -> bool {
    match expression {
        Expression::Binary {
            lhs, operator, rhs, ..
        } => {
            let lhs_ok = match &**lhs {
                Expression::Binary { operator: child, .. } => {
                    child.precedence() >= operator.precedence()
                }
                _ => true,
            };
            let rhs_ok = match &**rhs {
                Expression::Binary { operator: child, .. } => {
                    child.precedence() > operator.precedence()
                }
                _ => true,
            };
            lhs_ok && rhs_ok && well_shaped(lhs) && well_shaped(rhs)
        }
        Expression::Group { expression, .. } => well_shaped(expression),
        _ => true,
    }
}

fn evaluate(expression: &Expression) -> Option<i64> {
    match expression {
        Expression::Literal {
            value: Literal::Int(value),
            ..
        } => Some(*value),
        Expression::Group { expression, .. } => evaluate(expression),
        Expression::Binary {
            lhs, operator, rhs, ..
        } => {
            let lhs = Value::Int(evaluate(lhs)?);
            let rhs = Value::Int(evaluate(rhs)?);
            match apply(*operator, &lhs, &rhs).ok()? {
                Value::Int(result) => Some(result),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Precedence climbing over a flat chain, independent of the shunting-yard pass.
fn climb_from(
    operands: &[i64],
    operators: &[BinaryOperator],
    first: i64,
    min: u8,
    pos: &mut usize,
) -> Option<i64> {
    let mut lhs = first;
    while *pos < operators.len() && operators[*pos].precedence() >= min {
        let operator = operators[*pos];
        *pos += 1;
        let mut rhs = operands[*pos];
        while *pos < operators.len() && operators[*pos].precedence() > operator.precedence() {
            rhs = climb_from(operands, operators, rhs, operator.precedence() + 1, pos)?;
        }
        lhs = match apply(operator, &Value::Int(lhs), &Value::Int(rhs)).ok()? {
            Value::Int(result) => result,
            _ => return None,
        };
    }
    Some(lhs)
}

fn flat_chain() -> impl Strategy<Value = (Vec<i64>, Vec<BinaryOperator>)> {
    (1usize..8).prop_flat_map(|len| {
        (
            prop::collection::vec(-20i64..20, len + 1),
            prop::collection::vec(prop::sample::select(ARITHMETIC), len),
        )
    })
}

/// Builds the chain nested entirely to the right, ignoring precedence.
fn right_nested(operands: &[i64], operators: &[BinaryOperator]) -> Expression {
    match operators.split_first() {
        None => int(operands[0]),
        Some((operator, rest)) => binary(int(operands[0]), *operator, right_nested(&operands[1..], rest)),
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn reordering_preserves_token_order(expression in tree()) {
        let mut before = Vec::new();
        tokens(&expression, &mut before);
        let mut reordered = expression.clone();
        reorder_expression(&mut reordered);
        let mut after = Vec::new();
        tokens(&reordered, &mut after);
        // Groups are reordered internally, so compare only the top-level shape.
        prop_assert_eq!(before.len(), after.len());
        for (before, after) in before.iter().zip(&after) {
            if !before.starts_with("Group") {
                prop_assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn reordered_trees_respect_precedence(expression in tree()) {
        let mut reordered = expression;
        reorder_expression(&mut reordered);
        prop_assert!(well_shaped(&reordered));
    }

    #[test]
    fn reordering_is_idempotent(expression in tree()) {
        let mut once = expression;
        reorder_expression(&mut once);
        let mut twice = once.clone();
        reorder_expression(&mut twice);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn regrouped_chain_evaluates_by_precedence((operands, operators) in flat_chain()) {
        let mut expression = right_nested(&operands, &operators);
        reorder_expression(&mut expression);
        let mut pos = 0;
        let expected = climb_from(&operands, &operators, operands[0], 0, &mut pos);
        prop_assert_eq!(evaluate(&expression), expected);
    }
}
