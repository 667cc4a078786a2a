// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Operator precedence restructuring.
//!
//! **DDD Context:** Semantic Analysis
//!
//! Binary operators arrive as nested nodes in whatever shape the parser
//! produced. Each maximal chain of binary nodes not interrupted by
//! parentheses is flattened into operands and operators and rebuilt with a
//! shunting-yard pass, so that `1 + 2 * 3` groups as `1 + (2 * 3)`. All
//! operators are left-associative.

use crate::ast::{BinaryOperator, Expression, Literal, Program, Statement};
use crate::source_analysis::Span;

/// Regroups every binary operator chain of `program` by precedence.
///
/// Idempotent: a correctly grouped tree is returned unchanged.
pub fn reorder_operators(program: &mut Program) {
    for class in &mut program.classes {
        for constructor in &mut class.constructors {
            for argument in constructor.super_arguments.iter_mut().flatten() {
                reorder_expression(argument);
            }
            reorder_statements(&mut constructor.body);
        }
        for method in &mut class.methods {
            reorder_statements(&mut method.body);
        }
    }
}

fn reorder_statements(statements: &mut [Statement]) {
    statements.iter_mut().for_each(reorder_statement);
}

fn reorder_statement(statement: &mut Statement) {
    match statement {
        Statement::LocalVariable { value, .. } | Statement::Return { value, .. } => {
            if let Some(value) = value {
                reorder_expression(value);
            }
        }
        Statement::Assign { value, .. } | Statement::Expression { expression: value, .. } => {
            reorder_expression(value);
        }
        Statement::FieldAssign {
            receiver, value, ..
        } => {
            reorder_expression(receiver);
            reorder_expression(value);
        }
        Statement::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            reorder_expression(condition);
            reorder_statements(then_branch);
            if let Some(else_branch) = else_branch {
                reorder_statements(else_branch);
            }
        }
        Statement::While {
            condition, body, ..
        } => {
            reorder_expression(condition);
            reorder_statements(body);
        }
        Statement::For {
            init,
            condition,
            update,
            body,
            ..
        } => {
            reorder_statement(init);
            reorder_expression(condition);
            reorder_statement(update);
            reorder_statements(body);
        }
        Statement::Block { statements, .. } => reorder_statements(statements),
    }
}

fn placeholder() -> Expression {
    Expression::Literal {
        value: Literal::Null,
        span: Span::default(),
    }
}

/// Regroups `expression` and everything below it.
pub fn reorder_expression(expression: &mut Expression) {
    match expression {
        Expression::Binary { .. } => {
            let chain = std::mem::replace(expression, placeholder());
            let mut operands = Vec::new();
            let mut operators = Vec::new();
            flatten(chain, &mut operands, &mut operators);
            operands.iter_mut().for_each(reorder_expression);
            *expression = rebuild(operands, operators);
        }
        Expression::Literal { .. } | Expression::Variable(_) => {}
        Expression::Unary { operand: inner, .. }
        | Expression::Increment { target: inner, .. }
        | Expression::FieldAccess { receiver: inner, .. }
        | Expression::Cast {
            expression: inner, ..
        }
        | Expression::InstanceOf {
            expression: inner, ..
        }
        | Expression::Group {
            expression: inner, ..
        } => reorder_expression(inner),
        Expression::Ternary {
            condition,
            then_value,
            else_value,
            ..
        } => {
            reorder_expression(condition);
            reorder_expression(then_value);
            reorder_expression(else_value);
        }
        Expression::New { arguments, .. } => arguments.iter_mut().for_each(reorder_expression),
        Expression::MethodCall {
            receiver,
            arguments,
            ..
        } => {
            reorder_expression(receiver);
            arguments.iter_mut().for_each(reorder_expression);
        }
    }
}

/// Collects the operands and operators of a binary chain in source order.
/// Groups end the chain.
fn flatten(
    expression: Expression,
    operands: &mut Vec<Expression>,
    operators: &mut Vec<(BinaryOperator, Span)>,
) {
    match expression {
        Expression::Binary {
            lhs,
            operator,
            rhs,
            span,
        } => {
            flatten(*lhs, operands, operators);
            operators.push((operator, span));
            flatten(*rhs, operands, operators);
        }
        operand => operands.push(operand),
    }
}

fn rebuild(operands: Vec<Expression>, operators: Vec<(BinaryOperator, Span)>) -> Expression {
    let mut output: Vec<Expression> = Vec::with_capacity(operands.len());
    let mut pending: Vec<(BinaryOperator, Span)> = Vec::with_capacity(operators.len());
    let mut operands = operands.into_iter();
    output.extend(operands.next());
    for ((operator, span), operand) in operators.into_iter().zip(operands) {
        while pending
            .last()
            .is_some_and(|(top, _)| top.precedence() >= operator.precedence())
        {
            reduce(&mut output, &mut pending);
        }
        pending.push((operator, span));
        output.push(operand);
    }
    while !pending.is_empty() {
        reduce(&mut output, &mut pending);
    }
    output.pop().unwrap_or_else(placeholder)
}

fn reduce(output: &mut Vec<Expression>, pending: &mut Vec<(BinaryOperator, Span)>) {
    let Some((operator, span)) = pending.pop() else {
        return;
    };
    let (Some(rhs), Some(lhs)) = (output.pop(), output.pop()) else {
        return;
    };
    output.push(Expression::Binary {
        lhs: Box::new(lhs),
        operator,
        rhs: Box::new(rhs),
        span,
    });
}
