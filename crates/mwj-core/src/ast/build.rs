// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Terse constructors for building ASTs by hand.
//!
//! Hosts that embed the engine without a parser, and the test suites, build
//! programs with these. Nodes get synthetic spans unless placed with
//! [`ClassDecl::at`] or the `*_at` helpers.

use ecow::EcoString;

use super::{
    AssignOperator, BinaryOperator, ClassDecl, ConstructorDecl, Expression, FieldDecl, Identifier,
    Import, IncrementOperator, Literal, MethodDecl, Parameter, Program, Statement, TypeExpr,
    UnaryOperator,
};
use crate::source_analysis::Span;

#[must_use]
pub fn program(classes: Vec<ClassDecl>) -> Program {
    Program::new("<memory>", Vec::new(), classes)
}

/// `import a.b.C;`, or `import a.b.*;` when `path` ends in `.*`.
#[must_use]
pub fn import(path: &str) -> Import {
    let (path, wildcard) = match path.strip_suffix(".*") {
        Some(prefix) => (prefix, true),
        None => (path, false),
    };
    Import {
        path: path.split('.').map(ident).collect(),
        wildcard,
        span: Span::default(),
    }
}

#[must_use]
pub fn ident(name: &str) -> Identifier {
    Identifier::new(name, Span::default())
}

/// A written type, parsed from text such as `Box<Integer>`.
#[must_use]
pub fn ty(text: &str) -> TypeExpr {
    TypeExpr::parse(text)
}

#[must_use]
pub fn param(ty_text: &str, name: &str) -> Parameter {
    Parameter {
        ty: ty(ty_text),
        name: ident(name),
    }
}

#[must_use]
pub fn class(name: &str) -> ClassDecl {
    ClassDecl {
        name: ident(name),
        generics: Vec::new(),
        base: None,
        fields: Vec::new(),
        constructors: Vec::new(),
        methods: Vec::new(),
        span: Span::default(),
    }
}

impl ClassDecl {
    #[must_use]
    pub fn generics(mut self, names: &[&str]) -> Self {
        self.generics = names.iter().map(|name| ident(name)).collect();
        self
    }

    #[must_use]
    pub fn extends(mut self, base: &str) -> Self {
        self.base = Some(ty(base));
        self
    }

    #[must_use]
    pub fn field(mut self, ty_text: &str, name: &str) -> Self {
        self.fields.push(FieldDecl {
            ty: ty(ty_text),
            name: ident(name),
            span: Span::default(),
        });
        self
    }

    #[must_use]
    pub fn constructor(mut self, constructor: ConstructorDecl) -> Self {
        self.constructors.push(constructor);
        self
    }

    #[must_use]
    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn at(mut self, line: u32, column: u32) -> Self {
        let span = Span::new(line, column);
        self.span = span;
        self.name.span = span;
        self
    }
}

#[must_use]
pub fn constructor(parameters: Vec<Parameter>, body: Vec<Statement>) -> ConstructorDecl {
    ConstructorDecl {
        parameters,
        super_arguments: None,
        body,
        span: Span::default(),
    }
}

impl ConstructorDecl {
    /// Adds a leading `super(arguments)` call.
    #[must_use]
    pub fn with_super(mut self, arguments: Vec<Expression>) -> Self {
        self.super_arguments = Some(arguments);
        self
    }
}

/// An instance method. `return_type` of `None` means `void`.
#[must_use]
pub fn method(
    name: &str,
    return_type: Option<&str>,
    parameters: Vec<Parameter>,
    body: Vec<Statement>,
) -> MethodDecl {
    MethodDecl {
        name: ident(name),
        is_static: false,
        generics: Vec::new(),
        return_type: return_type.map(ty),
        parameters,
        body,
        span: Span::default(),
    }
}

#[must_use]
pub fn static_method(
    name: &str,
    return_type: Option<&str>,
    parameters: Vec<Parameter>,
    body: Vec<Statement>,
) -> MethodDecl {
    MethodDecl {
        is_static: true,
        ..method(name, return_type, parameters, body)
    }
}

/// `public static void main() { body }`
#[must_use]
pub fn main_method(body: Vec<Statement>) -> MethodDecl {
    static_method("main", None, Vec::new(), body)
}

impl MethodDecl {
    #[must_use]
    pub fn generics(mut self, names: &[&str]) -> Self {
        self.generics = names.iter().map(|name| ident(name)).collect();
        self
    }

    #[must_use]
    pub fn at(mut self, line: u32, column: u32) -> Self {
        let span = Span::new(line, column);
        self.span = span;
        self.name.span = span;
        self
    }
}

// Expressions

#[must_use]
pub fn int(value: i64) -> Expression {
    literal(Literal::Int(value))
}

#[must_use]
pub fn float(value: f64) -> Expression {
    literal(Literal::Float(value))
}

#[must_use]
pub fn boolean(value: bool) -> Expression {
    literal(Literal::Bool(value))
}

#[must_use]
pub fn string(value: &str) -> Expression {
    literal(Literal::String(EcoString::from(value)))
}

#[must_use]
pub fn null() -> Expression {
    literal(Literal::Null)
}

fn literal(value: Literal) -> Expression {
    Expression::Literal {
        value,
        span: Span::default(),
    }
}

#[must_use]
pub fn var(name: &str) -> Expression {
    Expression::Variable(ident(name))
}

#[must_use]
pub fn this() -> Expression {
    var("this")
}

#[must_use]
pub fn binary(lhs: Expression, operator: BinaryOperator, rhs: Expression) -> Expression {
    Expression::Binary {
        lhs: Box::new(lhs),
        operator,
        rhs: Box::new(rhs),
        span: Span::default(),
    }
}

#[must_use]
pub fn unary(operator: UnaryOperator, operand: Expression) -> Expression {
    Expression::Unary {
        operator,
        operand: Box::new(operand),
        span: Span::default(),
    }
}

#[must_use]
pub fn increment(operator: IncrementOperator, prefix: bool, target: Expression) -> Expression {
    Expression::Increment {
        operator,
        prefix,
        target: Box::new(target),
        span: Span::default(),
    }
}

/// `target++`
#[must_use]
pub fn post_increment(target: Expression) -> Expression {
    increment(IncrementOperator::Increment, false, target)
}

#[must_use]
pub fn ternary(condition: Expression, then_value: Expression, else_value: Expression) -> Expression {
    Expression::Ternary {
        condition: Box::new(condition),
        then_value: Box::new(then_value),
        else_value: Box::new(else_value),
        span: Span::default(),
    }
}

#[must_use]
pub fn new(ty_text: &str, arguments: Vec<Expression>) -> Expression {
    Expression::New {
        ty: ty(ty_text),
        arguments,
        span: Span::default(),
    }
}

#[must_use]
pub fn field(receiver: Expression, name: &str) -> Expression {
    Expression::FieldAccess {
        receiver: Box::new(receiver),
        field: ident(name),
        span: Span::default(),
    }
}

#[must_use]
pub fn call(receiver: Expression, method: &str, arguments: Vec<Expression>) -> Expression {
    Expression::MethodCall {
        receiver: Box::new(receiver),
        method: ident(method),
        arguments,
        span: Span::default(),
    }
}

/// A call placed at a source position, for location assertions.
#[must_use]
pub fn call_at(
    receiver: Expression,
    method: &str,
    arguments: Vec<Expression>,
    line: u32,
    column: u32,
) -> Expression {
    let span = Span::new(line, column);
    Expression::MethodCall {
        receiver: Box::new(receiver),
        method: Identifier::new(method, span),
        arguments,
        span,
    }
}

/// `System.out.println(argument)`
#[must_use]
pub fn println(argument: Expression) -> Expression {
    call(field(var("System"), "out"), "println", vec![argument])
}

#[must_use]
pub fn cast(ty_text: &str, expression: Expression) -> Expression {
    Expression::Cast {
        ty: ty(ty_text),
        expression: Box::new(expression),
        span: Span::default(),
    }
}

#[must_use]
pub fn instance_of(expression: Expression, ty_text: &str) -> Expression {
    Expression::InstanceOf {
        expression: Box::new(expression),
        ty: ty(ty_text),
        span: Span::default(),
    }
}

#[must_use]
pub fn group(expression: Expression) -> Expression {
    Expression::Group {
        expression: Box::new(expression),
        span: Span::default(),
    }
}

// Statements

#[must_use]
pub fn local(ty_text: &str, name: &str, value: Option<Expression>) -> Statement {
    Statement::LocalVariable {
        ty: ty(ty_text),
        name: ident(name),
        value,
        span: Span::default(),
    }
}

#[must_use]
pub fn assign(target: &str, value: Expression) -> Statement {
    compound_assign(target, AssignOperator::Assign, value)
}

#[must_use]
pub fn compound_assign(target: &str, operator: AssignOperator, value: Expression) -> Statement {
    Statement::Assign {
        target: ident(target),
        operator,
        value,
        span: Span::default(),
    }
}

#[must_use]
pub fn field_assign(receiver: Expression, field: &str, value: Expression) -> Statement {
    Statement::FieldAssign {
        receiver,
        field: ident(field),
        operator: AssignOperator::Assign,
        value,
        span: Span::default(),
    }
}

#[must_use]
pub fn expr(expression: Expression) -> Statement {
    Statement::Expression {
        span: expression.span(),
        expression,
    }
}

#[must_use]
pub fn ret(value: Option<Expression>) -> Statement {
    Statement::Return {
        value,
        span: Span::default(),
    }
}

#[must_use]
pub fn if_(
    condition: Expression,
    then_branch: Vec<Statement>,
    else_branch: Option<Vec<Statement>>,
) -> Statement {
    Statement::If {
        condition,
        then_branch,
        else_branch,
        span: Span::default(),
    }
}

#[must_use]
pub fn while_(condition: Expression, body: Vec<Statement>) -> Statement {
    Statement::While {
        condition,
        body,
        span: Span::default(),
    }
}

#[must_use]
pub fn for_(init: Statement, condition: Expression, update: Statement, body: Vec<Statement>) -> Statement {
    Statement::For {
        init: Box::new(init),
        condition,
        update: Box::new(update),
        body,
        span: Span::default(),
    }
}

#[must_use]
pub fn block(statements: Vec<Statement>) -> Statement {
    Statement::Block {
        statements,
        span: Span::default(),
    }
}

/// Places a statement at a source position.
#[must_use]
pub fn at(mut statement: Statement, line: u32, column: u32) -> Statement {
    let position = Span::new(line, column);
    match &mut statement {
        Statement::LocalVariable { span, .. }
        | Statement::Assign { span, .. }
        | Statement::FieldAssign { span, .. }
        | Statement::Expression { span, .. }
        | Statement::If { span, .. }
        | Statement::While { span, .. }
        | Statement::For { span, .. }
        | Statement::Return { span, .. }
        | Statement::Block { span, .. } => *span = position,
    }
    statement
}
