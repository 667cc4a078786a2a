// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Per-member type checking.
//!
//! **DDD Context:** Semantic Analysis
//!
//! Walks every constructor and method body with a table of declared local
//! types and makes the same resolution decisions the engine will make at
//! runtime, but on declared types: overloads are selected by
//! [`resolve_method`] and [`resolve_constructor`] over [`StaticMembers`],
//! operands are validated against the operator rules shared with the engine,
//! and assignments, arguments and returns are checked with [`check`].
//!
//! The first violation aborts checking.

use std::rc::Rc;

use ecow::EcoString;
use tracing::trace;

use super::AnalysisError;
use super::scope::{BindingKind, Scope};
use crate::ast::{
    AssignOperator, ClassDecl, ConstructorDecl, Expression, Identifier, Literal, MethodDecl,
    Parameter, Program, Statement, TypeExpr,
};
use crate::native::NamespaceEntry;
use crate::source_analysis::Span;
use crate::types::operators::{INCREMENT_RULE, INSTANCE_OF_RULE, OperatorRule, binary_rule, unary_rule};
use crate::types::{
    ClassTable, ClassTemplate, ClassTy, MemberSource, MemberTemplate, OBJECT, Primitive,
    Resolution, StaticMembers, Ty, TypeError, TypeParams, check, resolve_constructor,
    resolve_method, substitute,
};

type Result<T> = std::result::Result<T, AnalysisError>;

/// What an expression denotes before it is used as a value.
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    /// A value of a declared type.
    Value(Ty),
    /// A class named for static access, by fully-qualified name.
    Static(EcoString),
    /// A native namespace such as `java.util`.
    Namespace(EcoString),
}

/// Type checks every member body of a program.
#[derive(Debug)]
pub struct TypeChecker<'a> {
    table: &'a ClassTable,
    source: &'a EcoString,
}

impl<'a> TypeChecker<'a> {
    #[must_use]
    pub fn new(table: &'a ClassTable, source: &'a EcoString) -> Self {
        Self { table, source }
    }

    /// Checks every class of `program`.
    ///
    /// # Errors
    ///
    /// Returns the first type error found.
    pub fn check_program(&self, program: &Program) -> Result<()> {
        for class in &program.classes {
            self.check_class(class)?;
        }
        Ok(())
    }

    fn check_class(&self, class: &ClassDecl) -> Result<()> {
        let template = Rc::clone(
            self.table
                .template(&class.name.name, class.name.span)
                .map_err(|error| AnalysisError::from_type(&error, self.source))?,
        );
        let class_params = TypeParams::unbound(&template.generics);
        if class.constructors.is_empty() {
            let mut body = self.body(&template, class_params.clone(), false, None);
            body.super_call(None, class.span)?;
        }
        for constructor in &class.constructors {
            trace!(class = %template.name, "checking constructor");
            self.check_constructor(&template, class_params.clone(), constructor)?;
        }
        for method in &class.methods {
            trace!(class = %template.name, method = %method.name.name, "checking method");
            self.check_method(&template, &class_params, method)?;
        }
        Ok(())
    }

    fn body(
        &self,
        class: &Rc<ClassTemplate>,
        params: TypeParams,
        is_static: bool,
        return_type: Option<Ty>,
    ) -> BodyChecker<'a> {
        let this = (!is_static).then(|| {
            Ty::class(
                class.name.clone(),
                class.generics.iter().cloned().map(Ty::unbound).collect(),
            )
        });
        BodyChecker {
            table: self.table,
            members: StaticMembers::new(self.table),
            source: self.source,
            class: Rc::clone(class),
            params,
            this,
            return_type,
            locals: Scope::new(),
        }
    }

    fn check_constructor(
        &self,
        class: &Rc<ClassTemplate>,
        params: TypeParams,
        constructor: &ConstructorDecl,
    ) -> Result<()> {
        let mut body = self.body(class, params, false, None);
        body.define_parameters(&constructor.parameters)?;
        body.super_call(constructor.super_arguments.as_deref(), constructor.span)?;
        body.statements(&constructor.body)
    }

    fn check_method(
        &self,
        class: &Rc<ClassTemplate>,
        class_params: &TypeParams,
        method: &MethodDecl,
    ) -> Result<()> {
        let mut params = if method.is_static {
            TypeParams::default()
        } else {
            class_params.clone()
        };
        params.push_unbound(method.generics.iter().map(|generic| &generic.name));
        let return_type = method
            .return_type
            .as_ref()
            .map(|ty| self.table.lower(ty, &params))
            .transpose()
            .map_err(|error| AnalysisError::from_type(&error, self.source))?;
        let mut body = self.body(class, params, method.is_static, return_type.clone());
        body.define_parameters(&method.parameters)?;
        body.statements(&method.body)?;
        let returns = method
            .body
            .iter()
            .any(|statement| matches!(statement, Statement::Return { .. }));
        if let (Some(return_type), false) = (return_type, returns) {
            let span = method
                .return_type
                .as_ref()
                .map_or(method.span, |ty| ty.span);
            return Err(self.sanity(
                format!(
                    "Method has no return statement and non-void return type '{return_type}'."
                ),
                span,
            ));
        }
        Ok(())
    }

    fn sanity(&self, message: impl Into<String>, span: Span) -> AnalysisError {
        AnalysisError::sanity(message, self.source, span)
    }
}

/// The state of checking one member body.
struct BodyChecker<'a> {
    table: &'a ClassTable,
    members: StaticMembers<'a>,
    source: &'a EcoString,
    class: Rc<ClassTemplate>,
    /// Generic parameters in scope.
    params: TypeParams,
    /// The type of `this`; `None` in static methods.
    this: Option<Ty>,
    /// `None` for `void` methods and constructors.
    return_type: Option<Ty>,
    locals: Scope,
}

impl BodyChecker<'_> {
    fn sanity(&self, message: impl Into<String>, span: Span) -> AnalysisError {
        AnalysisError::sanity(message, self.source, span)
    }

    fn types<T>(&self, result: std::result::Result<T, TypeError>) -> Result<T> {
        result.map_err(|error| AnalysisError::from_type(&error, self.source))
    }

    fn lower(&self, ty: &TypeExpr) -> Result<Ty> {
        self.types(self.table.lower(ty, &self.params))
    }

    fn nested<T>(&mut self, check: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.locals.push();
        let result = check(self);
        self.locals.pop();
        result
    }

    fn define(&mut self, name: &Identifier, ty: Ty, kind: BindingKind) -> Result<()> {
        if self.locals.define(&name.name, ty, name.span, kind).is_err() {
            return Err(self.sanity(
                format!("Local variable '{}' already declared.", name.name),
                name.span,
            ));
        }
        Ok(())
    }

    fn define_parameters(&mut self, parameters: &[Parameter]) -> Result<()> {
        if let Some(this) = self.this.clone() {
            let name = Identifier::new("this", self.class.span);
            self.define(&name, this, BindingKind::This)?;
        }
        for parameter in parameters {
            let ty = self.lower(&parameter.ty)?;
            self.define(&parameter.name, ty, BindingKind::Parameter)?;
        }
        Ok(())
    }

    /// The explicit or implicit `super(...)` call of a constructor.
    fn super_call(&mut self, arguments: Option<&[Expression]>, span: Span) -> Result<()> {
        let Some(Ty::Class(base)) = self.class.base.clone() else {
            return Ok(());
        };
        let args = self.values(arguments.unwrap_or_default())?;
        let resolution = self.types(resolve_constructor(&self.members, &base, &args))?;
        self.selected(resolution, span).map(|_| ())
    }

    fn statements(&mut self, statements: &[Statement]) -> Result<()> {
        statements
            .iter()
            .try_for_each(|statement| self.statement(statement))
    }

    fn statement(&mut self, statement: &Statement) -> Result<()> {
        match statement {
            Statement::LocalVariable {
                ty, name, value, ..
            } => {
                let ty = self.lower(ty)?;
                if let Some(value) = value {
                    self.expect(value, &ty)?;
                }
                self.define(name, ty, BindingKind::Local)
            }
            Statement::Assign {
                target,
                operator,
                value,
                span,
            } => {
                if target.name == "this" {
                    return Err(self.sanity("Can't assign to 'this'.", target.span));
                }
                let declared = match self.locals.lookup(&target.name) {
                    Some(binding) => binding.ty.clone(),
                    None => self.instance_field(&target.name).ok_or_else(|| {
                        self.sanity(
                            format!("Local variable '{}' not declared.", target.name),
                            target.span,
                        )
                    })?,
                };
                self.assignment(&declared, *operator, value, *span)
            }
            Statement::FieldAssign {
                receiver,
                field,
                operator,
                value,
                span,
            } => {
                let declared = match self.operand(receiver)? {
                    Operand::Static(class) => {
                        let message = if self.static_field(&class, &field.name)?.is_some() {
                            format!("Static field '{class}.{}' is read-only.", field.name)
                        } else {
                            format!("No field '{}' on '{class}'.", field.name)
                        };
                        return Err(self.sanity(message, field.span));
                    }
                    Operand::Namespace(path) => {
                        return Err(self.sanity(
                            format!("'{path}' is a namespace, not a value."),
                            receiver.span(),
                        ));
                    }
                    Operand::Value(ty) => self.field_of(&ty, field)?,
                };
                self.assignment(&declared, *operator, value, *span)
            }
            Statement::Expression { expression, span } => match expression {
                Expression::MethodCall {
                    receiver,
                    method,
                    arguments,
                    span,
                } => self.call(receiver, method, arguments, *span).map(|_| ()),
                Expression::New { .. } | Expression::Increment { .. } => {
                    self.value(expression).map(|_| ())
                }
                _ => Err(self.sanity("Not a statement.", *span)),
            },
            Statement::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.condition(condition)?;
                self.nested(|this| this.statements(then_branch))?;
                if let Some(else_branch) = else_branch {
                    self.nested(|this| this.statements(else_branch))?;
                }
                Ok(())
            }
            Statement::While {
                condition, body, ..
            } => {
                self.condition(condition)?;
                self.nested(|this| this.statements(body))
            }
            Statement::For {
                init,
                condition,
                update,
                body,
                ..
            } => self.nested(|this| {
                this.statement(init)?;
                this.condition(condition)?;
                this.statement(update)?;
                this.nested(|this| this.statements(body))
            }),
            Statement::Return { value, span } => {
                let actual = value.as_ref().map(|value| self.value(value)).transpose()?;
                match (&self.return_type, actual) {
                    (None, None) => Ok(()),
                    (Some(expected), Some(actual)) => {
                        let null = value.as_ref().is_some_and(Expression::is_null_literal);
                        self.compatible(&actual, expected, null, *span)
                    }
                    (expected, actual) => Err(self.sanity(
                        format!(
                            "'{}' type expected, got '{}'.",
                            void_or(expected.as_ref()),
                            void_or(actual.as_ref())
                        ),
                        *span,
                    )),
                }
            }
            Statement::Block { statements, .. } => self.nested(|this| this.statements(statements)),
        }
    }

    fn assignment(
        &mut self,
        declared: &Ty,
        operator: AssignOperator,
        value: &Expression,
        span: Span,
    ) -> Result<()> {
        match operator.binary() {
            None => self.expect(value, declared),
            Some(binary) => {
                let actual = self.value(value)?;
                let rule = binary_rule(binary);
                let result = self.apply(rule, binary.symbol(), declared, &actual, span)?;
                self.compatible(&result, declared, false, span)
            }
        }
    }

    fn condition(&mut self, condition: &Expression) -> Result<()> {
        self.expect(condition, &Ty::boolean())
    }

    /// Checks that `value` may be stored where `expected` is declared.
    fn expect(&mut self, value: &Expression, expected: &Ty) -> Result<()> {
        let actual = self.value(value)?;
        self.compatible(&actual, expected, value.is_null_literal(), value.span())
    }

    fn compatible(&self, actual: &Ty, expected: &Ty, null: bool, span: Span) -> Result<()> {
        if (null && !is_primitive(expected)) || check(self.table, actual, expected) {
            return Ok(());
        }
        Err(self.sanity(
            format!("'{expected}' type expected, got '{actual}'."),
            span,
        ))
    }

    /// The type of an expression used as a value.
    fn value(&mut self, expression: &Expression) -> Result<Ty> {
        match self.operand(expression)? {
            Operand::Value(ty) => Ok(ty),
            Operand::Static(class) => Err(self.sanity(
                format!("'{class}' is a class, not a value."),
                expression.span(),
            )),
            Operand::Namespace(path) => Err(self.sanity(
                format!("'{path}' is a namespace, not a value."),
                expression.span(),
            )),
        }
    }

    /// Argument types for member resolution. A `null` literal has the null
    /// type, so it selects any overload taking a class.
    fn values(&mut self, expressions: &[Expression]) -> Result<Vec<Ty>> {
        expressions
            .iter()
            .map(|expression| {
                if expression.is_null_literal() {
                    Ok(Ty::null())
                } else {
                    self.value(expression)
                }
            })
            .collect()
    }

    fn operand(&mut self, expression: &Expression) -> Result<Operand> {
        let ty = match expression {
            Expression::Literal { value, .. } => match value {
                Literal::Int(_) => Ty::int(),
                Literal::Float(_) => Ty::float(),
                Literal::Bool(_) => Ty::boolean(),
                Literal::String(_) => Ty::string(),
                Literal::Null => Ty::object(),
            },
            Expression::Variable(name) => return self.variable(name),
            Expression::Binary {
                lhs,
                operator,
                rhs,
                span,
            } => {
                let lhs = self.value(lhs)?;
                let rhs = self.value(rhs)?;
                self.apply(binary_rule(*operator), operator.symbol(), &lhs, &rhs, *span)?
            }
            Expression::Unary {
                operator,
                operand,
                span,
            } => {
                let actual = self.value(operand)?;
                self.apply_unary(unary_rule(*operator), operator.symbol(), &actual, *span)?
            }
            Expression::Increment {
                operator,
                target,
                span,
                ..
            } => {
                if !matches!(
                    **target,
                    Expression::Variable(_) | Expression::FieldAccess { .. }
                ) {
                    return Err(self.sanity(
                        format!("'{operator}' needs a variable or a field."),
                        *span,
                    ));
                }
                let actual = self.value(target)?;
                self.apply_unary(INCREMENT_RULE, &operator.to_string(), &actual, *span)?
            }
            Expression::Ternary {
                condition,
                then_value,
                else_value,
                span,
            } => {
                self.condition(condition)?;
                let then_ty = self.value(then_value)?;
                let else_ty = self.value(else_value)?;
                if then_ty.resolved() != else_ty.resolved() {
                    return Err(self.sanity(
                        format!(
                            "Both possibilities in a ternary operator should match. \
                             Got '{then_ty}' and '{else_ty}'."
                        ),
                        *span,
                    ));
                }
                then_ty
            }
            Expression::New {
                ty,
                arguments,
                span,
            } => {
                let Ty::Class(class) = self.lower(ty)? else {
                    return Err(self.sanity(
                        format!("Can't instantiate generic parameter '{}'.", ty.name),
                        ty.span,
                    ));
                };
                let args = self.values(arguments)?;
                let resolution = self.types(resolve_constructor(&self.members, &class, &args))?;
                self.selected(resolution, *span)?;
                Ty::Class(class)
            }
            Expression::FieldAccess {
                receiver, field, ..
            } => return self.field_access(receiver, field),
            Expression::MethodCall {
                receiver,
                method,
                arguments,
                span,
            } => self.call(receiver, method, arguments, *span)?.ok_or_else(|| {
                self.sanity(
                    format!("'{}' does not return a value.", method.name),
                    *span,
                )
            })?,
            Expression::Cast { ty, expression, .. } => {
                self.value(expression)?;
                self.lower(ty)?
            }
            Expression::InstanceOf {
                expression,
                ty,
                span,
            } => {
                let actual = self.value(expression)?;
                self.lower(ty)?;
                self.apply_unary(INSTANCE_OF_RULE, "instanceof", &actual, *span)?
            }
            Expression::Group { expression, .. } => return self.operand(expression),
        };
        Ok(Operand::Value(ty))
    }

    /// A bare name: `this`, a local, a field of `this`, a class or a namespace.
    fn variable(&self, name: &Identifier) -> Result<Operand> {
        if let Some(binding) = self.locals.lookup(&name.name) {
            return Ok(Operand::Value(binding.ty.clone()));
        }
        if let Some(ty) = self.instance_field(&name.name) {
            return Ok(Operand::Value(ty));
        }
        if let Some(class) = self.table.imports().resolve(&name.name) {
            return Ok(Operand::Static(class.clone()));
        }
        if self.table.natives().namespace(&name.name).is_some() {
            return Ok(Operand::Namespace(name.name.clone()));
        }
        Err(self.sanity(format!("No such variable '{}'.", name.name), name.span))
    }

    fn instance_field(&self, name: &str) -> Option<Ty> {
        let Some(Ty::Class(this)) = &self.this else {
            return None;
        };
        self.field_type(this, name).ok().flatten()
    }

    fn field_access(&mut self, receiver: &Expression, field: &Identifier) -> Result<Operand> {
        match self.operand(receiver)? {
            Operand::Namespace(path) => {
                let child = format!("{path}.{}", field.name);
                match self.table.natives().lookup(&child) {
                    Some(NamespaceEntry::Namespace(_)) => Ok(Operand::Namespace(child.into())),
                    Some(NamespaceEntry::Class(class)) => Ok(Operand::Static(class.fqn().clone())),
                    None => Err(AnalysisError::from_type(
                        &TypeError::UnknownType {
                            name: child.into(),
                            span: field.span,
                        },
                        self.source,
                    )),
                }
            }
            Operand::Static(class) => match self.static_field(&class, &field.name)? {
                Some(ty) => Ok(Operand::Value(ty)),
                None => Err(self.sanity(
                    format!("No field '{}' on '{class}'.", field.name),
                    field.span,
                )),
            },
            Operand::Value(ty) => self.field_of(&ty, field).map(Operand::Value),
        }
    }

    fn field_of(&self, receiver: &Ty, field: &Identifier) -> Result<Ty> {
        let class = self.class_type(receiver);
        match self.types(self.field_type(&class, &field.name))? {
            Some(ty) => Ok(ty),
            None => Err(self.sanity(
                format!("No field '{}' on '{receiver}'.", field.name),
                field.span,
            )),
        }
    }

    /// An instance field declared on `owner` or an ancestor, with the
    /// owner's generic arguments substituted.
    fn field_type(
        &self,
        owner: &ClassTy,
        name: &str,
    ) -> std::result::Result<Option<Ty>, TypeError> {
        let mut current = Some(owner.clone());
        while let Some(class) = current {
            let template = self.table.template(&class.name, Span::default())?;
            if let Some(field) = template.field(name) {
                let bindings = template
                    .generics
                    .iter()
                    .cloned()
                    .zip(class.args.iter().cloned())
                    .collect();
                return Ok(Some(substitute(&field.ty, &bindings)));
            }
            current = self.members.base(&class)?;
        }
        Ok(None)
    }

    /// A native static field of `class` or an ancestor.
    fn static_field(&self, class: &str, name: &str) -> Result<Option<Ty>> {
        for owner in self.table.ancestors(class).iter() {
            let template = self.types(self.table.template(owner, Span::default()))?;
            if let Some(field) = template
                .native()
                .and_then(|native| native.static_field(name))
            {
                let ty = self.types(self.table.lower(&field.ty, &TypeParams::default()))?;
                return Ok(Some(ty));
            }
        }
        Ok(None)
    }

    /// The class a receiver of type `ty` dispatches on. A type parameter is
    /// only known to be an `Object`.
    fn class_type(&self, ty: &Ty) -> ClassTy {
        match ty.resolved() {
            Ty::Class(class) => class,
            Ty::Generic(_) => ClassTy {
                name: OBJECT.into(),
                args: Vec::new(),
            },
        }
    }

    /// Resolves a call and returns its return type, or `None` for `void`.
    fn call(
        &mut self,
        receiver: &Expression,
        method: &Identifier,
        arguments: &[Expression],
        span: Span,
    ) -> Result<Option<Ty>> {
        let (owner, is_static) = match self.operand(receiver)? {
            Operand::Value(ty) => (self.class_type(&ty), false),
            Operand::Static(class) => (
                ClassTy {
                    name: class,
                    args: Vec::new(),
                },
                true,
            ),
            Operand::Namespace(path) => {
                return Err(self.sanity(
                    format!("'{path}' is a namespace, not a value."),
                    receiver.span(),
                ));
            }
        };
        let args = self.values(arguments)?;
        let resolution = self.types(resolve_method(
            &self.members,
            &owner,
            &method.name,
            is_static,
            &args,
        ))?;
        self.selected(resolution, span)
    }

    /// The return type of a resolved member; ambiguity and absence are errors.
    fn selected(
        &self,
        resolution: Resolution<ClassTy, Rc<MemberTemplate>>,
        span: Span,
    ) -> Result<Option<Ty>> {
        match resolution {
            Resolution::Found(selected) => Ok(selected.return_type()),
            Resolution::DefaultConstructor => Ok(None),
            Resolution::Ambiguous(ambiguity) => Err(self.sanity(ambiguity.to_string(), span)),
            Resolution::Missing(missing) => Err(self.sanity(missing.to_string(), span)),
        }
    }

    /// Validates the operands of a binary operator and returns its result type.
    fn apply(
        &self,
        rule: OperatorRule,
        symbol: &str,
        lhs: &Ty,
        rhs: &Ty,
        span: Span,
    ) -> Result<Ty> {
        rule.operands
            .iter()
            .find(|operand| {
                let target = Ty::named(**operand);
                check(self.table, lhs, &target) && check(self.table, rhs, &target)
            })
            .map(|operand| rule.result_type(operand))
            .ok_or_else(|| {
                self.sanity(
                    format!(
                        "'{symbol}' is only valid on {} (both operands must be the same), \
                         not {lhs} and {rhs}.",
                        rule.describe()
                    ),
                    span,
                )
            })
    }

    fn apply_unary(&self, rule: OperatorRule, symbol: &str, operand: &Ty, span: Span) -> Result<Ty> {
        rule.operands
            .iter()
            .find(|accepted| check(self.table, operand, &Ty::named(**accepted)))
            .map(|accepted| rule.result_type(accepted))
            .ok_or_else(|| {
                self.sanity(
                    format!("'{symbol}' is only valid on {}, not {operand}.", rule.describe()),
                    span,
                )
            })
    }
}

/// `null` is assignable to every class type but not to primitives.
fn is_primitive(ty: &Ty) -> bool {
    matches!(ty.resolved(), Ty::Class(class) if Primitive::from_name(&class.name).is_some())
}

fn void_or(ty: Option<&Ty>) -> String {
    ty.map_or_else(|| "void".to_owned(), ToString::to_string)
}
