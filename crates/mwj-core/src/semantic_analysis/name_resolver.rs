// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Name expansion.
//!
//! **DDD Context:** Semantic Analysis
//!
//! Rewrites every written type name to its fully-qualified form, so later
//! passes and the engine never depend on imports. Generic parameters in
//! scope are left as written. Static methods do not see their class's
//! generic parameters.

use ecow::EcoString;
use tracing::debug;

use super::AnalysisError;
use crate::ast::{ClassDecl, Expression, Program, Statement, TypeExpr};
use crate::types::{ClassTable, TypeError};

/// Expands type names in place using a program's class table.
#[derive(Debug)]
pub struct NameResolver<'a> {
    table: &'a ClassTable,
    source: &'a EcoString,
}

impl<'a> NameResolver<'a> {
    #[must_use]
    pub fn new(table: &'a ClassTable, source: &'a EcoString) -> Self {
        Self { table, source }
    }

    /// Expands every type name of `program`.
    ///
    /// # Errors
    ///
    /// Fails on the first unknown name or generic argument count mismatch.
    pub fn resolve_program(&self, program: &mut Program) -> Result<(), AnalysisError> {
        for class in &mut program.classes {
            self.resolve_class(class)?;
        }
        debug!(classes = program.classes.len(), "expanded type names");
        Ok(())
    }

    fn resolve_class(&self, class: &mut ClassDecl) -> Result<(), AnalysisError> {
        let class_generics: Vec<EcoString> =
            class.generics.iter().map(|g| g.name.clone()).collect();
        if let Some(base) = &mut class.base {
            self.resolve_type(base, &class_generics)?;
        }
        for field in &mut class.fields {
            self.resolve_type(&mut field.ty, &class_generics)?;
        }
        for constructor in &mut class.constructors {
            for parameter in &mut constructor.parameters {
                self.resolve_type(&mut parameter.ty, &class_generics)?;
            }
            for argument in constructor.super_arguments.iter_mut().flatten() {
                self.resolve_expression(argument, &class_generics)?;
            }
            self.resolve_statements(&mut constructor.body, &class_generics)?;
        }
        for method in &mut class.methods {
            let mut generics = if method.is_static {
                Vec::new()
            } else {
                class_generics.clone()
            };
            generics.extend(method.generics.iter().map(|g| g.name.clone()));
            if let Some(return_type) = &mut method.return_type {
                self.resolve_type(return_type, &generics)?;
            }
            for parameter in &mut method.parameters {
                self.resolve_type(&mut parameter.ty, &generics)?;
            }
            self.resolve_statements(&mut method.body, &generics)?;
        }
        Ok(())
    }

    fn resolve_type(&self, ty: &mut TypeExpr, generics: &[EcoString]) -> Result<(), AnalysisError> {
        if generics.contains(&ty.name) {
            if ty.generics.is_empty() {
                return Ok(());
            }
            return Err(AnalysisError::sanity(
                format!("Generic parameter '{}' can't take generic arguments", ty.name),
                self.source,
                ty.span,
            ));
        }
        let name = self
            .table
            .imports()
            .resolve(&ty.name)
            .cloned()
            .ok_or_else(|| {
                AnalysisError::from_type(&TypeError::unknown(ty.name.clone(), ty.span), self.source)
            })?;
        let expected = self
            .table
            .get(&name)
            .map_or(0, |template| template.generics.len());
        if expected != ty.generics.len() {
            return Err(AnalysisError::from_type(
                &TypeError::GenericArity {
                    name,
                    expected,
                    given: ty.generics.len(),
                    span: ty.span,
                },
                self.source,
            ));
        }
        ty.name = name;
        for argument in &mut ty.generics {
            self.resolve_type(argument, generics)?;
        }
        Ok(())
    }

    fn resolve_statements(
        &self,
        statements: &mut [Statement],
        generics: &[EcoString],
    ) -> Result<(), AnalysisError> {
        statements
            .iter_mut()
            .try_for_each(|statement| self.resolve_statement(statement, generics))
    }

    fn resolve_statement(
        &self,
        statement: &mut Statement,
        generics: &[EcoString],
    ) -> Result<(), AnalysisError> {
        match statement {
            Statement::LocalVariable { ty, value, .. } => {
                self.resolve_type(ty, generics)?;
                if let Some(value) = value {
                    self.resolve_expression(value, generics)?;
                }
            }
            Statement::Assign { value, .. } | Statement::Expression { expression: value, .. } => {
                self.resolve_expression(value, generics)?;
            }
            Statement::FieldAssign {
                receiver, value, ..
            } => {
                self.resolve_expression(receiver, generics)?;
                self.resolve_expression(value, generics)?;
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.resolve_expression(condition, generics)?;
                self.resolve_statements(then_branch, generics)?;
                if let Some(else_branch) = else_branch {
                    self.resolve_statements(else_branch, generics)?;
                }
            }
            Statement::While {
                condition, body, ..
            } => {
                self.resolve_expression(condition, generics)?;
                self.resolve_statements(body, generics)?;
            }
            Statement::For {
                init,
                condition,
                update,
                body,
                ..
            } => {
                self.resolve_statement(init, generics)?;
                self.resolve_expression(condition, generics)?;
                self.resolve_statement(update, generics)?;
                self.resolve_statements(body, generics)?;
            }
            Statement::Return { value, .. } => {
                if let Some(value) = value {
                    self.resolve_expression(value, generics)?;
                }
            }
            Statement::Block { statements, .. } => {
                self.resolve_statements(statements, generics)?;
            }
        }
        Ok(())
    }

    fn resolve_expression(
        &self,
        expression: &mut Expression,
        generics: &[EcoString],
    ) -> Result<(), AnalysisError> {
        match expression {
            Expression::Literal { .. } | Expression::Variable(_) => Ok(()),
            Expression::Binary { lhs, rhs, .. } => {
                self.resolve_expression(lhs, generics)?;
                self.resolve_expression(rhs, generics)
            }
            Expression::Unary { operand: inner, .. }
            | Expression::Increment { target: inner, .. }
            | Expression::FieldAccess { receiver: inner, .. }
            | Expression::Group {
                expression: inner, ..
            } => self.resolve_expression(inner, generics),
            Expression::Ternary {
                condition,
                then_value,
                else_value,
                ..
            } => {
                self.resolve_expression(condition, generics)?;
                self.resolve_expression(then_value, generics)?;
                self.resolve_expression(else_value, generics)
            }
            Expression::New { ty, arguments, .. } => {
                self.resolve_type(ty, generics)?;
                arguments
                    .iter_mut()
                    .try_for_each(|argument| self.resolve_expression(argument, generics))
            }
            Expression::MethodCall {
                receiver,
                arguments,
                ..
            } => {
                self.resolve_expression(receiver, generics)?;
                arguments
                    .iter_mut()
                    .try_for_each(|argument| self.resolve_expression(argument, generics))
            }
            Expression::Cast { ty, expression, .. }
            | Expression::InstanceOf { expression, ty, .. } => {
                self.resolve_type(ty, generics)?;
                self.resolve_expression(expression, generics)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::{
        class, import, local, main_method, method, new, param, program, static_method,
    };
    use crate::native::NativeRegistry;
    use crate::semantic_analysis::AnalysisErrorKind;
    use std::rc::Rc;

    fn resolve(mut program: Program) -> Result<Program, AnalysisError> {
        let table = ClassTable::build(&program, Rc::new(NativeRegistry::standard()))
            .map_err(|error| AnalysisError::from_type(&error, &program.source))?;
        let source = program.source.clone();
        NameResolver::new(&table, &source).resolve_program(&mut program)?;
        Ok(program)
    }

    #[test]
    fn expands_imported_and_implicit_names() {
        let mut input = program(vec![class("Main").method(main_method(vec![local(
            "List<String>",
            "xs",
            Some(new("List<String>", vec![])),
        )]))]);
        input.imports.push(import("java.util.List"));
        let output = resolve(input).expect("resolves");
        let Statement::LocalVariable { ty, value, .. } = &output.classes[0].methods[0].body[0] else {
            panic!("expected a local");
        };
        assert_eq!(ty.to_string(), "java.util.List<java.lang.String>");
        let Some(Expression::New { ty, .. }) = value else {
            panic!("expected new");
        };
        assert_eq!(ty.name, "java.util.List");
    }

    #[test]
    fn aliases_expand_to_primitives() {
        let output = resolve(program(vec![class("Main").field("long", "n").field("double", "d")]))
            .expect("resolves");
        assert_eq!(output.classes[0].fields[0].ty.name, "int");
        assert_eq!(output.classes[0].fields[1].ty.name, "float");
    }

    #[test]
    fn generic_parameters_are_left_alone() {
        let output = resolve(program(vec![class("Box")
            .generics(&["T"])
            .field("T", "value")
            .method(method("get", Some("T"), vec![param("T", "v")], vec![]))]))
        .expect("resolves");
        assert_eq!(output.classes[0].fields[0].ty.name, "T");
    }

    #[test]
    fn static_methods_do_not_see_class_generics() {
        let error = resolve(program(vec![class("Box")
            .generics(&["T"])
            .method(static_method("make", Some("T"), vec![], vec![]))]))
        .unwrap_err();
        assert_eq!(error.kind, AnalysisErrorKind::UnknownType { name: "T".into() });
    }

    #[test]
    fn unknown_names_and_imports_fail() {
        let error = resolve(program(vec![class("Main").field("Missing", "m")])).unwrap_err();
        assert_eq!(error.kind, AnalysisErrorKind::UnknownType { name: "Missing".into() });

        let mut input = program(vec![class("Main")]);
        input.imports.push(import("java.nothing.*"));
        let error = resolve(input).unwrap_err();
        assert_eq!(error.kind, AnalysisErrorKind::UnknownType { name: "java.nothing".into() });
    }

    #[test]
    fn generic_arity_is_checked() {
        let mut input = program(vec![class("Main").field("List", "xs")]);
        input.imports.push(import("java.util.*"));
        let error = resolve(input).unwrap_err();
        assert!(matches!(error.kind, AnalysisErrorKind::Sanity { .. }));
    }
}
