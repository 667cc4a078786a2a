// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Abstract Syntax Tree (AST) definitions for Middleweight Java.
//!
//! The AST is produced by an external parser and handed over either in memory
//! or serialized as JSON. Every node carries a [`Span`] for diagnostics.
//!
//! # Binary chains
//!
//! The parser is not required to know operator precedence. A chain such as
//! `1 + 2 * 3` may arrive nested in any shape; the analyzer flattens each
//! chain of [`Expression::Binary`] nodes and rebuilds it by precedence.
//! Parenthesized sub-expressions arrive as [`Expression::Group`] and are
//! never flattened across.
//!
//! # Type names
//!
//! Type names arrive as written (`List`, `java.util.List`, `T`). Name
//! expansion rewrites them to fully-qualified names in place, so after
//! analysis every non-generic [`TypeExpr::name`] is fully qualified.

pub mod build;

use std::fmt;

use ecow::EcoString;
use serde::{Deserialize, Serialize};

use crate::source_analysis::Span;

/// A whole program: one source unit with its imports and classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Name of the source the program was parsed from, used in diagnostics.
    pub source: EcoString,
    #[serde(default)]
    pub imports: Vec<Import>,
    #[serde(default)]
    pub classes: Vec<ClassDecl>,
}

impl Program {
    #[must_use]
    pub fn new(source: impl Into<EcoString>, imports: Vec<Import>, classes: Vec<ClassDecl>) -> Self {
        Self {
            source: source.into(),
            imports,
            classes,
        }
    }
}

/// An `import a.b.C;` or `import a.b.*;` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub path: Vec<Identifier>,
    #[serde(default)]
    pub wildcard: bool,
    #[serde(default)]
    pub span: Span,
}

impl Import {
    /// The dotted path without the trailing `.*`.
    #[must_use]
    pub fn dotted(&self) -> EcoString {
        let mut dotted = EcoString::new();
        for (i, segment) in self.path.iter().enumerate() {
            if i > 0 {
                dotted.push('.');
            }
            dotted.push_str(&segment.name);
        }
        dotted
    }
}

/// A name with its location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub name: EcoString,
    #[serde(default)]
    pub span: Span,
}

impl Identifier {
    #[must_use]
    pub fn new(name: impl Into<EcoString>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: Identifier,
    /// Declared generic parameter names, e.g. `T, U` in `class Pair<T, U>`.
    #[serde(default)]
    pub generics: Vec<Identifier>,
    /// The `extends` clause. Classes without one extend `java.lang.Object`.
    #[serde(default)]
    pub base: Option<TypeExpr>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub constructors: Vec<ConstructorDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    #[serde(default)]
    pub span: Span,
}

/// A field declaration. Fields have no initializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub ty: TypeExpr,
    pub name: Identifier,
    #[serde(default)]
    pub span: Span,
}

/// A formal parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub ty: TypeExpr,
    pub name: Identifier,
}

/// A constructor. Its name is the name of the enclosing class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Arguments of an explicit leading `super(...)` call.
    #[serde(default)]
    pub super_arguments: Option<Vec<Expression>>,
    #[serde(default)]
    pub body: Vec<Statement>,
    #[serde(default)]
    pub span: Span,
}

/// A method declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: Identifier,
    #[serde(default)]
    pub is_static: bool,
    /// Method-level generic parameters, e.g. `<T>` in `static <T> T first(...)`.
    #[serde(default)]
    pub generics: Vec<Identifier>,
    /// `None` for `void`.
    #[serde(default)]
    pub return_type: Option<TypeExpr>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub body: Vec<Statement>,
    #[serde(default)]
    pub span: Span,
}

/// A written type: a (possibly dotted) name with generic arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeExpr {
    pub name: EcoString,
    #[serde(default)]
    pub generics: Vec<TypeExpr>,
    #[serde(default)]
    pub span: Span,
}

impl TypeExpr {
    #[must_use]
    pub fn new(name: impl Into<EcoString>, generics: Vec<TypeExpr>, span: Span) -> Self {
        Self {
            name: name.into(),
            generics,
            span,
        }
    }

    /// Parses a written type such as `java.util.List<E>`.
    ///
    /// Parsing is lenient: malformed text produces a type whose name will not
    /// resolve, which is reported when the type is looked up.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut rest = text;
        parse_type(&mut rest)
    }
}

fn parse_type(rest: &mut &str) -> TypeExpr {
    let end = rest.find(['<', ',', '>']).unwrap_or(rest.len());
    let name = rest[..end].trim();
    *rest = &rest[end..];
    let mut generics = Vec::new();
    if let Some(after) = rest.strip_prefix('<') {
        *rest = after;
        loop {
            generics.push(parse_type(rest));
            if let Some(after) = rest.strip_prefix(',') {
                *rest = after;
                continue;
            }
            if let Some(after) = rest.strip_prefix('>') {
                *rest = after;
            }
            break;
        }
    }
    TypeExpr::new(name, generics, Span::default())
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.generics.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.generics.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(EcoString),
    Null,
}

/// Binary operators, serialized as their source symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Rem,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "<<")]
    Shl,
    #[serde(rename = ">>")]
    Shr,
    #[serde(rename = ">>>")]
    UShr,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "&")]
    BitAnd,
    #[serde(rename = "^")]
    BitXor,
    #[serde(rename = "|")]
    BitOr,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
}

impl BinaryOperator {
    /// Binding strength; higher binds tighter. All levels are left-associative.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Mul | Self::Div | Self::Rem => 10,
            Self::Add | Self::Sub => 9,
            Self::Shl | Self::Shr | Self::UShr => 8,
            Self::Lt | Self::Gt | Self::Le | Self::Ge => 7,
            Self::Eq | Self::Ne => 6,
            Self::BitAnd => 5,
            Self::BitXor => 4,
            Self::BitOr => 3,
            Self::And => 2,
            Self::Or => 1,
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::UShr => ">>>",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::BitAnd => "&",
            Self::BitXor => "^",
            Self::BitOr => "|",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Prefix unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "~")]
    BitNot,
}

impl UnaryOperator {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Not => "!",
            Self::BitNot => "~",
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// `++` or `--`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncrementOperator {
    #[serde(rename = "++")]
    Increment,
    #[serde(rename = "--")]
    Decrement,
}

impl fmt::Display for IncrementOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Increment => "++",
            Self::Decrement => "--",
        })
    }
}

/// `=` or a compound assignment operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignOperator {
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "+=")]
    Add,
    #[serde(rename = "-=")]
    Sub,
    #[serde(rename = "*=")]
    Mul,
    #[serde(rename = "/=")]
    Div,
    #[serde(rename = "%=")]
    Rem,
    #[serde(rename = "&=")]
    BitAnd,
    #[serde(rename = "|=")]
    BitOr,
    #[serde(rename = "^=")]
    BitXor,
    #[serde(rename = "<<=")]
    Shl,
    #[serde(rename = ">>=")]
    Shr,
    #[serde(rename = ">>>=")]
    UShr,
}

impl AssignOperator {
    /// The binary operator a compound assignment applies, or `None` for `=`.
    #[must_use]
    pub const fn binary(self) -> Option<BinaryOperator> {
        Some(match self {
            Self::Assign => return None,
            Self::Add => BinaryOperator::Add,
            Self::Sub => BinaryOperator::Sub,
            Self::Mul => BinaryOperator::Mul,
            Self::Div => BinaryOperator::Div,
            Self::Rem => BinaryOperator::Rem,
            Self::BitAnd => BinaryOperator::BitAnd,
            Self::BitOr => BinaryOperator::BitOr,
            Self::BitXor => BinaryOperator::BitXor,
            Self::Shl => BinaryOperator::Shl,
            Self::Shr => BinaryOperator::Shr,
            Self::UShr => BinaryOperator::UShr,
        })
    }
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expression {
    Literal {
        value: Literal,
        #[serde(default)]
        span: Span,
    },

    /// A bare name: a local, parameter, field, `this`, a class or a namespace.
    Variable(Identifier),

    Binary {
        lhs: Box<Expression>,
        operator: BinaryOperator,
        rhs: Box<Expression>,
        #[serde(default)]
        span: Span,
    },

    Unary {
        operator: UnaryOperator,
        operand: Box<Expression>,
        #[serde(default)]
        span: Span,
    },

    /// `++x`, `x--`, `this.count++` ...
    Increment {
        operator: IncrementOperator,
        prefix: bool,
        target: Box<Expression>,
        #[serde(default)]
        span: Span,
    },

    Ternary {
        condition: Box<Expression>,
        then_value: Box<Expression>,
        else_value: Box<Expression>,
        #[serde(default)]
        span: Span,
    },

    /// `new T<A>(args)`.
    New {
        ty: TypeExpr,
        #[serde(default)]
        arguments: Vec<Expression>,
        #[serde(default)]
        span: Span,
    },

    FieldAccess {
        receiver: Box<Expression>,
        field: Identifier,
        #[serde(default)]
        span: Span,
    },

    MethodCall {
        receiver: Box<Expression>,
        method: Identifier,
        #[serde(default)]
        arguments: Vec<Expression>,
        #[serde(default)]
        span: Span,
    },

    /// `(T) expr`.
    Cast {
        ty: TypeExpr,
        expression: Box<Expression>,
        #[serde(default)]
        span: Span,
    },

    InstanceOf {
        expression: Box<Expression>,
        ty: TypeExpr,
        #[serde(default)]
        span: Span,
    },

    /// A parenthesized expression; a boundary for precedence restructuring.
    Group {
        expression: Box<Expression>,
        #[serde(default)]
        span: Span,
    },
}

impl Expression {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Variable(identifier) => identifier.span,
            Self::Literal { span, .. }
            | Self::Binary { span, .. }
            | Self::Unary { span, .. }
            | Self::Increment { span, .. }
            | Self::Ternary { span, .. }
            | Self::New { span, .. }
            | Self::FieldAccess { span, .. }
            | Self::MethodCall { span, .. }
            | Self::Cast { span, .. }
            | Self::InstanceOf { span, .. }
            | Self::Group { span, .. } => *span,
        }
    }

    /// Returns true for a `null` literal, possibly parenthesized.
    #[must_use]
    pub fn is_null_literal(&self) -> bool {
        match self {
            Self::Literal {
                value: Literal::Null,
                ..
            } => true,
            Self::Group { expression, .. } => expression.is_null_literal(),
            _ => false,
        }
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    /// `T name;` or `T name = value;`
    LocalVariable {
        ty: TypeExpr,
        name: Identifier,
        #[serde(default)]
        value: Option<Expression>,
        #[serde(default)]
        span: Span,
    },

    /// `name op value;`
    Assign {
        target: Identifier,
        operator: AssignOperator,
        value: Expression,
        #[serde(default)]
        span: Span,
    },

    /// `receiver.field op value;`
    FieldAssign {
        receiver: Expression,
        field: Identifier,
        operator: AssignOperator,
        value: Expression,
        #[serde(default)]
        span: Span,
    },

    Expression {
        expression: Expression,
        #[serde(default)]
        span: Span,
    },

    If {
        condition: Expression,
        then_branch: Vec<Statement>,
        #[serde(default)]
        else_branch: Option<Vec<Statement>>,
        #[serde(default)]
        span: Span,
    },

    While {
        condition: Expression,
        body: Vec<Statement>,
        #[serde(default)]
        span: Span,
    },

    /// `for (init; condition; update) body`. The init binding is scoped to the loop.
    For {
        init: Box<Statement>,
        condition: Expression,
        update: Box<Statement>,
        body: Vec<Statement>,
        #[serde(default)]
        span: Span,
    },

    Return {
        #[serde(default)]
        value: Option<Expression>,
        #[serde(default)]
        span: Span,
    },

    Block {
        statements: Vec<Statement>,
        #[serde(default)]
        span: Span,
    },
}

impl Statement {
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::LocalVariable { span, .. }
            | Self::Assign { span, .. }
            | Self::FieldAssign { span, .. }
            | Self::Expression { span, .. }
            | Self::If { span, .. }
            | Self::While { span, .. }
            | Self::For { span, .. }
            | Self::Return { span, .. }
            | Self::Block { span, .. } => *span,
        }
    }
}
