// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Type resolution, member dispatch and object construction.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use super::exec::Flow;
use super::scope::{Context, Scope};
use super::stack::Frame;
use super::value::{Instance, Value, Variable};
use super::{Interpreter, RuntimeError, RuntimeErrorKind};
use crate::ast::{Expression, TypeExpr};
use crate::native::NativeCall;
use crate::source_analysis::Span;
use crate::types::{
    Bindings, CacheKey, Class, Member, MemberBody, Resolution, RuntimeMembers, Signature, Ty,
    TypeError, TypeParams, resolve_constructor, resolve_method, substitute,
};

/// Binds every generic parameter of `signature` the call left open to
/// `java.lang.Object`.
fn complete_bindings(signature: &Signature, bindings: &Bindings) -> Bindings {
    let mut complete = bindings.clone();
    for generic in &signature.generics {
        complete.entry(generic.clone()).or_insert_with(Ty::object);
    }
    complete
}

/// Frame description, e.g. `Main.main()` or `new Box<int>(int)`.
struct FrameName<'a> {
    owner: &'a Class,
    signature: &'a Signature,
    is_constructor: bool,
}

impl fmt::Display for FrameName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_constructor {
            write!(f, "new {}(", self.owner)?;
        } else {
            write!(f, "{}.{}(", self.owner, self.signature.name)?;
        }
        for (i, param) in self.signature.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param.ty)?;
        }
        f.write_str(")")
    }
}

/// Types for overload resolution: a `null` literal argument has the null type
/// and every other argument its declared type.
pub(crate) fn argument_types(arguments: &[Expression], values: &[Variable]) -> Vec<Ty> {
    arguments
        .iter()
        .zip(values)
        .map(|(argument, value)| {
            if argument.is_null_literal() {
                Ty::null()
            } else {
                value.ty()
            }
        })
        .collect()
}

fn declared_types(values: &[Variable]) -> Vec<Ty> {
    values.iter().map(Variable::ty).collect()
}

fn describe(owner: &Class, signature: &Signature, is_constructor: bool) -> String {
    FrameName {
        owner,
        signature,
        is_constructor,
    }
    .to_string()
}

impl Interpreter {
    /// Resolves a written type in `scope`: generic parameters first, then
    /// class names through the scope's cache and the import table.
    pub(crate) fn resolve_type(
        &self,
        scope: &Scope<'_>,
        expr: &TypeExpr,
    ) -> Result<Rc<Class>, RuntimeError> {
        if expr.generics.is_empty() {
            if let Some(ty) = scope.type_params().get(&expr.name) {
                return self.class_of(ty, expr.span);
            }
        }
        let args = expr
            .generics
            .iter()
            .map(|arg| Ok(self.resolve_type(scope, arg)?.as_ty()))
            .collect::<Result<Vec<_>, RuntimeError>>()?;
        if let Some(class) = scope.cached(&expr.name, CacheKey::Args(&args)) {
            return Ok(class);
        }
        let name = self
            .table()
            .imports()
            .resolve(&expr.name)
            .cloned()
            .ok_or_else(|| self.type_error(TypeError::unknown(expr.name.clone(), expr.span)))?;
        let class = self.class_of(&Ty::class(name, args.clone()), expr.span)?;
        scope.remember(&expr.name, CacheKey::Args(&args), Rc::clone(&class));
        Ok(class)
    }

    /// The static view of the class `name` refers to, if it names one.
    pub(crate) fn static_class(
        &self,
        scope: &Scope<'_>,
        name: &str,
        span: Span,
    ) -> Result<Option<Rc<Class>>, RuntimeError> {
        if let Some(class) = scope.cached(name, CacheKey::Static) {
            return Ok(Some(class));
        }
        let Some(qualified) = self.table().imports().resolve(name).cloned() else {
            return Ok(None);
        };
        let class = self.types(self.registry.static_view(&qualified, span))?;
        scope.remember(name, CacheKey::Static, Rc::clone(&class));
        Ok(Some(class))
    }

    /// Resolves and runs a method of `class`. For instance calls `class` is
    /// the receiver's runtime class, so the most derived override runs.
    pub(crate) fn call_method(
        &self,
        class: &Rc<Class>,
        this: Value,
        name: &str,
        is_static: bool,
        args: Vec<Variable>,
        span: Span,
    ) -> Result<Option<Variable>, RuntimeError> {
        let arg_types = declared_types(&args);
        self.dispatch(class, this, name, is_static, args, &arg_types, span)
    }

    /// [`Self::call_method`] with the argument types resolution sees.
    #[expect(clippy::too_many_arguments, reason = "a call site's full context")]
    pub(crate) fn dispatch(
        &self,
        class: &Rc<Class>,
        this: Value,
        name: &str,
        is_static: bool,
        args: Vec<Variable>,
        arg_types: &[Ty],
        span: Span,
    ) -> Result<Option<Variable>, RuntimeError> {
        let members = RuntimeMembers::new(&self.registry);
        match self.types(resolve_method(&members, class, name, is_static, arg_types))? {
            Resolution::Found(selected) => {
                let member = &selected.owner.methods()[selected.member];
                self.invoke(&selected.owner, member, this, args, &selected.bindings, span)
            }
            Resolution::Ambiguous(ambiguity) => {
                Err(self.error(RuntimeErrorKind::AmbiguousMember(ambiguity), span))
            }
            Resolution::Missing(missing) => {
                Err(self.error(RuntimeErrorKind::NoSuchMember(missing), span))
            }
            // Only constructors resolve to the default.
            Resolution::DefaultConstructor => Ok(None),
        }
    }

    fn invoke(
        &self,
        owner: &Rc<Class>,
        member: &Member,
        this: Value,
        args: Vec<Variable>,
        bindings: &Bindings,
        span: Span,
    ) -> Result<Option<Variable>, RuntimeError> {
        let signature = self.types(owner.signature(member, self.table()))?;
        let bindings = complete_bindings(&signature, bindings);
        let _frame = self.enter(Frame::new(
            describe(owner, &signature, false),
            self.location(span),
        ));
        trace!(owner = %owner, member = %signature, "invoke");

        let result = match &member.template().body {
            MemberBody::Native(function) => {
                let call = NativeCall::new(self, Rc::clone(owner), this, args, span);
                Some(function(&call)?)
            }
            MemberBody::Declared { body, .. } => {
                let context = match this {
                    Value::Object(instance) => Context::Instance {
                        this: instance,
                        class: Rc::clone(owner),
                    },
                    _ => Context::Static(Rc::clone(owner)),
                };
                let mut generics = TypeParams::default();
                for name in &signature.generics {
                    let bound = bindings.get(name).map_or_else(Ty::object, Ty::resolved);
                    generics.push(name.clone(), Ty::bound(name.clone(), bound));
                }
                let scope = Scope::invocation(context, generics);
                self.bind_parameters(&scope, &signature, &bindings, args, span)?;
                match self.exec_block(&scope, body)? {
                    Flow::Return(value) => value.map(|variable| variable.value),
                    Flow::Normal => None,
                }
            }
        };

        match (&signature.return_type, result) {
            (Some(ty), Some(value)) => {
                let class = self.class_of(&substitute(ty, &bindings), span)?;
                Ok(Some(Variable::new(class, value)))
            }
            _ => Ok(None),
        }
    }

    fn bind_parameters(
        &self,
        scope: &Scope<'_>,
        signature: &Signature,
        bindings: &Bindings,
        args: Vec<Variable>,
        span: Span,
    ) -> Result<(), RuntimeError> {
        for (param, arg) in signature.params.iter().zip(args) {
            let class = self.class_of(&substitute(&param.ty, bindings), span)?;
            scope.define(param.name.clone(), Variable::new(class, arg.value));
        }
        Ok(())
    }

    /// Allocates an instance with every field on the chain at its default
    /// value, without running a constructor.
    ///
    /// # Errors
    ///
    /// Fails when a field type cannot be instantiated.
    pub fn allocate(&self, class: &Rc<Class>, span: Span) -> Result<Rc<Instance>, RuntimeError> {
        let mut fields = HashMap::new();
        for slot in class.all_fields() {
            if fields.contains_key(&slot.name) {
                continue;
            }
            let field_class = self.class_of(&slot.ty, span)?;
            let value = Value::default_for(&field_class);
            fields.insert(slot.name.clone(), Variable::new(field_class, value));
        }
        trace!(class = %class, "allocate");
        Ok(Instance::new(Rc::clone(class), fields))
    }

    /// Allocates an instance of `class` and runs the constructor `args`
    /// select, including the base constructor chain.
    ///
    /// # Errors
    ///
    /// Propagates constructor resolution and execution failures.
    pub fn construct(
        &self,
        class: &Rc<Class>,
        args: Vec<Variable>,
        span: Span,
    ) -> Result<Rc<Instance>, RuntimeError> {
        let arg_types = declared_types(&args);
        self.instantiate(class, args, &arg_types, span)
    }

    /// [`Self::construct`] with the argument types resolution sees.
    pub(crate) fn instantiate(
        &self,
        class: &Rc<Class>,
        args: Vec<Variable>,
        arg_types: &[Ty],
        span: Span,
    ) -> Result<Rc<Instance>, RuntimeError> {
        let instance = self.allocate(class, span)?;
        self.initialize(class, &instance, args, arg_types, span)?;
        Ok(instance)
    }

    /// Runs `class`'s part of the constructor chain on `instance`.
    fn initialize(
        &self,
        class: &Rc<Class>,
        instance: &Rc<Instance>,
        args: Vec<Variable>,
        arg_types: &[Ty],
        span: Span,
    ) -> Result<(), RuntimeError> {
        let members = RuntimeMembers::new(&self.registry);
        match self.types(resolve_constructor(&members, class, arg_types))? {
            Resolution::Found(selected) => {
                let member = &class.constructors()[selected.member];
                self.run_constructor(class, member, instance, args, span)
            }
            Resolution::DefaultConstructor => match class.base() {
                Some(base) => self.initialize(base, instance, Vec::new(), &[], span),
                None => Ok(()),
            },
            Resolution::Ambiguous(ambiguity) => {
                Err(self.error(RuntimeErrorKind::AmbiguousMember(ambiguity), span))
            }
            Resolution::Missing(missing) => {
                Err(self.error(RuntimeErrorKind::NoSuchMember(missing), span))
            }
        }
    }

    fn run_constructor(
        &self,
        class: &Rc<Class>,
        member: &Member,
        instance: &Rc<Instance>,
        args: Vec<Variable>,
        span: Span,
    ) -> Result<(), RuntimeError> {
        let signature = self.types(class.signature(member, self.table()))?;
        let _frame = self.enter(Frame::new(
            describe(class, &signature, true),
            self.location(span),
        ));
        trace!(class = %class, constructor = %signature, "construct");

        match &member.template().body {
            MemberBody::Native(function) => {
                let this = Value::Object(Rc::clone(instance));
                function(&NativeCall::new(self, Rc::clone(class), this, args, span))?;
            }
            MemberBody::Declared {
                body,
                super_arguments,
            } => {
                let context = Context::Instance {
                    this: Rc::clone(instance),
                    class: Rc::clone(class),
                };
                let scope = Scope::invocation(context, TypeParams::default());
                let bindings = complete_bindings(&signature, &Bindings::new());
                self.bind_parameters(&scope, &signature, &bindings, args, span)?;
                if let Some(base) = class.base() {
                    let arguments = super_arguments.as_deref().unwrap_or_default();
                    let super_args = self.eval_all(&scope, arguments)?;
                    let arg_types = argument_types(arguments, &super_args);
                    self.initialize(
                        base,
                        instance,
                        super_args,
                        &arg_types,
                        member.template().span,
                    )?;
                }
                self.exec_block(&scope, body)?;
            }
        }
        Ok(())
    }

    /// Reads a host-initialized static field of `class` or an ancestor,
    /// running its initializer on first access.
    pub(crate) fn static_field(
        &self,
        class: &Rc<Class>,
        name: &str,
        span: Span,
    ) -> Result<Variable, RuntimeError> {
        let declaring = std::iter::successors(Some(class), |class| class.base())
            .find_map(|class| {
                let field = class.template().native()?.static_field(name)?.clone();
                Some((class, field))
            });
        let Some((owner, field)) = declaring else {
            return Err(self.error(
                RuntimeErrorKind::UndefinedVariable {
                    name: format!("{}.{name}", class.name()).into(),
                },
                span,
            ));
        };
        let key = (owner.name().clone(), field.name.clone());
        if let Some(variable) = self.statics.borrow().get(&key) {
            return Ok(variable.clone());
        }
        let ty = self.types(self.table().lower(&field.ty, &TypeParams::default()))?;
        let field_class = self.class_of(&ty, span)?;
        let value = (field.init)(&NativeCall::new(
            self,
            Rc::clone(owner),
            Value::Null,
            Vec::new(),
            span,
        ))?;
        let variable = Variable::new(field_class, value);
        self.statics.borrow_mut().insert(key, variable.clone());
        Ok(variable)
    }
}
