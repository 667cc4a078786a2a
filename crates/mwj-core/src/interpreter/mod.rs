// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Tree-walking execution engine.
//!
//! **DDD Context:** Execution Engine
//!
//! The engine instantiates runtime classes from the program's class table on
//! demand, then evaluates the entry class's `static void main()`. Calls go
//! through the same resolver the analyzer uses, run against instantiated
//! classes instead of declared types; dispatch uses the receiver's runtime
//! class.
//!
//! ```
//! use mwj_core::ast::build::{class, expr, main_method, println, program, string};
//! use mwj_core::Interpreter;
//!
//! let program = program(vec![class("Main").method(main_method(vec![expr(println(string("hi")))]))]);
//! Interpreter::new(&program).unwrap().run().unwrap();
//! ```

mod error;
mod eval;
mod exec;
mod invoke;
mod operators;
mod scope;
mod stack;
mod value;

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use ecow::EcoString;
use tracing::{debug, instrument};

use crate::ast::Program;
use crate::native::NativeRegistry;
use crate::source_analysis::{SourceLocation, Span};
use crate::types::{Class, ClassTable, Missing, Ty, TypeError, TypeRegistry};

pub use error::{RuntimeError, RuntimeErrorKind};
pub use operators::{OperatorError, binary, step, unary};
pub use scope::{Context, Scope};
pub use stack::{ExecutionObserver, Frame, Stack};
pub use value::{Instance, Value, Variable, format_float};


/// Runs one program.
///
/// Holds the runtime class registry, the call stack, the output sink and the
/// lazily initialized static fields of native classes. Single-threaded: all
/// mutable state sits behind `RefCell`s so evaluation can borrow the engine
/// immutably while recursing.
pub struct Interpreter {
    registry: TypeRegistry,
    source: EcoString,
    entry: Option<EcoString>,
    stack: RefCell<Stack>,
    output: RefCell<Box<dyn Write>>,
    observer: Option<Box<dyn ExecutionObserver>>,
    statics: RefCell<HashMap<(EcoString, EcoString), Variable>>,
}

impl Interpreter {
    /// An engine for `program` with the standard library, writing to stdout.
    ///
    /// # Errors
    ///
    /// Fails when the program's classes do not form a valid class table.
    pub fn new(program: &Program) -> Result<Self, RuntimeError> {
        Self::with_natives(program, NativeRegistry::standard())
    }

    /// An engine for `program` with a custom set of native classes.
    ///
    /// # Errors
    ///
    /// Fails when the program's classes do not form a valid class table.
    #[instrument(skip_all, fields(source = %program.source))]
    pub fn with_natives(program: &Program, natives: NativeRegistry) -> Result<Self, RuntimeError> {
        let table = ClassTable::build(program, Rc::new(natives)).map_err(|error| {
            let span = error.span();
            RuntimeError {
                kind: RuntimeErrorKind::Type(error),
                location: SourceLocation::new(program.source.clone(), span),
                stack: Vec::new(),
            }
        })?;
        let entry = program
            .classes
            .iter()
            .find(|class| {
                class.methods.iter().any(|method| {
                    method.is_static && method.name.name == "main" && method.parameters.is_empty()
                })
            })
            .map(|class| class.name.name.clone());
        debug!(entry = ?entry, classes = program.classes.len(), "built class table");
        Ok(Self {
            registry: TypeRegistry::new(Rc::new(table)),
            source: program.source.clone(),
            entry,
            stack: RefCell::new(Stack::default()),
            output: RefCell::new(Box::new(io::stdout())),
            observer: None,
            statics: RefCell::new(HashMap::new()),
        })
    }

    /// Redirects program output.
    #[must_use]
    pub fn with_output(mut self, output: impl Write + 'static) -> Self {
        self.output = RefCell::new(Box::new(output));
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: impl ExecutionObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Overrides the source name used in error locations.
    #[must_use]
    pub fn with_source_name(mut self, source: impl Into<EcoString>) -> Self {
        self.source = source.into();
        self
    }

    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[must_use]
    pub fn table(&self) -> &ClassTable {
        self.registry.table()
    }

    /// Runs `static void main()` of the first class that declares one.
    ///
    /// # Errors
    ///
    /// Returns the error that aborted execution.
    #[instrument(skip_all, fields(source = %self.source))]
    pub fn run(&self) -> Result<(), RuntimeError> {
        let _global = self.enter(Frame::new("Global", self.location(Span::default())));
        let Some(entry) = self.entry.clone() else {
            return Err(self.error(
                RuntimeErrorKind::NoSuchMember(Missing {
                    class: self.source.clone(),
                    member: "main".into(),
                    arguments: Vec::new(),
                }),
                Span::default(),
            ));
        };
        self.call_static(&entry, "main", Vec::new(), Span::default())?;
        self.flush()
    }

    /// Calls a static method by class and method name, as a host would.
    ///
    /// # Errors
    ///
    /// Fails when the class or method cannot be resolved, or the method fails.
    pub fn call_static(
        &self,
        class: &str,
        method: &str,
        args: Vec<Variable>,
        span: Span,
    ) -> Result<Option<Variable>, RuntimeError> {
        let name = self
            .table()
            .imports()
            .resolve(class)
            .cloned()
            .ok_or_else(|| self.type_error(TypeError::UnknownType { name: class.into(), span }))?;
        let view = self.types(self.registry.static_view(&name, span))?;
        self.call_method(&view, Value::Null, method, true, args, span)
    }

    /// The runtime class of a concrete type.
    ///
    /// # Errors
    ///
    /// Fails when the type names an unknown class, has the wrong number of
    /// generic arguments or mentions an unbound generic.
    pub fn class_of(&self, ty: &Ty, span: Span) -> Result<Rc<Class>, RuntimeError> {
        self.types(self.registry.class_of(ty, span))
    }

    /// Writes program output.
    ///
    /// # Errors
    ///
    /// Fails when the output sink fails.
    pub fn write_output(&self, text: &str) -> io::Result<()> {
        self.output.borrow_mut().write_all(text.as_bytes())
    }

    fn flush(&self) -> Result<(), RuntimeError> {
        self.output.borrow_mut().flush().map_err(|error| {
            self.error(
                RuntimeErrorKind::InvalidOperation {
                    message: format!("failed to flush output: {error}"),
                },
                Span::default(),
            )
        })
    }

    /// An error at `span` with a snapshot of the current stack.
    #[must_use]
    pub fn error(&self, kind: RuntimeErrorKind, span: Span) -> RuntimeError {
        RuntimeError {
            kind,
            location: self.location(span),
            stack: self.stack.borrow().frames().to_vec(),
        }
    }

    /// Number of frames currently on the stack.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.borrow().depth()
    }

    pub(crate) fn location(&self, span: Span) -> SourceLocation {
        SourceLocation::new(self.source.clone(), span)
    }

    pub(crate) fn type_error(&self, error: TypeError) -> RuntimeError {
        let span = error.span();
        self.error(RuntimeErrorKind::Type(error), span)
    }

    pub(crate) fn types<T>(&self, result: Result<T, TypeError>) -> Result<T, RuntimeError> {
        result.map_err(|error| self.type_error(error))
    }

    /// Pushes a frame; it is popped when the guard drops.
    pub(crate) fn enter(&self, frame: Frame) -> FrameGuard<'_> {
        if let Some(observer) = &self.observer {
            observer.on_enter(&frame);
        }
        self.stack.borrow_mut().push(frame);
        FrameGuard { interpreter: self }
    }

    pub(crate) fn observer(&self) -> Option<&dyn ExecutionObserver> {
        self.observer.as_deref()
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("source", &self.source)
            .field("entry", &self.entry)
            .field("classes", &self.registry.len())
            .finish_non_exhaustive()
    }
}

/// Pops the frame pushed by [`Interpreter::enter`] on every exit path.
pub(crate) struct FrameGuard<'a> {
    interpreter: &'a Interpreter,
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        let frame = self.interpreter.stack.borrow_mut().pop();
        if let (Some(observer), Some(frame)) = (&self.interpreter.observer, frame) {
            observer.on_exit(&frame);
        }
    }
}

/// Runs `program` with the standard library, reporting errors against
/// `source_name`.
///
/// # Errors
///
/// Returns the error that aborted execution.
pub fn interpret(program: &Program, source_name: &str) -> Result<(), RuntimeError> {
    Interpreter::new(program)?.with_source_name(source_name).run()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::ast::Statement;
    use crate::ast::build::{
        at, call, class, constructor, expr, int, local, main_method, method, new, null, param,
        println, program, static_method, string, var,
    };
    use crate::test_helpers::SharedBuffer;

    #[derive(Default, Clone)]
    struct Recorder {
        events: Rc<RefCell<Vec<String>>>,
    }

    impl ExecutionObserver for Recorder {
        fn on_statement(&self, _statement: &Statement, depth: usize) {
            self.events.borrow_mut().push(format!("stmt@{depth}"));
        }

        fn on_enter(&self, frame: &Frame) {
            self.events.borrow_mut().push(format!("enter {}", frame.description));
        }

        fn on_exit(&self, frame: &Frame) {
            self.events.borrow_mut().push(format!("exit {}", frame.description));
        }
    }

    #[test]
    fn runs_main_of_first_class_declaring_it() {
        let program = program(vec![
            class("Helper").method(static_method("greet", None, vec![], vec![expr(println(
                string("from helper"),
            ))])),
            class("Main").method(main_method(vec![
                expr(call(var("Helper"), "greet", vec![])),
                expr(println(string("from main"))),
            ])),
        ]);
        let out = SharedBuffer::default();
        Interpreter::new(&program)
            .expect("valid program")
            .with_output(out.clone())
            .run()
            .expect("runs");
        assert_eq!(out.contents(), "from helper\nfrom main\n");
    }

    #[test]
    fn missing_main_is_reported() {
        let program = program(vec![class("Main")]);
        let error = Interpreter::new(&program).expect("valid").run().unwrap_err();
        assert!(matches!(error.kind, RuntimeErrorKind::NoSuchMember(_)));
    }

    #[test]
    fn errors_carry_the_stack_and_location() {
        let program = program(vec![class("Main").method(main_method(vec![
            local("String", "s", Some(null())),
            at(expr(println(call(var("s"), "length", vec![]))), 4, 9),
        ]))]);
        let error = interpret(&program, "Main.java").unwrap_err();
        assert_eq!(
            error.kind,
            RuntimeErrorKind::NullDereference {
                member: "length".into()
            }
        );
        let frames: Vec<&str> = error.stack.iter().map(|f| f.description.as_str()).collect();
        assert_eq!(frames, ["Global", "Main.main()"]);
        assert_eq!(error.location.source, "Main.java");
    }

    #[test]
    fn observer_sees_frames_and_statements() {
        let recorder = Recorder::default();
        let program = program(vec![class("Main").method(main_method(vec![local(
            "int",
            "x",
            Some(int(1)),
        )]))]);
        Interpreter::new(&program)
            .expect("valid")
            .with_observer(recorder.clone())
            .run()
            .expect("runs");
        assert_eq!(
            *recorder.events.borrow(),
            ["enter Global", "enter Main.main()", "stmt@2", "exit Main.main()", "exit Global"]
        );
    }

    #[test]
    fn frames_name_the_instantiated_member() {
        let recorder = Recorder::default();
        let program = program(vec![
            class("Box")
                .generics(&["T"])
                .constructor(constructor(vec![param("T", "v")], vec![]))
                .method(method("put", None, vec![param("T", "v"), param("String", "s")], vec![])),
            class("Main").method(main_method(vec![
                local("Box<int>", "b", Some(new("Box<int>", vec![int(1)]))),
                expr(call(var("b"), "put", vec![int(2), string("x")])),
            ])),
        ]);
        Interpreter::new(&program)
            .expect("valid")
            .with_observer(recorder.clone())
            .run()
            .expect("runs");
        let entered: Vec<String> = recorder
            .events
            .borrow()
            .iter()
            .filter(|event| event.starts_with("enter "))
            .cloned()
            .collect();
        assert_eq!(
            entered,
            [
                "enter Global",
                "enter Main.main()",
                "enter new Box<int>(int)",
                "enter Box<int>.put(int, java.lang.String)",
            ]
        );
    }

    #[test]
    fn invalid_class_table_fails_construction() {
        let program = program(vec![class("Main").extends("Missing")]);
        let error = Interpreter::new(&program).unwrap_err();
        assert!(matches!(error.kind, RuntimeErrorKind::Type(TypeError::UnknownType { .. })));
    }
}
