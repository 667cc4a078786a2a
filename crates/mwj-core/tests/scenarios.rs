// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! End-to-end scenarios: analysis followed by execution.
//!
//! Each test builds a program with the AST builders, runs the analyzer over
//! it and then executes it, comparing program output. Programs mirror what an
//! external parser would hand over, including binary chains nested without
//! regard to precedence.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use mwj_core::ast::build::{
    assign, binary, block, boolean, call, class, constructor, expr, field, field_assign, for_,
    group, if_, import, int, local, main_method, method, new, null, param, post_increment,
    println, program, ret, static_method, string, ternary, this, var, while_,
};
use mwj_core::ast::{BinaryOperator as Op, Expression, Program, Statement};
use mwj_core::interpreter::{Interpreter, Value};
use mwj_core::source_analysis::Span;
use mwj_core::{AnalysisErrorKind, MwjError, RuntimeErrorKind, analyse};

#[derive(Debug, Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Analyses and runs `program`, returning what it printed.
fn output_of(mut program: Program) -> String {
    analyse(&mut program).expect("program is well-typed");
    let out = SharedBuffer::default();
    Interpreter::new(&program)
        .expect("class table builds")
        .with_output(out.clone())
        .run()
        .expect("program runs");
    out.contents()
}

fn analysis_message(mut program: Program) -> String {
    match analyse(&mut program) {
        Ok(()) => panic!("expected analysis to fail"),
        Err(error) => error.kind.to_string(),
    }
}

fn show(value: Expression) -> Statement {
    expr(println(call(var("Integer"), "toString", vec![value])))
}

fn size(list: &str) -> Expression {
    call(var(list), "size", vec![])
}

fn first(list: &str) -> Expression {
    call(var(list), "get", vec![int(0)])
}

// ============================================================================
// Scenarios
// ============================================================================

fn boxed() -> mwj_core::ast::ClassDecl {
    class("Box")
        .generics(&["T"])
        .field("T", "value")
        .constructor(constructor(
            vec![param("T", "value")],
            vec![field_assign(this(), "value", var("value"))],
        ))
        .method(method("get", Some("T"), vec![], vec![ret(Some(field(this(), "value")))]))
}

#[test]
fn generic_box_returns_its_argument_typed_by_the_instantiation() {
    let make = vec![
        local("Box<Integer>", "b", Some(new("Box<Integer>", vec![int(5)]))),
        ret(Some(call(var("b"), "get", vec![]))),
    ];
    let mut program = program(vec![
        boxed(),
        class("Main")
            .method(main_method(vec![show(call(var("Main"), "unwrap", vec![]))]))
            .method(static_method("unwrap", Some("Integer"), vec![], make)),
    ]);
    analyse(&mut program).expect("program is well-typed");

    let interpreter = Interpreter::new(&program).expect("class table builds");
    let result = interpreter
        .call_static("Main", "unwrap", Vec::new(), Span::default())
        .expect("unwrap runs")
        .expect("unwrap returns a value");
    assert_eq!(result.class.name(), "java.lang.Integer");
    assert!(matches!(result.value, Value::Int(5)));

    assert_eq!(output_of(program), "5\n");
}

fn overloads(argument: Expression) -> Program {
    program(vec![
        class("A")
            .method(method(
                "f",
                None,
                vec![param("Integer", "i")],
                vec![expr(println(string("Integer")))],
            ))
            .method(method(
                "f",
                None,
                vec![param("String", "s")],
                vec![expr(println(string("String")))],
            ))
            .method(method(
                "g",
                None,
                vec![param("Object", "o")],
                vec![expr(println(string("Object")))],
            ))
            .method(method(
                "g",
                None,
                vec![param("String", "s")],
                vec![expr(println(string("String")))],
            )),
        class("Main").method(main_method(vec![
            local("A", "a", Some(new("A", vec![]))),
            local("String", "text", Some(string("x"))),
            expr(call(var("a"), "f", vec![var("text")])),
            expr(call(var("a"), "g", vec![argument])),
        ])),
    ])
}

#[test]
fn overloads_select_the_only_applicable_candidate() {
    // g(o) with an Object argument has one applicable candidate.
    assert_eq!(
        output_of(overloads(new("Object", vec![]))),
        "String\nObject\n"
    );
}

#[test]
fn overloads_with_two_applicable_candidates_are_ambiguous() {
    assert!(
        analysis_message(overloads(var("text"))).starts_with("Ambiguous arguments for 'A.g'")
    );

    // Without analysis the engine reaches the same verdict at runtime.
    let out = SharedBuffer::default();
    let error = Interpreter::new(&overloads(var("text")))
        .expect("class table builds")
        .with_output(out.clone())
        .run()
        .expect_err("ambiguous call");
    assert!(matches!(error.kind, RuntimeErrorKind::AmbiguousMember(_)));
    assert_eq!(out.contents(), "String\n");
}

#[test]
fn null_argument_fits_every_class_overload() {
    assert!(analysis_message(overloads(null())).starts_with("Ambiguous arguments for 'A.g'"));

    let error = Interpreter::new(&overloads(null()))
        .expect("class table builds")
        .with_output(SharedBuffer::default())
        .run()
        .expect_err("ambiguous call");
    assert!(matches!(error.kind, RuntimeErrorKind::AmbiguousMember(_)));
}

fn holders(main: Vec<Statement>) -> Program {
    program(vec![
        class("Holder").constructor(constructor(
            vec![param("String", "label")],
            vec![expr(println(string("holder")))],
        )),
        class("Named").extends("Holder").constructor(
            constructor(vec![], vec![expr(println(string("named")))]).with_super(vec![null()]),
        ),
        boxed(),
        class("A")
            .method(static_method(
                "f",
                None,
                vec![param("String", "s")],
                vec![expr(println(string("String")))],
            ))
            .method(static_method(
                "count",
                None,
                vec![param("int", "n")],
                vec![expr(println(string("int")))],
            )),
        class("Main").method(main_method(main)),
    ])
}

#[test]
fn null_arguments_select_class_parameters() {
    let program = holders(vec![
        expr(call(var("A"), "f", vec![null()])),
        expr(call(var("A"), "f", vec![group(null())])),
        local("Holder", "h", Some(new("Holder", vec![null()]))),
        local("Named", "n", Some(new("Named", vec![]))),
        local("Box<String>", "b", Some(new("Box<String>", vec![null()]))),
        local("String", "s", Some(null())),
        expr(call(var("A"), "f", vec![var("s")])),
    ]);
    assert_eq!(output_of(program), "String\nString\nholder\nholder\nnamed\nString\n");
}

#[test]
fn null_arguments_do_not_fit_primitive_parameters() {
    let call_count = || holders(vec![expr(call(var("A"), "count", vec![null()]))]);
    assert_eq!(
        analysis_message(call_count()),
        "No member 'count' of 'A' accepts (null)"
    );

    let error = Interpreter::new(&call_count())
        .expect("class table builds")
        .run()
        .expect_err("no candidate");
    let RuntimeErrorKind::NoSuchMember(missing) = &error.kind else {
        panic!("expected a missing member, got {:?}", error.kind);
    };
    assert_eq!(missing.to_string(), "No member 'count' of 'A' accepts (null)");
}

fn counting_loop(after: Vec<Statement>) -> Program {
    let mut body = vec![
        local("int", "sum", Some(int(0))),
        for_(
            local("int", "i", Some(int(0))),
            binary(var("i"), Op::Lt, int(3)),
            expr(post_increment(var("i"))),
            vec![assign("sum", binary(var("sum"), Op::Add, var("i")))],
        ),
        show(var("sum")),
    ];
    body.extend(after);
    program(vec![class("Main").method(main_method(body))])
}

#[test]
fn for_loop_variables_stay_inside_the_loop() {
    assert_eq!(output_of(counting_loop(vec![])), "3\n");

    let leaking = || counting_loop(vec![show(var("i"))]);
    assert_eq!(analysis_message(leaking()), "No such variable 'i'.");

    let error = Interpreter::new(&leaking())
        .expect("class table builds")
        .with_output(SharedBuffer::default())
        .run()
        .expect_err("i is out of scope");
    assert_eq!(
        error.kind,
        RuntimeErrorKind::UndefinedVariable { name: "i".into() }
    );
}

#[test]
fn a_return_nested_in_an_if_does_not_satisfy_the_return_check() {
    let classes = vec![
        class("Main")
            .method(main_method(vec![]))
            .method(static_method(
                "sign",
                Some("int"),
                vec![param("int", "n")],
                vec![if_(
                    binary(var("n"), Op::Lt, int(0)),
                    vec![ret(Some(int(-1)))],
                    Some(vec![ret(Some(int(1)))]),
                )],
            )),
    ];
    assert_eq!(
        analysis_message(program(classes)),
        "Method has no return statement and non-void return type 'int'."
    );
}

#[test]
fn calls_dispatch_on_the_runtime_class() {
    let classes = vec![
        class("Animal").method(method(
            "speak",
            Some("String"),
            vec![],
            vec![ret(Some(string("...")))],
        )),
        class("Dog").extends("Animal").method(method(
            "speak",
            Some("String"),
            vec![],
            vec![ret(Some(string("Woof")))],
        )),
        class("Main").method(main_method(vec![
            local("Animal", "a", Some(new("Dog", vec![]))),
            expr(println(call(var("a"), "speak", vec![]))),
            assign("a", new("Animal", vec![])),
            expr(println(call(var("a"), "speak", vec![]))),
        ])),
    ];
    assert_eq!(output_of(program(classes)), "Woof\n...\n");
}

#[test]
fn null_dereference_reports_the_call_stack() {
    let classes = vec![
        class("Node").field("String", "name"),
        class("Main")
            .method(main_method(vec![
                local("Node", "n", Some(null())),
                expr(call(var("Main"), "describe", vec![var("n")])),
            ]))
            .method(static_method(
                "describe",
                None,
                vec![param("Node", "node")],
                vec![expr(println(field(var("node"), "name")))],
            )),
    ];
    let mut program = program(classes);
    analyse(&mut program).expect("null is assignable to Node");

    let error = Interpreter::new(&program)
        .expect("class table builds")
        .with_output(SharedBuffer::default())
        .with_source_name("Nodes.java")
        .run()
        .expect_err("dereferences null");
    assert_eq!(
        error.kind,
        RuntimeErrorKind::NullDereference {
            member: "name".into()
        }
    );
    let frames: Vec<&str> = error
        .stack
        .iter()
        .map(|frame| frame.description.as_str())
        .collect();
    assert_eq!(frames, ["Global", "Main.main()", "Main.describe(Node)"]);
    let traceback = error.traceback();
    assert!(traceback.starts_with("Traceback (most recent call last):\n"));
    assert!(traceback.contains("in Main.describe(Node)"));
    assert!(traceback.ends_with("Null dereference accessing 'name'"));
}

#[test]
fn run_reports_analysis_errors_before_executing() {
    let mut program = program(vec![class("Main").method(main_method(vec![local(
        "Missing",
        "m",
        None,
    )]))]);
    let error = mwj_core::run(&mut program).expect_err("Missing is unknown");
    assert!(matches!(
        error,
        MwjError::Analysis(ref analysis)
            if analysis.kind == AnalysisErrorKind::UnknownType { name: "Missing".into() }
    ));
}

// ============================================================================
// Complete programs
// ============================================================================

fn pair() -> mwj_core::ast::ClassDecl {
    class("Pair")
        .generics(&["T", "U"])
        .field("T", "first")
        .field("U", "second")
        .constructor(constructor(
            vec![param("T", "first"), param("U", "second")],
            vec![expr(call(this(), "update", vec![var("first"), var("second")]))],
        ))
        .method(main_method(vec![
            block(vec![
                local(
                    "int",
                    "a",
                    Some(ternary(
                        group(binary(int(1), Op::Gt, int(3))),
                        int(1),
                        int(2),
                    )),
                ),
                show(var("a")),
            ]),
            expr(println(string("User-made generic type."))),
            local(
                "Pair<int, String>",
                "test",
                Some(new("Pair<int, String>", vec![int(1), string("Test")])),
            ),
            local(
                "Pair<Pair<int, String>, String>",
                "test2",
                Some(new(
                    "Pair<Pair<int, String>, String>",
                    vec![var("test"), string("Yeah")],
                )),
            ),
            show(call(call(var("test2"), "getFirst", vec![]), "getFirst", vec![])),
            expr(println(call(
                call(var("test2"), "getFirst", vec![]),
                "getSecond",
                vec![],
            ))),
            expr(println(call(var("test2"), "getSecond", vec![]))),
            show(call(var("Pair"), "test", vec![int(1)])),
        ]))
        .method(
            static_method(
                "test",
                Some("T"),
                vec![param("T", "test")],
                vec![ret(Some(var("test")))],
            )
            .generics(&["T"]),
        )
        .method(method("getFirst", Some("T"), vec![], vec![ret(Some(field(this(), "first")))]))
        .method(method(
            "setFirst",
            None,
            vec![param("T", "first")],
            vec![field_assign(this(), "first", var("first"))],
        ))
        .method(method("getSecond", Some("U"), vec![], vec![ret(Some(field(this(), "second")))]))
        .method(method(
            "update",
            None,
            vec![param("T", "first"), param("U", "second")],
            vec![
                field_assign(this(), "first", var("first")),
                field_assign(this(), "second", var("second")),
            ],
        ))
}

#[test]
fn user_defined_generic_pairs_nest() {
    assert_eq!(
        output_of(program(vec![pair()])),
        "2\nUser-made generic type.\n1\nTest\nYeah\n1\n"
    );
}

fn merge_sorter() -> Program {
    let sorter = |method: &str, args: Vec<Expression>| call(var("MergeSorter"), method, args);

    let mut main_body = vec![local("List<int>", "list", Some(new("List<int>", vec![])))];
    for value in [1, 6, 2, 3, 100, -10, 0] {
        main_body.push(expr(call(var("list"), "add", vec![int(value)])));
    }
    main_body.extend([
        local(
            "List<int>",
            "ascending",
            Some(sorter("sort", vec![var("list"), boolean(true)])),
        ),
        local(
            "List<int>",
            "descending",
            Some(sorter("sort", vec![var("list"), boolean(false)])),
        ),
        expr(println(string("Merge sort of:"))),
        expr(sorter("print_list", vec![var("list")])),
        expr(println(string("\nAscending:"))),
        expr(sorter("print_list", vec![var("ascending")])),
        expr(println(string("\nDescending:"))),
        expr(sorter("print_list", vec![var("descending")])),
    ]);

    let print_list = static_method(
        "print_list",
        None,
        vec![param("List<int>", "list")],
        vec![for_(
            local("int", "i", Some(int(0))),
            binary(var("i"), Op::Lt, size("list")),
            expr(post_increment(var("i"))),
            vec![show(call(var("list"), "get", vec![var("i")]))],
        )],
    );

    let copy_into = |target: &str| {
        vec![expr(call(
            var(target),
            "add",
            vec![call(var("list"), "get", vec![var("i")])],
        ))]
    };
    let sort = static_method(
        "sort",
        Some("List<T>"),
        vec![param("List<T>", "list"), param("boolean", "ascending")],
        vec![
            if_(
                binary(size("list"), Op::Le, int(1)),
                vec![ret(Some(var("list")))],
                None,
            ),
            local("List<T>", "left", Some(new("List<T>", vec![]))),
            local("List<T>", "right", Some(new("List<T>", vec![]))),
            local("int", "middle", Some(binary(size("list"), Op::Div, int(2)))),
            for_(
                local("int", "i", Some(int(0))),
                binary(var("i"), Op::Lt, var("middle")),
                expr(post_increment(var("i"))),
                copy_into("left"),
            ),
            for_(
                local("int", "i", Some(var("middle"))),
                binary(var("i"), Op::Lt, size("list")),
                expr(post_increment(var("i"))),
                copy_into("right"),
            ),
            assign("left", sorter("sort", vec![var("left"), var("ascending")])),
            assign("right", sorter("sort", vec![var("right"), var("ascending")])),
            ret(Some(sorter(
                "merge",
                vec![var("left"), var("right"), var("ascending")],
            ))),
        ],
    )
    .generics(&["T"]);

    // Chains below are nested to the right, as a precedence-unaware parser
    // would produce them.
    let both_non_empty = binary(
        size("left"),
        Op::Gt,
        binary(int(0), Op::And, binary(size("right"), Op::Gt, int(0))),
    );
    let either_non_empty = binary(
        size("left"),
        Op::Gt,
        binary(int(0), Op::Or, binary(size("right"), Op::Gt, int(0))),
    );
    let in_order = binary(
        first("left"),
        Op::Le,
        binary(first("right"), Op::Eq, var("ascending")),
    );
    let merge = static_method(
        "merge",
        Some("List<T>"),
        vec![
            param("List<T>", "left"),
            param("List<T>", "right"),
            param("boolean", "ascending"),
        ],
        vec![
            local("List<T>", "result", Some(new("List<T>", vec![]))),
            while_(
                either_non_empty,
                vec![
                    local("List<T>", "target", None),
                    if_(
                        both_non_empty,
                        vec![if_(
                            in_order,
                            vec![assign("target", var("left"))],
                            Some(vec![assign("target", var("right"))]),
                        )],
                        Some(vec![if_(
                            binary(size("left"), Op::Gt, int(0)),
                            vec![assign("target", var("left"))],
                            Some(vec![assign("target", var("right"))]),
                        )]),
                    ),
                    expr(call(var("result"), "add", vec![first("target")])),
                    expr(call(var("target"), "remove", vec![int(0)])),
                ],
            ),
            ret(Some(var("result"))),
        ],
    )
    .generics(&["T"]);

    let mut program = program(vec![
        class("MergeSorter")
            .constructor(constructor(vec![], vec![]))
            .method(main_method(main_body))
            .method(print_list)
            .method(sort)
            .method(merge),
    ]);
    program.imports.push(import("java.util.List"));
    program
}

#[test]
fn merge_sort_with_generic_static_methods() {
    assert_eq!(
        output_of(merge_sorter()),
        "Merge sort of:\n1\n6\n2\n3\n100\n-10\n0\n\
         \nAscending:\n-10\n0\n1\n2\n3\n6\n100\n\
         \nDescending:\n100\n6\n3\n2\n1\n0\n-10\n"
    );
}

#[test]
fn merge_sort_without_precedence_restructuring_is_ill_typed() {
    // The interpreter alone evaluates chains as nested, so the comparison
    // `0 && ...` is rejected at runtime.
    let error = Interpreter::new(&merge_sorter())
        .expect("class table builds")
        .with_output(SharedBuffer::default())
        .run()
        .expect_err("chains are not regrouped");
    assert!(matches!(error.kind, RuntimeErrorKind::InvalidOperation { .. }));
}

fn inheritance() -> Program {
    let says = |text: &str| vec![expr(println(string(text)))];
    let mut program = program(vec![
        class("Test")
            .constructor(constructor(
                vec![param("String", "test")],
                vec![expr(println(var("test")))],
            ))
            .method(method("only_in_test", None, vec![], says("In Test")))
            .method(method("in_both", None, vec![], says("In Test")))
            .method(static_method("static_in_test", None, vec![], says("In Test"))),
        class("Test2")
            .extends("Test")
            .constructor(constructor(vec![], vec![]).with_super(vec![string("TEST")]))
            .method(main_method(vec![
                local("Test2", "test", Some(new("Test2", vec![]))),
                expr(call(var("test"), "only_in_test", vec![])),
                expr(call(var("test"), "in_both", vec![])),
                expr(call(var("test"), "only_in_test2", vec![])),
                expr(call(var("Test2"), "static_in_test", vec![])),
                expr(call(var("Test"), "static_in_test", vec![])),
                local(
                    "TestList<Object>",
                    "cast_test",
                    Some(mwj_core::ast::build::cast(
                        "TestList<Object>",
                        new("TestList<String>", vec![]),
                    )),
                ),
                local("TestList<String>", "list", Some(new("TestList<String>", vec![]))),
                expr(call(var("list"), "add", vec![string("Test")])),
                expr(println(call(var("list"), "get", vec![int(0)]))),
            ]))
            .method(method("in_both", None, vec![], says("In Test2")))
            .method(method("only_in_test2", None, vec![], says("In Test2"))),
        class("TestList")
            .generics(&["F"])
            .extends("List<F>")
            .constructor(constructor(vec![], vec![])),
    ]);
    program.imports.push(import("java.util.List"));
    program
}

#[test]
fn declared_classes_inherit_from_declared_and_native_bases() {
    assert_eq!(
        output_of(inheritance()),
        "TEST\nIn Test\nIn Test2\nIn Test2\nIn Test\nIn Test\nTest\n"
    );
}
