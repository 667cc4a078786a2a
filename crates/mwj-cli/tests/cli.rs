// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Driver tests over serialized programs in temporary directories.

use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::rc::Rc;

use camino::Utf8PathBuf;
use mwj_cli::commands::check::{CheckOptions, check};
use mwj_cli::commands::run::{RunOptions, run};
use mwj_cli::config::{self, CONFIG_FILE};
use mwj_core::ast::build::{
    binary, call, call_at, class, expr, if_, import, int, local, main_method, new, null, param,
    println, program, ret, static_method, string, var,
};
use mwj_core::ast::{BinaryOperator, Program};
use tempfile::TempDir;

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

struct Workspace {
    _temp: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 path");
        Self { _temp: temp, root }
    }

    fn write_program(&self, name: &str, program: &Program) -> Utf8PathBuf {
        let path = self.root.join(name);
        let json = serde_json::to_string_pretty(program).expect("program serializes");
        fs::write(&path, json).expect("write program");
        path
    }

    fn write(&self, name: &str, content: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        fs::write(&path, content).expect("write file");
        path
    }
}

fn run_options(program: Utf8PathBuf) -> RunOptions {
    RunOptions {
        program,
        source: None,
        no_analyse: false,
    }
}

fn run_to_string(options: &RunOptions) -> miette::Result<String> {
    let config = config::load(&options.program)?;
    let out = SharedBuffer::default();
    run(options, &config, out.clone())?;
    Ok(out.contents())
}

fn hello() -> Program {
    program(vec![
        class("Main").method(main_method(vec![expr(println(string("Hello")))])),
    ])
}

/// `sign` returns only from inside an `if`, which analysis rejects but which
/// runs fine.
fn returns_from_branches() -> Program {
    program(vec![
        class("Main")
            .method(main_method(vec![expr(println(call(
                var("Integer"),
                "toString",
                vec![call(var("Main"), "sign", vec![int(-4)])],
            )))]))
            .method(static_method(
                "sign",
                Some("int"),
                vec![param("int", "n")],
                vec![if_(
                    binary(var("n"), BinaryOperator::Lt, int(0)),
                    vec![ret(Some(int(-1)))],
                    Some(vec![ret(Some(int(1)))]),
                )],
            )),
    ])
}

#[test]
fn runs_a_program() {
    let workspace = Workspace::new();
    let path = workspace.write_program("Main.json", &hello());
    assert_eq!(run_to_string(&run_options(path)).expect("runs"), "Hello\n");
}

#[test]
fn analysis_errors_stop_the_run() {
    let workspace = Workspace::new();
    let path = workspace.write_program("Main.json", &returns_from_branches());

    let error = run_to_string(&run_options(path)).expect_err("rejected");
    assert!(
        error
            .to_string()
            .contains("Method has no return statement and non-void return type 'int'.")
    );
}

#[test]
fn no_analyse_flag_skips_the_analyzer() {
    let workspace = Workspace::new();
    let path = workspace.write_program("Main.json", &returns_from_branches());
    let options = RunOptions {
        no_analyse: true,
        ..run_options(path)
    };
    assert_eq!(run_to_string(&options).expect("runs"), "-1\n");
}

#[test]
fn config_can_disable_analysis() {
    let workspace = Workspace::new();
    workspace.write(CONFIG_FILE, "[run]\nanalyse = false\n");
    let path = workspace.write_program("Main.json", &returns_from_branches());
    assert_eq!(run_to_string(&run_options(path)).expect("runs"), "-1\n");
}

#[test]
fn runtime_errors_render_a_traceback() {
    let workspace = Workspace::new();
    let mut program = program(vec![class("Main").method(main_method(vec![
        local("String", "s", Some(null())),
        expr(call_at(var("s"), "length", vec![], 3, 9)),
    ]))]);
    program.source = "Main.java".into();
    let path = workspace.write_program("Main.json", &program);
    workspace.write(
        "Main.java",
        "class Main {\n    static void main() {\n        s.length();\n    }\n}\n",
    );

    let error = run_to_string(&run_options(path)).expect_err("null dereference");
    let rendered = error.to_string();
    assert!(rendered.starts_with("Traceback (most recent call last):\n"));
    assert!(rendered.contains("in Main.main()"));
    assert!(rendered.contains("Main.java:3:9: Null dereference"));
    assert!(rendered.ends_with("Null dereference accessing 'length'"));
}

#[test]
fn explicit_source_must_exist() {
    let workspace = Workspace::new();
    let path = workspace.write_program("Main.json", &hello());
    let options = RunOptions {
        source: Some(workspace.root.join("Missing.java")),
        ..run_options(path)
    };
    let error = run_to_string(&options).expect_err("source missing");
    assert!(error.to_string().contains("Failed to read source"));
}

#[test]
fn malformed_programs_are_reported() {
    let workspace = Workspace::new();
    let path = workspace.write("Main.json", "{ \"classes\": 3 }");
    let error = run_to_string(&run_options(path)).expect_err("bad JSON");
    assert!(error.to_string().contains("Failed to parse program"));
}

#[test]
fn check_reports_success() {
    let workspace = Workspace::new();
    let path = workspace.write_program("Main.json", &hello());
    let mut out = Vec::new();
    check(
        &CheckOptions {
            program: path,
            source: None,
            dump: false,
        },
        &mut out,
    )
    .expect("well-typed");
    assert_eq!(String::from_utf8_lossy(&out), "<memory>: ok\n");
}

#[test]
fn check_dump_shows_qualified_names() {
    let workspace = Workspace::new();
    let mut program = program(vec![class("Main").method(main_method(vec![local(
        "List<Integer>",
        "xs",
        Some(new("List<Integer>", vec![])),
    )]))]);
    program.imports.push(import("java.util.*"));
    let path = workspace.write_program("Main.json", &program);

    let mut out = Vec::new();
    check(
        &CheckOptions {
            program: path,
            source: None,
            dump: true,
        },
        &mut out,
    )
    .expect("well-typed");
    let dumped: Program = serde_json::from_slice(&out).expect("dump is a program");
    let json = serde_json::to_string(&dumped).expect("serializes");
    assert!(json.contains("java.util.List"));
    assert!(json.contains("java.lang.Integer"));
}
