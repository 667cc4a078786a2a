// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `java.io`

use crate::interpreter::{RuntimeError, Value};
use crate::native::{NativeCall, NativeClass};

pub(super) fn classes() -> Vec<NativeClass> {
    vec![
        NativeClass::builder("java.io", "PrintStream")
            .method("print", &[("java.lang.String", "s")], None, print)
            .method("println", &[("java.lang.String", "s")], None, println)
            .method("println", &[], None, newline)
            .build(),
    ]
}

fn print(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    call.write(&call.str_arg(0)?)?;
    Ok(Value::Null)
}

fn println(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    let mut line = call.str_arg(0)?;
    line.push('\n');
    call.write(&line)?;
    Ok(Value::Null)
}

fn newline(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    call.write("\n")?;
    Ok(Value::Null)
}
