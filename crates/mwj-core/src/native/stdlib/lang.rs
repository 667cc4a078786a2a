// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `java.lang`

use crate::interpreter::{RuntimeError, Value, format_float};
use crate::native::{NativeCall, NativeClass};
use crate::types::Ty;

pub(super) fn classes() -> Vec<NativeClass> {
    vec![
        NativeClass::builder("java.lang", "Object").build(),
        NativeClass::builder("java.lang", "String")
            .method("length", &[], Some("int"), string_length)
            .method("equals", &[("java.lang.Object", "other")], Some("boolean"), string_equals)
            .build(),
        NativeClass::builder("java.lang", "Integer")
            .static_method("toString", &[("int", "i")], Some("java.lang.String"), integer_to_string)
            .static_method("parseInt", &[("java.lang.String", "s")], Some("int"), integer_parse)
            .build(),
        NativeClass::builder("java.lang", "Float")
            .static_method("toString", &[("float", "f")], Some("java.lang.String"), float_to_string)
            .static_method("parseFloat", &[("java.lang.String", "s")], Some("float"), float_parse)
            .build(),
        NativeClass::builder("java.lang", "Boolean")
            .static_method("toString", &[("boolean", "b")], Some("java.lang.String"), boolean_to_string)
            .build(),
        NativeClass::builder("java.lang", "System")
            .static_field("out", "java.io.PrintStream", system_out)
            .build(),
    ]
}

fn string_length(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    let length = call.this_str()?.chars().count();
    i64::try_from(length)
        .map(Value::Int)
        .map_err(|_| call.fail("string too long"))
}

fn string_equals(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    let this = call.this_str()?;
    Ok(Value::Bool(
        matches!(&call.arg(0)?.value, Value::Str(other) if other == this),
    ))
}

fn integer_to_string(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    Ok(Value::Str(call.int_arg(0)?.to_string().into()))
}

fn integer_parse(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    let text = call.str_arg(0)?;
    text.trim()
        .parse()
        .map(Value::Int)
        .map_err(|_| call.fail(format!("For input string: \"{text}\"")))
}

fn float_to_string(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    Ok(Value::Str(format_float(call.float_arg(0)?).into()))
}

fn float_parse(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    let text = call.str_arg(0)?;
    text.trim()
        .parse()
        .map(Value::Float)
        .map_err(|_| call.fail(format!("For input string: \"{text}\"")))
}

fn boolean_to_string(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    Ok(Value::Str(call.bool_arg(0)?.to_string().into()))
}

fn system_out(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    let class = call.class_of(&Ty::named("java.io.PrintStream"))?;
    Ok(Value::Object(call.construct(&class, Vec::new())?))
}
