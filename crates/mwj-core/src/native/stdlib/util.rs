// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `java.util`

use crate::interpreter::{RuntimeError, Value, Variable};
use crate::native::{NativeCall, NativeClass};

/// Host state of a `java.util.List` instance.
type Items = Vec<Variable>;

pub(super) fn classes() -> Vec<NativeClass> {
    vec![
        NativeClass::builder("java.util", "List")
            .generics(&["E"])
            .constructor(&[], list_new)
            .method("add", &[("E", "item")], None, list_add)
            .method("clear", &[], None, list_clear)
            .method("contains", &[("java.lang.Object", "o")], Some("boolean"), list_contains)
            .method("get", &[("int", "index")], Some("E"), list_get)
            .method("size", &[], Some("int"), list_size)
            .method("set", &[("int", "index"), ("E", "value")], Some("E"), list_set)
            .method(
                "subList",
                &[("int", "fromIndex"), ("int", "toIndex")],
                Some("java.util.List<E>"),
                list_sub_list,
            )
            .method("remove", &[("int", "index")], Some("E"), list_remove)
            .method("isEmpty", &[], Some("boolean"), list_is_empty)
            .build(),
    ]
}

/// Checks `index` against `len`, Java style.
fn position(call: &NativeCall<'_>, index: i64, len: usize) -> Result<usize, RuntimeError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| call.fail(format!("Index {index} out of bounds for length {len}")))
}

fn list_new(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    call.init_state(Items::new())?;
    Ok(Value::Null)
}

fn list_add(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    let item = call.arg(0)?.clone();
    call.with_state(|items: &mut Items| items.push(item))?;
    Ok(Value::Null)
}

fn list_clear(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    call.with_state(|items: &mut Items| items.clear())?;
    Ok(Value::Null)
}

fn list_contains(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    let needle = &call.arg(0)?.value;
    let found = call.with_state(|items: &mut Items| items.iter().any(|item| item.value.equals(needle)))?;
    Ok(Value::Bool(found))
}

fn list_get(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    let index = call.int_arg(0)?;
    call.with_state(|items: &mut Items| {
        let at = position(call, index, items.len())?;
        Ok(items[at].value.clone())
    })?
}

fn list_size(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    let len = call.with_state(|items: &mut Items| items.len())?;
    i64::try_from(len)
        .map(Value::Int)
        .map_err(|_| call.fail("list too long"))
}

fn list_set(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    let index = call.int_arg(0)?;
    let value = call.arg(1)?.clone();
    call.with_state(|items: &mut Items| {
        let at = position(call, index, items.len())?;
        Ok(std::mem::replace(&mut items[at], value).value)
    })?
}

fn list_sub_list(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    let from = call.int_arg(0)?;
    let to = call.int_arg(1)?;
    let slice = call.with_state(|items: &mut Items| {
        let bounds = usize::try_from(from).ok().zip(usize::try_from(to).ok());
        match bounds {
            Some((from, to)) if from <= to && to <= items.len() => Ok(items[from..to].to_vec()),
            _ => Err(call.fail(format!(
                "fromIndex: {from}, toIndex: {to}, length: {}",
                items.len()
            ))),
        }
    })??;
    let list = call.allocate(call.class())?;
    *list.native_state().borrow_mut() = Some(Box::new(slice));
    Ok(Value::Object(list))
}

fn list_remove(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    let index = call.int_arg(0)?;
    call.with_state(|items: &mut Items| {
        let at = position(call, index, items.len())?;
        Ok(items.remove(at).value)
    })?
}

fn list_is_empty(call: &NativeCall<'_>) -> Result<Value, RuntimeError> {
    let empty = call.with_state(|items: &mut Items| items.is_empty())?;
    Ok(Value::Bool(empty))
}
