// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Shared test helpers for unit tests across mwj-core.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crate::ast::ClassDecl;
use crate::ast::build::program;
use crate::native::NativeRegistry;
use crate::types::{ClassTable, TypeError};

/// Builds a class table for `classes` alongside the standard library.
pub fn table_for(classes: Vec<ClassDecl>) -> Result<ClassTable, TypeError> {
    ClassTable::build(&program(classes), Rc::new(NativeRegistry::standard()))
}

/// An output sink whose contents can be read back after the run.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
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
