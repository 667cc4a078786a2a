// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The bundled standard library: a small part of `java.lang`, `java.io`
//! and `java.util`.

mod io;
mod lang;
mod util;

use super::NativeRegistry;

/// Registers every standard library class.
pub fn register(registry: &mut NativeRegistry) {
    for class in lang::classes().into_iter().chain(io::classes()).chain(util::classes()) {
        registry.register(class);
    }
}
