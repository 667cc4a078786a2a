// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Source location tracking.
//!
//! **DDD Context:** Shared kernel
//!
//! The external parser stamps every AST node with a line/column [`Span`]. Errors
//! from both passes carry a [`SourceLocation`] (source name plus span) so the
//! driver can render an excerpt without the core knowing about files.

mod span;

pub use span::{SourceLocation, Span};
