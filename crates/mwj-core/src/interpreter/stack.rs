// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The call stack and the observer hook that watches it.

use ecow::EcoString;

use crate::ast::Statement;
use crate::source_analysis::SourceLocation;

/// One entry of the call stack: what is running and where it was called from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// E.g. `Main.main()` or `new Box<int>(int)`.
    pub description: EcoString,
    pub location: SourceLocation,
}

impl Frame {
    #[must_use]
    pub fn new(description: impl Into<EcoString>, location: SourceLocation) -> Self {
        Self {
            description: description.into(),
            location,
        }
    }
}

/// The engine's call stack. Only used to report where an error happened.
#[derive(Debug, Default)]
pub struct Stack {
    frames: Vec<Frame>,
}

impl Stack {
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

/// Callbacks fired while a program runs, e.g. for a stepping debugger.
///
/// Observers see execution but cannot change it. Every method has an empty
/// default so implementors pick what they need.
pub trait ExecutionObserver {
    /// Called before each statement executes. `depth` is the number of
    /// frames on the stack.
    fn on_statement(&self, _statement: &Statement, _depth: usize) {}

    /// Called after a frame is pushed.
    fn on_enter(&self, _frame: &Frame) {}

    /// Called after a frame is popped, on every exit path.
    fn on_exit(&self, _frame: &Frame) {}
}
