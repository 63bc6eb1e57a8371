//! The expression stack and native stack safety.
//!
//! # Expression stack
//!
//! One LIFO of [`Value`]s per genie, shared by every evaluation step. Units
//! push zero or one value; clauses restore the depth captured on entry
//! (plus one for a non-void result). [`ExpressionStack::truncate`] is the
//! baseline-restore primitive used at statement boundaries and by jumps.
//!
//! # Native stack
//!
//! The tree walk recurses once per nesting level of the program.
//! [`ensure_sufficient_stack`] grows the native stack on demand so deeply
//! nested or recursive programs do not overflow it.
//!
//! - **Red zone**: 100KB. If less than this remains, the stack is grown.
//! - **Growth size**: 1MB per extension.

use crate::errors::{expression_stack_overflow, stack_underflow, Fault};
use crate::value::Value;

const RED_ZONE: usize = 100 * 1024;

const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the native stack first if it is nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[derive(Debug)]
pub struct ExpressionStack {
    values: Vec<Value>,
    limit: usize,
}

impl ExpressionStack {
    pub fn new(limit: usize) -> Self {
        ExpressionStack {
            values: Vec::with_capacity(limit.min(1024)),
            limit,
        }
    }

    /// Current depth (the stack pointer).
    #[inline]
    pub fn sp(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn push(&mut self, value: Value) -> Result<(), Fault> {
        if self.values.len() >= self.limit {
            return Err(expression_stack_overflow(self.limit));
        }
        self.values.push(value);
        Ok(())
    }

    #[inline]
    pub fn pop(&mut self) -> Result<Value, Fault> {
        self.values.pop().ok_or_else(stack_underflow)
    }

    /// Pop the top `n` values, in push order.
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<Value>, Fault> {
        if n > self.values.len() {
            return Err(stack_underflow());
        }
        let at = self.values.len() - n;
        Ok(self.values.split_off(at))
    }

    /// Restore the stack pointer to `baseline`, discarding anything above.
    #[inline]
    pub fn truncate(&mut self, baseline: usize) {
        self.values.truncate(baseline);
    }
}
