//! Faults and control signals.
//!
//! Every evaluation step returns [`GenieResult`]. The error side is a
//! [`ControlAction`]: either a label jump travelling to its owning serial
//! clause, or a [`Fault`] unwinding out of the genie. `?` propagates both.
//!
//! # Categories
//!
//! - [`FaultCategory::Internal`]: the tree or the genie's own bookkeeping is
//!   inconsistent (unknown node kind, missing frame, stack imbalance). The
//!   tree is assumed validated, so these never occur for well-formed input.
//! - [`FaultCategory::Runtime`]: the program did something its semantics
//!   forbid (failed assertion, overflow, subscript out of bounds).
//!
//! Factory functions (`integer_overflow()`, `assertion_failed()`, ...) are
//! the construction API.

use std::fmt;

use a68_ir::{NodeId, Span};

use crate::value::Value;

/// Result of one evaluation step.
pub type GenieResult<T = ()> = Result<T, ControlAction>;

/// Broad classification used by the driver and diagnostics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FaultCategory {
    Internal,
    Runtime,
}

impl fmt::Display for FaultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultCategory::Internal => f.write_str("internal error"),
            FaultCategory::Runtime => f.write_str("runtime error"),
        }
    }
}

/// What went wrong.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FaultKind {
    // Internal consistency
    #[error("{kind} cannot be evaluated as a unit")]
    UnknownNodeKind { kind: &'static str },
    #[error("no active frame at lexical level {level}")]
    MissingFrame { level: u16 },
    #[error("expression stack holds {actual} values, expected {expected}")]
    StackImbalance { expected: usize, actual: usize },
    #[error("expression stack underflow")]
    StackUnderflow,
    #[error("jump to label `{label}` found no active owner")]
    DanglingJump { label: String },
    #[error("expected {expected}, found {found}")]
    ValueMismatch {
        expected: &'static str,
        found: &'static str,
    },

    // Runtime
    #[error("assertion failed")]
    AssertionFailed,
    #[error("integer overflow in {operation}")]
    IntegerOverflow { operation: &'static str },
    #[error("division by zero")]
    DivisionByZero,
    #[error("INT raised to negative power {exponent}")]
    NegativeExponent { exponent: i64 },
    #[error("subscript {index} out of bounds [{lower}:{upper}]")]
    IndexOutOfBounds { index: i64, lower: i64, upper: i64 },
    #[error("row has {expected} dimensions, {got} indexers given")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("rows in a display have different bounds")]
    RaggedDisplay,
    #[error("value of mode {mode} is undefined")]
    UndefinedValue { mode: String },
    #[error("accessing a field or element through NIL")]
    NilAccess,
    #[error("routine called after its environ has been left")]
    ScopeViolation,
    #[error("no alternative of the conformity clause accepts the selector")]
    UnmatchedConformity,
    #[error("expression stack limit of {limit} values exceeded")]
    ExpressionStackOverflow { limit: usize },
    #[error("frame depth limit of {limit} exceeded")]
    FrameDepthExceeded { limit: usize },
    #[error("object exceeds the size limit of {limit} elements")]
    ObjectTooLarge { limit: usize },
}

impl FaultKind {
    pub fn category(&self) -> FaultCategory {
        match self {
            FaultKind::UnknownNodeKind { .. }
            | FaultKind::MissingFrame { .. }
            | FaultKind::StackImbalance { .. }
            | FaultKind::StackUnderflow
            | FaultKind::DanglingJump { .. }
            | FaultKind::ValueMismatch { .. } => FaultCategory::Internal,
            _ => FaultCategory::Runtime,
        }
    }
}

/// Secondary information attached to a fault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaultNote {
    pub message: String,
    pub span: Option<Span>,
}

impl FaultNote {
    pub fn new(message: impl Into<String>) -> Self {
        FaultNote {
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(message: impl Into<String>, span: Span) -> Self {
        FaultNote {
            message: message.into(),
            span: Some(span),
        }
    }
}

/// One routine activation in a fault trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceFrame {
    pub routine: NodeId,
    pub call_span: Span,
}

/// Routine activations live at the fault site, innermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FaultTrace {
    frames: Vec<TraceFrame>,
}

impl FaultTrace {
    pub fn new(frames: Vec<TraceFrame>) -> Self {
        FaultTrace { frames }
    }

    pub fn frames(&self) -> &[TraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Display for FaultTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, frame) in self.frames.iter().enumerate() {
            writeln!(
                f,
                "  {i}: routine {:?} called at {}",
                frame.routine, frame.call_span
            )?;
        }
        Ok(())
    }
}

/// A fault, with the position of the innermost unit that raised it.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct Fault {
    pub kind: FaultKind,
    pub span: Option<Span>,
    pub trace: Option<FaultTrace>,
    pub notes: Vec<FaultNote>,
}

impl Fault {
    pub fn new(kind: FaultKind) -> Self {
        Fault {
            kind,
            span: None,
            trace: None,
            notes: Vec::new(),
        }
    }

    #[inline]
    pub fn category(&self) -> FaultCategory {
        self.kind.category()
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    #[must_use]
    pub fn with_trace(mut self, trace: FaultTrace) -> Self {
        self.trace = Some(trace);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: FaultNote) -> Self {
        self.notes.push(note);
        self
    }
}

/// A label jump on its way to the serial clause that owns the label.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct JumpSignal {
    /// Serial clause owning the label.
    pub owner: NodeId,
    /// Labelled unit to resume at.
    pub target: NodeId,
    /// Activation serial of the frame the owner runs in.
    pub frame: u64,
    /// Expression stack depth at the owner's entry.
    pub baseline: usize,
}

/// Non-local exit from an evaluation step.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlAction {
    Jump(JumpSignal),
    Fault(Box<Fault>),
}

impl ControlAction {
    pub fn as_fault(&self) -> Option<&Fault> {
        match self {
            ControlAction::Fault(f) => Some(f),
            ControlAction::Jump(_) => None,
        }
    }
}

impl From<Fault> for ControlAction {
    #[inline]
    fn from(fault: Fault) -> Self {
        ControlAction::Fault(Box::new(fault))
    }
}

impl From<FaultKind> for ControlAction {
    #[inline]
    fn from(kind: FaultKind) -> Self {
        ControlAction::Fault(Box::new(Fault::new(kind)))
    }
}

// Internal consistency

#[cold]
pub fn unknown_node_kind(kind: &'static str) -> Fault {
    Fault::new(FaultKind::UnknownNodeKind { kind })
}

#[cold]
pub fn missing_frame(level: u16) -> Fault {
    Fault::new(FaultKind::MissingFrame { level })
}

#[cold]
pub fn stack_imbalance(expected: usize, actual: usize) -> Fault {
    Fault::new(FaultKind::StackImbalance { expected, actual })
}

#[cold]
pub fn stack_underflow() -> Fault {
    Fault::new(FaultKind::StackUnderflow)
}

#[cold]
pub fn dangling_jump(label: &str) -> Fault {
    Fault::new(FaultKind::DanglingJump {
        label: label.to_string(),
    })
}

/// A value of the wrong shape reached an operation the mode checker vetted.
#[cold]
pub fn value_mismatch(expected: &'static str, found: &Value) -> Fault {
    Fault::new(FaultKind::ValueMismatch {
        expected,
        found: found.shape_name(),
    })
}

// Runtime

#[cold]
pub fn assertion_failed() -> Fault {
    Fault::new(FaultKind::AssertionFailed)
}

#[cold]
pub fn integer_overflow(operation: &'static str) -> Fault {
    Fault::new(FaultKind::IntegerOverflow { operation })
}

#[cold]
pub fn division_by_zero() -> Fault {
    Fault::new(FaultKind::DivisionByZero)
}

#[cold]
pub fn negative_exponent(exponent: i64) -> Fault {
    Fault::new(FaultKind::NegativeExponent { exponent })
}

#[cold]
pub fn index_out_of_bounds(index: i64, lower: i64, upper: i64) -> Fault {
    Fault::new(FaultKind::IndexOutOfBounds {
        index,
        lower,
        upper,
    })
}

#[cold]
pub fn dimension_mismatch(expected: usize, got: usize) -> Fault {
    Fault::new(FaultKind::DimensionMismatch { expected, got })
}

#[cold]
pub fn ragged_display() -> Fault {
    Fault::new(FaultKind::RaggedDisplay)
}

#[cold]
pub fn undefined_value(mode: impl Into<String>) -> Fault {
    Fault::new(FaultKind::UndefinedValue { mode: mode.into() })
}

#[cold]
pub fn nil_access() -> Fault {
    Fault::new(FaultKind::NilAccess)
}

#[cold]
pub fn scope_violation() -> Fault {
    Fault::new(FaultKind::ScopeViolation)
}

#[cold]
pub fn unmatched_conformity() -> Fault {
    Fault::new(FaultKind::UnmatchedConformity)
}

#[cold]
pub fn expression_stack_overflow(limit: usize) -> Fault {
    Fault::new(FaultKind::ExpressionStackOverflow { limit })
}

#[cold]
pub fn frame_depth_exceeded(limit: usize) -> Fault {
    Fault::new(FaultKind::FrameDepthExceeded { limit })
}

#[cold]
pub fn object_too_large(limit: usize) -> Fault {
    Fault::new(FaultKind::ObjectTooLarge { limit })
}

#[cfg(test)]
mod tests;
