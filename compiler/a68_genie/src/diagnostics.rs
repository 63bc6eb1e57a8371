//! Fault reporting and evaluation bookkeeping.
//!
//! - [`CallStack`]: live routine activations, snapshotted into a
//!   [`FaultTrace`] when a fault is raised
//! - [`Diagnostics`]: the reporter every fault passes through before the
//!   genie returns it or traps
//! - [`GenieCounters`]: optional evaluation counters

use std::sync::Arc;

use a68_ir::{NodeId, Span};

use crate::errors::{Fault, FaultCategory, FaultTrace, TraceFrame};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CallFrame {
    /// Routine text being run.
    pub routine: NodeId,
    pub call_span: Span,
}

#[derive(Clone, Debug, Default)]
pub struct CallStack {
    frames: Vec<CallFrame>,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: CallFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) {
        debug_assert!(!self.frames.is_empty(), "CallStack::pop on empty stack");
        self.frames.pop();
    }

    /// Drop activations until `depth` remain.
    pub fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Snapshot, innermost call first.
    pub fn capture(&self) -> FaultTrace {
        FaultTrace::new(
            self.frames
                .iter()
                .rev()
                .map(|f| TraceFrame {
                    routine: f.routine,
                    call_span: f.call_span,
                })
                .collect(),
        )
    }
}

/// A reported fault, rendered for the driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: FaultCategory,
    pub message: String,
    pub span: Option<Span>,
    /// One-based line and column, when source text is available.
    pub position: Option<(usize, usize)>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// `runtime error at 3:7: subscript 9 out of bounds [1:5]`
    pub fn render(&self) -> String {
        match (self.position, self.span) {
            (Some((line, col)), _) => {
                format!("{} at {line}:{col}: {}", self.category, self.message)
            }
            (None, Some(span)) => format!("{} at {span}: {}", self.category, self.message),
            (None, None) => format!("{}: {}", self.category, self.message),
        }
    }
}

/// Fault reporter. Keeps every diagnostic it emitted.
#[derive(Debug, Default)]
pub struct Diagnostics {
    source: Option<Arc<str>>,
    reported: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new(source: Option<Arc<str>>) -> Self {
        Diagnostics {
            source,
            reported: Vec::new(),
        }
    }

    /// Emit a diagnostic for `fault`.
    pub fn report(&mut self, fault: &Fault) -> &Diagnostic {
        let position = match (&self.source, fault.span) {
            (Some(src), Some(span)) if !span.is_dummy() => Some(span.line_col(src)),
            _ => None,
        };
        let mut notes: Vec<String> = fault.notes.iter().map(|n| n.message.clone()).collect();
        if let Some(trace) = fault.trace.as_ref().filter(|t| !t.is_empty()) {
            notes.push(format!("routine activations:\n{trace}"));
        }
        let diagnostic = Diagnostic {
            category: fault.category(),
            message: fault.kind.to_string(),
            span: fault.span,
            position,
            notes,
        };
        tracing::error!(
            category = %diagnostic.category,
            span = ?diagnostic.span,
            "{}",
            diagnostic.message
        );
        self.reported.push(diagnostic);
        &self.reported[self.reported.len() - 1]
    }

    pub fn reported(&self) -> &[Diagnostic] {
        &self.reported
    }
}

/// Evaluation counters, collected when profiling is enabled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenieCounters {
    pub units_evaluated: u64,
    pub linearizations: u64,
    pub chain_replays: u64,
    pub jumps: u64,
    pub routine_calls: u64,
}

impl GenieCounters {
    pub fn report(&self) -> String {
        format!(
            "Genie profile:\n  \
             Units evaluated: {}\n  \
             Linearizations:  {}\n  \
             Chain replays:   {}\n  \
             Jumps:           {}\n  \
             Routine calls:   {}",
            self.units_evaluated,
            self.linearizations,
            self.chain_replays,
            self.jumps,
            self.routine_calls,
        )
    }
}
