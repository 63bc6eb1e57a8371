//! A68 Genie - tree-walking execution core for Algol 68.
//!
//! The genie runs a mode-checked, scope-resolved [`Program`](a68_ir::Program)
//! directly from its tree. It never rewrites the tree; what it learns on a
//! node's first visit (linear chains of serial clauses, dispatch
//! strategies) is cached in a side table of [`Annotations`].
//!
//! # Architecture
//!
//! - [`Genie`]: owns the run-time state of one program
//! - `frame`: activation records linked by static chains
//! - `stack`: the expression stack every unit pushes its value onto
//! - [`errors`]: faults plus the jump signal, both carried by `ControlAction`
//! - [`Diagnostics`](diagnostics::Diagnostics): fault reporting and counters
//! - print handlers: where `print` output goes
//!
//! # Usage
//!
//! ```text
//! let program = builder.finish(root);
//! let mut genie = GenieBuilder::new(&program).mode(EvalMode::Monitor).build();
//! match genie.run_program()? {
//!     RunOutcome::Completed(value) => ...,
//!     RunOutcome::Trapped(trap) => ...,
//! }
//! ```

mod annotation;
mod config;
mod diagnostics;
pub mod errors;
mod frame;
mod genie;
mod print_handler;
mod stack;
pub mod value;

use std::sync::Once;

pub use annotation::{Annotations, ChainStep, GenieFlags, Strategy, StrategyKind};
pub use config::{ConformityPolicy, EvalMode, GenieConfig};
pub use diagnostics::{Diagnostic, GenieCounters};
pub use errors::{ControlAction, Fault, FaultCategory, FaultKind, FaultNote, GenieResult};
pub use genie::{Genie, GenieBuilder, RunOutcome, Trap};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, BufferPrintHandler, PrintHandlerImpl,
    SharedPrintHandler,
};
pub use value::{Bounds, ProcValue, RefValue, RowValue, Value};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=a68_genie=debug`
/// (jumps, linearization) or `RUST_LOG=a68_genie=trace` (every unit).
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
