//! The genie: a tree-walking evaluator over a validated program tree.
//!
//! # Architecture
//!
//! [`Genie`] owns the run-time state of one program: the expression stack,
//! the frame stack, the per-node annotation table, the routine call stack
//! and the transput sink. The program tree itself is borrowed and never
//! written to.
//!
//! Evaluation is split by concern, one `impl Genie` block per module:
//!
//! - `unit`: dispatch of a single unit, strategy memoization
//! - `serial`: serial and enquiry clauses, linear chains, labels
//! - `jump`: construction of jump signals
//! - `loops`, `case`, `collateral`: the enclosed clauses
//! - `rows`, `formula`, `coercion`, `call`, `transput`: unit kinds
//! - `frame_guard`: RAII frame lifetime
//!
//! # Results
//!
//! Every step returns [`GenieResult`](crate::GenieResult). Jumps travel as
//! `ControlAction::Jump` to the serial clause owning the label; faults
//! unwind to [`Genie::run_program`], are reported, and then either returned
//! ([`EvalMode::Run`]) or turned into a [`Trap`] ([`EvalMode::Monitor`]).

mod call;
mod case;
mod coercion;
mod collateral;
mod formula;
mod frame_guard;
mod jump;
mod loops;
mod names;
mod rows;
mod serial;
mod transput;
mod unit;

use std::sync::Arc;

use a68_ir::{ModeId, ModeOracle, NodeId, NodeKind, Program, ScopeId};

use crate::annotation::Annotations;
use crate::config::{EvalMode, GenieConfig, ModeState};
use crate::diagnostics::{CallStack, Diagnostic, Diagnostics, GenieCounters};
use crate::errors::{dangling_jump, stack_imbalance, ControlAction, Fault, JumpSignal};
use crate::frame::FrameStack;
use crate::print_handler::{stdout_handler, SharedPrintHandler};
use crate::stack::ExpressionStack;
use crate::value::Value;

/// A fault that was trapped in [`EvalMode::Monitor`].
#[derive(Clone, Debug, PartialEq)]
pub struct Trap {
    pub fault: Fault,
}

/// How a run ended without an unrecoverable fault.
#[derive(Clone, Debug, PartialEq)]
pub enum RunOutcome {
    /// The unit completed with this value (`Void` for a void unit).
    Completed(Value),
    /// A fault was trapped; the driver may inspect it and
    /// [`resume_after_trap`](Genie::resume_after_trap).
    Trapped(Trap),
}

impl RunOutcome {
    pub fn value(&self) -> Option<&Value> {
        match self {
            RunOutcome::Completed(v) => Some(v),
            RunOutcome::Trapped(_) => None,
        }
    }

    pub fn is_trapped(&self) -> bool {
        matches!(self, RunOutcome::Trapped(_))
    }
}

/// Evaluator for one program.
pub struct Genie<'a> {
    program: &'a Program,
    oracle: &'a dyn ModeOracle,
    config: GenieConfig,
    mode_state: ModeState,
    stack: ExpressionStack,
    frames: FrameStack,
    annotations: Annotations,
    calls: CallStack,
    diagnostics: Diagnostics,
    print_handler: SharedPrintHandler,
    /// Last character written by transput; decides numeric separation.
    last_char: Option<char>,
}

/// Builder for [`Genie`].
pub struct GenieBuilder<'a> {
    program: &'a Program,
    oracle: Option<&'a dyn ModeOracle>,
    config: GenieConfig,
    print_handler: Option<SharedPrintHandler>,
    source: Option<Arc<str>>,
}

impl<'a> GenieBuilder<'a> {
    pub fn new(program: &'a Program) -> Self {
        GenieBuilder {
            program,
            oracle: None,
            config: GenieConfig::default(),
            print_handler: None,
            source: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: GenieConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: EvalMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Mode equivalence used by conformity clauses. Defaults to the
    /// program's own mode table.
    #[must_use]
    pub fn oracle(mut self, oracle: &'a dyn ModeOracle) -> Self {
        self.oracle = Some(oracle);
        self
    }

    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Source text, used to turn fault spans into line and column.
    #[must_use]
    pub fn source(mut self, source: Arc<str>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn build(self) -> Genie<'a> {
        let program = self.program;
        let environ = program
            .scopes
            .get(ScopeId::STANDARD_ENVIRON)
            .locals
            .iter()
            .map(|&mode| Value::undefined(mode, &program.modes))
            .collect();
        Genie {
            program,
            oracle: self.oracle.unwrap_or(&program.modes),
            mode_state: ModeState::new(&self.config),
            stack: ExpressionStack::new(self.config.expression_stack_limit),
            frames: FrameStack::with_environ(self.config.max_frame_depth, environ),
            annotations: Annotations::new(program.tree.len()),
            calls: CallStack::new(),
            diagnostics: Diagnostics::new(self.source),
            print_handler: self.print_handler.unwrap_or_else(stdout_handler),
            last_char: None,
            config: self.config,
        }
    }
}

impl<'a> Genie<'a> {
    /// Genie with default configuration, printing to stdout.
    pub fn new(program: &'a Program) -> Self {
        GenieBuilder::new(program).build()
    }

    /// Run the whole program from its root.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn run_program(&mut self) -> Result<RunOutcome, Fault> {
        let root = self.program.root;
        self.run_unit(root)
    }

    /// Continue after a trap by running `unit` in the standard environ.
    ///
    /// Every frame except frame 0 is dropped and the expression stack is
    /// emptied first.
    pub fn resume_after_trap(&mut self, unit: NodeId) -> Result<RunOutcome, Fault> {
        tracing::debug!(?unit, "resuming after trap");
        self.frames.truncate(1);
        self.stack.truncate(0);
        self.calls.truncate(0);
        self.run_unit(unit)
    }

    fn run_unit(&mut self, unit: NodeId) -> Result<RunOutcome, Fault> {
        let baseline = self.stack.sp();
        let depth = self.frames.depth();
        let result = self
            .eval_unit(unit)
            .and_then(|()| self.take_result(unit, baseline).map_err(ControlAction::from));
        let action = match result {
            Ok(value) => return Ok(RunOutcome::Completed(value)),
            Err(action) => action,
        };
        self.stack.truncate(baseline);
        self.frames.truncate(depth);
        self.calls.truncate(0);
        let fault = match action {
            ControlAction::Fault(fault) => *fault,
            ControlAction::Jump(signal) => self.escaped_jump(signal),
        };
        self.diagnostics.report(&fault);
        if self.config.mode.traps_faults() {
            Ok(RunOutcome::Trapped(Trap { fault }))
        } else {
            Err(fault)
        }
    }

    /// Pop the value a completed top-level unit left behind.
    fn take_result(&mut self, unit: NodeId, baseline: usize) -> Result<Value, Fault> {
        let value = if self.program.tree.mode(unit) == ModeId::VOID {
            Value::Void
        } else {
            self.stack.pop()?
        };
        if self.stack.sp() != baseline {
            return Err(stack_imbalance(baseline, self.stack.sp()));
        }
        Ok(value)
    }

    fn escaped_jump(&self, signal: JumpSignal) -> Fault {
        dangling_jump(self.label_name(signal.target))
    }

    /// Name of the label attached to a labelled unit.
    fn label_name(&self, target: NodeId) -> &'a str {
        let program = self.program;
        if !target.is_valid() {
            return "?";
        }
        match program.tree.kind(target) {
            NodeKind::Labeled { label, .. } => {
                program.interner.lookup(program.labels.get(label).name)
            }
            _ => "?",
        }
    }

    pub fn program(&self) -> &'a Program {
        self.program
    }

    pub fn config(&self) -> &GenieConfig {
        &self.config
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    pub fn counters(&self) -> Option<&GenieCounters> {
        self.mode_state.counters()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.reported()
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    /// Current expression stack depth.
    pub fn stack_depth(&self) -> usize {
        self.stack.sp()
    }

    /// Number of live frames, the standard environ included.
    pub fn frame_depth(&self) -> usize {
        self.frames.depth()
    }

    /// Push the undefined value of `mode`, or nothing for VOID.
    fn push_undefined(&mut self, mode: ModeId) -> Result<(), Fault> {
        if mode == ModeId::VOID {
            return Ok(());
        }
        let value = Value::undefined(mode, &self.program.modes);
        self.stack.push(value)
    }

    /// A clause of `mode` entered at `baseline` must leave exactly its
    /// result above it.
    fn check_yield(&self, mode: ModeId, baseline: usize) -> Result<(), Fault> {
        let expected = baseline + usize::from(mode != ModeId::VOID);
        if self.stack.sp() == expected {
            Ok(())
        } else {
            Err(stack_imbalance(expected, self.stack.sp()))
        }
    }
}

impl std::fmt::Debug for Genie<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Genie")
            .field("mode", &self.config.mode)
            .field("stack_depth", &self.stack.sp())
            .field("frame_depth", &self.frames.depth())
            .field("call_depth", &self.calls.depth())
            .finish_non_exhaustive()
    }
}
