//! Routine calls.
//!
//! A routine value is a routine text plus a handle on its environ: the frame
//! of the youngest range holding one of its non-local names, found through
//! the static links when the text is elaborated. Calling it opens a frame
//! statically linked to that frame, binds the arguments to the first slots,
//! and evaluates the body. A handle whose frame has been popped is a scope
//! violation.

use a68_ir::{NodeId, NodeKind, NodeRange};

use super::Genie;
use crate::diagnostics::CallFrame;
use crate::errors::{
    nil_access, scope_violation, undefined_value, unknown_node_kind, value_mismatch, GenieResult,
};
use crate::value::{describe_mode, FrameHandle, ProcValue, Value};

impl Genie<'_> {
    pub(crate) fn eval_call(
        &mut self,
        node: NodeId,
        primary: NodeId,
        args: NodeRange,
    ) -> GenieResult {
        let program = self.program;
        self.eval_unit(primary)?;
        let callee = self.stack.pop()?;
        for &arg in program.tree.list(args) {
            self.eval_unit(arg)?;
        }
        let values = self.stack.pop_n(args.len())?;
        self.call_value(callee, values, node)
    }

    /// Call a procedure value, leaving its result (if any) on the stack.
    pub(crate) fn call_value(
        &mut self,
        callee: Value,
        args: Vec<Value>,
        site: NodeId,
    ) -> GenieResult {
        match callee {
            Value::Proc(ProcValue::Standard(proc)) => self.call_standard(proc, &args),
            Value::Proc(ProcValue::Routine { text, env }) => {
                self.call_routine(text, env, args, site)
            }
            Value::Nil => Err(nil_access().into()),
            Value::Undefined(mode) => {
                Err(undefined_value(describe_mode(&self.program.modes, mode)).into())
            }
            other => Err(value_mismatch("PROC", &other).into()),
        }
    }

    #[tracing::instrument(level = "trace", skip(self, args))]
    fn call_routine(
        &mut self,
        text: NodeId,
        env: FrameHandle,
        args: Vec<Value>,
        site: NodeId,
    ) -> GenieResult {
        if !self.frames.is_live(env) {
            return Err(scope_violation().into());
        }
        let program = self.program;
        let NodeKind::RoutineText {
            scope,
            params,
            body,
        } = program.tree.kind(text)
        else {
            return Err(unknown_node_kind(program.tree.kind(text).name()).into());
        };
        debug_assert_eq!(usize::from(params), args.len());
        self.mode_state.count_call();
        self.calls.push(CallFrame {
            routine: text,
            call_span: program.tree.span(site),
        });
        let result = self.with_linked_frame(scope, env.index, |g| {
            let frame = g.frames.top_mut()?;
            for (local, arg) in frame.locals.iter_mut().zip(args) {
                *local = arg;
            }
            g.eval_unit(body)
        });
        self.calls.pop();
        result
    }
}
