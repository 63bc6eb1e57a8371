//! Serial and enquiry clauses.
//!
//! # Label-free clauses
//!
//! On the first visit the clause's items are flattened into a linear chain:
//! groups, nested serial clauses and declaration lists are inlined, `;` separators become
//! [`ChainStep::Boundary`] markers, punctuation is dropped and an `EXIT`
//! ends the chain. The chain is cached in the annotation table and every
//! later visit replays it without looking at the tree structure again.
//!
//! # Labelled clauses
//!
//! A clause whose range declares labels is walked from the tree on every
//! visit. Before the walk the clause records a [`Resumption`] on its frame
//! so that `jump` can find the clause's entry baseline. A jump signal
//! owned by this clause and this activation is caught here: the expression
//! stack is cut back to the baseline and the walk restarts, skipping items
//! until the labelled target is reached.
//!
//! # Serial vs enquiry
//!
//! Both run the same way. A void serial clause discards whatever its last
//! unit left; an enquiry always keeps the final value, which its
//! conditional, case or loop consumes.

use std::rc::Rc;

use a68_ir::{ModeId, NodeId, NodeKind, NodeRange, Tree};

use super::Genie;
use crate::annotation::{ChainStep, GenieFlags};
use crate::errors::{dangling_jump, unknown_node_kind, ControlAction, GenieResult};
use crate::frame::Resumption;

/// Flatten `items` into `out`. Returns `false` once an `EXIT` is reached.
pub(super) fn flatten(tree: &Tree, items: NodeRange, out: &mut Vec<ChainStep>) -> bool {
    for &item in tree.list(items) {
        match tree.kind(item) {
            NodeKind::Group { items }
            | NodeKind::DeclarationList { items }
            | NodeKind::SerialClause { items, .. } => {
                if !flatten(tree, items, out) {
                    return false;
                }
            }
            NodeKind::Separator => out.push(ChainStep::Boundary),
            NodeKind::Punct => {}
            NodeKind::Exit => return false,
            NodeKind::Labeled { unit, .. } => out.push(ChainStep::Unit(unit)),
            _ => out.push(ChainStep::Unit(item)),
        }
    }
    true
}

impl Genie<'_> {
    /// Run a serial clause in the innermost frame.
    pub(crate) fn execute_serial(&mut self, serial: NodeId) -> GenieResult {
        self.execute(serial, false)
    }

    /// Run an enquiry clause, keeping its final value.
    pub(crate) fn execute_enquiry(&mut self, enquiry: NodeId) -> GenieResult {
        self.execute(enquiry, true)
    }

    fn execute(&mut self, serial: NodeId, keep_final: bool) -> GenieResult {
        let program = self.program;
        let NodeKind::SerialClause { scope, items } = program.tree.kind(serial) else {
            return self.eval_unit(serial);
        };
        let baseline = self.stack.sp();
        if program.scopes.get(scope).has_labels {
            self.execute_labelled(serial, items, baseline)?;
        } else {
            let chain = self.linear_chain(serial, items);
            self.replay(&chain, baseline)?;
        }
        if !keep_final && program.tree.mode(serial) == ModeId::VOID {
            self.stack.truncate(baseline);
        }
        Ok(())
    }

    /// Cached chain of a label-free clause, linearizing on first use.
    fn linear_chain(&mut self, serial: NodeId, items: NodeRange) -> Rc<[ChainStep]> {
        if let Some(chain) = self.annotations.chain(serial) {
            self.mode_state.count_chain_replay();
            return chain;
        }
        self.annotations.begin_linearizing(serial);
        let mut steps = Vec::new();
        flatten(&self.program.tree, items, &mut steps);
        self.mode_state.count_linearization();
        tracing::debug!(?serial, steps = steps.len(), "linearized serial clause");
        self.annotations
            .finish_linearizing(serial, steps.into(), GenieFlags::LABEL_FREE)
    }

    fn replay(&mut self, chain: &[ChainStep], baseline: usize) -> GenieResult {
        for &step in chain {
            match step {
                ChainStep::Unit(unit) => self.eval_unit(unit)?,
                ChainStep::Boundary => self.stack.truncate(baseline),
            }
        }
        Ok(())
    }

    fn execute_labelled(
        &mut self,
        serial: NodeId,
        items: NodeRange,
        baseline: usize,
    ) -> GenieResult {
        let frame_index = self.frames.top_index()?;
        let frame_serial = {
            let frame = self.frames.top_mut()?;
            frame.resumption = Some(Resumption {
                owner: serial,
                baseline,
            });
            frame.serial
        };
        let mut pending: Option<NodeId> = None;
        loop {
            match self.walk(items, &mut pending, baseline) {
                Ok(_) if pending.is_some() => {
                    let target = pending.unwrap_or(NodeId::INVALID);
                    return Err(dangling_jump(self.label_name(target)).into());
                }
                Ok(_) => break,
                Err(ControlAction::Jump(signal))
                    if signal.owner == serial && signal.frame == frame_serial =>
                {
                    tracing::debug!(?serial, target = ?signal.target, "resuming at label");
                    self.mode_state.count_jump();
                    self.frames.truncate(frame_index + 1);
                    self.stack.truncate(signal.baseline);
                    pending = Some(signal.target);
                }
                Err(other) => return Err(other),
            }
        }
        if let Some(frame) = self.frames.get_mut(frame_index) {
            frame.resumption = None;
        }
        Ok(())
    }

    /// Walk `items` from the tree. While `pending` names a target, items are
    /// skipped until that labelled unit is reached. Returns `Ok(false)` when
    /// an `EXIT` completed the clause.
    fn walk(
        &mut self,
        items: NodeRange,
        pending: &mut Option<NodeId>,
        baseline: usize,
    ) -> GenieResult<bool> {
        let program = self.program;
        let tree = &program.tree;
        for &item in tree.list(items) {
            match tree.kind(item) {
                NodeKind::Group { items }
                | NodeKind::DeclarationList { items }
                | NodeKind::SerialClause { items, .. } => {
                    if !self.walk(items, pending, baseline)? {
                        return Ok(false);
                    }
                }
                NodeKind::Separator => {
                    if pending.is_none() {
                        self.stack.truncate(baseline);
                    }
                }
                NodeKind::Punct => {}
                NodeKind::Exit => {
                    if pending.is_none() {
                        return Ok(false);
                    }
                }
                NodeKind::Labeled { unit, .. } => {
                    if *pending == Some(item) {
                        *pending = None;
                    }
                    if pending.is_none() {
                        self.eval_unit(unit)?;
                    }
                }
                _ => {
                    if pending.is_none() {
                        self.eval_unit(item)?;
                    }
                }
            }
        }
        Ok(true)
    }

    pub(crate) fn eval_closed(&mut self, node: NodeId) -> GenieResult {
        let NodeKind::Closed { scope, serial } = self.program.tree.kind(node) else {
            return Err(unknown_node_kind("closed clause").into());
        };
        self.with_frame(scope, |g| g.execute_serial(serial))
    }

    pub(crate) fn eval_conditional(&mut self, node: NodeId) -> GenieResult {
        let program = self.program;
        let NodeKind::Conditional {
            scope,
            enquiry,
            then_part,
            else_part,
        } = program.tree.kind(node)
        else {
            return Err(unknown_node_kind("conditional clause").into());
        };
        let mode = program.tree.mode(node);
        self.with_frame(scope, |g| {
            g.execute_enquiry(enquiry)?;
            if g.stack.pop()?.as_bool()? {
                g.eval_unit(then_part)
            } else if else_part.is_valid() {
                g.eval_unit(else_part)
            } else {
                Ok(g.push_undefined(mode)?)
            }
        })
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
