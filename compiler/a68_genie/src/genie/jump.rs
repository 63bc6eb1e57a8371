//! Label jumps.
//!
//! A jump never completes normally. It locates the activation of the range
//! that declares the label by following static links from the innermost
//! frame, reads the re-entry point the owning serial clause left there, and
//! returns a [`JumpSignal`] that unwinds through every frame guard, loop and
//! routine call in between until the owner catches it.

use a68_ir::LabelId;

use super::Genie;
use crate::errors::{dangling_jump, ControlAction, JumpSignal};

impl Genie<'_> {
    pub(crate) fn jump(&self, label: LabelId) -> ControlAction {
        let program = self.program;
        let target = program.labels.get(label);
        let name = program.interner.lookup(target.name);
        let resumption = self
            .frames
            .find_scope(target.scope)
            .and_then(|index| self.frames.get(index))
            .and_then(|frame| {
                frame
                    .resumption
                    .filter(|r| r.owner == target.owner)
                    .map(|r| (frame.serial, r.baseline))
            });
        let Some((frame, baseline)) = resumption else {
            return dangling_jump(name).into();
        };
        tracing::debug!(label = name, target = ?target.target, frame, "jump");
        ControlAction::Jump(JumpSignal {
            owner: target.owner,
            target: target.target,
            frame,
            baseline,
        })
    }
}
