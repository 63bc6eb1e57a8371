//! Loop clauses.
//!
//! `FOR i FROM f BY b TO t WHILE w DO body UNTIL u OD`, every part
//! optional. `FROM`, `BY` and `TO` are evaluated once, before the first
//! iteration, in the enclosing frame. The loop opens one frame for the
//! counter and, nested in it, one frame shared by the `WHILE`, `DO` and
//! `UNTIL` parts whose locals are re-initialized for every iteration.
//!
//! Per iteration: bound test, `WHILE`, body, `UNTIL`, increment.

use a68_ir::{LoopParts, NodeId, NodeKind};

use super::frame_guard::ScopedGenie;
use super::Genie;
use crate::errors::{integer_overflow, unknown_node_kind, GenieResult};
use crate::value::Value;

/// Counter state fixed at loop entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Counting {
    by: i64,
    to: i64,
    /// Whether the counter is stepped at all.
    increments: bool,
}

impl Counting {
    /// Whether `counter` is still inside the loop's bounds.
    #[inline]
    fn admits(self, counter: i64) -> bool {
        match self.by.signum() {
            1 => counter <= self.to,
            -1 => counter >= self.to,
            _ => true,
        }
    }
}

impl Genie<'_> {
    pub(crate) fn eval_loop(&mut self, node: NodeId) -> GenieResult {
        let program = self.program;
        let NodeKind::Loop(id) = program.tree.kind(node) else {
            return Err(unknown_node_kind("loop clause").into());
        };
        let parts = *program.tree.loop_parts(id);
        let from = self.optional_int(parts.from, 1)?;
        let by = self.optional_int(parts.by, 1)?;
        let default_to = if by >= 0 { i64::MAX } else { i64::MIN };
        let to = self.optional_int(parts.to, default_to)?;
        let counting = Counting {
            by,
            to,
            increments: parts.increments(),
        };
        tracing::trace!(from, by, to, "loop entry");
        self.with_frame(parts.scope, |outer| {
            outer.with_frame(parts.body_scope, |body| {
                body.iterate(&parts, counting, from)
            })
        })
    }

    /// Evaluate `unit` to an INT, or yield `default` when it is absent.
    pub(super) fn optional_int(&mut self, unit: NodeId, default: i64) -> GenieResult<i64> {
        if !unit.is_valid() {
            return Ok(default);
        }
        self.eval_unit(unit)?;
        Ok(self.stack.pop()?.as_int()?)
    }

    /// Evaluate an enquiry that yields BOOL.
    fn enquire(&mut self, enquiry: NodeId) -> GenieResult<bool> {
        self.execute_enquiry(enquiry)?;
        Ok(self.stack.pop()?.as_bool()?)
    }
}

impl ScopedGenie<'_, '_> {
    fn iterate(&mut self, parts: &LoopParts, counting: Counting, from: i64) -> GenieResult {
        let body_frame = self.frames.top_index()?;
        let mut counter = from;
        let mut first = true;
        while counting.admits(counter) {
            if let Some(slot) = parts.counter {
                self.frames.store(slot, Value::Int(counter))?;
            }
            if !first {
                self.reset_locals(body_frame);
            }
            first = false;
            if parts.while_part.is_valid() && !self.enquire(parts.while_part)? {
                break;
            }
            self.execute_serial(parts.do_part)?;
            if parts.until_part.is_valid() && self.enquire(parts.until_part)? {
                break;
            }
            if counting.increments {
                counter = counter
                    .checked_add(counting.by)
                    .ok_or_else(|| integer_overflow("loop counter"))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Counting;

    #[test]
    fn bound_test_follows_step_sign() {
        let up = Counting {
            by: 2,
            to: 5,
            increments: true,
        };
        assert!(up.admits(5));
        assert!(!up.admits(7));

        let down = Counting {
            by: -1,
            to: 0,
            increments: true,
        };
        assert!(down.admits(0));
        assert!(!down.admits(-1));

        let still = Counting {
            by: 0,
            to: 0,
            increments: true,
        };
        assert!(still.admits(i64::MAX));
    }
}
