//! Activation frames with static links.
//!
//! Every range the genie enters gets a [`Frame`] on a strictly LIFO
//! [`FrameStack`]. Locals are addressed by [`Slot`]s computed by the parser:
//! the slot's lexical level selects the frame, found by following static
//! links from the innermost frame, and its offset indexes that frame's
//! locals. Frame 0 is the standard environ and lives as long as the genie.

use a68_ir::{NodeId, ScopeId, Slot};

use crate::errors::{frame_depth_exceeded, missing_frame, value_mismatch, Fault};
use crate::value::{FrameHandle, Value};

/// Re-entry point of a labelled serial clause running in a frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Resumption {
    pub owner: NodeId,
    pub baseline: usize,
}

#[derive(Debug)]
pub struct Frame {
    pub scope: ScopeId,
    pub level: u16,
    /// Frame of the lexically enclosing range; `None` only for frame 0.
    pub static_link: Option<usize>,
    /// Unique activation identity.
    pub serial: u64,
    pub locals: Vec<Value>,
    pub resumption: Option<Resumption>,
}

#[derive(Debug)]
pub struct FrameStack {
    frames: Vec<Frame>,
    next_serial: u64,
    max_depth: Option<usize>,
}

impl FrameStack {
    pub fn new(max_depth: Option<usize>) -> Self {
        FrameStack {
            frames: Vec::with_capacity(64),
            next_serial: 0,
            max_depth,
        }
    }

    /// A stack holding only the standard environ (frame 0).
    pub fn with_environ(max_depth: Option<usize>, locals: Vec<Value>) -> Self {
        let mut stack = FrameStack::new(max_depth);
        stack.frames.push(Frame {
            scope: ScopeId::STANDARD_ENVIRON,
            level: 0,
            static_link: None,
            serial: 0,
            locals,
            resumption: None,
        });
        stack.next_serial = 1;
        stack
    }

    /// Push a frame and return its index.
    pub fn open(
        &mut self,
        scope: ScopeId,
        level: u16,
        static_link: Option<usize>,
        locals: Vec<Value>,
    ) -> Result<usize, Fault> {
        if let Some(max) = self.max_depth {
            if self.frames.len() >= max {
                return Err(frame_depth_exceeded(max));
            }
        }
        let serial = self.next_serial;
        self.next_serial += 1;
        self.frames.push(Frame {
            scope,
            level,
            static_link,
            serial,
            locals,
            resumption: None,
        });
        tracing::trace!(?scope, level, serial, "open frame");
        Ok(self.frames.len() - 1)
    }

    /// Pop frames until exactly `depth` remain.
    pub fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Index of the innermost frame.
    pub fn top_index(&self) -> Result<usize, Fault> {
        self.frames.len().checked_sub(1).ok_or_else(|| missing_frame(0))
    }

    pub fn top_mut(&mut self) -> Result<&mut Frame, Fault> {
        self.frames.last_mut().ok_or_else(|| missing_frame(0))
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Frame> {
        self.frames.get_mut(index)
    }

    pub fn handle(&self, index: usize) -> Result<FrameHandle, Fault> {
        let frame = self.frames.get(index).ok_or_else(|| missing_frame(0))?;
        Ok(FrameHandle {
            index,
            serial: frame.serial,
        })
    }

    /// Whether the activation `handle` refers to is still on the stack.
    pub fn is_live(&self, handle: FrameHandle) -> bool {
        self.frames
            .get(handle.index)
            .is_some_and(|f| f.serial == handle.serial)
    }

    /// Follow static links from the innermost frame to the one at `level`.
    pub fn resolve(&self, level: u16) -> Result<usize, Fault> {
        let mut index = self.top_index()?;
        loop {
            let frame = &self.frames[index];
            if frame.level == level {
                return Ok(index);
            }
            match frame.static_link {
                Some(link) if frame.level > level => index = link,
                _ => return Err(missing_frame(level)),
            }
        }
    }

    /// Follow static links from the innermost frame to the activation of
    /// `scope`.
    pub fn find_scope(&self, scope: ScopeId) -> Option<usize> {
        let mut index = self.frames.len().checked_sub(1)?;
        loop {
            let frame = &self.frames[index];
            if frame.scope == scope {
                return Some(index);
            }
            index = frame.static_link?;
        }
    }

    pub fn load(&self, slot: Slot) -> Result<Value, Fault> {
        let index = self.resolve(slot.level)?;
        self.frames[index]
            .locals
            .get(usize::from(slot.offset))
            .cloned()
            .ok_or_else(|| value_mismatch("local", &Value::Void))
    }

    pub fn store(&mut self, slot: Slot, value: Value) -> Result<(), Fault> {
        let index = self.resolve(slot.level)?;
        match self.frames[index].locals.get_mut(usize::from(slot.offset)) {
            Some(local) => {
                *local = value;
                Ok(())
            }
            None => Err(value_mismatch("local", &value)),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use crate::errors::FaultKind;
    use pretty_assertions::assert_eq;

    fn stack_with_levels() -> FrameStack {
        // environ(0) -> a(1) -> b(2) -> routine(2, linked to a)
        let mut frames = FrameStack::new(None);
        let env = frames
            .open(ScopeId::STANDARD_ENVIRON, 0, None, vec![])
            .unwrap();
        let a = frames
            .open(ScopeId::new(1), 1, Some(env), vec![Value::Int(10)])
            .unwrap();
        frames
            .open(ScopeId::new(2), 2, Some(a), vec![Value::Int(20)])
            .unwrap();
        frames
            .open(ScopeId::new(3), 2, Some(a), vec![Value::Int(30)])
            .unwrap();
        frames
    }

    #[test]
    fn slots_resolve_through_static_links() {
        let frames = stack_with_levels();
        assert_eq!(frames.load(Slot::new(2, 0)).unwrap(), Value::Int(30));
        assert_eq!(frames.load(Slot::new(1, 0)).unwrap(), Value::Int(10));
    }

    #[test]
    fn store_writes_the_resolved_frame() {
        let mut frames = stack_with_levels();
        frames.store(Slot::new(1, 0), Value::Int(11)).unwrap();
        frames.truncate(2);
        assert_eq!(frames.load(Slot::new(1, 0)).unwrap(), Value::Int(11));
    }

    #[test]
    fn missing_level_is_internal() {
        let frames = stack_with_levels();
        let err = frames.load(Slot::new(5, 0)).unwrap_err();
        assert_eq!(err.kind, FaultKind::MissingFrame { level: 5 });
    }

    #[test]
    fn handles_die_with_their_frame() {
        let mut frames = stack_with_levels();
        let handle = frames.handle(3).unwrap();
        assert!(frames.is_live(handle));
        frames.truncate(3);
        assert!(!frames.is_live(handle));
        frames
            .open(ScopeId::new(3), 2, Some(1), vec![])
            .unwrap();
        assert!(!frames.is_live(handle));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let mut frames = FrameStack::new(Some(1));
        frames
            .open(ScopeId::STANDARD_ENVIRON, 0, None, vec![])
            .unwrap();
        let err = frames
            .open(ScopeId::new(1), 1, Some(0), vec![])
            .unwrap_err();
        assert_eq!(err.kind, FaultKind::FrameDepthExceeded { limit: 1 });
    }

    #[test]
    fn find_scope_walks_static_chain() {
        let frames = stack_with_levels();
        assert_eq!(frames.find_scope(ScopeId::new(1)), Some(1));
        // frame 2 is on the dynamic stack but not on the static chain
        assert_eq!(frames.find_scope(ScopeId::new(2)), None);
    }
}
