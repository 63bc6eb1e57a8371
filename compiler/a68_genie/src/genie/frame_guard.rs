//! RAII frame lifetime.
//!
//! [`ScopedGenie`] holds `&mut Genie` and implements `Deref`/`DerefMut`, so
//! the body of a range is evaluated through the guard exactly as through the
//! genie itself. Dropping the guard pops the frame it opened together with
//! anything opened above it, whether the body completed, faulted or was
//! left by a jump.

use std::ops::{Deref, DerefMut};

use a68_ir::ScopeId;

use super::Genie;
use crate::errors::{Fault, GenieResult};
use crate::value::Value;

/// Guard over one open frame. Restores the frame depth on drop.
pub(crate) struct ScopedGenie<'guard, 'a> {
    genie: &'guard mut Genie<'a>,
    depth: usize,
}

impl Drop for ScopedGenie<'_, '_> {
    fn drop(&mut self) {
        self.genie.frames.truncate(self.depth);
    }
}

impl<'a> Deref for ScopedGenie<'_, 'a> {
    type Target = Genie<'a>;

    fn deref(&self) -> &Self::Target {
        self.genie
    }
}

impl DerefMut for ScopedGenie<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.genie
    }
}

impl<'a> Genie<'a> {
    /// Fresh locals for a frame of `scope`, each the undefined value of its
    /// mode.
    pub(crate) fn fresh_locals(&self, scope: ScopeId) -> Vec<Value> {
        let program = self.program;
        program
            .scopes
            .get(scope)
            .locals
            .iter()
            .map(|&mode| Value::undefined(mode, &program.modes))
            .collect()
    }

    /// Overwrite the locals of frame `index` with undefined values, keeping
    /// their storage.
    pub(crate) fn reset_locals(&mut self, index: usize) {
        let program = self.program;
        if let Some(frame) = self.frames.get_mut(index) {
            let modes = &program.scopes.get(frame.scope).locals;
            for (local, &mode) in frame.locals.iter_mut().zip(modes) {
                *local = Value::undefined(mode, &program.modes);
            }
        }
    }

    /// Open a frame for `scope` whose static link is `link`.
    pub(crate) fn scoped_at(
        &mut self,
        scope: ScopeId,
        link: usize,
    ) -> Result<ScopedGenie<'_, 'a>, Fault> {
        let depth = self.frames.depth();
        let level = self.program.scopes.get(scope).level;
        let locals = self.fresh_locals(scope);
        self.frames.open(scope, level, Some(link), locals)?;
        Ok(ScopedGenie {
            genie: self,
            depth,
        })
    }

    /// Evaluate `f` inside a frame for `scope`, nested in the innermost one.
    pub(crate) fn with_frame<T, F>(&mut self, scope: ScopeId, f: F) -> GenieResult<T>
    where
        F: FnOnce(&mut ScopedGenie<'_, 'a>) -> GenieResult<T>,
    {
        let link = self.frames.top_index()?;
        let mut scoped = self.scoped_at(scope, link)?;
        f(&mut scoped)
    }

    /// Like [`with_frame`](Self::with_frame), with an explicit static link.
    /// Routine calls link to the routine's environ.
    pub(crate) fn with_linked_frame<T, F>(
        &mut self,
        scope: ScopeId,
        link: usize,
        f: F,
    ) -> GenieResult<T>
    where
        F: FnOnce(&mut ScopedGenie<'_, 'a>) -> GenieResult<T>,
    {
        let mut scoped = self.scoped_at(scope, link)?;
        f(&mut scoped)
    }
}
