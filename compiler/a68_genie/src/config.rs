//! Genie configuration and evaluation modes.
//!
//! `EvalMode` selects what happens when a fault reaches the top of a run:
//! `Run` reports it and returns it to the driver, `Monitor` reports it and
//! hands control to the driver's monitor as a trap, from which
//! [`Genie::resume_after_trap`](crate::Genie::resume_after_trap) continues.

use crate::diagnostics::GenieCounters;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum EvalMode {
    /// Faults abort the run.
    #[default]
    Run,
    /// Faults trap into the monitor.
    Monitor,
}

impl EvalMode {
    /// Whether a fault becomes a trap instead of an error.
    #[inline]
    pub fn traps_faults(&self) -> bool {
        matches!(self, Self::Monitor)
    }
}

/// What an unmatched, non-void conformity clause without `OUT` yields.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConformityPolicy {
    /// The undefined value of the clause's mode.
    #[default]
    Lenient,
    /// A runtime fault.
    Strict,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenieConfig {
    pub mode: EvalMode,
    /// Maximum number of values on the expression stack.
    pub expression_stack_limit: usize,
    /// Maximum number of live frames, `None` for unlimited.
    pub max_frame_depth: Option<usize>,
    /// Maximum number of elements in a row, or characters in a string,
    /// created at run time.
    pub max_object_size: usize,
    pub conformity: ConformityPolicy,
    /// Collect evaluation counters.
    pub profile: bool,
}

impl Default for GenieConfig {
    fn default() -> Self {
        GenieConfig {
            mode: EvalMode::Run,
            expression_stack_limit: 1 << 20,
            max_frame_depth: Some(100_000),
            max_object_size: 1 << 26,
            conformity: ConformityPolicy::Lenient,
            profile: false,
        }
    }
}

/// Per-run mutable state derived from the configuration.
#[derive(Debug, Default)]
pub struct ModeState {
    /// `None` unless profiling was requested; increments are no-ops then.
    counters: Option<GenieCounters>,
}

impl ModeState {
    pub fn new(config: &GenieConfig) -> Self {
        ModeState {
            counters: config.profile.then(GenieCounters::default),
        }
    }

    #[inline]
    pub fn count_unit(&mut self) {
        if let Some(c) = &mut self.counters {
            c.units_evaluated = c.units_evaluated.wrapping_add(1);
        }
    }

    #[inline]
    pub fn count_chain_replay(&mut self) {
        if let Some(c) = &mut self.counters {
            c.chain_replays = c.chain_replays.wrapping_add(1);
        }
    }

    #[inline]
    pub fn count_linearization(&mut self) {
        if let Some(c) = &mut self.counters {
            c.linearizations = c.linearizations.wrapping_add(1);
        }
    }

    #[inline]
    pub fn count_jump(&mut self) {
        if let Some(c) = &mut self.counters {
            c.jumps = c.jumps.wrapping_add(1);
        }
    }

    #[inline]
    pub fn count_call(&mut self) {
        if let Some(c) = &mut self.counters {
            c.routine_calls = c.routine_calls.wrapping_add(1);
        }
    }

    pub fn counters(&self) -> Option<&GenieCounters> {
        self.counters.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_monitor_traps() {
        assert!(EvalMode::Monitor.traps_faults());
        assert!(!EvalMode::Run.traps_faults());
        assert_eq!(EvalMode::default(), EvalMode::Run);
    }

    #[test]
    fn counters_follow_profile_flag() {
        let mut off = ModeState::new(&GenieConfig::default());
        off.count_unit();
        assert!(off.counters().is_none());

        let mut on = ModeState::new(&GenieConfig {
            profile: true,
            ..GenieConfig::default()
        });
        on.count_unit();
        on.count_unit();
        on.count_jump();
        let c = on.counters().map(Clone::clone).unwrap_or_default();
        assert_eq!(c.units_evaluated, 2);
        assert_eq!(c.jumps, 1);
    }

    #[test]
    fn default_policy_is_lenient() {
        assert_eq!(GenieConfig::default().conformity, ConformityPolicy::Lenient);
    }
}
