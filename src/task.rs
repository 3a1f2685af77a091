//! # Task Model
//!
//! Defines the task-facing data model: the scheduler's per-slot state
//! machine and the immutable spec describing a periodic task's timing
//! parameters.

use crate::clock::Tick;
use crate::config::RELEASE_INTERVAL_DIVISOR;

// ---------------------------------------------------------------------------
// Task state machine
// ---------------------------------------------------------------------------

/// Execution state of a task slot in the scheduler.
///
/// ```text
///   ┌──────────┐      pick_next()      ┌─────────┐
///   │  Ready   │ ────────────────────► │ Running │
///   └──────────┘                       └─────────┘
///        ▲                                  │
///        │  preempted by higher priority    │ delay / delay_until
///        └─────────────────────────────────┤
///        │                                  ▼
///        │   wake tick reached        ┌──────────┐
///        ├─────────────────────────── │ Delayed  │
///        │                            └──────────┘
///        │   blocking region ends     ┌───────────┐
///        └─────────────────────────── │ Suspended │
///                                     └───────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Registered but the scheduler has not started yet.
    New,
    /// Runnable, waiting for the run grant.
    Ready,
    /// Holds the run grant; the only slot making progress.
    Running,
    /// Sleeping until an absolute wake tick (`delay` / `delay_until`).
    Delayed {
        /// Absolute tick at which the task becomes ready again.
        wake: Tick,
    },
    /// Parked in a blocking region (e.g. the end-of-game prompt).
    /// Not runnable and not waiting on the tick clock; the periodic
    /// guarantee is explicitly suspended while in this state.
    Suspended,
    /// Entry function returned; the slot is never scheduled again.
    Finished,
}

impl TaskState {
    /// True if the slot competes for the run grant.
    #[inline]
    pub fn is_runnable(&self) -> bool {
        matches!(self, TaskState::Ready | TaskState::Running)
    }
}

// ---------------------------------------------------------------------------
// Periodic task spec (immutable after registration)
// ---------------------------------------------------------------------------

/// Timing parameters of a periodic task. One instance per task, created
/// before the scheduler starts and never mutated afterwards.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicTaskSpec {
    /// Human-readable task name, also used as the tracing target.
    pub name: &'static str,
    /// Kernel priority (higher = more important).
    pub priority: u8,
    /// Nominal period P in ticks. The stated deadline D equals P for
    /// every task in this demo.
    pub period: Tick,
    /// Claimed execution time E in ticks, emulated by busy-waiting.
    pub exec_time: Tick,
}

impl PeriodicTaskSpec {
    /// Interval actually passed to `delay_until` each iteration:
    /// `period / RELEASE_INTERVAL_DIVISOR` (see `config` for why this is
    /// not simply the period).
    #[inline]
    pub const fn release_interval(&self) -> Tick {
        self.period / RELEASE_INTERVAL_DIVISOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;

    #[test]
    fn runnable_states() {
        assert!(TaskState::Ready.is_runnable());
        assert!(TaskState::Running.is_runnable());
        assert!(!TaskState::New.is_runnable());
        assert!(!TaskState::Delayed { wake: 10 }.is_runnable());
        assert!(!TaskState::Suspended.is_runnable());
        assert!(!TaskState::Finished.is_runnable());
    }

    /// Pins the release-rate discrepancy: the re-arm interval is half the
    /// nominal period, not the period itself. If this ever changes, the
    /// whole P/D/e story of the demo changes with it.
    #[test]
    fn release_interval_is_half_the_nominal_period() {
        let spec = PeriodicTaskSpec {
            name: "display",
            priority: config::DISPLAY_PRIORITY,
            period: config::DISPLAY_PERIOD,
            exec_time: config::DISPLAY_EXEC_TIME,
        };
        assert_eq!(spec.release_interval(), 10);
        assert_ne!(spec.release_interval(), spec.period);
    }

    #[test]
    fn release_interval_uses_integer_division() {
        let spec = PeriodicTaskSpec {
            name: "end-check",
            priority: config::END_CHECK_PRIORITY,
            period: config::END_CHECK_PERIOD,
            exec_time: config::END_CHECK_EXEC_TIME,
        };
        // 5 / 2 truncates: the end-check task re-arms every 2 ticks.
        assert_eq!(spec.release_interval(), 2);
    }
}
