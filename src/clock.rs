//! # Tick Sources
//!
//! The budget emulator and the periodic drivers never talk to a wall clock
//! directly; they observe time through the [`TickSource`] trait. In the
//! running system the source is a task's kernel context, where every
//! `busy_poll` doubles as a preemption point. Tests substitute a
//! [`ManualClock`] so the spin-wait arithmetic is fully deterministic.

/// Absolute tick count since scheduler start.
pub type Tick = u64;

/// Signal that the scheduler has been torn down (`end_scheduler`).
///
/// Returned by every blocking or spinning kernel operation once shutdown
/// begins; task loops propagate it with `?` and unwind out of their
/// entry functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStopped;

impl core::fmt::Display for SchedulerStopped {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("scheduler stopped")
    }
}

impl std::error::Error for SchedulerStopped {}

/// A monotonic tick clock that can be actively spun on.
pub trait TickSource {
    /// Current absolute tick.
    fn now(&self) -> Tick;

    /// One iteration of a busy-wait loop.
    ///
    /// Implementations may advance virtual time, hint the CPU, or hand the
    /// run grant to a higher-priority task. Deliberately *not* a sleep:
    /// a spinning task is modelling real execution load and must keep
    /// occupying its slot on the (logical) CPU.
    fn busy_poll(&self) -> Result<(), SchedulerStopped>;
}

/// Deterministic tick source for unit tests and offline simulation.
///
/// `now()` returns the stored tick; each `busy_poll` advances it by a
/// configurable quantum. A quantum larger than one tick models a task
/// that was preempted mid-spin and observes a coarse jump when it next
/// samples the clock.
#[derive(Debug)]
pub struct ManualClock {
    now: core::cell::Cell<Tick>,
    poll_quantum: core::cell::Cell<Tick>,
}

impl ManualClock {
    /// Clock starting at tick zero, advancing one tick per poll.
    pub fn new() -> Self {
        Self::with_quantum(1)
    }

    /// Clock advancing `quantum` ticks per poll.
    pub fn with_quantum(quantum: Tick) -> Self {
        Self {
            now: core::cell::Cell::new(0),
            poll_quantum: core::cell::Cell::new(quantum),
        }
    }

    /// Change the per-poll advance, e.g. to inject jitter mid-test.
    pub fn set_quantum(&self, quantum: Tick) {
        self.poll_quantum.set(quantum);
    }

    /// Jump the clock forward without a poll (external time passing).
    pub fn advance(&self, ticks: Tick) {
        self.now.set(self.now.get() + ticks);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for ManualClock {
    fn now(&self) -> Tick {
        self.now.get()
    }

    fn busy_poll(&self) -> Result<(), SchedulerStopped> {
        self.now.set(self.now.get() + self.poll_quantum.get());
        Ok(())
    }
}
