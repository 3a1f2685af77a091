//! # Execution-Budget Emulator
//!
//! Simulates a task's claimed execution time by busy-waiting on a
//! [`TickSource`] instead of doing real work. The emulator deliberately
//! spins rather than sleeps: an emulated workload has to occupy the CPU
//! so that lower-priority tasks are genuinely blocked, otherwise the
//! preemptive scheduler is never exercised under load.
//!
//! ## Drift correction
//!
//! Tick granularity and preemption make any single spin imprecise: a task
//! preempted mid-spin resumes to find the clock has jumped well past its
//! target. Each [`ExecutionBudget`] therefore carries a signed *debt* of
//! simulated ticks. `consume` adds the claimed time to the debt, spins the
//! positive part off, and banks whatever it overshot as negative debt that
//! shortens the next call. Over any sequence of calls the total ticks
//! actually spun converges on the total claimed, to within one busy-poll
//! quantum.
//!
//! Each task owns its own `ExecutionBudget`; debts are never shared, so
//! one task's jitter cannot leak into another task's accounting.

use crate::clock::{SchedulerStopped, Tick, TickSource};

/// Per-task simulated execution-time accounting.
#[derive(Debug, Default)]
pub struct ExecutionBudget {
    /// Simulated ticks still owed. Positive: behind schedule, must spin.
    /// Negative: overshot a previous spin, credit against the next claim.
    debt: i64,
    /// Running total of all claimed ticks, for inspection in tests.
    total_claimed: Tick,
}

impl ExecutionBudget {
    pub const fn new() -> Self {
        Self {
            debt: 0,
            total_claimed: 0,
        }
    }

    /// Block the calling task for approximately `claimed` ticks of
    /// clock time, corrected for debt left over from previous calls.
    ///
    /// A `claimed` of zero is a valid no-op. Returns early with
    /// `Err(SchedulerStopped)` if the scheduler is torn down mid-spin;
    /// the unspun remainder stays in the debt but the task is unwinding
    /// anyway.
    pub fn consume(
        &mut self,
        clock: &impl TickSource,
        claimed: Tick,
    ) -> Result<(), SchedulerStopped> {
        self.debt += claimed as i64;
        self.total_claimed += claimed;
        if self.debt <= 0 {
            return Ok(());
        }

        let start = clock.now();
        let target = start + self.debt as Tick;
        while clock.now() < target {
            clock.busy_poll()?;
        }

        // Bank the overshoot (if any) against the next call.
        let spun = clock.now() - start;
        self.debt -= spun as i64;
        Ok(())
    }

    /// Leftover simulated ticks (negative = ahead of schedule).
    pub fn debt(&self) -> i64 {
        self.debt
    }

    /// Sum of every claim passed to [`consume`](Self::consume).
    pub fn total_claimed(&self) -> Tick {
        self.total_claimed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use proptest::prelude::*;

    #[test]
    fn consume_spins_exactly_the_claim_at_unit_quantum() {
        let clock = ManualClock::new();
        let mut budget = ExecutionBudget::new();

        budget.consume(&clock, 3).unwrap();
        assert_eq!(clock.now(), 3);
        assert_eq!(budget.debt(), 0);

        budget.consume(&clock, 5).unwrap();
        assert_eq!(clock.now(), 8);
        assert_eq!(budget.debt(), 0);
    }

    #[test]
    fn zero_claim_is_a_noop() {
        let clock = ManualClock::new();
        let mut budget = ExecutionBudget::new();
        budget.consume(&clock, 0).unwrap();
        assert_eq!(clock.now(), 0);
        assert_eq!(budget.debt(), 0);
    }

    #[test]
    fn overshoot_is_repaid_on_the_next_call() {
        // A 7-tick poll quantum models a task preempted mid-spin: it
        // wakes to find the clock far past its target.
        let clock = ManualClock::with_quantum(7);
        let mut budget = ExecutionBudget::new();

        budget.consume(&clock, 10).unwrap();
        // Polls land at 7 and 14; overshoot of 4 goes into the debt.
        assert_eq!(clock.now(), 14);
        assert_eq!(budget.debt(), -4);

        budget.consume(&clock, 10).unwrap();
        // Only 6 ticks owed; a single 7-tick poll covers it.
        assert_eq!(clock.now(), 21);
        assert_eq!(budget.debt(), -1);
    }

    #[test]
    fn credit_larger_than_claim_skips_the_spin() {
        let clock = ManualClock::with_quantum(50);
        let mut budget = ExecutionBudget::new();

        budget.consume(&clock, 10).unwrap();
        assert_eq!(clock.now(), 50);
        assert_eq!(budget.debt(), -40);

        // Fully covered by the banked credit: no spin at all.
        budget.consume(&clock, 10).unwrap();
        assert_eq!(clock.now(), 50);
        assert_eq!(budget.debt(), -30);
    }

    #[test]
    fn external_jitter_between_calls_does_not_accumulate() {
        // Ticks elapsing while the task is suspended (between consume
        // calls) must not count against its budget.
        let clock = ManualClock::new();
        let mut budget = ExecutionBudget::new();

        budget.consume(&clock, 4).unwrap();
        clock.advance(100); // task delayed-until its next release
        budget.consume(&clock, 4).unwrap();

        assert_eq!(budget.debt(), 0);
        assert_eq!(budget.total_claimed(), 8);
        // 100 idle ticks plus exactly 8 spun ticks.
        assert_eq!(clock.now(), 108);
    }

    proptest! {
        /// Core drift-correction property: for any sequence of claims and
        /// any (bounded) poll quantum, the total ticks spun equals the
        /// total claimed to within one quantum.
        #[test]
        fn total_spun_tracks_total_claimed(
            claims in proptest::collection::vec(0u64..200, 1..40),
            quantum in 1u64..16,
        ) {
            let clock = ManualClock::with_quantum(quantum);
            let mut budget = ExecutionBudget::new();

            for &claim in &claims {
                budget.consume(&clock, claim).unwrap();
            }

            let claimed: u64 = claims.iter().sum();
            let spun = clock.now();
            // debt is never positive after a completed call, and the
            // overshoot is bounded by a single poll quantum.
            prop_assert!(budget.debt() <= 0);
            prop_assert!(budget.debt() > -(quantum as i64));
            prop_assert_eq!(spun as i64, claimed as i64 - budget.debt());
        }
    }
}
