//! # Scheduler Core
//!
//! Pure, single-threaded scheduling state: the slot table, the tick
//! counter, and the fixed-priority arbitration rule. The kernel wraps
//! one [`SchedState`] in a mutex and gates task threads on its verdicts;
//! keeping the state free of any synchronization makes the arbitration
//! logic directly unit-testable.
//!
//! ## Arbitration rule
//!
//! At any instant exactly one runnable slot holds the run grant: the one
//! with the highest priority (ties broken by registration order). A slot
//! waking from a delay with a higher priority than the current holder
//! takes the grant immediately — the holder is preempted back to Ready
//! and discovers the loss at its next kernel call.

use tracing::{debug, trace};

use crate::clock::Tick;
use crate::config::MAX_TASKS;
use crate::kernel::KernelError;
use crate::task::TaskState;

/// One registered task.
#[derive(Debug)]
pub struct Slot {
    /// Task name, for logs and tests.
    pub name: &'static str,
    /// Fixed priority (higher = more important). Never changes.
    pub priority: u8,
    /// Current scheduling state.
    pub state: TaskState,
}

/// The central scheduling state. Owned by the kernel behind a mutex.
#[derive(Debug)]
pub struct SchedState {
    slots: Vec<Slot>,
    /// Monotonic tick counter, advanced by the clock driver.
    pub now: Tick,
    /// Slot currently holding the run grant.
    running: Option<usize>,
    /// Set by `end_scheduler`; every wait unblocks with an error.
    pub shutdown: bool,
}

impl SchedState {
    pub fn new() -> Self {
        Self {
            slots: Vec::with_capacity(MAX_TASKS),
            now: 0,
            running: None,
            shutdown: false,
        }
    }

    /// Register a task slot. Tasks start `New` and become runnable when
    /// the kernel launches.
    pub fn add_slot(&mut self, name: &'static str, priority: u8) -> Result<usize, KernelError> {
        if self.slots.len() >= MAX_TASKS {
            return Err(KernelError::TaskTableFull);
        }
        self.slots.push(Slot {
            name,
            priority,
            state: TaskState::New,
        });
        Ok(self.slots.len() - 1)
    }

    pub fn slot(&self, id: usize) -> &Slot {
        &self.slots[id]
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Index of the slot holding the run grant, if any.
    pub fn running(&self) -> Option<usize> {
        self.running
    }

    /// Mark every registered slot Ready and hand out the first grant.
    pub fn launch(&mut self) {
        for slot in &mut self.slots {
            if slot.state == TaskState::New {
                slot.state = TaskState::Ready;
            }
        }
        self.pick_next();
    }

    /// Recompute the run grant. Highest-priority runnable slot wins;
    /// a previously running slot that lost the grant drops to Ready.
    pub fn pick_next(&mut self) {
        let next = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.state.is_runnable())
            .max_by_key(|(i, s)| (s.priority, core::cmp::Reverse(*i)))
            .map(|(i, _)| i);

        if next == self.running {
            return;
        }

        if let Some(prev) = self.running {
            if self.slots[prev].state == TaskState::Running {
                self.slots[prev].state = TaskState::Ready;
            }
        }
        if let Some(idx) = next {
            self.slots[idx].state = TaskState::Running;
            debug!(task = self.slots[idx].name, tick = self.now, "run grant");
        }
        self.running = next;
    }

    /// Put a slot to sleep until an absolute wake tick.
    pub fn set_delayed(&mut self, id: usize, wake: Tick) {
        trace!(task = self.slots[id].name, wake, "delayed");
        self.slots[id].state = TaskState::Delayed { wake };
        self.pick_next();
    }

    /// Park a slot in a blocking region (outside the tick clock).
    pub fn set_suspended(&mut self, id: usize) {
        self.slots[id].state = TaskState::Suspended;
        self.pick_next();
    }

    /// Return a slot to the ready set (end of a blocking region).
    pub fn set_ready(&mut self, id: usize) {
        self.slots[id].state = TaskState::Ready;
        self.pick_next();
    }

    /// Retire a slot whose entry function returned.
    pub fn finish(&mut self, id: usize) {
        self.slots[id].state = TaskState::Finished;
        self.pick_next();
    }

    /// Advance the clock to `tick`, waking every delayed slot that is
    /// due and re-arbitrating the grant.
    pub fn advance_to(&mut self, tick: Tick) {
        debug_assert!(tick >= self.now);
        self.now = tick;
        self.wake_due();
        self.pick_next();
    }

    /// Earliest wake tick among delayed slots.
    pub fn min_wake(&self) -> Option<Tick> {
        self.slots
            .iter()
            .filter_map(|s| match s.state {
                TaskState::Delayed { wake } => Some(wake),
                _ => None,
            })
            .min()
    }

    /// Virtual-time idle step: if nothing is runnable and at least one
    /// slot is delayed, jump the clock to the earliest wake tick.
    ///
    /// Returns true if the clock moved. This is what keeps a simulated
    /// kernel live when every task is between releases; in real-time
    /// mode the ticker thread plays this role instead.
    pub fn advance_if_idle(&mut self) -> bool {
        if self.shutdown || self.running.is_some() {
            return false;
        }
        if self.slots.iter().any(|s| s.state == TaskState::Ready) {
            return false;
        }
        match self.min_wake() {
            Some(wake) if wake > self.now => {
                trace!(from = self.now, to = wake, "idle jump");
                self.advance_to(wake);
                true
            }
            Some(_) => {
                // Due but not yet woken (state change raced the clock).
                self.wake_due();
                self.pick_next();
                true
            }
            None => false,
        }
    }

    fn wake_due(&mut self) {
        let now = self.now;
        for slot in &mut self.slots {
            if let TaskState::Delayed { wake } = slot.state {
                if wake <= now {
                    slot.state = TaskState::Ready;
                }
            }
        }
    }
}

impl Default for SchedState {
    fn default() -> Self {
        Self::new()
    }
}
