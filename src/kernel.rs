//! # Kernel
//!
//! The concurrency layer over [`SchedState`](crate::scheduler::SchedState):
//! one OS thread per task, gated so that only the slot holding the run
//! grant makes progress. This reproduces single-CPU fixed-priority
//! preemptive scheduling on a host machine — a lower-priority task is
//! parked on a condvar the moment a higher-priority one becomes ready,
//! and a spinning task discovers preemption at its next kernel call.
//!
//! ## Clock driving
//!
//! * [`RunMode::RealTime`] — a ticker thread advances the tick every
//!   `TICK_INTERVAL_MS` of wall time. This is the mode the game binary
//!   runs in.
//! * [`RunMode::Simulated`] — virtual time. The running task advances
//!   the clock one tick per `busy_poll` (each poll models one tick of
//!   consumed CPU), and when every task is delayed the clock jumps
//!   straight to the earliest wake instant. Fully deterministic, which
//!   is what the timing tests rely on.
//!
//! ## Startup sequence
//!
//! ```text
//! main()
//!   ├─► Kernel::new(mode)
//!   ├─► kernel.create_task(name, priority, entry)  (×N)
//!   └─► kernel.start()      ← blocks until end_scheduler()
//!         ├─► launch slots, hand out first grant
//!         ├─► spawn one thread per task (+ ticker in real-time mode)
//!         └─► join everything on teardown
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::clock::{SchedulerStopped, Tick, TickSource};
use crate::config::TICK_INTERVAL_MS;
use crate::scheduler::SchedState;
use crate::task::TaskState;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Task registration / startup failures.
#[derive(Debug)]
pub enum KernelError {
    /// The slot table is full (`MAX_TASKS` reached).
    TaskTableFull,
    /// `create_task` after `start`.
    AlreadyStarted,
    /// The OS refused to spawn a task thread.
    Spawn(std::io::Error),
}

impl core::fmt::Display for KernelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            KernelError::TaskTableFull => f.write_str("task table full"),
            KernelError::AlreadyStarted => f.write_str("scheduler already started"),
            KernelError::Spawn(e) => write!(f, "failed to spawn task thread: {e}"),
        }
    }
}

impl std::error::Error for KernelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KernelError::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Kernel
// ---------------------------------------------------------------------------

/// How the tick clock is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Ticker thread, `TICK_INTERVAL_MS` of wall time per tick.
    RealTime,
    /// Deterministic virtual time (tests and offline simulation).
    Simulated,
}

type Entry = Box<dyn FnOnce(&TaskContext) + Send + 'static>;

struct Inner {
    sched: Mutex<SchedState>,
    cond: Condvar,
    mode: RunMode,
}

impl Inner {
    /// Poison-tolerant lock: a panicking task must not wedge the whole
    /// scheduler, teardown still has to run.
    fn sched(&self) -> MutexGuard<'_, SchedState> {
        self.sched.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, SchedState>) -> MutexGuard<'a, SchedState> {
        self.cond.wait(guard).unwrap_or_else(|e| e.into_inner())
    }

    /// Block until this slot holds the run grant (or shutdown).
    fn wait_for_grant<'a>(
        &self,
        mut sched: MutexGuard<'a, SchedState>,
        id: usize,
    ) -> Result<MutexGuard<'a, SchedState>, SchedulerStopped> {
        loop {
            if sched.shutdown {
                return Err(SchedulerStopped);
            }
            if sched.slot(id).state == TaskState::Running {
                return Ok(sched);
            }
            // In virtual time somebody has to move the clock when every
            // task is asleep; the first waiter to notice does it.
            if self.mode == RunMode::Simulated && sched.advance_if_idle() {
                self.cond.notify_all();
                continue;
            }
            sched = self.wait(sched);
        }
    }
}

/// Handle to a registered task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHandle {
    id: usize,
}

impl TaskHandle {
    /// Slot index in the scheduler table.
    pub fn id(&self) -> usize {
        self.id
    }
}

/// The kernel instance: slot table, run-grant gate, and clock driver.
pub struct Kernel {
    inner: Arc<Inner>,
    entries: Mutex<Vec<Entry>>,
    names: Mutex<Vec<&'static str>>,
    started: AtomicBool,
}

impl Kernel {
    pub fn new(mode: RunMode) -> Self {
        Self {
            inner: Arc::new(Inner {
                sched: Mutex::new(SchedState::new()),
                cond: Condvar::new(),
                mode,
            }),
            entries: Mutex::new(Vec::new()),
            names: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
        }
    }

    /// Register a task. The entry function runs on its own thread once
    /// `start` hands it the run grant for the first time; it should loop
    /// until a kernel call reports [`SchedulerStopped`].
    pub fn create_task(
        &self,
        name: &'static str,
        priority: u8,
        entry: impl FnOnce(&TaskContext) + Send + 'static,
    ) -> Result<TaskHandle, KernelError> {
        if self.started.load(Ordering::Acquire) {
            return Err(KernelError::AlreadyStarted);
        }
        let mut sched = self.inner.sched();
        let id = sched.add_slot(name, priority)?;
        drop(sched);

        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Box::new(entry));
        self.names
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(name);
        debug!(task = name, priority, "task registered");
        Ok(TaskHandle { id })
    }

    /// Start the scheduler and block until it is torn down (every task
    /// finished, or some task called [`TaskContext::end_scheduler`]).
    pub fn start(&self) -> Result<(), KernelError> {
        self.started.store(true, Ordering::Release);

        let entries: Vec<Entry> = std::mem::take(
            &mut *self.entries.lock().unwrap_or_else(|e| e.into_inner()),
        );
        let names = self.names.lock().unwrap_or_else(|e| e.into_inner()).clone();

        let mut handles = Vec::with_capacity(entries.len());
        for (id, entry) in entries.into_iter().enumerate() {
            let inner = Arc::clone(&self.inner);
            let name = names[id];
            let handle = thread::Builder::new()
                .name(name.to_string())
                .spawn(move || {
                    let ctx = TaskContext { inner, id };
                    if ctx.wait_until_running().is_ok() {
                        entry(&ctx);
                    }
                    ctx.retire();
                })
                .map_err(KernelError::Spawn)?;
            handles.push(handle);
        }

        let ticker = match self.inner.mode {
            RunMode::RealTime => Some(self.spawn_ticker()?),
            RunMode::Simulated => None,
        };

        {
            let mut sched = self.inner.sched();
            info!(tasks = sched.slot_count(), mode = ?self.inner.mode, "scheduler started");
            sched.launch();
        }
        self.inner.cond.notify_all();

        for handle in handles {
            let _ = handle.join();
        }

        // All tasks are done; make sure the ticker unblocks too.
        {
            let mut sched = self.inner.sched();
            sched.shutdown = true;
        }
        self.inner.cond.notify_all();
        if let Some(ticker) = ticker {
            let _ = ticker.join();
        }
        info!("scheduler stopped");
        Ok(())
    }

    fn spawn_ticker(&self) -> Result<thread::JoinHandle<()>, KernelError> {
        let inner = Arc::clone(&self.inner);
        thread::Builder::new()
            .name("tick".to_string())
            .spawn(move || loop {
                thread::sleep(Duration::from_millis(TICK_INTERVAL_MS));
                let mut sched = inner.sched();
                if sched.shutdown {
                    break;
                }
                let next = sched.now + 1;
                sched.advance_to(next);
                drop(sched);
                inner.cond.notify_all();
            })
            .map_err(KernelError::Spawn)
    }
}

// ---------------------------------------------------------------------------
// Task context
// ---------------------------------------------------------------------------

/// Per-task kernel API, handed to each entry function on its own thread.
///
/// Every method is a preemption point: if a higher-priority task became
/// ready since the last call, the caller parks here until it regains the
/// run grant.
pub struct TaskContext {
    inner: Arc<Inner>,
    id: usize,
}

impl TaskContext {
    /// Slot index of this task.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Current absolute tick. Waits out any pending preemption first.
    pub fn current_tick(&self) -> Tick {
        let sched = self.inner.sched();
        match self.inner.wait_for_grant(sched, self.id) {
            Ok(sched) => sched.now,
            // Torn down: report the final tick, the next blocking call
            // will surface the shutdown.
            Err(SchedulerStopped) => self.inner.sched().now,
        }
    }

    /// Relative delay: sleep for `ticks` ticks from now.
    pub fn delay(&self, ticks: Tick) -> Result<(), SchedulerStopped> {
        let mut sched = self.inner.sched();
        if sched.shutdown {
            return Err(SchedulerStopped);
        }
        if ticks == 0 {
            return Ok(());
        }
        let wake = sched.now + ticks;
        sched.set_delayed(self.id, wake);
        drop(sched);
        self.inner.cond.notify_all();
        self.block_until_running()
    }

    /// Absolute-time periodic delay.
    ///
    /// Computes `wake = *last_wake + interval`, advances `*last_wake`
    /// unconditionally, and blocks only if the wake instant is still in
    /// the future. A missed release therefore returns immediately and
    /// the next release is measured from the (stale) anchor — exactly
    /// the drift behavior expected of an absolute delay primitive.
    pub fn delay_until(
        &self,
        last_wake: &mut Tick,
        interval: Tick,
    ) -> Result<(), SchedulerStopped> {
        let mut sched = self.inner.sched();
        if sched.shutdown {
            return Err(SchedulerStopped);
        }
        let wake = *last_wake + interval;
        *last_wake = wake;
        if wake <= sched.now {
            return Ok(());
        }
        sched.set_delayed(self.id, wake);
        drop(sched);
        self.inner.cond.notify_all();
        self.block_until_running()
    }

    /// Run `f` outside the scheduler's tick discipline.
    ///
    /// The slot is parked as Suspended while `f` runs, so lower-priority
    /// tasks keep executing even though `f` may block indefinitely (the
    /// end-of-game prompt does). On return the task rejoins the ready
    /// set and waits for its grant as usual. The periodic guarantee is
    /// explicitly void for the duration.
    pub fn blocking_region<R>(&self, f: impl FnOnce() -> R) -> Result<R, SchedulerStopped> {
        {
            let mut sched = self.inner.sched();
            if sched.shutdown {
                return Err(SchedulerStopped);
            }
            sched.set_suspended(self.id);
        }
        self.inner.cond.notify_all();

        let result = f();

        let mut sched = self.inner.sched();
        if sched.shutdown {
            return Err(SchedulerStopped);
        }
        sched.set_ready(self.id);
        drop(sched);
        self.inner.cond.notify_all();
        self.block_until_running()?;
        Ok(result)
    }

    /// Tear down the scheduler. Every task unwinds at its next kernel
    /// call; `Kernel::start` returns once all task threads have joined.
    pub fn end_scheduler(&self) {
        let mut sched = self.inner.sched();
        info!(tick = sched.now, "end_scheduler");
        sched.shutdown = true;
        drop(sched);
        self.inner.cond.notify_all();
    }

    fn wait_until_running(&self) -> Result<(), SchedulerStopped> {
        let sched = self.inner.sched();
        self.inner.wait_for_grant(sched, self.id).map(drop)
    }

    fn block_until_running(&self) -> Result<(), SchedulerStopped> {
        self.wait_until_running()
    }

    fn retire(&self) {
        let mut sched = self.inner.sched();
        sched.finish(self.id);
        drop(sched);
        self.inner.cond.notify_all();
    }
}

impl TickSource for TaskContext {
    /// Raw tick read used inside busy-wait loops; `busy_poll` is the
    /// preemption point, so this one does not wait for the grant.
    fn now(&self) -> Tick {
        self.inner.sched().now
    }

    fn busy_poll(&self) -> Result<(), SchedulerStopped> {
        let sched = self.inner.sched();
        // Preempted mid-spin: park until the grant comes back. The ticks
        // that pass meanwhile show up as overshoot in the caller's
        // budget accounting.
        let mut sched = self.inner.wait_for_grant(sched, self.id)?;
        match self.inner.mode {
            RunMode::Simulated => {
                // One poll = one tick of consumed CPU.
                let next = sched.now + 1;
                sched.advance_to(next);
                drop(sched);
                self.inner.cond.notify_all();
            }
            RunMode::RealTime => {
                drop(sched);
                // Let the ticker (and preempting tasks) breathe.
                thread::yield_now();
            }
        }
        Ok(())
    }
}
