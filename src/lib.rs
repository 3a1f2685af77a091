//! # ZigZag — fixed-priority periodic task scheduling demo
//!
//! Five simulated game tasks run under a preemptive fixed-priority
//! scheduler: display update, path generation, player-input polling,
//! diamond spawning, and the end-of-game check. None of them render a
//! real game — each emulates a bounded execution time by busy-waiting,
//! so the interesting part is purely the timing: how a task converts a
//! claimed execution time into actual CPU occupation, and how each
//! release is computed from an absolute-time delay primitive.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │              Game tasks (tasks.rs)                      │
//! │  input · end-check · display · path · diamond           │
//! ├──────────────┬───────────────────┬─────────────────────┤
//! │ Budget       │  Registry         │  Console trait      │
//! │ emulator     │  registry.rs      │  console.rs         │
//! │ budget.rs    │  priority table   │  poll_key · prompt  │
//! ├──────────────┴───────────────────┴─────────────────────┤
//! │               Kernel API (kernel.rs)                    │
//! │   create_task · start · delay_until · delay ·           │
//! │   current_tick · blocking_region · end_scheduler        │
//! ├────────────────────────────────────────────────────────┤
//! │             Scheduler core (scheduler.rs)               │
//! │   slot table · run grant · wake-due · idle jump         │
//! ├────────────────────────────────────────────────────────┤
//! │   Clock driver: real ticker thread, or virtual time     │
//! │   advanced one tick per busy-poll (clock.rs)            │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Timing model
//!
//! Each periodic task is described by a period P and a claimed execution
//! time E (`config.rs`). An iteration does its token work (bump a
//! counter, maybe print a status line), spins E ticks off in its own
//! [`budget::ExecutionBudget`], then re-arms with
//! `delay_until(period / RELEASE_INTERVAL_DIVISOR)`. Two deliberate
//! quirks of that model are preserved and pinned by tests rather than
//! fixed:
//!
//! * the re-arm interval is **half** the nominal period, and
//! * the release anchor is re-read *after* the iteration's work, folding
//!   the work's duration into the next release.
//!
//! The budget emulator carries a per-task signed debt so that, under
//! preemption and coarse clocks, total ticks spun converge on total
//! ticks claimed — the core drift-correction property
//! (`budget::tests`).
//!
//! ## Priorities
//!
//! | Task           | Priority | P (ms) | E (ms) |
//! |----------------|----------|--------|--------|
//! | player-input   | 5        | sporadic, 40 ms poll | ~0 |
//! | end-check      | 4        | 5      | 1      |
//! | display-update | 3        | 20     | 3      |
//! | generate-path  | 2        | 20     | 3      |
//! | spawn-diamond  | 1        | 5000   | 500    |
//!
//! The ordering encodes the deadline hierarchy and is preserved exactly
//! (`registry.rs`).

pub mod budget;
pub mod clock;
pub mod config;
pub mod console;
pub mod kernel;
pub mod registry;
pub mod scheduler;
pub mod state;
pub mod sync;
pub mod task;
pub mod tasks;
