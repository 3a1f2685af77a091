//! # Task Registry & Priority Assignment
//!
//! The static table mapping each task to its kernel priority. The
//! ordering — input > end-check > display > path > diamond — encodes the
//! deadline hierarchy (tightest deadline / highest criticality first)
//! and must be preserved exactly: any reordering changes which task wins
//! under simultaneous release, and with it the schedulability story.

use std::sync::Arc;

use crate::config;
use crate::console::Console;
use crate::kernel::{Kernel, KernelError, TaskHandle};
use crate::state::GameShared;
use crate::task::PeriodicTaskSpec;
use crate::tasks;

/// T1 — display update.
pub const DISPLAY_SPEC: PeriodicTaskSpec = PeriodicTaskSpec {
    name: "display-update",
    priority: config::DISPLAY_PRIORITY,
    period: config::DISPLAY_PERIOD,
    exec_time: config::DISPLAY_EXEC_TIME,
};

/// T2 — path generation.
pub const PATH_SPEC: PeriodicTaskSpec = PeriodicTaskSpec {
    name: "generate-path",
    priority: config::PATH_PRIORITY,
    period: config::PATH_PERIOD,
    exec_time: config::PATH_EXEC_TIME,
};

/// T4 — diamond spawning.
pub const DIAMOND_SPEC: PeriodicTaskSpec = PeriodicTaskSpec {
    name: "spawn-diamond",
    priority: config::DIAMOND_PRIORITY,
    period: config::DIAMOND_PERIOD,
    exec_time: config::DIAMOND_EXEC_TIME,
};

/// T5 — end-of-game check.
pub const END_CHECK_SPEC: PeriodicTaskSpec = PeriodicTaskSpec {
    name: "end-check",
    priority: config::END_CHECK_PRIORITY,
    period: config::END_CHECK_PERIOD,
    exec_time: config::END_CHECK_EXEC_TIME,
};

/// The four periodic tasks of the game, for iteration in tests and
/// schedulability sanity checks.
pub const PERIODIC_TASKS: [PeriodicTaskSpec; 4] =
    [DISPLAY_SPEC, PATH_SPEC, DIAMOND_SPEC, END_CHECK_SPEC];

/// Handles to the five registered game tasks.
#[derive(Debug, Clone, Copy)]
pub struct GameTasks {
    pub input: TaskHandle,
    pub end_check: TaskHandle,
    pub display: TaskHandle,
    pub path: TaskHandle,
    pub diamond: TaskHandle,
}

/// Register the full game task set with the kernel, in priority order.
pub fn spawn_game_tasks(
    kernel: &Kernel,
    console: Arc<dyn Console>,
    shared: Arc<GameShared>,
) -> Result<GameTasks, KernelError> {
    let input = {
        let console = Arc::clone(&console);
        let shared = Arc::clone(&shared);
        kernel.create_task("player-input", config::INPUT_PRIORITY, move |ctx| {
            tasks::player_input(ctx, &*console, &shared)
        })?
    };

    let end_check = {
        let console = Arc::clone(&console);
        let shared = Arc::clone(&shared);
        kernel.create_task(END_CHECK_SPEC.name, END_CHECK_SPEC.priority, move |ctx| {
            tasks::end_check(ctx, &*console, &shared)
        })?
    };

    let display = {
        let console = Arc::clone(&console);
        let shared = Arc::clone(&shared);
        kernel.create_task(DISPLAY_SPEC.name, DISPLAY_SPEC.priority, move |ctx| {
            tasks::display_update(ctx, &*console, &shared)
        })?
    };

    let path = {
        let console = Arc::clone(&console);
        let shared = Arc::clone(&shared);
        kernel.create_task(PATH_SPEC.name, PATH_SPEC.priority, move |ctx| {
            tasks::generate_path(ctx, &*console, &shared)
        })?
    };

    let diamond = {
        let console = Arc::clone(&console);
        kernel.create_task(DIAMOND_SPEC.name, DIAMOND_SPEC.priority, move |ctx| {
            tasks::spawn_diamond(ctx, &*console)
        })?
    };

    Ok(GameTasks {
        input,
        end_check,
        display,
        path,
        diamond,
    })
}
