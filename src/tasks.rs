//! # Task Bodies
//!
//! The five application tasks. The four periodic ones share the same
//! driver shape — do the iteration's work, burn the claimed execution
//! time in the budget emulator, then re-anchor and `delay_until` the
//! next release — while the player-input task is sporadic and just polls
//! on a fixed relative delay.
//!
//! Every loop exits when a kernel call reports the scheduler is gone;
//! only the end-check task's quit path ever initiates that teardown.

use tracing::trace;

use crate::budget::ExecutionBudget;
use crate::clock::{SchedulerStopped, Tick};
use crate::config;
use crate::console::{Console, EndChoice, Key};
use crate::kernel::TaskContext;
use crate::registry;
use crate::state::{bump, GameShared, MatchPhase};

/// Re-anchor and wait for the next release.
///
/// Note the anchor is read *after* the iteration's work: the work's own
/// duration is folded into the release computation, so consecutive
/// releases are spaced `work + interval` apart rather than `interval`.
/// This is the timing model being reproduced, kept deliberately (and
/// pinned by the release-interval tests) rather than silently fixed.
fn wait_next_release(ctx: &TaskContext, interval: Tick) -> Result<(), SchedulerStopped> {
    let mut last_wake = ctx.current_tick();
    ctx.delay_until(&mut last_wake, interval)
}

/// T1 — display update: P = D(hard) = 20 ms, E = 3 ms.
///
/// Prints its status line every 50th iteration (nominally once per
/// second), then burns its claimed execution time.
pub fn display_update(ctx: &TaskContext, console: &dyn Console, shared: &GameShared) {
    let mut budget = ExecutionBudget::new();
    let interval = registry::DISPLAY_SPEC.release_interval();
    loop {
        let n = bump(&shared.counters.display);
        if n % config::DISPLAY_PRINT_EVERY == 0 {
            console.status(&format!("-> The display was updated > {n} times"));
        }
        if budget.consume(ctx, config::DISPLAY_EXEC_TIME).is_err() {
            return;
        }
        if wait_next_release(ctx, interval).is_err() {
            return;
        }
    }
}

/// T2 — path generation: P = D(soft) = 20 ms, E = 3 ms.
///
/// Same driver shape as the display task, on a slower print cadence.
pub fn generate_path(ctx: &TaskContext, console: &dyn Console, shared: &GameShared) {
    let mut budget = ExecutionBudget::new();
    let interval = registry::PATH_SPEC.release_interval();
    loop {
        let n = bump(&shared.counters.path);
        if n % config::PATH_PRINT_EVERY == 0 {
            console.status(&format!("-> The path was updated > {n} times"));
        }
        if budget.consume(ctx, config::PATH_EXEC_TIME).is_err() {
            return;
        }
        if wait_next_release(ctx, interval).is_err() {
            return;
        }
    }
}

/// T4 — diamond spawning: P = D(soft) = 5 s, E = 0.5 s.
///
/// Burns its (large) claimed execution time first, then announces the
/// diamond — one line per release.
pub fn spawn_diamond(ctx: &TaskContext, console: &dyn Console) {
    let mut budget = ExecutionBudget::new();
    let interval = registry::DIAMOND_SPEC.release_interval();
    loop {
        if budget.consume(ctx, config::DIAMOND_EXEC_TIME).is_err() {
            return;
        }
        console.status("-> New diamond!!");
        if wait_next_release(ctx, interval).is_err() {
            return;
        }
    }
}

/// T3 — player input: sporadic, polls every `INPUT_POLL_INTERVAL` ticks.
///
/// ESC raises the game-over flag; space toggles the ball direction.
/// Anything else is ignored, and an empty poll is the common case, not
/// an error. Highest priority in the task set, so its response latency
/// is bounded by the polling interval itself.
pub fn player_input(ctx: &TaskContext, console: &dyn Console, shared: &GameShared) {
    loop {
        match console.poll_key() {
            Some(Key::Escape) => {
                trace!("escape pressed, ball drops");
                shared.flags.set_game_over(true);
            }
            Some(Key::Space) => {
                let direction = shared.flags.toggle_direction();
                console.status(&format!("Switching ball direction to > {direction}"));
            }
            Some(Key::Other(_)) | None => {}
        }
        if ctx.delay(config::INPUT_POLL_INTERVAL).is_err() {
            return;
        }
    }
}

/// T5 — end-of-game check: P = D(hard) = 5 ms, E = 1 ms.
///
/// Runs the match state machine. While `Playing` it counts iterations
/// and prints a heartbeat every 200th. When it observes the game-over
/// flag it moves to `Ended`: prints the two fixed end-of-game lines,
/// then parks in a kernel blocking region for the restart/quit prompt —
/// the one place the periodic contract is intentionally suspended.
/// Restart resets the shared state and returns to `Playing`; quit tears
/// the scheduler down.
pub fn end_check(ctx: &TaskContext, console: &dyn Console, shared: &GameShared) {
    let mut budget = ExecutionBudget::new();
    let interval = registry::END_CHECK_SPEC.release_interval();
    let mut phase = MatchPhase::Playing;
    loop {
        if budget.consume(ctx, config::END_CHECK_EXEC_TIME).is_err() {
            return;
        }
        // Anchor before the phase handling: a restart prompt can block
        // for a long time, and the next release is measured from here.
        let mut last_wake = ctx.current_tick();

        if phase == MatchPhase::Playing && shared.flags.game_over() {
            phase = MatchPhase::Ended;
        }

        match phase {
            MatchPhase::Playing => {
                let n = bump(&shared.counters.end_check);
                if n % config::END_CHECK_PRINT_EVERY == 0 {
                    console.status(&format!("-> End of game checked > {n} times"));
                }
            }
            MatchPhase::Ended => {
                console.status("### The ball dropped ###");
                console.status("### GAME OVER ###");

                match ctx.blocking_region(|| console.end_prompt()) {
                    Ok(EndChoice::Restart) => {
                        console.clear_screen();
                        console.status("## NEW MATCH ##");
                        shared.reset_for_new_match();
                        phase = MatchPhase::Playing;
                    }
                    Ok(EndChoice::Quit) => {
                        console.status("## See you next time ;) ##");
                        // Leave the farewell on screen for a beat before
                        // everything stops.
                        let _ = ctx.delay(config::QUIT_LINGER);
                        ctx.end_scheduler();
                        return;
                    }
                    Err(SchedulerStopped) => return,
                }
            }
        }

        if ctx.delay_until(&mut last_wake, interval).is_err() {
            return;
        }
    }
}
