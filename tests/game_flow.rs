//! End-to-end match scenarios on the simulated clock, with the console
//! replaced by a scripted double. Keystrokes go in as a queue, status
//! lines come out as a transcript, and the assertions are on counts and
//! ordering of transcript lines rather than on wall time.

use std::sync::{Arc, Mutex};

use zigzag_rt::config;
use zigzag_rt::console::{Console, EndChoice, Key, ScriptedConsole};
use zigzag_rt::kernel::{Kernel, RunMode};
use zigzag_rt::registry;
use zigzag_rt::state::GameShared;
use zigzag_rt::tasks;

fn index_of(lines: &[String], needle: &str) -> Option<usize> {
    lines.iter().position(|line| line.contains(needle))
}

/// Released simultaneously at tick 0, the five game tasks run strictly
/// in priority order: input, end-check, display, path, diamond.
#[test]
fn simultaneous_release_runs_in_priority_order() {
    let kernel = Kernel::new(RunMode::Simulated);
    let order = Arc::new(Mutex::new(Vec::new()));

    let names_and_priorities = [
        ("spawn-diamond", config::DIAMOND_PRIORITY),
        ("generate-path", config::PATH_PRIORITY),
        ("player-input", config::INPUT_PRIORITY),
        ("display-update", config::DISPLAY_PRIORITY),
        ("end-check", config::END_CHECK_PRIORITY),
    ];
    for (name, priority) in names_and_priorities {
        let record = Arc::clone(&order);
        kernel
            .create_task(name, priority, move |_ctx| {
                record.lock().unwrap().push(name);
            })
            .unwrap();
    }
    kernel.start().unwrap();

    let order = order.lock().unwrap();
    assert_eq!(
        *order,
        vec![
            "player-input",
            "end-check",
            "display-update",
            "generate-path",
            "spawn-diamond",
        ]
    );
}

/// A quiet match horizon: the display task alone, torn down after 1000
/// ticks. At one iteration per 13 ticks (3 ticks of work plus the
/// 10-tick re-arm) and a print every 50th iteration, exactly two
/// heartbeats fit in the window: iteration 0 at tick 0 and iteration 50
/// at tick 650.
#[test]
fn quiet_match_prints_two_display_heartbeats() {
    let kernel = Kernel::new(RunMode::Simulated);
    let console = Arc::new(ScriptedConsole::new());
    let shared = Arc::new(GameShared::new());

    {
        let console = Arc::clone(&console);
        let shared = Arc::clone(&shared);
        kernel
            .create_task(
                registry::DISPLAY_SPEC.name,
                registry::DISPLAY_SPEC.priority,
                move |ctx| tasks::display_update(ctx, &*console, &shared),
            )
            .unwrap();
    }
    kernel
        .create_task("horizon", 9, |ctx| {
            if ctx.delay(1000).is_ok() {
                ctx.end_scheduler();
            }
        })
        .unwrap();
    kernel.start().unwrap();

    assert_eq!(console.count_lines_containing("The display was updated"), 2);
    assert_eq!(console.count_lines_containing("> 0 times"), 1);
    assert_eq!(console.count_lines_containing("> 50 times"), 1);
}

/// Space toggles the ball direction on each poll, alternating from the
/// initial Left.
#[test]
fn space_toggles_direction_right_then_left() {
    let kernel = Kernel::new(RunMode::Simulated);
    let console = Arc::new(ScriptedConsole::new());
    let shared = Arc::new(GameShared::new());
    console.push_key(Key::Space);
    console.push_key(Key::Space);

    {
        let console = Arc::clone(&console);
        let shared = Arc::clone(&shared);
        kernel
            .create_task("player-input", config::INPUT_PRIORITY, move |ctx| {
                tasks::player_input(ctx, &*console, &shared)
            })
            .unwrap();
    }
    kernel
        .create_task("horizon", 1, |ctx| {
            if ctx.delay(100).is_ok() {
                ctx.end_scheduler();
            }
        })
        .unwrap();
    kernel.start().unwrap();

    assert_eq!(
        console.lines(),
        vec![
            "Switching ball direction to > Right".to_string(),
            "Switching ball direction to > Left".to_string(),
        ]
    );
}

/// ESC ends the match: the two fixed end-of-game lines appear exactly
/// once, the quit choice prints the farewell, and the scheduler tears
/// down (start returns). The end-check heartbeat never fires because the
/// match ends before its first counted iteration.
#[test]
fn escape_then_quit_ends_the_match_once() {
    let kernel = Kernel::new(RunMode::Simulated);
    let console = Arc::new(ScriptedConsole::new());
    let shared = Arc::new(GameShared::new());
    console.push_key(Key::Escape);
    console.push_choice(EndChoice::Quit);

    {
        let console = Arc::clone(&console);
        let shared = Arc::clone(&shared);
        kernel
            .create_task("player-input", config::INPUT_PRIORITY, move |ctx| {
                tasks::player_input(ctx, &*console, &shared)
            })
            .unwrap();
    }
    {
        let console = Arc::clone(&console);
        let shared = Arc::clone(&shared);
        kernel
            .create_task(
                registry::END_CHECK_SPEC.name,
                registry::END_CHECK_SPEC.priority,
                move |ctx| tasks::end_check(ctx, &*console, &shared),
            )
            .unwrap();
    }
    kernel.start().unwrap();

    assert_eq!(console.count_lines_containing("### The ball dropped ###"), 1);
    assert_eq!(console.count_lines_containing("### GAME OVER ###"), 1);
    assert_eq!(console.count_lines_containing("See you next time"), 1);
    assert_eq!(console.count_lines_containing("End of game checked"), 0);
}

/// Restart resets the match: ESC, restart, ESC again, quit. The end
/// lines appear twice, the new-match banner once, and the end-check
/// heartbeat proves the counter reset by printing its iteration-0 line
/// after the banner.
#[test]
fn escape_restart_escape_quit_resets_the_match() {
    let kernel = Kernel::new(RunMode::Simulated);
    let console = Arc::new(ScriptedConsole::new());
    let shared = Arc::new(GameShared::new());
    // First ESC is polled at tick 0, the second at the next 40-tick poll,
    // well into the restarted match.
    console.push_key(Key::Escape);
    console.push_key(Key::Escape);
    console.push_choice(EndChoice::Restart);
    console.push_choice(EndChoice::Quit);

    {
        let console = Arc::clone(&console);
        let shared = Arc::clone(&shared);
        kernel
            .create_task("player-input", config::INPUT_PRIORITY, move |ctx| {
                tasks::player_input(ctx, &*console, &shared)
            })
            .unwrap();
    }
    {
        let console = Arc::clone(&console);
        let shared = Arc::clone(&shared);
        kernel
            .create_task(
                registry::END_CHECK_SPEC.name,
                registry::END_CHECK_SPEC.priority,
                move |ctx| tasks::end_check(ctx, &*console, &shared),
            )
            .unwrap();
    }
    kernel.start().unwrap();

    let lines = console.lines();
    assert_eq!(console.count_lines_containing("### The ball dropped ###"), 2);
    assert_eq!(console.count_lines_containing("### GAME OVER ###"), 2);
    assert_eq!(console.count_lines_containing("## NEW MATCH ##"), 1);
    assert_eq!(console.count_lines_containing("See you next time"), 1);
    assert_eq!(console.clear_count(), 1);

    // The iteration-0 heartbeat after the banner is the reset evidence:
    // the counter went back to zero for the second match.
    assert_eq!(
        console.count_lines_containing("End of game checked > 0 times"),
        1
    );
    let banner = index_of(&lines, "## NEW MATCH ##").unwrap();
    let heartbeat = index_of(&lines, "End of game checked > 0 times").unwrap();
    assert!(heartbeat > banner);
}

/// Full task set smoke run: ESC at tick 0, quit at the prompt. The match
/// ends exactly once and both 20-ms tasks get their iteration-0
/// heartbeat out before teardown.
#[test]
fn full_task_set_plays_a_short_match() {
    let kernel = Kernel::new(RunMode::Simulated);
    let console = Arc::new(ScriptedConsole::new());
    let shared = Arc::new(GameShared::new());
    console.push_key(Key::Escape);
    console.push_choice(EndChoice::Quit);

    let handles = registry::spawn_game_tasks(
        &kernel,
        Arc::clone(&console) as Arc<dyn Console>,
        Arc::clone(&shared),
    )
    .unwrap();
    let ids = [
        handles.input.id(),
        handles.end_check.id(),
        handles.display.id(),
        handles.path.id(),
        handles.diamond.id(),
    ];
    for (i, id) in ids.iter().enumerate() {
        assert!(ids[i + 1..].iter().all(|other| other != id));
    }

    kernel.start().unwrap();

    assert_eq!(console.count_lines_containing("### The ball dropped ###"), 1);
    assert_eq!(console.count_lines_containing("### GAME OVER ###"), 1);
    assert_eq!(console.count_lines_containing("See you next time"), 1);
    assert!(console.count_lines_containing("The display was updated") >= 1);
    assert!(console.count_lines_containing("The path was updated") >= 1);
}
