//! # Shared Game State
//!
//! The flags and counters shared between the player-input task (writer)
//! and the periodic tasks (readers, plus the end-check task which also
//! resets everything on restart).
//!
//! All fields are atomics with `Relaxed` ordering: these are independent
//! flags and print-throttle counters, no other data is published through
//! them, so there is no happens-before edge to establish. The point of
//! using atomics at all is tear-freedom — cross-task visibility must not
//! hinge on platform word-atomicity assumptions.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

// ---------------------------------------------------------------------------
// Match phase
// ---------------------------------------------------------------------------

/// The two phases of a match, as observed by the end-check task.
///
/// `Playing → Ended` is triggered by the input task raising the
/// game-over flag; `Ended → Playing` by the restart choice at the
/// end-of-game prompt. Quitting from `Ended` tears the scheduler down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Playing,
    Ended,
}

// ---------------------------------------------------------------------------
// Ball direction
// ---------------------------------------------------------------------------

/// Direction the ball is zigzagging in. Toggled by the space bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallDirection {
    Left,
    Right,
}

impl core::fmt::Display for BallDirection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BallDirection::Left => f.write_str("Left"),
            BallDirection::Right => f.write_str("Right"),
        }
    }
}

const DIRECTION_LEFT: u8 = 0;
const DIRECTION_RIGHT: u8 = 1;

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// Cross-task game flags. Input task writes, end-check task reads (and
/// clears game-over on restart).
#[derive(Debug)]
pub struct GameFlags {
    game_over: AtomicBool,
    direction: AtomicU8,
}

impl GameFlags {
    pub const fn new() -> Self {
        Self {
            game_over: AtomicBool::new(false),
            direction: AtomicU8::new(DIRECTION_LEFT),
        }
    }

    pub fn game_over(&self) -> bool {
        self.game_over.load(Ordering::Relaxed)
    }

    pub fn set_game_over(&self, over: bool) {
        self.game_over.store(over, Ordering::Relaxed);
    }

    pub fn direction(&self) -> BallDirection {
        match self.direction.load(Ordering::Relaxed) {
            DIRECTION_RIGHT => BallDirection::Right,
            _ => BallDirection::Left,
        }
    }

    /// Flip the ball direction, returning the new one.
    pub fn toggle_direction(&self) -> BallDirection {
        // Single writer (the input task), so load-then-store is fine.
        let next = match self.direction() {
            BallDirection::Left => BallDirection::Right,
            BallDirection::Right => BallDirection::Left,
        };
        self.direction.store(
            match next {
                BallDirection::Left => DIRECTION_LEFT,
                BallDirection::Right => DIRECTION_RIGHT,
            },
            Ordering::Relaxed,
        );
        next
    }
}

impl Default for GameFlags {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Progress counters
// ---------------------------------------------------------------------------

/// Per-task iteration counters, used only to throttle status lines
/// (print every Nth iteration). Monotonic within a match, reset to zero
/// on restart.
#[derive(Debug)]
pub struct ProgressCounters {
    pub display: AtomicU32,
    pub path: AtomicU32,
    pub end_check: AtomicU32,
}

impl ProgressCounters {
    pub const fn new() -> Self {
        Self {
            display: AtomicU32::new(0),
            path: AtomicU32::new(0),
            end_check: AtomicU32::new(0),
        }
    }
}

impl Default for ProgressCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Fetch-and-increment helper for a throttle counter. Returns the value
/// *before* the increment (iteration 0 prints).
pub fn bump(counter: &AtomicU32) -> u32 {
    counter.fetch_add(1, Ordering::Relaxed)
}

// ---------------------------------------------------------------------------
// Shared bundle
// ---------------------------------------------------------------------------

/// Everything the five tasks share. One instance per game, behind an
/// `Arc`.
#[derive(Debug, Default)]
pub struct GameShared {
    pub flags: GameFlags,
    pub counters: ProgressCounters,
}

impl GameShared {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a new match: all progress counters back to zero and the
    /// game-over flag cleared. The ball direction is input state, not
    /// progress, and deliberately survives the restart.
    pub fn reset_for_new_match(&self) {
        self.counters.display.store(0, Ordering::Relaxed);
        self.counters.path.store(0, Ordering::Relaxed);
        self.counters.end_check.store(0, Ordering::Relaxed);
        self.flags.set_game_over(false);
    }
}
