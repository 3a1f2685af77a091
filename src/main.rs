//! ZigZag demo binary: startup menu, then the five game tasks under the
//! real-time kernel until the player quits at the end-of-game prompt.

use std::io;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use zigzag_rt::console::{self, Console, StdConsole};
use zigzag_rt::kernel::{Kernel, RunMode};
use zigzag_rt::registry;
use zigzag_rt::state::GameShared;

fn main() -> anyhow::Result<()> {
    // Scheduler internals are on RUST_LOG (e.g. RUST_LOG=zigzag_rt=debug);
    // game output goes straight to stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let console = Arc::new(StdConsole::new());

    {
        let stdin = io::stdin();
        let stdout = io::stdout();
        console::start_menu(&mut stdin.lock(), &mut stdout.lock())
            .context("startup menu failed")?;
    }
    console.clear_screen();

    let kernel = Kernel::new(RunMode::RealTime);
    let shared = Arc::new(GameShared::new());
    registry::spawn_game_tasks(&kernel, console, shared)
        .context("failed to register game tasks")?;

    kernel.start().context("scheduler failed")?;
    Ok(())
}
