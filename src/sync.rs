//! # Synchronization Primitives
//!
//! Process-wide critical section used to keep multi-line console output
//! from interleaving across task threads. On an embedded kernel the
//! analogue is a critical section with interrupts masked; on the host a
//! plain mutex gives the same whole-operation atomicity.

use std::sync::{Mutex, MutexGuard};

static CRITICAL: Mutex<()> = Mutex::new(());

/// Execute a closure within the process-wide critical section.
///
/// Keep the body short: every task thread printing a status line passes
/// through here.
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard: MutexGuard<'_, ()> = CRITICAL.lock().unwrap_or_else(|e| e.into_inner());
    f()
}
