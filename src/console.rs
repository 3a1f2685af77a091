//! # Console Collaborator
//!
//! Thin wrappers over terminal I/O, behind the [`Console`] trait so the
//! task bodies never touch stdin/stdout directly. [`StdConsole`] is the
//! real thing (raw-mode keyboard polling via termios, blocking prompts
//! on stdin); [`ScriptedConsole`] is the deterministic stand-in used by
//! the end-to-end scenario tests, which records every status line and
//! replays queued keys and prompt answers.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::sync;

// ---------------------------------------------------------------------------
// Keys and prompt choices
// ---------------------------------------------------------------------------

/// A keystroke as seen by the player-input task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// ESC — the ball drops, the match is over.
    Escape,
    /// Space bar — toggle the ball direction.
    Space,
    /// Anything else, ignored.
    Other(u8),
}

impl Key {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            27 => Key::Escape,
            b' ' => Key::Space,
            other => Key::Other(other),
        }
    }
}

/// Answer to the end-of-game prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndChoice {
    /// `1` — reset counters and play another match.
    Restart,
    /// `0` — tear the scheduler down and exit.
    Quit,
}

// ---------------------------------------------------------------------------
// Console trait
// ---------------------------------------------------------------------------

/// The console surface the tasks talk to.
pub trait Console: Send + Sync {
    /// Emit one status line.
    fn status(&self, line: &str);

    /// Clear the screen (match restart, menu redraw).
    fn clear_screen(&self);

    /// Non-blocking keyboard poll: one pending keystroke, if any.
    fn poll_key(&self) -> Option<Key>;

    /// Blocking end-of-game prompt. Implementations re-prompt on invalid
    /// input and only ever return a valid choice.
    fn end_prompt(&self) -> EndChoice;
}

// ---------------------------------------------------------------------------
// Real terminal
// ---------------------------------------------------------------------------

/// Console backed by the process's controlling terminal.
#[derive(Debug, Default)]
pub struct StdConsole;

impl StdConsole {
    pub fn new() -> Self {
        Self
    }

    /// Read one byte from stdin without blocking and without echo.
    ///
    /// Canonical mode and echo are switched off only for the duration of
    /// the read; the previous termios settings are restored before
    /// returning, so the blocking prompts still see a line-buffered
    /// terminal.
    fn read_byte_nonblocking() -> Option<u8> {
        let fd = libc::STDIN_FILENO;
        // Not a terminal (piped stdin, CI): nothing to poll.
        if unsafe { libc::isatty(fd) } == 0 {
            return None;
        }

        let mut saved: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &mut saved) } != 0 {
            return None;
        }

        let mut raw = saved;
        raw.c_lflag &= !(libc::ICANON | libc::ECHO);
        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = 0;
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &raw) } != 0 {
            return None;
        }

        let mut byte: u8 = 0;
        let n = unsafe { libc::read(fd, &mut byte as *mut u8 as *mut libc::c_void, 1) };
        unsafe { libc::tcsetattr(fd, libc::TCSANOW, &saved) };

        (n == 1).then_some(byte)
    }
}

impl Console for StdConsole {
    fn status(&self, line: &str) {
        // Lines come from several task threads; serialize whole lines.
        sync::critical_section(|| {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{line}");
            let _ = out.flush();
        });
    }

    fn clear_screen(&self) {
        sync::critical_section(|| {
            let mut out = io::stdout().lock();
            let _ = write!(out, "\x1b[2J\x1b[H");
            let _ = out.flush();
        });
    }

    fn poll_key(&self) -> Option<Key> {
        Self::read_byte_nonblocking().map(Key::from_byte)
    }

    fn end_prompt(&self) -> EndChoice {
        let stdin = io::stdin();
        loop {
            self.status("## To play again press - 1 - ##");
            self.status("## To quit the game press - 0 - ##");

            let mut answer = String::new();
            match stdin.lock().read_line(&mut answer) {
                // EOF: no way to ask again, leave cleanly.
                Ok(0) => return EndChoice::Quit,
                Ok(_) => match answer.trim() {
                    "1" => return EndChoice::Restart,
                    "0" => return EndChoice::Quit,
                    // Invalid entry: re-prompt.
                    _ => continue,
                },
                Err(_) => return EndChoice::Quit,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Scripted console (tests / offline simulation)
// ---------------------------------------------------------------------------

/// Deterministic console: queued keys and prompt answers in, recorded
/// status lines out.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    keys: Mutex<VecDeque<Key>>,
    choices: Mutex<VecDeque<EndChoice>>,
    lines: Mutex<Vec<String>>,
    clears: AtomicU32,
}

impl ScriptedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a keystroke for a future `poll_key`.
    pub fn push_key(&self, key: Key) {
        self.keys.lock().unwrap_or_else(|e| e.into_inner()).push_back(key);
    }

    /// Queue an answer for a future `end_prompt`. An empty queue answers
    /// `Quit`, so a mis-scripted test tears down instead of hanging.
    pub fn push_choice(&self, choice: EndChoice) {
        self.choices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(choice);
    }

    /// Every status line emitted so far, in order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of lines containing `needle`.
    pub fn count_lines_containing(&self, needle: &str) -> usize {
        self.lines()
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }

    /// Number of screen clears.
    pub fn clear_count(&self) -> u32 {
        self.clears.load(Ordering::Relaxed)
    }
}

impl Console for ScriptedConsole {
    fn status(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line.to_string());
    }

    fn clear_screen(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }

    fn poll_key(&self) -> Option<Key> {
        self.keys
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
    }

    fn end_prompt(&self) -> EndChoice {
        self.choices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(EndChoice::Quit)
    }
}

// ---------------------------------------------------------------------------
// Startup menu
// ---------------------------------------------------------------------------

const BANNER_RULE: &str =
    "-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-";

/// Render the startup menu and block until the player enters `1`.
/// Any other entry redraws the menu and asks again.
pub fn start_menu(input: &mut impl BufRead, output: &mut impl Write) -> io::Result<()> {
    loop {
        writeln!(output, "{BANNER_RULE}")?;
        writeln!(output, "----------------------------   ZigZag   -----------------------------")?;
        writeln!(output, "{BANNER_RULE}")?;
        writeln!(output, "-> To start the match press - 1 -")?;
        writeln!(output, "{BANNER_RULE}")?;
        write!(output, "-> Type here: ")?;
        output.flush()?;

        let mut entry = String::new();
        if input.read_line(&mut entry)? == 0 {
            // EOF before the game even started.
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
        }
        if entry.trim() == "1" {
            break;
        }
    }

    writeln!(output, "{BANNER_RULE}")?;
    writeln!(output, "-> To switch the ball direction press the - space bar -")?;
    writeln!(output, "{BANNER_RULE}")?;
    writeln!(output, "---------------------------- Good game ;p ----------------------------")?;
    output.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_mapping() {
        assert_eq!(Key::from_byte(27), Key::Escape);
        assert_eq!(Key::from_byte(b' '), Key::Space);
        assert_eq!(Key::from_byte(b'x'), Key::Other(b'x'));
    }

    #[test]
    fn start_menu_accepts_one() {
        let mut input = io::Cursor::new(b"1\n".to_vec());
        let mut output = Vec::new();
        start_menu(&mut input, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("ZigZag"));
        assert!(text.contains("space bar"));
    }

    #[test]
    fn start_menu_reprompts_on_invalid_entry() {
        let mut input = io::Cursor::new(b"7\nbanana\n1\n".to_vec());
        let mut output = Vec::new();
        start_menu(&mut input, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        // Three renders of the "press - 1 -" line.
        assert_eq!(text.matches("press - 1 -").count(), 3);
    }

    #[test]
    fn scripted_console_replays_in_order() {
        let console = ScriptedConsole::new();
        console.push_key(Key::Space);
        console.push_key(Key::Escape);
        assert_eq!(console.poll_key(), Some(Key::Space));
        assert_eq!(console.poll_key(), Some(Key::Escape));
        assert_eq!(console.poll_key(), None);

        console.push_choice(EndChoice::Restart);
        assert_eq!(console.end_prompt(), EndChoice::Restart);
        // Empty queue defaults to Quit.
        assert_eq!(console.end_prompt(), EndChoice::Quit);
    }
}
