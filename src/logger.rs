//! Terminal output for the `forge` binary and the build.
//!
//! - `log!` / `debug!` for prefixed terminal output
//! - `ProgressLine` for the build's single-line counters
//!
//! ```ignore
//! log!("build"; "wrote {} artifacts", stats.written);
//!
//! let progress = ProgressLine::new(&[("packages", 2), ("files", 40)]);
//! progress.inc("files");
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::{AnsiColors, OwoColorize};
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// `forge --verbose`
static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Whether `debug!` output is shown.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Lines a live [`ProgressLine`] occupies below the log output.
static PROGRESS_LINES: AtomicUsize = AtomicUsize::new(0);

// ============================================================================
// Log Macro
// ============================================================================

/// `log!("glob"; "{} files", n)` prints `[glob] 3 files`.
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Like [`log!`], but silent unless `--verbose` is set.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Output
// ============================================================================

/// Write `message` under a colored `[module]` tag.
///
/// While a progress line is active it is moved below the message.
#[allow(clippy::cast_possible_truncation)] // at most one progress line
pub fn log(module: &str, message: &str) {
    let tag = colorize_prefix(module);
    let lines_below = PROGRESS_LINES.load(Ordering::SeqCst);

    let mut out = stdout().lock();
    if lines_below == 0 {
        execute!(out, Clear(ClearType::UntilNewLine)).ok();
    } else {
        execute!(
            out,
            cursor::MoveUp(lines_below as u16),
            Clear(ClearType::FromCursorDown)
        )
        .ok();
    }
    writeln!(out, "{tag} {message}").ok();
    for _ in 0..lines_below {
        writeln!(out).ok();
    }
    out.flush().ok();
}

/// Tag color by log area: lookups blue, globbing and packages cyan,
/// configuration magenta, failures red, builds yellow.
fn tag_color(module: &str) -> AnsiColors {
    match module.to_ascii_lowercase().as_str() {
        "serve" | "resolve" => AnsiColors::BrightBlue,
        "package" | "packages" | "glob" => AnsiColors::BrightCyan,
        "config" | "warn" => AnsiColors::BrightMagenta,
        "error" => AnsiColors::BrightRed,
        _ => AnsiColors::BrightYellow,
    }
}

fn colorize_prefix(module: &str) -> String {
    format!("[{module}]").color(tag_color(module)).bold().to_string()
}

// ============================================================================
// ProgressLine
// ============================================================================

/// Build counters redrawn in place on one line:
/// `[build] packages(1/2) files(120/371)`.
///
/// `inc` never blocks; a redraw is skipped while another thread draws.
pub struct ProgressLine {
    counters: Vec<Counter>,
    lock: Mutex<()>,
}

struct Counter {
    name: &'static str,
    total: usize,
    current: AtomicUsize,
}

impl ProgressLine {
    /// Start a progress line. Counters with a zero total are left out.
    pub fn new(items: &[(&'static str, usize)]) -> Self {
        let counters = items
            .iter()
            .filter(|&&(_, total)| total > 0)
            .map(|&(name, total)| Counter {
                name,
                total,
                current: AtomicUsize::new(0),
            })
            .collect();
        PROGRESS_LINES.store(1, Ordering::SeqCst);

        let progress = Self {
            counters,
            lock: Mutex::new(()),
        };
        progress.draw(false);
        progress
    }

    pub fn inc(&self, name: &str) {
        let Some(counter) = self.counters.iter().find(|c| c.name == name) else {
            return;
        };
        counter.current.fetch_add(1, Ordering::Relaxed);
        if let Some(_guard) = self.lock.try_lock() {
            self.draw(false);
        }
    }

    /// Current count for `name`, if tracked.
    pub fn current(&self, name: &str) -> Option<usize> {
        self.counters
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.current.load(Ordering::Relaxed))
    }

    fn line(&self) -> String {
        let parts: Vec<_> = self
            .counters
            .iter()
            .map(|c| format!("{}({}/{})", c.name, c.current.load(Ordering::Relaxed), c.total))
            .collect();
        parts.join(" ")
    }

    /// Redraw the line; `keep` ends it with a newline so it stays on screen.
    fn draw(&self, keep: bool) {
        let text = format!("{} {}", colorize_prefix("build"), self.line());
        let mut out = stdout().lock();
        execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        if keep {
            writeln!(out, "{text}").ok();
        } else {
            write!(out, "{text}").ok();
        }
        out.flush().ok();
    }

    /// Leave the final counts on screen.
    pub fn finish(self) {
        PROGRESS_LINES.store(0, Ordering::SeqCst);
        {
            let _guard = self.lock.lock();
            self.draw(true);
        }
        // Drop would erase the line just kept
        std::mem::forget(self);
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        PROGRESS_LINES.store(0, Ordering::SeqCst);
        let mut out = stdout().lock();
        execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        out.flush().ok();
    }
}

// ============================================================================
// Tests
// ============================================================================
