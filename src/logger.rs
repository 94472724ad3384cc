//! Logging utilities with colored output and progress display.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - [`Scope`] for nested output (subprocess stderr, result warnings) that
//!   carries its own prefix and style instead of relying on ambient state
//! - [`ProgressLine`] for single-line progress display while actions run
//!
//! # Example
//!
//! ```ignore
//! log!("build"; "resolved {} actions", count);
//!
//! let stderr = Scope::root().nested("  :stderr: ").styled(Style::Dim);
//! stderr.line("Deprecation warning: ...");
//!
//! let progress = ProgressLine::new(&[("actions", 42)]);
//! progress.inc("actions");
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::{OwoColorize, Stream};
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Active progress bar count (for log coordination)
static BAR_COUNT: AtomicUsize = AtomicUsize::new(0);

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);
    write_line(&format!("{prefix} {message}"));
}

/// Write one line, keeping an active progress line at the bottom.
fn write_line(line: &str) {
    let mut stdout = stdout().lock();

    let bar_count = BAR_COUNT.load(Ordering::SeqCst);
    if bar_count > 0 {
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
    }

    writeln!(stdout, "{line}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    let painted = prefix.if_supports_color(Stream::Stdout, |p| match module_lower {
        "build" | "done" => p.bright_green().bold().to_string(),
        "error" | "conflict" | "forgotten" => p.bright_red().bold().to_string(),
        "run" | "scss" => p.bright_blue().bold().to_string(),
        _ => p.bright_yellow().bold().to_string(),
    });
    painted.to_string()
}

// ============================================================================
// Scoped output
// ============================================================================

/// Text style applied to a whole scoped line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Style {
    #[default]
    Plain,
    Dim,
    Red,
    Yellow,
}

impl Style {
    /// Paint `text` with this style.
    pub fn paint(self, text: &str) -> String {
        let painted = text.if_supports_color(Stream::Stdout, |t| match self {
            Self::Plain => t.to_string(),
            Self::Dim => t.dimmed().to_string(),
            Self::Red => t.red().to_string(),
            Self::Yellow => t.yellow().to_string(),
        });
        painted.to_string()
    }
}

/// Explicit handle for nested output.
///
/// A scope carries the accumulated prefix and the style of its lines, and is
/// passed to whatever needs to print nested under some other output. Scopes
/// are plain values, so worker threads can print concurrently without sharing
/// any mutable logging state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    prefix: String,
    style: Style,
}

impl Scope {
    /// Scope with no prefix and no style.
    pub fn root() -> Self {
        Self::default()
    }

    /// Child scope whose prefix is this scope's prefix followed by `prefix`.
    pub fn nested(&self, prefix: &str) -> Self {
        Self {
            prefix: format!("{}{}", self.prefix, prefix),
            style: self.style,
        }
    }

    /// Replace the style of this scope.
    pub fn styled(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Nesting prefix of this scope.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Render a message the way [`Scope::line`] prints it.
    pub fn render(&self, message: &str) -> String {
        self.style.paint(&format!("{}{}", self.prefix, message))
    }

    /// Print a single message in this scope.
    pub fn line(&self, message: &str) {
        write_line(&self.render(message));
    }

    /// Print every line of `text` in this scope, skipping blank lines.
    pub fn lines(&self, text: &str) {
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            self.line(line);
        }
    }
}

// ============================================================================
// Progress Line (single-line counters)
// ============================================================================

/// Single-line progress display with multiple counters
///
/// Displays: `[build] actions(42/69)`
///
/// All counters update in place on the same line. Uses `try_lock` to avoid
/// blocking worker threads - if display is busy, the update is skipped
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
    /// Create a new build progress display.
    ///
    /// Only includes counters with total > 0.
    pub fn new(items: &[(&'static str, usize)]) -> Self {
        let counters: Vec<_> = items
            .iter()
            .filter(|(_, total)| *total > 0)
            .map(|(name, total)| Counter {
                name,
                total: *total,
                current: AtomicUsize::new(0),
            })
            .collect();

        BAR_COUNT.store(1, Ordering::SeqCst);

        let progress = Self {
            counters,
            lock: Mutex::new(()),
        };
        progress.display(false);
        progress
    }

    /// Increment the counter with the given name.
    ///
    /// Non-blocking: if display lock is held, skips refresh.
    #[inline]
    pub fn inc(&self, name: &str) {
        for counter in &self.counters {
            if counter.name == name {
                counter.current.fetch_add(1, Ordering::Relaxed);
                if self.lock.try_lock().is_some() {
                    self.display(false);
                }
                return;
            }
        }
    }

    fn render(&self) -> String {
        let parts: Vec<_> = self
            .counters
            .iter()
            .map(|c| format!("{}({}/{})", c.name, c.current.load(Ordering::Relaxed), c.total))
            .collect();
        format!("{} {}", colorize_prefix("build", "build"), parts.join(" "))
    }

    /// Overwrite the current line with the counters.
    fn display(&self, newline: bool) {
        let line = self.render();
        let mut stdout = stdout().lock();
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
        if newline {
            writeln!(stdout, "{line}").ok();
        } else {
            write!(stdout, "{line}").ok();
        }
        stdout.flush().ok();
    }

    /// Finish progress display, preserve line and move to next line.
    pub fn finish(self) {
        BAR_COUNT.store(0, Ordering::SeqCst);

        {
            let _guard = self.lock.lock();
            self.display(true);
        }

        std::mem::forget(self); // Prevent Drop from clearing
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        BAR_COUNT.store(0, Ordering::SeqCst);

        let mut stdout = stdout().lock();
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
        stdout.flush().ok();
    }
}

// ============================================================================
// Tests
// ============================================================================
