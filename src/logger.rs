//! Terminal output.
//!
//! Every line carries a bracketed, colored module tag:
//!
//! ```text
//! [styles] 4 written
//! [deploy] 12 files to ftp://deploy@example.com/public_html (curl)
//! ```
//!
//! `debug!` lines are dropped unless `--verbose` was given. Failure reports
//! go to stderr; watch mode rewrites a single status block in place.

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::io::{Write, stderr, stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static VERBOSE: AtomicBool = AtomicBool::new(false);

static STATUS: Mutex<WatchStatus> = parking_lot::const_mutex(WatchStatus::new());

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// `log!("styles"; "{} written", n)`
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {
        $crate::logger::log($module, &format!($($arg)*))
    };
}

/// Like [`log!`], printed only with `--verbose`.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    };
}

pub fn log(module: &str, message: &str) {
    let tag = tag(module);
    let mut out = stdout().lock();
    execute!(out, Clear(ClearType::UntilNewLine)).ok();
    writeln!(out, "{tag} {message}").ok();
    out.flush().ok();
}

/// Colored `[module]` tag; stage names fall through to yellow.
fn tag(module: &str) -> String {
    let text = format!("[{module}]");
    match module {
        "watch" => text.bright_green().bold().to_string(),
        "deploy" | "package" | "clean" => text.bright_blue().bold().to_string(),
        "task" | "config" => text.bright_magenta().bold().to_string(),
        "error" => text.bright_red().bold().to_string(),
        _ => text.bright_yellow().bold().to_string(),
    }
}

/// Print the failure block for one input file to stderr.
///
/// ```text
/// ------------------------------------------------------------
/// TASK: [styles/compile]
/// PROB: Undefined variable.
/// FILE: src/styles/main.scss
/// LINE: 12
/// ------------------------------------------------------------
/// ```
pub fn report_failure(task: &str, problem: &str, file: &str, line: Option<usize>) {
    let rule = "-".repeat(60);
    let mut fields = vec![
        ("TASK:", format!("[{task}]")),
        ("PROB:", problem.to_string()),
        ("FILE:", file.to_string()),
    ];
    if let Some(line) = line {
        fields.push(("LINE:", line.to_string()));
    }

    let mut err = stderr().lock();
    writeln!(err, "{rule}").ok();
    for (label, value) in fields {
        writeln!(err, "{} {value}", label.white().on_red()).ok();
    }
    writeln!(err, "{rule}").ok();
}

/// Watch-mode status block, redrawn over the previous one.
pub struct WatchStatus {
    /// Height of the block currently on screen
    drawn: usize,
}

impl WatchStatus {
    pub const fn new() -> Self {
        Self { drawn: 0 }
    }

    fn show(&mut self, ok: bool, summary: &str, detail: &str) {
        let mark = if ok {
            "✓".green().to_string()
        } else {
            "✗".red().to_string()
        };
        let body = if detail.is_empty() {
            summary.to_string()
        } else {
            format!("{summary}\n{detail}")
        };

        let mut out = stdout().lock();
        if let Ok(up) = u16::try_from(self.drawn)
            && up > 0
        {
            execute!(out, cursor::MoveUp(up), Clear(ClearType::FromCursorDown)).ok();
        }
        writeln!(out, "{} {mark} {body}", format!("[{}]", clock()).dimmed()).ok();
        out.flush().ok();

        self.drawn = height(&body);
    }
}

fn height(text: &str) -> usize {
    text.lines().count().max(1)
}

/// UTC wall clock as `HH:MM:SS`.
fn clock() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600 % 24,
        secs / 60 % 60,
        secs % 60
    )
}

pub fn status_success(message: &str) {
    STATUS.lock().show(true, message, "");
}

pub fn status_error(summary: &str, detail: &str) {
    STATUS.lock().show(false, summary, detail);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_height() {
        assert_eq!(height(""), 1);
        assert_eq!(height("styles: 3 written"), 1);
        assert_eq!(height("styles: 1 failed\nsrc/styles/a.scss: expected \";\""), 2);
    }

    #[test]
    fn test_new_status_has_nothing_drawn() {
        assert_eq!(WatchStatus::new().drawn, 0);
    }

    #[test]
    fn test_clock_format() {
        let now = clock();
        assert_eq!(now.len(), 8);
        assert_eq!(now.matches(':').count(), 2);
    }

    #[test]
    fn test_verbose_toggle() {
        set_verbose(true);
        assert!(is_verbose());
        set_verbose(false);
        assert!(!is_verbose());
    }
}
