//! The diagnostic log (spec §5, §7).
//!
//! A single bounded ring buffer, guarded by a mutex: writers append,
//! readers flush. Auto-flush happens when the buffer is full, when an
//! `Error`-severity diagnostic arrives, or when the caller asks explicitly.
//! Severities map onto spec §7's `Error, Warning, Advice`.
//!
//! Every user error carries an optional file name, an optional line number,
//! and a message (spec §7). Content and ordering are deterministic given
//! identical inputs; only color codes vary with the caller's settings.

use crate::style::Style;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Severity of a user-facing diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Advice,
}

/// One user-facing diagnostic: an optional file, an optional line, and a
/// message, per spec §7's "user-facing contract".
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            file: None,
            line: None,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            file: None,
            line: None,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn advice(message: impl Into<String>) -> Self {
        Diagnostic {
            file: None,
            line: None,
            severity: Severity::Advice,
            message: message.into(),
        }
    }

    /// Renders one line, ANSI-colored by severity, matching spec §6's
    /// red/yellow/green convention.
    pub fn render(&self, colored: bool) -> String {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Advice => "advice",
        };
        let label = if colored {
            match self.severity {
                Severity::Error => Style::bold_red(label),
                Severity::Warning => Style::yellow(label),
                Severity::Advice => Style::green(label),
            }
        } else {
            label.to_string()
        };

        let mut location = String::new();
        if let Some(file) = &self.file {
            location.push_str(file);
            if let Some(line) = self.line {
                location.push(':');
                location.push_str(&line.to_string());
            }
            location.push_str(": ");
        } else if let Some(line) = self.line {
            location.push_str(&format!("line {}: ", line));
        }

        format!("{}: {}{}", label, location, self.message)
    }
}

/// A fixed-capacity, thread-safe ring buffer of [`Diagnostic`]s.
///
/// Writers append via [`DiagnosticLog::push`]; readers drain via
/// [`DiagnosticLog::flush`]. The buffer auto-flushes to stderr when full or
/// when an `Error`-severity diagnostic arrives, so a long-running REPL
/// session never silently drops a fatal message.
pub struct DiagnosticLog {
    capacity: usize,
    colored: bool,
    entries: Mutex<VecDeque<Diagnostic>>,
}

impl DiagnosticLog {
    pub fn new(capacity: usize, colored: bool) -> Self {
        DiagnosticLog {
            capacity,
            colored,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Appends a diagnostic, auto-flushing if the buffer is now full or the
    /// diagnostic is an error.
    pub fn push(&self, diagnostic: Diagnostic) {
        let is_error = diagnostic.severity == Severity::Error;
        let full = {
            let mut entries = self.entries.lock().expect("diagnostic log poisoned");
            entries.push_back(diagnostic);
            entries.len() >= self.capacity
        };
        if full || is_error {
            self.flush();
        }
    }

    /// Drains every buffered diagnostic to stderr, oldest first.
    pub fn flush(&self) {
        let mut entries = self.entries.lock().expect("diagnostic log poisoned");
        for diagnostic in entries.drain(..) {
            eprintln!("{}", diagnostic.render(self.colored));
        }
    }

    /// Number of diagnostics currently buffered (for tests).
    pub fn len(&self) -> usize {
        self.entries.lock().expect("diagnostic log poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new(256, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_buffers_without_flushing_on_warning() {
        let log = DiagnosticLog::new(8, false);
        log.push(Diagnostic::warning("unused import"));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn push_auto_flushes_on_error() {
        let log = DiagnosticLog::new(8, false);
        log.push(Diagnostic::error("x undeclared"));
        assert_eq!(log.len(), 0);
    }

    #[test]
    fn push_auto_flushes_when_full() {
        let log = DiagnosticLog::new(2, false);
        log.push(Diagnostic::advice("a"));
        log.push(Diagnostic::advice("b"));
        assert_eq!(log.len(), 0);
    }

    #[test]
    fn render_includes_file_and_line() {
        let d = Diagnostic::error("i32 was not declared before use")
            .with_file("root.lem")
            .with_line(2);
        let rendered = d.render(false);
        assert!(rendered.contains("root.lem:2"));
        assert!(rendered.contains("i32 was not declared before use"));
    }
}
