//! The compiler-internal error taxonomy (spec §7).
//!
//! The specification names eleven internal outcomes: `Success, Memory,
//! Option, Full, IO, Busy, Closed, Thread, Shell, User, Undefined`. In an
//! idiomatic Rust binding, four of those are not distinct error variants:
//!
//! - `Success` is `Result::Ok(())`, not an error at all.
//! - `Option` is `std::option::Option::None`, used directly rather than
//!   boxed into an error.
//! - `Full` never surfaces: the bounded channel (spec §4.2) blocks on send
//!   rather than returning a "full" error.
//! - `Busy` has no caller in this front-end (it belongs to collaborators
//!   out of scope, such as a lock-striped registry).
//!
//! The remaining seven become [`LemError`], following this codebase's own
//! hand-rolled `Display`/`Error`/`From` convention (no `thiserror`) rather
//! than a derive macro.

use std::fmt;

/// Compiler-internal failure, independent of which compiler phase raised it.
#[derive(Debug, Clone)]
pub enum LemError {
    /// Arena or heap allocation could not be satisfied.
    Memory(String),
    /// A source file could not be opened or read.
    Io(String),
    /// A bounded channel was used after being closed.
    Closed,
    /// A scanner or parser thread failed to spawn or could not be joined.
    Thread(String),
    /// The REPL's `$`-escape failed to launch or wait on the host shell.
    Shell(String),
    /// A source file's diagnostics accumulated past zero; reported to the
    /// user rather than the operator.
    User(String),
    /// An invariant the implementation believed could not fail, did.
    Undefined(String),
}

impl fmt::Display for LemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LemError::Memory(e) => write!(f, "out of memory: {}", e),
            LemError::Io(e) => write!(f, "IO error: {}", e),
            LemError::Closed => write!(f, "operation on a closed channel"),
            LemError::Thread(e) => write!(f, "thread error: {}", e),
            LemError::Shell(e) => write!(f, "shell error: {}", e),
            LemError::User(e) => write!(f, "{}", e),
            LemError::Undefined(e) => write!(f, "internal error: {}", e),
        }
    }
}

impl std::error::Error for LemError {}

impl From<std::io::Error> for LemError {
    fn from(e: std::io::Error) -> Self {
        LemError::Io(e.to_string())
    }
}

/// Alias for `std::result::Result<T, LemError>`.
pub type Result<T> = std::result::Result<T, LemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_error_display_is_bare_message() {
        let err = LemError::User("x redeclared; previously declared on line 1".into());
        assert_eq!(
            err.to_string(),
            "x redeclared; previously declared on line 1"
        );
    }

    #[test]
    fn io_error_converts_via_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let lem: LemError = io_err.into();
        assert!(matches!(lem, LemError::Io(_)));
    }
}
