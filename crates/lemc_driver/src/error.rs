//! The driver's top-level error, wrapping whichever phase aborted the run.
//!
//! Spec §6's exit code mapping (`IO -> 2`, `Parse`/`User -> 1`, `Cycle`/
//! `Graph -> 3`, `Symbol -> 4`, anything else -> `70`, the BSD `sysexits.h`
//! `EX_SOFTWARE` convention) is exposed here as [`DriverError::exit_code`] so
//! `apps/lemc_cli` doesn't need to know the shape of [`lemc_resolve::GraphError`].

use lemc_resolve::GraphError;
use std::fmt;

#[derive(Debug)]
pub enum DriverError {
    /// Failure during dependency discovery, parsing, or cycle detection.
    Graph(GraphError),
    /// A root file named on the command line could not be read at all,
    /// before the graph builder ever got a chance to report it.
    Io(String),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Graph(e) => write!(f, "{e}"),
            DriverError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DriverError {}

impl From<GraphError> for DriverError {
    fn from(e: GraphError) -> Self {
        DriverError::Graph(e)
    }
}

impl DriverError {
    /// Spec §6's external exit-code mapping (a [SUPPLEMENT], since spec.md
    /// itself only says "0 success, non-zero on any fatal error").
    pub fn exit_code(&self) -> i32 {
        match self {
            DriverError::Io(_) => 2,
            DriverError::Graph(GraphError::Io { .. }) => 2,
            DriverError::Graph(GraphError::Parse { .. }) => 1,
            DriverError::Graph(GraphError::Cycle { .. }) => 3,
        }
    }
}

/// The exit code a successful compile still reports when the symbol
/// resolver recorded at least one error-severity diagnostic.
pub const SYMBOL_ERROR_EXIT_CODE: i32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_failure_maps_to_sysexits_noinput() {
        let err: DriverError = GraphError::Io {
            path: "root.lem".into(),
            message: "not found".into(),
        }
        .into();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn cycle_maps_to_graph_exit_code() {
        let err: DriverError = GraphError::Cycle {
            parent: "a".into(),
            child: "b".into(),
        }
        .into();
        assert_eq!(err.exit_code(), 3);
    }
}
