//! lemc CLI
//!
//! Command-line interface and REPL for `lemc`, the front end for the lemon
//! systems language: scanning, parsing, dependency resolution, and symbol
//! resolution, with no code generation or execution behind it.
//!
//! # Usage
//!
//! | Invocation | Behavior |
//! |---|---|
//! | `lemc a.lem b.lem` | Compile each file as an independent root, report diagnostics, exit with the worst exit code |
//! | `lemc` | No files named: read modules interactively from stdin |
//! | `lemc -i a.lem` | Compile `a.lem`, then drop into the REPL |
//!
//! # Module Structure
//!
//! - [`cli`] - flag parsing, file-list dispatch, and the REPL loop
//!
//! # `--D*` Tracing
//!
//! `--Dopt`, `--Dpass`, `--Dtokens`, `--Dthread`, and `--Dall` gate internal
//! `log` tracing (see [`lemc_driver::Options`]); none of them affect the
//! user-facing diagnostics printed to stderr.

pub mod cli;

pub use cli::run_cli;
