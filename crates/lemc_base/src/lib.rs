#![cfg_attr(docsrs, feature(doc_cfg))]

//! # lemc-base
//!
//! Shared, domain-free infrastructure for the lemc compiler front-end:
//!
//! - [`Arena`] — bump allocation for stable, compiler-lifetime references
//! - [`diagnostics`] — the bounded, thread-safe diagnostic log (§5, §7)
//! - [`style`] — ANSI terminal coloring for user-facing diagnostics
//! - [`error`] — the compiler-internal error taxonomy and phase exceptions
//!
//! # Design principles
//!
//! This crate has no knowledge of lemon syntax, tokens, or modules. It
//! provides only the infrastructure that the lexer, parser, and resolver
//! crates build upon.

pub mod arena;
pub mod diagnostics;
pub mod error;
pub mod style;

pub use arena::Arena;
pub use diagnostics::{Diagnostic, DiagnosticLog, Severity};
pub use error::{LemError, Result};
pub use style::Style;
