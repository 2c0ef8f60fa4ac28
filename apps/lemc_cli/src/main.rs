//! `lemc` - standalone binary
//!
//! Thin wrapper around [`lemc_cli::run_cli`]; all command logic lives in the
//! library crate for testability.
//!
//! # Exit Codes
//!
//! - `0` - success, no errors
//! - `1` - parse or user error
//! - `2` - a file could not be read
//! - `3` - circular import
//! - `4` - compiled, but symbol resolution reported at least one error
//! - `70` - anything else (`EX_SOFTWARE`, per `sysexits.h`)

fn main() {
    std::process::exit(lemc_cli::run_cli());
}
