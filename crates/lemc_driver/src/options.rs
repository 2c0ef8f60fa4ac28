//! The `--D*`/`-S`/`--Iasm`/`-k`/`-i` flag surface (spec §6), shared between
//! the REPL and the single-shot file-list path.

use clap::Parser;

/// Parsed CLI flags plus the file list to compile.
#[derive(Parser, Debug, Clone)]
#[command(name = "lemc")]
#[command(about = "Front end for the lemon systems language", long_about = None)]
pub struct Options {
    /// Print options state before compiling.
    #[arg(long = "Dopt")]
    pub dopt: bool,

    /// Announce entry/exit of each compiler pass.
    #[arg(long = "Dpass")]
    pub dpass: bool,

    /// Print every token produced by the scanner.
    #[arg(long = "Dtokens")]
    pub dtokens: bool,

    /// Announce thread creation and join.
    #[arg(long = "Dthread")]
    pub dthread: bool,

    /// Enable all `--D*` diagnostics.
    #[arg(long = "Dall")]
    pub dall: bool,

    /// Disassemble generated IR (no-op in this front-end-only core).
    #[arg(short = 'S', long = "Iasm")]
    pub iasm: bool,

    /// Skip VM execution (no-op in this front-end-only core).
    #[arg(short = 'k', long = "Mkill")]
    pub mkill: bool,

    /// After compiling the file list, drop into the REPL.
    #[arg(short = 'i')]
    pub interactive: bool,

    /// Scanner/parser channel capacity, overridable to exercise the
    /// "scanner determinism across capacities" property outside `lemc_lexer`'s
    /// own unit tests.
    #[arg(long, default_value_t = lemc_lexer::DEFAULT_CAPACITY)]
    pub channel_capacity: usize,

    /// Source files to compile. Empty means "enter the REPL".
    pub files: Vec<String>,
}

impl Options {
    pub fn trace_options(&self) -> bool {
        self.dopt || self.dall
    }

    pub fn trace_passes(&self) -> bool {
        self.dpass || self.dall
    }

    pub fn dump_tokens(&self) -> bool {
        self.dtokens || self.dall
    }

    pub fn trace_threads(&self) -> bool {
        self.dthread || self.dall
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Options::command().debug_assert();
    }

    #[test]
    fn dall_implies_every_trace_flag() {
        let opts = Options::parse_from(["lemc", "--Dall", "root.lem"]);
        assert!(opts.trace_options());
        assert!(opts.trace_passes());
        assert!(opts.dump_tokens());
        assert!(opts.trace_threads());
    }

    #[test]
    fn no_files_means_repl() {
        let opts = Options::parse_from(["lemc"]);
        assert!(opts.files.is_empty());
    }
}
