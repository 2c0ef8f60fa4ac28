//! # lemc-driver
//!
//! Orchestration: wires the dependency graph builder and the symbol
//! resolver into one pipeline over a caller-supplied [`CompilerArena`],
//! driven by the parsed [`Options`] (spec §6's CLI flag surface).

pub mod arena;
pub mod error;
pub mod options;

pub use arena::CompilerArena;
pub use error::{DriverError, SYMBOL_ERROR_EXIT_CODE};
pub use options::Options;

use lemc_base::Diagnostic;
use lemc_parser::ast::{AstArena, Module};
use lemc_parser::symbol::SymTable;
use lemc_resolve::{resolve_program, DependencyGraph, ModuleSource};

/// Everything one root file's compilation produced: the topologically
/// ordered module list, the populated global symbol table, and every
/// diagnostic collected across both phases.
pub struct CompileResult<'a> {
    pub head: &'a Module<'a>,
    pub global: &'a SymTable<'a>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> CompileResult<'a> {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == lemc_base::Severity::Error)
    }
}

/// Runs the full front-end over one root module: dependency discovery and
/// parsing, then symbol resolution, threading `options`'s `--D*` tracing
/// flags through to both phases.
pub fn compile<'a, L: ModuleSource>(
    arena: AstArena<'a>,
    loader: L,
    root: &str,
    options: &Options,
) -> Result<CompileResult<'a>, DriverError> {
    if options.trace_passes() {
        log::debug!(target: "lemc_driver", "dependency graph: start ({root})");
    }
    let graph = DependencyGraph::new(arena, loader)
        .with_channel_capacity(options.channel_capacity)
        .with_thread_tracing(options.trace_threads())
        .with_token_dump(options.dump_tokens());
    let (head, mut diagnostics) = graph.build(root)?;
    if options.trace_passes() {
        log::debug!(target: "lemc_driver", "dependency graph: done ({root})");
    }

    if options.trace_passes() {
        log::debug!(target: "lemc_driver", "symbol resolution: start ({root})");
    }
    let (global, mut resolve_diags) = resolve_program(arena, head);
    diagnostics.append(&mut resolve_diags);
    if options.trace_passes() {
        log::debug!(target: "lemc_driver", "symbol resolution: done ({root})");
    }

    Ok(CompileResult { head, global, diagnostics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lemc_resolve::FsSource;
    use std::io;
    use std::sync::Mutex;

    struct MapSource(Mutex<std::collections::HashMap<String, String>>);

    impl ModuleSource for MapSource {
        fn read(&self, disk_path: &str) -> io::Result<String> {
            self.0
                .lock()
                .unwrap()
                .get(disk_path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, disk_path.to_string()))
        }
    }

    fn map_loader(files: &[(&str, &str)]) -> MapSource {
        let mut map = std::collections::HashMap::new();
        for (name, content) in files {
            map.insert(name.to_string(), content.to_string());
        }
        MapSource(Mutex::new(map))
    }

    #[test]
    fn compiles_a_clean_single_module() {
        let storage = CompilerArena::new();
        let ast = storage.ast();
        let loader = map_loader(&[("root.lem", "let x: int32 = 1;")]);
        let options = Options::parse_from(["lemc"]);
        let result = compile(ast, loader, "root.lem", &options).expect("should compile");
        assert!(!result.has_errors(), "{:?}", result.diagnostics);
    }

    #[test]
    fn undeclared_type_surfaces_as_a_diagnostic_not_a_hard_error() {
        let storage = CompilerArena::new();
        let ast = storage.ast();
        let loader = map_loader(&[("root.lem", "let y: nope = 1;")]);
        let options = Options::parse_from(["lemc"]);
        let result = compile(ast, loader, "root.lem", &options).expect("graph phase succeeds");
        assert!(result.has_errors());
    }

    #[test]
    fn cycle_is_a_driver_error() {
        let storage = CompilerArena::new();
        let ast = storage.ast();
        let loader = map_loader(&[("a.lem", "import \"b\";"), ("b.lem", "import \"a\";")]);
        let options = Options::parse_from(["lemc"]);
        let err = compile(ast, loader, "a.lem", &options).expect_err("should detect cycle");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn reads_through_fs_source_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("root.lem"), "let x = 1;").unwrap();
        let storage = CompilerArena::new();
        let ast = storage.ast();
        let options = Options::parse_from(["lemc"]);
        let root_path = dir.path().join("root.lem");
        let result = compile(ast, FsSource, root_path.to_str().unwrap(), &options).expect("should compile");
        assert!(!result.has_errors());
    }
}
