//! The dependency resolver (spec §4.4): transitive module discovery, cycle
//! detection, and a single-pass topological sort.
//!
//! Resolves spec §9 Open Question (a): the original source carried several
//! overlapping dependency-graph modules (`graph.c`, `jobs.c`,
//! `importgraph.c`, `resolver.c`); this implementation keeps one coherent
//! module covering file loading, parse dispatch, and the DFS together.

use lemc_parser::ast::{AstArena, Module};
use lemc_parser::parser::Parser;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::Arc;

/// Where a module's source text comes from. Abstracted so tests can supply
/// an in-memory fixture instead of touching disk; production use reads real
/// files via [`FsSource`].
pub trait ModuleSource {
    fn read(&self, disk_path: &str) -> io::Result<String>;
}

/// Reads modules from the real filesystem.
pub struct FsSource;

impl ModuleSource for FsSource {
    fn read(&self, disk_path: &str) -> io::Result<String> {
        std::fs::read_to_string(disk_path)
    }
}

/// Fatal failure of the dependency phase (spec §4.4, §7): each variant
/// aborts the whole compilation, partial graph state is not exposed.
#[derive(Debug)]
pub enum GraphError {
    Io { path: String, message: String },
    Parse { path: String, errors: u32 },
    Cycle { parent: String, child: String },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::Io { path, message } => write!(f, "cannot read '{path}': {message}"),
            GraphError::Parse { path, errors } => write!(f, "'{path}' failed to parse ({errors} error(s))"),
            GraphError::Cycle { parent, child } => {
                write!(f, "circular import: '{parent}' imports '{child}', which imports back to '{parent}'")
            }
        }
    }
}

impl std::error::Error for GraphError {}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VertexState {
    OnStack,
    OffStack,
}

/// Suffixes a bare module alias with `.lem` unless it already carries the
/// suffix (spec §6's file-extension rule, applied here to import aliases
/// too since they name files the same way root arguments do).
fn disk_path(alias: &str) -> String {
    if alias.ends_with(".lem") {
        alias.to_string()
    } else {
        format!("{alias}.lem")
    }
}

/// Strips a trailing `.lem` so the module's own `alias` field holds the bare
/// name used to key it in the global symbol table.
fn bare_alias(alias: &str) -> &str {
    alias.strip_suffix(".lem").unwrap_or(alias)
}

/// Discovers every module transitively imported from one root file, in a
/// single depth-first traversal, threading them into topological order via
/// `Module.next`.
pub struct DependencyGraph<'a, L: ModuleSource> {
    arena: AstArena<'a>,
    loader: L,
    channel_capacity: usize,
    trace_threads: bool,
    dump_tokens: bool,
    states: HashMap<String, VertexState>,
    head: Option<&'a Module<'a>>,
    tail: Option<&'a Module<'a>>,
}

impl<'a, L: ModuleSource> DependencyGraph<'a, L> {
    pub fn new(arena: AstArena<'a>, loader: L) -> Self {
        DependencyGraph {
            arena,
            loader,
            channel_capacity: lemc_lexer::DEFAULT_CAPACITY,
            trace_threads: false,
            dump_tokens: false,
            states: HashMap::new(),
            head: None,
            tail: None,
        }
    }

    /// Overrides the scanner/parser channel's capacity — used to re-run the
    /// same input at several capacities and assert scanner determinism end
    /// to end.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Announces scanner thread spawn/join at debug level (`--Dthread`).
    pub fn with_thread_tracing(mut self, enabled: bool) -> Self {
        self.trace_threads = enabled;
        self
    }

    /// Logs every token a module's scanner produces at trace level
    /// (`--Dtokens`). Re-scans the module's text once more purely for this
    /// log output, since the channel already in flight to the parser is not
    /// itself a convenient place to intercept.
    pub fn with_token_dump(mut self, enabled: bool) -> Self {
        self.dump_tokens = enabled;
        self
    }

    /// Builds the graph rooted at `root_alias` (a bare name or a `.lem`
    /// path), returning the head of the topological list and every
    /// diagnostic collected while parsing along the way.
    pub fn build(mut self, root_alias: &str) -> Result<(&'a Module<'a>, Vec<lemc_base::Diagnostic>), GraphError> {
        let mut diagnostics = Vec::new();
        self.insert(root_alias, &mut diagnostics)?;
        Ok((self.head.expect("root is always appended on success"), diagnostics))
    }

    fn insert(&mut self, alias: &str, diagnostics: &mut Vec<lemc_base::Diagnostic>) -> Result<VertexState, GraphError> {
        let path = disk_path(alias);
        if let Some(state) = self.states.get(&path) {
            return Ok(*state);
        }

        let source_text = self.loader.read(&path).map_err(|e| GraphError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;

        self.states.insert(path.clone(), VertexState::OnStack);

        let module = self.parse_module(&path, bare_alias(alias), source_text, diagnostics);
        if module.has_errors() {
            return Err(GraphError::Parse {
                path,
                errors: module.errors.get(),
            });
        }

        for import in module.imports {
            let child_state = self.insert(import.alias, diagnostics)?;
            if child_state == VertexState::OnStack {
                return Err(GraphError::Cycle {
                    parent: bare_alias(alias).to_string(),
                    child: import.alias.to_string(),
                });
            }
        }

        match self.tail {
            Some(tail) => tail.next.set(Some(module)),
            None => self.head = Some(module),
        }
        self.tail = Some(module);
        self.states.insert(path, VertexState::OffStack);
        Ok(VertexState::OffStack)
    }

    fn parse_module(
        &self,
        path: &str,
        alias: &str,
        source_text: String,
        diagnostics: &mut Vec<lemc_base::Diagnostic>,
    ) -> &'a Module<'a> {
        if self.dump_tokens {
            for token in lemc_lexer::scanner::scan_all(&source_text) {
                log::trace!(target: "lemc_lexer::scanner", "{path}: {token:?}");
            }
        }

        let source: Arc<str> = Arc::from(source_text.as_str());
        let (tx, rx) = lemc_lexer::bounded(self.channel_capacity);
        if self.trace_threads {
            log::debug!(target: "lemc_resolve::graph", "spawning scanner thread for {path}");
        }
        let handle = lemc_lexer::spawn_scanner(source, tx);
        let alias = self.arena.alloc_str(alias);
        let parser = Parser::new(self.arena, rx);
        let (module, mut diags) = parser.parse_module(path.to_string(), alias, source_text);
        handle.join().expect("scanner thread panicked");
        if self.trace_threads {
            log::debug!(target: "lemc_resolve::graph", "joined scanner thread for {path}");
        }
        diagnostics.append(&mut diags);
        module
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lemc_parser::ast::{Decl, Expr, Fiat, Member, Param, Stmt, Test, Type};
    use lemc_parser::symbol::{SymTable, Symbol};
    use std::cell::RefCell;
    use std::collections::HashMap as StdHashMap;

    struct FixtureSource(RefCell<StdHashMap<String, String>>);

    impl FixtureSource {
        fn new(files: &[(&str, &str)]) -> Self {
            let mut map = StdHashMap::new();
            for (name, content) in files {
                map.insert(name.to_string(), content.to_string());
            }
            FixtureSource(RefCell::new(map))
        }
    }

    impl ModuleSource for FixtureSource {
        fn read(&self, disk_path: &str) -> io::Result<String> {
            self.0
                .borrow()
                .get(disk_path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, disk_path.to_string()))
        }
    }

    fn arena() -> (
        lemc_base::Arena<Module<'static>>,
        lemc_base::Arena<Decl<'static>>,
        lemc_base::Arena<&'static Decl<'static>>,
        lemc_base::Arena<Stmt<'static>>,
        lemc_base::Arena<Expr<'static>>,
        lemc_base::Arena<&'static Expr<'static>>,
        lemc_base::Arena<Option<&'static Expr<'static>>>,
        lemc_base::Arena<Type<'static>>,
        lemc_base::Arena<Member<'static>>,
        lemc_base::Arena<Param<'static>>,
        lemc_base::Arena<lemc_parser::ast::Import<'static>>,
        lemc_base::Arena<Fiat<'static>>,
        lemc_base::Arena<Test<'static>>,
        lemc_base::Arena<Symbol<'static>>,
        lemc_base::Arena<SymTable<'static>>,
        lemc_base::Arena<u8>,
    ) {
        (
            Default::default(),
            Default::default(),
            Default::default(),
            Default::default(),
            Default::default(),
            Default::default(),
            Default::default(),
            Default::default(),
            Default::default(),
            Default::default(),
            Default::default(),
            Default::default(),
            Default::default(),
            Default::default(),
            Default::default(),
            Default::default(),
        )
    }

    macro_rules! ast_arena {
        ($a:expr) => {
            AstArena {
                modules: &$a.0,
                decls: &$a.1,
                decl_refs: &$a.2,
                stmts: &$a.3,
                exprs: &$a.4,
                expr_refs: &$a.5,
                opt_expr_refs: &$a.6,
                types: &$a.7,
                members: &$a.8,
                params: &$a.9,
                imports: &$a.10,
                fiats: &$a.11,
                tests: &$a.12,
                symbols: &$a.13,
                tables: &$a.14,
                strings: &$a.15,
            }
        };
    }

    #[test]
    fn single_module_with_no_imports_builds() {
        let arenas = arena();
        let ast = ast_arena!(arenas);
        let loader = FixtureSource::new(&[("root.lem", "let x = 42;")]);
        let graph = DependencyGraph::new(ast, loader);
        let (head, diags) = graph.build("root.lem").expect("should build");
        assert!(diags.is_empty());
        assert!(head.next.get().is_none());
        assert_eq!(head.declarations.len(), 1);
    }

    #[test]
    fn diamond_import_visits_each_module_once_in_order() {
        let arenas = arena();
        let ast = ast_arena!(arenas);
        let loader = FixtureSource::new(&[
            ("root.lem", "import \"dep\";"),
            ("dep.lem", "let y = 1;"),
        ]);
        let graph = DependencyGraph::new(ast, loader);
        let (head, _diags) = graph.build("root.lem").expect("should build");
        assert_eq!(head.alias, "dep");
        let next = head.next.get().expect("root follows dep");
        assert_eq!(next.alias, "root");
        assert!(next.next.get().is_none());
    }

    #[test]
    fn direct_cycle_is_rejected_naming_both_modules() {
        let arenas = arena();
        let ast = ast_arena!(arenas);
        let loader = FixtureSource::new(&[
            ("a.lem", "import \"b\";"),
            ("b.lem", "import \"a\";"),
        ]);
        let graph = DependencyGraph::new(ast, loader);
        let err = graph.build("a.lem").expect_err("should detect cycle");
        let message = err.to_string();
        assert!(message.contains('a'));
        assert!(message.contains('b'));
        assert!(matches!(err, GraphError::Cycle { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let arenas = arena();
        let ast = ast_arena!(arenas);
        let loader = FixtureSource::new(&[]);
        let graph = DependencyGraph::new(ast, loader);
        let err = graph.build("missing.lem").expect_err("should fail");
        assert!(matches!(err, GraphError::Io { .. }));
    }

    #[test]
    fn unparseable_file_is_a_parse_error() {
        let arenas = arena();
        let ast = ast_arena!(arenas);
        let loader = FixtureSource::new(&[("root.lem", "let ;")]);
        let graph = DependencyGraph::new(ast, loader);
        let err = graph.build("root.lem").expect_err("should fail");
        assert!(matches!(err, GraphError::Parse { .. }));
    }

    #[test]
    fn reads_real_files_via_fs_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("root.lem"), "let x = 1;").unwrap();
        let arenas = arena();
        let ast = ast_arena!(arenas);
        let loader = FsSource;
        let graph = DependencyGraph::new(ast, loader);
        let root_path = dir.path().join("root.lem");
        let (head, diags) = graph.build(root_path.to_str().unwrap()).expect("should build");
        assert!(diags.is_empty());
        assert_eq!(head.declarations.len(), 1);
    }
}
