//! The symbol resolver (spec §4.6): walks each module in topological order,
//! populating its symbol table and binding every identifier use to its
//! declaration.
//!
//! Two gaps the distilled data model leaves open, resolved here (recorded
//! again in `DESIGN.md`):
//!
//! - `Type::Base`/`Type::Named` carry no `line` field (spec §3's data model
//!   omits one), so every type-resolution entry point threads the line of
//!   the enclosing declaration through as a plain argument instead.
//! - `Symbol::Import` carries no pointer to the imported module's table.
//!   Since an import's alias and its target module's alias are the same
//!   string, the target's table is recovered by looking the name up a
//!   second time directly in the global table (which always holds the
//!   `Module` symbol, since dependencies are resolved before their
//!   importers) rather than through the local, shadowing `Import` symbol.
//!
//! A third decision, not a gap but a deliberate non-implementation: spec §7
//! says symbol errors "synchronize at statement boundaries where possible;
//! otherwise abandon the current module with a `Symbol` failure". No
//! function below ever abandons a module, because the "otherwise" never
//! arises here — every error is discovered while resolving one declaration
//! or statement inside a loop over its siblings (`resolve_module`'s loop
//! over `declarations`, `resolve_fiat`'s loop over a block's `Fiat`s), so
//! the next sibling is always the synchronization point, and the parser's
//! own `synchronize()` already guarantees the AST handed in here is
//! structurally complete. `Symbol` therefore surfaces as accumulated
//! `Error`-severity diagnostics rather than a propagated failure type.

use lemc_base::Diagnostic;
use lemc_parser::ast::{AstArena, Decl, Expr, Fiat, Import, Member, Module, Param, Stmt, Type};
use lemc_parser::symbol::{InsertOutcome, Symbol, SymTable, SymTableTag, BUILTIN_FUNCTIONS, NATIVE_TYPES};
use std::cell::Cell;

/// Builds the global table once, before any module is processed, seeded
/// with the native type and builtin-function preamble (spec §4.5).
pub fn build_global_table<'a>(arena: AstArena<'a>) -> &'a SymTable<'a> {
    let capacity = NATIVE_TYPES.len() + BUILTIN_FUNCTIONS.len();
    let table = arena.tables.alloc(SymTable::new(None, SymTableTag::Global, capacity));
    for (name, bytes) in NATIVE_TYPES {
        let symbol = arena.symbols.alloc(Symbol::Native { bytes: *bytes });
        table.insert(name, symbol);
    }
    for name in BUILTIN_FUNCTIONS {
        // Builtins are pre-declared functions with no body and no parameters;
        // the nested table is otherwise empty.
        let inner = arena.tables.alloc(SymTable::new(Some(table), SymTableTag::Function, 1));
        let symbol = arena.symbols.alloc(Symbol::Function {
            table: inner,
            referenced: Cell::new(false),
            line: 0,
        });
        table.insert(name, symbol);
    }
    table
}

/// Walks a topologically-ordered module list, resolving every symbol.
pub struct Resolver<'a> {
    arena: AstArena<'a>,
    global: &'a SymTable<'a>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Resolver<'a> {
    pub fn new(arena: AstArena<'a>, global: &'a SymTable<'a>) -> Self {
        Resolver {
            arena,
            global,
            diagnostics: Vec::new(),
        }
    }

    /// Resolves every module reachable from `head` via `Module.next`,
    /// returning the diagnostics collected along the way.
    pub fn resolve_all(mut self, head: &'a Module<'a>) -> Vec<Diagnostic> {
        let mut current = Some(head);
        while let Some(module) = current {
            self.resolve_module(module);
            current = module.next.get();
        }
        self.diagnostics
    }

    fn error(&mut self, line: u32, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(message).with_line(line));
    }

    fn error_no_line(&mut self, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(message));
    }

    fn redeclare(&mut self, name: &str, line: u32, existing: &Symbol<'a>) {
        match existing.line() {
            Some(prev) => self.error(line, format!("{name} redeclared; previously declared on line {prev}")),
            None => self.error(line, format!("{name} redeclared")),
        }
    }

    /// Inserts `symbol` under `name` in `scope`, backfilling `entry` either
    /// way (to the fresh symbol on success, to the pre-existing one on a
    /// rejected duplicate) and reporting redeclaration.
    fn declare(
        &mut self,
        scope: &'a SymTable<'a>,
        name: &'a str,
        symbol: &'a Symbol<'a>,
        line: u32,
        entry: &Cell<Option<&'a Symbol<'a>>>,
    ) {
        match scope.insert(name, symbol) {
            InsertOutcome::Inserted(s) => entry.set(Some(s)),
            InsertOutcome::AlreadyExists(existing) => {
                entry.set(Some(existing));
                self.redeclare(name, line, existing);
            }
        }
    }

    fn resolve_module(&mut self, module: &'a Module<'a>) {
        let capacity = (module.imports.len() + module.declarations.len()).max(1);
        let table = self.arena.tables.alloc(SymTable::new(Some(self.global), SymTableTag::Module, capacity));
        module.table.set(Some(table));

        let module_symbol = self.arena.symbols.alloc(Symbol::Module {
            table,
            referenced: Cell::new(false),
        });
        if let InsertOutcome::AlreadyExists(_) = self.global.insert(module.alias, module_symbol) {
            self.error_no_line(format!("{} redeclared", module.alias));
        }

        for import in module.imports {
            self.resolve_import(table, import);
        }
        for decl in module.declarations {
            self.resolve_decl(table, decl);
        }
    }

    fn resolve_import(&mut self, scope: &'a SymTable<'a>, import: &'a Import<'a>) {
        let symbol = self.arena.symbols.alloc(Symbol::Import {
            referenced: Cell::new(false),
            line: import.line,
        });
        self.declare(scope, import.alias, symbol, import.line, &import.entry);
    }

    fn resolve_decl(&mut self, scope: &'a SymTable<'a>, decl: &'a Decl<'a>) {
        match decl {
            Decl::Udt {
                name,
                entry,
                members,
                public,
                line,
            } => {
                let table = self.arena.tables.alloc(SymTable::new(Some(scope), SymTableTag::Udt, members.len().max(1)));
                let symbol = self.arena.symbols.alloc(Symbol::Udt {
                    table,
                    bytes: Cell::new(0),
                    referenced: Cell::new(false),
                    public: *public,
                    line: *line,
                });
                self.declare(scope, name, symbol, *line, entry);
                for member in *members {
                    self.resolve_member(table, member);
                }
            }
            Decl::Function {
                name,
                entry,
                ret,
                block,
                params,
                line,
                ..
            } => {
                let table = self.arena.tables.alloc(SymTable::new(Some(scope), SymTableTag::Function, params.len().max(1)));
                let symbol = self.arena.symbols.alloc(Symbol::Function {
                    table,
                    referenced: Cell::new(false),
                    line: *line,
                });
                self.declare(scope, name, symbol, *line, entry);
                for param in *params {
                    self.resolve_param(table, param);
                }
                if let Some(ret) = ret {
                    self.resolve_type(table, ret, *line);
                }
                self.resolve_stmt(table, block);
            }
            Decl::Method {
                name,
                entry,
                ret,
                recv,
                block,
                params,
                line,
                ..
            } => {
                let table = self.arena.tables.alloc(SymTable::new(Some(scope), SymTableTag::Method, params.len() + 1));
                let symbol = self.arena.symbols.alloc(Symbol::Method {
                    table,
                    referenced: Cell::new(false),
                    line: *line,
                });
                self.declare(scope, name, symbol, *line, entry);
                self.resolve_param(table, recv);
                for param in *params {
                    self.resolve_param(table, param);
                }
                if let Some(ret) = ret {
                    self.resolve_type(table, ret, *line);
                }
                self.resolve_stmt(table, block);
            }
            Decl::Variable {
                name,
                entry,
                vartype,
                value,
                public,
                line,
                ..
            } => {
                if let Some(ty) = vartype {
                    self.resolve_type(scope, ty, *line);
                }
                if let Some(value) = value {
                    self.resolve_expr(scope, value);
                }
                let symbol = self.arena.symbols.alloc(Symbol::Variable {
                    referenced: Cell::new(false),
                    public: *public,
                    line: *line,
                });
                self.declare(scope, name, symbol, *line, entry);
            }
        }
    }

    fn resolve_member(&mut self, scope: &'a SymTable<'a>, member: &'a Member<'a>) {
        self.resolve_type(scope, member.ty, member.line);
        let symbol = self.arena.symbols.alloc(Symbol::Field {
            referenced: Cell::new(false),
            public: member.public,
            line: member.line,
        });
        self.declare(scope, member.name, symbol, member.line, &member.entry);
    }

    fn resolve_param(&mut self, scope: &'a SymTable<'a>, param: &'a Param<'a>) {
        self.resolve_type(scope, param.ty, param.line);
        let symbol = self.arena.symbols.alloc(Symbol::Parameter {
            referenced: Cell::new(false),
            line: param.line,
        });
        self.declare(scope, param.name, symbol, param.line, &param.entry);
    }

    /// Unwinds a `Pointer`/`Array` chain, then resolves its `Base`/`Named`
    /// tail (spec §4.6's "Type resolution").
    fn resolve_type(&mut self, scope: &'a SymTable<'a>, ty: &'a Type<'a>, line: u32) {
        match ty {
            Type::Pointer { reference } => self.resolve_type(scope, reference, line),
            Type::Array { element, .. } => self.resolve_type(scope, element, line),
            Type::Base { name, entry } => self.resolve_base(scope, name, entry, line),
            Type::Named { name, entry, reference } => {
                match scope.lookup(name) {
                    Some((symbol, _)) => {
                        entry.set(Some(symbol));
                        match symbol {
                            Symbol::Import { referenced, .. } => {
                                referenced.set(true);
                                match self.global.lookup(name) {
                                    Some((Symbol::Module { table, .. }, _)) => {
                                        if let Type::Base { name: tail_name, entry: tail_entry } = reference {
                                            self.resolve_named_tail(table, tail_name, tail_entry, line);
                                        }
                                    }
                                    _ => self.error(line, format!("{name} import has no resolved module")),
                                }
                            }
                            _ => self.error(line, format!("{name} is not an imported module")),
                        }
                    }
                    None => self.error(line, format!("{name} was not declared before use")),
                }
            }
        }
    }

    fn resolve_base(&mut self, scope: &'a SymTable<'a>, name: &str, entry: &Cell<Option<&'a Symbol<'a>>>, line: u32) {
        match scope.lookup(name) {
            Some((symbol, _)) => {
                entry.set(Some(symbol));
                match symbol {
                    Symbol::Native { .. } => {}
                    Symbol::Udt { referenced, .. } => referenced.set(true),
                    _ => self.error(line, format!("{name} is not a type")),
                }
            }
            None => self.error(line, format!("{name} was not declared before use")),
        }
    }

    /// Resolves the tail of a `Named` type chain against the imported
    /// module's own table, rather than the importer's scope.
    fn resolve_named_tail(&mut self, module_table: &'a SymTable<'a>, name: &str, entry: &Cell<Option<&'a Symbol<'a>>>, line: u32) {
        match module_table.lookup(name) {
            Some((symbol, _)) => {
                entry.set(Some(symbol));
                match symbol {
                    Symbol::Native { .. } => {
                        self.diagnostics.push(Diagnostic::advice("named global type is redundant").with_line(line));
                    }
                    Symbol::Udt { referenced, public, .. } => {
                        referenced.set(true);
                        if !*public {
                            self.error(line, "reference to private type");
                        }
                    }
                    _ => self.error(line, format!("{name} is not a type")),
                }
            }
            None => self.error(line, format!("{name} was not declared before use")),
        }
    }

    fn resolve_fiat(&mut self, scope: &'a SymTable<'a>, fiat: &'a Fiat<'a>) {
        match fiat {
            Fiat::Decl(decl) => self.resolve_decl(scope, decl),
            Fiat::Stmt(stmt) => self.resolve_stmt(scope, stmt),
        }
    }

    fn resolve_stmt(&mut self, scope: &'a SymTable<'a>, stmt: &'a Stmt<'a>) {
        match stmt {
            Stmt::Expr { expr, .. } => self.resolve_expr(scope, expr),
            Stmt::Block { table, fiats, .. } => {
                let block_table = self.arena.tables.alloc(SymTable::new(Some(scope), SymTableTag::Block, fiats.len().max(1)));
                table.set(Some(block_table));
                for fiat in *fiats {
                    self.resolve_fiat(block_table, fiat);
                }
            }
            Stmt::For { init, cond, post, block, .. } => {
                let loop_table = self.arena.tables.alloc(SymTable::new(Some(scope), SymTableTag::Block, 1));
                if let Some(init) = init {
                    self.resolve_fiat(loop_table, init);
                }
                if let Some(cond) = cond {
                    self.resolve_expr(loop_table, cond);
                }
                if let Some(post) = post {
                    self.resolve_expr(loop_table, post);
                }
                self.resolve_stmt(loop_table, block);
            }
            Stmt::While { cond, block, .. } => {
                self.resolve_expr(scope, cond);
                self.resolve_stmt(scope, block);
            }
            Stmt::Switch { controller, tests, .. } => {
                self.resolve_expr(scope, controller);
                for test in *tests {
                    if let Some(values) = test.values {
                        for value in values {
                            self.resolve_expr(scope, value);
                        }
                    }
                    let case_table = self.arena.tables.alloc(SymTable::new(Some(scope), SymTableTag::Block, test.body.len().max(1)));
                    for fiat in test.body {
                        self.resolve_fiat(case_table, fiat);
                    }
                }
            }
            Stmt::Branch { shortvar, cond, pass, fail, .. } => {
                let branch_table = self.arena.tables.alloc(SymTable::new(Some(scope), SymTableTag::Block, 1));
                if let Some(shortvar) = shortvar {
                    self.resolve_fiat(branch_table, shortvar);
                }
                self.resolve_expr(branch_table, cond);
                self.resolve_stmt(branch_table, pass);
                if let Some(fail) = fail {
                    self.resolve_stmt(branch_table, fail);
                }
            }
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    self.resolve_expr(scope, value);
                }
            }
            Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::Fallthrough { .. } => {}
            Stmt::Goto { name, line } => {
                if scope.lookup(name).is_none() {
                    self.error(*line, format!("{name} was not declared before use"));
                }
            }
            Stmt::Label { name, entry, target, line } => {
                let symbol = self.arena.symbols.alloc(Symbol::Label {
                    referenced: Cell::new(false),
                    line: *line,
                });
                self.declare(scope, name, symbol, *line, entry);
                self.resolve_stmt(scope, target);
            }
        }
    }

    fn resolve_expr(&mut self, scope: &'a SymTable<'a>, expr: &'a Expr<'a>) {
        match expr {
            Expr::Assignment { target, value, .. } => {
                self.resolve_expr(scope, target);
                self.resolve_expr(scope, value);
            }
            Expr::Binary { left, right, .. } => {
                self.resolve_expr(scope, left);
                self.resolve_expr(scope, right);
            }
            Expr::Unary { operand, .. } => self.resolve_expr(scope, operand),
            Expr::Cast { operand, casttype, line } => {
                self.resolve_expr(scope, operand);
                self.resolve_type(scope, casttype, *line);
            }
            Expr::Call { callee, args, .. } => {
                self.resolve_expr(scope, callee);
                for arg in *args {
                    self.resolve_expr(scope, arg);
                }
            }
            Expr::Selector { name, .. } => self.resolve_expr(scope, name),
            Expr::Index { name, key, .. } => {
                self.resolve_expr(scope, name);
                self.resolve_expr(scope, key);
            }
            Expr::ArrayLit { indices, values, .. } => {
                for index in *indices {
                    if let Some(index) = index {
                        self.resolve_expr(scope, index);
                    }
                }
                for value in *values {
                    self.resolve_expr(scope, value);
                }
            }
            Expr::RvarLit { args, .. } => {
                for arg in *args {
                    self.resolve_expr(scope, arg);
                }
            }
            Expr::Lit { .. } => {}
            Expr::Ident { name, entry, line } => match scope.lookup(name) {
                Some((symbol, _)) => {
                    entry.set(Some(symbol));
                    symbol.mark_referenced();
                }
                None => self.error(*line, format!("{name} was not declared before use")),
            },
        }
    }
}

/// Builds the global table and resolves every module from `head` onward in
/// one call — the entry point `lemc_driver` wires the graph builder's output
/// into.
pub fn resolve_program<'a>(arena: AstArena<'a>, head: &'a Module<'a>) -> (&'a SymTable<'a>, Vec<Diagnostic>) {
    let global = build_global_table(arena);
    let diagnostics = Resolver::new(arena, global).resolve_all(head);
    (global, diagnostics)
}
