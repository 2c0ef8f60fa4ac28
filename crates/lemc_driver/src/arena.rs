//! Owns the sixteen bump arenas one compilation's AST is carved from, and
//! hands out the `Copy` [`lemc_parser::AstArena`] view every parser/resolver
//! function takes (mirrors the teacher's single-struct-of-arenas pattern).

use lemc_base::Arena;
use lemc_parser::ast::{AstArena, Decl, Expr, Fiat, Import, Member, Module, Param, Stmt, Test, Type};
use lemc_parser::symbol::{Symbol, SymTable};

#[derive(Default)]
pub struct CompilerArena<'a> {
    modules: Arena<Module<'a>>,
    decls: Arena<Decl<'a>>,
    decl_refs: Arena<&'a Decl<'a>>,
    stmts: Arena<Stmt<'a>>,
    exprs: Arena<Expr<'a>>,
    expr_refs: Arena<&'a Expr<'a>>,
    opt_expr_refs: Arena<Option<&'a Expr<'a>>>,
    types: Arena<Type<'a>>,
    members: Arena<Member<'a>>,
    params: Arena<Param<'a>>,
    imports: Arena<Import<'a>>,
    fiats: Arena<Fiat<'a>>,
    tests: Arena<Test<'a>>,
    symbols: Arena<Symbol<'a>>,
    tables: Arena<SymTable<'a>>,
    strings: Arena<u8>,
}

impl<'a> CompilerArena<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrows the `Copy` bundle of arena references every parser/resolver
    /// entry point takes.
    pub fn ast(&'a self) -> AstArena<'a> {
        AstArena {
            modules: &self.modules,
            decls: &self.decls,
            decl_refs: &self.decl_refs,
            stmts: &self.stmts,
            exprs: &self.exprs,
            expr_refs: &self.expr_refs,
            opt_expr_refs: &self.opt_expr_refs,
            types: &self.types,
            members: &self.members,
            params: &self.params,
            imports: &self.imports,
            fiats: &self.fiats,
            tests: &self.tests,
            symbols: &self.symbols,
            tables: &self.tables,
            strings: &self.strings,
        }
    }
}
