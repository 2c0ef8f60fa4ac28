//! # lemc-parser
//!
//! The AST (spec §3), the symbol-table engine (spec §4.5), and the
//! recursive-descent/Pratt parser (spec §4.3) that builds one from a
//! token stream.

pub mod ast;
pub mod parser;
pub mod symbol;

pub use ast::{AstArena, BinOp, Decl, Expr, Fiat, Import, LitKind, Member, Module, Param, Stmt, Test, Type, UnOp};
pub use parser::{Parser, TokenSource, VecTokenSource};
pub use symbol::{InsertOutcome, Symbol, SymTable, SymTableTag, BUILTIN_FUNCTIONS, NATIVE_TYPES};
