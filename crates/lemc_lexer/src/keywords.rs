//! Perfect-hash identifier→keyword recognition (spec §4.1, §6).
//!
//! Keywords are case-sensitive and are exactly the list in spec §6. The
//! table is built at compile time by [`phf`] into a minimal perfect hash
//! function, so a completed identifier is classified in O(1) with no
//! runtime hashing setup cost — the same technique this codebase's own
//! lexicon lookup relies on for its generated vocabulary tables.

use crate::token::TokenKind;

static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "for" => TokenKind::For,
    "while" => TokenKind::While,
    "break" => TokenKind::Break,
    "continue" => TokenKind::Continue,
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
    "switch" => TokenKind::Switch,
    "case" => TokenKind::Case,
    "default" => TokenKind::Default,
    "fallthrough" => TokenKind::Fallthrough,
    "goto" => TokenKind::Goto,
    "label" => TokenKind::Label,
    "let" => TokenKind::Let,
    "mut" => TokenKind::Mut,
    "null" => TokenKind::Null,
    "true" => TokenKind::True,
    "false" => TokenKind::False,
    "struct" => TokenKind::Struct,
    "import" => TokenKind::Import,
    "func" => TokenKind::Func,
    "method" => TokenKind::Method,
    "priv" => TokenKind::Priv,
    "pub" => TokenKind::Pub,
    "return" => TokenKind::Return,
    "self" => TokenKind::SelfKw,
    "void" => TokenKind::Void,
};

/// Classifies a completed identifier lexeme as a keyword kind, or `None`
/// if it's a plain `Identifier`.
pub fn classify(lexeme: &str) -> Option<TokenKind> {
    KEYWORDS.get(lexeme).copied()
}
