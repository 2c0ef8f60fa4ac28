//! Token types produced by the scanner and consumed by the parser.
//!
//! A [`Token`] is a small, `Clone`-able value: kind, an owned copy of its
//! lexeme, its 1-based source line, and a flag set for ill-formed literals.
//! Owning the lexeme (rather than holding a borrow into the source buffer)
//! lets tokens cross the scanner→parser channel (spec §4.1, §4.2) without
//! threading the source buffer's lifetime through the channel type; the
//! parser re-allocates the lexeme into the compiler arena once a token
//! becomes part of the AST.

/// The kind of a token. Markers, literals, punctuation, one- and
/// two-character operators, and keywords — roughly sixty variants total,
/// matching spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Markers
    Invalid,
    Eof,
    Identifier,

    // Literals
    Int,
    Float,
    Str,

    // Single-character punctuation
    Semicolon,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Dot,
    Tilde,
    Comma,
    Colon,
    Star,
    Quote, // `'`, the bitwise-NOT operator
    Caret,
    Plus,
    Minus,
    Slash,
    Percent,

    // Single-character operators that also have a two-character form
    Assign,
    Lt,
    Gt,
    Amp,
    Pipe,
    Bang,

    // Two-character operators
    EqEq,
    NotEq,
    AndAnd,
    OrOr,
    Shl,
    Shr,
    Ge,
    Le,

    // Keywords
    For,
    While,
    Break,
    Continue,
    If,
    Else,
    Switch,
    Case,
    Default,
    Fallthrough,
    Goto,
    Label,
    Let,
    Mut,
    Null,
    True,
    False,
    Struct,
    Import,
    Func,
    Method,
    Priv,
    Pub,
    Return,
    SelfKw,
    Void,
}

impl TokenKind {
    /// `true` for every variant reserved as a keyword (spec §6's
    /// case-sensitive keyword list).
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::For
                | TokenKind::While
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::Switch
                | TokenKind::Case
                | TokenKind::Default
                | TokenKind::Fallthrough
                | TokenKind::Goto
                | TokenKind::Label
                | TokenKind::Let
                | TokenKind::Mut
                | TokenKind::Null
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Struct
                | TokenKind::Import
                | TokenKind::Func
                | TokenKind::Method
                | TokenKind::Priv
                | TokenKind::Pub
                | TokenKind::Return
                | TokenKind::SelfKw
                | TokenKind::Void
        )
    }
}

bitflags::bitflags! {
    /// Per-token flags for ill-formed literals (spec §3, §4.1). `BAD_NUMBER`
    /// is set when a numeric literal's scan was irregular (currently unused
    /// by the scanner, reserved for a future stricter numeric grammar);
    /// `BAD_STRING` is set when a string literal ran off the end of input
    /// without a closing quote.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TokenFlags: u8 {
        const BAD_NUMBER = 0b0000_0001;
        const BAD_STRING = 0b0000_0010;
    }
}

/// A single token: kind, owned lexeme, 1-based source line, and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: u32,
    pub flags: TokenFlags,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: u32) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            line,
            flags: TokenFlags::default(),
        }
    }

    pub fn with_flags(mut self, flags: TokenFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_partition_holds_for_sample() {
        assert!(TokenKind::Struct.is_keyword());
        assert!(!TokenKind::Identifier.is_keyword());
    }

    #[test]
    fn bad_string_flag_roundtrips() {
        let t = Token::new(TokenKind::Invalid, "unterminated", 3)
            .with_flags(TokenFlags::BAD_STRING);
        assert!(t.flags.contains(TokenFlags::BAD_STRING));
        assert!(!t.flags.contains(TokenFlags::BAD_NUMBER));
    }
}
