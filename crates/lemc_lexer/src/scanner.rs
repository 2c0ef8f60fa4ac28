//! The byte-by-byte scanning state machine (spec §4.1).
//!
//! A [`Scanner`] holds only `{source, cursor, line}` — no lookahead buffer
//! of prior tokens. `next_token` always returns exactly one token, ending
//! with a single `Eof` once the source is exhausted.

use crate::keywords;
use crate::token::{Token, TokenFlags, TokenKind};

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Scans one source buffer into a token stream, one token at a time.
pub struct Scanner<'a> {
    source: &'a [u8],
    cursor: usize,
    line: u32,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Scanner {
            source,
            cursor: 0,
            line: 1,
        }
    }

    pub fn from_str(source: &'a str) -> Self {
        Scanner::new(source.as_bytes())
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.cursor).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.cursor + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.cursor += 1;
        if b == b'\n' {
            self.line += 1;
        }
        Some(b)
    }

    fn slice_str(&self, start: usize) -> String {
        String::from_utf8_lossy(&self.source[start..self.cursor]).into_owned()
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b) if is_whitespace(b) => {
                    self.advance();
                }
                Some(b'#') => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Produces the next token. Returns an `Eof` token forever once the
    /// source is exhausted; callers stop pulling after the first one.
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();
        let line = self.line;
        let start = self.cursor;

        let Some(b) = self.peek() else {
            return Token::new(TokenKind::Eof, "", line);
        };

        if is_ident_start(b) {
            return self.scan_identifier(start, line);
        }
        if b.is_ascii_digit() {
            return self.scan_number(start, line);
        }
        if b == b'"' {
            return self.scan_string(line);
        }
        if let Some(tok) = self.scan_operator(start, line) {
            return tok;
        }
        self.scan_invalid(start, line)
    }

    fn scan_identifier(&mut self, start: usize, line: u32) -> Token {
        while let Some(b) = self.peek() {
            if is_ident_continue(b) {
                self.advance();
            } else {
                break;
            }
        }
        let lexeme = self.slice_str(start);
        let kind = keywords::classify(&lexeme).unwrap_or(TokenKind::Identifier);
        Token::new(kind, lexeme, line)
    }

    fn scan_number(&mut self, start: usize, line: u32) -> Token {
        let mut seen_dot = false;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                self.advance();
            } else if b == b'.' && !seen_dot {
                seen_dot = true;
                self.advance();
            } else {
                break;
            }
        }
        let lexeme = self.slice_str(start);
        let kind = if seen_dot { TokenKind::Float } else { TokenKind::Int };
        Token::new(kind, lexeme, line)
    }

    fn scan_string(&mut self, line: u32) -> Token {
        self.advance(); // opening quote
        let start = self.cursor;
        loop {
            match self.peek() {
                Some(b'"') => {
                    let lexeme = self.slice_str(start);
                    self.advance();
                    return Token::new(TokenKind::Str, lexeme, line);
                }
                Some(_) => {
                    self.advance();
                }
                None => {
                    let lexeme = self.slice_str(start);
                    return Token::new(TokenKind::Invalid, lexeme, line)
                        .with_flags(TokenFlags::BAD_STRING);
                }
            }
        }
    }

    fn scan_operator(&mut self, start: usize, line: u32) -> Option<Token> {
        let b = self.peek()?;

        macro_rules! one {
            ($kind:expr) => {{
                self.advance();
                $kind
            }};
        }
        macro_rules! two {
            ($kind:expr) => {{
                self.advance();
                self.advance();
                return Some(Token::new($kind, self.slice_str(start), line));
            }};
        }

        let kind = match b {
            b';' => one!(TokenKind::Semicolon),
            b'[' => one!(TokenKind::LBracket),
            b']' => one!(TokenKind::RBracket),
            b'(' => one!(TokenKind::LParen),
            b')' => one!(TokenKind::RParen),
            b'{' => one!(TokenKind::LBrace),
            b'}' => one!(TokenKind::RBrace),
            b'.' => one!(TokenKind::Dot),
            b'~' => one!(TokenKind::Tilde),
            b',' => one!(TokenKind::Comma),
            b':' => one!(TokenKind::Colon),
            b'*' => one!(TokenKind::Star),
            b'\'' => one!(TokenKind::Quote),
            b'^' => one!(TokenKind::Caret),
            b'+' => one!(TokenKind::Plus),
            b'-' => one!(TokenKind::Minus),
            b'/' => one!(TokenKind::Slash),
            b'%' => one!(TokenKind::Percent),
            b'=' => {
                if self.peek_at(1) == Some(b'=') {
                    two!(TokenKind::EqEq);
                }
                one!(TokenKind::Assign)
            }
            b'!' => {
                if self.peek_at(1) == Some(b'=') {
                    two!(TokenKind::NotEq);
                }
                one!(TokenKind::Bang)
            }
            b'&' => {
                if self.peek_at(1) == Some(b'&') {
                    two!(TokenKind::AndAnd);
                }
                one!(TokenKind::Amp)
            }
            b'|' => {
                if self.peek_at(1) == Some(b'|') {
                    two!(TokenKind::OrOr);
                }
                one!(TokenKind::Pipe)
            }
            b'<' => match self.peek_at(1) {
                Some(b'<') => two!(TokenKind::Shl),
                Some(b'=') => two!(TokenKind::Le),
                _ => one!(TokenKind::Lt),
            },
            b'>' => match self.peek_at(1) {
                Some(b'>') => two!(TokenKind::Shr),
                Some(b'=') => two!(TokenKind::Ge),
                _ => one!(TokenKind::Gt),
            },
            _ => return None,
        };
        Some(Token::new(kind, self.slice_str(start), line))
    }

    fn scan_invalid(&mut self, start: usize, line: u32) -> Token {
        self.advance();
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                break;
            }
            self.advance();
        }
        Token::new(TokenKind::Invalid, self.slice_str(start), line)
    }
}

/// Scans an entire source buffer to completion, for tests and small tools.
/// `ScannerSpawn` (spec §4.1) uses [`Scanner::next_token`] directly instead,
/// one token at a time, so it can interleave with channel sends.
pub fn scan_all(source: &str) -> Vec<Token> {
    let mut scanner = Scanner::from_str(source);
    let mut tokens = Vec::new();
    loop {
        let tok = scanner.next_token();
        let is_eof = tok.is_eof();
        tokens.push(tok);
        if is_eof {
            break;
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn skips_whitespace_and_comments() {
        let tokens = scan_all("  \t# a comment\n  for");
        assert_eq!(kinds(&tokens), vec![TokenKind::For, TokenKind::Eof]);
        assert_eq!(tokens[0].line, 2);
    }

    #[test]
    fn float_with_exponent_splits_per_spec() {
        let tokens = scan_all("3.14e3");
        assert_eq!(tokens[0].kind, TokenKind::Float);
        assert_eq!(tokens[0].lexeme, "3.14");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].lexeme, "e3");
        assert!(tokens[2].is_eof());
    }

    #[test]
    fn two_dots_stop_before_second() {
        let tokens = scan_all("1.2.3");
        assert_eq!(tokens[0].kind, TokenKind::Float);
        assert_eq!(tokens[0].lexeme, "1.2");
        assert_eq!(tokens[1].kind, TokenKind::Dot);
        assert_eq!(tokens[2].kind, TokenKind::Int);
        assert_eq!(tokens[2].lexeme, "3");
    }

    #[test]
    fn integer_has_no_dot() {
        let tokens = scan_all("42");
        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(tokens[0].lexeme, "42");
    }

    #[test]
    fn unterminated_string_flags_bad_string_then_eof() {
        let tokens = scan_all("\"unterminated");
        assert_eq!(tokens[0].kind, TokenKind::Invalid);
        assert!(tokens[0].flags.contains(TokenFlags::BAD_STRING));
        assert_eq!(tokens[0].lexeme, "unterminated");
        assert!(tokens[1].is_eof());
    }

    #[test]
    fn closed_string_excludes_quotes() {
        let tokens = scan_all("\"hello\"");
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].lexeme, "hello");
    }

    #[test]
    fn identifiers_and_keywords_partition() {
        let tokens = scan_all("struct foo_1 self selfish");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Struct,
                TokenKind::Identifier,
                TokenKind::SelfKw,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_char_operators_preferred_over_one() {
        let tokens = scan_all("== != && || << >> >= <= = ! & | < >");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Shl,
                TokenKind::Shr,
                TokenKind::Ge,
                TokenKind::Le,
                TokenKind::Assign,
                TokenKind::Bang,
                TokenKind::Amp,
                TokenKind::Pipe,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn invalid_byte_synchronizes_to_next_whitespace() {
        let tokens = scan_all("@@@ for");
        assert_eq!(tokens[0].kind, TokenKind::Invalid);
        assert_eq!(tokens[0].lexeme, "@@@");
        assert_eq!(tokens[1].kind, TokenKind::For);
    }

    #[test]
    fn scanner_is_deterministic() {
        let source = "func foo(x: i32) { return x + 1; }";
        assert_eq!(kinds(&scan_all(source)), kinds(&scan_all(source)));
    }
}
