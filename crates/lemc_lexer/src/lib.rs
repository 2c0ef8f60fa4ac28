//! # lemc-lexer
//!
//! The concurrent lexical scanner (spec §4.1) and the bounded channel
//! (spec §4.2) that feeds its tokens to the parser.
//!
//! [`spawn_scanner`] starts one scanner thread per source file. The thread
//! owns its own copy of the source text, scans it token by token, and sends
//! each token over a [`channel::TokenSender`] — blocking when the channel is
//! full, closing the channel once `Eof` has been sent.

pub mod channel;
pub mod keywords;
pub mod scanner;
pub mod token;

pub use channel::{bounded, RecvOutcome, TokenReceiver, TokenSender, DEFAULT_CAPACITY};
pub use scanner::Scanner;
pub use token::{Token, TokenFlags, TokenKind};

use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Starts a producer thread dedicated to one source buffer (spec §4.1's
/// `ScannerSpawn(source_bytes, channel)`).
///
/// The thread emits tokens in source order, a final `Eof`, then closes the
/// sending half — including when an internal failure would otherwise abort
/// it, since the scanner has no recoverable-vs-fatal distinction to make at
/// the lexical level.
pub fn spawn_scanner(source: Arc<str>, sender: TokenSender) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut scanner = Scanner::from_str(&source);
        loop {
            let token = scanner.next_token();
            let is_eof = token.is_eof();
            if sender.send(token).is_err() {
                break;
            }
            if is_eof {
                break;
            }
        }
        sender.close();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn spawned_scanner_delivers_full_stream_and_closes() {
        let source: Arc<str> = Arc::from("func main() { return 0; }");
        let (tx, rx) = bounded(4);
        let handle = spawn_scanner(source, tx);

        let mut kinds = Vec::new();
        loop {
            match rx.recv() {
                RecvOutcome::Token(t) => {
                    let is_eof = t.is_eof();
                    kinds.push(t.kind);
                    if is_eof {
                        break;
                    }
                }
                RecvOutcome::Closed => break,
            }
        }
        handle.join().unwrap();
        assert_eq!(kinds.last(), Some(&TokenKind::Eof));
        assert_eq!(kinds[0], TokenKind::Func);
    }

    #[test]
    fn scanner_determinism_holds_across_channel_capacities() {
        let source = "struct Point { x: i32; y: i32; }";
        for capacity in [1usize, 2, 64, DEFAULT_CAPACITY] {
            let (tx, rx) = bounded(capacity);
            let handle = spawn_scanner(Arc::from(source), tx);
            let mut kinds = Vec::new();
            loop {
                match rx.recv() {
                    RecvOutcome::Token(t) => {
                        let is_eof = t.is_eof();
                        kinds.push(t.kind);
                        if is_eof {
                            break;
                        }
                    }
                    RecvOutcome::Closed => break,
                }
            }
            handle.join().unwrap();
            assert_eq!(kinds, scanner::scan_all(source).iter().map(|t| t.kind).collect::<Vec<_>>());
        }
    }
}
