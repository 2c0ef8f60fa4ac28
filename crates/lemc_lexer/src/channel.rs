//! The bounded, blocking channel between a scanner thread and its parser
//! (spec §4.2).
//!
//! `send` blocks while the channel is full; `recv` blocks while the channel
//! is empty and open; a `recv` on a closed, empty channel returns
//! [`RecvOutcome::Closed`] instead of blocking forever. Delivery is FIFO.
//! `close` is idempotent: calling it any number of times has no additional
//! effect beyond the first call (the testable property in spec §8).

use crate::token::Token;
use crossbeam_channel::{Receiver, RecvError, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};

/// Default channel capacity (spec §4.2).
pub const DEFAULT_CAPACITY: usize = 1024;

/// The producer half, held by a scanner thread.
///
/// Wraps a `crossbeam_channel::Sender<Token>` so `close` is an explicit,
/// idempotent call rather than relying solely on `Drop` timing.
pub struct TokenSender {
    inner: Sender<Token>,
    closed: AtomicBool,
}

impl TokenSender {
    /// Blocks until there is room, or the receiver has gone away.
    pub fn send(&self, token: Token) -> Result<(), Token> {
        if self.closed.load(Ordering::Acquire) {
            return Err(token);
        }
        self.inner.send(token).map_err(|e| e.into_inner())
    }

    /// Non-blocking send, for callers that want to observe backpressure
    /// without parking the thread (used by tests exercising capacity 1).
    pub fn try_send(&self, token: Token) -> Result<(), TrySendError<Token>> {
        self.inner.try_send(token)
    }

    /// Closes the sending half. Idempotent: a second call is a no-op.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// The consumer half, held by the parser.
pub struct TokenReceiver {
    inner: Receiver<Token>,
}

/// Outcome of a [`TokenReceiver::recv`] call.
#[derive(Debug)]
pub enum RecvOutcome {
    Token(Token),
    Closed,
}

impl TokenReceiver {
    /// Blocks until a token is available or the channel is closed and
    /// drained.
    pub fn recv(&self) -> RecvOutcome {
        match self.inner.recv() {
            Ok(token) => RecvOutcome::Token(token),
            Err(RecvError) => RecvOutcome::Closed,
        }
    }
}

/// Creates a bounded channel pair with the given capacity.
pub fn bounded(capacity: usize) -> (TokenSender, TokenReceiver) {
    let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
    (
        TokenSender {
            inner: tx,
            closed: AtomicBool::new(false),
        },
        TokenReceiver { inner: rx },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn send_then_recv_delivers_in_order() {
        let (tx, rx) = bounded(4);
        tx.send(Token::new(TokenKind::Int, "1", 1)).unwrap();
        tx.send(Token::new(TokenKind::Int, "2", 1)).unwrap();
        match rx.recv() {
            RecvOutcome::Token(t) => assert_eq!(t.lexeme, "1"),
            RecvOutcome::Closed => panic!("expected token"),
        }
        match rx.recv() {
            RecvOutcome::Token(t) => assert_eq!(t.lexeme, "2"),
            RecvOutcome::Closed => panic!("expected token"),
        }
    }

    #[test]
    fn closed_empty_channel_returns_closed() {
        let (tx, rx) = bounded(4);
        tx.close();
        drop(tx);
        assert!(matches!(rx.recv(), RecvOutcome::Closed));
    }

    #[test]
    fn close_is_idempotent() {
        let (tx, _rx) = bounded(1);
        tx.close();
        tx.close();
        assert!(tx.send(Token::new(TokenKind::Eof, "", 1)).is_err());
    }

    #[test]
    fn full_channel_rejects_try_send() {
        let (tx, _rx) = bounded(1);
        tx.try_send(Token::new(TokenKind::Int, "1", 1)).unwrap();
        assert!(matches!(
            tx.try_send(Token::new(TokenKind::Int, "2", 1)),
            Err(TrySendError::Full(_))
        ));
    }
}
