//! In-flight reducer calls.
//!
//! Every call registers a completion slot keyed by a fresh token. A slot
//! resolves exactly once: with the server's committed/failed status when
//! the matching result frame arrives, or with
//! [`CallOutcome::ConnectionClosed`] if the connection drops first.

use std::collections::HashMap;

/// Correlation token identifying one reducer call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallToken(pub u64);

/// Final outcome of a reducer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// The reducer ran and its changes committed.
    Committed,
    /// The reducer rejected the call with this message.
    Failed(String),
    /// The connection dropped before a result arrived.
    ConnectionClosed,
}

/// Completion callback for a reducer call.
pub type CallResultCallback = Box<dyn FnOnce(CallOutcome)>;

struct PendingCall {
    reducer: String,
    callback: CallResultCallback,
}

/// The set of calls awaiting results.
#[derive(Default)]
pub struct PendingCalls {
    next_token: u64,
    calls: HashMap<u64, PendingCall>,
}

impl PendingCalls {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls still awaiting a result.
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Returns true if no calls are in flight.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Registers a call, returning its fresh token.
    pub fn register(&mut self, reducer: impl Into<String>, callback: CallResultCallback) -> CallToken {
        let token = self.next_token;
        self.next_token += 1;
        self.calls.insert(
            token,
            PendingCall {
                reducer: reducer.into(),
                callback,
            },
        );
        CallToken(token)
    }

    /// Resolves the call registered under `token`, invoking its callback.
    ///
    /// Returns the reducer name, or `None` if the token is unknown (already
    /// resolved, or never issued).
    pub fn resolve(&mut self, token: u64, outcome: CallOutcome) -> Option<String> {
        let call = self.calls.remove(&token)?;
        (call.callback)(outcome);
        Some(call.reducer)
    }

    /// Resolves every in-flight call with [`CallOutcome::ConnectionClosed`].
    ///
    /// Returns the number of calls that were failed.
    pub fn fail_all(&mut self) -> usize {
        let failed = self.calls.len();
        for (_, call) in self.calls.drain() {
            (call.callback)(CallOutcome::ConnectionClosed);
        }
        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn tokens_are_fresh() {
        let mut pending = PendingCalls::new();
        let a = pending.register("create_user", Box::new(|_| {}));
        let b = pending.register("create_user", Box::new(|_| {}));
        assert_ne!(a, b);
        assert_eq!(pending.len(), 2);
    }

    #[test]
    fn resolve_invokes_callback_once() {
        let mut pending = PendingCalls::new();
        let outcomes = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&outcomes);
        let token = pending.register(
            "create_user",
            Box::new(move |outcome| sink.borrow_mut().push(outcome)),
        );

        assert_eq!(
            pending.resolve(token.0, CallOutcome::Committed),
            Some("create_user".into())
        );
        // A second result for the same token finds nothing.
        assert_eq!(pending.resolve(token.0, CallOutcome::Committed), None);
        assert_eq!(*outcomes.borrow(), vec![CallOutcome::Committed]);
    }

    #[test]
    fn unknown_token_is_ignored() {
        let mut pending = PendingCalls::new();
        assert_eq!(pending.resolve(42, CallOutcome::Committed), None);
    }

    #[test]
    fn fail_all_resolves_with_connection_closed() {
        let mut pending = PendingCalls::new();
        let outcomes = Rc::new(RefCell::new(Vec::new()));

        for _ in 0..3 {
            let sink = Rc::clone(&outcomes);
            pending.register("noop", Box::new(move |o| sink.borrow_mut().push(o)));
        }

        assert_eq!(pending.fail_all(), 3);
        assert!(pending.is_empty());
        assert_eq!(
            *outcomes.borrow(),
            vec![CallOutcome::ConnectionClosed; 3]
        );
    }
}
