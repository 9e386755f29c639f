//! Connection state machine.

/// The current state of a connection.
///
/// The lifecycle is linear with one loop: `Subscribed` returns to
/// `Subscribing` when the query set changes, and every state can drop
/// to `Disconnected`. `Disconnected` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Transport is being established.
    Connecting,
    /// Transport is up; no subscription yet.
    Connected,
    /// A subscribe request is in flight, awaiting its snapshot.
    Subscribing,
    /// The snapshot has been applied; deltas are streaming.
    Subscribed,
    /// The connection is closed. Terminal.
    Disconnected,
}

impl ConnectionState {
    /// Returns true if the connection can still exchange frames.
    pub fn is_active(&self) -> bool {
        !matches!(self, ConnectionState::Disconnected)
    }

    /// Returns true if a new subscription can be requested.
    pub fn can_subscribe(&self) -> bool {
        matches!(self, ConnectionState::Connected | ConnectionState::Subscribed)
    }

    /// Returns true if moving to `next` is a legal transition.
    pub fn can_transition_to(&self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        if next == Disconnected {
            return *self != Disconnected;
        }
        matches!(
            (self, next),
            (Connecting, Connected)
                | (Connected, Subscribing)
                | (Subscribing, Subscribed)
                | (Subscribed, Subscribing)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::ConnectionState::*;

    #[test]
    fn lifecycle_transitions() {
        assert!(Connecting.can_transition_to(Connected));
        assert!(Connected.can_transition_to(Subscribing));
        assert!(Subscribing.can_transition_to(Subscribed));
        assert!(Subscribed.can_transition_to(Subscribing));

        assert!(!Connected.can_transition_to(Subscribed));
        assert!(!Subscribing.can_transition_to(Subscribing));
        assert!(!Subscribed.can_transition_to(Connected));
    }

    #[test]
    fn disconnected_is_terminal() {
        for state in [Connecting, Connected, Subscribing, Subscribed] {
            assert!(state.can_transition_to(Disconnected));
            assert!(state.is_active());
        }
        assert!(!Disconnected.can_transition_to(Disconnected));
        assert!(!Disconnected.can_transition_to(Connected));
        assert!(!Disconnected.is_active());
    }

    #[test]
    fn subscribe_permission() {
        assert!(Connected.can_subscribe());
        assert!(Subscribed.can_subscribe());
        assert!(!Connecting.can_subscribe());
        assert!(!Subscribing.can_subscribe());
        assert!(!Disconnected.can_subscribe());
    }
}
