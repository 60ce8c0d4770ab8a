//! Connection lifecycle states.

/// Where a session is in its connection lifecycle.
///
/// ```text
/// Disconnected -> Connecting -> Connected -> Disconnecting -> Disconnected
/// ```
///
/// A transport failure may jump straight back to `Disconnected` from any
/// live state, and `close()` may be called while still `Connecting`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionState {
    /// No connection. Identity may be changed.
    #[default]
    Disconnected,
    /// `open()` was called; transport and handshake are in progress.
    Connecting,
    /// The server welcomed us.
    Connected,
    /// `close()` was called; waiting for the transport to go away.
    Disconnecting,
}

impl SessionState {
    /// Whether the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Disconnected, Connecting)
                | (Connecting, Connected)
                | (Connecting, Disconnecting)
                | (Connecting, Disconnected)
                | (Connected, Disconnecting)
                | (Connected, Disconnected)
                | (Disconnecting, Disconnected)
        )
    }

    /// Whether a connection exists or is being set up.
    pub fn is_live(self) -> bool {
        self != SessionState::Disconnected
    }
}

#[cfg(test)]
mod tests {
    use super::SessionState::*;

    #[test]
    fn test_forward_path() {
        assert!(Disconnected.can_transition_to(Connecting));
        assert!(Connecting.can_transition_to(Connected));
        assert!(Connected.can_transition_to(Disconnecting));
        assert!(Disconnecting.can_transition_to(Disconnected));
    }

    #[test]
    fn test_no_skipping_ahead() {
        assert!(!Disconnected.can_transition_to(Connected));
        assert!(!Disconnecting.can_transition_to(Connected));
        assert!(!Connected.can_transition_to(Connected));
        assert!(!Disconnected.can_transition_to(Disconnecting));
    }

    #[test]
    fn test_live() {
        assert!(!Disconnected.is_live());
        assert!(Disconnecting.is_live());
    }
}
