//! Session lifecycle states

use std::fmt;

/// Connection lifecycle of a gateway session
///
/// `Disconnected -> Connecting -> AwaitingHandshake -> Identifying -> Steady`,
/// with `Steady <-> Reconnecting` on peer-requested or recoverable closes and
/// `Closed` as the terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No transport attached
    #[default]
    Disconnected,
    /// Transport attached, waiting for it to open
    Connecting,
    /// Connection open, waiting for HELLO
    AwaitingHandshake,
    /// IDENTIFY sent, waiting for the first dispatch
    Identifying,
    /// Receiving dispatches
    Steady,
    /// Torn down, about to reconnect
    Reconnecting,
    /// Shut down or closed with a fatal code
    Closed,
}

impl SessionState {
    /// Get the name of this state
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::AwaitingHandshake => "AwaitingHandshake",
            Self::Identifying => "Identifying",
            Self::Steady => "Steady",
            Self::Reconnecting => "Reconnecting",
            Self::Closed => "Closed",
        }
    }

    /// Whether a transport is expected to be attached in this state
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(
            self,
            Self::Connecting | Self::AwaitingHandshake | Self::Identifying | Self::Steady
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
