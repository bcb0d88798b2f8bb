//! Close codes sent by the gateway
//!
//! Only the reconnect policy matters to the session: a handful of codes mean
//! the same identify would be rejected again, everything else is retried.

/// Gateway close code (4000-4014, 4006 is unassigned)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CloseCode {
    UnknownError = 4000,
    UnknownOpcode = 4001,
    DecodeError = 4002,
    NotAuthenticated = 4003,
    AuthenticationFailed = 4004,
    AlreadyAuthenticated = 4005,
    InvalidSequence = 4007,
    RateLimited = 4008,
    SessionTimedOut = 4009,
    InvalidShard = 4010,
    ShardingRequired = 4011,
    InvalidApiVersion = 4012,
    InvalidIntents = 4013,
    /// A privileged intent is not enabled for the application
    DisallowedIntents = 4014,
}

/// Every assigned code, in numeric order
const ALL: [CloseCode; 14] = [
    CloseCode::UnknownError,
    CloseCode::UnknownOpcode,
    CloseCode::DecodeError,
    CloseCode::NotAuthenticated,
    CloseCode::AuthenticationFailed,
    CloseCode::AlreadyAuthenticated,
    CloseCode::InvalidSequence,
    CloseCode::RateLimited,
    CloseCode::SessionTimedOut,
    CloseCode::InvalidShard,
    CloseCode::ShardingRequired,
    CloseCode::InvalidApiVersion,
    CloseCode::InvalidIntents,
    CloseCode::DisallowedIntents,
];

impl CloseCode {
    /// `None` for standard WebSocket codes and unassigned gateway codes
    pub fn from_u16(value: u16) -> Option<Self> {
        ALL.into_iter().find(|code| code.as_u16() == value)
    }

    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// False when reconnecting would be refused for the same reason
    pub const fn should_reconnect(self) -> bool {
        !matches!(
            self,
            Self::AuthenticationFailed
                | Self::InvalidShard
                | Self::ShardingRequired
                | Self::InvalidApiVersion
                | Self::InvalidIntents
                | Self::DisallowedIntents
        )
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownError => "unknown error",
            Self::UnknownOpcode => "unknown opcode",
            Self::DecodeError => "payload could not be decoded",
            Self::NotAuthenticated => "payload sent before identify",
            Self::AuthenticationFailed => "authentication failed",
            Self::AlreadyAuthenticated => "identify sent twice",
            Self::InvalidSequence => "invalid resume sequence",
            Self::RateLimited => "rate limited",
            Self::SessionTimedOut => "session timed out",
            Self::InvalidShard => "invalid shard",
            Self::ShardingRequired => "sharding required",
            Self::InvalidApiVersion => "invalid API version",
            Self::InvalidIntents => "invalid intents",
            Self::DisallowedIntents => "disallowed intents",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.description())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}
