//! User entity - the author of a message or the current bot account

use serde_json::Value;

use crate::error::DecodeError;
use crate::memory::{Arena, ArenaStr};
use crate::serialize::{Decode, Fields};

/// User entity with its strings stored in an arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct User {
    pub id: ArenaStr,
    pub username: ArenaStr,
    pub discriminator: Option<ArenaStr>,
    pub global_name: Option<ArenaStr>,
    pub avatar: Option<ArenaStr>,
    pub bot: bool,
    pub system: bool,
}

impl User {
    /// Resolve this user's strings against the arena it was decoded into
    pub fn view<'a>(&'a self, arena: &'a Arena) -> UserView<'a> {
        UserView { user: self, arena }
    }
}

impl Decode for User {
    fn decode(value: &Value, arena: &mut Arena) -> Result<Self, DecodeError> {
        let fields = Fields::of(value, "user")?;
        Ok(Self {
            id: fields.str("id", arena)?,
            username: fields.str("username", arena)?,
            discriminator: fields.opt_str("discriminator", arena)?,
            global_name: fields.opt_str("global_name", arena)?,
            avatar: fields.opt_str("avatar", arena)?,
            bot: fields.bool_or_false("bot")?,
            system: fields.bool_or_false("system")?,
        })
    }
}

/// Borrowed, resolved view of a [`User`]
#[derive(Debug, Clone, Copy)]
pub struct UserView<'a> {
    user: &'a User,
    arena: &'a Arena,
}

impl<'a> UserView<'a> {
    fn resolve(&self, s: ArenaStr) -> &'a str {
        self.arena.str(s).unwrap_or_default()
    }

    pub fn id(&self) -> &'a str {
        self.resolve(self.user.id)
    }

    pub fn username(&self) -> &'a str {
        self.resolve(self.user.username)
    }

    pub fn discriminator(&self) -> Option<&'a str> {
        self.user.discriminator.map(|s| self.resolve(s))
    }

    pub fn global_name(&self) -> Option<&'a str> {
        self.user.global_name.map(|s| self.resolve(s))
    }

    pub fn avatar(&self) -> Option<&'a str> {
        self.user.avatar.map(|s| self.resolve(s))
    }

    /// Name shown in clients: the global name when set, otherwise the username
    pub fn display_name(&self) -> &'a str {
        self.global_name().unwrap_or_else(|| self.username())
    }

    /// Legacy `username#discriminator` tag; the bare username once
    /// discriminators are retired (`"0"`)
    pub fn tag(&self) -> String {
        match self.discriminator() {
            Some(d) if d != "0" => format!("{}#{}", self.username(), d),
            _ => self.username().to_string(),
        }
    }

    #[inline]
    pub fn is_bot(&self) -> bool {
        self.user.bot
    }

    #[inline]
    pub fn is_system(&self) -> bool {
        self.user.system
    }
}
