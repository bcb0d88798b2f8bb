//! Message entity - a message delivered by `MESSAGE_CREATE`

use serde_json::Value;

use super::User;
use crate::error::DecodeError;
use crate::memory::{Arena, ArenaStr};
use crate::serialize::{Decode, Fields};

/// Message entity with its strings stored in an arena.
///
/// Only `content` is always present; partial payloads decode with the
/// remaining identifiers left unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub id: Option<ArenaStr>,
    pub channel_id: Option<ArenaStr>,
    pub guild_id: Option<ArenaStr>,
    pub author: Option<User>,
    pub content: ArenaStr,
    pub timestamp: Option<ArenaStr>,
    pub edited_timestamp: Option<ArenaStr>,
    pub tts: bool,
    pub mention_everyone: bool,
    pub pinned: bool,
    pub kind: Option<i64>,
    pub flags: Option<i64>,
    /// `message_reference.message_id` when this message is a reply
    pub reference_id: Option<ArenaStr>,
}

impl Message {
    /// Resolve this message's strings against the arena it was decoded into
    pub fn view<'a>(&'a self, arena: &'a Arena) -> MessageView<'a> {
        MessageView {
            message: self,
            arena,
        }
    }
}

impl Decode for Message {
    fn decode(value: &Value, arena: &mut Arena) -> Result<Self, DecodeError> {
        let fields = Fields::of(value, "message")?;

        let author = match fields.opt_object("author") {
            Some(author) => Some(User::decode(author, arena)?),
            None => None,
        };

        let reference_id = match fields.opt_object("message_reference") {
            Some(reference) => Fields::of(reference, "message_reference")?.opt_str("message_id", arena)?,
            None => None,
        };

        let content = match fields.opt_str("content", arena)? {
            Some(content) => content,
            None => arena.alloc_str("")?,
        };

        Ok(Self {
            id: fields.opt_str("id", arena)?,
            channel_id: fields.opt_str("channel_id", arena)?,
            guild_id: fields.opt_str("guild_id", arena)?,
            author,
            content,
            timestamp: fields.opt_str("timestamp", arena)?,
            edited_timestamp: fields.opt_str("edited_timestamp", arena)?,
            tts: fields.bool_or_false("tts")?,
            mention_everyone: fields.bool_or_false("mention_everyone")?,
            pinned: fields.bool_or_false("pinned")?,
            kind: fields.opt_i64("type")?,
            flags: fields.opt_i64("flags")?,
            reference_id,
        })
    }
}

/// Borrowed, resolved view of a [`Message`]
#[derive(Debug, Clone, Copy)]
pub struct MessageView<'a> {
    message: &'a Message,
    arena: &'a Arena,
}

impl<'a> MessageView<'a> {
    fn resolve(&self, s: ArenaStr) -> &'a str {
        self.arena.str(s).unwrap_or_default()
    }

    fn resolve_opt(&self, s: Option<ArenaStr>) -> Option<&'a str> {
        s.map(|s| self.resolve(s))
    }

    /// The underlying handle-based entity
    pub fn entity(&self) -> &'a Message {
        self.message
    }

    pub fn id(&self) -> Option<&'a str> {
        self.resolve_opt(self.message.id)
    }

    pub fn channel_id(&self) -> Option<&'a str> {
        self.resolve_opt(self.message.channel_id)
    }

    pub fn guild_id(&self) -> Option<&'a str> {
        self.resolve_opt(self.message.guild_id)
    }

    pub fn author(&self) -> Option<super::UserView<'a>> {
        self.message.author.as_ref().map(|a| a.view(self.arena))
    }

    pub fn content(&self) -> &'a str {
        self.resolve(self.message.content)
    }

    pub fn timestamp(&self) -> Option<&'a str> {
        self.resolve_opt(self.message.timestamp)
    }

    pub fn edited_timestamp(&self) -> Option<&'a str> {
        self.resolve_opt(self.message.edited_timestamp)
    }

    pub fn reference_id(&self) -> Option<&'a str> {
        self.resolve_opt(self.message.reference_id)
    }

    /// Check if message has been edited
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.message.edited_timestamp.is_some()
    }

    /// Check if message is a reply
    #[inline]
    pub fn is_reply(&self) -> bool {
        self.message.reference_id.is_some()
    }

    /// Check if the message was sent directly to the bot
    #[inline]
    pub fn is_direct(&self) -> bool {
        self.message.guild_id.is_none()
    }

    /// Check if the author is a bot account
    pub fn is_from_bot(&self) -> bool {
        self.author().is_some_and(|a| a.is_bot())
    }

    /// Get a truncated preview of the message (for logging)
    pub fn preview(&self, max_len: usize) -> &'a str {
        let content = self.content();
        if content.len() <= max_len {
            content
        } else {
            let mut end = max_len;
            while !content.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &content[..end]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_content_only() {
        let mut arena = Arena::new();
        let message = Message::decode(&json!({"content": "ping"}), &mut arena).unwrap();
        let view = message.view(&arena);

        assert_eq!(view.content(), "ping");
        assert_eq!(view.id(), None);
        assert!(view.author().is_none());
        assert!(view.is_direct());
    }

    #[test]
    fn test_decode_full_message() {
        let mut arena = Arena::new();
        let value = json!({
            "id": "1100",
            "channel_id": "200",
            "guild_id": "300",
            "author": {"id": "42", "username": "alice", "bot": false},
            "content": "hello there",
            "timestamp": "2024-01-01T00:00:00.000000+00:00",
            "edited_timestamp": null,
            "tts": false,
            "mention_everyone": false,
            "pinned": false,
            "type": 19,
            "flags": 0,
            "message_reference": {"message_id": "1099", "channel_id": "200"},
            "embeds": [],
            "attachments": []
        });

        let message = Message::decode(&value, &mut arena).unwrap();
        let view = message.view(&arena);

        assert_eq!(view.id(), Some("1100"));
        assert_eq!(view.channel_id(), Some("200"));
        assert_eq!(view.guild_id(), Some("300"));
        assert_eq!(view.author().unwrap().username(), "alice");
        assert_eq!(view.content(), "hello there");
        assert_eq!(view.reference_id(), Some("1099"));
        assert_eq!(message.kind, Some(19));
        assert!(view.is_reply());
        assert!(!view.is_edited());
        assert!(!view.is_direct());
        assert!(!view.is_from_bot());
    }

    #[test]
    fn test_missing_content_decodes_empty() {
        let mut arena = Arena::new();
        let message = Message::decode(&json!({"id": "1"}), &mut arena).unwrap();
        assert_eq!(message.view(&arena).content(), "");
    }

    #[test]
    fn test_invalid_author_rejected() {
        let mut arena = Arena::new();
        let err = Message::decode(&json!({"content": "x", "author": {"id": "1"}}), &mut arena)
            .unwrap_err();
        assert_eq!(err, DecodeError::MissingField("username"));
    }

    #[test]
    fn test_invalid_content_type() {
        let mut arena = Arena::new();
        let err = Message::decode(&json!({"content": 5}), &mut arena).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidField {
                field: "content",
                expected: "string"
            }
        );
    }

    #[test]
    fn test_decode_inside_scope_releases_storage() {
        let mut arena = Arena::with_capacity(256);
        let scope = arena.begin_scope();
        let message = Message::decode(&json!({"content": "scoped"}), &mut arena).unwrap();
        assert_eq!(message.view(&arena).content(), "scoped");
        arena.end_scope(scope);

        assert_eq!(arena.block_used(0), Some(0));
    }

    #[test]
    fn test_preview() {
        let mut arena = Arena::new();
        let message = Message::decode(&json!({"content": "héllo world"}), &mut arena).unwrap();
        let view = message.view(&arena);
        assert_eq!(view.preview(100), "héllo world");
        assert_eq!(view.preview(2), "h");
        assert_eq!(view.preview(3), "hé");
    }
}
