//! Dispatch table
//!
//! Ordered registry of known event names and the handler bound to each.
//! Lookup is a linear, case-sensitive scan; the table holds a few dozen
//! entries and is consulted once per dispatch frame.

use super::{EventCallbacks, GatewayEventType};
use crate::handlers::{self, HandlerResult};
use crate::protocol::GatewayMessage;
use cord_core::Arena;
use serde_json::Value;
use thiserror::Error;

/// State a handler may touch while processing one dispatch
///
/// The arena is inside a scope opened for this dispatch; everything
/// allocated from it is released once the handler returns.
pub struct DispatchContext<'a> {
    pub arena: &'a mut Arena,
    pub callbacks: &'a mut EventCallbacks,
    /// Messages to send once the handler returns
    pub outbox: &'a mut Vec<GatewayMessage>,
    pub sequence: i64,
}

/// Event handler: receives the raw `d` payload and the event name
pub type EventHandler = fn(&mut DispatchContext<'_>, &Value, &str) -> HandlerResult<()>;

/// One registry entry; `handler == None` means recognized but unhandled
#[derive(Debug, Clone, Copy)]
pub struct DispatchEntry {
    name: &'static str,
    handler: Option<EventHandler>,
}

impl DispatchEntry {
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn handler(&self) -> Option<EventHandler> {
        self.handler
    }

    #[inline]
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }
}

/// Result of resolving an event name
#[derive(Debug, Clone, Copy)]
pub enum Lookup {
    /// Known event with a bound handler
    Handled(EventHandler),
    /// Known event without a handler
    Unhandled,
    /// Event name not in the table
    NotFound,
}

/// Dispatch table errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Unknown gateway event: {0}")]
    UnknownEvent(String),
}

/// Registry mapping event names to handlers
#[derive(Debug, Clone)]
pub struct DispatchTable {
    entries: Vec<DispatchEntry>,
}

impl DispatchTable {
    /// Table of every known event with no handlers bound
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: GatewayEventType::ALL
                .iter()
                .map(|event| DispatchEntry {
                    name: event.as_str(),
                    handler: None,
                })
                .collect(),
        }
    }

    /// Table with the built-in handlers bound (`READY`, `MESSAGE_CREATE`)
    #[must_use]
    pub fn with_default_handlers() -> Self {
        let mut table = Self::new();
        table.bind_event(GatewayEventType::Ready, handlers::ready);
        table.bind_event(GatewayEventType::MessageCreate, handlers::message_create);
        table
    }

    /// First entry whose name matches exactly
    pub fn find(&self, name: &str) -> Option<&DispatchEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn lookup(&self, name: &str) -> Lookup {
        match self.find(name) {
            Some(DispatchEntry {
                handler: Some(handler),
                ..
            }) => Lookup::Handled(*handler),
            Some(_) => Lookup::Unhandled,
            None => Lookup::NotFound,
        }
    }

    /// True only for a known event with a bound handler
    pub fn has_handler(&self, name: &str) -> bool {
        self.find(name).is_some_and(DispatchEntry::has_handler)
    }

    /// Bind `handler` to a known event name, replacing any previous handler
    pub fn bind(&mut self, name: &str, handler: EventHandler) -> Result<(), DispatchError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.name == name)
            .ok_or_else(|| DispatchError::UnknownEvent(name.to_string()))?;
        entry.handler = Some(handler);
        Ok(())
    }

    /// Bind `handler` to a typed event; cannot fail
    pub fn bind_event(&mut self, event: GatewayEventType, handler: EventHandler) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == event.as_str()) {
            entry.handler = Some(handler);
        }
    }

    /// Remove the handler bound to `name`, returning it
    pub fn unbind(&mut self, name: &str) -> Result<Option<EventHandler>, DispatchError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.name == name)
            .ok_or_else(|| DispatchError::UnknownEvent(name.to_string()))?;
        Ok(entry.handler.take())
    }

    pub fn entries(&self) -> &[DispatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::with_default_handlers()
    }
}
