//! Application callbacks
//!
//! Handlers hand decoded events to the embedding application through these
//! callbacks. A callback receives a [`Context`] through which it can queue
//! outbound gateway messages; they are sent once the handler returns.

use crate::protocol::{GatewayMessage, PresenceUpdatePayload};
use crate::transport::TransportError;
use cord_core::MessageView;

/// Callback invoked for every decoded `MESSAGE_CREATE`
pub type MessageCallback = Box<dyn FnMut(&mut Context<'_>, &MessageView<'_>) + Send>;

/// Callback invoked for transport-level errors
pub type TransportErrorCallback = Box<dyn FnMut(&TransportError) + Send>;

/// Callbacks registered by the embedding application
#[derive(Default)]
pub struct EventCallbacks {
    on_message: Option<MessageCallback>,
    on_transport_error: Option<TransportErrorCallback>,
}

impl EventCallbacks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the message callback, replacing any previous one
    #[must_use]
    pub fn on_message<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut Context<'_>, &MessageView<'_>) + Send + 'static,
    {
        self.on_message = Some(Box::new(callback));
        self
    }

    /// Register the transport error callback, replacing any previous one
    #[must_use]
    pub fn on_transport_error<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&TransportError) + Send + 'static,
    {
        self.on_transport_error = Some(Box::new(callback));
        self
    }

    pub(crate) fn message(&mut self) -> Option<&mut MessageCallback> {
        self.on_message.as_mut()
    }

    pub(crate) fn transport_error(&mut self, error: &TransportError) {
        if let Some(callback) = self.on_transport_error.as_mut() {
            callback(error);
        }
    }
}

impl std::fmt::Debug for EventCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventCallbacks")
            .field("on_message", &self.on_message.is_some())
            .field("on_transport_error", &self.on_transport_error.is_some())
            .finish()
    }
}

/// Handle given to application callbacks
pub struct Context<'a> {
    outbox: &'a mut Vec<GatewayMessage>,
    sequence: i64,
    event: &'a str,
}

impl<'a> Context<'a> {
    pub(crate) fn new(outbox: &'a mut Vec<GatewayMessage>, sequence: i64, event: &'a str) -> Self {
        Self {
            outbox,
            sequence,
            event,
        }
    }

    /// Queue a presence update (op 3), sent once the callback returns
    pub fn update_presence(&mut self, presence: &PresenceUpdatePayload) -> Result<(), TransportError> {
        let message = GatewayMessage::presence_update(presence)
            .map_err(|e| TransportError::Send(e.to_string()))?;
        self.outbox.push(message);
        Ok(())
    }

    /// Sequence number of the dispatch being handled
    pub fn sequence(&self) -> i64 {
        self.sequence
    }

    /// Name of the dispatch event being handled
    pub fn event_name(&self) -> &str {
        self.event
    }
}
