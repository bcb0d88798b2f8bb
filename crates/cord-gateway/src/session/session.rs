//! Gateway session state machine
//!
//! A [`GatewaySession`] owns everything tied to one logical connection: the
//! sequence and heartbeat bookkeeping, the heartbeat timer, the transport it
//! sends on, the arena that per-dispatch work is decoded into, and the
//! dispatch table. It never awaits; the client loop feeds it transport
//! events and timer ticks and reads back `must_reconnect`.

use super::{SessionConfig, SessionState};
use crate::events::{DispatchContext, DispatchTable, EventCallbacks, EventHandler, Lookup};
use crate::heartbeat::HeartbeatScheduler;
use crate::protocol::{CloseCode, GatewayMessage, HelloPayload, OpCode, PresenceUpdatePayload};
use crate::transport::{FrameType, Transport, TransportError, TransportEvent};
use cord_core::{Arena, ArenaStats};
use serde::Deserialize;
use serde_json::Value;
use tokio::time::Instant;
use tracing::Span;

/// Protocol state machine for one gateway connection
pub struct GatewaySession {
    config: SessionConfig,
    state: SessionState,

    /// Last seen sequence number, `-1` until the first dispatch
    sequence: i64,
    heartbeat_interval_ms: Option<u64>,
    heartbeat_acknowledged: bool,
    sent_initial_heartbeat: bool,
    must_reconnect: bool,
    fatal_close: Option<CloseCode>,
    connections: u64,

    heartbeat: HeartbeatScheduler,
    transport: Option<Box<dyn Transport>>,
    arena: Arena,
    dispatch: DispatchTable,
    callbacks: EventCallbacks,
    outbox: Vec<GatewayMessage>,

    span: Span,
}

impl GatewaySession {
    /// Create a session with the built-in dispatch handlers
    pub fn new(config: SessionConfig, callbacks: EventCallbacks) -> Self {
        Self::with_dispatch_table(config, callbacks, DispatchTable::with_default_handlers())
    }

    pub fn with_dispatch_table(
        config: SessionConfig,
        callbacks: EventCallbacks,
        dispatch: DispatchTable,
    ) -> Self {
        let arena = Arena::with_sizes(config.arena_block_size, config.arena_block_size);
        let span = tracing::info_span!("gateway_session", connection = tracing::field::Empty);

        Self {
            config,
            state: SessionState::Disconnected,
            sequence: -1,
            heartbeat_interval_ms: None,
            heartbeat_acknowledged: true,
            sent_initial_heartbeat: false,
            must_reconnect: false,
            fatal_close: None,
            connections: 0,
            heartbeat: HeartbeatScheduler::new(),
            transport: None,
            arena,
            dispatch,
            callbacks,
            outbox: Vec::new(),
            span,
        }
    }

    fn in_span<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let span = self.span.clone();
        let _enter = span.enter();
        f(self)
    }

    // === Accessors ===

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn sequence(&self) -> i64 {
        self.sequence
    }

    #[inline]
    pub fn heartbeat_interval_ms(&self) -> Option<u64> {
        self.heartbeat_interval_ms
    }

    #[inline]
    pub fn heartbeat_acknowledged(&self) -> bool {
        self.heartbeat_acknowledged
    }

    #[inline]
    pub fn sent_initial_heartbeat(&self) -> bool {
        self.sent_initial_heartbeat
    }

    /// Set when the peer asked for a reconnect or closed recoverably
    #[inline]
    pub fn must_reconnect(&self) -> bool {
        self.must_reconnect
    }

    /// Close code that ended the session, if it was fatal
    #[inline]
    pub fn fatal_close(&self) -> Option<CloseCode> {
        self.fatal_close
    }

    /// Last heartbeat went unacknowledged
    ///
    /// Only reported in the logs; no reconnect is triggered from it.
    pub fn is_zombie(&self) -> bool {
        self.sent_initial_heartbeat && !self.heartbeat_acknowledged
    }

    #[inline]
    pub fn heartbeat(&self) -> &HeartbeatScheduler {
        &self.heartbeat
    }

    #[inline]
    pub fn heartbeat_deadline(&self) -> Option<Instant> {
        self.heartbeat.deadline()
    }

    #[inline]
    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    pub fn arena_stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    pub fn dispatch_table(&self) -> &DispatchTable {
        &self.dispatch
    }

    pub fn dispatch_table_mut(&mut self) -> &mut DispatchTable {
        &mut self.dispatch
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // === Lifecycle ===

    /// Attach a freshly opened transport
    pub fn attach_transport(&mut self, transport: Box<dyn Transport>) {
        self.in_span(|session| {
            if session.transport.is_some() {
                tracing::warn!("Replacing an attached transport");
                session.reset_connection_state();
            }

            session.transport = Some(transport);
            session.connections += 1;
            session.span.record("connection", session.connections);
            session.state = SessionState::Connecting;
            tracing::debug!("Transport attached");
        });
    }

    /// Tear down the connection so a new one can be attached
    ///
    /// The heartbeat timer is stopped before the transport is dropped.
    /// Sequence and acknowledgement state start over because the next
    /// connection identifies as a new session.
    pub fn begin_reconnect(&mut self) {
        self.in_span(|session| {
            session.reset_connection_state();
            session.state = SessionState::Reconnecting;

            tracing::info!("Reconnecting to the gateway");
        });
    }

    /// Drop the current connection and everything tied to it
    ///
    /// The timer stops before the transport it sends on is closed.
    fn reset_connection_state(&mut self) {
        self.heartbeat.stop();
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }

        self.sent_initial_heartbeat = false;
        self.must_reconnect = false;
        self.sequence = -1;
        self.heartbeat_acknowledged = true;
        self.heartbeat_interval_ms = None;
        self.outbox.clear();
        self.arena.reset();
    }

    /// Stop the heartbeat, close the transport and release arena contents
    pub fn shutdown(&mut self) {
        self.in_span(|session| {
            session.heartbeat.stop();
            if let Some(mut transport) = session.transport.take() {
                transport.close();
            }
            session.outbox.clear();
            session.arena.reset();
            session.state = SessionState::Closed;

            tracing::info!("Session closed");
        });
    }

    // === Inbound ===

    /// Process an event reported by the transport
    pub fn on_transport_event(&mut self, event: TransportEvent) {
        self.in_span(|session| match event {
            TransportEvent::Open => {
                if session.state == SessionState::Connecting {
                    session.state = SessionState::AwaitingHandshake;
                }
                tracing::info!("Gateway connection open");
            }
            TransportEvent::Message(raw) => session.process_frame(&raw),
            TransportEvent::Error(error) => {
                tracing::error!(error = %error, "Transport error");
                session.callbacks.transport_error(&error);
            }
            TransportEvent::Close { code, reason } => session.on_close(code, &reason),
        });
    }

    /// Process one raw inbound frame
    pub fn handle_frame(&mut self, raw: &str) {
        self.in_span(|session| session.process_frame(raw));
    }

    fn process_frame(&mut self, raw: &str) {
        let message = match GatewayMessage::parse(raw) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed frame");
                return;
            }
        };

        tracing::trace!(message = %message, "Frame received");
        self.route(message);
        self.log_liveness();
    }

    fn route(&mut self, message: GatewayMessage) {
        match message.op {
            OpCode::Hello => self.on_hello(&message.d),
            OpCode::Dispatch => self.on_dispatch(&message),
            OpCode::Heartbeat => {
                tracing::debug!("Gateway requested a heartbeat");
                self.send_heartbeat();
            }
            OpCode::Reconnect => {
                tracing::info!("Gateway requested a reconnect");
                self.must_reconnect = true;
            }
            OpCode::InvalidSession => {
                tracing::warn!(
                    resumable = message.d.as_bool().unwrap_or(false),
                    "Session invalidated by the gateway"
                );
            }
            OpCode::HeartbeatAck => {
                tracing::trace!("Heartbeat acknowledged");
                self.heartbeat_acknowledged = true;
            }
            op => tracing::warn!(op = %op, "Unexpected op code from gateway"),
        }
    }

    fn on_hello(&mut self, d: &Value) {
        let hello = match HelloPayload::deserialize(d) {
            Ok(hello) => hello,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed HELLO");
                return;
            }
        };

        if self.sent_initial_heartbeat {
            tracing::debug!("Repeated HELLO, sending heartbeat only");
            self.send_heartbeat();
            return;
        }

        let interval = hello.heartbeat_interval;
        tracing::info!(heartbeat_interval_ms = interval, "Received HELLO");

        self.heartbeat_interval_ms = Some(interval);
        self.send_heartbeat();
        self.send_identify();
        self.sent_initial_heartbeat = true;
        if interval > 0 {
            self.heartbeat.start(interval, Instant::now());
        } else {
            tracing::warn!("Zero heartbeat interval, the timer will not repeat");
        }
        self.state = SessionState::Identifying;
    }

    fn on_dispatch(&mut self, message: &GatewayMessage) {
        if let Some(s) = message.s {
            self.update_sequence(s);
        }

        if self.state == SessionState::Identifying {
            self.state = SessionState::Steady;
            tracing::info!("Session established");
        }

        let Some(name) = message.event_name() else {
            return;
        };

        match self.dispatch.lookup(name) {
            Lookup::Handled(handler) => self.run_handler(handler, &message.d, name),
            Lookup::Unhandled => tracing::debug!(event = name, "No handler bound, dropping event"),
            Lookup::NotFound => tracing::debug!(event = name, "Unknown event, dropping"),
        }
    }

    fn update_sequence(&mut self, s: i64) {
        if s > self.sequence {
            self.sequence = s;
        } else {
            tracing::debug!(
                sequence = s,
                current = self.sequence,
                "Ignoring sequence number not above the current one"
            );
        }
    }

    /// Run a handler inside an arena scope that ends when it returns
    fn run_handler(&mut self, handler: EventHandler, data: &Value, name: &str) {
        let scope = self.arena.begin_scope();
        let result = {
            let mut ctx = DispatchContext {
                arena: &mut self.arena,
                callbacks: &mut self.callbacks,
                outbox: &mut self.outbox,
                sequence: self.sequence,
            };
            handler(&mut ctx, data, name)
        };
        self.arena.end_scope(scope);

        match result {
            Ok(()) => tracing::trace!(event = name, "Event handled"),
            Err(e) if e.is_allocation_failure() => {
                tracing::error!(event = name, error = %e, "Arena allocation failed, dropping event");
            }
            Err(e) => tracing::warn!(event = name, error = %e, "Failed to decode event, dropping"),
        }

        self.flush_outbox();
    }

    fn on_close(&mut self, code: Option<u16>, reason: &str) {
        match code.and_then(CloseCode::from_u16) {
            Some(close) if !close.should_reconnect() => {
                tracing::error!(code = %close, reason, "Gateway closed the session");
                self.fatal_close = Some(close);
                self.state = SessionState::Closed;
            }
            _ => {
                tracing::warn!(code = ?code, reason, "Gateway connection closed");
                self.must_reconnect = true;
            }
        }
    }

    fn log_liveness(&self) {
        if !self.sent_initial_heartbeat {
            return;
        }
        if self.heartbeat_acknowledged {
            tracing::trace!("Connection healthy");
        } else {
            tracing::debug!("Connection zombie, last heartbeat not acknowledged");
        }
    }

    // === Outbound ===

    /// Send a heartbeat if the timer is due, then rearm it
    ///
    /// Returns whether a heartbeat was due.
    pub fn heartbeat_tick(&mut self, now: Instant) -> bool {
        self.in_span(|session| {
            if !session.heartbeat.fire(now) {
                return false;
            }
            if !session.heartbeat_acknowledged {
                tracing::warn!("Previous heartbeat was not acknowledged");
            }
            session.send_heartbeat();
            true
        })
    }

    /// Send a presence update right away
    pub fn update_presence(&mut self, presence: &PresenceUpdatePayload) -> Result<(), TransportError> {
        let message = GatewayMessage::presence_update(presence)
            .map_err(|e| TransportError::Send(e.to_string()))?;
        self.in_span(|session| session.send(&message))
    }

    /// Log arena statistics
    pub fn log_memory_report(&self) {
        let stats = self.arena.stats();
        let _enter = self.span.enter();
        tracing::info!(
            blocks = stats.blocks,
            used = stats.used,
            capacity = stats.capacity,
            "Arena memory report"
        );
    }

    fn send_heartbeat(&mut self) {
        let message = GatewayMessage::heartbeat(self.sequence);
        if self.transmit(&message) {
            self.heartbeat_acknowledged = false;
            tracing::debug!(sequence = self.sequence, "Heartbeat sent");
        }
    }

    fn send_identify(&mut self) {
        let message = match GatewayMessage::identify(&self.config.identify_payload()) {
            Ok(message) => message,
            Err(e) => {
                self.report_send_failure(OpCode::Identify, &TransportError::Send(e.to_string()));
                return;
            }
        };
        if self.transmit(&message) {
            tracing::info!(intents = %self.config.intents, "Identify sent");
        }
    }

    fn flush_outbox(&mut self) {
        for message in std::mem::take(&mut self.outbox) {
            self.transmit(&message);
        }
    }

    /// Send and report failures to the logs and the error callback
    fn transmit(&mut self, message: &GatewayMessage) -> bool {
        match self.send(message) {
            Ok(()) => true,
            Err(e) => {
                self.report_send_failure(message.op, &e);
                false
            }
        }
    }

    fn report_send_failure(&mut self, op: OpCode, error: &TransportError) {
        tracing::error!(op = %op, error = %error, "Failed to send frame");
        self.callbacks.transport_error(error);
    }

    fn send(&mut self, message: &GatewayMessage) -> Result<(), TransportError> {
        let transport = self.transport.as_mut().ok_or(TransportError::NotConnected)?;
        let json = message
            .to_json()
            .map_err(|e| TransportError::Send(e.to_string()))?;
        transport.send(&json, FrameType::Text)
    }
}

impl std::fmt::Debug for GatewaySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySession")
            .field("state", &self.state)
            .field("sequence", &self.sequence)
            .field("heartbeat_interval_ms", &self.heartbeat_interval_ms)
            .field("heartbeat_acknowledged", &self.heartbeat_acknowledged)
            .field("sent_initial_heartbeat", &self.sent_initial_heartbeat)
            .field("must_reconnect", &self.must_reconnect)
            .field("has_transport", &self.transport.is_some())
            .finish_non_exhaustive()
    }
}
