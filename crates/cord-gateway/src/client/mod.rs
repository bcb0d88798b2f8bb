//! Gateway client
//!
//! Owns a [`GatewaySession`] and drives it from a single task: transport
//! events, heartbeat deadlines, the periodic memory report and the shutdown
//! signal are multiplexed with `tokio::select!`. Reconnection and fatal
//! closes are decided here from the flags the session sets.

use crate::error::GatewayError;
use crate::events::{Context, DispatchError, DispatchTable, EventCallbacks, EventHandler};
use crate::session::{GatewaySession, SessionConfig};
use crate::transport::{Connector, TransportError, TransportEvent};
use cord_common::config::{CordConfig, DEFAULT_GATEWAY_URL};
use cord_core::MessageView;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Why [`Client::drive`] returned
enum Flow {
    Shutdown,
    Reconnect,
    Fatal(crate::protocol::CloseCode),
}

/// Builder for [`Client`]
pub struct ClientBuilder {
    session: SessionConfig,
    gateway_url: String,
    memory_report_interval: Option<Duration>,
    callbacks: EventCallbacks,
    dispatch: DispatchTable,
    bind_error: Option<DispatchError>,
}

impl ClientBuilder {
    /// Builder with default settings for the given token
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_session_config(SessionConfig::new(token))
    }

    #[must_use]
    pub fn with_session_config(session: SessionConfig) -> Self {
        Self {
            session,
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            memory_report_interval: None,
            callbacks: EventCallbacks::new(),
            dispatch: DispatchTable::with_default_handlers(),
            bind_error: None,
        }
    }

    #[must_use]
    pub fn gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = url.into();
        self
    }

    /// Log arena statistics at this interval; `None` disables the report
    #[must_use]
    pub fn memory_report_interval(mut self, interval: Option<Duration>) -> Self {
        self.memory_report_interval = interval.filter(|d| !d.is_zero());
        self
    }

    #[must_use]
    pub fn on_message<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut Context<'_>, &MessageView<'_>) + Send + 'static,
    {
        self.callbacks = self.callbacks.on_message(callback);
        self
    }

    #[must_use]
    pub fn on_transport_error<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&TransportError) + Send + 'static,
    {
        self.callbacks = self.callbacks.on_transport_error(callback);
        self
    }

    /// Bind a handler to a known event name
    ///
    /// Binding an unknown name is reported by [`build`](Self::build).
    #[must_use]
    pub fn handler(mut self, event: &str, handler: EventHandler) -> Self {
        if let Err(e) = self.dispatch.bind(event, handler) {
            self.bind_error.get_or_insert(e);
        }
        self
    }

    pub fn build(self) -> Result<Client, GatewayError> {
        if let Some(e) = self.bind_error {
            return Err(e.into());
        }
        self.session.validate()?;

        Ok(Client {
            session: GatewaySession::with_dispatch_table(self.session, self.callbacks, self.dispatch),
            gateway_url: self.gateway_url,
            memory_report_interval: self.memory_report_interval,
        })
    }
}

/// Gateway client running one session at a time
pub struct Client {
    session: GatewaySession,
    gateway_url: String,
    memory_report_interval: Option<Duration>,
}

impl Client {
    /// Builder seeded from the loaded configuration
    #[must_use]
    pub fn builder(config: &CordConfig) -> ClientBuilder {
        ClientBuilder::with_session_config(SessionConfig::from(config))
            .gateway_url(config.gateway_url.clone())
            .memory_report_interval(config.memory_report_interval)
    }

    pub fn session(&self) -> &GatewaySession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GatewaySession {
        &mut self.session
    }

    pub fn gateway_url(&self) -> &str {
        &self.gateway_url
    }

    /// Run until Ctrl-C or a fatal close
    pub async fn run<C>(&mut self, connector: &C) -> Result<(), GatewayError>
    where
        C: Connector + ?Sized,
    {
        self.run_until(connector, shutdown_signal()).await
    }

    /// Run until `shutdown` completes or the gateway closes fatally
    ///
    /// A failed connect ends the run; reconnects after a recoverable close
    /// go back to the same URL.
    pub async fn run_until<C, S>(&mut self, connector: &C, shutdown: S) -> Result<(), GatewayError>
    where
        C: Connector + ?Sized,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tracing::info!(url = %self.gateway_url, "Connecting to gateway");

            let connection = tokio::select! {
                () = &mut shutdown => {
                    self.session.shutdown();
                    return Ok(());
                }
                result = connector.connect(&self.gateway_url) => match result {
                    Ok(connection) => connection,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to connect to gateway");
                        self.session.shutdown();
                        return Err(e.into());
                    }
                },
            };

            self.session.attach_transport(connection.transport);

            match self.drive(connection.events, shutdown.as_mut()).await {
                Flow::Shutdown => {
                    tracing::info!("Shutdown requested");
                    self.session.shutdown();
                    return Ok(());
                }
                Flow::Fatal(code) => {
                    self.session.shutdown();
                    return Err(GatewayError::FatalClose(code));
                }
                Flow::Reconnect => self.session.begin_reconnect(),
            }
        }
    }

    /// Feed one connection's events into the session until it must end
    async fn drive<S>(&mut self, mut events: mpsc::Receiver<TransportEvent>, mut shutdown: Pin<&mut S>) -> Flow
    where
        S: Future<Output = ()>,
    {
        let mut report = self.memory_report_interval.map(|period| {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            tokio::select! {
                () = &mut shutdown => return Flow::Shutdown,
                event = events.recv() => {
                    let event = event.unwrap_or_else(|| TransportEvent::Close {
                        code: None,
                        reason: "event stream ended".to_string(),
                    });
                    self.session.on_transport_event(event);
                }
                () = sleep_until_opt(self.session.heartbeat_deadline()) => {
                    self.session.heartbeat_tick(Instant::now());
                }
                () = tick_opt(report.as_mut()) => self.session.log_memory_report(),
            }

            if let Some(code) = self.session.fatal_close() {
                return Flow::Fatal(code);
            }
            if self.session.must_reconnect() {
                return Flow::Reconnect;
            }
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("gateway_url", &self.gateway_url)
            .field("memory_report_interval", &self.memory_report_interval)
            .field("session", &self.session)
            .finish()
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn tick_opt(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Completes on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::HandlerResult;
    use crate::events::DispatchContext;
    use cord_common::ConfigError;
    use serde_json::Value;

    fn noop(_: &mut DispatchContext<'_>, _: &Value, _: &str) -> HandlerResult<()> {
        Ok(())
    }

    #[test]
    fn test_builder_binds_handlers() {
        let client = ClientBuilder::new("token")
            .handler("GUILD_CREATE", noop)
            .build()
            .unwrap();

        assert!(client.session().dispatch_table().has_handler("GUILD_CREATE"));
        assert!(client.session().dispatch_table().has_handler("MESSAGE_CREATE"));
        assert_eq!(client.gateway_url(), DEFAULT_GATEWAY_URL);
    }

    #[test]
    fn test_builder_rejects_unknown_event() {
        let err = ClientBuilder::new("token")
            .handler("NOT_AN_EVENT", noop)
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            GatewayError::Dispatch(DispatchError::UnknownEvent(ref name)) if name == "NOT_AN_EVENT"
        ));
    }

    #[test]
    fn test_builder_rejects_invalid_settings() {
        let err = ClientBuilder::new("").build().unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Config(ConfigError::MissingVar("CORD_APPLICATION_TOKEN"))
        ));

        let session = SessionConfig::new("token").with_arena_block_size(0);
        let err = ClientBuilder::with_session_config(session).build().unwrap_err();
        assert!(matches!(err, GatewayError::Config(ConfigError::InvalidValue(..))));
    }

    #[test]
    fn test_builder_from_config() {
        let mut config = CordConfig::new("token");
        config.gateway_url = "wss://example.invalid/?v=10".to_string();
        config.memory_report_interval = Some(Duration::ZERO);

        let client = Client::builder(&config).build().unwrap();

        assert_eq!(client.gateway_url(), "wss://example.invalid/?v=10");
        assert_eq!(client.memory_report_interval, None);
        assert_eq!(client.session().config().token, "token");
    }

    #[tokio::test]
    async fn test_sleep_until_none_never_completes() {
        let pending = tokio::time::timeout(Duration::from_millis(10), sleep_until_opt(None)).await;
        assert!(pending.is_err());
    }
}
