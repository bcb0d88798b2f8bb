//! WebSocket transport
//!
//! Connects with `tokio-tungstenite`, then splits the stream into a reader
//! task that forwards [`TransportEvent`]s and a writer task fed by the
//! [`WebSocketTransport`] handle.

use super::{Connection, Connector, FrameType, Transport, TransportError, TransportEvent};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Channel buffer size for inbound events
const EVENT_BUFFER_SIZE: usize = 100;

/// Opens WebSocket connections
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    event_buffer: usize,
}

impl WebSocketConnector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            event_buffer: EVENT_BUFFER_SIZE,
        }
    }

    /// Set the number of inbound events buffered before the reader waits
    #[must_use]
    pub fn with_event_buffer(mut self, event_buffer: usize) -> Self {
        self.event_buffer = event_buffer.max(1);
        self
    }
}

impl Default for WebSocketConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, url: &str) -> Result<Connection, TransportError> {
        let (stream, response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        tracing::debug!(url, status = %response.status(), "WebSocket handshake complete");

        let (mut ws_sink, mut ws_stream) = stream.split();
        let (event_tx, event_rx) = mpsc::channel(self.event_buffer);
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();

        // Announce the open connection before any frame
        if event_tx.send(TransportEvent::Open).await.is_err() {
            return Err(TransportError::Closed);
        }

        // Spawn task to send queued frames to the WebSocket
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let closing = matches!(msg, Message::Close(_));
                if let Err(e) = ws_sink.send(msg).await {
                    tracing::warn!(error = %e, "Failed to send frame to WebSocket");
                    break;
                }
                if closing {
                    break;
                }
            }

            let _ = ws_sink.close().await;
        });

        // Spawn task to receive frames from the WebSocket
        tokio::spawn(async move {
            while let Some(msg) = ws_stream.next().await {
                let event = match msg {
                    Ok(Message::Text(text)) => TransportEvent::Message(text),
                    Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                        Ok(text) => TransportEvent::Message(text),
                        Err(_) => {
                            tracing::debug!("Dropping non UTF-8 binary frame");
                            continue;
                        }
                    },
                    Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {
                        // Pong replies are queued by tungstenite
                        continue;
                    }
                    Ok(Message::Close(frame)) => {
                        let (code, reason) = frame.map_or((None, String::new()), |f| {
                            (Some(u16::from(f.code)), f.reason.into_owned())
                        });
                        let _ = event_tx.send(TransportEvent::Close { code, reason }).await;
                        return;
                    }
                    Err(e) => {
                        let _ = event_tx
                            .send(TransportEvent::Error(TransportError::Receive(e.to_string())))
                            .await;
                        break;
                    }
                };

                if event_tx.send(event).await.is_err() {
                    // Receiver dropped, the session moved on
                    return;
                }
            }

            let _ = event_tx
                .send(TransportEvent::Close {
                    code: None,
                    reason: "stream ended".to_string(),
                })
                .await;
        });

        Ok(Connection {
            transport: Box::new(WebSocketTransport { outgoing: out_tx }),
            events: event_rx,
        })
    }
}

/// Sending half of a WebSocket connection
#[derive(Debug)]
pub struct WebSocketTransport {
    outgoing: mpsc::UnboundedSender<Message>,
}

impl Transport for WebSocketTransport {
    fn send(&mut self, payload: &str, frame: FrameType) -> Result<(), TransportError> {
        let msg = match frame {
            FrameType::Text => Message::Text(payload.to_owned()),
            FrameType::Binary => Message::Binary(payload.as_bytes().to_vec()),
        };
        self.outgoing.send(msg).map_err(|_| TransportError::Closed)
    }

    fn close(&mut self) {
        let _ = self.outgoing.send(Message::Close(None));
    }
}
