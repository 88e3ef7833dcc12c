//! The notification channel.
//!
//! Maintains exactly one logical connection to the server's notification
//! endpoint. Connection loss is recoverable and invisible except for a gap
//! in live updates: the channel retries forever on a fixed delay, and no
//! feature ever blocks on it.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use folio_core::NoticeDraft;

use crate::config::ChannelConfig;
use crate::dispatch::Dispatcher;
use crate::error::{ClientError, ClientResult};
use crate::notifier::Notifier;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// A reconnecting connection to the notification endpoint.
///
/// Inbound frames go to the [`Dispatcher`]; outbound drafts arrive through
/// [`Notifier`] handles and are written to whichever connection is live.
pub struct Channel {
    config: ChannelConfig,
    dispatcher: Dispatcher,
    outbound_tx: mpsc::UnboundedSender<NoticeDraft>,
    outbound_rx: mpsc::UnboundedReceiver<NoticeDraft>,
}

impl Channel {
    pub fn new(config: ChannelConfig, dispatcher: Dispatcher) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        Self {
            config,
            dispatcher,
            outbound_tx,
            outbound_rx,
        }
    }

    /// A publish handle bound to this channel. Valid across reconnects.
    pub fn notifier(&self) -> Notifier {
        Notifier::new(self.outbound_tx.clone())
    }

    /// Run the channel until the page/session ends.
    ///
    /// Every failure, including the initial connect, is logged and followed
    /// by a fixed-delay retry; nothing is surfaced to the user.
    pub async fn run(mut self) {
        loop {
            match self.connect().await {
                Ok(stream) => {
                    info!(url = %self.config.url, "Notification channel connected");
                    if let Err(error) = self.session(stream).await {
                        debug!(%error, "Notification channel dropped");
                    }
                }
                Err(error) => {
                    debug!(%error, url = %self.config.url, "Notification channel connect failed");
                }
            }
            tokio::time::sleep(self.config.reconnect_delay).await;
        }
    }

    async fn connect(&self) -> ClientResult<WsStream> {
        let mut request = self.config.url.as_str().into_client_request()?;
        for (name, value) in &self.config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ClientError::handler(format!("Invalid header name: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ClientError::handler(format!("Invalid header value: {e}")))?;
            request.headers_mut().insert(name, value);
        }
        let (stream, _response) = connect_async(request).await?;
        Ok(stream)
    }

    /// One connected session: pump frames until the connection dies.
    async fn session(&mut self, stream: WsStream) -> ClientResult<()> {
        let (mut sink, mut source) = stream.split();
        let mut heartbeat = tokio::time::interval(self.config.heartbeat);

        loop {
            tokio::select! {
                draft = self.outbound_rx.recv() => match draft {
                    Some(draft) => {
                        let body = serde_json::to_string(&draft)?;
                        debug!(body = %body, "Publishing notice");
                        sink.send(Message::Text(body)).await?;
                    }
                    // Every Notifier handle dropped; keep receiving.
                    None => {}
                },
                frame = source.next() => match frame {
                    Some(Ok(Message::Text(body))) => {
                        if let Err(error) = self.dispatcher.dispatch_frame(&body) {
                            warn!(%error, "Discarding undecodable frame");
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        sink.send(Message::Pong(payload)).await?;
                    }
                    Some(Ok(Message::Close(_))) | None => return Ok(()),
                    Some(Ok(_)) => {}
                    Some(Err(error)) => return Err(error.into()),
                },
                _ = heartbeat.tick() => {
                    sink.send(Message::Ping(Vec::new())).await?;
                }
            }
        }
    }
}
