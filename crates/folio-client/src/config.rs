//! Channel configuration.

use std::time::Duration;

/// Tunables for the notification channel.
///
/// Owned by the [`Channel`](crate::Channel) and injected where needed; there
/// is no ambient global state.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// The notification endpoint, e.g. `ws://127.0.0.1:3030/ws`.
    pub url: String,
    /// Extra headers for the handshake. The auth gateway normally supplies
    /// identity; standalone clients set it here.
    pub headers: Vec<(String, String)>,
    /// Fixed delay before each reconnect attempt. Retries never give up.
    pub reconnect_delay: Duration,
    /// Interval between outgoing protocol pings.
    pub heartbeat: Duration,
}

impl ChannelConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            reconnect_delay: Duration::from_millis(1000),
            heartbeat: Duration::from_millis(4000),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}
