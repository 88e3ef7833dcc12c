//! Server configuration.

use std::time::Duration;

/// Tunables for the WebSocket endpoint.
#[derive(Debug, Clone, Copy)]
pub struct ServerConfig {
    /// Interval between protocol-level pings sent to each client. Detects
    /// silently-dead connections faster than TCP timeouts would.
    pub heartbeat: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            heartbeat: Duration::from_millis(4000),
        }
    }
}
