//! Folio Notify Client
//!
//! The client side of the live edit-notification protocol: a reconnecting
//! WebSocket channel, a fire-and-forget outbound notifier, a dispatcher that
//! routes inbound frames to page-level handler sets, and the advisory
//! edit-lock state machine that keeps concurrent editors out of each other's
//! way.

pub mod channel;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod locks;
pub mod notifier;
pub mod session;

pub use channel::Channel;
pub use config::ChannelConfig;
pub use dispatch::{Dispatcher, OccasionHandlers};
pub use error::{ClientError, ClientResult};
pub use locks::{EditLocks, LockRetry, LockState, LockingHandlers, PageSurface};
pub use notifier::Notifier;
pub use session::{Role, Session};
