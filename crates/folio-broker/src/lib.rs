//! Folio Notify Broker
//!
//! Server-side broker state: the active-edit notice store and the broadcast
//! channel that fans whole frames out to every connected subscriber.

pub mod broadcast;
pub mod store;

pub use broadcast::{frame_channel, FrameReceiver, FrameSender};
pub use store::NoticeStore;
