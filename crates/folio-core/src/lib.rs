//! Folio Notify Core
//!
//! Wire model for the live edit-notification protocol: notices, the fixed
//! action vocabulary, occasion kinds, and editor identity.

pub mod action;
pub mod editor;
pub mod error;
pub mod notice;
pub mod occasion;

pub use action::{Action, RoleChange};
pub use editor::Editor;
pub use error::{NoticeError, NoticeResult};
pub use notice::{parse_frame, Frame, Notice, NoticeDraft, UNLOCK_ALL, WHOLE_COLLECTION};
pub use occasion::OccasionKind;
