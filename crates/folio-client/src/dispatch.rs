//! Inbound frame dispatch.
//!
//! The single entry point for every delivered frame. Each notice in a frame
//! is routed by action to the handler set the current page registered; a
//! failing or missing reaction never aborts the rest of the batch.

use std::sync::Arc;

use folio_core::{parse_frame, Action, Notice, RoleChange};
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

/// Capability set a page registers to react to live notices.
///
/// Every method defaults to a no-op so a page only implements what it
/// actually renders; the dispatcher never needs to know which page is
/// loaded.
pub trait OccasionHandlers: Send + Sync {
    fn on_create(&self, _notice: &Notice) -> ClientResult<()> {
        Ok(())
    }

    fn on_update(&self, _notice: &Notice) -> ClientResult<()> {
        Ok(())
    }

    fn on_delete(&self, _notice: &Notice) -> ClientResult<()> {
        Ok(())
    }

    fn on_edit(&self, _notice: &Notice) -> ClientResult<()> {
        Ok(())
    }

    fn on_stop(&self, _notice: &Notice) -> ClientResult<()> {
        Ok(())
    }

    fn on_role_change(&self, _notice: &Notice, _change: RoleChange) -> ClientResult<()> {
        Ok(())
    }

    fn on_group_updated(&self, _notice: &Notice) -> ClientResult<()> {
        Ok(())
    }

    fn on_group_removed(&self, _notice: &Notice) -> ClientResult<()> {
        Ok(())
    }

    /// A group was created; the collection should be refetched (`id == "0"`).
    fn on_group_list_changed(&self, _notice: &Notice) -> ClientResult<()> {
        Ok(())
    }

    fn on_user_details_updated(&self, _notice: &Notice) -> ClientResult<()> {
        Ok(())
    }

    fn on_user_photo_updated(&self, _notice: &Notice) -> ClientResult<()> {
        Ok(())
    }
}

/// Routes decoded notices to the registered handler set.
#[derive(Clone)]
pub struct Dispatcher {
    handlers: Arc<dyn OccasionHandlers>,
}

impl Dispatcher {
    pub fn new(handlers: Arc<dyn OccasionHandlers>) -> Self {
        Self { handlers }
    }

    /// Decode a frame body and process each notice in array order.
    ///
    /// Returns an error only when the body itself does not parse; individual
    /// handler failures are logged and skipped.
    pub fn dispatch_frame(&self, body: &str) -> ClientResult<()> {
        let frame = parse_frame(body).map_err(ClientError::Malformed)?;
        debug!(count = frame.len(), "Dispatching notice frame");
        for notice in &frame {
            self.dispatch(notice);
        }
        Ok(())
    }

    /// Route one notice. A handler error is contained here.
    pub fn dispatch(&self, notice: &Notice) {
        let result = match &notice.action {
            Action::Create => self.handlers.on_create(notice),
            Action::Update => self.handlers.on_update(notice),
            Action::Delete => self.handlers.on_delete(notice),
            Action::Edit => self.handlers.on_edit(notice),
            Action::Stop => self.handlers.on_stop(notice),
            Action::AddRole => self.handlers.on_role_change(notice, RoleChange::Add),
            Action::DeleteRole => self.handlers.on_role_change(notice, RoleChange::Delete),
            Action::UpdateGroup => self.handlers.on_group_updated(notice),
            Action::DeleteGroup => self.handlers.on_group_removed(notice),
            Action::NewGroup => self.handlers.on_group_list_changed(notice),
            Action::UpdateUserDetails => self.handlers.on_user_details_updated(notice),
            Action::UpdateUserPhoto => self.handlers.on_user_photo_updated(notice),
            Action::Unknown(tag) => {
                debug!(action = %tag, "Ignoring notice with unknown action");
                Ok(())
            }
        };
        if let Err(error) = result {
            warn!(
                %error,
                action = %notice.action,
                id = %notice.id,
                "Notice handler failed, skipping message"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every routed call as "method:id".
    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<String>>,
    }

    impl Recording {
        fn push(&self, method: &str, notice: &Notice) -> ClientResult<()> {
            self.calls.lock().unwrap().push(format!("{method}:{}", notice.id));
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl OccasionHandlers for Recording {
        fn on_create(&self, notice: &Notice) -> ClientResult<()> {
            self.push("create", notice)
        }

        fn on_update(&self, notice: &Notice) -> ClientResult<()> {
            self.push("update", notice)
        }

        fn on_delete(&self, notice: &Notice) -> ClientResult<()> {
            self.push("delete", notice)
        }

        fn on_role_change(&self, notice: &Notice, change: RoleChange) -> ClientResult<()> {
            let method = match change {
                RoleChange::Add => "role-add",
                RoleChange::Delete => "role-delete",
            };
            self.push(method, notice)
        }

        fn on_group_list_changed(&self, notice: &Notice) -> ClientResult<()> {
            self.push("group-list", notice)
        }
    }

    /// Fails on create, records everything else.
    struct FailingCreate(Recording);

    impl OccasionHandlers for FailingCreate {
        fn on_create(&self, _notice: &Notice) -> ClientResult<()> {
            Err(ClientError::handler("create handler is broken"))
        }

        fn on_update(&self, notice: &Notice) -> ClientResult<()> {
            self.0.push("update", notice)
        }
    }

    fn wire(data: &str, id: &str, action: &str) -> String {
        format!(
            r#"{{"data":"{data}","id":"{id}","action":"{action}","editorId":"99","editorName":"Remote"}}"#
        )
    }

    #[test]
    fn test_messages_in_a_frame_run_in_array_order() {
        let recording = Arc::new(Recording::default());
        let dispatcher = Dispatcher::new(recording.clone());

        let body = format!("[{},{}]", wire("event", "1", "create"), wire("event", "1", "update"));
        dispatcher.dispatch_frame(&body).unwrap();

        assert_eq!(recording.calls(), vec!["create:1", "update:1"]);
    }

    #[test]
    fn test_unknown_action_is_skipped_and_batch_continues() {
        let recording = Arc::new(Recording::default());
        let dispatcher = Dispatcher::new(recording.clone());

        let body = format!(
            "[{},{}]",
            wire("", "0", "unknownFutureAction"),
            wire("event", "5", "delete")
        );
        dispatcher.dispatch_frame(&body).unwrap();

        assert_eq!(recording.calls(), vec!["delete:5"]);
    }

    #[test]
    fn test_handler_error_does_not_abort_the_batch() {
        let handlers = Arc::new(FailingCreate(Recording::default()));
        let dispatcher = Dispatcher::new(handlers.clone());

        let body = format!("[{},{}]", wire("event", "1", "create"), wire("event", "2", "update"));
        dispatcher.dispatch_frame(&body).unwrap();

        assert_eq!(handlers.0.calls(), vec!["update:2"]);
    }

    #[test]
    fn test_role_change_direction_is_routed() {
        let recording = Arc::new(Recording::default());
        let dispatcher = Dispatcher::new(recording.clone());

        let body = format!(
            "[{},{}]",
            wire("TEACHER", "8", "add role"),
            wire("TEACHER", "8", "delete role")
        );
        dispatcher.dispatch_frame(&body).unwrap();

        assert_eq!(recording.calls(), vec!["role-add:8", "role-delete:8"]);
    }

    #[test]
    fn test_collection_level_group_create_uses_zero_sentinel() {
        let recording = Arc::new(Recording::default());
        let dispatcher = Dispatcher::new(recording.clone());

        dispatcher
            .dispatch_frame(&format!("[{}]", wire("group", "0", "newGroup")))
            .unwrap();

        assert_eq!(recording.calls(), vec!["group-list:0"]);
    }

    #[test]
    fn test_malformed_frame_is_an_error() {
        let dispatcher = Dispatcher::new(Arc::new(Recording::default()));
        assert!(dispatcher.dispatch_frame("not json").is_err());
        assert!(dispatcher.dispatch_frame(r#"{"not":"an array"}"#).is_err());
    }
}
