//! Advisory edit-lock tracking.
//!
//! Tracks, per rendered entity, whether a remote user is editing it, and
//! drives the page-side effects: an advisory banner naming the editor and
//! hidden edit/delete controls. The lock is advisory only; nothing stops a
//! determined client from issuing a conflicting write to the REST API.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use folio_core::{Editor, Notice};
use tracing::debug;

use crate::dispatch::OccasionHandlers;
use crate::error::ClientResult;
use crate::session::Session;

/// What the lock machine needs from the rendered page.
///
/// The web front end backs this with the DOM; tests use an in-memory fake.
pub trait PageSurface: Send + Sync {
    /// Whether the entity with this id is currently rendered.
    fn entity_exists(&self, entity_id: &str) -> bool;

    /// Show the advisory banner naming the editor of this entity.
    fn show_edit_notice(&self, entity_id: &str, editor: &Editor);

    /// Remove the advisory banner for this entity.
    fn clear_edit_notice(&self, entity_id: &str);

    fn hide_controls(&self, entity_id: &str);

    fn show_controls(&self, entity_id: &str);

    /// Remove the entity itself from the page.
    fn remove_entity(&self, entity_id: &str);
}

/// Observable lock state of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockState {
    Idle,
    LockedByRemote(Editor),
    LockedByLocal,
}

/// Retry policy for edit notices that arrive before their entity renders.
///
/// Page load and notice delivery race; rather than dropping the notice, the
/// lock is retried on a fixed spacing until the entity appears or the
/// budget runs out.
#[derive(Debug, Clone, Copy)]
pub struct LockRetry {
    pub delay: Duration,
    pub max_attempts: u32,
}

impl Default for LockRetry {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(200),
            max_attempts: 25,
        }
    }
}

#[derive(Default)]
struct LockTable {
    /// Remote locks, keyed by entity id.
    by_entity: HashMap<String, Editor>,
    /// Index from editor id to the entities they hold locked.
    by_editor: HashMap<String, HashSet<String>>,
    /// Entities whose edit form the local user currently has open.
    local_edits: HashSet<String>,
    /// Edit notices waiting for their entity to render.
    pending: HashMap<String, Editor>,
}

/// Per-page edit-lock state machine.
///
/// Cheap to clone; clones share the same table. Side effects go through the
/// injected [`PageSurface`], and every observable effect is gated on the
/// session's privilege.
#[derive(Clone)]
pub struct EditLocks {
    surface: Arc<dyn PageSurface>,
    session: Session,
    table: Arc<Mutex<LockTable>>,
    retry: LockRetry,
}

impl EditLocks {
    pub fn new(surface: Arc<dyn PageSurface>, session: Session) -> Self {
        Self {
            surface,
            session,
            table: Arc::new(Mutex::new(LockTable::default())),
            retry: LockRetry::default(),
        }
    }

    pub fn with_retry(mut self, retry: LockRetry) -> Self {
        self.retry = retry;
        self
    }

    /// Current state of one entity.
    pub fn state_of(&self, entity_id: &str) -> LockState {
        let table = self.table.lock().unwrap();
        if table.local_edits.contains(entity_id) {
            LockState::LockedByLocal
        } else if let Some(editor) = table.by_entity.get(entity_id) {
            LockState::LockedByRemote(editor.clone())
        } else {
            LockState::Idle
        }
    }

    /// The local user opened an edit form for this entity.
    ///
    /// While any local edit is open, remote `stop` notices must not restore
    /// the controls. The caller is responsible for publishing the matching
    /// `edit` notice.
    pub fn begin_local_edit(&self, entity_id: &str) {
        self.table
            .lock()
            .unwrap()
            .local_edits
            .insert(entity_id.to_string());
    }

    /// The local user closed (saved or cancelled) their edit form.
    pub fn end_local_edit(&self, entity_id: &str) {
        self.table.lock().unwrap().local_edits.remove(entity_id);
    }

    /// React to a remote `edit` notice.
    pub fn on_edit(&self, notice: &Notice) {
        // Never lock against the local user's own edits.
        if self.session.is_self(&notice.editor_id) {
            return;
        }
        if !self.session.can_view_edit_notices() {
            return;
        }
        if self.surface.entity_exists(&notice.id) {
            self.apply_lock(&notice.id, notice.editor());
        } else {
            self.table
                .lock()
                .unwrap()
                .pending
                .insert(notice.id.clone(), notice.editor());
            self.schedule_retry(notice.clone());
        }
    }

    /// React to a remote `stop` notice, including the `"*"` disconnect form.
    pub fn on_stop(&self, notice: &Notice) {
        if !self.session.can_view_edit_notices() {
            return;
        }
        if notice.is_unlock_all() {
            self.unlock_all(&notice.editor_id);
        } else {
            self.unlock(&notice.id, &notice.editor_id);
        }
    }

    /// The entity was deleted remotely: drop its lock along with it.
    ///
    /// No unlock notice follows a delete; the entity simply ceases to exist.
    pub fn entity_deleted(&self, entity_id: &str) {
        {
            let mut table = self.table.lock().unwrap();
            table.pending.remove(entity_id);
            if let Some(editor) = table.by_entity.remove(entity_id) {
                if let Some(held) = table.by_editor.get_mut(&editor.id) {
                    held.remove(entity_id);
                }
            }
        }
        self.surface.clear_edit_notice(entity_id);
        self.surface.remove_entity(entity_id);
    }

    fn apply_lock(&self, entity_id: &str, editor: Editor) {
        {
            let mut table = self.table.lock().unwrap();
            if let Some(current) = table.by_entity.get(entity_id) {
                if current.id == editor.id {
                    // Already showing this editor's notice.
                    return;
                }
                // A different editor took over; retire the stale banner.
                let stale = current.id.clone();
                if let Some(held) = table.by_editor.get_mut(&stale) {
                    held.remove(entity_id);
                }
                self.surface.clear_edit_notice(entity_id);
            }
            table
                .by_editor
                .entry(editor.id.clone())
                .or_default()
                .insert(entity_id.to_string());
            table.by_entity.insert(entity_id.to_string(), editor.clone());
        }
        self.surface.show_edit_notice(entity_id, &editor);
        self.surface.hide_controls(entity_id);
    }

    fn unlock(&self, entity_id: &str, editor_id: &str) {
        let restore_controls;
        {
            let mut table = self.table.lock().unwrap();
            if table
                .pending
                .get(entity_id)
                .is_some_and(|editor| editor.id == editor_id)
            {
                table.pending.remove(entity_id);
            }
            match table.by_entity.get(entity_id) {
                Some(editor) if editor.id == editor_id => {}
                // Idle, or locked by someone else: stale stop, nothing to do.
                _ => return,
            }
            table.by_entity.remove(entity_id);
            if let Some(held) = table.by_editor.get_mut(editor_id) {
                held.remove(entity_id);
            }
            restore_controls = table.local_edits.is_empty();
        }
        self.surface.clear_edit_notice(entity_id);
        if restore_controls {
            self.surface.show_controls(entity_id);
        }
    }

    fn unlock_all(&self, editor_id: &str) {
        let (unlocked, restore_controls) = {
            let mut table = self.table.lock().unwrap();
            table.pending.retain(|_, editor| editor.id != editor_id);
            let held = table.by_editor.remove(editor_id).unwrap_or_default();
            for entity_id in &held {
                table.by_entity.remove(entity_id);
            }
            (held, table.local_edits.is_empty())
        };
        for entity_id in unlocked {
            self.surface.clear_edit_notice(&entity_id);
            if restore_controls {
                self.surface.show_controls(&entity_id);
            }
        }
    }

    fn schedule_retry(&self, notice: Notice) {
        let locks = self.clone();
        tokio::spawn(async move {
            for _ in 0..locks.retry.max_attempts {
                tokio::time::sleep(locks.retry.delay).await;
                {
                    let table = locks.table.lock().unwrap();
                    match table.pending.get(&notice.id) {
                        // A stop arrived (or another task won) while waiting.
                        Some(editor) if editor.id == notice.editor_id => {}
                        _ => return,
                    }
                }
                if locks.surface.entity_exists(&notice.id) {
                    locks.table.lock().unwrap().pending.remove(&notice.id);
                    locks.apply_lock(&notice.id, notice.editor());
                    return;
                }
            }
            locks.table.lock().unwrap().pending.remove(&notice.id);
            debug!(id = %notice.id, "Entity never rendered, dropping edit notice");
        });
    }
}

/// Ready-made handler set wiring the standard lock behavior into the
/// dispatcher. Pages with richer reactions embed an [`EditLocks`] in their
/// own `OccasionHandlers` implementation instead.
pub struct LockingHandlers {
    locks: EditLocks,
}

impl LockingHandlers {
    pub fn new(locks: EditLocks) -> Self {
        Self { locks }
    }
}

impl OccasionHandlers for LockingHandlers {
    fn on_edit(&self, notice: &Notice) -> ClientResult<()> {
        self.locks.on_edit(notice);
        Ok(())
    }

    fn on_stop(&self, notice: &Notice) -> ClientResult<()> {
        self.locks.on_stop(notice);
        Ok(())
    }

    fn on_delete(&self, notice: &Notice) -> ClientResult<()> {
        self.locks.entity_deleted(&notice.id);
        Ok(())
    }

    fn on_group_removed(&self, notice: &Notice) -> ClientResult<()> {
        self.locks.entity_deleted(&notice.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatcher;
    use crate::session::Role;
    use folio_core::{Action, UNLOCK_ALL};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory page: a set of rendered entities plus recorded effects.
    #[derive(Default)]
    struct FakeSurface {
        existing: Mutex<HashSet<String>>,
        banners: Mutex<HashMap<String, String>>,
        hidden: Mutex<HashSet<String>>,
        removed: Mutex<Vec<String>>,
        mutations: AtomicUsize,
    }

    impl FakeSurface {
        fn with_entities(ids: &[&str]) -> Arc<Self> {
            let surface = Self::default();
            surface
                .existing
                .lock()
                .unwrap()
                .extend(ids.iter().map(|id| id.to_string()));
            Arc::new(surface)
        }

        fn render(&self, entity_id: &str) {
            self.existing.lock().unwrap().insert(entity_id.to_string());
        }

        fn banner_for(&self, entity_id: &str) -> Option<String> {
            self.banners.lock().unwrap().get(entity_id).cloned()
        }

        fn controls_hidden(&self, entity_id: &str) -> bool {
            self.hidden.lock().unwrap().contains(entity_id)
        }

        fn mutation_count(&self) -> usize {
            self.mutations.load(Ordering::SeqCst)
        }
    }

    impl PageSurface for FakeSurface {
        fn entity_exists(&self, entity_id: &str) -> bool {
            self.existing.lock().unwrap().contains(entity_id)
        }

        fn show_edit_notice(&self, entity_id: &str, editor: &Editor) {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            self.banners
                .lock()
                .unwrap()
                .insert(entity_id.to_string(), editor.name.clone());
        }

        fn clear_edit_notice(&self, entity_id: &str) {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            self.banners.lock().unwrap().remove(entity_id);
        }

        fn hide_controls(&self, entity_id: &str) {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            self.hidden.lock().unwrap().insert(entity_id.to_string());
        }

        fn show_controls(&self, entity_id: &str) {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            self.hidden.lock().unwrap().remove(entity_id);
        }

        fn remove_entity(&self, entity_id: &str) {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            self.existing.lock().unwrap().remove(entity_id);
            self.removed.lock().unwrap().push(entity_id.to_string());
        }
    }

    fn teacher_session() -> Session {
        Session::new("10", "Tina Teacher", vec![Role::Teacher])
    }

    fn notice(data: &str, id: &str, action: Action, editor_id: &str, editor_name: &str) -> Notice {
        Notice {
            data: data.to_string(),
            id: id.to_string(),
            action,
            editor_id: editor_id.to_string(),
            editor_name: editor_name.to_string(),
        }
    }

    fn edit(id: &str, editor_id: &str, editor_name: &str) -> Notice {
        notice("event", id, Action::Edit, editor_id, editor_name)
    }

    fn stop(id: &str, editor_id: &str) -> Notice {
        notice("event", id, Action::Stop, editor_id, "Remote")
    }

    #[test]
    fn test_edit_locks_entity_and_hides_controls() {
        let surface = FakeSurface::with_entities(&["12"]);
        let locks = EditLocks::new(surface.clone(), teacher_session());

        locks.on_edit(&edit("12", "5", "Alice Editor"));

        assert_eq!(
            locks.state_of("12"),
            LockState::LockedByRemote(Editor::new("5", "Alice Editor"))
        );
        assert_eq!(surface.banner_for("12").as_deref(), Some("Alice Editor"));
        assert!(surface.controls_hidden("12"));
    }

    #[test]
    fn test_repeated_edit_does_not_duplicate_the_banner() {
        let surface = FakeSurface::with_entities(&["12"]);
        let locks = EditLocks::new(surface.clone(), teacher_session());

        locks.on_edit(&edit("12", "5", "Alice Editor"));
        let after_first = surface.mutation_count();
        locks.on_edit(&edit("12", "5", "Alice Editor"));

        assert_eq!(surface.mutation_count(), after_first);
    }

    #[test]
    fn test_stop_for_idle_entity_is_a_noop() {
        let surface = FakeSurface::with_entities(&["12"]);
        let locks = EditLocks::new(surface.clone(), teacher_session());

        locks.on_stop(&stop("12", "5"));

        assert_eq!(locks.state_of("12"), LockState::Idle);
        assert_eq!(surface.mutation_count(), 0);
    }

    #[test]
    fn test_own_edits_never_lock_locally() {
        let surface = FakeSurface::with_entities(&["12"]);
        let session = teacher_session();
        let locks = EditLocks::new(surface.clone(), session.clone());

        locks.on_edit(&edit("12", &session.user_id, &session.user_name));

        assert_eq!(locks.state_of("12"), LockState::Idle);
        assert_eq!(surface.mutation_count(), 0);
    }

    #[test]
    fn test_students_see_no_lock_effects() {
        let surface = FakeSurface::with_entities(&["12"]);
        let session = Session::new("3", "Sam Student", vec![Role::Student]);
        let locks = EditLocks::new(surface.clone(), session);

        locks.on_edit(&edit("12", "5", "Alice Editor"));
        locks.on_stop(&stop("12", "5"));

        assert_eq!(locks.state_of("12"), LockState::Idle);
        assert_eq!(surface.mutation_count(), 0);
        assert!(!surface.controls_hidden("12"));
    }

    #[test]
    fn test_unlock_all_clears_only_that_editors_locks() {
        let surface = FakeSurface::with_entities(&["1", "2", "3"]);
        let locks = EditLocks::new(surface.clone(), teacher_session());

        locks.on_edit(&edit("1", "5", "Alice Editor"));
        locks.on_edit(&edit("2", "5", "Alice Editor"));
        locks.on_edit(&edit("3", "6", "Bob Editor"));

        locks.on_stop(&notice("", UNLOCK_ALL, Action::Stop, "5", "Alice Editor"));

        assert_eq!(locks.state_of("1"), LockState::Idle);
        assert_eq!(locks.state_of("2"), LockState::Idle);
        assert!(surface.banner_for("1").is_none());
        assert!(surface.banner_for("2").is_none());
        assert_eq!(
            locks.state_of("3"),
            LockState::LockedByRemote(Editor::new("6", "Bob Editor"))
        );
        assert_eq!(surface.banner_for("3").as_deref(), Some("Bob Editor"));
    }

    #[test]
    fn test_stop_does_not_restore_controls_while_local_edit_open() {
        let surface = FakeSurface::with_entities(&["1", "2"]);
        let locks = EditLocks::new(surface.clone(), teacher_session());

        locks.on_edit(&edit("1", "5", "Alice Editor"));
        locks.begin_local_edit("2");
        locks.on_stop(&stop("1", "5"));

        assert!(surface.banner_for("1").is_none());
        assert!(surface.controls_hidden("1"), "controls stay hidden mid-edit");

        locks.end_local_edit("2");
        locks.on_edit(&edit("1", "5", "Alice Editor"));
        locks.on_stop(&stop("1", "5"));
        assert!(!surface.controls_hidden("1"));
    }

    #[test]
    fn test_stop_from_a_different_editor_is_ignored() {
        let surface = FakeSurface::with_entities(&["1"]);
        let locks = EditLocks::new(surface.clone(), teacher_session());

        locks.on_edit(&edit("1", "5", "Alice Editor"));
        locks.on_stop(&stop("1", "6"));

        assert_eq!(
            locks.state_of("1"),
            LockState::LockedByRemote(Editor::new("5", "Alice Editor"))
        );
        assert!(surface.banner_for("1").is_some());
    }

    #[test]
    fn test_delete_drops_entity_and_its_lock() {
        let surface = FakeSurface::with_entities(&["1"]);
        let locks = EditLocks::new(surface.clone(), teacher_session());

        locks.on_edit(&edit("1", "5", "Alice Editor"));
        locks.entity_deleted("1");

        assert_eq!(locks.state_of("1"), LockState::Idle);
        assert!(surface.banner_for("1").is_none());
        assert_eq!(surface.removed.lock().unwrap().as_slice(), ["1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_before_render_is_retried_until_found() {
        let surface = FakeSurface::with_entities(&[]);
        let locks = EditLocks::new(surface.clone(), teacher_session());

        locks.on_edit(&notice("milestone", "77", Action::Edit, "5", "Alice Editor"));
        assert_eq!(locks.state_of("77"), LockState::Idle);

        // Rendered shortly after the notice arrived.
        surface.render("77");
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(
            locks.state_of("77"),
            LockState::LockedByRemote(Editor::new("5", "Alice Editor"))
        );
        assert_eq!(surface.banner_for("77").as_deref(), Some("Alice Editor"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up_after_its_budget() {
        let surface = FakeSurface::with_entities(&[]);
        let locks = EditLocks::new(surface.clone(), teacher_session()).with_retry(LockRetry {
            delay: Duration::from_millis(200),
            max_attempts: 3,
        });

        locks.on_edit(&edit("77", "5", "Alice Editor"));
        tokio::time::sleep(Duration::from_secs(2)).await;
        surface.render("77");
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(locks.state_of("77"), LockState::Idle);
        assert!(surface.banner_for("77").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_render_cancels_the_pending_lock() {
        let surface = FakeSurface::with_entities(&[]);
        let locks = EditLocks::new(surface.clone(), teacher_session());

        locks.on_edit(&edit("77", "5", "Alice Editor"));
        locks.on_stop(&stop("77", "5"));
        surface.render("77");
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(locks.state_of("77"), LockState::Idle);
        assert!(surface.banner_for("77").is_none());
    }

    #[test]
    fn test_locking_handlers_route_through_the_dispatcher() {
        let surface = FakeSurface::with_entities(&["5", "12"]);
        let locks = EditLocks::new(surface.clone(), teacher_session());
        let dispatcher = Dispatcher::new(Arc::new(LockingHandlers::new(locks.clone())));

        let body = r#"[
            {"data":"unknown","id":"0","action":"unknownFutureAction","editorId":"4","editorName":"X"},
            {"data":"event","id":"12","action":"edit","editorId":"4","editorName":"Xavier Editor"},
            {"data":"event","id":"5","action":"delete","editorId":"4","editorName":"Xavier Editor"}
        ]"#;
        dispatcher.dispatch_frame(body).unwrap();

        assert_eq!(
            locks.state_of("12"),
            LockState::LockedByRemote(Editor::new("4", "Xavier Editor"))
        );
        assert!(!surface.entity_exists("5"));
        assert_eq!(surface.removed.lock().unwrap().as_slice(), ["5"]);
    }
}
