use tracing::{
  debug,
  trace,
  warn
};

use crate::events::{
  SubscriptionId,
  Subscribers
};
use crate::header::ENTER_KEY;
use crate::persist::{
  BlobStore,
  PersistenceGateway
};
use crate::store::TaskStore;
use crate::tabs::TabController;
use crate::task::{
  Status,
  TaskId
};

/// What the host found under the pointer.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ClickTarget {
  /// Carries the checkbox state after the
  /// click.
  Checkbox { checked: bool },
  DeleteIcon,
  TaskText,
  Other
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct ListClick {
  pub task_id: Option<TaskId>,
  pub target:  ClickTarget
}

impl ListClick {
  pub fn on(
    task_id: TaskId,
    target: ClickTarget
  ) -> Self {
    Self {
      task_id: Some(task_id),
      target
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ClickHandler {
  Check,
  Delete,
  Edit
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct ClickOutcome {
  pub handler:         ClickHandler,
  /// The host should suppress the default
  /// action (the label toggling its checkbox).
  pub prevent_default: bool
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
  pub task_id:       TaskId,
  pub original_text: String,
  pub draft:         String
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
  StatusChanged {
    id:     TaskId,
    status: Status
  },
  Removed {
    id: TaskId
  },
  EditModeChanged(bool),
  EditorAttached {
    id:   TaskId,
    text: String
  },
  EditorDetached {
    id: TaskId
  },
  TextCommitted {
    id:   TaskId,
    text: String
  }
}

/// Collaborators a list interaction may touch.
pub struct ListContext<'a, B> {
  pub store:       &'a mut TaskStore,
  pub tabs:        &'a mut TabController,
  pub persistence:
    &'a mut PersistenceGateway<B>,
  pub now_ms:      u64
}

impl<B: BlobStore> ListContext<'_, B> {
  /// Counters are re-derived from the store,
  /// then a save is scheduled.
  fn sync(&mut self) {
    self
      .tabs
      .update_counters(self.store.counts());
    self
      .persistence
      .schedule_save(self.store, self.now_ms);
  }
}

type TryHandler<B> = fn(
  &mut ListController,
  &ListClick,
  &mut ListContext<'_, B>
) -> bool;

#[derive(Debug, Default)]
pub struct ListController {
  edit_mode:   bool,
  active_edit: Option<EditSession>,
  subscribers: Subscribers<ListEvent>
}

impl ListController {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn edit_mode(&self) -> bool {
    self.edit_mode
  }

  pub fn active_edit(
    &self
  ) -> Option<&EditSession> {
    self.active_edit.as_ref()
  }

  pub fn is_editing(
    &self,
    id: TaskId
  ) -> bool {
    self
      .active_edit
      .as_ref()
      .is_some_and(|s| s.task_id == id)
  }

  pub fn subscribe<F>(
    &mut self,
    handler: F
  ) -> SubscriptionId
  where
    F: FnMut(&ListEvent) + 'static
  {
    self.subscribers.subscribe(handler)
  }

  /// Flips edit mode. Leaving edit mode takes
  /// focus away from the editor, so an open
  /// session is committed through blur.
  #[tracing::instrument(skip(self, cx))]
  pub fn toggle_edit_mode<B: BlobStore>(
    &mut self,
    cx: &mut ListContext<'_, B>
  ) -> bool {
    self.edit_mode = !self.edit_mode;
    debug!(edit_mode = self.edit_mode, "toggled edit mode");
    self.subscribers.emit(
      &ListEvent::EditModeChanged(
        self.edit_mode
      )
    );
    if !self.edit_mode {
      self.editor_blur(cx);
    }
    self.edit_mode
  }

  /// Handlers in priority order. The first
  /// one that claims the click consumes it.
  fn dispatch_table<B: BlobStore>()
  -> [(ClickHandler, TryHandler<B>); 3] {
    [
      (
        ClickHandler::Check,
        Self::try_check::<B>
      ),
      (
        ClickHandler::Delete,
        Self::try_delete::<B>
      ),
      (
        ClickHandler::Edit,
        Self::try_edit::<B>
      )
    ]
  }

  #[tracing::instrument(skip(self, cx))]
  pub fn handle_click<B: BlobStore>(
    &mut self,
    click: &ListClick,
    cx: &mut ListContext<'_, B>
  ) -> Option<ClickOutcome> {
    for (handler, try_handle) in
      Self::dispatch_table::<B>()
    {
      if try_handle(self, click, cx) {
        trace!(?handler, "click consumed");
        return Some(ClickOutcome {
          handler,
          prevent_default: handler
            == ClickHandler::Edit
        });
      }
    }
    None
  }

  fn try_check<B: BlobStore>(
    &mut self,
    click: &ListClick,
    cx: &mut ListContext<'_, B>
  ) -> bool {
    let (
      Some(id),
      ClickTarget::Checkbox { checked }
    ) = (click.task_id, click.target)
    else {
      return false;
    };

    let status =
      Status::from_checked(checked);
    if cx.store.set_status(id, status) {
      self.subscribers.emit(
        &ListEvent::StatusChanged {
          id,
          status
        }
      );
      cx.sync();
    }
    true
  }

  fn try_delete<B: BlobStore>(
    &mut self,
    click: &ListClick,
    cx: &mut ListContext<'_, B>
  ) -> bool {
    let (Some(id), ClickTarget::DeleteIcon) =
      (click.task_id, click.target)
    else {
      return false;
    };

    if cx.store.remove(id).is_some() {
      if self.is_editing(id) {
        self.detach_editor();
      }
      self
        .subscribers
        .emit(&ListEvent::Removed { id });
      cx.sync();
    }
    true
  }

  fn try_edit<B: BlobStore>(
    &mut self,
    click: &ListClick,
    cx: &mut ListContext<'_, B>
  ) -> bool {
    let (Some(id), ClickTarget::TaskText) =
      (click.task_id, click.target)
    else {
      return false;
    };
    if !self.edit_mode {
      return false;
    }
    if self.is_editing(id) {
      return true;
    }

    // The previous task gets its text back
    // untouched before the editor moves.
    self.detach_editor();

    let Some(task) = cx.store.get(id) else {
      warn!(%id, "edit requested for unknown task");
      return true;
    };
    let text = task.text.clone();
    debug!(%id, "attaching editor");
    self.active_edit = Some(EditSession {
      task_id:       id,
      original_text: text.clone(),
      draft:         text.clone()
    });
    self.subscribers.emit(
      &ListEvent::EditorAttached { id, text }
    );
    true
  }

  pub fn editor_input(&mut self, value: &str) {
    if let Some(session) =
      self.active_edit.as_mut()
    {
      value.clone_into(&mut session.draft);
    }
  }

  /// Enter only blurs; the commit itself is
  /// the blur path's job.
  pub fn editor_key_down<B: BlobStore>(
    &mut self,
    key: &str,
    cx: &mut ListContext<'_, B>
  ) -> bool {
    if key == ENTER_KEY {
      self.editor_blur(cx)
    } else {
      false
    }
  }

  /// Commits a changed draft and releases the
  /// editor. Returns whether text was written.
  #[tracing::instrument(skip(self, cx))]
  pub fn editor_blur<B: BlobStore>(
    &mut self,
    cx: &mut ListContext<'_, B>
  ) -> bool {
    let Some(session) = self.active_edit.take()
    else {
      return false;
    };
    let id = session.task_id;

    let committed = session.draft
      != session.original_text
      && cx.store.set_text(id, &session.draft);
    if committed {
      debug!(%id, "committed edited text");
      self.subscribers.emit(
        &ListEvent::TextCommitted {
          id,
          text: session.draft
        }
      );
      cx.sync();
    }

    self
      .subscribers
      .emit(&ListEvent::EditorDetached { id });
    committed
  }

  fn detach_editor(&mut self) {
    if let Some(session) =
      self.active_edit.take()
    {
      trace!(id = %session.task_id, "detaching editor");
      self.subscribers.emit(
        &ListEvent::EditorDetached {
          id: session.task_id
        }
      );
    }
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;
  use std::rc::Rc;

  use super::*;
  use crate::persist::MemoryBlobStore;
  use crate::store::Counts;

  struct Harness {
    store:       TaskStore,
    tabs:        TabController,
    persistence:
      PersistenceGateway<MemoryBlobStore>,
    list:        ListController,
    now_ms:      u64
  }

  impl Harness {
    fn with_tasks(texts: &[&str]) -> Self {
      let mut store = TaskStore::new();
      for text in texts {
        store.append(text).unwrap();
      }
      let mut tabs = TabController::new();
      tabs.update_counters(store.counts());
      let mut persistence =
        PersistenceGateway::new(MemoryBlobStore::new());
      persistence.bind_key("TODO");
      Self {
        store,
        tabs,
        persistence,
        list: ListController::new(),
        now_ms: 0
      }
    }

    fn cx(
      &mut self
    ) -> (
      &mut ListController,
      ListContext<'_, MemoryBlobStore>
    ) {
      (
        &mut self.list,
        ListContext {
          store:       &mut self.store,
          tabs:        &mut self.tabs,
          persistence: &mut self.persistence,
          now_ms:      self.now_ms
        }
      )
    }

    fn click(
      &mut self,
      id: u64,
      target: ClickTarget
    ) -> Option<ClickOutcome> {
      let (list, mut cx) = self.cx();
      list.handle_click(
        &ListClick::on(TaskId(id), target),
        &mut cx
      )
    }

    fn toggle_edit(&mut self) -> bool {
      let (list, mut cx) = self.cx();
      list.toggle_edit_mode(&mut cx)
    }

    fn text(&self, id: u64) -> &str {
      &self.store.get(TaskId(id)).unwrap().text
    }
  }

  #[test]
  fn check_updates_counters_and_schedules_save()
  {
    let mut h = Harness::with_tasks(&["a", "b"]);
    let outcome = h
      .click(1, ClickTarget::Checkbox { checked: true })
      .unwrap();

    assert_eq!(outcome.handler, ClickHandler::Check);
    assert!(!outcome.prevent_default);
    assert_eq!(
      h.tabs.counters(),
      Counts {
        all:  2,
        todo: 1,
        done: 1
      }
    );
    assert!(h.persistence.pending_deadline().is_some());

    h.click(1, ClickTarget::Checkbox { checked: false });
    assert_eq!(h.tabs.counter(crate::tabs::TabId::Done), 0);
  }

  #[test]
  fn deleting_done_task_leaves_todo_counter() {
    let mut h = Harness::with_tasks(&["a", "b", "c"]);
    h.click(2, ClickTarget::Checkbox { checked: true });
    let before = h.tabs.counters();

    let outcome =
      h.click(2, ClickTarget::DeleteIcon).unwrap();
    assert_eq!(outcome.handler, ClickHandler::Delete);

    let after = h.tabs.counters();
    assert_eq!(after.all, before.all - 1);
    assert_eq!(after.done, before.done - 1);
    assert_eq!(after.todo, before.todo);
  }

  #[test]
  fn text_clicks_are_ignored_outside_edit_mode() {
    let mut h = Harness::with_tasks(&["a"]);
    assert!(h.click(1, ClickTarget::TaskText).is_none());
    assert!(h.list.active_edit().is_none());
    assert!(h.click(1, ClickTarget::Other).is_none());
  }

  #[test]
  fn first_matching_handler_wins() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut h = Harness::with_tasks(&["a"]);
    h.toggle_edit();
    let sink = Rc::clone(&seen);
    h.list.subscribe(move |e| sink.borrow_mut().push(e.clone()));

    let outcome = h
      .click(1, ClickTarget::Checkbox { checked: true })
      .unwrap();
    assert_eq!(outcome.handler, ClickHandler::Check);
    assert_eq!(
      *seen.borrow(),
      vec![ListEvent::StatusChanged {
        id:     TaskId(1),
        status: Status::Done
      }]
    );
    assert!(h.list.active_edit().is_none());
  }

  // The web host keeps focus in the open editor
  // while a row's text is pressed, so switching
  // rows arrives here as a click and not as a
  // blur of the previous editor.
  #[test]
  fn switching_edit_target_leaves_previous_text_alone()
  {
    let mut h = Harness::with_tasks(&["alpha", "beta"]);
    h.toggle_edit();

    let outcome =
      h.click(1, ClickTarget::TaskText).unwrap();
    assert_eq!(outcome.handler, ClickHandler::Edit);
    assert!(outcome.prevent_default);
    h.list.editor_input("alpha changed");

    h.click(2, ClickTarget::TaskText).unwrap();

    assert_eq!(h.text(1), "alpha");
    let session = h.list.active_edit().unwrap();
    assert_eq!(session.task_id, TaskId(2));
    assert_eq!(session.draft, "beta");
    assert!(h.persistence.pending_deadline().is_none());
  }

  #[test]
  fn enter_commits_through_blur() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut h = Harness::with_tasks(&["alpha"]);
    h.toggle_edit();
    h.click(1, ClickTarget::TaskText);
    let sink = Rc::clone(&seen);
    h.list.subscribe(move |e| sink.borrow_mut().push(e.clone()));

    h.list.editor_input("omega");
    {
      let (list, mut cx) = h.cx();
      assert!(!list.editor_key_down("Escape", &mut cx));
      assert!(list.editor_key_down("Enter", &mut cx));
      assert!(!list.editor_blur(&mut cx));
    }

    assert_eq!(h.text(1), "omega");
    assert!(h.list.active_edit().is_none());
    assert!(h.persistence.pending_deadline().is_some());
    assert_eq!(
      *seen.borrow(),
      vec![
        ListEvent::TextCommitted {
          id:   TaskId(1),
          text: "omega".to_string()
        },
        ListEvent::EditorDetached { id: TaskId(1) },
      ]
    );
  }

  #[test]
  fn unchanged_or_blank_draft_does_not_commit() {
    let mut h = Harness::with_tasks(&["alpha"]);
    h.toggle_edit();

    h.click(1, ClickTarget::TaskText);
    {
      let (list, mut cx) = h.cx();
      assert!(!list.editor_blur(&mut cx));
    }

    h.click(1, ClickTarget::TaskText);
    h.list.editor_input("   ");
    {
      let (list, mut cx) = h.cx();
      assert!(!list.editor_blur(&mut cx));
    }

    assert_eq!(h.text(1), "alpha");
    assert!(h.persistence.pending_deadline().is_none());
  }

  #[test]
  fn leaving_edit_mode_commits_open_session() {
    let mut h = Harness::with_tasks(&["alpha"]);
    h.toggle_edit();
    h.click(1, ClickTarget::TaskText);
    h.list.editor_input("beta");

    assert!(!h.toggle_edit());
    assert_eq!(h.text(1), "beta");
    assert!(h.list.active_edit().is_none());
  }

  #[test]
  fn deleting_edited_task_releases_editor() {
    let mut h = Harness::with_tasks(&["alpha", "beta"]);
    h.toggle_edit();
    h.click(1, ClickTarget::TaskText);

    h.click(1, ClickTarget::DeleteIcon).unwrap();
    assert!(h.list.active_edit().is_none());
    assert_eq!(h.store.len(), 1);
  }
}
