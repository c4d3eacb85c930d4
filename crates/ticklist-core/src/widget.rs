use tracing::{
  debug,
  info,
  trace
};

use crate::config::WidgetConfig;
use crate::header::HeaderController;
use crate::layout::{
  ListLayout,
  ViewportMetrics
};
use crate::list::{
  ClickOutcome,
  ListClick,
  ListContext,
  ListController
};
use crate::persist::{
  BlobStore,
  PersistenceGateway
};
use crate::store::{
  Counts,
  TaskStore
};
use crate::tabs::{
  TabController,
  TabId,
  TabRect
};
use crate::task::{
  Task,
  TaskId
};

/// Owns every component of the widget and
/// routes host events to them.
#[derive(Debug)]
pub struct TodoWidget<B> {
  config:      WidgetConfig,
  store:       TaskStore,
  header:      HeaderController,
  tabs:        TabController,
  list:        ListController,
  persistence: PersistenceGateway<B>,
  layout:      ListLayout
}

impl<B: BlobStore> TodoWidget<B> {
  pub fn new(
    config: WidgetConfig,
    blob: B
  ) -> Self {
    let persistence =
      PersistenceGateway::with_delay(
        blob,
        config.save.debounce_ms
      );
    let layout =
      ListLayout::new(config.layout.min_width);
    Self {
      config,
      store: TaskStore::new(),
      header: HeaderController::new(),
      tabs: TabController::new(),
      list: ListController::new(),
      persistence,
      layout
    }
  }

  /// Restores persisted tasks and binds the
  /// storage key. Counters are synced either
  /// way.
  #[tracing::instrument(skip(self))]
  pub fn mount(&mut self) -> Counts {
    let key = self.config.storage.key.clone();
    let restored = self
      .persistence
      .load(&key, &mut self.store);
    let counts = self.store.counts();
    self.tabs.update_counters(counts);
    info!(
      key = %key,
      restored = restored.is_some(),
      tasks = counts.all,
      "mounted widget"
    );
    counts
  }

  pub fn config(&self) -> &WidgetConfig {
    &self.config
  }

  pub fn store(&self) -> &TaskStore {
    &self.store
  }

  pub fn header(&self) -> &HeaderController {
    &self.header
  }

  pub fn tabs(&self) -> &TabController {
    &self.tabs
  }

  pub fn tabs_mut(
    &mut self
  ) -> &mut TabController {
    &mut self.tabs
  }

  pub fn list(&self) -> &ListController {
    &self.list
  }

  pub fn list_mut(
    &mut self
  ) -> &mut ListController {
    &mut self.list
  }

  pub fn blob(&self) -> &B {
    self.persistence.blob()
  }

  pub fn visible_tasks(&self) -> Vec<&Task> {
    self
      .store
      .iter_filtered(self.tabs.active())
      .collect()
  }

  pub fn pending_save_deadline(
    &self
  ) -> Option<u64> {
    self.persistence.pending_deadline()
  }

  pub fn list_max_height(
    &self
  ) -> Option<f64> {
    self.layout.max_height()
  }

  pub fn input_changed(&mut self, value: &str) {
    self.header.set_input(value);
  }

  pub fn input_key_down(
    &mut self,
    key: &str,
    now_ms: u64
  ) -> Option<Task> {
    let store = &mut self.store;
    let appended = self
      .header
      .key_down(key, |text| store.append(text))
      .flatten();
    self.after_append(appended, now_ms)
  }

  pub fn add_clicked(
    &mut self,
    now_ms: u64
  ) -> Option<Task> {
    let store = &mut self.store;
    let appended = self
      .header
      .add_clicked(|text| store.append(text))
      .flatten();
    self.after_append(appended, now_ms)
  }

  fn after_append(
    &mut self,
    appended: Option<Task>,
    now_ms: u64
  ) -> Option<Task> {
    let task = appended?;
    debug!(id = %task.id, "task appended");
    self
      .tabs
      .update_counters(self.store.counts());
    self
      .persistence
      .schedule_save(&self.store, now_ms);
    Some(task)
  }

  /// Called by the host once the list has
  /// re-rendered after an append.
  pub fn viewport_changed(
    &mut self,
    metrics: ViewportMetrics
  ) -> Option<f64> {
    self.layout.recompute(metrics)
  }

  pub fn edit_icon_clicked(
    &mut self,
    now_ms: u64
  ) -> bool {
    let (list, mut cx) =
      self.list_parts(now_ms);
    list.toggle_edit_mode(&mut cx)
  }

  pub fn tab_clicked(&mut self, tab: TabId) {
    self.tabs.set_active(tab);
  }

  pub fn tab_resized(
    &mut self,
    tab: TabId,
    rect: TabRect
  ) {
    self.tabs.tab_resized(tab, rect);
  }

  pub fn list_clicked(
    &mut self,
    click: &ListClick,
    now_ms: u64
  ) -> Option<ClickOutcome> {
    let (list, mut cx) =
      self.list_parts(now_ms);
    list.handle_click(click, &mut cx)
  }

  pub fn editor_input(&mut self, value: &str) {
    self.list.editor_input(value);
  }

  pub fn editor_key_down(
    &mut self,
    key: &str,
    now_ms: u64
  ) -> bool {
    let (list, mut cx) =
      self.list_parts(now_ms);
    list.editor_key_down(key, &mut cx)
  }

  /// Focus left the editor rendered for `id`.
  /// A blur from an editor the session has
  /// already moved away from is ignored.
  pub fn editor_blur(
    &mut self,
    id: TaskId,
    now_ms: u64
  ) -> bool {
    if self
      .list
      .active_edit()
      .is_none_or(|edit| edit.task_id != id)
    {
      trace!(%id, "ignoring blur from a stale editor");
      return false;
    }
    let (list, mut cx) =
      self.list_parts(now_ms);
    list.editor_blur(&mut cx)
  }

  /// Debounce timer callback.
  pub fn timer_fired(
    &mut self,
    now_ms: u64
  ) -> anyhow::Result<bool> {
    self.persistence.flush_due(now_ms)
  }

  /// Writes any pending save right away, for
  /// when the page is going away.
  pub fn page_hidden(
    &mut self
  ) -> anyhow::Result<bool> {
    self.persistence.flush_now()
  }

  fn list_parts(
    &mut self,
    now_ms: u64
  ) -> (
    &mut ListController,
    ListContext<'_, B>
  ) {
    (
      &mut self.list,
      ListContext {
        store: &mut self.store,
        tabs: &mut self.tabs,
        persistence: &mut self.persistence,
        now_ms
      }
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::list::ClickTarget;
  use crate::persist::MemoryBlobStore;

  fn widget() -> TodoWidget<MemoryBlobStore> {
    let mut widget = TodoWidget::new(
      WidgetConfig::default(),
      MemoryBlobStore::new()
    );
    widget.mount();
    widget
  }

  #[test]
  fn append_through_header_syncs_counters() {
    let mut w = widget();
    w.input_changed("first");
    let task = w.input_key_down("Enter", 0).unwrap();
    assert_eq!(task.id, TaskId(1));
    assert_eq!(w.header().input(), "");

    w.input_changed("second");
    w.add_clicked(10).unwrap();
    assert!(w.add_clicked(20).is_none());

    assert_eq!(w.tabs().counter(TabId::All), 2);
    assert_eq!(w.tabs().counter(TabId::Todo), 2);
    assert_eq!(w.pending_save_deadline(), Some(510));
  }

  #[test]
  fn active_tab_filters_visible_tasks() {
    let mut w = widget();
    for text in ["a", "b", "c"] {
      w.input_changed(text);
      w.add_clicked(0);
    }
    w.list_clicked(
      &ListClick::on(
        TaskId(2),
        ClickTarget::Checkbox { checked: true }
      ),
      0
    );

    w.tab_clicked(TabId::Done);
    let ids: Vec<_> = w
      .visible_tasks()
      .iter()
      .map(|t| t.id.0)
      .collect();
    assert_eq!(ids, [2]);

    w.tab_clicked(TabId::Todo);
    assert_eq!(w.visible_tasks().len(), 2);
  }

  #[test]
  fn late_blur_from_previous_row_is_ignored() {
    let mut w = widget();
    for text in ["alpha", "beta"] {
      w.input_changed(text);
      w.add_clicked(0);
    }
    w.page_hidden().unwrap();
    w.edit_icon_clicked(0);
    w.list_clicked(
      &ListClick::on(TaskId(1), ClickTarget::TaskText),
      0
    );
    w.editor_input("alpha changed");
    w.list_clicked(
      &ListClick::on(TaskId(2), ClickTarget::TaskText),
      0
    );

    assert!(!w.editor_blur(TaskId(1), 10));
    assert_eq!(w.store().get(TaskId(1)).unwrap().text, "alpha");
    let session = w.list().active_edit().unwrap();
    assert_eq!(session.task_id, TaskId(2));
    assert!(w.pending_save_deadline().is_none());

    w.editor_input("beta changed");
    assert!(w.editor_blur(TaskId(2), 20));
    assert_eq!(w.store().get(TaskId(2)).unwrap().text, "beta changed");
  }

  #[test]
  fn page_hidden_flushes_pending_save() {
    let mut w = widget();
    w.input_changed("keep me");
    w.add_clicked(0);
    assert!(w.page_hidden().unwrap());
    assert!(w.pending_save_deadline().is_none());
    assert_eq!(w.blob().writes(), 1);
  }
}
