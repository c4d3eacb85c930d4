use std::collections::HashSet;

use tracing::{
  debug,
  warn
};

use crate::tabs::TabId;
use crate::task::{
  Status,
  Task,
  TaskId,
  TaskRecord
};

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
)]
pub struct Counts {
  pub all:  usize,
  pub todo: usize,
  pub done: usize
}

impl Counts {
  pub fn get(&self, tab: TabId) -> usize {
    match tab {
      | TabId::All => self.all,
      | TabId::Todo => self.todo,
      | TabId::Done => self.done
    }
  }
}

/// Ordered task list. Order is insertion
/// order and is what gets persisted.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
  tasks: Vec<Task>
}

impl TaskStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn tasks(&self) -> &[Task] {
    &self.tasks
  }

  pub fn len(&self) -> usize {
    self.tasks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tasks.is_empty()
  }

  pub fn get(
    &self,
    id: TaskId
  ) -> Option<&Task> {
    self
      .tasks
      .iter()
      .find(|t| t.id == id)
  }

  pub fn iter_filtered(
    &self,
    tab: TabId
  ) -> impl Iterator<Item = &Task> {
    self
      .tasks
      .iter()
      .filter(move |t| tab.admits(t.status))
  }

  /// One past the highest id in the store, or
  /// `None` when that would overflow.
  pub fn next_id(&self) -> Option<TaskId> {
    match self.tasks.iter().map(|t| t.id).max()
    {
      | Some(max) => max.next(),
      | None => Some(TaskId::FIRST)
    }
  }

  #[tracing::instrument(skip(self, text))]
  pub fn append(
    &mut self,
    text: &str
  ) -> Option<Task> {
    if text.trim().is_empty() {
      debug!("rejecting empty task text");
      return None;
    }

    let Some(id) = self.next_id() else {
      warn!("task ids exhausted; not appending");
      return None;
    };
    let task =
      Task::new_todo(id, text.to_string());
    debug!(id = %task.id, "appended task");
    self.tasks.push(task.clone());
    Some(task)
  }

  #[tracing::instrument(skip(self))]
  pub fn set_status(
    &mut self,
    id: TaskId,
    status: Status
  ) -> bool {
    let Some(task) = self.find_mut(id)
    else {
      warn!(%id, "set_status on unknown task");
      return false;
    };
    if task.status == status {
      return false;
    }
    task.status = status;
    true
  }

  #[tracing::instrument(skip(self))]
  pub fn remove(
    &mut self,
    id: TaskId
  ) -> Option<Task> {
    let Some(idx) = self
      .tasks
      .iter()
      .position(|t| t.id == id)
    else {
      warn!(%id, "remove on unknown task");
      return None;
    };
    Some(self.tasks.remove(idx))
  }

  /// Blank replacement text is refused so an
  /// edit can never erase a task.
  #[tracing::instrument(skip(self, text))]
  pub fn set_text(
    &mut self,
    id: TaskId,
    text: &str
  ) -> bool {
    if text.trim().is_empty() {
      debug!(%id, "rejecting blank replacement text");
      return false;
    }
    let Some(task) = self.find_mut(id)
    else {
      warn!(%id, "set_text on unknown task");
      return false;
    };
    if task.text == text {
      return false;
    }
    task.text = text.to_string();
    true
  }

  /// Wholesale replacement used by load.
  /// Returns how many records were dropped.
  #[tracing::instrument(skip(self, records))]
  pub fn replace_all<I>(
    &mut self,
    records: I
  ) -> usize
  where
    I: IntoIterator<Item = TaskRecord>
  {
    let mut seen = HashSet::new();
    let mut dropped = 0;
    let mut tasks = Vec::new();

    for record in records {
      if !seen.insert(record.id) {
        warn!(id = %record.id, "dropping duplicate task id");
        dropped += 1;
        continue;
      }
      tasks.push(Task {
        id:     record.id,
        text:   record.text,
        status: record.status
      });
    }

    debug!(
      kept = tasks.len(),
      dropped, "replaced task list"
    );
    self.tasks = tasks;
    dropped
  }

  pub fn records(
    &self
  ) -> Vec<TaskRecord> {
    self
      .tasks
      .iter()
      .map(TaskRecord::from)
      .collect()
  }

  pub fn counts(&self) -> Counts {
    let done = self
      .tasks
      .iter()
      .filter(|t| t.status.is_done())
      .count();
    Counts {
      all: self.tasks.len(),
      todo: self.tasks.len() - done,
      done
    }
  }

  fn find_mut(
    &mut self,
    id: TaskId
  ) -> Option<&mut Task> {
    self
      .tasks
      .iter_mut()
      .find(|t| t.id == id)
  }
}
