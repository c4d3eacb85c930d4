use std::collections::HashMap;

use anyhow::Context;
use tracing::{
  debug,
  info,
  warn
};

use crate::store::{
  Counts,
  TaskStore
};
use crate::task::TaskRecord;

pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 =
  500;

/// External string key-value store the
/// task list is persisted into.
pub trait BlobStore {
  fn get(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>>;

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
  entries: HashMap<String, String>,
  writes:  usize
}

impl MemoryBlobStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_entry(
    key: &str,
    value: &str
  ) -> Self {
    let mut store = Self::default();
    store
      .entries
      .insert(key.to_string(), value.to_string());
    store
  }

  /// Number of successful `set` calls.
  pub fn writes(&self) -> usize {
    self.writes
  }

  pub fn raw(
    &self,
    key: &str
  ) -> Option<&str> {
    self.entries.get(key).map(String::as_str)
  }
}

impl BlobStore for MemoryBlobStore {
  fn get(
    &self,
    key: &str
  ) -> anyhow::Result<Option<String>> {
    Ok(self.entries.get(key).cloned())
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    self
      .entries
      .insert(key.to_string(), value.to_string());
    self.writes += 1;
    Ok(())
  }
}

#[derive(Debug, Clone)]
struct PendingSave {
  due_at_ms: u64,
  payload:   String
}

/// Debounced writer. At most one save is
/// pending; a newer schedule replaces it.
#[derive(Debug)]
pub struct PersistenceGateway<B> {
  blob:     B,
  key:      Option<String>,
  delay_ms: u64,
  pending:  Option<PendingSave>
}

impl<B: BlobStore> PersistenceGateway<B> {
  pub fn new(blob: B) -> Self {
    Self::with_delay(
      blob,
      DEFAULT_SAVE_DEBOUNCE_MS
    )
  }

  pub fn with_delay(
    blob: B,
    delay_ms: u64
  ) -> Self {
    Self {
      blob,
      key: None,
      delay_ms,
      pending: None
    }
  }

  pub fn blob(&self) -> &B {
    &self.blob
  }

  pub fn key(&self) -> Option<&str> {
    self.key.as_deref()
  }

  pub fn pending_deadline(
    &self
  ) -> Option<u64> {
    self
      .pending
      .as_ref()
      .map(|p| p.due_at_ms)
  }

  /// Establishes where saves go. A save
  /// pending for a previous key is dropped.
  pub fn bind_key(&mut self, key: &str) {
    if self.key.as_deref() != Some(key) {
      if self.pending.take().is_some() {
        debug!("dropping save pending for previous key");
      }
      info!(key, "bound persistence key");
      self.key = Some(key.to_string());
    }
  }

  /// Snapshots the store now and arms the
  /// debounce. Returns the write deadline, or
  /// `None` while no key is bound.
  #[tracing::instrument(skip(self, store))]
  pub fn schedule_save(
    &mut self,
    store: &TaskStore,
    now_ms: u64
  ) -> Option<u64> {
    if self.key.is_none() {
      warn!("no storage key bound; skipping save");
      return None;
    }

    let payload = match encode(store) {
      | Ok(payload) => payload,
      | Err(error) => {
        warn!(%error, "failed encoding task list");
        return None;
      }
    };

    let due_at_ms = now_ms + self.delay_ms;
    if self.pending.is_some() {
      debug!(due_at_ms, "rescheduling pending save");
    } else {
      debug!(due_at_ms, "scheduling save");
    }
    self.pending = Some(PendingSave {
      due_at_ms,
      payload
    });
    Some(due_at_ms)
  }

  /// Writes the pending snapshot once its
  /// deadline has passed. Returns whether a
  /// write happened.
  #[tracing::instrument(skip(self))]
  pub fn flush_due(
    &mut self,
    now_ms: u64
  ) -> anyhow::Result<bool> {
    let due = self
      .pending
      .as_ref()
      .is_some_and(|p| p.due_at_ms <= now_ms);
    if !due {
      return Ok(false);
    }
    self.flush_now()
  }

  #[tracing::instrument(skip(self))]
  pub fn flush_now(
    &mut self
  ) -> anyhow::Result<bool> {
    let Some(pending) = self.pending.take()
    else {
      return Ok(false);
    };
    let Some(key) = self.key.as_deref()
    else {
      return Ok(false);
    };

    self
      .blob
      .set(key, &pending.payload)
      .with_context(|| {
        format!("failed to persist task list under {key:?}")
      })?;
    debug!(key, bytes = pending.payload.len(), "persisted task list");
    Ok(true)
  }

  /// Binds `key`, cancels any pending save
  /// and restores the store from the blob.
  /// Anything unreadable leaves the store
  /// untouched and yields `None`.
  #[tracing::instrument(skip(self, store))]
  pub fn load(
    &mut self,
    key: &str,
    store: &mut TaskStore
  ) -> Option<Counts> {
    self.bind_key(key);
    if self.pending.take().is_some() {
      debug!("dropping pending save superseded by load");
    }

    let raw = match self.blob.get(key) {
      | Ok(Some(raw)) => raw,
      | Ok(None) => {
        debug!(key, "nothing persisted yet");
        return None;
      }
      | Err(error) => {
        warn!(%error, key, "failed reading persisted tasks");
        return None;
      }
    };

    let records = match decode(&raw) {
      | Ok(records) => records,
      | Err(error) => {
        warn!(%error, key, "ignoring malformed persisted tasks");
        return None;
      }
    };

    store.replace_all(records);
    let counts = store.counts();
    info!(key, restored = counts.all, "loaded task list");
    Some(counts)
  }
}

fn encode(
  store: &TaskStore
) -> anyhow::Result<String> {
  serde_json::to_string(&store.records())
    .context("failed to serialize task list")
}

/// Entries that do not match the record
/// shape are dropped; a value that is not an
/// array is an error.
fn decode(
  raw: &str
) -> anyhow::Result<Vec<TaskRecord>> {
  let value: serde_json::Value =
    serde_json::from_str(raw)
      .context("persisted task list is not valid json")?;
  let serde_json::Value::Array(items) =
    value
  else {
    anyhow::bail!(
      "persisted task list is not an array"
    );
  };

  let mut records =
    Vec::with_capacity(items.len());
  for (idx, item) in
    items.into_iter().enumerate()
  {
    match serde_json::from_value::<TaskRecord>(item) {
      | Ok(record) => records.push(record),
      | Err(error) => {
        warn!(%error, index = idx, "dropping invalid persisted task");
      }
    }
  }
  Ok(records)
}
