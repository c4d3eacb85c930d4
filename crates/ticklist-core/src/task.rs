use std::fmt;
use std::str::FromStr;

use anyhow::{
  Context,
  anyhow
};
use serde::{
  Deserialize,
  Deserializer,
  Serialize,
  Serializer
};

/// Numeric task identifier. Rendered and
/// persisted as a decimal string.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub struct TaskId(pub u64);

impl TaskId {
  pub const FIRST: TaskId = TaskId(1);

  /// `None` once the id space is exhausted.
  pub fn next(self) -> Option<TaskId> {
    self.0.checked_add(1).map(TaskId)
  }
}

impl fmt::Display for TaskId {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl FromStr for TaskId {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    if s.is_empty()
      || !s.bytes().all(|b| b.is_ascii_digit())
    {
      return Err(anyhow!(
        "task id is not a decimal \
         number: {s:?}"
      ));
    }
    // Only the form `Display` writes back.
    if s.len() > 1 && s.starts_with('0') {
      return Err(anyhow!(
        "task id has leading zeros: {s:?}"
      ));
    }
    s.parse::<u64>()
      .map(TaskId)
      .with_context(|| {
        format!("task id out of range: {s:?}")
      })
  }
}

impl Serialize for TaskId {
  fn serialize<S>(
    &self,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    serializer
      .collect_str(&self.0)
  }
}

impl<'de> Deserialize<'de> for TaskId {
  fn deserialize<D>(
    deserializer: D
  ) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw =
      String::deserialize(deserializer)?;
    raw
      .parse()
      .map_err(serde::de::Error::custom)
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
)]
pub enum Status {
  #[serde(rename = "todo", alias = "to-do")]
  Todo,
  #[serde(rename = "done")]
  Done
}

impl Status {
  pub fn from_checked(
    checked: bool
  ) -> Self {
    if checked {
      Status::Done
    } else {
      Status::Todo
    }
  }

  pub fn is_done(self) -> bool {
    self == Status::Done
  }

  pub fn as_str(self) -> &'static str {
    match self {
      | Status::Todo => "todo",
      | Status::Done => "done"
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
  pub id:     TaskId,
  pub text:   String,
  pub status: Status
}

impl Task {
  pub fn new_todo(
    id: TaskId,
    text: String
  ) -> Self {
    Self {
      id,
      text,
      status: Status::Todo
    }
  }
}

/// Persisted shape of a task: `{id, type, text}`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct TaskRecord {
  pub id:     TaskId,
  #[serde(rename = "type")]
  pub status: Status,
  pub text:   String
}

impl From<&Task> for TaskRecord {
  fn from(task: &Task) -> Self {
    Self {
      id:     task.id,
      status: task.status,
      text:   task.text.clone()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn task_id_parses_only_decimal_strings()
  {
    assert_eq!(
      "42".parse::<TaskId>().unwrap(),
      TaskId(42)
    );
    assert!("".parse::<TaskId>().is_err());
    assert!("-3".parse::<TaskId>().is_err());
    assert!("1e3".parse::<TaskId>().is_err());
    assert!(" 7 ".parse::<TaskId>().is_err());
    assert!("007".parse::<TaskId>().is_err());
    assert_eq!(
      "0".parse::<TaskId>().unwrap(),
      TaskId(0)
    );
    assert!(
      "99999999999999999999999"
        .parse::<TaskId>()
        .is_err()
    );
  }

  #[test]
  fn next_id_stops_at_the_end_of_the_range()
  {
    assert_eq!(TaskId(41).next(), Some(TaskId(42)));
    assert_eq!(TaskId(u64::MAX).next(), None);
  }

  #[test]
  fn record_uses_type_key_and_accepts_legacy_spelling()
  {
    let task = Task::new_todo(
      TaskId(3),
      "milk".to_string()
    );
    let json = serde_json::to_string(
      &TaskRecord::from(&task)
    )
    .unwrap();
    assert_eq!(
      json,
      r#"{"id":"3","type":"todo","text":"milk"}"#
    );

    let legacy: TaskRecord =
      serde_json::from_str(
        r#"{"id":"4","type":"to-do","text":"eggs"}"#
      )
      .unwrap();
    assert_eq!(legacy.status, Status::Todo);
    assert_eq!(legacy.id, TaskId(4));

    assert!(
      serde_json::from_str::<TaskRecord>(
        r#"{"id":7,"type":"done","text":"x"}"#
      )
      .is_err()
    );
  }
}
