use tracing::debug;

pub const ENTER_KEY: &str = "Enter";

/// Text input plus add button. Owns only the
/// input buffer; appending is delegated to the
/// callback supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct HeaderController {
  input: String
}

impl HeaderController {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn input(&self) -> &str {
    &self.input
  }

  pub fn set_input(&mut self, value: &str) {
    value.clone_into(&mut self.input);
  }

  /// Drives the add control's enabled state.
  pub fn can_append(&self) -> bool {
    !self.input.trim().is_empty()
  }

  pub fn append_task<F, R>(
    &mut self,
    append: F
  ) -> Option<R>
  where
    F: FnOnce(&str) -> R
  {
    if !self.can_append() {
      return None;
    }
    let text = self.input.trim().to_string();
    debug!(len = text.len(), "appending from header");
    let result = append(&text);
    self.input.clear();
    Some(result)
  }

  pub fn key_down<F, R>(
    &mut self,
    key: &str,
    append: F
  ) -> Option<R>
  where
    F: FnOnce(&str) -> R
  {
    if key == ENTER_KEY {
      self.append_task(append)
    } else {
      None
    }
  }

  pub fn add_clicked<F, R>(
    &mut self,
    append: F
  ) -> Option<R>
  where
    F: FnOnce(&str) -> R
  {
    self.append_task(append)
  }
}
