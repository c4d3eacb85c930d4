use anyhow::{
  Context,
  anyhow
};
use serde::Deserialize;
use tracing::{
  debug,
  warn
};

use crate::layout::DEFAULT_MIN_WIDTH;
use crate::persist::DEFAULT_SAVE_DEBOUNCE_MS;

pub const DEFAULT_STORAGE_KEY: &str = "TODO";

#[derive(
  Debug, Clone, PartialEq, Default, Deserialize,
)]
#[serde(default, deny_unknown_fields)]
pub struct WidgetConfig {
  pub storage: StorageConfig,
  pub save:    SaveConfig,
  pub layout:  LayoutConfig,
  pub log:     LogConfig
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
  pub key: String
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SaveConfig {
  pub debounce_ms: u64
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
  pub min_width: f64
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
  pub level: String
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self {
      key: DEFAULT_STORAGE_KEY.to_string()
    }
  }
}

impl Default for SaveConfig {
  fn default() -> Self {
    Self {
      debounce_ms: DEFAULT_SAVE_DEBOUNCE_MS
    }
  }
}

impl Default for LayoutConfig {
  fn default() -> Self {
    Self {
      min_width: DEFAULT_MIN_WIDTH
    }
  }
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: "warn".to_string()
    }
  }
}

impl LogConfig {
  pub fn max_level(
    &self
  ) -> anyhow::Result<tracing::Level> {
    self.level.trim().parse().with_context(|| {
      format!("invalid log.level: {:?}", self.level)
    })
  }
}

impl WidgetConfig {
  #[tracing::instrument(skip(text))]
  pub fn from_toml_str(
    text: &str
  ) -> anyhow::Result<Self> {
    let cfg: WidgetConfig =
      toml::from_str(text)
        .context("failed to parse widget config")?;
    cfg.validate()?;
    debug!(?cfg, "loaded widget config");
    Ok(cfg)
  }

  /// Applies dotted `key=value` overrides on
  /// top of the loaded values.
  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, value) in overrides {
      let value = value.trim();
      debug!(key = %key, value = %value, "applying override");
      match key.as_str() {
        | "storage.key" => {
          self.storage.key =
            value.to_string();
        }
        | "save.debounce_ms" => {
          self.save.debounce_ms = value
            .parse()
            .with_context(|| {
              format!("invalid {key}: {value:?}")
            })?;
        }
        | "layout.min_width" => {
          self.layout.min_width = value
            .parse()
            .with_context(|| {
              format!("invalid {key}: {value:?}")
            })?;
        }
        | "log.level" => {
          self.log.level =
            value.to_string();
        }
        | _ => {
          warn!(key = %key, "ignoring unknown config override");
        }
      }
    }
    self.validate()
  }

  fn validate(&self) -> anyhow::Result<()> {
    if self.storage.key.trim().is_empty() {
      return Err(anyhow!(
        "storage.key cannot be empty"
      ));
    }
    if !self.layout.min_width.is_finite()
      || self.layout.min_width < 0.0
    {
      return Err(anyhow!(
        "layout.min_width must be a \
         non-negative number"
      ));
    }
    self.log.max_level()?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_document_yields_defaults() {
    let cfg =
      WidgetConfig::from_toml_str("").unwrap();
    assert_eq!(cfg, WidgetConfig::default());
    assert_eq!(cfg.storage.key, "TODO");
    assert_eq!(cfg.save.debounce_ms, 500);
    assert_eq!(cfg.layout.min_width, 500.0);
    assert_eq!(
      cfg.log.max_level().unwrap(),
      tracing::Level::WARN
    );
  }

  #[test]
  fn log_level_is_parsed_and_validated() {
    let cfg = WidgetConfig::from_toml_str(
      "[log]\nlevel = \"debug\"\n"
    )
    .unwrap();
    assert_eq!(
      cfg.log.max_level().unwrap(),
      tracing::Level::DEBUG
    );
    assert!(
      WidgetConfig::from_toml_str(
        "[log]\nlevel = \"loud\"\n"
      )
      .is_err()
    );

    let mut cfg = WidgetConfig::default();
    cfg
      .apply_overrides([(
        "log.level".to_string(),
        "trace".to_string()
      )])
      .unwrap();
    assert_eq!(
      cfg.log.max_level().unwrap(),
      tracing::Level::TRACE
    );
  }

  #[test]
  fn sections_override_defaults() {
    let cfg = WidgetConfig::from_toml_str(
      r#"
        [storage]
        key = "groceries"

        [save]
        debounce_ms = 250
      "#
    )
    .unwrap();
    assert_eq!(cfg.storage.key, "groceries");
    assert_eq!(cfg.save.debounce_ms, 250);
    assert_eq!(cfg.layout.min_width, 500.0);
  }

  #[test]
  fn rejects_unknown_keys_and_empty_storage_key()
  {
    assert!(
      WidgetConfig::from_toml_str(
        "[storage]\nname = \"x\"\n"
      )
      .is_err()
    );
    assert!(
      WidgetConfig::from_toml_str(
        "[storage]\nkey = \"  \"\n"
      )
      .is_err()
    );
  }

  #[test]
  fn overrides_are_parsed_and_validated() {
    let mut cfg = WidgetConfig::default();
    cfg
      .apply_overrides([
        ("save.debounce_ms".to_string(), " 100 ".to_string()),
        ("layout.min_width".to_string(), "640".to_string()),
        ("bogus".to_string(), "1".to_string()),
      ])
      .unwrap();
    assert_eq!(cfg.save.debounce_ms, 100);
    assert_eq!(cfg.layout.min_width, 640.0);

    assert!(
      cfg
        .apply_overrides([(
          "save.debounce_ms".to_string(),
          "soon".to_string()
        )])
        .is_err()
    );
  }
}
