//! Runtime settings: an optional TOML file layered under `BRICKYARD_*`
//! environment variables. Built once at startup and passed by value into the
//! store and client constructors.

use std::{path::PathBuf, time::Duration};

use brickyard_rebrickable::{RebrickableConfig, RetryPolicy};
use config::{Config, ConfigBuilder, ConfigError, Environment, builder::DefaultState};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// SQLite database file. A leading `~/` is expanded.
  pub db_path:      PathBuf,
  pub api_key:      Option<String>,
  /// Rebrickable user token. Not needed by any catalog endpoint.
  pub user_token:   Option<String>,
  pub base_url:     String,
  /// Ids per bulk request and aliases per commit.
  pub chunk_size:   usize,
  pub timeout_secs: u64,
  pub retry:        RetrySettings,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      db_path:      PathBuf::from("data/lego_inventory.db"),
      api_key:      None,
      user_token:   None,
      base_url:     "https://rebrickable.com/api/v3/lego".to_owned(),
      chunk_size:   brickyard_reconcile::DEFAULT_CHUNK_SIZE,
      timeout_secs: 30,
      retry:        RetrySettings::default(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
  pub max_attempts:        u32,
  pub base_delay_ms:       u64,
  pub max_delay_ms:        u64,
  pub jitter_pct:          f64,
  pub rate_limit_delay_ms: u64,
  /// Minimum spacing between consecutive requests.
  pub min_interval_ms:     u64,
}

impl Default for RetrySettings {
  fn default() -> Self {
    Self {
      max_attempts:        4,
      base_delay_ms:       1000,
      max_delay_ms:        16_000,
      jitter_pct:          0.2,
      rate_limit_delay_ms: 5000,
      min_interval_ms:     1000,
    }
  }
}

impl Settings {
  /// Read `path` (if it exists), then apply `BRICKYARD_*` overrides, e.g.
  /// `BRICKYARD_DB_PATH` or `BRICKYARD_RETRY__MAX_ATTEMPTS`.
  pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
    Self::from_builder(
      Config::builder().add_source(config::File::from(path).required(false)),
    )
  }

  fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
    builder
      .add_source(
        Environment::with_prefix("BRICKYARD")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  /// The API key, if one is set and not blank.
  pub fn api_key(&self) -> Option<&str> {
    self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
  }

  pub fn retry_policy(&self) -> RetryPolicy {
    let r = &self.retry;
    RetryPolicy {
      max_attempts:     r.max_attempts.max(1),
      base_delay:       Duration::from_millis(r.base_delay_ms),
      max_delay:        Duration::from_millis(r.max_delay_ms),
      jitter_pct:       r.jitter_pct.clamp(0.0, 1.0),
      rate_limit_delay: Duration::from_millis(r.rate_limit_delay_ms),
    }
  }

  pub fn client_config(&self, api_key: String) -> RebrickableConfig {
    RebrickableConfig {
      base_url: self.base_url.trim_end_matches('/').to_owned(),
      api_key,
      timeout: Duration::from_secs(self.timeout_secs),
      min_interval: Duration::from_millis(self.retry.min_interval_ms),
      retry: self.retry_policy(),
    }
  }
}

#[cfg(test)]
mod tests {
  use config::FileFormat;

  use super::*;

  fn from_toml(toml: &str) -> Settings {
    Settings::from_builder(
      Config::builder().add_source(config::File::from_str(toml, FileFormat::Toml)),
    )
    .unwrap()
  }

  #[test]
  fn empty_file_gives_defaults() {
    let s = from_toml("");
    assert_eq!(s.db_path, PathBuf::from("data/lego_inventory.db"));
    assert_eq!(s.chunk_size, 50);
    assert_eq!(s.retry, RetrySettings::default());
  }

  #[test]
  fn nested_retry_keys() {
    let s = from_toml(
      r#"
        api_key = "abc"
        chunk_size = 20

        [retry]
        max_attempts = 2
        base_delay_ms = 10
      "#,
    );
    assert_eq!(s.api_key(), Some("abc"));
    assert_eq!(s.chunk_size, 20);
    let policy = s.retry_policy();
    assert_eq!(policy.max_attempts, 2);
    assert_eq!(policy.base_delay, Duration::from_millis(10));
    assert_eq!(policy.max_delay, Duration::from_secs(16));
  }

  #[test]
  fn blank_api_key_counts_as_missing() {
    assert_eq!(from_toml(r#"api_key = "  ""#).api_key(), None);
  }

  #[test]
  fn client_config_trims_base_url() {
    let s = from_toml(r#"base_url = "http://localhost:9000/api/""#);
    let cfg = s.client_config("k".into());
    assert_eq!(cfg.base_url, "http://localhost:9000/api");
    assert_eq!(cfg.min_interval, Duration::from_secs(1));
    assert_eq!(cfg.timeout, Duration::from_secs(30));
  }
}
