//! Runtime configuration.
//!
//! Built-in defaults, overlaid by an optional TOML file, overlaid by
//! `CALCTREE_*` environment variables.

use std::path::{Path, PathBuf};

use chrono::Utc;
use config::ConfigError;
use serde::Deserialize;

/// The signing secret used when none is configured. Fine for local
/// development only.
pub const DEFAULT_JWT_SECRET: &str = "math_tree_secret";

/// Seven days.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub store_path:     PathBuf,
  pub jwt_secret:     String,
  pub token_ttl_secs: i64,
}

impl ServerConfig {
  /// Load configuration, reading `file` if it exists.
  pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
    Self::load_from(file, None)
  }

  /// As [`ServerConfig::load`], reading variables from `env` instead of the
  /// process environment when given.
  pub fn load_from(
    file: Option<&Path>,
    env: Option<config::Map<String, String>>,
  ) -> Result<Self, ConfigError> {
    let mut builder = config::Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 3000)?
      .set_default("store_path", "calctree.db")?
      .set_default("jwt_secret", DEFAULT_JWT_SECRET)?
      .set_default("token_ttl_secs", DEFAULT_TOKEN_TTL_SECS)?;

    if let Some(path) = file {
      builder = builder.add_source(config::File::from(path).required(false));
    }

    let cfg: Self = builder
      .add_source(
        config::Environment::with_prefix("CALCTREE")
          .try_parsing(true)
          .source(env),
      )
      .build()?
      .try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
  }

  fn validate(&self) -> Result<(), ConfigError> {
    let in_range = self.token_ttl_secs > 0
      && chrono::Duration::try_seconds(self.token_ttl_secs)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .is_some();
    if !in_range {
      return Err(ConfigError::Message(format!(
        "token_ttl_secs must be a positive number of seconds within the \
         supported date range, got {}",
        self.token_ttl_secs
      )));
    }
    Ok(())
  }

  pub fn token_ttl(&self) -> chrono::Duration {
    chrono::Duration::try_seconds(self.token_ttl_secs)
      .unwrap_or_else(|| chrono::Duration::seconds(DEFAULT_TOKEN_TTL_SECS))
  }

  pub fn uses_default_secret(&self) -> bool {
    self.jwt_secret == DEFAULT_JWT_SECRET
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn env(vars: &[(&str, &str)]) -> Option<config::Map<String, String>> {
    Some(
      vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
    )
  }

  #[test]
  fn defaults_apply_without_a_file() {
    let missing = std::env::temp_dir().join("calctree-no-such-config.toml");
    let cfg = ServerConfig::load_from(Some(missing.as_path()), env(&[])).unwrap();
    assert_eq!(cfg.port, 3000);
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.store_path, PathBuf::from("calctree.db"));
    assert!(cfg.uses_default_secret());
    assert_eq!(cfg.token_ttl(), chrono::Duration::days(7));
  }

  #[test]
  fn file_values_override_defaults() {
    let path = std::env::temp_dir()
      .join(format!("calctree-config-{}.toml", std::process::id()));
    std::fs::write(&path, "port = 8080\njwt_secret = \"s3cret\"\n").unwrap();

    let cfg = ServerConfig::load_from(Some(path.as_path()), env(&[])).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.jwt_secret, "s3cret");
    assert!(!cfg.uses_default_secret());
    assert_eq!(cfg.token_ttl_secs, DEFAULT_TOKEN_TTL_SECS);
  }

  #[test]
  fn environment_overrides_defaults() {
    let cfg = ServerConfig::load_from(
      None,
      env(&[("CALCTREE_PORT", "9000"), ("CALCTREE_TOKEN_TTL_SECS", "60")]),
    )
    .unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.token_ttl(), chrono::Duration::seconds(60));
  }

  #[test]
  fn out_of_range_ttl_is_rejected() {
    for ttl in ["0", "-5", "9223372036854775807", "100000000000000"] {
      let result =
        ServerConfig::load_from(None, env(&[("CALCTREE_TOKEN_TTL_SECS", ttl)]));
      assert!(result.is_err(), "ttl {ttl} accepted");
    }
  }
}
