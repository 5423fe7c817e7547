//! The saved login session: server URL, bearer token, and username.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub url:      String,
  pub token:    String,
  pub username: String,
}

impl Session {
  /// Read the session at `path`; `None` if no session has been saved.
  pub fn load(path: &Path) -> Result<Option<Self>> {
    if !path.exists() {
      return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading session file {}", path.display()))?;
    let session = toml::from_str(&raw).context("parsing session file")?;
    Ok(Some(session))
  }

  pub fn save(&self, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
      std::fs::create_dir_all(dir)
        .with_context(|| format!("creating {}", dir.display()))?;
    }
    let raw = toml::to_string(self).context("serialising session")?;
    std::fs::write(path, raw)
      .with_context(|| format!("writing session file {}", path.display()))
  }

  /// Delete the session at `path`. Returns whether one existed.
  pub fn clear(path: &Path) -> Result<bool> {
    if !path.exists() {
      return Ok(false);
    }
    std::fs::remove_file(path)
      .with_context(|| format!("removing session file {}", path.display()))?;
    Ok(true)
  }
}

/// `~/.config/calctree/session.toml`, or `./.calctree-session.toml` when
/// `HOME` is unset.
pub fn default_path() -> PathBuf {
  match std::env::var("HOME") {
    Ok(home) => PathBuf::from(home).join(".config/calctree/session.toml"),
    Err(_) => PathBuf::from(".calctree-session.toml"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn save_load_clear() {
    let path = std::env::temp_dir()
      .join(format!("calctree-session-{}", std::process::id()))
      .join("session.toml");

    assert_eq!(Session::load(&path).unwrap(), None);

    let session = Session {
      url:      "http://localhost:3000".into(),
      token:    "abc.def.ghi".into(),
      username: "alice".into(),
    };
    session.save(&path).unwrap();
    assert_eq!(Session::load(&path).unwrap(), Some(session));

    assert!(Session::clear(&path).unwrap());
    assert!(!Session::clear(&path).unwrap());
  }
}
