use std::path::{Path, PathBuf};

use anyhow::Context as _;
use roster_core::policy::Policy;
use serde::Deserialize;

/// Runtime configuration, deserialised from `roster.toml` and `ROSTER_*`
/// environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct RosterConfig {
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub policy:     Policy,
}

fn default_store_path() -> PathBuf { PathBuf::from("roster.db") }

impl RosterConfig {
  /// Layer the optional file at `path` under the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        // ROSTER_STORE_PATH, ROSTER_POLICY__BASELINE_HOURS, ...
        config::Environment::with_prefix("ROSTER")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?;

    let mut cfg: RosterConfig = settings
      .try_deserialize()
      .context("failed to deserialise RosterConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_falls_back_to_defaults() {
    let cfg = RosterConfig::load(Path::new("definitely-not-here.toml")).unwrap();
    assert_eq!(cfg.policy, Policy::default());
  }

  #[test]
  fn tilde_is_expanded_only_at_the_front() {
    let untouched = expand_tilde(Path::new("data/~/roster.db"));
    assert_eq!(untouched, PathBuf::from("data/~/roster.db"));

    if let Ok(home) = std::env::var("HOME") {
      let expanded = expand_tilde(Path::new("~/roster.db"));
      assert_eq!(expanded, PathBuf::from(home).join("roster.db"));
    }
  }
}
