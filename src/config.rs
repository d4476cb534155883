//! Loading practice configuration from TOML.
//!
//! Everything is optional: with no config file the server runs on defaults.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize)]
pub struct PracticeConfig {
  /// Difficulty used when a request omits one ("easy"/"medium"/"hard"/"all").
  #[serde(default = "default_difficulty")]
  pub default_difficulty: String,
  /// Session length used when a session is started without a target count.
  #[serde(default = "default_target_count")]
  pub default_target_count: u32,
  /// Relative weights applied when difficulty resolves to "all".
  #[serde(default)]
  pub difficulty_weights: DifficultyWeights,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DifficultyWeights {
  #[serde(default = "default_weight")]
  pub easy: f64,
  #[serde(default = "default_weight")]
  pub medium: f64,
  #[serde(default = "default_weight")]
  pub hard: f64,
}

impl DifficultyWeights {
  pub fn as_array(&self) -> [f64; 3] {
    [self.easy, self.medium, self.hard]
  }
}

impl Default for DifficultyWeights {
  fn default() -> Self {
    DifficultyWeights { easy: 1.0, medium: 1.0, hard: 1.0 }
  }
}

impl Default for PracticeConfig {
  fn default() -> Self {
    PracticeConfig {
      default_difficulty: default_difficulty(),
      default_target_count: default_target_count(),
      difficulty_weights: DifficultyWeights::default(),
    }
  }
}

fn default_difficulty() -> String {
  "all".to_string()
}

fn default_target_count() -> u32 {
  10
}

fn default_weight() -> f64 {
  1.0
}

/// Attempt to load `PracticeConfig` from PRACTICE_CONFIG_PATH.
/// On any parsing/IO error, returns None and the caller falls back to defaults.
pub fn load_practice_config_from_env() -> Option<PracticeConfig> {
  let path = std::env::var("PRACTICE_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<PracticeConfig>(&s) {
      Ok(cfg) => {
        info!(target: "linalab_backend", %path, "Loaded practice config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "linalab_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "linalab_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_toml_fills_defaults() {
    let cfg: PracticeConfig = toml::from_str("default_target_count = 5").expect("parse");
    assert_eq!(cfg.default_target_count, 5);
    assert_eq!(cfg.default_difficulty, "all");
    assert_eq!(cfg.difficulty_weights.as_array(), [1.0, 1.0, 1.0]);
  }

  #[test]
  fn weights_section_is_honored() {
    let cfg: PracticeConfig =
      toml::from_str("[difficulty_weights]\neasy = 2.0\nhard = 0.5").expect("parse");
    assert_eq!(cfg.difficulty_weights.as_array(), [2.0, 1.0, 0.5]);
  }
}
