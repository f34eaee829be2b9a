//! Loading trainer configuration (attempt rules + optional catalog) from TOML.
//!
//! Example:
//!
//! ```toml
//! [rules]
//! pass_threshold = 8
//! max_daily_attempts = 3
//! training_max_attempts = 3
//!
//! [[modules]]
//! id = 1
//! title = "Soft Skills"
//!
//! [[modules.subItems]]
//! name = "Grammar"
//! content = "Key grammar rules."
//! topics = [{ name = "Tenses", content = "..." }]
//! ```

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::ModuleDefinition;
use crate::gate::AttemptRules;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TrainerConfig {
  #[serde(default)]
  pub rules: AttemptRules,
  /// Replaces the built-in catalog when non-empty.
  #[serde(default)]
  pub modules: Vec<ModuleDefinition>,
}

pub fn parse_config(s: &str) -> Result<TrainerConfig, toml::de::Error> {
  toml::from_str::<TrainerConfig>(s)
}

/// Attempt to load `TrainerConfig` from TRAINER_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<TrainerConfig> {
  let path = std::env::var("TRAINER_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "trainer", %path, modules = cfg.modules.len(), "Loaded trainer config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "trainer", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "trainer", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
