//! Application state: the immutable catalog, attempt rules, and the document store.
//!
//! The catalog comes from the `[[modules]]` table of the TOML config when one is
//! present and valid, otherwise from the built-in seed catalog. The store is the
//! JSON directory backend when TRAINER_STORE_DIR is set, otherwise in-memory.

use tracing::{error, info, instrument};

use crate::config::load_config_from_env;
use crate::domain::Catalog;
use crate::gate::AttemptRules;
use crate::recalc::count_units;
use crate::progress::UserProgress;
use crate::seeds::seed_catalog;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub rules: AttemptRules,
    pub store: DocumentStore,
}

impl AppState {
    /// Build state from env: load config, pick the catalog, open the store.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Self {
        let cfg = load_config_from_env().unwrap_or_default();
        let rules = cfg.rules;

        let catalog = if cfg.modules.is_empty() {
            builtin_catalog()
        } else {
            match Catalog::new(cfg.modules) {
                Ok(c) => {
                    info!(target: "trainer", "Using catalog from config");
                    c
                }
                Err(e) => {
                    error!(target: "trainer", error = %e, "Invalid catalog in config; using built-in catalog");
                    builtin_catalog()
                }
            }
        };

        let store = match std::env::var("TRAINER_STORE_DIR") {
            Ok(dir) if !dir.trim().is_empty() => DocumentStore::json_dir(dir),
            _ => DocumentStore::memory(),
        };

        let state = Self::new(catalog, rules, store);
        state.log_inventory();
        state
    }

    pub fn new(catalog: Catalog, rules: AttemptRules, store: DocumentStore) -> Self {
        Self { catalog, rules, store }
    }

    /// Startup summary of what the catalog contains and which rules apply.
    fn log_inventory(&self) {
        let (_, units) = count_units(&self.catalog, &UserProgress::new("", ""));
        for m in self.catalog.modules() {
            let quizzes = m.sub_items.iter().filter(|s| s.quiz().is_some()).count();
            let topics: usize = m.sub_items.iter().map(|s| s.topics.len()).sum();
            info!(target: "trainer", module = m.id, title = %m.title, sub_items = m.sub_items.len(), topics, quizzes, "Catalog module");
        }
        info!(
            target: "trainer",
            units,
            pass_threshold = self.rules.pass_threshold,
            max_daily_attempts = self.rules.max_daily_attempts,
            training_max_attempts = self.rules.training_max_attempts,
            store = %self.store.describe(),
            "Trainer state ready"
        );
    }
}

fn builtin_catalog() -> Catalog {
    Catalog::new(seed_catalog()).unwrap_or_else(|e| {
        error!(target: "trainer", error = %e, "Built-in catalog failed validation");
        Catalog::empty()
    })
}
