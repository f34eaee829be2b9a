//! Public protocol structs for the HTTP endpoints (serde ready).
//! Field names are camelCase on the wire to match the existing frontend.

use serde::{Deserialize, Serialize};

use crate::domain::{Catalog, ModuleDefinition};
use crate::training::{AttemptMetrics, CategoryRecords, TrainingCategory, TrainingRecord};

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct CatalogOut<'a> {
    pub modules: &'a [ModuleDefinition],
}

impl<'a> From<&'a Catalog> for CatalogOut<'a> {
    fn from(c: &'a Catalog) -> Self {
        Self { modules: c.modules() }
    }
}

/// Module ids arrive either as a number or as the string key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ModuleIdIn {
    Num(u32),
    Text(String),
}

impl ModuleIdIn {
    pub fn key(&self) -> String {
        match self {
            ModuleIdIn::Num(n) => n.to_string(),
            ModuleIdIn::Text(s) => s.trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTopicIn {
    pub module_id: ModuleIdIn,
    pub sub_item_name: String,
    pub topic_name: String,
    #[serde(default)]
    pub username: String,
}

/// Visit of a module that has no sub-items.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteModuleIn {
    pub module_id: ModuleIdIn,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScoreIn {
    pub module_id: ModuleIdIn,
    pub sub_item_name: String,
    pub score: u32,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingAttemptIn {
    pub content_id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub attempt_data: AttemptMetrics,
    /// Overrides the configured lifetime cap for this content id.
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRecordOut {
    #[serde(flatten)]
    pub record: TrainingRecord,
    pub best_attempt: Option<AttemptMetrics>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRecordsOut {
    pub category: TrainingCategory,
    pub records: Vec<TrainingRecordOut>,
}

impl TrainingRecordsOut {
    pub fn new(category: TrainingCategory, records: CategoryRecords) -> Self {
        let records = records
            .records
            .into_values()
            .map(|record| TrainingRecordOut {
                best_attempt: record.best_attempt().cloned(),
                record,
            })
            .collect();
        Self { category, records }
    }
}
