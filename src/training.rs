//! Reading / listening / speaking training attempts, keyed by opaque content id.
//!
//! Unlike catalog quizzes there is no pass/fail here: every accepted attempt is
//! kept for history, up to a lifetime cap per content id. Older documents stored
//! a flat list of attempts per category; `StoredTrainingRecords::upgrade`
//! converts those once into the keyed shape before anything else touches them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TrainingCategory {
  Reading,
  Listening,
  Speaking,
  SalesSpeaking,
}

impl TrainingCategory {
  pub const ALL: [TrainingCategory; 4] = [
    TrainingCategory::Reading,
    TrainingCategory::Listening,
    TrainingCategory::Speaking,
    TrainingCategory::SalesSpeaking,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      TrainingCategory::Reading => "reading",
      TrainingCategory::Listening => "listening",
      TrainingCategory::Speaking => "speaking",
      TrainingCategory::SalesSpeaking => "salesSpeaking",
    }
  }

  fn untitled(&self) -> &'static str {
    match self {
      TrainingCategory::Reading => "Unknown Passage",
      TrainingCategory::Listening => "Unknown Exercise",
      TrainingCategory::Speaking => "Unknown Topic",
      TrainingCategory::SalesSpeaking => "Unknown Question",
    }
  }
}

impl fmt::Display for TrainingCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for TrainingCategory {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    TrainingCategory::ALL
      .into_iter()
      .find(|c| c.as_str().eq_ignore_ascii_case(s) || (s == "sales-speaking" && *c == TrainingCategory::SalesSpeaking))
      .ok_or_else(|| format!("unknown training category '{s}'"))
  }
}

/// Convert a 0-100 percentage into the 0-9 band shown next to it.
pub fn band_from_percentage(pct: f64) -> f64 {
  (pct.clamp(0.0, 100.0) / 100.0 * 9.0).round()
}

/// One scored attempt, as computed by the client.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AttemptMetrics {
  #[serde(default = "Utc::now")]
  pub timestamp: DateTime<Utc>,
  pub percentage_score: f64,
  #[serde(default)]
  pub overall_score: Option<f64>,
  #[serde(default)]
  pub transcript: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub passage_complete: Option<bool>,
  /// Category-specific fields (fluency, key points covered, ...) kept verbatim.
  #[serde(flatten)]
  pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AttemptMetrics {
  fn with_band(mut self) -> Self {
    if self.overall_score.is_none() {
      self.overall_score = Some(band_from_percentage(self.percentage_score));
    }
    self
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrainingRecord {
  pub id: String,
  pub title: String,
  pub attempts_count: u32,
  pub metrics: Vec<AttemptMetrics>,
}

impl TrainingRecord {
  fn new(id: &str, title: String) -> Self {
    Self { id: id.to_string(), title, attempts_count: 0, metrics: Vec::new() }
  }

  /// Highest percentage score; the earliest wins a tie.
  pub fn best_attempt(&self) -> Option<&AttemptMetrics> {
    self
      .metrics
      .iter()
      .rev()
      .max_by(|a, b| a.percentage_score.total_cmp(&b.percentage_score))
  }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RecordOutcome {
  pub stored: bool,
  pub record: TrainingRecord,
}

/// Current shape: one record per content id, in first-attempt order.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CategoryRecords {
  pub records: IndexMap<String, TrainingRecord>,
}

impl CategoryRecords {
  pub fn get(&self, content_id: &str) -> Option<&TrainingRecord> {
    self.records.get(content_id)
  }

  /// Append an attempt if the content id still has lifetime attempts left.
  /// A rejected attempt leaves the records untouched and reports `stored: false`.
  pub fn record_attempt(
    &mut self,
    category: TrainingCategory,
    content_id: &str,
    title: Option<&str>,
    metrics: AttemptMetrics,
    max_attempts: u32,
  ) -> RecordOutcome {
    if let Some(existing) = self.get(content_id) {
      if existing.attempts_count >= max_attempts {
        return RecordOutcome { stored: false, record: existing.clone() };
      }
    }
    let record = self.records.entry(content_id.to_string()).or_insert_with(|| {
      let title = title.filter(|t| !t.trim().is_empty()).unwrap_or(category.untitled());
      TrainingRecord::new(content_id, title.to_string())
    });
    record.metrics.push(metrics.with_band());
    record.attempts_count += 1;
    RecordOutcome { stored: true, record: record.clone() }
  }
}

/// Entry of the old flat-list shape.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LegacyAttempt {
  #[serde(default, alias = "passageId", alias = "exerciseId", alias = "topicId", alias = "questionId")]
  pub content_id: Option<String>,
  #[serde(default)]
  pub title: Option<String>,
  #[serde(default)]
  pub date: Option<DateTime<Utc>>,
  #[serde(default)]
  pub transcript: Option<String>,
  /// Reading stored its percentage here.
  #[serde(default)]
  pub accuracy: Option<f64>,
  /// Listening and speaking stored their percentage here.
  #[serde(default)]
  pub score: Option<f64>,
}

/// A training document as found in the store, in either shape.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StoredTrainingRecords {
  Keyed(CategoryRecords),
  Legacy(Vec<LegacyAttempt>),
}

impl Default for StoredTrainingRecords {
  fn default() -> Self {
    StoredTrainingRecords::Keyed(CategoryRecords::default())
  }
}

impl StoredTrainingRecords {
  pub fn is_legacy(&self) -> bool {
    matches!(self, StoredTrainingRecords::Legacy(_))
  }

  /// Bring a document to the keyed shape. Legacy entries without a content id
  /// are dropped; the rest become one metric each, stamped `now` when undated.
  pub fn upgrade(self, category: TrainingCategory, now: DateTime<Utc>) -> CategoryRecords {
    let legacy = match self {
      StoredTrainingRecords::Keyed(records) => return records,
      StoredTrainingRecords::Legacy(list) => list,
    };

    let mut out = CategoryRecords::default();
    for old in legacy {
      let Some(id) = old.content_id.filter(|id| !id.is_empty()) else { continue };
      let pct = match category {
        TrainingCategory::Reading => old.accuracy,
        _ => old.score,
      }
      .unwrap_or(0.0);

      let record = out.records.entry(id.clone()).or_insert_with(|| {
        TrainingRecord::new(&id, old.title.clone().unwrap_or_else(|| category.untitled().to_string()))
      });
      record.metrics.push(AttemptMetrics {
        timestamp: old.date.unwrap_or(now),
        percentage_score: pct,
        overall_score: Some(band_from_percentage(pct)),
        transcript: old.transcript.unwrap_or_default(),
        passage_complete: (category == TrainingCategory::Reading).then_some(pct > 70.0),
        extra: serde_json::Map::new(),
      });
      record.attempts_count += 1;
    }
    out
  }
}
