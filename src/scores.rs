//! Overall score aggregation, leaderboard ranking, the completed-topic report
//! and per-category training averages.

use serde::Serialize;

use crate::progress::UserProgress;
use crate::training::{CategoryRecords, TrainingCategory};

/// Sum of every recorded sub-item score. Replaces the stored value; never added to it.
pub fn aggregate_overall_score(progress: &UserProgress) -> u32 {
  progress
    .modules
    .values()
    .flat_map(|m| m.sub_items.values())
    .filter_map(|s| s.score)
    .sum()
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
  pub rank: usize,
  pub user_id: String,
  pub username: String,
  pub overall_score: u32,
  pub topics_completed: usize,
  pub progress: u8,
}

/// Rank by overall score, then completed topics, both descending.
/// Ties keep their input order and still get distinct consecutive ranks.
pub fn rank_leaderboard<'a, I>(all: I) -> Vec<LeaderboardEntry>
where
  I: IntoIterator<Item = &'a UserProgress>,
{
  let mut rows: Vec<LeaderboardEntry> = all
    .into_iter()
    .map(|p| LeaderboardEntry {
      rank: 0,
      user_id: p.user_id.clone(),
      username: p.username.clone(),
      overall_score: p.overall_score,
      topics_completed: p.topics_completed(),
      progress: p.progress,
    })
    .collect();

  rows.sort_by(|a, b| {
    b.overall_score
      .cmp(&a.overall_score)
      .then_with(|| b.topics_completed.cmp(&a.topics_completed))
  });
  for (i, row) in rows.iter_mut().enumerate() {
    row.rank = i + 1;
  }
  rows
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTopic {
  pub topic_id: String,
  pub module_id: String,
  pub sub_item_name: String,
  pub topic_name: String,
}

/// Every completed topic of a user, in the order they were first touched.
pub fn completed_topics(progress: &UserProgress) -> Vec<CompletedTopic> {
  let mut out = Vec::new();
  for m in progress.modules.values() {
    for s in m.sub_items.values() {
      for t in s.topics.values().filter(|t| t.completed) {
        out.push(CompletedTopic {
          topic_id: format!("{}-{}-{}", m.module_id, s.sub_item_name, t.topic_name),
          module_id: m.module_id.clone(),
          sub_item_name: s.sub_item_name.clone(),
          topic_name: t.topic_name.clone(),
        });
      }
    }
  }
  out
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAverage {
  pub category: TrainingCategory,
  /// Content ids with at least one attempt.
  pub attempted: usize,
  /// Mean of each content id's best percentage score; `None` when nothing was attempted.
  pub average_score: Option<f64>,
}

/// Average of the best attempt per content id, rounded to two decimals.
pub fn category_average(category: TrainingCategory, records: &CategoryRecords) -> CategoryAverage {
  let best: Vec<f64> = records
    .records
    .values()
    .filter_map(|r| r.best_attempt())
    .map(|m| m.percentage_score)
    .collect();
  let average_score = if best.is_empty() {
    None
  } else {
    let mean = best.iter().sum::<f64>() / best.len() as f64;
    Some((mean * 100.0).round() / 100.0)
  };
  CategoryAverage { category, attempted: best.len(), average_score }
}
