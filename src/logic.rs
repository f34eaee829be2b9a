//! Core operations shared by the HTTP handlers.
//!
//! Each mutating operation is one read-modify-write of a single document:
//! load (or start) the document, apply the change, recompute the derived
//! fields, persist once. Rejected submissions are returned as outcomes and
//! never written.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::domain::{ModuleDefinition, SubItemDefinition};
use crate::error::{TrainerError, TrainerResult};
use crate::gate::{evaluate_attempt, AttemptOutcome, GateRejection};
use crate::progress::UserProgress;
use crate::recalc::recalc;
use crate::scores::{
  aggregate_overall_score, category_average, completed_topics, rank_leaderboard, CategoryAverage, CompletedTopic,
  LeaderboardEntry,
};
use crate::state::AppState;
use crate::training::{AttemptMetrics, CategoryRecords, RecordOutcome, StoredTrainingRecords, TrainingCategory};
use crate::util::{required, trunc_for_log, user_key};

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SubmitOutcome {
  Passed,
  Failed,
  AttemptsExhausted,
  AlreadyCompleted,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
  pub outcome: SubmitOutcome,
  pub message: String,
  /// Attempts used today on this sub-item after the submission.
  pub attempts: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub attempts_remaining: Option<u32>,
  pub progress: UserProgress,
}

fn lookup<'a>(
  state: &'a AppState,
  module_id: &str,
  sub_item: &str,
) -> TrainerResult<(&'a ModuleDefinition, &'a SubItemDefinition)> {
  let module = state
    .catalog
    .module(module_id)
    .ok_or_else(|| TrainerError::not_found("module", module_id))?;
  let sub = module
    .sub_item(sub_item)
    .ok_or_else(|| TrainerError::not_found("sub-item", format!("{}/{}", module.id, sub_item)))?;
  Ok((module, sub))
}

async fn load_or_start(state: &AppState, user_id: &str, username: &str) -> TrainerResult<UserProgress> {
  let mut doc = match state.store.load_progress(user_id).await? {
    Some(doc) => doc,
    None => {
      debug!(target: "progress", %user_id, "Starting new progress document");
      UserProgress::new(user_id, username.trim())
    }
  };
  if doc.username.is_empty() && !username.trim().is_empty() {
    doc.username = username.trim().to_string();
  }
  Ok(doc)
}

/// Stored document, or an empty one when the user has none yet. Nothing is written.
#[instrument(level = "info", skip(state))]
pub async fn get_progress(state: &AppState, user_id: &str) -> TrainerResult<UserProgress> {
  let user_id = user_key(user_id)?;
  Ok(state.store.load_progress(user_id).await?.unwrap_or_else(|| UserProgress::new(user_id, "")))
}

#[instrument(level = "info", skip(state))]
pub async fn complete_topic(
  state: &AppState,
  user_id: &str,
  module_id: &str,
  sub_item: &str,
  topic: &str,
  username: &str,
) -> TrainerResult<UserProgress> {
  let user_id = user_key(user_id)?;
  let module_id = required("moduleId", module_id)?;
  let sub_item = required("subItemName", sub_item)?;
  let topic = required("topicName", topic)?;

  let (module, sub_def) = lookup(state, module_id, sub_item)?;
  if sub_def.topic(topic).is_none() {
    return Err(TrainerError::not_found("topic", format!("{}/{}/{}", module.id, sub_item, topic)));
  }
  let key = module.key();

  let mut doc = load_or_start(state, user_id, username).await?;
  let newly = doc.mark_topic_completed(&key, sub_item, topic);
  doc.refresh_completion(&state.catalog, &key, sub_item);
  doc.progress = recalc(&state.catalog, &doc);
  state.store.save_progress(&doc).await?;

  info!(target: "progress", %user_id, module = %key, %sub_item, %topic, newly, progress = doc.progress, "Topic completed");
  Ok(doc)
}

/// Mark a module without sub-items as visited, which completes it.
/// Modules with sub-items complete through their topics and tests instead.
#[instrument(level = "info", skip(state))]
pub async fn complete_module(
  state: &AppState,
  user_id: &str,
  module_id: &str,
  username: &str,
) -> TrainerResult<UserProgress> {
  let user_id = user_key(user_id)?;
  let module_id = required("moduleId", module_id)?;
  let module = state
    .catalog
    .module(module_id)
    .ok_or_else(|| TrainerError::not_found("module", module_id))?;
  if !module.sub_items.is_empty() {
    return Err(TrainerError::Validation(format!(
      "module {} has sub-items; complete its topics and tests instead",
      module.id
    )));
  }
  let key = module.key();

  let mut doc = load_or_start(state, user_id, username).await?;
  doc.module_entry(&key).completed = true;
  doc.progress = recalc(&state.catalog, &doc);
  state.store.save_progress(&doc).await?;

  info!(target: "progress", %user_id, module = %key, progress = doc.progress, "Module completed");
  Ok(doc)
}

#[instrument(level = "info", skip(state, now))]
pub async fn submit_score(
  state: &AppState,
  user_id: &str,
  module_id: &str,
  sub_item: &str,
  score: u32,
  username: &str,
  now: DateTime<Utc>,
) -> TrainerResult<SubmitResult> {
  let user_id = user_key(user_id)?;
  let module_id = required("moduleId", module_id)?;
  let sub_item = required("subItemName", sub_item)?;

  let (module, sub_def) = lookup(state, module_id, sub_item)?;
  let quiz = sub_def
    .quiz()
    .ok_or_else(|| TrainerError::Validation(format!("'{sub_item}' is not a test")))?;
  let key = module.key();
  let rules = state.rules;

  let mut doc = load_or_start(state, user_id, username).await?;
  let sub = doc.module_entry(&key).sub_item_entry(sub_item);
  let evaluated = evaluate_attempt(sub, quiz.question_count(), score, now, &rules);
  let attempts = sub.attempts;

  let (outcome, message, attempts_remaining) = match evaluated {
    Err(GateRejection::ScoreOutOfRange { score, question_count }) => {
      return Err(TrainerError::Validation(format!("score {score} exceeds question count {question_count}")));
    }
    Err(GateRejection::AlreadyCompleted) => {
      info!(target: "progress", %user_id, module = %key, %sub_item, "Submission rejected: already completed");
      return Ok(SubmitResult {
        outcome: SubmitOutcome::AlreadyCompleted,
        message: TrainerError::AlreadyCompleted.to_string(),
        attempts,
        attempts_remaining: None,
        progress: doc,
      });
    }
    Err(GateRejection::AttemptsExhausted { attempts }) => {
      warn!(target: "progress", %user_id, module = %key, %sub_item, attempts, "Submission rejected: attempts exhausted");
      return Ok(SubmitResult {
        outcome: SubmitOutcome::AttemptsExhausted,
        message: TrainerError::AttemptsExhausted.to_string(),
        attempts,
        attempts_remaining: Some(0),
        progress: doc,
      });
    }
    Ok(AttemptOutcome::Passed { score }) => {
      doc.refresh_completion(&state.catalog, &key, sub_item);
      doc.overall_score = aggregate_overall_score(&doc);
      info!(target: "progress", %user_id, module = %key, %sub_item, score, overall = doc.overall_score, "Test passed");
      (SubmitOutcome::Passed, "Test passed".to_string(), None)
    }
    Ok(AttemptOutcome::Failed { remaining_attempts }) => {
      info!(target: "progress", %user_id, module = %key, %sub_item, score, remaining_attempts, "Test failed");
      let message = if remaining_attempts > 0 {
        format!("Test failed. You have {remaining_attempts} attempt(s) remaining today.")
      } else {
        "Test failed. You have reached maximum attempts for today.".to_string()
      };
      (SubmitOutcome::Failed, message, Some(remaining_attempts))
    }
  };

  doc.progress = recalc(&state.catalog, &doc);
  state.store.save_progress(&doc).await?;

  Ok(SubmitResult { outcome, message, attempts, attempts_remaining, progress: doc })
}

/// Append one reading/listening/speaking attempt under a content id.
/// `max_attempts` falls back to the configured lifetime cap.
#[instrument(level = "info", skip(state, metrics, now), fields(pct = metrics.percentage_score))]
pub async fn record_training_attempt(
  state: &AppState,
  user_id: &str,
  category: TrainingCategory,
  content_id: &str,
  title: Option<&str>,
  metrics: AttemptMetrics,
  max_attempts: Option<u32>,
  now: DateTime<Utc>,
) -> TrainerResult<RecordOutcome> {
  let user_id = user_key(user_id)?;
  let content_id = required("contentId", content_id)?;
  let max_attempts = max_attempts.unwrap_or(state.rules.training_max_attempts);
  if max_attempts == 0 {
    return Err(TrainerError::Validation("maxAttempts must be at least 1".into()));
  }
  if !(0.0..=100.0).contains(&metrics.percentage_score) {
    return Err(TrainerError::Validation(format!(
      "percentage_score must be within 0..=100, got {}",
      metrics.percentage_score
    )));
  }

  debug!(target: "training", %user_id, %category, transcript = %trunc_for_log(&metrics.transcript, 160), "Training attempt received");

  let stored = state.store.load_training(user_id, category).await?.unwrap_or_default();
  let migrated = stored.is_legacy();
  let mut records = stored.upgrade(category, now);
  if migrated {
    info!(target: "training", %user_id, %category, records = records.records.len(), "Upgraded legacy training records");
  }

  let outcome = records.record_attempt(category, content_id, title, metrics, max_attempts);
  if outcome.stored || migrated {
    state.store.save_training(user_id, category, &StoredTrainingRecords::Keyed(records)).await?;
  }

  if outcome.stored {
    info!(target: "training", %user_id, %category, %content_id, attempts = outcome.record.attempts_count, "Training attempt stored");
  } else {
    warn!(target: "training", %user_id, %category, %content_id, max_attempts, "Training attempt rejected: lifetime cap reached");
  }
  Ok(outcome)
}

/// Training records of one category, upgraded in memory if still in the legacy shape.
#[instrument(level = "info", skip(state, now))]
pub async fn training_records(
  state: &AppState,
  user_id: &str,
  category: TrainingCategory,
  now: DateTime<Utc>,
) -> TrainerResult<CategoryRecords> {
  let user_id = user_key(user_id)?;
  let stored = state.store.load_training(user_id, category).await?.unwrap_or_default();
  Ok(stored.upgrade(category, now))
}

/// Best-attempt averages for every training category of one user.
#[instrument(level = "info", skip(state, now))]
pub async fn training_summary(
  state: &AppState,
  user_id: &str,
  now: DateTime<Utc>,
) -> TrainerResult<Vec<CategoryAverage>> {
  let user_id = user_key(user_id)?;
  let mut out = Vec::with_capacity(TrainingCategory::ALL.len());
  for category in TrainingCategory::ALL {
    let records = state.store.load_training(user_id, category).await?.unwrap_or_default().upgrade(category, now);
    out.push(category_average(category, &records));
  }
  Ok(out)
}

#[instrument(level = "info", skip(state))]
pub async fn leaderboard(state: &AppState) -> TrainerResult<Vec<LeaderboardEntry>> {
  let docs = state.store.all_progress().await?;
  let board = rank_leaderboard(&docs);
  debug!(target: "progress", users = board.len(), "Leaderboard ranked");
  Ok(board)
}

#[instrument(level = "info", skip(state))]
pub async fn module_report(state: &AppState, user_id: &str) -> TrainerResult<Vec<CompletedTopic>> {
  let user_id = user_key(user_id)?;
  let doc = state
    .store
    .load_progress(user_id)
    .await?
    .ok_or_else(|| TrainerError::not_found("user progress", user_id))?;
  Ok(completed_topics(&doc))
}
