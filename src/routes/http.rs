//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; failures surface as `TrainerError` responses.

use std::sync::Arc;
use axum::{extract::{FromRequest, Path, State}, http::StatusCode, Json, response::IntoResponse};
use chrono::Utc;
use tracing::{info, instrument};

use crate::error::{TrainerError, TrainerResult};
use crate::logic::{self, SubmitOutcome};
use crate::protocol::*;
use crate::state::AppState;
use crate::training::TrainingCategory;

/// JSON body extractor whose rejections answer with the `{error, code}` validation body.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(TrainerError))]
pub struct ApiJson<T>(pub T);

fn parse_category(raw: &str) -> TrainerResult<TrainingCategory> {
  raw.parse().map_err(TrainerError::Validation)
}

fn submit_status(outcome: SubmitOutcome) -> StatusCode {
  match outcome {
    SubmitOutcome::Passed | SubmitOutcome::Failed => StatusCode::OK,
    SubmitOutcome::AttemptsExhausted => StatusCode::TOO_MANY_REQUESTS,
    SubmitOutcome::AlreadyCompleted => StatusCode::CONFLICT,
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_catalog(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(CatalogOut::from(&state.catalog)).into_response()
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_progress(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
) -> TrainerResult<impl IntoResponse> {
  let doc = logic::get_progress(&state, &user_id).await?;
  Ok(Json(doc))
}

#[instrument(level = "info", skip(state, body), fields(sub_item = %body.sub_item_name, topic = %body.topic_name))]
pub async fn http_post_complete_topic(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
  ApiJson(body): ApiJson<CompleteTopicIn>,
) -> TrainerResult<impl IntoResponse> {
  let doc = logic::complete_topic(
    &state,
    &user_id,
    &body.module_id.key(),
    &body.sub_item_name,
    &body.topic_name,
    &body.username,
  )
  .await?;
  Ok(Json(doc))
}

#[instrument(level = "info", skip(state, body), fields(module = %body.module_id.key()))]
pub async fn http_post_complete_module(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
  ApiJson(body): ApiJson<CompleteModuleIn>,
) -> TrainerResult<impl IntoResponse> {
  let doc = logic::complete_module(&state, &user_id, &body.module_id.key(), &body.username).await?;
  Ok(Json(doc))
}

#[instrument(level = "info", skip(state, body), fields(sub_item = %body.sub_item_name, score = body.score))]
pub async fn http_post_submit_score(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
  ApiJson(body): ApiJson<SubmitScoreIn>,
) -> TrainerResult<impl IntoResponse> {
  let result = logic::submit_score(
    &state,
    &user_id,
    &body.module_id.key(),
    &body.sub_item_name,
    body.score,
    &body.username,
    Utc::now(),
  )
  .await?;
  let status = submit_status(result.outcome);
  info!(target: "progress", %user_id, outcome = ?result.outcome, %status, "HTTP submit_score answered");
  Ok((status, Json(result)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_training(
  State(state): State<Arc<AppState>>,
  Path((user_id, category)): Path<(String, String)>,
) -> TrainerResult<impl IntoResponse> {
  let category = parse_category(&category)?;
  let records = logic::training_records(&state, &user_id, category, Utc::now()).await?;
  Ok(Json(TrainingRecordsOut::new(category, records)))
}

#[instrument(level = "info", skip(state, body), fields(content_id = %body.content_id, pct = body.attempt_data.percentage_score))]
pub async fn http_post_training(
  State(state): State<Arc<AppState>>,
  Path((user_id, category)): Path<(String, String)>,
  ApiJson(body): ApiJson<TrainingAttemptIn>,
) -> TrainerResult<impl IntoResponse> {
  let category = parse_category(&category)?;
  let outcome = logic::record_training_attempt(
    &state,
    &user_id,
    category,
    &body.content_id,
    body.title.as_deref(),
    body.attempt_data,
    body.max_attempts,
    Utc::now(),
  )
  .await?;
  // A capped content id keeps the record body so the client can still render it.
  let status = if outcome.stored { StatusCode::OK } else { StatusCode::TOO_MANY_REQUESTS };
  Ok((status, Json(outcome)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_leaderboard(State(state): State<Arc<AppState>>) -> TrainerResult<impl IntoResponse> {
  let board = logic::leaderboard(&state).await?;
  info!(target: "progress", users = board.len(), "HTTP leaderboard served");
  Ok(Json(board))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_report(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
) -> TrainerResult<impl IntoResponse> {
  Ok(Json(logic::module_report(&state, &user_id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_training_summary(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
) -> TrainerResult<impl IntoResponse> {
  Ok(Json(logic::training_summary(&state, &user_id, Utc::now()).await?))
}
