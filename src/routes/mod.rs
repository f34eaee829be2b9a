//! Router assembly: HTTP endpoints, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - learner endpoints under `/api/v1/progress` and `/api/v1/training`
/// - admin reads under `/api/v1/admin`
/// - CORS (allow any origin/method/headers); the session gateway sits in front
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/catalog", get(http::http_get_catalog))
        // Learner progress
        .route("/api/v1/progress/:user_id", get(http::http_get_progress))
        .route("/api/v1/progress/:user_id/complete-topic", post(http::http_post_complete_topic))
        .route("/api/v1/progress/:user_id/complete-module", post(http::http_post_complete_module))
        .route("/api/v1/progress/:user_id/submit-score", post(http::http_post_submit_score))
        // Reading / listening / speaking practice
        .route(
            "/api/v1/training/:user_id/:category",
            get(http::http_get_training).post(http::http_post_training),
        )
        // Admin
        .route("/api/v1/admin/leaderboard", get(http::http_get_leaderboard))
        .route("/api/v1/admin/reports/:user_id", get(http::http_get_report))
        .route("/api/v1/admin/training/:user_id", get(http::http_get_training_summary))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::domain::Catalog;
    use crate::gate::AttemptRules;
    use crate::seeds::seed_catalog;
    use crate::store::DocumentStore;

    fn app() -> Router {
        let state = AppState::new(
            Catalog::new(seed_catalog()).unwrap(),
            AttemptRules::default(),
            DocumentStore::memory(),
        );
        build_router(Arc::new(state))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let req = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(b) => req
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    #[tokio::test]
    async fn health_and_catalog() {
        let app = app();
        let (status, body) = send(&app, "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));

        let (status, body) = send(&app, "GET", "/api/v1/catalog", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["modules"].as_array().unwrap().len(), 3);
        assert_eq!(body["modules"][0]["subItems"][0]["name"], "Grammar");
    }

    #[tokio::test]
    async fn submit_score_status_mapping() {
        let app = app();
        let uri = "/api/v1/progress/u1/submit-score";

        let (status, body) =
            send(&app, "POST", uri, Some(json!({ "moduleId": 1, "subItemName": "Grammar test", "score": 7 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "failed");
        assert_eq!(body["attemptsRemaining"], 2);

        let (status, body) =
            send(&app, "POST", uri, Some(json!({ "moduleId": "1", "subItemName": "Grammar test", "score": 9 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "passed");
        assert_eq!(body["progress"]["overallScore"], 9);

        let (status, body) =
            send(&app, "POST", uri, Some(json!({ "moduleId": 1, "subItemName": "Grammar test", "score": 10 }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "This test is already completed.");

        for _ in 0..3 {
            send(&app, "POST", uri, Some(json!({ "moduleId": 1, "subItemName": "Communication test", "score": 1 }))).await;
        }
        let (status, body) =
            send(&app, "POST", uri, Some(json!({ "moduleId": 1, "subItemName": "Communication test", "score": 9 }))).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["outcome"], "attemptsExhausted");
    }

    #[tokio::test]
    async fn errors_use_the_json_error_body() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/progress/u1/complete-topic",
            Some(json!({ "moduleId": 1, "subItemName": "Grammar", "topicName": "Nope" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let (status, body) = send(&app, "GET", "/api/v1/training/u1/writing", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, _) = send(&app, "GET", "/api/v1/admin/reports/nobody", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_bodies_are_validation_errors() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/progress/u1/submit-score",
            Some(json!({ "moduleId": 1, "subItemName": "Grammar test" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["error"].as_str().unwrap().contains("score"));

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/progress/u1/submit-score",
            Some(json!({ "moduleId": 1, "subItemName": "Grammar test", "score": -3 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/training/u1/reading",
            Some(json!({ "attemptData": { "percentage_score": 50.0 } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["error"].as_str().unwrap().contains("contentId"));

        let (_, body) = send(&app, "GET", "/api/v1/progress/u1", None).await;
        assert!(body["modules"].as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn complete_module_rejects_modules_with_sub_items() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/progress/u1/complete-module",
            Some(json!({ "moduleId": 1, "username": "alice" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn admin_training_summary_lists_every_category() {
        let app = app();
        for (id, pct) in [("p1", 60.0), ("p2", 90.0)] {
            let attempt = json!({ "contentId": id, "attemptData": { "percentage_score": pct } });
            send(&app, "POST", "/api/v1/training/u1/reading", Some(attempt)).await;
        }
        let (status, body) = send(&app, "GET", "/api/v1/admin/training/u1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 4);
        assert_eq!(body[0]["category"], "reading");
        assert_eq!(body[0]["attempted"], 2);
        assert_eq!(body[0]["averageScore"], 75.0);
        assert_eq!(body[3]["category"], "salesSpeaking");
        assert_eq!(body[3]["averageScore"], Value::Null);
    }

    #[tokio::test]
    async fn progress_flow_feeds_leaderboard_and_report() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/progress/u1/complete-topic",
            Some(json!({ "moduleId": 1, "subItemName": "Grammar", "topicName": "Tenses", "username": "alice" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["modules"]["1"]["subItems"]["Grammar"]["topics"]["Tenses"]["completed"], true);

        let (_, body) = send(&app, "GET", "/api/v1/progress/u1", None).await;
        assert_eq!(body["username"], "alice");

        let (status, body) = send(&app, "GET", "/api/v1/admin/leaderboard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["userId"], "u1");
        assert_eq!(body[0]["rank"], 1);
        assert_eq!(body[0]["topicsCompleted"], 1);

        let (_, body) = send(&app, "GET", "/api/v1/admin/reports/u1", None).await;
        assert_eq!(body[0]["topicId"], "1-Grammar-Tenses");
    }

    #[tokio::test]
    async fn training_cap_answers_too_many_requests() {
        let app = app();
        let uri = "/api/v1/training/u1/reading";
        let attempt = json!({ "contentId": "p1", "title": "Intro", "attemptData": { "percentage_score": 75.0 } });
        for _ in 0..3 {
            let (status, body) = send(&app, "POST", uri, Some(attempt.clone())).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["stored"], true);
        }
        let (status, body) = send(&app, "POST", uri, Some(attempt)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["stored"], false);
        assert_eq!(body["record"]["attempts_count"], 3);

        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], "reading");
        assert_eq!(body["records"][0]["id"], "p1");
        assert_eq!(body["records"][0]["bestAttempt"]["overall_score"], 7.0);
    }
}
