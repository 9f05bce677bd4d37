pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::conversation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::handle_index))
        .route("/health", get(health::health_handler))
        // Conversation API
        .route("/chat", post(handlers::handle_chat))
        .route("/poll_job_posting", get(handlers::handle_poll))
        .route("/reset", post(handlers::handle_reset))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::conversation::state::SessionStore;
    use crate::llm_client::scripted::ScriptedGenerator;

    const EXTRACT: &str = "Extract ALL job-related information";

    const COMPLETE_EXTRACTION: &str = r#"{
        "role": {"value": "Platform Engineer", "confidence": 0.9},
        "company": {"value": "Initech", "confidence": 0.9},
        "experience": {"value": null, "confidence": 0.0},
        "location": {"value": "Berlin", "confidence": 0.8},
        "requirements": {"value": ["Terraform"], "confidence": 0.7}
    }"#;

    fn app(llm: ScriptedGenerator) -> (Router, SessionStore) {
        let sessions = SessionStore::new();
        let state = AppState {
            llm: Arc::new(llm),
            sessions: sessions.clone(),
        };
        (build_router(state), sessions)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app(ScriptedGenerator::new());
        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "jobpost-api");
    }

    #[tokio::test]
    async fn test_index_serves_chat_page() {
        let (app, _) = app(ScriptedGenerator::new());
        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("/chat"));
    }

    #[tokio::test]
    async fn test_chat_without_session_id_starts_new_session() {
        let (app, sessions) = app(ScriptedGenerator::new().reply(EXTRACT, "not json"));

        let (status, body) = send(&app, post_json("/chat", json!({ "message": "hello" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isJobPosting"], false);
        let response = body["response"].as_str().unwrap();
        assert!(response.contains("job role, company name, and location"));
        let session_id = body["session_id"].as_str().unwrap();
        assert!(uuid::Uuid::parse_str(session_id).is_ok());
        assert!(sessions.get(session_id).await.is_some());
    }

    #[tokio::test]
    async fn test_empty_message_gets_prompt() {
        let (app, _) = app(ScriptedGenerator::new());
        let (status, body) = send(
            &app,
            post_json("/chat", json!({ "message": "  ", "session_id": "s1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "Please enter a message.");
        assert_eq!(body["session_id"], "s1");
    }

    #[tokio::test]
    async fn test_posting_is_returned_and_polled_once() {
        let llm = ScriptedGenerator::new()
            .reply(EXTRACT, COMPLETE_EXTRACTION)
            .reply("Describe", "Initech makes software.");
        let (app, _) = app(llm);

        let (_, chat) = send(
            &app,
            post_json(
                "/chat",
                json!({ "message": "Platform Engineer at Initech, Berlin", "session_id": "s1" }),
            ),
        )
        .await;
        assert_eq!(chat["isJobPosting"], true);
        assert!(chat["job_posting"].as_str().unwrap().contains("job-posting-container"));
        assert!(chat["followUp"].is_string());

        let (status, polled) = send(&app, get("/poll_job_posting?session_id=s1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(polled["ready"], true);
        assert_eq!(polled["job_posting"], chat["job_posting"]);

        let (_, again) = send(&app, get("/poll_job_posting?session_id=s1")).await;
        assert_eq!(again, json!({ "ready": false }));
    }

    #[tokio::test]
    async fn test_poll_unknown_session_is_not_ready() {
        let (app, _) = app(ScriptedGenerator::new());
        let (status, body) = send(&app, get("/poll_job_posting?session_id=nope")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ready": false }));
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_state() {
        let llm = ScriptedGenerator::new()
            .reply(EXTRACT, COMPLETE_EXTRACTION)
            .reply("Describe", "Initech makes software.");
        let (app, sessions) = app(llm);

        let full = json!({ "message": "full details", "session_id": "a" });
        send(&app, post_json("/chat", full)).await;
        send(&app, get("/poll_job_posting?session_id=a")).await;
        send(&app, post_json("/chat", json!({ "message": "  ", "session_id": "b" }))).await;

        let a = sessions.get("a").await.unwrap();
        let b = sessions.get("b").await.unwrap();
        assert!(a.lock().await.final_posting.is_some());
        assert!(b.lock().await.final_posting.is_none());
    }

    #[tokio::test]
    async fn test_reset_drops_session() {
        let (app, sessions) = app(ScriptedGenerator::new());
        sessions.get_or_create("s1").await;

        let (status, body) = send(&app, post_json("/reset", json!({ "session_id": "s1" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reset"], true);
        assert!(sessions.get("s1").await.is_none());

        let (status, body) = send(&app, post_json("/reset", json!({ "session_id": "s1" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_reset_requires_session_id() {
        let (app, _) = app(ScriptedGenerator::new());
        let (status, body) = send(&app, post_json("/reset", json!({ "session_id": " " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
