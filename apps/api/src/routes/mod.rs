pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::coach::handlers as coach;
use crate::extraction::handlers as extraction;
use crate::optimize::handlers as optimize;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Upload extraction
        .route(
            "/api/v1/upload",
            post(extraction::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // ATS optimization
        .route("/api/v1/optimize", post(optimize::handle_optimize))
        // Career coach chat
        .route("/api/v1/chat", post(coach::handle_chat))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::extraction::cleanup::test_support::MockCompletion;
    use crate::extraction::detect::MIME_DOCX;
    use crate::extraction::docx::test_support::build_docx;
    use crate::extraction::{ExtractionPipeline, ExtractionSettings};
    use crate::llm_client::TextCompletion;

    const BOUNDARY: &str = "X-RESUME-BOUNDARY";

    fn test_state(cleanup: Arc<MockCompletion>, analysis: Option<Arc<MockCompletion>>) -> AppState {
        let config = Config::from_lookup(|_| None).expect("default config");
        state_with_config(config, cleanup, analysis)
    }

    fn state_with_config(
        config: Config,
        cleanup: Arc<MockCompletion>,
        analysis: Option<Arc<MockCompletion>>,
    ) -> AppState {
        let cleanup: Arc<dyn TextCompletion> = cleanup;
        AppState {
            extraction: ExtractionPipeline::new(Some(cleanup), ExtractionSettings::from(&config)),
            analysis_llm: analysis.map(|llm| llm as Arc<dyn TextCompletion>),
            config,
        }
    }

    fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request")
    }

    fn json_request(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .expect("request")
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn test_health_reports_ok() {
        let app = build_router(test_state(Arc::new(MockCompletion::replying("x")), None));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_docx_upload_returns_text_and_metadata() {
        let cleaned = "CONTACT\nJane Doe\n\nEXPERIENCE\nSenior Software Engineer, Acme Corp, 2019 to present";
        let llm = Arc::new(MockCompletion::replying(cleaned));
        let app = build_router(test_state(llm.clone(), None));

        let docx = build_docx(&["Jane Doe", "Senior Software Engineer, Acme Corp, 2019 to present"]);
        let body = multipart_body("file", "jane.docx", MIME_DOCX, &docx);
        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(
            json["text"],
            "CONTACT Jane Doe EXPERIENCE Senior Software Engineer, Acme Corp, 2019 to present"
        );
        assert_eq!(json["filename"], "jane.docx");
        assert_eq!(json["type"], MIME_DOCX);
        assert_eq!(json["size"], docx.len());
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_upload_is_bad_request() {
        let llm = Arc::new(MockCompletion::replying("x"));
        let app = build_router(test_state(llm.clone(), None));

        let body = multipart_body("file", "photo.png", "image/png", b"\x89PNG\r\n");
        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "UNSUPPORTED_FORMAT");
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_file_field_is_bad_request() {
        let app = build_router(test_state(Arc::new(MockCompletion::replying("x")), None));

        let body = multipart_body("attachment", "cv.pdf", "application/pdf", b"%PDF");
        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["message"], "No file provided");
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_server_error() {
        let app = build_router(test_state(Arc::new(MockCompletion::replying("x")), None));

        let body = multipart_body("file", "cv.pdf", "application/pdf", b"not really a pdf");
        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"]["code"], "PARSE_FAILURE");
    }

    #[tokio::test]
    async fn test_optimize_without_key_is_not_configured() {
        let app = build_router(test_state(Arc::new(MockCompletion::replying("x")), None));
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/v1/optimize")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({"resume_text": "r", "job_description": "j"}).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_optimize_returns_report() {
        let analysis = Arc::new(MockCompletion::replying(
            r#"{"atsScore": 81, "missingKeywords": ["Kafka"], "matchedKeywords": ["Rust"], "suggestions": ["Add metrics"]}"#,
        ));
        let app = build_router(test_state(
            Arc::new(MockCompletion::replying("x")),
            Some(analysis.clone()),
        ));
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/v1/optimize")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({"resume_text": "Rust engineer", "job_description": "Rust + Kafka"})
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["ats_score"], 81);
        assert_eq!(json["keywords_to_add"], json!(["Kafka"]));
        assert_eq!(analysis.calls(), 1);
    }

    #[tokio::test]
    async fn test_optimize_requires_both_fields() {
        let analysis = Arc::new(MockCompletion::replying("{}"));
        let app = build_router(test_state(
            Arc::new(MockCompletion::replying("x")),
            Some(analysis.clone()),
        ));
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/v1/optimize")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({"resume_text": "only"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(analysis.calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_over_body_limit_is_payload_too_large() {
        let config = Config::from_lookup(|key| (key == "MAX_UPLOAD_BYTES").then(|| "1024".to_string()))
            .expect("config");
        let llm = Arc::new(MockCompletion::replying("x"));
        let app = build_router(state_with_config(config, llm.clone(), None));

        let body = multipart_body("file", "big.pdf", "application/pdf", &vec![b'a'; 8192]);
        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_optimize_malformed_json_uses_error_envelope() {
        let analysis = Arc::new(MockCompletion::replying("{}"));
        let app = build_router(test_state(
            Arc::new(MockCompletion::replying("x")),
            Some(analysis.clone()),
        ));
        let response = app
            .oneshot(json_request("/api/v1/optimize", "{not json".to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(analysis.calls(), 0);
    }

    #[tokio::test]
    async fn test_chat_returns_coach_reply() {
        let coach = Arc::new(MockCompletion::replying("Lead each bullet with a metric."));
        let app = build_router(test_state(
            Arc::new(MockCompletion::replying("x")),
            Some(coach.clone()),
        ));
        let body = json!({"messages": [
            {"role": "user", "content": "How do I improve my experience section?"}
        ]});
        let response = app
            .oneshot(json_request("/api/v1/chat", body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["reply"], "Lead each bullet with a metric.");
        assert_eq!(coach.calls(), 1);
        let prompt = coach.last_prompt().unwrap();
        assert!(prompt.starts_with("You are an expert career coach"));
        assert!(prompt.contains("user: How do I improve my experience section?"));
    }

    #[tokio::test]
    async fn test_chat_rejects_invalid_messages() {
        let coach = Arc::new(MockCompletion::replying("unused"));
        let app = build_router(test_state(
            Arc::new(MockCompletion::replying("x")),
            Some(coach.clone()),
        ));
        let response = app
            .oneshot(json_request("/api/v1/chat", json!({"messages": "hi"}).to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["message"], "Invalid messages format");
        assert_eq!(coach.calls(), 0);
    }

    #[tokio::test]
    async fn test_chat_without_key_is_not_configured() {
        let app = build_router(test_state(Arc::new(MockCompletion::replying("x")), None));
        let body = json!({"messages": [{"role": "user", "content": "hello"}]});
        let response = app
            .oneshot(json_request("/api/v1/chat", body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["error"]["code"], "NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn test_chat_model_failure_is_llm_error() {
        let coach = Arc::new(MockCompletion::failing(502));
        let app = build_router(test_state(
            Arc::new(MockCompletion::replying("x")),
            Some(coach.clone()),
        ));
        let body = json!({"messages": [{"role": "user", "content": "hello"}]});
        let response = app
            .oneshot(json_request("/api/v1/chat", body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"]["code"], "LLM_ERROR");
        assert_eq!(coach.calls(), 1);
    }
}
