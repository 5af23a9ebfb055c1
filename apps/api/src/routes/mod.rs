pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    response::Html,
    routing::{get, post},
    Router,
};

use crate::report::handlers;
use crate::state::AppState;

/// Upload cap for the generate form (source document plus text fields).
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

async fn index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health::health_handler))
        .route("/api/v1/status", get(health::api_status_handler))
        .route(
            "/api/v1/outline/parse",
            post(handlers::handle_parse_outline),
        )
        .route(
            "/api/v1/reports/generate",
            post(handlers::handle_generate).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/v1/reports/export", post(handlers::handle_export))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::ChatCompleter;
    use crate::report::generator::tests::StubCompleter;

    const BOUNDARY: &str = "reportwriter-test-boundary";

    fn test_config() -> Config {
        Config {
            openai_api_key: "sk-test".to_string(),
            openai_base_url: "http://provider.test/v1".to_string(),
            port: 0,
            request_timeout_secs: 30,
            rust_log: "info".to_string(),
        }
    }

    fn app(completer: StubCompleter) -> Router {
        let completer: Arc<dyn ChatCompleter> = Arc::new(completer);
        build_router(AppState {
            completer,
            config: test_config(),
        })
    }

    fn multipart_body(fields: &[(&str, &str)]) -> String {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            if *name == "file" {
                body.push_str(
                    "Content-Disposition: form-data; name=\"file\"; filename=\"source.txt\"\r\n\
                     Content-Type: text/plain\r\n\r\n",
                );
            } else {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                ));
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn generate_request(fields: &[(&str, &str)]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/reports/generate")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(fields)))
            .unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = app(StubCompleter::replying("ok"))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "reportwriter");
    }

    #[tokio::test]
    async fn test_index_serves_form() {
        let response = app(StubCompleter::replying("ok"))
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("Report Writer"));
    }

    #[tokio::test]
    async fn test_api_status_reports_provider_state() {
        let response = app(StubCompleter::failing("invalid api key"))
            .oneshot(Request::get("/api/v1/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["healthy"], false);
        assert_eq!(body["message"], "invalid api key");
    }

    #[tokio::test]
    async fn test_parse_outline_endpoint() {
        let response = app(StubCompleter::replying("ok"))
            .oneshot(json_request(
                "/api/v1/outline/parse",
                json!({"outline": "Intro:300\nMethods:500"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["sections"][0]["title"], "Intro");
        assert_eq!(body["sections"][1]["word_limit"], 500);
        assert_eq!(body["total_words"], 800);
    }

    #[tokio::test]
    async fn test_parse_outline_endpoint_rejects_malformed_line() {
        let response = app(StubCompleter::replying("ok"))
            .oneshot(json_request(
                "/api/v1/outline/parse",
                json!({"outline": "Intro-300"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "OUTLINE_ERROR");
    }

    #[tokio::test]
    async fn test_generate_returns_report() {
        let response = app(StubCompleter::replying("  Hello  "))
            .oneshot(generate_request(&[
                ("file", "Revenue grew 12%."),
                ("outline", "Intro:300\nResults:200"),
                ("instructions", "Be formal"),
                ("model", "advanced"),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["report"], "Hello");
        assert_eq!(body["model"], "advanced");
        assert!(body["report_id"].is_string());
        assert!(body["generated_at"].is_string());
    }

    #[tokio::test]
    async fn test_generate_provider_failure_is_bad_gateway() {
        let response = app(StubCompleter::failing("quota exceeded"))
            .oneshot(generate_request(&[
                ("file", "Revenue grew 12%."),
                ("outline", "Intro:300"),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "REMOTE_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("quota exceeded"));
        assert!(body.get("report").is_none());
    }

    #[tokio::test]
    async fn test_generate_without_file_is_missing_input() {
        let stub = StubCompleter::replying("unused");
        let response = app(stub)
            .oneshot(generate_request(&[("outline", "Intro:300")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "MISSING_INPUT");
    }

    #[tokio::test]
    async fn test_generate_with_bad_outline_does_not_call_provider() {
        let stub = Arc::new(StubCompleter::replying("unused"));
        let completer: Arc<dyn ChatCompleter> = stub.clone();
        let router = build_router(AppState {
            completer,
            config: test_config(),
        });

        let response = router
            .oneshot(generate_request(&[
                ("file", "data"),
                ("outline", "Intro:abc"),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(stub.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_export_text_download() {
        let report = "Intro\nRevenue grew 12%.";
        let response = app(StubCompleter::replying("ok"))
            .oneshot(json_request(
                "/api/v1/reports/export",
                json!({"report": report, "format": "text"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"report.txt\""
        );
        assert_eq!(body_bytes(response).await, report.as_bytes());
    }

    #[tokio::test]
    async fn test_export_word_download() {
        let response = app(StubCompleter::replying("ok"))
            .oneshot(json_request(
                "/api/v1/reports/export",
                json!({"report": "Hello", "format": "word"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"report.docx\""
        );
        let bytes = body_bytes(response).await;
        assert!(bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_export_empty_report_is_missing_input() {
        let response = app(StubCompleter::replying("ok"))
            .oneshot(json_request(
                "/api/v1/reports/export",
                json!({"report": "  ", "format": "text"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
