pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::ingestion::handlers as ingestion;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Ingestion API
        .route("/api/v1/documents/extract", post(ingestion::handle_extract))
        .route(
            "/api/v1/documents/extract/stream",
            post(ingestion::handle_extract_stream),
        )
        // Résumé API
        .route("/api/v1/resumes", post(resumes::handle_upload))
        .route("/api/v1/resumes/:id", get(resumes::handle_get_resume))
        .route("/api/v1/resumes/:id/analyze", post(resumes::handle_analyze))
        .layer(body_limit)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use aws_sdk_s3::config::{BehaviorVersion, Region};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{Config, IngestionConfig};
    use crate::ingestion::ocr::tests::FakeOcr;
    use crate::ingestion::pdf::tests::FakePdf;
    use crate::ingestion::DocumentExtractor;
    use crate::resumes::ai::tests::FakeResumeAi;

    const BOUNDARY: &str = "resume-api-test-boundary";

    fn test_state() -> AppState {
        state_with(DocumentExtractor::from_config(IngestionConfig::default()))
    }

    fn fake_state(pdf: FakePdf, ocr: FakeOcr) -> AppState {
        state_with(DocumentExtractor::new(
            Arc::new(pdf),
            Arc::new(ocr),
            IngestionConfig::default(),
        ))
    }

    fn state_with(extractor: DocumentExtractor) -> AppState {
        let config = Config {
            database_url: "postgres://localhost/resume_test".into(),
            s3_bucket: "resumes".into(),
            s3_endpoint: "http://localhost:9000".into(),
            aws_access_key_id: "test".into(),
            aws_secret_access_key: "test".into(),
            anthropic_api_key: "test".into(),
            port: 8080,
            rust_log: "info".into(),
            max_upload_bytes: 1024 * 1024,
            ingestion: IngestionConfig::default(),
        };
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();

        AppState {
            db: PgPoolOptions::new()
                .connect_lazy(&config.database_url)
                .unwrap(),
            s3: aws_sdk_s3::Client::from_conf(s3_config),
            extractor,
            resume_ai: Arc::new(FakeResumeAi),
            config,
        }
    }

    /// Multipart body with one file part and optional text fields.
    fn multipart_request(
        uri: &str,
        file: (&str, &str, &[u8]),
        fields: &[(&str, &str)],
    ) -> Request<Body> {
        let (file_name, mime_type, contents) = file;
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {mime_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_ok() {
        let response = build_router(test_state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "resume-api");
    }

    #[tokio::test]
    async fn test_unsupported_upload_is_unprocessable() {
        let request = multipart_request(
            "/api/v1/documents/extract",
            ("notes.txt", "text/plain", b"hello"),
            &[],
        );
        let response = build_router(test_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "UNSUPPORTED_FORMAT");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("PDF ou DOCX"));
    }

    #[tokio::test]
    async fn test_legacy_doc_upload_is_unprocessable() {
        let request = multipart_request(
            "/api/v1/documents/extract",
            ("cv.doc", "application/msword", b"\xd0\xcf\x11\xe0"),
            &[],
        );
        let response = build_router(test_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_body(response).await["error"]["code"], "LEGACY_DOC_UNSUPPORTED");
    }

    #[tokio::test]
    async fn test_upload_without_file_is_bad_request() {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"user_id\"\r\n\r\nabc\r\n--{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/documents/extract")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = build_router(test_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_resume_upload_requires_user_id() {
        let request = multipart_request(
            "/api/v1/resumes",
            ("cv.pdf", "application/pdf", b"%PDF-1.7"),
            &[],
        );
        let response = build_router(test_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_stream_emits_error_event_for_unsupported_upload() {
        let request = multipart_request(
            "/api/v1/documents/extract/stream",
            ("notes.txt", "text/plain", b"hello"),
            &[],
        );
        let response = build_router(test_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("event: error"));
        assert!(text.contains("UNSUPPORTED_FORMAT"));
        assert!(!text.contains("event: progress"));
    }

    /// `(event, data)` pairs of an SSE body, in order.
    fn sse_frames(body: &str) -> Vec<(String, Value)> {
        body.split("\n\n")
            .filter_map(|frame| {
                let mut event = None;
                let mut data = None;
                for line in frame.lines() {
                    if let Some(name) = line.strip_prefix("event: ") {
                        event = Some(name.to_string());
                    } else if let Some(payload) = line.strip_prefix("data: ") {
                        data = Some(serde_json::from_str(payload).unwrap());
                    }
                }
                Some((event?, data?))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_extract_returns_scanned_result() {
        let state = fake_state(
            FakePdf::with_pages(vec!["Logo", ""]),
            FakeOcr::with_responses(vec![
                Ok(("Maria Silva", 80.0)),
                Ok(("Engenheira de Software", 90.0)),
            ]),
        );
        let request = multipart_request(
            "/api/v1/documents/extract",
            ("cv.pdf", "application/pdf", b"%PDF-1.7"),
            &[],
        );
        let response = build_router(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["isScanned"], true);
        assert_eq!(body["pageCount"], 2);
        assert_eq!(body["ocrConfidence"], 85.0);
        assert_eq!(body["fileType"], "pdf");
        assert_eq!(body["text"], "Maria Silva\n\nEngenheira de Software");
    }

    #[tokio::test]
    async fn test_stream_emits_progress_then_result() {
        let dense = "Experiência ".repeat(20);
        let state = fake_state(
            FakePdf::with_pages(vec![dense.as_str(); 2]),
            FakeOcr::with_responses(vec![]),
        );
        let request = multipart_request(
            "/api/v1/documents/extract/stream",
            ("cv.pdf", "application/pdf", b"%PDF-1.7"),
            &[],
        );
        let response = build_router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let frames = sse_frames(&String::from_utf8(bytes.to_vec()).unwrap());

        let (last_event, result) = frames.last().unwrap();
        assert_eq!(last_event, "result");
        assert_eq!(result["isScanned"], false);
        assert_eq!(result["pageCount"], 2);
        assert_eq!(result["fileType"], "pdf");
        assert!(result.get("ocrConfidence").is_none());

        let progress: Vec<&Value> = frames[..frames.len() - 1]
            .iter()
            .map(|(event, data)| {
                assert_eq!(event, "progress");
                data
            })
            .collect();
        assert!(progress.len() >= 3);
        let values: Vec<u64> = progress
            .iter()
            .map(|p| p["progress"].as_u64().unwrap())
            .collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(
            progress.iter().filter(|p| p["stage"] == "complete").count(),
            1
        );
        assert_eq!(progress.last().unwrap()["stage"], "complete");
        assert_eq!(progress.last().unwrap()["progress"], 100);
    }
}
