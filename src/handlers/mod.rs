pub mod chat;
pub mod documents;
pub mod sessions;

use actix_web::error::JsonPayloadError;
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::ApiError;

pub const INVALID_JSON: &str = "Invalid JSON body";

pub async fn main() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "endpoints": ["/api/chat", "/api/analyze-document", "/api/sessions"],
    }))
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// JSON extractor settings; rejected bodies render as `{"error": ..}`.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default().limit(limit).error_handler(|err, _req| {
        let api_err = match err {
            JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
                ApiError::PayloadTooLarge
            }
            other => {
                log::warn!("rejected json body: {}", other);
                ApiError::bad_request(INVALID_JSON)
            }
        };
        api_err.into()
    })
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(main))
        .route("/health", web::get().to(health_check))
        .route("/api/chat", web::post().to(chat::send_chat))
        .route("/api/analyze-document", web::post().to(documents::analyze_document))
        .route("/api/sessions", web::post().to(sessions::create_session))
        .route("/api/sessions/{session_id}", web::get().to(sessions::get_session))
        .route("/api/sessions/{session_id}", web::delete().to(sessions::clear_session))
        .route("/api/sessions/{session_id}/documents", web::post().to(sessions::upload_documents))
        .route(
            "/api/sessions/{session_id}/documents/{document_id}",
            web::delete().to(sessions::remove_document),
        )
        .route("/api/sessions/{session_id}/messages", web::post().to(sessions::send_message));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use serde_json::Value;

    use crate::config::AppConfig;
    use crate::services::openai::testing::ScriptedBackend;
    use crate::state::AppState;

    const BOUNDARY: &str = "lexaiboundary";

    fn multipart_body(parts: &[(&str, &str, &str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (field, file_name, mime, bytes) in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    field, file_name, mime
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn multipart_request(uri: &str, parts: &[(&str, &str, &str, &[u8])]) -> test::TestRequest {
        test::TestRequest::post()
            .uri(uri)
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(multipart_body(parts))
    }

    macro_rules! app {
        ($backend:expr) => {
            app!($backend, AppConfig::from_lookup(|_| None))
        };
        ($backend:expr, $config:expr) => {{
            let config: AppConfig = $config;
            test::init_service(
                App::new()
                    .app_data(web::Data::new(AppState::new(&config, $backend)))
                    .app_data(web::PayloadConfig::new(config.max_body_bytes))
                    .app_data(json_config(config.max_body_bytes))
                    .configure(routes),
            )
            .await
        }};
    }

    macro_rules! new_session {
        ($app:expr) => {{
            let created: Value =
                test::call_and_read_body_json($app, test::TestRequest::post().uri("/api/sessions").to_request()).await;
            created["session_id"].as_str().unwrap().to_string()
        }};
    }

    #[actix_web::test]
    async fn health_reports_ok() {
        let app = app!(Arc::new(ScriptedBackend::new()));
        let body: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(body["status"], "OK");
    }

    #[actix_web::test]
    async fn chat_requires_an_array() {
        let backend = Arc::new(ScriptedBackend::new());
        let app = app!(backend.clone());
        let req = test::TestRequest::post()
            .uri("/api/chat")
            .set_json(serde_json::json!({"messages": "x"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, serde_json::json!({"error": "Messages array is required"}));
        assert_eq!(backend.calls(), 0);
    }

    #[actix_web::test]
    async fn chat_without_key_is_500() {
        let app = app!(Arc::new(ScriptedBackend::without_credentials()));
        let req = test::TestRequest::post()
            .uri("/api/chat")
            .set_json(serde_json::json!({"messages": [{"role": "user", "content": "hi"}]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "OpenAI API configuration is missing");
    }

    #[actix_web::test]
    async fn chat_returns_message_and_usage() {
        let app = app!(Arc::new(ScriptedBackend::new().reply("### Answer")));
        let req = test::TestRequest::post()
            .uri("/api/chat")
            .set_json(serde_json::json!({"messages": [{"role": "user", "content": "hi"}]}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "### Answer");
        assert_eq!(body["usage"]["total_tokens"], 8);
    }

    #[actix_web::test]
    async fn analyze_text_file() {
        let backend = Arc::new(ScriptedBackend::new().reply("## 📋 Simple Summary"));
        let app = app!(backend.clone());
        let req = multipart_request("/api/analyze-document", &[("file", "notes.txt", "text/plain", &b"Hello"[..])]).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["analysis"], "## 📋 Simple Summary");
        assert_eq!(body["fileName"], "notes.txt");
        assert_eq!(body["ocrUsed"], false);
        assert_eq!(backend.calls(), 1);
    }

    #[actix_web::test]
    async fn analyze_without_file_is_400() {
        let app = app!(Arc::new(ScriptedBackend::new()));
        let req = multipart_request("/api/analyze-document", &[("other", "x.txt", "text/plain", &b"x"[..])]).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "No file provided");
    }

    #[actix_web::test]
    async fn session_round_trip() {
        let backend = Arc::new(ScriptedBackend::new().reply("## doc analysis").reply("final answer"));
        let app = app!(backend.clone());

        let sid = new_session!(&app);

        // nothing to send: no upstream call
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/sessions/{}/messages", sid))
                .set_json(serde_json::json!({"message": ""}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(backend.calls(), 0);

        let uploaded: Value = test::call_and_read_body_json(
            &app,
            multipart_request(
                &format!("/api/sessions/{}/documents", sid),
                &[("file", "notice.png", "image/png", &[1u8, 2, 3][..])],
            )
            .to_request(),
        )
        .await;
        assert_eq!(uploaded["pending_documents"][0]["is_image"], true);

        let sent: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/sessions/{}/messages", sid))
                .set_json(serde_json::json!({"message": "Is this notice valid?"}))
                .to_request(),
        )
        .await;
        assert_eq!(sent["assistant_message"]["content"], "final answer");
        assert_eq!(sent["user_message"]["documents"][0], "notice.png");
        assert_eq!(backend.calls(), 2);

        let session: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri(&format!("/api/sessions/{}", sid)).to_request(),
        )
        .await;
        assert_eq!(session["count"], 2);
        assert_eq!(session["pending_documents"].as_array().unwrap().len(), 0);

        let resp = test::call_service(
            &app,
            test::TestRequest::delete().uri(&format!("/api/sessions/{}", sid)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn unknown_session_is_404() {
        let app = app!(Arc::new(ScriptedBackend::new()));
        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/sessions/nope").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Session not found");
    }

    #[actix_web::test]
    async fn truncated_upload_is_rejected() {
        let backend = Arc::new(ScriptedBackend::new());
        let app = app!(backend.clone());
        let body = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"contract.txt\"\r\nContent-Type: text/plain\r\n\r\nThe tenant shall pay rent of Rs 50,000 and the landlord",
            BOUNDARY
        );
        let req = test::TestRequest::post()
            .uri("/api/analyze-document")
            .insert_header((header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY)))
            .set_payload(body)
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], documents::INVALID_UPLOAD);
        assert_eq!(backend.calls(), 0);
    }

    #[actix_web::test]
    async fn non_multipart_upload_is_json_400() {
        let app = app!(Arc::new(ScriptedBackend::new()));
        let req = test::TestRequest::post()
            .uri("/api/analyze-document")
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .set_payload("hello")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], documents::INVALID_UPLOAD);
    }

    #[actix_web::test]
    async fn oversized_upload_is_413() {
        let backend = Arc::new(ScriptedBackend::new());
        let app = app!(
            backend.clone(),
            AppConfig::from_lookup(|key| (key == "MAX_BODY_BYTES").then(|| "16".to_string()))
        );
        let big = vec![b'a'; 100_000];
        let req = multipart_request("/api/analyze-document", &[("file", "big.txt", "text/plain", &big[..])]).to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Request body too large");
        assert_eq!(backend.calls(), 0);

        let sid = new_session!(&app);
        let req = multipart_request(
            &format!("/api/sessions/{}/documents", sid),
            &[("files", "a.txt", "text/plain", &b"0123456789"[..]), ("files", "b.txt", "text/plain", &b"0123456789"[..])],
        )
        .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let session: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri(&format!("/api/sessions/{}", sid)).to_request(),
        )
        .await;
        assert_eq!(session["pending_documents"].as_array().unwrap().len(), 0);
    }

    #[actix_web::test]
    async fn malformed_send_body_is_json_400() {
        let backend = Arc::new(ScriptedBackend::new());
        let app = app!(backend.clone());
        let sid = new_session!(&app);
        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/messages", sid))
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, serde_json::json!({"error": INVALID_JSON}));
        assert_eq!(backend.calls(), 0);
    }

    #[actix_web::test]
    async fn scanned_pdf_is_400_with_ocr_hint() {
        let backend = Arc::new(ScriptedBackend::new());
        let app = app!(backend.clone());
        let req = multipart_request(
            "/api/analyze-document",
            &[("file", "scan.pdf", "application/pdf", &b"not a pdf at all"[..])],
        )
        .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, serde_json::json!({"error": crate::services::extract::SCANNED_PDF}));
        assert_eq!(backend.calls(), 0);
    }

    #[actix_web::test]
    async fn text_pdf_is_analyzed() {
        let backend = Arc::new(ScriptedBackend::new().reply("## 📋 Simple Summary"));
        let app = app!(backend.clone());
        let pdf = crate::services::extract::tests::pdf_bytes("The tenant shall pay rent monthly");
        let req = multipart_request("/api/analyze-document", &[("file", "lease.pdf", "application/pdf", &pdf[..])])
            .to_request();

        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["fileName"], "lease.pdf");
        assert_eq!(body["ocrUsed"], false);
        assert_eq!(backend.calls(), 1);
    }

    #[actix_web::test]
    async fn clear_during_send_is_409() {
        let state = web::Data::new(AppState::new(
            &AppConfig::from_lookup(|_| None),
            Arc::new(ScriptedBackend::new()),
        ));
        let app = test::init_service(App::new().app_data(state.clone()).configure(routes)).await;
        let sid = new_session!(&app);
        state.sessions.lock().unwrap().get_mut(&sid).unwrap().begin_send().unwrap();

        let resp = test::call_service(
            &app,
            test::TestRequest::delete().uri(&format!("/api/sessions/{}", sid)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], crate::services::conversation::SEND_IN_FLIGHT);
    }
}
