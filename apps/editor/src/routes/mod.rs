pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::editor::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Session lifecycle and viewport
        .route("/api/v1/editor", get(handlers::handle_get_session))
        .route("/api/v1/editor/reset", post(handlers::handle_reset))
        .route("/api/v1/editor/viewport", post(handlers::handle_viewport))
        // Template and spreadsheet (document service)
        .route("/api/v1/editor/template", post(handlers::handle_upload_template))
        .route(
            "/api/v1/editor/template/reload",
            post(handlers::handle_reload_template),
        )
        .route("/api/v1/editor/excel", post(handlers::handle_upload_excel))
        // Placeholder store
        .route(
            "/api/v1/editor/placeholders",
            post(handlers::handle_add_placeholder),
        )
        .route(
            "/api/v1/editor/placeholders/:id",
            patch(handlers::handle_update_placeholder).delete(handlers::handle_delete_placeholder),
        )
        .route(
            "/api/v1/editor/placeholders/:id/commit",
            post(handlers::handle_commit_interaction),
        )
        .route("/api/v1/editor/selection", post(handlers::handle_select))
        // Layout persistence and generation
        .route(
            "/api/v1/editor/layout",
            axum::routing::put(handlers::handle_import_layout),
        )
        .route("/api/v1/editor/layout/save", post(handlers::handle_save_layout))
        .route("/api/v1/editor/preview", post(handlers::handle_preview))
        .route("/api/v1/editor/generate", post(handlers::handle_generate))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::editor::remote::tests::MockDocs;
    use crate::editor::template::tests::png_bytes;

    fn test_config() -> Config {
        Config {
            document_service_url: "http://docs".to_string(),
            document_service_timeout: Duration::from_secs(1),
            initial_container_width: None,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }

    fn app_with(docs: MockDocs) -> (Router, Arc<MockDocs>) {
        let docs = Arc::new(docs);
        let state = AppState::new(test_config(), docs.clone());
        (build_router(state), docs)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app_with(MockDocs::default());
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_add_edit_commit_and_save_flow() {
        let (app, docs) = app_with(MockDocs::with_template(2000, 1200));

        let (status, _) = send(&app, Method::POST, "/api/v1/editor/viewport", Some(json!({"container_width": 1020}))).await;
        assert_eq!(status, StatusCode::OK);
        let (status, template) = send(&app, Method::POST, "/api/v1/editor/template/reload", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(template["size"]["width"], 2000);

        let (status, added) = send(&app, Method::POST, "/api/v1/editor/placeholders", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(added["label"], "field_1");
        let id = added["id"].as_str().unwrap().to_string();

        let (_, updated) = send(
            &app,
            Method::PATCH,
            &format!("/api/v1/editor/placeholders/{id}"),
            Some(json!({"label": "recipient", "color": "#224466"})),
        )
        .await;
        assert_eq!(updated["applied"], true);

        let (_, outcome) = send(
            &app,
            Method::POST,
            &format!("/api/v1/editor/placeholders/{id}/commit"),
            Some(json!({"kind": "resize", "x": 10, "y": 20, "width": 300, "height": 25})),
        )
        .await;
        assert_eq!(outcome["applied"], true);
        assert_eq!(outcome["update"]["height"], 50);
        assert_eq!(outcome["update"]["font_size"], 30);

        let (_, view) = send(&app, Method::GET, "/api/v1/editor", None).await;
        let shown = &view["placeholders"][0];
        assert_eq!(shown["x"], 20);
        assert_eq!(shown["width"], 600);
        assert_eq!(shown["display"]["width"], 300.0);
        assert_eq!(shown["selected"], true);

        let (status, saved) = send(
            &app,
            Method::POST,
            "/api/v1/editor/layout/save",
            Some(json!({"default_font": "Roboto-Regular.ttf"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["saved"], 1);
        let sent = docs.saved.lock().unwrap();
        let record = sent[0].placeholders.get("recipient").unwrap();
        assert_eq!((record.x, record.y, record.width, record.height), (20, 40, 600, 50));
    }

    #[tokio::test]
    async fn test_save_empty_layout_is_bad_request() {
        let (app, docs) = app_with(MockDocs::default());
        let (status, body) = send(&app, Method::POST, "/api/v1/editor/layout/save", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "LAYOUT_INVALID");
        assert!(docs.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_ids_are_tolerated() {
        let (app, _) = app_with(MockDocs::default());
        let ghost = uuid::Uuid::new_v4();
        let (status, body) = send(&app, Method::DELETE, &format!("/api/v1/editor/placeholders/{ghost}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"], false);

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/editor/placeholders/{ghost}/commit"),
            Some(json!({"kind": "drag", "x": 1, "y": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"], false);
    }

    #[tokio::test]
    async fn test_selection_and_delete() {
        let (app, _) = app_with(MockDocs::default());
        let (_, first) = send(&app, Method::POST, "/api/v1/editor/placeholders", None).await;
        let (_, second) = send(&app, Method::POST, "/api/v1/editor/placeholders", None).await;

        let (status, _) = send(&app, Method::POST, "/api/v1/editor/selection", Some(json!({"id": first["id"]}))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let second_id = second["id"].as_str().unwrap();
        send(&app, Method::DELETE, &format!("/api/v1/editor/placeholders/{second_id}"), None).await;
        let (_, view) = send(&app, Method::GET, "/api/v1/editor", None).await;
        assert_eq!(view["selected"], first["id"]);

        let first_id = first["id"].as_str().unwrap();
        send(&app, Method::DELETE, &format!("/api/v1/editor/placeholders/{first_id}"), None).await;
        let (_, view) = send(&app, Method::GET, "/api/v1/editor", None).await;
        assert_eq!(view["selected"], Value::Null);
        assert_eq!(view["placeholders"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_import_then_reset() {
        let (app, _) = app_with(MockDocs::default());
        let (_, body) = send(
            &app,
            Method::PUT,
            "/api/v1/editor/layout",
            Some(json!({"placeholders": {"name": {"x": 1, "y": 2, "width": 30, "height": 40}}})),
        )
        .await;
        assert_eq!(body["loaded"], 1);

        let (_, view) = send(&app, Method::POST, "/api/v1/editor/reset", None).await;
        assert_eq!(view["placeholders"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_document_service_failure_is_bad_gateway_and_keeps_layout() {
        let (app, _) = app_with(MockDocs::failing());
        send(&app, Method::POST, "/api/v1/editor/placeholders", None).await;
        let (status, body) = send(&app, Method::POST, "/api/v1/editor/layout/save", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "DOCUMENT_SERVICE_ERROR");

        let (_, view) = send(&app, Method::GET, "/api/v1/editor", None).await;
        assert_eq!(view["placeholders"][0]["label"], "field_1");
    }

    #[tokio::test]
    async fn test_upload_template_from_raw_body() {
        let (app, _) = app_with(MockDocs::default());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/editor/template?filename=cert.png")
            .body(Body::from(png_bytes(640, 480)))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (_, view) = send(&app, Method::GET, "/api/v1/editor", None).await;
        assert_eq!(view["template"]["size"]["width"], 640);
        assert_eq!(view["template"]["url"], "http://docs/static/cert.png");
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let (app, _) = app_with(MockDocs::default());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/editor/excel?filename=rows.xlsx")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_preview_returns_png_bytes() {
        let (app, _) = app_with(MockDocs::default());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/editor/preview")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"row_index": 2}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"png-row-2");
    }

    #[tokio::test]
    async fn test_generate_returns_download_url() {
        let (app, _) = app_with(MockDocs::default());
        let (status, body) = send(&app, Method::POST, "/api/v1/editor/generate", Some(json!({"folder_name": "spring"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["zip"], "spring.zip");
        assert_eq!(body["download_url"], "http://docs/download/spring.zip");
    }

    #[tokio::test]
    async fn test_negative_viewport_rejected() {
        let (app, _) = app_with(MockDocs::default());
        let (status, _) = send(&app, Method::POST, "/api/v1/editor/viewport", Some(json!({"container_width": -5}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_import_with_blank_label_is_rejected() {
        let (app, _) = app_with(MockDocs::default());
        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/v1/editor/layout",
            Some(json!({"placeholders": {"": {"x": 1, "y": 2, "width": 30, "height": 40}}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "LAYOUT_INVALID");
    }

    #[tokio::test]
    async fn test_preview_with_negative_row_is_rejected() {
        let (app, _) = app_with(MockDocs::default());
        let (status, body) =
            send(&app, Method::POST, "/api/v1/editor/preview", Some(json!({"row_index": -1}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_save_with_unknown_font_is_rejected() {
        let (app, docs) = app_with(MockDocs::default());
        send(&app, Method::POST, "/api/v1/editor/placeholders", None).await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/editor/layout/save",
            Some(json!({"default_font": "Comic-Sans.ttf"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(docs.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_with_non_string_folder_is_rejected() {
        let (app, _) = app_with(MockDocs::default());
        let (status, body) =
            send(&app, Method::POST, "/api/v1/editor/generate", Some(json!({"folder_name": 5}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_bodyless_generate_uses_default_folder() {
        let (app, _) = app_with(MockDocs::default());
        let (status, body) = send(&app, Method::POST, "/api/v1/editor/generate", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["zip"].as_str().unwrap().starts_with("job_"));
    }
}
