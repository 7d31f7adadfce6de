use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::editor::remote::{self, GenerationResult};
use crate::editor::session::{SessionView, Template};
use crate::editor::EditorSession;
use crate::errors::AppError;
use crate::layout::{
    FontFamily, InteractionCommit, InteractionOutcome, LayoutImport, Placeholder, PlaceholderId,
    PlaceholderPatch,
};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ViewportRequest {
    pub container_width: Option<f64>,
}

#[derive(Deserialize)]
pub struct UploadQuery {
    pub filename: String,
}

#[derive(Deserialize)]
pub struct SelectionRequest {
    pub id: Option<PlaceholderId>,
}

#[derive(Deserialize, Default)]
pub struct SaveRequest {
    pub default_font: Option<FontFamily>,
}

#[derive(Deserialize, Default)]
pub struct PreviewRequest {
    #[serde(default)]
    pub row_index: u32,
}

#[derive(Deserialize, Default)]
pub struct GenerateRequest {
    pub folder_name: Option<String>,
}

/// Whether a mutation found its placeholder. Unknown ids are not an error.
#[derive(Serialize)]
pub struct MutationResponse {
    pub id: PlaceholderId,
    pub applied: bool,
}

#[derive(Serialize)]
pub struct SaveResponse {
    pub saved: usize,
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub loaded: usize,
}

/// GET /api/v1/editor
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.session.lock().await.view())
}

/// POST /api/v1/editor/reset
pub async fn handle_reset(State(state): State<AppState>) -> Json<SessionView> {
    let mut session = state.session.lock().await;
    *session = EditorSession::new(state.config.initial_container_width);
    Json(session.view())
}

/// POST /api/v1/editor/viewport
pub async fn handle_viewport(
    State(state): State<AppState>,
    Json(req): Json<ViewportRequest>,
) -> Result<Json<SessionView>, AppError> {
    if let Some(width) = req.container_width {
        if !width.is_finite() || width < 0.0 {
            return Err(AppError::Validation(format!(
                "container_width must be a non-negative number, got {width}"
            )));
        }
    }
    let mut session = state.session.lock().await;
    session.resize_viewport(req.container_width);
    Ok(Json(session.view()))
}

/// POST /api/v1/editor/template/reload
pub async fn handle_reload_template(
    State(state): State<AppState>,
) -> Result<Json<Template>, AppError> {
    let template = remote::reload_template(&state.session, state.docs.as_ref()).await?;
    Ok(Json(template))
}

/// POST /api/v1/editor/template?filename=...
pub async fn handle_upload_template(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<Template>, AppError> {
    require_file(&query.filename, &body)?;
    let template =
        remote::upload_template(&state.session, state.docs.as_ref(), query.filename, body).await?;
    Ok(Json(template))
}

/// POST /api/v1/editor/excel?filename=...
pub async fn handle_upload_excel(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    require_file(&query.filename, &body)?;
    remote::upload_excel(state.docs.as_ref(), query.filename, body).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/editor/placeholders
pub async fn handle_add_placeholder(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Placeholder>), AppError> {
    let mut session = state.session.lock().await;
    let id = session.add_placeholder();
    let placeholder = session
        .store()
        .get(id)
        .cloned()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("placeholder {id} vanished after add")))?;
    Ok((StatusCode::CREATED, Json(placeholder)))
}

/// PATCH /api/v1/editor/placeholders/:id
pub async fn handle_update_placeholder(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<PlaceholderPatch>,
) -> Json<MutationResponse> {
    let id = PlaceholderId::from(id);
    let applied = state.session.lock().await.update_placeholder(id, &patch);
    Json(MutationResponse { id, applied })
}

/// DELETE /api/v1/editor/placeholders/:id
pub async fn handle_delete_placeholder(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Json<MutationResponse> {
    let id = PlaceholderId::from(id);
    let applied = state.session.lock().await.delete_placeholder(id);
    Json(MutationResponse { id, applied })
}

/// POST /api/v1/editor/selection
pub async fn handle_select(
    State(state): State<AppState>,
    Json(req): Json<SelectionRequest>,
) -> StatusCode {
    state.session.lock().await.select(req.id);
    StatusCode::NO_CONTENT
}

/// POST /api/v1/editor/placeholders/:id/commit
pub async fn handle_commit_interaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(commit): Json<InteractionCommit>,
) -> Json<InteractionOutcome> {
    let outcome = state
        .session
        .lock()
        .await
        .commit_interaction(PlaceholderId::from(id), commit);
    Json(outcome)
}

/// POST /api/v1/editor/layout/save
pub async fn handle_save_layout(
    State(state): State<AppState>,
    req: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<Json<SaveResponse>, AppError> {
    let req = optional_body(req)?;
    let saved = remote::save_layout(&state.session, state.docs.as_ref(), req.default_font).await?;
    Ok(Json(SaveResponse { saved }))
}

/// PUT /api/v1/editor/layout
pub async fn handle_import_layout(
    State(state): State<AppState>,
    Json(import): Json<LayoutImport>,
) -> Result<Json<ImportResponse>, AppError> {
    let loaded = state.session.lock().await.import_layout(&import)?;
    Ok(Json(ImportResponse { loaded }))
}

/// POST /api/v1/editor/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    req: Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = optional_body(req)?;
    let png = remote::preview(state.docs.as_ref(), req.row_index).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// POST /api/v1/editor/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    req: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerationResult>, AppError> {
    let req = optional_body(req)?;
    let result = remote::generate(state.docs.as_ref(), req.folder_name).await?;
    Ok(Json(result))
}

/// A request without a JSON content type carries no body and gets the defaults.
/// A body that is present but malformed is rejected.
fn optional_body<T: Default>(req: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match req {
        Ok(Json(req)) => Ok(req),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(AppError::Validation(rejection.body_text())),
    }
}

fn require_file(filename: &str, body: &Bytes) -> Result<(), AppError> {
    if filename.trim().is_empty() {
        return Err(AppError::Validation("filename is required".to_string()));
    }
    if body.is_empty() {
        return Err(AppError::Validation("No file provided".to_string()));
    }
    Ok(())
}
