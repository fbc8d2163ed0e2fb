use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    AppState,
    error::AppError,
    middleware::AuthUser,
    policy::{Action, can_perform},
};

use super::model::{Document, DocumentInfo, UploadDocumentRequest};

#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    pub group_id: Option<String>,
}

#[axum::debug_handler]
pub async fn upload_document(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(req): Json<UploadDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentInfo>), AppError> {
    if !can_perform(actor.role, &Action::ManageDocuments) {
        return Err(AppError::Forbidden);
    }

    if req.name.trim().is_empty() {
        return Err(AppError::Validation("Document name must not be empty".into()));
    }

    let document = Document::upload(&state.pool, req, &actor.user_id).await?;
    Ok((StatusCode::CREATED, Json(document)))
}

#[axum::debug_handler]
pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<Vec<DocumentInfo>>, AppError> {
    let documents = DocumentInfo::list(&state.pool, query.group_id.as_deref()).await?;
    Ok(Json(documents))
}

#[axum::debug_handler]
pub async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<Document>, AppError> {
    let document = Document::find_by_id(&state.pool, &document_id)
        .await?
        .ok_or(AppError::NotFound("Document"))?;
    Ok(Json(document))
}

#[axum::debug_handler]
pub async fn delete_document(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(document_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !can_perform(actor.role, &Action::ManageDocuments) {
        return Err(AppError::Forbidden);
    }

    Document::delete(&state.pool, &document_id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
