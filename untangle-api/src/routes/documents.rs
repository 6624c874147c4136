/// Document registry endpoints
///
/// Tracks where important papers live and when they expire; file storage
/// itself stays outside the system.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::page,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use untangle_shared::{
    auth::middleware::AuthContext,
    models::document::{CreateDocument, Document, DocumentCategory},
};
use uuid::Uuid;
use validator::Validate;

/// Document create/replace request
#[derive(Debug, Deserialize, Validate)]
pub struct DocumentRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    pub category: DocumentCategory,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,

    /// Expiry date, for renewal reminders
    pub expires_on: Option<NaiveDate>,

    /// Physical or digital location ("safe", "Dropbox/taxes/2025", ...)
    #[validate(length(max = 500, message = "Location must be at most 500 characters"))]
    pub location: Option<String>,
}

/// List query
#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl DocumentRequest {
    fn into_create(self) -> CreateDocument {
        CreateDocument {
            title: self.title,
            category: self.category,
            notes: self.notes,
            expires_on: self.expires_on,
            location: self.location,
        }
    }
}

pub async fn create_document(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<DocumentRequest>,
) -> ApiResult<Json<Document>> {
    req.validate()?;

    let doc = Document::create(&state.db, auth.user_id, req.into_create()).await?;
    Ok(Json(doc))
}

pub async fn list_documents(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListDocumentsQuery>,
) -> ApiResult<Json<Vec<Document>>> {
    let (limit, offset) = page(query.limit, query.offset);
    let docs = Document::list(&state.db, auth.user_id, limit, offset).await?;

    Ok(Json(docs))
}

pub async fn get_document(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Document>> {
    let doc = Document::find_by_id(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Document not found".to_string()))?;

    Ok(Json(doc))
}

pub async fn update_document(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<DocumentRequest>,
) -> ApiResult<Json<Document>> {
    req.validate()?;

    let doc = Document::update(&state.db, auth.user_id, id, req.into_create())
        .await?
        .ok_or_else(|| ApiError::NotFound("Document not found".to_string()))?;

    Ok(Json(doc))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = Document::delete(&state.db, auth.user_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Document not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
