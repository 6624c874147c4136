/// Relationship tracking endpoints
///
/// A relationship annotates one contact with kind, closeness, and the last
/// time you were in touch. Each contact carries at most one relationship.
///
/// # Endpoints
///
/// - `POST /v1/relationships` - Link a contact (409 if already linked)
/// - `GET /v1/relationships` - List relationships
/// - `GET /v1/relationships/:id` / `PUT` / `DELETE` - Single operations

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
    models::{
        contact::Contact,
        relationship::{
            CreateRelationship, Relationship, RelationshipKind, UpdateRelationship,
        },
    },
};
use uuid::Uuid;
use validator::Validate;

/// Relationship create request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRelationshipRequest {
    /// Contact to link; must belong to the authenticated user
    pub contact_id: Uuid,

    pub kind: RelationshipKind,

    /// Closeness, 1 (distant) to 5 (inner circle)
    #[validate(range(min = 1, max = 5, message = "Closeness must be between 1 and 5"))]
    pub closeness: i16,

    pub last_contacted_on: Option<NaiveDate>,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// Relationship replace request (the linked contact is immutable)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRelationshipRequest {
    pub kind: RelationshipKind,

    #[validate(range(min = 1, max = 5, message = "Closeness must be between 1 and 5"))]
    pub closeness: i16,

    pub last_contacted_on: Option<NaiveDate>,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// List query
#[derive(Debug, Deserialize)]
pub struct ListRelationshipsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Links a contact
///
/// # Errors
///
/// - `404 Not Found`: Contact does not exist (or belongs to someone else)
/// - `409 Conflict`: Contact already linked
pub async fn create_relationship(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateRelationshipRequest>,
) -> ApiResult<Json<Relationship>> {
    req.validate()?;

    // The foreign key alone would not stop linking another user's contact
    Contact::find_by_id(&state.db, auth.user_id, req.contact_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contact not found".to_string()))?;

    let relationship = Relationship::create(
        &state.db,
        auth.user_id,
        CreateRelationship {
            contact_id: req.contact_id,
            kind: req.kind,
            closeness: req.closeness,
            last_contacted_on: req.last_contacted_on,
            notes: req.notes,
        },
    )
    .await?;

    Ok(Json(relationship))
}

pub async fn list_relationships(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListRelationshipsQuery>,
) -> ApiResult<Json<Vec<Relationship>>> {
    let (limit, offset) = page(query.limit, query.offset);
    let relationships = Relationship::list(&state.db, auth.user_id, limit, offset).await?;

    Ok(Json(relationships))
}

pub async fn get_relationship(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Relationship>> {
    let relationship = Relationship::find_by_id(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Relationship not found".to_string()))?;

    Ok(Json(relationship))
}

pub async fn update_relationship(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRelationshipRequest>,
) -> ApiResult<Json<Relationship>> {
    req.validate()?;

    let relationship = Relationship::update(
        &state.db,
        auth.user_id,
        id,
        UpdateRelationship {
            kind: req.kind,
            closeness: req.closeness,
            last_contacted_on: req.last_contacted_on,
            notes: req.notes,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Relationship not found".to_string()))?;

    Ok(Json(relationship))
}

pub async fn delete_relationship(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = Relationship::delete(&state.db, auth.user_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Relationship not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
