/// Contact endpoints

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
    models::contact::{Contact, CreateContact},
};
use uuid::Uuid;
use validator::Validate;

/// Contact create/replace request
#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<String>,

    pub birthday: Option<NaiveDate>,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// List query
#[derive(Debug, Deserialize)]
pub struct ListContactsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ContactRequest {
    fn into_create(self) -> CreateContact {
        CreateContact {
            name: self.name,
            email: self.email,
            phone: self.phone,
            birthday: self.birthday,
            notes: self.notes,
        }
    }
}

pub async fn create_contact(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ContactRequest>,
) -> ApiResult<Json<Contact>> {
    req.validate()?;

    let contact = Contact::create(&state.db, auth.user_id, req.into_create()).await?;
    Ok(Json(contact))
}

pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListContactsQuery>,
) -> ApiResult<Json<Vec<Contact>>> {
    let (limit, offset) = page(query.limit, query.offset);
    let contacts = Contact::list(&state.db, auth.user_id, limit, offset).await?;

    Ok(Json(contacts))
}

pub async fn get_contact(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Contact>> {
    let contact = Contact::find_by_id(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contact not found".to_string()))?;

    Ok(Json(contact))
}

pub async fn update_contact(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ContactRequest>,
) -> ApiResult<Json<Contact>> {
    req.validate()?;

    let contact = Contact::update(&state.db, auth.user_id, id, req.into_create())
        .await?
        .ok_or_else(|| ApiError::NotFound("Contact not found".to_string()))?;

    Ok(Json(contact))
}

/// Deletes a contact (and, via cascade, its relationship row)
pub async fn delete_contact(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = Contact::delete(&state.db, auth.user_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Contact not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
