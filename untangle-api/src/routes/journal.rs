/// Journal endpoints
///
/// # Endpoints
///
/// - `POST /v1/journal` - Write an entry
/// - `GET /v1/journal` - List entries (filter by date range)
/// - `GET /v1/journal/:id` / `PUT` / `DELETE` - Single-entry operations

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    routes::page,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use untangle_shared::{
    auth::middleware::AuthContext,
    models::{
        journal::{CreateJournalEntry, JournalEntry},
        mindfulness::MoodLevel,
    },
};
use uuid::Uuid;
use validator::Validate;

const MAX_TAGS: usize = 20;
const MAX_TAG_LENGTH: usize = 50;

/// Entry create/replace request
#[derive(Debug, Deserialize, Validate)]
pub struct EntryRequest {
    /// Date the entry is about; defaults to today
    pub entry_date: Option<NaiveDate>,

    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Body must not be empty"))]
    pub body: String,

    pub mood: Option<MoodLevel>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// List query
#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl EntryRequest {
    fn check(&self) -> Result<(), ApiError> {
        self.validate()?;

        let mut errors = Vec::new();
        if self.tags.len() > MAX_TAGS {
            errors.push(ValidationErrorDetail {
                field: "tags".to_string(),
                message: format!("At most {} tags allowed", MAX_TAGS),
            });
        }
        for (i, tag) in self.tags.iter().enumerate() {
            if tag.trim().is_empty() || tag.len() > MAX_TAG_LENGTH {
                errors.push(ValidationErrorDetail {
                    field: format!("tags[{}]", i),
                    message: format!("Tags must be 1-{} characters", MAX_TAG_LENGTH),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ValidationError(errors))
        }
    }

    fn into_create(self) -> CreateJournalEntry {
        CreateJournalEntry {
            entry_date: self.entry_date.unwrap_or_else(|| Utc::now().date_naive()),
            title: self.title,
            body: self.body,
            mood: self.mood,
            tags: self.tags,
        }
    }
}

/// Writes a journal entry
pub async fn create_entry(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<EntryRequest>,
) -> ApiResult<Json<JournalEntry>> {
    req.check()?;

    let entry = JournalEntry::create(&state.db, auth.user_id, req.into_create()).await?;
    Ok(Json(entry))
}

/// Lists entries, newest first
pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListEntriesQuery>,
) -> ApiResult<Json<Vec<JournalEntry>>> {
    let (limit, offset) = page(query.limit, query.offset);
    let entries =
        JournalEntry::list(&state.db, auth.user_id, query.from, query.to, limit, offset).await?;

    Ok(Json(entries))
}

/// Fetches one entry
pub async fn get_entry(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<JournalEntry>> {
    let entry = JournalEntry::find_by_id(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Journal entry not found".to_string()))?;

    Ok(Json(entry))
}

/// Replaces an entry
pub async fn update_entry(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<EntryRequest>,
) -> ApiResult<Json<JournalEntry>> {
    req.check()?;

    let entry = JournalEntry::update(&state.db, auth.user_id, id, req.into_create())
        .await?
        .ok_or_else(|| ApiError::NotFound("Journal entry not found".to_string()))?;

    Ok(Json(entry))
}

/// Deletes an entry
pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = JournalEntry::delete(&state.db, auth.user_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Journal entry not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
