/// Mindfulness check-in endpoints
///
/// Check-ins are append-only snapshots of mood, energy, and stress; there is
/// deliberately no update endpoint. The latest check-in also feeds the
/// assistant's daily context.
///
/// # Endpoints
///
/// - `POST /v1/mindfulness` - Record a check-in
/// - `GET /v1/mindfulness` - List check-ins, newest first
/// - `GET /v1/mindfulness/latest` - Most recent check-in
/// - `GET /v1/mindfulness/date/:date` - Check-ins for one day
/// - `GET /v1/mindfulness/:id` - Fetch one check-in
/// - `DELETE /v1/mindfulness/:id` - Delete a check-in

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::page,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use untangle_shared::{
    auth::middleware::AuthContext,
    models::mindfulness::{CreateCheckin, MindfulnessCheckin, MoodLevel},
};
use uuid::Uuid;
use validator::Validate;

/// Check-in request
#[derive(Debug, Deserialize, Validate)]
pub struct CheckinRequest {
    /// When the check-in happened; defaults to now
    pub checked_in_at: Option<DateTime<Utc>>,

    pub mood: MoodLevel,

    /// Energy level, 1 (drained) to 5 (energized)
    #[validate(range(min = 1, max = 5, message = "Energy must be between 1 and 5"))]
    pub energy: i16,

    /// Stress level, 1 (calm) to 5 (overwhelmed)
    #[validate(range(min = 1, max = 5, message = "Stress must be between 1 and 5"))]
    pub stress: i16,

    #[validate(length(max = 1000, message = "Gratitude must be at most 1000 characters"))]
    pub gratitude: Option<String>,

    #[validate(length(max = 2000, message = "Note must be at most 2000 characters"))]
    pub note: Option<String>,
}

/// List query
#[derive(Debug, Deserialize)]
pub struct ListCheckinsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Records a check-in
pub async fn create_checkin(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CheckinRequest>,
) -> ApiResult<Json<MindfulnessCheckin>> {
    req.validate()?;

    let checkin = MindfulnessCheckin::create(
        &state.db,
        auth.user_id,
        CreateCheckin {
            checked_in_at: req.checked_in_at.unwrap_or_else(Utc::now),
            mood: req.mood,
            energy: req.energy,
            stress: req.stress,
            gratitude: req.gratitude,
            note: req.note,
        },
    )
    .await?;

    Ok(Json(checkin))
}

/// Lists check-ins, newest first
pub async fn list_checkins(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListCheckinsQuery>,
) -> ApiResult<Json<Vec<MindfulnessCheckin>>> {
    let (limit, offset) = page(query.limit, query.offset);
    let checkins = MindfulnessCheckin::list(&state.db, auth.user_id, limit, offset).await?;

    Ok(Json(checkins))
}

/// Returns the most recent check-in
pub async fn latest_checkin(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MindfulnessCheckin>> {
    let checkin = MindfulnessCheckin::latest(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No check-ins recorded yet".to_string()))?;

    Ok(Json(checkin))
}

/// Lists check-ins for one calendar day
pub async fn checkins_for_date(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(date): Path<NaiveDate>,
) -> ApiResult<Json<Vec<MindfulnessCheckin>>> {
    let checkins = MindfulnessCheckin::list_for_date(&state.db, auth.user_id, date).await?;
    Ok(Json(checkins))
}

/// Fetches one check-in
pub async fn get_checkin(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MindfulnessCheckin>> {
    let checkin = MindfulnessCheckin::find_by_id(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Check-in not found".to_string()))?;

    Ok(Json(checkin))
}

/// Deletes a check-in
pub async fn delete_checkin(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = MindfulnessCheckin::delete(&state.db, auth.user_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Check-in not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
