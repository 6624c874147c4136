/// Habit tracking endpoints
///
/// A habit owns a set of logged dates; logging is idempotent per day.
/// Streaks are computed from the log on demand, never stored.
///
/// # Endpoints
///
/// - `POST /v1/habits` - Create a habit
/// - `GET /v1/habits` - List habits (`?include_archived=true` to see all)
/// - `GET /v1/habits/:id` / `PUT` / `DELETE` - Single-habit operations
/// - `POST /v1/habits/:id/logs` - Log a date (defaults to today)
/// - `GET /v1/habits/:id/logs` - All logged dates
/// - `DELETE /v1/habits/:id/logs/:date` - Remove a logged date
/// - `GET /v1/habits/:id/streak` - Current/longest streak and 30-day rate

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use untangle_shared::{
    auth::middleware::AuthContext,
    models::habit::{CreateHabit, Habit, HabitCadence, HabitLog, StreakSummary, UpdateHabit},
};
use uuid::Uuid;
use validator::Validate;

/// Habit create request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateHabitRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub cadence: HabitCadence,

    /// Weekly target; a daily habit uses 7
    #[validate(range(min = 1, max = 7, message = "Target must be between 1 and 7 per week"))]
    pub target_per_week: i16,
}

/// Habit replace request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateHabitRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub cadence: HabitCadence,

    #[validate(range(min = 1, max = 7, message = "Target must be between 1 and 7 per week"))]
    pub target_per_week: i16,

    /// Archived habits keep their history but drop out of default lists
    #[serde(default)]
    pub archived: bool,
}

/// List query
#[derive(Debug, Deserialize)]
pub struct ListHabitsQuery {
    #[serde(default)]
    pub include_archived: bool,
}

/// Log request; `date` defaults to today (UTC)
#[derive(Debug, Deserialize, Default)]
pub struct LogHabitRequest {
    pub date: Option<NaiveDate>,
}

/// Resolves a habit the authenticated user owns, or 404
async fn owned_habit(state: &AppState, user_id: Uuid, id: Uuid) -> ApiResult<Habit> {
    Habit::find_by_id(&state.db, user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Habit not found".to_string()))
}

/// Creates a habit
pub async fn create_habit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateHabitRequest>,
) -> ApiResult<Json<Habit>> {
    req.validate()?;

    let habit = Habit::create(
        &state.db,
        auth.user_id,
        CreateHabit {
            name: req.name,
            description: req.description,
            cadence: req.cadence,
            target_per_week: req.target_per_week,
        },
    )
    .await?;

    Ok(Json(habit))
}

/// Lists habits; archived ones only with `include_archived=true`
pub async fn list_habits(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListHabitsQuery>,
) -> ApiResult<Json<Vec<Habit>>> {
    let habits = Habit::list(&state.db, auth.user_id, query.include_archived).await?;
    Ok(Json(habits))
}

/// Fetches one habit
pub async fn get_habit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Habit>> {
    let habit = owned_habit(&state, auth.user_id, id).await?;
    Ok(Json(habit))
}

/// Replaces a habit
pub async fn update_habit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateHabitRequest>,
) -> ApiResult<Json<Habit>> {
    req.validate()?;

    let habit = Habit::update(
        &state.db,
        auth.user_id,
        id,
        UpdateHabit {
            name: req.name,
            description: req.description,
            cadence: req.cadence,
            target_per_week: req.target_per_week,
            archived: req.archived,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Habit not found".to_string()))?;

    Ok(Json(habit))
}

/// Deletes a habit and its logs
pub async fn delete_habit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = Habit::delete(&state.db, auth.user_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Habit not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Logs a date for a habit
///
/// Idempotent: logging the same date twice returns the existing log.
/// Future dates are rejected.
pub async fn log_habit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<LogHabitRequest>,
) -> ApiResult<Json<HabitLog>> {
    let habit = owned_habit(&state, auth.user_id, id).await?;

    let today = Utc::now().date_naive();
    let date = req.date.unwrap_or(today);
    if date > today {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "date".to_string(),
            message: "Cannot log a future date".to_string(),
        }]));
    }

    let log = Habit::log_date(&state.db, habit.id, date).await?;
    Ok(Json(log))
}

/// Lists all logged dates for a habit
pub async fn habit_logs(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<NaiveDate>>> {
    let habit = owned_habit(&state, auth.user_id, id).await?;
    let dates = Habit::logged_dates(&state.db, habit.id).await?;

    Ok(Json(dates))
}

/// Removes a logged date
pub async fn unlog_habit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((id, date)): Path<(Uuid, NaiveDate)>,
) -> ApiResult<Json<serde_json::Value>> {
    let habit = owned_habit(&state, auth.user_id, id).await?;

    let removed = Habit::unlog_date(&state.db, habit.id, date).await?;
    if !removed {
        return Err(ApiError::NotFound("No log for that date".to_string()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Returns streak statistics for a habit
pub async fn habit_streak(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StreakSummary>> {
    let habit = owned_habit(&state, auth.user_id, id).await?;
    let streak = Habit::streak(&state.db, habit.id, Utc::now().date_naive()).await?;

    Ok(Json(streak))
}
