/// Meal log endpoints
///
/// Meals are scored server-side on every create and update: the nutrient
/// totals, mindful meal score, effect estimates, and badges stored on a meal
/// are always derived from its items, never accepted from the client.
///
/// # Endpoints
///
/// - `POST /v1/meals` - Log a meal
/// - `GET /v1/meals` - List meals (filter by window and meal type)
/// - `GET /v1/meals/summary/:date` - Daily nutrition summary
/// - `GET /v1/meals/:id` - Fetch one meal
/// - `PUT /v1/meals/:id` - Replace a meal (rescores)
/// - `DELETE /v1/meals/:id` - Delete a meal

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
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
    models::meal::{CreateMeal, DailySummary, Meal, MealFilter, MealType},
    nutrition::MealItem,
};
use uuid::Uuid;
use validator::Validate;

/// Meal create/replace request
#[derive(Debug, Deserialize, Validate)]
pub struct MealRequest {
    /// Meal name (e.g. "Overnight oats")
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    /// Meal slot
    pub meal_type: MealType,

    /// When the meal was eaten; defaults to now
    pub eaten_at: Option<DateTime<Utc>>,

    /// Free-form notes
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,

    /// Item snapshots making up the meal
    #[serde(default)]
    pub items: Vec<MealItem>,
}

/// List query: optional time window, meal type, pagination
#[derive(Debug, Deserialize)]
pub struct ListMealsQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub meal_type: Option<MealType>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl MealRequest {
    /// Validates fields the derive can't reach (item snapshots)
    fn check(&self) -> Result<(), ApiError> {
        self.validate()?;

        let mut errors = Vec::new();
        for (i, item) in self.items.iter().enumerate() {
            if item.name.trim().is_empty() {
                errors.push(ValidationErrorDetail {
                    field: format!("items[{}].name", i),
                    message: "Item name must not be empty".to_string(),
                });
            }
            if !item.quantity.is_finite() || item.quantity < 0.0 {
                errors.push(ValidationErrorDetail {
                    field: format!("items[{}].quantity", i),
                    message: "Quantity must be a non-negative number".to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ValidationError(errors))
        }
    }

    fn into_create(self) -> CreateMeal {
        CreateMeal {
            name: self.name,
            meal_type: self.meal_type,
            eaten_at: self.eaten_at.unwrap_or_else(Utc::now),
            notes: self.notes,
            items: self.items,
        }
    }
}

/// Logs a meal
///
/// The stored meal carries the derived score, effects, and badges.
pub async fn create_meal(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<MealRequest>,
) -> ApiResult<Json<Meal>> {
    req.check()?;

    let meal = Meal::create(&state.db, auth.user_id, req.into_create()).await?;
    Ok(Json(meal))
}

/// Lists meals, newest first
pub async fn list_meals(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListMealsQuery>,
) -> ApiResult<Json<Vec<Meal>>> {
    let (limit, offset) = page(query.limit, query.offset);
    let filter = MealFilter {
        from: query.from,
        to: query.to,
        meal_type: query.meal_type,
    };

    let meals = Meal::list(&state.db, auth.user_id, &filter, limit, offset).await?;
    Ok(Json(meals))
}

/// Daily nutrition summary: totals, mean score, badge histogram
pub async fn daily_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(date): Path<NaiveDate>,
) -> ApiResult<Json<DailySummary>> {
    let summary = Meal::daily_summary(&state.db, auth.user_id, date).await?;
    Ok(Json(summary))
}

/// Fetches one meal
pub async fn get_meal(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Meal>> {
    let meal = Meal::find_by_id(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Meal not found".to_string()))?;

    Ok(Json(meal))
}

/// Replaces a meal and rescores it
pub async fn update_meal(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<MealRequest>,
) -> ApiResult<Json<Meal>> {
    req.check()?;

    let meal = Meal::update(&state.db, auth.user_id, id, req.into_create())
        .await?
        .ok_or_else(|| ApiError::NotFound("Meal not found".to_string()))?;

    Ok(Json(meal))
}

/// Deletes a meal
pub async fn delete_meal(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = Meal::delete(&state.db, auth.user_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Meal not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
