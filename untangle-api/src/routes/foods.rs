/// Food catalog endpoints
///
/// The catalog mixes hand-entered foods with imports from USDA FoodData
/// Central and Open Food Facts. Search fans out to the configured providers
/// and merges their hits after the local catalog; a provider outage degrades
/// the result set instead of failing the request.
///
/// # Endpoints
///
/// - `POST /v1/foods` - Create a custom food
/// - `GET /v1/foods` - List the catalog (optional name filter)
/// - `GET /v1/foods/search` - Search local catalog + external providers
/// - `GET /v1/foods/barcode/:code` - Barcode lookup via Open Food Facts
/// - `POST /v1/foods/import` - Save an external hit into the catalog
/// - `GET /v1/foods/:id` / `PUT` / `DELETE` - Single-item operations

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    routes::page,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use untangle_connectors::{search_all, FoodHit};
use untangle_shared::{
    auth::middleware::AuthContext,
    models::food_item::{CreateFoodItem, FoodItem, FoodSource, UpdateFoodItem},
    nutrition::{FodmapLevel, NovaClass, NutrientProfile},
};
use uuid::Uuid;
use validator::Validate;

/// Imported foods are normalized to a 100 g serving, matching the per-100 g
/// nutrient panels the providers return.
const IMPORT_SERVING_SIZE: f64 = 100.0;
const IMPORT_SERVING_LABEL: &str = "100 g";

/// Food create/replace request
#[derive(Debug, Deserialize, Validate)]
pub struct FoodRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(max = 100, message = "Brand must be at most 100 characters"))]
    pub brand: Option<String>,

    /// Serving size in grams
    #[validate(range(min = 0.1, message = "Serving size must be positive"))]
    pub serving_size: f64,

    /// Display label for one serving (e.g. "1 cup")
    #[validate(length(max = 50, message = "Serving label must be at most 50 characters"))]
    pub serving_label: Option<String>,

    /// Per-serving nutrient panel
    #[serde(default)]
    pub nutrients: NutrientProfile,

    pub nova_class: Option<NovaClass>,
    pub fodmap: Option<FodmapLevel>,
}

/// Catalog list query
#[derive(Debug, Deserialize)]
pub struct ListFoodsQuery {
    /// Case-insensitive name filter
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Search query
#[derive(Debug, Deserialize)]
pub struct SearchFoodsQuery {
    pub q: String,
    pub limit: Option<i64>,
}

/// Search response: catalog rows first, then external hits
///
/// External hits whose `(source, source_ref)` already exist in the catalog
/// are dropped so the client never offers to import a duplicate.
#[derive(Debug, Serialize)]
pub struct FoodSearchResponse {
    pub local: Vec<FoodItem>,
    pub external: Vec<FoodHit>,
}

fn check_nutrients(nutrients: &NutrientProfile) -> Result<(), ApiError> {
    let fields = [
        ("nutrients.energy_kcal", nutrients.energy_kcal),
        ("nutrients.protein_g", nutrients.protein_g),
        ("nutrients.carbs_g", nutrients.carbs_g),
        ("nutrients.fat_g", nutrients.fat_g),
        ("nutrients.saturated_fat_g", nutrients.saturated_fat_g),
        ("nutrients.fiber_g", nutrients.fiber_g),
        ("nutrients.sugar_g", nutrients.sugar_g),
        ("nutrients.sodium_mg", nutrients.sodium_mg),
    ];

    let errors: Vec<ValidationErrorDetail> = fields
        .iter()
        .filter(|(_, value)| !value.is_finite() || *value < 0.0)
        .map(|(field, _)| ValidationErrorDetail {
            field: field.to_string(),
            message: "Must be a non-negative number".to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::ValidationError(errors))
    }
}

/// Creates a custom food
pub async fn create_food(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<FoodRequest>,
) -> ApiResult<Json<FoodItem>> {
    req.validate()?;
    check_nutrients(&req.nutrients)?;

    let food = FoodItem::create(
        &state.db,
        auth.user_id,
        CreateFoodItem {
            name: req.name,
            brand: req.brand,
            serving_size: req.serving_size,
            serving_label: req.serving_label,
            nutrients: req.nutrients,
            nova_class: req.nova_class,
            fodmap: req.fodmap,
            source: FoodSource::Custom,
            source_ref: None,
            verified: false,
        },
    )
    .await?;

    Ok(Json(food))
}

/// Lists the catalog, optionally filtered by name
pub async fn list_foods(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListFoodsQuery>,
) -> ApiResult<Json<Vec<FoodItem>>> {
    let (limit, offset) = page(query.limit, query.offset);
    let foods = FoodItem::list(
        &state.db,
        auth.user_id,
        query.q.as_deref(),
        limit,
        offset,
    )
    .await?;

    Ok(Json(foods))
}

/// Searches the local catalog and all configured external providers
///
/// Providers that fail are skipped with a warning; the response still
/// carries whatever the others returned.
pub async fn search_foods(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<SearchFoodsQuery>,
) -> ApiResult<Json<FoodSearchResponse>> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(ApiError::BadRequest("Query must not be empty".to_string()));
    }
    let limit = query.limit.unwrap_or(20).clamp(1, 50) as usize;

    let local = FoodItem::list(&state.db, auth.user_id, Some(q), limit as i64, 0).await?;

    let hits = search_all(&state.food_providers, q, limit).await;

    // Drop hits that were already imported
    let mut external = Vec::with_capacity(hits.len());
    for hit in hits {
        let existing =
            FoodItem::find_by_source_ref(&state.db, auth.user_id, hit.source, &hit.source_ref)
                .await?;
        if existing.is_none() {
            external.push(hit);
        }
    }

    Ok(Json(FoodSearchResponse { local, external }))
}

/// Looks up a product by barcode via Open Food Facts
///
/// # Errors
///
/// - `404 Not Found`: Barcode unknown to Open Food Facts
/// - `502 Bad Gateway`: Open Food Facts unreachable
pub async fn lookup_barcode(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(code): Path<String>,
) -> ApiResult<Json<FoodHit>> {
    let code = code.trim();
    if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::BadRequest("Barcode must be numeric".to_string()));
    }

    let hit = state
        .off
        .product_by_barcode(code)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No product found for barcode {}", code)))?;

    Ok(Json(hit))
}

/// Saves an external hit into the catalog
///
/// Idempotent per `(source, source_ref)`: importing the same hit twice
/// returns the existing row. Imported rows are normalized to a 100 g
/// serving and marked verified.
pub async fn import_food(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(hit): Json<FoodHit>,
) -> ApiResult<Json<FoodItem>> {
    if hit.name.trim().is_empty() {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "name".to_string(),
            message: "Name must not be empty".to_string(),
        }]));
    }
    if hit.source == FoodSource::Custom {
        return Err(ApiError::BadRequest(
            "Only external hits can be imported".to_string(),
        ));
    }
    check_nutrients(&hit.nutrients)?;

    if let Some(existing) =
        FoodItem::find_by_source_ref(&state.db, auth.user_id, hit.source, &hit.source_ref).await?
    {
        return Ok(Json(existing));
    }

    let food = FoodItem::create(
        &state.db,
        auth.user_id,
        CreateFoodItem {
            name: hit.name,
            brand: hit.brand,
            serving_size: IMPORT_SERVING_SIZE,
            serving_label: Some(IMPORT_SERVING_LABEL.to_string()),
            nutrients: hit.nutrients,
            nova_class: hit.nova_class,
            fodmap: hit.fodmap,
            source: hit.source,
            source_ref: Some(hit.source_ref),
            verified: true,
        },
    )
    .await?;

    Ok(Json(food))
}

/// Fetches one catalog entry
pub async fn get_food(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FoodItem>> {
    let food = FoodItem::find_by_id(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Food not found".to_string()))?;

    Ok(Json(food))
}

/// Replaces a catalog entry's editable fields
///
/// Source and verification flags are immutable after creation.
pub async fn update_food(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<FoodRequest>,
) -> ApiResult<Json<FoodItem>> {
    req.validate()?;
    check_nutrients(&req.nutrients)?;

    let food = FoodItem::update(
        &state.db,
        auth.user_id,
        id,
        UpdateFoodItem {
            name: req.name,
            brand: req.brand,
            serving_size: req.serving_size,
            serving_label: req.serving_label,
            nutrients: req.nutrients,
            nova_class: req.nova_class,
            fodmap: req.fodmap,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Food not found".to_string()))?;

    Ok(Json(food))
}

/// Deletes a catalog entry
///
/// Meals keep their item snapshots, so deleting a food never rewrites
/// logged history.
pub async fn delete_food(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = FoodItem::delete(&state.db, auth.user_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Food not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
