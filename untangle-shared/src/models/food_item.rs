/// Food catalog model
///
/// A food item is one entry in the user's personal food catalog: either a
/// hand-entered custom food or a saved hit from an external provider
/// (USDA FoodData Central, Open Food Facts). The nutrient panel is stored
/// per serving as JSONB.
///
/// Catalog rows are referenced by meals only as value snapshots; editing
/// or deleting a food item never changes logged meals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::nutrition::{FodmapLevel, NovaClass, NutrientProfile};

/// Where a catalog entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "food_source", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FoodSource {
    /// Hand-entered by the user
    Custom,

    /// Imported from USDA FoodData Central
    Usda,

    /// Imported from Open Food Facts
    Openfoodfacts,
}

impl FoodSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodSource::Custom => "custom",
            FoodSource::Usda => "usda",
            FoodSource::Openfoodfacts => "openfoodfacts",
        }
    }
}

/// One food catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FoodItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub brand: Option<String>,

    /// Serving size in grams
    pub serving_size: f64,

    /// Human label for the serving ("1 cup", "2 slices")
    pub serving_label: Option<String>,

    /// Nutrient panel per serving
    pub nutrients: Json<NutrientProfile>,

    /// NOVA processing class, when known
    pub nova_class: Option<NovaClass>,

    /// FODMAP level, when known
    pub fodmap: Option<FodmapLevel>,

    pub source: FoodSource,

    /// Provider reference: FDC id for USDA, barcode for Open Food Facts
    pub source_ref: Option<String>,

    /// True for provider data that arrived pre-verified
    pub verified: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFoodItem {
    pub name: String,
    pub brand: Option<String>,
    pub serving_size: f64,
    pub serving_label: Option<String>,
    pub nutrients: NutrientProfile,
    pub nova_class: Option<NovaClass>,
    pub fodmap: Option<FodmapLevel>,
    pub source: FoodSource,
    pub source_ref: Option<String>,
    pub verified: bool,
}

/// Input for a full update of a catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateFoodItem {
    pub name: String,
    pub brand: Option<String>,
    pub serving_size: f64,
    pub serving_label: Option<String>,
    pub nutrients: NutrientProfile,
    pub nova_class: Option<NovaClass>,
    pub fodmap: Option<FodmapLevel>,
}

impl FoodItem {
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: CreateFoodItem,
    ) -> Result<Self, sqlx::Error> {
        let item = sqlx::query_as::<_, FoodItem>(
            r#"
            INSERT INTO food_items
                (user_id, name, brand, serving_size, serving_label, nutrients,
                 nova_class, fodmap, source, source_ref, verified)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, user_id, name, brand, serving_size, serving_label,
                      nutrients, nova_class, fodmap, source, source_ref,
                      verified, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(data.name)
        .bind(data.brand)
        .bind(data.serving_size)
        .bind(data.serving_label)
        .bind(Json(data.nutrients))
        .bind(data.nova_class)
        .bind(data.fodmap)
        .bind(data.source)
        .bind(data.source_ref)
        .bind(data.verified)
        .fetch_one(pool)
        .await?;

        Ok(item)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let item = sqlx::query_as::<_, FoodItem>(
            r#"
            SELECT id, user_id, name, brand, serving_size, serving_label,
                   nutrients, nova_class, fodmap, source, source_ref,
                   verified, created_at, updated_at
            FROM food_items
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    /// Finds a previously imported entry by provider reference
    ///
    /// Used by the import endpoint so saving the same external hit twice
    /// returns the existing row instead of duplicating it.
    pub async fn find_by_source_ref(
        pool: &PgPool,
        user_id: Uuid,
        source: FoodSource,
        source_ref: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let item = sqlx::query_as::<_, FoodItem>(
            r#"
            SELECT id, user_id, name, brand, serving_size, serving_label,
                   nutrients, nova_class, fodmap, source, source_ref,
                   verified, created_at, updated_at
            FROM food_items
            WHERE user_id = $1 AND source = $2 AND source_ref = $3
            "#,
        )
        .bind(user_id)
        .bind(source)
        .bind(source_ref)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    /// Lists catalog entries, optionally filtered by a name substring
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        name_query: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let items = match name_query {
            Some(q) => {
                sqlx::query_as::<_, FoodItem>(
                    r#"
                    SELECT id, user_id, name, brand, serving_size, serving_label,
                           nutrients, nova_class, fodmap, source, source_ref,
                           verified, created_at, updated_at
                    FROM food_items
                    WHERE user_id = $1 AND name ILIKE $2
                    ORDER BY name ASC
                    LIMIT $3 OFFSET $4
                    "#,
                )
                .bind(user_id)
                .bind(format!("%{}%", q))
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, FoodItem>(
                    r#"
                    SELECT id, user_id, name, brand, serving_size, serving_label,
                           nutrients, nova_class, fodmap, source, source_ref,
                           verified, created_at, updated_at
                    FROM food_items
                    WHERE user_id = $1
                    ORDER BY name ASC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(user_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(items)
    }

    /// Full update; source and source_ref are immutable after creation
    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        data: UpdateFoodItem,
    ) -> Result<Option<Self>, sqlx::Error> {
        let item = sqlx::query_as::<_, FoodItem>(
            r#"
            UPDATE food_items
            SET name = $3, brand = $4, serving_size = $5, serving_label = $6,
                nutrients = $7, nova_class = $8, fodmap = $9, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, brand, serving_size, serving_label,
                      nutrients, nova_class, fodmap, source, source_ref,
                      verified, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(data.name)
        .bind(data.brand)
        .bind(data.serving_size)
        .bind(data.serving_label)
        .bind(Json(data.nutrients))
        .bind(data.nova_class)
        .bind(data.fodmap)
        .fetch_optional(pool)
        .await?;

        Ok(item)
    }

    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM food_items WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
