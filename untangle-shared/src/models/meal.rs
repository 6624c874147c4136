/// Meal model and database operations
///
/// A meal is a log entry holding an array of item snapshots plus the
/// derived results (totals, badges, score, effects) computed from those
/// snapshots at write time. The derived columns are denormalized on every
/// create and update; they are never read back as inputs.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE meals (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     meal_type meal_type NOT NULL,
///     eaten_at TIMESTAMPTZ NOT NULL,
///     notes TEXT,
///     items JSONB NOT NULL DEFAULT '[]',
///     totals JSONB NOT NULL DEFAULT '{}',
///     badges JSONB NOT NULL DEFAULT '[]',
///     score DOUBLE PRECISION NOT NULL DEFAULT 0,
///     effects JSONB NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::nutrition::{analyze_meal, scoring::round1, Badge, MealEffects, MealItem, NutrientTotals};

/// Meal slot in the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "meal_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

/// One logged meal with its derived results
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub meal_type: MealType,
    pub eaten_at: DateTime<Utc>,
    pub notes: Option<String>,

    /// Item snapshots as entered; the only scoring input
    pub items: Json<Vec<MealItem>>,

    /// Derived: aggregated nutrients
    pub totals: Json<NutrientTotals>,

    /// Derived: inferred badges
    pub badges: Json<Vec<Badge>>,

    /// Derived: mindful meal score, 0.0 ..= 10.0
    pub score: f64,

    /// Derived: projected effect axes
    pub effects: Json<MealEffects>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMeal {
    pub name: String,
    pub meal_type: MealType,
    pub eaten_at: DateTime<Utc>,
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<MealItem>,
}

/// Input for a full meal update
///
/// The item array replaces the stored one wholesale and everything
/// derived is recomputed.
pub type UpdateMeal = CreateMeal;

/// Filters for listing meals
#[derive(Debug, Clone, Default)]
pub struct MealFilter {
    /// Inclusive lower bound on `eaten_at`
    pub from: Option<DateTime<Utc>>,

    /// Exclusive upper bound on `eaten_at`
    pub to: Option<DateTime<Utc>>,

    pub meal_type: Option<MealType>,
}

/// Aggregates for one calendar day of meals
#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub meal_count: usize,
    pub totals: NutrientTotals,

    /// Mean of the per-meal scores, one decimal; 0.0 when no meals
    pub mean_score: f64,

    /// Badge histogram over the day's meals
    pub badge_counts: BTreeMap<String, u32>,
}

impl Meal {
    /// Creates a meal, computing totals, badges, score and effects from
    /// the item snapshots
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: CreateMeal,
    ) -> Result<Self, sqlx::Error> {
        let analysis = analyze_meal(&data.items);

        let meal = sqlx::query_as::<_, Meal>(
            r#"
            INSERT INTO meals
                (user_id, name, meal_type, eaten_at, notes, items,
                 totals, badges, score, effects)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, user_id, name, meal_type, eaten_at, notes, items,
                      totals, badges, score, effects, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(data.name)
        .bind(data.meal_type)
        .bind(data.eaten_at)
        .bind(data.notes)
        .bind(Json(data.items))
        .bind(Json(analysis.totals))
        .bind(Json(analysis.badges))
        .bind(analysis.score)
        .bind(Json(analysis.effects))
        .fetch_one(pool)
        .await?;

        Ok(meal)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let meal = sqlx::query_as::<_, Meal>(
            r#"
            SELECT id, user_id, name, meal_type, eaten_at, notes, items,
                   totals, badges, score, effects, created_at, updated_at
            FROM meals
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(meal)
    }

    /// Lists meals newest-first with optional time/type filters
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        filter: &MealFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        // Build the WHERE clause dynamically from the present filters.
        let mut query = String::from(
            "SELECT id, user_id, name, meal_type, eaten_at, notes, items, \
             totals, badges, score, effects, created_at, updated_at \
             FROM meals WHERE user_id = $1",
        );
        let mut bind_count = 1;

        if filter.from.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND eaten_at >= ${}", bind_count));
        }
        if filter.to.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND eaten_at < ${}", bind_count));
        }
        if filter.meal_type.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND meal_type = ${}", bind_count));
        }

        query.push_str(&format!(
            " ORDER BY eaten_at DESC LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        ));

        let mut q = sqlx::query_as::<_, Meal>(&query).bind(user_id);

        if let Some(from) = filter.from {
            q = q.bind(from);
        }
        if let Some(to) = filter.to {
            q = q.bind(to);
        }
        if let Some(meal_type) = filter.meal_type {
            q = q.bind(meal_type);
        }

        let meals = q.bind(limit).bind(offset).fetch_all(pool).await?;

        Ok(meals)
    }

    /// Replaces a meal wholesale and recomputes the derived columns
    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        data: UpdateMeal,
    ) -> Result<Option<Self>, sqlx::Error> {
        let analysis = analyze_meal(&data.items);

        let meal = sqlx::query_as::<_, Meal>(
            r#"
            UPDATE meals
            SET name = $3, meal_type = $4, eaten_at = $5, notes = $6,
                items = $7, totals = $8, badges = $9, score = $10,
                effects = $11, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, meal_type, eaten_at, notes, items,
                      totals, badges, score, effects, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(data.name)
        .bind(data.meal_type)
        .bind(data.eaten_at)
        .bind(data.notes)
        .bind(Json(data.items))
        .bind(Json(analysis.totals))
        .bind(Json(analysis.badges))
        .bind(analysis.score)
        .bind(Json(analysis.effects))
        .fetch_optional(pool)
        .await?;

        Ok(meal)
    }

    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM meals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetches all meals eaten on one UTC calendar day, oldest first
    pub async fn list_for_day(
        pool: &PgPool,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let start = date
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc();
        let end = date
            .checked_add_days(Days::new(1))
            .unwrap_or(date)
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc();

        let meals = sqlx::query_as::<_, Meal>(
            r#"
            SELECT id, user_id, name, meal_type, eaten_at, notes, items,
                   totals, badges, score, effects, created_at, updated_at
            FROM meals
            WHERE user_id = $1 AND eaten_at >= $2 AND eaten_at < $3
            ORDER BY eaten_at ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(meals)
    }

    /// Computes the daily summary for one UTC calendar day
    pub async fn daily_summary(
        pool: &PgPool,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<DailySummary, sqlx::Error> {
        let meals = Self::list_for_day(pool, user_id, date).await?;
        Ok(summarize_day(date, &meals))
    }
}

/// Folds a day's meals into a [`DailySummary`]
///
/// Pure so the aggregation arithmetic is unit-testable without a
/// database. Zero meals yield zero totals and a 0.0 mean score.
pub fn summarize_day(date: NaiveDate, meals: &[Meal]) -> DailySummary {
    let mut totals = NutrientTotals::default();
    let mut badge_counts: BTreeMap<String, u32> = BTreeMap::new();
    let mut score_sum = 0.0;

    for meal in meals {
        totals.accumulate(&meal.totals);
        score_sum += meal.score;
        for badge in meal.badges.iter() {
            *badge_counts.entry(badge.as_str().to_string()).or_insert(0) += 1;
        }
    }

    let mean_score = if meals.is_empty() {
        0.0
    } else {
        round1(score_sum / meals.len() as f64)
    };

    DailySummary {
        date,
        meal_count: meals.len(),
        totals,
        mean_score,
        badge_counts,
    }
}
