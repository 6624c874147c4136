/// Finance transaction model and monthly summaries
///
/// Amounts are integer cents, always positive; `direction` decides the
/// sign at summary time. The monthly summary is a pure fold over the
/// month's rows so the arithmetic is unit-testable.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Money in or money out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "txn_direction", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TxnDirection {
    Income,
    Expense,
}

impl TxnDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnDirection::Income => "income",
            TxnDirection::Expense => "expense",
        }
    }
}

/// Coarse budget category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "txn_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TxnCategory {
    Housing,
    Food,
    Transport,
    Health,
    Leisure,
    Income,
    Other,
}

impl TxnCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnCategory::Housing => "housing",
            TxnCategory::Food => "food",
            TxnCategory::Transport => "transport",
            TxnCategory::Health => "health",
            TxnCategory::Leisure => "leisure",
            TxnCategory::Income => "income",
            TxnCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub occurred_on: NaiveDate,

    /// Always positive; see `direction`
    pub amount_cents: i64,

    pub direction: TxnDirection,
    pub category: TxnCategory,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or fully updating a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransaction {
    pub occurred_on: NaiveDate,
    pub amount_cents: i64,
    pub direction: TxnDirection,
    pub category: TxnCategory,
    pub description: Option<String>,
}

pub type UpdateTransaction = CreateTransaction;

/// Filters for listing transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category: Option<TxnCategory>,
    pub direction: Option<TxnDirection>,
}

/// Per-category slice of a monthly summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    pub category: TxnCategory,
    pub income_cents: i64,
    pub expense_cents: i64,
}

/// One month of finances, aggregated
#[derive(Debug, Clone, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub income_cents: i64,
    pub expense_cents: i64,

    /// income minus expense
    pub net_cents: i64,

    /// Sorted by category enum order; categories without activity omitted
    pub by_category: Vec<CategoryBreakdown>,
}

impl Transaction {
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: CreateTransaction,
    ) -> Result<Self, sqlx::Error> {
        let txn = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions
                (user_id, occurred_on, amount_cents, direction, category, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, occurred_on, amount_cents, direction,
                      category, description, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(data.occurred_on)
        .bind(data.amount_cents)
        .bind(data.direction)
        .bind(data.category)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(txn)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let txn = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, user_id, occurred_on, amount_cents, direction,
                   category, description, created_at, updated_at
            FROM transactions
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(txn)
    }

    /// Lists transactions newest-first with optional filters
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        filter: &TransactionFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = String::from(
            "SELECT id, user_id, occurred_on, amount_cents, direction, \
             category, description, created_at, updated_at \
             FROM transactions WHERE user_id = $1",
        );
        let mut bind_count = 1;

        if filter.from.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND occurred_on >= ${}", bind_count));
        }
        if filter.to.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND occurred_on <= ${}", bind_count));
        }
        if filter.category.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND category = ${}", bind_count));
        }
        if filter.direction.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND direction = ${}", bind_count));
        }

        query.push_str(&format!(
            " ORDER BY occurred_on DESC, created_at DESC LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        ));

        let mut q = sqlx::query_as::<_, Transaction>(&query).bind(user_id);

        if let Some(from) = filter.from {
            q = q.bind(from);
        }
        if let Some(to) = filter.to {
            q = q.bind(to);
        }
        if let Some(category) = filter.category {
            q = q.bind(category);
        }
        if let Some(direction) = filter.direction {
            q = q.bind(direction);
        }

        let txns = q.bind(limit).bind(offset).fetch_all(pool).await?;

        Ok(txns)
    }

    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        data: UpdateTransaction,
    ) -> Result<Option<Self>, sqlx::Error> {
        let txn = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET occurred_on = $3, amount_cents = $4, direction = $5,
                category = $6, description = $7, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, occurred_on, amount_cents, direction,
                      category, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(data.occurred_on)
        .bind(data.amount_cents)
        .bind(data.direction)
        .bind(data.category)
        .bind(data.description)
        .fetch_optional(pool)
        .await?;

        Ok(txn)
    }

    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All transactions of one calendar month, oldest first
    pub async fn list_for_month(
        pool: &PgPool,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let Some(start) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return Ok(Vec::new());
        };
        let end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .unwrap_or(start);

        let txns = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, user_id, occurred_on, amount_cents, direction,
                   category, description, created_at, updated_at
            FROM transactions
            WHERE user_id = $1 AND occurred_on >= $2 AND occurred_on < $3
            ORDER BY occurred_on ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(txns)
    }

    /// Computes the monthly summary
    pub async fn monthly_summary(
        pool: &PgPool,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<MonthlySummary, sqlx::Error> {
        let txns = Self::list_for_month(pool, user_id, year, month).await?;
        Ok(summarize_month(year, month, &txns))
    }
}

/// Folds a month of transactions into a [`MonthlySummary`]
pub fn summarize_month(year: i32, month: u32, txns: &[Transaction]) -> MonthlySummary {
    let mut income_cents: i64 = 0;
    let mut expense_cents: i64 = 0;
    let mut per_category: BTreeMap<TxnCategory, (i64, i64)> = BTreeMap::new();

    for txn in txns {
        let entry = per_category.entry(txn.category).or_insert((0, 0));
        match txn.direction {
            TxnDirection::Income => {
                income_cents += txn.amount_cents;
                entry.0 += txn.amount_cents;
            }
            TxnDirection::Expense => {
                expense_cents += txn.amount_cents;
                entry.1 += txn.amount_cents;
            }
        }
    }

    let by_category = per_category
        .into_iter()
        .map(|(category, (income, expense))| CategoryBreakdown {
            category,
            income_cents: income,
            expense_cents: expense,
        })
        .collect();

    MonthlySummary {
        year,
        month,
        income_cents,
        expense_cents,
        net_cents: income_cents - expense_cents,
        by_category,
    }
}
