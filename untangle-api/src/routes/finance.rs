/// Finance endpoints
///
/// Amounts are integer cents; direction (income/expense) is explicit rather
/// than encoded in the sign. Monthly summaries aggregate by category.
///
/// # Endpoints
///
/// - `POST /v1/finance/transactions` - Record a transaction
/// - `GET /v1/finance/transactions` - List (filter by window, category, direction)
/// - `GET /v1/finance/transactions/:id` / `PUT` / `DELETE` - Single operations
/// - `GET /v1/finance/summary/:year/:month` - Monthly income/expense/net + breakdown

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
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
    models::transaction::{
        CreateTransaction, MonthlySummary, Transaction, TransactionFilter, TxnCategory,
        TxnDirection,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Transaction create/replace request
#[derive(Debug, Deserialize, Validate)]
pub struct TransactionRequest {
    /// Date the money moved; defaults to today
    pub occurred_on: Option<NaiveDate>,

    /// Amount in cents; always positive, `direction` carries the sign
    #[validate(range(min = 1, message = "Amount must be at least 1 cent"))]
    pub amount_cents: i64,

    pub direction: TxnDirection,

    pub category: TxnCategory,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

/// List query
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category: Option<TxnCategory>,
    pub direction: Option<TxnDirection>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl TransactionRequest {
    fn into_create(self) -> CreateTransaction {
        CreateTransaction {
            occurred_on: self.occurred_on.unwrap_or_else(|| Utc::now().date_naive()),
            amount_cents: self.amount_cents,
            direction: self.direction,
            category: self.category,
            description: self.description,
        }
    }
}

/// Records a transaction
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<TransactionRequest>,
) -> ApiResult<Json<Transaction>> {
    req.validate()?;

    let txn = Transaction::create(&state.db, auth.user_id, req.into_create()).await?;
    Ok(Json(txn))
}

/// Lists transactions, newest first
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListTransactionsQuery>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let (limit, offset) = page(query.limit, query.offset);
    let filter = TransactionFilter {
        from: query.from,
        to: query.to,
        category: query.category,
        direction: query.direction,
    };

    let txns = Transaction::list(&state.db, auth.user_id, &filter, limit, offset).await?;
    Ok(Json(txns))
}

/// Fetches one transaction
pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Transaction>> {
    let txn = Transaction::find_by_id(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transaction not found".to_string()))?;

    Ok(Json(txn))
}

/// Replaces a transaction
pub async fn update_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<TransactionRequest>,
) -> ApiResult<Json<Transaction>> {
    req.validate()?;

    let txn = Transaction::update(&state.db, auth.user_id, id, req.into_create())
        .await?
        .ok_or_else(|| ApiError::NotFound("Transaction not found".to_string()))?;

    Ok(Json(txn))
}

/// Deletes a transaction
pub async fn delete_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = Transaction::delete(&state.db, auth.user_id, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Transaction not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Monthly summary: income, expenses, net, and per-category breakdown
pub async fn monthly_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((year, month)): Path<(i32, u32)>,
) -> ApiResult<Json<MonthlySummary>> {
    if !(1..=12).contains(&month) {
        return Err(ApiError::BadRequest(
            "Month must be between 1 and 12".to_string(),
        ));
    }
    if !(1970..=9999).contains(&year) {
        return Err(ApiError::BadRequest(
            "Year must be between 1970 and 9999".to_string(),
        ));
    }

    let summary = Transaction::monthly_summary(&state.db, auth.user_id, year, month).await?;
    Ok(Json(summary))
}
