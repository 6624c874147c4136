/// Document tracker model
///
/// Metadata only: what the document is, where it lives and when it
/// expires. No file storage.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentCategory {
    Identity,
    Medical,
    Financial,
    Insurance,
    Other,
}

impl DocumentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::Identity => "identity",
            DocumentCategory::Medical => "medical",
            DocumentCategory::Financial => "financial",
            DocumentCategory::Insurance => "insurance",
            DocumentCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub category: DocumentCategory,
    pub notes: Option<String>,

    /// When the document expires (passport, insurance policy)
    pub expires_on: Option<NaiveDate>,

    /// Where the physical or digital document lives
    pub location: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or fully updating a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    pub title: String,
    pub category: DocumentCategory,
    pub notes: Option<String>,
    pub expires_on: Option<NaiveDate>,
    pub location: Option<String>,
}

pub type UpdateDocument = CreateDocument;

impl Document {
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: CreateDocument,
    ) -> Result<Self, sqlx::Error> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (user_id, title, category, notes, expires_on, location)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, title, category, notes, expires_on, location,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(data.title)
        .bind(data.category)
        .bind(data.notes)
        .bind(data.expires_on)
        .bind(data.location)
        .fetch_one(pool)
        .await?;

        Ok(document)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, user_id, title, category, notes, expires_on, location,
                   created_at, updated_at
            FROM documents
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(document)
    }

    /// Lists documents, soonest expiry first, never-expiring last
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let documents = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, user_id, title, category, notes, expires_on, location,
                   created_at, updated_at
            FROM documents
            WHERE user_id = $1
            ORDER BY expires_on ASC NULLS LAST, title ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(documents)
    }

    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        data: UpdateDocument,
    ) -> Result<Option<Self>, sqlx::Error> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET title = $3, category = $4, notes = $5, expires_on = $6,
                location = $7, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, category, notes, expires_on, location,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(data.title)
        .bind(data.category)
        .bind(data.notes)
        .bind(data.expires_on)
        .bind(data.location)
        .fetch_optional(pool)
        .await?;

        Ok(document)
    }

    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
