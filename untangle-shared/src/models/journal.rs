/// Journal entry model
///
/// Dated free-form writing with an optional mood and tags. Tags are a
/// JSONB string array; filtering happens in the list query by date only.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::mindfulness::MoodLevel;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_date: NaiveDate,
    pub title: Option<String>,
    pub body: String,
    pub mood: Option<MoodLevel>,
    pub tags: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or fully updating an entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJournalEntry {
    pub entry_date: NaiveDate,
    pub title: Option<String>,
    pub body: String,
    pub mood: Option<MoodLevel>,
    #[serde(default)]
    pub tags: Vec<String>,
}

pub type UpdateJournalEntry = CreateJournalEntry;

impl JournalEntry {
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: CreateJournalEntry,
    ) -> Result<Self, sqlx::Error> {
        let entry = sqlx::query_as::<_, JournalEntry>(
            r#"
            INSERT INTO journal_entries (user_id, entry_date, title, body, mood, tags)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, entry_date, title, body, mood, tags,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(data.entry_date)
        .bind(data.title)
        .bind(data.body)
        .bind(data.mood)
        .bind(Json(data.tags))
        .fetch_one(pool)
        .await?;

        Ok(entry)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let entry = sqlx::query_as::<_, JournalEntry>(
            r#"
            SELECT id, user_id, entry_date, title, body, mood, tags,
                   created_at, updated_at
            FROM journal_entries
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(entry)
    }

    /// Lists entries newest-first with an optional date range on entry_date
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = String::from(
            "SELECT id, user_id, entry_date, title, body, mood, tags, \
             created_at, updated_at \
             FROM journal_entries WHERE user_id = $1",
        );
        let mut bind_count = 1;

        if from.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND entry_date >= ${}", bind_count));
        }
        if to.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND entry_date <= ${}", bind_count));
        }

        query.push_str(&format!(
            " ORDER BY entry_date DESC, created_at DESC LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        ));

        let mut q = sqlx::query_as::<_, JournalEntry>(&query).bind(user_id);

        if let Some(from) = from {
            q = q.bind(from);
        }
        if let Some(to) = to {
            q = q.bind(to);
        }

        let entries = q.bind(limit).bind(offset).fetch_all(pool).await?;

        Ok(entries)
    }

    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        data: UpdateJournalEntry,
    ) -> Result<Option<Self>, sqlx::Error> {
        let entry = sqlx::query_as::<_, JournalEntry>(
            r#"
            UPDATE journal_entries
            SET entry_date = $3, title = $4, body = $5, mood = $6, tags = $7,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, entry_date, title, body, mood, tags,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(data.entry_date)
        .bind(data.title)
        .bind(data.body)
        .bind(data.mood)
        .bind(Json(data.tags))
        .fetch_optional(pool)
        .await?;

        Ok(entry)
    }

    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM journal_entries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_entry_defaults_empty_tags() {
        let json = r#"{"entry_date": "2025-06-01", "body": "A good day."}"#;
        let data: CreateJournalEntry = serde_json::from_str(json).unwrap();

        assert!(data.tags.is_empty());
        assert!(data.title.is_none());
        assert!(data.mood.is_none());
    }
}
