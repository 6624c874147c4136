/// Relationship model
///
/// Relationship metadata attached to a contact: kind, closeness and when
/// the person was last contacted. At most one relationship per
/// (user, contact) pair; the unique constraint surfaces as a conflict on
/// create.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "relationship_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Family,
    Friend,
    Partner,
    Colleague,
    Other,
}

impl RelationshipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::Family => "family",
            RelationshipKind::Friend => "friend",
            RelationshipKind::Partner => "partner",
            RelationshipKind::Colleague => "colleague",
            RelationshipKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Relationship {
    pub id: Uuid,
    pub user_id: Uuid,
    pub contact_id: Uuid,
    pub kind: RelationshipKind,

    /// How close, 1 (distant) to 5 (inner circle)
    pub closeness: i16,

    pub last_contacted_on: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a relationship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRelationship {
    pub contact_id: Uuid,
    pub kind: RelationshipKind,
    pub closeness: i16,
    pub last_contacted_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Input for a full relationship update; the linked contact is immutable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRelationship {
    pub kind: RelationshipKind,
    pub closeness: i16,
    pub last_contacted_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl Relationship {
    /// Creates a relationship; a duplicate (user, contact) pair fails
    /// with a unique constraint violation
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: CreateRelationship,
    ) -> Result<Self, sqlx::Error> {
        let relationship = sqlx::query_as::<_, Relationship>(
            r#"
            INSERT INTO relationships
                (user_id, contact_id, kind, closeness, last_contacted_on, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, contact_id, kind, closeness,
                      last_contacted_on, notes, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(data.contact_id)
        .bind(data.kind)
        .bind(data.closeness)
        .bind(data.last_contacted_on)
        .bind(data.notes)
        .fetch_one(pool)
        .await?;

        Ok(relationship)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let relationship = sqlx::query_as::<_, Relationship>(
            r#"
            SELECT id, user_id, contact_id, kind, closeness,
                   last_contacted_on, notes, created_at, updated_at
            FROM relationships
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(relationship)
    }

    /// Lists relationships, closest first
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let relationships = sqlx::query_as::<_, Relationship>(
            r#"
            SELECT id, user_id, contact_id, kind, closeness,
                   last_contacted_on, notes, created_at, updated_at
            FROM relationships
            WHERE user_id = $1
            ORDER BY closeness DESC, created_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(relationships)
    }

    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        data: UpdateRelationship,
    ) -> Result<Option<Self>, sqlx::Error> {
        let relationship = sqlx::query_as::<_, Relationship>(
            r#"
            UPDATE relationships
            SET kind = $3, closeness = $4, last_contacted_on = $5, notes = $6,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, contact_id, kind, closeness,
                      last_contacted_on, notes, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(data.kind)
        .bind(data.closeness)
        .bind(data.last_contacted_on)
        .bind(data.notes)
        .fetch_optional(pool)
        .await?;

        Ok(relationship)
    }

    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM relationships WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
