/// Mindfulness check-in model
///
/// A check-in is a point-in-time snapshot of mood, energy and stress with
/// optional gratitude and free-form notes. Check-ins are immutable once
/// written; there is no update, only create and delete.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Five-point mood scale, shared with journal entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "mood_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MoodLevel {
    Awful,
    Bad,
    Neutral,
    Good,
    Great,
}

impl MoodLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoodLevel::Awful => "awful",
            MoodLevel::Bad => "bad",
            MoodLevel::Neutral => "neutral",
            MoodLevel::Good => "good",
            MoodLevel::Great => "great",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MindfulnessCheckin {
    pub id: Uuid,
    pub user_id: Uuid,
    pub checked_in_at: DateTime<Utc>,
    pub mood: MoodLevel,

    /// Energy level, 1 (drained) to 5 (energized)
    pub energy: i16,

    /// Stress level, 1 (calm) to 5 (overwhelmed)
    pub stress: i16,

    pub gratitude: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a check-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCheckin {
    pub checked_in_at: DateTime<Utc>,
    pub mood: MoodLevel,
    pub energy: i16,
    pub stress: i16,
    pub gratitude: Option<String>,
    pub note: Option<String>,
}

impl MindfulnessCheckin {
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: CreateCheckin,
    ) -> Result<Self, sqlx::Error> {
        let checkin = sqlx::query_as::<_, MindfulnessCheckin>(
            r#"
            INSERT INTO mindfulness_checkins
                (user_id, checked_in_at, mood, energy, stress, gratitude, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, checked_in_at, mood, energy, stress,
                      gratitude, note, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(data.checked_in_at)
        .bind(data.mood)
        .bind(data.energy)
        .bind(data.stress)
        .bind(data.gratitude)
        .bind(data.note)
        .fetch_one(pool)
        .await?;

        Ok(checkin)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let checkin = sqlx::query_as::<_, MindfulnessCheckin>(
            r#"
            SELECT id, user_id, checked_in_at, mood, energy, stress,
                   gratitude, note, created_at, updated_at
            FROM mindfulness_checkins
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(checkin)
    }

    /// Lists check-ins newest-first
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let checkins = sqlx::query_as::<_, MindfulnessCheckin>(
            r#"
            SELECT id, user_id, checked_in_at, mood, energy, stress,
                   gratitude, note, created_at, updated_at
            FROM mindfulness_checkins
            WHERE user_id = $1
            ORDER BY checked_in_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(checkins)
    }

    /// All check-ins of one UTC calendar day, oldest first
    pub async fn list_for_date(
        pool: &PgPool,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let start = date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        let end = date
            .checked_add_days(Days::new(1))
            .unwrap_or(date)
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc();

        let checkins = sqlx::query_as::<_, MindfulnessCheckin>(
            r#"
            SELECT id, user_id, checked_in_at, mood, energy, stress,
                   gratitude, note, created_at, updated_at
            FROM mindfulness_checkins
            WHERE user_id = $1 AND checked_in_at >= $2 AND checked_in_at < $3
            ORDER BY checked_in_at ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(checkins)
    }

    /// Most recent check-in, if any (used for the assistant context block)
    pub async fn latest(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let checkin = sqlx::query_as::<_, MindfulnessCheckin>(
            r#"
            SELECT id, user_id, checked_in_at, mood, energy, stress,
                   gratitude, note, created_at, updated_at
            FROM mindfulness_checkins
            WHERE user_id = $1
            ORDER BY checked_in_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(checkin)
    }

    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM mindfulness_checkins WHERE id = $1 AND user_id = $2")
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
    fn test_mood_level_serialization() {
        assert_eq!(
            serde_json::to_string(&MoodLevel::Great).unwrap(),
            r#""great""#
        );
        let mood: MoodLevel = serde_json::from_str(r#""awful""#).unwrap();
        assert_eq!(mood, MoodLevel::Awful);
    }

    #[test]
    fn test_mood_level_ordering() {
        assert!(MoodLevel::Great > MoodLevel::Good);
        assert!(MoodLevel::Awful < MoodLevel::Neutral);
    }
}
