/// Habit model, daily logs and streak computation
///
/// Habits are tracked per day: a habit log row says "done on this date",
/// with UNIQUE(habit_id, logged_on) so logging the same day twice is
/// idempotent. Streaks are not stored; they are computed from the log
/// dates on demand.
///
/// Log operations take a bare `habit_id`; callers must have resolved the
/// habit through a user-scoped lookup first.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// How often the habit is meant to happen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "habit_cadence", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HabitCadence {
    Daily,
    Weekly,
}

impl HabitCadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitCadence::Daily => "daily",
            HabitCadence::Weekly => "weekly",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub cadence: HabitCadence,

    /// Weekly target, 1-7; only meaningful for weekly cadence
    pub target_per_week: i16,

    /// Archived habits are hidden from the default list but keep their logs
    pub archived: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One "done" mark for a habit on a date
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HabitLog {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub logged_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a habit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHabit {
    pub name: String,
    pub description: Option<String>,
    pub cadence: HabitCadence,
    pub target_per_week: i16,
}

/// Input for a full habit update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateHabit {
    pub name: String,
    pub description: Option<String>,
    pub cadence: HabitCadence,
    pub target_per_week: i16,
    pub archived: bool,
}

/// Computed streak figures for one habit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StreakSummary {
    /// Consecutive days ending today or yesterday
    pub current: u32,

    /// Longest run of consecutive days ever
    pub longest: u32,

    /// Total days logged
    pub total_logged: u32,

    /// Fraction of the last 30 days (ending today) with a log
    pub completion_rate_30d: f64,
}

impl Habit {
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: CreateHabit,
    ) -> Result<Self, sqlx::Error> {
        let habit = sqlx::query_as::<_, Habit>(
            r#"
            INSERT INTO habits (user_id, name, description, cadence, target_per_week)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, name, description, cadence, target_per_week,
                      archived, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.cadence)
        .bind(data.target_per_week)
        .fetch_one(pool)
        .await?;

        Ok(habit)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let habit = sqlx::query_as::<_, Habit>(
            r#"
            SELECT id, user_id, name, description, cadence, target_per_week,
                   archived, created_at, updated_at
            FROM habits
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(habit)
    }

    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        include_archived: bool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let habits = sqlx::query_as::<_, Habit>(
            r#"
            SELECT id, user_id, name, description, cadence, target_per_week,
                   archived, created_at, updated_at
            FROM habits
            WHERE user_id = $1 AND (archived = FALSE OR $2)
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(include_archived)
        .fetch_all(pool)
        .await?;

        Ok(habits)
    }

    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        id: Uuid,
        data: UpdateHabit,
    ) -> Result<Option<Self>, sqlx::Error> {
        let habit = sqlx::query_as::<_, Habit>(
            r#"
            UPDATE habits
            SET name = $3, description = $4, cadence = $5,
                target_per_week = $6, archived = $7, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, description, cadence, target_per_week,
                      archived, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.cadence)
        .bind(data.target_per_week)
        .bind(data.archived)
        .fetch_optional(pool)
        .await?;

        Ok(habit)
    }

    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM habits WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks the habit done on a date; logging an already-logged date
    /// returns the existing row unchanged
    pub async fn log_date(
        pool: &PgPool,
        habit_id: Uuid,
        date: NaiveDate,
    ) -> Result<HabitLog, sqlx::Error> {
        // The no-op DO UPDATE makes RETURNING yield the row on conflict too.
        let log = sqlx::query_as::<_, HabitLog>(
            r#"
            INSERT INTO habit_logs (habit_id, logged_on)
            VALUES ($1, $2)
            ON CONFLICT (habit_id, logged_on)
            DO UPDATE SET logged_on = EXCLUDED.logged_on
            RETURNING id, habit_id, logged_on, created_at
            "#,
        )
        .bind(habit_id)
        .bind(date)
        .fetch_one(pool)
        .await?;

        Ok(log)
    }

    /// Removes a day's log; false if that day was not logged
    pub async fn unlog_date(
        pool: &PgPool,
        habit_id: Uuid,
        date: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM habit_logs WHERE habit_id = $1 AND logged_on = $2")
            .bind(habit_id)
            .bind(date)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All logged dates for a habit, ascending
    pub async fn logged_dates(
        pool: &PgPool,
        habit_id: Uuid,
    ) -> Result<Vec<NaiveDate>, sqlx::Error> {
        let rows: Vec<(NaiveDate,)> = sqlx::query_as(
            "SELECT logged_on FROM habit_logs WHERE habit_id = $1 ORDER BY logged_on ASC",
        )
        .bind(habit_id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(d,)| d).collect())
    }

    /// Computes the streak summary as of `today`
    pub async fn streak(
        pool: &PgPool,
        habit_id: Uuid,
        today: NaiveDate,
    ) -> Result<StreakSummary, sqlx::Error> {
        let dates = Self::logged_dates(pool, habit_id).await?;
        Ok(compute_streaks(&dates, today))
    }
}

/// Computes streak figures from sorted, deduplicated log dates
///
/// The current streak counts consecutive days ending today or yesterday,
/// so checking the habit off in the morning doesn't show a broken streak
/// for a day completed last night.
pub fn compute_streaks(dates: &[NaiveDate], today: NaiveDate) -> StreakSummary {
    let total_logged = dates.len() as u32;

    // Longest run of consecutive dates.
    let mut longest: u32 = 0;
    let mut run: u32 = 0;
    let mut prev: Option<NaiveDate> = None;
    for &date in dates {
        run = match prev {
            Some(p) if p.checked_add_days(Days::new(1)) == Some(date) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(date);
    }

    // Current streak: walk backwards from the most recent log, which must
    // be today or yesterday for the streak to be alive.
    let mut current: u32 = 0;
    if let Some(&last) = dates.last() {
        let yesterday = today.pred_opt().unwrap_or(today);
        if last == today || last == yesterday {
            current = 1;
            let mut cursor = last;
            for &date in dates.iter().rev().skip(1) {
                if date.checked_add_days(Days::new(1)) == Some(cursor) {
                    current += 1;
                    cursor = date;
                } else {
                    break;
                }
            }
        }
    }

    // Completion over the 30-day window ending today.
    let window_start = today
        .checked_sub_days(Days::new(29))
        .unwrap_or(today);
    let in_window = dates
        .iter()
        .filter(|d| **d >= window_start && **d <= today)
        .count();
    let completion_rate_30d = in_window as f64 / 30.0;

    StreakSummary {
        current,
        longest,
        total_logged,
        completion_rate_30d,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_cadence_serialization() {
        assert_eq!(
            serde_json::to_string(&HabitCadence::Weekly).unwrap(),
            r#""weekly""#
        );
        assert_eq!(HabitCadence::Daily.as_str(), "daily");
    }

    #[test]
    fn test_streaks_empty() {
        let summary = compute_streaks(&[], d(2025, 6, 15));
        assert_eq!(summary.current, 0);
        assert_eq!(summary.longest, 0);
        assert_eq!(summary.total_logged, 0);
        assert_eq!(summary.completion_rate_30d, 0.0);
    }

    #[test]
    fn test_streak_ending_today() {
        let dates = vec![d(2025, 6, 13), d(2025, 6, 14), d(2025, 6, 15)];
        let summary = compute_streaks(&dates, d(2025, 6, 15));

        assert_eq!(summary.current, 3);
        assert_eq!(summary.longest, 3);
        assert_eq!(summary.total_logged, 3);
    }

    #[test]
    fn test_streak_ending_yesterday_still_alive() {
        let dates = vec![d(2025, 6, 13), d(2025, 6, 14)];
        let summary = compute_streaks(&dates, d(2025, 6, 15));

        assert_eq!(summary.current, 2);
    }

    #[test]
    fn test_streak_broken_two_days_ago() {
        let dates = vec![d(2025, 6, 12), d(2025, 6, 13)];
        let summary = compute_streaks(&dates, d(2025, 6, 15));

        assert_eq!(summary.current, 0);
        assert_eq!(summary.longest, 2);
    }

    #[test]
    fn test_longest_streak_in_the_past() {
        // A five-day run in May, then a two-day run ending today.
        let dates = vec![
            d(2025, 5, 1),
            d(2025, 5, 2),
            d(2025, 5, 3),
            d(2025, 5, 4),
            d(2025, 5, 5),
            d(2025, 6, 14),
            d(2025, 6, 15),
        ];
        let summary = compute_streaks(&dates, d(2025, 6, 15));

        assert_eq!(summary.current, 2);
        assert_eq!(summary.longest, 5);
        assert_eq!(summary.total_logged, 7);
    }

    #[test]
    fn test_streak_across_month_boundary() {
        let dates = vec![d(2025, 5, 30), d(2025, 5, 31), d(2025, 6, 1)];
        let summary = compute_streaks(&dates, d(2025, 6, 1));

        assert_eq!(summary.current, 3);
        assert_eq!(summary.longest, 3);
    }

    #[test]
    fn test_completion_rate_window() {
        // 15 of the last 30 days logged.
        let today = d(2025, 6, 30);
        let dates: Vec<NaiveDate> = (1..=15).map(|day| d(2025, 6, day + 15)).collect();
        let summary = compute_streaks(&dates, today);

        assert_eq!(summary.completion_rate_30d, 0.5);
    }

    #[test]
    fn test_completion_rate_ignores_old_logs() {
        let today = d(2025, 6, 30);
        let dates = vec![d(2025, 1, 1), d(2025, 6, 30)];
        let summary = compute_streaks(&dates, today);

        assert_eq!(summary.completion_rate_30d, 1.0 / 30.0);
        assert_eq!(summary.total_logged, 2);
    }
}
