/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh)
/// - `me`: Profile endpoints
/// - `meals`, `foods`: Nutrition endpoints
/// - `mindfulness`, `habits`, `tasks`, `journal`: Wellbeing and planning
/// - `finance`, `documents`, `contacts`, `relationships`: Life admin
/// - `assistant`: Chat endpoints backed by OpenAI

pub mod assistant;
pub mod auth;
pub mod contacts;
pub mod documents;
pub mod finance;
pub mod foods;
pub mod habits;
pub mod health;
pub mod journal;
pub mod me;
pub mod meals;
pub mod mindfulness;
pub mod relationships;
pub mod tasks;

/// Clamps list pagination to sane bounds (max page size 100, default 50)
pub(crate) fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (limit.unwrap_or(50).clamp(1, 100), offset.unwrap_or(0).max(0))
}
