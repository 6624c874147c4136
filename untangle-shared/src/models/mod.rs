/// Database models
///
/// One module per table. Every model owns its CRUD surface as associated
/// functions taking a `&PgPool`; queries for user-owned rows are always
/// scoped by `user_id`, so a row belonging to someone else behaves exactly
/// like a missing row.

pub mod contact;
pub mod document;
pub mod food_item;
pub mod habit;
pub mod journal;
pub mod meal;
pub mod message;
pub mod mindfulness;
pub mod relationship;
pub mod task;
pub mod transaction;
pub mod user;
