/// Profile endpoints
///
/// - `GET /v1/me` - Current user's profile
/// - `PUT /v1/me` - Replace profile fields (email, name, timezone)
///
/// The password hash never leaves the server; `User` skips it during
/// serialization. Password changes are out of scope for this endpoint.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use untangle_shared::{
    auth::middleware::AuthContext,
    models::user::{UpdateUser, User},
};
use validator::Validate;

/// Profile update request
///
/// PUT semantics: omitted optional fields are cleared, not preserved.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Display name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    /// IANA timezone name
    #[validate(length(max = 64, message = "Timezone must be at most 64 characters"))]
    pub timezone: Option<String>,
}

/// Returns the authenticated user's profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Replaces the authenticated user's profile
///
/// # Errors
///
/// - `409 Conflict`: Email already taken by another account
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    req.validate()?;

    let user = User::update(
        &state.db,
        auth.user_id,
        UpdateUser {
            email: Some(req.email),
            password_hash: None,
            name: Some(req.name),
            timezone: Some(req.timezone),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
