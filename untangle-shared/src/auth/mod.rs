/// Authentication utilities
///
/// Secure authentication primitives shared by the API:
///
/// - [`password`]: Argon2id password hashing and strength validation
/// - [`jwt`]: HS256 access/refresh token generation and validation
/// - [`middleware`]: Axum middleware that turns a Bearer token into an
///   [`middleware::AuthContext`] request extension
///
/// Password verification and JWT signature checks are constant-time.

pub mod jwt;
pub mod middleware;
pub mod password;
