/// Middleware modules for the API server
///
/// This module contains custom middleware for:
/// - Security headers
/// - Rate limiting (assistant endpoints)

pub mod rate_limit;
pub mod security;
