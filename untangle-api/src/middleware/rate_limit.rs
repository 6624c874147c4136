/// Rate limiting middleware for assistant endpoints
///
/// This module implements token bucket rate limiting with in-process state.
/// The server fronts a single household of users, so a shared map keyed by
/// user ID is sufficient; there is no distributed store to coordinate with.
///
/// # Algorithm
///
/// Uses token bucket algorithm:
/// - Tokens refill at constant rate
/// - Each request consumes 1 token
/// - Request blocked if bucket empty
///
/// # Headers
///
/// Response includes rate limit headers:
/// - `X-RateLimit-Limit`: Total requests allowed per window
/// - `X-RateLimit-Remaining`: Tokens remaining
/// - `X-RateLimit-Reset`: Unix timestamp when tokens fully replenish
/// - `Retry-After`: Seconds to wait (429 responses only)

use crate::app::AppState;
use crate::error::ApiError;
use axum::{
    extract::{Extension, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};
use untangle_shared::auth::middleware::AuthContext;
use uuid::Uuid;

/// Rate limit configuration
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    /// Maximum requests per minute
    pub requests_per_minute: u32,

    /// Token refill rate (tokens per second)
    pub refill_rate: f64,

    /// Maximum tokens in bucket (burst capacity)
    pub bucket_capacity: u32,
}

impl RateLimit {
    /// Builds a limit allowing `n` requests per minute with burst capacity `n`
    pub fn per_minute(n: u32) -> Self {
        RateLimit {
            requests_per_minute: n,
            refill_rate: n as f64 / 60.0,
            bucket_capacity: n,
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Token bucket state for one user
#[derive(Debug, Clone)]
struct TokenBucket {
    /// Current number of tokens
    tokens: f64,

    /// Last refill timestamp (Unix seconds)
    last_refill: u64,
}

impl TokenBucket {
    /// Creates a new full bucket
    fn new(capacity: u32) -> Self {
        TokenBucket {
            tokens: capacity as f64,
            last_refill: unix_now(),
        }
    }

    /// Refills tokens based on elapsed time
    fn refill(&mut self, rate: f64, capacity: u32) {
        let now = unix_now();
        let elapsed_secs = now.saturating_sub(self.last_refill) as f64;
        let new_tokens = elapsed_secs * rate;

        self.tokens = (self.tokens + new_tokens).min(capacity as f64);
        self.last_refill = now;
    }

    /// Attempts to consume N tokens
    fn try_consume(&mut self, count: f64) -> bool {
        if self.tokens >= count {
            self.tokens -= count;
            true
        } else {
            false
        }
    }

    /// Calculates seconds until N tokens available
    fn seconds_until_available(&self, count: f64, rate: f64) -> u64 {
        let deficit = count - self.tokens;
        if deficit <= 0.0 {
            0
        } else {
            (deficit / rate).ceil() as u64
        }
    }
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    /// Whether the request is allowed
    pub allowed: bool,

    /// Tokens remaining after this request
    pub remaining: u32,

    /// Seconds until a token becomes available (429 responses)
    pub retry_after: u64,
}

/// Per-user token bucket limiter
///
/// Cloning shares the underlying bucket map.
#[derive(Clone)]
pub struct RateLimiter {
    limit: RateLimit,
    buckets: Arc<Mutex<HashMap<Uuid, TokenBucket>>>,
}

impl RateLimiter {
    /// Creates a limiter with the given configuration
    pub fn new(limit: RateLimit) -> Self {
        RateLimiter {
            limit,
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the configured limit
    pub fn limit(&self) -> RateLimit {
        self.limit
    }

    /// Checks and consumes one token for `user_id`
    pub fn check(&self, user_id: Uuid) -> RateLimitDecision {
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);

        let bucket = buckets
            .entry(user_id)
            .or_insert_with(|| TokenBucket::new(self.limit.bucket_capacity));

        bucket.refill(self.limit.refill_rate, self.limit.bucket_capacity);

        if bucket.try_consume(1.0) {
            RateLimitDecision {
                allowed: true,
                remaining: bucket.tokens.floor() as u32,
                retry_after: 0,
            }
        } else {
            RateLimitDecision {
                allowed: false,
                remaining: 0,
                retry_after: bucket.seconds_until_available(1.0, self.limit.refill_rate),
            }
        }
    }
}

/// Rate limiting middleware layer
///
/// Checks the per-user limit before processing requests. Returns 429 with a
/// `Retry-After` header when exceeded. Must run inside the JWT layer so the
/// `AuthContext` extension is present.
pub async fn rate_limit_layer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let limiter = &state.assistant_limiter;
    let decision = limiter.check(auth.user_id);

    if !decision.allowed {
        tracing::debug!(user_id = %auth.user_id, retry_after = decision.retry_after, "Rate limit exceeded");
        return Err(ApiError::RateLimitExceeded {
            retry_after: decision.retry_after,
            message: format!(
                "Rate limit exceeded. Try again in {} seconds",
                decision.retry_after
            ),
        });
    }

    let limit = limiter.limit();
    let mut response = next.run(request).await;

    // Add rate limit headers
    response.headers_mut().insert(
        "X-RateLimit-Limit",
        HeaderValue::from_str(&limit.requests_per_minute.to_string()).unwrap(),
    );
    response.headers_mut().insert(
        "X-RateLimit-Remaining",
        HeaderValue::from_str(&decision.remaining.to_string()).unwrap(),
    );
    response.headers_mut().insert(
        "X-RateLimit-Reset",
        HeaderValue::from_str(&(unix_now() + 60).to_string()).unwrap(),
    );

    Ok(response)
}
