/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use untangle_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config)?;
/// let app = untangle_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{
        rate_limit::{RateLimit, RateLimiter},
        security::SecurityHeadersLayer,
    },
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use untangle_connectors::{
    default_http_client, FoodDataProvider, OffClient, OpenAiClient, UsdaClient,
};
use untangle_shared::auth::middleware::create_jwt_middleware;

/// Assistant endpoints allow a short burst, then refill over a minute
const ASSISTANT_REQUESTS_PER_MINUTE: u32 = 10;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Food search providers, in priority order for deduplication
    pub food_providers: Vec<Arc<dyn FoodDataProvider>>,

    /// Open Food Facts client (barcode lookups)
    pub off: Arc<OffClient>,

    /// OpenAI client; `None` when no API key is configured
    pub openai: Option<Arc<OpenAiClient>>,

    /// Per-user limiter for assistant endpoints
    pub assistant_limiter: RateLimiter,
}

impl AppState {
    /// Creates application state, wiring provider clients from configuration
    ///
    /// The USDA provider is only registered when an API key is present;
    /// Open Food Facts needs no key and is always registered. A missing
    /// OpenAI key leaves the assistant disabled rather than failing startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the shared HTTP client cannot be constructed.
    pub fn new(db: PgPool, config: Config) -> anyhow::Result<Self> {
        let http = default_http_client()?;

        let off = Arc::new(OffClient::with_base_url(
            http.clone(),
            config.providers.off_base_url.clone(),
        ));

        let mut food_providers: Vec<Arc<dyn FoodDataProvider>> = Vec::new();
        if let Some(key) = &config.providers.usda_api_key {
            food_providers.push(Arc::new(UsdaClient::new(http.clone(), key.clone())));
        } else {
            tracing::info!("USDA_API_KEY not set; food search uses Open Food Facts only");
        }
        food_providers.push(off.clone());

        let openai = match &config.providers.openai_api_key {
            Some(key) => Some(Arc::new(OpenAiClient::new(
                http,
                key.clone(),
                config.providers.openai_base_url.clone(),
                config.providers.openai_model.clone(),
            ))),
            None => {
                tracing::info!("OPENAI_API_KEY not set; assistant endpoints disabled");
                None
            }
        };

        Ok(Self::with_connectors(db, config, food_providers, off, openai))
    }

    /// Creates application state from pre-built connectors
    ///
    /// Used by tests to inject mock providers.
    pub fn with_connectors(
        db: PgPool,
        config: Config,
        food_providers: Vec<Arc<dyn FoodDataProvider>>,
        off: Arc<OffClient>,
        openai: Option<Arc<OpenAiClient>>,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            food_providers,
            off,
            openai,
            assistant_limiter: RateLimiter::new(RateLimit::per_minute(
                ASSISTANT_REQUESTS_PER_MINUTE,
            )),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /
/// ├── /health                   # Health check (public)
/// ├── /v1/                      # API v1 (versioned)
/// │   ├── /auth/                # register, login, refresh (public)
/// │   ├── /me                   # Profile (authenticated, like all below)
/// │   ├── /meals/               # Meal log + daily summaries
/// │   ├── /foods/               # Food catalog, search, barcode, import
/// │   ├── /mindfulness/         # Mood check-ins
/// │   ├── /habits/              # Habits, logs, streaks
/// │   ├── /tasks/               # Tasks and status transitions
/// │   ├── /journal/             # Journal entries
/// │   ├── /finance/             # Transactions + monthly summaries
/// │   ├── /documents/           # Document registry
/// │   ├── /contacts/            # Contacts
/// │   ├── /relationships/       # Relationship tracking
/// │   └── /assistant/           # Chat (authenticated + rate limited)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. Response compression (tower-http CompressionLayer)
/// 3. CORS (tower-http CorsLayer)
/// 4. Security headers
/// 5. Authentication (per-group basis)
/// 6. Rate limiting (assistant group only)
pub fn build_router(state: AppState) -> Router {
    // Import route handlers
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let me_routes = Router::new()
        .route("/", get(routes::me::get_profile))
        .route("/", put(routes::me::update_profile));

    let meal_routes = Router::new()
        .route("/", post(routes::meals::create_meal))
        .route("/", get(routes::meals::list_meals))
        .route("/summary/:date", get(routes::meals::daily_summary))
        .route("/:id", get(routes::meals::get_meal))
        .route("/:id", put(routes::meals::update_meal))
        .route("/:id", delete(routes::meals::delete_meal));

    let food_routes = Router::new()
        .route("/", post(routes::foods::create_food))
        .route("/", get(routes::foods::list_foods))
        .route("/search", get(routes::foods::search_foods))
        .route("/barcode/:code", get(routes::foods::lookup_barcode))
        .route("/import", post(routes::foods::import_food))
        .route("/:id", get(routes::foods::get_food))
        .route("/:id", put(routes::foods::update_food))
        .route("/:id", delete(routes::foods::delete_food));

    let mindfulness_routes = Router::new()
        .route("/", post(routes::mindfulness::create_checkin))
        .route("/", get(routes::mindfulness::list_checkins))
        .route("/latest", get(routes::mindfulness::latest_checkin))
        .route("/date/:date", get(routes::mindfulness::checkins_for_date))
        .route("/:id", get(routes::mindfulness::get_checkin))
        .route("/:id", delete(routes::mindfulness::delete_checkin));

    let habit_routes = Router::new()
        .route("/", post(routes::habits::create_habit))
        .route("/", get(routes::habits::list_habits))
        .route("/:id", get(routes::habits::get_habit))
        .route("/:id", put(routes::habits::update_habit))
        .route("/:id", delete(routes::habits::delete_habit))
        .route("/:id/logs", post(routes::habits::log_habit))
        .route("/:id/logs", get(routes::habits::habit_logs))
        .route("/:id/logs/:date", delete(routes::habits::unlog_habit))
        .route("/:id/streak", get(routes::habits::habit_streak));

    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task))
        .route("/", get(routes::tasks::list_tasks))
        .route("/:id", get(routes::tasks::get_task))
        .route("/:id", put(routes::tasks::update_task))
        .route("/:id", delete(routes::tasks::delete_task))
        .route("/:id/status", patch(routes::tasks::set_task_status));

    let journal_routes = Router::new()
        .route("/", post(routes::journal::create_entry))
        .route("/", get(routes::journal::list_entries))
        .route("/:id", get(routes::journal::get_entry))
        .route("/:id", put(routes::journal::update_entry))
        .route("/:id", delete(routes::journal::delete_entry));

    let finance_routes = Router::new()
        .route("/transactions", post(routes::finance::create_transaction))
        .route("/transactions", get(routes::finance::list_transactions))
        .route("/transactions/:id", get(routes::finance::get_transaction))
        .route("/transactions/:id", put(routes::finance::update_transaction))
        .route(
            "/transactions/:id",
            delete(routes::finance::delete_transaction),
        )
        .route("/summary/:year/:month", get(routes::finance::monthly_summary));

    let document_routes = Router::new()
        .route("/", post(routes::documents::create_document))
        .route("/", get(routes::documents::list_documents))
        .route("/:id", get(routes::documents::get_document))
        .route("/:id", put(routes::documents::update_document))
        .route("/:id", delete(routes::documents::delete_document));

    let contact_routes = Router::new()
        .route("/", post(routes::contacts::create_contact))
        .route("/", get(routes::contacts::list_contacts))
        .route("/:id", get(routes::contacts::get_contact))
        .route("/:id", put(routes::contacts::update_contact))
        .route("/:id", delete(routes::contacts::delete_contact));

    let relationship_routes = Router::new()
        .route("/", post(routes::relationships::create_relationship))
        .route("/", get(routes::relationships::list_relationships))
        .route("/:id", get(routes::relationships::get_relationship))
        .route("/:id", put(routes::relationships::update_relationship))
        .route("/:id", delete(routes::relationships::delete_relationship));

    // Assistant routes carry their own rate limit inside the JWT layer
    let assistant_routes = Router::new()
        .route("/chat", post(routes::assistant::chat))
        .route("/messages", get(routes::assistant::list_messages))
        .route("/messages", delete(routes::assistant::clear_messages))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::rate_limit::rate_limit_layer,
        ));

    // Everything except /auth requires a valid access token
    let protected_routes = Router::new()
        .nest("/me", me_routes)
        .nest("/meals", meal_routes)
        .nest("/foods", food_routes)
        .nest("/mindfulness", mindfulness_routes)
        .nest("/habits", habit_routes)
        .nest("/tasks", task_routes)
        .nest("/journal", journal_routes)
        .nest("/finance", finance_routes)
        .nest("/documents", document_routes)
        .nest("/contacts", contact_routes)
        .nest("/relationships", relationship_routes)
        .nest("/assistant", assistant_routes)
        .layer(axum::middleware::from_fn(create_jwt_middleware(
            state.jwt_secret().to_owned(),
        )));

    // Build complete v1 API
    let v1_routes = Router::new().nest("/auth", auth_routes).merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
