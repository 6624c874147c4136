/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test user creation
/// - JWT token generation
/// - Mock food providers (no network access in tests)
/// - API client helpers

use std::sync::Arc;

use sqlx::PgPool;
use untangle_api::app::{build_router, AppState};
use untangle_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig, ProviderConfig};
use untangle_connectors::{default_http_client, FoodDataProvider, FoodHit, MockProvider, OffClient};
use untangle_shared::auth::jwt::{create_token, Claims, TokenType};
use untangle_shared::models::food_item::FoodSource;
use untangle_shared::models::user::{CreateUser, User};
use untangle_shared::nutrition::NutrientProfile;
use uuid::Uuid;

/// Fixed signing secret for test tokens (at least 32 characters)
pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a test context, or `None` when `DATABASE_URL` is not set
    ///
    /// Machines without a Postgres instance skip the suite; CI exports the
    /// variable and runs everything.
    pub async fn try_new() -> Option<Self> {
        dotenvy::dotenv().ok();

        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("skipping integration test: DATABASE_URL is not set");
                return None;
            }
        };

        Some(
            Self::new(database_url)
                .await
                .expect("failed to build test context"),
        )
    }

    async fn new(database_url: String) -> anyhow::Result<Self> {
        // Connect to database and apply migrations
        let db = PgPool::connect(&database_url).await?;
        untangle_shared::db::run_migrations(&db).await?;

        // Create test user. The hash is a placeholder; tests that exercise
        // login register their own user through the API instead.
        let user = User::create(
            &db,
            CreateUser {
                email: format!("test-{}@example.com", Uuid::new_v4()),
                password_hash: "test_hash".to_string(),
                name: Some("Test User".to_string()),
                timezone: None,
            },
        )
        .await?;

        // Generate JWT token
        let claims = Claims::new(user.id, TokenType::Access);
        let jwt_token = create_token(&claims, TEST_JWT_SECRET)?;

        // Build app with mock connectors: canned search hits, an Open Food
        // Facts client pointed at an unroutable address, and no OpenAI.
        let config = test_config(database_url);
        let food_providers: Vec<Arc<dyn FoodDataProvider>> =
            vec![Arc::new(MockProvider::new(mock_hits()))];
        let off = Arc::new(OffClient::with_base_url(
            default_http_client()?,
            "http://127.0.0.1:9",
        ));

        let state = AppState::with_connectors(db.clone(), config, food_providers, off, None);
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Cleans up test data
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        // Delete test user (cascades to meals, habits, tasks, etc.)
        User::delete(&self.db, self.user.id).await?;
        Ok(())
    }
}

fn test_config(database_url: String) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: database_url,
            max_connections: 5,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
        providers: ProviderConfig {
            usda_api_key: None,
            openai_api_key: None,
            openai_base_url: untangle_connectors::openai::DEFAULT_BASE_URL.to_string(),
            openai_model: untangle_connectors::openai::DEFAULT_MODEL.to_string(),
            off_base_url: untangle_connectors::openfoodfacts::DEFAULT_BASE_URL.to_string(),
        },
    }
}

/// Canned hits served by the mock search provider
fn mock_hits() -> Vec<FoodHit> {
    vec![
        FoodHit {
            name: "Mock Oats".to_string(),
            brand: None,
            nutrients: NutrientProfile {
                energy_kcal: 389.0,
                protein_g: 16.9,
                carbs_g: 66.3,
                fat_g: 6.9,
                saturated_fat_g: 1.2,
                fiber_g: 10.6,
                sugar_g: 1.0,
                sodium_mg: 2.0,
            },
            nova_class: None,
            fodmap: None,
            source: FoodSource::Usda,
            source_ref: "fdc-173904".to_string(),
        },
        FoodHit {
            name: "Mock Oat Milk".to_string(),
            brand: Some("Mockbrand".to_string()),
            nutrients: NutrientProfile {
                energy_kcal: 46.0,
                protein_g: 1.0,
                carbs_g: 6.6,
                fat_g: 1.5,
                saturated_fat_g: 0.2,
                fiber_g: 0.8,
                sugar_g: 4.0,
                sodium_mg: 40.0,
            },
            nova_class: None,
            fodmap: None,
            source: FoodSource::Openfoodfacts,
            source_ref: "4000000000001".to_string(),
        },
    ]
}

/// Creates a second user with their own access token, for ownership checks
pub async fn create_second_user(ctx: &TestContext) -> anyhow::Result<(User, String)> {
    let user = User::create(
        &ctx.db,
        CreateUser {
            email: format!("other-{}@example.com", Uuid::new_v4()),
            password_hash: "test_hash".to_string(),
            name: Some("Other User".to_string()),
            timezone: None,
        },
    )
    .await?;

    let claims = Claims::new(user.id, TokenType::Access);
    let token = create_token(&claims, TEST_JWT_SECRET)?;

    Ok((user, token))
}
