/// Database layer
///
/// This module provides the PostgreSQL connection pool and the migration
/// runner used by the API server and by integration tests.
///
/// - `pool`: Connection pool creation and health checks
/// - `migrations`: Migration runner over the workspace `migrations/` directory

pub mod migrations;
pub mod pool;

pub use migrations::run_migrations;
pub use pool::{create_pool, health_check, DatabaseConfig};
