/// Database migration runner
///
/// Runs the SQL migrations in the workspace `migrations/` directory using
/// sqlx's embedded migration system. Each migration is a single
/// `{timestamp}_{name}.sql` file applied exactly once.
///
/// # Example
///
/// ```no_run
/// use untangle_shared::db::pool::{create_pool, DatabaseConfig};
/// use untangle_shared::db::migrations::run_migrations;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///
///     Ok(())
/// }
/// ```

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// Migrations are embedded at compile time from `../migrations` (workspace
/// root). Already-applied migrations are skipped; a failed migration aborts
/// with the underlying error.
///
/// # Errors
///
/// Returns an error if a migration file is malformed, a migration fails to
/// execute, or the database connection is lost mid-run.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("../migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
