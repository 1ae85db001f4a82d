/// Database migration runner
///
/// Migrations live in `migrations/` at the workspace root and are embedded
/// into the binary at compile time. Each migration is a reversible pair:
/// `{version}_{name}.up.sql` and `{version}_{name}.down.sql`.

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Embedded workspace migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("../migrations");

/// Runs all pending database migrations
///
/// Each migration runs in its own transaction; a failing migration is rolled
/// back and reported.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    info!(
        available = MIGRATOR.iter().count(),
        "Starting database migrations"
    );

    match MIGRATOR.run(pool).await {
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
