/// Database layer for Eventpages
///
/// This module provides the PostgreSQL connection pool and the embedded
/// migration runner. Models are in the `models` module at crate root level.
///
/// # Modules
///
/// - `pool`: Connection pool creation with a startup health check
/// - `migrations`: Embedded `migrations/` runner
///
/// # Example
///
/// ```no_run
/// use eventpages_shared::db::pool::{create_pool, DatabaseConfig};
/// use eventpages_shared::db::migrations::run_migrations;
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
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
