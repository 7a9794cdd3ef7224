/// Database layer
///
/// - `pool`: PostgreSQL connection pool with a health probe
/// - `migrations`: embedded schema migrations run at start-up
///
/// Row types and their SQL live in [`crate::models`]; handlers reach them
/// through [`crate::store::PgStore`].
///
/// # Example
///
/// ```no_run
/// use suryoday_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = create_pool(DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     })
///     .await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
