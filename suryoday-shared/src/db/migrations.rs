/// Embedded schema migrations
///
/// SQL files under `suryoday-shared/migrations/` are compiled into the
/// binary and applied in version order. The unique email indexes on `users`
/// and `volunteers` are what make concurrent approvals safe, so the API
/// refuses to start when migrations fail.

use sqlx::postgres::PgPool;
use tracing::info;

/// Applies every migration not yet recorded in `_sqlx_migrations`
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    let migrator = sqlx::migrate!("./migrations");
    info!(available = migrator.iter().count(), "Running database migrations");

    migrator.run(pool).await?;

    info!("Database migrations complete");
    Ok(())
}
