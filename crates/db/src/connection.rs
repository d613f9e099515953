use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use tracing::debug;

pub type DbPool = sqlx::SqlitePool;

/// Opens the storefront pool. Every connection enforces foreign keys and runs in
/// WAL mode so recommendation reads do not block order writes.
pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    let max_connections = max_connections.max(1);
    debug!(
        event_name = "db.pool.connect",
        max_connections,
        timeout_secs,
        "opening sqlite pool"
    );

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
}

#[cfg(test)]
mod tests {
    use super::connect_with_settings;

    #[tokio::test]
    async fn pragmas_are_applied_to_new_connections() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");

        let foreign_keys: i64 =
            sqlx::query_scalar("PRAGMA foreign_keys").fetch_one(&pool).await.expect("pragma");
        assert_eq!(foreign_keys, 1);
    }

    #[tokio::test]
    async fn zero_pool_size_is_clamped() {
        let pool = connect_with_settings("sqlite::memory:", 0, 0).await.expect("connect");
        assert_eq!(pool.options().get_max_connections(), 1);
    }
}
