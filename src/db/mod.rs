pub mod models;
pub mod messages;

pub use models::{Message, NewMessage};
pub use messages::MessageRepository;

use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::config::Config;
use crate::error::AppError;

/// Name of the table holding every stored message.
pub const MESSAGES_TABLE: &str = "TB_Messages";

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens the connection pool described by `config`.
///
/// In-memory databases live only as long as their connection, so they get a
/// single connection that never idles out.
pub async fn connect(config: &Config) -> Result<Pool<Sqlite>, AppError> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);

    let pool = if is_in_memory(&config.database_url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(config.db_max_connections)
            .min_connections(config.db_min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect_with(options)
            .await?
    };

    Ok(pool)
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Creates the messages table.
///
/// Applied migrations are tracked, so running this against an up-to-date
/// database does nothing. A table created outside the migrator makes the
/// `CREATE TABLE` fail.
pub async fn apply_schema(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    MIGRATOR.run(pool).await?;
    tracing::debug!(table = MESSAGES_TABLE, "schema applied");
    Ok(())
}

/// Drops the messages table. Fails when the table does not exist.
pub async fn revert_schema(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    if !table_exists(pool, MESSAGES_TABLE).await? {
        return Err(AppError::Schema(format!(
            "table {} does not exist",
            MESSAGES_TABLE
        )));
    }

    MIGRATOR.undo(pool, 0).await?;

    // A table the migrator never recorded survives `undo`.
    if table_exists(pool, MESSAGES_TABLE).await? {
        sqlx::query("DROP TABLE TB_Messages").execute(pool).await?;
    }
    tracing::debug!(table = MESSAGES_TABLE, "schema reverted");
    Ok(())
}

pub async fn table_exists(pool: &Pool<Sqlite>, name: &str) -> Result<bool, AppError> {
    let found: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await?;

    Ok(found.is_some())
}
