use clap::{Args, Parser, Subcommand};
use sqlx::{Pool, Sqlite};

use crate::db;
use crate::error::AppError;

#[derive(Parser, Debug)]
#[command(name = "message-store", version, about = "Message storage HTTP service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Apply the schema and serve HTTP (default)
    Serve,
    /// Apply or revert the schema, then exit
    Migrate(MigrateArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq, Default)]
pub struct MigrateArgs {
    /// Drop the messages table instead of creating it
    #[arg(long)]
    pub revert: bool,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}

/// Applies or reverts the schema, then closes the pool whatever the outcome.
pub async fn run_migration(pool: Pool<Sqlite>, args: &MigrateArgs) -> Result<(), AppError> {
    let result = if args.revert {
        db::revert_schema(&pool)
            .await
            .map(|_| tracing::info!("Schema reverted"))
    } else {
        db::apply_schema(&pool)
            .await
            .map(|_| tracing::info!("Schema applied"))
    };

    pool.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    async fn memory_pool() -> Pool<Sqlite> {
        let config = Config::from_lookup(|key| {
            (key == "DATABASE_URL").then(|| "sqlite::memory:".to_string())
        })
        .unwrap();
        db::connect(&config).await.expect("Failed to open pool")
    }

    #[tokio::test]
    async fn failed_revert_still_closes_pool() {
        let pool = memory_pool().await;
        let handle = pool.clone();

        let result = run_migration(pool, &MigrateArgs { revert: true }).await;
        assert!(matches!(result, Err(AppError::Schema(_))));
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn apply_closes_pool() {
        let pool = memory_pool().await;
        let handle = pool.clone();

        run_migration(pool, &MigrateArgs::default()).await.unwrap();
        assert!(handle.is_closed());
    }

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::parse_from(["message-store"]);
        assert_eq!(cli.command(), Command::Serve);
    }

    #[test]
    fn migrate_revert_flag_parses() {
        let cli = Cli::parse_from(["message-store", "migrate", "--revert"]);
        assert_eq!(cli.command(), Command::Migrate(MigrateArgs { revert: true }));

        let cli = Cli::parse_from(["message-store", "migrate"]);
        assert_eq!(cli.command(), Command::Migrate(MigrateArgs { revert: false }));
    }
}
