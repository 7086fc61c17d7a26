use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, Sqlite, Transaction,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

#[derive(Clone)]
pub struct Database {
    pub pool: Pool<Sqlite>,
}

impl Database {
    pub async fn new(database_url: &str, pool_size: u32) -> Result<Self, sqlx::Error> {
        let mut options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        // Every connection to `:memory:` opens its own empty database, so an
        // in-memory pool must stay on a single connection that never expires.
        let in_memory = database_url.contains(":memory:");
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }
        let mut pool_options =
            SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(5));
        pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(pool_size.max(1))
        };

        let pool = pool_options.connect_with(options).await?;

        Ok(Database { pool })
    }

    /// Fresh, migrated in-memory database.
    pub async fn in_memory() -> Result<Self, anyhow::Error> {
        let db = Database::new("sqlite::memory:", 1).await?;
        db.run_migrations().await?;
        Ok(db)
    }

    /// Opens a transaction that holds SQLite's write lock from the start.
    ///
    /// A deferred transaction that reads before writing fails with
    /// `SQLITE_BUSY` when another connection commits in between; an
    /// immediate one waits on the busy timeout instead.
    pub async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
        self.pool.begin_with("BEGIN IMMEDIATE").await
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("./src/migrations").run(&self.pool).await?;
        info!("Migrations completed");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}
