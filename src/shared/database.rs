use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager, Pool};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::env;
use std::time::Duration;

use crate::log_info;
use crate::shared::errors::{AppError, AppResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

/// Connection pool wrapper, constructed once at process start and injected
/// into repository impls as `Arc<Database>`. The pool closes when the last
/// handle is dropped.
#[derive(Debug)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    pub fn new() -> AppResult<Self> {
        let database_url = Self::validated_database_url()?;

        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let max_size = Self::pool_size();

        let pool = r2d2::Pool::builder()
            .max_size(max_size)
            .min_idle(Some((max_size / 4).max(1)))
            .connection_timeout(Duration::from_secs(10))
            .idle_timeout(Some(Duration::from_secs(300)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| AppError::Database(format!("Failed to create connection pool: {}", e)))?;

        log_info!("Database connection pool initialized (max_size: {})", max_size);

        Ok(Self { pool })
    }

    /// Build from an existing pool (useful for tests).
    pub fn from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    fn validated_database_url() -> AppResult<String> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Database("DATABASE_URL environment variable not set".into()))?;

        if !database_url.starts_with("postgres://") && !database_url.starts_with("postgresql://") {
            return Err(AppError::Database(
                "Invalid database URL: must start with postgres:// or postgresql://".to_string(),
            ));
        }

        // Log the target host only, never credentials.
        log_info!(
            "Connecting to database at: {}",
            database_url.split('@').next_back().unwrap_or("unknown_host")
        );

        Ok(database_url)
    }

    fn pool_size() -> u32 {
        let cpu_count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        (cpu_count * 2).min(20) as u32
    }

    pub fn get_connection(&self) -> AppResult<DbConnection> {
        self.pool.get().map_err(AppError::from)
    }

    /// Apply pending embedded migrations. Runs at startup, before any
    /// service accepts work.
    pub fn run_migrations(&self) -> AppResult<()> {
        let mut conn = self.get_connection()?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))?;
        log_info!("Database migrations up to date");
        Ok(())
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}
