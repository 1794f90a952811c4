//! Postgres document store using Diesel.
//!
//! Documents are kept as JSONB rows in `dab_documents`, ordered by their
//! position in the uploaded batch. A replace runs in one transaction.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::info;
use serde_json::Value;
use std::time::Duration;
use tokio::task;

use crate::db::models::UploadSummary;
use crate::db::repository::{DocumentRepository, RepositoryError, RepositoryResult};

mod models;
mod schema;

use models::{DocumentRow, NewDocumentRow};
use schema::dab_documents;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub database_url: String,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connection_timeout_sec: u64,
    pub idle_timeout_sec: u64,
    /// Retries for transient failures
    pub max_retries: u32,
    /// Initial retry delay, doubled on every attempt
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Read the configuration from the environment variables listed above.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

const TABLE: &str = "dab_documents";

/// Postgres caps a statement at 65535 bind parameters; each row binds four.
const INSERT_CHUNK_ROWS: usize = 65535 / NewDocumentRow::BIND_PARAMS;

/// Diesel-backed [`DocumentRepository`].
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Connect, build the pool and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::unavailable(e.to_string())
                    .during("create_pool")
                    .detail(format!("max_size={}", config.max_pool_size))
            })?;

        {
            let mut conn = pool
                .get()
                .map_err(|e| RepositoryError::from(e).during("run_migrations"))?;
            conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
                RepositoryError::internal(format!("Migration failed: {}", e))
                    .during("run_migrations")
            })?;
        }

        Ok(Self { pool, config })
    }

    /// Run `f` on a pooled connection off the async runtime, retrying
    /// retryable failures with exponential backoff.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut retry_delay = Duration::from_millis(retry_delay_ms);
            let mut attempt = 0;
            loop {
                let result = pool
                    .get()
                    .map_err(|e| {
                        RepositoryError::from(e)
                            .during("get_connection")
                            .detail(format!("attempt {}", attempt + 1))
                    })
                    .and_then(|mut conn| f.clone()(&mut conn));

                match result {
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        attempt += 1;
                        std::thread::sleep(retry_delay);
                        retry_delay *= 2;
                    }
                    other => return other,
                }
            }
        })
        .await
        .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))?
    }
}

#[async_trait]
impl DocumentRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(RepositoryError::from)
        })
        .await
    }

    async fn replace_all(&self, documents: Vec<Value>) -> RepositoryResult<UploadSummary> {
        let summary = UploadSummary::for_batch(&documents);
        let rows: Vec<NewDocumentRow> = documents
            .into_iter()
            .enumerate()
            .map(|(i, document)| NewDocumentRow {
                position: i as i64,
                document,
                batch_checksum: summary.checksum.clone(),
                uploaded_at: summary.replaced_at,
            })
            .collect();

        let inserted = self
            .with_conn(move |conn| {
                conn.transaction(|tx| {
                    diesel::delete(dab_documents::table).execute(tx)?;
                    let mut inserted = 0;
                    for chunk in rows.chunks(INSERT_CHUNK_ROWS) {
                        inserted += diesel::insert_into(dab_documents::table)
                            .values(chunk)
                            .execute(tx)?;
                    }
                    Ok(inserted)
                })
                .map_err(|e: diesel::result::Error| {
                    RepositoryError::from(e).during("replace_all").at(TABLE)
                })
            })
            .await?;

        info!("Replaced dab_documents with {} rows", inserted);
        Ok(summary)
    }

    async fn fetch_all(&self) -> RepositoryResult<Vec<Value>> {
        self.with_conn(|conn| {
            dab_documents::table
                .order(dab_documents::position.asc())
                .select(DocumentRow::as_select())
                .load::<DocumentRow>(conn)
                .map(|rows| rows.into_iter().map(|r| r.document).collect())
                .map_err(|e| RepositoryError::from(e).during("fetch_all").at(TABLE))
        })
        .await
    }

    async fn count(&self) -> RepositoryResult<usize> {
        self.with_conn(|conn| {
            dab_documents::table
                .count()
                .get_result::<i64>(conn)
                .map(|n| n as usize)
                .map_err(|e| RepositoryError::from(e).during("count").at(TABLE))
        })
        .await
    }
}
