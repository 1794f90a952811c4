//! Implementations of [`DocumentRepository`](crate::db::repository::DocumentRepository):
//! - `local`: in-memory, for tests and development
//! - `file`: a JSON array file on disk
//! - `postgres`: JSONB rows in PostgreSQL via Diesel
pub mod file;
pub mod local;
#[cfg(feature = "postgres-repo")]
pub mod postgres;

pub use file::{FileRepository, DEFAULT_STORE_PATH};
pub use local::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use postgres::{PostgresConfig, PostgresRepository};
