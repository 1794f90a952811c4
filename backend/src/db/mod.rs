//! Document store for the wrangled DAB records.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (CLI, REST API)                      │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - Serialisation to nested documents                    │
//! │  - Schema conformance on read                           │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Trait (repository/) - Abstract Interface    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┼──────────────────────┐
//!     │ Local         │ File                 │ Postgres
//!     │ (in-memory)   │ (JSON array file)    │ (JSONB, feature-gated)
//!     └───────────────┴──────────────────────┘
//! ```
//!
//! Every upload replaces the whole collection. The repository handle is created
//! by [`RepositoryFactory`] at the start of a run and closed at its end.
//!
//! ```ignore
//! use dab_rust::db::{services, RepositoryFactory};
//!
//! let repo = RepositoryFactory::from_default_config().await?;
//! let records = services::fetch_output_records(repo.as_ref()).await?;
//! repo.close().await?;
//! ```

pub mod checksum;
pub mod documents;
pub mod factory;
pub mod models;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod schema;
pub mod services;

// Postgres config is colocated with the repository implementation.
#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::PostgresConfig;
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

pub use services::{
    dump_documents, fetch_output_records, health_check, load_documents_file, upload_documents,
    upload_records, DocumentError,
};

pub use checksum::calculate_checksum;
pub use documents::{flatten_document, serialize_records, DabDocument, SiteInfo};
pub use models::UploadSummary;
pub use repo_config::RepositoryConfig;
pub use schema::{ColumnDiff, SchemaErrorKind, SchemaValidationError};

pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::{FileRepository, LocalRepository};
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{DocumentRepository, RepositoryError, RepositoryResult, StoreContext};
