//! Building repository instances from runtime configuration.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use log::info;

use super::repo_config::RepositoryConfig;
use super::repositories::{FileRepository, LocalRepository, DEFAULT_STORE_PATH};
#[cfg(feature = "postgres-repo")]
use super::repositories::PostgresRepository;
use super::repository::{DocumentRepository, RepositoryError, RepositoryResult};
use super::PostgresConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Postgres + Diesel, documents stored as JSONB
    Postgres,
    /// JSON array file on disk
    File,
    /// In-memory, lost at process exit
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "file" | "json" => Ok(Self::File),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Read `REPOSITORY_TYPE`. Without it, a database URL selects Postgres and
    /// anything else the file store.
    pub fn from_env() -> Result<Self, RepositoryError> {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().map_err(RepositoryError::configuration);
        }

        if std::env::var("DATABASE_URL").is_ok() || std::env::var("PG_DATABASE_URL").is_ok() {
            Ok(Self::Postgres)
        } else {
            Ok(Self::File)
        }
    }
}

/// Store path from `DAB_STORE_PATH`, else the default collection file.
pub fn store_path_from_env() -> PathBuf {
    std::env::var("DAB_STORE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_PATH))
}

/// Factory for [`DocumentRepository`] handles.
///
/// # Example
/// ```ignore
/// use dab_rust::db::RepositoryFactory;
///
/// let repo = RepositoryFactory::from_config_file("repository.toml").await?;
/// let summary = dab_rust::db::services::upload_records(repo.as_ref(), &records).await?;
/// repo.close().await?;
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository of the given type. File stores use [`store_path_from_env`].
    pub async fn create(
        repo_type: RepositoryType,
        postgres_config: Option<&PostgresConfig>,
    ) -> RepositoryResult<Arc<dyn DocumentRepository>> {
        match repo_type {
            RepositoryType::Postgres => Self::postgres_from(postgres_config).await,
            RepositoryType::File => Ok(Self::create_file(store_path_from_env())),
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }

    #[cfg(feature = "postgres-repo")]
    pub async fn create_postgres(
        config: &PostgresConfig,
    ) -> RepositoryResult<Arc<PostgresRepository>> {
        let config = config.clone();
        let repo = tokio::task::spawn_blocking(move || PostgresRepository::new(config))
            .await
            .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))??;
        Ok(Arc::new(repo))
    }

    #[cfg(feature = "postgres-repo")]
    async fn postgres_from(
        config: Option<&PostgresConfig>,
    ) -> RepositoryResult<Arc<dyn DocumentRepository>> {
        let config = config.ok_or_else(|| {
            RepositoryError::configuration("Postgres repository requires PostgresConfig")
        })?;
        let pg = Self::create_postgres(config).await?;
        Ok(pg as Arc<dyn DocumentRepository>)
    }

    #[cfg(not(feature = "postgres-repo"))]
    async fn postgres_from(
        _config: Option<&PostgresConfig>,
    ) -> RepositoryResult<Arc<dyn DocumentRepository>> {
        Err(RepositoryError::configuration(
            "Postgres repository feature not enabled",
        ))
    }

    pub fn create_local() -> Arc<dyn DocumentRepository> {
        Arc::new(LocalRepository::new())
    }

    pub fn create_file(path: impl Into<PathBuf>) -> Arc<dyn DocumentRepository> {
        let path = path.into();
        info!("Using file document store at {}", path.display());
        Arc::new(FileRepository::new(path))
    }

    /// Create a repository from `REPOSITORY_TYPE` and related variables.
    pub async fn from_env() -> RepositoryResult<Arc<dyn DocumentRepository>> {
        match RepositoryType::from_env()? {
            RepositoryType::Postgres => {
                #[cfg(feature = "postgres-repo")]
                {
                    let config =
                        PostgresConfig::from_env().map_err(RepositoryError::configuration)?;
                    Self::postgres_from(Some(&config)).await
                }
                #[cfg(not(feature = "postgres-repo"))]
                {
                    Self::postgres_from(None).await
                }
            }
            other => Self::create(other, None).await,
        }
    }

    pub async fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> RepositoryResult<Arc<dyn DocumentRepository>> {
        let config = RepositoryConfig::from_file(config_path)?;
        Self::from_repository_config(&config).await
    }

    /// Use `repository.toml` from a standard location when one exists,
    /// otherwise fall back to [`RepositoryFactory::from_env`].
    pub async fn from_default_config() -> RepositoryResult<Arc<dyn DocumentRepository>> {
        match RepositoryConfig::default_location() {
            Some(path) => Self::from_config_file(path).await,
            None => Self::from_env().await,
        }
    }

    pub async fn from_repository_config(
        config: &RepositoryConfig,
    ) -> RepositoryResult<Arc<dyn DocumentRepository>> {
        let repo_type = config.repository_type().map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        match repo_type {
            RepositoryType::Postgres => {
                let pg_config = config.to_postgres_config()?;
                Self::postgres_from(pg_config.as_ref()).await
            }
            RepositoryType::File => Ok(Self::create_file(config.store_path())),
            RepositoryType::Local => Ok(Self::create_local()),
        }
    }
}
