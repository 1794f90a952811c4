//! Failures of the document store.

use std::fmt;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Which store call failed, and against which collection file, table or
/// config path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreContext {
    pub operation: Option<String>,
    pub location: Option<String>,
    pub detail: Option<String>,
}

impl StoreContext {
    pub fn is_empty(&self) -> bool {
        self.operation.is_none() && self.location.is_none() && self.detail.is_none()
    }
}

impl fmt::Display for StoreContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let mut parts = Vec::with_capacity(3);
        if let Some(op) = &self.operation {
            parts.push(format!("during {}", op));
        }
        if let Some(location) = &self.location {
            parts.push(format!("at {}", location));
        }
        if let Some(detail) = &self.detail {
            parts.push(detail.clone());
        }
        write!(f, " ({})", parts.join("; "))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The store cannot be reached or has been closed. Retrying may help.
    #[error("store unavailable: {message}{context}")]
    Unavailable {
        message: String,
        context: StoreContext,
    },

    #[error("store query failed: {message}{context}")]
    Query {
        message: String,
        context: StoreContext,
        retryable: bool,
    },

    /// The persisted collection cannot be decoded.
    #[error("stored collection is corrupt: {message}{context}")]
    Corrupt {
        message: String,
        context: StoreContext,
    },

    #[error("store misconfigured: {message}{context}")]
    Configuration {
        message: String,
        context: StoreContext,
    },

    #[error("store failure: {message}{context}")]
    Internal {
        message: String,
        context: StoreContext,
    },
}

impl RepositoryError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            context: StoreContext::default(),
        }
    }

    pub fn query(message: impl Into<String>, retryable: bool) -> Self {
        Self::Query {
            message: message.into(),
            context: StoreContext::default(),
            retryable,
        }
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
            context: StoreContext::default(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: StoreContext::default(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: StoreContext::default(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unavailable { .. } => true,
            Self::Query { retryable, .. } => *retryable,
            _ => false,
        }
    }

    pub fn context(&self) -> &StoreContext {
        match self {
            Self::Unavailable { context, .. }
            | Self::Query { context, .. }
            | Self::Corrupt { context, .. }
            | Self::Configuration { context, .. }
            | Self::Internal { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut StoreContext {
        match self {
            Self::Unavailable { context, .. }
            | Self::Query { context, .. }
            | Self::Corrupt { context, .. }
            | Self::Configuration { context, .. }
            | Self::Internal { context, .. } => context,
        }
    }

    /// Name the store operation that failed.
    pub fn during(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Name the collection file, table or config path involved.
    pub fn at(mut self, location: impl fmt::Display) -> Self {
        self.context_mut().location = Some(location.to_string());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.context_mut().detail = Some(detail.into());
        self
    }
}

impl From<std::io::Error> for RepositoryError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::TimedOut | ErrorKind::ConnectionRefused | ErrorKind::ConnectionReset => {
                RepositoryError::unavailable(err.to_string())
            }
            _ => RepositoryError::internal(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::corrupt(err.to_string())
            .detail(format!("line {}, column {}", err.line(), err.column()))
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};
        match err {
            Error::DatabaseError(kind, info) => {
                // Serialization failures are safe to retry.
                let retryable = matches!(kind, DatabaseErrorKind::SerializationFailure);
                RepositoryError::query(info.message(), retryable)
                    .detail(format!("{:?}", kind))
            }
            Error::DeserializationError(e) => RepositoryError::corrupt(e.to_string()),
            Error::SerializationError(e) => RepositoryError::internal(e.to_string()),
            other => RepositoryError::query(other.to_string(), false),
        }
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::r2d2::PoolError> for RepositoryError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        RepositoryError::unavailable(err.to_string()).detail("connection pool")
    }
}
