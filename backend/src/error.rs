//! Error types for the wrangling pipeline and the analysis engines.
//!
//! Repository failures live in [`crate::db::repository::RepositoryError`] and
//! document schema failures in [`crate::db::schema::SchemaValidationError`].

use std::path::PathBuf;

use thiserror::Error;

use crate::models::Multiplex;

/// Which side of the antenna/params join an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinSide {
    Antenna,
    Params,
}

impl std::fmt::Display for JoinSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinSide::Antenna => write!(f, "antenna"),
            JoinSide::Params => write!(f, "params"),
        }
    }
}

/// Fatal errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read {}: {source}", file.display())]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", file.display())]
    Parse { file: PathBuf, message: String },

    #[error("{} has no column '{column}'", file.display())]
    MissingColumn { file: PathBuf, column: String },

    #[error("join cardinality violated: id '{id}' appears more than once in the {side} extract")]
    JoinCardinality { side: JoinSide, id: String },

    #[error("record '{id}' has no value for required column '{column}'")]
    MissingNumeric { id: String, column: String },

    #[error("record '{id}' has non-numeric value '{value}' in column '{column}'")]
    InvalidNumeric {
        id: String,
        column: String,
        value: String,
    },
}

/// Caller-side input errors. Reported back without touching the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("expected the {expected} extract but got '{path}'")]
    WrongFile { expected: &'static str, path: String },

    #[error("at least one multiplex must be selected")]
    NoMultiplexSelected,

    #[error("the '{kind}' visualisation requires a column selection")]
    MissingColumnSelection { kind: String },

    #[error("unknown column '{column}'")]
    UnknownColumn { column: String },

    #[error("unknown multiplex '{0}'")]
    UnknownMultiplex(String),

    #[error("unknown visualisation kind '{0}'")]
    UnknownVisualisationKind(String),
}

/// Returned when a multiplex/filter combination matches no records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatisticsError {
    #[error("insufficient data for {multiplex} under filter '{filter}'")]
    InsufficientData { multiplex: Multiplex, filter: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    #[error("no records match the selected multiplexes")]
    EmptySelection,

    #[error(transparent)]
    Input(#[from] InputError),
}
