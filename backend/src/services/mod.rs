//! Service layer for business logic and orchestration.
//!
//! Services sit between the store and the outer surfaces (CLI, HTTP). The
//! analysis engines are synchronous and work on records already read back from
//! the store; [`visualisation`] and [`ingest`] tie them to a repository.

pub mod aggregation;
pub mod correlation;
pub mod ingest;
pub mod statistics;
pub mod visualisation;

pub use aggregation::{grouped_counts, one_hot_encode, select_records, OneHot};
pub use correlation::{association_matrix, correlation, cramers_v, heatmap};
pub use ingest::{clean_and_upload, IngestError, IngestOutcome};
pub use statistics::{first_mode, mean, median, summarize, summary_statistics};
pub use visualisation::{generate_visualisation, visualise_from_store, VisualisationError};
