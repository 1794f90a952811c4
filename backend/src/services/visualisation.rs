//! Entry point that turns a visualisation request into a chart model.

use log::info;
use thiserror::Error;

use super::aggregation::grouped_counts;
use super::correlation::correlation;
use super::statistics::summary_statistics;
use crate::db::repository::{DocumentRepository, RepositoryError};
use crate::db::schema::SchemaValidationError;
use crate::db::services::{fetch_output_records, DocumentError};
use crate::error::{AggregationError, InputError};
use crate::models::OutputRecord;
use crate::routes::visualisation::{
    Visualisation, VisualisationKind, VisualisationOutcome, VisualisationRequest,
};

/// Failures that stop a visualisation. Empty results are not errors; they come
/// back as [`VisualisationOutcome::NoVisualisation`].
#[derive(Debug, Error)]
pub enum VisualisationError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Schema(#[from] SchemaValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<DocumentError> for VisualisationError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Schema(e) => Self::Schema(e),
            DocumentError::Repository(e) => Self::Repository(e),
            other => Self::Repository(RepositoryError::internal(other.to_string())),
        }
    }
}

fn no_visualisation(reason: impl ToString) -> VisualisationOutcome {
    let reason = reason.to_string();
    info!("No visualisation produced: {}", reason);
    VisualisationOutcome::NoVisualisation { reason }
}

/// Run the analysis named by `request` over `records`.
pub fn generate_visualisation(
    records: &[OutputRecord],
    request: &VisualisationRequest,
) -> Result<VisualisationOutcome, VisualisationError> {
    request.validate()?;
    let multiplexes = request.selected_multiplexes();
    let selected_columns = request.columns.as_deref().unwrap_or_default();

    let result = match request.kind {
        VisualisationKind::SummaryStatistics => {
            match summary_statistics(records, &multiplexes) {
                Ok(data) => Ok(Visualisation::SummaryStatistics(data)),
                Err(e) => return Ok(no_visualisation(e)),
            }
        }
        VisualisationKind::OtherBarGraphs => {
            let labels: Vec<&str> = selected_columns.iter().map(String::as_str).collect();
            grouped_counts(records, &multiplexes, &labels).map(Visualisation::GroupedCounts)
        }
        VisualisationKind::Correlation => {
            correlation(records, &multiplexes, selected_columns).map(Visualisation::Correlation)
        }
    };

    match result {
        Ok(visualisation) => Ok(VisualisationOutcome::Rendered { visualisation }),
        Err(AggregationError::EmptySelection) => {
            Ok(no_visualisation(AggregationError::EmptySelection))
        }
        Err(AggregationError::Input(e)) => Err(e.into()),
    }
}

/// Fetch the stored records and visualise them. Input errors are reported
/// before the store is touched.
pub async fn visualise_from_store(
    repo: &dyn DocumentRepository,
    request: &VisualisationRequest,
) -> Result<VisualisationOutcome, VisualisationError> {
    request.validate()?;
    let records = fetch_output_records(repo).await?;
    generate_visualisation(&records, request)
}
