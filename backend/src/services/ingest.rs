//! Clean the CSV extracts and replace the store with the result.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::db::models::UploadSummary;
use crate::db::repository::{DocumentRepository, RepositoryError};
use crate::db::services::{upload_records, DocumentError};
use crate::error::{InputError, PipelineError};
use crate::preprocessing::{validate_input_paths, PipelineReport, WranglingPipeline};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub report: PipelineReport,
    pub upload: UploadSummary,
}

/// Validate the selection, run the pipeline and upload its records.
///
/// The store is only written once the pipeline has succeeded.
pub async fn clean_and_upload(
    repo: &dyn DocumentRepository,
    antenna_path: &Path,
    params_path: &Path,
) -> Result<IngestOutcome, IngestError> {
    validate_input_paths(antenna_path, params_path)?;

    let antenna = antenna_path.to_path_buf();
    let params = params_path.to_path_buf();
    let result = tokio::task::spawn_blocking(move || WranglingPipeline::new().process(&antenna, &params))
        .await
        .map_err(|e| {
            DocumentError::Repository(RepositoryError::internal(format!(
                "Pipeline task failed: {}",
                e
            )))
        })??;

    let upload = upload_records(repo, &result.records).await?;
    Ok(IngestOutcome {
        report: result.report,
        upload,
    })
}
