use std::path::Path;

use log::info;
use serde::Serialize;

use crate::error::PipelineError;
use crate::models::OutputRecord;
use crate::parsing::{load, Encoding};
use crate::transformations::{clean, exclude_invalid_ngrs, extract_multiplexes, project, DateWarning};

/// Row counts and warnings collected while running the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub antenna_rows: usize,
    pub params_rows: usize,
    /// Rows produced by the join, before duplicate removal
    pub merged_rows: usize,
    pub after_dedup: usize,
    pub after_exclusion: usize,
    pub after_multiplex_filter: usize,
    pub antenna_encoding: Encoding,
    pub params_encoding: Encoding,
    pub date_warnings: Vec<DateWarning>,
}

#[derive(Debug)]
pub struct PipelineResult {
    pub records: Vec<OutputRecord>,
    pub report: PipelineReport,
}

/// Load → clean → exclude → extract multiplexes → project.
///
/// Every run reprocesses both files from scratch.
#[derive(Debug, Default, Clone, Copy)]
pub struct WranglingPipeline;

impl WranglingPipeline {
    pub fn new() -> Self {
        Self
    }

    pub fn process(
        &self,
        antenna_path: &Path,
        params_path: &Path,
    ) -> Result<PipelineResult, PipelineError> {
        // Step 1: Decode both files and join them
        let loaded = load(antenna_path, params_path)?;
        let merged_rows = loaded.merged.len() + loaded.duplicates_removed;

        // Step 2: Normalise and type the merged table
        let cleaned = clean(loaded.merged)?;
        let after_dedup = cleaned.records.len();

        // Step 3: Drop known-bad grid references
        let valid = exclude_invalid_ngrs(cleaned.records);
        let after_exclusion = valid.len();

        // Step 4: Keep tracked multiplexes only
        let tagged = extract_multiplexes(valid);
        let after_multiplex_filter = tagged.len();

        // Step 5: Output contract
        let records = project(tagged);

        let report = PipelineReport {
            antenna_rows: loaded.antenna_rows,
            params_rows: loaded.params_rows,
            merged_rows,
            after_dedup,
            after_exclusion,
            after_multiplex_filter,
            antenna_encoding: loaded.antenna_encoding,
            params_encoding: loaded.params_encoding,
            date_warnings: cleaned.report.date_warnings,
        };
        info!(
            "Pipeline kept {} of {} antenna rows ({} date warnings)",
            report.after_multiplex_filter,
            report.antenna_rows,
            report.date_warnings.len()
        );

        Ok(PipelineResult { records, report })
    }
}
