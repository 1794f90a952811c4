//! Data Transfer Objects for the HTTP API.
//!
//! Visualisation types are re-exported from the routes module since they
//! already derive Serialize/Deserialize.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use crate::api::{
    // Summary statistics
    BarSeries, GroupedBarChart, StatisticsFilter, SummaryStatistic, SummaryStatisticsData,
    // Grouped counts
    ChartPanel, GroupedCount, GroupedCountsData, MultiPanelChart, PanelSeries, SiteCount,
    // Correlation
    AssociationMatrix, CorrelationData, HeatmapChart,
    // Requests and outcomes
    Visualisation, VisualisationKind, VisualisationOutcome, VisualisationRequest,
};
pub use crate::db::models::UploadSummary;
pub use crate::preprocessing::PipelineReport;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    /// Stored documents, when the store could be counted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<usize>,
}

/// Request body for cleaning and uploading the two CSV extracts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvUploadRequest {
    pub antenna_path: PathBuf,
    pub params_path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct CsvUploadResponse {
    pub run_id: String,
    pub report: PipelineReport,
    pub upload: UploadSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsUploadResponse {
    pub run_id: String,
    pub upload: UploadSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsResponse {
    pub documents: Vec<Value>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisualisationResponse {
    pub run_id: String,
    #[serde(flatten)]
    pub outcome: VisualisationOutcome,
}
