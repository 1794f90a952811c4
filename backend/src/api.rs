//! Public API surface for the DAB backend.
//!
//! This file consolidates the DTO types shared by the HTTP API and the CLI.
//! All types derive Serialize so they can be emitted as JSON.

pub use crate::routes::correlation::AssociationMatrix;
pub use crate::routes::correlation::CorrelationData;
pub use crate::routes::correlation::HeatmapChart;
pub use crate::routes::grouped_counts::ChartPanel;
pub use crate::routes::grouped_counts::GroupedCount;
pub use crate::routes::grouped_counts::GroupedCountsData;
pub use crate::routes::grouped_counts::MultiPanelChart;
pub use crate::routes::grouped_counts::PanelSeries;
pub use crate::routes::grouped_counts::SiteCount;
pub use crate::routes::summary::BarSeries;
pub use crate::routes::summary::GroupedBarChart;
pub use crate::routes::summary::StatisticsFilter;
pub use crate::routes::summary::SummaryStatistic;
pub use crate::routes::summary::SummaryStatisticsData;
pub use crate::routes::visualisation::Visualisation;
pub use crate::routes::visualisation::VisualisationKind;
pub use crate::routes::visualisation::VisualisationOutcome;
pub use crate::routes::visualisation::VisualisationRequest;

pub use crate::db::models::UploadSummary;
pub use crate::models::{Multiplex, MultiplexFlags, OutputRecord, ServiceLabels};
pub use crate::preprocessing::PipelineReport;

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
