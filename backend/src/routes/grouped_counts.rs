use serde::{Deserialize, Serialize};

use crate::models::Multiplex;

// =========================================================
// Grouped count types
// =========================================================

/// Summed one-hot indicators for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedCount {
    pub group: String,
    /// Indicator column name to count, in column order
    pub counts: Vec<(String, u64)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteCount {
    pub multiplex: Multiplex,
    pub distinct_sites: usize,
}

/// A panel of a multi-panel chart. Each series is one legend entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPanel {
    pub title: String,
    pub categories: Vec<String>,
    pub series: Vec<PanelSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// Panels drawn side by side with one legend shared by all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPanelChart {
    pub panels: Vec<ChartPanel>,
    pub legend: Vec<String>,
}

/// Complete grouped counts dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedCountsData {
    pub indicator_columns: Vec<String>,
    pub by_frequency: Vec<GroupedCount>,
    pub by_multiplex: Vec<GroupedCount>,
    pub distinct_sites: Vec<SiteCount>,
    pub chart: MultiPanelChart,
}
