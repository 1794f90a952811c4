use serde::{Deserialize, Serialize};

use crate::models::Multiplex;

// =========================================================
// Summary statistics types
// =========================================================

/// Record filters the summary statistics are computed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatisticsFilter {
    #[serde(rename = "Site Height > 75")]
    SiteHeightAbove75,
    #[serde(rename = "Year >= 2001")]
    YearFrom2001,
}

impl StatisticsFilter {
    pub const ALL: [StatisticsFilter; 2] = [Self::SiteHeightAbove75, Self::YearFrom2001];

    pub fn label(&self) -> &'static str {
        match self {
            Self::SiteHeightAbove75 => "Site Height > 75",
            Self::YearFrom2001 => "Year >= 2001",
        }
    }
}

impl std::fmt::Display for StatisticsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Mean, median and mode of power for one multiplex under one filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistic {
    pub multiplex: Multiplex,
    pub filter: StatisticsFilter,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub mode: f64,
}

/// One bar series: a measure across the categories on the x axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedBarChart {
    pub title: String,
    pub categories: Vec<String>,
    pub series: Vec<BarSeries>,
}

/// Complete summary statistics dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatisticsData {
    pub statistics: Vec<SummaryStatistic>,
    /// One chart per filter
    pub charts: Vec<GroupedBarChart>,
}
