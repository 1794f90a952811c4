use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::correlation::CorrelationData;
use super::grouped_counts::GroupedCountsData;
use super::summary::SummaryStatisticsData;
use crate::error::InputError;
use crate::models::{columns, Multiplex};

// =========================================================
// Visualisation request/response types
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum VisualisationKind {
    #[serde(rename = "Summary Statistics")]
    SummaryStatistics,
    #[serde(rename = "Other Bar Graphs")]
    OtherBarGraphs,
    #[serde(rename = "Correlation")]
    Correlation,
}

impl VisualisationKind {
    pub const ALL: [VisualisationKind; 3] = [
        Self::SummaryStatistics,
        Self::OtherBarGraphs,
        Self::Correlation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::SummaryStatistics => "Summary Statistics",
            Self::OtherBarGraphs => "Other Bar Graphs",
            Self::Correlation => "Correlation",
        }
    }

    /// Whether the request must name a column subset.
    pub fn requires_columns(&self) -> bool {
        !matches!(self, Self::SummaryStatistics)
    }
}

impl fmt::Display for VisualisationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VisualisationKind {
    type Err = InputError;

    /// Accepts the display label or a kebab-case form (`other-bar-graphs`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', " ").to_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.label().to_lowercase() == wanted)
            .ok_or_else(|| InputError::UnknownVisualisationKind(s.to_string()))
    }
}

impl TryFrom<String> for VisualisationKind {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// An immutable visualisation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualisationRequest {
    pub multiplexes: Vec<Multiplex>,
    pub kind: VisualisationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
}

impl VisualisationRequest {
    pub fn new(kind: VisualisationKind, multiplexes: Vec<Multiplex>) -> Self {
        Self {
            multiplexes,
            kind,
            columns: None,
        }
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Checks that need no data. One-hot column names are checked against
    /// the records later.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.multiplexes.is_empty() {
            return Err(InputError::NoMultiplexSelected);
        }
        if !self.kind.requires_columns() {
            return Ok(());
        }

        let selected = self
            .columns
            .as_ref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| InputError::MissingColumnSelection {
                kind: self.kind.label().to_string(),
            })?;

        if self.kind == VisualisationKind::OtherBarGraphs {
            if let Some(unknown) = selected
                .iter()
                .find(|c| !columns::SERVICE_LABELS.contains(&c.as_str()))
            {
                return Err(InputError::UnknownColumn {
                    column: unknown.clone(),
                });
            }
        }
        Ok(())
    }

    /// Selected multiplexes without repeats, in canonical order.
    pub fn selected_multiplexes(&self) -> Vec<Multiplex> {
        Multiplex::ALL
            .into_iter()
            .filter(|m| self.multiplexes.contains(m))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum Visualisation {
    #[serde(rename = "Summary Statistics")]
    SummaryStatistics(SummaryStatisticsData),
    #[serde(rename = "Other Bar Graphs")]
    GroupedCounts(GroupedCountsData),
    #[serde(rename = "Correlation")]
    Correlation(CorrelationData),
}

/// Either a chart model or the reason nothing could be drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VisualisationOutcome {
    Rendered { visualisation: Visualisation },
    NoVisualisation { reason: String },
}

impl VisualisationOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parses_labels_and_kebab_case() {
        assert_eq!(
            "Summary Statistics".parse::<VisualisationKind>().unwrap(),
            VisualisationKind::SummaryStatistics
        );
        assert_eq!(
            "other-bar-graphs".parse::<VisualisationKind>().unwrap(),
            VisualisationKind::OtherBarGraphs
        );
        assert_eq!(
            "Pie".parse::<VisualisationKind>(),
            Err(InputError::UnknownVisualisationKind("Pie".into()))
        );
    }

    #[test]
    fn test_request_deserializes_from_json() {
        let request: VisualisationRequest = serde_json::from_str(
            r#"{"multiplexes": ["C18A", "C188"], "kind": "Correlation", "columns": ["Block", "Freq"]}"#,
        )
        .unwrap();
        assert_eq!(request.kind, VisualisationKind::Correlation);
        assert_eq!(request.multiplexes, vec![Multiplex::C18A, Multiplex::C188]);
        assert!(request.validate().is_ok());

        let bad = serde_json::from_str::<VisualisationRequest>(
            r#"{"multiplexes": ["C18A"], "kind": "Histogram"}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_validate_rejects_empty_selection() {
        let request = VisualisationRequest::new(VisualisationKind::SummaryStatistics, vec![]);
        assert_eq!(request.validate(), Err(InputError::NoMultiplexSelected));
    }

    #[test]
    fn test_validate_requires_columns_for_bar_graphs() {
        let request = VisualisationRequest::new(VisualisationKind::OtherBarGraphs, vec![Multiplex::C18F]);
        assert!(matches!(
            request.validate(),
            Err(InputError::MissingColumnSelection { .. })
        ));

        let request = request.with_columns(["Serv Label1", "Site"]);
        assert_eq!(
            request.validate(),
            Err(InputError::UnknownColumn {
                column: "Site".into()
            })
        );
    }

    #[test]
    fn test_selected_multiplexes_dedups_in_order() {
        let request = VisualisationRequest::new(
            VisualisationKind::SummaryStatistics,
            vec![Multiplex::C188, Multiplex::C18A, Multiplex::C188],
        );
        assert_eq!(
            request.selected_multiplexes(),
            vec![Multiplex::C18A, Multiplex::C188]
        );
    }
}
