use serde::{Deserialize, Serialize};

// =========================================================
// Categorical association types
// =========================================================

/// Symmetric matrix of association coefficients in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `values[i][j]` is the coefficient for columns i and j.
    pub values: Vec<Vec<f64>>,
}

impl AssociationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

/// Annotated heatmap; `annotations` holds the cell text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapChart {
    pub title: String,
    pub x_labels: Vec<String>,
    pub y_labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
    pub annotations: Vec<Vec<String>>,
}

/// Complete correlation dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationData {
    pub matrix: AssociationMatrix,
    pub heatmap: HeatmapChart,
}
