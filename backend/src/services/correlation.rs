//! Cramér's V between categorical columns of the selected records.

use std::collections::HashMap;

use crate::error::{AggregationError, InputError};
use crate::models::{columns, Multiplex, OutputRecord};
use crate::routes::correlation::{AssociationMatrix, CorrelationData, HeatmapChart};

use super::aggregation::{one_hot_encode, select_records, OneHot};

/// Level used for an absent value; it counts as a category of its own.
const ABSENT: &str = "<absent>";

/// Association coefficient of two equally long categorical columns.
///
/// A column with a single level makes the chi-square expectation degenerate;
/// such pairs are defined as 1.0.
pub fn cramers_v<A, B>(a: &[A], b: &[B]) -> f64
where
    A: std::hash::Hash + Eq,
    B: std::hash::Hash + Eq,
{
    let a_levels = levels(a);
    let b_levels = levels(b);
    let (r, k) = (distinct(&a_levels), distinct(&b_levels));
    if r < 2 || k < 2 {
        return 1.0;
    }

    let n = a_levels.len().min(b_levels.len());
    let mut observed = vec![vec![0f64; k]; r];
    for (&i, &j) in a_levels.iter().zip(&b_levels) {
        observed[i][j] += 1.0;
    }
    let row_totals: Vec<f64> = observed.iter().map(|row| row.iter().sum()).collect();
    let col_totals: Vec<f64> = (0..k).map(|j| observed.iter().map(|row| row[j]).sum()).collect();

    let total = n as f64;
    let mut chi2 = 0.0;
    for i in 0..r {
        for j in 0..k {
            let expected = row_totals[i] * col_totals[j] / total;
            if expected > 0.0 {
                chi2 += (observed[i][j] - expected).powi(2) / expected;
            }
        }
    }

    let dof = (r.min(k) - 1) as f64;
    (chi2 / (total * dof)).sqrt().clamp(0.0, 1.0)
}

/// Map each value to a dense level index in order of first appearance.
fn levels<T: std::hash::Hash + Eq>(values: &[T]) -> Vec<usize> {
    let mut seen: HashMap<&T, usize> = HashMap::new();
    values
        .iter()
        .map(|v| {
            let next = seen.len();
            *seen.entry(v).or_insert(next)
        })
        .collect()
}

fn distinct(levels: &[usize]) -> usize {
    levels.iter().max().map_or(0, |m| m + 1)
}

/// Square matrix over `selected_columns`. A column is either a flat output
/// column or a one-hot service-label indicator such as `Serv Label1_HEART`.
pub fn association_matrix(
    records: &[OutputRecord],
    multiplexes: &[Multiplex],
    selected_columns: &[String],
) -> Result<AssociationMatrix, AggregationError> {
    if selected_columns.is_empty() {
        return Err(InputError::MissingColumnSelection {
            kind: "Correlation".to_string(),
        }
        .into());
    }
    let selected = select_records(records, multiplexes)?;
    let encoded = one_hot_encode(&selected, &columns::SERVICE_LABELS);

    let data = selected_columns
        .iter()
        .map(|column| column_values(&selected, &encoded, column))
        .collect::<Result<Vec<_>, _>>()?;

    let size = selected_columns.len();
    let mut values = vec![vec![1.0; size]; size];
    for i in 0..size {
        for j in (i + 1)..size {
            let v = cramers_v(&data[i], &data[j]);
            values[i][j] = v;
            values[j][i] = v;
        }
    }

    Ok(AssociationMatrix {
        columns: selected_columns.to_vec(),
        values,
    })
}

fn column_values(
    records: &[&OutputRecord],
    encoded: &OneHot,
    column: &str,
) -> Result<Vec<String>, InputError> {
    if columns::OUTPUT.contains(&column) {
        return Ok(records
            .iter()
            .map(|r| r.categorical_value(column).unwrap_or_else(|| ABSENT.to_string()))
            .collect());
    }
    encoded
        .column(column)
        .map(|values| values.map(|v| v.to_string()).collect())
        .ok_or_else(|| InputError::UnknownColumn {
            column: column.to_string(),
        })
}

pub fn heatmap(matrix: &AssociationMatrix) -> HeatmapChart {
    HeatmapChart {
        title: "Cramér's V".to_string(),
        x_labels: matrix.columns.clone(),
        y_labels: matrix.columns.clone(),
        values: matrix.values.clone(),
        annotations: matrix
            .values
            .iter()
            .map(|row| row.iter().map(|v| format!("{:.2}", v)).collect())
            .collect(),
    }
}

pub fn correlation(
    records: &[OutputRecord],
    multiplexes: &[Multiplex],
    selected_columns: &[String],
) -> Result<CorrelationData, AggregationError> {
    let matrix = association_matrix(records, multiplexes, selected_columns)?;
    let heatmap = heatmap(&matrix);
    Ok(CorrelationData { matrix, heatmap })
}
