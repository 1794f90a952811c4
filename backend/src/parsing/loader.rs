//! Loading the antenna and params extracts and joining them on `id`.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::{debug, info};

use super::decoder::{decode_table, Encoding};
use crate::error::{JoinSide, PipelineError};
use crate::models::{columns, Cell, Table};

/// The merged table plus what was learned while reading the inputs.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub merged: Table,
    pub antenna_rows: usize,
    pub params_rows: usize,
    pub duplicates_removed: usize,
    pub antenna_encoding: Encoding,
    pub params_encoding: Encoding,
}

/// Read both extracts and left-join params onto antenna by `id`.
pub fn load(antenna_path: &Path, params_path: &Path) -> Result<LoadedData, PipelineError> {
    let antenna = decode_table(antenna_path)?;
    let params = decode_table(params_path)?;

    let mut antenna_table = antenna.table;
    antenna_table.trim_headers();
    let antenna_table = antenna_table.select(&columns::ANTENNA, antenna_path)?;

    // The antenna extract is authoritative for its own columns.
    let mut params_table = params.table;
    params_table.trim_headers();
    let shadowed = params_table.drop_columns(&columns::ANTENNA[1..]);
    if shadowed > 0 {
        debug!(
            "Ignoring {} params column(s) already supplied by {}",
            shadowed,
            antenna_path.display()
        );
    }

    let antenna_rows = antenna_table.len();
    let params_rows = params_table.len();

    let mut merged = join_one_to_one(&antenna_table, antenna_path, &params_table, params_path)?;
    let duplicates_removed = merged.dedup_rows();

    info!(
        "Loaded {} antenna rows and {} params rows into {} merged rows",
        antenna_rows,
        params_rows,
        merged.len()
    );

    Ok(LoadedData {
        merged,
        antenna_rows,
        params_rows,
        duplicates_removed,
        antenna_encoding: antenna.encoding,
        params_encoding: params.encoding,
    })
}

/// Left join keyed on `id`, rejecting a repeated key on either side.
///
/// Non-key columns present on both sides get `_x` (left) and `_y` (right)
/// suffixes. The result never has more rows than `left`.
pub fn join_one_to_one(
    left: &Table,
    left_path: &Path,
    right: &Table,
    right_path: &Path,
) -> Result<Table, PipelineError> {
    let left_key = left.require_column(columns::ID, left_path)?;
    let right_key = right.require_column(columns::ID, right_path)?;

    unique_keys(left, left_key, left_path, JoinSide::Antenna)?;
    let right_index = unique_keys(right, right_key, right_path, JoinSide::Params)?;

    let left_names: HashSet<&str> = left.headers.iter().map(String::as_str).collect();
    let right_names: HashSet<&str> = right.headers.iter().map(String::as_str).collect();

    let mut headers: Vec<String> = left
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i != left_key && right_names.contains(h.as_str()) {
                format!("{}_x", h)
            } else {
                h.clone()
            }
        })
        .collect();
    let right_columns: Vec<usize> = (0..right.headers.len()).filter(|&i| i != right_key).collect();
    headers.extend(right_columns.iter().map(|&i| {
        let h = &right.headers[i];
        if left_names.contains(h.as_str()) {
            format!("{}_y", h)
        } else {
            h.clone()
        }
    }));

    let mut merged = Table::new(headers);
    let mut unmatched = 0usize;
    for row in &left.rows {
        let key = row[left_key].as_deref().unwrap_or_default();
        let mut out: Vec<Cell> = row.clone();
        match right_index.get(key) {
            Some(&r) => out.extend(right_columns.iter().map(|&i| right.rows[r][i].clone())),
            None => {
                unmatched += 1;
                out.extend(std::iter::repeat(None).take(right_columns.len()));
            }
        }
        merged.push_row(out);
    }

    if unmatched > 0 {
        debug!("{} antenna rows have no params match", unmatched);
    }

    Ok(merged)
}

fn unique_keys<'a>(
    table: &'a Table,
    key: usize,
    path: &Path,
    side: JoinSide,
) -> Result<HashMap<&'a str, usize>, PipelineError> {
    let mut index = HashMap::with_capacity(table.len());
    for (i, row) in table.rows.iter().enumerate() {
        let id = row[key].as_deref().ok_or_else(|| PipelineError::Parse {
            file: path.to_path_buf(),
            message: format!("row {} has an empty '{}'", i + 2, columns::ID),
        })?;
        if index.insert(id, i).is_some() {
            return Err(PipelineError::JoinCardinality {
                side,
                id: id.to_string(),
            });
        }
    }
    Ok(index)
}
