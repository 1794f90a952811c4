//! Text-typed tabular data as read from the CSV extracts.

use std::collections::HashSet;
use std::path::Path;

use crate::error::PipelineError;

/// A cell is `None` when the source field was empty or the row had no match
/// in a left join.
pub type Cell = Option<String>;

/// Header names plus text rows. Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like [`Table::column_index`] but a missing column is fatal for `file`.
    pub fn require_column(&self, name: &str, file: &Path) -> Result<usize, PipelineError> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::MissingColumn {
                file: file.to_path_buf(),
                column: name.to_string(),
            })
    }

    /// Pad or truncate a row to the header width and append it.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.headers.len(), None);
        self.rows.push(row);
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.as_deref())
    }

    /// Project onto `columns`, in that order.
    pub fn select(&self, columns: &[&str], file: &Path) -> Result<Table, PipelineError> {
        let indices = columns
            .iter()
            .map(|c| self.require_column(c, file))
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for row in &self.rows {
            out.rows
                .push(indices.iter().map(|&i| row[i].clone()).collect());
        }
        Ok(out)
    }

    pub fn trim_headers(&mut self) {
        for header in &mut self.headers {
            let trimmed = header.trim();
            if trimmed.len() != header.len() {
                *header = trimmed.to_string();
            }
        }
    }

    /// Rename `from` to `to` when present. Returns whether a rename happened.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(i) => {
                self.headers[i] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Remove every column whose header is in `names`. Returns the number removed.
    pub fn drop_columns(&mut self, names: &[&str]) -> usize {
        let keep: Vec<bool> = self
            .headers
            .iter()
            .map(|h| !names.contains(&h.as_str()))
            .collect();
        let removed = keep.iter().filter(|k| !**k).count();
        if removed == 0 {
            return 0;
        }

        let mut flags = keep.iter();
        self.headers
            .retain(|_| flags.next().copied().unwrap_or(true));
        for row in &mut self.rows {
            let mut flags = keep.iter();
            row.retain(|_| flags.next().copied().unwrap_or(true));
        }
        removed
    }

    /// Drop rows identical to an earlier row. Returns the number removed.
    pub fn dedup_rows(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen = HashSet::with_capacity(before);
        self.rows.retain(|row| seen.insert(row.clone()));
        before - self.rows.len()
    }
}
