//! Normalisation of the merged table into typed [`CleanedRecord`]s.
//!
//! Steps run in a fixed order:
//! 1. trim column names
//! 2. rename the `Freq.` alias to `Freq`
//! 3. drop exact-duplicate rows (first occurrence wins)
//! 4. strip thousands separators from the ERP column
//! 5. collapse whitespace, trim and upper-case every text cell
//! 6. remove spaces from NGR values
//! 7. parse the effective date (`%d/%m/%Y`, then `%Y-%m-%d`, then `%d-%m-%Y`)
//! 8. parse height integers and power/frequency floats
//!
//! An unparseable date leaves the date unset and is reported as a warning.
//! A missing or malformed required number aborts the run.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::PipelineError;
use crate::models::{columns, Cell, CleanedRecord, ServiceLabels, Table};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Date formats tried in priority order.
pub const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y"];

/// Name used in errors raised against the in-memory merged table.
const MERGED_TABLE: &str = "<merged table>";

/// A date that could not be parsed with any of [`DATE_FORMATS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateWarning {
    pub id: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningReport {
    pub duplicates_removed: usize,
    pub date_warnings: Vec<DateWarning>,
}

#[derive(Debug, Clone)]
pub struct CleanedData {
    pub records: Vec<CleanedRecord>,
    pub report: CleaningReport,
}

/// Clean a merged table. Takes ownership: the input is not reused downstream.
pub fn clean(mut table: Table) -> Result<CleanedData, PipelineError> {
    table.trim_headers();
    if table.column_index(columns::FREQ).is_none() {
        table.rename_column(columns::FREQ_ALIAS, columns::FREQ);
    }

    let duplicates_removed = table.dedup_rows();
    if duplicates_removed > 0 {
        debug!("Removed {} duplicate rows", duplicates_removed);
    }

    let erp = table.column_index(columns::ERP_TOTAL);
    let ngr = table.column_index(columns::NGR);
    for row in &mut table.rows {
        if let Some(i) = erp {
            if let Some(power) = row[i].as_mut() {
                power.retain(|c| c != ',');
            }
        }
        for cell in row.iter_mut() {
            *cell = normalize_text(cell.take());
        }
        if let Some(i) = ngr {
            if let Some(value) = row[i].as_mut() {
                value.retain(|c| c != ' ');
            }
        }
    }

    let layout = Layout::resolve(&table)?;
    let mut report = CleaningReport {
        duplicates_removed,
        date_warnings: Vec::new(),
    };
    let records = table
        .rows
        .into_iter()
        .map(|row| layout.build(row, &mut report))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CleanedData { records, report })
}

/// Collapse whitespace runs, trim and upper-case. Blank text becomes `None`.
pub fn normalize_text(cell: Cell) -> Cell {
    let text = cell?;
    let collapsed = WHITESPACE_RUN.replace_all(text.trim(), " ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.to_uppercase())
    }
}

/// Parse a date using the first matching format. A trailing time part is ignored.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let token = text
        .split_whitespace()
        .next()
        .map(|t| t.split('T').next().unwrap_or(t))?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
}

fn parse_int(text: &str) -> Option<i64> {
    text.parse::<i64>().ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64)
    })
}

fn parse_float(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Column positions resolved once per table.
struct Layout {
    id: usize,
    ngr: usize,
    site: usize,
    site_height: usize,
    aerial_height: usize,
    power: usize,
    eid: Option<usize>,
    date: Option<usize>,
    freq: Option<usize>,
    block: Option<usize>,
    labels: Vec<(&'static str, usize)>,
    extra: Vec<(String, usize)>,
}

impl Layout {
    fn resolve(table: &Table) -> Result<Self, PipelineError> {
        let merged = Path::new(MERGED_TABLE);
        let labels: Vec<(&'static str, usize)> = columns::SERVICE_LABELS
            .iter()
            .filter_map(|c| table.column_index(c).map(|i| (*c, i)))
            .collect();

        let layout = Self {
            id: table.require_column(columns::ID, merged)?,
            ngr: table.require_column(columns::NGR, merged)?,
            site: table.require_column(columns::SITE, merged)?,
            site_height: table.require_column(columns::SITE_HEIGHT, merged)?,
            aerial_height: table.require_column(columns::AERIAL_HEIGHT, merged)?,
            power: table.require_column(columns::ERP_TOTAL, merged)?,
            eid: table.column_index(columns::EID),
            date: table.column_index(columns::DATE),
            freq: table.column_index(columns::FREQ),
            block: table.column_index(columns::BLOCK),
            labels,
            extra: Vec::new(),
        };

        let mut used: Vec<usize> = vec![
            layout.id,
            layout.ngr,
            layout.site,
            layout.site_height,
            layout.aerial_height,
            layout.power,
        ];
        used.extend([layout.eid, layout.date, layout.freq, layout.block].into_iter().flatten());
        used.extend(layout.labels.iter().map(|(_, i)| *i));

        let extra = table
            .headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !used.contains(i))
            .map(|(i, h)| (h.clone(), i))
            .collect();

        Ok(Self { extra, ..layout })
    }

    fn build(
        &self,
        row: Vec<Cell>,
        report: &mut CleaningReport,
    ) -> Result<CleanedRecord, PipelineError> {
        let text = |i: usize| row[i].clone();
        let optional = |i: Option<usize>| i.and_then(|i| row[i].clone());

        let id = text(self.id).ok_or_else(|| PipelineError::Parse {
            file: MERGED_TABLE.into(),
            message: format!("a row has no '{}'", columns::ID),
        })?;

        let required_int = |i: usize, column: &str| -> Result<i64, PipelineError> {
            let value = row[i].as_deref().ok_or_else(|| PipelineError::MissingNumeric {
                id: id.clone(),
                column: column.to_string(),
            })?;
            parse_int(value).ok_or_else(|| PipelineError::InvalidNumeric {
                id: id.clone(),
                column: column.to_string(),
                value: value.to_string(),
            })
        };
        let site_height = required_int(self.site_height, columns::SITE_HEIGHT)?;
        let aerial_height = required_int(self.aerial_height, columns::AERIAL_HEIGHT)?;

        let power_text = row[self.power]
            .as_deref()
            .ok_or_else(|| PipelineError::MissingNumeric {
                id: id.clone(),
                column: columns::ERP_TOTAL.to_string(),
            })?;
        let power = parse_float(power_text).ok_or_else(|| PipelineError::InvalidNumeric {
            id: id.clone(),
            column: columns::ERP_TOTAL.to_string(),
            value: power_text.to_string(),
        })?;

        let freq = match optional(self.freq) {
            Some(value) => Some(parse_float(&value).ok_or_else(|| PipelineError::InvalidNumeric {
                id: id.clone(),
                column: columns::FREQ.to_string(),
                value: value.clone(),
            })?),
            None => None,
        };

        let date = match optional(self.date) {
            Some(value) => {
                let parsed = parse_date(&value);
                if parsed.is_none() {
                    warn!("Record {}: unparseable date '{}', leaving it unset", id, value);
                    report.date_warnings.push(DateWarning {
                        id: id.clone(),
                        value,
                    });
                }
                parsed
            }
            None => None,
        };

        let mut service_labels = ServiceLabels::default();
        for (column, i) in &self.labels {
            if let Some(slot) = service_labels.slot_mut(column) {
                *slot = row[*i].clone();
            }
        }

        let extra: BTreeMap<String, Cell> = self
            .extra
            .iter()
            .map(|(name, i)| (name.clone(), row[*i].clone()))
            .collect();

        Ok(CleanedRecord {
            ngr: text(self.ngr),
            site: text(self.site),
            site_height,
            aerial_height,
            power,
            eid: optional(self.eid),
            date,
            freq,
            block: optional(self.block),
            service_labels,
            extra,
            id,
        })
    }
}

#[cfg(test)]
#[path = "cleaning_tests.rs"]
mod cleaning_tests;
