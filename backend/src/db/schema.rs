//! Schema conformance for documents read back from the store.
//!
//! A retrieved document is flattened, its column set compared with
//! [`columns::OUTPUT`], and each field converted to its typed value. Failures
//! are reported as a structured [`SchemaValidationError`].

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

use super::documents::{flatten_document, STORE_METADATA_FIELDS};
use crate::models::{columns, format_number, Multiplex, MultiplexFlags, OutputRecord, ServiceLabels};
use crate::transformations::cleaning::parse_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaErrorKind {
    NotAnObject,
    UnexpectedColumnSet,
    InvalidValue,
    MultiplexConflict,
    NoMultiplex,
}

impl fmt::Display for SchemaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotAnObject => "not an object",
            Self::UnexpectedColumnSet => "unexpected column set",
            Self::InvalidValue => "invalid value",
            Self::MultiplexConflict => "multiplex conflict",
            Self::NoMultiplex => "no multiplex",
        };
        f.write_str(text)
    }
}

/// Columns expected but absent, and columns present but not expected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnDiff {
    pub missing: Vec<String>,
    pub unexpected: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("document {index}: {kind}: {detail}")]
pub struct SchemaValidationError {
    /// Position of the offending document in the batch.
    pub index: usize,
    pub kind: SchemaErrorKind,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<ColumnDiff>,
}

impl SchemaValidationError {
    fn new(index: usize, kind: SchemaErrorKind, detail: impl Into<String>) -> Self {
        Self {
            index,
            kind,
            detail: detail.into(),
            diff: None,
        }
    }

    fn invalid(index: usize, column: &str, value: &Value) -> Self {
        Self::new(
            index,
            SchemaErrorKind::InvalidValue,
            format!("column '{}' has unexpected value {}", column, value),
        )
    }
}

/// Compare a flat column set with the output contract.
pub fn check_column_set(index: usize, flat: &Map<String, Value>) -> Result<(), SchemaValidationError> {
    let expected: BTreeSet<&str> = columns::OUTPUT.iter().copied().collect();
    let actual: BTreeSet<&str> = flat.keys().map(String::as_str).collect();
    if expected == actual {
        return Ok(());
    }

    let diff = ColumnDiff {
        missing: expected.difference(&actual).map(|c| c.to_string()).collect(),
        unexpected: actual.difference(&expected).map(|c| c.to_string()).collect(),
    };
    Err(SchemaValidationError {
        detail: format!(
            "missing {:?}, unexpected {:?}",
            diff.missing, diff.unexpected
        ),
        diff: Some(diff),
        ..SchemaValidationError::new(index, SchemaErrorKind::UnexpectedColumnSet, "")
    })
}

/// Convert one stored document back into an [`OutputRecord`].
pub fn record_from_document(index: usize, document: &Value) -> Result<OutputRecord, SchemaValidationError> {
    let object = document.as_object().ok_or_else(|| {
        SchemaValidationError::new(index, SchemaErrorKind::NotAnObject, document.to_string())
    })?;

    let mut flat = flatten_document(object);
    for field in STORE_METADATA_FIELDS {
        flat.remove(field);
    }
    check_column_set(index, &flat)?;

    let fields = Fields { index, flat: &flat };

    let mut flags = MultiplexFlags::default();
    for m in Multiplex::ALL {
        flags.set(m, fields.flag(m.code())?);
    }
    if flags.active().len() > 1 {
        return Err(SchemaValidationError::new(
            index,
            SchemaErrorKind::MultiplexConflict,
            format!("record belongs to {:?}", flags.active()),
        ));
    }
    if !flags.any() {
        return Err(SchemaValidationError::new(
            index,
            SchemaErrorKind::NoMultiplex,
            "record belongs to none of C18A, C18F, C188",
        ));
    }

    let mut service_labels = ServiceLabels::default();
    for column in columns::SERVICE_LABELS {
        if let Some(slot) = service_labels.slot_mut(column) {
            *slot = fields.text(column)?;
        }
    }

    Ok(OutputRecord {
        id: fields
            .text(columns::ID)?
            .ok_or_else(|| SchemaValidationError::invalid(index, columns::ID, &Value::Null))?,
        ngr: fields.text(columns::NGR)?,
        flags,
        site: fields.text(columns::SITE)?,
        site_height: fields.integer(columns::SITE_HEIGHT)?,
        aerial_height: fields.integer(columns::AERIAL_HEIGHT_OUT)?,
        power: fields
            .float(columns::POWER_OUT)?
            .ok_or_else(|| SchemaValidationError::invalid(index, columns::POWER_OUT, &Value::Null))?,
        date: fields.date(columns::DATE)?,
        freq: fields.float(columns::FREQ)?,
        block: fields.text(columns::BLOCK)?,
        service_labels,
    })
}

/// Convert a batch, failing on the first non-conforming document.
pub fn records_from_documents(documents: &[Value]) -> Result<Vec<OutputRecord>, SchemaValidationError> {
    documents
        .iter()
        .enumerate()
        .map(|(i, d)| record_from_document(i, d))
        .collect()
}

struct Fields<'a> {
    index: usize,
    flat: &'a Map<String, Value>,
}

impl Fields<'_> {
    fn value(&self, column: &str) -> &Value {
        self.flat.get(column).unwrap_or(&Value::Null)
    }

    fn text(&self, column: &str) -> Result<Option<String>, SchemaValidationError> {
        match self.value(column) {
            Value::Null => Ok(None),
            Value::String(s) if s.is_empty() => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            Value::Number(n) => Ok(n.as_f64().map(format_number)),
            other => Err(SchemaValidationError::invalid(self.index, column, other)),
        }
    }

    fn float(&self, column: &str) -> Result<Option<f64>, SchemaValidationError> {
        match self.value(column) {
            Value::Null => Ok(None),
            Value::Number(n) => Ok(n.as_f64()),
            other => Err(SchemaValidationError::invalid(self.index, column, other)),
        }
    }

    fn integer(&self, column: &str) -> Result<i64, SchemaValidationError> {
        let value = self.value(column);
        value
            .as_i64()
            .or_else(|| value.as_f64().filter(|v| v.fract() == 0.0).map(|v| v as i64))
            .ok_or_else(|| SchemaValidationError::invalid(self.index, column, value))
    }

    fn flag(&self, column: &str) -> Result<bool, SchemaValidationError> {
        match self.value(column) {
            Value::Bool(b) => Ok(*b),
            other => Err(SchemaValidationError::invalid(self.index, column, other)),
        }
    }

    fn date(&self, column: &str) -> Result<Option<NaiveDate>, SchemaValidationError> {
        match self.value(column) {
            Value::Null => Ok(None),
            Value::String(s) => parse_date(s)
                .map(Some)
                .ok_or_else(|| SchemaValidationError::invalid(self.index, column, self.value(column))),
            other => Err(SchemaValidationError::invalid(self.index, column, other)),
        }
    }
}
