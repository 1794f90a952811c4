//! CSV decoding with UTF-8 first and a Latin-1 fallback.

use std::fs;
use std::path::Path;

use csv::ReaderBuilder;
use log::{debug, warn};
use serde::Serialize;

use crate::error::PipelineError;
use crate::models::Table;

/// Text encoding a file was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Encoding {
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "latin-1")]
    Latin1,
}

#[derive(Debug, Clone)]
pub struct DecodedTable {
    pub table: Table,
    pub encoding: Encoding,
}

/// Read and parse a CSV file into a text table.
///
/// Every field is kept as text; empty fields become `None`.
pub fn decode_table(path: &Path) -> Result<DecodedTable, PipelineError> {
    let bytes = fs::read(path).map_err(|source| PipelineError::Io {
        file: path.to_path_buf(),
        source,
    })?;

    let (text, encoding) = decode_bytes(bytes);
    if encoding == Encoding::Latin1 {
        warn!(
            "{} is not valid UTF-8, decoded as Latin-1",
            path.display()
        );
    }

    let table = parse_csv(&text, path)?;
    debug!(
        "Decoded {} ({:?}): {} columns, {} rows",
        path.display(),
        encoding,
        table.headers.len(),
        table.len()
    );

    Ok(DecodedTable { table, encoding })
}

/// Decode raw bytes. Latin-1 maps every byte to the code point of the same
/// value, so the fallback cannot fail.
pub fn decode_bytes(bytes: Vec<u8>) -> (String, Encoding) {
    match String::from_utf8(bytes) {
        Ok(text) => (text, Encoding::Utf8),
        Err(err) => {
            let text = err.into_bytes().iter().map(|&b| b as char).collect();
            (text, Encoding::Latin1)
        }
    }
}

fn parse_csv(text: &str, path: &Path) -> Result<Table, PipelineError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let parse_error = |message: String| PipelineError::Parse {
        file: path.to_path_buf(),
        message,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| parse_error(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(parse_error("missing header row".to_string()));
    }

    let mut table = Table::new(headers);
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| parse_error(e.to_string()))?;
        if record.len() > table.headers.len() {
            return Err(parse_error(format!(
                "row {} has {} fields, expected at most {}",
                line + 2,
                record.len(),
                table.headers.len()
            )));
        }
        table.push_row(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        None
                    } else {
                        Some(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn test_decode_utf8() {
        let file = write_temp("id,Site\n1,Crystal Palace\n2,\n".as_bytes());
        let decoded = decode_table(file.path()).unwrap();
        assert_eq!(decoded.encoding, Encoding::Utf8);
        assert_eq!(decoded.table.headers, vec!["id", "Site"]);
        assert_eq!(decoded.table.cell(0, 1), Some("Crystal Palace"));
        assert_eq!(decoded.table.cell(1, 1), None);
    }

    #[test]
    fn test_latin1_fallback_keeps_every_byte() {
        let file = write_temp(b"id,Serv Label1\n1,Caf\xe9 FM\n");
        let decoded = decode_table(file.path()).unwrap();
        assert_eq!(decoded.encoding, Encoding::Latin1);
        assert_eq!(decoded.table.cell(0, 1), Some("Café FM"));
    }

    #[test]
    fn test_bom_is_stripped() {
        let file = write_temp("\u{feff}id,NGR\n1,TQ3\n".as_bytes());
        let decoded = decode_table(file.path()).unwrap();
        assert_eq!(decoded.table.headers[0], "id");
    }

    #[test]
    fn test_missing_file_names_the_file() {
        let err = decode_table(Path::new("/nonexistent/antenna.csv")).unwrap_err();
        assert!(err.to_string().contains("antenna.csv"));
    }

    #[test]
    fn test_overlong_row_is_a_parse_error() {
        let file = write_temp(b"id,NGR\n1,TQ3,extra\n");
        let err = decode_table(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Parse { .. }));
    }
}
