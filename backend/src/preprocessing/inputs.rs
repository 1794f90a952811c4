//! Filename check applied before any file is read.

use std::path::Path;

use crate::error::InputError;

/// Reject a selection where either file does not look like the expected extract.
///
/// Only the file name is inspected: the antenna path must mention `antenna`
/// and the params path `params`, ignoring case.
pub fn validate_input_paths(antenna: &Path, params: &Path) -> Result<(), InputError> {
    check_name(antenna, "antenna")?;
    check_name(params, "params")
}

fn check_name(path: &Path, expected: &'static str) -> Result<(), InputError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if name.contains(expected) {
        Ok(())
    } else {
        Err(InputError::WrongFile {
            expected,
            path: path.display().to_string(),
        })
    }
}
