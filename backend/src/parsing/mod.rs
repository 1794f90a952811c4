//! Reading the raw CSV extracts.

pub mod decoder;
pub mod loader;

pub use decoder::{decode_table, DecodedTable, Encoding};
pub use loader::{load, LoadedData};
