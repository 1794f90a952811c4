//! Cleaning, filtering and projection stages of the wrangling pipeline.

pub mod cleaning;
pub mod filtering;
pub mod projection;

pub use cleaning::{clean, CleanedData, CleaningReport, DateWarning};
pub use filtering::{exclude_invalid_ngrs, extract_multiplexes, INVALID_NGRS};
pub use projection::project;
