//! Result types returned by the analyses.

pub mod correlation;
pub mod grouped_counts;
pub mod summary;
pub mod visualisation;
