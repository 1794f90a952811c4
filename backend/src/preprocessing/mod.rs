//! End-to-end wrangling of the two CSV extracts into output records.

pub mod inputs;
pub mod pipeline;

pub use inputs::validate_input_paths;
pub use pipeline::{PipelineReport, PipelineResult, WranglingPipeline};
