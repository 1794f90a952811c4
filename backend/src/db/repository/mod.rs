//! Store abstraction for the formatted DAB documents.
//!
//! - [`error`]: error types for store operations
//! - [`documents`]: the [`DocumentRepository`] trait
//!
//! The store is full-replace: every upload clears the collection before
//! inserting the new batch. Callers own the repository handle and close it at
//! the end of a run.

pub mod documents;
pub mod error;

pub use documents::DocumentRepository;
pub use error::{RepositoryError, RepositoryResult, StoreContext};
