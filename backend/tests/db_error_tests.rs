//! Tests for store error types and their context.

use dab_rust::db::repository::{
    DocumentRepository, RepositoryError, RepositoryResult, StoreContext,
};
use dab_rust::db::{DocumentError, FileRepository, LocalRepository, SchemaErrorKind};
use dab_rust::db::schema::records_from_documents;

#[test]
fn test_store_context_display() {
    let err = RepositoryError::internal("rename failed")
        .during("replace_all")
        .at("data/formatted_data.json")
        .detail("attempt 2");

    assert_eq!(
        err.context(),
        &StoreContext {
            operation: Some("replace_all".into()),
            location: Some("data/formatted_data.json".into()),
            detail: Some("attempt 2".into()),
        }
    );
    assert_eq!(
        err.to_string(),
        "store failure: rename failed (during replace_all; at data/formatted_data.json; attempt 2)"
    );
}

#[test]
fn test_empty_context_is_not_displayed() {
    let err = RepositoryError::configuration("no url");
    assert!(err.context().is_empty());
    assert_eq!(err.to_string(), "store misconfigured: no url");
}

#[test]
fn test_only_unavailable_and_flagged_queries_are_retryable() {
    assert!(RepositoryError::unavailable("down").is_retryable());
    assert!(RepositoryError::query("serialization failure", true).is_retryable());
    assert!(!RepositoryError::query("syntax error", false).is_retryable());
    assert!(!RepositoryError::corrupt("not json").is_retryable());
    assert!(!RepositoryError::internal("poisoned").is_retryable());
}

#[test]
fn test_io_error_conversion() {
    let err: RepositoryError = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow").into();
    assert!(matches!(err, RepositoryError::Unavailable { .. }));

    let err: RepositoryError = std::io::Error::other("disk").into();
    assert!(matches!(err, RepositoryError::Internal { .. }));
}

#[test]
fn test_json_error_is_corrupt_with_position() {
    let json_err = serde_json::from_str::<serde_json::Value>("[1,").unwrap_err();
    let err: RepositoryError = json_err.into();
    assert!(matches!(err, RepositoryError::Corrupt { .. }));
    assert!(err.context().detail.as_deref().unwrap_or_default().starts_with("line 1"));
}

#[tokio::test]
async fn test_corrupt_file_error_names_operation_and_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("formatted_data.json");
    std::fs::write(&path, "[{").unwrap();

    let err = FileRepository::new(&path).count().await.unwrap_err();
    assert!(matches!(err, RepositoryError::Corrupt { .. }));
    assert_eq!(err.context().operation.as_deref(), Some("count"));
    assert_eq!(err.context().location, Some(path.display().to_string()));
    assert!(err.context().detail.is_some());
}

#[tokio::test]
async fn test_closed_local_store_is_unavailable() {
    let repo = LocalRepository::new();
    repo.close().await.unwrap();
    let result: RepositoryResult<usize> = repo.count().await;
    let err = result.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(err.context().location.as_deref(), Some("memory"));
}

#[test]
fn test_schema_error_wraps_into_document_error() {
    let err = records_from_documents(&[serde_json::json!(42)]).unwrap_err();
    assert_eq!(err.kind, SchemaErrorKind::NotAnObject);
    assert_eq!(err.index, 0);

    let doc_err: DocumentError = err.into();
    assert!(matches!(doc_err, DocumentError::Schema(_)));
    assert!(doc_err.to_string().starts_with("document 0"));
}
