use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use super::schema::dab_documents;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = dab_documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // checksum and timestamp are kept for auditing
pub struct DocumentRow {
    pub position: i64,
    pub document: Value,
    pub batch_checksum: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = dab_documents)]
pub struct NewDocumentRow {
    pub position: i64,
    pub document: Value,
    pub batch_checksum: String,
    pub uploaded_at: DateTime<Utc>,
}

impl NewDocumentRow {
    /// Bind parameters one row takes in an `INSERT`.
    pub const BIND_PARAMS: usize = 4;
}
