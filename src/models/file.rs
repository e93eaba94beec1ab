use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum FileKind {
    InvoicePdf,
    Pod,
    PoPdf,
    BolPdf,
    Other,
}

/// Metadata for an uploaded document scan; the bytes live in object storage.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: String,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub storage_path: String,
    pub file_kind: Option<FileKind>,
    pub created_at: DateTime<Utc>,
}
