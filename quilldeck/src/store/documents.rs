// In quilldeck/src/store/documents.rs

use super::{parse_column, StoreError};
use crate::models::Document;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

// === Queries for the 'documents' table ===

const SELECT_DOCUMENT: &str =
    "SELECT id, user_id, title, content, type, size, uploaded_at, processed_at FROM documents";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Document> {
    Ok(Document {
        id: parse_column(row, 0)?,
        user_id: parse_column(row, 1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        doc_type: parse_column(row, 4)?,
        size: {
            let value: i64 = row.get(5)?;
            value.max(0) as u64
        },
        uploaded_at: row.get(6)?,
        processed_at: row.get(7)?,
    })
}

/// Inserts a new document row.
pub fn insert(conn: &Connection, document: &Document) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO documents (id, user_id, title, content, type, size, uploaded_at, processed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            document.id.to_string(),
            document.user_id.to_string(),
            document.title,
            document.content,
            document.doc_type.as_str(),
            document.size as i64,
            document.uploaded_at,
            document.processed_at,
        ],
    )?;
    Ok(())
}

pub fn get(conn: &Connection, id: Uuid) -> Result<Option<Document>, StoreError> {
    let document = conn
        .query_row(
            &format!("{SELECT_DOCUMENT} WHERE id = ?1"),
            params![id.to_string()],
            from_row,
        )
        .optional()?;
    Ok(document)
}

/// Lists a user's documents, most recently uploaded first.
pub fn list_by_user(conn: &Connection, user_id: Uuid) -> Result<Vec<Document>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_DOCUMENT} WHERE user_id = ?1 ORDER BY uploaded_at DESC, rowid DESC"
    ))?;
    let documents = stmt
        .query_map(params![user_id.to_string()], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(documents)
}

/// Writes back the mutable fields. `id`, `user_id`, `type` and `uploaded_at` never change.
pub fn update(conn: &Connection, document: &Document) -> Result<(), StoreError> {
    let changed = conn.execute(
        "UPDATE documents SET title = ?1, content = ?2, size = ?3, processed_at = ?4 WHERE id = ?5",
        params![
            document.title,
            document.content,
            document.size as i64,
            document.processed_at,
            document.id.to_string(),
        ],
    )?;
    if changed == 0 {
        return Err(StoreError::MissingRow {
            table: "documents",
            id: document.id,
        });
    }
    Ok(())
}

pub fn delete(conn: &Connection, id: Uuid) -> Result<bool, StoreError> {
    let changed = conn.execute("DELETE FROM documents WHERE id = ?1", params![id.to_string()])?;
    Ok(changed > 0)
}
