// In quilldeck/src/store/summaries.rs

use super::{parse_column, StoreError};
use crate::models::{Summary, SummaryLength};
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use uuid::Uuid;

// === Queries for the 'summaries' table ===

const SELECT_SUMMARY: &str =
    "SELECT id, document_id, content, length, keywords, created_at, updated_at FROM summaries";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Summary> {
    let length: Option<String> = row.get(3)?;
    let length = length
        .map(|raw| raw.parse::<SummaryLength>())
        .transpose()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(err)))?;

    let keywords_json: Option<String> = row.get(4)?;
    let keywords = match keywords_json {
        Some(json) if !json.is_empty() => serde_json::from_str::<Vec<String>>(&json)
            .map_err(|err| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(err)))?,
        _ => Vec::new(),
    };

    Ok(Summary {
        id: parse_column(row, 0)?,
        document_id: parse_column(row, 1)?,
        content: row.get(2)?,
        length,
        keywords,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Inserts a new summary row; keywords are stored as a JSON array.
pub fn insert(conn: &Connection, summary: &Summary) -> Result<(), StoreError> {
    let keywords_json = serde_json::to_string(&summary.keywords)?;
    conn.execute(
        "INSERT INTO summaries (id, document_id, content, length, keywords, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            summary.id.to_string(),
            summary.document_id.to_string(),
            summary.content,
            summary.length.map(|length| length.as_str()),
            keywords_json,
            summary.created_at,
            summary.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get(conn: &Connection, id: Uuid) -> Result<Option<Summary>, StoreError> {
    let summary = conn
        .query_row(
            &format!("{SELECT_SUMMARY} WHERE id = ?1"),
            params![id.to_string()],
            from_row,
        )
        .optional()?;
    Ok(summary)
}

/// Summary history for one document, oldest first.
pub fn list_by_document(conn: &Connection, document_id: Uuid) -> Result<Vec<Summary>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_SUMMARY} WHERE document_id = ?1 ORDER BY created_at ASC, rowid ASC"
    ))?;
    let summaries = stmt
        .query_map(params![document_id.to_string()], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(summaries)
}

pub fn update(conn: &Connection, summary: &Summary) -> Result<(), StoreError> {
    let keywords_json = serde_json::to_string(&summary.keywords)?;
    let changed = conn.execute(
        "UPDATE summaries SET content = ?1, keywords = ?2, updated_at = ?3 WHERE id = ?4",
        params![
            summary.content,
            keywords_json,
            summary.updated_at,
            summary.id.to_string(),
        ],
    )?;
    if changed == 0 {
        return Err(StoreError::MissingRow {
            table: "summaries",
            id: summary.id,
        });
    }
    Ok(())
}

pub fn delete(conn: &Connection, id: Uuid) -> Result<bool, StoreError> {
    let changed = conn.execute("DELETE FROM summaries WHERE id = ?1", params![id.to_string()])?;
    Ok(changed > 0)
}
