//! Document accessor: point lookups, listing, content updates, deletion.
//!
//! Every operation touches exactly one targeted row (or lists a group);
//! deleting a document never reaches into other documents. The document's
//! summary row disappears via schema-level cascade, not from here.

use anyhow::{bail, Result};
use sqlx::{Row, SqlitePool};

use crate::models::{now_millis, Document};

const DOCUMENT_COLUMNS: &str =
    "id, group_id, name, path, parent_path, content, is_directory, updated_at";

/// All documents in a group, unordered.
pub async fn list_documents(pool: &SqlitePool, group_id: &str) -> Result<Vec<Document>> {
    let query = format!("SELECT {} FROM documents WHERE group_id = ?", DOCUMENT_COLUMNS);
    let rows = sqlx::query(&query).bind(group_id).fetch_all(pool).await?;
    Ok(rows.iter().map(document_from_row).collect())
}

/// The single document at `path` within a group.
pub async fn get_document(pool: &SqlitePool, group_id: &str, path: &str) -> Result<Document> {
    let query = format!(
        "SELECT {} FROM documents WHERE group_id = ? AND path = ?",
        DOCUMENT_COLUMNS
    );
    let row = sqlx::query(&query)
        .bind(group_id)
        .bind(path)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(document_from_row(&row)),
        None => bail!("document not found: {}:{}", group_id, path),
    }
}

/// A document looked up by id.
pub async fn get_document_by_id(pool: &SqlitePool, id: &str) -> Result<Document> {
    let query = format!("SELECT {} FROM documents WHERE id = ?", DOCUMENT_COLUMNS);
    let row = sqlx::query(&query).bind(id).fetch_optional(pool).await?;

    match row {
        Some(row) => Ok(document_from_row(&row)),
        None => bail!("document not found: {}", id),
    }
}

/// Overwrite a document's content and bump its updated timestamp.
pub async fn update_content(pool: &SqlitePool, id: &str, content: &str) -> Result<Document> {
    let result = sqlx::query("UPDATE documents SET content = ?, updated_at = ? WHERE id = ?")
        .bind(content)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        bail!("document not found: {}", id);
    }

    get_document_by_id(pool, id).await
}

/// Remove a single document row.
pub async fn delete_document(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM documents WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        bail!("document not found: {}", id);
    }

    Ok(())
}

fn document_from_row(row: &sqlx::sqlite::SqliteRow) -> Document {
    Document {
        id: row.get("id"),
        group_id: row.get("group_id"),
        name: row.get("name"),
        path: row.get("path"),
        parent_path: row.get("parent_path"),
        content: row.get("content"),
        is_directory: row.get("is_directory"),
        updated_at: row.get("updated_at"),
    }
}
