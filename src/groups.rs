//! Content-group writer.
//!
//! Creates a content group and its initial documents in a single SQLite
//! transaction: either the group row and every document row land together,
//! or nothing does. Also resolves the acting user by unique email.

use anyhow::{bail, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{now_millis, ContentGroup, Document, GroupWithDocuments, NewFile, User};

/// Find the user with the given email, creating the row on first use.
pub async fn ensure_user(pool: &SqlitePool, email: &str, name: Option<&str>) -> Result<User> {
    if email.trim().is_empty() {
        bail!("user email must not be empty");
    }

    if let Some(row) = sqlx::query("SELECT id, email, name, image, created_at FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?
    {
        return Ok(user_from_row(&row));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        email: email.to_string(),
        name: name.map(|n| n.to_string()),
        image: None,
        created_at: now_millis(),
    };

    sqlx::query("INSERT INTO users (id, email, name, image, created_at) VALUES (?, ?, ?, ?, ?)")
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.image)
        .bind(user.created_at)
        .execute(pool)
        .await?;

    Ok(user)
}

/// Create a content group owned by `user_id` plus one document per file.
///
/// All inserts run inside one transaction; a failure on any document
/// (for example a duplicate path within the batch) rolls back the group
/// row as well and propagates the error.
pub async fn create_group(
    pool: &SqlitePool,
    user_id: &str,
    name: &str,
    files: &[NewFile],
) -> Result<GroupWithDocuments> {
    if name.trim().is_empty() {
        bail!("content group name must not be empty");
    }

    let group = ContentGroup {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        user_id: user_id.to_string(),
        created_at: now_millis(),
    };

    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO content_groups (id, name, user_id, created_at) VALUES (?, ?, ?, ?)")
        .bind(&group.id)
        .bind(&group.name)
        .bind(&group.user_id)
        .bind(group.created_at)
        .execute(&mut *tx)
        .await?;

    let mut documents = Vec::with_capacity(files.len());
    for file in files {
        let doc = Document {
            id: Uuid::new_v4().to_string(),
            group_id: group.id.clone(),
            name: file.name.clone(),
            path: file.path.clone(),
            parent_path: file.parent_path.clone(),
            content: file.content.clone(),
            is_directory: file.is_directory,
            updated_at: now_millis(),
        };

        sqlx::query(
            r#"
            INSERT INTO documents (id, group_id, name, path, parent_path, content, is_directory, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&doc.id)
        .bind(&doc.group_id)
        .bind(&doc.name)
        .bind(&doc.path)
        .bind(&doc.parent_path)
        .bind(&doc.content)
        .bind(doc.is_directory)
        .bind(doc.updated_at)
        .execute(&mut *tx)
        .await?;

        documents.push(doc);
    }

    tx.commit().await?;

    Ok(GroupWithDocuments { group, documents })
}

/// All content groups owned by a user, newest first.
pub async fn list_groups(pool: &SqlitePool, user_id: &str) -> Result<Vec<ContentGroup>> {
    let rows = sqlx::query(
        "SELECT id, name, user_id, created_at FROM content_groups WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(group_from_row).collect())
}

/// Remove a group; its documents and their summaries go with it by cascade.
pub async fn delete_group(pool: &SqlitePool, group_id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM content_groups WHERE id = ?")
        .bind(group_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        bail!("content group not found: {}", group_id);
    }

    Ok(())
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        image: row.get("image"),
        created_at: row.get("created_at"),
    }
}

fn group_from_row(row: &sqlx::sqlite::SqliteRow) -> ContentGroup {
    ContentGroup {
        id: row.get("id"),
        name: row.get("name"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
    }
}
