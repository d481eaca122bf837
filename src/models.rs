//! Core data models for mdexplore.
//!
//! These types represent the users, content groups, documents, and summaries
//! persisted in SQLite. Wire representations use camelCase field names.

use serde::{Deserialize, Serialize};

/// An identity that owns content groups.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub created_at: i64,
}

/// A named collection of documents uploaded together, owned by one user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentGroup {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub created_at: i64,
}

/// A file or directory entry inside a content group.
///
/// `(group_id, path)` is unique within the store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub group_id: String,
    pub name: String,
    pub path: String,
    pub parent_path: String,
    pub content: String,
    pub is_directory: bool,
    pub updated_at: i64,
}

/// Cached AI-generated summary, at most one per document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: String,
    pub document_id: String,
    pub content: String,
    pub model: String,
    pub generated_at: i64,
}

/// File descriptor supplied when creating a content group.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFile {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub parent_path: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_directory: bool,
}

/// A content group together with the documents created alongside it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupWithDocuments {
    #[serde(flatten)]
    pub group: ContentGroup,
    pub documents: Vec<Document>,
}

/// Current unix time in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
