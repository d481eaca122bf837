//! Summary cache manager.
//!
//! Decides whether a summarization request can be served from the cached
//! row or has to go out to a provider, and persists fresh results with an
//! upsert keyed on the document id.
//!
//! Cache rule: a stored summary is served verbatim only when the request is
//! not a forced refresh **and** the stored model matches the requested one.
//! A model mismatch always regenerates, whatever the force flag says.
//!
//! There is no locking between the cache read and the upsert; two
//! concurrent refreshes for the same document may both call the provider
//! and the last writer wins. The unique index keeps the row single either
//! way.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::config::SummarizerConfig;
use crate::documents;
use crate::models::{now_millis, Summary};
use crate::provider::ProviderRegistry;

/// How many characters of source content the local fallback preview keeps.
const PREVIEW_CHARS: usize = 150;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub document_id: String,
    pub content: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub force_refresh: bool,
}

/// Response for a summarization request, cached or freshly generated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryOutcome {
    pub summary: String,
    pub cached: bool,
    pub timestamp: i64,
    pub model: String,
}

/// Serve a cached summary or generate and persist a fresh one.
pub async fn generate_summary(
    pool: &SqlitePool,
    registry: &ProviderRegistry,
    config: &SummarizerConfig,
    request: &SummaryRequest,
) -> Result<SummaryOutcome> {
    if request.document_id.trim().is_empty() {
        bail!("documentId must not be empty");
    }
    if request.content.is_empty() {
        bail!("content must not be empty");
    }

    let model = request
        .model
        .clone()
        .unwrap_or_else(|| config.default_model.clone());

    // Unknown model is a client error even when a cached row exists.
    let provider = registry.find(&model)?;

    // The document must exist before we cache anything against it.
    documents::get_document_by_id(pool, &request.document_id).await?;

    let stored = find_by_document(pool, &request.document_id).await?;

    if let Some(stored) = &stored {
        if !request.force_refresh && stored.model == model {
            return Ok(SummaryOutcome {
                summary: stored.content.clone(),
                cached: true,
                timestamp: stored.generated_at,
                model: stored.model.clone(),
            });
        }
    }

    let text = match provider.summarize(&request.content).await {
        Ok(text) => text,
        Err(e) if config.degrade_to_preview() => {
            eprintln!("summary provider failed for {}: {}", request.document_id, e);
            fallback_preview(&request.content)
        }
        Err(e) => return Err(e),
    };

    let generated_at = now_millis();
    upsert(pool, &request.document_id, &text, &model, generated_at).await?;

    Ok(SummaryOutcome {
        summary: text,
        cached: false,
        timestamp: generated_at,
        model,
    })
}

/// The stored summary for a document, or "summary not found".
pub async fn get_summary(pool: &SqlitePool, document_id: &str) -> Result<Summary> {
    match find_by_document(pool, document_id).await? {
        Some(summary) => Ok(summary),
        None => bail!("summary not found for document: {}", document_id),
    }
}

async fn find_by_document(pool: &SqlitePool, document_id: &str) -> Result<Option<Summary>> {
    let row = sqlx::query(
        "SELECT id, document_id, content, model, generated_at FROM summaries WHERE document_id = ?",
    )
    .bind(document_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| Summary {
        id: row.get("id"),
        document_id: row.get("document_id"),
        content: row.get("content"),
        model: row.get("model"),
        generated_at: row.get("generated_at"),
    }))
}

/// Insert or update the single summary row for a document.
async fn upsert(
    pool: &SqlitePool,
    document_id: &str,
    content: &str,
    model: &str,
    generated_at: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO summaries (id, document_id, content, model, generated_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(document_id) DO UPDATE SET
            content = excluded.content,
            model = excluded.model,
            generated_at = excluded.generated_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(document_id)
    .bind(content)
    .bind(model)
    .bind(generated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Local substitute used when the provider call fails under the preview
/// policy: the leading content with markdown emphasis markers stripped.
pub fn fallback_preview(content: &str) -> String {
    let preview: String = content
        .chars()
        .take(PREVIEW_CHARS)
        .filter(|c| !matches!(c, '#' | '*'))
        .collect();
    format!(
        "summary generation failed, preview: {}...",
        preview.trim_start()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_preview_strips_markers() {
        let preview = fallback_preview("# Title\n\n**bold** text");
        assert!(preview.starts_with("summary generation failed, preview: "));
        assert!(!preview.contains('#'));
        assert!(!preview.contains('*'));
        assert!(preview.contains("Title"));
        assert!(preview.contains("bold"));
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_fallback_preview_truncates() {
        let long = "x".repeat(500);
        let preview = fallback_preview(&long);
        let body = preview
            .strip_prefix("summary generation failed, preview: ")
            .unwrap()
            .strip_suffix("...")
            .unwrap();
        assert_eq!(body.chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn test_fallback_preview_multibyte_safe() {
        // Truncation counts chars, not bytes.
        let content = "日本語のドキュメント".repeat(40);
        let preview = fallback_preview(&content);
        assert!(preview.ends_with("..."));
    }
}
