use sqlx::{Row, SqlitePool};
use tempfile::TempDir;

use mdexplore::config::{Config, DbConfig, ServerConfig, UserConfig};
use mdexplore::models::NewFile;
use mdexplore::{db, documents, groups, migrate};

fn test_config(tmp: &TempDir) -> Config {
    Config {
        db: DbConfig {
            path: tmp.path().join("data").join("mdx.sqlite"),
        },
        server: ServerConfig {
            bind: "127.0.0.1:7410".to_string(),
        },
        user: UserConfig {
            email: "tester@example.com".to_string(),
            name: Some("Tester".to_string()),
        },
        summarizer: Default::default(),
        import: Default::default(),
    }
}

async fn setup_pool() -> (TempDir, SqlitePool) {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp);
    let pool = db::connect(&config).await.unwrap();
    migrate::apply_schema(&pool).await.unwrap();
    (tmp, pool)
}

fn md_file(name: &str, path: &str, content: &str) -> NewFile {
    NewFile {
        name: name.to_string(),
        path: path.to_string(),
        parent_path: String::new(),
        content: content.to_string(),
        is_directory: false,
    }
}

#[tokio::test]
async fn create_group_writes_group_and_documents() {
    let (_tmp, pool) = setup_pool().await;
    let user = groups::ensure_user(&pool, "tester@example.com", Some("Tester"))
        .await
        .unwrap();

    let files = vec![
        md_file("a.md", "/a.md", "# A"),
        md_file("b.md", "/b.md", "# B"),
    ];
    let created = groups::create_group(&pool, &user.id, "Notes", &files)
        .await
        .unwrap();

    assert_eq!(created.group.name, "Notes");
    assert_eq!(created.group.user_id, user.id);
    assert_eq!(created.documents.len(), 2);
    assert!(created.documents.iter().all(|d| d.group_id == created.group.id));

    let docs = documents::list_documents(&pool, &created.group.id)
        .await
        .unwrap();
    assert_eq!(docs.len(), 2);

    let a = documents::get_document(&pool, &created.group.id, "/a.md")
        .await
        .unwrap();
    assert_eq!(a.content, "# A");
    assert_eq!(a.name, "a.md");
}

#[tokio::test]
async fn create_group_rejects_empty_name() {
    let (_tmp, pool) = setup_pool().await;
    let user = groups::ensure_user(&pool, "tester@example.com", None)
        .await
        .unwrap();

    let err = groups::create_group(&pool, &user.id, "  ", &[])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("must not be empty"));
}

#[tokio::test]
async fn failed_document_insert_rolls_back_group() {
    let (_tmp, pool) = setup_pool().await;
    let user = groups::ensure_user(&pool, "tester@example.com", None)
        .await
        .unwrap();

    // Two files sharing a path violate the (group_id, path) unique index,
    // which must take the group row down with it.
    let files = vec![
        md_file("a.md", "/a.md", "first"),
        md_file("a2.md", "/a.md", "second"),
    ];
    let result = groups::create_group(&pool, &user.id, "Broken", &files).await;
    assert!(result.is_err());

    let group_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM content_groups")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(group_count, 0);

    let doc_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(doc_count, 0);
}

#[tokio::test]
async fn group_path_uniqueness_is_enforced() {
    let (_tmp, pool) = setup_pool().await;
    let user = groups::ensure_user(&pool, "tester@example.com", None)
        .await
        .unwrap();

    let created = groups::create_group(&pool, &user.id, "Notes", &[md_file("a.md", "/a.md", "x")])
        .await
        .unwrap();

    let result = sqlx::query(
        "INSERT INTO documents (id, group_id, name, path, parent_path, content, is_directory, updated_at) \
         VALUES ('dup', ?, 'a.md', '/a.md', '', '', 0, 0)",
    )
    .bind(&created.group.id)
    .execute(&pool)
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn list_groups_newest_first() {
    let (_tmp, pool) = setup_pool().await;
    let user = groups::ensure_user(&pool, "tester@example.com", None)
        .await
        .unwrap();

    // Explicit timestamps to make the ordering unambiguous.
    for (id, name, ts) in [("g1", "Old", 1_000), ("g2", "New", 3_000), ("g3", "Mid", 2_000)] {
        sqlx::query("INSERT INTO content_groups (id, name, user_id, created_at) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(&user.id)
            .bind(ts as i64)
            .execute(&pool)
            .await
            .unwrap();
    }

    let list = groups::list_groups(&pool, &user.id).await.unwrap();
    let names: Vec<&str> = list.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["New", "Mid", "Old"]);
}

#[tokio::test]
async fn ensure_user_is_idempotent_by_email() {
    let (_tmp, pool) = setup_pool().await;

    let first = groups::ensure_user(&pool, "tester@example.com", Some("Tester"))
        .await
        .unwrap();
    let second = groups::ensure_user(&pool, "tester@example.com", Some("Renamed"))
        .await
        .unwrap();
    assert_eq!(first.id, second.id);

    let other = groups::ensure_user(&pool, "other@example.com", None)
        .await
        .unwrap();
    assert_ne!(first.id, other.id);
}

#[tokio::test]
async fn update_content_bumps_timestamp() {
    let (_tmp, pool) = setup_pool().await;
    let user = groups::ensure_user(&pool, "tester@example.com", None)
        .await
        .unwrap();
    let created = groups::create_group(&pool, &user.id, "Notes", &[md_file("a.md", "/a.md", "old")])
        .await
        .unwrap();
    let doc = &created.documents[0];

    // Backdate so the bump is observable even within the same millisecond.
    sqlx::query("UPDATE documents SET updated_at = 0 WHERE id = ?")
        .bind(&doc.id)
        .execute(&pool)
        .await
        .unwrap();

    let updated = documents::update_content(&pool, &doc.id, "new content")
        .await
        .unwrap();
    assert_eq!(updated.content, "new content");
    assert!(updated.updated_at > 0);
}

#[tokio::test]
async fn update_missing_document_is_not_found() {
    let (_tmp, pool) = setup_pool().await;
    let err = documents::update_content(&pool, "no-such-id", "text")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn delete_missing_document_is_not_found() {
    let (_tmp, pool) = setup_pool().await;
    let err = documents::delete_document(&pool, "no-such-id")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn delete_document_removes_single_row() {
    let (_tmp, pool) = setup_pool().await;
    let user = groups::ensure_user(&pool, "tester@example.com", None)
        .await
        .unwrap();
    let created = groups::create_group(
        &pool,
        &user.id,
        "Notes",
        &[md_file("a.md", "/a.md", "a"), md_file("b.md", "/b.md", "b")],
    )
    .await
    .unwrap();

    let a = documents::get_document(&pool, &created.group.id, "/a.md")
        .await
        .unwrap();
    documents::delete_document(&pool, &a.id).await.unwrap();

    let remaining = documents::list_documents(&pool, &created.group.id)
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].path, "/b.md");
}

#[tokio::test]
async fn deleting_group_cascades_to_documents_and_summaries() {
    let (_tmp, pool) = setup_pool().await;
    let user = groups::ensure_user(&pool, "tester@example.com", None)
        .await
        .unwrap();
    let created = groups::create_group(&pool, &user.id, "Notes", &[md_file("a.md", "/a.md", "a")])
        .await
        .unwrap();
    let doc = &created.documents[0];

    sqlx::query(
        "INSERT INTO summaries (id, document_id, content, model, generated_at) VALUES ('s1', ?, 'sum', 'deepseek-chat', 0)",
    )
    .bind(&doc.id)
    .execute(&pool)
    .await
    .unwrap();

    groups::delete_group(&pool, &created.group.id).await.unwrap();

    let doc_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(doc_count, 0);

    let summary_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM summaries")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(summary_count, 0);
}

#[tokio::test]
async fn deleting_document_cascades_its_summary() {
    let (_tmp, pool) = setup_pool().await;
    let user = groups::ensure_user(&pool, "tester@example.com", None)
        .await
        .unwrap();
    let created = groups::create_group(&pool, &user.id, "Notes", &[md_file("a.md", "/a.md", "a")])
        .await
        .unwrap();
    let doc = &created.documents[0];

    sqlx::query(
        "INSERT INTO summaries (id, document_id, content, model, generated_at) VALUES ('s1', ?, 'sum', 'deepseek-chat', 0)",
    )
    .bind(&doc.id)
    .execute(&pool)
    .await
    .unwrap();

    documents::delete_document(&pool, &doc.id).await.unwrap();

    let summary_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM summaries")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(summary_count, 0);

    // The group itself is untouched.
    let row = sqlx::query("SELECT id FROM content_groups WHERE id = ?")
        .bind(&created.group.id)
        .fetch_optional(&pool)
        .await
        .unwrap();
    assert!(row.map(|r| r.get::<String, _>("id")).is_some());
}
