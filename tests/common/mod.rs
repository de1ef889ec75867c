//! Shared setup for integration tests: an on-disk SQLite database in a
//! temporary directory, seeded with a couple of namespaces and identifiers.
#![allow(dead_code)]

use chrono::Utc;
use edtechid_resolver::{
    config::{LoggingConfig, ResolverConfig, ServerConfig, ServiceConfig, StorageConfig},
    context::AppContext,
    db::{self, DatabaseOptions},
};
use sqlx::SqlitePool;
use tempfile::TempDir;

pub const PUBLIC_URL: &str = "https://id.example.org";
pub const PAPER_DOI: &str = "edtechid.journal/2025.0001";
pub const PAPER_URL: &str = "https://example.com/paper1";
pub const WITHDRAWN_DOI: &str = "edtechid.journal/2024.0099";
pub const OLD_DOI: &str = "edtechid.journal/2023.0001";
pub const RESERVED_DOI: &str = "edtechid.course/intro-101";

/// Keeps the temporary directory alive as long as the context
pub struct TestEnv {
    pub ctx: AppContext,
    pub db: SqlitePool,
    _dir: TempDir,
}

pub fn test_config(dir: &TempDir) -> ServerConfig {
    ServerConfig {
        service: ServiceConfig {
            hostname: "127.0.0.1".to_string(),
            port: 8080,
            public_url: PUBLIC_URL.to_string(),
            version: "test".to_string(),
        },
        storage: StorageConfig {
            data_directory: dir.path().to_path_buf(),
            database: dir.path().join("resolver.sqlite"),
            max_connections: 8,
        },
        resolver: ResolverConfig {
            storage_timeout_ms: 10_000,
            ..ResolverConfig::default()
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "text".to_string(),
        },
    }
}

pub async fn setup() -> TestEnv {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);

    let pool = db::create_pool(
        &config.storage.database,
        DatabaseOptions {
            max_connections: config.storage.max_connections,
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let ctx = AppContext::with_pool(config, pool.clone()).await.unwrap();
    seed(&pool).await;

    TestEnv {
        ctx,
        db: pool,
        _dir: dir,
    }
}

async fn seed(db: &SqlitePool) {
    let journal = insert_namespace(db, "edtechid.journal", "ej", "journal").await;
    let course = insert_namespace(db, "edtechid.course", "ec", "course").await;
    insert_namespace_inactive(db, "edtechid.retired", "er").await;

    insert_identifier(db, journal, "2025.0001", PAPER_URL, "active", None).await;
    insert_identifier(db, journal, "2024.0099", "https://example.com/gone", "withdrawn", None)
        .await;
    insert_identifier(
        db,
        journal,
        "2023.0001",
        "https://example.com/old",
        "superseded",
        Some(PAPER_DOI),
    )
    .await;
    insert_identifier(db, course, "intro-101", "https://example.com/course", "reserved", None)
        .await;

    sqlx::query(
        r#"
        INSERT INTO alternate_url (doi, url, url_type, mime_type, priority, is_active)
        VALUES (?1, 'https://cdn.example.com/paper1.pdf', 'pdf', 'application/pdf', 1, 1)
        "#,
    )
    .bind(PAPER_DOI)
    .execute(db)
    .await
    .unwrap();
}

async fn insert_namespace(
    db: &SqlitePool,
    long_form: &str,
    short_form: &str,
    category: &str,
) -> i64 {
    sqlx::query(
        r#"
        INSERT INTO namespace_mapping (long_form, short_form, category, description, is_active)
        VALUES (?1, ?2, ?3, 'Seeded namespace', 1)
        "#,
    )
    .bind(long_form)
    .bind(short_form)
    .bind(category)
    .execute(db)
    .await
    .unwrap()
    .last_insert_rowid()
}

async fn insert_namespace_inactive(db: &SqlitePool, long_form: &str, short_form: &str) {
    sqlx::query(
        r#"
        INSERT INTO namespace_mapping (long_form, short_form, category, description, is_active)
        VALUES (?1, ?2, 'journal', 'Retired namespace', 0)
        "#,
    )
    .bind(long_form)
    .bind(short_form)
    .execute(db)
    .await
    .unwrap();
}

async fn insert_identifier(
    db: &SqlitePool,
    namespace_id: i64,
    suffix: &str,
    target_url: &str,
    status: &str,
    superseded_by: Option<&str>,
) {
    let long_form: String =
        sqlx::query_scalar("SELECT long_form FROM namespace_mapping WHERE id = ?1")
            .bind(namespace_id)
            .fetch_one(db)
            .await
            .unwrap();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO identifier (
            doi, namespace_id, suffix, target_url, title, description, resource_type,
            status, superseded_by, version, is_latest_version, access_level, license,
            registered_at, updated_at
        )
        VALUES (?1, ?2, ?3, ?4, 'Seeded resource', NULL, 'journal_article',
                ?5, ?6, '1.0', 1, 'open', 'CC-BY-4.0', ?7, ?7)
        "#,
    )
    .bind(format!("{}/{}", long_form, suffix))
    .bind(namespace_id)
    .bind(suffix)
    .bind(target_url)
    .bind(status)
    .bind(superseded_by)
    .bind(now)
    .execute(db)
    .await
    .unwrap();
}

pub async fn resolution_count(db: &SqlitePool, doi: &str) -> i64 {
    sqlx::query_scalar("SELECT resolution_count FROM identifier WHERE doi = ?1")
        .bind(doi)
        .fetch_one(db)
        .await
        .unwrap()
}

pub async fn audit_count(db: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM resolution_log")
        .fetch_one(db)
        .await
        .unwrap()
}

pub async fn last_audit_detail(db: &SqlitePool) -> String {
    sqlx::query_scalar("SELECT detail FROM resolution_log ORDER BY id DESC LIMIT 1")
        .fetch_one(db)
        .await
        .unwrap()
}
