/// Alternate-URL catalog backed by the `alternate_url` table
use crate::{
    db::models::AlternateUrlRow,
    error::ResolverResult,
    resolver::{AlternateUrl, AlternateUrlCatalog},
};
use async_trait::async_trait;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct SqliteAlternateUrlCatalog {
    db: SqlitePool,
}

impl SqliteAlternateUrlCatalog {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AlternateUrlCatalog for SqliteAlternateUrlCatalog {
    async fn list_for(&self, doi: &str) -> ResolverResult<Vec<AlternateUrl>> {
        let rows = sqlx::query_as::<_, AlternateUrlRow>(
            r#"
            SELECT doi, url, url_type, mime_type, priority, is_active
            FROM alternate_url
            WHERE doi = ?1 AND is_active = 1
            ORDER BY priority ASC, id ASC
            "#,
        )
        .bind(doi)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(AlternateUrl::from).collect())
    }
}
