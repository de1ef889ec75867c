/// Namespace directory backed by the `namespace_mapping` table
use crate::{
    db::models::NamespaceRow,
    error::ResolverResult,
    resolver::{NamespaceDirectory, NamespaceMapping},
};
use async_trait::async_trait;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct SqliteNamespaceDirectory {
    db: SqlitePool,
}

impl SqliteNamespaceDirectory {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NamespaceDirectory for SqliteNamespaceDirectory {
    async fn find(&self, token: &str) -> ResolverResult<Option<NamespaceMapping>> {
        // Canonical matches sort first if the directory invariant is ever broken
        let rows = sqlx::query_as::<_, NamespaceRow>(
            r#"
            SELECT id, long_form, short_form, category, description, is_active
            FROM namespace_mapping
            WHERE (long_form = ?1 OR short_form = ?1) AND is_active = 1
            ORDER BY (long_form = ?1) DESC, id ASC
            LIMIT 2
            "#,
        )
        .bind(token)
        .fetch_all(&self.db)
        .await?;

        if rows.len() > 1 {
            tracing::warn!(token, "namespace token matches more than one active mapping");
        }

        Ok(rows.into_iter().next().map(NamespaceMapping::from))
    }

    async fn list_active(&self) -> ResolverResult<Vec<NamespaceMapping>> {
        let rows = sqlx::query_as::<_, NamespaceRow>(
            r#"
            SELECT id, long_form, short_form, category, description, is_active
            FROM namespace_mapping
            WHERE is_active = 1
            ORDER BY long_form ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(NamespaceMapping::from).collect())
    }
}
