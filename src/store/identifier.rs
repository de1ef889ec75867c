/// Identifier store backed by the `identifier` table
use crate::{
    db::models::IdentifierRow,
    error::{ResolverError, ResolverResult},
    resolver::{IdentifierRecord, IdentifierStore},
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

const IDENTIFIER_COLUMNS: &str = r#"
    i.doi, i.namespace_id, i.suffix, i.target_url, i.title, i.description,
    i.resource_type, i.status, i.superseded_by, i.version, i.is_latest_version,
    i.access_level, i.license, i.registered_at, i.updated_at,
    i.resolution_count, i.last_resolved_at
"#;

#[derive(Clone)]
pub struct SqliteIdentifierStore {
    db: SqlitePool,
}

impl SqliteIdentifierStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentifierStore for SqliteIdentifierStore {
    async fn find(
        &self,
        namespace_id: i64,
        suffix: &str,
    ) -> ResolverResult<Option<IdentifierRecord>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM identifier i
            JOIN namespace_mapping n ON n.id = i.namespace_id
            WHERE i.namespace_id = ?1 AND i.suffix = ?2 AND n.is_active = 1
            "#,
            IDENTIFIER_COLUMNS
        );

        let row = sqlx::query_as::<_, IdentifierRow>(&sql)
            .bind(namespace_id)
            .bind(suffix)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(IdentifierRecord::from))
    }

    async fn find_by_doi(&self, doi: &str) -> ResolverResult<Option<IdentifierRecord>> {
        let sql = format!("SELECT {} FROM identifier i WHERE i.doi = ?1", IDENTIFIER_COLUMNS);

        let row = sqlx::query_as::<_, IdentifierRow>(&sql)
            .bind(doi)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(IdentifierRecord::from))
    }

    async fn increment_resolution(&self, doi: &str) -> ResolverResult<()> {
        // Single statement: the count is never read back into application code
        let result = sqlx::query(
            r#"
            UPDATE identifier
            SET resolution_count = resolution_count + 1,
                last_resolved_at = ?1
            WHERE doi = ?2
            "#,
        )
        .bind(Utc::now())
        .bind(doi)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ResolverError::NotFound(format!("identifier {}", doi)));
        }

        Ok(())
    }
}
