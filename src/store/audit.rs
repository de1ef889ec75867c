/// Append-only resolution log backed by the `resolution_log` table
use crate::{
    error::ResolverResult,
    resolver::{AuditSink, ResolutionLogEntry},
};
use async_trait::async_trait;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct SqliteAuditLog {
    db: SqlitePool,
}

impl SqliteAuditLog {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditSink for SqliteAuditLog {
    async fn append(&self, entry: ResolutionLogEntry) -> ResolverResult<()> {
        sqlx::query(
            r#"
            INSERT INTO resolution_log
                (doi, action, detail, user_agent, ip_address, referrer,
                 response_time_ms, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&entry.doi)
        .bind(&entry.action)
        .bind(&entry.detail)
        .bind(&entry.user_agent)
        .bind(&entry.ip_address)
        .bind(&entry.referrer)
        .bind(entry.response_time_ms)
        .bind(entry.created_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures;
    use chrono::Utc;
    use sqlx::Row;

    #[tokio::test]
    async fn test_append_persists_entry() {
        let db = fixtures::memory_db().await;
        let log = SqliteAuditLog::new(db.clone());

        log.append(ResolutionLogEntry {
            doi: Some("edtechid.journal/1".to_string()),
            action: ResolutionLogEntry::ACTION_RESOLVE.to_string(),
            detail: "Success: redirect".to_string(),
            user_agent: Some("curl/8.0".to_string()),
            ip_address: Some("203.0.113.7".to_string()),
            referrer: None,
            response_time_ms: 3,
            created_at: Utc::now(),
        })
        .await
        .unwrap();

        let row =
            sqlx::query("SELECT doi, action, detail, user_agent, referrer FROM resolution_log")
                .fetch_one(&db)
                .await
                .unwrap();
        assert_eq!(row.get::<String, _>("doi"), "edtechid.journal/1");
        assert_eq!(row.get::<String, _>("action"), "resolve");
        assert_eq!(row.get::<String, _>("detail"), "Success: redirect");
        assert_eq!(row.get::<String, _>("user_agent"), "curl/8.0");
        assert!(row.get::<Option<String>, _>("referrer").is_none());
    }
}
