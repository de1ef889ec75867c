/// Stats & audit recording
///
/// The counter update and the audit append are two independent writes.
/// Neither one can fail a resolution: errors and timeouts are logged and
/// counted in metrics, then swallowed.
///
/// A timeout only means the write was not confirmed. Dropping the future does
/// not roll back a statement the database already accepted, so the counter
/// may still have advanced when `increment` returns `false`.
use crate::{
    error::{ResolverError, ResolverResult},
    metrics,
    resolver::{AuditSink, IdentifierStore, RequestContext, ResolutionLogEntry},
};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct ResolutionRecorder {
    store: Arc<dyn IdentifierStore>,
    audit: Arc<dyn AuditSink>,
    timeout: Duration,
    background_audit: bool,
}

impl ResolutionRecorder {
    pub fn new(
        store: Arc<dyn IdentifierStore>,
        audit: Arc<dyn AuditSink>,
        timeout: Duration,
        background_audit: bool,
    ) -> Self {
        Self {
            store,
            audit,
            timeout,
            background_audit,
        }
    }

    /// Atomic storage-side increment; `true` only when the store confirmed it
    pub async fn increment(&self, doi: &str) -> bool {
        match with_timeout(self.timeout, self.store.increment_resolution(doi)).await {
            Ok(()) => true,
            Err(e) => {
                metrics::record_stats_failure();
                tracing::warn!(doi, error = %e, "resolution counter update failed");
                false
            }
        }
    }

    /// Append one audit entry for a finished resolve call
    pub async fn record(
        &self,
        doi: &str,
        detail: String,
        context: &RequestContext,
        started: Instant,
    ) {
        let entry = ResolutionLogEntry {
            doi: Some(doi.to_string()),
            action: ResolutionLogEntry::ACTION_RESOLVE.to_string(),
            detail,
            user_agent: context.user_agent.clone(),
            ip_address: context.ip_address.clone(),
            referrer: context.referrer.clone(),
            response_time_ms: started.elapsed().as_millis() as i64,
            created_at: Utc::now(),
        };

        if self.background_audit {
            let audit = Arc::clone(&self.audit);
            let timeout = self.timeout;
            tokio::spawn(async move {
                append_entry(audit, timeout, entry).await;
            });
        } else {
            append_entry(Arc::clone(&self.audit), self.timeout, entry).await;
        }
    }
}

async fn append_entry(audit: Arc<dyn AuditSink>, timeout: Duration, entry: ResolutionLogEntry) {
    let doi = entry.doi.clone().unwrap_or_default();
    if let Err(e) = with_timeout(timeout, audit.append(entry)).await {
        metrics::record_audit_failure();
        tracing::error!(doi = %doi, error = %e, "resolution log append failed");
    }
}

async fn with_timeout<F>(timeout: Duration, fut: F) -> ResolverResult<()>
where
    F: Future<Output = ResolverResult<()>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| ResolverError::Storage(format!("timed out after {:?}", timeout)))?
}
