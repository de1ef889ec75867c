/// Resolution orchestrator
///
/// Composes parser, namespace resolver, record lookup, status dispatcher,
/// content negotiator and response builder into one `resolve` call. Every
/// call writes exactly one audit entry; only active identifiers are counted.
use crate::{
    config::{ResolverConfig, ServiceConfig},
    error::{ResolverError, ResolverResult},
    metrics,
    resolver::{
        lookup::RecordLookup,
        namespace::NamespaceResolver,
        recorder::ResolutionRecorder,
        status::{RedirectInstruction, Unavailable},
        AlternateUrlCatalog, AuditSink, ContentNegotiator, IdentifierParser, IdentifierRecord,
        IdentifierStore, NamespaceDirectory, NamespaceMapping, ParseFailure, Representation,
        RequestContext, ResponseBuilder, StatusDispatcher, StatusOutcome,
    },
};
use axum::http::StatusCode;
use std::sync::Arc;
use std::time::Instant;

/// Result of a resolve call for any identifier-domain condition
#[derive(Debug, Clone)]
pub enum ResolveOutcome {
    /// Active identifier, rendered per the negotiated kind
    Resolved(Representation),
    /// Superseded identifier with a known successor
    Superseded(RedirectInstruction),
    /// Input matched no identifier pattern
    InvalidFormat(ParseFailure),
    /// No active namespace or no record
    NotFound { input: String },
    /// Record exists but is withdrawn, reserved or otherwise unavailable
    Unavailable(Unavailable),
}

impl ResolveOutcome {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ResolveOutcome::Resolved(rep) => rep.status_code(),
            ResolveOutcome::Superseded(redirect) => redirect.status_code(),
            ResolveOutcome::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            ResolveOutcome::NotFound { .. } => StatusCode::NOT_FOUND,
            ResolveOutcome::Unavailable(u) => u.status_code(),
        }
    }

    /// Label used for metrics
    pub fn label(&self) -> &'static str {
        match self {
            ResolveOutcome::Resolved(_) => "success",
            ResolveOutcome::Superseded(_) => "superseded",
            ResolveOutcome::InvalidFormat(_) => "invalid_format",
            ResolveOutcome::NotFound { .. } => "not_found",
            ResolveOutcome::Unavailable(u) if u.is_gone() => "gone",
            ResolveOutcome::Unavailable(_) => "unavailable",
        }
    }

    /// Caller-facing message for non-success outcomes
    pub fn message(&self) -> String {
        match self {
            ResolveOutcome::Resolved(rep) => format!("Resolved {}", rep.doi()),
            ResolveOutcome::Superseded(redirect) => format!(
                "Identifier {} has been superseded by {}",
                redirect.doi, redirect.superseded_by
            ),
            ResolveOutcome::InvalidFormat(_) => "Invalid identifier format".to_string(),
            ResolveOutcome::NotFound { .. } => "Identifier not found".to_string(),
            ResolveOutcome::Unavailable(u) => u.message.clone(),
        }
    }
}

/// Stateless per call; clone freely and share across tasks
#[derive(Clone)]
pub struct ResolutionEngine {
    parser: IdentifierParser,
    namespaces: NamespaceResolver,
    records: RecordLookup,
    dispatcher: StatusDispatcher,
    negotiator: ContentNegotiator,
    builder: ResponseBuilder,
    recorder: ResolutionRecorder,
}

impl ResolutionEngine {
    pub fn new(
        resolver: &ResolverConfig,
        service: &ServiceConfig,
        directory: Arc<dyn NamespaceDirectory>,
        store: Arc<dyn IdentifierStore>,
        catalog: Arc<dyn AlternateUrlCatalog>,
        audit: Arc<dyn AuditSink>,
    ) -> ResolverResult<Self> {
        Ok(Self {
            parser: IdentifierParser::new(&resolver.canonical_prefix)?,
            namespaces: NamespaceResolver::new(directory),
            records: RecordLookup::new(Arc::clone(&store)),
            dispatcher: StatusDispatcher::new(&service.public_url),
            negotiator: ContentNegotiator::default(),
            builder: ResponseBuilder::new(
                catalog,
                resolver.cache_max_age,
                resolver.compact_media_type(),
                resolver.metadata_media_type(),
            ),
            recorder: ResolutionRecorder::new(
                store,
                audit,
                resolver.storage_timeout(),
                resolver.audit_background,
            ),
        })
    }

    /// Resolve raw input end to end
    ///
    /// Identifier-domain conditions come back as `Ok(ResolveOutcome)`. `Err` is
    /// reserved for collaborator failures, after a best-effort audit entry.
    pub async fn resolve(
        &self,
        raw_input: &str,
        accept: Option<&str>,
        context: &RequestContext,
    ) -> ResolverResult<ResolveOutcome> {
        let started = Instant::now();

        let parsed = match self.parser.parse(raw_input) {
            Ok(parsed) => parsed,
            Err(failure) => {
                tracing::debug!(input = raw_input, error = %failure, "identifier parse failed");
                let outcome = ResolveOutcome::InvalidFormat(failure);
                return Ok(self
                    .finish(raw_input, "Invalid format".to_string(), outcome, context, started)
                    .await);
            }
        };

        let found = match self.find(&parsed.namespace_token, &parsed.suffix).await {
            Ok(found) => found,
            Err(e) => return Err(self.fail(raw_input, e, context, started).await),
        };

        let Some((namespace, record)) = found else {
            let outcome = ResolveOutcome::NotFound {
                input: raw_input.to_string(),
            };
            return Ok(self
                .finish(raw_input, "Not found".to_string(), outcome, context, started)
                .await);
        };

        match self.dispatcher.dispatch(&record) {
            StatusOutcome::Continue => {}
            StatusOutcome::Unavailable(unavailable) => {
                let detail = format!("Special status: {}", record.status.as_str());
                let outcome = ResolveOutcome::Unavailable(unavailable);
                return Ok(self.finish(&record.doi, detail, outcome, context, started).await);
            }
            StatusOutcome::Superseded(redirect) => {
                let detail = format!("Special status: {}", record.status.as_str());
                let outcome = ResolveOutcome::Superseded(redirect);
                return Ok(self.finish(&record.doi, detail, outcome, context, started).await);
            }
        }

        let counted = self.recorder.increment(&record.doi).await;
        let resolution_count = record.resolution_count + i64::from(counted);

        let kind = self.negotiator.negotiate(accept);
        let representation = match self
            .builder
            .build(kind, &record, &namespace, resolution_count)
            .await
        {
            Ok(representation) => representation,
            Err(e) => return Err(self.fail(&record.doi, e, context, started).await),
        };

        tracing::info!(
            doi = %record.doi,
            form = parsed.form.as_str(),
            kind = kind.as_str(),
            "identifier resolved"
        );

        let mut detail = format!("Success: {}", kind.as_str());
        if !counted {
            detail.push_str(" (stats update unconfirmed)");
        }
        let outcome = ResolveOutcome::Resolved(representation);
        Ok(self.finish(&record.doi, detail, outcome, context, started).await)
    }

    /// Usage stats lookup by full DOI
    pub async fn stats(&self, doi: &str) -> ResolverResult<Option<IdentifierRecord>> {
        self.records.find_by_doi(doi).await
    }

    pub async fn namespaces(&self) -> ResolverResult<Vec<NamespaceMapping>> {
        self.namespaces.list_active().await
    }

    async fn find(
        &self,
        token: &str,
        suffix: &str,
    ) -> ResolverResult<Option<(NamespaceMapping, IdentifierRecord)>> {
        let Some(namespace) = self.namespaces.resolve(token).await? else {
            return Ok(None);
        };

        let record = self.records.lookup(&namespace, suffix).await?;
        Ok(record.map(|record| (namespace, record)))
    }

    async fn finish(
        &self,
        doi: &str,
        detail: String,
        outcome: ResolveOutcome,
        context: &RequestContext,
        started: Instant,
    ) -> ResolveOutcome {
        self.recorder.record(doi, detail, context, started).await;

        let kind = match &outcome {
            ResolveOutcome::Resolved(rep) => rep.kind().as_str(),
            _ => "none",
        };
        metrics::record_resolution(outcome.label(), kind, started.elapsed().as_secs_f64());

        outcome
    }

    async fn fail(
        &self,
        doi: &str,
        error: ResolverError,
        context: &RequestContext,
        started: Instant,
    ) -> ResolverError {
        tracing::error!(input = doi, error = %error, "identifier resolution aborted");
        let detail = format!("Storage error: {}", error.kind());
        self.recorder.record(doi, detail, context, started).await;
        metrics::record_resolution("storage_error", "none", started.elapsed().as_secs_f64());
        error
    }
}
