/// Response building for active identifiers
use crate::{
    error::ResolverResult,
    resolver::{
        AlternateUrlCatalog, IdentifierRecord, IdentifierStatus, NamespaceMapping, ResourceType,
        ResponseKind,
    },
};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

pub const HEADER_CACHE_CONTROL: &str = "cache-control";
pub const HEADER_DOI: &str = "x-doi";
pub const HEADER_RESOLUTION_COUNT: &str = "x-resolution-count";

/// Browser redirect to the target resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectResponse {
    pub url: String,
    pub cache_control: String,
    pub doi: String,
    pub resolution_count: i64,
}

impl RedirectResponse {
    /// Extra headers besides `Location`; names are lowercase
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            (HEADER_CACHE_CONTROL, self.cache_control.clone()),
            (HEADER_DOI, self.doi.clone()),
            (HEADER_RESOLUTION_COUNT, self.resolution_count.to_string()),
        ]
    }
}

/// Compact machine-readable payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPayload {
    pub doi: String,
    pub target_url: String,
    pub title: String,
    pub description: Option<String>,
    pub namespace: String,
    pub short_doi: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceBlock {
    pub long_form: String,
    pub short_form: String,
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeUrlEntry {
    pub url: String,
    pub url_type: String,
    pub mime_type: Option<String>,
    pub priority: i64,
}

/// Full metadata document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDocument {
    pub doi: String,
    pub short_doi: String,
    pub target_url: String,
    pub title: String,
    pub description: Option<String>,
    pub resource_type: ResourceType,
    pub status: IdentifierStatus,
    pub version: Option<String>,
    pub is_latest_version: bool,
    pub access_level: Option<String>,
    pub license: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolution_count: i64,
    pub last_resolved_at: Option<DateTime<Utc>>,
    pub namespace: NamespaceBlock,
    pub alternative_urls: Vec<AlternativeUrlEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<String>,
}

/// Final representation of a successfully resolved identifier
#[derive(Debug, Clone)]
pub enum Representation {
    Redirect(RedirectResponse),
    Json {
        content_type: String,
        payload: JsonPayload,
    },
    Metadata {
        content_type: String,
        document: Box<MetadataDocument>,
    },
}

impl Representation {
    pub fn kind(&self) -> ResponseKind {
        match self {
            Representation::Redirect(_) => ResponseKind::Redirect,
            Representation::Json { .. } => ResponseKind::Json,
            Representation::Metadata { .. } => ResponseKind::Metadata,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Representation::Redirect(_) => StatusCode::FOUND,
            _ => StatusCode::OK,
        }
    }

    pub fn doi(&self) -> &str {
        match self {
            Representation::Redirect(r) => &r.doi,
            Representation::Json { payload, .. } => &payload.doi,
            Representation::Metadata { document, .. } => &document.doi,
        }
    }

    pub fn target_url(&self) -> &str {
        match self {
            Representation::Redirect(r) => &r.url,
            Representation::Json { payload, .. } => &payload.target_url,
            Representation::Metadata { document, .. } => &document.target_url,
        }
    }
}

/// Assembles redirect, JSON and metadata representations
#[derive(Clone)]
pub struct ResponseBuilder {
    catalog: Arc<dyn AlternateUrlCatalog>,
    cache_max_age: u64,
    compact_media_type: String,
    metadata_media_type: String,
}

impl ResponseBuilder {
    pub fn new(
        catalog: Arc<dyn AlternateUrlCatalog>,
        cache_max_age: u64,
        compact_media_type: String,
        metadata_media_type: String,
    ) -> Self {
        Self {
            catalog,
            cache_max_age,
            compact_media_type,
            metadata_media_type,
        }
    }

    /// `resolution_count` is the count to report, already including this resolution
    pub async fn build(
        &self,
        kind: ResponseKind,
        record: &IdentifierRecord,
        namespace: &NamespaceMapping,
        resolution_count: i64,
    ) -> ResolverResult<Representation> {
        let short_doi = format!("{}/{}", namespace.short_form, record.suffix);

        let representation = match kind {
            ResponseKind::Redirect => Representation::Redirect(RedirectResponse {
                url: record.target_url.clone(),
                cache_control: format!("max-age={}", self.cache_max_age),
                doi: record.doi.clone(),
                resolution_count,
            }),
            ResponseKind::Json => Representation::Json {
                content_type: self.compact_media_type.clone(),
                payload: JsonPayload {
                    doi: record.doi.clone(),
                    target_url: record.target_url.clone(),
                    title: record.title.clone(),
                    description: record.description.clone(),
                    namespace: namespace.long_form.clone(),
                    short_doi,
                },
            },
            ResponseKind::Metadata => {
                let alternative_urls = self
                    .catalog
                    .list_for(&record.doi)
                    .await?
                    .into_iter()
                    .filter(|alt| alt.is_active)
                    .map(|alt| AlternativeUrlEntry {
                        url: alt.url,
                        url_type: alt.url_type,
                        mime_type: alt.mime_type,
                        priority: alt.priority,
                    })
                    .collect();

                Representation::Metadata {
                    content_type: self.metadata_media_type.clone(),
                    document: Box::new(MetadataDocument {
                        doi: record.doi.clone(),
                        short_doi,
                        target_url: record.target_url.clone(),
                        title: record.title.clone(),
                        description: record.description.clone(),
                        resource_type: record.resource_type,
                        status: record.status.clone(),
                        version: record.version.clone(),
                        is_latest_version: record.is_latest_version,
                        access_level: record.access_level.clone(),
                        license: record.license.clone(),
                        registered_at: record.registered_at,
                        updated_at: record.updated_at,
                        resolution_count,
                        last_resolved_at: record.last_resolved_at,
                        namespace: NamespaceBlock {
                            long_form: namespace.long_form.clone(),
                            short_form: namespace.short_form.clone(),
                            category: namespace.category.clone(),
                            description: namespace.description.clone(),
                        },
                        alternative_urls,
                        superseded_by: record.superseded_by.clone(),
                    }),
                }
            }
        };

        Ok(representation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{IdentifierStore, NamespaceDirectory};
    use crate::store::{
        fixtures, SqliteAlternateUrlCatalog, SqliteIdentifierStore, SqliteNamespaceDirectory,
    };

    async fn setup() -> (ResponseBuilder, IdentifierRecord, NamespaceMapping) {
        let db = fixtures::memory_db().await;
        let ns = fixtures::insert_namespace(&db, "edtechid.journal", "ej", true).await;
        let doi = fixtures::insert_identifier(
            &db,
            ns,
            "edtechid.journal",
            "2025.0001",
            "https://example.com/paper1",
            "active",
            None,
        )
        .await;
        fixtures::insert_alternate(&db, &doi, "https://cdn.example.com/p1.pdf", 2, true).await;
        fixtures::insert_alternate(&db, &doi, "https://mirror.example.com/p1", 1, true).await;

        let record = SqliteIdentifierStore::new(db.clone())
            .find_by_doi(&doi)
            .await
            .unwrap()
            .unwrap();
        let namespace = SqliteNamespaceDirectory::new(db.clone())
            .find("ej")
            .await
            .unwrap()
            .unwrap();
        let builder = ResponseBuilder::new(
            Arc::new(SqliteAlternateUrlCatalog::new(db)),
            3600,
            "application/vnd.edtechid.compact+json".to_string(),
            "application/vnd.edtechid+json".to_string(),
        );
        (builder, record, namespace)
    }

    #[tokio::test]
    async fn test_redirect_headers() {
        let (builder, record, namespace) = setup().await;
        let rep = builder
            .build(ResponseKind::Redirect, &record, &namespace, 7)
            .await
            .unwrap();

        assert_eq!(rep.status_code(), StatusCode::FOUND);
        let Representation::Redirect(redirect) = rep else {
            panic!("expected redirect");
        };
        assert_eq!(redirect.url, "https://example.com/paper1");
        let headers = redirect.headers();
        assert!(headers.contains(&(HEADER_CACHE_CONTROL, "max-age=3600".to_string())));
        assert!(headers.contains(&(HEADER_DOI, "edtechid.journal/2025.0001".to_string())));
        assert!(headers.contains(&(HEADER_RESOLUTION_COUNT, "7".to_string())));
    }

    #[tokio::test]
    async fn test_json_payload() {
        let (builder, record, namespace) = setup().await;
        let rep = builder
            .build(ResponseKind::Json, &record, &namespace, 1)
            .await
            .unwrap();

        let Representation::Json { content_type, payload } = rep else {
            panic!("expected json");
        };
        assert_eq!(content_type, "application/vnd.edtechid.compact+json");
        assert_ne!(content_type, "application/json");
        assert_eq!(payload.namespace, "edtechid.journal");
        assert_eq!(payload.short_doi, "ej/2025.0001");

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["targetUrl"], "https://example.com/paper1");
    }

    #[tokio::test]
    async fn test_metadata_document() {
        let (builder, record, namespace) = setup().await;
        let rep = builder
            .build(ResponseKind::Metadata, &record, &namespace, 1)
            .await
            .unwrap();

        let Representation::Metadata { content_type, document } = rep else {
            panic!("expected metadata");
        };
        assert_eq!(content_type, "application/vnd.edtechid+json");

        let value = serde_json::to_value(&*document).unwrap();
        assert_eq!(value["namespace"]["shortForm"], "ej");
        assert_eq!(value["license"], "CC-BY-4.0");
        assert_eq!(value["resourceType"], "journal_article");
        assert_eq!(value["alternativeUrls"][0]["url"], "https://mirror.example.com/p1");
        assert_eq!(value["alternativeUrls"][1]["priority"], 2);
        assert!(value.get("supersededBy").is_none());
    }
}
