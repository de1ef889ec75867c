/// Identifier Resolution Engine
///
/// Turns arbitrary `namespace/suffix` input into a redirect, JSON or metadata
/// response. The pipeline is parse -> namespace -> record -> status ->
/// negotiate -> build, with every attempt recorded in the audit log.

pub mod engine;
pub mod lookup;
pub mod namespace;
pub mod negotiate;
pub mod parser;
pub mod recorder;
pub mod response;
pub mod status;

pub use engine::{ResolutionEngine, ResolveOutcome};
pub use negotiate::{ContentNegotiator, ResponseKind};
pub use parser::{FormKind, IdentifierParser, ParseFailure, ParsedIdentifier};
pub use response::{Representation, ResponseBuilder};
pub use status::{StatusDispatcher, StatusOutcome};

use crate::error::ResolverResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// A registered namespace: canonical dotted token plus short alias
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceMapping {
    pub id: i64,
    pub long_form: String,
    pub short_form: String,
    pub category: String,
    pub description: String,
    pub is_active: bool,
}

/// Kind of resource an identifier points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    JournalArticle,
    Dataset,
    CourseModule,
    EducationalMaterial,
    Person,
    Other,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::JournalArticle => "journal_article",
            ResourceType::Dataset => "dataset",
            ResourceType::CourseModule => "course_module",
            ResourceType::EducationalMaterial => "educational_material",
            ResourceType::Person => "person",
            ResourceType::Other => "other",
        }
    }

    /// Unknown stored values collapse to `Other`
    pub fn from_db(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "journal_article" => ResourceType::JournalArticle,
            "dataset" => ResourceType::Dataset,
            "course_module" => ResourceType::CourseModule,
            "educational_material" => ResourceType::EducationalMaterial,
            "person" => ResourceType::Person,
            _ => ResourceType::Other,
        }
    }
}

/// Lifecycle status of an identifier
///
/// Stored as free text; anything outside the known set is kept verbatim in
/// `Unrecognized` so the dispatcher can fail it safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierStatus {
    Active,
    Reserved,
    Withdrawn,
    Superseded,
    Unrecognized(String),
}

impl IdentifierStatus {
    pub fn as_str(&self) -> &str {
        match self {
            IdentifierStatus::Active => "active",
            IdentifierStatus::Reserved => "reserved",
            IdentifierStatus::Withdrawn => "withdrawn",
            IdentifierStatus::Superseded => "superseded",
            IdentifierStatus::Unrecognized(other) => other,
        }
    }

    pub fn from_db(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "active" => IdentifierStatus::Active,
            "reserved" => IdentifierStatus::Reserved,
            "withdrawn" => IdentifierStatus::Withdrawn,
            "superseded" => IdentifierStatus::Superseded,
            _ => IdentifierStatus::Unrecognized(s.to_string()),
        }
    }
}

impl Serialize for IdentifierStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A registered identifier
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierRecord {
    pub doi: String,
    pub namespace_id: i64,
    pub suffix: String,
    pub target_url: String,
    pub title: String,
    pub description: Option<String>,
    pub resource_type: ResourceType,
    pub status: IdentifierStatus,
    pub superseded_by: Option<String>,
    pub version: Option<String>,
    pub is_latest_version: bool,
    pub access_level: Option<String>,
    pub license: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolution_count: i64,
    pub last_resolved_at: Option<DateTime<Utc>>,
}

/// Alternative representation of a resolved identifier
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternateUrl {
    pub doi: String,
    pub url: String,
    pub url_type: String,
    pub mime_type: Option<String>,
    pub priority: i64,
    pub is_active: bool,
}

/// One audit record per resolution attempt
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionLogEntry {
    /// Resolved DOI when known, otherwise the raw input
    pub doi: Option<String>,
    pub action: String,
    pub detail: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub referrer: Option<String>,
    pub response_time_ms: i64,
    pub created_at: DateTime<Utc>,
}

impl ResolutionLogEntry {
    pub const ACTION_RESOLVE: &'static str = "resolve";
}

/// Caller details copied into the audit log
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub referrer: Option<String>,
}

/// Lookup of active namespace mappings
#[async_trait]
pub trait NamespaceDirectory: Send + Sync {
    /// Find the active mapping whose long form or short form equals `token`
    async fn find(&self, token: &str) -> ResolverResult<Option<NamespaceMapping>>;

    /// All active mappings, ordered by long form
    async fn list_active(&self) -> ResolverResult<Vec<NamespaceMapping>>;
}

/// Identifier storage
#[async_trait]
pub trait IdentifierStore: Send + Sync {
    /// Find by owning namespace and suffix, restricted to active namespaces
    async fn find(&self, namespace_id: i64, suffix: &str)
        -> ResolverResult<Option<IdentifierRecord>>;

    async fn find_by_doi(&self, doi: &str) -> ResolverResult<Option<IdentifierRecord>>;

    /// Atomically bump `resolution_count` and set `last_resolved_at`
    async fn increment_resolution(&self, doi: &str) -> ResolverResult<()>;
}

/// Ordered catalog of alternative URLs
#[async_trait]
pub trait AlternateUrlCatalog: Send + Sync {
    /// Active entries for `doi`, ascending by priority
    async fn list_for(&self, doi: &str) -> ResolverResult<Vec<AlternateUrl>>;
}

/// Append-only sink for resolution events
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: ResolutionLogEntry) -> ResolverResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_known_values() {
        for s in ["active", "reserved", "withdrawn", "superseded"] {
            assert_eq!(IdentifierStatus::from_db(s).as_str(), s);
        }
        assert_eq!(IdentifierStatus::from_db(" Withdrawn "), IdentifierStatus::Withdrawn);
    }

    #[test]
    fn test_unknown_status_is_kept_verbatim() {
        let status = IdentifierStatus::from_db("embargoed");
        assert_eq!(status, IdentifierStatus::Unrecognized("embargoed".to_string()));
        assert_eq!(serde_json::to_value(&status).unwrap(), "embargoed");
    }

    #[test]
    fn test_unknown_resource_type_is_other() {
        assert_eq!(ResourceType::from_db("podcast"), ResourceType::Other);
        assert_eq!(ResourceType::from_db("dataset"), ResourceType::Dataset);
    }
}
