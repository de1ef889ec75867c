/// Row types as stored in SQLite
///
/// Status and resource type stay as open strings here; the conversions into
/// the resolver's domain types decide how unknown values are treated.
use crate::resolver::{
    AlternateUrl, IdentifierRecord, IdentifierStatus, NamespaceMapping, ResourceType,
};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Namespace mapping row
#[derive(Debug, Clone, FromRow)]
pub struct NamespaceRow {
    pub id: i64,
    pub long_form: String,
    pub short_form: String,
    pub category: String,
    pub description: String,
    pub is_active: bool,
}

impl From<NamespaceRow> for NamespaceMapping {
    fn from(row: NamespaceRow) -> Self {
        NamespaceMapping {
            id: row.id,
            long_form: row.long_form,
            short_form: row.short_form,
            category: row.category,
            description: row.description,
            is_active: row.is_active,
        }
    }
}

/// Identifier row
#[derive(Debug, Clone, FromRow)]
pub struct IdentifierRow {
    pub doi: String,
    pub namespace_id: i64,
    pub suffix: String,
    pub target_url: String,
    pub title: String,
    pub description: Option<String>,
    pub resource_type: String,
    pub status: String,
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

impl From<IdentifierRow> for IdentifierRecord {
    fn from(row: IdentifierRow) -> Self {
        IdentifierRecord {
            doi: row.doi,
            namespace_id: row.namespace_id,
            suffix: row.suffix,
            target_url: row.target_url,
            title: row.title,
            description: row.description,
            resource_type: ResourceType::from_db(&row.resource_type),
            status: IdentifierStatus::from_db(&row.status),
            superseded_by: row.superseded_by.filter(|s| !s.trim().is_empty()),
            version: row.version,
            is_latest_version: row.is_latest_version,
            access_level: row.access_level,
            license: row.license,
            registered_at: row.registered_at,
            updated_at: row.updated_at,
            resolution_count: row.resolution_count,
            last_resolved_at: row.last_resolved_at,
        }
    }
}

/// Alternate URL row
#[derive(Debug, Clone, FromRow)]
pub struct AlternateUrlRow {
    pub doi: String,
    pub url: String,
    pub url_type: String,
    pub mime_type: Option<String>,
    pub priority: i64,
    pub is_active: bool,
}

impl From<AlternateUrlRow> for AlternateUrl {
    fn from(row: AlternateUrlRow) -> Self {
        AlternateUrl {
            doi: row.doi,
            url: row.url,
            url_type: row.url_type,
            mime_type: row.mime_type,
            priority: row.priority,
            is_active: row.is_active,
        }
    }
}
