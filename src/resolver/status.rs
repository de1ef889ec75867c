/// Status dispatch
///
/// `active` passes through to content negotiation. Every other status ends
/// the resolution here, and anything unrecognised is treated as unavailable.
use crate::resolver::{IdentifierRecord, IdentifierStatus};
use axum::http::StatusCode;
use serde::Serialize;

/// Why a record cannot be served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    Withdrawn,
    Reserved,
    NotAvailable,
}

/// Terminal non-success for an existing record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unavailable {
    pub doi: String,
    pub reason: UnavailableReason,
    pub message: String,
}

impl Unavailable {
    /// Withdrawn identifiers are gone for good
    pub fn is_gone(&self) -> bool {
        self.reason == UnavailableReason::Withdrawn
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_gone() {
            StatusCode::GONE
        } else {
            StatusCode::NOT_FOUND
        }
    }
}

/// One-hop redirect to the identifier that replaced this one
///
/// The engine never follows the chain itself; callers re-resolve `location`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectInstruction {
    pub doi: String,
    pub superseded_by: String,
    pub location: String,
}

impl RedirectInstruction {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::MOVED_PERMANENTLY
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOutcome {
    /// Active: go on to negotiation and response building
    Continue,
    Unavailable(Unavailable),
    Superseded(RedirectInstruction),
}

/// State machine over `IdentifierStatus`
#[derive(Debug, Clone)]
pub struct StatusDispatcher {
    /// Base for re-resolution links, without trailing slash
    resolve_base: String,
}

impl StatusDispatcher {
    pub fn new(public_url: &str) -> Self {
        Self {
            resolve_base: format!("{}/resolve", public_url.trim_end_matches('/')),
        }
    }

    pub fn dispatch(&self, record: &IdentifierRecord) -> StatusOutcome {
        match &record.status {
            IdentifierStatus::Active => StatusOutcome::Continue,
            IdentifierStatus::Withdrawn => StatusOutcome::Unavailable(Unavailable {
                doi: record.doi.clone(),
                reason: UnavailableReason::Withdrawn,
                message: format!(
                    "Identifier {} ({}) has been withdrawn",
                    record.doi, record.title
                ),
            }),
            IdentifierStatus::Reserved => StatusOutcome::Unavailable(Unavailable {
                doi: record.doi.clone(),
                reason: UnavailableReason::Reserved,
                message: format!("Identifier {} is reserved and not yet published", record.doi),
            }),
            IdentifierStatus::Superseded => match &record.superseded_by {
                Some(successor) => StatusOutcome::Superseded(RedirectInstruction {
                    doi: record.doi.clone(),
                    superseded_by: successor.clone(),
                    location: format!("{}/{}", self.resolve_base, successor),
                }),
                None => not_available(record),
            },
            IdentifierStatus::Unrecognized(value) => {
                tracing::warn!(
                    doi = %record.doi,
                    status = %value,
                    "unrecognized identifier status"
                );
                not_available(record)
            }
        }
    }
}

fn not_available(record: &IdentifierRecord) -> StatusOutcome {
    StatusOutcome::Unavailable(Unavailable {
        doi: record.doi.clone(),
        reason: UnavailableReason::NotAvailable,
        message: format!("Identifier {} is not available", record.doi),
    })
}
