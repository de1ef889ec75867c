/// Content negotiation over the `Accept` header
///
/// An ordered table of predicates, first match wins. No match (including a
/// missing or empty header) means a browser-style redirect.
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Redirect,
    Json,
    Metadata,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Redirect => "redirect",
            ResponseKind::Json => "json",
            ResponseKind::Metadata => "metadata",
        }
    }
}

/// Predicate over the lowercased header value
pub type AcceptPredicate = fn(&str) -> bool;

const DEFAULT_RULES: &[(AcceptPredicate, ResponseKind)] = &[
    (accepts_plain_json, ResponseKind::Json),
    (accepts_compact, ResponseKind::Json),
    (accepts_metadata, ResponseKind::Metadata),
];

const BIBLIOGRAPHIC_TYPES: [&str; 2] = ["application/x-bibtex", "text/x-bibliography"];

fn accepts_plain_json(accept: &str) -> bool {
    accept.contains("application/json")
}

/// `application/vnd.<product>.compact+json`, echoed back by clients of the JSON kind
fn accepts_compact(accept: &str) -> bool {
    vendor_json_types(accept).any(|media_type| media_type.ends_with(".compact+json"))
}

fn vendor_json_types(accept: &str) -> impl Iterator<Item = &str> {
    accept
        .split(',')
        .map(|range| range.split(';').next().unwrap_or_default().trim())
        .filter(|media_type| {
            media_type.starts_with("application/vnd.") && media_type.ends_with("+json")
        })
}

fn accepts_metadata(accept: &str) -> bool {
    if BIBLIOGRAPHIC_TYPES.iter().any(|t| accept.contains(t)) {
        return true;
    }

    vendor_json_types(accept).next().is_some()
}

#[derive(Clone)]
pub struct ContentNegotiator {
    rules: &'static [(AcceptPredicate, ResponseKind)],
}

impl Default for ContentNegotiator {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES,
        }
    }
}

impl ContentNegotiator {
    pub fn negotiate(&self, accept: Option<&str>) -> ResponseKind {
        let accept = match accept.map(str::trim) {
            Some(value) if !value.is_empty() => value.to_ascii_lowercase(),
            _ => return ResponseKind::Redirect,
        };

        self.rules
            .iter()
            .find(|(predicate, _)| predicate(&accept))
            .map(|(_, kind)| *kind)
            .unwrap_or(ResponseKind::Redirect)
    }
}
