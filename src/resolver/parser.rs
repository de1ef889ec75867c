/// Identifier parsing and namespace normalization
///
/// Accepts whatever a user pastes (bare identifiers, resolver links, legacy
/// numeric prefixes) and produces a `(namespace token, suffix)` pair. Rules are
/// tried in a fixed order and the first matching rule wins.
use crate::error::{ResolverError, ResolverResult};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;

lazy_static! {
    /// scheme://host followed by the path remainder
    static ref URL_PATTERN: Regex =
        Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^/?#]*(.*)$").unwrap();

    static ref SHORT_FORM: Regex = Regex::new(r"^([a-z]{1,3})/(.+)$").unwrap();

    static ref LEGACY_NUMERIC: Regex = Regex::new(r"^(\d+\.\d+)/(.+)$").unwrap();

    static ref FLEXIBLE: Regex = Regex::new(r"^([A-Za-z0-9._]+)/(.+)$").unwrap();
}

/// Route segments stripped from the path of pasted resolver links
const ROUTE_PREFIXES: [&str; 2] = ["api/resolve/", "resolve/"];

/// Which rule recognised the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    Long,
    Short,
    Legacy,
    Flexible,
}

impl FormKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::Long => "long",
            FormKind::Short => "short",
            FormKind::Legacy => "legacy",
            FormKind::Flexible => "flexible",
        }
    }
}

/// Normalized identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedIdentifier {
    pub namespace_token: String,
    /// Case-sensitive, surrounding slashes removed
    pub suffix: String,
    pub form: FormKind,
}

/// Why an input could not be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("invalid format")]
    InvalidFormat,

    #[error("invalid format: empty suffix")]
    EmptySuffix,
}

/// Parser bound to one canonical namespace prefix
#[derive(Debug, Clone)]
pub struct IdentifierParser {
    /// Prefix literal including the trailing dot, e.g. `edtechid.`
    prefix: String,
    long_form: Regex,
}

impl IdentifierParser {
    /// Build a parser for `canonical_prefix` (with or without trailing dot)
    pub fn new(canonical_prefix: &str) -> ResolverResult<Self> {
        let bare = canonical_prefix.trim().trim_end_matches('.');
        if bare.is_empty() {
            return Err(ResolverError::Config(
                "Canonical prefix cannot be empty".to_string(),
            ));
        }

        let long_form = Regex::new(&format!(
            r"^({}\.[A-Za-z0-9_]+)/(.+)$",
            regex::escape(bare)
        ))
        .map_err(|e| ResolverError::Config(format!("Invalid canonical prefix: {}", e)))?;

        Ok(Self {
            prefix: format!("{}.", bare),
            long_form,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Parse raw user input
    pub fn parse(&self, raw: &str) -> Result<ParsedIdentifier, ParseFailure> {
        let input = strip_url(raw.trim());
        let input = input.trim_start_matches('/');

        if input.is_empty() {
            return Err(ParseFailure::InvalidFormat);
        }

        if let Some((token, suffix)) = captures(&self.long_form, input) {
            return finish(token.to_string(), suffix, FormKind::Long);
        }

        if let Some((token, suffix)) = captures(&SHORT_FORM, input) {
            return finish(token.to_string(), suffix, FormKind::Short);
        }

        if let Some((digits, suffix)) = captures(&LEGACY_NUMERIC, input) {
            return finish(format!("{}{}", self.prefix, digits), suffix, FormKind::Legacy);
        }

        if let Some((token, suffix)) = captures(&FLEXIBLE, input) {
            let token = if token.starts_with(&self.prefix) {
                token.to_string()
            } else {
                format!("{}{}", self.prefix, token)
            };
            return finish(token, suffix, FormKind::Flexible);
        }

        Err(ParseFailure::InvalidFormat)
    }
}

/// Reduce a full URL to its decoded path, minus any resolver route segment.
/// Input that is not a URL passes through untouched.
fn strip_url(input: &str) -> Cow<'_, str> {
    let Some(caps) = URL_PATTERN.captures(input) else {
        return Cow::Borrowed(input);
    };

    let path = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let path = path.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
    let path = path.trim_start_matches('/');
    let path = ROUTE_PREFIXES
        .iter()
        .find_map(|route| path.strip_prefix(route))
        .unwrap_or(path);

    match urlencoding::decode(path) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(_) => Cow::Owned(path.to_string()),
    }
}

fn captures<'a>(pattern: &Regex, input: &'a str) -> Option<(&'a str, &'a str)> {
    let caps = pattern.captures(input)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

fn finish(
    namespace_token: String,
    suffix: &str,
    form: FormKind,
) -> Result<ParsedIdentifier, ParseFailure> {
    let suffix = suffix.trim_matches('/');
    if suffix.is_empty() {
        return Err(ParseFailure::EmptySuffix);
    }

    Ok(ParsedIdentifier {
        namespace_token,
        suffix: suffix.to_string(),
        form,
    })
}
