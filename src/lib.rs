/// EdTech identifier resolver
///
/// Resolves persistent identifiers (`edtechid.journal/2025.0001`, `ej/2025.0001`,
/// pasted resolver links) to their target resources, with content negotiation
/// between browser redirects, compact JSON and full metadata documents.
pub mod api;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod metrics;
pub mod resolver;
pub mod server;
pub mod store;
