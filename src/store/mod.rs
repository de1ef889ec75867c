/// SQLite implementations of the resolver's storage collaborators
///
/// One type per table, each holding a clone of the shared pool.

pub mod alternate;
pub mod audit;
pub mod identifier;
pub mod namespace;

pub use alternate::SqliteAlternateUrlCatalog;
pub use audit::SqliteAuditLog;
pub use identifier::SqliteIdentifierStore;
pub use namespace::SqliteNamespaceDirectory;
