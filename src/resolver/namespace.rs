/// Namespace resolution
use crate::{
    error::ResolverResult,
    resolver::{NamespaceDirectory, NamespaceMapping},
};
use std::sync::Arc;

/// Maps a namespace token (canonical or alias) to an active mapping
#[derive(Clone)]
pub struct NamespaceResolver {
    directory: Arc<dyn NamespaceDirectory>,
}

impl NamespaceResolver {
    pub fn new(directory: Arc<dyn NamespaceDirectory>) -> Self {
        Self { directory }
    }

    /// Exact match on either form; `None` means not found
    pub async fn resolve(&self, token: &str) -> ResolverResult<Option<NamespaceMapping>> {
        let mapping = self
            .directory
            .find(token)
            .await?
            .filter(|ns| ns.is_active && (ns.long_form == token || ns.short_form == token));

        if mapping.is_none() {
            tracing::debug!(token, "namespace not found");
        }

        Ok(mapping)
    }

    pub async fn list_active(&self) -> ResolverResult<Vec<NamespaceMapping>> {
        self.directory.list_active().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{fixtures, SqliteNamespaceDirectory};

    #[tokio::test]
    async fn test_resolves_alias_and_canonical() {
        let db = fixtures::memory_db().await;
        let id = fixtures::insert_namespace(&db, "edtechid.journal", "ej", true).await;
        let resolver = NamespaceResolver::new(Arc::new(SqliteNamespaceDirectory::new(db)));

        assert_eq!(resolver.resolve("ej").await.unwrap().unwrap().id, id);
        assert_eq!(resolver.resolve("edtechid.journal").await.unwrap().unwrap().id, id);
        assert!(resolver.resolve("unknown.ns").await.unwrap().is_none());
    }
}
