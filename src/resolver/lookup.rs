/// Record lookup: joins a resolved namespace and suffix against the store
use crate::{
    error::ResolverResult,
    resolver::{IdentifierRecord, IdentifierStore, NamespaceMapping},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct RecordLookup {
    store: Arc<dyn IdentifierStore>,
}

impl RecordLookup {
    pub fn new(store: Arc<dyn IdentifierStore>) -> Self {
        Self { store }
    }

    /// Fetch the record regardless of its status; `None` means not found
    pub async fn lookup(
        &self,
        namespace: &NamespaceMapping,
        suffix: &str,
    ) -> ResolverResult<Option<IdentifierRecord>> {
        if !namespace.is_active {
            return Ok(None);
        }

        self.store.find(namespace.id, suffix).await
    }

    pub async fn find_by_doi(&self, doi: &str) -> ResolverResult<Option<IdentifierRecord>> {
        self.store.find_by_doi(doi).await
    }
}
