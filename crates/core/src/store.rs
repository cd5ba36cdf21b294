use crate::error::StoreError;
use crate::models::{DocumentUnit, SearchHit, StoredDocument};
use async_trait::async_trait;
use serde::Serialize;

/// Metadata filter for document lookups. All set fields must match.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Narrow client interface to the remote embedding/vector store.
///
/// These four operations are all the core needs; the store's network and
/// storage implementation stays behind this seam.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Register a pipeline under its identity name. Re-registering an
    /// existing pipeline is a no-op on the server side.
    async fn add_pipeline(&self, name: &str) -> Result<(), StoreError>;

    /// Insert-or-update a batch of units keyed by their `id`.
    async fn upsert_documents(&self, documents: &[DocumentUnit]) -> Result<(), StoreError>;

    async fn get_documents(
        &self,
        filter: &DocumentFilter,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    async fn vector_query(
        &self,
        text: &str,
        pipeline: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, StoreError>;
}
