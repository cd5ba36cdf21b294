use crate::error::StoreError;
use crate::models::{DocumentUnit, SearchHit, StoredDocument};
use crate::store::{DocumentFilter, DocumentStore};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use url::Url;

/// HTTP client for the remote embedding/vector store.
///
/// Documents live in a named collection; pipelines are registered by their
/// identity string and addressed again at query time. Queries return
/// `[score, content, metadata]` triples.
pub struct HttpDocumentStore {
    client: Client,
    endpoint: String,
    collection: String,
}

impl HttpDocumentStore {
    pub fn new(endpoint: &str, collection: impl Into<String>) -> Result<Self, StoreError> {
        let parsed = Url::parse(endpoint)?;
        Ok(Self {
            client: Client::new(),
            endpoint: parsed.as_str().trim_end_matches('/').to_string(),
            collection: collection.into(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn collection_url(&self, suffix: &str) -> String {
        format!(
            "{}/collections/{}/{}",
            self.endpoint, self.collection, suffix
        )
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn add_pipeline(&self, name: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.collection_url(&format!("pipelines/{name}")))
            .json(&json!({}))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::BackendResponse {
                backend: "document-store".to_string(),
                details: response.status().to_string(),
            });
        }
        Ok(())
    }

    async fn upsert_documents(&self, documents: &[DocumentUnit]) -> Result<(), StoreError> {
        if documents.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .post(self.collection_url("documents"))
            .json(&json!({ "documents": documents }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::BackendResponse {
                backend: "document-store".to_string(),
                details: response.status().to_string(),
            });
        }
        Ok(())
    }

    async fn get_documents(
        &self,
        filter: &DocumentFilter,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let response = self
            .client
            .post(self.collection_url("documents/query"))
            .json(&json!({ "filter": filter }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::BackendResponse {
                backend: "document-store".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        let documents = parsed
            .pointer("/documents")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut result = Vec::new();
        for raw in documents {
            result.push(serde_json::from_value(raw)?);
        }
        Ok(result)
    }

    async fn vector_query(
        &self,
        text: &str,
        pipeline: &str,
        limit: usize,
    ) -> Result<Vec<SearchHit>, StoreError> {
        let response = self
            .client
            .post(self.collection_url("search"))
            .json(&json!({
                "text": text,
                "pipeline": pipeline,
                "limit": limit,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::BackendResponse {
                backend: "document-store".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        Ok(hits_from_response(&parsed))
    }
}

/// Converts the store's `[score, content, metadata]` triples into hits.
/// Malformed rows are dropped rather than failing the whole query.
fn hits_from_response(parsed: &Value) -> Vec<SearchHit> {
    let rows = parsed
        .pointer("/results")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut hits = Vec::new();
    for row in rows {
        let Some(triple) = row.as_array() else {
            continue;
        };
        if triple.len() < 3 {
            continue;
        }

        let score = triple[0].as_f64().unwrap_or(0.0);
        let content = triple[1].as_str().unwrap_or_default().to_string();
        let metadata = &triple[2];

        hits.push(SearchHit {
            score,
            content,
            path: metadata
                .pointer("/path")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            kind: metadata
                .pointer("/type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            page: metadata
                .pointer("/page")
                .and_then(Value::as_u64)
                .map(|page| page as u32),
        });
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_must_be_a_valid_url() {
        assert!(HttpDocumentStore::new("not a url", "vault").is_err());
        assert!(HttpDocumentStore::new("http://localhost:6550", "vault").is_ok());
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let store = HttpDocumentStore::new("http://localhost:6550/", "vault").unwrap();
        assert_eq!(
            store.collection_url("search"),
            "http://localhost:6550/collections/vault/search"
        );
    }

    #[test]
    fn query_triples_become_hits() {
        let payload = json!({
            "results": [
                [0.92, "some matched text", {"path": "notes/a.md", "type": "text"}],
                [0.81, "a pdf page", {"path": "papers/b.pdf", "type": "pdf", "page": 4}],
            ]
        });

        let hits = hits_from_response(&payload);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].path, "notes/a.md");
        assert_eq!(hits[0].page, None);
        assert_eq!(hits[1].page, Some(4));
        assert_eq!(hits[1].kind, "pdf");
    }

    #[test]
    fn malformed_rows_are_dropped() {
        let payload = json!({
            "results": [
                "not a triple",
                [0.5],
                [0.7, "ok", {"path": "x.md", "type": "text"}],
            ]
        });

        let hits = hits_from_response(&payload);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, "x.md");
    }

    #[test]
    fn missing_results_key_yields_no_hits() {
        assert!(hits_from_response(&json!({})).is_empty());
    }
}
