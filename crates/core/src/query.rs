use crate::models::SearchHit;
use crate::store::DocumentStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_QUERY_LIMIT: usize = 10;
pub const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(350);

/// Interactive query runner with keystroke debouncing.
///
/// Each submitted query gets a generation number. The runner waits out the
/// quiescence interval before touching the network; if a newer generation
/// was submitted in the meantime, the stale query returns empty without
/// ever calling the backend.
pub struct Searcher<S: DocumentStore + ?Sized> {
    store: Arc<S>,
    pipeline: String,
    limit: usize,
    quiescence: Duration,
    generation: AtomicU64,
}

impl<S: DocumentStore + ?Sized> Searcher<S> {
    pub fn new(store: Arc<S>, pipeline: impl Into<String>) -> Self {
        Self {
            store,
            pipeline: pipeline.into(),
            limit: DEFAULT_QUERY_LIMIT,
            quiescence: DEFAULT_QUIESCENCE,
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn with_quiescence(mut self, quiescence: Duration) -> Self {
        self.quiescence = quiescence;
        self
    }

    /// Runs one query submission. Store failures degrade to an empty result
    /// so the caller can simply retry on the next keystroke.
    pub async fn search(&self, text: &str) -> Vec<SearchHit> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.quiescence).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            return Vec::new();
        }

        match self
            .store
            .vector_query(text, &self.pipeline, self.limit)
            .await
        {
            Ok(hits) => hits,
            Err(error) => {
                warn!(%error, "search query failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::{DocumentUnit, StoredDocument};
    use crate::store::DocumentFilter;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
        queries: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl DocumentStore for CountingStore {
        async fn add_pipeline(&self, _name: &str) -> Result<(), StoreError> {
            Ok(())
        }

        async fn upsert_documents(&self, _documents: &[DocumentUnit]) -> Result<(), StoreError> {
            Ok(())
        }

        async fn get_documents(
            &self,
            _filter: &DocumentFilter,
        ) -> Result<Vec<StoredDocument>, StoreError> {
            Ok(Vec::new())
        }

        async fn vector_query(
            &self,
            text: &str,
            _pipeline: &str,
            _limit: usize,
        ) -> Result<Vec<SearchHit>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(text.to_string());
            if self.fail {
                return Err(StoreError::Request("backend down".to_string()));
            }
            Ok(vec![SearchHit {
                score: 0.9,
                content: text.to_string(),
                path: "match.md".to_string(),
                kind: "text".to_string(),
                page: None,
            }])
        }
    }

    #[tokio::test]
    async fn superseded_query_never_reaches_the_backend() {
        let store = Arc::new(CountingStore::default());
        let searcher = Arc::new(
            Searcher::new(Arc::clone(&store), "pipe").with_quiescence(Duration::from_millis(50)),
        );

        let first = {
            let searcher = Arc::clone(&searcher);
            tokio::spawn(async move { searcher.search("partial quer").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = searcher.search("partial query done").await;

        let first = first.await.unwrap();
        assert!(first.is_empty());
        assert_eq!(second.len(), 1);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            store.queries.lock().unwrap().as_slice(),
            &["partial query done".to_string()]
        );
    }

    #[tokio::test]
    async fn lone_query_survives_the_quiescence_wait() {
        let store = Arc::new(CountingStore::default());
        let searcher =
            Searcher::new(Arc::clone(&store), "pipe").with_quiescence(Duration::from_millis(10));

        let hits = searcher.search("steady query").await;
        assert_eq!(hits.len(), 1);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_query_short_circuits() {
        let store = Arc::new(CountingStore::default());
        let searcher =
            Searcher::new(Arc::clone(&store), "pipe").with_quiescence(Duration::from_millis(1));

        assert!(searcher.search("").await.is_empty());
        assert!(searcher.search("   ").await.is_empty());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn store_failure_degrades_to_empty_result() {
        let store = Arc::new(CountingStore {
            fail: true,
            ..CountingStore::default()
        });
        let searcher =
            Searcher::new(Arc::clone(&store), "pipe").with_quiescence(Duration::from_millis(1));

        let hits = searcher.search("anything").await;
        assert!(hits.is_empty());
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }
}
