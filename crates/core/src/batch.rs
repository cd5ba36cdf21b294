use crate::error::StoreError;
use crate::models::DocumentUnit;
use crate::store::DocumentStore;
use std::sync::Arc;
use tracing::debug;

/// Accumulates units and upserts them in fixed-size batches.
///
/// The queue never holds more than `capacity` units: an append that fills
/// the queue flushes it. `flush` on an empty queue makes no store call.
/// Text files and PDF pages use separate queue instances so their batches
/// are never merged.
pub struct BatchQueue<S: DocumentStore + ?Sized> {
    store: Arc<S>,
    capacity: usize,
    pending: Vec<DocumentUnit>,
    upserted: usize,
}

impl<S: DocumentStore + ?Sized> BatchQueue<S> {
    pub fn new(store: Arc<S>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            store,
            capacity,
            pending: Vec::with_capacity(capacity),
            upserted: 0,
        }
    }

    pub async fn append(&mut self, unit: DocumentUnit) -> Result<(), StoreError> {
        self.pending.push(unit);
        if self.pending.len() >= self.capacity {
            self.flush().await?;
        }
        Ok(())
    }

    pub async fn flush(&mut self) -> Result<(), StoreError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        debug!(batch_size = self.pending.len(), "upserting batch");
        self.store.upsert_documents(&self.pending).await?;
        self.upserted += self.pending.len();
        self.pending.clear();
        Ok(())
    }

    /// Units included in a flushed batch so far.
    pub fn upserted(&self) -> usize {
        self.upserted
    }
}
