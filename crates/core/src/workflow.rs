use crate::batch::BatchQueue;
use crate::config::Settings;
use crate::error::EmbedError;
use crate::extract::{extract_pdf_units, LopdfPages};
use crate::models::DocumentUnit;
use crate::scheduler::process_in_windows;
use crate::store::DocumentStore;
use crate::vault::{partition_by_kind, select_changed, Vault};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

/// Outcome of a successful embedding run.
///
/// `watermark` is the timestamp captured at the start of the run; the
/// caller persists it as the new `last_run` only when the run succeeded,
/// so a failed run never skips changed files.
#[derive(Debug, Clone)]
pub struct EmbedReport {
    pub text_files: usize,
    pub pdf_files: usize,
    pub units_upserted: usize,
    pub watermark: DateTime<Utc>,
}

/// One full embedding invocation over the vault's change set.
///
/// Text files are read whole and batched directly; PDFs go through the
/// windowed scheduler, each file extracting into its own batch queue.
/// Batches flushed before a failure stay in the store; there is no
/// rollback and no retry.
pub struct EmbedWorkflow<V, S>
where
    V: Vault + ?Sized,
    S: DocumentStore + ?Sized,
{
    vault: Arc<V>,
    store: Arc<S>,
    settings: Settings,
}

impl<V, S> EmbedWorkflow<V, S>
where
    V: Vault + ?Sized + 'static,
    S: DocumentStore + ?Sized + 'static,
{
    pub fn new(vault: Arc<V>, store: Arc<S>, settings: Settings) -> Self {
        Self {
            vault,
            store,
            settings,
        }
    }

    pub async fn run(&self) -> Result<EmbedReport, EmbedError> {
        self.settings.validate()?;

        // Captured before listing so edits made while the run is in flight
        // are picked up again next time.
        let watermark = Utc::now();

        let files = self.vault.list_files();
        let excluded: HashSet<String> = self
            .settings
            .excluded_directories
            .iter()
            .cloned()
            .collect();
        let changed = select_changed(&files, &excluded, self.settings.last_run);
        let groups = partition_by_kind(changed);

        info!(
            text_files = groups.text.len(),
            pdf_files = groups.pdf.len(),
            "embedding changed files"
        );

        let upserted = Arc::new(AtomicUsize::new(0));
        let text_files = groups.text.len();
        let pdf_files = groups.pdf.len();

        let mut queue = BatchQueue::new(Arc::clone(&self.store), self.settings.text_batch_size);
        for file in &groups.text {
            let content = self.vault.read_text(&file.path).await?;
            queue
                .append(DocumentUnit::text_file(file.path.clone(), content))
                .await?;
        }
        queue.flush().await?;
        upserted.fetch_add(queue.upserted(), Ordering::SeqCst);

        let pdf_batch_size = self.settings.pdf_batch_size;
        let vault = Arc::clone(&self.vault);
        let store = Arc::clone(&self.store);
        let counter = Arc::clone(&upserted);
        process_in_windows(groups.pdf, self.settings.pdf_concurrency, move |file| {
            let vault = Arc::clone(&vault);
            let store = Arc::clone(&store);
            let counter = Arc::clone(&counter);
            async move {
                let bytes = vault.read_bytes(&file.path).await?;
                let pages = LopdfPages::from_bytes(&bytes).map_err(|error| match error {
                    EmbedError::PdfParse(reason) => {
                        EmbedError::PdfParse(format!("{}: {reason}", file.path))
                    }
                    other => other,
                })?;

                let mut queue = BatchQueue::new(store, pdf_batch_size);
                for unit in extract_pdf_units(&pages, &file.path) {
                    queue.append(unit?).await?;
                }
                queue.flush().await?;
                counter.fetch_add(queue.upserted(), Ordering::SeqCst);
                Ok(())
            }
        })
        .await?;

        let units_upserted = upserted.load(Ordering::SeqCst);
        info!(units_upserted, "embedding run finished");

        Ok(EmbedReport {
            text_files,
            pdf_files,
            units_upserted,
            watermark,
        })
    }
}
