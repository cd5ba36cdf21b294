pub mod batch;
pub mod config;
pub mod error;
pub mod extract;
pub mod markdown;
pub mod models;
pub mod pipeline;
pub mod query;
pub mod scheduler;
pub mod store;
pub mod stores;
pub mod vault;
pub mod workflow;

pub use batch::BatchQueue;
pub use config::{
    Settings, DEFAULT_PDF_BATCH_SIZE, DEFAULT_PDF_CONCURRENCY, DEFAULT_TEXT_BATCH_SIZE,
    SETTINGS_VERSION,
};
pub use error::{EmbedError, StoreError};
pub use extract::{extract_pdf_units, LopdfPages, PageFetch, PageSource, PageUnits};
pub use markdown::{strip, truncate};
pub use models::{DocumentUnit, FileMeta, SearchHit, StoredDocument, UnitKind};
pub use pipeline::PipelineConfig;
pub use query::{Searcher, DEFAULT_QUERY_LIMIT, DEFAULT_QUIESCENCE};
pub use scheduler::process_in_windows;
pub use store::{DocumentFilter, DocumentStore};
pub use stores::HttpDocumentStore;
pub use vault::{partition_by_kind, select_changed, FileGroups, FsVault, Vault};
pub use workflow::{EmbedReport, EmbedWorkflow};
