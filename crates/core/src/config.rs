use crate::error::EmbedError;
use crate::pipeline::PipelineConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampMilliSeconds};

pub const SETTINGS_VERSION: u32 = 1;

pub const DEFAULT_TEXT_BATCH_SIZE: usize = 10;
pub const DEFAULT_PDF_CONCURRENCY: usize = 1;
pub const DEFAULT_PDF_BATCH_SIZE: usize = 10;

/// Persisted user settings. Versioned so a future layout change can migrate
/// instead of reinterpreting an opaque blob.
///
/// `last_run` is the embedding watermark: only files modified strictly after
/// it are picked up by the next run. It is stored as epoch milliseconds.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub version: u32,
    pub database_url: String,
    pub excluded_directories: Vec<String>,
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub last_run: DateTime<Utc>,
    pub text_batch_size: usize,
    pub pdf_concurrency: usize,
    pub pdf_batch_size: usize,
    pub pipeline: PipelineConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            database_url: String::new(),
            excluded_directories: Vec::new(),
            last_run: DateTime::<Utc>::UNIX_EPOCH,
            text_batch_size: DEFAULT_TEXT_BATCH_SIZE,
            pdf_concurrency: DEFAULT_PDF_CONCURRENCY,
            pdf_batch_size: DEFAULT_PDF_BATCH_SIZE,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Settings {
    /// Parse and validate in one step. A settings blob that fails validation
    /// must block the run, never degrade to defaults.
    pub fn from_json(raw: &str) -> Result<Self, EmbedError> {
        let settings: Settings = serde_json::from_str(raw)
            .map_err(|error| EmbedError::InvalidConfig(format!("settings parse: {error}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, EmbedError> {
        serde_json::to_string_pretty(self)
            .map_err(|error| EmbedError::InvalidConfig(format!("settings encode: {error}")))
    }

    pub fn validate(&self) -> Result<(), EmbedError> {
        if self.version != SETTINGS_VERSION {
            return Err(EmbedError::InvalidConfig(format!(
                "unsupported settings version {} (expected {})",
                self.version, SETTINGS_VERSION
            )));
        }
        if self.text_batch_size == 0 {
            return Err(EmbedError::InvalidConfig(
                "text_batch_size must be at least 1".to_string(),
            ));
        }
        if self.pdf_batch_size == 0 {
            return Err(EmbedError::InvalidConfig(
                "pdf_batch_size must be at least 1".to_string(),
            ));
        }
        if self.pdf_concurrency == 0 {
            return Err(EmbedError::InvalidConfig(
                "pdf_concurrency must be at least 1".to_string(),
            ));
        }
        self.pipeline.validate()
    }

    /// Embed and search are unavailable until a database URL is configured.
    pub fn has_database(&self) -> bool {
        !self.database_url.trim().is_empty()
    }
}
