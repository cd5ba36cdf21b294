use crate::error::EmbedError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const IDENTITY_LEN: usize = 16;

/// Embedding pipeline configuration: model and splitter, each with a JSON
/// parameter blob kept as the user typed it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineConfig {
    pub model_name: String,
    pub model_params: String,
    pub splitter_name: String,
    pub splitter_params: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_name: "intfloat/e5-small".to_string(),
            model_params: "{}".to_string(),
            splitter_name: "recursive_character".to_string(),
            splitter_params: "{}".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Parameter blobs must be JSON objects. Malformed parameters block the
    /// run instead of silently falling back to defaults.
    pub fn validate(&self) -> Result<(), EmbedError> {
        if self.model_name.trim().is_empty() {
            return Err(EmbedError::InvalidConfig("model name is empty".to_string()));
        }
        if self.splitter_name.trim().is_empty() {
            return Err(EmbedError::InvalidConfig(
                "splitter name is empty".to_string(),
            ));
        }
        validate_params("model_params", &self.model_params)?;
        validate_params("splitter_params", &self.splitter_params)?;
        Ok(())
    }

    /// Stable name for this configuration, used as the remote pipeline name.
    ///
    /// Digest over the fixed-order concatenation of model name, model
    /// parameters, splitter name, splitter parameters. Identical content
    /// always produces the identical string; any byte change produces a
    /// different one. Collisions are not defended against.
    pub fn identity(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.model_name.as_bytes());
        hasher.update(self.model_params.as_bytes());
        hasher.update(self.splitter_name.as_bytes());
        hasher.update(self.splitter_params.as_bytes());
        let hex = format!("{:x}", hasher.finalize());
        hex[..IDENTITY_LEN].to_string()
    }
}

fn validate_params(field: &str, raw: &str) -> Result<(), EmbedError> {
    let parsed: serde_json::Value = serde_json::from_str(raw)
        .map_err(|error| EmbedError::InvalidConfig(format!("{field} is not valid JSON: {error}")))?;

    if !parsed.is_object() {
        return Err(EmbedError::InvalidConfig(format!(
            "{field} must be a JSON object"
        )));
    }
    Ok(())
}
