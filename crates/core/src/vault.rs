use crate::error::EmbedError;
use crate::models::FileMeta;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const TEXT_EXTENSIONS: [&str; 2] = ["md", "txt"];
pub const PDF_EXTENSION: &str = "pdf";

/// The document collection this core embeds and searches.
#[async_trait]
pub trait Vault: Send + Sync {
    fn list_files(&self) -> Vec<FileMeta>;

    async fn read_text(&self, path: &str) -> Result<String, EmbedError>;

    async fn read_bytes(&self, path: &str) -> Result<Vec<u8>, EmbedError>;
}

/// Filesystem-backed vault rooted at a directory. Paths in `FileMeta` are
/// relative to the root.
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn absolute(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait]
impl Vault for FsVault {
    fn list_files(&self) -> Vec<FileMeta> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|item| item.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = match entry.path().strip_prefix(&self.root) {
                Ok(relative) => relative.to_string_lossy().to_string(),
                Err(_) => continue,
            };

            let extension = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.to_ascii_lowercase())
                .unwrap_or_default();

            let modified = entry
                .metadata()
                .ok()
                .and_then(|meta| meta.modified().ok())
                .map(DateTime::<Utc>::from)
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

            files.push(FileMeta::new(relative, extension, modified));
        }

        files.sort_unstable_by(|left, right| left.path.cmp(&right.path));
        files
    }

    async fn read_text(&self, path: &str) -> Result<String, EmbedError> {
        Ok(tokio::fs::read_to_string(self.absolute(path)).await?)
    }

    async fn read_bytes(&self, path: &str) -> Result<Vec<u8>, EmbedError> {
        Ok(tokio::fs::read(self.absolute(path)).await?)
    }
}

/// Files eligible for embedding: modified strictly after the watermark and
/// not excluded. Input order is preserved.
pub fn select_changed(
    files: &[FileMeta],
    excluded: &HashSet<String>,
    last_run: DateTime<Utc>,
) -> Vec<FileMeta> {
    files
        .iter()
        .filter(|file| !excluded.contains(&file.path) && file.modified > last_run)
        .cloned()
        .collect()
}

#[derive(Debug, Default, Clone)]
pub struct FileGroups {
    pub text: Vec<FileMeta>,
    pub pdf: Vec<FileMeta>,
}

/// Splits a change set by file kind. Extensions outside the two groups are
/// dropped without error.
pub fn partition_by_kind(files: Vec<FileMeta>) -> FileGroups {
    let mut groups = FileGroups::default();

    for file in files {
        if TEXT_EXTENSIONS
            .iter()
            .any(|ext| file.extension.eq_ignore_ascii_case(ext))
        {
            groups.text.push(file);
        } else if file.extension.eq_ignore_ascii_case(PDF_EXTENSION) {
            groups.pdf.push(file);
        }
    }

    groups
}
