use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Text,
    Pdf,
}

/// One embeddable unit: a whole text file, or a single PDF page.
///
/// The `id` is the file path for text files and `"{path}--{page}"` for PDF
/// pages, so re-upserting the same source acts as an update in the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentUnit {
    pub id: String,
    pub text: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: UnitKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl DocumentUnit {
    pub fn text_file(path: impl Into<String>, text: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            id: path.clone(),
            text: text.into(),
            path,
            kind: UnitKind::Text,
            page: None,
        }
    }

    pub fn pdf_page(path: impl Into<String>, page: u32, text: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            id: format!("{path}--{page}"),
            text: text.into(),
            path,
            kind: UnitKind::Pdf,
            page: Some(page),
        }
    }
}

/// File listing entry as reported by the vault. Read-only to this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMeta {
    pub path: String,
    pub extension: String,
    pub modified: DateTime<Utc>,
}

impl FileMeta {
    pub fn new(
        path: impl Into<String>,
        extension: impl Into<String>,
        modified: DateTime<Utc>,
    ) -> Self {
        Self {
            path: path.into(),
            extension: extension.into(),
            modified,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub score: f64,
    pub content: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub page: Option<u32>,
}

/// Document as returned by the store's metadata lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_unit_id_is_the_path() {
        let unit = DocumentUnit::text_file("notes/today.md", "hello");
        assert_eq!(unit.id, "notes/today.md");
        assert_eq!(unit.kind, UnitKind::Text);
        assert_eq!(unit.page, None);
    }

    #[test]
    fn pdf_unit_id_embeds_the_page_number() {
        let unit = DocumentUnit::pdf_page("papers/attn.pdf", 3, "page text");
        assert_eq!(unit.id, "papers/attn.pdf--3");
        assert_eq!(unit.page, Some(3));
        assert_eq!(unit.kind, UnitKind::Pdf);
    }

    #[test]
    fn unit_serializes_kind_as_type_and_omits_missing_page() {
        let unit = DocumentUnit::text_file("a.md", "x");
        let value = serde_json::to_value(&unit).unwrap();
        assert_eq!(value["type"], "text");
        assert!(value.get("page").is_none());
    }
}
