use crate::error::EmbedError;
use crate::models::DocumentUnit;
use lopdf::{Document, ObjectId};
use std::collections::BTreeMap;

/// Result of asking a page source for one page.
///
/// `NoSuchPage` is the end-of-document signal and is never an error; only
/// `Failed` aborts extraction of the file.
#[derive(Debug, Clone)]
pub enum PageFetch {
    Fragments(Vec<String>),
    NoSuchPage,
    Failed(String),
}

pub trait PageSource {
    fn page_text(&self, page: u32) -> PageFetch;
}

/// Page source over an in-memory PDF parsed with lopdf.
pub struct LopdfPages {
    document: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfPages {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EmbedError> {
        let document =
            Document::load_mem(bytes).map_err(|error| EmbedError::PdfParse(error.to_string()))?;
        let pages = document.get_pages();
        Ok(Self { document, pages })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

impl PageSource for LopdfPages {
    fn page_text(&self, page: u32) -> PageFetch {
        if !self.pages.contains_key(&page) {
            return PageFetch::NoSuchPage;
        }
        match self.document.extract_text(&[page]) {
            Ok(text) if text.trim().is_empty() => PageFetch::Fragments(Vec::new()),
            Ok(text) => PageFetch::Fragments(vec![text]),
            Err(error) => PageFetch::Failed(error.to_string()),
        }
    }
}

/// Lazy, page-ordered unit sequence for one PDF file.
///
/// Walks page numbers from 1, skips pages with no text fragments, and stops
/// exactly at the source's `NoSuchPage` signal. Fragments of a page are
/// concatenated without a separator. The iterator is finite and not
/// restartable; re-extracting a file means re-parsing its bytes.
pub struct PageUnits<'a, S: PageSource> {
    source: &'a S,
    path: &'a str,
    next_page: u32,
    done: bool,
}

impl<'a, S: PageSource> PageUnits<'a, S> {
    pub fn new(source: &'a S, path: &'a str) -> Self {
        Self {
            source,
            path,
            next_page: 1,
            done: false,
        }
    }
}

impl<S: PageSource> Iterator for PageUnits<'_, S> {
    type Item = Result<DocumentUnit, EmbedError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let page = self.next_page;
            self.next_page += 1;

            match self.source.page_text(page) {
                PageFetch::NoSuchPage => {
                    self.done = true;
                    return None;
                }
                PageFetch::Failed(reason) => {
                    self.done = true;
                    return Some(Err(EmbedError::PdfParse(format!(
                        "{}: page {page}: {reason}",
                        self.path
                    ))));
                }
                PageFetch::Fragments(fragments) => {
                    if fragments.is_empty() {
                        continue;
                    }
                    let text = fragments.concat();
                    return Some(Ok(DocumentUnit::pdf_page(self.path, page, text)));
                }
            }
        }
    }
}

pub fn extract_pdf_units<'a, S: PageSource>(source: &'a S, path: &'a str) -> PageUnits<'a, S> {
    PageUnits::new(source, path)
}

#[cfg(test)]
pub(crate) mod test_pdf {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Builds an in-memory PDF; `None` entries become pages with no text.
    pub fn build(pages: &[Option<&str>]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for page in pages {
            let operations = match page {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                None => vec![Operation::new("BT", vec![]), Operation::new("ET", vec![])],
            };
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode content"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = pages.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("serialize pdf");
        bytes
    }
}
