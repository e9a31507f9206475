use super::{Document, Table, Word};
use crate::error::{PassbookError, Result};

/// Plain extracted text, one entry per page.
#[derive(Debug, Clone, Default)]
pub struct TextDocument {
    pages: Vec<String>,
}

impl TextDocument {
    /// Split on form feeds, the page separator of text extractors.
    pub fn from_text(content: &str) -> Self {
        let pages = content.split('\u{000C}').map(str::to_string).collect();
        Self { pages }
    }
}

impl Document for TextDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn tables(&self, _page: usize) -> Result<Vec<Table>> {
        Err(PassbookError::Unsupported("table detection"))
    }

    fn words(&self, _page: usize) -> Result<Vec<Word>> {
        Err(PassbookError::Unsupported("positioned words"))
    }

    fn text(&self, page: usize) -> Result<Option<String>> {
        let text = self
            .pages
            .get(page)
            .ok_or_else(|| PassbookError::PageOutOfRange {
                page,
                count: self.pages.len(),
            })?;
        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(text.clone()))
        }
    }
}
