use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Document, Source, Table, Word};
use crate::error::{PassbookError, Result};

/// Output of an external layout tool, serialized as JSON.
///
/// ```json
/// { "pages": [ { "tables": [[["Date", "Amount"]]],
///                "words": [{ "text": "Date", "x0": 10.0, "top": 72.4 }],
///                "text": "Date  Amount" } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDump {
    pub pages: Vec<LayoutPage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutPage {
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub words: Vec<Word>,
    #[serde(default)]
    pub text: Option<String>,
}

impl LayoutDump {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn page(&self, page: usize) -> Result<&LayoutPage> {
        self.pages
            .get(page)
            .ok_or_else(|| PassbookError::PageOutOfRange {
                page,
                count: self.pages.len(),
            })
    }
}

impl Document for LayoutDump {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn tables(&self, page: usize) -> Result<Vec<Table>> {
        Ok(self.page(page)?.tables.clone())
    }

    fn words(&self, page: usize) -> Result<Vec<Word>> {
        Ok(self.page(page)?.words.clone())
    }

    fn text(&self, page: usize) -> Result<Option<String>> {
        Ok(self.page(page)?.text.clone())
    }
}

impl Source for LayoutDump {
    fn open(&self) -> Result<Box<dyn Document>> {
        Ok(Box::new(self.clone()))
    }
}
