//! Page-level access to a statement document.
//!
//! Glyph decoding and layout analysis belong to external tools. The
//! extractor only needs the three capabilities of [`Document`]; a backend
//! that lacks one returns [`PassbookError::Unsupported`] for it.

mod layout;
#[cfg(feature = "pdf")]
mod pdf;
mod table;
mod text;

#[cfg(feature = "pdf")]
use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PassbookError, Result};

pub use layout::{LayoutDump, LayoutPage};
pub use table::TableDocument;
pub use text::TextDocument;

#[cfg(all(test, feature = "pdf"))]
pub(crate) use pdf::write_test_pdf;

/// Detected table: rows of cells, `None` where the detector found no cell.
pub type Table = Vec<Vec<Option<String>>>;

/// A positioned text token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    /// Left edge.
    pub x0: f64,
    /// Top edge, growing down the page.
    pub top: f64,
}

pub trait Document {
    fn page_count(&self) -> usize;

    /// Tables found by the backend's native table detection.
    fn tables(&self, page: usize) -> Result<Vec<Table>>;

    fn words(&self, page: usize) -> Result<Vec<Word>>;

    fn text(&self, page: usize) -> Result<Option<String>>;
}

/// Something that can hand out an open document.
///
/// Callers hold the returned handle only for the duration of one
/// extraction strategy; dropping it releases the document.
pub trait Source {
    fn open(&self) -> Result<Box<dyn Document>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Pdf,
    Layout,
    Csv,
    Spreadsheet,
    Text,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Self::Pdf,
            "json" => Self::Layout,
            "csv" => Self::Csv,
            "xlsx" | "xlsm" | "xls" | "ods" => Self::Spreadsheet,
            _ => Self::Text,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Layout => "layout dump",
            Self::Csv => "csv",
            Self::Spreadsheet => "spreadsheet",
            Self::Text => "plain text",
        }
    }
}

/// A statement on disk, read afresh on every [`Source::open`] except for
/// PDFs, whose decoded pages are kept after the first open.
#[derive(Debug, Clone)]
pub struct StatementFile {
    pub path: PathBuf,
    pub format: FileFormat,
    #[cfg(feature = "pdf")]
    decoded: OnceCell<pdf::PdfDocument>,
}

impl StatementFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = FileFormat::from_path(&path);
        Self {
            path,
            format,
            #[cfg(feature = "pdf")]
            decoded: OnceCell::new(),
        }
    }

    #[cfg(feature = "pdf")]
    fn open_pdf(&self) -> Result<Box<dyn Document>> {
        if let Some(doc) = self.decoded.get() {
            return Ok(Box::new(doc.clone()));
        }
        let doc = pdf::load(&self.path)?;
        Ok(Box::new(self.decoded.get_or_init(|| doc).clone()))
    }
}

impl Source for StatementFile {
    fn open(&self) -> Result<Box<dyn Document>> {
        match self.format {
            FileFormat::Layout => Ok(Box::new(LayoutDump::from_path(&self.path)?)),
            FileFormat::Csv => Ok(Box::new(TableDocument::from_csv_path(&self.path)?)),
            FileFormat::Text => {
                let content = std::fs::read_to_string(&self.path)?;
                Ok(Box::new(TextDocument::from_text(&content)))
            }
            #[cfg(feature = "xlsx")]
            FileFormat::Spreadsheet => Ok(Box::new(TableDocument::from_workbook_path(&self.path)?)),
            #[cfg(not(feature = "xlsx"))]
            FileFormat::Spreadsheet => Err(PassbookError::UnknownFormat(
                "spreadsheet support is not compiled in (enable the `xlsx` feature)".to_string(),
            )),
            #[cfg(feature = "pdf")]
            FileFormat::Pdf => self.open_pdf(),
            #[cfg(not(feature = "pdf"))]
            FileFormat::Pdf => Err(PassbookError::UnknownFormat(
                "pdf support is not compiled in (enable the `pdf` feature)".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a/stmt.PDF")), FileFormat::Pdf);
        assert_eq!(FileFormat::from_path(Path::new("dump.json")), FileFormat::Layout);
        assert_eq!(FileFormat::from_path(Path::new("x.csv")), FileFormat::Csv);
        assert_eq!(FileFormat::from_path(Path::new("x.xlsx")), FileFormat::Spreadsheet);
        assert_eq!(FileFormat::from_path(Path::new("layout.txt")), FileFormat::Text);
        assert_eq!(FileFormat::from_path(Path::new("noext")), FileFormat::Text);
    }

    #[test]
    fn test_statement_file_opens_text_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stmt.txt");
        std::fs::write(&path, "page one\u{000C}page two").unwrap();
        let doc = StatementFile::new(&path).open().unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.text(1).unwrap().as_deref(), Some("page two"));
        assert!(matches!(doc.tables(0), Err(PassbookError::Unsupported(_))));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_pdf_is_decoded_once_per_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stmt.pdf");
        pdf::write_test_pdf(&path, &[(50, 700, "01/01/2024"), (200, 700, "Salary")]);
        let src = StatementFile::new(&path);
        assert_eq!(src.open().unwrap().words(0).unwrap().len(), 2);
        std::fs::remove_file(&path).unwrap();
        let again = src.open().unwrap();
        assert_eq!(again.words(0).unwrap().len(), 2);
        assert!(again.text(0).unwrap().is_some());
    }

    #[test]
    fn test_statement_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let src = StatementFile::new(dir.path().join("missing.json"));
        assert!(matches!(src.open(), Err(PassbookError::Io(_))));
    }
}
