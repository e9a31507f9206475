//! PDF pages decoded once into positioned words and plain text.
//!
//! Glyphs come from `pdf_extract::output_doc`; [`WordCollector`] joins
//! adjacent glyphs into words in top-left page coordinates. Text lines
//! are rebuilt from those words with wide gaps kept as column breaks.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};

use super::{Document, Table, Word};
use crate::error::{PassbookError, Result};

#[derive(Debug, Clone, PartialEq)]
struct Placed {
    text: String,
    x0: f64,
    x1: f64,
    top: f64,
    size: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PdfPage {
    words: Vec<Placed>,
}

impl PdfPage {
    /// Words in reading order, a double space where the gap is wider than
    /// a glyph, a newline where the baseline moves.
    fn text(&self) -> String {
        let mut out = String::new();
        let mut prev: Option<&Placed> = None;
        for w in &self.words {
            if let Some(p) = prev {
                if (w.top - p.top).abs() > p.size.max(w.size) * 0.5 {
                    out.push('\n');
                } else if w.x0 - p.x1 > p.size.max(w.size) {
                    out.push_str("  ");
                } else {
                    out.push(' ');
                }
            }
            out.push_str(&w.text);
            prev = Some(w);
        }
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct PdfDocument {
    pages: Vec<PdfPage>,
}

impl PdfDocument {
    fn page(&self, page: usize) -> Result<&PdfPage> {
        self.pages.get(page).ok_or(PassbookError::PageOutOfRange {
            page,
            count: self.pages.len(),
        })
    }
}

impl Document for PdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn tables(&self, _page: usize) -> Result<Vec<Table>> {
        Err(PassbookError::Unsupported("table detection"))
    }

    fn words(&self, page: usize) -> Result<Vec<Word>> {
        Ok(self
            .page(page)?
            .words
            .iter()
            .map(|w| Word {
                text: w.text.clone(),
                x0: w.x0,
                top: w.top,
            })
            .collect())
    }

    fn text(&self, page: usize) -> Result<Option<String>> {
        let text = self.page(page)?.text();
        Ok((!text.trim().is_empty()).then_some(text))
    }
}

#[derive(Default)]
struct WordCollector {
    page_top: f64,
    pages: Vec<PdfPage>,
    current: PdfPage,
    word: Option<Placed>,
}

impl WordCollector {
    fn flush(&mut self) {
        if let Some(word) = self.word.take() {
            self.current.words.push(word);
        }
    }
}

impl OutputDev for WordCollector {
    fn begin_page(
        &mut self,
        _page_num: u32,
        media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        self.page_top = media_box.ury;
        self.current = PdfPage::default();
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        self.flush();
        self.pages.push(std::mem::take(&mut self.current));
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> std::result::Result<(), OutputError> {
        if char.trim().is_empty() {
            self.flush();
            return Ok(());
        }
        let size = font_size * (trm.m11 * trm.m22 - trm.m12 * trm.m21).abs().sqrt();
        let x = trm.m31;
        let top = self.page_top - trm.m32 - size;
        let x1 = x + width * size;

        if let Some(word) = &self.word {
            let moved = (word.top - top).abs() > size * 0.5 || (x - word.x1).abs() > size * 0.25;
            if moved {
                self.flush();
            }
        }
        match &mut self.word {
            Some(word) => {
                word.text.push_str(char);
                word.x1 = x1;
            }
            None => {
                self.word = Some(Placed {
                    text: char.to_string(),
                    x0: x,
                    x1,
                    top,
                    size,
                })
            }
        }
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        self.flush();
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        self.flush();
        Ok(())
    }
}

/// Decode every page of a PDF. Scanned PDFs without a text layer are an
/// error rather than an empty document.
pub fn load(path: &Path) -> Result<PdfDocument> {
    if !path.is_file() {
        return Err(PassbookError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("PDF not found: {}", path.display()),
        )));
    }

    // The decoder panics on some malformed streams.
    let pages = panic::catch_unwind(AssertUnwindSafe(|| -> Result<Vec<PdfPage>> {
        let doc = lopdf::Document::load(path).map_err(|e| PassbookError::Pdf(e.to_string()))?;
        let mut collector = WordCollector::default();
        pdf_extract::output_doc(&doc, &mut collector).map_err(|e| PassbookError::Pdf(e.to_string()))?;
        Ok(collector.pages)
    }))
    .map_err(|_| PassbookError::Pdf("decoder aborted on malformed document".to_string()))??;

    if pages.iter().all(|p| p.words.is_empty()) {
        return Err(PassbookError::Pdf(
            "PDF appears scanned/image-only; text extraction found nothing".to_string(),
        ));
    }
    tracing::debug!(path = %path.display(), pages = pages.len(), "pdf decoded");
    Ok(PdfDocument { pages })
}

/// One-page PDF in the Courier core font, each `(x, y, text)` drawn at its
/// own baseline position (PDF coordinates, origin bottom-left).
#[cfg(test)]
pub(crate) fn write_test_pdf(path: &Path, items: &[(i64, i64, &str)]) {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let mut operations = Vec::new();
    for &(x, y, text) in items {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 10.into()]));
        operations.push(Operation::new("Td", vec![x.into(), y.into()]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(text)]));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}
