use std::path::Path;

use super::{Document, Table, Word};
use crate::error::{PassbookError, Result};

/// Already-tabular statements: each page is one native table.
///
/// CSV files give a single page; workbooks give one page per sheet.
#[derive(Debug, Clone, Default)]
pub struct TableDocument {
    pages: Vec<Table>,
}

impl TableDocument {
    pub fn from_pages(pages: Vec<Table>) -> Self {
        Self { pages }
    }

    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut table = Vec::new();
        for result in rdr.records() {
            let record = result?;
            table.push(record.iter().map(|f| Some(f.to_string())).collect());
        }
        Ok(Self::from_pages(vec![table]))
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(std::io::BufReader::new(file))
    }

    #[cfg(feature = "xlsx")]
    pub fn from_workbook_path(path: &Path) -> Result<Self> {
        use calamine::Reader;

        let mut workbook = calamine::open_workbook_auto(path)?;
        let mut pages = Vec::new();
        for name in workbook.sheet_names() {
            let range = match workbook.worksheet_range(&name) {
                Ok(range) => range,
                Err(e) => {
                    tracing::warn!(sheet = %name, error = %e, "skipping unreadable sheet");
                    continue;
                }
            };
            let table = range
                .rows()
                .map(|row| row.iter().map(cell_text).collect())
                .collect();
            pages.push(table);
        }
        Ok(Self::from_pages(pages))
    }

    fn page(&self, page: usize) -> Result<&Table> {
        self.pages.get(page).ok_or(PassbookError::PageOutOfRange {
            page,
            count: self.pages.len(),
        })
    }
}

#[cfg(feature = "xlsx")]
fn cell_text(cell: &calamine::Data) -> Option<String> {
    use calamine::Data;

    match cell {
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => crate::parse::excel_serial_to_date(dt.as_f64())
            .map(|d| d.format("%Y-%m-%d").to_string()),
        Data::DateTimeIso(s) => Some(s.clone()),
        _ => None,
    }
}

impl Document for TableDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn tables(&self, page: usize) -> Result<Vec<Table>> {
        Ok(vec![self.page(page)?.clone()])
    }

    fn words(&self, _page: usize) -> Result<Vec<Word>> {
        Err(PassbookError::Unsupported("positioned words"))
    }

    /// Cells joined on wide gaps, so the line splitter recovers the columns.
    fn text(&self, page: usize) -> Result<Option<String>> {
        let lines: Vec<String> = self
            .page(page)?
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| c.as_deref().unwrap_or("").trim())
                    .filter(|c| !c.is_empty())
                    .collect::<Vec<_>>()
                    .join("   ")
            })
            .collect();
        if lines.iter().all(|l| l.is_empty()) {
            Ok(None)
        } else {
            Ok(Some(lines.join("\n")))
        }
    }
}
