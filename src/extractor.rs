//! Row extraction: three strategies of decreasing structural assumption,
//! tried in order until one yields enough rows.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::document::{Document, Source, Word};
use crate::models::Row;
use crate::patterns::Patterns;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Table,
    Positional,
    Lines,
}

impl Strategy {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Table => "table detection",
            Self::Positional => "positional clustering",
            Self::Lines => "line splitting",
        }
    }
}

pub struct ExtractOptions<'a> {
    pub patterns: &'a Patterns,
    pub line_bucket: f64,
    pub min_rows: usize,
}

type StrategyFn = fn(&dyn Document, &ExtractOptions<'_>) -> Vec<Row>;

const CASCADE: &[(Strategy, StrategyFn)] = &[
    (Strategy::Table, table_rows),
    (Strategy::Positional, positional_rows),
    (Strategy::Lines, line_rows),
];

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Strategy whose rows were kept; `None` when nothing was extracted.
    pub strategy: Option<Strategy>,
    pub rows: Vec<Row>,
}

/// Run the cascade. Never fails: a strategy that cannot open the document
/// or read a page contributes fewer rows and the next one is tried.
///
/// When no strategy reaches `min_rows`, the last strategy's rows are
/// returned as they are, however few.
pub fn extract(source: &dyn Source, opts: &ExtractOptions<'_>) -> Extraction {
    let mut last = Extraction::default();
    for &(strategy, run) in CASCADE {
        let rows = match source.open() {
            // The handle lives only for this strategy.
            Ok(doc) => run(doc.as_ref(), opts),
            Err(e) => {
                warn!(strategy = strategy.label(), error = %e, "cannot open document");
                Vec::new()
            }
        };
        debug!(strategy = strategy.label(), rows = rows.len(), "strategy finished");
        if rows.len() >= opts.min_rows {
            return Extraction {
                strategy: Some(strategy),
                rows,
            };
        }
        last = Extraction {
            strategy: (!rows.is_empty()).then_some(strategy),
            rows,
        };
    }
    last
}

fn table_rows(doc: &dyn Document, _opts: &ExtractOptions<'_>) -> Vec<Row> {
    let mut rows = Vec::new();
    for page in 0..doc.page_count() {
        let tables = match doc.tables(page) {
            Ok(tables) => tables,
            Err(e) => {
                debug!(page, error = %e, "table detection failed");
                continue;
            }
        };
        for row in tables.into_iter().flatten() {
            let cells: Row = row
                .into_iter()
                .map(|c| c.map(|s| s.trim().to_string()).unwrap_or_default())
                .collect();
            if cells.iter().any(|c| !c.is_empty()) {
                rows.push(cells);
            }
        }
    }
    rows
}

fn positional_rows(doc: &dyn Document, opts: &ExtractOptions<'_>) -> Vec<Row> {
    let mut rows = Vec::new();
    for page in 0..doc.page_count() {
        match doc.words(page) {
            Ok(words) => rows.extend(cluster_lines(words, opts.line_bucket)),
            Err(e) => debug!(page, error = %e, "word extraction failed"),
        }
    }
    rows
}

/// Group words whose rounded top falls in the same bucket, then order each
/// line left to right. Every word stays its own cell.
fn cluster_lines(words: Vec<Word>, bucket: f64) -> Vec<Row> {
    let bucket = if bucket > 0.0 { bucket } else { 1.0 };
    let mut lines: BTreeMap<i64, Vec<Word>> = BTreeMap::new();
    for word in words {
        if !word.top.is_finite() || !word.x0.is_finite() {
            continue;
        }
        let key = (word.top / bucket).round_ties_even() as i64;
        lines.entry(key).or_default().push(word);
    }
    lines
        .into_values()
        .filter_map(|mut line| {
            line.sort_by(|a, b| a.x0.total_cmp(&b.x0));
            let cells: Row = line
                .iter()
                .map(|w| w.text.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            (!cells.is_empty()).then_some(cells)
        })
        .collect()
}

fn line_rows(doc: &dyn Document, opts: &ExtractOptions<'_>) -> Vec<Row> {
    let mut rows = Vec::new();
    for page in 0..doc.page_count() {
        let text = match doc.text(page) {
            Ok(Some(text)) => text,
            Ok(None) => continue,
            Err(e) => {
                debug!(page, error = %e, "text extraction failed");
                continue;
            }
        };
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || opts.patterns.is_footer(line) {
                continue;
            }
            let cells = opts.patterns.split_columns(line);
            if !cells.is_empty() {
                rows.push(cells);
            }
        }
    }
    rows
}

/// A line of page text, numbered from 1 within its page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLine {
    #[serde(rename = "Page #")]
    pub page: usize,
    #[serde(rename = "Line #")]
    pub line: usize,
    #[serde(rename = "Content")]
    pub content: String,
}

/// Every text line of every page, footers included, for eyeballing a layout.
pub fn page_lines(doc: &dyn Document) -> Vec<PageLine> {
    let mut out = Vec::new();
    for page in 0..doc.page_count() {
        let text = match doc.text(page) {
            Ok(Some(text)) => text,
            Ok(None) => continue,
            Err(e) => {
                warn!(page = page + 1, error = %e, "skipping page without text");
                continue;
            }
        };
        for (idx, line) in text.lines().enumerate() {
            out.push(PageLine {
                page: page + 1,
                line: idx + 1,
                content: line.trim().to_string(),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::document::{LayoutDump, LayoutPage, Table};
    use crate::error::{PassbookError, Result};

    fn opts(patterns: &Patterns) -> ExtractOptions<'_> {
        ExtractOptions {
            patterns,
            line_bucket: 5.0,
            min_rows: 2,
        }
    }

    fn word(text: &str, x0: f64, top: f64) -> Word {
        Word {
            text: text.to_string(),
            x0,
            top,
        }
    }

    fn cells(row: &[&str]) -> Vec<Option<String>> {
        row.iter().map(|c| Some(c.to_string())).collect()
    }

    #[derive(Default)]
    struct Calls {
        opened: Cell<usize>,
        released: Cell<usize>,
        tables: Cell<usize>,
        words: Cell<usize>,
        text: Cell<usize>,
    }

    struct CountingDoc {
        inner: LayoutDump,
        calls: Rc<Calls>,
    }

    impl Drop for CountingDoc {
        fn drop(&mut self) {
            self.calls.released.set(self.calls.released.get() + 1);
        }
    }

    impl Document for CountingDoc {
        fn page_count(&self) -> usize {
            self.inner.page_count()
        }
        fn tables(&self, page: usize) -> Result<Vec<Table>> {
            self.calls.tables.set(self.calls.tables.get() + 1);
            self.inner.tables(page)
        }
        fn words(&self, page: usize) -> Result<Vec<Word>> {
            self.calls.words.set(self.calls.words.get() + 1);
            self.inner.words(page)
        }
        fn text(&self, page: usize) -> Result<Option<String>> {
            self.calls.text.set(self.calls.text.get() + 1);
            self.inner.text(page)
        }
    }

    struct CountingSource {
        dump: LayoutDump,
        calls: Rc<Calls>,
    }

    impl Source for CountingSource {
        fn open(&self) -> Result<Box<dyn Document>> {
            self.calls.opened.set(self.calls.opened.get() + 1);
            Ok(Box::new(CountingDoc {
                inner: self.dump.clone(),
                calls: Rc::clone(&self.calls),
            }))
        }
    }

    struct BrokenSource;

    impl Source for BrokenSource {
        fn open(&self) -> Result<Box<dyn Document>> {
            Err(PassbookError::Pdf("truncated file".to_string()))
        }
    }

    #[test]
    fn test_table_success_skips_later_strategies() {
        let page = LayoutPage {
            tables: vec![vec![
                cells(&["Date", "Debit", "Credit", "Balance"]),
                cells(&["01/01/2024", "", "500", "1500"]),
            ]],
            words: vec![word("ignored", 0.0, 0.0), word("too", 0.0, 50.0)],
            text: Some("ignored\nas well".to_string()),
        };
        let calls = Rc::new(Calls::default());
        let source = CountingSource {
            dump: LayoutDump { pages: vec![page] },
            calls: Rc::clone(&calls),
        };
        let patterns = Patterns::new();
        let out = extract(&source, &opts(&patterns));
        assert_eq!(out.strategy, Some(Strategy::Table));
        assert_eq!(out.rows.len(), 2);
        assert_eq!(calls.opened.get(), 1);
        assert_eq!(calls.released.get(), 1);
        assert_eq!(calls.words.get(), 0);
        assert_eq!(calls.text.get(), 0);
    }

    #[test]
    fn test_each_strategy_releases_document() {
        let page = LayoutPage {
            text: Some("one line only".to_string()),
            ..LayoutPage::default()
        };
        let calls = Rc::new(Calls::default());
        let source = CountingSource {
            dump: LayoutDump { pages: vec![page] },
            calls: Rc::clone(&calls),
        };
        let patterns = Patterns::new();
        let out = extract(&source, &opts(&patterns));
        assert_eq!(calls.opened.get(), 3);
        assert_eq!(calls.released.get(), 3);
        assert_eq!(out.strategy, Some(Strategy::Lines));
        assert_eq!(out.rows, vec![vec!["one line only".to_string()]]);
    }

    #[test]
    fn test_table_rows_drop_blank_rows_and_trim() {
        let page = LayoutPage {
            tables: vec![vec![
                vec![Some("  Date ".into()), None, Some("Amount".into())],
                vec![None, Some("   ".into())],
                vec![Some("01/01/2024".into()), Some("x".into()), Some("5".into())],
            ]],
            ..LayoutPage::default()
        };
        let patterns = Patterns::new();
        let out = extract(&LayoutDump { pages: vec![page] }, &opts(&patterns));
        assert_eq!(out.strategy, Some(Strategy::Table));
        assert_eq!(out.rows[0], vec!["Date", "", "Amount"]);
        assert_eq!(out.rows.len(), 2);
    }

    #[test]
    fn test_positional_clusters_jittered_words() {
        let page = LayoutPage {
            words: vec![
                word("500.00", 300.0, 101.4),
                word("01/01/2024", 10.0, 99.0),
                word("Salary", 120.0, 100.2),
                word("02/01/2024", 10.0, 121.0),
                word("Rent", 120.0, 119.8),
            ],
            ..LayoutPage::default()
        };
        let patterns = Patterns::new();
        let out = extract(&LayoutDump { pages: vec![page] }, &opts(&patterns));
        assert_eq!(out.strategy, Some(Strategy::Positional));
        assert_eq!(
            out.rows,
            vec![
                vec!["01/01/2024", "Salary", "500.00"],
                vec!["02/01/2024", "Rent"],
            ]
        );
    }

    #[test]
    fn test_line_splitting_skips_footers() {
        let text = "Date  Narration  Amount\n01/01/2024  Salary credit  500.00\n\nPage 1 of 2\nContinued on next page\n";
        let page = LayoutPage {
            text: Some(text.to_string()),
            ..LayoutPage::default()
        };
        let patterns = Patterns::new();
        let out = extract(&LayoutDump { pages: vec![page] }, &opts(&patterns));
        assert_eq!(out.strategy, Some(Strategy::Lines));
        assert_eq!(
            out.rows,
            vec![
                vec!["Date", "Narration", "Amount"],
                vec!["01/01/2024", "Salary credit", "500.00"],
            ]
        );
    }

    #[test]
    fn test_partial_table_loses_to_line_result() {
        let page = LayoutPage {
            tables: vec![vec![cells(&["01/01/2024", "Salary", "500.00"])]],
            text: Some("01/01/2024  Salary  500.00".to_string()),
            ..LayoutPage::default()
        };
        let patterns = Patterns::new();
        let out = extract(&LayoutDump { pages: vec![page] }, &opts(&patterns));
        assert_eq!(out.strategy, Some(Strategy::Lines));
        assert_eq!(out.rows, vec![vec!["01/01/2024", "Salary", "500.00"]]);
    }

    #[test]
    fn test_partial_table_without_text_yields_nothing() {
        let page = LayoutPage {
            tables: vec![vec![cells(&["01/01/2024", "Salary", "500.00"])]],
            ..LayoutPage::default()
        };
        let patterns = Patterns::new();
        let out = extract(&LayoutDump { pages: vec![page] }, &opts(&patterns));
        assert_eq!(out.strategy, None);
        assert!(out.rows.is_empty());
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_pdf_words_reach_positional_strategy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stmt.pdf");
        crate::document::write_test_pdf(
            &path,
            &[
                (50, 700, "01/01/2024"),
                (200, 700, "Salary"),
                (400, 700, "500.00"),
                (50, 680, "02/01/2024"),
                (200, 680, "Rent"),
                (400, 680, "200.00"),
            ],
        );
        let patterns = Patterns::new();
        let out = extract(&crate::document::StatementFile::new(&path), &opts(&patterns));
        assert_eq!(out.strategy, Some(Strategy::Positional));
        assert_eq!(
            out.rows,
            vec![
                vec!["01/01/2024", "Salary", "500.00"],
                vec!["02/01/2024", "Rent", "200.00"],
            ]
        );
    }

    #[test]
    fn test_unopenable_source_yields_nothing() {
        let patterns = Patterns::new();
        let out = extract(&BrokenSource, &opts(&patterns));
        assert_eq!(out.strategy, None);
        assert!(out.rows.is_empty());
    }

    #[test]
    fn test_failing_page_does_not_abort_others() {
        struct HalfBroken;
        impl Document for HalfBroken {
            fn page_count(&self) -> usize {
                2
            }
            fn tables(&self, page: usize) -> Result<Vec<Table>> {
                if page == 0 {
                    Err(PassbookError::Pdf("bad page".into()))
                } else {
                    Ok(vec![vec![cells(&["a", "b"]), cells(&["c", "d"])]])
                }
            }
            fn words(&self, _page: usize) -> Result<Vec<Word>> {
                Ok(Vec::new())
            }
            fn text(&self, _page: usize) -> Result<Option<String>> {
                Ok(None)
            }
        }
        let patterns = Patterns::new();
        assert_eq!(table_rows(&HalfBroken, &opts(&patterns)).len(), 2);
    }

    #[test]
    fn test_page_lines_numbering() {
        let dump = LayoutDump {
            pages: vec![
                LayoutPage {
                    text: Some(" first \nsecond".into()),
                    ..LayoutPage::default()
                },
                LayoutPage {
                    text: Some("Page 2".into()),
                    ..LayoutPage::default()
                },
            ],
        };
        let lines = page_lines(&dump);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].content, "first");
        assert_eq!((lines[2].page, lines[2].line), (2, 1));
    }
}
