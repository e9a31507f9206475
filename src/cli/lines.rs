use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::statement;
use crate::document::Source;
use crate::export::write_lines_csv;
use crate::extractor::page_lines;

pub fn run(file: &Path, out: Option<&Path>) -> Result<()> {
    let source = statement(file)?;
    let lines = {
        let doc = source
            .open()
            .with_context(|| format!("opening {}", file.display()))?;
        page_lines(doc.as_ref())
    };
    if lines.is_empty() {
        tracing::warn!(file = %file.display(), "document has no text lines");
    }

    match out {
        Some(path) => {
            let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            write_lines_csv(&lines, BufWriter::new(f))?;
            eprintln!("Wrote {} lines to {}", lines.len(), path.display());
        }
        None => write_lines_csv(&lines, io::stdout().lock())?,
    }
    Ok(())
}
