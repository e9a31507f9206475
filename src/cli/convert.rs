use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::statement;
use crate::export::{write_ledger, OutputFormat};
use crate::pipeline::Pipeline;
use crate::settings::Settings;

pub fn run(file: &Path, out: Option<&Path>, format: OutputFormat, settings: Settings) -> Result<()> {
    let source = statement(file)?;
    let ledger = Pipeline::new(settings)
        .run(&source)
        .with_context(|| format!("converting {}", file.display()))?;

    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            write_ledger(&ledger.transactions, format, BufWriter::new(f))?;
        }
        None => write_ledger(&ledger.transactions, format, io::stdout().lock())?,
    }

    let summary = ledger.summary();
    let strategy = ledger.strategy.map_or("none", |s| s.label());
    eprintln!(
        "{}: {} rows via {}, {} transactions, {} amounts corrected",
        source.format.name(),
        ledger.rows_extracted,
        strategy,
        summary.count,
        ledger.corrections.len()
    );
    if let Some(path) = out {
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}
