use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::extractor::PageLine;
use crate::models::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

#[derive(Serialize)]
struct CsvRecord<'a> {
    #[serde(rename = "Sr No")]
    sr_no: usize,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Description")]
    description: &'a str,
    #[serde(rename = "Type")]
    kind: &'static str,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Balance")]
    balance: String,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    sr_no: usize,
    date: String,
    description: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    amount: f64,
    balance: Option<f64>,
}

/// One CSV row per transaction, numbered from 1 in ledger order.
pub fn write_csv<W: Write>(txns: &[Transaction], out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for (i, t) in txns.iter().enumerate() {
        wtr.serialize(CsvRecord {
            sr_no: i + 1,
            date: t.date.format("%Y-%m-%d").to_string(),
            description: &t.description,
            kind: t.direction.label(),
            amount: format!("{:.2}", t.amount),
            balance: t.balance.map(|b| format!("{b:.2}")).unwrap_or_default(),
        })?;
    }
    if txns.is_empty() {
        wtr.write_record(["Sr No", "Date", "Description", "Type", "Amount", "Balance"])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(txns: &[Transaction], mut out: W) -> Result<()> {
    let records: Vec<JsonRecord<'_>> = txns
        .iter()
        .enumerate()
        .map(|(i, t)| JsonRecord {
            sr_no: i + 1,
            date: t.date.format("%Y-%m-%d").to_string(),
            description: &t.description,
            kind: t.direction.label(),
            amount: t.amount,
            balance: t.balance,
        })
        .collect();
    serde_json::to_writer_pretty(&mut out, &records)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_ledger<W: Write>(txns: &[Transaction], format: OutputFormat, out: W) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(txns, out),
        OutputFormat::Json => write_json(txns, out),
    }
}

/// `Page #, Line #, Content` rows for the line dump.
pub fn write_lines_csv<W: Write>(lines: &[PageLine], out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for line in lines {
        wtr.serialize(line)?;
    }
    if lines.is_empty() {
        wtr.write_record(["Page #", "Line #", "Content"])?;
    }
    wtr.flush()?;
    Ok(())
}
