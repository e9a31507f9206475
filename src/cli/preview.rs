use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::statement;
use crate::fmt::{amount, balance};
use crate::models::{Direction, Transaction};
use crate::pipeline::{Ledger, Pipeline};
use crate::settings::Settings;

pub fn run(file: &Path, settings: Settings) -> Result<()> {
    let source = statement(file)?;
    let ledger = Pipeline::new(settings)
        .run(&source)
        .with_context(|| format!("reading {}", file.display()))?;
    println!("{}", format_ledger(&ledger));
    Ok(())
}

fn type_cell(t: &Transaction) -> Cell {
    match t.direction {
        Direction::Receipt => Cell::new(t.direction.label().green()),
        Direction::Payment => Cell::new(t.direction.label().red()),
    }
}

pub fn format_ledger(ledger: &Ledger) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Sr No", "Date", "Description", "Type", "Amount", "Balance"]);
    for (i, t) in ledger.transactions.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(t.date.format("%Y-%m-%d")),
            Cell::new(&t.description),
            type_cell(t),
            Cell::new(amount(t.amount)).set_alignment(CellAlignment::Right),
            Cell::new(balance(t.balance)).set_alignment(CellAlignment::Right),
        ]);
    }

    let s = ledger.summary();
    let mut out = format!("{table}\n");
    out.push_str(&format!("Transactions:     {}\n", s.count));
    out.push_str(&format!("Receipts:         {}\n", amount(s.receipts).green()));
    out.push_str(&format!("Payments:         {}\n", amount(s.payments).red()));
    out.push_str(&format!("Opening balance:  {}\n", balance(s.opening_balance)));
    out.push_str(&format!("Closing balance:  {}", balance(s.closing_balance)));
    if !ledger.corrections.is_empty() {
        out.push_str(&format!(
            "\n{}",
            format!("{} amounts corrected from the running balance", ledger.corrections.len()).yellow()
        ));
    }
    out
}
