use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::statement;
use crate::models::{ColumnRoleMap, Row};
use crate::pipeline::Pipeline;
use crate::settings::Settings;

pub fn run(file: &Path, rows: usize, settings: Settings) -> Result<()> {
    let source = statement(file)?;
    let pipeline = Pipeline::new(settings);
    let extraction = pipeline.extract(&source);

    println!("Format:     {}", source.format.name());
    match extraction.strategy {
        Some(strategy) => println!("Strategy:   {}", strategy.label()),
        None => {
            println!("Strategy:   {}", "none (no rows extracted)".red());
            return Ok(());
        }
    }
    println!("Rows:       {}", extraction.rows.len());

    let roles = pipeline.identify(&extraction.rows);
    println!();
    println!("{}", format_roles(&roles));
    if roles.date.is_none() {
        println!("{}", "No date column found; conversion will fail.".yellow());
    }
    println!();
    println!("{}", format_rows(&extraction.rows, &roles, rows));
    Ok(())
}

pub fn format_roles(roles: &ColumnRoleMap) -> String {
    if roles.is_empty() {
        return "Column roles: none identified".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Role", "Column"]);
    for (role, col) in roles.assigned() {
        table.add_row(vec![Cell::new(role.key()), Cell::new(col)]);
    }
    format!("Column roles\n{table}")
}

/// The first `limit` rows, headed by column index and role.
pub fn format_rows(rows: &[Row], roles: &ColumnRoleMap, limit: usize) -> String {
    let width = rows.iter().take(limit).map(Vec::len).max().unwrap_or(0);
    let mut table = Table::new();
    table.set_header(
        (0..width)
            .map(|col| match roles.role_of(col) {
                Some(role) => format!("{col} {}", role.key()),
                None => col.to_string(),
            })
            .collect::<Vec<_>>(),
    );
    for row in rows.iter().take(limit) {
        table.add_row(row.iter().map(Cell::new).collect::<Vec<_>>());
    }
    let shown = rows.len().min(limit);
    format!("First {shown} of {} rows\n{table}", rows.len())
}
