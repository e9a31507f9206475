use tracing::trace;

use crate::models::{Candidate, ColumnRoleMap, Direction, Row};
use crate::parse::{parse_amount, parse_date};
use crate::patterns::Patterns;

/// Turn rows into candidate transactions, dropping rows that are not
/// transactions: opening-balance anchors, rows without a parseable date,
/// and rows with neither an amount nor a balance.
pub fn build(rows: &[Row], map: &ColumnRoleMap, patterns: &Patterns, day_first: bool) -> Vec<Candidate> {
    rows.iter()
        .filter_map(|row| build_row(row, map, patterns, day_first))
        .collect()
}

fn cell_value(row: &Row, col: Option<usize>) -> Option<f64> {
    let cell = row.get(col?)?.trim();
    if cell.is_empty() {
        None
    } else {
        Some(parse_amount(cell))
    }
}

fn build_row(row: &Row, map: &ColumnRoleMap, patterns: &Patterns, day_first: bool) -> Option<Candidate> {
    if patterns.is_opening_balance(&row.join(" ")) {
        trace!(?row, "opening balance row skipped");
        return None;
    }

    let Some(date) = map
        .date
        .and_then(|col| row.get(col))
        .and_then(|cell| parse_date(cell, day_first))
    else {
        trace!(?row, "no date");
        return None;
    };

    let mut amount = 0.0;
    let mut direction = None;
    if let Some(v) = cell_value(row, map.debit).filter(|v| *v != 0.0) {
        amount = v.abs();
        direction = Some(Direction::Payment);
    }
    // Credit is read after debit, so a row with both filled is a receipt.
    if let Some(v) = cell_value(row, map.credit).filter(|v| *v != 0.0) {
        amount = v.abs();
        direction = Some(Direction::Receipt);
    }
    if amount == 0.0 {
        if let Some(v) = cell_value(row, map.amount) {
            amount = v.abs();
        }
    }

    let balance = cell_value(row, map.balance).filter(|v| *v != 0.0);

    let description = row
        .iter()
        .enumerate()
        .filter(|(col, _)| !map.is_assigned(*col))
        .map(|(_, cell)| cell.trim())
        .filter(|cell| !cell.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if amount == 0.0 && direction.is_none() && balance.is_none() {
        trace!(?row, "no amount or balance");
        return None;
    }

    Some(Candidate {
        date,
        description,
        amount,
        balance,
        direction,
    })
}
