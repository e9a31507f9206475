use tracing::debug;

use crate::models::{ColumnRoleMap, Role, Row};
use crate::parse::{is_numeric_like, parse_date};

const DEBIT_SYNONYMS: &[&str] = &["debit", "dr", "withdrawal"];
const CREDIT_SYNONYMS: &[&str] = &["credit", "cr", "deposit", "receipt", "payment"];
const AMOUNT_SYNONYMS: &[&str] = &["amount", "amt"];
const BALANCE_MARKERS: &[&str] = &["balance", "bal"];

#[derive(Debug, Clone, Copy)]
pub struct IdentifyOptions {
    pub sample_rows: usize,
    pub day_first: bool,
}

/// Infer which column holds which role.
///
/// Header keywords in the first two rows come first; columns they assign
/// are final. A date column is then guessed from parseable dates and, when
/// no debit/credit header exists, amount and balance from numeric columns.
pub fn identify(rows: &[Row], opts: &IdentifyOptions) -> ColumnRoleMap {
    let mut map = ColumnRoleMap::default();
    if rows.is_empty() {
        return map;
    }

    for header in rows.iter().take(2) {
        // A row carrying a date is data, not a header.
        if header.iter().any(|c| parse_date(c, opts.day_first).is_some()) {
            continue;
        }
        for (col, cell) in header.iter().enumerate() {
            if map.is_assigned(col) {
                continue;
            }
            let low = cell.trim().to_lowercase();
            if low.is_empty() {
                continue;
            }
            if let Some(role) = header_role(&low, &map) {
                map.assign(role, col);
            }
        }
    }
    debug!(?map, "roles from headers");

    if map.date.is_none() {
        if let Some(col) = likely_date_column(rows, &map, opts) {
            map.assign(Role::Date, col);
        }
    }

    if map.debit.is_none() && map.credit.is_none() {
        let numeric = numeric_columns(rows, &map, opts);
        debug!(?numeric, "numeric column candidates");
        match numeric.as_slice() {
            [] => {}
            [only] => {
                map.assign(Role::Amount, *only);
            }
            [first, .., last] => {
                map.assign(Role::Amount, *first);
                map.assign(Role::Balance, *last);
            }
        }
    }

    debug!(?map, "column roles identified");
    map
}

fn has_word(words: &[&str], synonyms: &[&str]) -> bool {
    words.iter().any(|w| {
        synonyms
            .iter()
            .any(|s| *w == *s || w.strip_suffix('s') == Some(*s))
    })
}

/// First role, in debit/credit/balance/date/amount order, that the cell
/// names and that is still free.
fn header_role(low: &str, map: &ColumnRoleMap) -> Option<Role> {
    let words: Vec<&str> = low
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let hits = [
        (Role::Debit, has_word(&words, DEBIT_SYNONYMS)),
        (Role::Credit, has_word(&words, CREDIT_SYNONYMS)),
        (Role::Balance, BALANCE_MARKERS.iter().any(|m| low.contains(m))),
        (Role::Date, low.contains("date")),
        (Role::Amount, has_word(&words, AMOUNT_SYNONYMS)),
    ];
    hits.into_iter()
        .find(|(role, hit)| *hit && map.get(*role).is_none())
        .map(|(role, _)| role)
}

fn column_count(rows: &[Row]) -> usize {
    rows.iter().map(Vec::len).max().unwrap_or(0)
}

fn sample<'a>(rows: &'a [Row], opts: &IdentifyOptions) -> &'a [Row] {
    &rows[..rows.len().min(opts.sample_rows)]
}

/// Free column with the most parseable dates in the sample; ties keep the
/// leftmost.
fn likely_date_column(rows: &[Row], map: &ColumnRoleMap, opts: &IdentifyOptions) -> Option<usize> {
    let sample = sample(rows, opts);
    let mut best: Option<(usize, usize)> = None;
    for col in (0..column_count(rows)).filter(|c| !map.is_assigned(*c)) {
        let score = sample
            .iter()
            .filter(|row| row.get(col).is_some_and(|c| parse_date(c, opts.day_first).is_some()))
            .count();
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((col, score));
        }
    }
    best.map(|(col, _)| col)
}

/// Columns where at least half the sampled rows hold a numeric-looking cell.
///
/// Columns already named amount or balance stay in the pool, so an
/// unlabelled neighbour still lines up as first or last; `assign` keeps
/// their header roles.
fn numeric_columns(rows: &[Row], map: &ColumnRoleMap, opts: &IdentifyOptions) -> Vec<usize> {
    let sample = sample(rows, opts);
    (0..column_count(rows))
        .filter(|c| matches!(map.role_of(*c), None | Some(Role::Amount | Role::Balance)))
        .filter(|&col| {
            let hits = sample
                .iter()
                .filter(|row| row.get(col).is_some_and(|c| is_numeric_like(c)))
                .count();
            hits * 2 >= sample.len()
        })
        .collect()
}
