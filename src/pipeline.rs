//! The five stages wired together: extract, identify, build, normalize,
//! reconcile. Each stage consumes the previous one's output in full.

use serde::Serialize;
use tracing::{debug, info};

use crate::builder::build;
use crate::document::Source;
use crate::error::{PassbookError, Result};
use crate::extractor::{self, ExtractOptions, Extraction, Strategy};
use crate::identifier::{identify, IdentifyOptions};
use crate::models::{ColumnRoleMap, Direction, Row, Transaction};
use crate::normalizer::normalize;
use crate::patterns::Patterns;
use crate::reconciler::{reconcile, Correction};
use crate::settings::Settings;

pub struct Pipeline {
    settings: Settings,
    patterns: &'static Patterns,
}

/// Result of one run, plus what the run learned about the document.
#[derive(Debug, Clone, Serialize)]
pub struct Ledger {
    pub strategy: Option<Strategy>,
    pub rows_extracted: usize,
    pub roles: ColumnRoleMap,
    pub transactions: Vec<Transaction>,
    pub corrections: Vec<Correction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub receipts: f64,
    pub payments: f64,
    /// First reported balance in ledger order.
    pub opening_balance: Option<f64>,
    /// Last reported balance in ledger order.
    pub closing_balance: Option<f64>,
}

impl Ledger {
    pub fn summary(&self) -> Summary {
        let total = |direction: Direction| -> f64 {
            self.transactions
                .iter()
                .filter(|t| t.direction == direction)
                .map(|t| t.amount)
                .sum()
        };
        Summary {
            count: self.transactions.len(),
            receipts: total(Direction::Receipt),
            payments: total(Direction::Payment),
            opening_balance: self.transactions.iter().find_map(|t| t.balance),
            closing_balance: self.transactions.iter().rev().find_map(|t| t.balance),
        }
    }
}

impl Pipeline {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            patterns: Patterns::shared(),
        }
    }

    pub fn extract(&self, source: &dyn Source) -> Extraction {
        let opts = ExtractOptions {
            patterns: self.patterns,
            line_bucket: self.settings.line_bucket,
            min_rows: self.settings.min_rows,
        };
        extractor::extract(source, &opts)
    }

    pub fn identify(&self, rows: &[Row]) -> ColumnRoleMap {
        identify(
            rows,
            &IdentifyOptions {
                sample_rows: self.settings.sample_rows,
                day_first: self.settings.day_first,
            },
        )
    }

    pub fn run(&self, source: &dyn Source) -> Result<Ledger> {
        let extraction = self.extract(source);
        if extraction.rows.is_empty() {
            return Err(PassbookError::NoRows);
        }
        let mut ledger = self.process_rows(&extraction.rows)?;
        ledger.strategy = extraction.strategy;
        Ok(ledger)
    }

    /// Everything after extraction. Rows from any origin are accepted.
    pub fn process_rows(&self, rows: &[Row]) -> Result<Ledger> {
        if rows.is_empty() {
            return Err(PassbookError::NoRows);
        }
        let roles = self.identify(rows);
        if roles.date.is_none() {
            return Err(PassbookError::NoDateColumn { rows: rows.len() });
        }

        let candidates = build(rows, &roles, self.patterns, self.settings.day_first);
        debug!(rows = rows.len(), candidates = candidates.len(), "rows built");
        if candidates.is_empty() {
            return Err(PassbookError::NoTransactions { rows: rows.len() });
        }

        let reconciled = reconcile(normalize(candidates), self.settings.tolerance);
        info!(
            transactions = reconciled.transactions.len(),
            corrections = reconciled.corrections.len(),
            "ledger reconciled"
        );
        Ok(Ledger {
            strategy: None,
            rows_extracted: rows.len(),
            roles,
            transactions: reconciled.transactions,
            corrections: reconciled.corrections,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
