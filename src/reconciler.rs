//! Running-balance reconciliation.
//!
//! Each transaction is checked against its predecessor's reported balance:
//! whichever direction (balance minus or plus the amount) reproduces the
//! current balance assigns Payment or Receipt. When neither does, the two
//! balances are trusted over the parsed amount and the amount is rewritten
//! to their difference.

use serde::Serialize;
use tracing::debug;

use crate::models::{Candidate, Direction, Transaction};

/// An amount rewritten to match the balance movement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correction {
    /// Position in the reconciled ledger.
    pub index: usize,
    pub reported: f64,
    pub corrected: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub transactions: Vec<Transaction>,
    pub corrections: Vec<Correction>,
}

enum Settlement {
    Matched(Direction),
    Corrected { direction: Direction, amount: f64 },
}

fn settle(previous: f64, current: f64, reported: f64, tolerance: f64) -> Settlement {
    let magnitude = reported.abs();
    let diff_payment = (previous - magnitude - current).abs();
    let diff_receipt = (previous + magnitude - current).abs();

    if diff_payment < tolerance && diff_payment < diff_receipt {
        return Settlement::Matched(Direction::Payment);
    }
    if diff_receipt < tolerance && diff_receipt < diff_payment {
        return Settlement::Matched(Direction::Receipt);
    }

    let amount = (current - previous).abs();
    let direction = if (previous - amount - current).abs() < tolerance {
        Direction::Payment
    } else {
        Direction::Receipt
    };
    Settlement::Corrected { direction, amount }
}

/// Fold candidates into final transactions, every one with a direction.
///
/// Pairs where either side lacks a reported balance keep the builder's
/// direction, or Receipt when it had none. A ledger with no balances at all
/// therefore comes out as all Receipts except rows typed from debit columns.
pub fn reconcile(candidates: Vec<Candidate>, tolerance: f64) -> Reconciliation {
    if !candidates.iter().any(|c| c.balance.is_some()) {
        debug!("no running balance reported, directions come from columns only");
    }

    candidates.into_iter().enumerate().fold(
        Reconciliation::default(),
        |mut acc, (index, candidate)| {
            let previous = acc.transactions.last().and_then(|t| t.balance);
            let (direction, amount) = match (previous, candidate.balance) {
                (Some(prev), Some(curr)) => match settle(prev, curr, candidate.amount, tolerance) {
                    Settlement::Matched(direction) => (direction, candidate.amount),
                    Settlement::Corrected { direction, amount } => {
                        if amount != candidate.amount {
                            debug!(
                                index,
                                reported = candidate.amount,
                                corrected = amount,
                                "amount corrected from balance movement"
                            );
                            acc.corrections.push(Correction {
                                index,
                                reported: candidate.amount,
                                corrected: amount,
                            });
                        }
                        (direction, amount)
                    }
                },
                _ => (candidate.direction.unwrap_or(Direction::Receipt), candidate.amount),
            };
            acc.transactions.push(Transaction {
                date: candidate.date,
                description: candidate.description,
                amount,
                balance: candidate.balance,
                direction,
            });
            acc
        },
    )
}
