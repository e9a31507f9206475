use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One extracted line of a statement: trimmed text cells, column count varies.
pub type Row = Vec<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Date,
    Debit,
    Credit,
    Amount,
    Balance,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Date,
        Role::Debit,
        Role::Credit,
        Role::Amount,
        Role::Balance,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Debit => "debit",
            Self::Credit => "credit",
            Self::Amount => "amount",
            Self::Balance => "balance",
        }
    }
}

/// Semantic role of each column position. No two roles share a column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnRoleMap {
    pub date: Option<usize>,
    pub debit: Option<usize>,
    pub credit: Option<usize>,
    pub amount: Option<usize>,
    pub balance: Option<usize>,
}

impl ColumnRoleMap {
    pub fn get(&self, role: Role) -> Option<usize> {
        match role {
            Role::Date => self.date,
            Role::Debit => self.debit,
            Role::Credit => self.credit,
            Role::Amount => self.amount,
            Role::Balance => self.balance,
        }
    }

    fn slot(&mut self, role: Role) -> &mut Option<usize> {
        match role {
            Role::Date => &mut self.date,
            Role::Debit => &mut self.debit,
            Role::Credit => &mut self.credit,
            Role::Amount => &mut self.amount,
            Role::Balance => &mut self.balance,
        }
    }

    /// Assign `col` to `role` unless the role is taken or the column already
    /// carries another role. Returns whether the assignment happened.
    pub fn assign(&mut self, role: Role, col: usize) -> bool {
        if self.get(role).is_some() || self.role_of(col).is_some() {
            return false;
        }
        *self.slot(role) = Some(col);
        true
    }

    pub fn role_of(&self, col: usize) -> Option<Role> {
        Role::ALL.into_iter().find(|r| self.get(*r) == Some(col))
    }

    pub fn is_assigned(&self, col: usize) -> bool {
        self.role_of(col).is_some()
    }

    pub fn is_empty(&self) -> bool {
        Role::ALL.iter().all(|r| self.get(*r).is_none())
    }

    pub fn assigned(&self) -> impl Iterator<Item = (Role, usize)> + '_ {
        Role::ALL
            .into_iter()
            .filter_map(|r| self.get(r).map(|col| (r, col)))
    }
}

/// Direction of money movement relative to the account holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Payment,
    Receipt,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Payment => "Payment",
            Self::Receipt => "Receipt",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A transaction as built from a row, before reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub date: NaiveDate,
    pub description: String,
    /// Non-negative magnitude.
    pub amount: f64,
    /// Reported running balance; a zero cell counts as not reported.
    pub balance: Option<f64>,
    pub direction: Option<Direction>,
}

/// A reconciled ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub balance: Option<f64>,
    pub direction: Direction,
}
