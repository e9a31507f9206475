use std::sync::OnceLock;

use regex::Regex;

const FOOTERS: &[&str] = &[
    r"(?i)^\s*page\s+\d+(\s+of\s+\d+)?\s*$",
    r"(?i)system generated.*statement",
    r"(?i)continued on next page",
];

// An optional trailing amount keeps "Opening Balance 1,000.00 Cr" on the anchor side.
const OPENING_BALANCE: &[&str] = &[
    r"(?i)^\s*opening balance(\s+-?[\d,]+(\.\d+)?(\s*(dr|cr))?)?\s*$",
    r"(?i)^\s*b/f(\s+-?[\d,]+(\.\d+)?(\s*(dr|cr))?)?\s*$",
    r"(?i)^\s*balance brought forward(\s+-?[\d,]+(\.\d+)?(\s*(dr|cr))?)?\s*$",
];

/// Compiled line classifiers shared by the extractor and the builder.
pub struct Patterns {
    footers: Vec<Regex>,
    opening_balance: Vec<Regex>,
    column_gap: Regex,
}

fn compile(sources: &[&str]) -> Vec<Regex> {
    sources
        .iter()
        .map(|s| Regex::new(s).expect("static pattern"))
        .collect()
}

impl Patterns {
    pub fn new() -> Self {
        Self {
            footers: compile(FOOTERS),
            opening_balance: compile(OPENING_BALANCE),
            column_gap: Regex::new(r"\s{2,}").expect("column gap pattern"),
        }
    }

    pub fn shared() -> &'static Patterns {
        static PATTERNS: OnceLock<Patterns> = OnceLock::new();
        PATTERNS.get_or_init(Patterns::new)
    }

    /// Page numbers, "continued on next page" and statement boilerplate.
    pub fn is_footer(&self, line: &str) -> bool {
        let low = line.trim().to_lowercase();
        self.footers.iter().any(|re| re.is_match(&low))
    }

    /// Whole-row match of a balance-only anchor line.
    pub fn is_opening_balance(&self, joined: &str) -> bool {
        let low = joined.trim().to_lowercase();
        self.opening_balance.iter().any(|re| re.is_match(&low))
    }

    /// Split a text line on runs of two or more whitespace characters.
    pub fn split_columns(&self, line: &str) -> Vec<String> {
        self.column_gap
            .split(line)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for Patterns {
    fn default() -> Self {
        Self::new()
    }
}
