use tracing::debug;

use crate::models::Candidate;

/// Put a newest-first statement into oldest-first order.
///
/// Only the first and last dates are compared, and the whole sequence is
/// reversed when the first is later. Same-day order from the source is
/// left as printed.
pub fn normalize(mut txns: Vec<Candidate>) -> Vec<Candidate> {
    if let [first, .., last] = txns.as_slice() {
        if first.date > last.date {
            debug!(first = %first.date, last = %last.date, "statement is newest-first, reversing");
            txns.reverse();
        }
    }
    txns
}
