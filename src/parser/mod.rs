pub mod lines;
pub mod strategies;

use std::collections::HashSet;

pub use lines::{tokenize, Line, LineTag, DEFAULT_LOOK_AHEAD};
pub use strategies::StrategyKind;

use crate::records::CourseRecord;

/// Run one strategy over tokenized input and normalize the batch: duplicate
/// CRNs collapse to their first occurrence, unresolved fields become
/// sentinels, and availability is recomputed from the counts.
pub fn run_strategy(
    kind: StrategyKind,
    lines: &[Line],
    subject: &str,
    look_ahead: usize,
) -> Vec<CourseRecord> {
    let subject = subject.trim().to_uppercase();
    let mut records = kind.extract(lines, &subject, look_ahead);
    normalize_batch(&mut records);
    records
}

fn normalize_batch(records: &mut Vec<CourseRecord>) {
    let mut seen = HashSet::new();
    records.retain(|r| seen.insert(r.crn.clone()));
    for record in records.iter_mut() {
        record.fill_missing();
        record.derive_status();
    }
}
