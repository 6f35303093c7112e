//! Strategy selection. The registry is explicit configuration handed to the
//! coordinator at construction, so extraction runs stay reproducible; the only
//! mutable state is the per-strategy outcome tally.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::parser::StrategyKind;

#[derive(Debug, Clone)]
pub struct StrategyEntry {
    pub kind: StrategyKind,
    /// Lower priority is tried first.
    pub priority: u8,
    /// Subject codes this entry applies to; `None` applies to every subject.
    pub subjects: Option<Vec<String>>,
}

impl StrategyEntry {
    pub fn general(kind: StrategyKind, priority: u8) -> Self {
        Self { kind, priority, subjects: None }
    }

    pub fn for_subjects(kind: StrategyKind, priority: u8, subjects: &[&str]) -> Self {
        Self {
            kind,
            priority,
            subjects: Some(subjects.iter().map(|s| s.trim().to_uppercase()).collect()),
        }
    }

    fn applies_to(&self, subject: &str) -> bool {
        self.subjects
            .as_ref()
            .map_or(true, |codes| codes.iter().any(|code| code == subject))
    }
}

#[derive(Debug, Default)]
struct Outcomes {
    attempts: u32,
    successes: u32,
}

#[derive(Debug)]
pub struct StrategyRegistry {
    entries: Vec<StrategyEntry>,
    outcomes: Mutex<HashMap<StrategyKind, Outcomes>>,
}

impl StrategyRegistry {
    pub fn new(entries: Vec<StrategyEntry>) -> Self {
        Self { entries, outcomes: Mutex::new(HashMap::new()) }
    }

    /// Candidates for a subject in try-order: ascending priority, with
    /// subject-specific entries before general ones on priority ties and
    /// insertion order breaking the rest. A subject no entry claims falls back
    /// to the general entries so the coordinator always has a candidate when
    /// any general entry exists.
    pub fn candidates_for(&self, subject: &str) -> Vec<StrategyKind> {
        let subject = subject.trim().to_uppercase();
        let mut matched: Vec<&StrategyEntry> =
            self.entries.iter().filter(|e| e.applies_to(&subject)).collect();
        if matched.is_empty() {
            matched = self.entries.iter().filter(|e| e.subjects.is_none()).collect();
        }
        matched.sort_by_key(|e| (e.priority, e.subjects.is_none()));
        matched.iter().map(|e| e.kind).collect()
    }

    /// Record whether a run of `kind` met the pass threshold.
    pub fn record_outcome(&self, kind: StrategyKind, met_threshold: bool) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            let entry = outcomes.entry(kind).or_default();
            entry.attempts += 1;
            if met_threshold {
                entry.successes += 1;
            }
        }
    }

    /// Historical success rate, if `kind` has been tried at all.
    pub fn success_rate(&self, kind: StrategyKind) -> Option<f64> {
        let outcomes = self.outcomes.lock().ok()?;
        let tally = outcomes.get(&kind)?;
        if tally.attempts == 0 {
            return None;
        }
        Some(tally.successes as f64 / tally.attempts as f64)
    }
}

impl Default for StrategyRegistry {
    /// Header-driven mapping first, positional table mapping second, the
    /// fixed line matcher as the last resort.
    fn default() -> Self {
        Self::new(vec![
            StrategyEntry::general(StrategyKind::SmartHeader, 1),
            StrategyEntry::general(StrategyKind::DynamicColumn, 2),
            StrategyEntry::general(StrategyKind::FixedPattern, 3),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_order_prefers_header_mapping() {
        let registry = StrategyRegistry::default();
        assert_eq!(
            registry.candidates_for("COMM"),
            vec![
                StrategyKind::SmartHeader,
                StrategyKind::DynamicColumn,
                StrategyKind::FixedPattern,
            ]
        );
    }

    #[test]
    fn priority_orders_candidates() {
        let registry = StrategyRegistry::new(vec![
            StrategyEntry::general(StrategyKind::FixedPattern, 3),
            StrategyEntry::general(StrategyKind::SmartHeader, 1),
        ]);
        assert_eq!(
            registry.candidates_for("MATH"),
            vec![StrategyKind::SmartHeader, StrategyKind::FixedPattern]
        );
    }

    #[test]
    fn subject_specific_wins_priority_ties() {
        let registry = StrategyRegistry::new(vec![
            StrategyEntry::general(StrategyKind::SmartHeader, 1),
            StrategyEntry::for_subjects(StrategyKind::FixedPattern, 1, &["COMM"]),
        ]);
        assert_eq!(
            registry.candidates_for("comm"),
            vec![StrategyKind::FixedPattern, StrategyKind::SmartHeader]
        );
        assert_eq!(registry.candidates_for("BIOL"), vec![StrategyKind::SmartHeader]);
    }

    #[test]
    fn unclaimed_subject_falls_back_to_general_entries() {
        let registry = StrategyRegistry::new(vec![
            StrategyEntry::for_subjects(StrategyKind::SmartHeader, 1, &["COMM"]),
            StrategyEntry::general(StrategyKind::FixedPattern, 2),
        ]);
        assert_eq!(registry.candidates_for("MATH"), vec![StrategyKind::FixedPattern]);
    }

    #[test]
    fn outcome_tally_feeds_success_rate() {
        let registry = StrategyRegistry::default();
        assert_eq!(registry.success_rate(StrategyKind::SmartHeader), None);

        registry.record_outcome(StrategyKind::SmartHeader, true);
        registry.record_outcome(StrategyKind::SmartHeader, true);
        registry.record_outcome(StrategyKind::SmartHeader, false);
        let rate = registry.success_rate(StrategyKind::SmartHeader).unwrap();
        assert!((rate - 2.0 / 3.0).abs() < 1e-9);
    }
}
