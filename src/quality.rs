//! Heuristic confidence scoring over an extracted batch. The checks are
//! field-shape heuristics tuned against known subjects, so their thresholds
//! are configuration, not contracts.

use serde::Serialize;

use crate::records::{CourseRecord, TBA};

const W_WAITLIST: u32 = 30;
const W_CAMPUS: u32 = 25;
const W_INSTRUCTOR: u32 = 20;
const W_LOCATION: u32 = 15;
const W_CONSISTENCY: u32 = 10;

#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Fraction of records with a non-zero waitlist that a healthy extraction
    /// of a popular term exceeds.
    pub waitlist_diversity_min: f64,
    pub campus_completeness_min: f64,
    pub instructor_completeness_min: f64,
    pub location_completeness_min: f64,
    /// Fraction of records whose CRN is 5-digit numeric.
    pub consistency_min: f64,
    /// Batches scoring below this are marked `needs_improvement`.
    pub pass_threshold: u8,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            waitlist_diversity_min: 0.10,
            campus_completeness_min: 0.90,
            instructor_completeness_min: 0.80,
            location_completeness_min: 0.70,
            consistency_min: 0.95,
            pass_threshold: 75,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckScore {
    pub name: &'static str,
    pub fraction: f64,
    pub threshold: f64,
    pub weight: u32,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub checks: Vec<CheckScore>,
    pub total: u8,
}

pub fn score(records: &[CourseRecord], config: &ScoreConfig) -> u8 {
    breakdown(records, config).total
}

pub fn needs_improvement(score: u8, config: &ScoreConfig) -> bool {
    score < config.pass_threshold
}

/// Per-check fractions and pass/fail, for validation reports. Each check is
/// binary: full weight when its fraction exceeds the threshold, zero
/// otherwise, and monotonic in the underlying fraction.
pub fn breakdown(records: &[CourseRecord], config: &ScoreConfig) -> ScoreBreakdown {
    if records.is_empty() {
        return ScoreBreakdown { checks: Vec::new(), total: 0 };
    }

    let fraction_where = |predicate: fn(&CourseRecord) -> bool| {
        records.iter().filter(|&r| predicate(r)).count() as f64 / records.len() as f64
    };

    let checks = vec![
        check(
            "waitlist diversity",
            fraction_where(|r| r.waitlist_count > 0),
            config.waitlist_diversity_min,
            W_WAITLIST,
        ),
        check(
            "campus completeness",
            fraction_where(|r| r.campus != TBA),
            config.campus_completeness_min,
            W_CAMPUS,
        ),
        check(
            "instructor completeness",
            fraction_where(|r| r.instructor != TBA),
            config.instructor_completeness_min,
            W_INSTRUCTOR,
        ),
        check(
            "location completeness",
            fraction_where(|r| r.location != TBA),
            config.location_completeness_min,
            W_LOCATION,
        ),
        check(
            "consistency",
            fraction_where(CourseRecord::has_valid_crn),
            config.consistency_min,
            W_CONSISTENCY,
        ),
    ];

    let total = checks.iter().filter(|c| c.passed).map(|c| c.weight).sum::<u32>() as u8;
    ScoreBreakdown { checks, total }
}

fn check(name: &'static str, fraction: f64, threshold: f64, weight: u32) -> CheckScore {
    CheckScore { name, fraction, threshold, weight, passed: fraction > threshold }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(waitlist: u32, campus: &str, instructor: &str, location: &str) -> CourseRecord {
        let mut r = CourseRecord::placeholder("COMM108", "20388");
        r.waitlist_count = waitlist;
        r.campus = campus.to_string();
        r.instructor = instructor.to_string();
        r.location = location.to_string();
        r.derive_status();
        r
    }

    fn complete_record(waitlist: u32) -> CourseRecord {
        record(waitlist, "Rockville", "Teodora Salow", "TA 210")
    }

    #[test]
    fn empty_batch_scores_zero() {
        assert_eq!(score(&[], &ScoreConfig::default()), 0);
    }

    #[test]
    fn fully_populated_batch_scores_full_marks() {
        let records: Vec<_> = (0..10u32).map(|i| {
            let mut r = complete_record(if i < 3 { i } else { 0 });
            r.crn = format!("2038{}", i);
            r
        }).collect();
        // 2 of 10 waitlisted, all fields complete, all CRNs valid.
        assert_eq!(score(&records, &ScoreConfig::default()), 100);
    }

    #[test]
    fn missing_fields_drop_their_checks() {
        let records: Vec<_> = (0..10).map(|i| {
            let mut r = record(1, TBA, TBA, TBA);
            r.crn = format!("2038{}", i);
            r
        }).collect();
        // Only waitlist diversity (30) and consistency (10) hold.
        assert_eq!(score(&records, &ScoreConfig::default()), 40);
    }

    #[test]
    fn threshold_must_be_exceeded_not_met() {
        // Exactly 10% waitlisted does not pass the >10% diversity gate.
        let records: Vec<_> = (0..10).map(|i| {
            let mut r = complete_record(if i == 0 { 4 } else { 0 });
            r.crn = format!("2038{}", i);
            r
        }).collect();
        let report = breakdown(&records, &ScoreConfig::default());
        let diversity = &report.checks[0];
        assert_eq!(diversity.name, "waitlist diversity");
        assert!(!diversity.passed);
        assert_eq!(report.total, 70);
    }

    #[test]
    fn diversity_contribution_is_monotonic() {
        let below: Vec<_> = (0..10).map(|i| {
            let mut r = complete_record(if i == 0 { 4 } else { 0 });
            r.crn = format!("2038{}", i);
            r
        }).collect();
        let config = ScoreConfig::default();
        let contribution = |records: &[CourseRecord]| {
            breakdown(records, &config)
                .checks
                .iter()
                .find(|c| c.name == "waitlist diversity")
                .map(|c| if c.passed { c.weight } else { 0 })
                .unwrap()
        };
        let before = contribution(&below);

        let mut grown = below.clone();
        let mut extra = complete_record(7);
        extra.crn = "99999".to_string();
        grown.push(extra);
        assert!(contribution(&grown) >= before);
        assert_eq!(contribution(&grown), W_WAITLIST);
    }

    #[test]
    fn invalid_crns_fail_consistency() {
        let records: Vec<_> = (0..4).map(|i| {
            let mut r = complete_record(1);
            r.crn = format!("bad-{}", i);
            r
        }).collect();
        let report = breakdown(&records, &ScoreConfig::default());
        assert!(!report.checks.last().unwrap().passed);
        assert_eq!(report.total, 90);
    }

    #[test]
    fn thresholds_are_configurable() {
        let records: Vec<_> = (0..10).map(|i| {
            let mut r = complete_record(0);
            r.crn = format!("2038{}", i);
            r
        }).collect();
        let relaxed = ScoreConfig { waitlist_diversity_min: -0.1, ..ScoreConfig::default() };
        assert_eq!(score(&records, &ScoreConfig::default()), 70);
        assert_eq!(score(&records, &relaxed), 100);
    }

    #[test]
    fn needs_improvement_below_threshold() {
        let config = ScoreConfig::default();
        assert!(needs_improvement(74, &config));
        assert!(!needs_improvement(75, &config));
    }
}
