pub mod columns;
pub mod fixed;
pub mod header_map;

use std::sync::LazyLock;

use regex::Regex;

use crate::parser::lines::Line;
use crate::records::{CourseRecord, TBA};

/// The extraction strategies, in the order the default registry prefers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    SmartHeader,
    DynamicColumn,
    FixedPattern,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::SmartHeader,
        StrategyKind::DynamicColumn,
        StrategyKind::FixedPattern,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::SmartHeader => "SmartHeaderColumnMapper",
            StrategyKind::DynamicColumn => "DynamicColumnTableMatcher",
            StrategyKind::FixedPattern => "FixedPatternLineMatcher",
        }
    }

    /// Run the variant. Never errors; malformed input yields fewer or more
    /// sentinel-filled records, which the scorer then judges.
    pub(crate) fn extract(self, lines: &[Line], subject: &str, look_ahead: usize) -> Vec<CourseRecord> {
        match self {
            StrategyKind::SmartHeader => header_map::extract(lines, subject),
            StrategyKind::DynamicColumn => columns::extract(lines, subject),
            StrategyKind::FixedPattern => fixed::extract(lines, subject, look_ahead),
        }
    }
}

// ── Cell and field helpers shared by the variants ──

static MULTI_SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());
pub(crate) static TIME_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,2}:\d{2}\s*(?:AM|PM)\s*-\s*\d{1,2}:\d{2}\s*(?:AM|PM)").unwrap()
});
pub(crate) static DATE_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}/\d{2}/\d{2}\s*-\s*\d{2}/\d{2}/\d{2}").unwrap());
pub(crate) static CREDITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}\.\d{1,3}$").unwrap());
pub(crate) static LOCATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{1,4}\s?\d{1,4}[A-Z]?$").unwrap());

/// Split a row into cells: tab-delimited when tabs are present, otherwise runs
/// of two or more spaces. Empty cells are kept so column indexes stay aligned.
pub(crate) fn split_cells(text: &str) -> Vec<String> {
    if text.contains('\t') {
        text.split('\t').map(|c| c.trim().to_string()).collect()
    } else {
        MULTI_SPACE_RE.split(text).map(|c| c.trim().to_string()).collect()
    }
}

pub(crate) fn non_empty(cells: &[String]) -> usize {
    cells.iter().filter(|c| !c.is_empty()).count()
}

/// A compact weekday code: a non-empty string of letters from {M,T,W,R,F,S,U},
/// at most 7 long. "TR" and "MW" qualify; "Lecture" and "TBA" do not.
pub(crate) fn is_days_token(value: &str) -> bool {
    let v = value.trim();
    !v.is_empty()
        && v.len() <= 7
        && v.chars().all(|c| matches!(c, 'M' | 'T' | 'W' | 'R' | 'F' | 'S' | 'U'))
}

pub(crate) fn parse_count(value: &str) -> Option<u32> {
    let v = value.trim();
    if v.is_empty() || !v.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    v.parse().ok()
}

pub(crate) fn cell_or_tba(cells: &[String], idx: usize) -> String {
    cells
        .get(idx)
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| TBA.to_string())
}

/// Canonical campus for a line mentioning one. The campus vocabulary comes
/// from the source catalog.
pub(crate) fn match_campus(text: &str) -> Option<&'static str> {
    const NEEDLES: &[(&str, &str)] = &[
        ("Rockville", "Rockville"),
        ("Germantown", "Germantown"),
        ("Takoma", "Takoma Park/Silver Spring"),
        ("Distance", "Distance Learning"),
    ];
    NEEDLES
        .iter()
        .find(|(needle, _)| text.contains(needle))
        .map(|(_, canonical)| *canonical)
}
