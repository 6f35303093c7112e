//! Fixed-pattern line matcher: one regex-shaped expectation per field, in fixed
//! positions relative to the anchor line. Fast, and the right fallback when a
//! page has no usable table structure, but brittle to layout drift.

use std::sync::LazyLock;

use regex::Regex;

use crate::parser::lines::{anchor_parts, record_windows, Line};
use crate::records::{CourseRecord, TBA};

use super::{
    is_days_token, match_campus, parse_count, split_cells, CREDITS_RE, DATE_RANGE_RE,
    LOCATION_RE, TIME_RANGE_RE,
};

/// "2 5 Rockville TA 210" — seats, waitlist, then campus/location text.
static PAIRED_COUNTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3})\s+(\d{1,3})\s+([A-Za-z].*)$").unwrap());
/// Room designator at the end of a place line, e.g. "TA 210".
static TRAILING_LOCATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]{1,4}\s?\d{1,4}[A-Z]?)\s*$").unwrap());

pub fn extract(lines: &[Line], subject: &str, look_ahead: usize) -> Vec<CourseRecord> {
    let mut records = Vec::new();

    for window in record_windows(lines, look_ahead) {
        let Some(parts) = anchor_parts(window.anchor) else { continue };
        if parts.subject != subject {
            continue;
        }

        let mut record = CourseRecord::placeholder(&parts.course_code, &parts.crn);
        fill_from_anchor(&mut record, &parts.rest, window.anchor);

        if let Some(info) = &window.title {
            record.title = info.title.clone();
            // Section numbers in full title lines belong to one specific CRN.
            let crn_matches = info.crn.as_deref().map_or(true, |crn| crn == record.crn);
            if crn_matches {
                if let Some(section) = &info.section {
                    record.section = section.clone();
                }
            }
        }

        scan_window(&mut record, window.scope);
        record.derive_status();
        records.push(record);
    }

    records
}

fn fill_from_anchor(record: &mut CourseRecord, rest: &str, full_line: &str) {
    let tokens: Vec<&str> = rest.split_whitespace().collect();

    if let Some(credits) = tokens.iter().find(|t| CREDITS_RE.is_match(t)) {
        record.credits = (*credits).to_string();
    }
    if let Some(days) = tokens.iter().find(|t| is_days_token(t)) {
        record.days = (*days).to_string();
    }
    if let Some(m) = TIME_RANGE_RE.find(full_line) {
        record.time_range = m.as_str().to_string();
    }
    if let Some(m) = DATE_RANGE_RE.find(full_line) {
        record.date_range = m.as_str().to_string();
    }
}

fn scan_window(record: &mut CourseRecord, scope: &[Line]) {
    let mut lone_counts: Vec<u32> = Vec::new();
    let mut counts_paired = false;

    for line in scope {
        let text = line.text.as_str();
        if text.is_empty() {
            continue;
        }

        // Isolated count lines: first is seats, second is waitlist.
        if let Some(count) = parse_count(text) {
            lone_counts.push(count);
            continue;
        }

        if !counts_paired {
            if let Some(caps) = PAIRED_COUNTS_RE.captures(text) {
                record.seats_available = caps[1].parse().unwrap_or(0);
                record.waitlist_count = caps[2].parse().unwrap_or(0);
                counts_paired = true;
                apply_place_text(record, &caps[3]);
                continue;
            }
        }

        // Trailing columns row: campus, location, instructor, schedule type.
        let cells = split_cells(text);
        if is_place_row(&cells) {
            record.campus = cells[0].clone();
            if let Some(location) = cells.get(1).filter(|c| !c.is_empty()) {
                record.location = location.clone();
            }
            if let Some(instructor) = cells.get(2).filter(|c| !c.is_empty()) {
                record.instructor = instructor.clone();
            }
            if let Some(kind) = cells.get(3).filter(|c| !c.is_empty()) {
                record.schedule_type = kind.clone();
            }
            continue;
        }

        // A bare campus mention anywhere in the window.
        if record.campus == TBA {
            if let Some(campus) = match_campus(text) {
                record.campus = campus.to_string();
            }
        }
    }

    if !counts_paired {
        if let Some(seats) = lone_counts.first() {
            record.seats_available = *seats;
        }
        if let Some(waitlist) = lone_counts.get(1) {
            record.waitlist_count = *waitlist;
        }
    }
}

fn is_place_row(cells: &[String]) -> bool {
    if cells.len() < 3 || cells[0].is_empty() {
        return false;
    }
    let campus_like = cells[0]
        .chars()
        .all(|c| c.is_alphabetic() || c.is_whitespace() || c == '/');
    campus_like
        && (match_campus(&cells[0]).is_some()
            || cells.get(1).map(|c| LOCATION_RE.is_match(c)).unwrap_or(false))
}

fn apply_place_text(record: &mut CourseRecord, text: &str) {
    if let Some(campus) = match_campus(text) {
        record.campus = campus.to_string();
    }
    if let Some(caps) = TRAILING_LOCATION_RE.captures(text) {
        record.location = caps[1].to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lines::{tokenize, DEFAULT_LOOK_AHEAD};

    fn run(raw: &str, subject: &str) -> Vec<CourseRecord> {
        extract(&tokenize(raw), subject, DEFAULT_LOOK_AHEAD)
    }

    #[test]
    fn anchor_with_isolated_counts_and_place_row() {
        let raw = "COMM108 20388 3.000 TR 8:00 AM - 9:15 AM 09/02/25 - 12/21/25\n\
                   2\n\
                   5\n\
                   Rockville\tTA 210\tTeodora Salow\tLecture";
        let records = run(raw, "COMM");
        assert_eq!(records.len(), 1);

        let r = &records[0];
        assert_eq!(r.course_code, "COMM108");
        assert_eq!(r.crn, "20388");
        assert_eq!(r.credits, "3.000");
        assert_eq!(r.days, "TR");
        assert_eq!(r.time_range, "8:00 AM - 9:15 AM");
        assert_eq!(r.date_range, "09/02/25 - 12/21/25");
        assert_eq!(r.seats_available, 2);
        assert_eq!(r.waitlist_count, 5);
        assert_eq!(r.campus, "Rockville");
        assert_eq!(r.location, "TA 210");
        assert_eq!(r.instructor, "Teodora Salow");
        assert_eq!(r.schedule_type, "Lecture");
        assert!(!r.has_availability);
    }

    #[test]
    fn paired_counts_line() {
        let raw = "COMM112 20398 3.000 MW 10:00 AM - 11:15 AM\n8 2 Rockville TA 215";
        let records = run(raw, "COMM");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].seats_available, 8);
        assert_eq!(records[0].waitlist_count, 2);
        assert_eq!(records[0].campus, "Rockville");
        assert_eq!(records[0].location, "TA 215");
        assert!(records[0].has_availability);
    }

    #[test]
    fn bare_campus_mention() {
        let raw = "BIOL150 21044 4.000 MW\n0\n3\nTakoma Park Science Center";
        let records = run(raw, "BIOL");
        assert_eq!(records[0].campus, "Takoma Park/Silver Spring");
        assert_eq!(records[0].seats_available, 0);
        assert_eq!(records[0].waitlist_count, 3);
    }

    #[test]
    fn title_line_feeds_title_and_section() {
        let raw = "Foundations of Human Communication - 20388 - COMM 108 - 001\n\
                   COMM108 20388 3.000 TR";
        let records = run(raw, "COMM");
        assert_eq!(records[0].title, "Foundations of Human Communication");
        assert_eq!(records[0].section, "001");
    }

    #[test]
    fn section_not_borrowed_from_another_crn() {
        let raw = "Foundations of Human Communication - 20388 - COMM 108 - 001\n\
                   COMM108 22373 3.000 TR";
        let records = run(raw, "COMM");
        assert_eq!(records[0].title, "Foundations of Human Communication");
        assert_eq!(records[0].section, TBA, "section belongs to CRN 20388 only");
    }

    #[test]
    fn other_subjects_are_skipped() {
        let raw = "COMM108 20388 3.000 TR\nBIOL150 21044 4.000 MW";
        let records = run(raw, "COMM");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].course_code, "COMM108");
    }

    #[test]
    fn no_anchors_is_empty_not_error() {
        assert!(run("nothing to see\n\njust text", "COMM").is_empty());
    }

    #[test]
    fn unresolved_fields_are_sentinels() {
        let records = run("COMM108 20388", "COMM");
        let r = &records[0];
        assert_eq!(r.credits, TBA);
        assert_eq!(r.days, TBA);
        assert_eq!(r.time_range, TBA);
        assert_eq!(r.campus, TBA);
        assert_eq!(r.seats_available, 0);
        assert_eq!(r.waitlist_count, 0);
    }

    #[test]
    fn catalog_dump_fixture() {
        let raw = std::fs::read_to_string("tests/fixtures/comm_fall2025.txt").unwrap();
        let records = run(&raw, "COMM");
        assert_eq!(records.len(), 6);
        assert!(records.iter().all(|r| r.campus != TBA));
        assert!(records.iter().all(|r| r.instructor != TBA));
        assert!(records.iter().all(|r| r.has_valid_crn()));

        let first = &records[0];
        assert_eq!(first.crn, "20388");
        assert_eq!(first.title, "Foundations of Human Communication");
        assert_eq!(first.seats_available, 2);
        assert_eq!(first.waitlist_count, 5);
    }
}
