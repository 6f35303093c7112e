//! Smart header column mapper: find the caption row, learn which column holds
//! which field from the caption text, then read every data row through that
//! mapping. Survives reordered and missing columns, which makes it the
//! preferred strategy.

use crate::parser::lines::{Line, LineTag};
use crate::records::{CourseRecord, TBA};

use super::{cell_or_tba, is_days_token, parse_count, split_cells};

#[derive(Debug, Default)]
struct ColumnMap {
    course: Option<usize>,
    crn: Option<usize>,
    title: Option<usize>,
    section: Option<usize>,
    credits: Option<usize>,
    days: Option<usize>,
    time: Option<usize>,
    dates: Option<usize>,
    seats: Option<usize>,
    waitlist: Option<usize>,
    campus: Option<usize>,
    location: Option<usize>,
    instructor: Option<usize>,
    schedule_type: Option<usize>,
}

impl ColumnMap {
    fn from_cells(cells: &[String]) -> Self {
        let mut map = ColumnMap::default();
        for (index, cell) in cells.iter().enumerate() {
            let slot = if matches_any(cell, &["course", "subject", "class"]) {
                &mut map.course
            } else if matches_any(cell, &["crn", "reference"]) {
                &mut map.crn
            } else if matches_any(cell, &["title"]) {
                &mut map.title
            } else if matches_any(cell, &["section", "sec"]) {
                &mut map.section
            } else if matches_any(cell, &["credit", "hour", "units"]) {
                &mut map.credits
            } else if matches_any(cell, &["days", "day"]) {
                &mut map.days
            } else if matches_any(cell, &["time", "period"]) {
                &mut map.time
            } else if matches_any(cell, &["date", "duration"]) {
                &mut map.dates
            } else if matches_any(cell, &["seatsavail", "seat", "available", "open", "capacity"]) {
                &mut map.seats
            } else if matches_any(cell, &["wait", "waitlist", "queue"]) {
                &mut map.waitlist
            } else if matches_any(cell, &["campus", "site", "center"]) {
                &mut map.campus
            } else if matches_any(cell, &["location", "room", "building", "bldg"]) {
                &mut map.location
            } else if matches_any(cell, &["instructor", "teacher", "faculty", "prof"]) {
                &mut map.instructor
            } else if matches_any(cell, &["type", "format", "method", "mode", "schedule"]) {
                &mut map.schedule_type
            } else {
                continue;
            };
            if slot.is_none() {
                *slot = Some(index);
            }
        }
        map
    }

    fn mapped_count(&self) -> usize {
        [
            self.course,
            self.crn,
            self.title,
            self.section,
            self.credits,
            self.days,
            self.time,
            self.dates,
            self.seats,
            self.waitlist,
            self.campus,
            self.location,
            self.instructor,
            self.schedule_type,
        ]
        .iter()
        .filter(|slot| slot.is_some())
        .count()
    }
}

/// Partial match in either direction over lower-cased alphanumerics, so
/// "Seats Avail", "Avail." and "Seats Available" all land on the same column.
fn matches_any(header: &str, patterns: &[&str]) -> bool {
    let text: String = header
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if text.is_empty() {
        return false;
    }
    patterns.iter().any(|pattern| {
        let pattern: String = pattern.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        text.contains(&pattern) || pattern.contains(&text)
    })
}

fn find_header(lines: &[Line]) -> Option<(usize, ColumnMap)> {
    for (index, line) in lines.iter().enumerate() {
        if line.tag != LineTag::Header {
            continue;
        }
        let cells = split_cells(&line.text);
        if cells.len() < 3 {
            continue;
        }
        let map = ColumnMap::from_cells(&cells);
        if map.mapped_count() >= 3 {
            return Some((index, map));
        }
    }
    None
}

/// No header row means nothing to map through; the positional strategies are
/// the ones that guess, so the result here is empty and the coordinator falls
/// back.
pub fn extract(lines: &[Line], subject: &str) -> Vec<CourseRecord> {
    let Some((header_index, map)) = find_header(lines) else {
        return Vec::new();
    };

    let mut records = Vec::new();
    for line in &lines[header_index + 1..] {
        if line.tag == LineTag::Blank {
            continue;
        }
        let cells = split_cells(&line.text);
        if cells.len() < 3 {
            continue;
        }
        let course = cells
            .get(map.course.unwrap_or(0))
            .map(|c| c.trim())
            .unwrap_or("");
        if !course.to_uppercase().starts_with(subject) {
            continue;
        }

        let mut record =
            CourseRecord::placeholder(course, &cell_or_tba(&cells, map.crn.unwrap_or(1)));
        if let Some(index) = map.title {
            record.title = cell_or_tba(&cells, index);
        }
        if let Some(index) = map.section {
            record.section = cell_or_tba(&cells, index);
        }
        record.credits = cell_or_tba(&cells, map.credits.unwrap_or(2));

        // "Days" and "Schedule Type" columns can sit side by side; a value is
        // only accepted as days when it is made of weekday letters, otherwise
        // the field stays unresolved rather than wrongly filled.
        let days_value = cell_or_tba(&cells, map.days.unwrap_or(3));
        record.days = if is_days_token(&days_value) {
            days_value
        } else {
            TBA.to_string()
        };

        record.time_range = cell_or_tba(&cells, map.time.unwrap_or(4));
        record.date_range = cell_or_tba(&cells, map.dates.unwrap_or(5));
        record.seats_available = cells
            .get(map.seats.unwrap_or(6))
            .and_then(|c| parse_count(c))
            .unwrap_or(0);
        record.waitlist_count = cells
            .get(map.waitlist.unwrap_or(7))
            .and_then(|c| parse_count(c))
            .unwrap_or(0);
        record.campus = cell_or_tba(&cells, map.campus.unwrap_or(8));
        record.location = cell_or_tba(&cells, map.location.unwrap_or(9));
        record.instructor = cell_or_tba(&cells, map.instructor.unwrap_or(10));
        record.schedule_type = cell_or_tba(&cells, map.schedule_type.unwrap_or(11));
        record.derive_status();
        records.push(record);
    }

    records
}
