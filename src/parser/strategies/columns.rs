//! Dynamic-column table matcher: when the page is one consistent table, the
//! widest row fixes the layout and every course row is read by column index.
//! No header required, which also means no protection against reordered
//! columns; the scorer decides whether the guess held.

use crate::parser::lines::{Line, LineTag};
use crate::records::{CourseRecord, TBA};

use super::{cell_or_tba, non_empty, parse_count, split_cells};

/// Narrowest table this matcher will accept; below that the input is not
/// recognizably tabular and the result is empty.
const MIN_TABLE_WIDTH: usize = 8;
/// Width at which a trailing schedule-type column is expected.
const FULL_TABLE_WIDTH: usize = 12;

pub fn extract(lines: &[Line], subject: &str) -> Vec<CourseRecord> {
    let rows: Vec<Vec<String>> = lines
        .iter()
        .filter(|l| l.tag != LineTag::Blank)
        .map(|l| split_cells(&l.text))
        .collect();

    let width = rows.iter().map(|cells| non_empty(cells)).max().unwrap_or(0);
    if width < MIN_TABLE_WIDTH {
        return Vec::new();
    }

    let mut records = Vec::new();
    for cells in rows {
        if cells.len() < MIN_TABLE_WIDTH {
            continue;
        }
        let course = cells[0].trim();
        if !is_course_cell(course, subject) {
            continue;
        }

        let mut record = CourseRecord::placeholder(course, cells[1].trim());
        record.credits = cell_or_tba(&cells, 2);
        record.days = cell_or_tba(&cells, 3);
        record.time_range = cell_or_tba(&cells, 4);
        record.date_range = cell_or_tba(&cells, 5);
        record.seats_available = cells.get(6).and_then(|c| parse_count(c)).unwrap_or(0);
        record.waitlist_count = cells.get(7).and_then(|c| parse_count(c)).unwrap_or(0);
        record.campus = cell_or_tba(&cells, 8);
        record.location = cell_or_tba(&cells, 9);
        record.instructor = cell_or_tba(&cells, 10);
        record.schedule_type = if width >= FULL_TABLE_WIDTH {
            cell_or_tba(&cells, 11)
        } else {
            TBA.to_string()
        };
        record.derive_status();
        records.push(record);
    }

    records
}

fn is_course_cell(cell: &str, subject: &str) -> bool {
    let upper = cell.to_uppercase();
    upper.starts_with(subject)
        && upper[subject.len()..]
            .trim_start()
            .starts_with(|c: char| c.is_ascii_digit())
}
