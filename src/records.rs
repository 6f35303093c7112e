use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel for any string field the source text did not resolve.
pub const TBA: &str = "TBA";

/// One section of a course offering. Every field is total: extraction fills
/// unresolved strings with [`TBA`] and unresolved counts with 0, never leaves
/// them absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub course_code: String,
    pub crn: String,
    pub title: String,
    pub section: String,
    pub credits: String,
    pub days: String,
    pub time_range: String,
    pub date_range: String,
    pub seats_available: u32,
    pub waitlist_count: u32,
    pub campus: String,
    pub location: String,
    pub instructor: String,
    pub schedule_type: String,
    pub has_availability: bool,
    pub status_label: String,
}

impl CourseRecord {
    /// A record with everything but its identity unresolved.
    pub fn placeholder(course_code: &str, crn: &str) -> Self {
        let mut record = CourseRecord {
            course_code: course_code.to_string(),
            crn: crn.to_string(),
            title: TBA.to_string(),
            section: TBA.to_string(),
            credits: TBA.to_string(),
            days: TBA.to_string(),
            time_range: TBA.to_string(),
            date_range: TBA.to_string(),
            seats_available: 0,
            waitlist_count: 0,
            campus: TBA.to_string(),
            location: TBA.to_string(),
            instructor: TBA.to_string(),
            schedule_type: TBA.to_string(),
            has_availability: false,
            status_label: String::new(),
        };
        record.derive_status();
        record
    }

    /// Recompute the derived fields from the counts. Availability is never
    /// trusted from source text.
    pub fn derive_status(&mut self) {
        self.has_availability = self.seats_available > self.waitlist_count;
        self.status_label = if self.has_availability {
            format!("{} > {}", self.seats_available, self.waitlist_count)
        } else {
            format!("{} <= {}", self.seats_available, self.waitlist_count)
        };
    }

    /// Replace empty string fields with the sentinel.
    pub fn fill_missing(&mut self) {
        for field in [
            &mut self.course_code,
            &mut self.crn,
            &mut self.title,
            &mut self.section,
            &mut self.credits,
            &mut self.days,
            &mut self.time_range,
            &mut self.date_range,
            &mut self.campus,
            &mut self.location,
            &mut self.instructor,
            &mut self.schedule_type,
        ] {
            if field.trim().is_empty() {
                *field = TBA.to_string();
            }
        }
    }

    pub fn has_valid_crn(&self) -> bool {
        self.crn.len() == 5 && self.crn.chars().all(|c| c.is_ascii_digit())
    }
}

/// Search parameters for one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    pub term: String,
    pub subject: String,
    pub course_number: Option<String>,
    pub campus: Option<String>,
}

impl ExtractionRequest {
    pub fn new(term: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            subject: subject.into(),
            course_number: None,
            campus: None,
        }
    }

    /// The subject code as strategies expect it: trimmed, upper-case.
    pub fn subject_code(&self) -> String {
        self.subject.trim().to_uppercase()
    }

    /// Normalized cache key over all four search parameters.
    pub fn cache_key(&self) -> String {
        let opt = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_lowercase)
                .unwrap_or_else(|| "all".to_string())
        };
        format!(
            "{}|{}|{}|{}",
            self.term.trim().to_lowercase(),
            self.subject_code(),
            opt(&self.course_number),
            opt(&self.campus),
        )
    }

    /// Narrow a batch to the requested course number and campus.
    pub fn apply_filters(&self, mut courses: Vec<CourseRecord>) -> Vec<CourseRecord> {
        if let Some(number) = self.course_number.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            courses.retain(|c| c.course_code.contains(number));
        }
        if let Some(campus) = self.campus.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            let needle = campus.to_lowercase();
            courses.retain(|c| c.campus.to_lowercase().contains(&needle));
        }
        courses
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMeta {
    pub parser_used: String,
    pub quality_score: u8,
    pub needs_improvement: bool,
    pub from_cache: bool,
    pub extracted_at: DateTime<Utc>,
    /// Section count before request filters were applied.
    pub total_courses: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub courses: Vec<CourseRecord>,
    pub metadata: ExtractionMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_total() {
        let record = CourseRecord::placeholder("COMM108", "20388");
        assert_eq!(record.title, TBA);
        assert_eq!(record.campus, TBA);
        assert_eq!(record.seats_available, 0);
        assert!(!record.has_availability);
        assert_eq!(record.status_label, "0 <= 0");
    }

    #[test]
    fn availability_recomputed_from_counts() {
        let mut record = CourseRecord::placeholder("COMM108", "20388");
        record.seats_available = 8;
        record.waitlist_count = 2;
        record.has_availability = false; // stale, must be overwritten
        record.derive_status();
        assert!(record.has_availability);
        assert_eq!(record.status_label, "8 > 2");

        record.seats_available = 2;
        record.waitlist_count = 2;
        record.derive_status();
        assert!(!record.has_availability, "equal counts are not availability");
        assert_eq!(record.status_label, "2 <= 2");
    }

    #[test]
    fn fill_missing_uses_sentinel() {
        let mut record = CourseRecord::placeholder("COMM108", "20388");
        record.instructor = "  ".to_string();
        record.days = String::new();
        record.fill_missing();
        assert_eq!(record.instructor, TBA);
        assert_eq!(record.days, TBA);
    }

    #[test]
    fn cache_key_is_normalized() {
        let request = ExtractionRequest {
            term: " Fall 2025 ".to_string(),
            subject: "comm".to_string(),
            course_number: Some("108".to_string()),
            campus: None,
        };
        assert_eq!(request.cache_key(), "fall 2025|COMM|108|all");

        let same = ExtractionRequest {
            term: "FALL 2025".to_string(),
            subject: "Comm ".to_string(),
            course_number: Some(" 108".to_string()),
            campus: Some("".to_string()),
        };
        assert_eq!(request.cache_key(), same.cache_key());
    }

    #[test]
    fn filters_narrow_by_course_and_campus() {
        let mut a = CourseRecord::placeholder("COMM108", "20388");
        a.campus = "Rockville".to_string();
        let mut b = CourseRecord::placeholder("COMM112", "20398");
        b.campus = "Germantown".to_string();

        let mut request = ExtractionRequest::new("Fall 2025", "COMM");
        request.course_number = Some("108".to_string());
        let filtered = request.apply_filters(vec![a.clone(), b.clone()]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].crn, "20388");

        let mut request = ExtractionRequest::new("Fall 2025", "COMM");
        request.campus = Some("germantown".to_string());
        let filtered = request.apply_filters(vec![a, b]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].crn, "20398");
    }
}
