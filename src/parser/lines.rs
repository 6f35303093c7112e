use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// How many lines after an anchor may still belong to its record. Source
/// layouts scatter seats/waitlist/campus/instructor across nearby lines in no
/// fixed order, so each anchor owns a bounded scope.
pub const DEFAULT_LOOK_AHEAD: usize = 8;

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]{2,5})\s?(\d{2,3}[A-Z]?)\s+(\d{5})\b").unwrap());
static COURSE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]{2,5})\s?(\d{2,3}[A-Z]?)$").unwrap());

const HEADER_KEYWORDS: &[&str] = &[
    "crn", "course", "subj", "days", "time", "date", "seat", "wait", "campus",
    "instructor", "location", "cred", "title", "sec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTag {
    /// Column-caption row (keyword match).
    Header,
    /// Subject code + course number + 5-digit CRN; starts a record.
    CourseAnchor,
    Data,
    Blank,
}

#[derive(Debug, Clone)]
pub struct Line {
    pub text: String,
    pub tag: LineTag,
}

/// Split raw scraped text into classified logical lines. Layout-agnostic: the
/// tokenizer never decides which columns mean what, only what kind of line it
/// is looking at. Zero anchors in the input is not an error; callers see it as
/// an empty extraction.
pub fn tokenize(raw: &str) -> Vec<Line> {
    raw.lines()
        .map(|l| {
            let text = l.trim().to_string();
            let tag = classify(&text);
            Line { text, tag }
        })
        .collect()
}

fn classify(text: &str) -> LineTag {
    if text.is_empty() {
        LineTag::Blank
    } else if ANCHOR_RE.is_match(text) {
        LineTag::CourseAnchor
    } else if header_keyword_count(text) >= 2 {
        LineTag::Header
    } else {
        LineTag::Data
    }
}

fn header_keyword_count(text: &str) -> usize {
    let lowered = text.to_lowercase();
    HEADER_KEYWORDS.iter().filter(|k| lowered.contains(*k)).count()
}

/// Identity parts of an anchor line.
pub(crate) struct AnchorParts {
    pub subject: String,
    pub course_code: String,
    pub crn: String,
    /// Everything after the CRN, trimmed.
    pub rest: String,
}

pub(crate) fn anchor_parts(text: &str) -> Option<AnchorParts> {
    let caps = ANCHOR_RE.captures(text)?;
    let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
    Some(AnchorParts {
        subject: caps[1].to_string(),
        course_code: format!("{}{}", &caps[1], &caps[2]),
        crn: caps[3].to_string(),
        rest: text[end..].trim().to_string(),
    })
}

/// Course title captured from a title line preceding one or more anchors.
#[derive(Debug, Clone)]
pub struct TitleInfo {
    pub title: String,
    pub course_code: Option<String>,
    pub section: Option<String>,
    pub crn: Option<String>,
}

/// Title lines come in two shapes:
/// "Foundations of Human Communication - 20388 - COMM 108 - 001" (full) and
/// "COMM 108 - Foundations of Human Communication" (compact).
pub(crate) fn parse_title_line(text: &str) -> Option<TitleInfo> {
    if !text.contains(" - ") {
        return None;
    }
    let parts: Vec<&str> = text.split(" - ").map(str::trim).collect();

    if parts.len() >= 4 && parts[1].len() == 5 && parts[1].chars().all(|c| c.is_ascii_digit()) {
        if let Some(caps) = COURSE_CODE_RE.captures(parts[2]) {
            return Some(TitleInfo {
                title: parts[0].to_string(),
                course_code: Some(format!("{}{}", &caps[1], &caps[2])),
                section: Some(parts[3].to_string()),
                crn: Some(parts[1].to_string()),
            });
        }
    }

    if let Some(caps) = COURSE_CODE_RE.captures(parts[0]) {
        return Some(TitleInfo {
            title: parts[1..].join(" - "),
            course_code: Some(format!("{}{}", &caps[1], &caps[2])),
            section: None,
            crn: None,
        });
    }

    None
}

/// One anchor line plus the bounded scope of lines belonging to its record.
#[derive(Debug)]
pub struct RecordWindow<'a> {
    pub anchor: &'a str,
    pub scope: &'a [Line],
    pub title: Option<TitleInfo>,
}

/// Group each anchor with up to `look_ahead` following lines, stopping early
/// at the next anchor. The most recent title line is carried into the window.
pub fn record_windows(lines: &[Line], look_ahead: usize) -> Vec<RecordWindow<'_>> {
    let mut windows = Vec::new();
    let mut current_title: Option<TitleInfo> = None;

    for (i, line) in lines.iter().enumerate() {
        match line.tag {
            LineTag::Data => {
                if let Some(info) = parse_title_line(&line.text) {
                    current_title = Some(info);
                }
            }
            LineTag::CourseAnchor => {
                let end = lines[i + 1..]
                    .iter()
                    .position(|l| l.tag == LineTag::CourseAnchor)
                    .map(|off| i + 1 + off)
                    .unwrap_or(lines.len())
                    .min(i + 1 + look_ahead);
                windows.push(RecordWindow {
                    anchor: &line.text,
                    scope: &lines[i + 1..end],
                    title: current_title.clone(),
                });
            }
            _ => {}
        }
    }

    windows
}

/// Most frequent subject code among anchor lines, for inputs where the caller
/// did not say which subject the dump belongs to.
pub fn dominant_subject(lines: &[Line]) -> Option<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for line in lines.iter().filter(|l| l.tag == LineTag::CourseAnchor) {
        if let Some(caps) = ANCHOR_RE.captures(&line.text) {
            *counts.entry(caps[1].to_string()).or_default() += 1;
        }
    }
    counts.into_iter().max_by_key(|(_, n)| *n).map(|(subject, _)| subject)
}
