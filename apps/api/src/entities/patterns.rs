//! Deterministic pattern and keyword matchers. Cannot fail.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::entities::models::{EntityFragment, ExperienceEntry, SourceKind};

pub(crate) static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("Invalid email regex")
});

/// Tried in order; the first pattern with any match supplies the phone.
static PHONE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\+?1?[-\s]?)?\(?[0-9]{3}\)?[-\s]?[0-9]{3}[-\s]?[0-9]{4}",
        r"(\+?\d{1,3}[-\s]?)?\(?\d{3}\)?[-\s]?\d{3}[-\s]?\d{4}",
        r"\b\d{3}[-.]\d{3}[-.]\d{4}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid phone regex"))
    .collect()
});

const ROLE_ALTERNATION: &str =
    "Software Engineer|Data Scientist|Project Manager|Developer|Analyst|Manager|Director|Lead|Senior|Junior";

/// "<role> at <company>". Company stops at the end of the line.
static ROLE_AT_COMPANY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?P<role>{ROLE_ALTERNATION})[ \t]+at[ \t]+(?P<company>[A-Za-z0-9&][A-Za-z0-9 \t&]*)"
    ))
    .expect("Invalid role-at-company regex")
});

/// "<company> – <role>" with a hyphen or en dash.
static COMPANY_DASH_ROLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?P<company>[A-Za-z0-9&][A-Za-z0-9 \t&]*?)[ \t]*[-–][ \t]*(?P<role>{ROLE_ALTERNATION})\b"
    ))
    .expect("Invalid company-dash-role regex")
});

pub const SKILL_KEYWORDS: &[&str] = &[
    "Python",
    "Java",
    "JavaScript",
    "React",
    "Node.js",
    "SQL",
    "MongoDB",
    "Machine Learning",
    "Data Science",
    "AI",
    "TensorFlow",
    "PyTorch",
    "AWS",
    "Docker",
    "Kubernetes",
    "Git",
    "Linux",
    "HTML",
    "CSS",
    "Project Management",
    "Leadership",
    "Communication",
    "Problem Solving",
    "Teamwork",
    "Critical Thinking",
    "Time Management",
];

pub const EDUCATION_KEYWORDS: &[&str] = &[
    "Bachelor",
    "Master",
    "PhD",
    "University",
    "College",
    "Institute",
    "Computer Science",
    "Engineering",
    "Business",
    "Mathematics",
    "B.S.",
    "M.S.",
    "MBA",
    "B.A.",
    "M.A.",
];

#[derive(Debug, Default)]
pub struct PatternMatcher;

impl PatternMatcher {
    pub fn recognize(&self, text: &str) -> EntityFragment {
        let lowered = text.to_lowercase();

        EntityFragment {
            email: find_email(text),
            phone: find_phone(text),
            skills: keyword_hits(SKILL_KEYWORDS, &lowered),
            education: keyword_hits(EDUCATION_KEYWORDS, &lowered),
            experience: find_experience(text),
            ..EntityFragment::empty(SourceKind::PatternMatcher)
        }
    }
}

pub fn find_email(text: &str) -> Option<String> {
    EMAIL_PATTERN.find(text).map(|m| m.as_str().to_string())
}

pub fn find_phone(text: &str) -> Option<String> {
    PHONE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find(text))
        .map(|m| normalize_phone(m.as_str()))
}

/// Keeps a leading `+` and the digits; drops spaces, dots, dashes and parentheses.
pub fn normalize_phone(raw: &str) -> String {
    let raw = raw.trim();
    let mut normalized = String::with_capacity(raw.len());
    if raw.starts_with('+') {
        normalized.push('+');
    }
    normalized.extend(raw.chars().filter(char::is_ascii_digit));
    normalized
}

fn keyword_hits(dictionary: &[&str], lowered_text: &str) -> Vec<String> {
    dictionary
        .iter()
        .filter(|keyword| lowered_text.contains(&keyword.to_lowercase()))
        .map(|keyword| keyword.to_string())
        .collect()
}

/// "<role> at <company>" matches take precedence: a "<company> – <role>" match
/// on a line already claimed by one of them is dropped, then duplicates by
/// normalized key.
pub fn find_experience(text: &str) -> Vec<ExperienceEntry> {
    let mut claimed_lines: Vec<Range<usize>> = Vec::new();
    let mut entries: Vec<ExperienceEntry> = Vec::new();

    for caps in ROLE_AT_COMPANY.captures_iter(text) {
        if let Some(whole) = caps.get(0) {
            claimed_lines.push(line_span(text, whole.range()));
        }
        push_entry(&mut entries, &caps["role"], &caps["company"]);
    }

    for caps in COMPANY_DASH_ROLE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let span = whole.range();
        if claimed_lines
            .iter()
            .any(|line| line.start < span.end && span.start < line.end)
        {
            continue;
        }
        push_entry(&mut entries, &caps["role"], &caps["company"]);
    }

    entries
}

/// Widens a byte range to the full line(s) it sits on, excluding the newlines.
fn line_span(text: &str, range: Range<usize>) -> Range<usize> {
    let start = text[..range.start].rfind('\n').map_or(0, |i| i + 1);
    let end = text[range.end..]
        .find('\n')
        .map_or(text.len(), |i| range.end + i);
    start..end
}

fn push_entry(entries: &mut Vec<ExperienceEntry>, role: &str, company: &str) {
    let entry = ExperienceEntry::new(role.trim(), company.trim());
    if entry.role.is_empty() || entry.company.is_empty() {
        return;
    }
    let key = entry.normalized_key();
    if entries.iter().all(|e| e.normalized_key() != key) {
        entries.push(entry);
    }
}
