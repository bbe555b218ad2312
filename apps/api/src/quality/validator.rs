use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::entities::patterns::EMAIL_PATTERN;
use crate::entities::EntityRecord;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    MissingEmail,
    MissingPhone,
    MissingSkills,
    MissingExperience,
    UnstructuredLayout,
    LowQuality,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationWarning {
    pub kind: WarningKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QualitySignal {
    SufficientLength,
    SectionWords,
    Email,
    Phone,
    Structure,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalScore {
    pub signal: QualitySignal,
    pub points: u32,
}

/// Derived view over a record and its source text. Recomputed on demand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationReport {
    pub score: u32,
    pub warnings: Vec<ValidationWarning>,
    pub suggestions: Vec<String>,
    pub sections_found: Vec<String>,
    pub signals: Vec<SignalScore>,
}

impl ValidationReport {
    #[cfg(test)]
    pub fn has_warning(&self, kind: WarningKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }
}

pub const MAX_SCORE: u32 = 100;
pub const LOW_QUALITY_THRESHOLD: u32 = 50;

const MIN_TEXT_CHARS: usize = 100;
const MIN_SECTIONS: usize = 2;
const STRUCTURED_LINE_COUNT: usize = 5;

const SECTION_WORDS: &[&str] = &["experience", "education", "skills", "summary", "objective"];
const BULLET_MARKERS: &[char] = &['•', '*', '◦', '▪', '‣'];

const LENGTH_POINTS: u32 = 20;
const SECTION_POINTS: u32 = 15;
const EMAIL_POINTS: u32 = 15;
const PHONE_POINTS: u32 = 10;
const STRUCTURE_POINTS: u32 = 10;

static TEN_DIGIT_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").expect("Invalid ten-digit phone regex")
});

/// Scores how complete a résumé looks and says what to fix. Never fails.
pub fn validate(text: &str, record: &EntityRecord) -> ValidationReport {
    let lowered = text.to_lowercase();
    let sections_found: Vec<String> = SECTION_WORDS
        .iter()
        .filter(|word| lowered.contains(*word))
        .map(|word| word.to_string())
        .collect();

    let mut signals = Vec::new();
    if text.chars().count() > MIN_TEXT_CHARS {
        signals.push(SignalScore {
            signal: QualitySignal::SufficientLength,
            points: LENGTH_POINTS,
        });
    }
    if !sections_found.is_empty() {
        signals.push(SignalScore {
            signal: QualitySignal::SectionWords,
            points: SECTION_POINTS * sections_found.len() as u32,
        });
    }
    if EMAIL_PATTERN.is_match(text) {
        signals.push(SignalScore {
            signal: QualitySignal::Email,
            points: EMAIL_POINTS,
        });
    }
    if TEN_DIGIT_PHONE.is_match(text) {
        signals.push(SignalScore {
            signal: QualitySignal::Phone,
            points: PHONE_POINTS,
        });
    }
    if text.contains(BULLET_MARKERS) || text.matches('\n').count() > STRUCTURED_LINE_COUNT {
        signals.push(SignalScore {
            signal: QualitySignal::Structure,
            points: STRUCTURE_POINTS,
        });
    }

    let score = signals
        .iter()
        .map(|s| s.points)
        .sum::<u32>()
        .min(MAX_SCORE);

    let mut findings: Vec<(WarningKind, &str, &str)> = Vec::new();
    if record.email.is_none() {
        findings.push((
            WarningKind::MissingEmail,
            "No email address found",
            "Make sure your contact email is clearly visible",
        ));
    }
    if record.phone.is_none() {
        findings.push((
            WarningKind::MissingPhone,
            "No phone number found",
            "Consider adding your phone number",
        ));
    }
    if record.skills.is_empty() {
        findings.push((
            WarningKind::MissingSkills,
            "No skills detected",
            "Consider adding a skills section",
        ));
    }
    if record.experience.is_empty() {
        findings.push((
            WarningKind::MissingExperience,
            "No work experience detected",
            "Consider adding work experience details",
        ));
    }
    if sections_found.len() < MIN_SECTIONS {
        findings.push((
            WarningKind::UnstructuredLayout,
            "Fewer than two standard résumé sections were found",
            "Consider using a more structured resume format",
        ));
    }
    if score < LOW_QUALITY_THRESHOLD {
        findings.push((
            WarningKind::LowQuality,
            "Content quality seems low",
            "Ensure the file is not corrupted and contains the full résumé",
        ));
    }

    let (warnings, suggestions) = findings
        .into_iter()
        .map(|(kind, message, suggestion)| {
            (
                ValidationWarning {
                    kind,
                    message: message.to_string(),
                },
                suggestion.to_string(),
            )
        })
        .unzip();

    ValidationReport {
        score,
        warnings,
        suggestions,
        sections_found,
        signals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::models::ExperienceEntry;

    #[test]
    fn test_bare_short_document_scores_zero_with_every_warning() {
        let text = "Just a short note about nothing at all..";
        assert_eq!(text.chars().count(), 40);

        let report = validate(text, &EntityRecord::default());
        assert_eq!(report.score, 0);
        assert!(report.signals.is_empty());
        for kind in [
            WarningKind::MissingEmail,
            WarningKind::MissingPhone,
            WarningKind::MissingSkills,
            WarningKind::MissingExperience,
            WarningKind::UnstructuredLayout,
            WarningKind::LowQuality,
        ] {
            assert!(report.has_warning(kind), "missing {kind:?}");
        }
        assert_eq!(report.warnings.len(), report.suggestions.len());
    }

    #[test]
    fn test_complete_document_clamps_to_max() {
        let text = "Jane Doe | jane@example.com | 555-123-4567\n\
            Summary: backend engineer.\n\
            Objective: build reliable systems.\n\
            Experience\n• Software Engineer at Acme Corp\n\
            Education\n• B.S. Computer Science\n\
            Skills\n• Rust, SQL, Docker";
        let record = EntityRecord {
            email: Some("jane@example.com".to_string()),
            phone: Some("5551234567".to_string()),
            skills: vec!["SQL".to_string()],
            experience: vec![ExperienceEntry::new("Software Engineer", "Acme Corp")],
            ..EntityRecord::default()
        };

        let report = validate(text, &record);
        assert_eq!(report.sections_found.len(), 5);
        assert_eq!(report.score, MAX_SCORE);
        assert!(report.warnings.is_empty());
        assert!(report.suggestions.is_empty());
    }

    #[test]
    fn test_signals_are_scored_independently() {
        let text = "Contact jane@example.com or 555.123.4567 for skills and experience details";
        let report = validate(text, &EntityRecord::default());
        // section words 2 * 15, email 15, phone 10; too short and no structure
        assert_eq!(report.score, 55);
        assert_eq!(report.sections_found, vec!["experience", "skills"]);
        assert!(!report.has_warning(WarningKind::UnstructuredLayout));
        assert!(!report.has_warning(WarningKind::LowQuality));
    }

    #[test]
    fn test_many_lines_count_as_structure() {
        let text = "a\nb\nc\nd\ne\nf\ng";
        let report = validate(text, &EntityRecord::default());
        assert_eq!(
            report.signals,
            vec![SignalScore {
                signal: QualitySignal::Structure,
                points: STRUCTURE_POINTS
            }]
        );
    }

    #[test]
    fn test_warning_kind_serializes_snake_case() {
        let json = serde_json::to_string(&WarningKind::UnstructuredLayout).unwrap();
        assert_eq!(json, "\"unstructured_layout\"");
    }
}
