use serde::{Deserialize, Serialize};

/// Recognition sources in reconciliation priority order (highest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    StatisticalNer,
    LinguisticPipeline,
    PatternMatcher,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::StatisticalNer => "statistical_ner",
            SourceKind::LinguisticPipeline => "linguistic_pipeline",
            SourceKind::PatternMatcher => "pattern_matcher",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub role: String,
    pub company: String,
}

impl ExperienceEntry {
    pub fn new(role: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            company: company.into(),
        }
    }

    /// Lower-cased, trimmed (role, company) pair used for deduplication.
    pub fn normalized_key(&self) -> (String, String) {
        (
            self.role.trim().to_lowercase(),
            self.company.trim().to_lowercase(),
        )
    }
}

/// One source's partial view of the candidate. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityFragment {
    pub source: SourceKind,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub organizations: Vec<String>,
    pub locations: Vec<String>,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<String>,
}

impl EntityFragment {
    pub fn empty(source: SourceKind) -> Self {
        Self {
            source,
            name: None,
            email: None,
            phone: None,
            organizations: Vec::new(),
            locations: Vec::new(),
            skills: Vec::new(),
            experience: Vec::new(),
            education: Vec::new(),
        }
    }
}

/// The reconciled candidate record handed to the enhancement service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub organizations: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<String>,
}
