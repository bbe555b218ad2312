//! In-process linguistic pipeline.
//!
//! Rule-based: lines are split into punctuation-bounded segments, runs of
//! capitalised tokens are chunked, and each chunk is labelled with organisation
//! suffix rules and a geo-political gazetteer. A header-line heuristic picks
//! the person. The tables are built once per process and shared read-only.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock, OnceLock};

use async_trait::async_trait;
use regex::Regex;

use crate::entities::models::{EntityFragment, SourceKind};
use crate::entities::recognizer::{EntitySource, RecognizerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityLabel {
    Person,
    Org,
    /// Geo-political entity: country, state, city.
    Gpe,
    /// Non-GPE location, e.g. "Austin, TX" spans.
    Loc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinguisticEntity {
    pub label: EntityLabel,
    pub text: String,
}

const ORG_SUFFIXES: &[&str] = &[
    "inc",
    "corp",
    "corporation",
    "llc",
    "ltd",
    "limited",
    "co",
    "company",
    "group",
    "technologies",
    "technology",
    "labs",
    "systems",
    "solutions",
    "software",
    "bank",
    "university",
    "college",
    "institute",
    "school",
    "foundation",
    "partners",
    "consulting",
    "agency",
    "studios",
    "holdings",
    "gmbh",
    "plc",
];

const ORG_PREFIXES: &[&str] = &["university of", "institute of", "bank of", "college of"];

const CONNECTORS: &[&str] = &["of", "and", "&", "the", "for", "de"];

/// Words that disqualify a header line from being a person's name.
const NON_NAME_WORDS: &[&str] = &[
    "experience",
    "education",
    "skills",
    "summary",
    "objective",
    "profile",
    "projects",
    "certifications",
    "contact",
    "references",
    "resume",
    "curriculum",
    "vitae",
    "professional",
    "work",
    "history",
    "languages",
    "interests",
    "awards",
    "publications",
    "engineer",
    "developer",
    "manager",
    "director",
    "analyst",
    "scientist",
    "lead",
    "senior",
    "junior",
    "intern",
    "consultant",
    "designer",
    "architect",
    "specialist",
    "officer",
    "president",
    "founder",
];

const US_STATE_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA", "KS",
    "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY",
    "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV",
    "WI", "WY", "DC",
];

const GAZETTEER: &[&str] = &[
    // countries
    "united states",
    "usa",
    "canada",
    "mexico",
    "brazil",
    "argentina",
    "united kingdom",
    "uk",
    "ireland",
    "france",
    "germany",
    "spain",
    "portugal",
    "italy",
    "netherlands",
    "belgium",
    "switzerland",
    "austria",
    "sweden",
    "norway",
    "denmark",
    "finland",
    "poland",
    "india",
    "china",
    "japan",
    "south korea",
    "singapore",
    "australia",
    "new zealand",
    "israel",
    "nigeria",
    "kenya",
    "south africa",
    "egypt",
    "pakistan",
    "bangladesh",
    "vietnam",
    "indonesia",
    "philippines",
    // us states
    "alabama",
    "alaska",
    "arizona",
    "arkansas",
    "california",
    "colorado",
    "connecticut",
    "delaware",
    "florida",
    "georgia",
    "hawaii",
    "idaho",
    "illinois",
    "indiana",
    "iowa",
    "kansas",
    "kentucky",
    "louisiana",
    "maine",
    "maryland",
    "massachusetts",
    "michigan",
    "minnesota",
    "mississippi",
    "missouri",
    "montana",
    "nebraska",
    "nevada",
    "new hampshire",
    "new jersey",
    "new mexico",
    "new york",
    "north carolina",
    "north dakota",
    "ohio",
    "oklahoma",
    "oregon",
    "pennsylvania",
    "rhode island",
    "south carolina",
    "south dakota",
    "tennessee",
    "texas",
    "utah",
    "vermont",
    "virginia",
    "washington",
    "west virginia",
    "wisconsin",
    "wyoming",
    // cities
    "new york city",
    "los angeles",
    "chicago",
    "houston",
    "phoenix",
    "philadelphia",
    "san antonio",
    "san diego",
    "dallas",
    "austin",
    "san jose",
    "san francisco",
    "seattle",
    "denver",
    "boston",
    "atlanta",
    "miami",
    "portland",
    "pittsburgh",
    "detroit",
    "minneapolis",
    "toronto",
    "vancouver",
    "montreal",
    "london",
    "paris",
    "berlin",
    "munich",
    "madrid",
    "barcelona",
    "lisbon",
    "rome",
    "milan",
    "amsterdam",
    "dublin",
    "zurich",
    "stockholm",
    "copenhagen",
    "oslo",
    "warsaw",
    "bangalore",
    "bengaluru",
    "mumbai",
    "delhi",
    "hyderabad",
    "pune",
    "chennai",
    "beijing",
    "shanghai",
    "shenzhen",
    "tokyo",
    "seoul",
    "sydney",
    "melbourne",
    "tel aviv",
    "lagos",
    "nairobi",
    "cairo",
    "dubai",
];

static CITY_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z][a-z]+(?: [A-Z][a-z]+)*), ?([A-Z]{2})\b").expect("Invalid city regex")
});

const HEADER_LINES: usize = 5;

pub struct LinguisticPipeline {
    org_suffixes: HashSet<&'static str>,
    connectors: HashSet<&'static str>,
    non_name_words: HashSet<&'static str>,
    state_codes: HashSet<&'static str>,
    gazetteer: HashSet<&'static str>,
}

static SHARED_PIPELINE: OnceLock<Arc<LinguisticPipeline>> = OnceLock::new();

impl LinguisticPipeline {
    /// Process-wide instance, built on first use.
    pub fn shared() -> Arc<Self> {
        SHARED_PIPELINE
            .get_or_init(|| Arc::new(Self::build()))
            .clone()
    }

    fn build() -> Self {
        Self {
            org_suffixes: ORG_SUFFIXES.iter().copied().collect(),
            connectors: CONNECTORS.iter().copied().collect(),
            non_name_words: NON_NAME_WORDS.iter().copied().collect(),
            state_codes: US_STATE_CODES.iter().copied().collect(),
            gazetteer: GAZETTEER.iter().copied().collect(),
        }
    }

    pub fn analyze(&self, text: &str) -> Vec<LinguisticEntity> {
        let mut entities = Vec::new();

        if let Some(name) = self.header_person(text) {
            entities.push(LinguisticEntity {
                label: EntityLabel::Person,
                text: name,
            });
        }

        for caps in CITY_STATE.captures_iter(text) {
            if self.state_codes.contains(&caps[2]) {
                entities.push(LinguisticEntity {
                    label: EntityLabel::Loc,
                    text: format!("{}, {}", &caps[1], &caps[2]),
                });
            }
        }

        for line in text.lines() {
            for segment in line.split(is_segment_boundary) {
                for chunk in self.capitalized_chunks(segment) {
                    if let Some(entity) = self.label_chunk(&chunk) {
                        entities.push(entity);
                    }
                }
            }
        }

        dedup_entities(entities)
    }

    /// First short, all-capitalised line near the top that is not a heading or a title.
    fn header_person(&self, text: &str) -> Option<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(HEADER_LINES)
            .find(|line| self.looks_like_name(line))
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    fn looks_like_name(&self, line: &str) -> bool {
        if line.contains('@') || line.chars().any(|c| c.is_ascii_digit()) {
            return false;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if !(2..=4).contains(&tokens.len()) {
            return false;
        }
        if self.gazetteer.contains(line.to_lowercase().as_str()) {
            return false;
        }
        tokens.iter().all(|token| {
            let bare = token.trim_end_matches(['.', ',']);
            starts_uppercase(bare)
                && bare.chars().all(|c| c.is_alphabetic() || matches!(c, '-' | '\'' | '.'))
                && !self.non_name_words.contains(bare.to_lowercase().as_str())
                && !self.org_suffixes.contains(bare.to_lowercase().as_str())
        })
    }

    /// Runs of capitalised tokens, allowing lower-case connectors inside a run.
    fn capitalized_chunks(&self, segment: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for token in segment.split_whitespace() {
            let bare = token.trim_matches(|c: char| matches!(c, '.' | '"' | '\''));
            if starts_uppercase(bare) {
                current.push(bare);
            } else if !current.is_empty()
                && self.connectors.contains(bare.to_lowercase().as_str())
            {
                current.push(bare);
            } else {
                flush_chunk(&mut current, &mut chunks, &self.connectors);
            }
        }
        flush_chunk(&mut current, &mut chunks, &self.connectors);
        chunks
    }

    fn label_chunk(&self, chunk: &str) -> Option<LinguisticEntity> {
        let lowered = chunk.to_lowercase();
        let last = lowered.rsplit(' ').next().unwrap_or_default();

        let is_org = chunk.contains(' ')
            && (self.org_suffixes.contains(last)
                || ORG_PREFIXES.iter().any(|p| lowered.starts_with(p)));
        if is_org {
            return Some(LinguisticEntity {
                label: EntityLabel::Org,
                text: chunk.to_string(),
            });
        }

        if self.gazetteer.contains(lowered.as_str()) {
            return Some(LinguisticEntity {
                label: EntityLabel::Gpe,
                text: chunk.to_string(),
            });
        }

        None
    }

    pub fn to_fragment(entities: Vec<LinguisticEntity>) -> EntityFragment {
        let mut fragment = EntityFragment::empty(SourceKind::LinguisticPipeline);
        for entity in entities {
            match entity.label {
                EntityLabel::Person => {
                    fragment.name.get_or_insert(entity.text);
                }
                EntityLabel::Org => fragment.organizations.push(entity.text),
                EntityLabel::Gpe | EntityLabel::Loc => fragment.locations.push(entity.text),
            }
        }
        fragment
    }
}

fn is_segment_boundary(c: char) -> bool {
    matches!(c, ',' | ';' | '|' | '(' | ')' | ':' | '/' | '•' | '–' | '—' | '·')
}

fn starts_uppercase(token: &str) -> bool {
    token.chars().next().is_some_and(char::is_uppercase)
}

fn flush_chunk(current: &mut Vec<&str>, chunks: &mut Vec<String>, connectors: &HashSet<&str>) {
    while current
        .last()
        .is_some_and(|t| connectors.contains(t.to_lowercase().as_str()))
    {
        current.pop();
    }
    if !current.is_empty() {
        chunks.push(current.join(" "));
    }
    current.clear();
}

/// Exact-text dedup, and a bare city is dropped when its "City, ST" form was found.
fn dedup_entities(entities: Vec<LinguisticEntity>) -> Vec<LinguisticEntity> {
    let qualified: Vec<String> = entities
        .iter()
        .filter(|e| e.label == EntityLabel::Loc)
        .map(|e| e.text.clone())
        .collect();

    let mut seen = HashSet::new();
    entities
        .into_iter()
        .filter(|e| {
            !(e.label == EntityLabel::Gpe
                && qualified
                    .iter()
                    .any(|q| q.starts_with(&format!("{}, ", e.text))))
        })
        .filter(|e| seen.insert(e.text.clone()))
        .collect()
}

/// [`EntitySource`] adapter running the pipeline on the blocking pool.
pub struct LinguisticSource {
    pipeline: Arc<LinguisticPipeline>,
}

impl LinguisticSource {
    pub fn new(pipeline: Arc<LinguisticPipeline>) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl EntitySource for LinguisticSource {
    fn kind(&self) -> SourceKind {
        SourceKind::LinguisticPipeline
    }

    async fn recognize(&self, text: Arc<str>) -> Result<EntityFragment, RecognizerError> {
        let pipeline = Arc::clone(&self.pipeline);
        let entities = tokio::task::spawn_blocking(move || pipeline.analyze(&text))
            .await
            .map_err(|e| RecognizerError::Crashed(e.to_string()))?;
        Ok(LinguisticPipeline::to_fragment(entities))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "Jane Doe\n\
        Austin, TX | jane@example.com\n\
        Professional Summary\n\
        Senior Developer at Initech Corp, Austin\n\
        Previously at Globex Technologies in Seattle\n\
        B.S. Computer Science, University of Texas";

    fn labels(entities: &[LinguisticEntity], label: EntityLabel) -> Vec<&str> {
        entities
            .iter()
            .filter(|e| e.label == label)
            .map(|e| e.text.as_str())
            .collect()
    }

    #[test]
    fn test_header_line_is_person() {
        let entities = LinguisticPipeline::shared().analyze(RESUME);
        assert_eq!(labels(&entities, EntityLabel::Person), vec!["Jane Doe"]);
    }

    #[test]
    fn test_section_heading_is_not_a_person() {
        let pipeline = LinguisticPipeline::shared();
        assert!(!pipeline.looks_like_name("Professional Summary"));
        assert!(!pipeline.looks_like_name("Software Engineer"));
        assert!(!pipeline.looks_like_name("New York"));
        assert!(pipeline.looks_like_name("Mary-Ann O'Neil"));
    }

    #[test]
    fn test_organisations_by_suffix_and_prefix() {
        let entities = LinguisticPipeline::shared().analyze(RESUME);
        assert_eq!(
            labels(&entities, EntityLabel::Org),
            vec!["Initech Corp", "Globex Technologies", "University of Texas"]
        );
    }

    #[test]
    fn test_locations_prefer_city_state_form() {
        let entities = LinguisticPipeline::shared().analyze(RESUME);
        assert_eq!(labels(&entities, EntityLabel::Loc), vec!["Austin, TX"]);
        assert_eq!(labels(&entities, EntityLabel::Gpe), vec!["Seattle"]);
    }

    #[test]
    fn test_city_state_requires_real_state_code() {
        let entities = LinguisticPipeline::shared().analyze("Team lead, Platform, QA");
        assert!(labels(&entities, EntityLabel::Loc).is_empty());
    }

    #[test]
    fn test_chunks_trim_trailing_connectors() {
        let chunks = LinguisticPipeline::shared().capitalized_chunks("Worked at Acme and then left");
        assert_eq!(chunks, vec!["Worked", "Acme"]);
    }

    #[test]
    fn test_fragment_mapping() {
        let fragment = LinguisticPipeline::to_fragment(vec![
            LinguisticEntity {
                label: EntityLabel::Person,
                text: "Jane Doe".into(),
            },
            LinguisticEntity {
                label: EntityLabel::Person,
                text: "John Roe".into(),
            },
            LinguisticEntity {
                label: EntityLabel::Gpe,
                text: "Berlin".into(),
            },
            LinguisticEntity {
                label: EntityLabel::Org,
                text: "Acme Inc".into(),
            },
        ]);
        assert_eq!(fragment.source, SourceKind::LinguisticPipeline);
        assert_eq!(fragment.name.as_deref(), Some("Jane Doe"));
        assert_eq!(fragment.locations, vec!["Berlin"]);
        assert_eq!(fragment.organizations, vec!["Acme Inc"]);
    }

    #[tokio::test]
    async fn test_source_runs_on_blocking_pool() {
        let source = LinguisticSource::new(LinguisticPipeline::shared());
        let fragment = source.recognize(Arc::from(RESUME)).await.unwrap();
        assert_eq!(fragment.name.as_deref(), Some("Jane Doe"));
        assert!(fragment.organizations.contains(&"Initech Corp".to_string()));
    }
}
