//! Merges source fragments into one [`EntityRecord`].
//!
//! Single-valued fields take the first non-blank value in source priority
//! order. List fields concatenate in that same order, skip blank values and
//! drop duplicates: organisations, locations and education exactly; skills
//! case-insensitively; experience by normalised (role, company).

use std::collections::HashSet;

use crate::entities::models::{EntityFragment, EntityRecord};

pub fn reconcile(fragments: &[EntityFragment]) -> EntityRecord {
    let mut ordered: Vec<&EntityFragment> = fragments.iter().collect();
    // Stable: fragments from the same source keep their relative order.
    ordered.sort_by_key(|f| f.source);

    let mut record = EntityRecord {
        name: first_present(&ordered, |f| f.name.as_deref()),
        email: first_present(&ordered, |f| f.email.as_deref()),
        phone: first_present(&ordered, |f| f.phone.as_deref()),
        ..EntityRecord::default()
    };

    let mut seen_skills = HashSet::new();
    let mut seen_experience = HashSet::new();

    for fragment in &ordered {
        extend_unique(&mut record.organizations, &fragment.organizations);
        extend_unique(&mut record.locations, &fragment.locations);
        extend_unique(&mut record.education, &fragment.education);

        for skill in fragment.skills.iter().filter(|s| !is_blank(s)) {
            if seen_skills.insert(skill.to_lowercase()) {
                record.skills.push(skill.clone());
            }
        }

        for entry in &fragment.experience {
            if is_blank(&entry.role) || is_blank(&entry.company) {
                continue;
            }
            if seen_experience.insert(entry.normalized_key()) {
                record.experience.push(entry.clone());
            }
        }
    }

    record
}

fn first_present<'a>(
    ordered: &[&'a EntityFragment],
    field: impl Fn(&'a EntityFragment) -> Option<&'a str>,
) -> Option<String> {
    ordered
        .iter()
        .filter_map(|f| field(*f))
        .find(|value| !is_blank(value))
        .map(str::to_string)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn extend_unique(target: &mut Vec<String>, values: &[String]) {
    for value in values.iter().filter(|v| !is_blank(v)) {
        if !target.contains(value) {
            target.push(value.clone());
        }
    }
}
