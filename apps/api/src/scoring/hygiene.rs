//! CV hygiene: normalizes whitespace and removes duplicates before scoring.
//!
//! Cleaning only ever removes or trims; it never adds content.

use std::collections::HashSet;

use crate::models::cv::StructuredCv;

/// Returns a cleaned copy of the CV:
/// - every string field trimmed
/// - blank bullets dropped
/// - skill lists and project technologies de-duplicated case-insensitively,
///   keeping the first spelling and the original order
pub fn clean_cv(mut cv: StructuredCv) -> StructuredCv {
    cv.summary = cv.summary.trim().to_string();

    for entry in &mut cv.experience_entries {
        trim_in_place(&mut entry.company);
        trim_in_place(&mut entry.position);
        trim_in_place(&mut entry.description);
        trim_in_place(&mut entry.start_date);
        trim_in_place(&mut entry.end_date);
        clean_bullets(&mut entry.bullets);
    }

    for project in &mut cv.project_entries {
        trim_in_place(&mut project.name);
        trim_in_place(&mut project.description);
        trim_in_place(&mut project.url);
        clean_bullets(&mut project.bullets);
        dedup_case_insensitive(&mut project.technologies);
    }

    dedup_case_insensitive(&mut cv.skills.technical);
    dedup_case_insensitive(&mut cv.skills.languages);
    dedup_case_insensitive(&mut cv.skills.soft);

    for edu in &mut cv.education {
        trim_in_place(&mut edu.degree);
        trim_in_place(&mut edu.field_of_study);
        trim_in_place(&mut edu.description);
    }

    cv
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

fn clean_bullets(bullets: &mut Vec<String>) {
    for bullet in bullets.iter_mut() {
        trim_in_place(bullet);
    }
    bullets.retain(|b| !b.is_empty());
}

fn dedup_case_insensitive(items: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for item in items.iter_mut() {
        trim_in_place(item);
    }
    items.retain(|item| !item.is_empty() && seen.insert(item.to_lowercase()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv::{ExperienceEntry, ProjectEntry, Skills};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bullets_trimmed_and_blanks_dropped() {
        let cv = StructuredCv {
            experience_entries: vec![ExperienceEntry {
                company: "  Acme ".to_string(),
                bullets: strings(&["  Shipped v2  ", "", "   "]),
                ..Default::default()
            }],
            ..Default::default()
        };
        let cleaned = clean_cv(cv);
        assert_eq!(cleaned.experience_entries[0].company, "Acme");
        assert_eq!(cleaned.experience_entries[0].bullets, vec!["Shipped v2"]);
    }

    #[test]
    fn test_skills_deduplicated_keeping_first_spelling() {
        let cv = StructuredCv {
            skills: Skills {
                technical: strings(&["React", "react ", "Node", "REACT", ""]),
                languages: strings(&["English", "english"]),
                soft: vec![],
            },
            project_entries: vec![ProjectEntry {
                technologies: strings(&["Docker", "docker"]),
                ..Default::default()
            }],
            ..Default::default()
        };
        let cleaned = clean_cv(cv);
        assert_eq!(cleaned.skills.technical, vec!["React", "Node"]);
        assert_eq!(cleaned.skills.languages, vec!["English"]);
        assert_eq!(cleaned.project_entries[0].technologies, vec!["Docker"]);
    }

    #[test]
    fn test_clean_cv_is_idempotent() {
        let cv = StructuredCv {
            summary: " AWS certified ".to_string(),
            skills: Skills {
                technical: strings(&["Go", "go"]),
                ..Default::default()
            },
            ..Default::default()
        };
        let once = clean_cv(cv);
        let twice = clean_cv(once.clone());
        assert_eq!(once, twice);
    }
}
