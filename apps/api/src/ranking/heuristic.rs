//! Heuristic Matcher: cheap, deterministic candidate-vs-role score.
//!
//! Factors and caps (total capped at 100):
//! - must-have skill coverage: 40
//! - nice-to-have skill coverage: 25
//! - field/area alignment: 15 (direct vacancy/area hit) or 10 (via taxonomy)
//! - experience: 10 when entry count ≥ `minYears`, 5 when below but non-zero
//! - language: 5
//! - project relevance: 5
//!
//! Experience uses the number of experience entries as a stand-in for years.

use serde::Serialize;

use crate::models::candidate::Candidate;
use crate::models::role::RoleSpec;
use crate::ranking::taxonomy::CareerTaxonomy;
use crate::scoring::keywords::MatchPredicate;

const MUST_HAVE_WEIGHT: f64 = 40.0;
const NICE_TO_HAVE_WEIGHT: f64 = 25.0;
const DIRECT_ALIGNMENT: f64 = 15.0;
const TAXONOMY_ALIGNMENT: f64 = 10.0;
const EXPERIENCE_MET: f64 = 10.0;
const EXPERIENCE_PARTIAL: f64 = 5.0;
const LANGUAGE_MATCH: f64 = 5.0;
const PROJECT_RELEVANCE: f64 = 5.0;
const MAX_SCORE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeuristicMatch {
    pub score: u32,
    pub matched_must_have: Vec<String>,
    pub missing_must_have: Vec<String>,
    pub matched_nice_to_have: Vec<String>,
    pub missing_nice_to_have: Vec<String>,
}

pub struct HeuristicMatcher<'a> {
    taxonomy: &'a CareerTaxonomy,
    matcher: &'a dyn MatchPredicate,
}

impl<'a> HeuristicMatcher<'a> {
    pub fn new(taxonomy: &'a CareerTaxonomy, matcher: &'a dyn MatchPredicate) -> Self {
        Self { taxonomy, matcher }
    }

    pub fn score(&self, candidate: &Candidate, role: &RoleSpec) -> HeuristicMatch {
        let (matched_must_have, missing_must_have) =
            self.partition_skills(candidate, &role.must_have_skills);
        let (matched_nice_to_have, missing_nice_to_have) =
            self.partition_skills(candidate, &role.nice_to_have_skills);

        let raw = coverage(matched_must_have.len(), role.must_have_skills.len()) * MUST_HAVE_WEIGHT
            + coverage(matched_nice_to_have.len(), role.nice_to_have_skills.len())
                * NICE_TO_HAVE_WEIGHT
            + self.alignment(candidate, role)
            + experience_points(candidate.cv.experience_entries.len(), role.min_years)
            + self.language_points(candidate, role)
            + self.project_points(candidate, role);

        HeuristicMatch {
            score: (raw.round() as u32).min(MAX_SCORE),
            matched_must_have,
            missing_must_have,
            matched_nice_to_have,
            missing_nice_to_have,
        }
    }

    /// A skill counts when it appears in any technical-skill entry or anywhere in the
    /// candidate's parsed text.
    fn has_skill(&self, candidate: &Candidate, skill: &str) -> bool {
        candidate
            .cv
            .skills
            .technical
            .iter()
            .any(|s| self.matcher.matches(s, skill))
            || self.matcher.matches(&candidate.parsed_text, skill)
    }

    fn partition_skills(
        &self,
        candidate: &Candidate,
        skills: &[String],
    ) -> (Vec<String>, Vec<String>) {
        skills
            .iter()
            .cloned()
            .partition(|skill| self.has_skill(candidate, skill))
    }

    fn alignment(&self, candidate: &Candidate, role: &RoleSpec) -> f64 {
        let Some(keyword) = role.title_keyword() else {
            return 0.0;
        };

        if self.matcher.matches(&candidate.suggested_vacancy, &keyword)
            || self.matcher.matches(&candidate.area_of_interest, &keyword)
        {
            DIRECT_ALIGNMENT
        } else if self
            .taxonomy
            .field_offers_vacancy(&candidate.field_of_study, &keyword)
        {
            TAXONOMY_ALIGNMENT
        } else {
            0.0
        }
    }

    fn language_points(&self, candidate: &Candidate, role: &RoleSpec) -> f64 {
        let Some(language) = role.required_language() else {
            return 0.0;
        };
        let speaks = candidate
            .cv
            .skills
            .languages
            .iter()
            .any(|l| self.matcher.matches(l, language));
        if speaks {
            LANGUAGE_MATCH
        } else {
            0.0
        }
    }

    fn project_points(&self, candidate: &Candidate, role: &RoleSpec) -> f64 {
        let relevant = candidate.cv.project_entries.iter().any(|p| {
            let text = format!("{} {}", p.name, p.description);
            role.must_have_skills
                .iter()
                .any(|skill| self.matcher.matches(&text, skill))
        });
        if relevant {
            PROJECT_RELEVANCE
        } else {
            0.0
        }
    }
}

fn coverage(matched: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        matched as f64 / total as f64
    }
}

fn experience_points(entry_count: usize, min_years: f64) -> f64 {
    if entry_count as f64 >= min_years {
        EXPERIENCE_MET
    } else if entry_count > 0 {
        EXPERIENCE_PARTIAL
    } else {
        0.0
    }
}
