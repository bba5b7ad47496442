//! Keyword capability set and the match predicate the scorers use.
//!
//! Keyword lists are data, not logic: the compiled-in default can be replaced
//! at startup from a JSON file (`SCORING_KEYWORDS_PATH`) without touching the
//! scoring code. `MatchPredicate` is the seam for swapping substring matching
//! for tokenized or semantic matching.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Versioned keyword lists consumed by the rubric scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringKeywords {
    pub version: u32,
    pub leadership: Vec<String>,
    pub technology: Vec<String>,
    pub certification: Vec<String>,
    pub honors: Vec<String>,
    pub awards: Vec<String>,
    pub extracurricular: Vec<String>,
    /// Spoken languages excluded when counting programming languages.
    pub natural_languages: Vec<String>,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for ScoringKeywords {
    fn default() -> Self {
        Self {
            version: 1,
            leadership: owned(&[
                "led",
                "managed",
                "mentored",
                "owned",
                "architected",
                "supervised",
                "coordinated",
                "headed",
                "spearheaded",
                "directed",
            ]),
            technology: owned(&[
                "react",
                "node",
                "python",
                "java",
                "typescript",
                "javascript",
                "rust",
                "sql",
                "docker",
                "kubernetes",
                "aws",
                "azure",
                "gcp",
                "graphql",
                "terraform",
                "microservice",
            ]),
            certification: owned(&[
                "aws", "azure", "gcp", "scrum", "pmp", "kubernetes", "cka", "ckad", "certified",
            ]),
            honors: owned(&["honors", "honours", "dean", "cum laude", "magna", "summa"]),
            awards: owned(&["award", "winner", "recognition", "dean's list", "honors"]),
            extracurricular: owned(&[
                "club",
                "hackathon",
                "volunteer",
                "open source",
                "publication",
            ]),
            natural_languages: owned(&["english", "arabic"]),
        }
    }
}

impl ScoringKeywords {
    /// Loads a keyword set from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read keyword file: {}", path.display()))?;
        let keywords: ScoringKeywords = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse keyword file: {}", path.display()))?;
        Ok(keywords.lowercased())
    }

    /// Keywords are matched against lowercased text, so store them lowercased.
    fn lowercased(mut self) -> Self {
        for list in [
            &mut self.leadership,
            &mut self.technology,
            &mut self.certification,
            &mut self.honors,
            &mut self.awards,
            &mut self.extracurricular,
            &mut self.natural_languages,
        ] {
            for word in list.iter_mut() {
                *word = word.trim().to_lowercase();
            }
            list.retain(|w| !w.is_empty());
        }
        self
    }
}

/// Decides whether a keyword occurs in a piece of text.
pub trait MatchPredicate: Send + Sync {
    fn matches(&self, haystack: &str, needle: &str) -> bool;

    /// Keywords from `keywords` found in `haystack`, in list order, without repeats.
    fn hits<'k>(&self, haystack: &str, keywords: &'k [String]) -> Vec<&'k str> {
        keywords
            .iter()
            .filter(|k| self.matches(haystack, k))
            .map(String::as_str)
            .collect()
    }
}

/// Case-insensitive substring containment. Blank needles never match.
pub struct SubstringMatch;

impl MatchPredicate for SubstringMatch {
    fn matches(&self, haystack: &str, needle: &str) -> bool {
        let needle = needle.trim();
        if needle.is_empty() {
            return false;
        }
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_substring_match_is_case_insensitive() {
        assert!(SubstringMatch.matches("Built APIs in React.js", "react"));
        assert!(SubstringMatch.matches("react", "React"));
        assert!(!SubstringMatch.matches("Vue", "react"));
    }

    #[test]
    fn test_blank_needle_never_matches() {
        assert!(!SubstringMatch.matches("anything", "  "));
    }

    #[test]
    fn test_hits_are_distinct_and_ordered() {
        let words = owned(&["led", "managed", "mentored"]);
        let hits = SubstringMatch.hits("Mentored interns and led the team; led again", &words);
        assert_eq!(hits, vec!["led", "mentored"]);
    }

    #[test]
    fn test_default_set_is_version_one() {
        let keywords = ScoringKeywords::default();
        assert_eq!(keywords.version, 1);
        assert_eq!(keywords.leadership.len(), 10);
        assert!(keywords.natural_languages.contains(&"english".to_string()));
    }

    #[test]
    fn test_from_file_lowercases_entries() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let mut keywords = ScoringKeywords::default();
        keywords.version = 2;
        keywords.leadership = vec!["Championed".to_string(), " ".to_string()];
        write!(file, "{}", serde_json::to_string(&keywords).unwrap()).unwrap();

        let loaded = ScoringKeywords::from_file(file.path()).unwrap();
        assert_eq!(loaded.version, 2);
        assert_eq!(loaded.leadership, vec!["championed"]);
    }

    #[test]
    fn test_from_file_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(ScoringKeywords::from_file(file.path()).is_err());
    }
}
