use serde::{Deserialize, Serialize};

/// Hiring requirement supplied with each ranking request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSpec {
    pub title: String,
    #[serde(default)]
    pub must_have_skills: Vec<String>,
    #[serde(default)]
    pub nice_to_have_skills: Vec<String>,
    #[serde(default)]
    pub min_years: f64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl RoleSpec {
    /// Lowercased first word of the title, used for vacancy alignment.
    pub fn title_keyword(&self) -> Option<String> {
        self.title
            .split_whitespace()
            .next()
            .map(|w| w.to_lowercase())
    }

    /// The requested language, if one is set and non-blank.
    pub fn required_language(&self) -> Option<&str> {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}

/// Server-side pool filters, passed through to the CV Store untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankFilters {
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub area_of_interest: Option<String>,
    #[serde(default)]
    pub graduation_year: Option<i32>,
    #[serde(default, rename = "minGPA")]
    pub min_gpa: Option<f64>,
    #[serde(default)]
    pub language: Option<String>,
}
