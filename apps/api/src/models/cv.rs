//! Structured CV record as held by the CV Store.
//!
//! Every field is lenient: a missing key or an explicit `null` becomes the
//! empty value, so a sparse CV always deserializes. Type mismatches (an
//! object where a list belongs) still fail and surface as validation errors.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuredCv {
    #[serde(deserialize_with = "null_as_default")]
    pub experience_entries: Vec<ExperienceEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub project_entries: Vec<ProjectEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub skills: Skills,
    #[serde(deserialize_with = "null_as_default")]
    pub education: Vec<EducationEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(deserialize_with = "null_as_default")]
    pub position: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bullets: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub start_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub end_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub current: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub technologies: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skills {
    #[serde(deserialize_with = "null_as_default")]
    pub technical: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub languages: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub soft: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub degree: String,
    #[serde(deserialize_with = "null_as_default")]
    pub field_of_study: String,
    /// Raw grade exactly as the candidate entered it: number, numeric string, or absent.
    pub gpa: Option<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

impl StructuredCv {
    /// All experience bullets in entry order.
    pub fn experience_bullets(&self) -> impl Iterator<Item = &str> {
        self.experience_entries
            .iter()
            .flat_map(|e| e.bullets.iter().map(String::as_str))
    }

    /// All project bullets in entry order.
    pub fn project_bullets(&self) -> impl Iterator<Item = &str> {
        self.project_entries
            .iter()
            .flat_map(|p| p.bullets.iter().map(String::as_str))
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
