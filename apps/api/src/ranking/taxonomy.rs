//! Role/Career Taxonomy: static field of study → area → vacancy lookup.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerArea {
    pub name: String,
    pub vacancies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOfStudy {
    pub name: String,
    pub areas: Vec<CareerArea>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerTaxonomy {
    pub fields: Vec<FieldOfStudy>,
}

fn area(name: &str, vacancies: &[&str]) -> CareerArea {
    CareerArea {
        name: name.to_string(),
        vacancies: vacancies.iter().map(|v| v.to_string()).collect(),
    }
}

fn field(name: &str, areas: Vec<CareerArea>) -> FieldOfStudy {
    FieldOfStudy {
        name: name.to_string(),
        areas,
    }
}

impl CareerTaxonomy {
    /// The taxonomy shipped with the service.
    pub fn builtin() -> Self {
        Self {
            fields: vec![
                field(
                    "Computer Science",
                    vec![
                        area(
                            "Software Engineering",
                            &[
                                "Frontend Developer",
                                "Backend Developer",
                                "Full Stack Developer",
                                "Mobile Developer",
                                "DevOps Engineer",
                            ],
                        ),
                        area(
                            "Data & AI",
                            &["Data Analyst", "Data Scientist", "Machine Learning Engineer"],
                        ),
                        area(
                            "Cybersecurity",
                            &["Security Analyst", "Penetration Tester", "SOC Analyst"],
                        ),
                    ],
                ),
                field(
                    "Information Systems",
                    vec![
                        area(
                            "Business Technology",
                            &["Business Analyst", "Systems Analyst", "IT Project Coordinator"],
                        ),
                        area(
                            "Infrastructure",
                            &["Network Engineer", "Cloud Engineer", "IT Support Specialist"],
                        ),
                    ],
                ),
                field(
                    "Computer Engineering",
                    vec![
                        area(
                            "Embedded Systems",
                            &["Embedded Software Engineer", "Firmware Engineer"],
                        ),
                        area("Hardware", &["Hardware Engineer", "FPGA Engineer"]),
                    ],
                ),
                field(
                    "Business Administration",
                    vec![
                        area(
                            "Marketing",
                            &["Marketing Specialist", "Digital Marketing Coordinator"],
                        ),
                        area("Finance", &["Financial Analyst", "Accountant"]),
                        area("Operations", &["Operations Coordinator", "Supply Chain Analyst"]),
                    ],
                ),
                field(
                    "Graphic Design",
                    vec![area(
                        "Design",
                        &["UI Designer", "UX Designer", "Product Designer"],
                    )],
                ),
            ],
        }
    }

    /// Loads a taxonomy from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read taxonomy file: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse taxonomy file: {}", path.display()))
    }

    /// Areas reachable from a field of study (case-insensitive, exact name).
    pub fn areas_for_field<'a>(
        &'a self,
        field_of_study: &str,
    ) -> impl Iterator<Item = &'a CareerArea> {
        let wanted = field_of_study.trim().to_lowercase();
        self.fields
            .iter()
            .filter(move |f| !wanted.is_empty() && f.name.to_lowercase() == wanted)
            .flat_map(|f| f.areas.iter())
    }

    /// Whether any vacancy reachable from `field_of_study` mentions `keyword`.
    pub fn field_offers_vacancy(&self, field_of_study: &str, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return false;
        }
        self.areas_for_field(field_of_study)
            .flat_map(|a| a.vacancies.iter())
            .any(|v| v.to_lowercase().contains(&keyword))
    }
}
