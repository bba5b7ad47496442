//! Rubric Scorer: deterministic 0–100 quality score for a structured CV.
//!
//! Five independent categories, each capped:
//!
//! | Category              | Cap |
//! |-----------------------|-----|
//! | Experience            | 35  |
//! | Projects              | 25  |
//! | Skills                | 20  |
//! | Education             | 10  |
//! | Certifications/Awards | 10  |
//!
//! Each category returns its subtotal together with the details it was computed
//! from. Reasons are rendered from those details only, so a reason can never
//! claim something the scorer did not see.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::cv::StructuredCv;
use crate::scoring::gpa::{cv_gpa, display_gpa, normalize_gpa, GPA_SCALE_MAX};
use crate::scoring::keywords::{MatchPredicate, ScoringKeywords};

pub const EXPERIENCE_CAP: u32 = 35;
pub const PROJECTS_CAP: u32 = 25;
pub const SKILLS_CAP: u32 = 20;
pub const EDUCATION_CAP: u32 = 10;
pub const CERTS_AWARDS_CAP: u32 = 10;
pub const TOTAL_CAP: u32 = 100;

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub experience: u32,
    pub projects: u32,
    pub skills: u32,
    pub education: u32,
    pub certs_awards: u32,
}

impl CategoryBreakdown {
    pub fn sum(&self) -> u32 {
        self.experience + self.projects + self.skills + self.education + self.certs_awards
    }
}

/// Result of scoring one CV. Recomputed on demand, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub total: u32,
    pub category_breakdown: CategoryBreakdown,
    /// Signed statements, `"+ …"` for strengths and `"- …"` for weaknesses.
    pub reasons: Vec<String>,
    #[serde(rename = "displayGPA")]
    pub display_gpa: String,
    /// Persisted to `candidates.normalized_gpa` alongside the score.
    #[serde(skip)]
    pub normalized_gpa: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
struct CategoryScore<D> {
    subtotal: u32,
    details: D,
}

#[derive(Debug, Clone, PartialEq)]
struct ExperienceDetails {
    entry_count: usize,
    total_bullets: usize,
    quantified_bullets: usize,
    leadership_hits: Vec<String>,
    technology_hits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct ProjectDetails {
    project_count: usize,
    distinct_technologies: usize,
    quantified_bullets: usize,
    has_deployed_link: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct SkillDetails {
    technical_count: usize,
    programming_languages: usize,
    certification_hits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct EducationDetails {
    has_entry: bool,
    has_degree: bool,
    gpa: Option<f64>,
    honors: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct CertsAwardsDetails {
    certification: bool,
    awards: bool,
    extracurricular: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Scorer
// ────────────────────────────────────────────────────────────────────────────

/// Scores CVs against an injected keyword set and match predicate.
pub struct RubricScorer<'a> {
    keywords: &'a ScoringKeywords,
    matcher: &'a dyn MatchPredicate,
}

impl<'a> RubricScorer<'a> {
    pub fn new(keywords: &'a ScoringKeywords, matcher: &'a dyn MatchPredicate) -> Self {
        Self { keywords, matcher }
    }

    /// Scores a CV. Never fails: sparse CVs simply score low.
    pub fn score(&self, cv: &StructuredCv) -> ScoreResult {
        let experience = self.experience(cv);
        let projects = self.projects(cv);
        let skills = self.skills(cv);
        let education = self.education(cv);
        let certs_awards = self.certs_awards(cv);

        let category_breakdown = CategoryBreakdown {
            experience: experience.subtotal,
            projects: projects.subtotal,
            skills: skills.subtotal,
            education: education.subtotal,
            certs_awards: certs_awards.subtotal,
        };

        let mut reasons = Vec::new();
        reasons.extend(experience_reasons(&experience.details));
        reasons.extend(project_reasons(&projects.details));
        reasons.extend(skill_reasons(&skills.details));
        reasons.extend(education_reasons(&education.details));
        reasons.extend(certs_awards_reasons(&certs_awards.details));

        let normalized_gpa = cv_gpa(cv);

        ScoreResult {
            total: category_breakdown.sum().min(TOTAL_CAP),
            category_breakdown,
            reasons,
            display_gpa: display_gpa(normalized_gpa),
            normalized_gpa,
        }
    }

    fn experience(&self, cv: &StructuredCv) -> CategoryScore<ExperienceDetails> {
        let entry_count = cv.experience_entries.len();
        let bullets: Vec<&str> = non_blank(cv.experience_bullets()).collect();
        let total_bullets = bullets.len();
        let quantified_bullets = bullets.iter().filter(|b| is_quantified(b)).count();

        let text = cv
            .experience_entries
            .iter()
            .flat_map(|e| {
                std::iter::once(e.description.as_str()).chain(e.bullets.iter().map(String::as_str))
            })
            .collect::<Vec<_>>()
            .join("\n");
        let leadership_hits = to_owned(self.matcher.hits(&text, &self.keywords.leadership));
        let technology_hits = to_owned(self.matcher.hits(&text, &self.keywords.technology));

        let raw = ratio(entry_count.min(3), 3) * 10.0
            + ratio(total_bullets.min(12), 12) * 10.0
            + ratio(quantified_bullets, total_bullets) * 10.0
            + ratio(leadership_hits.len().min(3), 3) * 3.0
            + ratio(technology_hits.len().min(4), 4) * 2.0;

        CategoryScore {
            subtotal: capped(raw, EXPERIENCE_CAP),
            details: ExperienceDetails {
                entry_count,
                total_bullets,
                quantified_bullets,
                leadership_hits,
                technology_hits,
            },
        }
    }

    fn projects(&self, cv: &StructuredCv) -> CategoryScore<ProjectDetails> {
        let project_count = cv.project_entries.len();
        let distinct_technologies = cv
            .project_entries
            .iter()
            .flat_map(|p| p.technologies.iter())
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect::<HashSet<_>>()
            .len();
        let bullets: Vec<&str> = non_blank(cv.project_bullets()).collect();
        let quantified_bullets = bullets.iter().filter(|b| is_quantified(b)).count();
        let has_deployed_link = cv.project_entries.iter().any(|p| is_http_link(&p.url));

        let raw = ratio(project_count.min(4), 4) * 6.0
            + ratio(distinct_technologies.min(10), 10) * 8.0
            + ratio(quantified_bullets, bullets.len()) * 9.0
            + if has_deployed_link { 2.0 } else { 0.0 };

        CategoryScore {
            subtotal: capped(raw, PROJECTS_CAP),
            details: ProjectDetails {
                project_count,
                distinct_technologies,
                quantified_bullets,
                has_deployed_link,
            },
        }
    }

    fn skills(&self, cv: &StructuredCv) -> CategoryScore<SkillDetails> {
        let technical: Vec<&str> =
            non_blank(cv.skills.technical.iter().map(String::as_str)).collect();
        let technical_count = technical.len();

        let programming_languages = non_blank(cv.skills.languages.iter().map(String::as_str))
            .filter(|lang| {
                !self
                    .keywords
                    .natural_languages
                    .iter()
                    .any(|natural| self.matcher.matches(lang, natural))
            })
            .count();

        let certification_hits = to_owned(
            self.matcher
                .hits(&technical.join("\n"), &self.keywords.certification),
        );

        let raw = ratio(technical_count.min(12), 12) * 14.0
            + ratio(programming_languages.min(4), 4) * 4.0
            + if certification_hits.is_empty() { 0.0 } else { 2.0 };

        CategoryScore {
            subtotal: capped(raw, SKILLS_CAP),
            details: SkillDetails {
                technical_count,
                programming_languages,
                certification_hits,
            },
        }
    }

    /// Only the first education entry counts.
    fn education(&self, cv: &StructuredCv) -> CategoryScore<EducationDetails> {
        let Some(first) = cv.education.first() else {
            return CategoryScore {
                subtotal: 0,
                details: EducationDetails {
                    has_entry: false,
                    has_degree: false,
                    gpa: None,
                    honors: false,
                },
            };
        };

        let has_degree = !first.degree.trim().is_empty();
        let has_field = !first.field_of_study.trim().is_empty();
        let gpa = normalize_gpa(first.gpa.as_ref());
        let honors = !self
            .matcher
            .hits(&first.description, &self.keywords.honors)
            .is_empty();

        let raw = if has_degree { 3.0 } else { 0.0 }
            + if has_field { 2.0 } else { 0.0 }
            + gpa.map(|g| g / GPA_SCALE_MAX * 5.0).unwrap_or(0.0)
            + if honors { 1.0 } else { 0.0 };

        CategoryScore {
            subtotal: capped(raw, EDUCATION_CAP),
            details: EducationDetails {
                has_entry: true,
                has_degree,
                gpa,
                honors,
            },
        }
    }

    fn certs_awards(&self, cv: &StructuredCv) -> CategoryScore<CertsAwardsDetails> {
        let text = std::iter::once(cv.summary.as_str())
            .chain(cv.education.iter().map(|e| e.description.as_str()))
            .chain(cv.skills.technical.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n");

        let present = |keywords: &[String]| !self.matcher.hits(&text, keywords).is_empty();
        let certification = present(&self.keywords.certification);
        let awards = present(&self.keywords.awards);
        let extracurricular = present(&self.keywords.extracurricular);

        let raw = if certification { 5.0 } else { 0.0 }
            + if awards { 3.0 } else { 0.0 }
            + if extracurricular { 2.0 } else { 0.0 };

        CategoryScore {
            subtotal: capped(raw, CERTS_AWARDS_CAP),
            details: CertsAwardsDetails {
                certification,
                awards,
                extracurricular,
            },
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Reasons
// ────────────────────────────────────────────────────────────────────────────

fn experience_reasons(d: &ExperienceDetails) -> Vec<String> {
    if d.entry_count == 0 {
        return vec!["- No work experience listed".to_string()];
    }

    let impact = if d.quantified_bullets > 0 {
        format!(
            "+ Quantified impact in {} of {} experience bullets",
            d.quantified_bullets, d.total_bullets
        )
    } else if d.total_bullets == 0 {
        "- Experience entries have no bullet points".to_string()
    } else {
        format!("- No quantified results in {} experience bullets", d.total_bullets)
    };

    let leadership = if d.leadership_hits.is_empty() {
        "- No leadership language in experience".to_string()
    } else {
        format!("+ Leadership language: {}", d.leadership_hits.join(", "))
    };

    vec![impact, leadership]
}

fn project_reasons(d: &ProjectDetails) -> Vec<String> {
    if d.project_count == 0 {
        return vec!["- No projects listed".to_string()];
    }

    let mut reasons = vec![format!(
        "+ {} project(s) using {} distinct technologies",
        d.project_count, d.distinct_technologies
    )];
    if d.has_deployed_link {
        reasons.push("+ Live project link provided".to_string());
    } else if d.quantified_bullets == 0 {
        reasons.push("- No measurable project outcomes".to_string());
    }
    reasons
}

fn skill_reasons(d: &SkillDetails) -> Vec<String> {
    if d.technical_count == 0 {
        return vec!["- No technical skills listed".to_string()];
    }

    let mut reasons = vec![format!(
        "+ {} technical skills, {} programming languages",
        d.technical_count, d.programming_languages
    )];
    if !d.certification_hits.is_empty() {
        reasons.push(format!(
            "+ Certified skill areas: {}",
            d.certification_hits.join(", ")
        ));
    }
    reasons
}

fn education_reasons(d: &EducationDetails) -> Vec<String> {
    if !d.has_entry {
        return vec!["- No education listed".to_string()];
    }

    let mut reasons = Vec::new();
    match d.gpa {
        Some(_) => reasons.push(format!("+ GPA {}", display_gpa(d.gpa))),
        None if d.has_degree => reasons.push("- GPA not provided".to_string()),
        None => reasons.push("- Degree and GPA not provided".to_string()),
    }
    if d.honors {
        reasons.push("+ Academic honors mentioned".to_string());
    }
    reasons
}

fn certs_awards_reasons(d: &CertsAwardsDetails) -> Vec<String> {
    let mut reasons = vec![if d.certification {
        "+ Certifications mentioned".to_string()
    } else {
        "- No certifications found".to_string()
    }];
    if d.awards {
        reasons.push("+ Awards or recognition mentioned".to_string());
    } else if d.extracurricular {
        reasons.push("+ Extracurricular involvement mentioned".to_string());
    }
    reasons
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// A bullet is quantified when it carries a number or a percent sign.
/// Shorthands like `40k` or `2m` contain digits and are covered.
pub fn is_quantified(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit() || c == '%')
}

fn is_http_link(url: &str) -> bool {
    reqwest::Url::parse(url.trim())
        .map(|u| {
            matches!(u.scheme(), "http" | "https") && u.host_str().is_some_and(|h| !h.is_empty())
        })
        .unwrap_or(false)
}

fn non_blank<'s>(items: impl Iterator<Item = &'s str>) -> impl Iterator<Item = &'s str> {
    items.filter(|s| !s.trim().is_empty())
}

fn to_owned(hits: Vec<&str>) -> Vec<String> {
    hits.into_iter().map(str::to_string).collect()
}

/// `part / whole`, or 0 when `whole` is 0.
fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn capped(raw: f64, cap: u32) -> u32 {
    (raw.max(0.0).round() as u32).min(cap)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv::{EducationEntry, ExperienceEntry, ProjectEntry, Skills};
    use crate::scoring::keywords::SubstringMatch;
    use serde_json::json;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn score(cv: &StructuredCv) -> ScoreResult {
        let keywords = ScoringKeywords::default();
        RubricScorer::new(&keywords, &SubstringMatch).score(cv)
    }

    fn experience(bullets: &[&str]) -> ExperienceEntry {
        ExperienceEntry {
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            bullets: strings(bullets),
            ..Default::default()
        }
    }

    fn strong_cv() -> StructuredCv {
        StructuredCv {
            experience_entries: vec![
                experience(&[
                    "Led migration of 12 services to Kubernetes, cutting costs 30%",
                    "Managed a team of 5 engineers shipping React features",
                ]),
                experience(&[
                    "Mentored 4 junior developers in Python",
                    "Architected a data pipeline processing 2m events daily",
                ]),
                experience(&[
                    "Spearheaded AWS cost review saving 40k per year",
                    "Directed rollout of 3 Node microservices with 99.9% uptime",
                ]),
            ],
            project_entries: vec![
                ProjectEntry {
                    name: "Storefront".to_string(),
                    technologies: strings(&["React", "Node", "PostgreSQL", "Docker"]),
                    url: "https://demo.example.com".to_string(),
                    bullets: strings(&["Served 1,000 weekly users"]),
                    ..Default::default()
                },
                ProjectEntry {
                    name: "Forecaster".to_string(),
                    technologies: strings(&["Python", "FastAPI", "AWS"]),
                    bullets: strings(&["Cut report time by 40%"]),
                    ..Default::default()
                },
            ],
            skills: Skills {
                technical: strings(&[
                    "React",
                    "Node.js",
                    "Python",
                    "Docker",
                    "PostgreSQL",
                    "Git",
                    "Linux",
                    "AWS Certified Cloud Practitioner",
                ]),
                languages: strings(&["English", "JavaScript", "Python"]),
                soft: vec![],
            },
            education: vec![EducationEntry {
                degree: "BSc".to_string(),
                field_of_study: "Computer Science".to_string(),
                gpa: Some(json!(3.9)),
                description: String::new(),
            }],
            summary: String::new(),
        }
    }

    #[test]
    fn test_empty_cv_scores_zero_without_error() {
        let result = score(&StructuredCv::default());
        assert_eq!(result.total, 0);
        assert_eq!(result.category_breakdown, CategoryBreakdown::default());
        assert_eq!(result.display_gpa, "N/A");
        assert!(!result.reasons.is_empty());
        assert!(result.reasons.iter().all(|r| r.starts_with("- ")));
    }

    #[test]
    fn test_strong_cv_lands_in_high_band() {
        let result = score(&strong_cv());
        assert!(result.total > 75, "Expected >75, got {}", result.total);
        assert!(result
            .reasons
            .iter()
            .any(|r| r.starts_with("+ Quantified impact")));
        assert!(result.reasons.iter().any(|r| r == "+ GPA 3.90"));
        assert_eq!(result.display_gpa, "3.90");
    }

    #[test]
    fn test_strong_cv_breakdown() {
        let b = score(&strong_cv()).category_breakdown;
        assert_eq!(b.experience, 30);
        assert_eq!(b.projects, 20);
        assert_eq!(b.skills, 13);
        assert_eq!(b.education, 10);
        assert_eq!(b.certs_awards, 5);
    }

    #[test]
    fn test_saturated_cv_respects_every_cap() {
        let mut cv = strong_cv();
        let bullets = [
            "Led 10 engineers",
            "Managed $2m budget",
            "Mentored 6 interns",
            "Owned 99% uptime SLO",
        ];
        cv.experience_entries = (0..5).map(|_| experience(&bullets)).collect();
        cv.project_entries = (0..6)
            .map(|i| ProjectEntry {
                name: format!("Project {i}"),
                technologies: (0..4).map(|t| format!("tech-{i}-{t}")).collect(),
                url: "http://example.org".to_string(),
                bullets: strings(&["Reached 500 stars"]),
                ..Default::default()
            })
            .collect();
        cv.skills.technical = (0..20).map(|i| format!("skill {i} certified")).collect();
        cv.skills.languages = strings(&["Rust", "Go", "C", "Zig", "Haskell"]);
        cv.education[0].description = "Graduated summa cum laude".to_string();
        cv.summary = "Award winner, hackathon organizer, open source maintainer".to_string();

        let result = score(&cv);
        let b = result.category_breakdown;
        assert!(b.experience <= EXPERIENCE_CAP);
        assert!(b.projects <= PROJECTS_CAP);
        assert!(b.skills <= SKILLS_CAP);
        assert_eq!(b.education, EDUCATION_CAP);
        assert_eq!(b.certs_awards, CERTS_AWARDS_CAP);
        assert!(result.total <= TOTAL_CAP);
        assert_eq!(result.total, b.sum());
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let cv = strong_cv();
        let first = score(&cv);
        let second = score(&cv);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_extra_quantified_bullet_never_lowers_experience() {
        let bases = [
            vec![experience(&[])],
            vec![experience(&["Wrote docs"])],
            vec![experience(&["Shipped 3 releases", "Fixed bugs"])],
            strong_cv().experience_entries,
        ];

        for entries in bases {
            let mut cv = StructuredCv {
                experience_entries: entries,
                ..Default::default()
            };
            let before = score(&cv).category_breakdown.experience;
            cv.experience_entries[0]
                .bullets
                .push("Reduced p95 latency by 20%".to_string());
            let after = score(&cv).category_breakdown.experience;
            assert!(after >= before, "experience dropped from {before} to {after}");
        }
    }

    #[test]
    fn test_education_uses_only_first_entry() {
        let cv = StructuredCv {
            education: vec![
                EducationEntry {
                    degree: "High School Diploma".to_string(),
                    ..Default::default()
                },
                EducationEntry {
                    degree: "MSc".to_string(),
                    field_of_study: "Physics".to_string(),
                    gpa: Some(json!(4.0)),
                    description: "Dean's list".to_string(),
                },
            ],
            ..Default::default()
        };
        let result = score(&cv);
        assert_eq!(result.category_breakdown.education, 3);
        // Display still finds the first usable GPA across entries.
        assert_eq!(result.display_gpa, "4.00");
        assert!(result.reasons.iter().any(|r| r == "- GPA not provided"));
    }

    #[test]
    fn test_percentage_gpa_feeds_education() {
        let cv = StructuredCv {
            education: vec![EducationEntry {
                degree: "BEng".to_string(),
                field_of_study: "Mechanical".to_string(),
                gpa: Some(json!("92")),
                description: String::new(),
            }],
            ..Default::default()
        };
        let result = score(&cv);
        // 3 + 2 + 3.68 / 4 * 5 = 9.6
        assert_eq!(result.category_breakdown.education, 10);
        assert_eq!(result.display_gpa, "3.68");
        let stored = result.normalized_gpa.unwrap();
        assert!((stored - 3.68).abs() < 1e-9, "got {stored}");
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("normalizedGpa").is_none());
    }

    #[test]
    fn test_malformed_project_url_is_not_deployment() {
        let mut cv = StructuredCv::default();
        cv.project_entries.push(ProjectEntry {
            name: "Toy".to_string(),
            url: "demo.example.com".to_string(),
            ..Default::default()
        });
        let result = score(&cv);
        // 1/4 * 6 = 1.5 rounds to 2; no link bonus
        assert_eq!(result.category_breakdown.projects, 2);
        assert!(result
            .reasons
            .iter()
            .any(|r| r == "- No measurable project outcomes"));
    }

    #[test]
    fn test_natural_languages_do_not_count_as_programming() {
        let cv = StructuredCv {
            skills: Skills {
                technical: strings(&["Excel"]),
                languages: strings(&["English", "Arabic (native)", "Rust"]),
                soft: vec![],
            },
            ..Default::default()
        };
        let result = score(&cv);
        // 1/12 * 14 = 1.17, plus 1/4 * 4 = 1
        assert_eq!(result.category_breakdown.skills, 2);
        assert!(result
            .reasons
            .iter()
            .any(|r| r == "+ 1 technical skills, 1 programming languages"));
    }

    #[test]
    fn test_certs_awards_buckets_are_binary() {
        let cv = StructuredCv {
            summary: "AWS certified, Azure certified, GCP certified; award winner".to_string(),
            ..Default::default()
        };
        let result = score(&cv);
        assert_eq!(result.category_breakdown.certs_awards, 8);
        assert!(result.reasons.iter().any(|r| r == "+ Certifications mentioned"));
        assert!(result
            .reasons
            .iter()
            .any(|r| r == "+ Awards or recognition mentioned"));
    }

    #[test]
    fn test_every_reason_is_signed() {
        let result = score(&strong_cv());
        assert!(result
            .reasons
            .iter()
            .all(|r| r.starts_with("+ ") || r.starts_with("- ")));
    }

    #[test]
    fn test_is_quantified() {
        assert!(is_quantified("Grew revenue 30%"));
        assert!(is_quantified("Saved 40k"));
        assert!(!is_quantified("Improved onboarding"));
    }
}
