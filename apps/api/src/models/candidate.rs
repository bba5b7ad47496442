use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::cv::StructuredCv;

/// A candidate as held by the CV Store: identity and contact metadata plus the parsed CV.
///
/// Identity fields (`name`, `email`, `phone`) never leave the service boundary
/// towards the AI ranker and are never logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub field_of_study: String,
    pub area_of_interest: String,
    pub suggested_vacancy: String,
    pub graduation_year: Option<i32>,
    /// Full free text extracted from the uploaded resume.
    pub parsed_text: String,
    pub cv: StructuredCv,
}
