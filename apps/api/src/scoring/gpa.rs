//! GPA normalization onto the canonical 0–4 scale.

use serde_json::Value;

use crate::models::cv::StructuredCv;

pub const GPA_SCALE_MAX: f64 = 4.0;

/// Upper bound of grades treated as already GPA-like. Values in (4, 10] are clamped,
/// not rescaled, so a 0–10 grade of 8.5 lands on 4.0.
const GPA_LIKE_MAX: f64 = 10.0;
/// Upper bound of grades treated as percentages and divided by 25.
const PERCENT_MAX: f64 = 100.0;
const PERCENT_DIVISOR: f64 = 25.0;

/// Normalizes a raw grade into [0, 4].
///
/// Returns `None` when the value is absent, non-numeric, ≤ 0, or above 100.
pub fn normalize_gpa(raw: Option<&Value>) -> Option<f64> {
    let value = match raw? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !value.is_finite() || value <= 0.0 {
        return None;
    }

    if value <= GPA_LIKE_MAX {
        Some(value.min(GPA_SCALE_MAX))
    } else if value <= PERCENT_MAX {
        Some((value / PERCENT_DIVISOR).min(GPA_SCALE_MAX))
    } else {
        None
    }
}

/// The CV's GPA as stored in `candidates.normalized_gpa` and used by the `minGPA`
/// filter: the first education entry carrying a usable grade.
pub fn cv_gpa(cv: &StructuredCv) -> Option<f64> {
    cv.education
        .iter()
        .find_map(|entry| normalize_gpa(entry.gpa.as_ref()))
}

/// Formats a normalized GPA to two decimals, or `"N/A"` when absent.
pub fn display_gpa(gpa: Option<f64>) -> String {
    match gpa {
        Some(value) => format!("{value:.2}"),
        None => "N/A".to_string(),
    }
}
