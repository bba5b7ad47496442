// CV quality scoring: GPA normalization, the five-category rubric, and CV hygiene.
// Pure and synchronous; safe to call concurrently from any handler.

pub mod gpa;
pub mod handlers;
pub mod hygiene;
pub mod keywords;
pub mod rubric;
