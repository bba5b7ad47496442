use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::Candidate;
use crate::models::cv::StructuredCv;
use crate::models::role::RankFilters;
use crate::scoring::rubric::ScoreResult;
use crate::store::CvStore;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

const CANDIDATE_COLUMNS: &str = "id, name, email, phone, field_of_study, area_of_interest, \
     suggested_vacancy, graduation_year, parsed_text, cv";

#[derive(Debug, FromRow)]
struct CandidateRow {
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    field_of_study: String,
    area_of_interest: String,
    suggested_vacancy: String,
    graduation_year: Option<i32>,
    parsed_text: String,
    cv: Json<StructuredCv>,
}

impl From<CandidateRow> for Candidate {
    fn from(row: CandidateRow) -> Self {
        Candidate {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            field_of_study: row.field_of_study,
            area_of_interest: row.area_of_interest,
            suggested_vacancy: row.suggested_vacancy,
            graduation_year: row.graduation_year,
            parsed_text: row.parsed_text,
            cv: row.cv.0,
        }
    }
}

/// CV Store backed by the `candidates` and `candidate_scores` tables.
pub struct PgCvStore {
    pool: PgPool,
}

impl PgCvStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CvStore for PgCvStore {
    async fn fetch_pool(&self, filters: &RankFilters) -> Result<Vec<Candidate>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {CANDIDATE_COLUMNS} FROM candidates WHERE TRUE"
        ));

        if let Some(field) = non_blank(&filters.field_of_study) {
            query
                .push(" AND lower(btrim(field_of_study)) = lower(")
                .push_bind(field.to_string())
                .push(")");
        }
        if let Some(area) = non_blank(&filters.area_of_interest) {
            query
                .push(" AND lower(btrim(area_of_interest)) = lower(")
                .push_bind(area.to_string())
                .push(")");
        }
        if let Some(year) = filters.graduation_year {
            query.push(" AND graduation_year = ").push_bind(year);
        }
        if let Some(min_gpa) = filters.min_gpa {
            query.push(" AND normalized_gpa >= ").push_bind(min_gpa);
        }
        if let Some(language) = non_blank(&filters.language) {
            query
                .push(
                    " AND EXISTS (SELECT 1 FROM jsonb_array_elements_text(\
                     COALESCE(cv->'skills'->'languages', '[]'::jsonb)) AS lang WHERE lang ILIKE ",
                )
                .push_bind(contains_pattern(language))
                .push(" ESCAPE '\\')");
        }
        query.push(" ORDER BY created_at, id");

        let rows = query.build_query_as::<CandidateRow>().fetch_all(&self.pool).await?;
        debug!(pool_size = rows.len(), "Fetched candidate pool");

        Ok(rows.into_iter().map(Candidate::from).collect())
    }

    async fn fetch_candidate(&self, id: Uuid) -> Result<Option<Candidate>, AppError> {
        let row: Option<CandidateRow> = sqlx::query_as(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM candidates WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Candidate::from))
    }

    async fn save_score(&self, id: Uuid, score: &ScoreResult) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO candidate_scores
                (candidate_id, total, category_breakdown, reasons, display_gpa, scored_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (candidate_id) DO UPDATE SET
                total = EXCLUDED.total,
                category_breakdown = EXCLUDED.category_breakdown,
                reasons = EXCLUDED.reasons,
                display_gpa = EXCLUDED.display_gpa,
                scored_at = EXCLUDED.scored_at
            "#,
        )
        .bind(id)
        .bind(score.total as i32)
        .bind(Json(&score.category_breakdown))
        .bind(&score.reasons)
        .bind(&score.display_gpa)
        .execute(&mut *tx)
        .await?;

        // Keeps the minGPA filter on the same GPA the rubric reported.
        sqlx::query("UPDATE candidates SET normalized_gpa = $2 WHERE id = $1")
            .bind(id)
            .bind(score.normalized_gpa)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `%value%` for ILIKE with the value's own `%`, `_` and `\` taken literally.
fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
