//! Problem repository

use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use crate::error::{JudgeError, JudgeResult};
use crate::models::{Parameter, ProblemDefinition, TestCase};

/// Row shape of the `problems` table
#[derive(Debug, FromRow)]
struct ProblemRow {
    id: String,
    title: String,
    description: Option<String>,
    difficulty: String,
    tags: Vec<String>,
    function_name: String,
    return_type: String,
    parameters: Json<Vec<Parameter>>,
    test_cases: Json<Vec<TestCase>>,
}

impl TryFrom<ProblemRow> for ProblemDefinition {
    type Error = JudgeError;

    fn try_from(row: ProblemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            difficulty: row.difficulty.parse().map_err(JudgeError::Serialization)?,
            id: row.id,
            title: row.title,
            description: row.description,
            tags: row.tags,
            function_name: row.function_name,
            return_type: row.return_type,
            parameters: row.parameters.0,
            test_cases: row.test_cases.0,
        })
    }
}

/// Repository for problem database operations
pub struct ProblemRepository;

impl ProblemRepository {
    /// Insert a problem, replacing any existing one with the same id
    pub async fn upsert(pool: &PgPool, problem: &ProblemDefinition) -> JudgeResult<()> {
        sqlx::query(
            r#"
            INSERT INTO problems (
                id, title, description, difficulty, tags,
                function_name, return_type, parameters, test_cases
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                difficulty = EXCLUDED.difficulty,
                tags = EXCLUDED.tags,
                function_name = EXCLUDED.function_name,
                return_type = EXCLUDED.return_type,
                parameters = EXCLUDED.parameters,
                test_cases = EXCLUDED.test_cases,
                updated_at = NOW()
            "#,
        )
        .bind(&problem.id)
        .bind(&problem.title)
        .bind(&problem.description)
        .bind(problem.difficulty.as_str())
        .bind(&problem.tags)
        .bind(&problem.function_name)
        .bind(&problem.return_type)
        .bind(Json(&problem.parameters))
        .bind(Json(&problem.test_cases))
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Find problem by ID
    pub async fn find_by_id(pool: &PgPool, id: &str) -> JudgeResult<Option<ProblemDefinition>> {
        let row = sqlx::query_as::<_, ProblemRow>(
            r#"
            SELECT id, title, description, difficulty, tags,
                   function_name, return_type, parameters, test_cases
            FROM problems WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        row.map(ProblemDefinition::try_from).transpose()
    }

    /// List problem ids, sorted
    pub async fn list_ids(pool: &PgPool) -> JudgeResult<Vec<String>> {
        let ids = sqlx::query_scalar(r#"SELECT id FROM problems ORDER BY id"#)
            .fetch_all(pool)
            .await?;

        Ok(ids)
    }
}
