use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Level, SparringSession, StudentRecord};
use crate::schedule::ScheduleRequest;

/// Re-seeding or re-importing a student refreshes every column.
const UPSERT_STUDENT: &str = r#"
    INSERT INTO sparring.students
    (id, first_name, last_name, height_cm, weight_kg, age, level, strengths, weaknesses)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ON CONFLICT (id) DO UPDATE
    SET first_name = EXCLUDED.first_name,
        last_name = EXCLUDED.last_name,
        height_cm = EXCLUDED.height_cm,
        weight_kg = EXCLUDED.weight_kg,
        age = EXCLUDED.age,
        level = EXCLUDED.level,
        strengths = EXCLUDED.strengths,
        weaknesses = EXCLUDED.weaknesses
"#;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let students = vec![
        (
            "3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2",
            "Ana",
            "García",
            165.0,
            58.5,
            24,
            Level::Advanced,
            vec!["Jab rápido", "Footwork"],
            vec!["Clinch defense"],
        ),
        (
            "0c22f1f1-9184-4fd4-9b21-28c68a6a89dc",
            "Juan",
            "Pérez",
            172.0,
            70.0,
            27,
            Level::Intermediate,
            vec!["Clinch work", "Body shots"],
            vec!["Footwork under pressure"],
        ),
        (
            "d5a0a1a2-2a3c-44c2-8f73-60b7897a9dd2",
            "Lucía",
            "Romero",
            160.0,
            55.0,
            19,
            Level::Beginner,
            vec!["Cardio"],
            vec!["Jab timing", "Head movement"],
        ),
        (
            "8a6e0f3b-5c1d-4b7a-9e2f-1d4c6b8a0e3f",
            "Marco",
            "Silva",
            181.0,
            82.3,
            31,
            Level::Competitor,
            vec!["Head movement", "Counters"],
            vec!["Cardio"],
        ),
    ];

    for (id, first_name, last_name, height, weight, age, level, strengths, weaknesses) in students {
        sqlx::query(UPSERT_STUDENT)
            .bind(id)
            .bind(first_name)
            .bind(last_name)
            .bind(height)
            .bind(weight)
            .bind(age)
            .bind(level.as_str())
            .bind(to_owned_tags(&strengths))
            .bind(to_owned_tags(&weaknesses))
            .execute(pool)
            .await?;
    }

    let sessions = vec![
        (
            "seed-001",
            "3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2",
            "0c22f1f1-9184-4fd4-9b21-28c68a6a89dc",
            NaiveDate::from_ymd_opt(2026, 2, 3).context("invalid date")?,
        ),
        (
            "seed-002",
            "0c22f1f1-9184-4fd4-9b21-28c68a6a89dc",
            "3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2",
            NaiveDate::from_ymd_opt(2026, 2, 17).context("invalid date")?,
        ),
        (
            "seed-003",
            "8a6e0f3b-5c1d-4b7a-9e2f-1d4c6b8a0e3f",
            "d5a0a1a2-2a3c-44c2-8f73-60b7897a9dd2",
            NaiveDate::from_ymd_opt(2026, 3, 2).context("invalid date")?,
        ),
    ];

    for (source_key, student1_id, student2_id, session_date) in sessions {
        insert_session_row(pool, student1_id, student2_id, session_date, source_key).await?;
    }

    Ok(())
}

fn to_owned_tags(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|tag| tag.to_string()).collect()
}

pub async fn fetch_roster(pool: &PgPool) -> anyhow::Result<Vec<StudentRecord>> {
    let rows = sqlx::query(
        "SELECT id, first_name, last_name, height_cm, weight_kg, age, level, strengths, weaknesses \
         FROM sparring.students \
         WHERE active \
         ORDER BY last_name, first_name, id",
    )
    .fetch_all(pool)
    .await?;

    let mut roster = Vec::with_capacity(rows.len());
    for row in rows {
        let id: String = row.get("id");
        let level: String = row.get("level");
        let age: i32 = row.get("age");
        roster.push(StudentRecord {
            level: level
                .parse()
                .with_context(|| format!("student {id} has an invalid level"))?,
            age: u32::try_from(age).with_context(|| format!("student {id} has a negative age"))?,
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            height_cm: row.get("height_cm"),
            weight_kg: row.get("weight_kg"),
            strengths: row.get("strengths"),
            weaknesses: row.get("weaknesses"),
            id,
        });
    }

    tracing::debug!(students = roster.len(), "fetched roster");
    Ok(roster)
}

pub async fn fetch_sessions(pool: &PgPool) -> anyhow::Result<Vec<SparringSession>> {
    let rows = sqlx::query(
        "SELECT id, student1_id, student2_id, session_date \
         FROM sparring.sessions \
         ORDER BY session_date, id",
    )
    .fetch_all(pool)
    .await?;

    let sessions: Vec<SparringSession> = rows
        .into_iter()
        .map(|row| SparringSession {
            id: row.get("id"),
            student1_id: row.get("student1_id"),
            student2_id: row.get("student2_id"),
            date: row.get("session_date"),
        })
        .collect();

    tracing::debug!(sessions = sessions.len(), "fetched session history");
    Ok(sessions)
}

#[derive(Debug, serde::Deserialize)]
struct StudentCsvRow {
    id: Option<String>,
    first_name: String,
    last_name: String,
    height_cm: f64,
    weight_kg: f64,
    age: u32,
    level: String,
    #[serde(default)]
    strengths: String,
    #[serde(default)]
    weaknesses: String,
}

impl StudentCsvRow {
    fn into_record(self) -> anyhow::Result<StudentRecord> {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let level: Level = self
            .level
            .parse()
            .with_context(|| {
                format!(
                    "student {} {} has an invalid level",
                    self.first_name, self.last_name
                )
            })?;
        Ok(StudentRecord {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            age: self.age,
            level,
            strengths: split_tags(&self.strengths),
            weaknesses: split_tags(&self.weaknesses),
        })
    }
}

/// Tags are stored in one CSV column separated by `;`.
pub fn split_tags(column: &str) -> Vec<String> {
    column
        .split(';')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn import_students_csv(
    pool: &PgPool,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut imported = 0usize;

    for (line, result) in reader.deserialize::<StudentCsvRow>().enumerate() {
        let student = result?
            .into_record()
            .with_context(|| format!("row {} of {}", line + 1, csv_path.display()))?;

        let result = sqlx::query(UPSERT_STUDENT)
            .bind(&student.id)
            .bind(&student.first_name)
            .bind(&student.last_name)
            .bind(student.height_cm)
            .bind(student.weight_kg)
            .bind(student.age as i32)
            .bind(student.level.as_str())
            .bind(&student.strengths)
            .bind(&student.weaknesses)
            .execute(pool)
            .await?;

        if result.rows_affected() > 0 {
            imported += 1;
        }
    }

    Ok(imported)
}

pub async fn import_sessions_csv(
    pool: &PgPool,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        student1_id: String,
        student2_id: String,
        session_date: NaiveDate,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        inserted += insert_session_row(
            pool,
            &row.student1_id,
            &row.student2_id,
            row.session_date,
            &source_key,
        )
        .await? as usize;
    }

    Ok(inserted)
}

/// Persists a session the operator scheduled.
pub async fn insert_session(
    pool: &PgPool,
    request: &ScheduleRequest,
    session_date: NaiveDate,
) -> anyhow::Result<()> {
    let source_key = format!("scheduled-{}", Uuid::new_v4());
    insert_session_row(
        pool,
        &request.student1_id,
        &request.student2_id,
        session_date,
        &source_key,
    )
    .await?;
    tracing::info!(
        student1_id = %request.student1_id,
        student2_id = %request.student2_id,
        %session_date,
        "recorded sparring session"
    );
    Ok(())
}

async fn insert_session_row(
    pool: &PgPool,
    student1_id: &str,
    student2_id: &str,
    session_date: NaiveDate,
    source_key: &str,
) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO sparring.sessions
        (id, student1_id, student2_id, session_date, source_key)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(student1_id)
    .bind(student2_id)
    .bind(session_date)
    .bind(source_key)
    .execute(pool)
    .await
    .with_context(|| format!("failed to record session {student1_id} vs {student2_id}"))?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_upsert_refreshes_every_column() {
        for column in [
            "first_name",
            "last_name",
            "height_cm",
            "weight_kg",
            "age",
            "level",
            "strengths",
            "weaknesses",
        ] {
            let assignment = format!("{column} = EXCLUDED.{column}");
            assert!(UPSERT_STUDENT.contains(&assignment), "missing {assignment}");
        }
    }

    #[test]
    fn tags_split_on_semicolons() {
        assert_eq!(
            split_tags("Jab rápido; Footwork ;;"),
            vec!["Jab rápido".to_string(), "Footwork".to_string()]
        );
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn csv_rows_become_records() {
        let data = "id,first_name,last_name,height_cm,weight_kg,age,level,strengths,weaknesses\n\
                    ,Ana,García,165,58.5,24,Advanced,Footwork;Jab,Clinch defense\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let row: StudentCsvRow = reader.deserialize().next().unwrap().unwrap();
        let student = row.into_record().unwrap();

        assert!(!student.id.is_empty());
        assert_eq!(student.level, Level::Advanced);
        assert_eq!(student.strengths, vec!["Footwork".to_string(), "Jab".to_string()]);
        assert_eq!(student.weaknesses, vec!["Clinch defense".to_string()]);
    }

    #[test]
    fn csv_rows_with_unknown_level_fail() {
        let data = "id,first_name,last_name,height_cm,weight_kg,age,level,strengths,weaknesses\n\
                    x,Juan,Pérez,172,70,27,master,,\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let row: StudentCsvRow = reader.deserialize().next().unwrap().unwrap();
        let err = row.into_record().unwrap_err();
        assert!(err.to_string().contains("invalid level"));
    }
}
