// src/handlers/catalog.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{chapter::Chapter, quiz::{Quiz, QuizOverview}, subject::Subject},
};

/// Lists all subjects.
pub async fn list_subjects(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let subjects =
        sqlx::query_as::<_, Subject>("SELECT id, name, description FROM subjects ORDER BY name")
            .fetch_all(&pool)
            .await?;

    Ok(Json(subjects))
}

/// Lists the chapters of one subject.
pub async fn list_chapters(
    State(pool): State<SqlitePool>,
    Path(subject_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let subject =
        sqlx::query_as::<_, Subject>("SELECT id, name, description FROM subjects WHERE id = ?")
            .bind(subject_id)
            .fetch_optional(&pool)
            .await?
            .ok_or(AppError::NotFound("Subject not found".to_string()))?;

    let chapters = sqlx::query_as::<_, Chapter>(
        "SELECT id, subject_id, name FROM chapters WHERE subject_id = ? ORDER BY name",
    )
    .bind(subject_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({
        "subject": subject,
        "chapters": chapters
    })))
}

/// Lists the quizzes of one chapter.
pub async fn list_quizzes(
    State(pool): State<SqlitePool>,
    Path(chapter_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let chapter =
        sqlx::query_as::<_, Chapter>("SELECT id, subject_id, name FROM chapters WHERE id = ?")
            .bind(chapter_id)
            .fetch_optional(&pool)
            .await?
            .ok_or(AppError::NotFound("Chapter not found".to_string()))?;

    let quizzes = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, chapter_id, date_of_quiz, time_duration
        FROM quizzes
        WHERE chapter_id = ?
        ORDER BY date_of_quiz
        "#,
    )
    .bind(chapter_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({
        "chapter": chapter,
        "quizzes": quizzes
    })))
}

/// The user dashboard: every quiz with its chapter and subject names and a
/// question count, ordered by quiz date.
pub async fn quiz_overview(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let quizzes = sqlx::query_as::<_, QuizOverview>(
        r#"
        SELECT
            q.id,
            q.date_of_quiz,
            q.time_duration,
            c.name AS chapter_name,
            s.name AS subject_name,
            COUNT(qn.id) AS question_count
        FROM quizzes q
        JOIN chapters c ON q.chapter_id = c.id
        JOIN subjects s ON c.subject_id = s.id
        LEFT JOIN questions qn ON qn.quiz_id = q.id
        GROUP BY q.id
        ORDER BY q.date_of_quiz
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to build quiz overview: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(quizzes))
}
