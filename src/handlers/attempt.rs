// src/handlers/attempt.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        question::{PublicQuestion, Question},
        quiz::Quiz,
        score::{Score, ScoreEntry, SubmitAttemptRequest},
    },
    utils::jwt::Claims,
};

/// Grades an attempt: one point per question whose submitted answer equals
/// `correct_option` exactly. Unanswered questions score nothing.
fn grade(questions: &[Question], answers: &HashMap<i64, String>) -> i64 {
    questions
        .iter()
        .filter(|q| answers.get(&q.id).is_some_and(|a| *a == q.correct_option))
        .count() as i64
}

async fn fetch_quiz(pool: &SqlitePool, quiz_id: i64) -> Result<Quiz, AppError> {
    sqlx::query_as::<_, Quiz>(
        "SELECT id, chapter_id, date_of_quiz, time_duration FROM quizzes WHERE id = ?",
    )
    .bind(quiz_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))
}

async fn fetch_questions(pool: &SqlitePool, quiz_id: i64) -> Result<Vec<Question>, AppError> {
    Ok(sqlx::query_as::<_, Question>(
        r#"
        SELECT id, quiz_id, statement, option1, option2, option3, option4, correct_option
        FROM questions
        WHERE quiz_id = ?
        ORDER BY id
        "#,
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?)
}

/// Starts a quiz attempt.
///
/// If the user already has a score for this quiz the attempt is blocked and
/// a "completed" payload is returned instead of the questions. Otherwise
/// returns the quiz and its questions with the correct options stripped.
pub async fn start_attempt(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = fetch_quiz(&pool, quiz_id).await?;

    let existing = sqlx::query_as::<_, Score>(
        "SELECT id, quiz_id, user_id, total_scored, created_at FROM scores WHERE quiz_id = ? AND user_id = ?",
    )
    .bind(quiz_id)
    .bind(claims.user_id())
    .fetch_optional(&pool)
    .await?;

    if let Some(score) = existing {
        return Ok(Json(json!({
            "status": "completed",
            "quiz": quiz,
            "score": score
        })));
    }

    let questions: Vec<PublicQuestion> = fetch_questions(&pool, quiz_id)
        .await?
        .into_iter()
        .map(PublicQuestion::from)
        .collect();

    Ok(Json(json!({
        "status": "ready",
        "quiz": quiz,
        "questions": questions
    })))
}

/// Submits a quiz attempt and records the score.
///
/// The insert relies on the UNIQUE (user_id, quiz_id) constraint: a second
/// submission, including a concurrent one, conflicts and gets 409 without
/// creating a second row.
pub async fn submit_attempt(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
    Json(req): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    fetch_quiz(&pool, quiz_id).await?;
    let questions = fetch_questions(&pool, quiz_id).await?;

    let total_scored = grade(&questions, &req.answers);

    let result = sqlx::query(
        r#"
        INSERT INTO scores (quiz_id, user_id, total_scored)
        VALUES (?, ?, ?)
        ON CONFLICT (user_id, quiz_id) DO NOTHING
        "#,
    )
    .bind(quiz_id)
    .bind(claims.user_id())
    .bind(total_scored)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to record score: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict("Quiz already attempted".to_string()));
    }

    Ok(Json(json!({
        "score": total_scored,
        "total_questions": questions.len()
    })))
}

/// Shows the result of the caller's attempt: their score plus the full
/// questions (including correct options) for review.
pub async fn view_result(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = fetch_quiz(&pool, quiz_id).await?;

    let score = sqlx::query_as::<_, Score>(
        "SELECT id, quiz_id, user_id, total_scored, created_at FROM scores WHERE quiz_id = ? AND user_id = ?",
    )
    .bind(quiz_id)
    .bind(claims.user_id())
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("No attempt recorded for this quiz".to_string()))?;

    let questions = fetch_questions(&pool, quiz_id).await?;

    Ok(Json(json!({
        "quiz": quiz,
        "score": score,
        "questions": questions
    })))
}

/// Lists the caller's score history, newest first.
pub async fn list_scores(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let scores = sqlx::query_as::<_, ScoreEntry>(
        r#"
        SELECT
            sc.quiz_id,
            q.date_of_quiz,
            c.name AS chapter_name,
            s.name AS subject_name,
            sc.total_scored,
            sc.created_at
        FROM scores sc
        JOIN quizzes q ON sc.quiz_id = q.id
        JOIN chapters c ON q.chapter_id = c.id
        JOIN subjects s ON c.subject_id = s.id
        WHERE sc.user_id = ?
        ORDER BY sc.created_at DESC
        "#,
    )
    .bind(claims.user_id())
    .fetch_all(&pool)
    .await?;

    Ok(Json(scores))
}
