// src/handlers/reports.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::{FromRow, SqlitePool};

use crate::{
    error::AppError,
    models::{chapter::Chapter, quiz::Quiz, subject::Subject, user::User},
    utils::jwt::Claims,
};

/// Per-subject aggregate for the admin summary: best score and attempt
/// count across all of the subject's quizzes.
#[derive(Debug, serde::Serialize, FromRow)]
pub struct SubjectSummary {
    pub id: i64,
    pub name: String,
    pub top_score: i64,
    pub attempts: i64,
}

/// Per-subject quiz count for the user summary.
#[derive(Debug, serde::Serialize, FromRow)]
pub struct SubjectQuizCount {
    pub id: i64,
    pub name: String,
    pub quiz_count: i64,
}

/// The "YYYY-MM" keys of the `n` months ending at (year, month),
/// oldest first.
fn month_window(year: i32, month: u32, n: usize) -> Vec<String> {
    let mut months = Vec::with_capacity(n);
    let (mut y, mut m) = (year, month);
    for _ in 0..n {
        months.push(format!("{:04}-{:02}", y, m));
        if m == 1 {
            m = 12;
            y -= 1;
        } else {
            m -= 1;
        }
    }
    months.reverse();
    months
}

/// Admin analytics: for every subject, the top score and the number of
/// attempts across its quizzes. One grouped join instead of a query per
/// subject; COUNT(sc.id) skips the NULLs a subject without scores produces.
pub async fn admin_summary(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let summary = sqlx::query_as::<_, SubjectSummary>(
        r#"
        SELECT
            s.id,
            s.name,
            COALESCE(MAX(sc.total_scored), 0) AS top_score,
            COUNT(sc.id) AS attempts
        FROM subjects s
        LEFT JOIN chapters c ON c.subject_id = s.id
        LEFT JOIN quizzes q ON q.chapter_id = c.id
        LEFT JOIN scores sc ON sc.quiz_id = q.id
        GROUP BY s.id
        ORDER BY s.name
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to build admin summary: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(summary))
}

/// User analytics: quiz counts per subject, plus the caller's attempt
/// counts bucketed by calendar month over the last six months. Months with
/// no attempts report zero.
pub async fn user_summary(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let quiz_counts = sqlx::query_as::<_, SubjectQuizCount>(
        r#"
        SELECT
            s.id,
            s.name,
            COUNT(q.id) AS quiz_count
        FROM subjects s
        LEFT JOIN chapters c ON c.subject_id = s.id
        LEFT JOIN quizzes q ON q.chapter_id = c.id
        GROUP BY s.id
        ORDER BY s.name
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let buckets: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT strftime('%Y-%m', created_at) AS month, COUNT(*) AS attempts
        FROM scores
        WHERE user_id = ?
        GROUP BY month
        "#,
    )
    .bind(claims.user_id())
    .fetch_all(&pool)
    .await?;

    let by_month: HashMap<String, i64> = buckets.into_iter().collect();

    let now = Utc::now();
    let monthly_attempts: Vec<serde_json::Value> = month_window(now.year(), now.month(), 6)
        .into_iter()
        .map(|month| {
            let attempts = by_month.get(&month).copied().unwrap_or(0);
            json!({"month": month, "attempts": attempts})
        })
        .collect();

    Ok(Json(json!({
        "subjects": quiz_counts,
        "monthly_attempts": monthly_attempts
    })))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Admin search: case-insensitive substring match across users, subjects,
/// chapters and quizzes. Each entity is queried independently and returned
/// unranked, the way the dashboard consumes it.
pub async fn admin_search(
    State(pool): State<SqlitePool>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = params.q.unwrap_or_default();
    // SQLite LIKE is case-insensitive for ASCII.
    let pattern = format!("%{}%", query);

    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, full_name, qualification, dob, role, created_at
        FROM users
        WHERE username LIKE ? OR full_name LIKE ?
        ORDER BY username
        "#,
    )
    .bind(&pattern)
    .bind(&pattern)
    .fetch_all(&pool)
    .await?;

    let subjects = sqlx::query_as::<_, Subject>(
        r#"
        SELECT id, name, description
        FROM subjects
        WHERE name LIKE ? OR description LIKE ?
        ORDER BY name
        "#,
    )
    .bind(&pattern)
    .bind(&pattern)
    .fetch_all(&pool)
    .await?;

    let chapters = sqlx::query_as::<_, Chapter>(
        r#"
        SELECT id, subject_id, name
        FROM chapters
        WHERE name LIKE ?
        ORDER BY name
        "#,
    )
    .bind(&pattern)
    .fetch_all(&pool)
    .await?;

    // Quizzes match on their own date or through their chapter's name.
    let quizzes = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT DISTINCT q.id, q.chapter_id, q.date_of_quiz, q.time_duration
        FROM quizzes q
        JOIN chapters c ON q.chapter_id = c.id
        WHERE q.date_of_quiz LIKE ? OR c.name LIKE ?
        ORDER BY q.date_of_quiz
        "#,
    )
    .bind(&pattern)
    .bind(&pattern)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({
        "query": query,
        "users": users,
        "subjects": subjects,
        "chapters": chapters,
        "quizzes": quizzes
    })))
}
