// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        chapter::CreateChapterRequest,
        question::{CreateQuestionRequest, Question},
        quiz::CreateQuizRequest,
        subject::{CreateSubjectRequest, Subject},
        user::User,
    },
    utils::html::clean_html,
};

async fn subject_exists(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM subjects WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Subject not found".to_string()))?;
    Ok(())
}

async fn chapter_exists(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM chapters WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Chapter not found".to_string()))?;
    Ok(())
}

async fn quiz_exists(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM quizzes WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;
    Ok(())
}

/// The admin landing view: all subjects and all registered users.
pub async fn dashboard(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let subjects =
        sqlx::query_as::<_, Subject>("SELECT id, name, description FROM subjects ORDER BY name")
            .fetch_all(&pool)
            .await?;

    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, full_name, qualification, dob, role, created_at
        FROM users
        ORDER BY id DESC
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(json!({
        "subjects": subjects,
        "users": users
    })))
}

/// Creates a new subject. Names are trimmed and must be unique; the
/// description passes through the HTML sanitizer before storage.
pub async fn create_subject(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateSubjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Subject name is required".to_string()));
    }

    let description = payload
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(clean_html);

    let subject = sqlx::query_as::<_, Subject>(
        r#"
        INSERT INTO subjects (name, description)
        VALUES (?, ?)
        RETURNING id, name, description
        "#,
    )
    .bind(name)
    .bind(&description)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.as_database_error()
            .is_some_and(|db| db.is_unique_violation())
        {
            AppError::Conflict(format!("A subject named '{}' already exists", name))
        } else {
            tracing::error!("Failed to create subject: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    Ok((StatusCode::CREATED, Json(subject)))
}

/// Deletes a subject by ID. Chapters, quizzes, questions and scores under
/// it go with it (FK cascade).
pub async fn delete_subject(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM subjects WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete subject: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Subject not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Creates a chapter under a subject. Names are unique within the subject.
pub async fn create_chapter(
    State(pool): State<SqlitePool>,
    Path(subject_id): Path<i64>,
    Json(payload): Json<CreateChapterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Chapter name is required".to_string()));
    }

    subject_exists(&pool, subject_id).await?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO chapters (subject_id, name)
        VALUES (?, ?)
        RETURNING id
        "#,
    )
    .bind(subject_id)
    .bind(name)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if e.as_database_error()
            .is_some_and(|db| db.is_unique_violation())
        {
            AppError::Conflict(format!(
                "A chapter named '{}' already exists in this subject",
                name
            ))
        } else {
            tracing::error!("Failed to create chapter: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?;

    Ok((StatusCode::CREATED, Json(json!({"id": id}))))
}

/// Deletes a chapter by ID, cascading to its quizzes.
pub async fn delete_chapter(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM chapters WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete chapter: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Chapter not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Creates a quiz under a chapter. Duration is bounded to 1-180 minutes.
pub async fn create_quiz(
    State(pool): State<SqlitePool>,
    Path(chapter_id): Path<i64>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let date_of_quiz = payload.date_of_quiz.trim();
    if date_of_quiz.is_empty() {
        return Err(AppError::BadRequest("Quiz date is required".to_string()));
    }

    chapter_exists(&pool, chapter_id).await?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO quizzes (chapter_id, date_of_quiz, time_duration)
        VALUES (?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(chapter_id)
    .bind(date_of_quiz)
    .bind(payload.time_duration)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create quiz: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(json!({"id": id}))))
}

/// Deletes a quiz by ID, cascading to its questions and scores.
pub async fn delete_quiz(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM quizzes WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete quiz: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// The question-management view for a quiz: full questions including the
/// correct options. Admin only, unlike the attempt view.
pub async fn list_questions(
    State(pool): State<SqlitePool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    quiz_exists(&pool, quiz_id).await?;

    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, quiz_id, statement, option1, option2, option3, option4, correct_option
        FROM questions
        WHERE quiz_id = ?
        ORDER BY id
        "#,
    )
    .bind(quiz_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(questions))
}

/// Creates a question under a quiz. All four options and the statement are
/// required; the correct option index (1-4) is stored as its string
/// encoding, which grading compares against verbatim.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let statement = payload.statement.trim();
    let options = [
        payload.option1.trim(),
        payload.option2.trim(),
        payload.option3.trim(),
        payload.option4.trim(),
    ];

    if statement.is_empty() || options.iter().any(|o| o.is_empty()) {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    }

    quiz_exists(&pool, quiz_id).await?;

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO questions (quiz_id, statement, option1, option2, option3, option4, correct_option)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(quiz_id)
    .bind(statement)
    .bind(options[0])
    .bind(options[1])
    .bind(options[2])
    .bind(options[3])
    .bind(payload.correct_option.to_string())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(json!({"id": id}))))
}

/// Returns a single question's fields as JSON, for dashboard inspection
/// without navigating away.
pub async fn view_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let question = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, quiz_id, statement, option1, option2, option3, option4, correct_option
        FROM questions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(question))
}

/// Deletes a question by ID.
pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
