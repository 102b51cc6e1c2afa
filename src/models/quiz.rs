// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'quizzes' table. Each quiz belongs to one chapter.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub chapter_id: i64,

    /// Scheduled date, stored as entered (e.g. "2024-01-01").
    pub date_of_quiz: String,

    /// Duration in minutes, 1-180.
    pub time_duration: i64,
}

/// DTO for creating a quiz under a chapter.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 20, message = "Quiz date is required."))]
    pub date_of_quiz: String,
    #[validate(range(min = 1, max = 180, message = "Duration must be between 1 and 180 minutes."))]
    pub time_duration: i64,
}

/// One row of the user dashboard: a quiz joined with its chapter and
/// subject names plus a question count.
#[derive(Debug, Serialize, FromRow)]
pub struct QuizOverview {
    pub id: i64,
    pub date_of_quiz: String,
    pub time_duration: i64,
    pub chapter_name: String,
    pub subject_name: String,
    pub question_count: i64,
}
