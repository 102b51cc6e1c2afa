// src/models/score.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'scores' table. At most one row per (user, quiz),
/// enforced by a unique constraint.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Score {
    pub id: i64,
    pub quiz_id: i64,
    pub user_id: i64,
    pub total_scored: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// One row of a user's score history, joined with quiz, chapter and
/// subject context.
#[derive(Debug, Serialize, FromRow)]
pub struct ScoreEntry {
    pub quiz_id: i64,
    pub date_of_quiz: String,
    pub chapter_name: String,
    pub subject_name: String,
    pub total_scored: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitAttemptRequest {
    /// User's answers map.
    /// Key: Question ID (i64)
    /// Value: User's selected option index as a string ("1"-"4").
    pub answers: std::collections::HashMap<i64, String>,
}
