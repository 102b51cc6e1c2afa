// src/models/chapter.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'chapters' table. Each chapter belongs to one subject;
/// names are unique within their subject.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Chapter {
    pub id: i64,
    pub subject_id: i64,
    pub name: String,
}

/// DTO for creating a chapter under a subject.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateChapterRequest {
    #[validate(length(min = 1, max = 200, message = "Chapter name is required."))]
    pub name: String,
}
