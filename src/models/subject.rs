// src/models/subject.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'subjects' table. Top level of the content hierarchy.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,

    /// Unique subject name.
    pub name: String,

    /// Optional rich-text description, sanitized on insert.
    pub description: Option<String>,
}

/// DTO for creating a subject.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubjectRequest {
    #[validate(length(min = 1, max = 200, message = "Subject name is required."))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}
