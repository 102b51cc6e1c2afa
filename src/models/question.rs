// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'questions' table. Four fixed options; `correct_option`
/// holds the winning option's index encoded as a string ("1"-"4"), and
/// grading compares submitted answers against it by exact string equality.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,
    pub statement: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,
    pub correct_option: String,
}

/// DTO for sending a question to an attempting user (excludes the answer).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub statement: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        PublicQuestion {
            id: q.id,
            statement: q.statement,
            option1: q.option1,
            option2: q.option2,
            option3: q.option3,
            option4: q.option4,
        }
    }
}

/// DTO for creating a question under a quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000, message = "Question statement is required."))]
    pub statement: String,
    #[validate(length(min = 1, max = 200))]
    pub option1: String,
    #[validate(length(min = 1, max = 200))]
    pub option2: String,
    #[validate(length(min = 1, max = 200))]
    pub option3: String,
    #[validate(length(min = 1, max = 200))]
    pub option4: String,
    #[validate(range(min = 1, max = 4, message = "Correct option must be between 1 and 4."))]
    pub correct_option: i64,
}
