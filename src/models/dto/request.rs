use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use validator::Validate;

use crate::models::domain::{Difficulty, GameType, Submission};

static OWNER_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("OWNER_ID_REGEX is a valid regex pattern")
});

/// Owner ids come from the (external) auth layer; reject anything that does
/// not look like one before it reaches a query.
pub fn valid_owner_id(owner_id: &str) -> bool {
    OWNER_ID_REGEX.is_match(owner_id)
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UploadDocumentRequest {
    #[validate(length(min = 1, max = 64))]
    pub owner_id: String,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1))]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnerQuery {
    pub owner_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartSessionRequest {
    #[validate(length(min = 1))]
    pub document_id: String,

    pub game_type: GameType,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAnswerRequest {
    pub answer: Submission,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct HintRequest {
    #[validate(length(min = 1, max = 100))]
    pub target_term: String,
}
