use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::session::{Difficulty, GameType};

/// Why a session reached the Terminal state. Exactly one reason is recorded,
/// whichever condition triggered first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    LivesExhausted,
    TimeExpired,
    RoundsExhausted,
    PoolCompleted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayRecordStatus {
    Started,
    Completed,
}

/// Durable record of one play session. Written at most twice: once on start,
/// once on completion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayRecord {
    pub id: String,
    pub document_id: String,
    pub owner_id: String,
    pub game_type: GameType,
    pub difficulty: Difficulty,
    pub status: PlayRecordStatus,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_reason: Option<TerminationReason>,
    pub rounds_completed: u32,
    pub main_words_found: u32,
    pub bonus_words_found: u32,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl PlayRecord {
    pub fn new_started(
        document_id: &str,
        owner_id: &str,
        game_type: GameType,
        difficulty: Difficulty,
    ) -> Self {
        PlayRecord {
            id: Uuid::new_v4().to_string(),
            document_id: document_id.to_string(),
            owner_id: owner_id.to_string(),
            game_type,
            difficulty,
            status: PlayRecordStatus::Started,
            score: 0,
            termination_reason: None,
            rounds_completed: 0,
            main_words_found: 0,
            bonus_words_found: 0,
            started_at: Utc::now(),
            completed_at: None,
        }
    }
}

/// Final outcome of a session, emitted exactly once by the session engine on
/// reaching Terminal.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompletionReport {
    pub final_score: u32,
    pub reason: TerminationReason,
    pub rounds_completed: u32,
    pub main_words_found: u32,
    pub bonus_words_found: u32,
}
