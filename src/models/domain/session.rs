use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::domain::round::RoundSpec;

/// The game catalog offered to players. Formula and timeline sessions are
/// single-variant by contract; the word grid uses the pool payload instead of
/// discrete rounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum GameType {
    PersonalizedPractice,
    FormulaScramble,
    TimelineTeaser,
    WordGrid,
}

impl GameType {
    /// Pool games draw answers from a letter multiset instead of a round list.
    pub fn is_pool(&self) -> bool {
        matches!(self, GameType::WordGrid)
    }

    /// Clock-bound games end when the session clock reaches zero.
    pub fn is_clock_bound(&self) -> bool {
        !self.is_pool()
    }

    /// Round kind the entire session is constrained to, if any.
    pub fn exclusive_round_kind(&self) -> Option<&'static str> {
        match self {
            GameType::FormulaScramble => Some("formula-scramble"),
            GameType::TimelineTeaser => Some("timeline-teaser"),
            GameType::PersonalizedPractice | GameType::WordGrid => None,
        }
    }

    /// Human-readable name, as used in prompts and stored records.
    pub fn display_name(&self) -> &'static str {
        match self {
            GameType::PersonalizedPractice => "Personalized Practice",
            GameType::FormulaScramble => "Formula Scramble",
            GameType::TimelineTeaser => "Timeline Teaser",
            GameType::WordGrid => "Word Grid",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Output contract for sequential games: an ordered list of rounds, played
/// front to back. Immutable once generated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SessionPayload {
    pub title: String,
    pub game_type: GameType,
    pub rounds: Vec<RoundSpec>,
}

impl SessionPayload {
    /// Structural validation of the whole payload. Any violation is a backend
    /// contract violation and fails the generation attempt.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.rounds.is_empty() {
            return Err("payload contains no rounds".to_string());
        }
        if let Some(kind) = self.game_type.exclusive_round_kind() {
            if let Some(stray) = self.rounds.iter().find(|r| r.kind() != kind) {
                return Err(format!(
                    "game type {} only allows {} rounds, got {}",
                    self.game_type.display_name(),
                    kind,
                    stray.kind()
                ));
            }
        }
        for (idx, round) in self.rounds.iter().enumerate() {
            round
                .validate()
                .map_err(|e| format!("round {} ({}): {}", idx, round.kind(), e))?;
        }
        Ok(())
    }
}

/// Output contract for pool games: a letter multiset plus the word sets
/// spellable from it. Repaired by the orchestrator before play.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WordPoolPayload {
    pub letters: Vec<String>,
    pub main_words: Vec<String>,
    pub bonus_words: Vec<String>,
}

impl WordPoolPayload {
    pub fn validate(&self) -> Result<(), String> {
        if self.letters.is_empty() {
            return Err("letter pool is empty".to_string());
        }
        if self.main_words.is_empty() {
            return Err("main word set is empty".to_string());
        }
        Ok(())
    }
}

/// Finalized generation result handed to the session engine.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GeneratedSession {
    Sequential(SessionPayload),
    Pool(WordPoolPayload),
}
