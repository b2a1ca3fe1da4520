use std::time::Duration;

use rand::seq::SliceRandom;
use serde::Serialize;

use crate::errors::{AppError, AppResult};
use crate::models::domain::{CompletionReport, GeneratedSession, Submission, TerminationReason};

pub const STARTING_LIVES: u32 = 3;
pub const SESSION_SECONDS: u32 = 300;

pub const BASE_POINTS: u32 = 10;
pub const STREAK_BONUS_FACTOR: u32 = 2;
pub const MAIN_WORD_POINTS_PER_LETTER: u32 = 10;
pub const BONUS_WORD_POINTS: u32 = 5;
pub const POOL_REVEAL_PENALTY: u32 = 25;

/// How long feedback stays visible before the driver should advance. The
/// incorrect delay is longer so the player can read the correct answer.
pub const FEEDBACK_DELAY_CORRECT: Duration = Duration::from_millis(1200);
pub const FEEDBACK_DELAY_INCORRECT: Duration = Duration::from_millis(2000);

/// Result of judging one submission.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Judgment {
    Correct { points_awarded: u32 },
    Incorrect { canonical_answer: String },
    MainWordFound { word: String, points_awarded: u32 },
    BonusWordFound { word: String, points_awarded: u32 },
    DuplicateWord { word: String },
    InvalidWord { word: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// The submission was judged. When `advance_after` is set the driver owes
    /// the engine an `advance_round` call after that delay.
    Judged {
        judgment: Judgment,
        #[serde(skip_serializing_if = "Option::is_none")]
        advance_after: Option<Duration>,
    },
    /// The current round was already judged (or the submission was empty);
    /// nothing changed. Guards against double-scoring while feedback shows.
    Ignored,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RevealOutcome {
    pub revealed_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advance_after: Option<Duration>,
}

/// Mutable state of one play session. Owned exclusively by a
/// [`SessionEngine`]; mutated only through the named operations.
#[derive(Clone, Debug, Serialize)]
pub struct SessionState {
    pub current_round_index: usize,
    pub score: u32,
    pub lives_remaining: u32,
    pub seconds_remaining: u32,
    pub current_streak: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_answer_buffer: Option<Submission>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_judgment: Option<Judgment>,
    pub found_main_words: Vec<String>,
    pub found_bonus_words: Vec<String>,
    /// A judged round whose advance has not fired yet.
    pub awaiting_advance: bool,
    /// Scramble staging for the current round, re-shuffled on every entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staged_parts: Option<Vec<String>>,
    pub rounds_completed: u32,
    pub terminal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_reason: Option<TerminationReason>,
}

/// Drives the live play loop for one session: round cursor, score, lives,
/// streak and clock, per-round answer judging, reveal and termination. Does
/// no I/O; the caller schedules delayed advances and periodic ticks.
pub struct SessionEngine {
    payload: GeneratedSession,
    state: SessionState,
    completion_reported: bool,
}

impl SessionEngine {
    pub fn new(payload: GeneratedSession) -> AppResult<Self> {
        match &payload {
            GeneratedSession::Sequential(p) if p.rounds.is_empty() => {
                return Err(AppError::SessionDataUnavailable(
                    "generated session contains no rounds".to_string(),
                ));
            }
            GeneratedSession::Pool(p) if p.main_words.is_empty() => {
                return Err(AppError::SessionDataUnavailable(
                    "generated word pool contains no main words".to_string(),
                ));
            }
            _ => {}
        }

        let mut engine = Self {
            payload,
            state: SessionState {
                current_round_index: 0,
                score: 0,
                lives_remaining: STARTING_LIVES,
                seconds_remaining: SESSION_SECONDS,
                current_streak: 0,
                submitted_answer_buffer: None,
                last_judgment: None,
                found_main_words: Vec::new(),
                found_bonus_words: Vec::new(),
                awaiting_advance: false,
                staged_parts: None,
                rounds_completed: 0,
                terminal: false,
                termination_reason: None,
            },
            completion_reported: false,
        };
        engine.stage_current_round();
        Ok(engine)
    }

    pub fn payload(&self) -> &GeneratedSession {
        &self.payload
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    fn is_clock_bound(&self) -> bool {
        matches!(self.payload, GeneratedSession::Sequential(_))
    }

    /// Judge a submission against the current round (sequential games) or the
    /// word pool. Rejected once the session is terminal.
    pub fn submit_answer(&mut self, submission: &Submission) -> AppResult<SubmitOutcome> {
        if self.state.terminal {
            return Err(AppError::ValidationError(
                "session is already finished".to_string(),
            ));
        }
        if let Submission::Text(text) = submission {
            if text.trim().is_empty() {
                return Ok(SubmitOutcome::Ignored);
            }
        }

        match &self.payload {
            GeneratedSession::Pool(_) => self.submit_pool_word(submission),
            GeneratedSession::Sequential(_) => self.submit_round_answer(submission),
        }
    }

    fn submit_round_answer(&mut self, submission: &Submission) -> AppResult<SubmitOutcome> {
        if self.state.awaiting_advance {
            return Ok(SubmitOutcome::Ignored);
        }

        let (correct, canonical) = {
            let round = self.current_round()?;
            (round.check_answer(submission), round.canonical_answer())
        };

        self.state.submitted_answer_buffer = Some(submission.clone());
        self.state.rounds_completed += 1;

        if correct {
            let points = BASE_POINTS + STREAK_BONUS_FACTOR * self.state.current_streak;
            self.state.score += points;
            self.state.current_streak += 1;
            self.state.awaiting_advance = true;
            self.state.last_judgment = Some(Judgment::Correct {
                points_awarded: points,
            });
            Ok(SubmitOutcome::Judged {
                judgment: Judgment::Correct {
                    points_awarded: points,
                },
                advance_after: Some(FEEDBACK_DELAY_CORRECT),
            })
        } else {
            let judgment = self.apply_miss(canonical);
            let advance_after = if self.state.terminal {
                None
            } else {
                Some(FEEDBACK_DELAY_INCORRECT)
            };
            Ok(SubmitOutcome::Judged {
                judgment,
                advance_after,
            })
        }
    }

    // Shared by incorrect submissions and reveals: streak reset, life loss,
    // possible termination.
    fn apply_miss(&mut self, canonical: String) -> Judgment {
        self.state.current_streak = 0;
        self.state.lives_remaining = self.state.lives_remaining.saturating_sub(1);
        let judgment = Judgment::Incorrect {
            canonical_answer: canonical,
        };
        self.state.last_judgment = Some(judgment.clone());

        if self.state.lives_remaining == 0 {
            self.terminate(TerminationReason::LivesExhausted);
        } else {
            self.state.awaiting_advance = true;
        }
        judgment
    }

    fn submit_pool_word(&mut self, submission: &Submission) -> AppResult<SubmitOutcome> {
        let word = match submission {
            Submission::Text(text) => text.trim().to_lowercase(),
            _ => {
                return Err(AppError::ValidationError(
                    "pool games accept a single word".to_string(),
                ))
            }
        };

        let pool = match &self.payload {
            GeneratedSession::Pool(pool) => pool,
            GeneratedSession::Sequential(_) => unreachable!("checked by submit_answer"),
        };

        // Defense against stale pool data: re-confirm formability before any
        // set membership decision.
        if !crate::services::word_check::is_formable(&word, &pool.letters) {
            let judgment = Judgment::InvalidWord { word };
            self.state.last_judgment = Some(judgment.clone());
            return Ok(SubmitOutcome::Judged {
                judgment,
                advance_after: None,
            });
        }

        let is_main = pool.main_words.iter().any(|w| w.eq_ignore_ascii_case(&word));
        let is_bonus = pool.bonus_words.iter().any(|w| w.eq_ignore_ascii_case(&word));
        let total_main = pool.main_words.len();

        let judgment = if is_main {
            if self.state.found_main_words.contains(&word) {
                Judgment::DuplicateWord { word }
            } else {
                let points = word.chars().count() as u32 * MAIN_WORD_POINTS_PER_LETTER;
                self.state.score += points;
                self.state.found_main_words.push(word.clone());
                Judgment::MainWordFound {
                    word,
                    points_awarded: points,
                }
            }
        } else if is_bonus {
            if self.state.found_bonus_words.contains(&word) {
                Judgment::DuplicateWord { word }
            } else {
                self.state.score += BONUS_WORD_POINTS;
                self.state.found_bonus_words.push(word.clone());
                Judgment::BonusWordFound {
                    word,
                    points_awarded: BONUS_WORD_POINTS,
                }
            }
        } else {
            Judgment::InvalidWord { word }
        };

        self.state.last_judgment = Some(judgment.clone());
        if self.state.found_main_words.len() == total_main {
            self.terminate(TerminationReason::PoolCompleted);
        }

        Ok(SubmitOutcome::Judged {
            judgment,
            advance_after: None,
        })
    }

    /// Forfeit the current round in exchange for the answer. Sequential games
    /// treat this as an incorrect submission (life and streak cost); pool
    /// games uncover one main word for a point penalty instead.
    pub fn reveal_answer(&mut self) -> AppResult<RevealOutcome> {
        if self.state.terminal {
            return Err(AppError::ValidationError(
                "session is already finished".to_string(),
            ));
        }

        match &self.payload {
            GeneratedSession::Sequential(_) => {
                if self.state.awaiting_advance {
                    return Err(AppError::ValidationError(
                        "current round is already answered".to_string(),
                    ));
                }
                let canonical = self.current_round()?.canonical_answer();
                self.state.rounds_completed += 1;
                self.apply_miss(canonical.clone());
                let advance_after = if self.state.terminal {
                    None
                } else {
                    Some(FEEDBACK_DELAY_INCORRECT)
                };
                Ok(RevealOutcome {
                    revealed_answer: canonical,
                    advance_after,
                })
            }
            GeneratedSession::Pool(pool) => {
                let unfound = pool
                    .main_words
                    .iter()
                    .find(|w| !self.state.found_main_words.contains(&w.to_lowercase()))
                    .cloned()
                    .ok_or_else(|| {
                        AppError::InternalError(
                            "non-terminal pool session has no unfound main word".to_string(),
                        )
                    })?;
                let total_main = pool.main_words.len();

                self.state.current_streak = 0;
                self.state.score = self.state.score.saturating_sub(POOL_REVEAL_PENALTY);
                self.state.found_main_words.push(unfound.to_lowercase());
                if self.state.found_main_words.len() == total_main {
                    self.terminate(TerminationReason::PoolCompleted);
                }
                Ok(RevealOutcome {
                    revealed_answer: unfound,
                    advance_after: None,
                })
            }
        }
    }

    /// One clock unit elapsed. Terminal sessions ignore stray timer
    /// callbacks; pool games keep counting but never expire.
    pub fn tick(&mut self) -> &SessionState {
        if self.state.terminal {
            return &self.state;
        }
        self.state.seconds_remaining = self.state.seconds_remaining.saturating_sub(1);
        if self.state.seconds_remaining == 0 && self.is_clock_bound() {
            self.terminate(TerminationReason::TimeExpired);
        }
        &self.state
    }

    /// Move to the next round after the feedback delay. A no-op unless a
    /// judged round is pending, so a stray delayed callback after termination
    /// (or a duplicate) cannot corrupt state.
    pub fn advance_round(&mut self) -> &SessionState {
        if self.state.terminal || !self.state.awaiting_advance {
            return &self.state;
        }

        self.state.awaiting_advance = false;
        self.state.last_judgment = None;
        self.state.submitted_answer_buffer = None;
        self.state.current_round_index += 1;

        let round_count = match &self.payload {
            GeneratedSession::Sequential(p) => p.rounds.len(),
            GeneratedSession::Pool(_) => 0,
        };
        if self.state.current_round_index >= round_count {
            self.terminate(TerminationReason::RoundsExhausted);
        } else {
            self.stage_current_round();
        }
        &self.state
    }

    /// The completion report, exactly once, after the session went terminal.
    pub fn take_completion_report(&mut self) -> Option<CompletionReport> {
        if !self.state.terminal || self.completion_reported {
            return None;
        }
        self.completion_reported = true;
        Some(CompletionReport {
            final_score: self.state.score,
            reason: self.state.termination_reason?,
            rounds_completed: self.state.rounds_completed,
            main_words_found: self.state.found_main_words.len() as u32,
            bonus_words_found: self.state.found_bonus_words.len() as u32,
        })
    }

    // First trigger wins; later conditions never overwrite the reason.
    fn terminate(&mut self, reason: TerminationReason) {
        if self.state.terminal {
            return;
        }
        self.state.terminal = true;
        self.state.termination_reason = Some(reason);
        self.state.awaiting_advance = false;
        self.state.staged_parts = None;
        log::info!(
            "session terminal: reason={:?} score={} rounds_completed={}",
            reason,
            self.state.score,
            self.state.rounds_completed
        );
    }

    fn current_round(&self) -> AppResult<&crate::models::domain::RoundSpec> {
        match &self.payload {
            GeneratedSession::Sequential(p) => {
                p.rounds.get(self.state.current_round_index).ok_or_else(|| {
                    AppError::SessionDataUnavailable(
                        "round cursor is out of bounds".to_string(),
                    )
                })
            }
            GeneratedSession::Pool(_) => Err(AppError::SessionDataUnavailable(
                "pool sessions have no discrete rounds".to_string(),
            )),
        }
    }

    fn stage_current_round(&mut self) {
        let parts = match &self.payload {
            GeneratedSession::Sequential(p) => p
                .rounds
                .get(self.state.current_round_index)
                .and_then(|r| r.scramble_pool())
                .map(|parts| parts.to_vec()),
            GeneratedSession::Pool(_) => None,
        };

        self.state.staged_parts = parts.map(|mut parts| {
            parts.shuffle(&mut rand::thread_rng());
            parts
        });
    }
}
