use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::domain::{Difficulty, GameType, GeneratedSession, PlayRecord, Submission};
use crate::repositories::{DocumentRepository, PlayRecordRepository};
use crate::services::generation_service::GenerationService;
use crate::services::session_engine::{
    RevealOutcome, SessionEngine, SessionState, SubmitOutcome,
};

struct LiveSession {
    engine: SessionEngine,
    record_id: String,
    document_content: String,
}

/// A freshly started session as handed to the presentation layer: the
/// renderable payload plus the initial state snapshot.
pub struct StartedSession {
    pub session_id: String,
    pub payload: GeneratedSession,
    pub state: SessionState,
}

/// Owns the live play sessions. Each session has exactly one engine, driven
/// through these operations; the record store sees at most two writes per
/// session (start and completion), and a failed write never interrupts play.
pub struct PlaySessionService {
    documents: Arc<dyn DocumentRepository>,
    records: Arc<dyn PlayRecordRepository>,
    generation: Arc<GenerationService>,
    sessions: RwLock<HashMap<String, LiveSession>>,
}

impl PlaySessionService {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        records: Arc<dyn PlayRecordRepository>,
        generation: Arc<GenerationService>,
    ) -> Self {
        Self {
            documents,
            records,
            generation,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Generate a session for the document and start play. The "session
    /// started" record is written here; a persistence failure is logged and
    /// play continues regardless.
    pub async fn start_session(
        &self,
        document_id: &str,
        game_type: GameType,
        difficulty: Difficulty,
    ) -> AppResult<StartedSession> {
        let document = self
            .documents
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Document with id '{}' not found", document_id))
            })?;

        let payload = self
            .generation
            .generate_session(&document.content, document.category, game_type, difficulty)
            .await?;

        let engine = SessionEngine::new(payload.clone())?;
        let record =
            PlayRecord::new_started(&document.id, &document.owner_id, game_type, difficulty);
        let record_id = record.id.clone();
        if let Err(e) = self.records.create_started(record).await {
            log::error!(
                "failed to persist session start for document {}: {}",
                document.id,
                e
            );
        }

        let session_id = Uuid::new_v4().to_string();
        let state = engine.state().clone();
        self.sessions.write().await.insert(
            session_id.clone(),
            LiveSession {
                engine,
                record_id,
                document_content: document.content,
            },
        );
        log::info!(
            "started session {} (game_type={:?}, difficulty={:?}) for document {}",
            session_id,
            game_type,
            difficulty,
            document_id
        );

        Ok(StartedSession {
            session_id,
            payload,
            state,
        })
    }

    pub async fn submit_answer(
        &self,
        session_id: &str,
        submission: &Submission,
    ) -> AppResult<(SubmitOutcome, SessionState)> {
        let mut sessions = self.sessions.write().await;
        let live = Self::live_mut(&mut sessions, session_id)?;

        let outcome = live.engine.submit_answer(submission)?;
        Self::finalize_if_terminal(&self.records, live).await;
        Ok((outcome, live.engine.state().clone()))
    }

    pub async fn reveal_answer(
        &self,
        session_id: &str,
    ) -> AppResult<(RevealOutcome, SessionState)> {
        let mut sessions = self.sessions.write().await;
        let live = Self::live_mut(&mut sessions, session_id)?;

        let outcome = live.engine.reveal_answer()?;
        Self::finalize_if_terminal(&self.records, live).await;
        Ok((outcome, live.engine.state().clone()))
    }

    pub async fn tick(&self, session_id: &str) -> AppResult<SessionState> {
        let mut sessions = self.sessions.write().await;
        let live = Self::live_mut(&mut sessions, session_id)?;

        live.engine.tick();
        Self::finalize_if_terminal(&self.records, live).await;
        Ok(live.engine.state().clone())
    }

    pub async fn advance_round(&self, session_id: &str) -> AppResult<SessionState> {
        let mut sessions = self.sessions.write().await;
        let live = Self::live_mut(&mut sessions, session_id)?;

        live.engine.advance_round();
        Self::finalize_if_terminal(&self.records, live).await;
        Ok(live.engine.state().clone())
    }

    pub async fn snapshot(&self, session_id: &str) -> AppResult<SessionState> {
        let sessions = self.sessions.read().await;
        let live = sessions.get(session_id).ok_or_else(|| {
            AppError::SessionDataUnavailable(format!("unknown session '{}'", session_id))
        })?;
        Ok(live.engine.state().clone())
    }

    /// Source document text for hint generation, a read-only side channel.
    pub async fn document_context(&self, session_id: &str) -> AppResult<String> {
        let sessions = self.sessions.read().await;
        let live = sessions.get(session_id).ok_or_else(|| {
            AppError::SessionDataUnavailable(format!("unknown session '{}'", session_id))
        })?;
        Ok(live.document_content.clone())
    }

    /// Drop an abandoned session. Any in-flight feedback or pending advance
    /// dies with the engine; no completion record is written.
    pub async fn abandon(&self, session_id: &str) -> AppResult<()> {
        let removed = self.sessions.write().await.remove(session_id);
        if removed.is_none() {
            return Err(AppError::SessionDataUnavailable(format!(
                "unknown session '{}'",
                session_id
            )));
        }
        log::info!("session {} abandoned", session_id);
        Ok(())
    }

    fn live_mut<'a>(
        sessions: &'a mut HashMap<String, LiveSession>,
        session_id: &str,
    ) -> AppResult<&'a mut LiveSession> {
        sessions.get_mut(session_id).ok_or_else(|| {
            AppError::SessionDataUnavailable(format!("unknown session '{}'", session_id))
        })
    }

    // The engine hands out its completion report exactly once; the write is
    // availability-over-durability, so a store failure only logs.
    async fn finalize_if_terminal(records: &Arc<dyn PlayRecordRepository>, live: &mut LiveSession) {
        if let Some(report) = live.engine.take_completion_report() {
            match records.mark_completed(&live.record_id, &report).await {
                Ok(record) => log::info!(
                    "recorded completion for session record {}: score={} reason={:?}",
                    record.id,
                    report.final_score,
                    report.reason
                ),
                Err(e) => log::error!(
                    "failed to persist session completion for record {}: {}",
                    live.record_id,
                    e
                ),
            }
        }
    }
}
