use serde::Serialize;

use crate::models::domain::GeneratedSession;
use crate::services::session_engine::{RevealOutcome, SessionState, SubmitOutcome};

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub payload: GeneratedSession,
    pub state: SessionState,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    pub outcome: SubmitOutcome,
    pub state: SessionState,
}

#[derive(Debug, Serialize)]
pub struct RevealAnswerResponse {
    pub outcome: RevealOutcome,
    pub state: SessionState,
}

#[derive(Debug, Serialize)]
pub struct HintResponse {
    pub hint: String,
}
