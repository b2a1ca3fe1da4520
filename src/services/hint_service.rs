use std::sync::Arc;

use schemars::{schema_for, JsonSchema};
use serde::Deserialize;

use crate::constants::prompts::build_hint_instructions;
use crate::errors::{AppError, AppResult};
use crate::services::backend::GenerationBackend;

#[derive(Debug, Deserialize, JsonSchema)]
struct HintReply {
    hint: String,
}

/// On-demand contextual clues. Hints are non-critical: a single backend
/// attempt, no retry, and failures surface as a transient notice while play
/// continues unaffected.
pub struct HintService {
    backend: Arc<dyn GenerationBackend>,
}

impl HintService {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    pub async fn get_hint(&self, document_context: &str, target_term: &str) -> AppResult<String> {
        let instructions = build_hint_instructions(document_context, target_term);
        let schema = serde_json::to_value(schema_for!(HintReply))
            .map_err(|e| AppError::InternalError(format!("schema serialization failed: {}", e)))?;

        let value = self
            .backend
            .invoke(&instructions, &schema)
            .await
            .map_err(|e| {
                log::warn!("hint generation failed: {}", e);
                AppError::HintUnavailable
            })?;

        let reply: HintReply = serde_json::from_value(value).map_err(|e| {
            log::warn!("hint reply did not match contract: {}", e);
            AppError::HintUnavailable
        })?;

        Ok(reply.hint)
    }
}
