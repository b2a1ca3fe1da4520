use std::sync::Arc;

use schemars::schema_for;

use crate::constants::prompts::build_session_instructions;
use crate::errors::{AppError, AppResult};
use crate::models::domain::{
    Difficulty, DocumentCategory, GameType, GeneratedSession, SessionPayload, WordPoolPayload,
};
use crate::services::backend::{GenerationBackend, ImageBackend, RetryPolicy};
use crate::services::image_resolver::resolve_images;
use crate::services::word_check::repair_word_pool;

/// Generation cost/latency control: only this many characters of the source
/// document are sent to the backend.
pub const DOCUMENT_CHAR_BUDGET: usize = 4000;

/// Builds the instruction set, invokes the generation backend under the
/// retry policy, repairs/validates the structured result, and resolves
/// pending images before handing the finalized payload to the caller.
pub struct GenerationService {
    backend: Arc<dyn GenerationBackend>,
    image_backend: Arc<dyn ImageBackend>,
    retry: RetryPolicy,
}

impl GenerationService {
    pub fn new(backend: Arc<dyn GenerationBackend>, image_backend: Arc<dyn ImageBackend>) -> Self {
        Self {
            backend,
            image_backend,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn generate_session(
        &self,
        document_text: &str,
        category: DocumentCategory,
        game_type: GameType,
        difficulty: Difficulty,
    ) -> AppResult<GeneratedSession> {
        let truncated = truncate_chars(document_text, DOCUMENT_CHAR_BUDGET);
        let instructions = build_session_instructions(truncated, category, game_type, difficulty);
        let schema = output_schema(game_type)?;

        let mut attempt: u32 = 0;
        let mut session = loop {
            attempt += 1;
            match self.attempt_generation(&instructions, &schema, game_type).await {
                Ok(session) => break session,
                Err(reason) => {
                    log::warn!(
                        "session generation attempt {}/{} failed: {}",
                        attempt,
                        self.retry.max_attempts,
                        reason
                    );
                    if attempt >= self.retry.max_attempts {
                        return Err(AppError::GenerationFailure);
                    }
                    tokio::time::sleep(self.retry.backoff).await;
                }
            }
        };

        if let GeneratedSession::Sequential(payload) = &mut session {
            resolve_images(payload, self.image_backend.as_ref())
                .await
                .map_err(|e| {
                    log::error!("image resolution failed, discarding generated session: {}", e);
                    AppError::ImageResolutionFailure
                })?;
        }

        Ok(session)
    }

    /// One generation attempt: backend invocation, deserialization into the
    /// target contract, structural validation and pool repair. A round that
    /// fails validation fails the whole attempt; it is not silently dropped.
    async fn attempt_generation(
        &self,
        instructions: &str,
        schema: &serde_json::Value,
        game_type: GameType,
    ) -> Result<GeneratedSession, String> {
        let value = self
            .backend
            .invoke(instructions, schema)
            .await
            .map_err(|e| e.to_string())?;

        if game_type.is_pool() {
            let payload: WordPoolPayload =
                serde_json::from_value(value).map_err(|e| format!("contract mismatch: {}", e))?;
            payload.validate()?;

            let repaired = repair_word_pool(payload);
            if repaired.main_words.is_empty() {
                return Err("no main word survived letter-pool repair".to_string());
            }
            Ok(GeneratedSession::Pool(repaired))
        } else {
            let payload: SessionPayload =
                serde_json::from_value(value).map_err(|e| format!("contract mismatch: {}", e))?;
            if payload.game_type != game_type {
                return Err(format!(
                    "backend answered for game type {:?}, requested {:?}",
                    payload.game_type, game_type
                ));
            }
            payload.validate()?;
            Ok(GeneratedSession::Sequential(payload))
        }
    }
}

fn output_schema(game_type: GameType) -> AppResult<serde_json::Value> {
    let schema = if game_type.is_pool() {
        schema_for!(WordPoolPayload)
    } else {
        schema_for!(SessionPayload)
    };
    serde_json::to_value(&schema)
        .map_err(|e| AppError::InternalError(format!("schema serialization failed: {}", e)))
}

/// Char-safe prefix truncation (byte slicing would panic inside multi-byte
/// characters).
pub(crate) fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::round::IMAGE_PLACEHOLDER_PREFIX;
    use crate::models::domain::RoundSpec;
    use crate::services::backend::{BackendError, MockGenerationBackend, MockImageBackend};
    use mockall::Sequence;
    use serde_json::json;

    fn sequential_value() -> serde_json::Value {
        json!({
            "title": "Biology Blitz",
            "game_type": "personalized-practice",
            "rounds": [
                {
                    "mini_game_type": "trace-or-type",
                    "word": "mitochondria",
                    "prompt": "Type the word."
                },
                {
                    "mini_game_type": "true-false-challenge",
                    "word": "photosynthesis",
                    "statement": "Photosynthesis produces carbon dioxide.",
                    "is_correct": false,
                    "prompt": "True or False?"
                }
            ]
        })
    }

    fn service(
        backend: MockGenerationBackend,
        images: MockImageBackend,
        attempts: u32,
    ) -> GenerationService {
        GenerationService::new(Arc::new(backend), Arc::new(images))
            .with_retry_policy(RetryPolicy::immediate(attempts))
    }

    #[tokio::test]
    async fn backend_failing_twice_causes_exactly_two_attempts() {
        let mut backend = MockGenerationBackend::new();
        backend
            .expect_invoke()
            .times(2)
            .returning(|_, _| Err(BackendError("overloaded".to_string())));

        let svc = service(backend, MockImageBackend::new(), 2);
        let result = svc
            .generate_session(
                "text",
                DocumentCategory::Science,
                GameType::PersonalizedPractice,
                Difficulty::Easy,
            )
            .await;

        assert!(matches!(result, Err(AppError::GenerationFailure)));
    }

    #[tokio::test]
    async fn backend_failing_once_then_succeeding_returns_the_result() {
        let mut backend = MockGenerationBackend::new();
        let mut seq = Sequence::new();
        backend
            .expect_invoke()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(BackendError("overloaded".to_string())));
        backend
            .expect_invoke()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(sequential_value()));

        let svc = service(backend, MockImageBackend::new(), 2);
        let result = svc
            .generate_session(
                "text",
                DocumentCategory::Science,
                GameType::PersonalizedPractice,
                Difficulty::Easy,
            )
            .await
            .unwrap();

        match result {
            GeneratedSession::Sequential(payload) => {
                assert_eq!(payload.title, "Biology Blitz");
                assert_eq!(payload.rounds.len(), 2);
            }
            other => panic!("unexpected session: {:?}", other),
        }
    }

    #[tokio::test]
    async fn structurally_invalid_round_fails_the_attempt() {
        // Distractor array of length 2 violates the round contract.
        let invalid = json!({
            "title": "Broken",
            "game_type": "personalized-practice",
            "rounds": [{
                "mini_game_type": "word-translation-match",
                "word": "perro",
                "correct_translation": "dog",
                "distractor_translations": ["cat", "bird"],
                "prompt": "Pick the translation."
            }]
        });

        let mut backend = MockGenerationBackend::new();
        backend
            .expect_invoke()
            .times(2)
            .returning(move |_, _| Ok(invalid.clone()));

        let svc = service(backend, MockImageBackend::new(), 2);
        let result = svc
            .generate_session(
                "text",
                DocumentCategory::LanguageLearningLiterature,
                GameType::PersonalizedPractice,
                Difficulty::Easy,
            )
            .await;

        assert!(matches!(result, Err(AppError::GenerationFailure)));
    }

    #[tokio::test]
    async fn pool_payload_is_repaired_before_returning() {
        let raw = json!({
            "letters": ["c", "a", "t", "s"],
            "main_words": ["cats", "cat", "star"],
            "bonus_words": ["act", "cat"]
        });

        let mut backend = MockGenerationBackend::new();
        backend.expect_invoke().times(1).returning(move |_, _| Ok(raw.clone()));

        let svc = service(backend, MockImageBackend::new(), 2);
        let result = svc
            .generate_session(
                "text",
                DocumentCategory::GeneralOther,
                GameType::WordGrid,
                Difficulty::Easy,
            )
            .await
            .unwrap();

        match result {
            GeneratedSession::Pool(pool) => {
                assert_eq!(pool.main_words, vec!["cats", "cat"]);
                assert_eq!(pool.bonus_words, vec!["act"]);
            }
            other => panic!("unexpected session: {:?}", other),
        }
    }

    #[tokio::test]
    async fn image_placeholders_are_resolved_after_generation() {
        let with_image = json!({
            "title": "Cell Safari",
            "game_type": "personalized-practice",
            "rounds": [{
                "mini_game_type": "word-image-match",
                "word": "cell",
                "image_ref": format!("{}cell", IMAGE_PLACEHOLDER_PREFIX),
                "distractor_words": ["wall", "core", "gene"],
                "prompt": "Which word matches the image?"
            }]
        });

        let mut backend = MockGenerationBackend::new();
        backend
            .expect_invoke()
            .times(1)
            .returning(move |_, _| Ok(with_image.clone()));

        let mut images = MockImageBackend::new();
        images
            .expect_generate_image()
            .times(1)
            .returning(|_| Ok("https://img.example/cell.png".to_string()));

        let svc = service(backend, images, 2);
        let result = svc
            .generate_session(
                "text",
                DocumentCategory::Science,
                GameType::PersonalizedPractice,
                Difficulty::Easy,
            )
            .await
            .unwrap();

        match result {
            GeneratedSession::Sequential(payload) => match &payload.rounds[0] {
                RoundSpec::WordImageMatch { image_ref, .. } => {
                    assert_eq!(image_ref, "https://img.example/cell.png");
                }
                other => panic!("unexpected round: {:?}", other),
            },
            other => panic!("unexpected session: {:?}", other),
        }
    }

    #[tokio::test]
    async fn image_failure_is_a_hard_generation_failure() {
        let with_image = json!({
            "title": "Cell Safari",
            "game_type": "personalized-practice",
            "rounds": [{
                "mini_game_type": "word-image-match",
                "word": "cell",
                "image_ref": format!("{}cell", IMAGE_PLACEHOLDER_PREFIX),
                "distractor_words": ["wall", "core", "gene"],
                "prompt": "Which word matches the image?"
            }]
        });

        let mut backend = MockGenerationBackend::new();
        backend
            .expect_invoke()
            .times(1)
            .returning(move |_, _| Ok(with_image.clone()));

        let mut images = MockImageBackend::new();
        images
            .expect_generate_image()
            .returning(|_| Err(BackendError("image model unavailable".to_string())));

        let svc = service(backend, images, 2);
        let result = svc
            .generate_session(
                "text",
                DocumentCategory::Science,
                GameType::PersonalizedPractice,
                Difficulty::Easy,
            )
            .await;

        assert!(matches!(result, Err(AppError::ImageResolutionFailure)));
    }

    #[test]
    fn truncation_is_char_safe_and_bounded() {
        let text = "ü".repeat(5000);
        let truncated = truncate_chars(&text, DOCUMENT_CHAR_BUDGET);
        assert_eq!(truncated.chars().count(), DOCUMENT_CHAR_BUDGET);

        let short = "short text";
        assert_eq!(truncate_chars(short, DOCUMENT_CHAR_BUDGET), short);
    }
}
