use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use lexquest_server::errors::AppError;
use lexquest_server::models::domain::{
    Difficulty, DocumentCategory, GameType, GeneratedSession, RoundSpec,
};
use lexquest_server::services::backend::{
    BackendError, GenerationBackend, ImageBackend, RetryPolicy,
};
use lexquest_server::services::generation_service::GenerationService;

/// Generation backend driven by a script of canned results, counting its
/// invocations so retry bounds can be asserted exactly.
struct ScriptedGenerationBackend {
    responses: Mutex<VecDeque<Result<Value, BackendError>>>,
    calls: AtomicU32,
}

impl ScriptedGenerationBackend {
    fn new(responses: Vec<Result<Value, BackendError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicU32::new(0),
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for ScriptedGenerationBackend {
    async fn invoke(&self, _instructions: &str, _schema: &Value) -> Result<Value, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError("script exhausted".to_string())))
    }
}

struct FakeImageBackend {
    calls: AtomicU32,
}

impl FakeImageBackend {
    fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl ImageBackend for FakeImageBackend {
    async fn generate_image(&self, prompt: &str) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://img.example/{}.png", prompt.len()))
    }
}

fn immediate_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 2,
        backoff: Duration::ZERO,
    }
}

fn science_session_value() -> Value {
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
            },
            {
                "mini_game_type": "spelling-completion",
                "word": "energy",
                "masked_form": "en_rg_",
                "missing_letters": ["e", "y"],
                "decoy_letters": ["a", "o"],
                "prompt": "Complete the spelling."
            },
            {
                "mini_game_type": "word-image-match",
                "word": "cell",
                "image_ref": "IMAGE_FOR_WORD_cell",
                "distractor_words": ["wall", "gene", "core"],
                "prompt": "Which word matches the image?"
            },
            {
                "mini_game_type": "word-translation-match",
                "word": "powerhouse",
                "correct_translation": "energy plant",
                "distractor_translations": ["cold storage", "waste bin", "signal relay"],
                "prompt": "What is the correct translation?"
            },
            {
                "mini_game_type": "formula-scramble",
                "correct_formula": "ATP = ADP + P",
                "scrambled_parts": ["ADP + P", "ATP", "="],
                "prompt": "Unscramble the formula."
            }
        ]
    })
}

const SCIENCE_TEXT: &str = "Mitochondria are the powerhouse of the cell. They generate most of \
                            the chemical energy needed to power the cell's biochemical reactions.";

#[tokio::test]
async fn easy_science_session_is_generated_validated_and_image_resolved() {
    let backend = Arc::new(ScriptedGenerationBackend::new(vec![Ok(
        science_session_value(),
    )]));
    let images = Arc::new(FakeImageBackend::new());
    let service = GenerationService::new(backend.clone(), images.clone())
        .with_retry_policy(immediate_retry());

    let session = service
        .generate_session(
            SCIENCE_TEXT,
            DocumentCategory::Science,
            GameType::PersonalizedPractice,
            Difficulty::Easy,
        )
        .await
        .unwrap();

    let payload = match session {
        GeneratedSession::Sequential(payload) => payload,
        other => panic!("unexpected session shape: {:?}", other),
    };

    assert!((5..=10).contains(&payload.rounds.len()));
    for round in &payload.rounds {
        assert!(round.validate().is_ok(), "round failed validation: {:?}", round);
    }

    // Easy spelling rounds mask only 1-2 characters.
    for round in &payload.rounds {
        if let RoundSpec::SpellingCompletion { masked_form, .. } = round {
            let masked = masked_form.chars().filter(|c| *c == '_').count();
            assert!((1..=2).contains(&masked));
        }
    }

    // The placeholder round got exactly one image call and a real reference.
    assert_eq!(images.calls.load(Ordering::SeqCst), 1);
    assert!(payload.rounds.iter().all(|r| !r.needs_image()));
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn backend_failing_twice_surfaces_generation_failure_after_two_attempts() {
    let backend = Arc::new(ScriptedGenerationBackend::new(vec![
        Err(BackendError("overloaded".to_string())),
        Err(BackendError("overloaded".to_string())),
    ]));
    let service = GenerationService::new(backend.clone(), Arc::new(FakeImageBackend::new()))
        .with_retry_policy(immediate_retry());

    let result = service
        .generate_session(
            SCIENCE_TEXT,
            DocumentCategory::Science,
            GameType::PersonalizedPractice,
            Difficulty::Easy,
        )
        .await;

    assert!(matches!(result, Err(AppError::GenerationFailure)));
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn backend_failing_once_then_succeeding_takes_two_attempts_and_returns() {
    let backend = Arc::new(ScriptedGenerationBackend::new(vec![
        Err(BackendError("overloaded".to_string())),
        Ok(science_session_value()),
    ]));
    let service = GenerationService::new(backend.clone(), Arc::new(FakeImageBackend::new()))
        .with_retry_policy(immediate_retry());

    let session = service
        .generate_session(
            SCIENCE_TEXT,
            DocumentCategory::Science,
            GameType::PersonalizedPractice,
            Difficulty::Easy,
        )
        .await
        .unwrap();

    assert!(matches!(session, GeneratedSession::Sequential(_)));
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn hallucinated_pool_words_are_dropped_during_repair() {
    let backend = Arc::new(ScriptedGenerationBackend::new(vec![Ok(json!({
        "letters": ["c", "a", "t", "s"],
        "main_words": ["cats", "cat", "star"],
        "bonus_words": ["act"]
    }))]));
    let service = GenerationService::new(backend, Arc::new(FakeImageBackend::new()))
        .with_retry_policy(immediate_retry());

    let session = service
        .generate_session(
            "Cats and their habits.",
            DocumentCategory::GeneralOther,
            GameType::WordGrid,
            Difficulty::Easy,
        )
        .await
        .unwrap();

    match session {
        GeneratedSession::Pool(pool) => {
            // "star" needs an 'r' the pool does not contain.
            assert_eq!(pool.main_words, vec!["cats", "cat"]);
            assert_eq!(pool.bonus_words, vec!["act"]);
        }
        other => panic!("unexpected session shape: {:?}", other),
    }
}

#[tokio::test]
async fn exclusivity_violation_consumes_attempts_and_fails() {
    // A formula-scramble session containing a stray trace-or-type round
    // violates the game-type exclusivity contract on both attempts.
    let mixed = json!({
        "title": "Formula Frenzy",
        "game_type": "formula-scramble",
        "rounds": [
            {
                "mini_game_type": "formula-scramble",
                "correct_formula": "a + b",
                "scrambled_parts": ["b", "a +"],
                "prompt": "Unscramble the formula."
            },
            {
                "mini_game_type": "trace-or-type",
                "word": "algebra",
                "prompt": "Type the word."
            }
        ]
    });
    let backend = Arc::new(ScriptedGenerationBackend::new(vec![
        Ok(mixed.clone()),
        Ok(mixed),
    ]));
    let service = GenerationService::new(backend.clone(), Arc::new(FakeImageBackend::new()))
        .with_retry_policy(immediate_retry());

    let result = service
        .generate_session(
            "a + b = c",
            DocumentCategory::Mathematics,
            GameType::FormulaScramble,
            Difficulty::Medium,
        )
        .await;

    assert!(matches!(result, Err(AppError::GenerationFailure)));
    assert_eq!(backend.calls(), 2);
}
