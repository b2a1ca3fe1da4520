use futures::future::try_join_all;

use crate::constants::prompts::build_image_prompt;
use crate::models::domain::{RoundSpec, SessionPayload};
use crate::services::backend::{BackendError, ImageBackend};

/// Replace every unresolved image placeholder in the payload with a generated
/// image reference, one backend call per round, all issued concurrently.
///
/// All-or-nothing: the first failed call fails the whole resolution and no
/// partial substitution is kept visible to the caller. The join closes before
/// the payload is returned. Returns the number of images resolved.
pub async fn resolve_images(
    payload: &mut SessionPayload,
    backend: &dyn ImageBackend,
) -> Result<usize, BackendError> {
    let pending: Vec<(usize, String)> = payload
        .rounds
        .iter()
        .enumerate()
        .filter_map(|(idx, round)| match round {
            RoundSpec::WordImageMatch { word, .. } if round.needs_image() => {
                Some((idx, word.clone()))
            }
            _ => None,
        })
        .collect();

    if pending.is_empty() {
        return Ok(0);
    }

    let calls = pending.iter().map(|(_, word)| {
        let prompt = build_image_prompt(word);
        async move { backend.generate_image(&prompt).await }
    });
    let images = try_join_all(calls).await?;

    for ((idx, _), image) in pending.iter().zip(images) {
        if let RoundSpec::WordImageMatch { image_ref, .. } = &mut payload.rounds[*idx] {
            *image_ref = image;
        }
    }

    log::info!("resolved {} generated images for session payload", pending.len());
    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::round::IMAGE_PLACEHOLDER_PREFIX;
    use crate::models::domain::GameType;
    use crate::services::backend::MockImageBackend;

    fn image_round(word: &str) -> RoundSpec {
        RoundSpec::WordImageMatch {
            word: word.to_string(),
            image_ref: format!("{}{}", IMAGE_PLACEHOLDER_PREFIX, word),
            distractor_words: vec!["x".to_string(), "y".to_string(), "z".to_string()],
            prompt: "Which word matches the image?".to_string(),
        }
    }

    fn payload(rounds: Vec<RoundSpec>) -> SessionPayload {
        SessionPayload {
            title: "Test".to_string(),
            game_type: GameType::PersonalizedPractice,
            rounds,
        }
    }

    #[tokio::test]
    async fn resolves_every_placeholder_round() {
        let mut backend = MockImageBackend::new();
        backend
            .expect_generate_image()
            .times(2)
            .returning(|prompt| {
                let word = if prompt.contains("\"cell\"") { "cell" } else { "atom" };
                Ok(format!("https://img.example/{}.png", word))
            });

        let mut payload = payload(vec![
            image_round("cell"),
            RoundSpec::TraceOrType {
                word: "biology".to_string(),
                prompt: "Type the word.".to_string(),
            },
            image_round("atom"),
        ]);

        let resolved = resolve_images(&mut payload, &backend).await.unwrap();
        assert_eq!(resolved, 2);
        assert!(payload.rounds.iter().all(|r| !r.needs_image()));

        match &payload.rounds[0] {
            RoundSpec::WordImageMatch { image_ref, .. } => {
                assert_eq!(image_ref, "https://img.example/cell.png")
            }
            other => panic!("unexpected round: {:?}", other),
        }
    }

    #[tokio::test]
    async fn skips_rounds_with_already_resolved_images() {
        let mut backend = MockImageBackend::new();
        backend.expect_generate_image().times(0);

        let mut payload = payload(vec![RoundSpec::WordImageMatch {
            word: "cell".to_string(),
            image_ref: "https://img.example/cell.png".to_string(),
            distractor_words: vec!["x".to_string(), "y".to_string(), "z".to_string()],
            prompt: "Which word matches the image?".to_string(),
        }]);

        let resolved = resolve_images(&mut payload, &backend).await.unwrap();
        assert_eq!(resolved, 0);
    }

    #[tokio::test]
    async fn single_failure_fails_the_whole_resolution() {
        let mut backend = MockImageBackend::new();
        backend.expect_generate_image().returning(|prompt| {
            if prompt.contains("\"atom\"") {
                Err(BackendError("image model unavailable".to_string()))
            } else {
                Ok("https://img.example/cell.png".to_string())
            }
        });

        let mut payload = payload(vec![image_round("cell"), image_round("atom")]);
        let result = resolve_images(&mut payload, &backend).await;
        assert!(result.is_err());
    }
}
