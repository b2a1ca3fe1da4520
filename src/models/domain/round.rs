use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Field name used to dispatch on the round kind everywhere (serde tag,
/// generation contract, client rendering).
pub const ROUND_KIND_FIELD: &str = "mini_game_type";

/// Token the generation backend leaves in `image_ref` for rounds whose
/// illustration is produced in a second pass.
pub const IMAGE_PLACEHOLDER_PREFIX: &str = "IMAGE_FOR_WORD_";

const DISTRACTOR_COUNT: usize = 3;

/// One mini-game round. Every variant carries enough information to both
/// render a challenge and deterministically judge a submitted answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "mini_game_type", rename_all = "kebab-case")]
pub enum RoundSpec {
    WordImageMatch {
        word: String,
        image_ref: String,
        distractor_words: Vec<String>,
        prompt: String,
    },
    WordTranslationMatch {
        word: String,
        correct_translation: String,
        distractor_translations: Vec<String>,
        prompt: String,
    },
    SpellingCompletion {
        word: String,
        masked_form: String,
        missing_letters: Vec<String>,
        decoy_letters: Vec<String>,
        prompt: String,
    },
    TraceOrType {
        word: String,
        prompt: String,
    },
    TrueFalseChallenge {
        word: String,
        statement: String,
        is_correct: bool,
        prompt: String,
    },
    FormulaScramble {
        correct_formula: String,
        scrambled_parts: Vec<String>,
        prompt: String,
    },
    TimelineTeaser {
        correct_order: Vec<String>,
        scrambled_order: Vec<String>,
        prompt: String,
    },
}

/// A player answer, already shaped by the input surface: a typed/selected
/// string, a true/false choice, or an ordered arrangement of pieces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Submission {
    Bool(bool),
    Sequence(Vec<String>),
    Text(String),
}

fn normalized(s: &str) -> String {
    s.trim().to_lowercase()
}

fn without_whitespace(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

fn sorted_normalized(items: &[String]) -> Vec<String> {
    let mut v: Vec<String> = items.iter().map(|s| normalized(s)).collect();
    v.sort_unstable();
    v
}

fn require_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} must not be empty", field))
    } else {
        Ok(())
    }
}

fn require_distractors(field: &str, distractors: &[String], correct: &str) -> Result<(), String> {
    if distractors.len() != DISTRACTOR_COUNT {
        return Err(format!(
            "{} must contain exactly {} entries, got {}",
            field,
            DISTRACTOR_COUNT,
            distractors.len()
        ));
    }
    let correct = normalized(correct);
    if distractors.iter().any(|d| normalized(d) == correct) {
        return Err(format!("{} must not contain the correct answer", field));
    }
    Ok(())
}

impl RoundSpec {
    /// Discriminant tag, as serialized under [`ROUND_KIND_FIELD`].
    pub fn kind(&self) -> &'static str {
        match self {
            RoundSpec::WordImageMatch { .. } => "word-image-match",
            RoundSpec::WordTranslationMatch { .. } => "word-translation-match",
            RoundSpec::SpellingCompletion { .. } => "spelling-completion",
            RoundSpec::TraceOrType { .. } => "trace-or-type",
            RoundSpec::TrueFalseChallenge { .. } => "true-false-challenge",
            RoundSpec::FormulaScramble { .. } => "formula-scramble",
            RoundSpec::TimelineTeaser { .. } => "timeline-teaser",
        }
    }

    /// Structural validation of a round as returned by the generation
    /// backend. A failure here is a backend contract violation.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            RoundSpec::WordImageMatch {
                word,
                image_ref,
                distractor_words,
                prompt,
            } => {
                require_non_empty("word", word)?;
                require_non_empty("image_ref", image_ref)?;
                require_non_empty("prompt", prompt)?;
                require_distractors("distractor_words", distractor_words, word)
            }
            RoundSpec::WordTranslationMatch {
                word,
                correct_translation,
                distractor_translations,
                prompt,
            } => {
                require_non_empty("word", word)?;
                require_non_empty("correct_translation", correct_translation)?;
                require_non_empty("prompt", prompt)?;
                require_distractors(
                    "distractor_translations",
                    distractor_translations,
                    correct_translation,
                )
            }
            RoundSpec::SpellingCompletion {
                word,
                masked_form,
                missing_letters,
                prompt,
                ..
            } => {
                require_non_empty("word", word)?;
                require_non_empty("masked_form", masked_form)?;
                require_non_empty("prompt", prompt)?;
                if missing_letters.is_empty() {
                    return Err("missing_letters must not be empty".to_string());
                }
                Self::validate_masking(word, masked_form, missing_letters)
            }
            RoundSpec::TraceOrType { word, prompt } => {
                require_non_empty("word", word)?;
                require_non_empty("prompt", prompt)
            }
            RoundSpec::TrueFalseChallenge {
                word,
                statement,
                prompt,
                ..
            } => {
                require_non_empty("word", word)?;
                require_non_empty("statement", statement)?;
                require_non_empty("prompt", prompt)
            }
            RoundSpec::FormulaScramble {
                correct_formula,
                scrambled_parts,
                prompt,
            } => {
                require_non_empty("correct_formula", correct_formula)?;
                require_non_empty("prompt", prompt)?;
                if scrambled_parts.len() < 2 {
                    return Err("scrambled_parts must contain at least 2 pieces".to_string());
                }
                let mut assembled: Vec<char> =
                    without_whitespace(&scrambled_parts.concat()).chars().collect();
                let mut expected: Vec<char> =
                    without_whitespace(correct_formula).chars().collect();
                assembled.sort_unstable();
                expected.sort_unstable();
                if assembled != expected {
                    return Err(
                        "scrambled_parts do not reassemble into correct_formula".to_string()
                    );
                }
                Ok(())
            }
            RoundSpec::TimelineTeaser {
                correct_order,
                scrambled_order,
                prompt,
            } => {
                require_non_empty("prompt", prompt)?;
                if correct_order.len() < 2 {
                    return Err("correct_order must contain at least 2 events".to_string());
                }
                if sorted_normalized(correct_order) != sorted_normalized(scrambled_order) {
                    return Err(
                        "scrambled_order is not a permutation of correct_order".to_string()
                    );
                }
                Ok(())
            }
        }
    }

    // Every masked position must be covered by missing_letters, and the
    // visible positions must spell the word.
    fn validate_masking(
        word: &str,
        masked_form: &str,
        missing_letters: &[String],
    ) -> Result<(), String> {
        let word_chars: Vec<char> = word.to_lowercase().chars().collect();
        let mask_chars: Vec<char> = masked_form.to_lowercase().chars().collect();
        if word_chars.len() != mask_chars.len() {
            return Err("masked_form length does not match word".to_string());
        }

        let mut masked: Vec<char> = Vec::new();
        for (w, m) in word_chars.iter().zip(mask_chars.iter()) {
            if *m == '_' {
                masked.push(*w);
            } else if m != w {
                return Err("masked_form visible letters do not match word".to_string());
            }
        }
        if masked.is_empty() {
            return Err("masked_form has no masked positions".to_string());
        }

        let mut provided: Vec<char> = missing_letters
            .iter()
            .flat_map(|l| l.to_lowercase().chars().collect::<Vec<char>>())
            .collect();
        provided.sort_unstable();
        masked.sort_unstable();
        if provided != masked {
            return Err("missing_letters do not reconstruct the masked positions".to_string());
        }
        Ok(())
    }

    /// Deterministic per-variant judging of a submitted answer.
    pub fn check_answer(&self, submission: &Submission) -> bool {
        match (self, submission) {
            (RoundSpec::WordImageMatch { word, .. }, Submission::Text(answer))
            | (RoundSpec::TraceOrType { word, .. }, Submission::Text(answer))
            | (RoundSpec::SpellingCompletion { word, .. }, Submission::Text(answer)) => {
                normalized(answer) == normalized(word)
            }
            (
                RoundSpec::WordTranslationMatch {
                    correct_translation,
                    ..
                },
                Submission::Text(answer),
            ) => normalized(answer) == normalized(correct_translation),
            (RoundSpec::TrueFalseChallenge { is_correct, .. }, Submission::Bool(answer)) => {
                answer == is_correct
            }
            (
                RoundSpec::FormulaScramble {
                    correct_formula, ..
                },
                Submission::Sequence(parts),
            ) => without_whitespace(&parts.concat()) == without_whitespace(correct_formula),
            (
                RoundSpec::FormulaScramble {
                    correct_formula, ..
                },
                Submission::Text(assembled),
            ) => without_whitespace(assembled) == without_whitespace(correct_formula),
            (RoundSpec::TimelineTeaser { correct_order, .. }, Submission::Sequence(order)) => {
                order.len() == correct_order.len()
                    && order
                        .iter()
                        .zip(correct_order.iter())
                        .all(|(a, b)| normalized(a) == normalized(b))
            }
            _ => false,
        }
    }

    /// The answer surfaced to the player on a reveal.
    pub fn canonical_answer(&self) -> String {
        match self {
            RoundSpec::WordImageMatch { word, .. }
            | RoundSpec::SpellingCompletion { word, .. }
            | RoundSpec::TraceOrType { word, .. } => word.clone(),
            RoundSpec::WordTranslationMatch {
                correct_translation,
                ..
            } => correct_translation.clone(),
            RoundSpec::TrueFalseChallenge { is_correct, .. } => {
                let answer = if *is_correct { "True" } else { "False" };
                answer.to_string()
            }
            RoundSpec::FormulaScramble {
                correct_formula, ..
            } => correct_formula.clone(),
            RoundSpec::TimelineTeaser { correct_order, .. } => correct_order.join(" → "),
        }
    }

    /// Parts the player rearranges for this round, if any. Re-shuffled on
    /// every round entry by the session engine.
    pub fn scramble_pool(&self) -> Option<&[String]> {
        match self {
            RoundSpec::FormulaScramble {
                scrambled_parts, ..
            } => Some(scrambled_parts),
            RoundSpec::TimelineTeaser {
                scrambled_order, ..
            } => Some(scrambled_order),
            _ => None,
        }
    }

    /// True when `image_ref` still holds the generation placeholder token.
    pub fn needs_image(&self) -> bool {
        matches!(
            self,
            RoundSpec::WordImageMatch { image_ref, .. }
                if image_ref.starts_with(IMAGE_PLACEHOLDER_PREFIX)
        )
    }
}
