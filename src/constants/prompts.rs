use crate::models::domain::{Difficulty, DocumentCategory, GameType};

pub const SESSION_DESIGNER_PREAMBLE: &str = "You are a master educational game designer, creating a fun, 5-minute learning session based on a user's document.

## PRIMARY OBJECTIVE

Generate 5-10 varied, engaging mini-game rounds. The vocabulary, concepts, and complexity MUST align with the document's category, the requested game type, and the desired difficulty.

## ACCURACY REQUIREMENTS

- Every round must be directly grounded in the document text. Do not infer, extrapolate, or add information not present in the source material.
- Distractor options must be plausible but unambiguously incorrect.
- For spelling rounds, `missing_letters` must contain exactly the removed letters and the visible letters of `masked_form` must spell the rest of the word.

## OUTPUT INSTRUCTIONS

Return ONLY a single valid JSON object matching the provided schema. Do not include explanatory text, markdown code blocks, or commentary.";

pub const IMAGE_ROUND_RULES: &str = "For `word-image-match` rounds pick a concrete noun. The system handles image generation afterwards; set `image_ref` to the placeholder \"IMAGE_FOR_WORD_<word>\".";

pub const HINT_SYSTEM_PROMPT: &str = "You are a game master providing hints to players of word games based on the context of the document they uploaded. Give a hint without giving away the answer. Never write the target term itself, any inflection of it, or a trivial anagram of it in your reply. Respond with the hint text only.";

pub const VALIDATE_DOCUMENT_PROMPT: &str = "You are an AI assistant for a learning app. Your task is to validate document content to ensure it is suitable for creating educational games.

The content should be coherent, primarily text-based, and contain learnable vocabulary. It should not be gibberish, random characters, or inappropriate content.

Analyze the document text that follows and return a JSON object with two fields: `is_valid` (boolean) and `reason` (string). If the document is not valid, `reason` must be a concise, user-friendly explanation, for example: \"The content is too short or lacks clear vocabulary.\" If it is valid, `reason` must be an empty string.";

pub const CATEGORIZE_DOCUMENT_PROMPT: &str = "You are an expert librarian AI. Analyze the provided text and classify it into one of the following categories. Choose the single best fit and return a JSON object with one field `category` holding the category label verbatim.

Categories:
- Science (Biology, Chemistry, Physics, etc.)
- History & Social Science (Politics, Sociology, etc.)
- Mathematics
- Computer Science & Coding (Programming, Algorithms, Software, etc.)
- Engineering (Mechanical, Electrical, Civil, etc.)
- Language Learning & Literature (Fiction, Poetry, Grammar, etc.)
- General & Other (News articles, miscellaneous topics, etc.)";

pub const VOCABULARY_EXTRACTION_PROMPT: &str = "You are an expert vocabulary extractor. Analyze the given document text and identify the key vocabulary words that are most relevant and useful for learning games. Return a JSON object with one field `vocabulary_list` holding the list of words.";

/// Difficulty tier rules shared across round kinds, including the masking
/// depth for spelling rounds.
pub fn difficulty_rules(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => {
            "Difficulty: EASY. Use common, shorter words (3-6 letters). Focus on core concepts. \
             Distractors should be obviously different. For spelling-completion rounds remove only \
             1-2 letters (about 10-20% of the word), preferring vowels."
        }
        Difficulty::Medium => {
            "Difficulty: MEDIUM. Use moderately complex words (5-9 letters). Combine concepts. \
             Distractors should be plausible. For spelling-completion rounds remove about 30% of \
             the letters, mixing vowels and common consonants."
        }
        Difficulty::Hard => {
            "Difficulty: HARD. Use long, complex, domain-specific terms (8+ letters). Test nuanced \
             relationships; distractors should be very similar or conceptually related. For \
             spelling-completion rounds remove about 50% of the letters, including less common \
             consonants or symbols."
        }
    }
}

/// Category-specific round-type affinities for mixed sessions.
pub fn category_rules(category: DocumentCategory) -> &'static str {
    match category {
        DocumentCategory::Science | DocumentCategory::Engineering => {
            "Category guidance: generate true-false-challenge rounds testing relationships (e.g. \
             \"Photosynthesis produces carbon dioxide.\"). Prioritize spelling-completion and \
             trace-or-type for key terminology. word-image-match works well for physical objects."
        }
        DocumentCategory::HistorySocialScience => {
            "Category guidance: generate true-false-challenge rounds testing factual accuracy about \
             events or figures, including engaging \"Who am I?\" statements. \
             word-translation-match can pair key terms with their short definitions."
        }
        DocumentCategory::ComputerScienceCoding => {
            "Category guidance: prioritize spelling-completion and trace-or-type for syntax, \
             keywords, and function names. true-false-challenge can test logic. On hard difficulty, \
             spelling rounds may include special characters like underscores or brackets."
        }
        DocumentCategory::Mathematics => {
            "Category guidance: favour formula-scramble and true-false-challenge rounds over pure \
             vocabulary; spelling-completion suits named theorems and operations."
        }
        DocumentCategory::LanguageLearningLiterature | DocumentCategory::GeneralOther => {
            "Category guidance: use a balanced mix of all round kinds. word-translation-match and \
             word-image-match are particularly effective here."
        }
    }
}

/// Game-type exclusivity rules: themed sessions constrain the entire output
/// to a single round variant; the word grid switches to the pool contract.
pub fn game_type_rules(game_type: GameType) -> &'static str {
    match game_type {
        GameType::PersonalizedPractice => {
            "Game type: Personalized Practice. This is a mixed-modality session: generate a good \
             variety of round kinds following the category and difficulty guidance. Prioritize \
             variety to keep the player engaged."
        }
        GameType::FormulaScramble => {
            "Game type: Formula Scramble. THIS IS THE ONLY ROUND KIND TO GENERATE: every round must \
             be formula-scramble. Identify 5-10 key formulas or equations from the document, break \
             each into its logical components (variables, operators, numbers, functions) and provide \
             them shuffled in scrambled_parts. Easy: 2-4 parts. Medium: 4-6 parts. Hard: 6+ parts \
             broken into smaller, trickier pieces."
        }
        GameType::TimelineTeaser => {
            "Game type: Timeline Teaser. THIS IS THE ONLY ROUND KIND TO GENERATE: every round must \
             be timeline-teaser. Identify 5-10 sets of events, figures, or process steps with a \
             clear chronological order. Easy: 3-4 widely separated items. Medium: 4-5 items \
             requiring more specific knowledge. Hard: 5-6 nuanced or closely timed items."
        }
        GameType::WordGrid => {
            "Game type: Word Grid. Instead of discrete rounds, produce a letter pool puzzle: pick \
             6-8 letters drawn from key document vocabulary, a set of 4-8 main words spellable from \
             those letters (each letter consumed at most as many times as it appears in the pool), \
             and a set of bonus words also spellable from the pool. Main and bonus sets must not \
             overlap."
        }
    }
}

/// Full instruction set for one generation call.
pub fn build_session_instructions(
    document_text: &str,
    category: DocumentCategory,
    game_type: GameType,
    difficulty: Difficulty,
) -> String {
    format!(
        "{preamble}\n\n\
         ## INPUT\n\
         - Document Category: {category}\n\
         - Requested Game Type: {game_type}\n\
         - Desired Difficulty: {difficulty}\n\n\
         ## RULES\n\n{game_rules}\n\n{difficulty_rules}\n\n{category_rules}\n\n{image_rules}\n\n\
         ## FINAL INSTRUCTIONS\n\
         Give the session a fun, encouraging title (e.g. \"Biology Blitz\", \"Calculus Scramble\").\n\n\
         ## DOCUMENT TEXT\n\n{document_text}",
        preamble = SESSION_DESIGNER_PREAMBLE,
        category = category.label(),
        game_type = game_type.display_name(),
        difficulty = difficulty.as_str(),
        game_rules = game_type_rules(game_type),
        difficulty_rules = difficulty_rules(difficulty),
        category_rules = category_rules(category),
        image_rules = IMAGE_ROUND_RULES,
        document_text = document_text,
    )
}

pub fn build_hint_instructions(document_context: &str, target_term: &str) -> String {
    format!(
        "{system}\n\nThe player is stuck on the term '{term}'. Provide a hint based on the \
         following document context:\n\n{context}",
        system = HINT_SYSTEM_PROMPT,
        term = target_term,
        context = document_context,
    )
}

pub fn build_image_prompt(word: &str) -> String {
    format!(
        "Generate a vibrant, clean, flat illustration of \"{}\", suitable for a modern educational \
         app. The image should be clear, easily recognizable, and visually engaging.",
        word
    )
}
