use std::collections::HashMap;

use crate::models::domain::WordPoolPayload;

/// Whether `candidate` can be spelled from the letter pool, consuming one
/// pool entry per occurrence. A word with repeated letters is only formable
/// if the pool holds at least that many repeats; membership checks alone are
/// not enough.
pub fn is_formable(candidate: &str, letters: &[String]) -> bool {
    let candidate = candidate.trim().to_lowercase();
    if candidate.is_empty() {
        return false;
    }

    let mut remaining: HashMap<char, usize> = HashMap::new();
    for letter in letters {
        for ch in letter.to_lowercase().chars() {
            *remaining.entry(ch).or_insert(0) += 1;
        }
    }

    for ch in candidate.chars() {
        match remaining.get_mut(&ch) {
            Some(count) if *count > 0 => *count -= 1,
            _ => return false,
        }
    }
    true
}

/// Repair a raw pool payload from the generation backend:
/// - drop any word that cannot actually be spelled from `letters`,
/// - case-fold and de-duplicate both sets,
/// - remove bonus words already present in the main set.
///
/// Idempotent: repairing a repaired payload is a no-op.
pub fn repair_word_pool(payload: WordPoolPayload) -> WordPoolPayload {
    let WordPoolPayload {
        letters,
        main_words,
        bonus_words,
    } = payload;

    let mut main: Vec<String> = Vec::new();
    for word in &main_words {
        let folded = word.trim().to_lowercase();
        if is_formable(&folded, &letters) && !main.contains(&folded) {
            main.push(folded);
        }
    }

    let mut bonus: Vec<String> = Vec::new();
    for word in &bonus_words {
        let folded = word.trim().to_lowercase();
        if is_formable(&folded, &letters) && !main.contains(&folded) && !bonus.contains(&folded) {
            bonus.push(folded);
        }
    }

    let dropped = (main_words.len() - main.len()) + (bonus_words.len() - bonus.len());
    if dropped > 0 {
        log::warn!(
            "word pool repair dropped {} unformable or duplicate words ({} main, {} bonus kept)",
            dropped,
            main.len(),
            bonus.len()
        );
    }

    WordPoolPayload {
        letters,
        main_words: main,
        bonus_words: bonus,
    }
}
