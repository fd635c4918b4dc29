//! Decides whether a sentence links two words.
//!
//! This is a loose heuristic, not a grammar check. Both words must appear,
//! the sentence needs five tokens, and it must contain a determiner or pronoun
//! followed later by an auxiliary, modal or copula. "Cat dog running playing
//! chasing" is refused and "a dog is cat" is accepted, which keeps the game
//! playable.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::GameConfig;

const MIN_TOKENS: usize = 5;
const TEST_PHRASE: &str = "test association";

static SENTENCE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(the|a|an|this|that|these|those|i|we|you|he|she|they)\b.*\b(is|are|was|were|have|has|had|can|could|will|would|should|do|does|did)\b",
    )
    .expect("sentence shape pattern is valid")
});

/// Something that can judge an association sentence.
pub trait SentenceCheck {
    fn is_valid_sentence(&self, sentence: &str, first: &str, second: &str) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssociationValidator {
    pub bypass_validation: bool,
    pub accept_test_phrase: bool,
}

impl Default for AssociationValidator {
    fn default() -> Self {
        AssociationValidator {
            bypass_validation: false,
            accept_test_phrase: true,
        }
    }
}

impl AssociationValidator {
    pub fn from_config(config: &GameConfig) -> AssociationValidator {
        AssociationValidator {
            bypass_validation: config.bypass_validation,
            accept_test_phrase: config.accept_test_phrase,
        }
    }
}

impl SentenceCheck for AssociationValidator {
    fn is_valid_sentence(&self, sentence: &str, first: &str, second: &str) -> bool {
        if sentence.trim().is_empty() {
            return false;
        }
        if self.bypass_validation {
            return true;
        }

        let text = sentence.to_lowercase();
        if self.accept_test_phrase && text.contains(TEST_PHRASE) {
            return true;
        }

        let has_words = mentions(&text, first) && mentions(&text, second);
        let long_enough = text.split_whitespace().count() >= MIN_TOKENS;
        let has_shape = SENTENCE_SHAPE.is_match(&text);
        debug!(has_words, long_enough, has_shape, "checked association");

        has_words && long_enough && has_shape
    }
}

/// Substring match on the word or its plain "s"/"ing" forms.
fn mentions(text: &str, word: &str) -> bool {
    let word = word.to_lowercase();
    text.contains(&word) || text.contains(&format!("{word}s")) || text.contains(&format!("{word}ing"))
}

/// Validates with the default settings.
pub fn validate_association(sentence: &str, first: &str, second: &str) -> bool {
    AssociationValidator::default().is_valid_sentence(sentence, first, second)
}

/// For input that may not be text at all, such as a JS `null` or number.
pub fn validate_maybe_text(sentence: Option<&str>, first: &str, second: &str) -> bool {
    sentence.is_some_and(|sentence| validate_association(sentence, first, second))
}
