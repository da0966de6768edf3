use regex::Regex;
use std::sync::LazyLock;

static SENTENCE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence regex is valid"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

const VOWELS: &str = "aeiouy";

/// Word and sentence statistics for drill-down display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStats {
    pub total_words: usize,
    pub avg_sentence_length: usize,
}

/// Counts non-empty segments between `.`, `!` and `?`
pub fn sentence_count(text: &str) -> usize {
    SENTENCE_BREAKS
        .split(text)
        .filter(|s| !s.trim().is_empty())
        .count()
}

/// Counts whitespace-delimited tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Approximates syllables as vowel-group onsets, at least one per word
pub fn count_syllables(word: &str) -> usize {
    let mut count = 0;
    let mut previous_was_vowel = false;

    for c in word.chars().flat_map(char::to_lowercase) {
        let is_vowel = VOWELS.contains(c);
        if is_vowel && !previous_was_vowel {
            count += 1;
        }
        previous_was_vowel = is_vowel;
    }

    count.max(1)
}

/// Simplified Flesch Reading Ease, clamped to `[0, 100]`
///
/// Returns 0 when the text has no sentences or no words.
pub fn calculate_readability_score(text: &str) -> u8 {
    let sentences = sentence_count(text);
    let words: Vec<&str> = text.split_whitespace().collect();

    if sentences == 0 || words.is_empty() {
        return 0;
    }

    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();
    let avg_sentence_length = words.len() as f64 / sentences as f64;
    let avg_syllables_per_word = syllables as f64 / words.len() as f64;

    let score = 206.835 - 1.015 * avg_sentence_length - 84.6 * avg_syllables_per_word;
    score.clamp(0.0, 100.0).round() as u8
}

/// Word totals and average sentence length
///
/// The sentence-length numerator counts raw whitespace splits, so a leading
/// separator contributes an empty piece.
pub fn text_stats(text: &str) -> TextStats {
    let sentences = sentence_count(text);
    let avg_sentence_length = if sentences > 0 {
        let pieces = WHITESPACE.split(text).count();
        (pieces as f64 / sentences as f64).round() as usize
    } else {
        0
    };

    TextStats {
        total_words: word_count(text),
        avg_sentence_length,
    }
}
