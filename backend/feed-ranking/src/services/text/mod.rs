// ============================================
// Text Vectorizer
// ============================================
//
// Bag-of-words term frequency, normalized so the most frequent term is 1.0.
// There is no corpus-wide IDF term.

use std::collections::BTreeMap;

/// Sparse term vector. Absent terms weigh zero.
///
/// Ordered by term so iteration (and anything built on it) is deterministic.
pub type TermVector = BTreeMap<String, f64>;

/// Words dropped before counting.
pub const STOP_WORDS: [&str; 11] = [
    "the", "and", "is", "in", "at", "of", "to", "for", "with", "a", "an",
];

/// Tokens this short or shorter are dropped.
const MIN_TOKEN_LEN: usize = 2;

const MAX_SUGGESTED_TAGS: usize = 5;

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Lowercase, replace non-word characters with whitespace, and split.
fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if is_word_char(c) { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|token| token.len() > MIN_TOKEN_LEN && !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}

pub fn vectorize(text: &str) -> TermVector {
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0) += 1;
    }

    let max_count = counts.values().copied().max().unwrap_or(1).max(1);

    counts
        .into_iter()
        .map(|(term, count)| (term, f64::from(count) / f64::from(max_count)))
        .collect()
}

/// The five heaviest terms of `text`, minus any already in `existing_tags`.
///
/// Equal weights are ordered alphabetically. Filtering happens after the top
/// five are picked, so fewer than five may come back.
pub fn suggest_tags(text: &str, existing_tags: &[String]) -> Vec<String> {
    let mut terms: Vec<(String, f64)> = vectorize(text).into_iter().collect();
    terms.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    terms
        .into_iter()
        .take(MAX_SUGGESTED_TAGS)
        .map(|(term, _)| term)
        .filter(|term| !existing_tags.contains(term))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_stop_words() {
        assert!(vectorize("").is_empty());
        assert!(vectorize("the and of").is_empty());
        assert!(vectorize("   \n\t ").is_empty());
    }

    #[test]
    fn test_short_tokens_dropped() {
        let vector = vectorize("AI is ok, go rust");
        assert_eq!(vector.len(), 1);
        assert_eq!(vector.get("rust"), Some(&1.0));
    }

    #[test]
    fn test_normalized_by_max_frequency() {
        let vector = vectorize("Rust rust RUST tokio tokio async");
        assert_eq!(vector.get("rust"), Some(&1.0));
        assert!((vector["tokio"] - 2.0 / 3.0).abs() < 1e-12);
        assert!((vector["async"] - 1.0 / 3.0).abs() < 1e-12);
        assert!(vector.values().all(|w| *w > 0.0 && *w <= 1.0));
    }

    #[test]
    fn test_punctuation_splits_words() {
        let vector = vectorize("graph-based search, vector_db!");
        assert!(vector.contains_key("graph"));
        assert!(vector.contains_key("based"));
        assert!(vector.contains_key("search"));
        assert!(vector.contains_key("vector_db"));
    }

    #[test]
    fn test_non_ascii_letters_are_separators() {
        let vector = vectorize("café crème");
        assert!(vector.contains_key("caf"));
        assert!(!vector.contains_key("café"));
    }

    #[test]
    fn test_idempotent() {
        let text = "Agents share code and ideas about agents";
        assert_eq!(vectorize(text), vectorize(text));
    }

    #[test]
    fn test_suggest_tags_scenario() {
        let tags = suggest_tags("The quick AI agent writes AI code for AI agents", &[]);
        assert!(tags.len() <= 5);
        assert!(tags.iter().any(|t| t == "agent" || t == "agents"));
        assert!(tags.iter().any(|t| t == "ai" || t == "code"));
    }

    #[test]
    fn test_suggest_tags_orders_by_weight() {
        let tags = suggest_tags("tokio tokio tokio serde serde rust", &[]);
        assert_eq!(tags, vec!["tokio", "serde", "rust"]);
    }

    #[test]
    fn test_suggest_tags_excludes_existing() {
        let tags = suggest_tags(
            "tokio tokio tokio serde serde rust",
            &["serde".to_string()],
        );
        assert_eq!(tags, vec!["tokio", "rust"]);
    }

    #[test]
    fn test_suggest_tags_caps_before_filtering() {
        let text = "alpha alpha alpha alpha alpha alpha bravo bravo bravo bravo bravo \
                    charlie charlie charlie charlie delta delta delta echo echo foxtrot";
        let tags = suggest_tags(text, &["alpha".to_string()]);
        assert_eq!(tags, vec!["bravo", "charlie", "delta", "echo"]);
    }
}
