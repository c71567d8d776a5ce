//! Tokenization and keyword extraction

use std::collections::HashMap;

/// Tokens shorter than this are dropped
const MIN_WORD_LEN: usize = 3;

/// Split text into lowercase word tokens
///
/// ASCII punctuation and digits act as separators; tokens shorter than
/// three characters are dropped.
pub fn words(text: &str) -> Vec<String> {
    let cleaned: String = text
        .chars()
        .map(|c| {
            if c.is_ascii_punctuation() || c.is_ascii_digit() {
                ' '
            } else {
                c
            }
        })
        .collect();

    cleaned
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        .map(str::to_string)
        .collect()
}

/// Return the `n` most frequent words of `text`
///
/// Words with equal counts keep the order of their first occurrence.
pub fn keywords(text: &str, n: usize) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for word in words(text) {
        let count = counts.entry(word.clone()).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }

    // Stable sort keeps first-occurrence order among ties
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.truncate(n);
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_strips_punctuation_and_digits() {
        assert_eq!(
            words("bitnami/postgresql:11.2-debian"),
            vec!["bitnami", "postgresql", "debian"]
        );
    }

    #[test]
    fn test_words_lowercases_and_filters_short() {
        assert_eq!(words("My DB is Redis v5"), vec!["redis"]);
    }

    #[test]
    fn test_words_empty() {
        assert!(words("").is_empty());
        assert!(words("--- 123 !!").is_empty());
    }

    #[test]
    fn test_keywords_most_common_first() {
        let text = "npm install && npm run build && npm test && node server";
        let kw = keywords(text, 2);
        assert_eq!(kw, vec!["npm", "install"]);
    }

    #[test]
    fn test_keywords_ties_keep_first_occurrence() {
        assert_eq!(
            keywords("gamma alpha beta", 5),
            vec!["gamma", "alpha", "beta"]
        );
    }
}
