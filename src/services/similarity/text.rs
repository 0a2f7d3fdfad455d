//! Tokenizing and scoring primitives.

use std::collections::{HashMap, HashSet};

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "are", "was", "were", "which", "into",
    "such", "said", "wherein", "each", "having", "has", "have", "its", "being", "been", "one",
    "more", "than", "can", "may", "not", "but", "also", "any", "all", "other", "between", "least",
];

/// Excerpts longer than this are cut at a char boundary.
const MAX_EXCERPT_CHARS: usize = 300;

/// Lowercased alphanumeric tokens of length >= 3, minus stopwords.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 3)
        .map(str::to_lowercase)
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .collect()
}

pub fn token_set(tokens: &[String]) -> HashSet<String> {
    tokens.iter().cloned().collect()
}

pub fn term_frequencies(tokens: &[String]) -> HashMap<String, f64> {
    let mut tf = HashMap::new();
    for token in tokens {
        *tf.entry(token.clone()).or_insert(0.0) += 1.0;
    }
    tf
}

pub fn norm(tf: &HashMap<String, f64>) -> f64 {
    tf.values().map(|v| v * v).sum::<f64>().sqrt()
}

/// |A ∩ B| / |A ∪ B|, 0 when both are empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Cosine of the angle between two term-frequency vectors with precomputed norms.
pub fn cosine(a: &HashMap<String, f64>, a_norm: f64, b: &HashMap<String, f64>, b_norm: f64) -> f64 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(term, w)| large.get(term).map(|v| w * v))
        .sum();
    (dot / (a_norm * b_norm)).clamp(0.0, 1.0)
}

/// The sentence of `text` sharing the most tokens with `query`.
pub fn best_excerpt(text: &str, query: &HashSet<String>) -> String {
    let best = text
        .split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .max_by_key(|sentence| {
            tokenize(sentence)
                .iter()
                .filter(|t| query.contains(*t))
                .count()
        })
        .unwrap_or(text.trim());

    if best.chars().count() <= MAX_EXCERPT_CHARS {
        best.to_string()
    } else {
        let cut: String = best.chars().take(MAX_EXCERPT_CHARS).collect();
        format!("{}...", cut.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(text: &str) -> HashSet<String> {
        token_set(&tokenize(text))
    }

    #[test]
    fn test_tokenize_drops_short_words_and_stopwords() {
        assert_eq!(
            tokenize("The Rotor-blade of a wind turbine, and its hub."),
            vec!["rotor", "blade", "wind", "turbine", "hub"]
        );
    }

    #[test]
    fn test_jaccard_bounds() {
        assert_eq!(jaccard(&set("rotor blade"), &set("rotor blade")), 1.0);
        assert_eq!(jaccard(&set("rotor"), &set("battery")), 0.0);
        assert_eq!(jaccard(&HashSet::new(), &HashSet::new()), 0.0);
        assert!((jaccard(&set("rotor blade"), &set("rotor hub")) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_identical_and_disjoint() {
        let a = term_frequencies(&tokenize("rotor rotor blade"));
        let b = term_frequencies(&tokenize("battery cell"));
        assert!((cosine(&a, norm(&a), &a, norm(&a)) - 1.0).abs() < 1e-9);
        assert_eq!(cosine(&a, norm(&a), &b, norm(&b)), 0.0);
    }

    #[test]
    fn test_best_excerpt_picks_overlapping_sentence() {
        let text = "A battery pack is described. The rotor blade has a curved tip. Cooling fins.";
        assert_eq!(
            best_excerpt(text, &set("curved rotor tip")),
            "The rotor blade has a curved tip."
        );
    }

    #[test]
    fn test_best_excerpt_truncates_on_char_boundary() {
        let long = "é".repeat(400);
        let excerpt = best_excerpt(&long, &HashSet::new());
        assert!(excerpt.ends_with("..."));
        assert_eq!(excerpt.chars().count(), MAX_EXCERPT_CHARS + 3);
    }

    proptest! {
        #[test]
        fn prop_scores_stay_in_unit_interval(a in "[a-z ]{0,80}", b in "[a-z ]{0,80}") {
            let (ta, tb) = (tokenize(&a), tokenize(&b));
            let j = jaccard(&token_set(&ta), &token_set(&tb));
            prop_assert!((0.0..=1.0).contains(&j));

            let (fa, fb) = (term_frequencies(&ta), term_frequencies(&tb));
            let c = cosine(&fa, norm(&fa), &fb, norm(&fb));
            prop_assert!((0.0..=1.0).contains(&c));
        }
    }
}
