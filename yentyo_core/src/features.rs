// Lexical feature extraction.
//
// Turns a text into the set of strings the dissonance engine compares
// against its word cloud: every whitespace-delimited word (lower-cased),
// every adjacent word bigram, and every adjacent word trigram. Duplicates
// collapse, order is irrelevant. Pure functions, no state.

use rustc_hash::FxHashSet;

/// Set of lower-cased words, bigrams and trigrams.
pub type FeatureSet = FxHashSet<String>;

/// Split on whitespace and case-fold.
pub fn words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Words, bigrams and trigrams of `text`.
pub fn extract_features(text: &str) -> FeatureSet {
    let words = words(text);
    let mut features = FeatureSet::default();
    for (i, word) in words.iter().enumerate() {
        features.insert(word.clone());
        if i + 1 < words.len() {
            features.insert(format!("{} {}", word, words[i + 1]));
        }
        if i + 2 < words.len() {
            features.insert(format!("{} {} {}", word, words[i + 1], words[i + 2]));
        }
    }
    features
}

/// Jaccard index from an intersection size and the two set sizes.
/// The empty-empty case is 0, not NaN.
pub fn jaccard_index(intersection: usize, len_a: usize, len_b: usize) -> f32 {
    let union = len_a + len_b - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

/// Jaccard similarity of two feature sets.
pub fn jaccard_similarity(a: &FeatureSet, b: &FeatureSet) -> f32 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.iter().filter(|f| large.contains(*f)).count();
    jaccard_index(intersection, a.len(), b.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> FeatureSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn feature_counts() {
        let cases = [
            ("hello world", 3),
            ("the meaning of life", 9),
            ("hi", 1),
            ("a b c d e", 12),
            ("", 0),
            ("ненавижу всё это дерьмо", 9),
        ];
        for (input, want) in cases {
            assert_eq!(extract_features(input).len(), want, "features of {input:?}");
        }
    }

    #[test]
    fn features_include_words_and_bigrams() {
        let features = extract_features("Hello   World");
        assert!(features.contains("hello"));
        assert!(features.contains("world"));
        assert!(features.contains("hello world"));
    }

    #[test]
    fn duplicate_words_collapse() {
        let features = extract_features("the the the");
        // "the", "the the", "the the the"
        assert_eq!(features.len(), 3);
    }

    #[test]
    fn jaccard_overlap() {
        let a = set(&["a", "b", "c"]);
        let b = set(&["b", "c", "d"]);
        assert!((jaccard_similarity(&a, &b) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn jaccard_identity_and_disjoint() {
        let a = extract_features("the quick brown fox");
        assert_eq!(jaccard_similarity(&a, &a), 1.0);
        let c = set(&["x", "y"]);
        assert_eq!(jaccard_similarity(&a, &c), 0.0);
    }

    #[test]
    fn jaccard_empty_sets() {
        assert_eq!(jaccard_similarity(&FeatureSet::default(), &FeatureSet::default()), 0.0);
        assert_eq!(jaccard_index(0, 0, 0), 0.0);
    }
}
