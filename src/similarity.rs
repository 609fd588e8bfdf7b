//! Lexical similarity: Jaccard index over distinct lower-cased whitespace tokens.

use std::collections::HashSet;

/// Whitespace tokenization, lower-case. Tokens keep punctuation.
fn token_set(s: &str) -> HashSet<String> {
    s.split_whitespace().map(|t| t.to_lowercase()).collect()
}

/// `|A ∩ B| / |A ∪ B|` over distinct tokens, in `[0, 1]`.
/// Two empty (or whitespace-only) texts score `0.0`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let ta = token_set(a);
    let tb = token_set(b);

    let union = ta.union(&tb).count();
    if union == 0 {
        return 0.0;
    }
    let inter = ta.intersection(&tb).count();
    (inter as f64 / union as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_is_one() {
        assert_eq!(similarity("Remote work is great", "remote WORK is great"), 1.0);
    }

    #[test]
    fn empty_pair_is_zero() {
        assert_eq!(similarity("", ""), 0.0);
        assert_eq!(similarity("   ", "\t"), 0.0);
        assert_eq!(similarity("", "something"), 0.0);
    }

    #[test]
    fn repeats_do_not_count_twice() {
        // {a, b} vs {a, c} -> 1/3
        let s = similarity("a a a b", "a c");
        assert!((s - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn heading_overlap_example() {
        // {we, need, better, communication, tools} vs {communication, tools}
        let s = similarity("we need better communication tools", "communication tools");
        assert!((s - 0.4).abs() < 1e-12);
    }

    #[test]
    fn punctuation_is_part_of_token() {
        assert_eq!(similarity("tools.", "tools"), 0.0);
    }
}
