//! # Keyword Frequency Analyzer
//! Counts significant tokens across a cluster's corpus (opinions + assigned
//! messages) and folds them into the frequency score that drives the radius:
//!
//! `frequency_score = total_mentions * 2 + top_keyword_frequency`
//!
//! where `total_mentions` is the number of texts and `top_keyword_frequency`
//! the highest count of any surviving token (1 if none survive).

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Tokens of this many characters or fewer are ignored.
pub const MIN_KEYWORD_LEN_EXCLUSIVE: usize = 3;

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "we", "should", "need", "can", "will", "is", "are", "was", "were", "be", "been", "have",
        "has", "had", "do", "does", "did",
    ]
    .into_iter()
    .collect()
});

// Word characters are ASCII only: "café" becomes "caf ".
static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s]").expect("non-word regex"));

/// Lower-case, replace non-word characters with spaces, split, then drop
/// short tokens and stopwords.
pub fn significant_tokens(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let cleaned = NON_WORD.replace_all(&lower, " ");
    cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() > MIN_KEYWORD_LEN_EXCLUSIVE && !STOPWORDS.contains(*w))
        .map(str::to_string)
        .collect()
}

/// Occurrence counts of significant tokens across the whole corpus.
pub fn keyword_counts<'a, I>(corpus: I) -> HashMap<String, usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for text in corpus {
        for tok in significant_tokens(text) {
            *counts.entry(tok).or_insert(0) += 1;
        }
    }
    counts
}

/// Composite "how much was said" + "how concentrated the vocabulary is".
pub fn frequency_score<'a, I>(corpus: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    let mut mentions = 0u64;
    let counts = keyword_counts(corpus.into_iter().inspect(|_| mentions += 1));
    let top = counts.values().copied().max().unwrap_or(1) as u64;
    mentions * 2 + top
}

/// The `n` most frequent keywords, highest first; ties alphabetical.
pub fn top_keywords<'a, I>(corpus: I, n: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ranked: Vec<(String, usize)> = keyword_counts(corpus).into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(n);
    ranked
}
