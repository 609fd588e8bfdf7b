//! # Sentiment Scorer
//! Marker-lexicon sentiment in `[-1, 1]`, plus the discrete label buckets and
//! aggregate batch statistics used by the live view legend.
//!
//! Each distinct marker contributes once, no matter how often it occurs.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Contribution of a single marker found in the text.
pub const MARKER_STEP: f64 = 0.1;

/// Label thresholds (strictly beyond these values).
pub const NEGATIVE_LABEL_BELOW: f64 = -0.33;
pub const POSITIVE_LABEL_ABOVE: f64 = 0.33;

#[derive(Debug, Deserialize)]
struct Lexicon {
    positive: Vec<String>,
    negative: Vec<String>,
}

static LEXICON: Lazy<Lexicon> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<Lexicon>(raw).expect("valid sentiment lexicon")
});

#[derive(Debug, Clone, Default)]
pub struct SentimentScorer;

impl SentimentScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score a text in `[-1, 1]`. Empty text yields exactly `0.0`.
    pub fn score(&self, text: &str) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        let lower = text.to_lowercase();

        let mut score = 0.0f64;
        for marker in &LEXICON.positive {
            if lower.contains(marker.as_str()) {
                score += MARKER_STEP;
            }
        }
        for marker in &LEXICON.negative {
            if lower.contains(marker.as_str()) {
                score -= MARKER_STEP;
            }
        }

        score.clamp(-1.0, 1.0)
    }

    /// Score many texts, keeping input order.
    pub fn score_batch<I, S>(&self, texts: I) -> Vec<ScoredText>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        texts
            .into_iter()
            .map(|t| {
                let score = self.score(t.as_ref());
                ScoredText {
                    score,
                    label: SentimentLabel::from_score(score),
                }
            })
            .collect()
    }
}

/// Arithmetic mean of the scores of every text, `0.0` for an empty corpus.
pub fn mean_sentiment<'a, I>(scorer: &SentimentScorer, texts: I) -> f64
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sum = 0.0f64;
    let mut n = 0usize;
    for t in texts {
        sum += scorer.score(t);
        n += 1;
    }
    if n == 0 {
        0.0
    } else {
        (sum / n as f64).clamp(-1.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score < NEGATIVE_LABEL_BELOW {
            SentimentLabel::Negative
        } else if score > POSITIVE_LABEL_ABOVE {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredText {
    pub score: f64,
    pub label: SentimentLabel,
}

/// Aggregate label distribution over a batch.
/// `bias` is `(positive - negative) / total`, in `[-1, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentStats {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub positive_percent: f64,
    pub negative_percent: f64,
    pub neutral_percent: f64,
    pub bias: f64,
}

impl SentimentStats {
    pub fn from_scored(items: &[ScoredText]) -> Self {
        let mut stats = SentimentStats {
            total: items.len(),
            ..Default::default()
        };
        if items.is_empty() {
            return stats;
        }

        for it in items {
            match it.label {
                SentimentLabel::Positive => stats.positive += 1,
                SentimentLabel::Negative => stats.negative += 1,
                SentimentLabel::Neutral => stats.neutral += 1,
            }
        }

        let total = stats.total as f64;
        stats.positive_percent = stats.positive as f64 / total * 100.0;
        stats.negative_percent = stats.negative as f64 / total * 100.0;
        stats.neutral_percent = stats.neutral as f64 / total * 100.0;
        stats.bias = (stats.positive as f64 - stats.negative as f64) / total;
        stats
    }
}
