//! # Cluster Aggregation State
//! Per-cluster rolling corpus and the values derived from it.
//!
//! Lifecycle: `Empty` (nothing yet) -> `Seeded` (>= 1 opinion from the
//! clustering pass) -> `Active` (>= 1 chat message). Every recorded message
//! recomputes frequency score, sentiment mean and radius over the full
//! corpus; nothing is averaged incrementally.

use serde::Serialize;

use crate::assignment::ClusterSnapshot;
use crate::keywords;
use crate::model::{ClusterId, ClusterSeed, Opinion, Position};
use crate::presentation::{self, Hsl};
use crate::sentiment::{mean_sentiment, SentimentLabel, SentimentScorer};

/// Number of keywords exposed with a presentation record.
pub const PRESENTATION_KEYWORDS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterPhase {
    Empty,
    Seeded,
    Active,
}

#[derive(Debug, Clone)]
pub struct ClusterState {
    cluster_id: ClusterId,
    heading: Option<String>,
    leader_id: Option<String>,
    position: Option<Position>,
    opinions: Vec<Opinion>,
    /// Texts of every chat message assigned to this cluster, in arrival order.
    messages: Vec<String>,
    sentiment_avg: f64,
    frequency_score: u64,
    radius: f64,
}

/// What the rendering layer needs for one bubble.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterPresentation {
    pub cluster_id: ClusterId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader_id: Option<String>,
    pub state: ClusterPhase,
    pub radius: f64,
    pub fill_color: Hsl,
    pub stroke_color: Hsl,
    pub sentiment_avg: f64,
    pub sentiment_label: SentimentLabel,
    pub message_count: u64,
    pub opinion_count: usize,
    pub frequency_score: u64,
    pub top_keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl ClusterState {
    /// Build from a clustering-pass seed. Opinion weights are clamped to 1..=10.
    pub fn from_seed(seed: ClusterSeed, scorer: &SentimentScorer) -> Self {
        let opinions = seed
            .opinions
            .into_iter()
            .map(|o| Opinion::new(o.id, o.username, o.text, o.weight))
            .collect();
        let mut st = Self {
            cluster_id: seed.cluster_id,
            heading: seed.heading.filter(|h| !h.trim().is_empty()),
            leader_id: seed.leader_id,
            position: seed.position.map(Position::clamped),
            opinions,
            messages: Vec::new(),
            sentiment_avg: 0.0,
            frequency_score: 0,
            radius: 0.0,
        };
        st.recompute(scorer);
        st
    }

    /// Same seed, but keeping the chat messages of a previous generation.
    pub fn from_seed_with_messages(
        seed: ClusterSeed,
        messages: Vec<String>,
        scorer: &SentimentScorer,
    ) -> Self {
        let mut st = Self::from_seed(seed, scorer);
        st.messages = messages;
        st.recompute(scorer);
        st
    }

    pub fn cluster_id(&self) -> ClusterId {
        self.cluster_id
    }

    pub fn heading(&self) -> Option<&str> {
        self.heading.as_deref()
    }

    pub fn opinions(&self) -> &[Opinion] {
        &self.opinions
    }

    pub fn message_count(&self) -> u64 {
        self.messages.len() as u64
    }

    pub fn sentiment_avg(&self) -> f64 {
        self.sentiment_avg
    }

    pub fn frequency_score(&self) -> u64 {
        self.frequency_score
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn phase(&self) -> ClusterPhase {
        if !self.messages.is_empty() {
            ClusterPhase::Active
        } else if !self.opinions.is_empty() {
            ClusterPhase::Seeded
        } else {
            ClusterPhase::Empty
        }
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }

    /// Opinion texts followed by message texts.
    pub fn corpus(&self) -> impl Iterator<Item = &str> + '_ {
        self.opinions
            .iter()
            .map(|o| o.text.as_str())
            .chain(self.messages.iter().map(String::as_str))
    }

    pub fn snapshot(&self) -> ClusterSnapshot<'_> {
        ClusterSnapshot {
            cluster_id: self.cluster_id,
            heading: self.heading.as_deref(),
            opinions: &self.opinions,
            message_count: self.message_count(),
        }
    }

    /// Seeded/Active -> Active: append the message and recompute everything.
    pub fn record_message(&mut self, text: &str, scorer: &SentimentScorer) {
        self.messages.push(text.to_string());
        self.recompute(scorer);
    }

    /// Full recomputation of the derived values from the corpus.
    pub fn recompute(&mut self, scorer: &SentimentScorer) {
        self.frequency_score = keywords::frequency_score(self.corpus());
        self.sentiment_avg = mean_sentiment(scorer, self.corpus());
        self.radius = if self.phase() == ClusterPhase::Empty {
            presentation::MIN_RADIUS
        } else {
            presentation::radius(self.frequency_score)
        };
    }

    pub fn presentation(&self) -> ClusterPresentation {
        ClusterPresentation {
            cluster_id: self.cluster_id,
            heading: self.heading.clone(),
            leader_id: self.leader_id.clone(),
            state: self.phase(),
            radius: self.radius,
            fill_color: presentation::fill_color(self.sentiment_avg),
            stroke_color: presentation::stroke_color(self.sentiment_avg),
            sentiment_avg: self.sentiment_avg,
            sentiment_label: SentimentLabel::from_score(self.sentiment_avg),
            message_count: self.message_count(),
            opinion_count: self.opinions.len(),
            frequency_score: self.frequency_score,
            top_keywords: keywords::top_keywords(self.corpus(), PRESENTATION_KEYWORDS)
                .into_iter()
                .map(|(k, _)| k)
                .collect(),
            position: self.position,
        }
    }
}
