//! model.rs — records exchanged with the external collaborators
//! (opinion API, clustering pass, chat transport).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ClusterId = u64;
pub type TopicId = String;

pub const MIN_OPINION_WEIGHT: u8 = 1;
pub const MAX_OPINION_WEIGHT: u8 = 10;

/// A participant's weighted submission. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opinion {
    pub id: u64,
    pub username: String,
    pub text: String,
    /// 1..=10; stored but not used for scoring.
    #[serde(default = "default_weight")]
    pub weight: u8,
}

fn default_weight() -> u8 {
    MIN_OPINION_WEIGHT
}

impl Opinion {
    pub fn new(id: u64, username: impl Into<String>, text: impl Into<String>, weight: u8) -> Self {
        Self {
            id,
            username: username.into(),
            text: text.into(),
            weight: weight.clamp(MIN_OPINION_WEIGHT, MAX_OPINION_WEIGHT),
        }
    }
}

/// Layout hint in the unit square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn clamped(self) -> Self {
        let unit = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.5 };
        Self {
            x: unit(self.x),
            y: unit(self.y),
        }
    }
}

/// One cluster as produced by the external clustering pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSeed {
    pub cluster_id: ClusterId,
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub leader_id: Option<String>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub opinions: Vec<Opinion>,
}

impl ClusterSeed {
    pub fn new(cluster_id: ClusterId) -> Self {
        Self {
            cluster_id,
            heading: None,
            leader_id: None,
            position: None,
            opinions: Vec::new(),
        }
    }

    pub fn heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }

    pub fn opinion(mut self, text: impl Into<String>) -> Self {
        let id = self.opinions.len() as u64 + 1;
        self.opinions.push(Opinion::new(id, "anonymous", text, MIN_OPINION_WEIGHT));
        self
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position { x, y });
        self
    }
}

/// An accepted chat message. The assignment is decided once, at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub sentiment: f64,
    pub assigned_cluster_id: Option<ClusterId>,
}
