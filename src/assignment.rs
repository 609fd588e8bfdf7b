//! # Cluster Assignment Engine
//! Pure, deterministic routing of a message to one cluster of a roster
//! snapshot. No I/O and no mutation; the topic aggregate applies the result.
//!
//! Policy:
//! 1) combined = heading_weight * sim(text, heading) + opinion_weight * max sim(text, opinion)
//! 2) best combined wins (first cluster on ties)
//! 3) best below `fallback_threshold` -> least-loaded cluster by message count
//!    (first cluster on ties), ignoring the ranking entirely
//! 4) empty roster -> no assignment

use serde::Serialize;

use crate::model::{ClusterId, Opinion};
use crate::similarity::similarity;

pub const DEFAULT_HEADING_WEIGHT: f64 = 0.6;
pub const DEFAULT_OPINION_WEIGHT: f64 = 0.4;
pub const DEFAULT_FALLBACK_THRESHOLD: f64 = 0.1;

/// Read-only view of one cluster at the moment of assignment.
#[derive(Debug, Clone, Copy)]
pub struct ClusterSnapshot<'a> {
    pub cluster_id: ClusterId,
    pub heading: Option<&'a str>,
    pub opinions: &'a [Opinion],
    pub message_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMethod {
    Similarity,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assignment {
    pub cluster_id: ClusterId,
    /// Best combined score over the roster (even when the fallback fired).
    pub score: f64,
    pub method: AssignmentMethod,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignmentEngine {
    pub heading_weight: f64,
    pub opinion_weight: f64,
    pub fallback_threshold: f64,
}

impl Default for AssignmentEngine {
    fn default() -> Self {
        Self {
            heading_weight: DEFAULT_HEADING_WEIGHT,
            opinion_weight: DEFAULT_OPINION_WEIGHT,
            fallback_threshold: DEFAULT_FALLBACK_THRESHOLD,
        }
    }
}

impl AssignmentEngine {
    pub fn new(heading_weight: f64, opinion_weight: f64, fallback_threshold: f64) -> Self {
        Self {
            heading_weight,
            opinion_weight,
            fallback_threshold,
        }
    }

    /// Weighted heading + best-opinion similarity for one cluster.
    pub fn combined_score(&self, text: &str, cluster: &ClusterSnapshot<'_>) -> f64 {
        let heading_sim = cluster.heading.map(|h| similarity(text, h)).unwrap_or(0.0);
        let opinion_sim = cluster
            .opinions
            .iter()
            .map(|o| similarity(text, &o.text))
            .fold(0.0f64, f64::max);
        self.heading_weight * heading_sim + self.opinion_weight * opinion_sim
    }

    pub fn assign(&self, text: &str, clusters: &[ClusterSnapshot<'_>]) -> Option<Assignment> {
        let mut best: Option<(ClusterId, f64)> = None;
        for c in clusters {
            let score = self.combined_score(text, c);
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((c.cluster_id, score)),
            }
        }
        let (best_id, best_score) = best?;

        if best_score >= self.fallback_threshold {
            return Some(Assignment {
                cluster_id: best_id,
                score: best_score,
                method: AssignmentMethod::Similarity,
            });
        }

        // `min_by_key` keeps the first minimum, which is the tie-break we want.
        let least_loaded = clusters.iter().min_by_key(|c| c.message_count)?;
        Some(Assignment {
            cluster_id: least_loaded.cluster_id,
            score: best_score,
            method: AssignmentMethod::Fallback,
        })
    }
}
