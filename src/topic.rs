//! # Topic aggregate
//! Owns every cluster of one topic plus its message log. All mutation for a
//! topic goes through `&mut self`, so wrapping one aggregate in one lock is
//! enough to serialize assignment against the least-loaded counts it reads.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::assignment::{AssignmentEngine, AssignmentMethod, ClusterSnapshot};
use crate::cluster::{ClusterPresentation, ClusterState};
use crate::config::{EngineConfig, ReseedPolicy};
use crate::error::{EngineError, Result};
use crate::history::MessageLog;
use crate::logging::anon_hash;
use crate::model::{ChatMessage, ClusterId, ClusterSeed, TopicId};
use crate::sentiment::SentimentScorer;

/// Result of routing one chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignOutcome {
    /// `None` when the topic has no clusters yet.
    pub cluster_id: Option<ClusterId>,
    pub sentiment: f64,
    /// Best combined similarity over the roster (0 when unassigned).
    pub score: f64,
    /// `true` when the least-loaded fallback picked the cluster.
    pub fallback: bool,
    #[serde(skip)]
    pub method: Option<AssignmentMethod>,
    #[serde(skip)]
    pub cluster: Option<ClusterPresentation>,
}

#[derive(Debug)]
pub struct TopicClusters {
    topic_id: TopicId,
    generation: u64,
    clusters: Vec<ClusterState>,
    retired: HashSet<ClusterId>,
    history: MessageLog,
    engine: AssignmentEngine,
    scorer: SentimentScorer,
    reseed_policy: ReseedPolicy,
    /// 0 = unlimited.
    max_message_chars: usize,
}

impl TopicClusters {
    pub fn new(topic_id: impl Into<TopicId>, cfg: &EngineConfig) -> Self {
        Self {
            topic_id: topic_id.into(),
            generation: 0,
            clusters: Vec::new(),
            retired: HashSet::new(),
            history: MessageLog::with_capacity(cfg.topic.history_capacity),
            engine: cfg.assignment_engine(),
            scorer: SentimentScorer::new(),
            reseed_policy: cfg.topic.reseed_policy,
            max_message_chars: cfg.topic.max_message_chars,
        }
    }

    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    /// Number of reseeds applied so far (0 = never seeded).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cluster_ids(&self) -> Vec<ClusterId> {
        self.clusters.iter().map(ClusterState::cluster_id).collect()
    }

    pub fn cluster(&self, cluster_id: ClusterId) -> Option<&ClusterState> {
        self.clusters.iter().find(|c| c.cluster_id() == cluster_id)
    }

    /// Score, route and record one message. The assignment is final.
    pub fn assign_message(
        &mut self,
        text: &str,
        author: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<AssignOutcome> {
        let len = text.chars().count();
        if self.max_message_chars > 0 && len > self.max_message_chars {
            return Err(EngineError::MessageTooLong {
                len,
                max: self.max_message_chars,
            });
        }

        let sentiment = self.scorer.score(text);
        let assignment = {
            let roster: Vec<ClusterSnapshot<'_>> =
                self.clusters.iter().map(ClusterState::snapshot).collect();
            self.engine.assign(text, &roster)
        };

        let outcome = match assignment {
            Some(a) => {
                let scorer = &self.scorer;
                let cluster = self
                    .clusters
                    .iter_mut()
                    .find(|c| c.cluster_id() == a.cluster_id)
                    .ok_or_else(|| EngineError::ClusterNotFound {
                        topic_id: self.topic_id.clone(),
                        cluster_id: a.cluster_id,
                    })?;
                cluster.record_message(text, scorer);
                debug!(
                    target: "clusters",
                    topic = %self.topic_id,
                    id = %anon_hash(text),
                    cluster = a.cluster_id,
                    score = a.score,
                    method = ?a.method,
                    messages = cluster.message_count(),
                    "message assigned"
                );
                AssignOutcome {
                    cluster_id: Some(a.cluster_id),
                    sentiment,
                    score: a.score,
                    fallback: a.method == AssignmentMethod::Fallback,
                    method: Some(a.method),
                    cluster: Some(cluster.presentation()),
                }
            }
            None => {
                debug!(
                    target: "clusters",
                    topic = %self.topic_id,
                    id = %anon_hash(text),
                    "no clusters, message left unassigned"
                );
                AssignOutcome {
                    cluster_id: None,
                    sentiment,
                    score: 0.0,
                    fallback: false,
                    method: None,
                    cluster: None,
                }
            }
        };

        self.history.push(ChatMessage {
            author: author.to_string(),
            text: text.to_string(),
            timestamp,
            sentiment,
            assigned_cluster_id: outcome.cluster_id,
        });

        Ok(outcome)
    }

    /// Replace the roster with a fresh generation from the clustering pass.
    /// Validation happens before any mutation, so a rejected seed set leaves
    /// the topic untouched.
    pub fn reseed(&mut self, seeds: Vec<ClusterSeed>) -> Result<u64> {
        let mut seen = HashSet::with_capacity(seeds.len());
        for s in &seeds {
            if !seen.insert(s.cluster_id) {
                return Err(EngineError::DuplicateClusterId(s.cluster_id));
            }
            if self.retired.contains(&s.cluster_id) {
                return Err(EngineError::ClusterIdReused(s.cluster_id));
            }
        }

        let mut previous: HashMap<ClusterId, ClusterState> = self
            .clusters
            .drain(..)
            .map(|c| (c.cluster_id(), c))
            .collect();

        let mut carried = 0usize;
        for seed in seeds {
            let old = previous.remove(&seed.cluster_id);
            let state = match (self.reseed_policy, old) {
                (ReseedPolicy::CarryForward, Some(old)) => {
                    carried += 1;
                    ClusterState::from_seed_with_messages(seed, old.into_messages(), &self.scorer)
                }
                _ => ClusterState::from_seed(seed, &self.scorer),
            };
            self.clusters.push(state);
        }
        let retired_now = previous.len();
        self.retired.extend(previous.into_keys());
        self.generation += 1;

        info!(
            target: "clusters",
            topic = %self.topic_id,
            generation = self.generation,
            clusters = self.clusters.len(),
            carried,
            retired = retired_now,
            policy = ?self.reseed_policy,
            "topic reseeded"
        );
        Ok(self.generation)
    }

    pub fn presentation(&self, cluster_id: ClusterId) -> Result<ClusterPresentation> {
        self.cluster(cluster_id)
            .map(ClusterState::presentation)
            .ok_or_else(|| EngineError::ClusterNotFound {
                topic_id: self.topic_id.clone(),
                cluster_id,
            })
    }

    /// All clusters in roster order.
    pub fn presentations(&self) -> Vec<ClusterPresentation> {
        self.clusters.iter().map(ClusterState::presentation).collect()
    }

    pub fn recent_messages(&self, n: usize) -> Vec<ChatMessage> {
        self.history.snapshot_last_n(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic() -> TopicClusters {
        TopicClusters::new("t-1", &EngineConfig::default())
    }

    #[test]
    fn no_clusters_means_unassigned_but_logged() {
        let mut t = topic();
        let out = t.assign_message("hello there", "ana", Utc::now()).unwrap();
        assert_eq!(out.cluster_id, None);
        assert!(!out.fallback);
        let hist = t.recent_messages(10);
        assert_eq!(hist.len(), 1);
        assert_eq!(hist[0].assigned_cluster_id, None);
    }

    #[test]
    fn too_long_is_rejected_without_side_effects() {
        let mut cfg = EngineConfig::default();
        cfg.topic.max_message_chars = 5;
        let mut t = TopicClusters::new("t", &cfg);
        t.reseed(vec![ClusterSeed::new(1)]).unwrap();
        let err = t.assign_message("way too long", "ana", Utc::now()).unwrap_err();
        assert_eq!(err, EngineError::MessageTooLong { len: 12, max: 5 });
        assert!(t.recent_messages(10).is_empty());
        assert_eq!(t.cluster(1).unwrap().message_count(), 0);
    }

    #[test]
    fn long_message_is_assigned_by_default() {
        let mut t = topic();
        t.reseed(vec![ClusterSeed::new(1).heading("remote work")])
            .unwrap();
        let text = "remote work ".repeat(1_000);
        let out = t.assign_message(&text, "ana", Utc::now()).unwrap();
        assert_eq!(out.cluster_id, Some(1));
        assert_eq!(t.cluster(1).unwrap().message_count(), 1);
    }

    #[test]
    fn duplicate_seed_ids_rejected() {
        let mut t = topic();
        let err = t
            .reseed(vec![ClusterSeed::new(1), ClusterSeed::new(1)])
            .unwrap_err();
        assert_eq!(err, EngineError::DuplicateClusterId(1));
        assert_eq!(t.generation(), 0);
    }

    #[test]
    fn carry_forward_keeps_surviving_messages_and_retires_dropped() {
        let mut t = topic();
        t.reseed(vec![
            ClusterSeed::new(1).heading("remote work"),
            ClusterSeed::new(2).heading("office life"),
        ])
        .unwrap();
        t.assign_message("remote work is amazing", "a", Utc::now())
            .unwrap();
        t.assign_message("office life is great", "b", Utc::now())
            .unwrap();

        let generation = t
            .reseed(vec![ClusterSeed::new(1).heading("remote work"), ClusterSeed::new(3)])
            .unwrap();
        assert_eq!(generation, 2);
        assert_eq!(t.cluster(1).unwrap().message_count(), 1);
        assert!((t.cluster(1).unwrap().sentiment_avg() - 0.1).abs() < 1e-9);
        assert_eq!(t.cluster(3).unwrap().message_count(), 0);
        assert!(t.cluster(2).is_none());

        let err = t
            .reseed(vec![ClusterSeed::new(1), ClusterSeed::new(2)])
            .unwrap_err();
        assert_eq!(err, EngineError::ClusterIdReused(2));
        // rejected reseed leaves the roster alone
        assert_eq!(t.generation(), 2);
        assert_eq!(t.cluster_ids(), vec![1, 3]);
        assert_eq!(t.cluster(1).unwrap().message_count(), 1);
        assert_eq!(t.cluster(1).unwrap().heading(), Some("remote work"));
        // history keeps the original assignment
        let hist = t.recent_messages(10);
        assert_eq!(hist[1].assigned_cluster_id, Some(2));
    }

    #[test]
    fn reset_policy_drops_messages() {
        let mut cfg = EngineConfig::default();
        cfg.topic.reseed_policy = ReseedPolicy::Reset;
        let mut t = TopicClusters::new("t", &cfg);
        t.reseed(vec![ClusterSeed::new(1).heading("x")]).unwrap();
        t.assign_message("x", "a", Utc::now()).unwrap();
        assert_eq!(t.cluster(1).unwrap().message_count(), 1);
        t.reseed(vec![ClusterSeed::new(1).heading("x")]).unwrap();
        assert_eq!(t.cluster(1).unwrap().message_count(), 0);
    }

    #[test]
    fn unknown_cluster_presentation_is_not_found() {
        let t = topic();
        assert!(t.presentation(42).unwrap_err().is_not_found());
    }
}
