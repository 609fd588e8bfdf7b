//! # Topic registry
//! Topic-scoped service in front of the engine. Each topic aggregate sits
//! behind its own mutex: assignment + recompute for one topic run one at a
//! time, different topics run in parallel. The outer map lock is only held
//! long enough to look up or insert a handle.
//!
//! Events for a topic are published while its mutex is held, and every
//! mutation first checks that the handle is still the one in the map. A
//! `TopicRemoved` event is therefore never followed by another event for
//! the same removed topic.

use chrono::{DateTime, Utc};
use metrics::{counter, gauge, histogram};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Instant;
use tracing::info;

use crate::assignment::AssignmentMethod;
use crate::cluster::ClusterPresentation;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::events::{EngineEvent, EventBus};
use crate::model::{ChatMessage, ClusterId, ClusterSeed, TopicId};
use crate::topic::{AssignOutcome, TopicClusters};

type TopicHandle = Arc<Mutex<TopicClusters>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicPresentation {
    pub topic_id: TopicId,
    pub generation: u64,
    pub clusters: Vec<ClusterPresentation>,
}

#[derive(Debug)]
pub struct TopicRegistry {
    cfg: EngineConfig,
    topics: RwLock<HashMap<TopicId, TopicHandle>>,
    events: EventBus,
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn lock(handle: &TopicHandle) -> MutexGuard<'_, TopicClusters> {
    handle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TopicRegistry {
    pub fn new(cfg: EngineConfig) -> Self {
        Self {
            cfg,
            topics: RwLock::new(HashMap::new()),
            events: EventBus::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn topic_count(&self) -> usize {
        self.topics
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn handle(&self, topic_id: &str) -> Result<TopicHandle> {
        self.topics
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(topic_id)
            .cloned()
            .ok_or_else(|| EngineError::TopicNotFound(topic_id.to_string()))
    }

    /// Whether `handle` is still the live entry for `topic_id`. Call with the
    /// topic mutex held.
    fn is_current(&self, topic_id: &str, handle: &TopicHandle) -> bool {
        self.topics
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(topic_id)
            .is_some_and(|live| Arc::ptr_eq(live, handle))
    }

    fn handle_or_create(&self, topic_id: &str) -> TopicHandle {
        if let Ok(h) = self.handle(topic_id) {
            return h;
        }
        let mut map = self
            .topics
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let h = map
            .entry(topic_id.to_string())
            .or_insert_with(|| {
                info!(target: "clusters", topic = %topic_id, "topic created");
                Arc::new(Mutex::new(TopicClusters::new(topic_id, &self.cfg)))
            })
            .clone();
        gauge!("cluster_topics_active").set(map.len() as f64);
        h
    }

    /// Reseed: replace a topic's roster with a new generation, creating the
    /// topic on first use. Returns the new generation number.
    pub fn reseed(&self, topic_id: &str, seeds: Vec<ClusterSeed>) -> Result<u64> {
        loop {
            let handle = self.handle_or_create(topic_id);
            let mut topic = lock(&handle);
            if !self.is_current(topic_id, &handle) {
                // removed while we waited for the lock; seed a fresh topic
                continue;
            }
            let generation = topic.reseed(seeds)?;
            counter!("cluster_reseeds_total").increment(1);
            self.events.publish(EngineEvent::Reseeded {
                topic_id: topic_id.to_string(),
                generation,
                cluster_ids: topic.cluster_ids(),
            });
            return Ok(generation);
        }
    }

    /// AssignMessage: route one chat message within a known topic.
    pub fn assign_message(
        &self,
        topic_id: &str,
        text: &str,
        author: &str,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<AssignOutcome> {
        let handle = self.handle(topic_id)?;
        self.assign_with_handle(topic_id, &handle, text, author, timestamp)
    }

    fn assign_with_handle(
        &self,
        topic_id: &str,
        handle: &TopicHandle,
        text: &str,
        author: &str,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<AssignOutcome> {
        let mut topic = lock(handle);
        if !self.is_current(topic_id, handle) {
            return Err(EngineError::TopicNotFound(topic_id.to_string()));
        }
        let started = Instant::now();
        let outcome = topic.assign_message(text, author, timestamp.unwrap_or_else(Utc::now))?;
        histogram!("cluster_assign_duration_ms").record(started.elapsed().as_secs_f64() * 1000.0);

        let event = match (outcome.method, outcome.cluster.clone()) {
            (Some(method), Some(cluster)) => {
                let label = match method {
                    AssignmentMethod::Similarity => "similarity",
                    AssignmentMethod::Fallback => "fallback",
                };
                counter!("cluster_messages_assigned_total", "method" => label).increment(1);
                EngineEvent::MessageAssigned {
                    topic_id: topic_id.to_string(),
                    author: author.to_string(),
                    sentiment: outcome.sentiment,
                    method,
                    cluster,
                }
            }
            _ => {
                counter!("cluster_messages_unassigned_total").increment(1);
                EngineEvent::MessageUnassigned {
                    topic_id: topic_id.to_string(),
                    author: author.to_string(),
                    sentiment: outcome.sentiment,
                }
            }
        };
        self.events.publish(event);
        drop(topic);
        Ok(outcome)
    }

    /// GetClusterPresentation.
    pub fn cluster_presentation(
        &self,
        topic_id: &str,
        cluster_id: ClusterId,
    ) -> Result<ClusterPresentation> {
        let handle = self.handle(topic_id)?;
        let topic = lock(&handle);
        topic.presentation(cluster_id)
    }

    pub fn topic_presentation(&self, topic_id: &str) -> Result<TopicPresentation> {
        let handle = self.handle(topic_id)?;
        let topic = lock(&handle);
        Ok(TopicPresentation {
            topic_id: topic_id.to_string(),
            generation: topic.generation(),
            clusters: topic.presentations(),
        })
    }

    pub fn recent_messages(&self, topic_id: &str, n: usize) -> Result<Vec<ChatMessage>> {
        let handle = self.handle(topic_id)?;
        let topic = lock(&handle);
        Ok(topic.recent_messages(n))
    }

    /// Drop a topic and everything it owns.
    pub fn remove_topic(&self, topic_id: &str) -> Result<()> {
        let (handle, remaining) = {
            let mut map = self
                .topics
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let handle = map
                .remove(topic_id)
                .ok_or_else(|| EngineError::TopicNotFound(topic_id.to_string()))?;
            (handle, map.len())
        };
        // wait out an in-flight assign/reseed so its event goes first
        let _topic = lock(&handle);
        gauge!("cluster_topics_active").set(remaining as f64);
        info!(target: "clusters", topic = %topic_id, "topic removed");
        self.events.publish(EngineEvent::TopicRemoved {
            topic_id: topic_id.to_string(),
        });
        Ok(())
    }
}
