//! Update events handed to the external fan-out transport.
//!
//! The engine publishes on a `tokio::sync::broadcast` channel; whoever
//! delivers updates to live views subscribes. Publishing with no
//! subscribers is fine.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::assignment::AssignmentMethod;
use crate::cluster::ClusterPresentation;
use crate::model::{ClusterId, TopicId};

pub const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    MessageAssigned {
        topic_id: TopicId,
        author: String,
        sentiment: f64,
        method: AssignmentMethod,
        cluster: ClusterPresentation,
    },
    MessageUnassigned {
        topic_id: TopicId,
        author: String,
        sentiment: f64,
    },
    Reseeded {
        topic_id: TopicId,
        generation: u64,
        cluster_ids: Vec<ClusterId>,
    },
    TopicRemoved {
        topic_id: TopicId,
    },
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EngineEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(EVENT_CHANNEL_CAPACITY)
    }
}

impl EventBus {
    pub fn with_capacity(cap: usize) -> Self {
        let (tx, _rx) = broadcast::channel(cap.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }

    /// Returns how many subscribers received the event.
    pub fn publish(&self, event: EngineEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }
}
