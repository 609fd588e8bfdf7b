//! Error types for the cluster engine.

use crate::model::ClusterId;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures surfaced to callers. Pure scoring never fails; only lookups and
/// seed validation do.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("topic `{0}` not found")]
    TopicNotFound(String),

    #[error("cluster {cluster_id} not found in topic `{topic_id}`")]
    ClusterNotFound {
        topic_id: String,
        cluster_id: ClusterId,
    },

    #[error("seed set repeats cluster id {0}")]
    DuplicateClusterId(ClusterId),

    #[error("cluster id {0} was retired earlier in this topic and cannot be reused")]
    ClusterIdReused(ClusterId),

    #[error("message has {len} characters, limit is {max}")]
    MessageTooLong { len: usize, max: usize },
}

impl EngineError {
    /// Stable machine-readable code for API bodies.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::TopicNotFound(_) => "TOPIC_NOT_FOUND",
            EngineError::ClusterNotFound { .. } => "CLUSTER_NOT_FOUND",
            EngineError::DuplicateClusterId(_) => "DUPLICATE_CLUSTER_ID",
            EngineError::ClusterIdReused(_) => "CLUSTER_ID_REUSED",
            EngineError::MessageTooLong { .. } => "MESSAGE_TOO_LONG",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::TopicNotFound(_) | EngineError::ClusterNotFound { .. }
        )
    }
}
