// src/lib.rs
// Public library surface for integration tests and the binary entry point.

// Pure scoring (no state)
pub mod keywords;
pub mod presentation;
pub mod sentiment;
pub mod similarity;

// Assignment + aggregation
pub mod assignment;
pub mod cluster;
pub mod history;
pub mod model;
pub mod topic;

// Topic-scoped service and its surfaces
pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod metrics;
pub mod registry;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, router, AppState};
pub use crate::assignment::{Assignment, AssignmentEngine, AssignmentMethod};
pub use crate::config::{EngineConfig, ReseedPolicy};
pub use crate::error::EngineError;
pub use crate::model::{ChatMessage, ClusterId, ClusterSeed, Opinion, Position, TopicId};
pub use crate::registry::TopicRegistry;

use std::sync::OnceLock;
use tracing::{info, warn};

/// The Prometheus recorder is process-global; install it at most once.
static METRICS: OnceLock<Option<crate::metrics::Metrics>> = OnceLock::new();

/// Build the full application router: engine config from disk/env, the
/// engine API, and `/metrics` when the recorder could be installed.
pub async fn app() -> anyhow::Result<axum::Router> {
    let cfg = EngineConfig::load()?;
    info!(
        fallback_threshold = cfg.assignment.fallback_threshold,
        reseed_policy = ?cfg.topic.reseed_policy,
        "engine config loaded"
    );

    let mut router = create_router(AppState::new(cfg));

    let metrics = METRICS.get_or_init(|| match crate::metrics::Metrics::init() {
        Ok(m) => Some(m),
        Err(e) => {
            warn!(error = %e, "metrics disabled");
            None
        }
    });
    if let Some(m) = metrics {
        router = router.merge(m.router());
    }
    Ok(router)
}
