use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder and describe the engine series.
    /// Fails if a recorder is already installed in this process.
    pub fn init() -> anyhow::Result<Self> {
        // Use default buckets to avoid API differences across crate versions.
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;

        describe_counter!(
            "cluster_messages_assigned_total",
            "Chat messages routed to a cluster, by method"
        );
        describe_counter!(
            "cluster_messages_unassigned_total",
            "Chat messages that arrived while the topic had no clusters"
        );
        describe_counter!("cluster_reseeds_total", "Reseeds applied by the clustering pass");
        describe_histogram!(
            "cluster_assign_duration_ms",
            "Time to assign a message and recompute its cluster"
        );
        describe_gauge!("cluster_topics_active", "Topics currently held in memory");

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
