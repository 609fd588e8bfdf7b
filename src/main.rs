//! Opinion cluster engine — binary entrypoint.
//! Boots the Axum HTTP server with the in-memory topic registry.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    opinion_clusters::logging::init_tracing();

    let router = opinion_clusters::app()
        .await
        .context("building application router")?;

    Ok(router.into())
}
