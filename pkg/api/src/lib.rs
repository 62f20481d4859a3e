pub mod bootstrap;
pub mod handlers;
pub mod repair_metrics;
pub mod server;
pub mod workloads;

use std::sync::Arc;

use pkg_metrics::MetricsRegistry;
use pkg_state::client::StateStore;
use pkg_topology::QuotaTopology;

/// Shared application state injected into all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: StateStore,
    pub topology: Arc<QuotaTopology>,
    pub metrics: Arc<MetricsRegistry>,
}
