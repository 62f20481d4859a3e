use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::AppState;
use crate::bootstrap::load_topology;
use crate::handlers::{quotas, system};
use crate::repair_metrics::RepairMetrics;
use crate::workloads::RegistryWorkloads;
use pkg_metrics::MetricsRegistry;
use pkg_state::client::StateStore;
use pkg_topology::QuotaTopology;

/// Server configuration passed from the binary's CLI.
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub data_dir: String,
}

pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Initialize core subsystems
    let store = StateStore::new(&config.data_dir).await?;
    let metrics = Arc::new(MetricsRegistry::new());
    let workloads = Arc::new(RegistryWorkloads::new(store.clone()));
    let repair_sink = Arc::new(RepairMetrics::new(metrics.clone()));
    let topology = Arc::new(QuotaTopology::new(workloads, repair_sink));

    // Rebuild the in-memory quota tree from the registry
    load_topology(&store, &topology).await?;

    let state = AppState {
        store,
        topology,
        metrics,
    };

    let app = Router::new()
        .route("/healthz", get(system::healthz))
        .route("/metrics", get(system::metrics))
        .route("/apis/v1/topology", get(quotas::get_topology))
        .route("/apis/v1/quotas", get(quotas::lookup_quota))
        .route("/apis/v1/quotas/{name}", get(quotas::get_quota))
        .with_state(state);

    info!("Starting diagnostic API server on {}", config.addr);
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
