use anyhow::Result;
use async_trait::async_trait;
use pkg_constants::quota::LABEL_QUOTA_NAME;
use pkg_constants::state::POD_PREFIX;
use pkg_state::client::StateStore;
use pkg_topology::WorkloadStore;
use pkg_types::pod::Pod;
use pkg_types::quota::WorkloadRef;

/// Workload store backed by the pod registry.
///
/// A pod counts against the quota named by its `quotad.io/quota-name`
/// label until it reaches a terminal phase. Undecodable registry entries
/// are skipped rather than failing the whole listing.
pub struct RegistryWorkloads {
    store: StateStore,
}

impl RegistryWorkloads {
    pub fn new(store: StateStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl WorkloadStore for RegistryWorkloads {
    async fn list_bound_workloads(&self, quota_name: &str) -> Result<Vec<WorkloadRef>> {
        let entries = self.store.list_prefix(POD_PREFIX).await?;
        let mut refs = Vec::new();
        for (_, value) in entries {
            let pod: Pod = match serde_json::from_slice(&value) {
                Ok(pod) => pod,
                Err(_) => continue,
            };
            if pod.phase.is_terminal() {
                continue;
            }
            if pod.labels.get(LABEL_QUOTA_NAME).is_some_and(|q| q == quota_name) {
                refs.push(WorkloadRef {
                    name: pod.name,
                    namespace: pod.namespace,
                });
            }
        }
        Ok(refs)
    }
}
