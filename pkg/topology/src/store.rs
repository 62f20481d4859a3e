use anyhow::Result;
use async_trait::async_trait;
use pkg_types::quota::{ResourceList, WorkloadRef};

/// Read access to the cluster's workload inventory.
///
/// Consulted only while validating a quota delete. The call runs with the
/// topology lock held so a concurrent add cannot race the emptiness check;
/// a slow store stalls other topology operations for that long. Errors are
/// surfaced to the caller verbatim and never retried here.
#[async_trait]
pub trait WorkloadStore: Send + Sync {
    /// List workloads currently charged against `quota_name`.
    async fn list_bound_workloads(&self, quota_name: &str) -> Result<Vec<WorkloadRef>>;
}

/// Notification target for shared-weight defaulting and repair.
/// Implementations are infallible; topology correctness never depends on
/// the sink.
pub trait WeightRepairSink: Send + Sync {
    fn record_weight_repair(&self, quota_name: &str, weight: &ResourceList);
}

/// Sink that drops every notification. Used when no metrics backend is wired.
pub struct NoopRepairSink;

impl WeightRepairSink for NoopRepairSink {
    fn record_weight_repair(&self, _quota_name: &str, _weight: &ResourceList) {}
}
