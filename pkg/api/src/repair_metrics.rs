use std::sync::Arc;

use pkg_metrics::MetricsRegistry;
use pkg_topology::WeightRepairSink;
use pkg_types::quota::ResourceList;

pub const SHARED_WEIGHT_GAUGE: &str = "quota_shared_weight";
pub const REPAIRS_COUNTER: &str = "quota_shared_weight_repairs_total";

/// Publishes shared-weight defaulting and repair events to the metrics
/// registry.
pub struct RepairMetrics {
    registry: Arc<MetricsRegistry>,
}

impl RepairMetrics {
    pub fn new(registry: Arc<MetricsRegistry>) -> Self {
        registry.register_counter(
            REPAIRS_COUNTER,
            "Number of times a quota's shared weight was defaulted or repaired",
        );
        registry.register_labeled_gauge(
            SHARED_WEIGHT_GAUGE,
            "Effective shared weight per quota and resource",
        );
        Self { registry }
    }
}

impl WeightRepairSink for RepairMetrics {
    fn record_weight_repair(&self, quota_name: &str, weight: &ResourceList) {
        self.registry.counter_inc(REPAIRS_COUNTER);
        for (resource, quantity) in weight {
            self.registry.gauge_set_labeled(
                SHARED_WEIGHT_GAUGE,
                &[("quota", quota_name), ("resource", resource)],
                *quantity,
            );
        }
    }
}
