use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// A lightweight, thread-safe metrics registry that renders in Prometheus text exposition format.
pub struct MetricsRegistry {
    counters: RwLock<BTreeMap<String, Counter>>,
    labeled_gauges: RwLock<BTreeMap<String, LabeledGauge>>,
}

/// Monotonically increasing counter.
pub struct Counter {
    value: AtomicU64,
    help: String,
}

/// Gauge with one time series per label set.
pub struct LabeledGauge {
    help: String,
    /// Rendered label pairs (`quota="a",resource="cpu"`) → value.
    series: BTreeMap<String, i64>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(BTreeMap::new()),
            labeled_gauges: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register a counter. If it already exists, this is a no-op.
    pub fn register_counter(&self, name: &str, help: &str) {
        let mut counters = self.counters.write().unwrap();
        counters.entry(name.to_string()).or_insert_with(|| Counter {
            value: AtomicU64::new(0),
            help: help.to_string(),
        });
    }

    /// Register a labeled gauge. If it already exists, this is a no-op.
    pub fn register_labeled_gauge(&self, name: &str, help: &str) {
        let mut gauges = self.labeled_gauges.write().unwrap();
        gauges
            .entry(name.to_string())
            .or_insert_with(|| LabeledGauge {
                help: help.to_string(),
                series: BTreeMap::new(),
            });
    }

    /// Increment a counter by 1.
    pub fn counter_inc(&self, name: &str) {
        let counters = self.counters.read().unwrap();
        if let Some(c) = counters.get(name) {
            c.value.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Set one series of a labeled gauge. Labels are `(key, value)` pairs.
    pub fn gauge_set_labeled(&self, name: &str, labels: &[(&str, &str)], val: i64) {
        let mut gauges = self.labeled_gauges.write().unwrap();
        if let Some(g) = gauges.get_mut(name) {
            g.series.insert(render_labels(labels), val);
        }
    }

    /// Render all metrics in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut output = String::new();

        // Counters
        let counters = self.counters.read().unwrap();
        for (name, counter) in counters.iter() {
            output.push_str(&format!("# HELP {} {}\n", name, counter.help));
            output.push_str(&format!("# TYPE {} counter\n", name));
            output.push_str(&format!(
                "{} {}\n",
                name,
                counter.value.load(Ordering::Relaxed)
            ));
        }

        // Labeled gauges
        let gauges = self.labeled_gauges.read().unwrap();
        for (name, gauge) in gauges.iter() {
            output.push_str(&format!("# HELP {} {}\n", name, gauge.help));
            output.push_str(&format!("# TYPE {} gauge\n", name));
            for (labels, value) in gauge.series.iter() {
                output.push_str(&format!("{}{{{}}} {}\n", name, labels, value));
            }
        }

        output
    }
}

fn render_labels(labels: &[(&str, &str)]) -> String {
    labels
        .iter()
        .map(|(key, value)| format!("{}=\"{}\"", key, value))
        .collect::<Vec<_>>()
        .join(",")
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
