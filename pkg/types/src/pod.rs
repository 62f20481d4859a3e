use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifecycle phase of a stored pod.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    /// Terminal pods no longer consume quota.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PodPhase::Succeeded | PodPhase::Failed)
    }
}

/// Minimal pod record as persisted in the registry.
///
/// quotad only reads pods, to find workloads still charged against a quota
/// before that quota may be deleted. The binding is carried as a label
/// (`quotad.io/quota-name`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pod {
    pub name: String,
    pub namespace: String,
    /// Labels for selector-based matching
    #[serde(default)]
    pub labels: HashMap<String, String>,
    pub phase: PodPhase,
    pub created_at: DateTime<Utc>,
}
