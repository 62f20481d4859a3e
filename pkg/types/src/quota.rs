use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Resource name → quantity in milli-units (cpu in millicores, memory in bytes).
/// A `BTreeMap` so summaries and serialized output render in a stable order.
pub type ResourceList = BTreeMap<String, i64>;

/// An elastic quota as submitted by the admission pipeline.
///
/// This is the external description of one node in the quota tree. The
/// topology never patches a committed node from it field-by-field; it
/// rebuilds a [`QuotaNode`] wholesale on every add and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticQuota {
    pub name: String,
    /// Parent quota name. Defaulted to the tree root when unset.
    #[serde(default)]
    pub parent: Option<String>,
    /// Forest partition this quota belongs to. Inherited from the parent
    /// when unset and the parent carries one.
    #[serde(default)]
    pub tree_id: Option<String>,
    /// Declared resource ceiling.
    #[serde(default)]
    pub max: ResourceList,
    /// Relative share used when siblings contend for a resource.
    /// Keys must mirror `max`; the defaults resolver repairs drift.
    #[serde(default)]
    pub shared_weight: Option<ResourceList>,
    /// Cluster namespaces bound exclusively to this quota.
    #[serde(default)]
    pub namespaces: Vec<String>,
    /// Free-form metadata. Cosmetic: changes here alone never trigger
    /// revalidation.
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Compare only the fields the topology treats as semantic: name, parent,
/// tree id, max, shared weight, and namespace bindings. `labels` and
/// `created_at` are cosmetic, so an update touching nothing else is
/// accepted without revalidation.
pub fn semantically_equal(a: &ElasticQuota, b: &ElasticQuota) -> bool {
    a.name == b.name
        && a.parent == b.parent
        && a.tree_id == b.tree_id
        && a.max == b.max
        && a.shared_weight == b.shared_weight
        && a.namespaces == b.namespaces
}

/// One committed entry in the quota tree.
///
/// Built from an [`ElasticQuota`] and swapped into the index under the
/// topology lock. Only the cached `is_parent` flag is adjusted in place
/// when the node gains or loses children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaNode {
    pub name: String,
    /// Empty only for the tree root itself.
    pub parent_name: String,
    /// Empty string means "unassigned".
    pub tree_id: String,
    /// Whether this node currently has at least one child.
    pub is_parent: bool,
    pub max: ResourceList,
    pub shared_weight: ResourceList,
    pub namespaces: Vec<String>,
}

impl QuotaNode {
    /// Build a node from its description. An unset parent falls back to
    /// `root_name` (the root itself gets no parent), and an unset shared
    /// weight falls back to `max`.
    pub fn from_quota(quota: &ElasticQuota, root_name: &str) -> Self {
        let parent_name = if quota.name == root_name {
            String::new()
        } else {
            quota
                .parent
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| root_name.to_string())
        };
        QuotaNode {
            name: quota.name.clone(),
            parent_name,
            tree_id: quota.tree_id.clone().unwrap_or_default(),
            is_parent: false,
            max: quota.max.clone(),
            shared_weight: quota
                .shared_weight
                .clone()
                .filter(|w| !w.is_empty())
                .unwrap_or_else(|| quota.max.clone()),
            namespaces: quota.namespaces.clone(),
        }
    }
}

/// Projection of a [`QuotaNode`] served by the diagnostic endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaNodeSummary {
    pub name: String,
    pub parent: String,
    pub tree_id: String,
    pub max: ResourceList,
    pub shared_weight: ResourceList,
    pub namespaces: Vec<String>,
}

impl QuotaNodeSummary {
    pub fn from_node(node: &QuotaNode) -> Self {
        QuotaNodeSummary {
            name: node.name.clone(),
            parent: node.parent_name.clone(),
            tree_id: node.tree_id.clone(),
            max: node.max.clone(),
            shared_weight: node.shared_weight.clone(),
            namespaces: node.namespaces.clone(),
        }
    }
}

/// Deep, lock-consistent copy of the whole quota topology. Shares nothing
/// with the live indices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologySummary {
    /// Quota name → projected node.
    pub nodes: BTreeMap<String, QuotaNodeSummary>,
    /// Quota name → sorted names of its direct children.
    pub children: BTreeMap<String, Vec<String>>,
}

/// Reference to a workload still charged against a quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadRef {
    pub name: String,
    pub namespace: String,
}
