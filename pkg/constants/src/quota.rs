//! Elastic quota tree constants.

/// Name of the root of the quota tree. Reserved, never deletable.
pub const ROOT_QUOTA_NAME: &str = "root";

/// Quota that system workloads are charged against. Reserved, never deletable.
pub const SYSTEM_QUOTA_NAME: &str = "system";

/// Fallback quota for workloads with no explicit binding. Reserved, never deletable.
pub const DEFAULT_QUOTA_NAME: &str = "default";

/// Label on a quota object naming its parent quota.
pub const LABEL_QUOTA_PARENT: &str = "quotad.io/parent";

/// Label on a quota object naming the quota forest it belongs to.
pub const LABEL_QUOTA_TREE_ID: &str = "quotad.io/tree-id";

/// Label on a pod naming the quota it is charged against.
pub const LABEL_QUOTA_NAME: &str = "quotad.io/quota-name";

/// Whether `name` is one of the three reserved anchor quotas.
pub fn is_reserved_quota(name: &str) -> bool {
    name == ROOT_QUOTA_NAME || name == SYSTEM_QUOTA_NAME || name == DEFAULT_QUOTA_NAME
}
