//! State store key layout.

/// Registry prefix for persisted quota objects, keyed by quota name.
pub const QUOTA_PREFIX: &str = "/registry/quotas/";

/// Registry prefix for persisted pods, keyed by `{namespace}/{name}`.
pub const POD_PREFIX: &str = "/registry/pods/";
