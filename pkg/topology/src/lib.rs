//! In-memory quota topology: the authoritative index of the elastic-quota
//! tree and the arbiter of structural changes to it.
//!
//! The [`QuotaTopology`] coordinator owns three indices (node-by-name,
//! children-by-parent, quota-by-namespace) behind one exclusive lock and
//! composes the validator and defaults resolver around atomic
//! validate-then-commit updates.

pub mod defaults;
pub mod store;
pub mod topology;
pub mod validate;

pub use store::{NoopRepairSink, WeightRepairSink, WorkloadStore};
pub use topology::QuotaTopology;
