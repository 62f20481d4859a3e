use anyhow::{Result, anyhow, bail};
use pkg_constants::quota::{ROOT_QUOTA_NAME, is_reserved_quota};
use pkg_types::quota::{
    ElasticQuota, QuotaNode, QuotaNodeSummary, TopologySummary, semantically_equal,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::defaults::reconcile_shared_weight;
use crate::store::{WeightRepairSink, WorkloadStore};
use crate::validate::{check_forbidden_modify, validate_self, validate_transition};

/// The three indices the coordinator arbitrates. Exclusively owned;
/// never aliased outside the lock.
#[derive(Default)]
struct TopologyState {
    /// quota name → committed node
    nodes: HashMap<String, QuotaNode>,
    /// quota name → names of its direct children
    children: HashMap<String, HashSet<String>>,
    /// namespace → owning quota name
    namespace_to_quota: HashMap<String, String>,
}

/// In-memory index of the elastic-quota tree.
///
/// One exclusive lock covers all three indices together: structural
/// changes are rare next to steady-state scheduling traffic, so the single
/// lock wins over finer-grained schemes. Every operation validates fully
/// before touching any index; a failure leaves no observable change.
pub struct QuotaTopology {
    state: Mutex<TopologyState>,
    workloads: Arc<dyn WorkloadStore>,
    repair_sink: Arc<dyn WeightRepairSink>,
}

impl QuotaTopology {
    pub fn new(workloads: Arc<dyn WorkloadStore>, repair_sink: Arc<dyn WeightRepairSink>) -> Self {
        let mut state = TopologyState::default();
        state
            .children
            .insert(ROOT_QUOTA_NAME.to_string(), HashSet::new());
        QuotaTopology {
            state: Mutex::new(state),
            workloads,
            repair_sink,
        }
    }

    /// Admit a new quota into the tree.
    pub async fn add_quota(&self, quota: &ElasticQuota) -> Result<()> {
        let mut state = self.state.lock().await;

        if state.nodes.contains_key(&quota.name) {
            bail!("quota {} already exists", quota.name);
        }
        for namespace in &quota.namespaces {
            if let Some(owner) = state.namespace_to_quota.get(namespace) {
                bail!(
                    "quota {} namespace {} is already bound to quota {}",
                    quota.name,
                    namespace,
                    owner
                );
            }
        }
        validate_self(quota)?;

        let node = QuotaNode::from_quota(quota, ROOT_QUOTA_NAME);
        validate_transition(&state.nodes, &state.children, None, &node)?;

        let state = &mut *state;
        state.children.entry(node.name.clone()).or_default();
        if !node.parent_name.is_empty() {
            state
                .children
                .entry(node.parent_name.clone())
                .or_default()
                .insert(node.name.clone());
            if let Some(parent) = state.nodes.get_mut(&node.parent_name) {
                parent.is_parent = true;
            }
        }
        for namespace in &quota.namespaces {
            state
                .namespace_to_quota
                .insert(namespace.clone(), quota.name.clone());
        }
        info!("added quota {} (parent {})", node.name, node.parent_name);
        state.nodes.insert(node.name.clone(), node);
        Ok(())
    }

    /// Replace an existing quota's committed node, revalidating the
    /// transition from its current shape.
    pub async fn update_quota(&self, old: Option<&ElasticQuota>, new: &ElasticQuota) -> Result<()> {
        if let Some(old) = old {
            if semantically_equal(old, new) {
                return Ok(());
            }
        }
        check_forbidden_modify(new)?;

        let mut state = self.state.lock().await;

        for namespace in &new.namespaces {
            if let Some(owner) = state.namespace_to_quota.get(namespace) {
                if owner != &new.name {
                    bail!(
                        "quota {} namespace {} is already bound to quota {}",
                        new.name,
                        namespace,
                        owner
                    );
                }
            }
        }
        let Some(old_node) = state.nodes.get(&new.name).cloned() else {
            bail!("quota {} not found", new.name);
        };
        validate_self(new)?;

        let mut node = QuotaNode::from_quota(new, ROOT_QUOTA_NAME);
        validate_transition(&state.nodes, &state.children, Some(&old_node), &node)?;

        let state = &mut *state;
        node.is_parent = state
            .children
            .get(&node.name)
            .is_some_and(|direct| !direct.is_empty());

        if old_node.parent_name != node.parent_name {
            if let Some(direct) = state.children.get_mut(&old_node.parent_name) {
                direct.remove(&node.name);
                if direct.is_empty() {
                    if let Some(parent) = state.nodes.get_mut(&old_node.parent_name) {
                        parent.is_parent = false;
                    }
                }
            }
            state
                .children
                .entry(node.parent_name.clone())
                .or_default()
                .insert(node.name.clone());
            if let Some(parent) = state.nodes.get_mut(&node.parent_name) {
                parent.is_parent = true;
            }
        }

        for namespace in &old_node.namespaces {
            state.namespace_to_quota.remove(namespace);
        }
        for namespace in &new.namespaces {
            state
                .namespace_to_quota
                .insert(namespace.clone(), new.name.clone());
        }
        debug!("updated quota {}", node.name);
        state.nodes.insert(node.name.clone(), node);
        Ok(())
    }

    /// Remove a quota from the tree.
    ///
    /// The workload-store call runs while the lock is held: a concurrent
    /// add must not slip a child or binding in between the emptiness
    /// checks and the commit. The store's latency therefore stalls every
    /// other topology operation; callers own any deadline.
    pub async fn delete_quota(&self, name: &str) -> Result<()> {
        if is_reserved_quota(name) {
            bail!("reserved quota {} can not be deleted", name);
        }

        let mut state = self.state.lock().await;

        let Some(node) = state.nodes.get(name) else {
            bail!("quota {} not found", name);
        };
        let parent_name = node.parent_name.clone();
        let namespaces = node.namespaces.clone();
        match state.children.get(name) {
            Some(direct) if !direct.is_empty() => {
                bail!("quota {} still has {} child quotas", name, direct.len());
            }
            Some(_) => {}
            None => bail!(
                "quota index out of sync: {} has a node entry but no children entry",
                name
            ),
        }

        let workloads = self
            .workloads
            .list_bound_workloads(name)
            .await
            .map_err(|e| anyhow!("failed to list workloads for quota {}: {}", name, e))?;
        if !workloads.is_empty() {
            let mut sample: Vec<&str> = workloads.iter().take(2).map(|w| w.name.as_str()).collect();
            if workloads.len() > 2 {
                sample.push("...");
            }
            bail!(
                "quota {} still has {} bound workloads: {}",
                name,
                workloads.len(),
                sample.join(", ")
            );
        }

        let state = &mut *state;
        if let Some(direct) = state.children.get_mut(&parent_name) {
            direct.remove(name);
            if direct.is_empty() {
                if let Some(parent) = state.nodes.get_mut(&parent_name) {
                    parent.is_parent = false;
                }
            }
        }
        state.children.remove(name);
        state.nodes.remove(name);
        for namespace in &namespaces {
            state.namespace_to_quota.remove(namespace);
        }
        info!("deleted quota {}", name);
        Ok(())
    }

    /// Fill derived fields on a candidate before it is persisted: the
    /// parent defaults to the root, an unassigned tree id is inherited
    /// from the parent, and the shared weight is reconciled against the
    /// declared max.
    pub async fn fill_defaults(&self, quota: &mut ElasticQuota) -> Result<()> {
        if quota.name == ROOT_QUOTA_NAME {
            return Ok(());
        }
        let state = self.state.lock().await;

        if quota.parent.as_deref().unwrap_or("").is_empty() {
            quota.parent = Some(ROOT_QUOTA_NAME.to_string());
            debug!("defaulted quota {} parent to {}", quota.name, ROOT_QUOTA_NAME);
        }
        let parent = quota.parent.as_deref().unwrap_or(ROOT_QUOTA_NAME);

        if quota.tree_id.as_deref().unwrap_or("").is_empty() && parent != ROOT_QUOTA_NAME {
            let Some(parent_node) = state.nodes.get(parent) else {
                bail!(
                    "can not fill defaults for quota {}: parent {} not found",
                    quota.name,
                    parent
                );
            };
            if !parent_node.tree_id.is_empty() {
                quota.tree_id = Some(parent_node.tree_id.clone());
                debug!(
                    "quota {} inherited tree id {} from {}",
                    quota.name, parent_node.tree_id, parent
                );
            }
        }

        let needs_default = quota
            .shared_weight
            .as_ref()
            .is_none_or(|weight| weight.is_empty());
        if needs_default {
            quota.shared_weight = Some(quota.max.clone());
            self.repair_sink.record_weight_repair(&quota.name, &quota.max);
            debug!("defaulted quota {} shared weight to max", quota.name);
        } else if let Some(weight) = quota.shared_weight.as_mut() {
            if reconcile_shared_weight(weight, &quota.max) {
                self.repair_sink.record_weight_repair(&quota.name, weight);
                debug!("repaired quota {} shared weight against max", quota.name);
            }
        }
        Ok(())
    }

    /// Resolve a node by name, falling back to the namespace binding.
    /// Returns a clone; callers never alias the live indices.
    pub async fn get_node(&self, name: &str, namespace: &str) -> Option<QuotaNode> {
        let state = self.state.lock().await;
        if let Some(node) = state.nodes.get(name) {
            return Some(node.clone());
        }
        let owner = state.namespace_to_quota.get(namespace)?;
        state.nodes.get(owner).cloned()
    }

    /// Deep, lock-consistent snapshot of the whole topology.
    pub async fn summarize(&self) -> TopologySummary {
        let state = self.state.lock().await;
        let mut summary = TopologySummary::default();
        for (name, node) in &state.nodes {
            summary
                .nodes
                .insert(name.clone(), QuotaNodeSummary::from_node(node));
        }
        for (name, direct) in &state.children {
            let mut names: Vec<String> = direct.iter().cloned().collect();
            names.sort();
            summary.children.insert(name.clone(), names);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NoopRepairSink;
    use async_trait::async_trait;
    use chrono::Utc;
    use pkg_constants::quota::{DEFAULT_QUOTA_NAME, SYSTEM_QUOTA_NAME};
    use pkg_types::quota::{ResourceList, WorkloadRef};
    use std::sync::Mutex as StdMutex;

    struct FixedWorkloads(Vec<WorkloadRef>);

    #[async_trait]
    impl WorkloadStore for FixedWorkloads {
        async fn list_bound_workloads(&self, _quota_name: &str) -> Result<Vec<WorkloadRef>> {
            Ok(self.0.clone())
        }
    }

    struct FailingWorkloads;

    #[async_trait]
    impl WorkloadStore for FailingWorkloads {
        async fn list_bound_workloads(&self, _quota_name: &str) -> Result<Vec<WorkloadRef>> {
            bail!("registry unavailable")
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        repairs: StdMutex<Vec<(String, ResourceList)>>,
    }

    impl WeightRepairSink for RecordingSink {
        fn record_weight_repair(&self, quota_name: &str, weight: &ResourceList) {
            self.repairs
                .lock()
                .unwrap()
                .push((quota_name.to_string(), weight.clone()));
        }
    }

    fn resources(pairs: &[(&str, i64)]) -> ResourceList {
        pairs
            .iter()
            .map(|(name, quantity)| (name.to_string(), *quantity))
            .collect()
    }

    fn quota(name: &str, parent: &str) -> ElasticQuota {
        ElasticQuota {
            name: name.to_string(),
            parent: Some(parent.to_string()),
            tree_id: None,
            max: resources(&[("cpu", 10_000), ("memory", 20_000)]),
            shared_weight: None,
            namespaces: vec![],
            labels: Default::default(),
            created_at: Utc::now(),
        }
    }

    fn topology() -> QuotaTopology {
        QuotaTopology::new(Arc::new(FixedWorkloads(vec![])), Arc::new(NoopRepairSink))
    }

    fn workload(name: &str) -> WorkloadRef {
        WorkloadRef {
            name: name.to_string(),
            namespace: "ns-a".to_string(),
        }
    }

    #[tokio::test]
    async fn add_then_get_returns_resolved_fields() {
        let topology = topology();
        let mut q = quota("team-a", ROOT_QUOTA_NAME);
        q.namespaces.push("ns-a".to_string());
        topology.add_quota(&q).await.unwrap();

        let node = topology.get_node("team-a", "").await.unwrap();
        assert_eq!(node.name, "team-a");
        assert_eq!(node.parent_name, ROOT_QUOTA_NAME);
        assert_eq!(node.max, q.max);
        assert_eq!(node.shared_weight, q.max);
        assert_eq!(node.namespaces, vec!["ns-a".to_string()]);
    }

    #[tokio::test]
    async fn add_with_missing_parent_mutates_nothing() {
        let topology = topology();
        let before = topology.summarize().await;

        let err = topology
            .add_quota(&quota("team-a", "nonexistent"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("parent nonexistent not found"));
        assert_eq!(topology.summarize().await, before);
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let topology = topology();
        topology.add_quota(&quota("team-a", ROOT_QUOTA_NAME)).await.unwrap();
        let err = topology
            .add_quota(&quota("team-a", ROOT_QUOTA_NAME))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn second_namespace_claim_is_rejected() {
        let topology = topology();
        let mut first = quota("team-a", ROOT_QUOTA_NAME);
        first.namespaces.push("shared-ns".to_string());
        topology.add_quota(&first).await.unwrap();

        let mut second = quota("team-b", ROOT_QUOTA_NAME);
        second.namespaces.push("shared-ns".to_string());
        let err = topology.add_quota(&second).await.unwrap_err();
        assert!(err.to_string().contains("already bound to quota team-a"));

        // first binding intact
        let node = topology.get_node("", "shared-ns").await.unwrap();
        assert_eq!(node.name, "team-a");
    }

    #[tokio::test]
    async fn delete_with_children_fails_regardless_of_workloads() {
        let topology = QuotaTopology::new(
            Arc::new(FixedWorkloads(vec![workload("pod-1")])),
            Arc::new(NoopRepairSink),
        );
        topology.add_quota(&quota("parent", ROOT_QUOTA_NAME)).await.unwrap();
        topology.add_quota(&quota("child", "parent")).await.unwrap();

        let err = topology.delete_quota("parent").await.unwrap_err();
        assert!(err.to_string().contains("1 child quotas"));
        assert!(topology.get_node("parent", "").await.is_some());
    }

    #[tokio::test]
    async fn delete_with_bound_workloads_reports_capped_sample() {
        let topology = QuotaTopology::new(
            Arc::new(FixedWorkloads(vec![
                workload("pod-1"),
                workload("pod-2"),
                workload("pod-3"),
            ])),
            Arc::new(NoopRepairSink),
        );
        topology.add_quota(&quota("team-a", ROOT_QUOTA_NAME)).await.unwrap();

        let err = topology.delete_quota("team-a").await.unwrap_err().to_string();
        assert!(err.contains("3 bound workloads"));
        assert!(err.contains("pod-1, pod-2, ..."));
        assert!(!err.contains("pod-3"));
    }

    #[tokio::test]
    async fn delete_with_two_workloads_shows_both_names() {
        let topology = QuotaTopology::new(
            Arc::new(FixedWorkloads(vec![workload("pod-1"), workload("pod-2")])),
            Arc::new(NoopRepairSink),
        );
        topology.add_quota(&quota("team-a", ROOT_QUOTA_NAME)).await.unwrap();

        let err = topology.delete_quota("team-a").await.unwrap_err().to_string();
        assert!(err.contains("pod-1, pod-2"));
        assert!(!err.contains("..."));
    }

    #[tokio::test]
    async fn workload_store_failure_propagates() {
        let topology =
            QuotaTopology::new(Arc::new(FailingWorkloads), Arc::new(NoopRepairSink));
        topology.add_quota(&quota("team-a", ROOT_QUOTA_NAME)).await.unwrap();

        let err = topology.delete_quota("team-a").await.unwrap_err().to_string();
        assert!(err.contains("failed to list workloads for quota team-a"));
        assert!(err.contains("registry unavailable"));
        assert!(topology.get_node("team-a", "").await.is_some());
    }

    #[tokio::test]
    async fn reserved_quotas_can_not_be_deleted() {
        let topology = topology();
        for name in [ROOT_QUOTA_NAME, SYSTEM_QUOTA_NAME, DEFAULT_QUOTA_NAME] {
            let err = topology.delete_quota(name).await.unwrap_err();
            assert!(err.to_string().contains("can not be deleted"));
        }
    }

    #[tokio::test]
    async fn delete_clears_every_index_entry() {
        let topology = topology();
        topology.add_quota(&quota("parent", ROOT_QUOTA_NAME)).await.unwrap();
        let mut child = quota("child", "parent");
        child.namespaces.push("ns-child".to_string());
        topology.add_quota(&child).await.unwrap();
        assert!(topology.get_node("parent", "").await.unwrap().is_parent);

        topology.delete_quota("child").await.unwrap();

        let summary = topology.summarize().await;
        assert!(!summary.nodes.contains_key("child"));
        assert!(!summary.children.contains_key("child"));
        assert!(summary.children["parent"].is_empty());
        assert!(topology.get_node("", "ns-child").await.is_none());
        assert!(!topology.get_node("parent", "").await.unwrap().is_parent);
    }

    #[tokio::test]
    async fn cosmetic_update_is_a_noop() {
        let topology = topology();
        let q = quota("team-a", ROOT_QUOTA_NAME);
        topology.add_quota(&q).await.unwrap();
        let before = topology.summarize().await;

        let mut cosmetic = q.clone();
        cosmetic.labels.insert("owner".to_string(), "platform".to_string());
        topology.update_quota(Some(&q), &cosmetic).await.unwrap();

        assert_eq!(topology.summarize().await, before);
    }

    #[tokio::test]
    async fn update_of_unknown_quota_fails() {
        let topology = topology();
        let err = topology
            .update_quota(None, &quota("ghost", ROOT_QUOTA_NAME))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn root_update_is_forbidden() {
        let topology = topology();
        let err = topology
            .update_quota(None, &quota(ROOT_QUOTA_NAME, ROOT_QUOTA_NAME))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("managed by the system"));
    }

    #[tokio::test]
    async fn reparent_moves_child_and_rebinds_namespaces() {
        let topology = topology();
        topology.add_quota(&quota("org-a", ROOT_QUOTA_NAME)).await.unwrap();
        topology.add_quota(&quota("org-b", ROOT_QUOTA_NAME)).await.unwrap();
        let mut q = quota("team", "org-a");
        q.namespaces = vec!["ns-keep".to_string(), "ns-drop".to_string()];
        topology.add_quota(&q).await.unwrap();

        let mut moved = q.clone();
        moved.parent = Some("org-b".to_string());
        moved.namespaces = vec!["ns-keep".to_string(), "ns-new".to_string()];
        topology.update_quota(Some(&q), &moved).await.unwrap();

        let summary = topology.summarize().await;
        assert!(summary.children["org-a"].is_empty());
        assert_eq!(summary.children["org-b"], vec!["team".to_string()]);
        assert!(!summary.nodes["org-a"].max.is_empty()); // org-a itself untouched
        assert!(!topology.get_node("org-a", "").await.unwrap().is_parent);
        assert!(topology.get_node("org-b", "").await.unwrap().is_parent);

        assert_eq!(topology.get_node("", "ns-keep").await.unwrap().name, "team");
        assert_eq!(topology.get_node("", "ns-new").await.unwrap().name, "team");
        assert!(topology.get_node("", "ns-drop").await.is_none());
    }

    #[tokio::test]
    async fn reparent_under_own_descendant_is_rejected() {
        let topology = topology();
        topology.add_quota(&quota("a", ROOT_QUOTA_NAME)).await.unwrap();
        topology.add_quota(&quota("b", "a")).await.unwrap();
        topology.add_quota(&quota("c", "b")).await.unwrap();

        let old = quota("a", ROOT_QUOTA_NAME);
        let mut moved = old.clone();
        moved.parent = Some("c".to_string());
        let err = topology.update_quota(Some(&old), &moved).await.unwrap_err();
        assert!(err.to_string().contains("cycle"));

        // tree unchanged
        let summary = topology.summarize().await;
        assert_eq!(summary.nodes["a"].parent, ROOT_QUOTA_NAME);
    }

    #[tokio::test]
    async fn update_preserves_is_parent_flag() {
        let topology = topology();
        topology.add_quota(&quota("parent", ROOT_QUOTA_NAME)).await.unwrap();
        topology.add_quota(&quota("child", "parent")).await.unwrap();

        let old = quota("parent", ROOT_QUOTA_NAME);
        let mut updated = old.clone();
        updated.max = resources(&[("cpu", 99_000)]);
        topology.update_quota(Some(&old), &updated).await.unwrap();

        let node = topology.get_node("parent", "").await.unwrap();
        assert!(node.is_parent);
        assert_eq!(node.max, resources(&[("cpu", 99_000)]));
    }

    #[tokio::test]
    async fn fill_defaults_assigns_parent_and_inherits_tree_id() {
        let topology = topology();
        let mut org = quota("org-a", ROOT_QUOTA_NAME);
        org.tree_id = Some("forest-1".to_string());
        topology.add_quota(&org).await.unwrap();

        let mut team = quota("team", "org-a");
        topology.fill_defaults(&mut team).await.unwrap();
        assert_eq!(team.tree_id.as_deref(), Some("forest-1"));

        let mut unparented = quota("floater", "");
        unparented.parent = None;
        topology.fill_defaults(&mut unparented).await.unwrap();
        assert_eq!(unparented.parent.as_deref(), Some(ROOT_QUOTA_NAME));
    }

    #[tokio::test]
    async fn fill_defaults_fails_for_missing_parent() {
        let topology = topology();
        let mut orphan = quota("orphan", "nonexistent");
        let err = topology.fill_defaults(&mut orphan).await.unwrap_err();
        assert!(err.to_string().contains("parent nonexistent not found"));
    }

    #[tokio::test]
    async fn fill_defaults_repairs_shared_weight_and_notifies_sink() {
        let sink = Arc::new(RecordingSink::default());
        let topology =
            QuotaTopology::new(Arc::new(FixedWorkloads(vec![])), sink.clone());

        // no declared weight: defaulted to max, one repair recorded
        let mut q = quota("team-a", ROOT_QUOTA_NAME);
        topology.fill_defaults(&mut q).await.unwrap();
        assert_eq!(q.shared_weight.as_ref(), Some(&q.max));

        // drifted weight: stale key dropped, declared value kept
        let mut q = quota("team-b", ROOT_QUOTA_NAME);
        q.max = resources(&[("cpu", 10_000)]);
        q.shared_weight = Some(resources(&[("cpu", 5_000), ("memory", 99_000)]));
        topology.fill_defaults(&mut q).await.unwrap();
        assert_eq!(q.shared_weight, Some(resources(&[("cpu", 5_000)])));

        // aligned weight: untouched, no extra repair
        let mut q = quota("team-c", ROOT_QUOTA_NAME);
        q.shared_weight = Some(q.max.clone());
        topology.fill_defaults(&mut q).await.unwrap();

        let repairs = sink.repairs.lock().unwrap();
        assert_eq!(repairs.len(), 2);
        assert_eq!(repairs[0].0, "team-a");
        assert_eq!(repairs[1].0, "team-b");
        assert_eq!(repairs[1].1, resources(&[("cpu", 5_000)]));
    }

    #[tokio::test]
    async fn root_fill_defaults_is_a_noop() {
        let topology = topology();
        let mut root = quota(ROOT_QUOTA_NAME, "");
        root.parent = None;
        topology.fill_defaults(&mut root).await.unwrap();
        assert!(root.parent.is_none());
        assert!(root.shared_weight.is_none());
    }

    #[tokio::test]
    async fn get_node_resolves_namespace_binding() {
        let topology = topology();
        let mut q = quota("team-a", ROOT_QUOTA_NAME);
        q.namespaces.push("ns-a".to_string());
        topology.add_quota(&q).await.unwrap();

        assert_eq!(topology.get_node("", "ns-a").await.unwrap().name, "team-a");
        assert!(topology.get_node("", "ns-unknown").await.is_none());
        assert!(topology.get_node("ghost", "ns-unknown").await.is_none());
    }

    #[tokio::test]
    async fn concurrent_adds_of_distinct_quotas_all_land() {
        let topology = Arc::new(topology());
        let mut handles = Vec::new();
        for i in 0..16 {
            let topology = topology.clone();
            handles.push(tokio::spawn(async move {
                topology
                    .add_quota(&quota(&format!("team-{i}"), ROOT_QUOTA_NAME))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(topology.summarize().await.nodes.len(), 16);
    }

    #[tokio::test]
    async fn concurrent_adds_of_same_name_have_one_winner() {
        let topology = Arc::new(topology());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let topology = topology.clone();
            handles.push(tokio::spawn(async move {
                topology.add_quota(&quota("contended", ROOT_QUOTA_NAME)).await
            }));
        }
        let mut won = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                won += 1;
            }
        }
        assert_eq!(won, 1);
        assert_eq!(topology.summarize().await.nodes.len(), 1);
    }
}
