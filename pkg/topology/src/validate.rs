//! Tree-shape and naming invariants for the quota topology.
//!
//! Everything here is purely functional over the snapshots it is given;
//! the coordinator alone commits results to the indices.

use anyhow::{Result, bail};
use pkg_constants::quota::{DEFAULT_QUOTA_NAME, ROOT_QUOTA_NAME, SYSTEM_QUOTA_NAME};
use pkg_types::quota::{ElasticQuota, QuotaNode};
use pkg_types::validate::validate_name;
use std::collections::{HashMap, HashSet};

/// Structural checks confined to the candidate itself, independent of the
/// rest of the tree.
pub fn validate_self(quota: &ElasticQuota) -> Result<()> {
    validate_name(&quota.name)?;
    for namespace in &quota.namespaces {
        if let Err(e) = validate_name(namespace) {
            bail!("quota {} declares an invalid namespace: {}", quota.name, e);
        }
    }
    for (resource, quantity) in &quota.max {
        if *quantity < 0 {
            bail!(
                "quota {} max for {} must not be negative (got {})",
                quota.name,
                resource,
                quantity
            );
        }
    }
    if let Some(weight) = &quota.shared_weight {
        for (resource, quantity) in weight {
            if *quantity < 0 {
                bail!(
                    "quota {} shared weight for {} must not be negative (got {})",
                    quota.name,
                    resource,
                    quantity
                );
            }
        }
    }
    Ok(())
}

/// The root quota is system-managed; the admission path may not modify it.
pub fn check_forbidden_modify(quota: &ElasticQuota) -> Result<()> {
    if quota.name == ROOT_QUOTA_NAME {
        bail!("quota {} is managed by the system and can not be modified", quota.name);
    }
    Ok(())
}

/// Validate introducing (`old` is `None`) or replacing a node against the
/// current tree shape.
///
/// For an add the candidate has no children yet, so only parent existence
/// matters. For an update the new parent must additionally not sit inside
/// the candidate's own subtree, reserved nodes must stay under the root,
/// and a resolved tree id must not be cleared.
pub fn validate_transition(
    nodes: &HashMap<String, QuotaNode>,
    children: &HashMap<String, HashSet<String>>,
    old: Option<&QuotaNode>,
    new: &QuotaNode,
) -> Result<()> {
    if new.name == ROOT_QUOTA_NAME {
        return Ok(());
    }

    if new.parent_name != ROOT_QUOTA_NAME && !nodes.contains_key(&new.parent_name) {
        bail!("quota {} parent {} not found", new.name, new.parent_name);
    }

    let Some(old) = old else {
        return Ok(());
    };

    if old.parent_name != new.parent_name {
        if new.name == SYSTEM_QUOTA_NAME || new.name == DEFAULT_QUOTA_NAME {
            bail!("reserved quota {} can not be reparented", new.name);
        }
        if new.parent_name == new.name || is_descendant(children, &new.name, &new.parent_name) {
            bail!(
                "quota {} can not be moved under {}: the move would create a cycle",
                new.name,
                new.parent_name
            );
        }
    }

    if !old.tree_id.is_empty() && new.tree_id.is_empty() {
        bail!("quota {} tree id can not be cleared once assigned", new.name);
    }
    Ok(())
}

/// Whether `candidate` lies anywhere in the subtree rooted at `root`
/// (`root` itself excluded).
fn is_descendant(
    children: &HashMap<String, HashSet<String>>,
    root: &str,
    candidate: &str,
) -> bool {
    let mut stack: Vec<&str> = match children.get(root) {
        Some(direct) => direct.iter().map(String::as_str).collect(),
        None => return false,
    };
    while let Some(name) = stack.pop() {
        if name == candidate {
            return true;
        }
        if let Some(direct) = children.get(name) {
            stack.extend(direct.iter().map(String::as_str));
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pkg_types::quota::ResourceList;

    fn quota(name: &str) -> ElasticQuota {
        ElasticQuota {
            name: name.to_string(),
            parent: None,
            tree_id: None,
            max: ResourceList::from([("cpu".to_string(), 10_000)]),
            shared_weight: None,
            namespaces: vec![],
            labels: Default::default(),
            created_at: Utc::now(),
        }
    }

    fn tree(edges: &[(&str, &str)]) -> HashMap<String, HashSet<String>> {
        let mut children: HashMap<String, HashSet<String>> = HashMap::new();
        for (parent, child) in edges {
            children
                .entry(parent.to_string())
                .or_default()
                .insert(child.to_string());
        }
        children
    }

    #[test]
    fn rejects_negative_quantities() {
        let mut q = quota("team-a");
        q.max.insert("memory".to_string(), -1);
        assert!(validate_self(&q).is_err());

        let mut q = quota("team-a");
        q.shared_weight = Some(ResourceList::from([("cpu".to_string(), -5)]));
        assert!(validate_self(&q).is_err());
    }

    #[test]
    fn rejects_invalid_namespace_names() {
        let mut q = quota("team-a");
        q.namespaces.push("Bad_Namespace".to_string());
        let err = validate_self(&q).unwrap_err().to_string();
        assert!(err.contains("invalid namespace"));
    }

    #[test]
    fn descendant_walk_covers_deep_subtrees() {
        let children = tree(&[("a", "b"), ("b", "c"), ("c", "d")]);
        assert!(is_descendant(&children, "a", "d"));
        assert!(is_descendant(&children, "b", "c"));
        assert!(!is_descendant(&children, "c", "a"));
        assert!(!is_descendant(&children, "a", "a"));
    }

    #[test]
    fn root_modification_is_forbidden() {
        assert!(check_forbidden_modify(&quota(ROOT_QUOTA_NAME)).is_err());
        assert!(check_forbidden_modify(&quota("team-a")).is_ok());
    }
}
