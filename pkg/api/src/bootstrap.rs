use anyhow::Result;
use pkg_constants::quota::ROOT_QUOTA_NAME;
use pkg_constants::state::QUOTA_PREFIX;
use pkg_state::client::StateStore;
use pkg_topology::QuotaTopology;
use pkg_types::quota::ElasticQuota;
use tracing::{info, warn};

/// Rebuild the in-memory topology from the quota registry at startup.
pub async fn load_topology(store: &StateStore, topology: &QuotaTopology) -> Result<usize> {
    let entries = store.list_prefix(QUOTA_PREFIX).await?;
    let mut pending = Vec::new();
    for (key, value) in entries {
        match serde_json::from_slice::<ElasticQuota>(&value) {
            Ok(quota) => pending.push(quota),
            Err(e) => warn!("skipping undecodable quota at {}: {}", key, e),
        }
    }
    let total = pending.len();
    let admitted = admit_all(pending, topology).await;
    info!("admitted {}/{} quotas from the registry", admitted, total);
    Ok(admitted)
}

/// Admit stored quotas in dependency order.
///
/// The registry lists quotas in key order, so a child can show up before
/// its parent. Admission runs in passes: each pass admits every quota
/// whose parent is already in the tree, until a pass makes no progress.
/// Leftovers reference a parent that never appears and are skipped.
pub async fn admit_all(mut pending: Vec<ElasticQuota>, topology: &QuotaTopology) -> usize {
    let mut admitted = 0;
    loop {
        let mut progressed = false;
        let mut retry = Vec::new();
        for mut quota in pending {
            let parent_known = match quota.parent.as_deref() {
                None | Some("") | Some(ROOT_QUOTA_NAME) => true,
                Some(parent) => topology.get_node(parent, "").await.is_some(),
            };
            if !parent_known && quota.name != ROOT_QUOTA_NAME {
                retry.push(quota);
                continue;
            }
            progressed = true;
            match admit(&mut quota, topology).await {
                Ok(()) => admitted += 1,
                Err(e) => warn!("dropping quota {}: {}", quota.name, e),
            }
        }
        pending = retry;
        if pending.is_empty() || !progressed {
            break;
        }
    }
    for quota in &pending {
        warn!(
            "skipping quota {}: parent {} never appeared in the registry",
            quota.name,
            quota.parent.as_deref().unwrap_or("")
        );
    }
    admitted
}

async fn admit(quota: &mut ElasticQuota, topology: &QuotaTopology) -> Result<()> {
    topology.fill_defaults(quota).await?;
    topology.add_quota(quota).await
}
