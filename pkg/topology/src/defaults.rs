//! Derived-field reconciliation for quota nodes.

use pkg_types::quota::ResourceList;

/// Keep `shared` on exactly the key set of `max`.
///
/// Keys present in `max` but missing from `shared` are inserted with
/// `max`'s value; keys in `shared` with no counterpart in `max` are
/// dropped. Returns whether anything changed.
pub fn reconcile_shared_weight(shared: &mut ResourceList, max: &ResourceList) -> bool {
    let mut changed = false;
    for (resource, quantity) in max {
        if !shared.contains_key(resource) {
            shared.insert(resource.clone(), *quantity);
            changed = true;
        }
    }
    let stale: Vec<String> = shared
        .keys()
        .filter(|resource| !max.contains_key(*resource))
        .cloned()
        .collect();
    for resource in stale {
        shared.remove(&resource);
        changed = true;
    }
    changed
}
