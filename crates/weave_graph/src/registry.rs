//! Bidirectional upstream/downstream edge store.

use std::collections::{BTreeMap, BTreeSet};

use weave_common::MetadataId;

use crate::error::GraphError;

/// Many-to-many store of `(upstream, downstream)` edges.
///
/// Both directions are indexed so that "who depends on X" and "what does X
/// depend on" are map lookups. Ordered collections keep every query result
/// deterministic. The registry does not look for cycles longer than a
/// self-edge; callers guard against recursion.
#[derive(Debug, Default, Clone)]
pub struct DependencyRegistry {
    /// Upstream MID to the MIDs that depend on it.
    downstream: BTreeMap<MetadataId, BTreeSet<MetadataId>>,
    /// Downstream MID to the MIDs it depends on.
    upstream: BTreeMap<MetadataId, BTreeSet<MetadataId>>,
}

impl DependencyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `downstream` must be recomputed when `upstream` changes.
    ///
    /// Returns `Ok(true)` if the edge is new and `Ok(false)` if it was already
    /// present.
    pub fn register(
        &mut self,
        upstream: &MetadataId,
        downstream: &MetadataId,
    ) -> Result<bool, GraphError> {
        if upstream == downstream {
            return Err(GraphError::SelfLoop(upstream.clone()));
        }
        let inserted = self
            .downstream
            .entry(upstream.clone())
            .or_default()
            .insert(downstream.clone());
        self.upstream
            .entry(downstream.clone())
            .or_default()
            .insert(upstream.clone());
        if inserted {
            tracing::trace!(%upstream, %downstream, "registered dependency");
        }
        Ok(inserted)
    }

    /// Removes a single edge. Returns `true` if it existed.
    pub fn deregister(&mut self, upstream: &MetadataId, downstream: &MetadataId) -> bool {
        let removed = remove_from(&mut self.downstream, upstream, downstream);
        remove_from(&mut self.upstream, downstream, upstream);
        removed
    }

    /// Removes every edge whose downstream endpoint is `downstream`.
    ///
    /// Called at the start of each recomputation so that edges always reflect
    /// the most recent computation. Returns the number of edges removed.
    pub fn deregister_dependencies(&mut self, downstream: &MetadataId) -> usize {
        let Some(upstreams) = self.upstream.remove(downstream) else {
            return 0;
        };
        for upstream in &upstreams {
            remove_from(&mut self.downstream, upstream, downstream);
        }
        tracing::trace!(%downstream, removed = upstreams.len(), "deregistered dependencies");
        upstreams.len()
    }

    /// Returns the MIDs `downstream` currently depends on.
    pub fn upstream_of(&self, downstream: &MetadataId) -> Vec<MetadataId> {
        self.upstream
            .get(downstream)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the MIDs that currently depend on `upstream`.
    pub fn downstream_of(&self, upstream: &MetadataId) -> Vec<MetadataId> {
        self.downstream
            .get(upstream)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns `true` if the exact edge is registered.
    pub fn is_registered(&self, upstream: &MetadataId, downstream: &MetadataId) -> bool {
        self.downstream
            .get(upstream)
            .is_some_and(|set| set.contains(downstream))
    }

    /// Iterates over every edge as `(upstream, downstream)`, in order.
    pub fn edges(&self) -> impl Iterator<Item = (&MetadataId, &MetadataId)> {
        self.downstream
            .iter()
            .flat_map(|(up, downs)| downs.iter().map(move |down| (up, down)))
    }

    /// Returns the number of registered edges.
    pub fn edge_count(&self) -> usize {
        self.downstream.values().map(BTreeSet::len).sum()
    }

    /// Returns `true` if no edges are registered.
    pub fn is_empty(&self) -> bool {
        self.downstream.is_empty()
    }

    /// Removes every edge.
    pub fn clear(&mut self) {
        self.downstream.clear();
        self.upstream.clear();
    }
}

/// Removes `value` from the set stored under `key`, dropping empty sets.
fn remove_from(
    map: &mut BTreeMap<MetadataId, BTreeSet<MetadataId>>,
    key: &MetadataId,
    value: &MetadataId,
) -> bool {
    let Some(set) = map.get_mut(key) else {
        return false;
    };
    let removed = set.remove(value);
    if set.is_empty() {
        map.remove(key);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mid(s: &str) -> MetadataId {
        MetadataId::parse(s).unwrap()
    }

    #[test]
    fn register_both_directions() {
        let mut reg = DependencyRegistry::new();
        let up = mid("MID:physical-type#src?a.W");
        let down = mid("MID:bean#src?a.W");
        assert_eq!(reg.register(&up, &down), Ok(true));
        assert_eq!(reg.downstream_of(&up), vec![down.clone()]);
        assert_eq!(reg.upstream_of(&down), vec![up.clone()]);
        assert!(reg.is_registered(&up, &down));
        assert!(!reg.is_registered(&down, &up));
    }

    #[test]
    fn duplicate_register_is_noop() {
        let mut reg = DependencyRegistry::new();
        let up = mid("MID:a#p?X");
        let down = mid("MID:b#p?X");
        assert_eq!(reg.register(&up, &down), Ok(true));
        assert_eq!(reg.register(&up, &down), Ok(false));
        assert_eq!(reg.edge_count(), 1);
    }

    #[test]
    fn self_loop_rejected() {
        let mut reg = DependencyRegistry::new();
        let m = mid("MID:a#p?X");
        assert_eq!(reg.register(&m, &m), Err(GraphError::SelfLoop(m.clone())));
        assert!(reg.is_empty());
    }

    #[test]
    fn class_level_edges_allowed() {
        let mut reg = DependencyRegistry::new();
        let up = mid("MID:physical-type");
        let down = mid("MID:bean");
        assert_eq!(reg.register(&up, &down), Ok(true));
        assert_eq!(reg.downstream_of(&up), vec![down]);
    }

    #[test]
    fn deregister_dependencies_only_touches_downstream_endpoint() {
        let mut reg = DependencyRegistry::new();
        let a = mid("MID:a#p?X");
        let b = mid("MID:b#p?X");
        let c = mid("MID:c#p?X");
        reg.register(&a, &b).unwrap();
        reg.register(&c, &b).unwrap();
        reg.register(&b, &c).unwrap();

        assert_eq!(reg.deregister_dependencies(&b), 2);
        assert!(reg.upstream_of(&b).is_empty());
        assert!(reg.downstream_of(&a).is_empty());
        // b is still upstream of c
        assert_eq!(reg.downstream_of(&b), vec![c.clone()]);
        assert_eq!(reg.upstream_of(&c), vec![b]);
        assert_eq!(reg.edge_count(), 1);
    }

    #[test]
    fn deregister_dependencies_unknown_is_zero() {
        let mut reg = DependencyRegistry::new();
        assert_eq!(reg.deregister_dependencies(&mid("MID:a#p?X")), 0);
    }

    #[test]
    fn deregister_single_edge() {
        let mut reg = DependencyRegistry::new();
        let a = mid("MID:a#p?X");
        let b = mid("MID:b#p?X");
        reg.register(&a, &b).unwrap();
        assert!(reg.deregister(&a, &b));
        assert!(!reg.deregister(&a, &b));
        assert!(reg.is_empty());
        assert!(reg.upstream_of(&b).is_empty());
    }

    #[test]
    fn edges_are_ordered() {
        let mut reg = DependencyRegistry::new();
        let a = mid("MID:a#p?X");
        let b = mid("MID:b#p?X");
        let c = mid("MID:c#p?X");
        reg.register(&b, &c).unwrap();
        reg.register(&a, &c).unwrap();
        reg.register(&a, &b).unwrap();
        let edges: Vec<_> = reg
            .edges()
            .map(|(u, d)| (u.as_str().to_string(), d.as_str().to_string()))
            .collect();
        assert_eq!(
            edges,
            vec![
                ("MID:a#p?X".to_string(), "MID:b#p?X".to_string()),
                ("MID:a#p?X".to_string(), "MID:c#p?X".to_string()),
                ("MID:b#p?X".to_string(), "MID:c#p?X".to_string()),
            ]
        );
    }

    #[test]
    fn clear_removes_everything() {
        let mut reg = DependencyRegistry::new();
        reg.register(&mid("MID:a#p?X"), &mid("MID:b#p?X")).unwrap();
        reg.clear();
        assert!(reg.is_empty());
        assert_eq!(reg.edge_count(), 0);
    }
}
