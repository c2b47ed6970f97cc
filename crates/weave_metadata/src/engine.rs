//! The metadata engine: cache, dependency registry, and notification dispatch.

use std::cell::{Cell, Ref, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use weave_common::{MetadataId, ProviderClass};
use weave_graph::DependencyRegistry;

use crate::error::EngineError;
use crate::item::MetadataItem;
use crate::listener::NotificationListener;
use crate::memo::HashTracker;
use crate::provider::MetadataProvider;
use crate::stats::CacheStats;

/// Default bound on nested notification depth.
pub const DEFAULT_MAX_NOTIFY_DEPTH: usize = 64;

/// Engine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// How deeply notifications may nest before propagation is aborted.
    pub max_notify_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_notify_depth: DEFAULT_MAX_NOTIFY_DEPTH,
        }
    }
}

/// Caches metadata items and keeps them consistent as upstreams change.
///
/// `get` serves from the cache or asks the owning provider to compute; a
/// computation whose content hash differs from the last announced one
/// notifies every registered downstream, which is evicted and recomputed in
/// turn. Providers receive `&MetadataEngine` and may call back into it while
/// computing.
pub struct MetadataEngine {
    config: EngineConfig,
    registry: RefCell<DependencyRegistry>,
    cache: RefCell<HashMap<MetadataId, Rc<MetadataItem>>>,
    providers: RefCell<BTreeMap<ProviderClass, Rc<dyn MetadataProvider>>>,
    listeners: RefCell<Vec<Rc<dyn NotificationListener>>>,
    hashes: RefCell<HashTracker>,
    in_flight: RefCell<Vec<MetadataId>>,
    notify_depth: Cell<usize>,
    /// Logical clock for the current propagation wave.
    clock: Cell<u64>,
    /// When each MID last started computing during the current wave.
    started: RefCell<HashMap<MetadataId, u64>>,
    /// When each MID last announced a change during the current wave.
    changed: RefCell<HashMap<MetadataId, u64>>,
    stats: Cell<CacheStats>,
}

impl MetadataEngine {
    /// Creates an empty engine.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: RefCell::new(DependencyRegistry::new()),
            cache: RefCell::new(HashMap::new()),
            providers: RefCell::new(BTreeMap::new()),
            listeners: RefCell::new(Vec::new()),
            hashes: RefCell::new(HashTracker::new()),
            in_flight: RefCell::new(Vec::new()),
            notify_depth: Cell::new(0),
            clock: Cell::new(0),
            started: RefCell::new(HashMap::new()),
            changed: RefCell::new(HashMap::new()),
            stats: Cell::new(CacheStats::default()),
        }
    }

    /// The configuration this engine was created with.
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    // ------------------------------------------------------------------
    // Providers and listeners
    // ------------------------------------------------------------------

    /// Registers a provider and activates it.
    pub fn register_provider(&self, provider: Rc<dyn MetadataProvider>) -> Result<(), EngineError> {
        let class = provider.provider_class().clone();
        {
            let mut providers = self.providers.borrow_mut();
            if providers.contains_key(&class) {
                return Err(EngineError::DuplicateProvider(class));
            }
            providers.insert(class.clone(), provider.clone());
        }
        tracing::debug!(provider = %class, "registered provider");
        provider.activate(self)
    }

    /// Deactivates and removes a provider, evicting everything it produced.
    pub fn deregister_provider(&self, class: &ProviderClass) -> Option<Rc<dyn MetadataProvider>> {
        let provider = self.provider(class)?;
        provider.deactivate(self);
        self.providers.borrow_mut().remove(class);
        let owned: Vec<MetadataId> = self
            .cache
            .borrow()
            .keys()
            .filter(|mid| mid.belongs_to(class))
            .cloned()
            .collect();
        for mid in &owned {
            self.evict(mid);
            self.hashes.borrow_mut().forget(mid);
        }
        tracing::debug!(provider = %class, evicted = owned.len(), "deregistered provider");
        Some(provider)
    }

    /// Returns the provider for `class`.
    pub fn provider(&self, class: &ProviderClass) -> Option<Rc<dyn MetadataProvider>> {
        self.providers.borrow().get(class).cloned()
    }

    /// Returns `true` if a provider is registered for `class`.
    pub fn has_provider(&self, class: &ProviderClass) -> bool {
        self.providers.borrow().contains_key(class)
    }

    /// Registered provider classes, sorted.
    pub fn provider_classes(&self) -> Vec<ProviderClass> {
        self.providers.borrow().keys().cloned().collect()
    }

    /// Adds a listener. Returns `false` if one with the same id is present.
    pub fn add_listener(&self, listener: Rc<dyn NotificationListener>) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        if listeners
            .iter()
            .any(|l| l.listener_id() == listener.listener_id())
        {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Removes the listener with `id`. Returns `true` if one was removed.
    pub fn remove_listener(&self, id: &str) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|l| l.listener_id() != id);
        listeners.len() != before
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    // ------------------------------------------------------------------
    // Dependency registry
    // ------------------------------------------------------------------

    /// Registers "`downstream` is rebuilt when `upstream` changes".
    ///
    /// Returns `true` if the edge is new.
    pub fn register_dependency(
        &self,
        upstream: &MetadataId,
        downstream: &MetadataId,
    ) -> Result<bool, EngineError> {
        Ok(self.registry.borrow_mut().register(upstream, downstream)?)
    }

    /// Removes one edge. Returns `true` if it existed.
    pub fn deregister_dependency(&self, upstream: &MetadataId, downstream: &MetadataId) -> bool {
        self.registry.borrow_mut().deregister(upstream, downstream)
    }

    /// Removes every edge into `downstream`.
    pub fn deregister_dependencies(&self, downstream: &MetadataId) -> usize {
        self.registry.borrow_mut().deregister_dependencies(downstream)
    }

    /// Upstreams `downstream` depends on.
    pub fn upstream_of(&self, downstream: &MetadataId) -> Vec<MetadataId> {
        self.registry.borrow().upstream_of(downstream)
    }

    /// Downstreams registered against `upstream`.
    pub fn downstream_of(&self, upstream: &MetadataId) -> Vec<MetadataId> {
        self.registry.borrow().downstream_of(upstream)
    }

    /// Returns `true` if the edge is registered.
    pub fn is_registered(&self, upstream: &MetadataId, downstream: &MetadataId) -> bool {
        self.registry.borrow().is_registered(upstream, downstream)
    }

    /// Borrows the registry for inspection.
    ///
    /// The borrow must be dropped before calling back into the engine.
    pub fn registry(&self) -> Ref<'_, DependencyRegistry> {
        self.registry.borrow()
    }

    // ------------------------------------------------------------------
    // Cache
    // ------------------------------------------------------------------

    /// Returns the item for `mid`, computing it if it is not cached.
    pub fn get(&self, mid: &MetadataId) -> Result<Rc<MetadataItem>, EngineError> {
        self.get_with(mid, false)
    }

    /// Returns the item for `mid`; `force` bypasses the cache.
    ///
    /// A computed item is cached before downstreams are notified, so
    /// re-entrant reads during propagation see the new value.
    pub fn get_with(&self, mid: &MetadataId, force: bool) -> Result<Rc<MetadataItem>, EngineError> {
        if mid.is_class() {
            return Err(EngineError::ClassLevelRequest(mid.clone()));
        }
        if let Some(start) = self.in_flight.borrow().iter().position(|m| m == mid) {
            let mut chain: Vec<MetadataId> = self.in_flight.borrow()[start..].to_vec();
            chain.push(mid.clone());
            return Err(EngineError::Cycle { chain });
        }
        if !force {
            let cached = self.cache.borrow().get(mid).cloned();
            if let Some(item) = cached {
                self.bump(|s| s.hits += 1);
                return Ok(item);
            }
            self.bump(|s| s.misses += 1);
        }

        let provider = self
            .provider(&mid.provider_class())
            .ok_or_else(|| EngineError::NoProvider(mid.clone()))?;

        self.in_flight.borrow_mut().push(mid.clone());
        let started = self.tick();
        self.started.borrow_mut().insert(mid.clone(), started);
        self.registry.borrow_mut().deregister_dependencies(mid);
        tracing::debug!(%mid, force, "computing");
        let result = provider.compute(mid, self);
        self.in_flight.borrow_mut().pop();
        self.bump(|s| s.computations += 1);

        let item = match result {
            Ok(item) => Rc::new(item),
            Err(e) => {
                self.cache.borrow_mut().remove(mid);
                return Err(e);
            }
        };
        self.cache.borrow_mut().insert(mid.clone(), item.clone());

        let changed = self.hashes.borrow_mut().record(mid, item.hash());
        if changed {
            let at = self.tick();
            self.changed.borrow_mut().insert(mid.clone(), at);
            self.notify_downstream(mid)?;
        } else {
            tracing::trace!(%mid, "content unchanged, notification suppressed");
        }
        Ok(item)
    }

    /// Evicts `mid` and computes it again.
    pub fn evict_and_get(&self, mid: &MetadataId) -> Result<Rc<MetadataItem>, EngineError> {
        self.evict(mid);
        self.get_with(mid, true)
    }

    /// Returns the cached item for `mid` without computing anything.
    pub fn peek(&self, mid: &MetadataId) -> Option<Rc<MetadataItem>> {
        self.cache.borrow().get(mid).cloned()
    }

    /// Removes `mid` from the cache. Returns `true` if it was cached.
    pub fn evict(&self, mid: &MetadataId) -> bool {
        let removed = self.cache.borrow_mut().remove(mid).is_some();
        if removed {
            self.bump(|s| s.evictions += 1);
        }
        removed
    }

    /// Empties the cache.
    pub fn evict_all(&self) {
        let count = {
            let mut cache = self.cache.borrow_mut();
            let count = cache.len();
            cache.clear();
            count
        };
        self.bump(|s| s.evictions += count as u64);
    }

    /// Cached MIDs, sorted.
    pub fn cached_ids(&self) -> Vec<MetadataId> {
        let mut ids: Vec<MetadataId> = self.cache.borrow().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns `true` if `mid` is currently being computed.
    pub fn is_in_flight(&self, mid: &MetadataId) -> bool {
        self.in_flight.borrow().contains(mid)
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.get()
    }

    // ------------------------------------------------------------------
    // Notification
    // ------------------------------------------------------------------

    /// Announces that `upstream` changed.
    ///
    /// Every downstream registered against `upstream` is notified; for an
    /// instance-level upstream, so is every downstream registered against its
    /// class. Listeners then receive the `(upstream, class of upstream)` pair.
    pub fn notify_downstream(&self, upstream: &MetadataId) -> Result<(), EngineError> {
        let depth = self.notify_depth.get() + 1;
        if depth > self.config.max_notify_depth {
            return Err(EngineError::PropagationTooDeep {
                upstream: upstream.clone(),
                limit: self.config.max_notify_depth,
            });
        }
        if depth == 1 {
            // A new wave: everything it touches is recorded from here on.
            self.started.borrow_mut().clear();
            self.changed.borrow_mut().clear();
        }
        self.notify_depth.set(depth);
        let result = self.dispatch_downstream(upstream);
        self.notify_depth.set(depth - 1);
        result
    }

    fn dispatch_downstream(&self, upstream: &MetadataId) -> Result<(), EngineError> {
        let mut targets = self.downstream_of(upstream);
        if upstream.is_instance() {
            for d in self.downstream_of(&upstream.class_of()) {
                if !targets.contains(&d) {
                    targets.push(d);
                }
            }
        }
        tracing::debug!(%upstream, downstream = targets.len(), "propagating change");
        for downstream in &targets {
            self.notify(upstream, downstream)?;
        }
        if upstream.is_instance() {
            self.notify_listeners(upstream, &upstream.class_of())?;
        }
        Ok(())
    }

    /// Delivers one `(upstream, downstream)` notification.
    ///
    /// A class-level downstream is narrowed to one instance by its provider;
    /// the instance is skipped when no instance applies, when it already
    /// depends on `upstream` directly, or when it is being computed right now.
    ///
    /// Within one propagation wave, a target whose latest computation started
    /// after `upstream` last changed has already seen the change and is not
    /// recomputed again.
    pub fn notify(&self, upstream: &MetadataId, downstream: &MetadataId) -> Result<(), EngineError> {
        self.notify_listeners(upstream, downstream)?;

        let Some(provider) = self.provider(&downstream.provider_class()) else {
            tracing::warn!(%upstream, %downstream, "no provider for notified downstream");
            return Ok(());
        };
        let target = if downstream.is_instance() {
            downstream.clone()
        } else {
            let Some(resolved) = provider.resolve_downstream(upstream) else {
                tracing::trace!(%upstream, %downstream, "no instance affected");
                return Ok(());
            };
            if !resolved.is_instance() || !resolved.belongs_to(provider.provider_class()) {
                tracing::warn!(%upstream, %resolved, "provider resolved a foreign downstream");
                return Ok(());
            }
            if self.is_registered(upstream, &resolved) {
                return Ok(());
            }
            resolved
        };
        if self.is_in_flight(&target) {
            tracing::trace!(%target, "downstream is being computed, skipping");
            return Ok(());
        }
        if self.refreshed_since_change(upstream, &target) {
            tracing::trace!(%upstream, %target, "downstream already refreshed, skipping");
            return Ok(());
        }
        self.evict_and_get(&target)?;
        Ok(())
    }

    fn tick(&self) -> u64 {
        let now = self.clock.get() + 1;
        self.clock.set(now);
        now
    }

    /// Upstreams without a recorded change changed before the wave began.
    fn refreshed_since_change(&self, upstream: &MetadataId, target: &MetadataId) -> bool {
        let Some(started) = self.started.borrow().get(target).copied() else {
            return false;
        };
        let changed = self.changed.borrow().get(upstream).copied().unwrap_or(0);
        started > changed
    }

    fn notify_listeners(
        &self,
        upstream: &MetadataId,
        downstream: &MetadataId,
    ) -> Result<(), EngineError> {
        self.bump(|s| s.notifications += 1);
        let listeners: Vec<Rc<dyn NotificationListener>> = self.listeners.borrow().clone();
        for listener in listeners {
            listener.notify(upstream, downstream, self)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Deactivates every provider and clears all state.
    pub fn shutdown(&self) {
        let providers: Vec<Rc<dyn MetadataProvider>> =
            self.providers.borrow().values().cloned().collect();
        for provider in &providers {
            provider.deactivate(self);
        }
        self.providers.borrow_mut().clear();
        self.listeners.borrow_mut().clear();
        self.cache.borrow_mut().clear();
        self.registry.borrow_mut().clear();
        self.hashes.borrow_mut().clear();
        self.in_flight.borrow_mut().clear();
        self.notify_depth.set(0);
        self.started.borrow_mut().clear();
        self.changed.borrow_mut().clear();
        tracing::debug!(providers = providers.len(), "engine shut down");
    }

    fn bump(&self, f: impl FnOnce(&mut CacheStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

impl Default for MetadataEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Augmentation;
    use crate::listener::DiscoveryListener;
    use weave_compose::AugmentationMembers;

    /// Computes `content[mid]` followed by the rendered text of each upstream.
    struct Scripted {
        class: ProviderClass,
        content: RefCell<HashMap<String, String>>,
        deps: RefCell<HashMap<String, Vec<MetadataId>>>,
        computed: RefCell<Vec<MetadataId>>,
        fail: Cell<bool>,
    }

    impl Scripted {
        fn new(class: &str) -> Rc<Self> {
            Rc::new(Self {
                class: ProviderClass::new(class).unwrap(),
                content: RefCell::new(HashMap::new()),
                deps: RefCell::new(HashMap::new()),
                computed: RefCell::new(Vec::new()),
                fail: Cell::new(false),
            })
        }

        fn set(&self, mid: &MetadataId, text: &str) {
            self.content
                .borrow_mut()
                .insert(mid.as_str().to_string(), text.to_string());
        }

        fn depend(&self, mid: &MetadataId, upstream: &MetadataId) {
            self.deps
                .borrow_mut()
                .entry(mid.as_str().to_string())
                .or_default()
                .push(upstream.clone());
        }

        fn count(&self, mid: &MetadataId) -> usize {
            self.computed.borrow().iter().filter(|m| *m == mid).count()
        }
    }

    impl MetadataProvider for Scripted {
        fn provider_class(&self) -> &ProviderClass {
            &self.class
        }

        fn compute(
            &self,
            mid: &MetadataId,
            engine: &MetadataEngine,
        ) -> Result<MetadataItem, EngineError> {
            self.computed.borrow_mut().push(mid.clone());
            if self.fail.get() {
                return Err(EngineError::Provider {
                    mid: mid.clone(),
                    source: crate::ProviderError::new("boom"),
                });
            }
            let deps = self
                .deps
                .borrow()
                .get(mid.as_str())
                .cloned()
                .unwrap_or_default();
            let mut text = self
                .content
                .borrow()
                .get(mid.as_str())
                .cloned()
                .unwrap_or_default();
            for upstream in deps {
                engine.register_dependency(&upstream, mid)?;
                let item = engine.get(&upstream)?;
                if let Some(p) = item.payload() {
                    text.push_str(&p.rendered);
                }
            }
            Ok(MetadataItem::valid(
                mid.clone(),
                Some(Augmentation {
                    members: AugmentationMembers::new(),
                    rendered: text,
                    artifact: None,
                }),
            ))
        }

        fn resolve_downstream(&self, upstream: &MetadataId) -> Option<MetadataId> {
            upstream.with_class(&self.class)
        }
    }

    fn mid(class: &str, name: &str) -> MetadataId {
        MetadataId::parse(&format!("MID:{class}#src?{name}")).unwrap()
    }

    fn engine_with(providers: &[Rc<Scripted>]) -> MetadataEngine {
        let engine = MetadataEngine::default();
        for p in providers {
            engine.register_provider(p.clone()).unwrap();
        }
        engine
    }

    #[test]
    fn get_caches() {
        let a = Scripted::new("a");
        let engine = engine_with(&[a.clone()]);
        let x = mid("a", "X");
        a.set(&x, "one");

        let first = engine.get(&x).unwrap();
        let second = engine.get(&x).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(a.count(&x), 1);
        assert_eq!(engine.stats().hits, 1);
        assert_eq!(engine.stats().misses, 1);
    }

    #[test]
    fn force_recomputes() {
        let a = Scripted::new("a");
        let engine = engine_with(&[a.clone()]);
        let x = mid("a", "X");
        engine.get(&x).unwrap();
        engine.get_with(&x, true).unwrap();
        assert_eq!(a.count(&x), 2);
    }

    #[test]
    fn class_level_get_is_rejected() {
        let engine = MetadataEngine::default();
        let class = MetadataId::parse("MID:a").unwrap();
        assert!(matches!(
            engine.get(&class),
            Err(EngineError::ClassLevelRequest(_))
        ));
    }

    #[test]
    fn missing_provider_is_an_error() {
        let engine = MetadataEngine::default();
        assert!(matches!(
            engine.get(&mid("nope", "X")),
            Err(EngineError::NoProvider(_))
        ));
    }

    #[test]
    fn duplicate_provider_is_rejected() {
        let a = Scripted::new("a");
        let engine = engine_with(&[a.clone()]);
        assert!(matches!(
            engine.register_provider(a),
            Err(EngineError::DuplicateProvider(_))
        ));
    }

    #[test]
    fn changed_upstream_recomputes_downstream() {
        let a = Scripted::new("a");
        let b = Scripted::new("b");
        let engine = engine_with(&[a.clone(), b.clone()]);
        let x = mid("a", "X");
        let y = mid("b", "X");
        a.set(&x, "one");
        b.depend(&y, &x);

        assert_eq!(engine.get(&y).unwrap().payload().unwrap().rendered, "one");
        a.set(&x, "two");
        engine.evict_and_get(&x).unwrap();

        assert_eq!(b.count(&y), 2);
        assert_eq!(engine.peek(&y).unwrap().payload().unwrap().rendered, "two");
    }

    #[test]
    fn unchanged_upstream_is_silent() {
        let a = Scripted::new("a");
        let b = Scripted::new("b");
        let engine = engine_with(&[a.clone(), b.clone()]);
        let x = mid("a", "X");
        let y = mid("b", "X");
        b.depend(&y, &x);

        engine.get(&y).unwrap();
        engine.evict_and_get(&x).unwrap();
        assert_eq!(b.count(&y), 1);
    }

    #[test]
    fn unrelated_downstream_is_not_touched() {
        let a = Scripted::new("a");
        let b = Scripted::new("b");
        let engine = engine_with(&[a.clone(), b.clone()]);
        let x = mid("a", "X");
        let other = mid("a", "Other");
        let y = mid("b", "X");
        let z = mid("b", "Z");
        b.depend(&y, &x);
        b.depend(&z, &other);

        engine.get(&y).unwrap();
        engine.get(&z).unwrap();
        a.set(&x, "changed");
        engine.evict_and_get(&x).unwrap();

        assert_eq!(b.count(&y), 2);
        assert_eq!(b.count(&z), 1);
    }

    #[test]
    fn class_level_edge_narrows_to_matching_instance() {
        let a = Scripted::new("a");
        let b = Scripted::new("b");
        let engine = engine_with(&[a.clone(), b.clone()]);
        let x = mid("a", "X");
        let bx = mid("b", "X");
        let bz = mid("b", "Z");
        engine
            .register_dependency(&a.class.class_id(), &b.class.class_id())
            .unwrap();

        engine.get(&bz).unwrap();
        engine.get(&x).unwrap();

        assert_eq!(b.count(&bx), 1);
        assert_eq!(b.count(&bz), 1);
    }

    #[test]
    fn cycle_is_reported() {
        let a = Scripted::new("a");
        let b = Scripted::new("b");
        let engine = engine_with(&[a.clone(), b.clone()]);
        let x = mid("a", "X");
        let y = mid("b", "X");
        a.depend(&x, &y);
        b.depend(&y, &x);

        match engine.get(&x) {
            Err(EngineError::Cycle { chain }) => {
                assert_eq!(chain, vec![x.clone(), y.clone(), x.clone()]);
            }
            other => panic!("expected cycle, got {:?}", other.map(|_| ())),
        }
        assert!(!engine.is_in_flight(&x));
        assert!(!engine.is_in_flight(&y));
    }

    #[test]
    fn provider_failure_propagates_and_evicts() {
        let a = Scripted::new("a");
        let engine = engine_with(&[a.clone()]);
        let x = mid("a", "X");
        engine.get(&x).unwrap();
        a.fail.set(true);
        assert!(matches!(
            engine.evict_and_get(&x),
            Err(EngineError::Provider { .. })
        ));
        assert!(engine.peek(&x).is_none());
    }

    #[test]
    fn recompute_replaces_old_edges() {
        let a = Scripted::new("a");
        let b = Scripted::new("b");
        let engine = engine_with(&[a.clone(), b.clone()]);
        let x = mid("a", "X");
        let w = mid("a", "W");
        let y = mid("b", "X");
        b.depend(&y, &x);
        engine.get(&y).unwrap();
        assert_eq!(engine.upstream_of(&y), vec![x.clone()]);

        b.deps.borrow_mut().insert(y.as_str().to_string(), vec![w.clone()]);
        engine.evict_and_get(&y).unwrap();
        assert_eq!(engine.upstream_of(&y), vec![w]);
        assert!(!engine.is_registered(&x, &y));
    }

    #[test]
    fn downstream_reached_twice_in_one_wave_recomputes_once() {
        let a = Scripted::new("a");
        let b = Scripted::new("b");
        let c = Scripted::new("c");
        let engine = engine_with(&[a.clone(), b.clone(), c.clone()]);
        let x = mid("a", "X");
        let y = mid("b", "X");
        let z = mid("c", "X");
        // z reads both x and y; y reads x.
        b.depend(&y, &x);
        c.depend(&z, &y);
        c.depend(&z, &x);
        engine.get(&z).unwrap();

        a.set(&x, "changed");
        engine.evict_and_get(&x).unwrap();

        assert_eq!(b.count(&y), 2);
        assert_eq!(c.count(&z), 2);
        assert_eq!(
            engine.peek(&z).unwrap().payload().unwrap().rendered,
            "changedchanged"
        );
    }

    #[test]
    fn later_upstream_change_in_the_same_wave_still_recomputes() {
        let a = Scripted::new("a");
        let b = Scripted::new("b");
        let c = Scripted::new("c");
        let engine = engine_with(&[a.clone(), b.clone(), c.clone()]);
        let x = mid("a", "X");
        let z = mid("b", "X");
        let y = mid("c", "X");
        // x reaches z before y; y changes only after z was refreshed.
        b.depend(&z, &x);
        b.depend(&z, &y);
        c.depend(&y, &x);
        engine.get(&z).unwrap();

        a.set(&x, "1");
        c.set(&y, "2");
        engine.evict_and_get(&x).unwrap();

        assert_eq!(b.count(&z), 3);
        assert_eq!(engine.peek(&z).unwrap().payload().unwrap().rendered, "121");
    }

    #[test]
    fn notify_depth_is_bounded() {
        let a = Scripted::new("a");
        let engine = MetadataEngine::new(EngineConfig {
            max_notify_depth: 2,
        });
        engine.register_provider(a.clone()).unwrap();
        // A chain of three instance edges: X0 -> X1 -> X2 -> X3.
        let ids: Vec<MetadataId> = (0..4).map(|i| mid("a", &format!("X{i}"))).collect();
        for pair in ids.windows(2) {
            a.depend(&pair[1], &pair[0]);
        }
        engine.get(&ids[3]).unwrap();

        a.set(&ids[0], "changed");
        let err = engine.evict_and_get(&ids[0]).unwrap_err();
        assert!(matches!(err, EngineError::PropagationTooDeep { limit: 2, .. }));
    }

    #[test]
    fn discovery_listener_recomputes_target() {
        let a = Scripted::new("a");
        let b = Scripted::new("b");
        let engine = engine_with(&[a.clone(), b.clone()]);
        engine.add_listener(Rc::new(DiscoveryListener::new(
            "b-discovery",
            b.class.clone(),
            |_| true,
        )));
        let x = mid("a", "X");
        let y = mid("b", "X");

        engine.get(&x).unwrap();
        assert_eq!(b.count(&y), 1);
        assert!(engine.peek(&y).is_some());
    }

    #[test]
    fn listener_registration() {
        let engine = MetadataEngine::default();
        let class = ProviderClass::new("b").unwrap();
        assert!(engine.add_listener(Rc::new(DiscoveryListener::new("l", class.clone(), |_| true))));
        assert!(!engine.add_listener(Rc::new(DiscoveryListener::new("l", class, |_| true))));
        assert_eq!(engine.listener_count(), 1);
        assert!(engine.remove_listener("l"));
        assert!(!engine.remove_listener("l"));
    }

    #[test]
    fn eviction_and_cached_ids() {
        let a = Scripted::new("a");
        let engine = engine_with(&[a.clone()]);
        let x = mid("a", "X");
        let z = mid("a", "Z");
        engine.get(&z).unwrap();
        engine.get(&x).unwrap();
        assert_eq!(engine.cached_ids(), vec![x.clone(), z.clone()]);
        assert!(engine.evict(&x));
        assert!(!engine.evict(&x));
        engine.evict_all();
        assert!(engine.cached_ids().is_empty());
        assert_eq!(engine.stats().evictions, 2);
    }

    #[test]
    fn deregister_provider_evicts_its_items() {
        let a = Scripted::new("a");
        let engine = engine_with(&[a.clone()]);
        let x = mid("a", "X");
        engine.get(&x).unwrap();
        assert!(engine.deregister_provider(&a.class).is_some());
        assert!(engine.peek(&x).is_none());
        assert!(!engine.has_provider(&a.class));
    }

    #[test]
    fn shutdown_clears_everything() {
        let a = Scripted::new("a");
        let b = Scripted::new("b");
        let engine = engine_with(&[a.clone(), b.clone()]);
        let y = mid("b", "X");
        b.depend(&y, &mid("a", "X"));
        engine.get(&y).unwrap();
        engine.shutdown();
        assert!(engine.cached_ids().is_empty());
        assert!(engine.registry().is_empty());
        assert!(engine.provider_classes().is_empty());
    }
}
