//! Notification listeners and cross-provider discovery.

use weave_common::{MetadataId, ProviderClass};
use weave_compose::AugmentationMembers;

use crate::engine::MetadataEngine;
use crate::error::EngineError;

/// Observes every `(upstream, downstream)` notification the engine dispatches.
///
/// Listeners see pairs before the engine acts on them, including the
/// `(instance, class of instance)` pair broadcast after every change, so they
/// can react to upstreams no provider registered a dependency on.
pub trait NotificationListener {
    /// Identity used to register and remove the listener.
    fn listener_id(&self) -> &str;

    /// Handles one notification pair.
    fn notify(
        &self,
        upstream: &MetadataId,
        downstream: &MetadataId,
        engine: &MetadataEngine,
    ) -> Result<(), EngineError>;
}

type MembersPredicate = Box<dyn Fn(&AugmentationMembers) -> bool>;
type TargetResolver = Box<dyn Fn(&MetadataId, &ProviderClass) -> Option<MetadataId>>;

/// Recomputes a provider's instance when another provider's output matches
/// a predicate.
///
/// Reacts only to class-level downstreams and only to upstreams from other
/// providers. The upstream's cached item is inspected with
/// [`MetadataEngine::peek`], so nothing is computed just to test the
/// predicate. Targets already being computed are skipped.
pub struct DiscoveryListener {
    id: String,
    target_class: ProviderClass,
    predicate: MembersPredicate,
    resolve_target: TargetResolver,
    when_unmatched: bool,
}

impl DiscoveryListener {
    /// Creates a listener that recomputes the `target_class` instance with the
    /// same governor key as the upstream whenever `predicate` matches.
    pub fn new(
        id: impl Into<String>,
        target_class: ProviderClass,
        predicate: impl Fn(&AugmentationMembers) -> bool + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            target_class,
            predicate: Box::new(predicate),
            resolve_target: Box::new(|upstream, class| upstream.with_class(class)),
            when_unmatched: false,
        }
    }

    /// Also recomputes the target when the upstream changes into an item
    /// that does not match: invalid, empty or rejected by the predicate.
    ///
    /// Targets that peek at the upstream need this to drop what they
    /// derived from an earlier match.
    pub fn also_when_unmatched(mut self) -> Self {
        self.when_unmatched = true;
        self
    }

    /// Replaces the upstream-to-target mapping.
    pub fn with_target_resolver(
        mut self,
        resolve: impl Fn(&MetadataId, &ProviderClass) -> Option<MetadataId> + 'static,
    ) -> Self {
        self.resolve_target = Box::new(resolve);
        self
    }

    /// The provider class whose instances this listener recomputes.
    pub fn target_class(&self) -> &ProviderClass {
        &self.target_class
    }
}

impl NotificationListener for DiscoveryListener {
    fn listener_id(&self) -> &str {
        &self.id
    }

    fn notify(
        &self,
        upstream: &MetadataId,
        downstream: &MetadataId,
        engine: &MetadataEngine,
    ) -> Result<(), EngineError> {
        if downstream.is_instance() || upstream.is_class() {
            return Ok(());
        }
        if upstream.belongs_to(&self.target_class) {
            return Ok(());
        }
        let Some(item) = engine.peek(upstream) else {
            return Ok(());
        };
        let matched = item.is_valid()
            && item
                .members()
                .map(|members| (self.predicate)(members))
                .unwrap_or(false);
        if !matched && !self.when_unmatched {
            return Ok(());
        }
        let Some(target) = (self.resolve_target)(upstream, &self.target_class) else {
            return Ok(());
        };
        if engine.is_in_flight(&target) || !engine.has_provider(&target.provider_class()) {
            return Ok(());
        }
        tracing::debug!(listener = %self.id, %upstream, %target, "discovered dependency");
        engine.evict_and_get(&target)?;
        Ok(())
    }
}
