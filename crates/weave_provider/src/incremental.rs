//! Wraps an [`AugmentationProvider`] into an engine provider.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use weave_common::{MetadataId, ProviderClass};
use weave_compose::{ArtifactOutcome, ArtifactWriter, Composer};
use weave_metadata::{Augmentation, EngineError, MetadataEngine, MetadataItem, MetadataProvider};
use weave_source::{GovernorDetails, SourceLayer};

use crate::context::ComputeContext;
use crate::contract::AugmentationProvider;

/// Drives one provider through governor resolution, eligibility, compute,
/// render, and artifact sync.
///
/// Missing, invalid and ineligible governors yield an invalid item and
/// remove any artifact left from an earlier run. Empty output removes the
/// artifact but still yields a valid item.
pub struct IncrementalProvider<P> {
    inner: P,
    source: Rc<dyn SourceLayer>,
    writer: ArtifactWriter,
    composer: Composer,
    /// Last artifact path seen per instance, so a governor that disappears
    /// can still have its artifact removed.
    artifacts: RefCell<HashMap<MetadataId, PathBuf>>,
    listener_ids: RefCell<Vec<String>>,
}

impl<P: AugmentationProvider> IncrementalProvider<P> {
    /// Wraps `inner`.
    pub fn new(
        inner: P,
        source: Rc<dyn SourceLayer>,
        writer: ArtifactWriter,
        composer: Composer,
    ) -> Self {
        Self {
            inner,
            source,
            writer,
            composer,
            artifacts: RefCell::new(HashMap::new()),
            listener_ids: RefCell::new(Vec::new()),
        }
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Where this provider's artifact for `governor` lives.
    pub fn artifact_path(&self, governor: &GovernorDetails) -> PathBuf {
        self.writer
            .artifact_path(governor, self.inner.artifact_suffix())
    }

    fn invalidate(
        &self,
        mid: &MetadataId,
        artifact: Option<PathBuf>,
    ) -> Result<MetadataItem, EngineError> {
        let known = self.artifacts.borrow_mut().remove(mid);
        if let Some(path) = artifact.or(known) {
            let outcome = self.writer.remove(&path).map_err(|source| EngineError::Artifact {
                mid: mid.clone(),
                source,
            })?;
            if outcome == ArtifactOutcome::Deleted {
                tracing::debug!(%mid, path = %path.display(), "removed stale artifact");
            }
        }
        Ok(MetadataItem::invalid(mid.clone()))
    }
}

impl<P: AugmentationProvider> MetadataProvider for IncrementalProvider<P> {
    fn provider_class(&self) -> &ProviderClass {
        self.inner.provider_class()
    }

    fn compute(
        &self,
        mid: &MetadataId,
        engine: &MetadataEngine,
    ) -> Result<MetadataItem, EngineError> {
        let Some(governor_id) = self.inner.resolve_governor_id(mid) else {
            return self.invalidate(mid, None);
        };
        engine.register_dependency(&governor_id, mid)?;

        let governor = governor_id
            .instance_key()
            .and_then(|key| self.source.governor(key.qualified_name, key.path));
        let Some(governor) = governor else {
            tracing::debug!(%mid, "governor missing");
            return self.invalidate(mid, None);
        };
        let path = self.artifact_path(&governor);
        if !governor.valid {
            tracing::debug!(%mid, "governor invalid");
            return self.invalidate(mid, Some(path));
        }
        if !self.inner.is_eligible(&governor, &*self.source) {
            tracing::debug!(%mid, "governor not eligible");
            return self.invalidate(mid, Some(path));
        }

        let aspect = ArtifactWriter::artifact_name(&governor, self.inner.artifact_suffix());
        let ctx = ComputeContext::new(engine, &*self.source, mid, &aspect);
        let members = self.inner.compute(&ctx, &governor)?.unwrap_or_default();

        let rendered = self.composer.render(&members, &governor);
        self.writer
            .sync(&path, &rendered)
            .map_err(|source| EngineError::Artifact {
                mid: mid.clone(),
                source,
            })?;

        if rendered.is_empty() {
            self.artifacts.borrow_mut().remove(mid);
            return Ok(MetadataItem::valid(mid.clone(), None));
        }
        self.artifacts
            .borrow_mut()
            .insert(mid.clone(), path.clone());
        Ok(MetadataItem::valid(
            mid.clone(),
            Some(Augmentation {
                members,
                rendered,
                artifact: Some(path),
            }),
        ))
    }

    fn resolve_downstream(&self, upstream: &MetadataId) -> Option<MetadataId> {
        self.inner.resolve_downstream_from_upstream(upstream)
    }

    fn activate(&self, engine: &MetadataEngine) -> Result<(), EngineError> {
        let governors = ProviderClass::physical_type().class_id();
        engine.register_dependency(&governors, &self.provider_class().class_id())?;
        for listener in self.inner.listeners() {
            let id = listener.listener_id().to_string();
            if engine.add_listener(listener) {
                self.listener_ids.borrow_mut().push(id);
            }
        }
        tracing::debug!(provider = %self.provider_class(), "activated");
        Ok(())
    }

    fn deactivate(&self, engine: &MetadataEngine) {
        let governors = ProviderClass::physical_type().class_id();
        engine.deregister_dependency(&governors, &self.provider_class().class_id());
        for id in self.listener_ids.borrow_mut().drain(..) {
            engine.remove_listener(&id);
        }
    }
}

/// Announces that the governor at `(path, qualified_name)` was added, edited
/// or removed.
///
/// Instances that already depend on the governor are recomputed directly;
/// providers that never saw it are reached through their class-level edge.
pub fn notify_governor_changed(
    engine: &MetadataEngine,
    path: &str,
    qualified_name: &str,
) -> Result<(), EngineError> {
    let governor = ProviderClass::physical_type().instance_id(path, qualified_name)?;
    tracing::debug!(%governor, "governor changed");
    engine.notify_downstream(&governor)
}
