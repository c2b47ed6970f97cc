//! Engine access handed to a provider's compute function.

use std::rc::Rc;

use weave_common::MetadataId;
use weave_metadata::{EngineError, MetadataEngine, MetadataItem, ProviderError};
use weave_source::{GovernorDetails, SourceLayer};

/// What a provider may see and do while computing one instance.
pub struct ComputeContext<'a> {
    engine: &'a MetadataEngine,
    source: &'a dyn SourceLayer,
    mid: &'a MetadataId,
    aspect: &'a str,
}

impl<'a> ComputeContext<'a> {
    pub(crate) fn new(
        engine: &'a MetadataEngine,
        source: &'a dyn SourceLayer,
        mid: &'a MetadataId,
        aspect: &'a str,
    ) -> Self {
        Self {
            engine,
            source,
            mid,
            aspect,
        }
    }

    /// The instance MID being computed.
    pub fn mid(&self) -> &MetadataId {
        self.mid
    }

    /// The artifact name, e.g. `Widget_Bean`.
    pub fn aspect_name(&self) -> &str {
        self.aspect
    }

    /// The engine, for anything the helpers below do not cover.
    pub fn engine(&self) -> &MetadataEngine {
        self.engine
    }

    /// Looks up another governor through the source layer.
    pub fn governor(&self, qualified_name: &str, path: &str) -> Option<Rc<GovernorDetails>> {
        self.source.governor(qualified_name, path)
    }

    /// Registers `upstream` as a dependency of this instance.
    pub fn depend_on(&self, upstream: &MetadataId) -> Result<bool, EngineError> {
        self.engine.register_dependency(upstream, self.mid)
    }

    /// Registers `upstream` as a dependency and returns its item.
    pub fn get(&self, upstream: &MetadataId) -> Result<Rc<MetadataItem>, EngineError> {
        self.depend_on(upstream)?;
        self.engine.get(upstream)
    }

    /// Returns the cached item for `mid` without registering a dependency or
    /// computing anything.
    pub fn peek(&self, mid: &MetadataId) -> Option<Rc<MetadataItem>> {
        self.engine.peek(mid)
    }

    /// Builds the hard-failure error for this instance.
    pub fn fail(&self, message: impl Into<String>) -> EngineError {
        EngineError::Provider {
            mid: self.mid.clone(),
            source: ProviderError::new(message),
        }
    }
}
