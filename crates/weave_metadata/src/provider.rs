//! The engine-facing provider seam.

use weave_common::{MetadataId, ProviderClass};

use crate::engine::MetadataEngine;
use crate::error::EngineError;
use crate::item::MetadataItem;

/// A producer of metadata items for one provider class.
///
/// The engine calls [`compute`](Self::compute) with the MID already marked
/// in flight and its upstream edges already cleared; the provider registers
/// whatever it depends on while computing.
pub trait MetadataProvider {
    /// The class of MIDs this provider produces.
    fn provider_class(&self) -> &ProviderClass;

    /// Computes the item for an instance-level MID of this provider's class.
    fn compute(&self, mid: &MetadataId, engine: &MetadataEngine)
        -> Result<MetadataItem, EngineError>;

    /// Narrows a change of `upstream` to the instance of this provider that
    /// cares about it, if any.
    fn resolve_downstream(&self, upstream: &MetadataId) -> Option<MetadataId>;

    /// Called once after registration.
    fn activate(&self, _engine: &MetadataEngine) -> Result<(), EngineError> {
        Ok(())
    }

    /// Called once before the provider is removed.
    fn deactivate(&self, _engine: &MetadataEngine) {}
}
