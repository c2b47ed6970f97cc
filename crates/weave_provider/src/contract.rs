//! The provider contract.

use std::rc::Rc;

use weave_common::{MetadataId, MidError, ProviderClass};
use weave_compose::AugmentationMembers;
use weave_metadata::{EngineError, NotificationListener};
use weave_source::{GovernorDetails, SourceLayer};

use crate::context::ComputeContext;

/// A concrete augmentation provider.
///
/// Only [`provider_class`](Self::provider_class),
/// [`artifact_suffix`](Self::artifact_suffix),
/// [`trigger_markers`](Self::trigger_markers) and
/// [`compute`](Self::compute) are required; the rest default to the usual
/// "one instance per governor" mapping.
pub trait AugmentationProvider {
    /// The class of MIDs this provider produces.
    fn provider_class(&self) -> &ProviderClass;

    /// Suffix of the artifact name, e.g. `Bean` for `Widget_Bean`.
    fn artifact_suffix(&self) -> &str;

    /// Markers that make a governor eligible.
    fn trigger_markers(&self) -> &[String];

    /// Contributes members to `governor`.
    ///
    /// `Ok(None)` and empty members both mean "nothing to write".
    fn compute(
        &self,
        ctx: &ComputeContext<'_>,
        governor: &GovernorDetails,
    ) -> Result<Option<AugmentationMembers>, EngineError>;

    /// The instance MID for a governor.
    fn create_instance_id(&self, path: &str, qualified_name: &str) -> Result<MetadataId, MidError> {
        self.provider_class().instance_id(path, qualified_name)
    }

    /// The governor MID behind an instance MID.
    fn resolve_governor_id(&self, instance: &MetadataId) -> Option<MetadataId> {
        instance.with_class(&ProviderClass::physical_type())
    }

    /// Narrows a class-level notification to this provider's instance.
    fn resolve_downstream_from_upstream(&self, upstream: &MetadataId) -> Option<MetadataId> {
        if upstream.belongs_to(&ProviderClass::physical_type()) {
            upstream.with_class(self.provider_class())
        } else {
            None
        }
    }

    /// Returns `true` if `governor` carries one of the trigger markers.
    fn is_eligible(&self, governor: &GovernorDetails, source: &dyn SourceLayer) -> bool {
        self.trigger_markers()
            .iter()
            .any(|marker| source.governor_has_marker(governor, marker))
    }

    /// Listeners installed while the provider is registered.
    fn listeners(&self) -> Vec<Rc<dyn NotificationListener>> {
        Vec::new()
    }
}
