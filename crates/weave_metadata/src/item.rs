//! Computed metadata items.

use std::path::{Path, PathBuf};

use weave_common::{ContentHash, ContentHasher, MetadataId};
use weave_compose::AugmentationMembers;

/// The content payload of a valid item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Augmentation {
    /// The structured members.
    pub members: AugmentationMembers,
    /// The rendered artifact text (empty when there is nothing to write).
    pub rendered: String,
    /// Where the artifact lives, if the provider writes one.
    pub artifact: Option<PathBuf>,
}

/// The computed result for one instance-level MID.
///
/// An invalid item means the governor is missing, invalid, or no longer
/// eligible. A valid item may still carry an empty payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataItem {
    id: MetadataId,
    valid: bool,
    payload: Option<Augmentation>,
    hash: ContentHash,
}

impl MetadataItem {
    /// Creates an invalid item.
    pub fn invalid(id: MetadataId) -> Self {
        let hash = ContentHasher::new().flag(false).finish();
        Self {
            id,
            valid: false,
            payload: None,
            hash,
        }
    }

    /// Creates a valid item with an optional payload.
    pub fn valid(id: MetadataId, payload: Option<Augmentation>) -> Self {
        let mut hasher = ContentHasher::new();
        hasher.flag(true);
        if let Some(p) = &payload {
            hasher.field(p.rendered.as_bytes());
        }
        let hash = hasher.finish();
        Self {
            id,
            valid: true,
            payload,
            hash,
        }
    }

    /// The MID this item was computed for.
    pub fn id(&self) -> &MetadataId {
        &self.id
    }

    /// Returns `true` if the computation succeeded and the instance qualifies.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The payload, when valid and non-empty.
    pub fn payload(&self) -> Option<&Augmentation> {
        self.payload.as_ref()
    }

    /// The augmentation members, when present.
    pub fn members(&self) -> Option<&AugmentationMembers> {
        self.payload.as_ref().map(|p| &p.members)
    }

    /// The artifact path, when the payload names one.
    pub fn artifact(&self) -> Option<&Path> {
        self.payload.as_ref().and_then(|p| p.artifact.as_deref())
    }

    /// Hash of the validity flag and rendered content.
    pub fn hash(&self) -> ContentHash {
        self.hash
    }
}
