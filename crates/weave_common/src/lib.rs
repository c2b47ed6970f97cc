//! Shared foundational types used across the Weave augmentation engine.
//!
//! This crate provides metadata identifiers (MIDs), content hashing used for
//! change detection, and the type-reference model shared by the source layer
//! and the augmentation composer.

#![warn(missing_docs)]

pub mod hash;
pub mod mid;
pub mod type_ref;

pub use hash::{ContentHash, ContentHasher};
pub use mid::{InstanceKey, MetadataId, MidError, ProviderClass, PHYSICAL_TYPE_CLASS};
pub use type_ref::{TypeParseError, TypeRef};
