//! Augmentation content: the member model, deterministic rendering, and the
//! diff-and-write artifact lifecycle.
//!
//! Rendering is a pure function of the members and the governor, so the same
//! inputs always produce byte-identical text. The [`ArtifactWriter`] relies
//! on that to skip writes whose content is already on disk.

#![warn(missing_docs)]

pub mod artifact;
pub mod error;
pub mod files;
pub mod imports;
pub mod members;
pub mod render;

pub use artifact::{ArtifactOutcome, ArtifactWriter};
pub use error::FileError;
pub use files::{DiskFileLayer, FileLayer, MemoryFileLayer};
pub use imports::ImportResolver;
pub use members::{
    AugmentationMembers, ConstructorMember, FieldMarker, FieldMember, Marker, MethodMarker,
    MethodMember, NestedMember, Parameter,
};
pub use render::Composer;
