//! The source-layer interface consumed by the augmentation engine.
//!
//! Parsing user declarations is not this crate's job: it defines the
//! structured [`GovernorDetails`] the engine reads and the [`SourceLayer`]
//! trait through which a parser hands them over. [`MemorySourceLayer`] is an
//! in-memory implementation used by tests and by front ends that load
//! declarations eagerly.

#![warn(missing_docs)]

pub mod governor;
pub mod layer;

pub use governor::{DeclarationKind, FieldDetails, GovernorDetails};
pub use layer::{MemorySourceLayer, SourceLayer};
