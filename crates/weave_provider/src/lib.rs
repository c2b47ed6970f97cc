//! The incremental provider base.
//!
//! An [`AugmentationProvider`] says which governors it cares about and what
//! members it contributes to them. [`IncrementalProvider`] wraps it into an
//! engine [`MetadataProvider`](weave_metadata::MetadataProvider) that resolves
//! the governor, checks eligibility, renders the members, and keeps the
//! on-disk artifact in sync.

#![warn(missing_docs)]

pub mod context;
pub mod contract;
pub mod incremental;

pub use context::ComputeContext;
pub use contract::AugmentationProvider;
pub use incremental::{notify_governor_changed, IncrementalProvider};
pub use weave_metadata::ProviderError;
