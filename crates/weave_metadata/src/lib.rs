//! The metadata cache and change-notification engine.
//!
//! [`MetadataEngine`] memoizes one [`MetadataItem`] per instance-level
//! [`MetadataId`](weave_common::MetadataId), owns the dependency registry,
//! and propagates change notifications depth-first through the providers that
//! registered interest. A [`HashTracker`] suppresses notifications for
//! recomputations whose content did not change, and [`NotificationListener`]s
//! observe every notification pair, which is how [`DiscoveryListener`] lets a
//! provider react to members it never registered a dependency on.
//!
//! The engine is single-threaded and re-entrant: providers call back into it
//! while they compute, so all state lives behind `RefCell`s whose borrows
//! never span a call into a provider.

#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod item;
pub mod listener;
pub mod memo;
pub mod provider;
pub mod stats;

pub use engine::{EngineConfig, MetadataEngine};
pub use error::{EngineError, ProviderError};
pub use item::{Augmentation, MetadataItem};
pub use listener::{DiscoveryListener, NotificationListener};
pub use memo::HashTracker;
pub use provider::MetadataProvider;
pub use stats::CacheStats;
