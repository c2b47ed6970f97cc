//! Dependency tracking between metadata identifiers.
//!
//! The [`DependencyRegistry`] stores "downstream is rebuilt when upstream
//! changes" edges in both directions. [`GraphSnapshot`] copies the registry
//! into a `petgraph` graph for cycle reports and Graphviz output.

#![warn(missing_docs)]

pub mod error;
pub mod registry;
pub mod snapshot;

pub use error::GraphError;
pub use registry::DependencyRegistry;
pub use snapshot::GraphSnapshot;
