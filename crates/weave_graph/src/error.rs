//! Error types for dependency registration.

use weave_common::MetadataId;

/// Errors that can occur when registering dependency edges.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// An edge from a MID to itself was requested.
    #[error("refusing to register {0} as a dependency of itself")]
    SelfLoop(MetadataId),
}
