//! Error types for metadata computation and propagation.

use weave_common::{MetadataId, MidError, ProviderClass};
use weave_compose::FileError;
use weave_graph::GraphError;

/// A hard failure reported by a provider's compute function.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    /// Description of the failure.
    pub message: String,
}

impl ProviderError {
    /// Creates a provider error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that abort a `get` or `notify` call.
///
/// Missing or ineligible governors are not errors: they produce an invalid
/// item. Everything here propagates out of the current call chain.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No provider is registered for the MID's provider class.
    #[error("no provider registered for {0}")]
    NoProvider(MetadataId),

    /// A provider class was registered twice.
    #[error("provider class '{0}' is already registered")]
    DuplicateProvider(ProviderClass),

    /// Only instance-level MIDs can be computed.
    #[error("cannot compute class-level metadata id {0}")]
    ClassLevelRequest(MetadataId),

    /// A MID was requested while it was already being computed.
    #[error("dependency cycle detected: {}", format_chain(.chain))]
    Cycle {
        /// The in-flight MIDs from the first occurrence to the repeated request.
        chain: Vec<MetadataId>,
    },

    /// Nested notifications exceeded the configured depth.
    #[error("notification depth exceeded {limit} while propagating {upstream}")]
    PropagationTooDeep {
        /// The upstream whose propagation hit the limit.
        upstream: MetadataId,
        /// The configured limit.
        limit: usize,
    },

    /// A provider's compute function failed.
    #[error("failed to compute {mid}: {source}")]
    Provider {
        /// The MID being computed.
        mid: MetadataId,
        /// The provider's failure.
        source: ProviderError,
    },

    /// Reading, writing or deleting an artifact failed.
    #[error("artifact update for {mid} failed: {source}")]
    Artifact {
        /// The MID whose artifact was being updated.
        mid: MetadataId,
        /// The underlying file error.
        source: FileError,
    },

    /// A dependency edge was rejected.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A metadata identifier could not be built.
    #[error(transparent)]
    Mid(#[from] MidError),
}

fn format_chain(chain: &[MetadataId]) -> String {
    chain
        .iter()
        .map(MetadataId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
