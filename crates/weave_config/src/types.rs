//! Configuration types deserialized from `weave.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;

/// The top-level project configuration parsed from `weave.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata (name, source roots).
    pub project: ProjectMeta,
    /// Where and how artifacts are written.
    #[serde(default)]
    pub artifacts: ArtifactConfig,
    /// Metadata engine limits.
    #[serde(default)]
    pub engine: EngineSettings,
    /// Per-provider overrides, keyed by provider name.
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderOverride>,
}

/// Core project metadata required in every `weave.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// Directories scanned for declarations, relative to the project root.
    ///
    /// Each root also becomes the path component of the MIDs built for the
    /// governors found under it.
    #[serde(default = "default_source_roots")]
    pub source_roots: Vec<String>,
}

fn default_source_roots() -> Vec<String> {
    vec!["src".to_string()]
}

/// Artifact output settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactConfig {
    /// File extension of generated artifacts, without the dot.
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Packages whose types are never imported.
    #[serde(default = "default_implicit_packages")]
    pub implicit_packages: Vec<String>,
}

fn default_extension() -> String {
    "aug".to_string()
}

fn default_implicit_packages() -> Vec<String> {
    vec!["java.lang".to_string()]
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            implicit_packages: default_implicit_packages(),
        }
    }
}

/// Metadata engine settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Maximum nesting of change notifications before a build is aborted.
    #[serde(default = "default_max_notify_depth")]
    pub max_notify_depth: usize,
}

fn default_max_notify_depth() -> usize {
    64
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_notify_depth: default_max_notify_depth(),
        }
    }
}

/// Overrides for one provider. Unset fields keep the provider's defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderOverride {
    /// Whether the provider runs at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Replacement trigger markers.
    #[serde(default)]
    pub markers: Option<Vec<String>>,
    /// Replacement artifact suffix.
    #[serde(default)]
    pub suffix: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl Default for ProviderOverride {
    fn default() -> Self {
        Self {
            enabled: true,
            markers: None,
            suffix: None,
        }
    }
}
