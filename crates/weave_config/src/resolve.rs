//! Provider resolution: merging a provider's defaults with `[providers.<name>]`.

use crate::error::ConfigError;
use crate::types::{ProjectConfig, ProviderOverride};

/// Built-in settings of a provider before configuration is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDefaults {
    /// Provider name, as used in `[providers.<name>]`.
    pub name: &'static str,
    /// Default trigger markers.
    pub markers: &'static [&'static str],
    /// Default artifact suffix.
    pub suffix: &'static str,
}

/// A provider's effective settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProvider {
    /// Provider name.
    pub name: String,
    /// Whether the provider runs.
    pub enabled: bool,
    /// Effective trigger markers.
    pub markers: Vec<String>,
    /// Effective artifact suffix.
    pub suffix: String,
}

/// Resolves each known provider against the configuration.
///
/// Override fields replace defaults entirely when present. A provider
/// section whose name is not in `known` is an error.
pub fn resolve_providers(
    config: &ProjectConfig,
    known: &[ProviderDefaults],
) -> Result<Vec<ResolvedProvider>, ConfigError> {
    if let Some(unknown) = config
        .providers
        .keys()
        .find(|name| !known.iter().any(|d| d.name == name.as_str()))
    {
        return Err(ConfigError::UnknownProvider(unknown.clone()));
    }

    let fallback = ProviderOverride::default();
    Ok(known
        .iter()
        .map(|defaults| {
            let overrides = config.providers.get(defaults.name).unwrap_or(&fallback);
            ResolvedProvider {
                name: defaults.name.to_string(),
                enabled: overrides.enabled,
                markers: overrides
                    .markers
                    .clone()
                    .unwrap_or_else(|| defaults.markers.iter().map(|m| m.to_string()).collect()),
                suffix: overrides
                    .suffix
                    .clone()
                    .unwrap_or_else(|| defaults.suffix.to_string()),
            }
        })
        .collect())
}
