//! The providers shipped with the `weave` binary.

pub mod bean;
pub mod to_string;

use std::rc::Rc;

use weave_common::ProviderClass;
use weave_compose::{ArtifactWriter, Composer};
use weave_config::{ProviderDefaults, ResolvedProvider};
use weave_metadata::{EngineError, MetadataEngine};
use weave_provider::IncrementalProvider;
use weave_source::SourceLayer;

pub use bean::BeanProvider;
pub use to_string::ToStringProvider;

/// Built-in defaults of every shipped provider.
pub const KNOWN: &[ProviderDefaults] = &[
    ProviderDefaults {
        name: bean::NAME,
        markers: &["Bean"],
        suffix: "Bean",
    },
    ProviderDefaults {
        name: to_string::NAME,
        markers: &["ToString"],
        suffix: "ToString",
    },
];

/// Registers every enabled provider with `engine`.
///
/// Returns the classes that were registered.
pub fn install(
    engine: &MetadataEngine,
    source: Rc<dyn SourceLayer>,
    writer: &ArtifactWriter,
    composer: &Composer,
    resolved: &[ResolvedProvider],
) -> Result<Vec<ProviderClass>, EngineError> {
    let mut installed = Vec::new();
    for settings in resolved.iter().filter(|p| p.enabled) {
        match settings.name.as_str() {
            bean::NAME => {
                let provider = BeanProvider::new(settings.markers.clone(), settings.suffix.clone())?;
                installed.push(provider.class().clone());
                engine.register_provider(Rc::new(IncrementalProvider::new(
                    provider,
                    source.clone(),
                    writer.clone(),
                    composer.clone(),
                )))?;
            }
            to_string::NAME => {
                let provider =
                    ToStringProvider::new(settings.markers.clone(), settings.suffix.clone())?;
                installed.push(provider.class().clone());
                engine.register_provider(Rc::new(IncrementalProvider::new(
                    provider,
                    source.clone(),
                    writer.clone(),
                    composer.clone(),
                )))?;
            }
            other => tracing::warn!(provider = other, "no implementation for provider"),
        }
    }
    Ok(installed)
}

/// Upper-cases the first character, e.g. `name` to `Name`.
pub(crate) fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_words() {
        assert_eq!(capitalize("name"), "Name");
        assert_eq!(capitalize("x"), "X");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn known_names_are_unique() {
        assert_ne!(KNOWN[0].name, KNOWN[1].name);
    }
}
