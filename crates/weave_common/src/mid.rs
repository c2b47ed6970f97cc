//! Metadata identifiers (MIDs).
//!
//! A MID names either every item produced by one provider (class-level) or a
//! single computed item (instance-level):
//!
//! ```text
//! MID:<provider-class>
//! MID:<provider-class>#<path>?<qualified-name>
//! ```
//!
//! `#` and `?` are reserved and rejected inside components, so an
//! instance-level MID always decodes back to exactly one `(path, name)` pair.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by every metadata identifier.
const MID_PREFIX: &str = "MID:";

/// Separates the provider class from the instance key.
const INSTANCE_DELIMITER: char = '#';

/// Separates the path from the qualified name inside the instance key.
const NAME_DELIMITER: char = '?';

/// Provider class of the governor items produced by the source layer.
pub const PHYSICAL_TYPE_CLASS: &str = "physical-type";

/// Errors raised when building or parsing a [`MetadataId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MidError {
    /// The string does not start with `MID:`.
    #[error("metadata id '{0}' does not start with 'MID:'")]
    MissingPrefix(String),

    /// The provider class component is empty.
    #[error("provider class must not be empty")]
    EmptyProviderClass,

    /// The qualified name component is empty.
    #[error("qualified name must not be empty")]
    EmptyQualifiedName,

    /// A component contains a reserved delimiter.
    #[error("{component} '{value}' contains reserved character '{reserved}'")]
    ReservedCharacter {
        /// Which component was rejected.
        component: &'static str,
        /// The rejected value.
        value: String,
        /// The offending delimiter.
        reserved: char,
    },
}

/// The provider-class facet of a MID.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderClass(String);

impl ProviderClass {
    /// Creates a provider class, rejecting empty names and reserved characters.
    pub fn new(name: impl Into<String>) -> Result<Self, MidError> {
        let name = name.into();
        if name.is_empty() {
            return Err(MidError::EmptyProviderClass);
        }
        reject_reserved("provider class", &name, &[INSTANCE_DELIMITER, NAME_DELIMITER])?;
        Ok(Self(name))
    }

    /// The provider class of governors produced by the source layer.
    pub fn physical_type() -> Self {
        Self(PHYSICAL_TYPE_CLASS.to_string())
    }

    /// Returns the class name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the class-level MID for this provider.
    pub fn class_id(&self) -> MetadataId {
        MetadataId::for_class(self)
    }

    /// Returns the instance-level MID for `qualified_name` under `path`.
    pub fn instance_id(&self, path: &str, qualified_name: &str) -> Result<MetadataId, MidError> {
        MetadataId::for_instance(self, path, qualified_name)
    }
}

impl fmt::Display for ProviderClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProviderClass {
    type Error = MidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProviderClass> for String {
    fn from(value: ProviderClass) -> Self {
        value.0
    }
}

/// The decoded instance key of an instance-level MID.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InstanceKey<'a> {
    /// Location path (for example a source root).
    pub path: &'a str,
    /// Fully qualified name of the governor.
    pub qualified_name: &'a str,
}

/// An opaque metadata identifier.
///
/// Equality is exact string equality; producers must canonicalize paths
/// before building identifiers.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MetadataId(String);

impl MetadataId {
    /// Builds the class-level MID for a provider class.
    pub fn for_class(provider_class: &ProviderClass) -> Self {
        Self(format!("{MID_PREFIX}{}", provider_class.as_str()))
    }

    /// Builds an instance-level MID.
    pub fn for_instance(
        provider_class: &ProviderClass,
        path: &str,
        qualified_name: &str,
    ) -> Result<Self, MidError> {
        reject_reserved("path", path, &[INSTANCE_DELIMITER, NAME_DELIMITER])?;
        if qualified_name.is_empty() {
            return Err(MidError::EmptyQualifiedName);
        }
        reject_reserved(
            "qualified name",
            qualified_name,
            &[INSTANCE_DELIMITER, NAME_DELIMITER],
        )?;
        Ok(Self(format!(
            "{MID_PREFIX}{}{INSTANCE_DELIMITER}{path}{NAME_DELIMITER}{qualified_name}",
            provider_class.as_str()
        )))
    }

    /// Parses and validates a MID string.
    pub fn parse(s: &str) -> Result<Self, MidError> {
        let body = s
            .strip_prefix(MID_PREFIX)
            .ok_or_else(|| MidError::MissingPrefix(s.to_string()))?;
        match body.split_once(INSTANCE_DELIMITER) {
            None => Ok(Self::for_class(&ProviderClass::new(body)?)),
            Some((class, key)) => {
                let class = ProviderClass::new(class)?;
                let (path, name) = key
                    .split_once(NAME_DELIMITER)
                    .ok_or(MidError::EmptyQualifiedName)?;
                Self::for_instance(&class, path, name)
            }
        }
    }

    /// Returns `true` if this MID names one specific item.
    pub fn is_instance(&self) -> bool {
        self.0.contains(INSTANCE_DELIMITER)
    }

    /// Returns `true` if this MID names every item of a provider.
    pub fn is_class(&self) -> bool {
        !self.is_instance()
    }

    /// Returns the provider-class component as a string slice.
    pub fn provider_class_str(&self) -> &str {
        let body = &self.0[MID_PREFIX.len()..];
        match body.split_once(INSTANCE_DELIMITER) {
            Some((class, _)) => class,
            None => body,
        }
    }

    /// Returns the provider-class component.
    pub fn provider_class(&self) -> ProviderClass {
        ProviderClass(self.provider_class_str().to_string())
    }

    /// Returns the class-level MID of the provider that owns this MID.
    ///
    /// A class-level MID returns itself.
    pub fn class_of(&self) -> MetadataId {
        Self(format!("{MID_PREFIX}{}", self.provider_class_str()))
    }

    /// Returns `true` if this MID belongs to `provider_class`.
    pub fn belongs_to(&self, provider_class: &ProviderClass) -> bool {
        self.provider_class_str() == provider_class.as_str()
    }

    /// Decodes the instance key, or `None` for class-level MIDs.
    pub fn instance_key(&self) -> Option<InstanceKey<'_>> {
        let (_, key) = self.0.split_once(INSTANCE_DELIMITER)?;
        let (path, qualified_name) = key.split_once(NAME_DELIMITER)?;
        Some(InstanceKey {
            path,
            qualified_name,
        })
    }

    /// Re-keys an instance-level MID under another provider class.
    ///
    /// Returns `None` for class-level MIDs.
    pub fn with_class(&self, provider_class: &ProviderClass) -> Option<MetadataId> {
        let key = self.instance_key()?;
        Some(Self(format!(
            "{MID_PREFIX}{}{INSTANCE_DELIMITER}{}{NAME_DELIMITER}{}",
            provider_class.as_str(),
            key.path,
            key.qualified_name
        )))
    }

    /// Returns the MID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetadataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for MetadataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MetadataId({})", self.0)
    }
}

impl TryFrom<String> for MetadataId {
    type Error = MidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MetadataId> for String {
    fn from(value: MetadataId) -> Self {
        value.0
    }
}

fn reject_reserved(
    component: &'static str,
    value: &str,
    reserved: &[char],
) -> Result<(), MidError> {
    match value.chars().find(|c| reserved.contains(c)) {
        Some(c) => Err(MidError::ReservedCharacter {
            component,
            value: value.to_string(),
            reserved: c,
        }),
        None => Ok(()),
    }
}
