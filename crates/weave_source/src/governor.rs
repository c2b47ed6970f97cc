//! Structured view of a user-authored declaration unit.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use weave_common::{MetadataId, MidError, ProviderClass, TypeRef};

/// The kind of a declaration unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    /// A class.
    #[default]
    Class,
    /// An interface.
    Interface,
    /// An enumeration.
    Enum,
    /// A record.
    Record,
}

impl DeclarationKind {
    /// Returns the keyword used when rendering this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            DeclarationKind::Class => "class",
            DeclarationKind::Interface => "interface",
            DeclarationKind::Enum => "enum",
            DeclarationKind::Record => "record",
        }
    }
}

/// A field declared directly in a governor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDetails {
    /// Field name.
    pub name: String,
    /// Declared type.
    pub ty: TypeRef,
    /// Trigger markers carried by the field.
    #[serde(default)]
    pub markers: Vec<String>,
}

/// A governor: the declaration an augmentation artifact is generated against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorDetails {
    /// Logical location path (the MID path component).
    pub path: String,
    /// Fully qualified name.
    pub qualified_name: String,
    /// Declaration kind.
    pub kind: DeclarationKind,
    /// File the declaration was read from. Artifacts are written next to it.
    pub source_file: PathBuf,
    /// Markers carried by the declaration itself.
    pub markers: Vec<String>,
    /// Declared fields, in source order.
    pub fields: Vec<FieldDetails>,
    /// Simple names of nested declarations.
    pub nested: Vec<String>,
    /// `false` when the source layer could not make sense of the declaration.
    pub valid: bool,
}

impl GovernorDetails {
    /// Creates a valid, empty class governor.
    pub fn new(
        path: impl Into<String>,
        qualified_name: impl Into<String>,
        source_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            path: path.into(),
            qualified_name: qualified_name.into(),
            kind: DeclarationKind::Class,
            source_file: source_file.into(),
            markers: Vec::new(),
            fields: Vec::new(),
            nested: Vec::new(),
            valid: true,
        }
    }

    /// Adds a marker.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.push(marker.into());
        self
    }

    /// Adds a field without markers.
    pub fn with_field(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.fields.push(FieldDetails {
            name: name.into(),
            ty,
            markers: Vec::new(),
        });
        self
    }

    /// Adds a nested declaration name.
    pub fn with_nested(mut self, name: impl Into<String>) -> Self {
        self.nested.push(name.into());
        self
    }

    /// Returns the physical-type MID naming this governor.
    pub fn id(&self) -> Result<MetadataId, MidError> {
        ProviderClass::physical_type().instance_id(&self.path, &self.qualified_name)
    }

    /// Returns the name after the last `.`.
    pub fn simple_name(&self) -> &str {
        match self.qualified_name.rsplit_once('.') {
            Some((_, simple)) => simple,
            None => &self.qualified_name,
        }
    }

    /// Returns the package, or `None` for the default package.
    pub fn package(&self) -> Option<&str> {
        self.qualified_name.rsplit_once('.').map(|(pkg, _)| pkg)
    }

    /// Returns the directory holding the governor's source file.
    pub fn source_dir(&self) -> &Path {
        self.source_file.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Returns `true` if the declaration carries `marker`.
    pub fn has_marker(&self, marker: &str) -> bool {
        self.markers.iter().any(|m| m == marker)
    }

    /// Looks up a declared field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDetails> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> GovernorDetails {
        GovernorDetails::new("src", "com.example.Widget", "src/com/example/Widget.decl.toml")
            .with_marker("Bean")
            .with_field("name", TypeRef::new("java.lang.String"))
            .with_nested("Builder")
    }

    #[test]
    fn names() {
        let g = widget();
        assert_eq!(g.simple_name(), "Widget");
        assert_eq!(g.package(), Some("com.example"));
        assert_eq!(g.source_dir(), Path::new("src/com/example"));
    }

    #[test]
    fn default_package() {
        let g = GovernorDetails::new("src", "Widget", "Widget.decl.toml");
        assert_eq!(g.simple_name(), "Widget");
        assert_eq!(g.package(), None);
        assert_eq!(g.source_dir(), Path::new(""));
    }

    #[test]
    fn id_is_physical_type_instance() {
        let id = widget().id().unwrap();
        assert_eq!(id.as_str(), "MID:physical-type#src?com.example.Widget");
    }

    #[test]
    fn markers_and_fields() {
        let g = widget();
        assert!(g.has_marker("Bean"));
        assert!(!g.has_marker("ToString"));
        assert_eq!(g.field("name").unwrap().ty.simple_name(), "String");
        assert!(g.field("missing").is_none());
    }

    #[test]
    fn kind_keywords() {
        assert_eq!(DeclarationKind::default().keyword(), "class");
        assert_eq!(DeclarationKind::Record.keyword(), "record");
    }

    #[test]
    fn kind_serde_lowercase() {
        let json = serde_json::to_string(&DeclarationKind::Interface).unwrap();
        assert_eq!(json, "\"interface\"");
    }
}
