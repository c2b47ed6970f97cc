//! The structured content of an augmentation.

use serde::{Deserialize, Serialize};
use weave_common::TypeRef;

/// A marker (annotation) with optional attributes, e.g. `@Column(name = "n")`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// Marker type.
    pub ty: TypeRef,
    /// `key = value` attributes, in the order they are rendered.
    #[serde(default)]
    pub attributes: Vec<(String, String)>,
}

impl Marker {
    /// Creates a marker without attributes.
    pub fn new(ty: TypeRef) -> Self {
        Self {
            ty,
            attributes: Vec::new(),
        }
    }

    /// Adds an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }
}

/// A marker introduced on an existing field of the governor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMarker {
    /// Name of the governor field.
    pub field: String,
    /// The marker to introduce.
    pub marker: Marker,
}

/// A marker introduced on an existing method of the governor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodMarker {
    /// Method name.
    pub method: String,
    /// Parameter types identifying the overload.
    pub param_types: Vec<TypeRef>,
    /// The marker to introduce.
    pub marker: Marker,
}

/// A method or constructor parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter type.
    pub ty: TypeRef,
    /// Parameter name.
    pub name: String,
}

impl Parameter {
    /// Creates a parameter.
    pub fn new(ty: TypeRef, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }
}

/// A field introduced into the governor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMember {
    /// Modifiers such as `private` or `static`.
    pub modifiers: Vec<String>,
    /// Field type.
    pub ty: TypeRef,
    /// Field name.
    pub name: String,
    /// Initializer expression, without the `=`.
    pub initializer: Option<String>,
}

impl FieldMember {
    /// Creates a field without modifiers or initializer.
    pub fn new(ty: TypeRef, name: impl Into<String>) -> Self {
        Self {
            modifiers: Vec::new(),
            ty,
            name: name.into(),
            initializer: None,
        }
    }
}

/// A constructor introduced into the governor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorMember {
    /// Modifiers such as `public`.
    pub modifiers: Vec<String>,
    /// Parameters.
    pub params: Vec<Parameter>,
    /// Body lines, without indentation.
    pub body: Vec<String>,
}

/// A method introduced into the governor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodMember {
    /// Modifiers such as `public`.
    pub modifiers: Vec<String>,
    /// Return type.
    pub return_type: TypeRef,
    /// Method name.
    pub name: String,
    /// Parameters.
    pub params: Vec<Parameter>,
    /// Body lines, or `None` for a bodiless declaration.
    pub body: Option<Vec<String>>,
}

impl MethodMember {
    /// Creates a public method with a body.
    pub fn public(
        return_type: TypeRef,
        name: impl Into<String>,
        params: Vec<Parameter>,
        body: Vec<String>,
    ) -> Self {
        Self {
            modifiers: vec!["public".to_string()],
            return_type,
            name: name.into(),
            params,
            body: Some(body),
        }
    }
}

/// A nested declaration introduced into the governor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedMember {
    /// Modifiers such as `public static`.
    pub modifiers: Vec<String>,
    /// Declaration keyword (`class`, `interface`, ...).
    pub kind: String,
    /// Simple name.
    pub name: String,
    /// Body lines, without indentation.
    pub body: Vec<String>,
}

/// Everything one provider contributes to one governor.
///
/// Each list is rendered in the order supplied; callers sort when they need
/// a particular order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AugmentationMembers {
    /// Supertypes the governor extends.
    pub supertypes: Vec<TypeRef>,
    /// Interfaces the governor implements.
    pub interfaces: Vec<TypeRef>,
    /// Markers introduced on the governor itself.
    pub type_markers: Vec<Marker>,
    /// Markers introduced on governor fields.
    pub field_markers: Vec<FieldMarker>,
    /// Markers introduced on governor methods.
    pub method_markers: Vec<MethodMarker>,
    /// Introduced fields.
    pub fields: Vec<FieldMember>,
    /// Introduced constructors.
    pub constructors: Vec<ConstructorMember>,
    /// Introduced methods.
    pub methods: Vec<MethodMember>,
    /// Introduced nested declarations.
    pub nested: Vec<NestedMember>,
}

impl AugmentationMembers {
    /// Creates an empty member list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if nothing would be rendered.
    pub fn is_empty(&self) -> bool {
        self.supertypes.is_empty()
            && self.interfaces.is_empty()
            && self.type_markers.is_empty()
            && self.field_markers.is_empty()
            && self.method_markers.is_empty()
            && self.fields.is_empty()
            && self.constructors.is_empty()
            && self.methods.is_empty()
            && self.nested.is_empty()
    }

    /// Looks up an introduced method by name.
    pub fn method(&self, name: &str) -> Option<&MethodMember> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Looks up an introduced field by name.
    pub fn field(&self, name: &str) -> Option<&FieldMember> {
        self.fields.iter().find(|f| f.name == name)
    }
}
