//! Accessor generation for governors marked `Bean`.

use weave_common::{MidError, ProviderClass, TypeRef};
use weave_compose::{AugmentationMembers, MethodMember, Parameter};
use weave_metadata::EngineError;
use weave_provider::{AugmentationProvider, ComputeContext};
use weave_source::GovernorDetails;

use super::capitalize;

/// Provider name and class.
pub const NAME: &str = "bean";

/// Fields carrying this marker get no accessors.
const SKIP_MARKER: &str = "Transient";

/// Emits a getter and a setter for every field, sorted by field name.
pub struct BeanProvider {
    class: ProviderClass,
    markers: Vec<String>,
    suffix: String,
}

impl BeanProvider {
    /// Creates the provider with the given trigger markers and suffix.
    pub fn new(markers: Vec<String>, suffix: String) -> Result<Self, MidError> {
        Ok(Self {
            class: ProviderClass::new(NAME)?,
            markers,
            suffix,
        })
    }

    /// The provider class.
    pub fn class(&self) -> &ProviderClass {
        &self.class
    }
}

/// Getter name for a field: `isX` for `boolean`, `getX` otherwise.
pub fn getter_name(field: &str, ty: &TypeRef) -> String {
    let prefix = if ty.qualified == "boolean" && ty.array_dims == 0 {
        "is"
    } else {
        "get"
    };
    format!("{prefix}{}", capitalize(field))
}

impl AugmentationProvider for BeanProvider {
    fn provider_class(&self) -> &ProviderClass {
        &self.class
    }

    fn artifact_suffix(&self) -> &str {
        &self.suffix
    }

    fn trigger_markers(&self) -> &[String] {
        &self.markers
    }

    fn compute(
        &self,
        _ctx: &ComputeContext<'_>,
        governor: &GovernorDetails,
    ) -> Result<Option<AugmentationMembers>, EngineError> {
        let mut fields: Vec<_> = governor
            .fields
            .iter()
            .filter(|f| !f.markers.iter().any(|m| m == SKIP_MARKER))
            .collect();
        fields.sort_by(|a, b| a.name.cmp(&b.name));

        let mut members = AugmentationMembers::new();
        for field in fields {
            members.methods.push(MethodMember::public(
                field.ty.clone(),
                getter_name(&field.name, &field.ty),
                Vec::new(),
                vec![format!("return this.{};", field.name)],
            ));
            members.methods.push(MethodMember::public(
                TypeRef::new("void"),
                format!("set{}", capitalize(&field.name)),
                vec![Parameter::new(field.ty.clone(), field.name.clone())],
                vec![format!("this.{0} = {0};", field.name)],
            ));
        }
        Ok(Some(members))
    }
}
