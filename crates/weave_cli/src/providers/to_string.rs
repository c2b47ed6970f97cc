//! `toString()` generation for governors marked `ToString`.
//!
//! The generated method calls accessors when the bean provider has produced
//! them for the same governor and reads fields directly otherwise. It never
//! registers a dependency on the bean item: a [`DiscoveryListener`] triggers
//! a recompute when accessors appear, and again whenever the bean item
//! changes without them, so dropped accessors are not left behind.

use std::rc::Rc;

use weave_common::{MidError, ProviderClass, TypeRef};
use weave_compose::{AugmentationMembers, MethodMember};
use weave_metadata::{DiscoveryListener, EngineError, NotificationListener};
use weave_provider::{AugmentationProvider, ComputeContext};
use weave_source::GovernorDetails;

use super::bean::{self, getter_name};

/// Provider name and class.
pub const NAME: &str = "to_string";

/// Emits `toString()` over the governor's fields in declaration order.
pub struct ToStringProvider {
    class: ProviderClass,
    bean: ProviderClass,
    markers: Vec<String>,
    suffix: String,
}

impl ToStringProvider {
    /// Creates the provider with the given trigger markers and suffix.
    pub fn new(markers: Vec<String>, suffix: String) -> Result<Self, MidError> {
        Ok(Self {
            class: ProviderClass::new(NAME)?,
            bean: ProviderClass::new(bean::NAME)?,
            markers,
            suffix,
        })
    }

    /// The provider class.
    pub fn class(&self) -> &ProviderClass {
        &self.class
    }
}

fn has_accessors(members: &AugmentationMembers) -> bool {
    members
        .methods
        .iter()
        .any(|m| m.name.starts_with("get") || m.name.starts_with("is"))
}

impl AugmentationProvider for ToStringProvider {
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
        ctx: &ComputeContext<'_>,
        governor: &GovernorDetails,
    ) -> Result<Option<AugmentationMembers>, EngineError> {
        let bean = ctx
            .mid()
            .with_class(&self.bean)
            .and_then(|mid| ctx.peek(&mid));
        let accessors = bean.as_ref().and_then(|item| item.members());

        let mut expr = format!("\"{}[", governor.simple_name());
        for (i, field) in governor.fields.iter().enumerate() {
            if i > 0 {
                expr.push_str(", ");
            }
            let getter = getter_name(&field.name, &field.ty);
            let read = match accessors.and_then(|m| m.method(&getter)) {
                Some(_) => format!("{getter}()"),
                None => format!("this.{}", field.name),
            };
            expr.push_str(&format!("{}=\" + {read} + \"", field.name));
        }
        expr.push_str("]\"");

        let mut members = AugmentationMembers::new();
        members.methods.push(MethodMember::public(
            TypeRef::new("java.lang.String"),
            "toString",
            Vec::new(),
            vec![format!("return {expr};")],
        ));
        Ok(Some(members))
    }

    fn listeners(&self) -> Vec<Rc<dyn NotificationListener>> {
        let bean = self.bean.clone();
        let listener = DiscoveryListener::new(
            format!("{NAME}-accessors"),
            self.class.clone(),
            has_accessors,
        )
        .with_target_resolver(move |upstream, class| {
            if upstream.belongs_to(&bean) {
                upstream.with_class(class)
            } else {
                None
            }
        })
        .also_when_unmatched();
        vec![Rc::new(listener)]
    }
}
