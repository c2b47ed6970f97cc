//! Import registration and type-name abbreviation for one artifact.

use std::collections::{BTreeMap, BTreeSet};

use weave_common::TypeRef;
use weave_source::GovernorDetails;

/// Decides, type by type, whether a reference can use its simple name.
///
/// A simple name is bound to at most one qualified type per artifact. The
/// governor's own name and its nested declarations are bound up front, so a
/// foreign type sharing one of those names is always written fully
/// qualified.
pub struct ImportResolver<'a> {
    package: Option<&'a str>,
    implicit_packages: &'a [String],
    /// Simple name to the qualified type it abbreviates.
    bound: BTreeMap<String, String>,
    /// Qualified names that need an import line.
    imports: BTreeSet<String>,
}

impl<'a> ImportResolver<'a> {
    /// Creates a resolver for artifacts of `governor`.
    pub fn new(governor: &'a GovernorDetails, implicit_packages: &'a [String]) -> Self {
        let mut bound = BTreeMap::new();
        bound.insert(
            governor.simple_name().to_string(),
            governor.qualified_name.clone(),
        );
        for nested in &governor.nested {
            bound.insert(
                nested.clone(),
                format!("{}.{nested}", governor.qualified_name),
            );
        }
        Self {
            package: governor.package(),
            implicit_packages,
            bound,
            imports: BTreeSet::new(),
        }
    }

    /// Returns the text to use for `ty`, registering imports as needed.
    pub fn name(&mut self, ty: &TypeRef) -> String {
        let mut out = self.base_name(ty);
        if !ty.args.is_empty() {
            let args: Vec<String> = ty.args.iter().map(|arg| self.name(arg)).collect();
            out.push('<');
            out.push_str(&args.join(", "));
            out.push('>');
        }
        for _ in 0..ty.array_dims {
            out.push_str("[]");
        }
        out
    }

    /// Returns the registered imports, sorted.
    pub fn imports(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().map(String::as_str)
    }

    fn base_name(&mut self, ty: &TypeRef) -> String {
        let Some(package) = ty.package() else {
            return ty.qualified.clone();
        };
        let simple = ty.simple_name();
        match self.bound.get(simple) {
            Some(existing) if *existing == ty.qualified => simple.to_string(),
            Some(_) => ty.qualified.clone(),
            None => {
                self.bound
                    .insert(simple.to_string(), ty.qualified.clone());
                if !self.is_implicit(package) {
                    self.imports.insert(ty.qualified.clone());
                }
                simple.to_string()
            }
        }
    }

    fn is_implicit(&self, package: &str) -> bool {
        self.package == Some(package) || self.implicit_packages.iter().any(|p| p == package)
    }
}
