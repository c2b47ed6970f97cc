//! Deterministic text rendering of augmentation members.

use weave_source::GovernorDetails;

use crate::imports::ImportResolver;
use crate::members::{AugmentationMembers, Marker, Parameter};

/// First line of every rendered artifact.
const HEADER: &str = "// Generated by weave. Do not edit.";

/// Indentation of members inside the `augment` block.
const MEMBER_INDENT: &str = "    ";

/// Indentation of body lines inside a member.
const BODY_INDENT: &str = "        ";

/// Renders [`AugmentationMembers`] into artifact text.
///
/// Sections are emitted in a fixed order: supertypes, interfaces, type
/// markers, field markers, method markers, fields, constructors, methods,
/// nested declarations.
#[derive(Debug, Clone)]
pub struct Composer {
    implicit_packages: Vec<String>,
}

impl Composer {
    /// Creates a composer. Types in `implicit_packages` never need an import.
    pub fn new(implicit_packages: Vec<String>) -> Self {
        Self { implicit_packages }
    }

    /// Renders `members` for `governor`.
    ///
    /// Returns an empty string when there is nothing to render.
    pub fn render(&self, members: &AugmentationMembers, governor: &GovernorDetails) -> String {
        if members.is_empty() {
            return String::new();
        }
        let mut resolver = ImportResolver::new(governor, &self.implicit_packages);
        let body = render_members(members, governor, &mut resolver);

        let mut out = String::new();
        out.push_str(HEADER);
        out.push('\n');
        if let Some(package) = governor.package() {
            out.push_str(&format!("package {package};\n"));
        }
        out.push('\n');

        let mut any_import = false;
        for import in resolver.imports() {
            out.push_str(&format!("import {import};\n"));
            any_import = true;
        }
        if any_import {
            out.push('\n');
        }

        out.push_str(&format!("augment {} {{\n", governor.simple_name()));
        for line in body {
            if !line.is_empty() {
                out.push_str(&line);
            }
            out.push('\n');
        }
        out.push_str("}\n");
        out
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(vec!["java.lang".to_string()])
    }
}

/// Renders every member section to indented lines.
fn render_members(
    members: &AugmentationMembers,
    governor: &GovernorDetails,
    r: &mut ImportResolver<'_>,
) -> Vec<String> {
    let mut lines = Vec::new();

    for ty in &members.supertypes {
        lines.push(format!("{MEMBER_INDENT}extends {};", r.name(ty)));
    }
    for ty in &members.interfaces {
        lines.push(format!("{MEMBER_INDENT}implements {};", r.name(ty)));
    }
    for marker in &members.type_markers {
        lines.push(format!("{MEMBER_INDENT}marker type {};", marker_text(marker, r)));
    }
    for fm in &members.field_markers {
        lines.push(format!(
            "{MEMBER_INDENT}marker field {} {};",
            fm.field,
            marker_text(&fm.marker, r)
        ));
    }
    for mm in &members.method_markers {
        let params: Vec<String> = mm.param_types.iter().map(|t| r.name(t)).collect();
        lines.push(format!(
            "{MEMBER_INDENT}marker method {}({}) {};",
            mm.method,
            params.join(", "),
            marker_text(&mm.marker, r)
        ));
    }
    for field in &members.fields {
        let mut line = format!(
            "{MEMBER_INDENT}field {}{} {}",
            modifiers_text(&field.modifiers),
            r.name(&field.ty),
            field.name
        );
        if let Some(init) = &field.initializer {
            line.push_str(&format!(" = {init}"));
        }
        line.push(';');
        lines.push(line);
    }
    for ctor in &members.constructors {
        separate(&mut lines);
        lines.push(format!(
            "{MEMBER_INDENT}constructor {}{}({}) {{",
            modifiers_text(&ctor.modifiers),
            governor.simple_name(),
            params_text(&ctor.params, r)
        ));
        push_body(&mut lines, &ctor.body);
        lines.push(format!("{MEMBER_INDENT}}}"));
    }
    for method in &members.methods {
        separate(&mut lines);
        let signature = format!(
            "{MEMBER_INDENT}method {}{} {}({})",
            modifiers_text(&method.modifiers),
            r.name(&method.return_type),
            method.name,
            params_text(&method.params, r)
        );
        match &method.body {
            Some(body) => {
                lines.push(format!("{signature} {{"));
                push_body(&mut lines, body);
                lines.push(format!("{MEMBER_INDENT}}}"));
            }
            None => lines.push(format!("{signature};")),
        }
    }
    for nested in &members.nested {
        separate(&mut lines);
        lines.push(format!(
            "{MEMBER_INDENT}nested {}{} {} {{",
            modifiers_text(&nested.modifiers),
            nested.kind,
            nested.name
        ));
        push_body(&mut lines, &nested.body);
        lines.push(format!("{MEMBER_INDENT}}}"));
    }
    lines
}

/// Inserts a blank line before a block member unless it is the first line.
fn separate(lines: &mut Vec<String>) {
    if !lines.is_empty() {
        lines.push(String::new());
    }
}

fn push_body(lines: &mut Vec<String>, body: &[String]) {
    for line in body {
        if line.is_empty() {
            lines.push(String::new());
        } else {
            lines.push(format!("{BODY_INDENT}{line}"));
        }
    }
}

/// Renders modifiers followed by a space, or nothing.
fn modifiers_text(modifiers: &[String]) -> String {
    if modifiers.is_empty() {
        String::new()
    } else {
        format!("{} ", modifiers.join(" "))
    }
}

fn params_text(params: &[Parameter], r: &mut ImportResolver<'_>) -> String {
    let parts: Vec<String> = params
        .iter()
        .map(|p| format!("{} {}", r.name(&p.ty), p.name))
        .collect();
    parts.join(", ")
}

fn marker_text(marker: &Marker, r: &mut ImportResolver<'_>) -> String {
    let name = r.name(&marker.ty);
    if marker.attributes.is_empty() {
        return format!("@{name}");
    }
    let attrs: Vec<String> = marker
        .attributes
        .iter()
        .map(|(k, v)| format!("{k} = {v}"))
        .collect();
    format!("@{name}({})", attrs.join(", "))
}
