//! Governor declarations read from `<Simple>.decl.toml` files.
//!
//! The directory of a declaration below its source root is its package, so
//! `src/com/example/Widget.decl.toml` declares `com.example.Widget`:
//!
//! ```toml
//! name = "Widget"          # optional, defaults to the file stem
//! kind = "class"           # class | interface | enum | record
//! markers = ["Bean"]
//! nested = ["Builder"]
//!
//! [[fields]]
//! name = "name"
//! type = "java.lang.String"
//! markers = []
//! ```
//!
//! A declaration that cannot be parsed still yields a governor, marked
//! invalid, so its stale artifacts are cleaned up like any other.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use weave_common::{TypeParseError, TypeRef};
use weave_source::{DeclarationKind, FieldDetails, GovernorDetails};

/// File name suffix of declaration files.
pub const DECLARATION_SUFFIX: &str = ".decl.toml";

/// Errors raised while reading declarations.
#[derive(Debug, thiserror::Error)]
pub enum DeclarationError {
    /// A declaration file or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The TOML content is malformed.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// The declaration file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A field type could not be parsed.
    #[error("field '{field}' in {path}: {source}")]
    FieldType {
        /// The declaration file.
        path: PathBuf,
        /// The offending field.
        field: String,
        /// The type parse failure.
        source: TypeParseError,
    },

    /// The declared name is not a simple identifier.
    #[error("invalid declaration name '{name}' in {path}")]
    Name {
        /// The declaration file.
        path: PathBuf,
        /// The rejected name.
        name: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeclarationFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    kind: DeclarationKind,
    #[serde(default)]
    markers: Vec<String>,
    #[serde(default)]
    fields: Vec<FieldEntry>,
    #[serde(default)]
    nested: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldEntry {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    markers: Vec<String>,
}

/// Parses one declaration.
///
/// `source_root` becomes the governor's MID path; `package` is the dotted
/// directory path below the root, if any.
pub fn parse_declaration(
    content: &str,
    source_root: &str,
    package: Option<&str>,
    file: &Path,
) -> Result<GovernorDetails, DeclarationError> {
    let decl: DeclarationFile = toml::from_str(content).map_err(|e| DeclarationError::Parse {
        path: file.to_path_buf(),
        message: e.to_string(),
    })?;
    let name = decl.name.unwrap_or_else(|| file_stem(file).to_string());
    if !is_simple_name(&name) {
        return Err(DeclarationError::Name {
            path: file.to_path_buf(),
            name,
        });
    }

    let mut governor = GovernorDetails::new(source_root, qualify(package, &name), file);
    governor.kind = decl.kind;
    governor.markers = decl.markers;
    governor.nested = decl.nested;
    for entry in decl.fields {
        let ty = TypeRef::parse(&entry.ty).map_err(|source| DeclarationError::FieldType {
            path: file.to_path_buf(),
            field: entry.name.clone(),
            source,
        })?;
        governor.fields.push(FieldDetails {
            name: entry.name,
            ty,
            markers: entry.markers,
        });
    }
    Ok(governor)
}

/// Reads every declaration below `project_root/source_root`, sorted by path.
///
/// Unparseable declarations are returned as invalid governors. Declarations
/// whose package or name cannot be part of a MID are skipped.
pub fn scan_source_root(
    project_root: &Path,
    source_root: &str,
) -> Result<Vec<GovernorDetails>, DeclarationError> {
    let base = project_root.join(source_root);
    if !base.is_dir() {
        tracing::warn!(root = %base.display(), "source root does not exist");
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    walk(&base, &mut files)?;
    files.sort();

    let mut governors = Vec::with_capacity(files.len());
    for file in files {
        let package = package_of(&base, &file);
        let content = std::fs::read_to_string(&file).map_err(|source| DeclarationError::Io {
            path: file.clone(),
            source,
        })?;
        let governor = match parse_declaration(&content, source_root, package.as_deref(), &file) {
            Ok(governor) => governor,
            Err(e) => {
                tracing::warn!("{e}");
                let name = qualify(package.as_deref(), file_stem(&file));
                let mut governor = GovernorDetails::new(source_root, name, &file);
                governor.valid = false;
                governor
            }
        };
        if let Err(e) = governor.id() {
            tracing::warn!(file = %file.display(), "skipping declaration: {e}");
            continue;
        }
        governors.push(governor);
    }
    Ok(governors)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), DeclarationError> {
    let io = |source| DeclarationError::Io {
        path: dir.to_path_buf(),
        source,
    };
    for entry in std::fs::read_dir(dir).map_err(io)? {
        let path = entry.map_err(io)?.path();
        if path.is_dir() {
            walk(&path, files)?;
        } else if is_declaration(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// Returns `true` if `path` names a declaration file.
pub fn is_declaration(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(DECLARATION_SUFFIX) && n.len() > DECLARATION_SUFFIX.len())
}

fn file_stem(file: &Path) -> &str {
    file.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(DECLARATION_SUFFIX))
        .unwrap_or_default()
}

fn package_of(base: &Path, file: &Path) -> Option<String> {
    let dir = file.parent()?.strip_prefix(base).ok()?;
    let parts: Vec<&str> = dir
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("."))
    }
}

fn qualify(package: Option<&str>, name: &str) -> String {
    match package {
        Some(p) => format!("{p}.{name}"),
        None => name.to_string(),
    }
}

fn is_simple_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
