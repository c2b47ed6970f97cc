//! References to declared types, as written in governors and augmentations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in type names that never carry a package.
const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// Deepest generic nesting accepted by [`TypeRef::parse`].
pub const MAX_TYPE_DEPTH: usize = 32;

/// Error produced when a type string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid type '{input}': {reason}")]
pub struct TypeParseError {
    /// The text that failed to parse.
    pub input: String,
    /// Description of the failure.
    pub reason: String,
}

/// A possibly generic, possibly array type reference such as
/// `java.util.List<com.example.Widget>[]`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeRef {
    /// Fully qualified name, without type arguments.
    pub qualified: String,
    /// Generic type arguments, in declaration order.
    pub args: Vec<TypeRef>,
    /// Number of trailing `[]` dimensions.
    pub array_dims: u8,
}

impl TypeRef {
    /// Creates a non-generic, non-array type reference.
    pub fn new(qualified: impl Into<String>) -> Self {
        Self {
            qualified: qualified.into(),
            args: Vec::new(),
            array_dims: 0,
        }
    }

    /// Adds a generic type argument.
    pub fn with_arg(mut self, arg: TypeRef) -> Self {
        self.args.push(arg);
        self
    }

    /// Parses a type string.
    pub fn parse(input: &str) -> Result<Self, TypeParseError> {
        let mut parser = Parser {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        };
        let ty = parser.parse_type(0)?;
        parser.skip_ws();
        if parser.pos != parser.bytes.len() {
            return Err(parser.error("unexpected trailing characters"));
        }
        Ok(ty)
    }

    /// Returns the name after the last `.`.
    pub fn simple_name(&self) -> &str {
        match self.qualified.rsplit_once('.') {
            Some((_, simple)) => simple,
            None => &self.qualified,
        }
    }

    /// Returns the package part, or `None` for unqualified names.
    pub fn package(&self) -> Option<&str> {
        self.qualified.rsplit_once('.').map(|(pkg, _)| pkg)
    }

    /// Returns `true` for built-in types such as `int` or `void`.
    pub fn is_primitive(&self) -> bool {
        PRIMITIVES.contains(&self.qualified.as_str())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        for _ in 0..self.array_dims {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for TypeRef {
    type Error = TypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn parse_type(&mut self, depth: usize) -> Result<TypeRef, TypeParseError> {
        if depth > MAX_TYPE_DEPTH {
            return Err(self.error("type arguments nested too deeply"));
        }
        self.skip_ws();
        let start = self.pos;
        while self.pos < self.bytes.len() {
            let c = self.bytes[self.pos];
            if c.is_ascii_alphanumeric() || c == b'_' || c == b'$' || c == b'.' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let qualified = &self.input[start..self.pos];
        if qualified.is_empty() {
            return Err(self.error("expected a type name"));
        }
        if qualified.starts_with('.') || qualified.ends_with('.') || qualified.contains("..") {
            return Err(self.error("malformed qualified name"));
        }
        let mut ty = TypeRef::new(qualified);

        self.skip_ws();
        if self.eat(b'<') {
            loop {
                ty.args.push(self.parse_type(depth + 1)?);
                self.skip_ws();
                if self.eat(b',') {
                    continue;
                }
                if self.eat(b'>') {
                    break;
                }
                return Err(self.error("expected ',' or '>'"));
            }
        }

        loop {
            self.skip_ws();
            if self.eat(b'[') {
                if !self.eat(b']') {
                    return Err(self.error("expected ']'"));
                }
                ty.array_dims = ty
                    .array_dims
                    .checked_add(1)
                    .ok_or_else(|| self.error("too many array dimensions"))?;
            } else {
                break;
            }
        }
        Ok(ty)
    }

    fn eat(&mut self, c: u8) -> bool {
        if self.bytes.get(self.pos) == Some(&c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|c| c.is_ascii_whitespace())
        {
            self.pos += 1;
        }
    }

    fn error(&self, reason: &str) -> TypeParseError {
        TypeParseError {
            input: self.input.to_string(),
            reason: format!("{reason} at offset {}", self.pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        let ty = TypeRef::parse("java.lang.String").unwrap();
        assert_eq!(ty.qualified, "java.lang.String");
        assert_eq!(ty.simple_name(), "String");
        assert_eq!(ty.package(), Some("java.lang"));
        assert!(ty.args.is_empty());
    }

    #[test]
    fn parse_generic_and_array() {
        let ty = TypeRef::parse("java.util.Map<java.lang.String, com.a.Widget[]>[]").unwrap();
        assert_eq!(ty.qualified, "java.util.Map");
        assert_eq!(ty.args.len(), 2);
        assert_eq!(ty.args[1].array_dims, 1);
        assert_eq!(ty.array_dims, 1);
        assert_eq!(
            ty.to_string(),
            "java.util.Map<java.lang.String, com.a.Widget[]>[]"
        );
    }

    #[test]
    fn primitive_has_no_package() {
        let ty = TypeRef::parse("int").unwrap();
        assert!(ty.is_primitive());
        assert_eq!(ty.package(), None);
        assert_eq!(ty.simple_name(), "int");
    }

    #[test]
    fn array_dimensions_are_bounded() {
        let max = format!("int{}", "[]".repeat(255));
        assert_eq!(TypeRef::parse(&max).unwrap().array_dims, 255);

        let over = format!("int{}", "[]".repeat(256));
        let err = TypeRef::parse(&over).unwrap_err();
        assert!(err.reason.starts_with("too many array dimensions"));
    }

    #[test]
    fn generic_nesting_is_bounded() {
        let nested = |depth: usize| format!("{}a.B{}", "a.L<".repeat(depth), ">".repeat(depth));
        assert!(TypeRef::parse(&nested(MAX_TYPE_DEPTH)).is_ok());

        let err = TypeRef::parse(&nested(MAX_TYPE_DEPTH + 1)).unwrap_err();
        assert!(err.reason.starts_with("type arguments nested too deeply"));
        assert!(TypeRef::parse(&nested(100_000)).is_err());
    }

    #[test]
    fn parse_errors() {
        assert!(TypeRef::parse("").is_err());
        assert!(TypeRef::parse("java.util.List<").is_err());
        assert!(TypeRef::parse("a..B").is_err());
        assert!(TypeRef::parse("a.B[").is_err());
        assert!(TypeRef::parse("a.B c").is_err());
    }

    #[test]
    fn error_display() {
        let err = TypeRef::parse("a..B").unwrap_err();
        assert!(err.to_string().starts_with("invalid type 'a..B'"));
    }

    #[test]
    fn serde_uses_string_form() {
        let ty = TypeRef::new("java.util.List").with_arg(TypeRef::new("a.B"));
        let json = serde_json::to_string(&ty).unwrap();
        assert_eq!(json, "\"java.util.List<a.B>\"");
        let back: TypeRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ty);
    }
}
