//! Printed type signatures and their decoded form.
//!
//! The oracle leaks types as printed signatures such as `[Widget!]!`. The
//! grammar accepted here is the subset a [`TypeRef`] can represent:
//!
//! ```text
//! signature := inner "!"?
//! inner     := name | "[" name "!"? "]"
//! ```
//!
//! Nested lists, empty names and unbalanced brackets are rejected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in GraphQL scalar types.
pub const BUILTIN_SCALARS: &[&str] = &["Int", "Float", "String", "Boolean", "ID"];

/// Suffix that marks a type name as an input object.
const INPUT_SUFFIX: &str = "Input";

/// The kinds a blind reconstruction can tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    InputObject,
}

impl TypeKind {
    /// Classifies a bare type name by naming convention.
    #[must_use]
    pub fn classify(name: &str) -> Self {
        if name.ends_with(INPUT_SUFFIX) {
            Self::InputObject
        } else if is_builtin_scalar(name) {
            Self::Scalar
        } else {
            Self::Object
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => write!(f, "SCALAR"),
            Self::Object => write!(f, "OBJECT"),
            Self::InputObject => write!(f, "INPUT_OBJECT"),
        }
    }
}

#[must_use]
pub fn is_builtin_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name)
}

/// A resolved type signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    pub kind: TypeKind,
    pub is_list: bool,
    pub non_null_item: bool,
    pub non_null: bool,
}

impl TypeRef {
    /// Parses a printed signature.
    ///
    /// # Examples
    ///
    /// ```
    /// # use premonition::{TypeKind, TypeRef};
    /// let type_ref = TypeRef::parse("[WidgetPayload!]!").unwrap();
    /// assert_eq!(type_ref.name, "WidgetPayload");
    /// assert_eq!(type_ref.kind, TypeKind::Object);
    /// assert!(type_ref.is_list && type_ref.non_null_item && type_ref.non_null);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`SignatureError`] when `signature` is outside the grammar.
    pub fn parse(signature: &str) -> Result<Self, SignatureError> {
        let trimmed = signature.trim();
        let (inner, non_null) = match trimmed.strip_suffix('!') {
            Some(rest) => (rest, true),
            None => (trimmed, false),
        };

        let (name, is_list, non_null_item) = match inner.strip_prefix('[') {
            Some(rest) => {
                let item = rest
                    .strip_suffix(']')
                    .ok_or_else(|| SignatureError::new(signature, "unbalanced brackets"))?;
                let (name, non_null_item) = match item.strip_suffix('!') {
                    Some(name) => (name, true),
                    None => (item, false),
                };
                (name, true, non_null_item)
            }
            None => (inner, false, false),
        };

        if name.is_empty() {
            return Err(SignatureError::new(signature, "missing type name"));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(SignatureError::new(signature, "unexpected character"));
        }

        Ok(Self {
            name: name.to_string(),
            kind: TypeKind::classify(name),
            is_list,
            non_null_item,
            non_null,
        })
    }

    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.kind == TypeKind::Scalar
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let item_bang = if self.non_null_item { "!" } else { "" };
        let bang = if self.non_null { "!" } else { "" };
        if self.is_list {
            write!(f, "[{}{item_bang}]{bang}", self.name)
        } else {
            write!(f, "{}{bang}", self.name)
        }
    }
}

/// Strips list and non-null wrappers, leaving the bare type name.
#[must_use]
pub fn bare_name(signature: &str) -> String {
    signature
        .chars()
        .filter(|c| !matches!(c, '!' | '[' | ']'))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed type signature `{signature}`: {reason}")]
pub struct SignatureError {
    pub signature: String,
    pub reason: &'static str,
}

impl SignatureError {
    fn new(signature: &str, reason: &'static str) -> Self {
        Self {
            signature: signature.to_string(),
            reason,
        }
    }
}
