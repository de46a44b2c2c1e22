//! The schema aggregate built up during a run.

use crate::signature::{TypeKind, TypeRef};
use crate::{PremonitionError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An argument of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputValue {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
}

impl InputValue {
    #[must_use]
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default)]
    pub args: Vec<InputValue>,
}

impl Field {
    #[must_use]
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            args: Vec::new(),
        }
    }
}

/// A type entry. Serialized without its name, which is the map key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedType {
    pub kind: TypeKind,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl NamedType {
    #[must_use]
    pub const fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
        }
    }
}

/// The reconstructed schema.
///
/// Every type referenced by a field or argument gets an entry, possibly with
/// no fields. Entries are only ever added, never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub query_type: Option<String>,
    pub mutation_type: Option<String>,
    pub subscription_type: Option<String>,
    #[serde(default)]
    pub types: IndexMap<String, NamedType>,
}

impl Schema {
    #[must_use]
    pub fn new(
        query_type: Option<String>,
        mutation_type: Option<String>,
        subscription_type: Option<String>,
    ) -> Self {
        Self {
            query_type,
            mutation_type,
            subscription_type,
            types: IndexMap::new(),
        }
    }

    /// Loads a snapshot previously produced by [`Schema::to_json`].
    ///
    /// # Errors
    ///
    /// Returns [`PremonitionError::Snapshot`] if `value` does not have the
    /// schema document shape.
    pub fn from_snapshot(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| PremonitionError::Snapshot(e.to_string()))
    }

    /// Inserts an empty type if `name` is not yet known. Idempotent; an
    /// existing entry keeps its kind and fields.
    pub fn register_type(&mut self, name: &str, kind: TypeKind) {
        if !self.types.contains_key(name) {
            tracing::trace!(name, %kind, "Registering type");
            self.types.insert(name.to_string(), NamedType::new(kind));
        }
    }

    /// Appends `field` to `container`, registering the container as an object
    /// type first if needed. A field whose name the container already has is
    /// left out, so resuming from a snapshot never duplicates fields.
    pub fn add_field(&mut self, container: &str, field: Field) {
        self.register_type(container, TypeKind::Object);
        if let Some(named) = self.types.get_mut(container) {
            if named.fields.iter().any(|known| known.name == field.name) {
                tracing::debug!(container, field = %field.name, "Field already known, keeping existing");
                return;
            }
            named.fields.push(field);
        }
    }

    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<&NamedType> {
        self.types.get(name)
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// # Errors
    ///
    /// Returns [`PremonitionError::Snapshot`] if serialization fails.
    pub fn to_json_string_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PremonitionError::Snapshot(e.to_string()))
    }

    /// Type names referenced by fields or arguments that have no entry.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<&str> {
        let mut dangling: Vec<&str> = self
            .types
            .values()
            .flat_map(|named| &named.fields)
            .flat_map(|field| {
                std::iter::once(&field.type_ref).chain(field.args.iter().map(|arg| &arg.type_ref))
            })
            .map(|type_ref| type_ref.name.as_str())
            .filter(|name| !self.types.contains_key(*name))
            .collect();
        dangling.sort_unstable();
        dangling.dedup();
        dangling
    }
}
