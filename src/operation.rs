//! operation descriptors
//!
//! operation kinds, typed variables, and the descriptor trait implemented by
//! caller response types.

use crate::error::{Error, Result};
use crate::query;
use crate::selection::{SelectionSet, TypeRef};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

/// response shape an operation selects and binds into
///
/// ```
/// use gqlclient::{Field, Operation, SelectionSet};
/// use serde::Deserialize;
///
/// #[derive(Debug, Default, Deserialize)]
/// struct ViewerQuery {
///     viewer: Viewer,
/// }
///
/// #[derive(Debug, Default, Deserialize)]
/// struct Viewer {
///     login: String,
/// }
///
/// impl Operation for ViewerQuery {
///     fn selection() -> SelectionSet {
///         SelectionSet::new([Field::object("viewer", "User", [Field::scalar("login", "String")])])
///     }
/// }
/// ```
pub trait Operation: DeserializeOwned {
    /// fields selected at the operation root
    fn selection() -> SelectionSet;
}

/// graphql operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    /// render the operation document for this kind
    pub fn build(self, selection: &SelectionSet, variables: &Variables) -> Result<String> {
        match self {
            OperationKind::Query => query::build_query(selection, variables),
            OperationKind::Mutation => query::build_mutation(selection, variables),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Variable {
    ty: TypeRef,
    value: serde_json::Value,
}

/// typed operation variables, keyed by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    entries: BTreeMap<String, Variable>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// set a variable, replacing any previous value for `name`
    pub fn insert<V: Serialize>(
        &mut self,
        name: impl Into<String>,
        ty: TypeRef,
        value: V,
    ) -> Result<()> {
        let value = serde_json::to_value(value).map_err(|err| Error::Encoding(err.to_string()))?;
        self.entries.insert(name.into(), Variable { ty, value });
        Ok(())
    }

    /// builder form of [`Variables::insert`]
    pub fn with<V: Serialize>(mut self, name: impl Into<String>, ty: TypeRef, value: V) -> Result<Self> {
        self.insert(name, ty, value)?;
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.entries.get(name).map(|var| &var.value)
    }

    /// variable names with their declared types, sorted by name
    pub fn definitions(&self) -> impl Iterator<Item = (&str, &TypeRef)> {
        self.entries.iter().map(|(name, var)| (name.as_str(), &var.ty))
    }

    pub(crate) fn wire_values(&self) -> BTreeMap<&str, &serde_json::Value> {
        self.entries
            .iter()
            .map(|(name, var)| (name.as_str(), &var.value))
            .collect()
    }
}
