//! schema descriptors
//!
//! a typed description of the fields an operation selects: name, graphql
//! type, nullability, and nested selection. the query builder renders it and
//! the binder checks responses against it.

use std::fmt;

/// graphql type reference for a selected field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// named type such as `String` or `Repository`
    Named { name: String, nullable: bool },
    /// list of an inner type
    List { inner: Box<TypeRef>, nullable: bool },
}

impl TypeRef {
    /// non-null named type
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            nullable: false,
        }
    }

    /// non-null list of `inner`
    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List {
            inner: Box::new(inner),
            nullable: false,
        }
    }

    /// same type with nullability switched on
    pub fn nullable(self) -> Self {
        match self {
            TypeRef::Named { name, .. } => TypeRef::Named {
                name,
                nullable: true,
            },
            TypeRef::List { inner, .. } => TypeRef::List {
                inner,
                nullable: true,
            },
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            TypeRef::Named { nullable, .. } | TypeRef::List { nullable, .. } => *nullable,
        }
    }

    /// innermost named type
    pub fn base_name(&self) -> &str {
        match self {
            TypeRef::Named { name, .. } => name,
            TypeRef::List { inner, .. } => inner.base_name(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named { name, nullable } => {
                write!(f, "{name}")?;
                if !nullable {
                    write!(f, "!")?;
                }
            }
            TypeRef::List { inner, nullable } => {
                write!(f, "[{inner}]")?;
                if !nullable {
                    write!(f, "!")?;
                }
            }
        }
        Ok(())
    }
}

/// a single selected field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
    pub(crate) arguments: Option<String>,
    pub(crate) ty: TypeRef,
    pub(crate) selection: SelectionSet,
}

impl Field {
    /// field of the given type with no sub-selection
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            alias: None,
            arguments: None,
            ty,
            selection: SelectionSet::default(),
        }
    }

    /// non-null scalar field
    pub fn scalar(name: impl Into<String>, scalar: impl Into<String>) -> Self {
        Self::new(name, TypeRef::named(scalar))
    }

    /// non-null object field with a nested selection
    pub fn object(
        name: impl Into<String>,
        type_name: impl Into<String>,
        fields: impl IntoIterator<Item = Field>,
    ) -> Self {
        Self::new(name, TypeRef::named(type_name)).select(fields)
    }

    /// non-null list of non-null objects with a nested selection
    pub fn list(
        name: impl Into<String>,
        type_name: impl Into<String>,
        fields: impl IntoIterator<Item = Field>,
    ) -> Self {
        Self::new(name, TypeRef::list(TypeRef::named(type_name))).select(fields)
    }

    /// mark the field itself nullable
    pub fn nullable(mut self) -> Self {
        self.ty = self.ty.nullable();
        self
    }

    /// response key alias, `alias: name`
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// argument list rendered verbatim between parentheses,
    /// e.g. `owner: $owner, name: $name`
    pub fn arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = Some(arguments.into());
        self
    }

    /// replace the nested selection
    pub fn select(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.selection = SelectionSet::new(fields);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// key the field appears under in the response
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.ty
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }
}

/// ordered set of selected fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    fields: Vec<Field>,
}

impl SelectionSet {
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
