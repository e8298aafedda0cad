//! The remote-store capability consumed by the binding layer.
//!
//! A store is an opaque, dynamically typed repository of records. Each
//! record is a property bag with named methods, addressed by a path string.
//! The binding layer only ever talks to a store through these traits.
pub mod memory;
mod schema;

use crate::{error::StoreErrorKind, model::ClassPath, value::WireValue};
use std::sync::Arc;
use thiserror::Error as ThisError;

// re-exports
pub use schema::{ClassSchema, MethodSchema, PropertySchema};

///
/// CONSTANTS
///

/// Conventional name of the status output of a remote method.
pub const RETURN_VALUE: &str = "ReturnValue";

/// System property names every record answers to.
pub mod system {
    pub const CLASS: &str = "__CLASS";
    pub const SUPERCLASS: &str = "__SUPERCLASS";
    pub const DYNASTY: &str = "__DYNASTY";
    pub const DERIVATION: &str = "__DERIVATION";
    pub const PATH: &str = "__PATH";
    pub const RELPATH: &str = "__RELPATH";
    pub const NAMESPACE: &str = "__NAMESPACE";
    pub const SERVER: &str = "__SERVER";
    pub const GENUS: &str = "__GENUS";
    pub const PROPERTY_COUNT: &str = "__PROPERTY_COUNT";

    /// Genus value reported by instances (as opposed to classes).
    pub const GENUS_INSTANCE: i32 = 2;

    #[must_use]
    pub fn is_system(name: &str) -> bool {
        name.starts_with("__")
    }
}

///
/// RecordRef
/// Shared handle to one record.
///

pub type RecordRef = Arc<dyn Record>;

///
/// RemoteStore
///
/// Connection to one store scope. Every operation may block on remote I/O;
/// failures are reported, never retried.
///

pub trait RemoteStore: Send + Sync {
    /// Stable identity of this connection scope. Synthesized bindings are
    /// cached per scope, since two scopes may expose different schemas.
    fn scope(&self) -> &str;

    /// Flattened schema of a class, including inherited members.
    /// `None` when the class is not defined.
    fn class_schema(&self, class: &ClassPath<'_>) -> Result<Option<ClassSchema>, StoreError>;

    /// A fresh, uncommitted instance of the class template.
    fn spawn_instance(&self, class: &ClassPath<'_>) -> Result<RecordRef, StoreError>;

    /// Committed instances of a class, in store order.
    fn enumerate(&self, class: &ClassPath<'_>, query: &Query) -> Result<Vec<RecordRef>, StoreError>;

    /// Open a record by path.
    fn open(&self, path: &str) -> Result<RecordRef, StoreError>;
}

///
/// Record
///
/// One record handle. Property access is by case-insensitive name.
///

pub trait Record: Send + Sync {
    /// Read a property. `Ok(None)` means the member does not exist on this
    /// record; `Ok(Some(WireValue::Null))` means it exists but is unset.
    fn get(&self, name: &str) -> Result<Option<WireValue>, StoreError>;

    fn set(&self, name: &str, value: WireValue) -> Result<(), StoreError>;

    /// Invoke a method with the given inputs, returning the output set.
    fn invoke(&self, method: &str, inputs: PropertySet) -> Result<PropertySet, StoreError>;

    /// Re-read this handle's state from the store.
    fn reload(&self) -> Result<(), StoreError>;

    /// Write this handle's state back to the store; returns the record path.
    fn put(&self) -> Result<String, StoreError>;

    /// Records associated with this one whose class is `class` or a
    /// descendant of it.
    fn related(&self, class: &str) -> Result<Vec<RecordRef>, StoreError>;
}

///
/// Query
/// Enumeration request.
///

#[derive(Clone, Debug, Default)]
pub struct Query {
    /// Store-specific filter expression.
    pub filter: Option<String>,
    /// Include instances of descendant classes.
    pub deep: bool,
    /// Only return instances that carry a path.
    pub locatable: bool,
}

///
/// PropertySet
///
/// Ordered name/value list with case-insensitive lookup. Used for method
/// inputs and outputs.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertySet {
    entries: Vec<(String, WireValue)>,
}

impl PropertySet {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, name: impl Into<String>, value: WireValue) {
        let name = name.into();
        match self
            .entries
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: WireValue) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&WireValue> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WireValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<N: Into<String>> FromIterator<(N, WireValue)> for PropertySet {
    fn from_iter<I: IntoIterator<Item = (N, WireValue)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.insert(name, value);
        }

        set
    }
}

///
/// StoreError
/// Fault reported by a store capability.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreError {
    #[error("access denied: {message}")]
    AccessDenied { message: String },

    #[error("invalid query: {message}")]
    InvalidQuery { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("rejected: {message}")]
    Rejected { message: String },

    #[error("timeout: {message}")]
    Timeout { message: String },

    #[error("unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> StoreErrorKind {
        match self {
            Self::AccessDenied { .. } => StoreErrorKind::AccessDenied,
            Self::InvalidQuery { .. } => StoreErrorKind::InvalidQuery,
            Self::NotFound { .. } => StoreErrorKind::NotFound,
            Self::Rejected { .. } => StoreErrorKind::Rejected,
            Self::Timeout { .. } => StoreErrorKind::Timeout,
            Self::Unavailable { .. } => StoreErrorKind::Unavailable,
        }
    }
}
