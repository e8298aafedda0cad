use crate::{status, store::StoreError};
use derive_more::Display;
use serde::Serialize;
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///
/// Every fault raised at the typed boundary carries a message naming the
/// remote class, the member, and the nature of the mismatch.
///

#[derive(Clone, Debug, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// Declared member or class does not exist remotely, or its shape differs.
    pub(crate) fn schema_mismatch(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SchemaMismatch, origin, message)
    }

    /// Wire representation does not match what the mapping requires.
    pub(crate) fn invalid_cast(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCast, origin, message)
    }

    /// Successful invocation whose declared output is absent.
    pub(crate) fn missing_output(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingOutput, ErrorOrigin::Method, message)
    }

    /// Record class is neither the declared class nor a descendant.
    pub(crate) fn identity_mismatch(message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::IdentityMismatch,
            ErrorOrigin::Synthesis,
            message,
        )
    }

    /// Declaration or usage problem on the caller's side.
    pub(crate) fn declaration(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Declaration, origin, message)
    }

    /// Remote method returned a non-zero status.
    pub(crate) fn invocation_fault(status: u32, target: &str) -> Self {
        Self::new(
            ErrorKind::InvocationFault { status },
            ErrorOrigin::Method,
            format!(
                "{target} failed with status {status:#010x}: {}",
                status::describe(status)
            ),
        )
    }

    /// Wrap a store-level fault with call-site context.
    pub(crate) fn store(origin: ErrorOrigin, context: &str, err: StoreError) -> Self {
        Self::new(
            ErrorKind::Store(err.kind()),
            origin,
            format!("{context}: {err}"),
        )
    }

    #[must_use]
    pub const fn is_schema_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::SchemaMismatch)
    }

    #[must_use]
    pub const fn is_invalid_cast(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidCast)
    }

    #[must_use]
    pub const fn is_identity_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::IdentityMismatch)
    }

    /// Status code carried by an invocation fault, if this is one.
    #[must_use]
    pub const fn status(&self) -> Option<u32> {
        match self.kind {
            ErrorKind::InvocationFault { status } => Some(status),
            _ => None,
        }
    }

    #[must_use]
    pub fn display_with_kind(&self) -> String {
        format!("{}:{}: {}", self.origin, self.kind, self.message)
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// The declaration itself is malformed, or a member was used in a way
    /// the declaration does not allow (e.g. writing a read-only property).
    #[display("declaration")]
    Declaration,

    /// Proxy construction from a record of an unrelated class.
    #[display("identity_mismatch")]
    IdentityMismatch,

    /// A reference or timestamp member whose wire tag does not match.
    #[display("invalid_cast")]
    InvalidCast,

    /// A remote method returned a non-zero status.
    #[display("invocation_fault")]
    InvocationFault { status: u32 },

    /// A successful invocation lacks a declared output.
    #[display("missing_output")]
    MissingOutput,

    /// Declared class or member does not exist on the remote schema.
    #[display("schema_mismatch")]
    SchemaMismatch,

    /// Store-level fault (unavailable, timeout, ...). Never retried.
    #[display("store")]
    Store(StoreErrorKind),
}

///
/// ErrorOrigin
/// Where in the binding pipeline the error surfaced.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    #[display("declaration")]
    Declaration,
    #[display("synthesis")]
    Synthesis,
    #[display("property")]
    Property,
    #[display("method")]
    Method,
    #[display("factory")]
    Factory,
    #[display("collection")]
    Collection,
    #[display("store")]
    Store,
}

///
/// StoreErrorKind
/// Classification of faults reported by the remote store capability.
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum StoreErrorKind {
    #[display("access_denied")]
    AccessDenied,
    #[display("invalid_query")]
    InvalidQuery,
    #[display("not_found")]
    NotFound,
    #[display("rejected")]
    Rejected,
    #[display("timeout")]
    Timeout,
    #[display("unavailable")]
    Unavailable,
}
