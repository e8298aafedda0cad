//! Core runtime for cimbind: declaration descriptors, the synthesis engine
//! that binds them to a dynamic remote store, and the proxies, factories
//! and collections callers work with.
#![warn(unreachable_pub)]

extern crate self as cimbind_core;

#[macro_use]
mod macros;

// public exports are one module level down
pub mod collection;
pub mod dump;
pub mod error;
pub mod factory;
pub mod model;
pub mod obs;
pub mod proxy;
pub mod registry;
pub mod session;
pub mod status;
pub mod store;
pub mod synth;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Prelude contains only the vocabulary a declaration and its callers
/// need. Stores, bindings, and diagnostics stay one module down.
///

pub mod prelude {
    pub use crate::{
        collection::InstanceCollection,
        error::{Error, ErrorKind},
        factory::Factory,
        proxy::{Outcome, Proxy},
        session::{Session, SessionOptions},
        traits::{Entity, EnumRepr, FactoryKind, Logical},
        value::Value,
    };
}
