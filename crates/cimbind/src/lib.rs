//! ## Crate layout
//! - `core`: declaration descriptors, the synthesis engine, proxies,
//!   factories, collections, the store capability and the in-memory store.
//! - `entity!`, `factory!`, `wire_enum!`: declaration macros.
//!
//! The `prelude` module mirrors the surface application code works with;
//! `design::prelude` exposes what entity and factory declarations need.

pub use cimbind_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Macros
//

pub use cimbind_core::{entity, factory, wire_enum};
pub use crate::core::error::Error;

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        collection::InstanceCollection,
        error::{Error, ErrorKind, ErrorOrigin},
        factory::Factory,
        proxy::{Outcome, Proxy},
        session::{Session, SessionOptions},
        store::memory::MemoryStore,
        traits::{Entity as _, EnumRepr as _, FactoryKind as _, Logical as _},
        value::Value,
    };
}

//
// Design Prelude
// For declaration code (macros, descriptors, traits).
//

/// Declaration-facing helpers (separate from the runtime prelude).
pub mod design {
    pub mod prelude {
        pub use ::chrono::{DateTime, FixedOffset};

        pub use crate::{
            core::{
                error::Error,
                model::{Direction, MethodModel, ParamModel},
                proxy::Outcome,
                store::RETURN_VALUE,
                traits::{Entity, EnumRepr, FactoryKind, Logical},
                value::{Value, WireType},
            },
            entity, factory, wire_enum,
        };
    }
}
