//! Synthesis: turning a static declaration into a binding against one
//! remote schema.
//!
//! A binding is computed once per (store scope, declaration) and then
//! shared. It records, for every declared member, the remote name and what
//! the remote schema offers, so that proxies never consult the schema
//! again. Missing members do not fail synthesis; they fault on use.
mod binding;
mod factory;
pub(crate) mod marshal;


// re-exports
pub use binding::{
    EntityBinding, MethodBinding, MethodSlot, ParamBinding, PropertyBinding, PropertySlot,
};
pub use factory::{ConstructorBinding, FactoryBinding, KeyBinding};
