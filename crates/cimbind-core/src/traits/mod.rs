mod logical;

pub use logical::Logical;

use crate::{
    model::{EntityModel, FactoryModel},
    proxy::Proxy,
};

// ============================================================================
// DECLARATIONS
// ============================================================================
//
// These traits connect a typed declaration to its static descriptor.
// They carry no runtime state of their own.
//

///
/// Entity
///
/// A typed view over one record. Implementations are thin wrappers around
/// a `Proxy`; all marshalling happens in the proxy.
///

pub trait Entity: Sized + Send + Sync + 'static {
    const MODEL: &'static EntityModel;

    /// Wrap a proxy already bound to this declaration (or a descendant).
    fn from_proxy(proxy: Proxy) -> Self;

    fn proxy(&self) -> &Proxy;

    fn into_proxy(self) -> Proxy;
}

///
/// FactoryKind
///
/// A declared factory: the entity it produces plus keyed constructors.
/// Entities without a declared factory use a default one with no
/// constructors.
///

pub trait FactoryKind: 'static {
    type Entity: Entity;

    const MODEL: &'static FactoryModel;
}

///
/// EnumRepr
/// Integer representation of a declared enumeration.
///

pub trait EnumRepr: Copy + Sized {
    fn discriminant(self) -> i64;

    fn from_discriminant(discriminant: i64) -> Option<Self>;
}
