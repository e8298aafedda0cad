use crate::{model::entity::EntityModel, value::WireType};
use std::fmt::{self, Debug};

///
/// LogicalType
///
/// Declared (caller-facing) type of a property, parameter, or return.
/// Arrays are one level deep; the element type cannot itself be an array.
///

#[derive(Clone, Copy, Debug)]
pub enum LogicalType {
    /// Primitive or string whose natural wire tag is given.
    Scalar(WireType),
    /// Integer-backed enumeration.
    Enum(EnumModel),
    /// DMTF-encoded timestamp.
    Timestamp,
    /// Reference to another declared entity.
    Entity(EntityRef),
    Array(Element),
}

impl LogicalType {
    /// Wire tag this type travels as when no explicit cast is declared.
    #[must_use]
    pub const fn natural_wire(&self) -> WireType {
        match self {
            Self::Scalar(wire) => *wire,
            Self::Enum(model) => model.repr,
            Self::Timestamp => WireType::DateTime,
            Self::Entity(_) => WireType::Reference,
            Self::Array(element) => element.logical().natural_wire(),
        }
    }

    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Element type for arrays, the type itself otherwise.
    #[must_use]
    pub const fn scalar(&self) -> Self {
        match self {
            Self::Array(element) => element.logical(),
            other => *other,
        }
    }

    ///
    /// element
    ///
    /// Project this type into an array element. Used by the `Vec<T>` impl
    /// of `Logical`, so a nested array fails at compile time.
    ///
    #[must_use]
    pub const fn element(self) -> Element {
        match self {
            Self::Scalar(wire) => Element::Scalar(wire),
            Self::Enum(model) => Element::Enum(model),
            Self::Timestamp => Element::Timestamp,
            Self::Entity(target) => Element::Entity(target),
            Self::Array(_) => panic!("arrays of arrays cannot be mapped"),
        }
    }

    /// Short description used in reports and diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Scalar(wire) => wire.to_string(),
            Self::Enum(model) => format!("enum {}", model.path),
            Self::Timestamp => "timestamp".to_string(),
            Self::Entity(target) => format!("ref {}", target.model().path),
            Self::Array(element) => format!("{}[]", element.logical().describe()),
        }
    }
}

///
/// Element
/// Array element type.
///

#[derive(Clone, Copy, Debug)]
pub enum Element {
    Scalar(WireType),
    Enum(EnumModel),
    Timestamp,
    Entity(EntityRef),
}

impl Element {
    #[must_use]
    pub const fn logical(self) -> LogicalType {
        match self {
            Self::Scalar(wire) => LogicalType::Scalar(wire),
            Self::Enum(model) => LogicalType::Enum(model),
            Self::Timestamp => LogicalType::Timestamp,
            Self::Entity(target) => LogicalType::Entity(target),
        }
    }
}

///
/// EnumModel
/// Integer-backed enumeration descriptor.
///

#[derive(Clone, Copy, Debug)]
pub struct EnumModel {
    pub path: &'static str,
    /// Underlying integer width; the default wire type.
    pub repr: WireType,
    pub variants: &'static [(&'static str, i64)],
}

impl EnumModel {
    #[must_use]
    pub fn variant_name(&self, discriminant: i64) -> Option<&'static str> {
        self.variants
            .iter()
            .find(|(_, value)| *value == discriminant)
            .map(|(name, _)| *name)
    }
}

///
/// EntityRef
///
/// Deferred link to an entity model. Entity graphs are cyclic (a disk
/// refers to partitions which refer back to their disk), so links are
/// resolved through a function rather than a direct reference.
///

#[derive(Clone, Copy)]
pub struct EntityRef(pub fn() -> &'static EntityModel);

impl EntityRef {
    #[must_use]
    pub fn model(self) -> &'static EntityModel {
        (self.0)()
    }
}

impl Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityRef").field(&self.model().path).finish()
    }
}
