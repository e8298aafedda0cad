use crate::{model::types::LogicalType, traits::Logical, value::WireType};
use convert_case::{Case, Casing};
use derive_more::Display;
use std::borrow::Cow;

/// Resolve a remote member name: the explicit override, else the logical
/// name in PascalCase.
pub(crate) fn remote_name(logical: &str, remote: Option<&'static str>) -> Cow<'static, str> {
    match remote {
        Some(name) => Cow::Borrowed(name),
        None => Cow::Owned(logical.to_case(Case::Pascal)),
    }
}

///
/// Access
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Access {
    #[display("ro")]
    ReadOnly,
    #[display("rw")]
    ReadWrite,
}

///
/// PropertyModel
///

#[derive(Clone, Copy, Debug)]
pub struct PropertyModel {
    /// Logical (Rust) member name.
    pub name: &'static str,
    pub remote: Option<&'static str>,
    /// Explicit wire type, for when the store's representation differs
    /// from the natural one (e.g. an enum stored as `Uint16`).
    pub cast: Option<WireType>,
    pub ty: LogicalType,
    pub access: Access,
}

impl PropertyModel {
    #[must_use]
    pub fn remote_name(&self) -> Cow<'static, str> {
        remote_name(self.name, self.remote)
    }

    #[must_use]
    pub fn wire(&self) -> WireType {
        self.cast.unwrap_or_else(|| self.ty.natural_wire())
    }
}

///
/// Direction
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Direction {
    #[display("in")]
    In,
    #[display("out")]
    Out,
    #[display("inout")]
    InOut,
}

impl Direction {
    #[must_use]
    pub const fn is_input(self) -> bool {
        matches!(self, Self::In | Self::InOut)
    }

    #[must_use]
    pub const fn is_output(self) -> bool {
        matches!(self, Self::Out | Self::InOut)
    }
}

///
/// ParamModel
/// One method parameter, or one constructor key on a factory.
///

#[derive(Clone, Copy, Debug)]
pub struct ParamModel {
    pub name: &'static str,
    pub remote: Option<&'static str>,
    pub cast: Option<WireType>,
    pub ty: LogicalType,
    pub direction: Direction,
}

impl ParamModel {
    /// An `In` parameter typed as `T`.
    #[must_use]
    pub const fn input<T: Logical>(name: &'static str) -> Self {
        Self::new(name, T::TYPE, Direction::In)
    }

    /// An `Out` parameter typed as `T`.
    #[must_use]
    pub const fn output<T: Logical>(name: &'static str) -> Self {
        Self::new(name, T::TYPE, Direction::Out)
    }

    #[must_use]
    pub const fn new(name: &'static str, ty: LogicalType, direction: Direction) -> Self {
        Self {
            name,
            remote: None,
            cast: None,
            ty,
            direction,
        }
    }

    #[must_use]
    pub const fn named(self, remote: &'static str) -> Self {
        Self {
            remote: Some(remote),
            ..self
        }
    }

    #[must_use]
    pub const fn cast_as(self, wire: WireType) -> Self {
        Self {
            cast: Some(wire),
            ..self
        }
    }

    #[must_use]
    pub fn remote_name(&self) -> Cow<'static, str> {
        remote_name(self.name, self.remote)
    }

    #[must_use]
    pub fn wire(&self) -> WireType {
        self.cast.unwrap_or_else(|| self.ty.natural_wire())
    }
}

///
/// ReturnModel
/// The remote output that carries a method's return value.
///

#[derive(Clone, Copy, Debug)]
pub struct ReturnModel {
    pub remote: &'static str,
    pub cast: Option<WireType>,
    pub ty: LogicalType,
}

impl ReturnModel {
    #[must_use]
    pub fn wire(&self) -> WireType {
        self.cast.unwrap_or_else(|| self.ty.natural_wire())
    }
}

///
/// MethodModel
///

#[derive(Clone, Copy, Debug)]
pub struct MethodModel {
    pub name: &'static str,
    pub remote: Option<&'static str>,
    pub params: &'static [ParamModel],
    pub returns: Option<ReturnModel>,
}

impl MethodModel {
    #[must_use]
    pub const fn new(name: &'static str, params: &'static [ParamModel]) -> Self {
        Self {
            name,
            remote: None,
            params,
            returns: None,
        }
    }

    #[must_use]
    pub const fn named(self, remote: &'static str) -> Self {
        Self {
            remote: Some(remote),
            ..self
        }
    }

    /// Designate the output `remote` as the return value, typed as `T`.
    #[must_use]
    pub const fn returning<T: Logical>(self, remote: &'static str) -> Self {
        Self {
            returns: Some(ReturnModel {
                remote,
                cast: None,
                ty: T::TYPE,
            }),
            ..self
        }
    }

    #[must_use]
    pub fn remote_name(&self) -> Cow<'static, str> {
        remote_name(self.name, self.remote)
    }

    /// Parameters the caller supplies, in declaration order.
    pub fn inputs(&self) -> impl Iterator<Item = &'static ParamModel> {
        self.params.iter().filter(|p| p.direction.is_input())
    }

    /// Parameters populated from the result set, in declaration order.
    pub fn outputs(&self) -> impl Iterator<Item = &'static ParamModel> {
        self.params.iter().filter(|p| p.direction.is_output())
    }
}
