//! Conversions between logical values and the store's wire values.
//!
//! Scalars and enums go through `WireValue::coerce`; timestamps through the
//! DMTF codec; references through the session, which opens and binds the
//! target record.
use crate::{
    error::{Error, ErrorOrigin},
    model::LogicalType,
    session::Session,
    value::{CastError, Value, WireType, WireValue, dmtf},
};
use std::fmt::{self, Display};

///
/// Site
/// Member being marshalled, for error messages.
///

#[derive(Clone, Copy, Debug)]
pub(crate) struct Site<'a> {
    pub(crate) origin: ErrorOrigin,
    pub(crate) class: &'a str,
    pub(crate) member: &'a str,
}

impl<'a> Site<'a> {
    pub(crate) const fn new(origin: ErrorOrigin, class: &'a str, member: &'a str) -> Self {
        Self {
            origin,
            class,
            member,
        }
    }

    pub(crate) fn invalid_cast(&self, detail: impl Display) -> Error {
        Error::invalid_cast(self.origin, format!("{self}: {detail}"))
    }

    fn cast(&self, err: CastError) -> Error {
        self.invalid_cast(err)
    }
}

impl Display for Site<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'.'{}'", self.class, self.member)
    }
}

///
/// decode
///
/// Lift a wire value read from the store into its logical form.
/// `declared` is the wire type the declaration expects.
///
pub(crate) fn decode(
    session: &Session,
    site: &Site<'_>,
    ty: LogicalType,
    declared: WireType,
    wire: WireValue,
) -> Result<Value, Error> {
    if wire.is_null() {
        return Ok(Value::Null);
    }

    match (ty, wire) {
        (LogicalType::Array(element), WireValue::Array(items)) => items
            .into_iter()
            .map(|item| decode(session, site, element.logical(), declared, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),

        (LogicalType::Array(_), other) => Err(site.invalid_cast(format_args!(
            "expected an array, found {}",
            other.label()
        ))),

        (_, WireValue::Array(_)) => Err(site.invalid_cast("expected a scalar, found an array")),

        (LogicalType::Timestamp, wire) => {
            let text = wire.as_text().ok_or_else(|| {
                site.invalid_cast(format_args!("expected DateTime, found {}", wire.label()))
            })?;

            dmtf::parse(text)
                .map(Value::Timestamp)
                .map_err(|err| site.invalid_cast(err))
        }

        (LogicalType::Entity(target), wire) => {
            let path = wire.as_text().ok_or_else(|| {
                site.invalid_cast(format_args!("expected Reference, found {}", wire.label()))
            })?;

            session
                .resolve(target.model(), path, site.origin)
                .map(Value::Entity)
        }

        (LogicalType::Scalar(_) | LogicalType::Enum(_), wire) => {
            let strict = session.options().strict_numeric;
            let wire = wire.coerce(declared, strict).map_err(|err| site.cast(err))?;

            Ok(Value::from_scalar_wire(wire))
        }
    }
}

///
/// encode
///
/// Box a logical value for the store. The value is first shaped as the
/// declared wire type, then coerced to the remote one.
///
pub(crate) fn encode(
    site: &Site<'_>,
    ty: LogicalType,
    declared: WireType,
    remote: WireType,
    strict: bool,
    value: Value,
) -> Result<WireValue, Error> {
    match (ty, value) {
        (_, Value::Null) => Ok(WireValue::Null),

        (LogicalType::Array(element), Value::List(items)) => items
            .into_iter()
            .map(|item| encode(site, element.logical(), declared, remote, strict, item))
            .collect::<Result<Vec<_>, _>>()
            .map(WireValue::Array),

        (LogicalType::Array(_), other) => Err(site.invalid_cast(format_args!(
            "expected a list, found {}",
            other.label()
        ))),

        (_, Value::List(_)) => Err(site.invalid_cast("expected a scalar, found a list")),

        (_, Value::Timestamp(ts)) => {
            let text = dmtf::format(&ts).map_err(|err| site.invalid_cast(err))?;

            WireValue::DateTime(text)
                .coerce(remote, strict)
                .map_err(|err| site.cast(err))
        }

        (_, Value::Entity(proxy)) => {
            let path = proxy.path()?.ok_or_else(|| {
                site.invalid_cast("cannot reference an instance that has not been committed")
            })?;

            WireValue::Reference(path)
                .coerce(remote, strict)
                .map_err(|err| site.cast(err))
        }

        (_, value) => value
            .into_scalar_wire(declared)
            .and_then(|wire| wire.coerce(remote, strict))
            .map_err(|err| site.cast(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Element;
    use chrono::{FixedOffset, TimeZone};

    fn site() -> Site<'static> {
        Site::new(ErrorOrigin::Property, "ROOT\\Test:Widget", "Size")
    }

    #[test]
    fn site_formats_class_and_member() {
        assert_eq!(site().to_string(), "'ROOT\\Test:Widget'.'Size'");
    }

    #[test]
    fn encode_widens_to_the_remote_type() {
        let wire = encode(
            &site(),
            LogicalType::Scalar(WireType::Uint32),
            WireType::Uint32,
            WireType::Uint64,
            false,
            Value::Uint(7),
        )
        .unwrap();

        assert_eq!(wire, WireValue::Uint64(7));
    }

    #[test]
    fn encode_rejects_values_out_of_range_for_the_declaration() {
        let err = encode(
            &site(),
            LogicalType::Scalar(WireType::Uint8),
            WireType::Uint8,
            WireType::Uint8,
            false,
            Value::Uint(300),
        )
        .unwrap_err();

        assert!(err.is_invalid_cast());
        assert!(err.message.starts_with("'ROOT\\Test:Widget'.'Size'"));
    }

    #[test]
    fn encode_strict_refuses_width_changes() {
        let err = encode(
            &site(),
            LogicalType::Scalar(WireType::Uint32),
            WireType::Uint32,
            WireType::Uint64,
            true,
            Value::Uint(7),
        )
        .unwrap_err();

        assert!(err.is_invalid_cast());
    }

    #[test]
    fn encode_formats_timestamps() {
        let ts = dmtf::parse("20240102030405.000000+060").unwrap();
        let wire = encode(
            &site(),
            LogicalType::Timestamp,
            WireType::DateTime,
            WireType::DateTime,
            false,
            Value::Timestamp(ts),
        )
        .unwrap();

        assert_eq!(
            wire,
            WireValue::DateTime("20240102030405.000000+060".to_string())
        );
    }

    #[test]
    fn encode_refuses_timestamps_without_a_dmtf_form() {
        let offset = FixedOffset::east_opt(17 * 3600).unwrap();
        let ts = offset.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let err = encode(
            &site(),
            LogicalType::Timestamp,
            WireType::DateTime,
            WireType::DateTime,
            false,
            Value::Timestamp(ts),
        )
        .unwrap_err();

        assert!(err.is_invalid_cast());
        assert!(err.message.contains("offset exceeds 999 minutes"));
    }

    #[test]
    fn encode_arrays_elementwise() {
        let wire = encode(
            &site(),
            LogicalType::Array(Element::Scalar(WireType::Uint16)),
            WireType::Uint16,
            WireType::Uint16,
            false,
            Value::List(vec![Value::Uint(1), Value::Uint(2)]),
        )
        .unwrap();

        assert_eq!(
            wire,
            WireValue::Array(vec![WireValue::Uint16(1), WireValue::Uint16(2)])
        );
    }

    #[test]
    fn encode_shape_mismatch_is_an_invalid_cast() {
        let err = encode(
            &site(),
            LogicalType::Array(Element::Scalar(WireType::Uint16)),
            WireType::Uint16,
            WireType::Uint16,
            false,
            Value::Uint(1),
        )
        .unwrap_err();

        assert!(err.is_invalid_cast());
    }
}
