//! DMTF datetime codec.
//!
//! Remote timestamps travel as 25-character strings:
//! `yyyymmddHHMMSS.mmmmmmsUUU`, where `s` is `+` or `-` and `UUU` is the
//! UTC offset in minutes. Any field may be wildcarded with `*`; wildcarded
//! fields take their lowest value. An interval (`:` in the sign position)
//! is not a timestamp.
//!
//! Only years 0000-9999 and whole-minute offsets within +/-999 minutes fit
//! the format; anything else is refused rather than written lossily.
//! Precision is microseconds, finer digits are truncated.
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone};
use thiserror::Error as ThisError;

const LEN: usize = 25;
const MAX_OFFSET_MINUTES: u32 = 999;

///
/// DmtfError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DmtfError {
    #[error("expected {LEN} characters, got {0}")]
    Length(usize),

    #[error("malformed field '{field}' in '{text}'")]
    Field { field: &'static str, text: String },

    #[error("'{0}' is an interval, not a timestamp")]
    Interval(String),

    #[error("'{0}' is not a valid calendar time")]
    OutOfRange(String),

    #[error("{0} cannot be written as a DMTF timestamp: {1}")]
    Unencodable(String, &'static str),
}

/// Decode a DMTF datetime string.
pub fn parse(text: &str) -> Result<DateTime<FixedOffset>, DmtfError> {
    if !text.is_ascii() || text.len() != LEN {
        return Err(DmtfError::Length(text.chars().count()));
    }

    let bytes = text.as_bytes();
    let field = |name: &'static str, range: std::ops::Range<usize>, default: u32| {
        parse_field(&text[range], default).ok_or_else(|| DmtfError::Field {
            field: name,
            text: text.to_string(),
        })
    };

    let year = field("year", 0..4, 1)?;
    let month = field("month", 4..6, 1)?;
    let day = field("day", 6..8, 1)?;
    let hour = field("hour", 8..10, 0)?;
    let minute = field("minute", 10..12, 0)?;
    let second = field("second", 12..14, 0)?;

    if bytes[14] != b'.' {
        return Err(DmtfError::Field {
            field: "separator",
            text: text.to_string(),
        });
    }

    let micros = parse_micros(&text[15..21]).ok_or_else(|| DmtfError::Field {
        field: "microseconds",
        text: text.to_string(),
    })?;

    let sign = match bytes[21] {
        b'+' => 1,
        b'-' => -1,
        b':' => return Err(DmtfError::Interval(text.to_string())),
        _ => {
            return Err(DmtfError::Field {
                field: "sign",
                text: text.to_string(),
            });
        }
    };
    let offset_minutes = field("offset", 22..25, 0)?;

    let out_of_range = || DmtfError::OutOfRange(text.to_string());
    let offset_secs = i32::try_from(offset_minutes * 60).map_err(|_| out_of_range())? * sign;
    let offset = FixedOffset::east_opt(offset_secs).ok_or_else(out_of_range)?;
    let year = i32::try_from(year).map_err(|_| out_of_range())?;
    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_micro_opt(hour, minute, second, micros))
        .ok_or_else(out_of_range)?;

    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(out_of_range)
}

/// Encode a timestamp as a DMTF datetime string.
pub fn format(value: &DateTime<FixedOffset>) -> Result<String, DmtfError> {
    let refuse = |reason| DmtfError::Unencodable(value.to_rfc3339(), reason);

    let offset_secs = value.offset().local_minus_utc();
    if offset_secs % 60 != 0 {
        return Err(refuse("offset is not a whole number of minutes"));
    }
    let offset_minutes = offset_secs / 60;
    if offset_minutes.unsigned_abs() > MAX_OFFSET_MINUTES {
        return Err(refuse("offset exceeds 999 minutes"));
    }
    if !(0..=9999).contains(&value.year()) {
        return Err(refuse("year is outside 0000-9999"));
    }

    // leap seconds carry the extra second in the fraction
    let micros = value.timestamp_subsec_micros();
    if micros > 999_999 {
        return Err(refuse("leap seconds have no DMTF form"));
    }
    let sign = if offset_minutes < 0 { '-' } else { '+' };

    Ok(format!(
        "{}.{micros:06}{sign}{:03}",
        value.format("%Y%m%d%H%M%S"),
        offset_minutes.unsigned_abs(),
    ))
}

// A fully wildcarded field takes its default; partial wildcards are malformed.
fn parse_field(raw: &str, default: u32) -> Option<u32> {
    if raw.bytes().all(|b| b == b'*') {
        return Some(default);
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    raw.parse().ok()
}

// Microseconds may be truncated with trailing wildcards ("123***").
fn parse_micros(raw: &str) -> Option<u32> {
    let digits = raw.trim_end_matches('*');
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let scale = 10u32.pow(u32::try_from(raw.len() - digits.len()).ok()?);
    if digits.is_empty() {
        return Some(0);
    }

    digits.parse::<u32>().ok().map(|v| v * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use proptest::prelude::*;

    #[test]
    fn parses_offset_timestamps() {
        let dt = parse("20240315103045.123456-300").expect("valid dmtf timestamp");

        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 3, 15));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (10, 30, 45));
        assert_eq!(dt.timestamp_subsec_micros(), 123_456);
        assert_eq!(dt.offset().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn wildcards_take_lowest_values() {
        let dt = parse("2024**********.******+***").expect("wildcarded timestamp");

        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 1, 1));
        assert_eq!(dt.hour(), 0);
        assert_eq!(dt.offset().local_minus_utc(), 0);

        let dt = parse("20240101000000.12****+000").expect("truncated micros");
        assert_eq!(dt.timestamp_subsec_micros(), 120_000);
    }

    #[test]
    fn rejects_intervals_and_garbage() {
        assert!(matches!(
            parse("00000001000000.000000:000"),
            Err(DmtfError::Interval(_))
        ));
        assert!(matches!(parse("2024"), Err(DmtfError::Length(4))));
        assert!(matches!(
            parse("2024x315103045.123456+000"),
            Err(DmtfError::Field { field: "month", .. })
        ));
        assert!(matches!(
            parse("20241345103045.123456+000"),
            Err(DmtfError::OutOfRange(_))
        ));
    }

    #[test]
    fn formats_negative_offsets() {
        let offset = FixedOffset::west_opt(5 * 3600).expect("valid offset");
        let dt = offset
            .with_ymd_and_hms(2023, 11, 2, 7, 8, 9)
            .single()
            .expect("unambiguous time");

        assert_eq!(format(&dt).unwrap(), "20231102070809.000000-300");
    }

    #[test]
    fn refuses_values_the_format_cannot_hold() {
        let wide = FixedOffset::east_opt(17 * 3600).expect("valid offset");
        let dt = wide.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert!(matches!(format(&dt), Err(DmtfError::Unencodable(..))));

        let odd = FixedOffset::east_opt(5 * 3600 + 30 * 60 + 15).expect("valid offset");
        let dt = odd.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert!(matches!(format(&dt), Err(DmtfError::Unencodable(..))));

        let utc = FixedOffset::east_opt(0).expect("valid offset");
        let dt = utc.with_ymd_and_hms(12_000, 1, 2, 3, 4, 5).unwrap();
        assert!(matches!(format(&dt), Err(DmtfError::Unencodable(..))));
    }

    #[test]
    fn widest_offsets_still_encode() {
        let offset = FixedOffset::west_opt(999 * 60).expect("valid offset");
        let dt = offset.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();

        let text = format(&dt).unwrap();
        assert_eq!(text, "99991231235959.000000-999");
        assert_eq!(parse(&text).unwrap(), dt);
    }

    proptest! {
        #[test]
        fn format_then_parse_preserves_instant(
            secs in -62_167_219_200i64..400_000_000_000,
            micros in 0u32..1_000_000,
            offset_secs in -86_399i32..=86_399,
        ) {
            let offset = FixedOffset::east_opt(offset_secs).expect("offset in range");
            let utc = DateTime::from_timestamp(secs, micros * 1_000).expect("instant in range");
            let dt = utc.with_timezone(&offset);

            let encodable = offset_secs % 60 == 0
                && (offset_secs / 60).unsigned_abs() <= MAX_OFFSET_MINUTES
                && (0..=9999).contains(&dt.year());

            match format(&dt) {
                Ok(text) => {
                    prop_assert!(encodable);
                    let decoded = parse(&text).expect("encoded timestamp decodes");
                    prop_assert_eq!(decoded, dt);
                    prop_assert_eq!(decoded.offset(), dt.offset());
                }
                Err(err) => {
                    prop_assert!(!encodable);
                    prop_assert!(matches!(err, DmtfError::Unencodable(..)), "unexpected {:?}", err);
                }
            }
        }

        #[test]
        fn minute_offsets_in_range_always_round_trip(
            secs in 0i64..253_402_214_400,
            offset_minutes in -999i32..=999,
        ) {
            let offset = FixedOffset::east_opt(offset_minutes * 60).expect("offset in range");
            let dt = DateTime::from_timestamp(secs, 0)
                .expect("instant in range")
                .with_timezone(&offset);
            prop_assume!((0..=9999).contains(&dt.year()));

            let decoded = parse(&format(&dt).expect("encodable")).expect("decodes");
            prop_assert_eq!(decoded, dt);
            prop_assert_eq!(decoded.offset(), dt.offset());
        }
    }
}
