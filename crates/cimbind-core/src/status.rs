//! Translation of remote method status codes into fault descriptions.
//!
//! Remote methods report their outcome through a conventionally-named
//! unsigned status output. Zero is success. Small values follow the generic
//! CIM method result codes, values with the high bit set are HRESULTs
//! (including the WBEM facility), and the 0x1000.. range is vendor-specific.

use crate::value::WireValue;

///
/// CONSTANTS
///

pub const SUCCESS: u32 = 0;

/// Generic CIM method result codes.
const METHOD_CODES: &[(u32, &str)] = &[
    (1, "Not Supported"),
    (2, "Unspecified Error"),
    (3, "Timeout"),
    (4, "Failed"),
    (5, "Invalid Parameter"),
    (6, "Access Denied"),
    (7, "Not Found"),
    (4096, "Method Parameters Checked - Job Started"),
    (4097, "Size Not Supported"),
    (40001, "Access denied"),
    (40002, "There are not enough resources to complete the operation"),
    (41000, "The object is in use"),
    (41001, "The disk is offline"),
    (41006, "The disk is read-only"),
    (42002, "The partition is in use"),
    (42007, "The extent is not large enough"),
];

/// HRESULT codes commonly returned by management providers.
const HRESULT_CODES: &[(u32, &str)] = &[
    (0x8000_4001, "Not implemented"),
    (0x8000_4005, "Unspecified failure"),
    (0x8007_0005, "Access is denied"),
    (0x8007_0057, "The parameter is incorrect"),
    (0x8004_1001, "Generic failure"),
    (0x8004_1002, "Object not found"),
    (0x8004_1003, "Access denied"),
    (0x8004_1006, "Out of memory"),
    (0x8004_1008, "Invalid parameter"),
    (0x8004_100C, "Not supported"),
    (0x8004_1010, "Invalid class"),
    (0x8004_1017, "Invalid query"),
    (0x8004_102F, "Invalid method parameters"),
    (0x8004_1055, "Method not implemented"),
];

/// Human-readable description of a status code.
#[must_use]
pub fn describe(status: u32) -> &'static str {
    if status == SUCCESS {
        return "Success";
    }

    let table = if is_hresult(status) {
        HRESULT_CODES
    } else {
        METHOD_CODES
    };

    table
        .iter()
        .find(|(code, _)| *code == status)
        .map_or_else(|| fallback(status), |(_, text)| *text)
}

/// Status carried by a wire value. Signed values are reinterpreted bit for
/// bit, so an HRESULT reported as `Sint32` keeps its code; non-integers
/// carry no status.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn code(value: &WireValue) -> Option<u32> {
    let v = value.as_i128()?;

    if v < 0 {
        i32::try_from(v).ok().map(|v| v as u32)
    } else {
        u32::try_from(v).ok()
    }
}

/// Whether the code uses HRESULT layout (severity bit set).
#[must_use]
pub const fn is_hresult(status: u32) -> bool {
    status & 0x8000_0000 != 0
}

/// Facility portion of an HRESULT.
#[must_use]
pub const fn facility(status: u32) -> u32 {
    (status >> 16) & 0x1FFF
}

const fn fallback(status: u32) -> &'static str {
    if is_hresult(status) {
        match facility(status) {
            4 => "Unknown management provider failure",
            7 => "Unknown system failure",
            _ => "Unknown failure",
        }
    } else if status >= 0x1000 {
        "Vendor-specific failure"
    } else {
        "Unknown status"
    }
}
