//! Text encoding of chip parameters
//!
//! Database records store every parameter as text. Mandatory parameters are
//! plain numbers; optional parameters are either a number or the placeholder
//! [`PLACEHOLDER`], which stands for "not defined".
//!
//! Numbers are accepted in decimal, hexadecimal (`0x`/`0X` prefix) and octal
//! (leading `0`). Surrounding whitespace is ignored, so records written as
//! `"a, b, c"` parse the same as `"a,b,c"`.

use alloc::format;
use alloc::string::String;

use crate::error::ParamError;

/// Raw value reserved for "not defined"
///
/// Never produced by decoding a number; only the placeholder decodes to it.
pub const NOT_DEFINED: u64 = u64::MAX;

/// Text token for an optional parameter that is not defined
pub const PLACEHOLDER: &str = "-";

/// Decode a mandatory parameter
pub fn decode(text: &str) -> Result<u64, ParamError> {
    let s = text.trim();
    if s.is_empty() {
        return Err(ParamError::Empty);
    }

    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (hex, 16)
    } else if s.len() > 1 && s.starts_with('0') {
        (&s[1..], 8)
    } else {
        (s, 10)
    };

    // from_str_radix would accept a leading '+'
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(ParamError::Invalid);
    }

    let value = u64::from_str_radix(digits, radix).map_err(|_| ParamError::Overflow)?;
    if value == NOT_DEFINED {
        return Err(ParamError::Reserved);
    }
    Ok(value)
}

/// Decode an optional parameter; the placeholder decodes to `None`
pub fn decode_optional(text: &str) -> Result<Option<u64>, ParamError> {
    if text.trim() == PLACEHOLDER {
        Ok(None)
    } else {
        decode(text).map(Some)
    }
}

/// Encode a mandatory parameter (decimal)
pub fn encode(value: u64) -> String {
    format!("{}", value)
}

/// Encode an optional parameter (hexadecimal, or the placeholder)
pub fn encode_optional(value: Option<u64>) -> String {
    match value {
        Some(v) => format!("0x{:02X}", v),
        None => String::from(PLACEHOLDER),
    }
}

/// Convert an optional value to its raw form, using [`NOT_DEFINED`] for `None`
pub fn to_raw(value: Option<u64>) -> u64 {
    value.unwrap_or(NOT_DEFINED)
}

/// Convert a raw value back, mapping [`NOT_DEFINED`] to `None`
pub fn from_raw(raw: u64) -> Option<u64> {
    if raw == NOT_DEFINED {
        None
    } else {
        Some(raw)
    }
}
