//! Speculative decoding of byte strings.
//!
//! Contracts often store packed values inside `bytes` fields. These helpers
//! try to read such a payload back as an expression for display. A miss is
//! the common case and is never an error.

use bcd_interchange::Micheline;

use crate::forge;
use crate::Limits;

/// Packed payloads shorter than this cannot hold a complete expression.
const MIN_PACKED_LEN: usize = 2;

/// Decode `bytes` as a packed expression, or `None` if they are not one.
/// The whole input must be consumed, and only `0x05`-prefixed input is
/// considered: a bare forged expression such as `0x00` or `0x030b` is `None`.
pub fn try_unpack_string(bytes: &[u8]) -> Option<Micheline> {
    if bytes.len() < MIN_PACKED_LEN || bytes[0] != forge::PACK_PREFIX {
        return None;
    }
    match forge::unpack(bytes, Limits::default()) {
        Ok(expr) => Some(expr),
        Err(e) => {
            tracing::trace!(error = %e, len = bytes.len(), "bytes are not a packed expression");
            None
        }
    }
}

/// Hex-text variant of [`try_unpack_string`]. Accepts an optional `0x`.
pub fn try_unpack_hex(text: &str) -> Option<Micheline> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    let bytes = hex::decode(digits).ok()?;
    try_unpack_string(&bytes)
}
