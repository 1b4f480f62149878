//! Binary wire format ("forging").
//!
//! Every expression starts with a one-byte tag:
//!
//! | tag | expression |
//! |---|---|
//! | `0x00` | integer, zarith |
//! | `0x01` | string, 4-byte length prefix |
//! | `0x02` | sequence, 4-byte length prefix |
//! | `0x03`..`0x08` | primitive with 0, 1 or 2 arguments, without / with annotations |
//! | `0x09` | primitive with any number of arguments |
//! | `0x0a` | bytes, 4-byte length prefix |
//!
//! Packed data (the `PACK` instruction) carries an extra `0x05` prefix.

use bcd_interchange::Micheline;

use crate::error::AstError;
use crate::Limits;

mod decode;
mod encode;

/// Prefix of packed data.
pub const PACK_PREFIX: u8 = 0x05;

pub(crate) const TAG_INT: u8 = 0x00;
pub(crate) const TAG_STRING: u8 = 0x01;
pub(crate) const TAG_SEQ: u8 = 0x02;
pub(crate) const TAG_PRIM_0: u8 = 0x03;
pub(crate) const TAG_PRIM_N: u8 = 0x09;
pub(crate) const TAG_BYTES: u8 = 0x0a;

/// Encode an untyped expression.
pub fn forge(m: &Micheline) -> Result<Vec<u8>, AstError> {
    let mut out = Vec::new();
    encode::write_expr(m, "$", &mut out)?;
    Ok(out)
}

/// Decode exactly one expression; trailing input is an error.
pub fn unforge(bytes: &[u8], limits: Limits) -> Result<Micheline, AstError> {
    decode::read_all(bytes, 0, limits)
}

/// `0x05` followed by the forged expression.
pub fn pack(m: &Micheline) -> Result<Vec<u8>, AstError> {
    let mut out = vec![PACK_PREFIX];
    encode::write_expr(m, "$", &mut out)?;
    Ok(out)
}

pub fn unpack(bytes: &[u8], limits: Limits) -> Result<Micheline, AstError> {
    match bytes.first() {
        None => Err(AstError::TruncatedInput {
            offset: 0,
            needed: 1,
        }),
        Some(&PACK_PREFIX) => decode::read_all(&bytes[1..], 1, limits),
        Some(&tag) => Err(AstError::UnknownTag { offset: 0, tag }),
    }
}
