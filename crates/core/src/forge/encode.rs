use bcd_interchange::{prim, Micheline};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;

use super::{TAG_BYTES, TAG_INT, TAG_PRIM_0, TAG_PRIM_N, TAG_SEQ, TAG_STRING};
use crate::error::AstError;

/// Append the encoding of `m` to `out`. `at` locates `m` for error messages.
pub(super) fn write_expr(m: &Micheline, at: &str, out: &mut Vec<u8>) -> Result<(), AstError> {
    match m {
        Micheline::Int(text) => {
            let value = text
                .parse::<BigInt>()
                .map_err(|_| AstError::malformed(at, format!("invalid integer literal '{}'", text)))?;
            out.push(TAG_INT);
            write_zarith(&value, out);
        }
        Micheline::String(s) => {
            out.push(TAG_STRING);
            write_framed(s.as_bytes(), out);
        }
        Micheline::Bytes(_) => {
            let raw = m
                .bytes_value()
                .ok_or_else(|| AstError::malformed(at, "invalid hex in bytes literal"))?;
            out.push(TAG_BYTES);
            write_framed(&raw, out);
        }
        Micheline::Seq(items) => {
            out.push(TAG_SEQ);
            let body = write_all(items, at)?;
            write_framed(&body, out);
        }
        Micheline::Prim { prim: keyword, args, annots } => {
            let opcode = prim::opcode(keyword).ok_or_else(|| AstError::UnknownPrimitive {
                prim: keyword.clone(),
                path: at.to_string(),
            })?;
            if args.len() <= 2 {
                let annotated = !annots.is_empty();
                out.push(TAG_PRIM_0 + 2 * args.len() as u8 + u8::from(annotated));
                out.push(opcode);
                for (i, arg) in args.iter().enumerate() {
                    write_expr(arg, &format!("{}.args[{}]", at, i), out)?;
                }
                if annotated {
                    write_framed(annots.join(" ").as_bytes(), out);
                }
            } else {
                out.push(TAG_PRIM_N);
                out.push(opcode);
                let body = write_all(args, &format!("{}.args", at))?;
                write_framed(&body, out);
                write_framed(annots.join(" ").as_bytes(), out);
            }
        }
    }
    Ok(())
}

fn write_all(items: &[Micheline], at: &str) -> Result<Vec<u8>, AstError> {
    let mut body = Vec::new();
    for (i, item) in items.iter().enumerate() {
        write_expr(item, &format!("{}[{}]", at, i), &mut body)?;
    }
    Ok(body)
}

/// 4-byte big-endian length followed by the payload.
fn write_framed(payload: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
}

/// Zarith: the first byte holds six magnitude bits and the sign bit, each
/// following byte seven magnitude bits, least significant group first.
/// The high bit of every byte but the last is set.
pub(super) fn write_zarith(value: &BigInt, out: &mut Vec<u8>) {
    let mut n: BigUint = value.magnitude().clone();
    let mut byte = low_bits(&n, 6);
    if value.sign() == Sign::Minus {
        byte |= 0x40;
    }
    n >>= 6u32;
    while !n.is_zero() {
        out.push(byte | 0x80);
        byte = low_bits(&n, 7);
        n >>= 7u32;
    }
    out.push(byte);
}

fn low_bits(n: &BigUint, bits: u32) -> u8 {
    let low = n.iter_u32_digits().next().unwrap_or(0);
    (low & ((1 << bits) - 1)) as u8
}
