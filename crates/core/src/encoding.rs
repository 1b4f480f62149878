//! Readable/optimized conversions for scalar primitives.
//!
//! Addresses, key hashes, keys, signatures and chain identifiers are
//! base58check strings in readable form and tagged raw bytes in optimized
//! (binary) form. Timestamps are RFC3339 strings or integer seconds.

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// A base58check family: readable prefix, binary prefix, payload size,
/// encoded length.
struct Family {
    readable: &'static str,
    prefix: &'static [u8],
    payload: usize,
    length: usize,
}

const TZ1: Family = Family { readable: "tz1", prefix: &[6, 161, 159], payload: 20, length: 36 };
const TZ2: Family = Family { readable: "tz2", prefix: &[6, 161, 161], payload: 20, length: 36 };
const TZ3: Family = Family { readable: "tz3", prefix: &[6, 161, 164], payload: 20, length: 36 };
const TZ4: Family = Family { readable: "tz4", prefix: &[6, 161, 166], payload: 20, length: 36 };
const KT1: Family = Family { readable: "KT1", prefix: &[2, 90, 121], payload: 20, length: 36 };
const TXR1: Family = Family { readable: "txr1", prefix: &[1, 128, 120, 31], payload: 20, length: 37 };
const SR1: Family = Family { readable: "sr1", prefix: &[6, 124, 117], payload: 20, length: 36 };

const EDPK: Family = Family { readable: "edpk", prefix: &[13, 15, 37, 217], payload: 32, length: 54 };
const SPPK: Family = Family { readable: "sppk", prefix: &[3, 254, 226, 86], payload: 33, length: 55 };
const P2PK: Family = Family { readable: "p2pk", prefix: &[3, 178, 139, 127], payload: 33, length: 55 };
const BLPK: Family = Family { readable: "BLpk", prefix: &[6, 149, 135, 204], payload: 48, length: 76 };

const EDSIG: Family = Family { readable: "edsig", prefix: &[9, 245, 205, 134, 18], payload: 64, length: 99 };
const SPSIG: Family = Family { readable: "spsig1", prefix: &[13, 115, 101, 19, 63], payload: 64, length: 99 };
const P2SIG: Family = Family { readable: "p2sig", prefix: &[54, 240, 44, 52], payload: 64, length: 98 };
const SIG: Family = Family { readable: "sig", prefix: &[4, 130, 43], payload: 64, length: 96 };
const BLSIG: Family = Family { readable: "BLsig", prefix: &[40, 171, 64, 207], payload: 96, length: 142 };

const NET: Family = Family { readable: "Net", prefix: &[87, 82, 0], payload: 4, length: 15 };

/// Implicit account families, indexed by their binary curve tag.
const IMPLICIT: [&Family; 4] = [&TZ1, &TZ2, &TZ3, &TZ4];
/// Originated families, indexed by their binary address tag minus one.
const ORIGINATED: [&Family; 3] = [&KT1, &TXR1, &SR1];
/// Public key families, indexed by their binary curve tag.
const KEYS: [&Family; 4] = [&EDPK, &SPPK, &P2PK, &BLPK];
const SIGNATURES: [&Family; 5] = [&EDSIG, &SPSIG, &P2SIG, &SIG, &BLSIG];

// ──────────────────────────────────────────────
// base58check
// ──────────────────────────────────────────────

fn b58check_encode(prefix: &[u8], payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(prefix.len() + payload.len());
    data.extend_from_slice(prefix);
    data.extend_from_slice(payload);
    bs58::encode(data).with_check().into_string()
}

/// Decode and verify a base58check string, returning the payload after `prefix`.
fn b58check_decode(text: &str, family: &Family) -> Option<Vec<u8>> {
    let body = bs58::decode(text).with_check(None).into_vec().ok()?;
    if body.len() != family.prefix.len() + family.payload {
        return None;
    }
    body.strip_prefix(family.prefix).map(|p| p.to_vec())
}

/// Alphabet check only; the checksum is verified on conversion.
fn is_base58(text: &str) -> bool {
    bs58::decode(text).into_vec().is_ok()
}

fn matches_family(text: &str, family: &Family) -> bool {
    text.len() == family.length && text.starts_with(family.readable) && is_base58(text)
}

fn family_of<'a>(text: &str, families: &[&'a Family]) -> Option<&'a Family> {
    families.iter().copied().find(|f| matches_family(text, f))
}

// ──────────────────────────────────────────────
// Minimal validation (prefix + length)
// ──────────────────────────────────────────────

/// Split `KT1...%entrypoint` into the address and its entrypoint.
pub fn split_entrypoint(text: &str) -> (&str, Option<&str>) {
    match text.split_once('%') {
        Some((addr, ep)) => (addr, Some(ep)),
        None => (text, None),
    }
}

pub fn is_address(text: &str) -> bool {
    let (addr, entrypoint) = split_entrypoint(text);
    if entrypoint.map_or(false, |e| e.is_empty() || e.len() > 31) {
        return false;
    }
    family_of(addr, &IMPLICIT).is_some() || family_of(addr, &ORIGINATED).is_some()
}

pub fn is_key_hash(text: &str) -> bool {
    family_of(text, &IMPLICIT).is_some()
}

pub fn is_key(text: &str) -> bool {
    family_of(text, &KEYS).is_some()
}

pub fn is_signature(text: &str) -> bool {
    family_of(text, &SIGNATURES).is_some()
}

pub fn is_chain_id(text: &str) -> bool {
    matches_family(text, &NET)
}

// ──────────────────────────────────────────────
// Optimized (binary) forms
// ──────────────────────────────────────────────

/// 22-byte address, optionally followed by an entrypoint name.
pub fn address_from_bytes(bytes: &[u8]) -> Option<String> {
    if bytes.len() < 22 {
        return None;
    }
    let (raw, entrypoint) = bytes.split_at(22);
    let addr = match raw[0] {
        0 => key_hash_from_bytes(&raw[1..22])?,
        tag @ 1..=3 => {
            if raw[21] != 0 {
                return None;
            }
            let family = ORIGINATED[(tag - 1) as usize];
            b58check_encode(family.prefix, &raw[1..21])
        }
        _ => return None,
    };
    if entrypoint.is_empty() {
        return Some(addr);
    }
    let ep = std::str::from_utf8(entrypoint).ok()?;
    Some(format!("{}%{}", addr, ep))
}

pub fn address_to_bytes(text: &str) -> Option<Vec<u8>> {
    let (addr, entrypoint) = split_entrypoint(text);
    let mut out = Vec::with_capacity(22);
    if let Some(hash) = key_hash_to_bytes(addr) {
        out.push(0);
        out.extend_from_slice(&hash);
    } else {
        let (tag, family) = ORIGINATED
            .iter()
            .enumerate()
            .find(|(_, f)| matches_family(addr, f))?;
        out.push(tag as u8 + 1);
        out.extend_from_slice(&b58check_decode(addr, family)?);
        out.push(0);
    }
    if let Some(ep) = entrypoint {
        out.extend_from_slice(ep.as_bytes());
    }
    Some(out)
}

/// 21 bytes: curve tag followed by the 20-byte hash.
pub fn key_hash_from_bytes(bytes: &[u8]) -> Option<String> {
    let (tag, hash) = bytes.split_first()?;
    let family = IMPLICIT.get(*tag as usize)?;
    if hash.len() != family.payload {
        return None;
    }
    Some(b58check_encode(family.prefix, hash))
}

pub fn key_hash_to_bytes(text: &str) -> Option<Vec<u8>> {
    let (tag, family) = IMPLICIT
        .iter()
        .enumerate()
        .find(|(_, f)| matches_family(text, f))?;
    let mut out = vec![tag as u8];
    out.extend_from_slice(&b58check_decode(text, family)?);
    Some(out)
}

/// Curve tag followed by the raw public key.
pub fn key_from_bytes(bytes: &[u8]) -> Option<String> {
    let (tag, key) = bytes.split_first()?;
    let family = KEYS.get(*tag as usize)?;
    if key.len() != family.payload {
        return None;
    }
    Some(b58check_encode(family.prefix, key))
}

pub fn key_to_bytes(text: &str) -> Option<Vec<u8>> {
    let (tag, family) = KEYS
        .iter()
        .enumerate()
        .find(|(_, f)| matches_family(text, f))?;
    let mut out = vec![tag as u8];
    out.extend_from_slice(&b58check_decode(text, family)?);
    Some(out)
}

/// Raw signatures carry no curve tag: 64 bytes decode to the generic
/// `sig` form, 96 bytes to `BLsig`.
pub fn signature_from_bytes(bytes: &[u8]) -> Option<String> {
    let family = match bytes.len() {
        64 => &SIG,
        96 => &BLSIG,
        _ => return None,
    };
    Some(b58check_encode(family.prefix, bytes))
}

pub fn signature_to_bytes(text: &str) -> Option<Vec<u8>> {
    let family = family_of(text, &SIGNATURES)?;
    b58check_decode(text, family)
}

pub fn chain_id_from_bytes(bytes: &[u8]) -> Option<String> {
    if bytes.len() != NET.payload {
        return None;
    }
    Some(b58check_encode(NET.prefix, bytes))
}

pub fn chain_id_to_bytes(text: &str) -> Option<Vec<u8>> {
    b58check_decode(text, &NET)
}

// ──────────────────────────────────────────────
// Timestamps
// ──────────────────────────────────────────────

/// RFC3339 rendering of unix seconds, or `None` when out of range.
pub fn format_timestamp(seconds: &BigInt) -> Option<String> {
    let secs = seconds.to_i64()?;
    let dt = OffsetDateTime::from_unix_timestamp(secs).ok()?;
    dt.format(&Rfc3339).ok()
}

pub fn parse_timestamp(text: &str) -> Option<BigInt> {
    let dt = OffsetDateTime::parse(text, &Rfc3339).ok()?;
    Some(BigInt::from(dt.unix_timestamp()))
}
