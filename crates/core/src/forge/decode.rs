use bcd_interchange::{prim, Micheline};
use num_bigint::{BigInt, BigUint, Sign};

use super::{TAG_BYTES, TAG_INT, TAG_PRIM_0, TAG_PRIM_N, TAG_SEQ, TAG_STRING};
use crate::error::AstError;
use crate::Limits;

/// Read one expression spanning all of `data`. `base` is the absolute
/// offset of `data[0]`, used in error positions.
pub(super) fn read_all(data: &[u8], base: usize, limits: Limits) -> Result<Micheline, AstError> {
    let mut reader = Reader {
        data,
        pos: 0,
        end: data.len(),
        base,
        limits,
    };
    let expr = reader.expr(0)?;
    if reader.pos < data.len() {
        return Err(AstError::TrailingBytes {
            offset: base + reader.pos,
            remaining: data.len() - reader.pos,
        });
    }
    Ok(expr)
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    /// Exclusive bound of the current length-prefixed frame.
    end: usize,
    base: usize,
    limits: Limits,
}

impl<'a> Reader<'a> {
    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], AstError> {
        let available = self.end - self.pos;
        if n > available {
            return Err(AstError::TruncatedInput {
                offset: self.offset(),
                needed: n - available,
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn byte(&mut self) -> Result<u8, AstError> {
        Ok(self.take(1)?[0])
    }

    fn length(&mut self) -> Result<usize, AstError> {
        let raw = self.take(4)?;
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize)
    }

    fn framed(&mut self) -> Result<&'a [u8], AstError> {
        let len = self.length()?;
        self.take(len)
    }

    fn utf8(&self, raw: &[u8], at: usize) -> Result<String, AstError> {
        String::from_utf8(raw.to_vec())
            .map_err(|_| AstError::malformed(&format!("@{}", at), "invalid utf-8 in string"))
    }

    fn expr(&mut self, depth: usize) -> Result<Micheline, AstError> {
        if depth > self.limits.max_depth {
            return Err(AstError::NestingTooDeep {
                limit: self.limits.max_depth,
            });
        }
        let tag_at = self.offset();
        let tag = self.byte()?;
        match tag {
            TAG_INT => self.zarith().map(|n| Micheline::Int(n.to_string())),
            TAG_STRING => {
                let at = self.offset();
                let raw = self.framed()?;
                self.utf8(raw, at).map(Micheline::String)
            }
            TAG_BYTES => self.framed().map(Micheline::bytes),
            TAG_SEQ => self.sequence(depth).map(Micheline::Seq),
            TAG_PRIM_0..=0x08 => {
                let arity = ((tag - TAG_PRIM_0) / 2) as usize;
                let annotated = (tag - TAG_PRIM_0) % 2 == 1;
                let keyword = self.keyword()?;
                let mut args = Vec::with_capacity(arity);
                for _ in 0..arity {
                    args.push(self.expr(depth + 1)?);
                }
                let annots = if annotated { self.annots()? } else { Vec::new() };
                Ok(Micheline::prim_annotated(keyword, args, annots))
            }
            TAG_PRIM_N => {
                let keyword = self.keyword()?;
                let args = self.sequence(depth)?;
                let annots = self.annots()?;
                Ok(Micheline::prim_annotated(keyword, args, annots))
            }
            _ => Err(AstError::UnknownTag {
                offset: tag_at,
                tag,
            }),
        }
    }

    /// A length-prefixed run of expressions one level deeper than `depth`.
    fn sequence(&mut self, depth: usize) -> Result<Vec<Micheline>, AstError> {
        let len = self.length()?;
        let available = self.end - self.pos;
        if len > available {
            return Err(AstError::TruncatedInput {
                offset: self.offset(),
                needed: len - available,
            });
        }
        let outer_end = self.end;
        self.end = self.pos + len;
        let mut items = Vec::new();
        while self.pos < self.end {
            items.push(self.expr(depth + 1)?);
        }
        self.end = outer_end;
        Ok(items)
    }

    fn keyword(&mut self) -> Result<&'static str, AstError> {
        let at = self.offset();
        let opcode = self.byte()?;
        prim::keyword(opcode).ok_or(AstError::UnknownTag { offset: at, tag: opcode })
    }

    fn annots(&mut self) -> Result<Vec<String>, AstError> {
        let at = self.offset();
        let raw = self.framed()?;
        let text = self.utf8(raw, at)?;
        Ok(text
            .split(' ')
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn zarith(&mut self) -> Result<BigInt, AstError> {
        let first = self.byte()?;
        let negative = first & 0x40 != 0;
        let mut magnitude = BigUint::from(first & 0x3f);
        let mut shift = 6u32;
        let mut more = first & 0x80 != 0;
        while more {
            let b = self.byte()?;
            magnitude |= BigUint::from(b & 0x7f) << shift;
            shift += 7;
            more = b & 0x80 != 0;
        }
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        Ok(BigInt::from_biguint(sign, magnitude))
    }
}
