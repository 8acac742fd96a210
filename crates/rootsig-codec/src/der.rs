use std::fmt;

use crate::error::CodecError;

const TAG_SEQUENCE: u8 = 0x30;
const TAG_INTEGER: u8 = 0x02;
/// Single-byte DER lengths only; bit 7 set means long form.
const LONG_FORM_BIT: u8 = 0x80;

/// Names the half of an ECDSA signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coordinate {
    /// The `r` value.
    R,
    /// The `s` value.
    S,
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::R => write!(f, "r"),
            Coordinate::S => write!(f, "s"),
        }
    }
}

/// Width rules for fixed-size `r || s` signatures.
///
/// Coordinates are normalized to a multiple of `alignment` bytes: a two's
/// complement `0x00` prefix is dropped when it makes the length one past the
/// boundary, and a single zero byte is prepended when the length is one short.
/// Anything else is rejected. The heuristic is only sound for curves whose
/// field size is itself a multiple of the alignment, so only [`P256`] is
/// offered.
///
/// [`P256`]: CoordinateLayout::P256
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateLayout {
    alignment: usize,
}

impl CoordinateLayout {
    /// NIST P-256: 32-byte coordinates, normalized on 16-byte boundaries.
    pub const P256: CoordinateLayout = CoordinateLayout { alignment: 16 };

    /// Byte boundary every coordinate is padded to.
    pub const fn alignment(&self) -> usize {
        self.alignment
    }

    /// Converts a DER `SEQUENCE { INTEGER r, INTEGER s }` into `r || s`.
    pub fn der_to_compact(&self, der: &[u8]) -> Result<Vec<u8>, CodecError> {
        let elements = read_integer_sequence(der)?;
        if elements.len() != 2 {
            return Err(CodecError::UnexpectedElementCount {
                found: elements.len(),
            });
        }

        let r = self.normalize(elements[0], Coordinate::R)?;
        let s = self.normalize(elements[1], Coordinate::S)?;

        let mut out = r;
        out.extend_from_slice(&s);
        Ok(out)
    }

    /// Re-encodes a fixed-width `r || s` signature as minimal DER.
    pub fn compact_to_der(&self, raw: &[u8]) -> Result<Vec<u8>, CodecError> {
        let half = raw.len() / 2;
        if raw.len() % 2 != 0 || half == 0 || half % self.alignment != 0 {
            return Err(CodecError::InvalidCoordinateLength {
                coordinate: Coordinate::R,
                length: half,
            });
        }

        let mut body = Vec::with_capacity(raw.len() + 6);
        write_integer(&mut body, &raw[..half]);
        write_integer(&mut body, &raw[half..]);

        if body.len() >= LONG_FORM_BIT as usize {
            return Err(CodecError::MalformedSignature(format!(
                "sequence length {} needs long-form DER",
                body.len()
            )));
        }

        let mut out = Vec::with_capacity(body.len() + 2);
        out.push(TAG_SEQUENCE);
        out.push(body.len() as u8);
        out.extend_from_slice(&body);
        Ok(out)
    }

    fn normalize(&self, value: &[u8], coordinate: Coordinate) -> Result<Vec<u8>, CodecError> {
        let align = self.alignment;
        let mut value = value;

        if value.first() == Some(&0) && value.len() % align == 1 {
            value = &value[1..];
        }

        let mut out = Vec::with_capacity(value.len() + 1);
        if value.len() % align == align - 1 {
            out.push(0);
        }
        out.extend_from_slice(value);

        if out.len() % align != 0 {
            return Err(CodecError::InvalidCoordinateLength {
                coordinate,
                length: out.len(),
            });
        }
        Ok(out)
    }
}

/// [`CoordinateLayout::der_to_compact`] for P-256.
pub fn der_to_compact(der: &[u8]) -> Result<Vec<u8>, CodecError> {
    CoordinateLayout::P256.der_to_compact(der)
}

/// [`CoordinateLayout::compact_to_der`] for P-256.
pub fn compact_to_der(raw: &[u8]) -> Result<Vec<u8>, CodecError> {
    CoordinateLayout::P256.compact_to_der(raw)
}

fn read_integer_sequence(input: &[u8]) -> Result<Vec<&[u8]>, CodecError> {
    if input.first() != Some(&TAG_SEQUENCE) {
        return Err(CodecError::MalformedSignature(
            "input is not an ASN.1 sequence".to_string(),
        ));
    }
    let seq_len = read_length(input, 1)?;
    let body = input.get(2..2 + seq_len).ok_or_else(|| {
        CodecError::MalformedSignature(format!(
            "sequence declares {} bytes but only {} remain",
            seq_len,
            input.len().saturating_sub(2)
        ))
    })?;

    let mut elements = Vec::with_capacity(2);
    let mut current = body;
    while !current.is_empty() {
        if current[0] != TAG_INTEGER {
            return Err(CodecError::MalformedSignature(format!(
                "expected INTEGER element, found tag {:#04x}",
                current[0]
            )));
        }
        let len = read_length(current, 1)?;
        if len == 0 {
            return Err(CodecError::MalformedSignature(
                "empty INTEGER element".to_string(),
            ));
        }
        let element = current.get(2..2 + len).ok_or_else(|| {
            CodecError::MalformedSignature("truncated INTEGER element".to_string())
        })?;
        elements.push(element);
        current = &current[2 + len..];
    }
    Ok(elements)
}

fn read_length(input: &[u8], at: usize) -> Result<usize, CodecError> {
    let byte = *input
        .get(at)
        .ok_or_else(|| CodecError::MalformedSignature("missing length byte".to_string()))?;
    if byte & LONG_FORM_BIT != 0 {
        return Err(CodecError::MalformedSignature(
            "long-form DER lengths are not supported".to_string(),
        ));
    }
    Ok(byte as usize)
}

fn write_integer(out: &mut Vec<u8>, magnitude: &[u8]) {
    let first_nonzero = magnitude.iter().position(|b| *b != 0);
    let trimmed: &[u8] = match first_nonzero {
        Some(i) => &magnitude[i..],
        None => &[0u8],
    };
    let pad = trimmed[0] & 0x80 != 0;

    out.push(TAG_INTEGER);
    out.push((trimmed.len() + pad as usize) as u8);
    if pad {
        out.push(0);
    }
    out.extend_from_slice(trimmed);
}
