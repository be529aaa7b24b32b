//! Protobuf wire primitives.
//!
//! A minimal, allocation-free reader for the protobuf wire format. Values
//! borrow from the input slice. Only the four wire types that appear on the
//! push channel are understood; group markers (3, 4) and the reserved types
//! (6, 7) are rejected with [`DecodeError::UnknownWireType`].

use bytes::BufMut;

use crate::error::{DecodeError, Result};

/// Maximum number of 7-bit groups in a 64-bit varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Wire type carried in the low three bits of a field key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Varint,
    Fixed64,
    LengthDelimited,
    Fixed32,
}

impl WireType {
    /// Numeric wire type as it appears in a field key.
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Varint => 0,
            Self::Fixed64 => 1,
            Self::LengthDelimited => 2,
            Self::Fixed32 => 5,
        }
    }

    /// Classify a raw wire type, reporting `offset` on failure.
    pub fn classify(raw: u8, offset: usize) -> Result<Self> {
        match raw {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::LengthDelimited),
            5 => Ok(Self::Fixed32),
            other => Err(DecodeError::UnknownWireType {
                wire_type: other,
                offset,
            }),
        }
    }
}

/// Read an unsigned base-128 varint starting at `offset`.
///
/// Returns the value and the offset of the first byte after it.
pub fn read_varint(buf: &[u8], offset: usize) -> Result<(u64, usize)> {
    let mut value = 0u64;
    let mut pos = offset;

    for group in 0..MAX_VARINT_LEN {
        let Some(&byte) = buf.get(pos) else {
            return Err(DecodeError::Truncated { offset: pos });
        };
        pos += 1;

        // The tenth group may only contribute the single remaining bit.
        if group == MAX_VARINT_LEN - 1 && byte > 0x01 {
            return Err(DecodeError::Overlong { offset });
        }

        value |= u64::from(byte & 0x7F) << (7 * group);
        if byte & 0x80 == 0 {
            return Ok((value, pos));
        }
    }

    Err(DecodeError::Overlong { offset })
}

/// Append `value` to `buf` as a varint.
pub fn encode_varint(mut value: u64, buf: &mut impl BufMut) {
    while value >= 0x80 {
        buf.put_u8((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Advance past one field value of the given raw wire type.
pub fn skip_field(buf: &[u8], offset: usize, wire_type: u8) -> Result<usize> {
    let end = match WireType::classify(wire_type, offset)? {
        WireType::Varint => return read_varint(buf, offset).map(|(_, next)| next),
        WireType::Fixed64 => offset.checked_add(8),
        WireType::Fixed32 => offset.checked_add(4),
        WireType::LengthDelimited => {
            let (len, start) = read_varint(buf, offset)?;
            usize::try_from(len)
                .ok()
                .and_then(|len| start.checked_add(len))
        }
    };

    match end {
        Some(end) if end <= buf.len() => Ok(end),
        _ => Err(DecodeError::Truncated { offset }),
    }
}

/// A decoded field value borrowing from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Varint(u64),
    Fixed64(u64),
    Bytes(&'a [u8]),
    Fixed32(u32),
}

impl FieldValue<'_> {
    pub const fn wire_type(&self) -> WireType {
        match self {
            Self::Varint(_) => WireType::Varint,
            Self::Fixed64(_) => WireType::Fixed64,
            Self::Bytes(_) => WireType::LengthDelimited,
            Self::Fixed32(_) => WireType::Fixed32,
        }
    }
}

/// One `(field number, value)` pair read from a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    pub number: u32,
    /// Offset of the field key within the reader's buffer.
    pub offset: usize,
    pub value: FieldValue<'a>,
}

/// Sequential field reader over a message body.
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Check if the reader has consumed the whole buffer.
    pub const fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub const fn position(&self) -> usize {
        self.pos
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(DecodeError::Truncated { offset: self.pos })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_varint(&mut self) -> Result<u64> {
        let (value, next) = read_varint(self.data, self.pos)?;
        self.pos = next;
        Ok(value)
    }

    /// Read the next field, or `None` at end of input.
    pub fn next_field(&mut self) -> Result<Option<Field<'a>>> {
        if self.is_empty() {
            return Ok(None);
        }

        let offset = self.pos;
        let key = self.read_varint()?;
        let number = u32::try_from(key >> 3)
            .ok()
            .filter(|&n| n != 0)
            .ok_or_else(|| DecodeError::mismatch("wire", format!("bad field key {key:#x}")))?;

        let value = match WireType::classify((key & 0x07) as u8, offset)? {
            WireType::Varint => FieldValue::Varint(self.read_varint()?),
            WireType::Fixed64 => {
                let bytes = self.read_bytes(8)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                FieldValue::Fixed64(u64::from_le_bytes(raw))
            }
            WireType::Fixed32 => {
                let bytes = self.read_bytes(4)?;
                let mut raw = [0u8; 4];
                raw.copy_from_slice(bytes);
                FieldValue::Fixed32(u32::from_le_bytes(raw))
            }
            WireType::LengthDelimited => {
                let len = self.read_varint()?;
                let len = usize::try_from(len).map_err(|_| DecodeError::Truncated {
                    offset: self.pos,
                })?;
                FieldValue::Bytes(self.read_bytes(len)?)
            }
        };

        Ok(Some(Field {
            number,
            offset,
            value,
        }))
    }
}
