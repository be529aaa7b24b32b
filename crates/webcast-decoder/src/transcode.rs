//! Payload transcoding.
//!
//! Envelope payloads are either plain or gzip-compressed. Gzip members may
//! also appear at arbitrary offsets inside noisy frames; [`find_gzip_magic`]
//! and [`inflate_at`] support the resolver's scanning strategy.

use std::io::Read;

use bytes::Bytes;
use flate2::read::GzDecoder;

use crate::error::{DecodeError, Result};
use crate::schema::PayloadEncoding;

/// The two-byte gzip member header.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

pub fn has_gzip_magic(data: &[u8]) -> bool {
    data.starts_with(&GZIP_MAGIC)
}

/// Offset of the next gzip magic at or after `from`.
pub fn find_gzip_magic(data: &[u8], from: usize) -> Option<usize> {
    let haystack = data.get(from..)?;
    memchr::memmem::find(haystack, &GZIP_MAGIC).map(|pos| from + pos)
}

/// Decompresses one gzip member, refusing output larger than `max_len`.
///
/// Bytes trailing the member are ignored.
pub fn inflate(data: &[u8], max_len: usize) -> Result<Vec<u8>> {
    let limit = u64::try_from(max_len).unwrap_or(u64::MAX).saturating_add(1);
    let mut decoder = GzDecoder::new(data).take(limit);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| DecodeError::InflateFailed(e.to_string()))?;

    if decompressed.len() > max_len {
        return Err(DecodeError::InflateFailed(format!(
            "inflated size exceeds {max_len} bytes"
        )));
    }
    Ok(decompressed)
}

/// Inflate the gzip member starting at `offset`.
pub fn inflate_at(data: &[u8], offset: usize, max_len: usize) -> Result<Vec<u8>> {
    let member = data
        .get(offset..)
        .filter(|m| has_gzip_magic(m))
        .ok_or_else(|| DecodeError::InflateFailed(format!("no gzip member at {offset}")))?;
    inflate(member, max_len)
}

/// Apply the envelope's declared payload encoding.
pub fn transcode(payload: &Bytes, encoding: PayloadEncoding, max_len: usize) -> Result<Bytes> {
    match encoding {
        PayloadEncoding::None => Ok(payload.clone()),
        PayloadEncoding::Gzip => inflate(payload, max_len).map(Bytes::from),
    }
}
