//! BLAKE3-based fingerprints for cache addressing.

use crate::model::Context;

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Collisions are tolerable for cache addressing: a collision can only make two
/// contexts of the same user share a cached list, never corrupt one. For `n`
/// distinct keys the collision probability is roughly `n² / 2^65`.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}

/// Fingerprints the cache-relevant part of a [`Context`].
///
/// Only the season and device take part; the request timestamp does not, otherwise
/// no two requests would ever share an entry. Absent and empty values are distinct.
#[inline]
pub fn context_fingerprint(context: &Context) -> u64 {
    let mut buf = Vec::with_capacity(64);
    encode_optional(&mut buf, context.season());
    buf.push(b'|');
    encode_optional(&mut buf, context.device());
    hash_to_u64(&buf)
}

fn encode_optional(buf: &mut Vec<u8>, value: Option<&str>) {
    match value {
        Some(v) => {
            buf.push(b's');
            buf.extend_from_slice(&(v.len() as u64).to_le_bytes());
            buf.extend_from_slice(v.as_bytes());
        }
        None => buf.push(b'n'),
    }
}
