//! Token decoding.
//!
//! A token ends at its first `0x00` byte, or at the end of the slice when
//! it carries no terminator (text read back from a result row usually
//! doesn't). Decoding is strict: anything the encoder could not have
//! produced is rejected with [`BinaryError::MalformedEncoding`].

use bytes::{BufMut, Bytes};

use crate::alloc::try_vec;
use crate::error::{BinaryError, MalformedReason};
use crate::offset::{ESCAPE, QUOTE, is_valid_offset};

/// Strip the terminator and anything after it.
fn logical_token(token: &[u8]) -> &[u8] {
    match token.iter().position(|&b| b == 0) {
        Some(end) => &token[..end],
        None => token,
    }
}

/// Read the offset byte of a logical token.
fn split_offset(token: &[u8]) -> Result<(u8, &[u8]), BinaryError> {
    let (&offset, payload) = token
        .split_first()
        .ok_or(BinaryError::malformed(0, MalformedReason::EmptyToken))?;
    if !is_valid_offset(offset) {
        return Err(BinaryError::malformed(0, MalformedReason::InvalidOffset(offset)));
    }
    Ok((offset, payload))
}

/// Resolve the symbol starting at `payload[i]`.
///
/// Returns the stored value before the offset is added back, and the
/// number of payload bytes it occupied.
#[inline]
fn next_symbol(payload: &[u8], i: usize) -> Result<(u8, usize), BinaryError> {
    // payload index i is token index i + 1
    match payload[i] {
        ESCAPE => match payload.get(i + 1) {
            Some(1) => Ok((0x00, 2)),
            Some(2) => Ok((0x01, 2)),
            Some(3) => Ok((QUOTE, 2)),
            Some(&other) => Err(BinaryError::malformed(
                i + 2,
                MalformedReason::InvalidEscape(other),
            )),
            None => Err(BinaryError::malformed(i + 2, MalformedReason::TruncatedEscape)),
        },
        QUOTE => Err(BinaryError::malformed(i + 1, MalformedReason::UnescapedQuote)),
        c => Ok((c, 1)),
    }
}

/// Check that `token` is well formed without decoding it.
///
/// Returns the number of raw bytes the token decodes to.
pub fn validate_token(token: &[u8]) -> Result<usize, BinaryError> {
    let (_, payload) = split_offset(logical_token(token)).inspect_err(log_rejected)?;

    let mut decoded = 0;
    let mut i = 0;
    while i < payload.len() {
        let (_, width) = next_symbol(payload, i).inspect_err(log_rejected)?;
        i += width;
        decoded += 1;
    }
    Ok(decoded)
}

/// Decode `token` into `dst`.
///
/// The whole token is validated before anything is written, so `dst` is
/// left untouched on failure. Returns the number of raw bytes written.
pub fn decode_into(token: &[u8], dst: &mut impl BufMut) -> Result<usize, BinaryError> {
    let len = validate_token(token)?;
    write_decoded(logical_token(token), dst)?;
    Ok(len)
}

/// Decode a token read back from storage into freshly allocated bytes.
pub fn decode_from_storage(token: &[u8]) -> Result<Bytes, BinaryError> {
    let len = validate_token(token)?;
    let mut raw = try_vec(len, usize::MAX)?;
    write_decoded(logical_token(token), &mut raw)?;
    Ok(Bytes::from(raw))
}

fn write_decoded(token: &[u8], dst: &mut impl BufMut) -> Result<(), BinaryError> {
    let (offset, payload) = split_offset(token)?;
    let mut i = 0;
    while i < payload.len() {
        let (c, width) = next_symbol(payload, i)?;
        dst.put_u8(c.wrapping_add(offset));
        i += width;
    }

    tracing::trace!(offset, encoded_len = token.len(), "decoded binary token");
    Ok(())
}

/// Decode the token held in `buf` into the front of the same slice.
///
/// Decoded output never outruns the read position, so each byte is
/// written only after the bytes it replaces have been consumed. Returns
/// the decoded length; on error the contents of `buf` are unspecified.
pub fn decode_in_place(buf: &mut [u8]) -> Result<usize, BinaryError> {
    let end = logical_token(buf).len();
    let (offset, _) = split_offset(&buf[..end]).inspect_err(log_rejected)?;

    let mut read = 1;
    let mut written = 0;
    while read < end {
        let (c, width) = next_symbol(&buf[1..end], read - 1).inspect_err(log_rejected)?;
        buf[written] = c.wrapping_add(offset);
        written += 1;
        read += width;
    }

    tracing::trace!(
        offset,
        encoded_len = end,
        decoded_len = written,
        "decoded binary token in place"
    );
    Ok(written)
}

fn log_rejected(err: &BinaryError) {
    tracing::debug!(error = %err, "rejected malformed binary token");
}
