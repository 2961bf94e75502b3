//! Token encoding.
//!
//! A token is `[offset][escaped payload][0x00]`. Each raw byte `b` becomes
//! `c = b - offset (mod 256)`, and the three values that may not appear
//! bare are escaped:
//!
//! | `c`    | emitted     |
//! |--------|-------------|
//! | `0x00` | `0x01 0x01` |
//! | `0x01` | `0x01 0x02` |
//! | `0x27` | `0x01 0x03` |
//!
//! An empty input is encoded as the fixed token `"x"`.

use bytes::{BufMut, Bytes};

use crate::alloc::try_vec;
use crate::error::BinaryError;
use crate::histogram::ByteHistogram;
use crate::offset::{ESCAPE, QUOTE, select_offset};

/// Token produced for a zero-length input.
pub const EMPTY_TOKEN: u8 = b'x';

/// Worst-case size of the encoding of `n` raw bytes, terminator included.
///
/// This is `3 + ceil(257 * n / 254)`. Returns `None` when the bound does
/// not fit in `usize`.
#[must_use]
pub fn max_encoded_len(n: usize) -> Option<usize> {
    n.checked_mul(257)?.div_ceil(254).checked_add(3)
}

#[cfg(test)]
thread_local! {
    static ENCODE_CALLS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Number of times [`encode_into`] ran on the current thread.
#[cfg(test)]
pub(crate) fn encode_calls() -> usize {
    ENCODE_CALLS.with(std::cell::Cell::get)
}

/// Encode `raw` into `dst`, terminator included.
///
/// Returns the logical length of the token, which excludes the trailing
/// `0x00`. At most [`max_encoded_len`] bytes are written.
pub fn encode_into(raw: &[u8], dst: &mut impl BufMut) -> usize {
    #[cfg(test)]
    ENCODE_CALLS.with(|calls| calls.set(calls.get() + 1));

    let Some(offset) = select_offset(&ByteHistogram::from_bytes(raw)) else {
        dst.put_u8(EMPTY_TOKEN);
        dst.put_u8(0);
        return 1;
    };

    dst.put_u8(offset);
    let mut written = 1;
    let mut escapes = 0usize;
    for &b in raw {
        let c = b.wrapping_sub(offset);
        match c {
            0x00 => dst.put_slice(&[ESCAPE, 1]),
            0x01 => dst.put_slice(&[ESCAPE, 2]),
            QUOTE => dst.put_slice(&[ESCAPE, 3]),
            _ => {
                dst.put_u8(c);
                written += 1;
                continue;
            }
        }
        written += 2;
        escapes += 1;
    }
    dst.put_u8(0);

    tracing::trace!(
        offset,
        raw_len = raw.len(),
        encoded_len = written,
        escapes,
        "encoded binary token"
    );

    written
}

/// Encode `raw` into a freshly allocated token.
///
/// The returned bytes are the logical token, without the terminator, ready
/// to be placed between single quotes in SQL text.
pub fn encode_for_storage(raw: &[u8]) -> Result<Bytes, BinaryError> {
    let capacity = max_encoded_len(raw.len()).ok_or(BinaryError::AllocationFailure {
        requested: usize::MAX,
    })?;
    let mut token = try_vec(capacity, usize::MAX)?;
    let len = encode_into(raw, &mut token);
    token.truncate(len);
    Ok(Bytes::from(token))
}
