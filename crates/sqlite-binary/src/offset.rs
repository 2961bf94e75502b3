//! Offset selection.
//!
//! Every raw byte `b` is stored as `b - e (mod 256)` for a single offset
//! `e`. Stored values `0x00`, `0x01` and `0x27` need a two-byte escape, so
//! the cost of an offset is the number of raw bytes that land on one of
//! those three values. The selector picks the cheapest legal offset.

use crate::histogram::ByteHistogram;

/// The literal delimiter that may never appear in a token.
pub const QUOTE: u8 = 0x27;

/// Escape introducer.
pub const ESCAPE: u8 = 0x01;

/// Check if `offset` may be written as the first byte of a token.
#[must_use]
pub const fn is_valid_offset(offset: u8) -> bool {
    offset != 0 && offset != QUOTE
}

/// Number of escape sequences the encoder emits for `offset`.
#[must_use]
pub fn escape_cost(hist: &ByteHistogram, offset: u8) -> usize {
    hist.count(offset)
        + hist.count(offset.wrapping_add(1))
        + hist.count(offset.wrapping_add(QUOTE))
}

/// Pick the offset with the fewest escapes.
///
/// Candidates are scanned from 1 upward and the first one reaching the
/// lowest cost wins; the scan stops at the first zero-cost offset. Returns
/// `None` for an empty histogram, which is encoded without an offset.
#[must_use]
pub fn select_offset(hist: &ByteHistogram) -> Option<u8> {
    if hist.is_empty() {
        return None;
    }

    let mut best: Option<(u8, usize)> = None;
    for offset in (1..=u8::MAX).filter(|&e| is_valid_offset(e)) {
        let cost = escape_cost(hist, offset);
        if best.is_none_or(|(_, min)| cost < min) {
            best = Some((offset, cost));
            if cost == 0 {
                break;
            }
        }
    }
    best.map(|(offset, _)| offset)
}
