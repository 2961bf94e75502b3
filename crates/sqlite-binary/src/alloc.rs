//! Fallible buffer allocation.

use crate::error::BinaryError;

/// Allocate an empty vector able to hold `capacity` bytes without growing.
///
/// Fails instead of aborting when the allocator refuses the request or
/// `capacity` exceeds `limit`.
pub(crate) fn try_vec(capacity: usize, limit: usize) -> Result<Vec<u8>, BinaryError> {
    let refused = || {
        tracing::debug!(requested = capacity, limit, "binary buffer allocation refused");
        BinaryError::AllocationFailure {
            requested: capacity,
        }
    };

    if capacity > limit {
        return Err(refused());
    }
    let mut buf = Vec::new();
    buf.try_reserve_exact(capacity).map_err(|_| refused())?;
    Ok(buf)
}

/// Grow `buf` so its spare room covers `capacity` bytes in total.
pub(crate) fn try_grow(
    buf: &mut Vec<u8>,
    capacity: usize,
    limit: usize,
) -> Result<(), BinaryError> {
    if capacity > limit {
        tracing::debug!(requested = capacity, limit, "binary buffer growth refused");
        return Err(BinaryError::AllocationFailure {
            requested: capacity,
        });
    }
    let additional = capacity.saturating_sub(buf.len());
    buf.try_reserve_exact(additional).map_err(|_| {
        tracing::debug!(requested = capacity, "binary buffer growth refused");
        BinaryError::AllocationFailure {
            requested: capacity,
        }
    })
}
