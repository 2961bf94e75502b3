//! Lazily transcoding binary buffer.
//!
//! [`BinaryBuffer`] owns a single allocation holding either raw bytes or
//! their encoded token, and converts between the two only when the other
//! form is asked for.
//!
//! ```text
//! Empty ── set_binary / alloc_binary ──▶ Raw ── encoded() ──▶ Encoded
//!                                        Raw ◀── binary() ─── Encoded
//! Empty ── set_encoded ─────────────────────────────────────▶ Encoded
//! any   ── clear() ──▶ Empty
//! ```
//!
//! A buffer filled with `n` raw bytes always has room for the worst-case
//! encoding of those bytes (see [`max_encoded_len`]), so encoding never
//! reallocates on that path.

use crate::alloc::{try_grow, try_vec};
use crate::config::{BinaryConfig, DecodePolicy};
use crate::decode::{decode_in_place, validate_token};
use crate::encode::{encode_into, max_encoded_len};
use crate::error::{BinaryError, MalformedReason};

/// Which representation a [`BinaryBuffer`] currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferState {
    /// No allocation.
    #[default]
    Empty,
    /// Raw bytes of the given length.
    Raw(usize),
    /// An encoded token of the given logical length (terminator excluded).
    Encoded(usize),
}

/// An owned byte buffer that holds binary data as raw bytes or as an
/// encoded token and converts lazily between them.
///
/// Conversions mutate the buffer in place, so the accessors take
/// `&mut self`. The buffer is not meant to be shared across threads
/// without external locking.
#[derive(Debug, Default)]
pub struct BinaryBuffer {
    buf: Vec<u8>,
    capacity: usize,
    state: BufferState,
    config: BinaryConfig,
}

impl BinaryBuffer {
    /// Create an empty buffer with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with a custom configuration.
    #[must_use]
    pub fn with_config(config: BinaryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Get the buffer configuration.
    #[must_use]
    pub fn config(&self) -> &BinaryConfig {
        &self.config
    }

    /// Get the current representation.
    #[must_use]
    pub fn state(&self) -> BufferState {
        self.state
    }

    /// Bytes reserved for the current allocation.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if the buffer holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state == BufferState::Empty
    }

    /// Store a copy of `raw`, discarding previous contents.
    ///
    /// On failure the buffer keeps its previous contents.
    pub fn set_binary(&mut self, raw: &[u8]) -> Result<(), BinaryError> {
        let (mut buf, capacity) = self.raw_allocation(raw.len())?;
        buf.extend_from_slice(raw);
        self.replace(buf, capacity, BufferState::Raw(raw.len()));
        Ok(())
    }

    /// Allocate room for `len` raw bytes and hand them out for filling.
    ///
    /// The bytes start zeroed and the buffer is in the raw state with
    /// length `len`. On failure the buffer keeps its previous contents.
    pub fn alloc_binary(&mut self, len: usize) -> Result<&mut [u8], BinaryError> {
        let (mut buf, capacity) = self.raw_allocation(len)?;
        buf.resize(len, 0);
        self.replace(buf, capacity, BufferState::Raw(len));
        Ok(&mut self.buf[..])
    }

    /// Store a copy of an encoded token, discarding previous contents.
    ///
    /// The token ends at its first `0x00` byte or at the end of the slice.
    /// A token with no offset byte is rejected with
    /// [`MalformedReason::EmptyToken`]; the payload is not checked until
    /// the raw bytes are asked for. On failure the buffer keeps its
    /// previous contents.
    pub fn set_encoded(&mut self, token: &[u8]) -> Result<(), BinaryError> {
        let len = token.iter().position(|&b| b == 0).unwrap_or(token.len());
        if len == 0 {
            return Err(BinaryError::malformed(0, MalformedReason::EmptyToken));
        }
        let capacity = len.checked_add(1).ok_or(BinaryError::AllocationFailure {
            requested: usize::MAX,
        })?;
        let mut buf = try_vec(capacity, self.config.max_capacity)?;
        buf.extend_from_slice(&token[..len]);
        buf.push(0);
        self.replace(buf, capacity, BufferState::Encoded(len));
        Ok(())
    }

    /// Get the encoded token, without its terminator.
    ///
    /// Raw contents are encoded on first call; later calls return the
    /// stored token. An empty buffer encodes as the empty payload.
    pub fn encoded(&mut self) -> Result<&[u8], BinaryError> {
        let len = self.ensure_encoded()?;
        Ok(&self.buf[..len])
    }

    /// Get the encoded token followed by its `0x00` terminator.
    pub fn encoded_with_nul(&mut self) -> Result<&[u8], BinaryError> {
        let len = self.ensure_encoded()?;
        Ok(&self.buf[..=len])
    }

    /// Get the raw bytes, decoding the stored token if needed.
    ///
    /// A malformed token fails with [`BinaryError::MalformedEncoding`].
    /// Under [`DecodePolicy::Validate`] the token is kept as it was; under
    /// [`DecodePolicy::InPlace`] the buffer is cleared.
    pub fn binary(&mut self) -> Result<&[u8], BinaryError> {
        let len = self.ensure_binary()?;
        Ok(&self.buf[..len])
    }

    /// Get the length of the raw bytes, decoding the stored token if needed.
    pub fn binary_len(&mut self) -> Result<usize, BinaryError> {
        self.ensure_binary()
    }

    /// Release the allocation and return to the empty state.
    pub fn clear(&mut self) {
        self.buf = Vec::new();
        self.capacity = 0;
        self.state = BufferState::Empty;
    }

    /// Move the contents out, leaving this buffer empty.
    ///
    /// The configuration stays with both buffers.
    #[must_use]
    pub fn take(&mut self) -> Self {
        let empty = Self::with_config(self.config.clone());
        std::mem::replace(self, empty)
    }

    /// Deep copy that reports allocation failure instead of aborting.
    pub fn try_clone(&self) -> Result<Self, BinaryError> {
        let mut buf = try_vec(self.capacity, self.config.max_capacity)?;
        buf.extend_from_slice(&self.buf);
        Ok(Self {
            buf,
            capacity: self.capacity,
            state: self.state,
            config: self.config.clone(),
        })
    }

    fn raw_allocation(&self, len: usize) -> Result<(Vec<u8>, usize), BinaryError> {
        let capacity = max_encoded_len(len).ok_or(BinaryError::AllocationFailure {
            requested: usize::MAX,
        })?;
        let buf = try_vec(capacity, self.limit_for(len))?;
        Ok((buf, capacity))
    }

    /// Allocation cap for a payload of `raw_len` bytes.
    ///
    /// The empty payload's token is always allowed.
    fn limit_for(&self, raw_len: usize) -> usize {
        if raw_len == 0 {
            usize::MAX
        } else {
            self.config.max_capacity
        }
    }

    fn replace(&mut self, buf: Vec<u8>, capacity: usize, state: BufferState) {
        self.buf = buf;
        self.capacity = capacity;
        self.state = state;
        tracing::trace!(state = ?state, capacity, "binary buffer filled");
    }

    fn ensure_encoded(&mut self) -> Result<usize, BinaryError> {
        let raw_len = match self.state {
            BufferState::Encoded(len) => return Ok(len),
            BufferState::Raw(len) => len,
            BufferState::Empty => 0,
        };

        // The token can outgrow the input consumed so far, so encode from a copy.
        let capacity = max_encoded_len(raw_len).ok_or(BinaryError::AllocationFailure {
            requested: usize::MAX,
        })?;
        let mut raw = try_vec(raw_len, self.config.max_capacity)?;
        raw.extend_from_slice(&self.buf[..raw_len]);
        if capacity > self.capacity {
            // Raw bytes recovered from a stored token may need more room.
            let limit = self.limit_for(raw_len);
            try_grow(&mut self.buf, capacity, limit)?;
            self.capacity = capacity;
        }

        self.buf.clear();
        let len = encode_into(&raw, &mut self.buf);
        self.state = BufferState::Encoded(len);
        tracing::trace!(raw_len, encoded_len = len, "binary buffer encoded");
        Ok(len)
    }

    fn ensure_binary(&mut self) -> Result<usize, BinaryError> {
        let len = match self.state {
            BufferState::Raw(len) => return Ok(len),
            BufferState::Empty => return Ok(0),
            BufferState::Encoded(len) => len,
        };

        let decoded = match self.config.decode_policy {
            DecodePolicy::Validate => {
                validate_token(&self.buf[..len])?;
                decode_in_place(&mut self.buf[..len])?
            }
            DecodePolicy::InPlace => match decode_in_place(&mut self.buf[..len]) {
                Ok(decoded) => decoded,
                Err(e) => {
                    self.clear();
                    return Err(e);
                }
            },
        };

        self.buf.truncate(decoded);
        self.state = BufferState::Raw(decoded);
        tracing::trace!(encoded_len = len, raw_len = decoded, "binary buffer decoded");
        Ok(decoded)
    }
}

impl Clone for BinaryBuffer {
    fn clone(&self) -> Self {
        let mut buf = Vec::with_capacity(self.capacity);
        buf.extend_from_slice(&self.buf);
        Self {
            buf,
            capacity: self.capacity,
            state: self.state,
            config: self.config.clone(),
        }
    }
}
