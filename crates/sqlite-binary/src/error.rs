//! Binary encoding error types.

use std::fmt;

use thiserror::Error;

/// Errors that can occur while encoding, decoding or buffering binary data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BinaryError {
    /// A buffer of the required capacity could not be obtained.
    #[error("cannot allocate memory: {requested} bytes requested")]
    AllocationFailure {
        /// Capacity in bytes that was requested.
        requested: usize,
    },

    /// The input does not follow the encoded-token grammar.
    #[error("cannot decode binary: {reason} at byte {position}")]
    MalformedEncoding {
        /// Byte index into the token where decoding stopped.
        position: usize,
        /// What was wrong with the token.
        reason: MalformedReason,
    },
}

impl BinaryError {
    /// Check if this error is an allocation failure.
    #[must_use]
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, Self::AllocationFailure { .. })
    }

    /// Check if this error is a malformed token.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedEncoding { .. })
    }

    pub(crate) fn malformed(position: usize, reason: MalformedReason) -> Self {
        Self::MalformedEncoding { position, reason }
    }
}

/// Reason a token was rejected by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum MalformedReason {
    /// The token has no offset byte.
    EmptyToken,
    /// The leading offset byte is not a legal offset.
    InvalidOffset(u8),
    /// An escape byte was followed by something other than 1, 2 or 3.
    InvalidEscape(u8),
    /// An escape byte was the last byte before the terminator.
    TruncatedEscape,
    /// A bare quote byte appeared in the payload.
    UnescapedQuote,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyToken => write!(f, "empty token"),
            Self::InvalidOffset(b) => write!(f, "invalid offset 0x{b:02x}"),
            Self::InvalidEscape(b) => write!(f, "invalid escape 0x01 0x{b:02x}"),
            Self::TruncatedEscape => write!(f, "truncated escape sequence"),
            Self::UnescapedQuote => write!(f, "unescaped quote"),
        }
    }
}
