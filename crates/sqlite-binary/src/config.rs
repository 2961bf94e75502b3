//! Binary buffer configuration.

/// How a [`BinaryBuffer`](crate::BinaryBuffer) decodes its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum DecodePolicy {
    /// Validate the whole token before touching the buffer.
    ///
    /// A malformed token leaves the buffer holding the token unchanged.
    #[default]
    Validate,
    /// Decode in a single pass, writing over the token as it is read.
    ///
    /// A malformed token is only noticed part-way through, after some of
    /// the buffer has been overwritten; the buffer is then cleared.
    InPlace,
}

/// Configuration for a [`BinaryBuffer`](crate::BinaryBuffer).
#[derive(Debug, Clone)]
pub struct BinaryConfig {
    /// Decoding strategy (default: [`DecodePolicy::Validate`]).
    pub decode_policy: DecodePolicy,
    /// Largest allocation in bytes the buffer may make (default: `isize::MAX`).
    pub max_capacity: usize,
}

impl Default for BinaryConfig {
    fn default() -> Self {
        Self {
            decode_policy: DecodePolicy::default(),
            max_capacity: isize::MAX as usize,
        }
    }
}

impl BinaryConfig {
    /// Create a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the decoding strategy.
    #[must_use]
    pub fn decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.decode_policy = policy;
        self
    }

    /// Cap the size of any single allocation.
    ///
    /// Payloads whose worst-case encoding exceeds the cap are refused with
    /// an allocation failure.
    #[must_use]
    pub fn max_capacity(mut self, bytes: usize) -> Self {
        self.max_capacity = bytes;
        self
    }
}
