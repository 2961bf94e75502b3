//! Byte frequency counting.

/// Occurrence count of each of the 256 byte values in a raw sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteHistogram {
    counts: [usize; 256],
}

impl ByteHistogram {
    /// Count every byte of `raw`.
    #[must_use]
    pub fn from_bytes(raw: &[u8]) -> Self {
        let mut counts = [0usize; 256];
        for &b in raw {
            counts[b as usize] += 1;
        }
        Self { counts }
    }

    /// Number of occurrences of `byte`.
    #[must_use]
    pub fn count(&self, byte: u8) -> usize {
        self.counts[byte as usize]
    }

    /// Total number of bytes counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Check if no bytes were counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }
}

impl Default for ByteHistogram {
    fn default() -> Self {
        Self { counts: [0; 256] }
    }
}
