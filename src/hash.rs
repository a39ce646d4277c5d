//! Identity-hash generation for markers.
//!
//! Every registered marker carries a small integer identity used by change
//! detection downstream: a cluster combines the identities of its members
//! into one value, and two clusters with the same combined value are assumed
//! to hold the same markers. The counter is an explicit object owned by
//! whichever scope creates markers, not process-global state.

/// Largest value an identity hash or a combined cluster hash may take.
///
/// Chosen so combined hashes survive a round-trip through an IEEE 754 double
/// on the consuming side (2^53 - 1).
pub const MAX_HASH_CODE: u64 = (1 << 53) - 1;

/// Monotonic identity-hash generator.
///
/// Starts at 1 and never yields 0: a fresh cluster uses 1 as its
/// "no members yet" sentinel, and 0 stays unused so the two cannot be
/// confused by change-detection logic comparing raw values.
///
/// # Example
///
/// ```rust
/// use gridclust::HashCounter;
///
/// let mut counter = HashCounter::new();
/// assert_eq!(counter.next(), 1);
/// assert_eq!(counter.next(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct HashCounter {
    next: u64,
}

impl HashCounter {
    /// Create a counter starting at 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Return the current value and advance the counter.
    ///
    /// The boundary value [`MAX_HASH_CODE`] is itself returned once; the
    /// counter wraps back to 1 afterwards.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u64 {
        let current = self.next;

        if current >= MAX_HASH_CODE {
            self.next = 1;
        } else {
            self.next = current + 1;
        }

        current
    }
}

impl Default for HashCounter {
    fn default() -> Self {
        Self::new()
    }
}
