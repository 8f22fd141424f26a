/// Tunables for an [`IntervalTree`](crate::IntervalTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    /// Largest relative offset a node may carry before the tree flattens
    /// all deltas back to absolute coordinates.
    pub max_delta: i64,
}

impl TreeConfig {
    pub const DEFAULT_MAX_DELTA: i64 = 1 << 30;

    /// Set the normalization threshold. Values below 1 are raised to 1.
    pub fn max_delta(mut self, max_delta: i64) -> Self {
        self.max_delta = max_delta.max(1);
        self
    }

    #[inline]
    pub(crate) fn delta_overflows(&self, delta: i64) -> bool {
        delta > self.max_delta || delta < -self.max_delta
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_delta: Self::DEFAULT_MAX_DELTA,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_is_symmetric() {
        let config = TreeConfig::default().max_delta(10);
        assert!(!config.delta_overflows(10));
        assert!(!config.delta_overflows(-10));
        assert!(config.delta_overflows(11));
        assert!(config.delta_overflows(-11));
    }

    #[test]
    fn threshold_is_at_least_one() {
        assert_eq!(TreeConfig::default().max_delta(-5).max_delta, 1);
    }
}
