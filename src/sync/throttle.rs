//! Block-height throttle: refetch only after enough blocks went by.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightThrottle {
    threshold: u64,
}

impl HeightThrottle {
    pub fn new(threshold: u64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// A height below the cursor (chain switch, stale header) counts as no progress.
    pub fn is_due(&self, height: u64, last_update_height: u64, force: bool) -> bool {
        force || height.saturating_sub(last_update_height) >= self.threshold
    }

    /// Like [`is_due`](Self::is_due) but advances the cursor when the run goes ahead.
    pub fn admit(&self, cursor: &mut u64, height: u64, force: bool) -> bool {
        if self.is_due(height, *cursor, force) {
            *cursor = height;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_is_skipped() {
        let throttle = HeightThrottle::new(5);
        let mut cursor = 100;
        assert!(!throttle.admit(&mut cursor, 104, false));
        assert_eq!(cursor, 100);
        assert!(throttle.admit(&mut cursor, 105, false));
        assert_eq!(cursor, 105);
    }

    #[test]
    fn force_overrides() {
        let throttle = HeightThrottle::new(20);
        let mut cursor = 43;
        assert!(throttle.admit(&mut cursor, 44, true));
        assert_eq!(cursor, 44);
    }

    #[test]
    fn rewards_throttle_every_twenty_blocks() {
        let throttle = HeightThrottle::new(20);
        let mut cursor = 0;
        assert!(throttle.admit(&mut cursor, 43, false));
        assert_eq!(cursor, 43);
        assert!(!throttle.admit(&mut cursor, 44, false));
    }

    #[test]
    fn going_backwards_is_not_progress() {
        let throttle = HeightThrottle::new(5);
        assert!(!throttle.is_due(10, 500, false));
    }
}
