// Reconnect delay that doubles after each failure, up to a cap
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        let base = base.min(max);
        Self {
            base,
            max,
            current: base,
        }
    }

    /// Delay to wait before the next attempt; doubles the one after it.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.base;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(300))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn take_secs(backoff: &mut Backoff, failures: usize) -> Vec<u64> {
        (0..failures).map(|_| backoff.next_delay().as_secs()).collect()
    }

    #[test]
    fn test_doubling_sequence() {
        let mut backoff = Backoff::default();
        assert_eq!(take_secs(&mut backoff, 4), vec![5, 10, 20, 40]);
    }

    #[test]
    fn test_cap_is_honored() {
        let mut backoff = Backoff::default();
        let delays = take_secs(&mut backoff, 8);
        assert_eq!(delays, vec![5, 10, 20, 40, 80, 160, 300, 300]);
        assert!(take_secs(&mut backoff, 20).iter().all(|&d| d == 300));
    }

    #[test]
    fn test_reset_returns_to_base() {
        let mut backoff = Backoff::default();
        take_secs(&mut backoff, 5);
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_secs(5));
    }

    #[test]
    fn test_base_above_max_is_clamped() {
        let mut backoff = Backoff::new(Duration::from_secs(600), Duration::from_secs(300));
        assert_eq!(backoff.next_delay(), Duration::from_secs(300));
    }
}
