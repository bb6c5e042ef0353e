//! Rotating example prompt shown in the empty input box

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct PlaceholderCycle {
    hints: Vec<String>,
    interval: Duration,
    index: usize,
    last_rotated: Instant,
}

impl PlaceholderCycle {
    pub fn new(hints: Vec<String>, interval: Duration) -> Self {
        Self {
            hints,
            interval,
            index: 0,
            last_rotated: Instant::now(),
        }
    }

    pub fn current(&self) -> &str {
        self.hints.get(self.index).map(String::as_str).unwrap_or("")
    }

    /// Advance when the interval has elapsed. Returns true on rotation.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.hints.len() < 2 || self.interval.is_zero() {
            return false;
        }
        if now.saturating_duration_since(self.last_rotated) < self.interval {
            return false;
        }
        self.index = (self.index + 1) % self.hints.len();
        self.last_rotated = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotates_after_interval() {
        let mut cycle = PlaceholderCycle::new(
            vec!["a".into(), "b".into()],
            Duration::from_millis(3000),
        );
        let start = Instant::now();

        assert!(!cycle.tick(start + Duration::from_millis(1000)));
        assert_eq!(cycle.current(), "a");
        assert!(cycle.tick(start + Duration::from_millis(3100)));
        assert_eq!(cycle.current(), "b");
        assert!(cycle.tick(start + Duration::from_millis(6200)));
        assert_eq!(cycle.current(), "a");
    }

    #[test]
    fn test_single_hint_never_rotates() {
        let mut cycle = PlaceholderCycle::new(vec!["only".into()], Duration::from_millis(1));
        assert!(!cycle.tick(Instant::now() + Duration::from_secs(5)));
        assert_eq!(cycle.current(), "only");
        assert_eq!(PlaceholderCycle::new(vec![], Duration::ZERO).current(), "");
    }
}
