//! Human-like typing cadence.

use rand::Rng;
use std::time::Duration;

/// Per-character delay drawn uniformly from `[base, 2 * base]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingPacing {
    base: Duration,
}

impl TypingPacing {
    #[must_use]
    pub const fn new(base: Duration) -> Self {
        Self { base }
    }

    /// No delay at all.
    #[must_use]
    pub const fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    #[must_use]
    pub const fn base(&self) -> Duration {
        self.base
    }

    /// Draw the delay before the next character.
    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let base = self.base.as_micros() as u64;
        if base == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(rng.gen_range(base..=base * 2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_delays_stay_in_band() {
        let pacing = TypingPacing::new(Duration::from_millis(50));
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1000 {
            let delay = pacing.next_delay(&mut rng);
            assert!(delay >= Duration::from_millis(50));
            assert!(delay <= Duration::from_millis(100));
        }
    }

    #[test]
    fn test_delays_vary() {
        let pacing = TypingPacing::new(Duration::from_millis(50));
        let mut rng = StdRng::seed_from_u64(11);

        let delays: Vec<_> = (0..20).map(|_| pacing.next_delay(&mut rng)).collect();
        assert!(delays.iter().any(|d| *d != delays[0]));
    }

    #[test]
    fn test_instant_pacing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(TypingPacing::instant().next_delay(&mut rng), Duration::ZERO);
    }
}
