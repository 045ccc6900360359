//! Exponential backoff between upstream attempts.

use std::time::Duration;

/// Delay before retry number `attempt` (1-indexed): `base * 2^(attempt-1)`,
/// capped at `max_ms`. Deterministic so retry timing is predictable.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential);

    Duration::from_millis(delay_ms.min(max_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_from_base() {
        assert_eq!(calculate_backoff(1, 1000, 30_000), Duration::from_secs(1));
        assert_eq!(calculate_backoff(2, 1000, 30_000), Duration::from_secs(2));
        assert_eq!(calculate_backoff(3, 1000, 30_000), Duration::from_secs(4));
    }

    #[test]
    fn caps_at_max() {
        assert_eq!(calculate_backoff(10, 1000, 30_000), Duration::from_secs(30));
        // No overflow even at absurd attempt counts.
        assert_eq!(calculate_backoff(u32::MAX, 1000, 30_000), Duration::from_secs(30));
    }

    #[test]
    fn zero_attempt_is_immediate() {
        assert_eq!(calculate_backoff(0, 1000, 30_000), Duration::ZERO);
    }
}
