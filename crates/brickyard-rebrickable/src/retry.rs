//! Backoff policy for transient remote failures.

use std::time::Duration;

use rand::Rng as _;

/// How often and how patiently a request is retried.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
  /// Max attempts per request, including the first try.
  pub max_attempts:     u32,
  /// Backoff after the first transient failure; doubled per attempt.
  pub base_delay:       Duration,
  /// Ceiling for any computed backoff. A server-supplied wait is not capped.
  pub max_delay:        Duration,
  /// Jitter applied to computed backoff (0.0..=1.0).
  pub jitter_pct:       f64,
  /// Wait after a rate-limit response that carries no `Retry-After`.
  pub rate_limit_delay: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts:     4,
      base_delay:       Duration::from_secs(1),
      max_delay:        Duration::from_secs(16),
      jitter_pct:       0.2,
      rate_limit_delay: Duration::from_secs(5),
    }
  }
}

impl RetryPolicy {
  /// Delay before retrying after failed attempt number `attempt` (1-based).
  ///
  /// An explicit `retry_after` replaces the exponential schedule and is used
  /// as given: retrying before the server allows it only earns another 429.
  pub fn backoff_for_attempt(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
    if let Some(explicit) = retry_after {
      return explicit;
    }
    let exp = 2u32.saturating_pow(attempt.saturating_sub(1));
    let base = self.base_delay.checked_mul(exp).unwrap_or(self.max_delay);
    apply_jitter(base.min(self.max_delay), self.jitter_pct)
  }
}

/// Spread `duration` by up to `±jitter_pct`, never below one millisecond
/// unless the input is zero.
pub fn apply_jitter(duration: Duration, jitter_pct: f64) -> Duration {
  if jitter_pct <= 0.0 || duration.is_zero() {
    return duration;
  }
  let delta = rand::thread_rng().gen_range(-1.0..=1.0) * jitter_pct.min(1.0);
  let base_ms = duration.as_millis() as f64;
  let jittered = (base_ms * (1.0 + delta)).max(1.0);
  Duration::from_millis(jittered.round() as u64)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn backoff_doubles_and_caps() {
    let p = RetryPolicy { jitter_pct: 0.0, ..RetryPolicy::default() };
    assert_eq!(p.backoff_for_attempt(1, None), Duration::from_secs(1));
    assert_eq!(p.backoff_for_attempt(2, None), Duration::from_secs(2));
    assert_eq!(p.backoff_for_attempt(3, None), Duration::from_secs(4));
    assert_eq!(p.backoff_for_attempt(9, None), Duration::from_secs(16));
  }

  #[test]
  fn retry_after_is_used_as_given() {
    let p = RetryPolicy::default();
    assert_eq!(
      p.backoff_for_attempt(1, Some(Duration::from_secs(3))),
      Duration::from_secs(3)
    );
    assert_eq!(
      p.backoff_for_attempt(1, Some(Duration::from_secs(60))),
      Duration::from_secs(60)
    );
  }

  #[test]
  fn jitter_stays_in_band() {
    let base = Duration::from_millis(1000);
    for _ in 0..100 {
      let j = apply_jitter(base, 0.2).as_millis();
      assert!((800..=1200).contains(&j), "{j}");
    }
  }
}
