//! Deadline window policy
//!
//! Every transfer carries an absolute deadline after which the sender may
//! reclaim. The requested duration must fall inside an admin-bounded
//! `[min, max]` window.

use crate::core_types::{DurationMs, TimestampMs};
use crate::error::EscrowError;

/// Permitted deadline-duration window.
///
/// # Invariants:
/// - `0 < min <= max`
#[derive(Debug, Clone, Copy)]
pub struct DeadlinePolicy {
    min: DurationMs,
    max: DurationMs,
}

impl DeadlinePolicy {
    /// Create a policy with the given window.
    ///
    /// # Errors
    /// - `InvalidRange` if `min == 0 || max < min`
    pub fn new(min: DurationMs, max: DurationMs) -> Result<Self, EscrowError> {
        if min == 0 || max < min {
            return Err(EscrowError::InvalidRange);
        }
        Ok(Self { min, max })
    }

    /// Get the current window (read-only)
    #[inline]
    pub fn range(&self) -> (DurationMs, DurationMs) {
        (self.min, self.max)
    }

    /// Validate a requested duration and resolve the absolute deadline.
    ///
    /// `min > 0` guarantees the returned deadline is strictly after `now`.
    ///
    /// # Errors
    /// - `DeadlineOutOfRange` if `duration < min || duration > max`, or if
    ///   `now + duration` overflows the timestamp space
    pub fn validate(
        &self,
        now: TimestampMs,
        duration: DurationMs,
    ) -> Result<TimestampMs, EscrowError> {
        if duration < self.min || duration > self.max {
            return Err(EscrowError::DeadlineOutOfRange);
        }
        now.checked_add(duration)
            .ok_or(EscrowError::DeadlineOutOfRange)
    }

    /// Replace the window.
    ///
    /// Entries created under the old window keep their deadlines; the new
    /// window only gates future initiations.
    ///
    /// # Errors
    /// - `InvalidRange` if `min == 0 || max < min`
    pub fn set_range(&mut self, min: DurationMs, max: DurationMs) -> Result<(), EscrowError> {
        if min == 0 || max < min {
            return Err(EscrowError::InvalidRange);
        }
        self.min = min;
        self.max = max;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: DurationMs = 3_600_000;
    const WEEK: DurationMs = 7 * 24 * 3_600_000;

    #[test]
    fn test_new_rejects_bad_window() {
        assert_eq!(DeadlinePolicy::new(0, WEEK).unwrap_err(), EscrowError::InvalidRange);
        assert_eq!(DeadlinePolicy::new(WEEK, HOUR).unwrap_err(), EscrowError::InvalidRange);
        assert!(DeadlinePolicy::new(HOUR, HOUR).is_ok()); // min == max is a fixed duration
    }

    #[test]
    fn test_validate_inside_window() {
        let policy = DeadlinePolicy::new(HOUR, WEEK).unwrap();
        assert_eq!(policy.validate(1_000, HOUR).unwrap(), 1_000 + HOUR);
        assert_eq!(policy.validate(1_000, WEEK).unwrap(), 1_000 + WEEK);
    }

    #[test]
    fn test_validate_outside_window() {
        let policy = DeadlinePolicy::new(HOUR, WEEK).unwrap();
        assert_eq!(
            policy.validate(1_000, HOUR - 1).unwrap_err(),
            EscrowError::DeadlineOutOfRange
        );
        assert_eq!(
            policy.validate(1_000, WEEK + 1).unwrap_err(),
            EscrowError::DeadlineOutOfRange
        );
    }

    #[test]
    fn test_validate_deadline_strictly_future() {
        let policy = DeadlinePolicy::new(1, WEEK).unwrap();
        let deadline = policy.validate(500, 1).unwrap();
        assert!(deadline > 500);
    }

    #[test]
    fn test_validate_overflow() {
        let policy = DeadlinePolicy::new(HOUR, WEEK).unwrap();
        assert_eq!(
            policy.validate(u64::MAX - 10, HOUR).unwrap_err(),
            EscrowError::DeadlineOutOfRange
        );
    }

    #[test]
    fn test_set_range() {
        let mut policy = DeadlinePolicy::new(HOUR, WEEK).unwrap();
        policy.set_range(2 * HOUR, 2 * WEEK).unwrap();
        assert_eq!(policy.range(), (2 * HOUR, 2 * WEEK));

        assert_eq!(policy.set_range(0, WEEK).unwrap_err(), EscrowError::InvalidRange);
        assert_eq!(policy.set_range(WEEK, HOUR).unwrap_err(), EscrowError::InvalidRange);
        // failed set leaves the window untouched
        assert_eq!(policy.range(), (2 * HOUR, 2 * WEEK));
    }
}
