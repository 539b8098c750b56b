//! Leaf expiry countdown.

use chrono::{DateTime, Utc};

use crate::config::MILLIS_PER_DAY;

/// Whole days from `now` until `valid_to`, rounded toward negative infinity.
///
/// One hour past expiry gives `-1`, one hour before expiry gives `0`. The value
/// is not clamped in either direction.
pub fn days_remaining(valid_to: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (valid_to - now).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_one_hour_past_expiry_is_minus_one() {
        assert_eq!(days_remaining(now() - Duration::hours(1), now()), -1);
    }

    #[test]
    fn test_one_hour_before_expiry_is_zero() {
        assert_eq!(days_remaining(now() + Duration::hours(1), now()), 0);
    }

    #[test]
    fn test_exact_day_boundaries() {
        assert_eq!(days_remaining(now(), now()), 0);
        assert_eq!(days_remaining(now() + Duration::days(365), now()), 365);
        assert_eq!(days_remaining(now() - Duration::days(2), now()), -2);
        assert_eq!(
            days_remaining(now() - Duration::days(2) - Duration::milliseconds(1), now()),
            -3
        );
    }

    #[test]
    fn test_long_lived_root_not_clamped() {
        let far = Utc.with_ymd_and_hms(2046, 10, 16, 12, 0, 0).unwrap();
        assert_eq!(days_remaining(far, now()), 7305);
    }
}
