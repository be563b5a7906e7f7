//! Deterministic calendar arithmetic.
//!
//! Every function here takes "now" as an explicit parameter rather than
//! reading the wall clock, so the whole engine stays replayable from a log
//! of calls. Unlike the teacher's `Timestamp`, which carries nanosecond
//! precision for on-chain block times, this engine only ever needs
//! whole-second Unix timestamps, so the newtype is kept deliberately thin.

use chrono::{DateTime, Datelike, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

use crate::error::VaultError;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Seconds since the Unix epoch, UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub struct UnixTimestamp(i64);

impl UnixTimestamp {
    pub const fn from_seconds(seconds: i64) -> Self {
        UnixTimestamp(seconds)
    }

    pub const fn seconds(self) -> i64 {
        self.0
    }

    fn to_datetime(self) -> Result<DateTime<Utc>, VaultError> {
        Utc.timestamp_opt(self.0, 0)
            .single()
            .ok_or(VaultError::InvalidArgument)
    }

    /// The Friday 08:00 UTC that is at least four days beyond `self`, used
    /// as the canonical weekly expiry/settlement instant. This week's
    /// Friday only qualifies if it is itself ≥4 days out; otherwise the
    /// following week's Friday is used.
    pub fn next_friday(self) -> Result<Self, VaultError> {
        let dt = self.to_datetime()?;
        let today_friday = Self::friday_of(dt)?;
        let min_gap = self.checked_add_seconds(4 * SECONDS_PER_DAY)?;
        if today_friday >= min_gap {
            Ok(today_friday)
        } else {
            Self::friday_of(dt + chrono::Duration::days(7))
        }
    }

    /// The Friday 08:00 UTC of the week containing `self`.
    pub fn friday(self) -> Result<Self, VaultError> {
        let dt = self.to_datetime()?;
        Self::friday_of(dt)
    }

    fn friday_of(dt: DateTime<Utc>) -> Result<Self, VaultError> {
        let days_until_friday = (Weekday::Fri.num_days_from_monday() as i64
            - dt.weekday().num_days_from_monday() as i64
            + 7)
            % 7;
        let friday_date = dt.date_naive() + chrono::Duration::days(days_until_friday);
        let friday_dt = friday_date
            .and_hms_opt(8, 0, 0)
            .ok_or(VaultError::InvalidArgument)?
            .and_utc();
        Ok(UnixTimestamp(friday_dt.timestamp()))
    }

    pub fn checked_add_seconds(self, seconds: i64) -> Result<Self, VaultError> {
        self.0
            .checked_add(seconds)
            .map(UnixTimestamp)
            .ok_or(VaultError::Overflow)
    }

    pub fn checked_sub(self, other: Self) -> Result<i64, VaultError> {
        self.0.checked_sub(other.0).ok_or(VaultError::Overflow)
    }
}

impl Add<i64> for UnixTimestamp {
    type Output = UnixTimestamp;
    fn add(self, rhs: i64) -> Self::Output {
        UnixTimestamp(self.0 + rhs)
    }
}

impl Sub<i64> for UnixTimestamp {
    type Output = UnixTimestamp;
    fn sub(self, rhs: i64) -> Self::Output {
        UnixTimestamp(self.0 - rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friday_of_a_friday_is_itself() {
        // 2024-01-05 is a Friday.
        let friday_noon = UnixTimestamp::from_seconds(1_704_452_400);
        let friday = friday_noon.friday().unwrap();
        assert_eq!(friday.seconds(), 1_704_441_600);
    }

    #[test]
    fn next_friday_from_saturday_rolls_to_following_week() {
        // 2024-01-06 is a Saturday.
        let saturday = UnixTimestamp::from_seconds(1_704_499_200);
        let next = saturday.next_friday().unwrap();
        // 2024-01-12 08:00 UTC
        assert_eq!(next.seconds(), 1_705_046_400);
    }

    #[test]
    fn next_friday_within_four_days_rolls_to_following_week() {
        // 2024-01-05 07:00 UTC, an hour before that Friday's 08:00 cutoff:
        // this week's Friday is only an hour away, far short of the 4-day
        // minimum, so the following Friday is used instead.
        let early_friday = UnixTimestamp::from_seconds(1_704_440_400);
        let next = early_friday.next_friday().unwrap();
        assert_eq!(next.seconds(), 1_704_441_600 + SECONDS_PER_DAY * 7);
    }

    #[test]
    fn next_friday_from_tuesday_less_than_four_days_out_rolls_forward() {
        // 2024-01-02 00:00 UTC is a Tuesday; that week's Friday 08:00 is
        // only 3 days 8 hours away, so the following Friday is used.
        let tuesday = UnixTimestamp::from_seconds(1_704_153_600);
        let next = tuesday.next_friday().unwrap();
        assert_eq!(next.seconds(), 1_704_441_600 + SECONDS_PER_DAY * 7);
    }

    #[test]
    fn next_friday_from_monday_four_days_out_keeps_this_week() {
        // 2024-01-01 00:00 UTC is a Monday; that week's Friday 08:00 is
        // exactly 4 days 8 hours away, clearing the minimum gap.
        let monday = UnixTimestamp::from_seconds(1_704_067_200);
        let next = monday.next_friday().unwrap();
        assert_eq!(next.seconds(), 1_704_441_600);
    }

    #[test]
    fn next_friday_after_cutoff_same_day_rolls_forward() {
        let late_friday = UnixTimestamp::from_seconds(1_704_441_600 + 1);
        let next = late_friday.next_friday().unwrap();
        assert_eq!(next.seconds(), 1_704_441_600 + SECONDS_PER_DAY * 7);
    }
}
