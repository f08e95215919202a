//! Zero-value to `NULL` conversion for bound parameters.
//!
//! `Option<T>` binds as `NULL` when it is `None`, so converting a "zero"
//! input (empty string, non-positive number, zero timestamp) to `None` before
//! binding stores `NULL` instead of the zero value.

use chrono::{DateTime, Datelike, NaiveDateTime, NaiveTime, Timelike, Utc};

/// Convert a zero value to `None`.
pub trait IntoNullable: Sized {
    fn into_nullable(self) -> Option<Self>;
}

impl IntoNullable for String {
    fn into_nullable(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }
}

impl IntoNullable for &str {
    fn into_nullable(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }
}

/// Non-positive ids and amounts are treated as unset.
impl IntoNullable for i64 {
    fn into_nullable(self) -> Option<Self> {
        (self > 0).then_some(self)
    }
}

impl IntoNullable for f64 {
    fn into_nullable(self) -> Option<Self> {
        (self > 0.0).then_some(self)
    }
}

/// `0001-01-01 00:00:00` is the zero timestamp.
impl IntoNullable for NaiveDateTime {
    fn into_nullable(self) -> Option<Self> {
        let is_zero = self.year() == 1
            && self.ordinal() == 1
            && self.num_seconds_from_midnight() == 0
            && self.nanosecond() == 0;
        (!is_zero).then_some(self)
    }
}

impl IntoNullable for DateTime<Utc> {
    fn into_nullable(self) -> Option<Self> {
        self.naive_utc().into_nullable().map(|_| self)
    }
}

/// Parse `HH:MM:SS`, or `None` when `s` is not a valid time of day.
pub fn parse_time_to_null(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn strings() {
        assert_eq!(String::new().into_nullable(), None);
        assert_eq!("x".to_string().into_nullable(), Some("x".to_string()));
        assert_eq!("".into_nullable(), None);
        assert_eq!("x".into_nullable(), Some("x"));
    }

    #[test]
    fn numbers() {
        assert_eq!(0i64.into_nullable(), None);
        assert_eq!((-3i64).into_nullable(), None);
        assert_eq!(7i64.into_nullable(), Some(7));
        assert_eq!(0.0f64.into_nullable(), None);
        assert_eq!(1.5f64.into_nullable(), Some(1.5));
    }

    #[test]
    fn timestamps() {
        let zero = NaiveDate::from_ymd_opt(1, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(zero.into_nullable(), None);
        assert_eq!(zero.and_utc().into_nullable(), None);

        let ts = NaiveDate::from_ymd_opt(2021, 4, 28)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(ts.into_nullable(), Some(ts));
        assert_eq!(ts.and_utc().into_nullable(), Some(ts.and_utc()));
    }

    #[test]
    fn times() {
        assert_eq!(
            parse_time_to_null("08:30:00"),
            NaiveTime::from_hms_opt(8, 30, 0)
        );
        assert_eq!(parse_time_to_null("00:00:00"), NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(parse_time_to_null("25:00:00"), None);
        assert_eq!(parse_time_to_null(""), None);
    }
}
