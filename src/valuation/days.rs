//! Day counting between a deposit date and a valuation date

use chrono::{Datelike, NaiveDate};

/// Whole calendar days between two dates, regardless of order
pub fn calendar_days_between(start: NaiveDate, end: NaiveDate) -> u32 {
    (end - start).num_days().unsigned_abs() as u32
}

/// Count of Monday-Friday dates in `[start, end]`, both ends included.
/// Zero when `end < start`.
///
/// Whole weeks contribute five days each; only the trailing partial week
/// needs its weekdays inspected, so this is O(1) in the span length.
pub fn business_days_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }

    let total = (end - start).num_days() as u32 + 1;
    let full_weeks = total / 7;
    let remainder = total % 7;
    let first_weekday = start.weekday().num_days_from_monday();

    let trailing = (0..remainder)
        .filter(|k| (first_weekday + k) % 7 < 5)
        .count() as u32;

    full_weeks * 5 + trailing
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn business_days_by_walking(start: NaiveDate, end: NaiveDate) -> u32 {
        let mut count = 0;
        let mut current = start;
        while current <= end {
            if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                count += 1;
            }
            current += Duration::days(1);
        }
        count
    }

    #[test]
    fn test_calendar_days() {
        assert_eq!(calendar_days_between(date(2024, 1, 1), date(2024, 1, 1)), 0);
        assert_eq!(calendar_days_between(date(2024, 1, 1), date(2024, 12, 31)), 365);
        // Absolute difference
        assert_eq!(calendar_days_between(date(2024, 1, 11), date(2024, 1, 1)), 10);
    }

    #[test]
    fn test_business_days_known_spans() {
        // 2024-01-01 is a Monday
        assert_eq!(business_days_between(date(2024, 1, 1), date(2024, 1, 1)), 1);
        assert_eq!(business_days_between(date(2024, 1, 1), date(2024, 1, 7)), 5);
        assert_eq!(business_days_between(date(2024, 1, 6), date(2024, 1, 7)), 0);
        assert_eq!(business_days_between(date(2024, 1, 1), date(2024, 12, 31)), 262);
        assert_eq!(business_days_between(date(2024, 1, 2), date(2024, 1, 1)), 0);
    }

    #[test]
    fn test_closed_form_matches_walk() {
        let anchor = date(2023, 12, 25);
        for offset in 0..14 {
            let start = anchor + Duration::days(offset);
            for span in 0..400 {
                let end = start + Duration::days(span);
                assert_eq!(
                    business_days_between(start, end),
                    business_days_by_walking(start, end),
                    "start {} end {}",
                    start,
                    end
                );
            }
        }
    }
}
