use chrono::{Datelike, NaiveDate};

use crate::model::Event;

pub type LoadError = Box<dyn std::error::Error + Send + Sync>;

/// Host-side source of events, fetched one period at a time.
pub trait PeriodLoader<T> {
    /// Monotonic mapping from a day to a period index. Days whose indices
    /// share an integral part belong to the same period.
    fn period_of(&self, day: NaiveDate) -> f64;

    /// Events for one period. Ids are not deduplicated by the cache.
    fn load(&mut self, period: i64) -> Result<Vec<Event<T>>, LoadError>;
}

/// A loader built from two closures.
pub struct FnLoader<P, L> {
    period_of: P,
    load: L,
}

impl<P, L> FnLoader<P, L> {
    pub fn new(period_of: P, load: L) -> Self {
        Self { period_of, load }
    }
}

impl<T, P, L> PeriodLoader<T> for FnLoader<P, L>
where
    P: Fn(NaiveDate) -> f64,
    L: FnMut(i64) -> Result<Vec<Event<T>>, LoadError>,
{
    fn period_of(&self, day: NaiveDate) -> f64 {
        (self.period_of)(day)
    }

    fn load(&mut self, period: i64) -> Result<Vec<Event<T>>, LoadError> {
        (self.load)(period)
    }
}

/// Monthly periods: `year * 12 + month0`, plus the day's position inside
/// the month as a fraction below 1.
pub fn month_period(day: NaiveDate) -> f64 {
    day.year() as f64 * 12.0 + day.month0() as f64 + day.day0() as f64 / 31.0
}

/// First day of the month a `month_period` index points at.
pub fn month_start(period: i64) -> Option<NaiveDate> {
    let year = i32::try_from(period.div_euclid(12)).ok()?;
    let month0 = period.rem_euclid(12) as u32;
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_period_shares_integral_part_within_month() {
        let first = month_period(date(2024, 1, 1));
        let last = month_period(date(2024, 1, 31));
        assert_eq!(first, 2024.0 * 12.0);
        assert_eq!(first.floor(), last.floor());
        assert!(last > first);
        assert_eq!(month_period(date(2024, 2, 1)).floor(), first + 1.0);
    }

    #[test]
    fn month_period_is_monotonic_across_year_end() {
        let dec = month_period(date(2023, 12, 31));
        let jan = month_period(date(2024, 1, 1));
        assert!(dec < jan);
        assert_eq!(jan.floor() - dec.floor(), 1.0);
    }

    #[test]
    fn month_start_inverts_month_period() {
        let p = month_period(date(2024, 7, 19)).floor() as i64;
        assert_eq!(month_start(p), Some(date(2024, 7, 1)));
        assert_eq!(month_start(p - 7), Some(date(2023, 12, 1)));
    }

    #[test]
    fn fn_loader_forwards_calls() {
        let mut calls = Vec::new();
        let mut loader = FnLoader::new(month_period, |p: i64| -> Result<Vec<Event<()>>, LoadError> {
            calls.push(p);
            Ok(Vec::new())
        });
        assert_eq!(PeriodLoader::<()>::period_of(&loader, date(2024, 1, 1)), 2024.0 * 12.0);
        assert!(PeriodLoader::<()>::load(&mut loader, 5).unwrap().is_empty());
        drop(loader);
        assert_eq!(calls, vec![5]);
    }
}
