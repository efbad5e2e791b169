use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};

use crate::model::*;

// ── Day boundaries ────────────────────────────────────────────────

/// Resolves instants to calendar days under a fixed UTC offset. Every day is
/// exactly `DAY_MS` long.
#[derive(Debug, Clone, Copy)]
pub struct DayClock {
    offset: FixedOffset,
}

impl Default for DayClock {
    fn default() -> Self {
        Self::utc()
    }
}

impl DayClock {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// `None` when the offset is a day or more away from UTC.
    pub fn with_offset_secs(secs: i32) -> Option<Self> {
        FixedOffset::east_opt(secs).map(|offset| Self { offset })
    }

    fn offset_ms(&self) -> Ms {
        self.offset.local_minus_utc() as Ms * 1000
    }

    /// Calendar day containing instant `t`. `None` outside chrono's range.
    pub fn day_of(&self, t: Ms) -> Option<NaiveDate> {
        DateTime::from_timestamp_millis(t).map(|utc| utc.with_timezone(&self.offset).date_naive())
    }

    /// Instant of local midnight opening `day`.
    pub fn day_start(&self, day: NaiveDate) -> Ms {
        day.and_time(NaiveTime::MIN).and_utc().timestamp_millis() - self.offset_ms()
    }

    pub fn day_span(&self, day: NaiveDate) -> Span {
        let start = self.day_start(day);
        Span::new(start, start + DAY_MS)
    }

    /// First and last calendar day a valid span touches. An end exactly at
    /// midnight belongs to the previous day.
    pub fn day_range(&self, span: &Span) -> Option<(NaiveDate, NaiveDate)> {
        debug_assert!(span.is_valid());
        Some((self.day_of(span.start)?, self.day_of(span.end - 1)?))
    }

    /// Number of calendar days a valid span touches.
    pub fn day_count(&self, span: &Span) -> Option<i64> {
        let (first, last) = self.day_range(span)?;
        Some((last - first).num_days() + 1)
    }
}

// ── Segmenter ─────────────────────────────────────────────────────

/// One calendar day's share of an event span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySlice {
    pub day: NaiveDate,
    pub span: Span,
}

/// Split a valid span into per-day slices, ordered by day. The slices are
/// contiguous and their union is `span`. A single-day span comes back as is.
pub fn split(span: Span, clock: &DayClock) -> Option<Vec<DaySlice>> {
    let (first, last) = clock.day_range(&span)?;
    if first == last {
        return Some(vec![DaySlice { day: first, span }]);
    }

    let days = ((last - first).num_days() + 1) as usize;
    let mut slices = Vec::with_capacity(days);
    for day in first.iter_days().take(days) {
        let bounds = clock.day_span(day);
        slices.push(DaySlice {
            day,
            span: Span::new(bounds.start.max(span.start), bounds.end.min(span.end)),
        });
    }
    Some(slices)
}

/// Vertical placement of a slice inside its day.
pub fn vertical_range(slice: &DaySlice, category: Category, clock: &DayClock) -> VerticalRange {
    match category {
        Category::AllDay => VerticalRange::AllDayBand,
        Category::Timed => {
            let midnight = clock.day_start(slice.day);
            VerticalRange::Timed {
                start_minute: (slice.span.start - midnight) as f64 / MINUTE_MS as f64,
                end_minute: (slice.span.end - midnight) as f64 / MINUTE_MS as f64,
            }
        }
    }
}
