mod cluster;
mod error;
mod segment;
mod track;

pub use cluster::build_clusters;
pub use error::EngineError;
pub use segment::{split, vertical_range, DayClock, DaySlice};
pub use track::{assign_tracks, peak_overlap};

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::limits::*;
use crate::model::*;

// ── Diagnostics ───────────────────────────────────────────────────

/// A non-fatal rejection of one event. The rest of the batch is laid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    /// `end <= start`.
    InvalidSpan { event_id: EventId, span: Span },
    /// An instant lies outside the supported calendar range.
    OutOfRange { event_id: EventId, span: Span },
    /// The event touches more calendar days than `max_event_days`.
    SpanTooWide { event_id: EventId, days: i64 },
}

impl Diagnostic {
    pub fn event_id(&self) -> EventId {
        match self {
            Diagnostic::InvalidSpan { event_id, .. }
            | Diagnostic::OutOfRange { event_id, .. }
            | Diagnostic::SpanTooWide { event_id, .. } => *event_id,
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Diagnostic::InvalidSpan { .. } => "invalid_span",
            Diagnostic::OutOfRange { .. } => "out_of_range",
            Diagnostic::SpanTooWide { .. } => "span_too_wide",
        }
    }
}

/// Check an event before segmentation.
fn validate<T>(event: &Event<T>, clock: &DayClock, max_days: u32) -> Result<(), Diagnostic> {
    let span = event.span;
    if !span.is_valid() {
        return Err(Diagnostic::InvalidSpan {
            event_id: event.id,
            span,
        });
    }
    if span.start < MIN_VALID_TIMESTAMP_MS || span.end > MAX_VALID_TIMESTAMP_MS {
        return Err(Diagnostic::OutOfRange {
            event_id: event.id,
            span,
        });
    }
    let days = clock.day_count(&span).ok_or(Diagnostic::OutOfRange {
        event_id: event.id,
        span,
    })?;
    if days > max_days as i64 {
        return Err(Diagnostic::SpanTooWide {
            event_id: event.id,
            days,
        });
    }
    Ok(())
}

// ── Layout ────────────────────────────────────────────────────────

/// Positioned segments for a set of events, sorted by day, then category
/// (all-day first), then placement order.
#[derive(Debug)]
pub struct Layout<T> {
    events: Vec<Arc<Event<T>>>,
    segments: Vec<Segment>,
    diagnostics: Vec<Diagnostic>,
}

impl<T> Default for Layout<T> {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            segments: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

impl<T> Layout<T> {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The event a segment was cut from. Segments kept from an earlier
    /// layout are resolved by id; `None` once their event is gone.
    pub fn event(&self, segment: &Segment) -> Option<&Event<T>> {
        self.events
            .get(segment.event_ix)
            .filter(|e| e.id == segment.event_id)
            .or_else(|| self.events.iter().find(|e| e.id == segment.event_id))
            .map(|e| &**e)
    }

    pub fn events(&self) -> &[Arc<Event<T>>] {
        &self.events
    }

    /// Every segment on `day`, all-day ones first.
    pub fn segments_for(&self, day: NaiveDate) -> &[Segment] {
        let lo = self.segments.partition_point(|s| s.day < day);
        let hi = self.segments.partition_point(|s| s.day <= day);
        &self.segments[lo..hi]
    }

    /// Segments on `day_count` consecutive days starting at `first`.
    pub fn visible(&self, first: NaiveDate, day_count: u32) -> &[Segment] {
        if day_count == 0 {
            return &[];
        }
        let last = first
            .checked_add_days(Days::new(u64::from(day_count - 1)))
            .unwrap_or(NaiveDate::MAX);
        let lo = self.segments.partition_point(|s| s.day < first);
        let hi = self.segments.partition_point(|s| s.day <= last);
        &self.segments[lo..hi]
    }

    pub fn all_day_for(&self, day: NaiveDate) -> &[Segment] {
        let day_segments = self.segments_for(day);
        let split = day_segments.partition_point(|s| s.category == Category::AllDay);
        &day_segments[..split]
    }

    pub fn timed_for(&self, day: NaiveDate) -> &[Segment] {
        let day_segments = self.segments_for(day);
        let split = day_segments.partition_point(|s| s.category == Category::AllDay);
        &day_segments[split..]
    }

    /// Timed segment under `minute` of `day` at horizontal fraction `x`
    /// (0..1 across the day column). Plain containment, last drawn wins.
    pub fn hit_test(&self, day: NaiveDate, minute: f64, x: f64) -> Option<&Segment> {
        self.timed_for(day).iter().rev().find(|s| {
            let VerticalRange::Timed {
                start_minute,
                end_minute,
            } = s.vertical
            else {
                return false;
            };
            let left = s.left();
            start_minute <= minute && minute < end_minute && left <= x && x < left + s.width()
        })
    }

    /// All-day segment at horizontal fraction `x` of `day`'s header band.
    pub fn hit_test_all_day(&self, day: NaiveDate, x: f64) -> Option<&Segment> {
        self.all_day_for(day).iter().rev().find(|s| {
            let left = s.left();
            left <= x && x < left + s.width()
        })
    }
}

/// Run segmentation, clustering and track assignment over `events`.
///
/// Invalid events are skipped and reported in `diagnostics`. Valid events
/// are ordered by ascending (start, end) before segmentation, ties keeping
/// the input order.
///
/// An out-of-range `utc_offset_secs` falls back to UTC with a warning;
/// `EngineConfig::validate` rejects such configs up front.
pub fn layout<T>(events: &[Arc<Event<T>>], config: &EngineConfig) -> Layout<T> {
    let clock = DayClock::with_offset_secs(config.utc_offset_secs).unwrap_or_else(|| {
        warn!(utc_offset_secs = config.utc_offset_secs, "invalid UTC offset, laying out in UTC");
        DayClock::utc()
    });
    let mut diagnostics = Vec::new();

    let mut accepted: Vec<usize> = Vec::with_capacity(events.len());
    for (ix, event) in events.iter().enumerate() {
        match validate(event, &clock, config.max_event_days) {
            Ok(()) => accepted.push(ix),
            Err(diag) => {
                warn!(event_id = %event.id, reason = diag.reason(), "rejected event before layout");
                metrics::counter!(crate::observability::EVENTS_REJECTED_TOTAL, "reason" => diag.reason())
                    .increment(1);
                diagnostics.push(diag);
            }
        }
    }
    accepted.sort_by_key(|&ix| (events[ix].span.start, events[ix].span.end));

    // Segment and bucket by (day, category); buckets keep placement order.
    let mut buckets: BTreeMap<(NaiveDate, Category), Vec<Segment>> = BTreeMap::new();
    for ix in accepted {
        let event = &events[ix];
        let category = event.category();
        let Some(slices) = split(event.span, &clock) else {
            continue;
        };
        for slice in slices {
            buckets.entry((slice.day, category)).or_default().push(Segment {
                event_id: event.id,
                event_ix: ix,
                day: slice.day,
                span: slice.span,
                category,
                vertical: vertical_range(&slice, category, &clock),
                track: Track::default(),
            });
        }
    }

    let mut segments = Vec::new();
    for ((day, _), mut bucket) in buckets {
        let spans: Vec<Span> = bucket.iter().map(|s| s.span).collect();
        let clusters = build_clusters(&spans, config.cluster_strategy);
        for members in &clusters {
            let tracks = assign_tracks(&spans, members);
            debug_assert_eq!(
                tracks.first().map_or(0, |t| t.count),
                peak_overlap(&members.iter().map(|&m| spans[m]).collect::<Vec<_>>()),
                "greedy placement must match peak overlap on {day}"
            );
            for (&m, track) in members.iter().zip(tracks) {
                bucket[m].track = track;
            }
        }
        segments.extend(bucket);
    }

    debug!(
        events = events.len(),
        segments = segments.len(),
        rejected = diagnostics.len(),
        "layout complete"
    );
    Layout {
        events: events.to_vec(),
        segments,
        diagnostics,
    }
}
