use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds. The only time type.
pub type Ms = i64;

pub type EventId = Ulid;

pub const MINUTE_MS: Ms = 60_000;
pub const DAY_MS: Ms = 86_400_000;
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    /// A span exactly as a loader delivered it. May be degenerate; layout
    /// rejects those before segmentation.
    pub fn raw(start: Ms, end: Ms) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: Ms) -> bool {
        self.start <= t && t < self.end
    }

    /// Returns true if `self` fully contains `other`.
    pub fn contains_span(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A calendar entry as handed over by the loader. Immutable once built;
/// `payload` is carried through layout untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event<T> {
    pub id: EventId,
    pub title: String,
    pub location: Option<String>,
    /// ARGB colour reference, opaque to the engine.
    pub color: Option<u32>,
    pub all_day: bool,
    pub span: Span,
    pub payload: T,
}

impl<T> Event<T> {
    pub fn timed(id: EventId, title: impl Into<String>, span: Span, payload: T) -> Self {
        Self {
            id,
            title: title.into(),
            location: None,
            color: None,
            all_day: false,
            span,
            payload,
        }
    }

    pub fn all_day(id: EventId, title: impl Into<String>, span: Span, payload: T) -> Self {
        Self {
            all_day: true,
            ..Self::timed(id, title, span, payload)
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_color(mut self, argb: u32) -> Self {
        self.color = Some(argb);
        self
    }

    pub fn category(&self) -> Category {
        if self.all_day {
            Category::AllDay
        } else {
            Category::Timed
        }
    }
}

/// All-day and timed segments never share clusters. All-day sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    AllDay,
    Timed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VerticalRange {
    /// Minutes since the day's midnight; `end_minute` may be 1440.
    Timed { start_minute: f64, end_minute: f64 },
    /// Fixed header band, not hour-proportional.
    AllDayBand,
}

/// Column assignment inside a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub index: u32,
    pub count: u32,
}

impl Default for Track {
    fn default() -> Self {
        Self { index: 0, count: 1 }
    }
}

/// The part of an event that falls on one calendar day, with its layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub event_id: EventId,
    /// Position of the originating event in the owning layout's event table.
    pub(crate) event_ix: usize,
    pub day: NaiveDate,
    /// Clipped to `day`.
    pub span: Span,
    pub category: Category,
    pub vertical: VerticalRange,
    pub track: Track,
}

impl Segment {
    pub fn is_all_day(&self) -> bool {
        self.category == Category::AllDay
    }

    pub fn left(&self) -> f64 {
        self.track.index as f64 / self.track.count as f64
    }

    pub fn width(&self) -> f64 {
        1.0 / self.track.count as f64
    }

    /// Fraction of the day (timed) or of the all-day band.
    pub fn top(&self) -> f64 {
        match self.vertical {
            VerticalRange::Timed { start_minute, .. } => start_minute / MINUTES_PER_DAY,
            VerticalRange::AllDayBand => 0.0,
        }
    }

    pub fn bottom(&self) -> f64 {
        match self.vertical {
            VerticalRange::Timed { end_minute, .. } => end_minute / MINUTES_PER_DAY,
            VerticalRange::AllDayBand => 1.0,
        }
    }

    pub fn geometry(&self) -> Geometry {
        Geometry {
            day: self.day,
            top: self.top(),
            bottom: self.bottom(),
            left: self.left(),
            width: self.width(),
            all_day: self.is_all_day(),
        }
    }
}

/// What the renderer reads for each segment. All values are fractions; the
/// host maps them onto its own coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub day: NaiveDate,
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub width: f64,
    pub all_day: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn timed_segment(start_minute: f64, end_minute: f64, track: Track) -> Segment {
        Segment {
            event_id: Ulid::new(),
            event_ix: 0,
            day: day(4),
            span: Span::new(0, 1),
            category: Category::Timed,
            vertical: VerticalRange::Timed {
                start_minute,
                end_minute,
            },
            track,
        }
    }

    #[test]
    fn span_basics() {
        let s = Span::new(100, 200);
        assert_eq!(s.duration_ms(), 100);
        assert!(s.contains_instant(100));
        assert!(s.contains_instant(199));
        assert!(!s.contains_instant(200)); // half-open
    }

    #[test]
    fn span_overlap() {
        let a = Span::new(100, 200);
        let b = Span::new(150, 250);
        let c = Span::new(200, 300);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
    }

    #[test]
    fn span_contains_span() {
        let outer = Span::new(100, 400);
        let inner = Span::new(150, 300);
        let partial = Span::new(50, 200);
        assert!(outer.contains_span(&inner));
        assert!(outer.contains_span(&outer));
        assert!(!outer.contains_span(&partial));
    }

    #[test]
    fn raw_span_may_be_degenerate() {
        assert!(!Span::raw(200, 100).is_valid());
        assert!(!Span::raw(100, 100).is_valid());
        assert!(Span::raw(100, 101).is_valid());
    }

    #[test]
    fn event_builders() {
        let e = Event::timed(Ulid::new(), "standup", Span::new(0, 10), ())
            .with_location("room 4")
            .with_color(0xFF00_88FF);
        assert!(!e.all_day);
        assert_eq!(e.category(), Category::Timed);
        assert_eq!(e.location.as_deref(), Some("room 4"));
        assert_eq!(e.color, Some(0xFF00_88FF));

        let a = Event::all_day(Ulid::new(), "holiday", Span::new(0, DAY_MS), 7u8);
        assert_eq!(a.category(), Category::AllDay);
        assert_eq!(a.payload, 7);
    }

    #[test]
    fn all_day_sorts_before_timed() {
        assert!(Category::AllDay < Category::Timed);
    }

    #[test]
    fn geometry_fractions() {
        let seg = timed_segment(360.0, 720.0, Track { index: 1, count: 4 });
        let g = seg.geometry();
        assert_eq!(g.top, 0.25);
        assert_eq!(g.bottom, 0.5);
        assert_eq!(g.left, 0.25);
        assert_eq!(g.width, 0.25);
        assert!(!g.all_day);
        assert_eq!(g.day, day(4));
    }

    #[test]
    fn all_day_band_geometry() {
        let mut seg = timed_segment(0.0, 0.0, Track::default());
        seg.category = Category::AllDay;
        seg.vertical = VerticalRange::AllDayBand;
        let g = seg.geometry();
        assert_eq!((g.top, g.bottom, g.left, g.width), (0.0, 1.0, 0.0, 1.0));
        assert!(g.all_day);
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = Event::timed(Ulid::new(), "Test", Span::new(1, 2), 42u32).with_location("here");
        let json = serde_json::to_string(&event).unwrap();
        let decoded: Event<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(event, decoded);
    }
}
