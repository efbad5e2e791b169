mod loader;

pub use loader::{month_period, month_start, FnLoader, LoadError, PeriodLoader};

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::engine::{layout, EngineError, Layout};
use crate::limits::MAX_PERIOD_MAGNITUDE;
use crate::model::*;
use crate::observability::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Populated,
}

/// What one `ensure` call did to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reload {
    /// No slot changed and no loader call was made.
    Unchanged,
    /// Moved one period back: one fetch, for the new previous slot.
    Backward,
    /// Moved one period forward: one fetch, for the new next slot.
    Forward,
    /// All three slots fetched.
    Full,
}

impl Reload {
    fn label(self) -> &'static str {
        match self {
            Reload::Unchanged => "unchanged",
            Reload::Backward => "backward",
            Reload::Forward => "forward",
            Reload::Full => "full",
        }
    }
}

struct Slot<T> {
    period: i64,
    events: Vec<Arc<Event<T>>>,
}

struct Window<T> {
    previous: Slot<T>,
    current: Slot<T>,
    next: Slot<T>,
}

impl<T> Window<T> {
    fn slots(&self) -> [&Slot<T>; 3] {
        [&self.previous, &self.current, &self.next]
    }
}

/// Three-period sliding window of raw events plus the layout of their union.
///
/// Not reentrant: `ensure` takes `&mut self` and runs the loader inline.
/// The exposed layout is swapped in one assignment after each relayout, so
/// `snapshot()` holders never see a partial result.
pub struct PeriodCache<T, L> {
    loader: L,
    config: EngineConfig,
    window: Option<Window<T>>,
    refresh_pending: bool,
    layout: Arc<Layout<T>>,
}

impl<T, L: PeriodLoader<T>> PeriodCache<T, L> {
    pub fn new(loader: L, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            loader,
            config,
            window: None,
            refresh_pending: false,
            layout: Arc::new(Layout::default()),
        })
    }

    /// Make sure the window covers the period of `day`, fetching only the
    /// slots that cannot be reused, then relayout if anything changed.
    ///
    /// On loader failure every other needed slot is still fetched, failed
    /// slots are committed empty, the layout is rebuilt, and the first
    /// failure is returned. Nothing is retried; call `invalidate` to refetch.
    pub fn ensure(&mut self, day: NaiveDate) -> Result<Reload, EngineError> {
        let raw = self.loader.period_of(day);
        if !raw.is_finite() || raw.abs() >= MAX_PERIOD_MAGNITUDE {
            return Err(EngineError::InvalidPeriod(raw));
        }
        let target = raw.floor() as i64;
        let refresh = std::mem::take(&mut self.refresh_pending);

        let decision = match &self.window {
            None => Reload::Full,
            Some(_) if refresh => Reload::Full,
            Some(window) => {
                let current = window.current.period;
                if (raw - current as f64).abs() <= self.config.reload_threshold || target == current {
                    Reload::Unchanged
                } else if target == current - 1 {
                    Reload::Backward
                } else if target == current + 1 {
                    Reload::Forward
                } else {
                    Reload::Full
                }
            }
        };
        if decision == Reload::Unchanged {
            return Ok(Reload::Unchanged);
        }

        let mut failure = None;
        let window = match (decision, self.window.take()) {
            (Reload::Backward, Some(old)) => Window {
                previous: self.fetch(target - 1, &mut failure),
                current: old.previous,
                next: old.current,
            },
            (Reload::Forward, Some(old)) => Window {
                previous: old.current,
                current: old.next,
                next: self.fetch(target + 1, &mut failure),
            },
            _ => {
                let current = self.fetch(target, &mut failure);
                let previous = self.fetch(target - 1, &mut failure);
                let next = self.fetch(target + 1, &mut failure);
                Window {
                    previous,
                    current,
                    next,
                }
            }
        };

        match decision {
            Reload::Full => info!(period = target, refresh, "window reloaded"),
            _ => debug!(period = target, kind = decision.label(), "window shifted"),
        }
        metrics::counter!(WINDOW_RELOADS_TOTAL, "kind" => decision.label()).increment(1);

        self.relayout(&window);
        self.window = Some(window);

        match failure {
            Some(err) => Err(err),
            None => Ok(decision),
        }
    }

    /// Force a full refetch of all three slots on the next `ensure`.
    pub fn invalidate(&mut self) {
        self.refresh_pending = true;
    }

    pub fn is_refresh_pending(&self) -> bool {
        self.refresh_pending
    }

    /// Segments on `day` as of the last completed `ensure`.
    pub fn segments_for(&self, day: NaiveDate) -> &[Segment] {
        self.layout.segments_for(day)
    }

    pub fn layout(&self) -> &Layout<T> {
        &self.layout
    }

    /// Shared handle on the current layout, unaffected by later `ensure`s.
    pub fn snapshot(&self) -> Arc<Layout<T>> {
        Arc::clone(&self.layout)
    }

    pub fn state(&self) -> CacheState {
        match self.window {
            None => CacheState::Empty,
            Some(_) => CacheState::Populated,
        }
    }

    /// `[previous, current, next]` period indices.
    pub fn periods(&self) -> Option<[i64; 3]> {
        self.window
            .as_ref()
            .map(|w| [w.previous.period, w.current.period, w.next.period])
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    fn fetch(&mut self, period: i64, failure: &mut Option<EngineError>) -> Slot<T> {
        let events = match self.loader.load(period) {
            Ok(events) if events.is_empty() => {
                debug!(period, "loader returned no events");
                metrics::counter!(LOADS_TOTAL, "status" => "empty").increment(1);
                Vec::new()
            }
            Ok(events) => {
                metrics::counter!(LOADS_TOTAL, "status" => "ok").increment(1);
                events.into_iter().map(Arc::new).collect()
            }
            Err(source) => {
                warn!(period, error = %source, "loader failed, slot left empty");
                metrics::counter!(LOADS_TOTAL, "status" => "error").increment(1);
                if failure.is_none() {
                    *failure = Some(EngineError::LoaderFailure { period, source });
                }
                Vec::new()
            }
        };
        Slot { period, events }
    }

    /// Full relayout over the union of all slots; multi-day events may
    /// straddle slot boundaries, so slots are never laid out separately.
    fn relayout(&mut self, window: &Window<T>) {
        let started = Instant::now();
        let union: Vec<Arc<Event<T>>> = window
            .slots()
            .into_iter()
            .flat_map(|slot| slot.events.iter().cloned())
            .collect();
        let next = layout(&union, &self.config);

        metrics::histogram!(RELAYOUT_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        metrics::gauge!(SEGMENTS_ACTIVE).set(next.segments().len() as f64);
        debug!(
            events = union.len(),
            segments = next.segments().len(),
            rejected = next.diagnostics().len(),
            "relayout complete"
        );
        self.layout = Arc::new(next);
    }
}
