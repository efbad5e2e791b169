// Metric names. The crate only emits through the `metrics` facade; the host
// installs whatever recorder it uses.

/// Counter: loader calls. Labels: status (`ok`, `empty`, `error`).
pub const LOADS_TOTAL: &str = "weekgrid_loads_total";

/// Counter: events rejected before segmentation. Labels: reason.
pub const EVENTS_REJECTED_TOTAL: &str = "weekgrid_events_rejected_total";

/// Histogram: full relayout duration in seconds.
pub const RELAYOUT_DURATION_SECONDS: &str = "weekgrid_relayout_duration_seconds";

/// Gauge: segments in the currently exposed layout.
pub const SEGMENTS_ACTIVE: &str = "weekgrid_segments_active";

/// Counter: window changes. Labels: kind (`backward`, `forward`, `full`).
pub const WINDOW_RELOADS_TOTAL: &str = "weekgrid_window_reloads_total";
