use crate::model::Ms;

/// Earliest accepted instant: 1900-01-01T00:00:00Z.
pub const MIN_VALID_TIMESTAMP_MS: Ms = -2_208_988_800_000;

/// Latest accepted instant: 2200-01-01T00:00:00Z.
pub const MAX_VALID_TIMESTAMP_MS: Ms = 7_258_118_400_000;

/// Events touching more calendar days than this are rejected.
pub const DEFAULT_MAX_EVENT_DAYS: u32 = 366;

/// Largest accepted `|utc_offset_secs|`.
pub const MAX_UTC_OFFSET_SECS: i32 = 86_399;

/// Largest accepted `|period_of(day)|`: 2^53, past which `f64` no longer
/// holds every integer and `target ± 1` would not be representable.
pub const MAX_PERIOD_MAGNITUDE: f64 = 9_007_199_254_740_992.0;
