//! Overlap layout for week/day calendar grids.
//!
//! Events come in from a host [`cache::PeriodLoader`] one period at a time.
//! [`cache::PeriodCache`] keeps a previous/current/next window of them and
//! reruns [`engine::layout`] over the union whenever a slot changes. The
//! resulting [`model::Segment`]s carry per-day clipping and track geometry as
//! fractions; drawing and gesture handling stay with the host.

pub mod cache;
pub mod config;
pub mod engine;
pub mod limits;
pub mod model;
pub mod observability;

pub use cache::{CacheState, PeriodCache, PeriodLoader, Reload};
pub use config::{ClusterStrategy, EngineConfig};
pub use engine::{layout, Diagnostic, EngineError, Layout};
pub use model::{Event, Geometry, Segment, Span};
