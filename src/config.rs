use serde::Deserialize;

use crate::engine::EngineError;
use crate::limits::{DEFAULT_MAX_EVENT_DAYS, MAX_UTC_OFFSET_SECS};

/// Distance (in period units) between the requested period and the current
/// slot beyond which `ensure` re-evaluates the window.
pub const RELOAD_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterStrategy {
    /// A segment joins the first cluster holding any segment it overlaps.
    /// Clusters bridged by a later segment stay separate.
    #[default]
    FirstMatch,
    /// A segment merges every cluster it overlaps. Changes results for
    /// bridged inputs.
    Transitive,
}

impl std::str::FromStr for ClusterStrategy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_match" => Ok(Self::FirstMatch),
            "transitive" => Ok(Self::Transitive),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Offset from UTC that defines calendar-day boundaries.
    pub utc_offset_secs: i32,
    pub reload_threshold: f64,
    pub cluster_strategy: ClusterStrategy,
    pub max_event_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            utc_offset_secs: 0,
            reload_threshold: RELOAD_THRESHOLD,
            cluster_strategy: ClusterStrategy::default(),
            max_event_days: DEFAULT_MAX_EVENT_DAYS,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `WEEKGRID_*` environment variables. Absent or
    /// unparsable values keep the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            utc_offset_secs: env_parse("WEEKGRID_UTC_OFFSET_SECS").unwrap_or(defaults.utc_offset_secs),
            reload_threshold: env_parse("WEEKGRID_RELOAD_THRESHOLD").unwrap_or(defaults.reload_threshold),
            cluster_strategy: env_parse("WEEKGRID_CLUSTER_STRATEGY").unwrap_or(defaults.cluster_strategy),
            max_event_days: env_parse("WEEKGRID_MAX_EVENT_DAYS").unwrap_or(defaults.max_event_days),
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.utc_offset_secs.abs() > MAX_UTC_OFFSET_SECS {
            return Err(EngineError::InvalidConfig("utc_offset_secs out of range"));
        }
        if !self.reload_threshold.is_finite() || self.reload_threshold <= 0.0 {
            return Err(EngineError::InvalidConfig("reload_threshold must be positive"));
        }
        if self.max_event_days == 0 {
            return Err(EngineError::InvalidConfig("max_event_days must be at least 1"));
        }
        Ok(())
    }
}

fn env_parse<V: std::str::FromStr>(key: &str) -> Option<V> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.reload_threshold, 0.5);
        assert_eq!(cfg.cluster_strategy, ClusterStrategy::FirstMatch);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn deserialize_partial_json() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"utc_offset_secs": 3600, "cluster_strategy": "transitive"}"#).unwrap();
        assert_eq!(cfg.utc_offset_secs, 3600);
        assert_eq!(cfg.cluster_strategy, ClusterStrategy::Transitive);
        assert_eq!(cfg.max_event_days, DEFAULT_MAX_EVENT_DAYS);
        assert_eq!(cfg.reload_threshold, RELOAD_THRESHOLD);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let bad_offset = EngineConfig {
            utc_offset_secs: 90_000,
            ..Default::default()
        };
        assert!(matches!(bad_offset.validate(), Err(EngineError::InvalidConfig(_))));

        let bad_threshold = EngineConfig {
            reload_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(bad_threshold.validate().is_err());

        let zero_threshold = EngineConfig {
            reload_threshold: 0.0,
            ..Default::default()
        };
        assert!(zero_threshold.validate().is_err());

        let zero_days = EngineConfig {
            max_event_days: 0,
            ..Default::default()
        };
        assert!(zero_days.validate().is_err());
    }

    #[test]
    fn strategy_from_str() {
        assert_eq!("first_match".parse(), Ok(ClusterStrategy::FirstMatch));
        assert_eq!("transitive".parse(), Ok(ClusterStrategy::Transitive));
        assert!("union_find".parse::<ClusterStrategy>().is_err());
    }
}
