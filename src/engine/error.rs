use crate::cache::LoadError;

#[derive(Debug)]
pub enum EngineError {
    /// The loader collaborator failed for `period`. Never retried here.
    LoaderFailure { period: i64, source: LoadError },
    /// `period_of` returned NaN, an infinity, or a value beyond
    /// `limits::MAX_PERIOD_MAGNITUDE`.
    InvalidPeriod(f64),
    InvalidConfig(&'static str),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::LoaderFailure { period, source } => {
                write!(f, "loader failed for period {period}: {source}")
            }
            EngineError::InvalidPeriod(p) => write!(f, "period index out of range: {p}"),
            EngineError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::LoaderFailure { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn loader_failure_exposes_source() {
        let err = EngineError::LoaderFailure {
            period: 24_290,
            source: "backend offline".into(),
        };
        assert_eq!(err.to_string(), "loader failed for period 24290: backend offline");
        assert_eq!(err.source().unwrap().to_string(), "backend offline");
    }

    #[test]
    fn other_variants_have_no_source() {
        let err = EngineError::InvalidPeriod(f64::INFINITY);
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "period index out of range: inf");
        let err = EngineError::InvalidConfig("reload_threshold must be positive");
        assert_eq!(err.to_string(), "invalid config: reload_threshold must be positive");
    }
}
