/// Tunable parameters threaded explicitly to every matching call -- no
/// global state, unlike the process-wide `GPS_ERROR` constant this
/// design replaces.
#[derive(Clone, Copy, Debug)]
pub struct MatcherConfig {
    /// Max candidates kept per observation.
    pub k: usize,
    /// Candidate search radius, same units as the network.
    pub radius: f64,
    /// Standard deviation of the emission-probability Gaussian.
    pub gps_error: f64,
    /// Fraction of an edge's length within which a same-edge backward
    /// offset is still treated as a forward (zero-cost) transition.
    pub reverse_tolerance: f64,
    /// STMATCH only: assumed maximum travel speed, used to bound the
    /// per-pair Dijkstra search when observation timestamps are present.
    pub vmax: f64,
    /// STMATCH only: multiplicative slack applied to the speed/time or
    /// Euclidean-distance bound.
    pub factor: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            k: 8,
            radius: 300.0,
            gps_error: 50.0,
            reverse_tolerance: 0.0,
            vmax: 30.0,
            factor: 1.5,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("candidate count k must be positive, got {0}")]
    InvalidK(i64),
    #[error("radius must be positive, got {0}")]
    InvalidRadius(f64),
    #[error("gps_error must be positive, got {0}")]
    InvalidGpsError(f64),
    #[error("vmax must be positive, got {0}")]
    InvalidVmax(f64),
    #[error("factor must be positive, got {0}")]
    InvalidFactor(f64),
    #[error("reverse_tolerance must be within [0, 1], got {0}")]
    InvalidReverseTolerance(f64),
}

impl MatcherConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.k == 0 {
            return Err(ConfigError::InvalidK(0));
        }
        if !(self.radius > 0.0) {
            return Err(ConfigError::InvalidRadius(self.radius));
        }
        if !(self.gps_error > 0.0) {
            return Err(ConfigError::InvalidGpsError(self.gps_error));
        }
        if !(self.vmax > 0.0) {
            return Err(ConfigError::InvalidVmax(self.vmax));
        }
        if !(self.factor > 0.0) {
            return Err(ConfigError::InvalidFactor(self.factor));
        }
        if !(0.0..=1.0).contains(&self.reverse_tolerance) {
            return Err(ConfigError::InvalidReverseTolerance(self.reverse_tolerance));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(MatcherConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_k_is_rejected() {
        let cfg = MatcherConfig {
            k: 0,
            ..MatcherConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidK(_))));
    }

    #[test]
    fn reverse_tolerance_out_of_range_is_rejected() {
        let cfg = MatcherConfig {
            reverse_tolerance: 1.5,
            ..MatcherConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidReverseTolerance(_))
        ));
    }
}
