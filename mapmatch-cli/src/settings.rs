use mapmatch_core::matcher::MatcherConfig;
use serde::Deserialize;

use crate::error::CliError;

/// Optional overrides for [`MatcherConfig`] read from a TOML/JSON file via
/// `--config`, layered over the CLI flags. Only the fields present in the
/// file are applied.
#[derive(Debug, Default, Deserialize)]
pub struct MatcherOverrides {
    pub k: Option<usize>,
    pub radius: Option<f64>,
    pub gps_error: Option<f64>,
    pub reverse_tolerance: Option<f64>,
    pub vmax: Option<f64>,
    pub factor: Option<f64>,
}

pub fn load_overrides(path: &str) -> Result<MatcherOverrides, CliError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path))
        .build()?;
    Ok(settings.try_deserialize()?)
}

pub fn apply_overrides(mut config: MatcherConfig, overrides: &MatcherOverrides) -> MatcherConfig {
    if let Some(k) = overrides.k {
        config.k = k;
    }
    if let Some(radius) = overrides.radius {
        config.radius = radius;
    }
    if let Some(gps_error) = overrides.gps_error {
        config.gps_error = gps_error;
    }
    if let Some(reverse_tolerance) = overrides.reverse_tolerance {
        config.reverse_tolerance = reverse_tolerance;
    }
    if let Some(vmax) = overrides.vmax {
        config.vmax = vmax;
    }
    if let Some(factor) = overrides.factor {
        config.factor = factor;
    }
    config
}
