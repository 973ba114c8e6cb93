use mapmatch_core::geo::GeoError;
use mapmatch_core::matcher::ConfigError;
use mapmatch_core::network::NetworkError;
use mapmatch_core::ubodt::UbodtError;

/// Top-level failures that abort the program with a non-zero exit code
/// before matching starts. Per-trajectory failures never become a
/// `CliError` -- they turn into an output row with empty path fields
/// instead (see [`crate::output`]).
#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed geometry: {0}")]
    Geo(#[from] GeoError),
    #[error("network error: {0}")]
    Network(#[from] NetworkError),
    #[error("UBODT error: {0}")]
    Ubodt(#[from] UbodtError),
    #[error("settings error: {0}")]
    Settings(#[from] config::ConfigError),
    #[error("malformed input row: {0}")]
    MalformedRow(String),
    #[error("unrecognized output field: {0}")]
    UnknownOutputField(String),
}
