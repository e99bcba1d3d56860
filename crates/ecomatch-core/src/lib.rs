pub mod app_config;
pub mod config;
pub mod geo;
pub mod matcher;
pub mod roster;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, parse_default_radius_km};
pub use geo::{distance_km, haversine_km, round_tenths, Coordinate, GeoError, EARTH_RADIUS_KM};
pub use matcher::{find_matches, Anchor, Candidate, Match, RadiusPolicy, DEFAULT_RADIUS_KM};
pub use roster::{load_roster, Roster, RosterUser, Task};

/// A [`GeoError`] tied to the input field that produced it, e.g.
/// `candidates[2].lat`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {source}")]
pub struct ValidationError {
    pub field: String,
    #[source]
    pub source: GeoError,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, source: GeoError) -> Self {
        Self {
            field: field.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read roster file {path}: {source}")]
    RosterFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse roster file: {0}")]
    RosterFileParse(#[from] serde_yaml::Error),

    #[error("roster validation failed: {0}")]
    Validation(String),
}
