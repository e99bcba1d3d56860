use crate::app_config::{AppConfig, Environment};
use crate::matcher::{RadiusPolicy, DEFAULT_RADIUS_KM};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>().map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("ECOMATCH_ENV", "development"))?;

    let bind_addr = or_default("ECOMATCH_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("ECOMATCH_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("ECOMATCH_LOG_LEVEL", "info");
    let roster_path = PathBuf::from(or_default("ECOMATCH_ROSTER_PATH", "./config/roster.yaml"));

    let default_radius_km = parse_default_radius_km(&or_default(
        "ECOMATCH_DEFAULT_RADIUS_KM",
        &DEFAULT_RADIUS_KM.to_string(),
    ))?;
    let radius_policy = parse_radius_policy(
        &or_default("ECOMATCH_RADIUS_POLICY", "reject"),
        default_radius_km,
    )?;

    let max_candidates = parse_usize("ECOMATCH_MAX_CANDIDATES", "10000")?;
    if max_candidates == 0 {
        return Err(invalid("ECOMATCH_MAX_CANDIDATES", "must be at least 1".to_string()));
    }
    let rate_limit_per_minute = parse_usize("ECOMATCH_RATE_LIMIT_PER_MINUTE", "120")?;
    if rate_limit_per_minute == 0 {
        return Err(invalid(
            "ECOMATCH_RATE_LIMIT_PER_MINUTE",
            "must be at least 1".to_string(),
        ));
    }

    let api_keys = parse_api_keys(&lookup("ECOMATCH_API_KEYS").unwrap_or_default());
    if api_keys.is_empty() && env != Environment::Development {
        return Err(ConfigError::MissingEnvVar("ECOMATCH_API_KEYS".to_string()));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        roster_path,
        radius_policy,
        max_candidates,
        rate_limit_per_minute,
        api_keys,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ECOMATCH_ENV".to_string(),
            reason: format!("expected development, test or production; got '{other}'"),
        }),
    }
}

/// Parse the substitute radius used by the `fallback` policy.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` unless `raw` is a finite, positive
/// number of kilometers.
pub fn parse_default_radius_km(raw: &str) -> Result<f64, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "ECOMATCH_DEFAULT_RADIUS_KM".to_string(),
        reason,
    };
    let km = raw.trim().parse::<f64>().map_err(|e| invalid(e.to_string()))?;
    if !(km.is_finite() && km > 0.0) {
        return Err(invalid(format!(
            "must be a positive number of kilometers, got {km}"
        )));
    }
    Ok(km)
}

fn parse_radius_policy(s: &str, default_radius_km: f64) -> Result<RadiusPolicy, ConfigError> {
    match s {
        "reject" => Ok(RadiusPolicy::Reject),
        "fallback" => Ok(RadiusPolicy::Fallback(default_radius_km)),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ECOMATCH_RADIUS_POLICY".to_string(),
            reason: format!("expected reject or fallback; got '{other}'"),
        }),
    }
}

fn parse_api_keys(raw: &str) -> Vec<String> {
    let mut keys: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect();
    keys.sort();
    keys.dedup();
    keys
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
