use crate::app_config::{AppConfig, Environment};
use crate::query::{is_valid_half_life, MAX_HALF_LIFE_DAYS, MIN_HALF_LIFE_DAYS};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        let value = raw
            .trim()
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be at least 1".to_string()));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("REELRANK_ENV", "development"));
    let log_level = or_default("REELRANK_LOG_LEVEL", "info");

    let half_life_raw = or_default("REELRANK_HALF_LIFE_DAYS", "30");
    let half_life_days = half_life_raw
        .trim()
        .parse::<f64>()
        .map_err(|e| invalid("REELRANK_HALF_LIFE_DAYS", e.to_string()))?;
    if !is_valid_half_life(half_life_days) {
        return Err(invalid(
            "REELRANK_HALF_LIFE_DAYS",
            format!("must be between {MIN_HALF_LIFE_DAYS} and {MAX_HALF_LIFE_DAYS} days"),
        ));
    }

    let max_depth = parse_positive_usize("REELRANK_MAX_DEPTH", "25")?;
    let max_payload_bytes = parse_positive_usize("REELRANK_MAX_PAYLOAD_BYTES", "33554432")?;
    let trend_top_n = parse_positive_usize("REELRANK_TREND_TOP_N", "20")?;
    let max_concurrent_files = parse_positive_usize("REELRANK_MAX_CONCURRENT_FILES", "4")?;

    let profile = lookup("REELRANK_PROFILE")
        .ok()
        .map(|p| p.trim().trim_start_matches('@').to_lowercase())
        .filter(|p| !p.is_empty());

    Ok(AppConfig {
        env,
        log_level,
        half_life_days,
        max_depth,
        max_payload_bytes,
        profile,
        trend_top_n,
        max_concurrent_files,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
