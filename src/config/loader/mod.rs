use crate::config::{ConsoleConfig, Environment};
use crate::utils::get_stackdeck_home;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_stackdeck_home()?.join("config.json"))
}

/// Load the console config, falling back to defaults when no file exists.
///
/// Environment overrides are applied on top, then the result is validated.
pub fn load_config(config_path: Option<&Path>) -> Result<ConsoleConfig> {
    let default_path = get_config_path().unwrap_or_else(|_| PathBuf::from("config.json"));
    let path = config_path.unwrap_or(default_path.as_path());

    let mut config = if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        serde_json::from_str::<ConsoleConfig>(&content)
            .with_context(|| format!("Failed to parse config JSON from {}", path.display()))?
    } else {
        debug!("No config at {}, using defaults", path.display());
        ConsoleConfig::default()
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    config
        .validate()
        .with_context(|| "Configuration validation failed")?;
    Ok(config)
}

/// Apply `STACKDECK_*` overrides read through `lookup`.
pub(crate) fn apply_env_overrides(
    config: &mut ConsoleConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(base_url) = lookup("STACKDECK_BASE_URL").filter(|v| !v.trim().is_empty()) {
        config.http.base_url = Some(base_url);
    }
    if let Some(env) = lookup("STACKDECK_ENV") {
        match Environment::parse(&env) {
            Some(parsed) => config.environment = parsed,
            None => warn!("Ignoring unrecognised STACKDECK_ENV value '{}'", env),
        }
    }
    if let Some(cookies) = lookup("STACKDECK_COOKIES").filter(|v| !v.trim().is_empty()) {
        config.cookies = Some(cookies);
    }
}
