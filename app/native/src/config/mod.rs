//! Configuration module for Deskmate.
//!
//! Holds the process-wide configuration, loaded once at startup from the
//! first JSONC file found in the search paths or from the `--config` path.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::path::PathBuf;
use std::sync::OnceLock;

pub use deskmate_core::config::{
    ConfigError, DeskmateConfig, PanelHeights, PollingConfig, WidgetConfig, config_paths,
    load_config as load_config_default, load_config_from_path,
};

/// Global configuration instance, loaded once at startup.
static CONFIG: OnceLock<DeskmateConfig> = OnceLock::new();

/// Path to the currently loaded configuration file.
static CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Custom config path override (set via CLI --config flag).
static CUSTOM_CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Sets a custom configuration file path to use instead of the default search paths.
///
/// This must be called before `init()` or `get_config()` to take effect.
///
/// Returns `false` if a path was already set.
pub fn set_custom_config_path(path: PathBuf) -> bool { CUSTOM_CONFIG_PATH.set(path).is_ok() }

/// Loads the configuration from disk.
///
/// A missing file yields the defaults silently; any other failure is logged
/// and also yields the defaults.
fn load_or_default() -> DeskmateConfig {
    let result = CUSTOM_CONFIG_PATH.get().map_or_else(load_config_default, load_config_from_path);
    resolve(result)
}

fn resolve(result: Result<(DeskmateConfig, PathBuf), ConfigError>) -> DeskmateConfig {
    match result {
        Ok((config, path)) => {
            tracing::info!(path = %path.display(), "loaded configuration");
            let _ = CONFIG_PATH.set(path);
            config
        }
        Err(ConfigError::NotFound) => {
            tracing::debug!("no configuration file found, using defaults");
            DeskmateConfig::default()
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to load configuration, using defaults");
            DeskmateConfig::default()
        }
    }
}

/// Initializes and returns the global configuration instance.
///
/// This function is idempotent - calling it multiple times will return
/// the same configuration instance.
pub fn init() -> &'static DeskmateConfig { CONFIG.get_or_init(load_or_default) }

/// Returns the global configuration instance, initializing it if necessary.
pub fn get_config() -> &'static DeskmateConfig { CONFIG.get_or_init(load_or_default) }

/// Returns the path to the loaded configuration file, if any.
pub fn get_config_path() -> Option<&'static PathBuf> { CONFIG_PATH.get() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_resolves_to_defaults() {
        assert_eq!(resolve(Err(ConfigError::NotFound)), DeskmateConfig::default());
    }

    #[test]
    fn test_parse_error_resolves_to_defaults() {
        let parse_err = serde_json::from_str::<DeskmateConfig>("{").unwrap_err();
        assert_eq!(resolve(Err(ConfigError::ParseError(parse_err))), DeskmateConfig::default());
    }

    #[test]
    fn test_loaded_config_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.jsonc");
        std::fs::write(&path, r#"{ "polling": { "saveDelayMs": 500 } // slower saves
        }"#)
        .unwrap();

        let config = resolve(load_config_from_path(&path));
        assert_eq!(config.polling.save_delay_ms, 500);
    }

    #[test]
    fn test_get_config_is_stable() {
        let first: *const DeskmateConfig = get_config();
        let second: *const DeskmateConfig = init();
        assert_eq!(first, second);
    }
}
