//! Configuration types and loading.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Every field is optional; missing fields take their defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::collapse::PanelLayout;
use crate::geometry::{Anchor, DEFAULT_MENU_BAR_INSET, DEFAULT_PADDING, SnapInsets};

/// Root configuration for Deskmate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct DeskmateConfig {
    /// Poll and write timing.
    pub polling: PollingConfig,
    /// Widget dimensions and placement.
    pub widget: WidgetConfig,
}

/// Timing of the widget's background work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PollingConfig {
    /// Interval of the desktop and position checks, in milliseconds.
    ///
    /// Default: 200
    pub interval_ms: u64,
    /// Delay before an edited title or task list is written, in milliseconds.
    ///
    /// Default: 300
    pub save_delay_ms: u64,
    /// How long a snap or resize may take to land before the widget stops
    /// waiting for it, in milliseconds.
    ///
    /// Default: 600
    pub snap_settle_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 200,
            save_delay_ms: 300,
            snap_settle_ms: 600,
        }
    }
}

impl PollingConfig {
    /// Poll interval, never shorter than 16ms.
    #[must_use]
    pub fn interval(&self) -> Duration { Duration::from_millis(self.interval_ms.max(16)) }

    #[must_use]
    pub const fn save_delay(&self) -> Duration { Duration::from_millis(self.save_delay_ms) }

    #[must_use]
    pub const fn snap_settle(&self) -> Duration { Duration::from_millis(self.snap_settle_ms) }
}

/// Heights of the optional panels, in logical pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PanelHeights {
    pub tasks: u32,
    pub timer: u32,
    pub common_apps: u32,
    pub desktops: u32,
}

impl Default for PanelHeights {
    fn default() -> Self {
        let layout = PanelLayout::default();
        Self {
            tasks: layout.tasks,
            timer: layout.timer,
            common_apps: layout.common_apps,
            desktops: layout.desktops,
        }
    }
}

/// Widget dimensions and placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetConfig {
    /// Widget width in logical pixels.
    ///
    /// Default: 290
    pub width: u32,
    /// Height of the collapsed widget in logical pixels.
    ///
    /// Default: 56
    pub collapsed_height: u32,
    /// Height of the always-visible header in logical pixels.
    ///
    /// Default: 56
    pub header_height: u32,
    pub panel_heights: PanelHeights,
    /// Gap kept from the monitor edges when snapping, in logical pixels.
    ///
    /// Default: 16
    pub padding: f64,
    /// Space kept free for the menu bar when snapping, in logical pixels.
    ///
    /// Default: 25
    pub menu_bar_inset: f64,
    /// Anchor used before the user picks one.
    ///
    /// Default: "top-right"
    pub default_anchor: Anchor,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        let layout = PanelLayout::default();
        Self {
            width: layout.width,
            collapsed_height: layout.collapsed_height,
            header_height: layout.header_height,
            panel_heights: PanelHeights::default(),
            padding: DEFAULT_PADDING,
            menu_bar_inset: DEFAULT_MENU_BAR_INSET,
            default_anchor: Anchor::default(),
        }
    }
}

impl WidgetConfig {
    #[must_use]
    pub const fn layout(&self) -> PanelLayout {
        PanelLayout {
            width: self.width,
            collapsed_height: self.collapsed_height,
            header_height: self.header_height,
            tasks: self.panel_heights.tasks,
            timer: self.panel_heights.timer,
            common_apps: self.panel_heights.common_apps,
            desktops: self.panel_heights.desktops,
        }
    }

    #[must_use]
    pub const fn insets(&self) -> SnapInsets {
        SnapInsets {
            padding: self.padding,
            menu_bar_inset: self.menu_bar_inset,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Errors that can occur when loading the configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    NotFound,
    /// The configuration file exists but could not be read.
    IoError(std::io::Error),
    /// The configuration file contains invalid JSON.
    ParseError(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(
                f,
                "No configuration file found. Expected at ~/.config/deskmate/config.jsonc, \
                ~/Library/Application Support/deskmate/config.jsonc, or ~/.deskmate.jsonc"
            ),
            Self::IoError(err) => write!(f, "Failed to read configuration file: {err}"),
            Self::ParseError(err) => write!(f, "Failed to parse configuration file: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(err) => Some(err),
            Self::ParseError(err) => Some(err),
            Self::NotFound => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err) }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self { Self::ParseError(err) }
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Home-directory configuration file names.
const HOME_CONFIG_FILE_NAMES: &[&str] = &[".deskmate.jsonc", ".deskmate.json"];

const APP_DIR: &str = "deskmate";

/// Returns the possible configuration file paths in priority order.
///
/// 1. `$XDG_CONFIG_HOME/deskmate/` when set
/// 2. `~/.config/deskmate/`
/// 3. `~/Library/Application Support/deskmate/`
/// 4. `~/.deskmate.jsonc` or `~/.deskmate.json`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut dirs_to_search = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        dirs_to_search.push(PathBuf::from(xdg_config).join(APP_DIR));
    }
    if let Some(home) = dirs::home_dir() {
        dirs_to_search.push(home.join(".config").join(APP_DIR));
    }
    if let Some(config_dir) = dirs::config_dir() {
        dirs_to_search.push(config_dir.join(APP_DIR));
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for dir in dirs_to_search {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    if let Some(home) = dirs::home_dir() {
        for filename in HOME_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of the expected locations.
/// Returns `ConfigError::IoError` if a configuration file exists but could not be read.
/// Returns `ConfigError::ParseError` if the configuration file contains invalid JSON.
pub fn load_config() -> Result<(DeskmateConfig, PathBuf), ConfigError> {
    config_paths()
        .into_iter()
        .find(|path| path.exists())
        .map_or(Err(ConfigError::NotFound), load_config_from_path)
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist, or an I/O or
/// parse error.
pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<(DeskmateConfig, PathBuf), ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }
    let file = fs::File::open(path)?;
    let reader = json_comments::StripComments::new(file);
    let config: DeskmateConfig = serde_json::from_reader(reader)?;
    Ok((config, path.to_path_buf()))
}
