use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::theme::ThemeMode;

const CONFIG_DIR: &str = "lightbox";
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_ITEM_VISIBLE_PERCENT_THRESHOLD: f64 = 100.0;
pub const DEFAULT_DISMISS_DISTANCE_THRESHOLD: f64 = 3.0;
pub const DEFAULT_DISMISS_VELOCITY_THRESHOLD: f64 = 500.0;
pub const DEFAULT_BACKDROP_FADE_RANGE: [f64; 2] = [0.0, 0.4];
pub const DEFAULT_SETTLE_DURATION_MS: u64 = 500;
pub const DEFAULT_COMMIT_OVERSHOOT_PROGRESS: f64 = 40.0;
pub const DEFAULT_ENTRANCE_DURATION_MS: u64 = 300;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("duplicate identity {identity:?} at positions {first} and {second}")]
    DuplicateIdentity {
        identity: String,
        first: usize,
        second: usize,
    },
    #[error("item_visible_percent_threshold must be within (0, 100], got {0}")]
    InvalidVisibleThreshold(f64),
    #[error("{name} must be a finite positive number, got {value}")]
    InvalidDismissThreshold { name: &'static str, value: f64 },
    #[error("backdrop_fade_range must be an increasing pair of finite values, got [{start}, {end}]")]
    InvalidFadeRange { start: f64, end: f64 },
    #[error("commit_overshoot_progress must be finite and non-negative, got {0}")]
    InvalidOvershoot(f64),
}

/// How a mounted collection with repeated identities is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    #[default]
    Reject,
    /// Keep the first occurrence of each identity.
    Deduplicate,
}

/// Viewer settings from `config.json`; every field falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightboxConfig {
    pub item_visible_percent_threshold: f64,
    pub dismiss_distance_threshold: f64,
    pub dismiss_velocity_threshold: f64,
    pub backdrop_fade_range: [f64; 2],
    pub settle_duration_ms: u64,
    pub commit_overshoot_progress: f64,
    pub entrance_duration_ms: u64,
    pub theme: ThemeMode,
    /// `#rrggbb` backdrop color replacing the theme default.
    pub backdrop_color: Option<String>,
    pub duplicate_policy: DuplicatePolicy,
    /// `None` follows the build profile: strict with debug assertions.
    pub strict_preconditions: Option<bool>,
}

impl Default for LightboxConfig {
    fn default() -> Self {
        Self {
            item_visible_percent_threshold: DEFAULT_ITEM_VISIBLE_PERCENT_THRESHOLD,
            dismiss_distance_threshold: DEFAULT_DISMISS_DISTANCE_THRESHOLD,
            dismiss_velocity_threshold: DEFAULT_DISMISS_VELOCITY_THRESHOLD,
            backdrop_fade_range: DEFAULT_BACKDROP_FADE_RANGE,
            settle_duration_ms: DEFAULT_SETTLE_DURATION_MS,
            commit_overshoot_progress: DEFAULT_COMMIT_OVERSHOOT_PROGRESS,
            entrance_duration_ms: DEFAULT_ENTRANCE_DURATION_MS,
            theme: ThemeMode::default(),
            backdrop_color: None,
            duplicate_policy: DuplicatePolicy::default(),
            strict_preconditions: None,
        }
    }
}

impl LightboxConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        let threshold = self.item_visible_percent_threshold;
        if !threshold.is_finite() || threshold <= 0.0 || threshold > 100.0 {
            return Err(ConfigError::InvalidVisibleThreshold(threshold));
        }
        for (name, value) in [
            ("dismiss_distance_threshold", self.dismiss_distance_threshold),
            ("dismiss_velocity_threshold", self.dismiss_velocity_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidDismissThreshold { name, value });
            }
        }
        let [start, end] = self.backdrop_fade_range;
        if !start.is_finite() || !end.is_finite() || start >= end {
            return Err(ConfigError::InvalidFadeRange { start, end });
        }
        let overshoot = self.commit_overshoot_progress;
        if !overshoot.is_finite() || overshoot < 0.0 {
            return Err(ConfigError::InvalidOvershoot(overshoot));
        }
        Ok(())
    }

    pub fn visible_ratio_threshold(&self) -> f64 {
        self.item_visible_percent_threshold / 100.0
    }

    pub fn settle_duration(&self) -> Duration {
        Duration::from_millis(self.settle_duration_ms)
    }

    pub fn entrance_duration(&self) -> Duration {
        Duration::from_millis(self.entrance_duration_ms)
    }

    pub fn strict_preconditions(&self) -> bool {
        self.strict_preconditions.unwrap_or(cfg!(debug_assertions))
    }
}

/// Viewer settings from the user's `config.json`, or defaults when there is none.
pub fn load_config() -> LightboxConfig {
    let xdg_config_home = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
    let home = std::env::var_os("HOME").map(PathBuf::from);
    match config_path(xdg_config_home.as_deref(), home.as_deref()) {
        Some(path) => load_config_from(&path),
        None => {
            tracing::debug!("neither XDG_CONFIG_HOME nor HOME is set; using default config");
            LightboxConfig::default()
        }
    }
}

/// `$XDG_CONFIG_HOME/lightbox/config.json`, else under `$HOME/.config`.
fn config_path(xdg_config_home: Option<&Path>, home: Option<&Path>) -> Option<PathBuf> {
    let root = xdg_config_home
        .filter(|path| !path.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .or_else(|| home.map(|home| home.join(".config")))?;
    Some(root.join(CONFIG_DIR).join(CONFIG_FILE))
}

fn load_config_from(path: &Path) -> LightboxConfig {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return LightboxConfig::default();
        }
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read lightbox config; using defaults");
            return LightboxConfig::default();
        }
    };
    serde_json::from_str(&contents).unwrap_or_else(|err| {
        tracing::warn!(?err, ?path, "failed to parse lightbox config; using defaults");
        LightboxConfig::default()
    })
}
