//! Host configuration loaded from TOML.
//!
//! Every field has a default, so an absent file or a partial one is fine.
//! The file is taken from `$PIXELROOM_CONFIG` if set, else `pixelroom.toml` in the
//! working directory.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::transition::Direction;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "PIXELROOM_CONFIG";
/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "pixelroom.toml";

/// Heavy dither tile generated at build time.
pub const DEFAULT_HEAVY_DITHER: &str = concat!(env!("OUT_DIR"), "/dither_heavy.png");
/// Light dither tile generated at build time.
pub const DEFAULT_LIGHT_DITHER: &str = concat!(env!("OUT_DIR"), "/dither_light.png");
/// Demo marker sprite generated at build time.
pub const DEFAULT_MARKER: &str = concat!(env!("OUT_DIR"), "/marker.png");

/// Where [`SceneConfig::load`] found its settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// File named by `$PIXELROOM_CONFIG`.
    Env(PathBuf),
    /// `pixelroom.toml` in the working directory.
    File(PathBuf),
    /// No file; built-in defaults.
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Env(path) => write!(f, "{} (from {CONFIG_ENV})", path.display()),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => f.write_str("defaults"),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Window settings.
    pub window: WindowConfig,
    /// Global scale fitting.
    pub scale: ScaleConfig,
    /// Demo wipe sequence.
    pub transition: TransitionConfig,
    /// Image locators.
    pub assets: AssetConfig,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

/// Initial window attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title bar text.
    pub title: String,
    /// Requested inner width in physical pixels.
    pub width: u32,
    /// Requested inner height in physical pixels.
    pub height: u32,
}

/// How the global scale is fitted to the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    /// Natural scene width in world pixels.
    pub reference_width: u32,
    /// Natural scene height in world pixels.
    pub reference_height: u32,
    /// Horizontal window space not available to the scene, both sides together.
    pub horizontal_padding: u32,
    /// Vertical window space not available to the scene.
    pub vertical_padding: u32,
}

/// Wipe sequence played by the demo host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// World pixels per tick.
    pub scroll_speed: f64,
    /// Directions played in a loop.
    pub sequence: Vec<Direction>,
    /// Seconds to wait after a wipe completes before starting the next.
    pub hold_seconds: f64,
}

/// Image locators handed to the asset loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Dense dither tile.
    pub heavy_dither: String,
    /// Sparse dither tile.
    pub light_dither: String,
    /// Sprite placed in the demo room.
    pub marker: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            scale: ScaleConfig::default(),
            transition: TransitionConfig::default(),
            assets: AssetConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "pixelroom".to_string(),
            width: 1360,
            height: 768,
        }
    }
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            reference_width: 320,
            reference_height: 180,
            horizontal_padding: 64,
            vertical_padding: 196,
        }
    }
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            scroll_speed: 10.0,
            sequence: vec![
                Direction::FromLeft,
                Direction::IntoRight,
                Direction::FromRight,
                Direction::IntoLeft,
            ],
            hold_seconds: 0.75,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            heavy_dither: DEFAULT_HEAVY_DITHER.to_string(),
            light_dither: DEFAULT_LIGHT_DITHER.to_string(),
            marker: DEFAULT_MARKER.to_string(),
        }
    }
}

impl SceneConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_toml(&source)
    }

    /// Loads the config from `$PIXELROOM_CONFIG` or `pixelroom.toml`.
    ///
    /// Nothing is logged here since this runs before the subscriber exists; the
    /// caller reports the returned [`ConfigSource`].
    pub fn load() -> Result<(Self, ConfigSource), ConfigError> {
        Self::load_from(
            env::var_os(CONFIG_ENV).map(PathBuf::from),
            Path::new(DEFAULT_CONFIG_FILE),
        )
    }

    /// Loads `explicit` if given, else `fallback` if it exists, else defaults.
    ///
    /// An explicitly named file that cannot be read is an error.
    pub fn load_from(
        explicit: Option<PathBuf>,
        fallback: &Path,
    ) -> Result<(Self, ConfigSource), ConfigError> {
        if let Some(path) = explicit {
            let config = Self::from_file(&path)?;
            return Ok((config, ConfigSource::Env(path)));
        }
        if fallback.exists() {
            let config = Self::from_file(fallback)?;
            Ok((config, ConfigSource::File(fallback.to_path_buf())))
        } else {
            Ok((Self::default(), ConfigSource::Defaults))
        }
    }

    /// Checks values the host cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let speed = self.transition.scroll_speed;
        if !(speed.is_finite() && speed > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "transition.scroll_speed must be positive, got {speed}"
            )));
        }
        if self.transition.sequence.is_empty() {
            return Err(ConfigError::Invalid(
                "transition.sequence must name at least one direction".into(),
            ));
        }
        let hold = self.transition.hold_seconds;
        if !(hold.is_finite() && hold >= 0.0) {
            return Err(ConfigError::Invalid(
                "transition.hold_seconds must not be negative".into(),
            ));
        }
        if self.scale.reference_width == 0 || self.scale.reference_height == 0 {
            return Err(ConfigError::Invalid(
                "scale reference size must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Window size left for the scene after padding.
    pub fn available_area(&self, window_width: u32, window_height: u32) -> (u32, u32) {
        (
            window_width.saturating_sub(self.scale.horizontal_padding),
            window_height.saturating_sub(self.scale.vertical_padding),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Defaults are valid and point at the generated assets.
    #[test]
    fn test_defaults_validate() {
        let config = SceneConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.assets.heavy_dither.ends_with("dither_heavy.png"));
        assert!(Path::new(&config.assets.marker).exists());
    }

    /// Partial documents keep defaults for missing fields.
    #[test]
    fn test_partial_toml() {
        let config = SceneConfig::from_toml(
            r#"
            log_filter = "pixelroom=debug"

            [window]
            title = "demo"

            [transition]
            scroll_speed = 4.5
            sequence = ["intoLeft", "fromRight"]
            "#,
        )
        .expect("valid config");

        assert_eq!(config.window.title, "demo");
        assert_eq!(config.window.width, 1360);
        assert_eq!(config.transition.scroll_speed, 4.5);
        assert_eq!(
            config.transition.sequence,
            vec![Direction::IntoLeft, Direction::FromRight]
        );
        assert_eq!(config.scale, ScaleConfig::default());
        assert_eq!(config.log_filter, "pixelroom=debug");
    }

    /// Unusable values are rejected.
    #[test]
    fn test_validation_errors() {
        for source in [
            "[transition]\nscroll_speed = 0.0",
            "[transition]\nscroll_speed = -1.0",
            "[transition]\nsequence = []",
            "[transition]\nhold_seconds = -0.5",
            "[scale]\nreference_width = 0",
        ] {
            assert!(
                matches!(SceneConfig::from_toml(source), Err(ConfigError::Invalid(_))),
                "accepted {source:?}"
            );
        }
    }

    /// Malformed TOML and unknown directions are parse errors.
    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            SceneConfig::from_toml("[window\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SceneConfig::from_toml("[transition]\nsequence = [\"sideways\"]"),
            Err(ConfigError::Parse(_))
        ));
    }

    /// Missing files surface as I/O errors.
    #[test]
    fn test_missing_file() {
        let result = SceneConfig::from_file(Path::new("/no/such/pixelroom.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    /// An explicit path wins over the fallback; a missing fallback means defaults.
    #[test]
    fn test_load_from_sources() {
        let path = env::temp_dir().join(format!("pixelroom-config-{}.toml", std::process::id()));
        fs::write(&path, "[transition]\nscroll_speed = 3.5\n").expect("write config");

        let missing = Path::new("/no/such/pixelroom.toml");
        let (config, source) =
            SceneConfig::load_from(Some(path.clone()), missing).expect("explicit config");
        assert_eq!(config.transition.scroll_speed, 3.5);
        assert_eq!(source, ConfigSource::Env(path.clone()));

        let (config, source) = SceneConfig::load_from(None, &path).expect("fallback config");
        assert_eq!(config.transition.scroll_speed, 3.5);
        assert_eq!(source, ConfigSource::File(path.clone()));
        fs::remove_file(&path).expect("remove config");

        let (config, source) =
            SceneConfig::load_from(None, missing).expect("defaults");
        assert_eq!(config, SceneConfig::default());
        assert_eq!(source, ConfigSource::Defaults);
        assert_eq!(source.to_string(), "defaults");

        let unreadable = SceneConfig::load_from(Some(missing.to_path_buf()), &path);
        assert!(matches!(unreadable, Err(ConfigError::Io(_))));
    }

    /// Padding is subtracted without underflow.
    #[test]
    fn test_available_area() {
        let config = SceneConfig::default();
        assert_eq!(config.available_area(1344, 916), (1280, 720));
        assert_eq!(config.available_area(10, 10), (0, 0));
    }
}
