//src/config.rs
use comfy_table::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_CONFIG_DIR: &str = "kraftlog";
const CONFIG_ENV_VAR: &str = "KRAFTLOG_CONFIG_DIR"; // Environment variable name

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not determine configuration directory.")]
    CannotDetermineConfigDir,
    #[error("I/O error accessing config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file (TOML): {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to serialize config data (TOML): {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Invalid color name: {0}")]
    InvalidColor(String),
}

// Define standard colors using strum for easy iteration/parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum StandardColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    DarkGrey,
    DarkRed,
    DarkGreen,
    DarkYellow,
    DarkBlue,
    DarkMagenta,
    DarkCyan,
    Grey,
}

// Helper to convert our enum to comfy_table::Color
impl From<StandardColor> for Color {
    fn from(value: StandardColor) -> Self {
        match value {
            StandardColor::Black => Self::Black,
            StandardColor::Red => Self::Red,
            StandardColor::Green => Self::Green,
            StandardColor::Yellow => Self::Yellow,
            StandardColor::Blue => Self::Blue,
            StandardColor::Magenta => Self::Magenta,
            StandardColor::Cyan => Self::Cyan,
            StandardColor::White => Self::White,
            StandardColor::DarkGrey => Self::DarkGrey,
            StandardColor::DarkRed => Self::DarkRed,
            StandardColor::DarkGreen => Self::DarkGreen,
            StandardColor::DarkYellow => Self::DarkYellow,
            StandardColor::DarkBlue => Self::DarkBlue,
            StandardColor::DarkMagenta => Self::DarkMagenta,
            StandardColor::DarkCyan => Self::DarkCyan,
            StandardColor::Grey => Self::Grey,
        }
    }
}

/// Parses a color name (case-insensitive) into a `StandardColor`.
/// # Errors
/// Returns `Error::InvalidColor` for unknown names.
pub fn parse_color(color_str: &str) -> Result<StandardColor, Error> {
    for color in StandardColor::iter() {
        if format!("{color:?}").eq_ignore_ascii_case(color_str) {
            return Ok(color);
        }
    }
    Err(Error::InvalidColor(color_str.to_string()))
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)] // Ensure defaults are used if fields are missing
pub struct Theme {
    pub header_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            header_color: "Green".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)] // Ensure defaults are used if fields are missing
pub struct Config {
    /// Credential for the AI coach. `None` means the feature is disabled,
    /// which is a valid state rather than an error.
    pub gemini_api_key: Option<String>,

    // Theming
    pub theme: Theme,
}

/// Determines the path to the configuration file.
/// Exposed at crate root as `get_config_path_util`.
/// # Errors
/// Returns `Error` variants if the directory cannot be determined or created.
pub fn get_config_path() -> Result<PathBuf, Error> {
    let config_dir_override = std::env::var(CONFIG_ENV_VAR).ok();

    let config_dir_path = if let Some(path_str) = config_dir_override {
        let path = PathBuf::from(path_str);
        if !path.is_dir() {
            tracing::warn!(
                "{} points to '{}', which is not a directory. Trying to create it.",
                CONFIG_ENV_VAR,
                path.display()
            );
            fs::create_dir_all(&path)?;
        }
        path
    } else {
        let base_config_dir = dirs::config_dir().ok_or(Error::CannotDetermineConfigDir)?;
        base_config_dir.join(APP_CONFIG_DIR)
    };

    if !config_dir_path.exists() {
        fs::create_dir_all(&config_dir_path)?;
    }

    Ok(config_dir_path.join(CONFIG_FILE_NAME))
}

/// Loads the configuration from the TOML file at the given path, writing a
/// default config on first run.
/// Exposed at crate root as `load_config_util`.
/// # Errors
/// Returns `Error` variants on I/O or parse failure.
pub fn load(config_path: &Path) -> Result<Config, Error> {
    if config_path.exists() {
        let config_content = fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&config_content).map_err(Error::TomlParse)?;
        Ok(config)
    } else {
        let default_config = Config::default();
        save(config_path, &default_config)?;
        Ok(default_config)
    }
}

/// Saves the configuration to the TOML file.
/// Exposed at crate root as `save_config_util`.
/// # Errors
/// Returns `Error` variants on I/O or serialization failure.
pub fn save(config_path: &Path, config: &Config) -> Result<(), Error> {
    if let Some(parent_dir) = config_path.parent() {
        if !parent_dir.exists() {
            fs::create_dir_all(parent_dir)?;
        }
    }
    let config_content = toml::to_string_pretty(config).map_err(Error::TomlSerialize)?;
    fs::write(config_path, config_content)?;
    Ok(())
}
