//! Configuration for the display backends
//!
//! Backends never read files or the environment themselves. At start they
//! query a [`ConfigSource`] by key name. [`Config`] is the stock source:
//! - XDG-compliant config file location
//! - Environment variable overrides (`GRINDER_*`)
//! - CLI argument overrides
//! - Precedence: CLI > env > file > defaults
//! - Validation with the offending field named

use clap::Args;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file: {0}")]
    Io(#[from] io::Error),

    /// Config file is not valid TOML for this schema
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required key has no value
    #[error("Missing config key '{key}'")]
    Missing { key: String },

    /// A key holds a value of the wrong kind
    #[error("Config key '{key}' must be {expected}")]
    WrongType { key: String, expected: &'static str },

    /// A value is out of range or malformed
    #[error("Config error in '{field}': {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Startup parameters, looked up by key name
pub trait ConfigSource {
    /// Integer value of `key`
    fn int(&self, key: &str) -> Result<i64, ConfigError>;

    /// String value of `key`
    fn string(&self, key: &str) -> Result<String, ConfigError>;

    /// Integer value of `key`, or `default` when the key is absent
    fn int_or(&self, key: &str, default: i64) -> Result<i64, ConfigError> {
        match self.int(key) {
            Err(ConfigError::Missing { .. }) => Ok(default),
            other => other,
        }
    }

    /// String value of `key`, or `default` when the key is absent
    fn string_or(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        match self.string(key) {
            Err(ConfigError::Missing { .. }) => Ok(default.to_string()),
            other => other,
        }
    }
}

/// CLI arguments shared by the binaries
#[derive(Args, Debug, Clone, Default)]
pub struct CliArgs {
    /// Path to custom config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to a monospace TTF/OTF font
    #[arg(long, value_name = "FILE")]
    pub font_path: Option<PathBuf>,

    /// Font size in pixels
    #[arg(long, value_name = "PX")]
    pub font_size: Option<u32>,

    /// Window width in pixels
    #[arg(long, value_name = "PX")]
    pub width: Option<u32>,

    /// Window height in pixels
    #[arg(long, value_name = "PX")]
    pub height: Option<u32>,

    /// Screen buffer columns
    #[arg(long, value_name = "COLS")]
    pub columns: Option<u32>,

    /// Screen buffer rows
    #[arg(long, value_name = "ROWS")]
    pub rows: Option<u32>,
}

/// Window and screen settings (the `[gui]` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiConfig {
    /// Window width in pixels
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in pixels
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    /// Font file (None = search the usual system locations)
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    /// Font size in pixels
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// Screen buffer columns (None = derived from the window width)
    #[serde(default)]
    pub columns: Option<u32>,
    /// Screen buffer rows (None = derived from the window height)
    #[serde(default)]
    pub rows: Option<u32>,
    /// Foreground color (hex)
    #[serde(default = "default_foreground")]
    pub foreground: String,
    /// Background color (hex)
    #[serde(default = "default_background")]
    pub background: String,
    /// Window title
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_window_width() -> u32 {
    800
}
fn default_window_height() -> u32 {
    600
}
fn default_font_size() -> u32 {
    16
}
fn default_foreground() -> String {
    "#d4d4d4".to_string()
}
fn default_background() -> String {
    "#1e1e1e".to_string()
}
fn default_title() -> String {
    "grinder".to_string()
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            font_path: None,
            font_size: default_font_size(),
            columns: None,
            rows: None,
            foreground: default_foreground(),
            background: default_background(),
            title: default_title(),
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gui: GuiConfig,
}

/// Largest accepted window edge in pixels
const MAX_WINDOW_EDGE: u32 = 16384;
/// Largest accepted buffer edge in cells
pub const MAX_GRID_EDGE: u32 = 4096;

impl Config {
    /// Load configuration with full precedence:
    /// CLI args > environment variables > config file > defaults
    pub fn load_with_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            // An explicitly named file must load.
            Some(path) => Self::load_from_file(path)?,
            None => Self::default_config_path()
                .filter(|path| path.exists())
                .and_then(|path| match Self::load_from_file(&path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {:?}: {}", path, e);
                        None
                    }
                })
                .unwrap_or_default(),
        };

        config.apply_env(|name| env::var(name).ok());
        config.apply_cli_args(args);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `GRINDER_*` variables looked up through `var`
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let gui = &mut self.gui;
        let number = |name: &str| var(name).and_then(|v| v.trim().parse::<u32>().ok());

        if let Some(v) = number("GRINDER_WINDOW_WIDTH") {
            gui.window_width = v;
        }
        if let Some(v) = number("GRINDER_WINDOW_HEIGHT") {
            gui.window_height = v;
        }
        if let Some(v) = number("GRINDER_FONT_SIZE") {
            gui.font_size = v;
        }
        if let Some(v) = number("GRINDER_COLUMNS") {
            gui.columns = Some(v);
        }
        if let Some(v) = number("GRINDER_ROWS") {
            gui.rows = Some(v);
        }
        if let Some(v) = var("GRINDER_FONT_PATH") {
            gui.font_path = Some(PathBuf::from(v));
        }
    }

    /// Apply CLI arguments to config
    fn apply_cli_args(&mut self, args: &CliArgs) {
        let gui = &mut self.gui;
        if let Some(path) = &args.font_path {
            gui.font_path = Some(path.clone());
        }
        if let Some(size) = args.font_size {
            gui.font_size = size;
        }
        if let Some(width) = args.width {
            gui.window_width = width;
        }
        if let Some(height) = args.height {
            gui.window_height = height;
        }
        if args.columns.is_some() {
            gui.columns = args.columns;
        }
        if args.rows.is_some() {
            gui.rows = args.rows;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let gui = &self.gui;

        check_range("gui.window_width", gui.window_width, 1, MAX_WINDOW_EDGE)?;
        check_range("gui.window_height", gui.window_height, 1, MAX_WINDOW_EDGE)?;
        check_range("gui.font_size", gui.font_size, 4, 200)?;
        if let Some(columns) = gui.columns {
            check_range("gui.columns", columns, 1, MAX_GRID_EDGE)?;
        }
        if let Some(rows) = gui.rows {
            check_range("gui.rows", rows, 1, MAX_GRID_EDGE)?;
        }

        for (field, color) in [
            ("gui.foreground", &gui.foreground),
            ("gui.background", &gui.background),
        ] {
            if parse_hex(color).is_none() {
                return Err(ConfigError::invalid(
                    field,
                    format!("Invalid hex color '{}'. Expected format: #RRGGBB", color),
                ));
            }
        }

        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("grinder").join("config.toml"))
    }
}

fn check_range(field: &str, value: u32, min: u32, max: u32) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::invalid(
            field,
            format!("must be between {} and {}, got {}", min, max, value),
        ));
    }
    Ok(())
}

impl GuiConfig {
    /// Get foreground color as RGB
    pub fn foreground_rgb(&self) -> (u8, u8, u8) {
        parse_hex(&self.foreground).unwrap_or((212, 212, 212))
    }

    /// Get background color as RGB
    pub fn background_rgb(&self) -> (u8, u8, u8) {
        parse_hex(&self.background).unwrap_or((30, 30, 30))
    }
}

/// Parse `#RRGGBB` (the `#` is optional)
pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

impl ConfigSource for Config {
    fn int(&self, key: &str) -> Result<i64, ConfigError> {
        let gui = &self.gui;
        let missing = || ConfigError::Missing {
            key: key.to_string(),
        };
        let value = match key.strip_prefix("gui.").unwrap_or(key) {
            "window_width" => gui.window_width,
            "window_height" => gui.window_height,
            "font_size" => gui.font_size,
            "columns" => gui.columns.ok_or_else(missing)?,
            "rows" => gui.rows.ok_or_else(missing)?,
            "font_path" | "foreground" | "background" | "title" => {
                return Err(ConfigError::WrongType {
                    key: key.to_string(),
                    expected: "an integer",
                })
            }
            _ => return Err(missing()),
        };
        Ok(i64::from(value))
    }

    fn string(&self, key: &str) -> Result<String, ConfigError> {
        let gui = &self.gui;
        match key.strip_prefix("gui.").unwrap_or(key) {
            "font_path" => gui
                .font_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned())
                .ok_or_else(|| ConfigError::Missing {
                    key: key.to_string(),
                }),
            "foreground" => Ok(gui.foreground.clone()),
            "background" => Ok(gui.background.clone()),
            "title" => Ok(gui.title.clone()),
            "window_width" | "window_height" | "font_size" | "columns" | "rows" => {
                Err(ConfigError::WrongType {
                    key: key.to_string(),
                    expected: "a string",
                })
            }
            _ => Err(ConfigError::Missing {
                key: key.to_string(),
            }),
        }
    }
}
