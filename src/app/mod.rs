//! Application glue module
//!
//! Configuration sources and CLI arguments for the backends and binaries.

mod config;

pub use config::{
    parse_hex, CliArgs, Config, ConfigError, ConfigSource, GuiConfig, MAX_GRID_EDGE,
};
