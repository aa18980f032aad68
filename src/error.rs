//! Error types for display operations

use std::io;
use thiserror::Error;

use crate::app::ConfigError;

/// Display error type
#[derive(Error, Debug)]
pub enum Error {
    /// The native windowing or event subsystem could not be initialized
    #[error("Failed to initialize display subsystem: {0}")]
    Subsystem(String),

    /// Window creation failed
    #[error("Failed to create window: {0}")]
    Window(String),

    /// Presentation surface or renderer setup failed
    #[error("Failed to create renderer: {0}")]
    Renderer(String),

    /// Font could not be loaded
    #[error("Failed to load font: {0}")]
    Font(String),

    /// Startup configuration was missing or invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// start() called on a running backend
    #[error("Backend already started")]
    AlreadyStarted,
}

/// Result type for display operations
pub type Result<T> = std::result::Result<T, Error>;
