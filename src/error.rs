//! Error handling module for camconfig
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Fatal conditions (unknown connector, missing board overlay, broken boot
//! configuration) are variants here; per-port overlay problems are not errors
//! and are reported through `overlay::SkippedPort` instead.

use std::path::PathBuf;
use thiserror::Error;

use crate::paging::PagingError;
use crate::wizard::WizardError;

/// Main error type for camconfig
#[derive(Error, Debug)]
pub enum CamConfigError {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings errors (loading, parsing, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The active camera connector could not be determined
    #[error("Unknown board or no overlays found in {}", .0.display())]
    UnknownConnector(PathBuf),

    /// No add-on board descriptor was reported by the scan
    #[error("No FPA overlay detected; cannot continue")]
    NoAddOnBoard,

    /// An add-on board was detected but no camera port belongs to it
    #[error("FPA-{0} has no camera ports; cannot continue")]
    EmptyBoard(String),

    /// The mandatory add-on board overlay is not installed
    #[error("{name} not found in {}; cannot continue", .dir.display())]
    BoardOverlayMissing { name: String, dir: PathBuf },

    /// A per-port overlay is missing and the caller asked for strict checking
    #[error("{name} not found in {}", .dir.display())]
    OverlayMissing { name: String, dir: PathBuf },

    /// The boot configuration file cannot be edited safely
    #[error("Boot configuration error: {0}")]
    BootConfig(String),

    /// Flattened device tree decoding errors
    #[error("Device tree error: {0}")]
    DeviceTree(String),

    /// Validation errors (command line arguments, settings values)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Terminal/UI errors
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Menu layout errors
    #[error(transparent)]
    Paging(#[from] PagingError),

    /// Invalid wizard transitions
    #[error(transparent)]
    Wizard(#[from] WizardError),
}

/// Result type alias for camconfig operations
pub type Result<T> = std::result::Result<T, CamConfigError>;

// Convenient error constructors
impl CamConfigError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a boot configuration error
    pub fn boot_config(msg: impl Into<String>) -> Self {
        Self::BootConfig(msg.into())
    }

    /// Create a device tree error
    pub fn device_tree(msg: impl Into<String>) -> Self {
        Self::DeviceTree(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a terminal error
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }
}
