//! camconfig library
//!
//! Detects the camera add-on boards and sensor modules installed for a Jetson
//! carrier board, lets the operator pick a configuration, and writes the
//! matching device-tree overlays into the boot configuration.

pub mod app;
pub mod apply;
pub mod bootconf;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod devicetree;
pub mod error;
pub mod hardware;
pub mod headless;
pub mod overlay;
pub mod paging;
pub mod sanity;
pub mod selection;
pub mod theme;
pub mod topology;
pub mod types;
pub mod ui;
pub mod wizard;

// Re-export main types for convenience
pub use app::{App, AppExit};
pub use apply::{ApplyContext, CommitReport};
pub use config::Settings;
pub use error::{CamConfigError, Result};
pub use hardware::{HardwareScan, OverlayDirectoryScan};
pub use selection::{PortSelection, Selection};
pub use topology::Topology;
pub use types::{AddOnBoardId, ConnectorKind, LinkBooster};
pub use wizard::{Key, MenuView, Wizard, WizardOutcome, WizardState};
