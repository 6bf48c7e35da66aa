//! Overlay file names for a selection
//!
//! Every overlay shipped for the add-on boards follows one naming scheme per
//! connector family:
//!
//! ```text
//! <template>fpa_<board>-overlay.dtbo
//! <template><sensor>-<port>-<lanes>lane-overlay.dtbo
//! <template><port>-gmsl-overlay.dtbo
//! ```
//!
//! Deriving the names is pure. Checking them against the overlay directory is
//! a separate step so the caller decides whether a missing per-port overlay
//! drops the port or aborts the whole commit.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use tracing::warn;

use crate::error::{CamConfigError, Result};
use crate::selection::Selection;
use crate::types::{AddOnBoardId, ConnectorKind};

/// What an overlay configures.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OverlayRole {
    Board,
    Sensor(String),
    LinkBooster(String),
}

impl OverlayRole {
    /// Port the overlay belongs to, `None` for the board overlay.
    pub fn port(&self) -> Option<&str> {
        match self {
            Self::Board => None,
            Self::Sensor(port) | Self::LinkBooster(port) => Some(port),
        }
    }
}

/// One derived overlay file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverlayName {
    pub name: String,
    pub role: OverlayRole,
}

impl fmt::Display for OverlayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// File name of the add-on board overlay.
///
/// The id is lower-cased, its periods are dropped and every `/` becomes `_`,
/// so `1.2` maps to `fpa_12` and `1.2/3.4` to `fpa_12_34`.
pub fn board_overlay_name(connector: ConnectorKind, board: &AddOnBoardId) -> String {
    let id = board
        .as_str()
        .to_lowercase()
        .replace('.', "")
        .replace('/', "_");
    format!("{}fpa_{}-overlay.dtbo", connector.overlay_template(), id)
}

pub fn sensor_overlay_name(connector: ConnectorKind, sensor: &str, port: &str, lanes: u32) -> String {
    format!(
        "{}{}-{}-{}lane-overlay.dtbo",
        connector.overlay_template(),
        sensor.to_lowercase(),
        port.to_lowercase(),
        lanes
    )
}

pub fn link_booster_overlay_name(connector: ConnectorKind, port: &str) -> String {
    format!(
        "{}{}-gmsl-overlay.dtbo",
        connector.overlay_template(),
        port.to_lowercase()
    )
}

/// Overlays for `selection`: the board overlay first, then per port (in port
/// order) the sensor overlay and, when requested, the link-booster overlay.
pub fn derive(selection: &Selection, connector: ConnectorKind) -> Vec<OverlayName> {
    let mut names = vec![OverlayName {
        name: board_overlay_name(connector, selection.board()),
        role: OverlayRole::Board,
    }];

    for (port, chosen) in selection.ports() {
        names.push(OverlayName {
            name: sensor_overlay_name(connector, &chosen.sensor, port, chosen.lanes),
            role: OverlayRole::Sensor(port.to_string()),
        });
        if chosen.link_booster.is_present() {
            names.push(OverlayName {
                name: link_booster_overlay_name(connector, port),
                role: OverlayRole::LinkBooster(port.to_string()),
            });
        }
    }
    names
}

/// What to do when a per-port overlay is not installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingOverlayPolicy {
    /// Drop the whole port and keep going
    SkipPort,
    /// Fail the commit
    Abort,
}

/// A port left out of the boot configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPort {
    pub port: String,
    pub missing: Vec<String>,
}

impl SkippedPort {
    /// Warning shown to the operator.
    pub fn message(&self) -> String {
        format!(
            "{} not found; {} will not be configured",
            self.missing.join(", "),
            self.port
        )
    }
}

/// Overlays that passed the presence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedOverlays {
    pub names: Vec<OverlayName>,
    pub skipped: Vec<SkippedPort>,
}

/// Check derived names against the installed overlays.
///
/// # Errors
///
/// `BoardOverlayMissing` whatever the policy; `OverlayMissing` for the first
/// missing per-port overlay under [`MissingOverlayPolicy::Abort`].
pub fn verify(
    names: Vec<OverlayName>,
    existing: &BTreeSet<String>,
    policy: MissingOverlayPolicy,
    dir: &Path,
) -> Result<VerifiedOverlays> {
    let mut skipped: Vec<SkippedPort> = Vec::new();

    for overlay in names.iter().filter(|o| !existing.contains(&o.name)) {
        match (&overlay.role, policy) {
            (OverlayRole::Board, _) => {
                return Err(CamConfigError::BoardOverlayMissing {
                    name: overlay.name.clone(),
                    dir: dir.to_path_buf(),
                });
            }
            (_, MissingOverlayPolicy::Abort) => {
                return Err(CamConfigError::OverlayMissing {
                    name: overlay.name.clone(),
                    dir: dir.to_path_buf(),
                });
            }
            (role, MissingOverlayPolicy::SkipPort) => {
                let port = role.port().unwrap_or_default();
                match skipped.iter_mut().find(|s| s.port == port) {
                    Some(entry) => entry.missing.push(overlay.name.clone()),
                    None => skipped.push(SkippedPort {
                        port: port.to_string(),
                        missing: vec![overlay.name.clone()],
                    }),
                }
            }
        }
    }

    for port in &skipped {
        warn!("{}", port.message());
    }

    let names = names
        .into_iter()
        .filter(|o| match o.role.port() {
            Some(port) => !skipped.iter().any(|s| s.port == port),
            None => true,
        })
        .collect();

    Ok(VerifiedOverlays { names, skipped })
}
