//! Hardware environment detection
//!
//! Finds the camera connector of the running board and the add-on board
//! descriptors by reading the installed overlays directly. No external tools
//! are called.
//!
//! # Design
//!
//! - **Trait seam**: the wizard and the commit pipeline only see
//!   [`HardwareScan`], so tests drive them with a fixed descriptor list.
//! - **Compatible filtering**: overlays built for another board are ignored.
//!   When the board's compatible strings cannot be read every overlay is kept.
//! - **Skip, don't fail**: an unreadable or malformed `.dtbo` is logged and
//!   skipped.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::devicetree::{OverlayInfo, string_list};
use crate::error::{CamConfigError, Result};
use crate::types::ConnectorKind;

/// Source of connector, descriptors and installed overlays.
pub trait HardwareScan {
    /// Connector family of the running board.
    fn active_connector(&self) -> Result<ConnectorKind>;

    /// Descriptor strings (`overlay-name` values) for the active connector.
    fn descriptors(&self) -> Result<Vec<String>>;

    /// Subset of `names` installed in the overlay directory.
    fn existing_overlays(&self, names: &[String]) -> Result<BTreeSet<String>>;
}

/// One decoded overlay file.
#[derive(Debug, Clone)]
pub struct ScannedOverlay {
    pub file_name: String,
    pub info: OverlayInfo,
}

/// Scan of the overlay directory.
#[derive(Debug, Clone)]
pub struct OverlayDirectoryScan {
    dir: PathBuf,
    overlays: Vec<ScannedOverlay>,
    connector: Option<ConnectorKind>,
}

impl OverlayDirectoryScan {
    /// Read every `*.dtbo` in the configured overlay directory.
    ///
    /// # Errors
    ///
    /// I/O error when the overlay directory cannot be listed.
    pub fn load(settings: &Settings) -> Result<Self> {
        let board = board_compatible(&settings.compatible_file);
        let overlays = read_overlays(&settings.overlay_dir, board.as_deref())?;
        Ok(Self::from_overlays(settings.overlay_dir.clone(), overlays))
    }

    /// Build a scan from already decoded overlays.
    pub fn from_overlays(dir: PathBuf, overlays: Vec<ScannedOverlay>) -> Self {
        // Wide wins when overlays for both connectors are installed
        let connector = ConnectorKind::iter().find(|kind| {
            overlays
                .iter()
                .any(|o| o.info.header_name.as_deref() == Some(kind.header_name()))
        });
        info!(
            "Overlay scan of {}: {} compatible overlay(s), connector={:?}",
            dir.display(),
            overlays.len(),
            connector
        );
        Self {
            dir,
            overlays,
            connector,
        }
    }

    pub fn overlays(&self) -> &[ScannedOverlay] {
        &self.overlays
    }
}

impl HardwareScan for OverlayDirectoryScan {
    fn active_connector(&self) -> Result<ConnectorKind> {
        self.connector
            .ok_or_else(|| CamConfigError::UnknownConnector(self.dir.clone()))
    }

    fn descriptors(&self) -> Result<Vec<String>> {
        let header = self.active_connector()?.header_name();
        Ok(self
            .overlays
            .iter()
            .filter(|o| o.info.header_name.as_deref() == Some(header))
            .filter_map(|o| o.info.overlay_name.clone())
            .collect())
    }

    fn existing_overlays(&self, names: &[String]) -> Result<BTreeSet<String>> {
        Ok(names
            .iter()
            .filter(|name| self.dir.join(name).is_file())
            .cloned()
            .collect())
    }
}

/// Compatible strings of the running board, `None` when unreadable.
fn board_compatible(path: &Path) -> Option<Vec<String>> {
    match fs::read(path) {
        Ok(bytes) => Some(string_list(&bytes)),
        Err(e) => {
            warn!(
                "Cannot read board compatible strings from {}: {}; not filtering overlays",
                path.display(),
                e
            );
            None
        }
    }
}

fn read_overlays(dir: &Path, board: Option<&[String]>) -> Result<Vec<ScannedOverlay>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "dtbo") && path.is_file())
        .collect();
    paths.sort();

    let mut overlays = Vec::new();
    for path in paths {
        let info = match fs::read(&path)
            .map_err(CamConfigError::from)
            .and_then(|bytes| OverlayInfo::from_bytes(&bytes))
        {
            Ok(info) => info,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        if let Some(board) = board {
            if !info.is_compatible_with(board) {
                debug!("Skipping {}: not compatible with this board", path.display());
                continue;
            }
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        overlays.push(ScannedOverlay { file_name, info });
    }
    Ok(overlays)
}

/// Restart the system with the configured reboot command.
pub fn reboot(settings: &Settings) -> Result<()> {
    let (program, args) = settings
        .reboot_command
        .split_first()
        .ok_or_else(|| CamConfigError::config("reboot command is empty"))?;

    info!("Rebooting: {}", settings.reboot_command.join(" "));
    let status = Command::new(program).args(args).status()?;
    if !status.success() {
        return Err(CamConfigError::config(format!(
            "{program} exited with {status}"
        )));
    }
    Ok(())
}
