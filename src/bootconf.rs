//! extlinux.conf editing
//!
//! The boot configuration is edited in memory and written back once. Two
//! marker lines matter:
//!
//! ```text
//! LABEL primary
//!       MENU LABEL primary kernel
//!       LINUX /boot/Image
//!       INITRD /boot/initrd
//!       FDT /boot/dtb/<base dtb>
//!       OVERLAYS /boot/framos/dtbo/<board>,/boot/framos/dtbo/<sensor>,...
//! ```
//!
//! `FDT` is added after the primary kernel block when missing, `OVERLAYS`
//! right after the first `FDT` line. Every `OVERLAYS` line is then rewritten
//! with the verified overlay list. Editing is idempotent: applying the same
//! list twice yields the same text.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{CamConfigError, Result};

const PRIMARY_KERNEL_LABEL: &str = "MENU LABEL primary kernel";
const FDT_MARKER: &str = "FDT";
const OVERLAYS_MARKER: &str = "OVERLAYS";
/// Lines after the label that still belong to the primary kernel block.
const PRIMARY_BLOCK_TAIL: usize = 2;
const ENTRY_INDENT: &str = "      ";

/// In-memory boot configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootConfig {
    lines: Vec<String>,
    trailing_newline: bool,
}

impl BootConfig {
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
            trailing_newline: text.ends_with('\n'),
        }
    }

    pub fn render(&self) -> String {
        let mut text = self.lines.join("\n");
        if self.trailing_newline && !self.lines.is_empty() {
            text.push('\n');
        }
        text
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    fn marker_positions<'a>(&'a self, marker: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.lines
            .iter()
            .enumerate()
            .filter(move |(_, line)| is_marker(line, marker))
            .map(|(index, _)| index)
    }

    /// Whether a non-comment line starts with `marker`.
    pub fn has_marker(&self, marker: &str) -> bool {
        self.marker_positions(marker).next().is_some()
    }

    /// Add `FDT <path>` after the primary kernel block unless an FDT line exists.
    ///
    /// Returns whether a line was inserted.
    ///
    /// # Errors
    ///
    /// `BootConfig` when there is no primary kernel label to anchor on.
    pub fn ensure_device_tree_base(&mut self, path: &Path) -> Result<bool> {
        if self.has_marker(FDT_MARKER) {
            return Ok(false);
        }
        let label = self
            .lines
            .iter()
            .position(|line| line.contains(PRIMARY_KERNEL_LABEL))
            .ok_or_else(|| {
                CamConfigError::boot_config(format!(
                    "no \"{PRIMARY_KERNEL_LABEL}\" entry to add the FDT line to"
                ))
            })?;

        let at = (label + PRIMARY_BLOCK_TAIL + 1).min(self.lines.len());
        self.lines
            .insert(at, format!("{ENTRY_INDENT}{FDT_MARKER} {}", path.display()));
        debug!("Inserted FDT entry at line {}", at + 1);
        Ok(true)
    }

    /// Add an empty `OVERLAYS` line after the first FDT line unless one exists.
    ///
    /// Returns whether a line was inserted.
    pub fn ensure_overlay_list(&mut self) -> Result<bool> {
        if self.has_marker(OVERLAYS_MARKER) {
            return Ok(false);
        }
        let fdt = self.marker_positions(FDT_MARKER).next().ok_or_else(|| {
            CamConfigError::boot_config("no FDT entry to add the OVERLAYS line to")
        })?;
        self.lines
            .insert(fdt + 1, format!("{ENTRY_INDENT}{OVERLAYS_MARKER}"));
        debug!("Inserted OVERLAYS entry at line {}", fdt + 2);
        Ok(true)
    }

    /// Rewrite every OVERLAYS line with `paths`, keeping its indentation.
    ///
    /// Returns the number of rewritten lines.
    pub fn set_overlays<S: AsRef<str>>(&mut self, paths: &[S]) -> usize {
        let list = paths
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(",");
        let positions: Vec<usize> = self.marker_positions(OVERLAYS_MARKER).collect();
        for &index in &positions {
            let line = &mut self.lines[index];
            let indent_len = line.len() - line.trim_start().len();
            let indent = line[..indent_len].to_string();
            *line = format!("{indent}{OVERLAYS_MARKER} {list}");
        }
        positions.len()
    }
}

fn is_marker(line: &str, marker: &str) -> bool {
    let trimmed = line.trim_start();
    !trimmed.starts_with('#') && trimmed.split_whitespace().next() == Some(marker)
}

/// Point the boot configuration at `overlay_paths`.
///
/// `base_dtb` is only called when the FDT line is missing.
pub fn apply_overlays<F, S>(text: &str, base_dtb: F, overlay_paths: &[S]) -> Result<String>
where
    F: FnOnce() -> Result<PathBuf>,
    S: AsRef<str>,
{
    let mut config = BootConfig::parse(text);
    if !config.has_marker(FDT_MARKER) {
        let dtb = base_dtb()?;
        config.ensure_device_tree_base(&dtb)?;
    }
    config.ensure_overlay_list()?;
    config.set_overlays(overlay_paths);
    Ok(config.render())
}

/// First regular file (by name) in the DTB directory.
pub fn base_dtb_path(dir: &Path) -> Result<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files.into_iter().next().ok_or_else(|| {
        CamConfigError::boot_config(format!("no base device tree found in {}", dir.display()))
    })
}

/// Replace `path` with `text` through a temporary file in the same directory.
///
/// Permissions of the existing file are kept.
pub fn write_atomic(path: &Path, text: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(text.as_bytes())?;
    tmp.as_file().sync_all()?;
    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), metadata.permissions())?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    info!("Wrote {}", path.display());
    Ok(())
}
