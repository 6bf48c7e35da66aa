//! Runtime settings
//!
//! Every path the tool touches is a field here, with the Jetson defaults.
//! Settings are passed explicitly to the components that need them; nothing
//! reads well-known paths on its own.
//!
//! A JSON file can override any subset of fields:
//!
//! ```json
//! { "boot_config": "/tmp/extlinux.conf", "page_capacity": 20 }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::wizard::MIN_PAGE_CAPACITY;

/// Tool settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory holding the add-on board overlays
    pub overlay_dir: PathBuf,
    /// Boot loader configuration edited on commit
    pub boot_config: PathBuf,
    /// Directory of base device trees; the first file is the FDT fallback
    pub dtb_dir: PathBuf,
    /// NUL-separated compatible strings of the running board
    pub compatible_file: PathBuf,
    /// Rows per menu page, footer and page caption included
    pub page_capacity: usize,
    /// Command and arguments used to reboot
    pub reboot_command: Vec<String>,
    /// Log destination while the terminal UI owns the screen
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            overlay_dir: PathBuf::from("/boot/framos/dtbo"),
            boot_config: PathBuf::from("/boot/extlinux/extlinux.conf"),
            dtb_dir: PathBuf::from("/boot/dtb"),
            compatible_file: PathBuf::from("/proc/device-tree/compatible"),
            page_capacity: 15,
            reboot_command: vec!["reboot".to_string()],
            log_file: PathBuf::from("/var/log/camconfig.log"),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file; missing fields keep their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings from {:?}", path.as_ref()))?;

        let settings: Self =
            serde_json::from_str(&content).context("Failed to parse settings JSON")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize settings to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write settings to {:?}", path.as_ref()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_capacity < MIN_PAGE_CAPACITY {
            anyhow::bail!(
                "page_capacity must be at least {}, got {}",
                MIN_PAGE_CAPACITY,
                self.page_capacity
            );
        }

        if self.reboot_command.first().is_none_or(|c| c.trim().is_empty()) {
            anyhow::bail!("reboot_command must name a program");
        }

        for (name, path) in [
            ("overlay_dir", &self.overlay_dir),
            ("boot_config", &self.boot_config),
            ("dtb_dir", &self.dtb_dir),
        ] {
            if !path.is_absolute() {
                anyhow::bail!("{} must be an absolute path, got {:?}", name, path);
            }
        }

        Ok(())
    }

    /// Absolute path of an overlay as written into the boot configuration.
    pub fn overlay_path(&self, name: &str) -> String {
        self.overlay_dir.join(name).display().to_string()
    }
}
