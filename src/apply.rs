//! Commit pipeline
//!
//! Turns a finished selection into an edited boot configuration:
//!
//! 1. derive the overlay names
//! 2. check them against the installed overlays
//! 3. edit the boot configuration in memory
//! 4. write it back atomically (or only render it in a dry run)
//!
//! Nothing is written unless every step before the write succeeded.

use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::bootconf::{apply_overlays, base_dtb_path, write_atomic};
use crate::config::Settings;
use crate::error::Result;
use crate::hardware::HardwareScan;
use crate::overlay::{self, MissingOverlayPolicy, SkippedPort};
use crate::selection::Selection;
use crate::types::ConnectorKind;

/// Everything a commit needs besides the selection.
#[derive(Debug, Clone, Copy)]
pub struct ApplyContext<'a> {
    pub settings: &'a Settings,
    pub connector: ConnectorKind,
}

impl<'a> ApplyContext<'a> {
    pub fn new(settings: &'a Settings, connector: ConnectorKind) -> Self {
        Self {
            settings,
            connector,
        }
    }
}

/// Outcome of a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReport {
    pub boot_config: PathBuf,
    /// Overlay paths now listed in the boot configuration
    pub overlays: Vec<String>,
    pub skipped: Vec<SkippedPort>,
    /// Whether the boot configuration file was replaced
    pub written: bool,
    /// Resulting boot configuration in a dry run
    pub rendered: Option<String>,
}

impl CommitReport {
    fn untouched(boot_config: PathBuf) -> Self {
        Self {
            boot_config,
            overlays: Vec::new(),
            skipped: Vec::new(),
            written: false,
            rendered: None,
        }
    }

    /// Lines to show the operator.
    pub fn messages(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.skipped.iter().map(SkippedPort::message).collect();
        if self.written {
            lines.push(format!("{} updated.", self.boot_config.display()));
        } else if self.rendered.is_some() {
            lines.push(format!("Dry run: {} not modified.", self.boot_config.display()));
        } else {
            lines.push("Nothing to save.".to_string());
        }
        lines
    }
}

/// Apply `selection` to the boot configuration.
///
/// # Errors
///
/// Missing board overlay, missing per-port overlay under
/// [`MissingOverlayPolicy::Abort`], unreadable boot configuration, no
/// primary kernel entry, or a failed write.
pub fn commit<S: HardwareScan + ?Sized>(
    selection: &Selection,
    ctx: &ApplyContext<'_>,
    scan: &S,
    policy: MissingOverlayPolicy,
    dry_run: bool,
) -> Result<CommitReport> {
    let settings = ctx.settings;
    if selection.is_empty() {
        info!("Empty selection, boot configuration left untouched");
        return Ok(CommitReport::untouched(settings.boot_config.clone()));
    }

    let derived = overlay::derive(selection, ctx.connector);
    let names: Vec<String> = derived.iter().map(|o| o.name.clone()).collect();
    let existing = scan.existing_overlays(&names)?;
    let verified = overlay::verify(derived, &existing, policy, &settings.overlay_dir)?;

    let overlays: Vec<String> = verified
        .names
        .iter()
        .map(|o| settings.overlay_path(&o.name))
        .collect();

    let current = fs::read_to_string(&settings.boot_config)?;
    let updated = apply_overlays(&current, || base_dtb_path(&settings.dtb_dir), &overlays)?;

    let (written, rendered) = if dry_run {
        info!("Dry run, not writing {}", settings.boot_config.display());
        (false, Some(updated))
    } else if updated == current {
        info!("{} already up to date", settings.boot_config.display());
        (true, None)
    } else {
        write_atomic(&settings.boot_config, &updated)?;
        (true, None)
    };

    for port in &verified.skipped {
        warn!("Port {} skipped", port.port);
    }
    info!(
        "Committed {} overlay(s) for {}",
        overlays.len(),
        selection.board().label()
    );

    Ok(CommitReport {
        boot_config: settings.boot_config.clone(),
        overlays,
        skipped: verified.skipped,
        written,
        rendered,
    })
}
