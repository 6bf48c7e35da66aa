//! Non-interactive runs (`--list`, `--name`)
//!
//! Output goes to the given writer so the runs can be checked in tests.
//! Missing overlays are fatal here: there is nobody to show a warning to.

use std::io::Write;

use tracing::info;

use crate::apply::{ApplyContext, CommitReport, commit};
use crate::cli::parse_module_args;
use crate::config::Settings;
use crate::error::Result;
use crate::hardware::HardwareScan;
use crate::overlay::MissingOverlayPolicy;

/// Print the active connector and every descriptor reported for it.
pub fn list<S, W>(scan: &S, out: &mut W) -> Result<()>
where
    S: HardwareScan + ?Sized,
    W: Write,
{
    let connector = scan.active_connector()?;
    writeln!(out, "Header: {connector}")?;
    for descriptor in scan.descriptors()? {
        writeln!(out, "  {descriptor}")?;
    }
    Ok(())
}

/// Apply `--name` modules to the boot configuration.
pub fn apply_modules<S, W>(
    modules: &[String],
    settings: &Settings,
    scan: &S,
    dry_run: bool,
    out: &mut W,
) -> Result<CommitReport>
where
    S: HardwareScan + ?Sized,
    W: Write,
{
    let selection = parse_module_args(modules)?;
    let connector = scan.active_connector()?;
    info!(
        "Applying {} module(s) on {} for {}",
        selection.len(),
        selection.board().label(),
        connector
    );

    let ctx = ApplyContext::new(settings, connector);
    let report = commit(&selection, &ctx, scan, MissingOverlayPolicy::Abort, dry_run)?;

    if let Some(text) = &report.rendered {
        write!(out, "{text}")?;
    }
    for line in report.messages() {
        writeln!(out, "{line}")?;
    }
    if report.written {
        writeln!(out, "Reboot the System to apply changes.")?;
    }
    Ok(report)
}
