//! camconfig - main entry point
//!
//! Parses the command line, loads settings, scans the installed overlays and
//! dispatches to the interactive menu or one of the non-interactive runs.

use std::fs::OpenOptions;
use std::io;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use camconfig::app::{App, AppExit};
use camconfig::cli::{Cli, Mode};
use camconfig::config::Settings;
use camconfig::hardware::{self, OverlayDirectoryScan};
use camconfig::ui::TerminalFrontend;
use camconfig::{headless, sanity};

/// Initialize logging; `RUST_LOG` overrides the default `info` level.
///
/// The menu owns the terminal, so interactive runs log to the settings log
/// file (or nowhere when it cannot be opened).
fn init_logging(mode: &Mode, settings: &Settings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match mode {
        Mode::Interactive => match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&settings.log_file)
        {
            Ok(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
            Err(_) => builder.with_writer(io::sink).init(),
        },
        Mode::List | Mode::Apply(_) => builder.with_writer(io::stderr).init(),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from_file(path)?,
        None => Settings::default(),
    };
    let mode = cli.mode();
    init_logging(&mode, &settings);
    info!("camconfig {} starting", env!("CARGO_PKG_VERSION"));
    debug!("Settings: {:?}", settings);

    let scan = OverlayDirectoryScan::load(&settings).with_context(|| {
        format!("Failed to scan overlays in {}", settings.overlay_dir.display())
    })?;

    match mode {
        Mode::List => {
            headless::list(&scan, &mut io::stdout().lock())?;
        }
        Mode::Apply(modules) => {
            preflight(&settings, cli.dry_run)?;
            headless::apply_modules(
                &modules,
                &settings,
                &scan,
                cli.dry_run,
                &mut io::stdout().lock(),
            )?;
        }
        Mode::Interactive => run_interactive(&settings, &scan, cli.dry_run)?,
    }
    Ok(())
}

/// Root and boot-configuration checks; dry runs never write and skip them.
fn preflight(settings: &Settings, dry_run: bool) -> Result<()> {
    if dry_run {
        debug!("Dry run, skipping pre-flight checks");
        return Ok(());
    }
    let result = sanity::run_preflight_checks(settings);
    if !result.is_ok() {
        anyhow::bail!(
            "Pre-flight check failed: {} ({})",
            result.problems().join("; "),
            settings.boot_config.display()
        );
    }
    Ok(())
}

fn run_interactive(settings: &Settings, scan: &OverlayDirectoryScan, dry_run: bool) -> Result<()> {
    preflight(settings, dry_run)?;

    // Topology errors are reported before the terminal is taken over
    let mut app = App::new(settings, scan, dry_run)?;
    let exit = {
        let mut frontend = TerminalFrontend::new()?;
        app.run(&mut frontend)?
    };

    match exit {
        AppExit::Quit => info!("No changes written"),
        AppExit::Saved(report) => {
            if let Some(text) = &report.rendered {
                print!("{text}");
            }
            for line in report.messages() {
                println!("{line}");
            }
        }
        AppExit::Reboot(report) => {
            for line in report.messages() {
                println!("{line}");
            }
            hardware::reboot(settings).context("Failed to reboot")?;
        }
    }
    Ok(())
}
