//! Application module
//!
//! Interactive loop: render the wizard, read a key, feed it back, and run the
//! commit pipeline when the operator saves.
//!
//! The loop is generic over [`Frontend`], so it runs against the real
//! terminal or a scripted test double alike.

use tracing::{debug, info};

use crate::apply::{ApplyContext, CommitReport, commit};
use crate::config::Settings;
use crate::error::Result;
use crate::hardware::HardwareScan;
use crate::overlay::MissingOverlayPolicy;
use crate::topology::Topology;
use crate::types::ConnectorKind;
use crate::ui::{CHROME_ROWS, Frontend};
use crate::wizard::{CommitRequest, MIN_PAGE_CAPACITY, Wizard, WizardOutcome};

/// How the interactive session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppExit {
    /// Left without saving
    Quit,
    /// Saved; the operator reboots later
    Saved(CommitReport),
    /// Saved; the caller should reboot now
    Reboot(CommitReport),
}

/// Main application struct
pub struct App<'a, S: HardwareScan + ?Sized> {
    wizard: Wizard,
    settings: &'a Settings,
    scan: &'a S,
    connector: ConnectorKind,
    dry_run: bool,
}

impl<'a, S: HardwareScan + ?Sized> App<'a, S> {
    /// Build the topology from `scan` and start at the top-level menu.
    ///
    /// # Errors
    ///
    /// Unknown connector, no add-on board, or a board without ports.
    pub fn new(settings: &'a Settings, scan: &'a S, dry_run: bool) -> Result<Self> {
        let connector = scan.active_connector()?;
        let descriptors = scan.descriptors()?;
        debug!("{} descriptor(s) reported", descriptors.len());
        let topology = Topology::build(connector, &descriptors)?;

        info!("Creating new App instance for {}", connector.board_name());
        Ok(Self {
            wizard: Wizard::new(topology, settings.page_capacity),
            settings,
            scan,
            connector,
            dry_run,
        })
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    /// Run the main application loop
    pub fn run<F: Frontend>(&mut self, frontend: &mut F) -> Result<AppExit> {
        info!("Starting main application loop");

        loop {
            // The terminal may have been resized since the last key
            self.fit_to_screen(frontend)?;
            frontend.render(&self.wizard.view()?)?;
            let key = frontend.read_key()?;

            match self.wizard.handle_key(key)? {
                WizardOutcome::Pending => {}
                WizardOutcome::Exit => {
                    info!("Exiting without saving");
                    return Ok(AppExit::Quit);
                }
                WizardOutcome::Commit(request) => return self.finish(frontend, request),
            }
        }
    }

    /// Shrink the page size when the screen is shorter than the settings ask for.
    fn fit_to_screen<F: Frontend>(&mut self, frontend: &F) -> Result<()> {
        let (_, height) = frontend.geometry()?;
        let available = usize::from(height.saturating_sub(CHROME_ROWS));
        let capacity = self
            .settings
            .page_capacity
            .min(available)
            .max(MIN_PAGE_CAPACITY);
        if capacity != self.wizard.page_capacity() {
            debug!("Page capacity set to {} for screen height {}", capacity, height);
            self.wizard.set_page_capacity(capacity);
        }
        Ok(())
    }

    fn finish<F: Frontend>(&mut self, frontend: &mut F, request: CommitRequest) -> Result<AppExit> {
        let ctx = ApplyContext::new(self.settings, self.connector);
        let report = commit(
            &request.selection,
            &ctx,
            self.scan,
            MissingOverlayPolicy::SkipPort,
            self.dry_run,
        )?;

        let reboot = request.reboot && report.written && !self.dry_run;
        let mut lines = report.messages();
        if reboot {
            lines.push("The system will now reboot.".to_string());
        } else if report.written {
            lines.push("Reboot the System to apply changes.".to_string());
        }
        frontend.show_message(&lines)?;

        Ok(if reboot {
            AppExit::Reboot(report)
        } else {
            AppExit::Saved(report)
        })
    }
}
