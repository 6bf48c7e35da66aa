//! Pre-flight sanity checks for runtime environment
//!
//! Writing the boot configuration needs root privileges. The check runs
//! before the terminal UI starts so a failure can be printed plainly. Listing
//! and dry runs never write and skip it.

use tracing::{debug, info, warn};

use crate::config::Settings;

/// Result of environment verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanityCheckResult {
    pub is_root: bool,
    pub boot_config_present: bool,
}

impl SanityCheckResult {
    /// Returns true if all checks passed
    pub fn is_ok(&self) -> bool {
        self.is_root && self.boot_config_present
    }

    /// Lines describing each failed check.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !self.is_root {
            problems.push(
                "Root privileges required to edit the boot configuration (run with sudo)"
                    .to_string(),
            );
        }
        if !self.boot_config_present {
            problems.push("Boot configuration file not found".to_string());
        }
        problems
    }
}

/// Check if running as root (EUID 0)
fn is_running_as_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Perform all sanity checks and return the result
pub fn verify_environment(settings: &Settings) -> SanityCheckResult {
    debug!("Running pre-flight sanity checks...");
    SanityCheckResult {
        is_root: is_running_as_root(),
        boot_config_present: settings.boot_config.is_file(),
    }
}

/// Skip root check (for development/testing)
/// Set CAMCONFIG_SKIP_ROOT_CHECK=1 to skip
pub fn should_skip_root_check() -> bool {
    std::env::var("CAMCONFIG_SKIP_ROOT_CHECK")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Run pre-flight checks, honouring the root-check override.
pub fn run_preflight_checks(settings: &Settings) -> SanityCheckResult {
    let mut result = verify_environment(settings);

    if !result.is_root && should_skip_root_check() {
        warn!("Root check skipped (CAMCONFIG_SKIP_ROOT_CHECK=1)");
        result.is_root = true;
    }

    if result.is_ok() {
        info!("Pre-flight checks passed");
    }
    result
}
