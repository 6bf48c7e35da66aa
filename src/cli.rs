use std::path::PathBuf;

use clap::Parser;

use crate::descriptor::Descriptor;
use crate::error::{CamConfigError, Result};
use crate::selection::{PortSelection, Selection};
use crate::types::{AddOnBoardId, LinkBooster};

/// Configure camera add-on boards on Jetson devices
///
/// Without arguments an interactive menu is shown.
#[derive(Parser, Debug)]
#[command(name = "camconfig")]
#[command(about = "Configure camera add-on boards and sensors on Jetson devices")]
#[command(version)]
pub struct Cli {
    /// Print the resulting boot configuration instead of writing it.
    ///
    /// Never reboots.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// JSON settings file overriding the default paths
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// List the active camera connector and every detected module
    #[arg(short, long, conflicts_with = "name")]
    pub list: bool,

    /// Apply modules without the menu:
    /// "<tag> FPA-<id>" "<tag> <sensor>-<port>-<N>Lane[-GMSL]" ...
    #[arg(short, long, num_args = 1.., value_name = "MODULE")]
    pub name: Option<Vec<String>>,
}

/// What the invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    List,
    Apply(Vec<String>),
}

impl Cli {
    pub fn mode(&self) -> Mode {
        match (&self.name, self.list) {
            (Some(modules), _) => Mode::Apply(modules.clone()),
            (None, true) => Mode::List,
            (None, false) => Mode::Interactive,
        }
    }
}

const LINK_BOOSTER_SUFFIX: &str = "gmsl";

/// Build a selection from `--name` arguments.
///
/// Exactly one board argument and at least one sensor argument are required;
/// sensor arguments may carry a `-GMSL` suffix to request the link booster
/// on their port.
///
/// # Errors
///
/// `Validation` for a missing or repeated board argument, no sensor
/// argument, a repeated port, or an argument that is neither a board nor a
/// sensor module.
pub fn parse_module_args<S: AsRef<str>>(args: &[S]) -> Result<Selection> {
    let mut board: Option<AddOnBoardId> = None;
    let mut ports: Vec<(String, PortSelection)> = Vec::new();

    for arg in args.iter().map(AsRef::as_ref) {
        if let Some(Descriptor::AddOnBoard(id)) = Descriptor::parse(arg) {
            if let Some(previous) = &board {
                return Err(CamConfigError::validation(format!(
                    "more than one FPA given ({} and {})",
                    previous.label(),
                    id.label()
                )));
            }
            board = Some(id);
            continue;
        }

        let (module, link_booster) = match arg.rsplit_once('-') {
            Some((module, suffix)) if suffix.eq_ignore_ascii_case(LINK_BOOSTER_SUFFIX) => {
                (module, LinkBooster::Present)
            }
            _ => (arg, LinkBooster::None),
        };

        let Some(Descriptor::SensorLane {
            sensor,
            port,
            lanes,
        }) = Descriptor::parse(module)
        else {
            return Err(CamConfigError::validation(format!(
                "unrecognized module argument {arg:?}"
            )));
        };

        if ports.iter().any(|(p, _)| p.eq_ignore_ascii_case(&port)) {
            return Err(CamConfigError::validation(format!(
                "port {port} given more than once"
            )));
        }
        ports.push((
            port,
            PortSelection {
                sensor,
                lanes,
                link_booster,
            },
        ));
    }

    let board = board.ok_or_else(|| {
        CamConfigError::validation("FPA overlay not specified; cannot continue")
    })?;
    if ports.is_empty() {
        return Err(CamConfigError::validation(format!(
            "no sensor module given for {}; cannot continue",
            board.label()
        )));
    }
    let mut selection = Selection::new(board);
    for (port, chosen) in ports {
        selection.set(port, chosen);
    }
    Ok(selection)
}
