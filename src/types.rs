//! Type-safe hardware types for camconfig
//!
//! Connector families and link-booster options are proper Rust enums so that
//! naming templates and menu labels are matched exhaustively.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// Camera connector family present on the carrier board.
///
/// Decides which overlay naming template is used. Chosen once at startup from
/// the header name reported by the overlay scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumIter)]
pub enum ConnectorKind {
    /// Jetson AGX Orin 120-pin camera connector
    #[strum(serialize = "Jetson AGX CSI Connector")]
    Wide,
    /// Jetson Orin Nano/NX 22/24-pin camera connector
    #[strum(serialize = "Jetson 24pin CSI Connector")]
    Narrow,
}

impl ConnectorKind {
    /// Header name as stored in the `jetson-header-name` overlay property.
    pub fn header_name(self) -> &'static str {
        match self {
            Self::Wide => "Jetson AGX CSI Connector",
            Self::Narrow => "Jetson 24pin CSI Connector",
        }
    }

    /// Prefix shared by every overlay file built for this connector.
    pub fn overlay_template(self) -> &'static str {
        match self {
            Self::Wide => "tegra234-p3737-camera-fr_",
            Self::Narrow => "tegra234-p3767-camera-p3768-fr_",
        }
    }

    /// Board family shown to the operator.
    pub fn board_name(self) -> &'static str {
        match self {
            Self::Wide => "Jetson AGX Orin",
            Self::Narrow => "Jetson Orin Nano/NX",
        }
    }

    /// Look up a connector by its header name.
    pub fn from_header_name(name: &str) -> Option<Self> {
        Self::iter().find(|kind| kind.header_name() == name)
    }
}

/// Link-booster (GMSL) option of a lane configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Display, EnumIter)]
pub enum LinkBooster {
    #[strum(serialize = "No GMSL")]
    None,
    #[strum(serialize = "GMSL")]
    Present,
}

impl LinkBooster {
    pub fn is_present(self) -> bool {
        matches!(self, Self::Present)
    }
}

/// Identifier of an attached add-on (FPA) board, without the `FPA-` prefix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AddOnBoardId(String);

impl AddOnBoardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Operator-facing name, e.g. `FPA-4.A/4.B`.
    pub fn label(&self) -> String {
        format!("FPA-{}", self.0)
    }
}

impl fmt::Display for AddOnBoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Human readable lane count, e.g. `1 lane` / `4 lanes`.
pub fn lanes_label(lanes: u32) -> String {
    if lanes == 1 {
        "1 lane".to_string()
    } else {
        format!("{lanes} lanes")
    }
}
