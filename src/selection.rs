//! Operator selection state
//!
//! A port is either fully configured (`PortSelection` with every field set)
//! or absent from the map. Partial selections cannot be represented.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::{AddOnBoardId, LinkBooster, lanes_label};

/// Complete configuration of one camera port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSelection {
    pub sensor: String,
    pub lanes: u32,
    pub link_booster: LinkBooster,
}

impl fmt::Display for PortSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}",
            self.sensor,
            lanes_label(self.lanes),
            self.link_booster
        )
    }
}

/// Pending configuration for one add-on board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    board: AddOnBoardId,
    ports: BTreeMap<String, PortSelection>,
}

impl Selection {
    pub fn new(board: AddOnBoardId) -> Self {
        Self {
            board,
            ports: BTreeMap::new(),
        }
    }

    pub fn board(&self) -> &AddOnBoardId {
        &self.board
    }

    /// Configure a port, replacing any previous configuration.
    pub fn set(&mut self, port: impl Into<String>, selection: PortSelection) {
        self.ports.insert(port.into(), selection);
    }

    /// Reset a port to unset. Returns the previous configuration.
    pub fn clear(&mut self, port: &str) -> Option<PortSelection> {
        self.ports.remove(port)
    }

    pub fn get(&self, port: &str) -> Option<&PortSelection> {
        self.ports.get(port)
    }

    /// Configured ports in port order.
    pub fn ports(&self) -> impl Iterator<Item = (&str, &PortSelection)> {
        self.ports.iter().map(|(port, sel)| (port.as_str(), sel))
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}
