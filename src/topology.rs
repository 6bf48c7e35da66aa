//! Camera topology built from the scanned descriptors
//!
//! The topology is a nested, ordered mapping:
//!
//! ```text
//! add-on board -> port -> sensor -> lane count -> {link-booster options}
//! ```
//!
//! It is built once at startup and only read afterwards. All levels are
//! `BTreeMap`s so the result does not depend on the order in which the scan
//! reported its descriptors.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::descriptor::Descriptor;
use crate::error::{CamConfigError, Result};
use crate::types::{AddOnBoardId, ConnectorKind, LinkBooster};

/// Lane count -> available link-booster options.
pub type LaneOptions = BTreeMap<u32, BTreeSet<LinkBooster>>;

/// Sensor -> lane options.
pub type SensorOptions = BTreeMap<String, LaneOptions>;

/// Port -> sensor options.
pub type PortOptions = BTreeMap<String, SensorOptions>;

/// Every configurable combination reported by the hardware scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    connector: ConnectorKind,
    boards: BTreeMap<AddOnBoardId, PortOptions>,
}

impl Topology {
    /// Build the topology from the raw descriptor list.
    ///
    /// # Errors
    ///
    /// - `NoAddOnBoard` when no `FPA-<id>` descriptor is present: port and
    ///   sensor overlays are meaningless without a board overlay.
    /// - `EmptyBoard` when a board ends up without any port.
    pub fn build<S: AsRef<str>>(
        connector: ConnectorKind,
        descriptors: &[S],
    ) -> Result<Self> {
        let parsed: Vec<Descriptor> = descriptors
            .iter()
            .filter_map(|raw| {
                let parsed = Descriptor::parse(raw.as_ref());
                if parsed.is_none() {
                    debug!("Ignoring descriptor {:?}", raw.as_ref());
                }
                parsed
            })
            .collect();

        let mut boards: BTreeMap<AddOnBoardId, PortOptions> = parsed
            .iter()
            .filter_map(|d| match d {
                Descriptor::AddOnBoard(id) => Some((id.clone(), PortOptions::new())),
                _ => None,
            })
            .collect();

        if boards.is_empty() {
            return Err(CamConfigError::NoAddOnBoard);
        }

        for descriptor in &parsed {
            if let Descriptor::SensorLane {
                sensor,
                port,
                lanes,
            } = descriptor
            {
                for ports in boards.values_mut() {
                    ports
                        .entry(port.clone())
                        .or_default()
                        .entry(sensor.clone())
                        .or_default()
                        .entry(*lanes)
                        .or_default()
                        .insert(LinkBooster::None);
                }
            }
        }

        // Link-booster availability belongs to the port wiring, so it fans out
        // to every sensor and lane already registered on a matching port.
        for descriptor in &parsed {
            if let Descriptor::LinkBooster { port: gmsl_port } = descriptor {
                for ports in boards.values_mut() {
                    for (port, sensors) in ports.iter_mut() {
                        if !port.eq_ignore_ascii_case(gmsl_port) {
                            continue;
                        }
                        for lanes in sensors.values_mut() {
                            for options in lanes.values_mut() {
                                options.insert(LinkBooster::Present);
                            }
                        }
                    }
                }
            }
        }

        if let Some((board, _)) = boards.iter().find(|(_, ports)| ports.is_empty()) {
            return Err(CamConfigError::EmptyBoard(board.to_string()));
        }

        let topology = Self { connector, boards };
        info!(
            "Topology built: connector={}, boards={}, ports={}",
            connector,
            topology.boards.len(),
            topology.port_count()
        );
        Ok(topology)
    }

    pub fn connector(&self) -> ConnectorKind {
        self.connector
    }

    /// Detected add-on boards in order.
    pub fn boards(&self) -> impl Iterator<Item = &AddOnBoardId> {
        self.boards.keys()
    }

    pub fn board(&self, board: &AddOnBoardId) -> Option<&PortOptions> {
        self.boards.get(board)
    }

    pub fn sensors(&self, board: &AddOnBoardId, port: &str) -> Option<&SensorOptions> {
        self.board(board)?.get(port)
    }

    pub fn lanes(&self, board: &AddOnBoardId, port: &str, sensor: &str) -> Option<&LaneOptions> {
        self.sensors(board, port)?.get(sensor)
    }

    pub fn link_boosters(
        &self,
        board: &AddOnBoardId,
        port: &str,
        sensor: &str,
        lanes: u32,
    ) -> Option<&BTreeSet<LinkBooster>> {
        self.lanes(board, port, sensor)?.get(&lanes)
    }

    /// Total number of ports across all boards.
    pub fn port_count(&self) -> usize {
        self.boards.values().map(BTreeMap::len).sum()
    }
}
