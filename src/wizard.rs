//! Selection wizard state machine
//!
//! The wizard is a stack of typed menu frames:
//!
//! ```text
//! TopLevel -> PortMenu -> SensorMenu -> LaneMenu -> LinkBoosterMenu
//! ```
//!
//! # Transitions
//!
//! - Opening an item pushes the child menu.
//! - `Back` pops to the parent and never touches the selection.
//! - Choosing a link-booster option stores the full port configuration and
//!   pops back to the port menu.
//! - `None` (sensor, lane and link-booster menus) clears the port and pops
//!   back to the port menu.
//! - Saving hands the selection out as a [`CommitRequest`] and resets the
//!   wizard to the top-level menu. Saving with nothing configured is a no-op.
//!
//! The wizard holds no terminal state: a front end renders [`Wizard::view`]
//! and feeds decoded [`Key`]s back through [`Wizard::handle_key`].

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use crate::error::Result;
use crate::paging::{MenuEntry, PagedList, PagingError, Step};
use crate::selection::{PortSelection, Selection};
use crate::topology::Topology;
use crate::types::{AddOnBoardId, LinkBooster, lanes_label};

/// Smallest page that lays out every menu: the top-level footer with a
/// pending selection (5 rows), the page spacer and caption, and one entry.
pub const MIN_PAGE_CAPACITY: usize = 8;

/// Decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    /// Esc: same as the "Back" item
    Back,
    /// Ctrl-C: leave without saving
    Interrupt,
    Other,
}

/// Menu currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
    TopLevel,
    PortMenu {
        board: AddOnBoardId,
    },
    SensorMenu {
        board: AddOnBoardId,
        port: String,
    },
    LaneMenu {
        board: AddOnBoardId,
        port: String,
        sensor: String,
    },
    LinkBoosterMenu {
        board: AddOnBoardId,
        port: String,
        sensor: String,
        lanes: u32,
    },
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopLevel => write!(f, "top-level menu"),
            Self::PortMenu { board } => write!(f, "port menu of {}", board.label()),
            Self::SensorMenu { board, port } => {
                write!(f, "sensor menu of {port} on {}", board.label())
            }
            Self::LaneMenu {
                board,
                port,
                sensor,
            } => write!(f, "lane menu of {sensor} on {port} on {}", board.label()),
            Self::LinkBoosterMenu {
                board,
                port,
                sensor,
                lanes,
            } => write!(
                f,
                "GMSL menu of {} for {sensor} on {port} on {}",
                lanes_label(*lanes),
                board.label()
            ),
        }
    }
}

/// Everything a menu row can trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    OpenBoard(AddOnBoardId),
    OpenPort(String),
    OpenSensor(String),
    OpenLanes(u32),
    Choose(LinkBooster),
    /// Reset the current port to unset
    ClearPort,
    Back,
    SaveAndReboot,
    SaveOnly,
    DiscardAll,
    Exit,
}

/// Errors that can occur when driving the wizard directly with actions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("{action:?} is not available in the {state}")]
    InvalidAction { state: String, action: Action },

    #[error("{0} is not part of the detected topology")]
    UnknownOption(String),
}

/// Selection handed to the commit pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub selection: Selection,
    /// Reboot once the boot configuration has been written
    pub reboot: bool,
}

/// Result of one wizard step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardOutcome {
    /// Keep reading keys
    Pending,
    Commit(CommitRequest),
    /// Leave without saving
    Exit,
}

/// One rendered menu row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRow {
    pub label: String,
    pub selectable: bool,
    pub highlighted: bool,
}

/// Snapshot of the current menu for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuView {
    pub title: String,
    pub rows: Vec<MenuRow>,
    pub status: Option<String>,
}

impl MenuView {
    /// Label of the highlighted row, if any.
    pub fn highlighted(&self) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.highlighted)
            .map(|row| row.label.as_str())
    }
}

#[derive(Debug, Clone)]
struct Frame {
    state: WizardState,
    page: usize,
    row: usize,
}

impl Frame {
    fn new(state: WizardState) -> Self {
        Self {
            state,
            page: 0,
            row: 0,
        }
    }
}

/// Hierarchical camera selection wizard.
#[derive(Debug, Clone)]
pub struct Wizard {
    topology: Topology,
    /// Never empty; the bottom frame is always `TopLevel`.
    stack: Vec<Frame>,
    selection: Option<Selection>,
    page_capacity: usize,
    status: Option<String>,
}

impl Wizard {
    pub fn new(topology: Topology, page_capacity: usize) -> Self {
        Self {
            topology,
            stack: vec![Frame::new(WizardState::TopLevel)],
            selection: None,
            page_capacity,
            status: None,
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn state(&self) -> &WizardState {
        &self.current().state
    }

    /// Number of open menus, 1 at the top level.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Pending (not yet committed) selection.
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Transient message for the operator.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn page_capacity(&self) -> usize {
        self.page_capacity
    }

    /// Change the rows per page; cursors are re-clamped on the next key.
    pub fn set_page_capacity(&mut self, capacity: usize) {
        self.page_capacity = capacity;
    }

    fn current(&self) -> &Frame {
        &self.stack[self.stack.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Frame {
        let top = self.stack.len() - 1;
        &mut self.stack[top]
    }

    // ========================================================================
    // Menu construction
    // ========================================================================

    /// Title of the current menu.
    pub fn title(&self) -> String {
        match self.state() {
            WizardState::TopLevel => format!(
                "Select the FPA attached to your {}:",
                self.topology.connector().board_name()
            ),
            WizardState::PortMenu { board } => {
                format!("Configure camera connector on {}:", board.label())
            }
            WizardState::SensorMenu { board, port } => {
                format!("Configure an image sensor on {port} on {}:", board.label())
            }
            WizardState::LaneMenu {
                board,
                port,
                sensor,
            } => format!(
                "Configure number of lanes for {sensor} on {port} on {}:",
                board.label()
            ),
            WizardState::LinkBoosterMenu {
                board,
                port,
                sensor,
                lanes,
            } => format!(
                "Configure GMSL for {} on {sensor} on {port} on {}:",
                lanes_label(*lanes),
                board.label()
            ),
        }
    }

    /// Build the paged menu of the current state.
    pub fn menu(&self) -> std::result::Result<PagedList<Action>, PagingError> {
        let back = || MenuEntry::action("Back", Action::Back);
        let none = || MenuEntry::action("None", Action::ClearPort);

        let (entries, footer) = match self.state() {
            WizardState::TopLevel => {
                let pending = self.selection.as_ref();
                let entries = self
                    .topology
                    .boards()
                    .map(|board| {
                        let label = match pending {
                            Some(s) if s.board() == board => format!("{} (modified)", board.label()),
                            _ => board.label(),
                        };
                        MenuEntry::action(label, Action::OpenBoard(board.clone()))
                    })
                    .collect();

                let mut footer = vec![MenuEntry::spacer()];
                if pending.is_some_and(|s| !s.is_empty()) {
                    footer.push(MenuEntry::action(
                        "Save and reboot to apply",
                        Action::SaveAndReboot,
                    ));
                    footer.push(MenuEntry::action("Save without rebooting", Action::SaveOnly));
                    footer.push(MenuEntry::action("Discard all changes", Action::DiscardAll));
                }
                footer.push(MenuEntry::action("Exit", Action::Exit));
                (entries, footer)
            }
            WizardState::PortMenu { board } => {
                let entries = self
                    .topology
                    .board(board)
                    .into_iter()
                    .flat_map(|ports| ports.keys())
                    .map(|port| {
                        let label = match self.port_selection(board, port) {
                            Some(current) => format!("Re-configure {port}: {current}"),
                            None => format!("Configure {port}"),
                        };
                        MenuEntry::action(label, Action::OpenPort(port.clone()))
                    })
                    .collect();
                (entries, vec![MenuEntry::spacer(), back()])
            }
            WizardState::SensorMenu { board, port } => {
                let entries = self
                    .topology
                    .sensors(board, port)
                    .into_iter()
                    .flat_map(|sensors| sensors.keys())
                    .map(|sensor| MenuEntry::action(sensor.clone(), Action::OpenSensor(sensor.clone())))
                    .collect();
                (entries, vec![none(), MenuEntry::spacer(), back()])
            }
            WizardState::LaneMenu {
                board,
                port,
                sensor,
            } => {
                let entries = self
                    .topology
                    .lanes(board, port, sensor)
                    .into_iter()
                    .flat_map(|lanes| lanes.keys())
                    .map(|lanes| MenuEntry::action(lanes_label(*lanes), Action::OpenLanes(*lanes)))
                    .collect();
                (entries, vec![none(), MenuEntry::spacer(), back()])
            }
            WizardState::LinkBoosterMenu {
                board,
                port,
                sensor,
                lanes,
            } => {
                let entries = self
                    .topology
                    .link_boosters(board, port, sensor, *lanes)
                    .into_iter()
                    .flatten()
                    .map(|option| MenuEntry::action(option.to_string(), Action::Choose(*option)))
                    .collect();
                (entries, vec![none(), MenuEntry::spacer(), back()])
            }
        };

        PagedList::paginate(entries, footer, self.page_capacity)
    }

    fn port_selection(&self, board: &AddOnBoardId, port: &str) -> Option<&PortSelection> {
        self.selection
            .as_ref()
            .filter(|s| s.board() == board)
            .and_then(|s| s.get(port))
    }

    /// Effective cursor on `menu`: stored position clamped onto a selectable row.
    fn cursor(&self, menu: &PagedList<Action>) -> (usize, usize) {
        let frame = self.current();
        let page = frame.page.min(menu.page_count().saturating_sub(1));
        let row = match menu.entry(page, frame.row) {
            Some(entry) if entry.is_selectable() => frame.row,
            _ => menu.first_selectable(page).unwrap_or(0),
        };
        (page, row)
    }

    /// Render-ready snapshot of the current menu.
    pub fn view(&self) -> std::result::Result<MenuView, PagingError> {
        let menu = self.menu()?;
        let (page, row) = self.cursor(&menu);
        let rows = menu
            .page(page)
            .iter()
            .enumerate()
            .map(|(index, entry)| MenuRow {
                label: entry.label.clone(),
                selectable: entry.is_selectable(),
                highlighted: index == row && entry.is_selectable(),
            })
            .collect();

        Ok(MenuView {
            title: self.title(),
            rows,
            status: self.status.clone(),
        })
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Apply one key press.
    pub fn handle_key(&mut self, key: Key) -> Result<WizardOutcome> {
        let menu = self.menu()?;
        let (page, row) = self.cursor(&menu);
        {
            let frame = self.current_mut();
            frame.page = page;
            frame.row = row;
        }

        match key {
            Key::Up | Key::Down => {
                let step = if key == Key::Up { Step::Up } else { Step::Down };
                if let Some(next) = menu.next_selectable(page, row, step) {
                    self.current_mut().row = next;
                }
            }
            Key::Left if page > 0 => self.turn_page(&menu, page - 1),
            Key::Right if page + 1 < menu.page_count() => self.turn_page(&menu, page + 1),
            Key::Enter => {
                if let Some(action) = menu.entry(page, row).and_then(|e| e.action.clone()) {
                    return self.perform(action);
                }
            }
            Key::Back if self.depth() > 1 => return self.perform(Action::Back),
            Key::Interrupt => {
                info!("Wizard interrupted by operator");
                return Ok(WizardOutcome::Exit);
            }
            _ => {}
        }
        Ok(WizardOutcome::Pending)
    }

    fn turn_page(&mut self, menu: &PagedList<Action>, page: usize) {
        let row = menu.first_selectable(page).unwrap_or(0);
        let frame = self.current_mut();
        frame.page = page;
        frame.row = row;
    }

    /// Perform an action as if its menu row had been activated.
    ///
    /// # Errors
    ///
    /// `WizardError::InvalidAction` when the action does not belong to the
    /// current menu, `WizardError::UnknownOption` when it names something the
    /// topology does not contain.
    pub fn perform(&mut self, action: Action) -> Result<WizardOutcome> {
        self.status = None;
        let state = self.state().clone();
        debug!("Wizard action {:?} in {}", action, state);

        match (state, action) {
            (_, Action::Back) if self.depth() > 1 => {
                self.stack.pop();
            }
            (WizardState::TopLevel, Action::OpenBoard(board)) => {
                if self.topology.board(&board).is_none() {
                    return Err(WizardError::UnknownOption(board.label()).into());
                }
                self.push(WizardState::PortMenu { board });
            }
            (WizardState::PortMenu { board }, Action::OpenPort(port)) => {
                if self.topology.sensors(&board, &port).is_none() {
                    return Err(WizardError::UnknownOption(port).into());
                }
                self.push(WizardState::SensorMenu { board, port });
            }
            (WizardState::SensorMenu { board, port }, Action::OpenSensor(sensor)) => {
                if self.topology.lanes(&board, &port, &sensor).is_none() {
                    return Err(WizardError::UnknownOption(sensor).into());
                }
                self.push(WizardState::LaneMenu {
                    board,
                    port,
                    sensor,
                });
            }
            (
                WizardState::LaneMenu {
                    board,
                    port,
                    sensor,
                },
                Action::OpenLanes(lanes),
            ) => {
                if self.topology.link_boosters(&board, &port, &sensor, lanes).is_none() {
                    return Err(WizardError::UnknownOption(lanes_label(lanes)).into());
                }
                self.push(WizardState::LinkBoosterMenu {
                    board,
                    port,
                    sensor,
                    lanes,
                });
            }
            (
                WizardState::LinkBoosterMenu {
                    board,
                    port,
                    sensor,
                    lanes,
                },
                Action::Choose(link_booster),
            ) => {
                let available = self
                    .topology
                    .link_boosters(&board, &port, &sensor, lanes)
                    .is_some_and(|options| options.contains(&link_booster));
                if !available {
                    return Err(WizardError::UnknownOption(link_booster.to_string()).into());
                }
                let chosen = PortSelection {
                    sensor,
                    lanes,
                    link_booster,
                };
                info!("{} {} configured: {}", board.label(), port, chosen);
                self.set_port(board, port, chosen);
                self.stack.truncate(2);
            }
            (
                WizardState::SensorMenu { board, port }
                | WizardState::LaneMenu { board, port, .. }
                | WizardState::LinkBoosterMenu { board, port, .. },
                Action::ClearPort,
            ) => {
                info!("{} {} cleared", board.label(), port);
                self.clear_port(&board, &port);
                self.stack.truncate(2);
            }
            (WizardState::TopLevel, Action::SaveAndReboot) => return Ok(self.commit(true)),
            (WizardState::TopLevel, Action::SaveOnly) => return Ok(self.commit(false)),
            (WizardState::TopLevel, Action::DiscardAll) => self.discard_all(),
            (WizardState::TopLevel, Action::Exit) => return Ok(WizardOutcome::Exit),
            (state, action) => {
                return Err(WizardError::InvalidAction {
                    state: state.to_string(),
                    action,
                }
                .into());
            }
        }
        Ok(WizardOutcome::Pending)
    }

    fn push(&mut self, state: WizardState) {
        self.stack.push(Frame::new(state));
    }

    /// Only one board can carry a pending selection, since only one board
    /// overlay can be applied.
    fn set_port(&mut self, board: AddOnBoardId, port: String, chosen: PortSelection) {
        match &mut self.selection {
            Some(selection) if selection.board() == &board => selection.set(port, chosen),
            pending => {
                if let Some(previous) = pending.as_ref().filter(|s| !s.is_empty()) {
                    self.status = Some(format!(
                        "Discarded pending configuration of {}",
                        previous.board().label()
                    ));
                }
                let mut selection = Selection::new(board);
                selection.set(port, chosen);
                *pending = Some(selection);
            }
        }
    }

    fn clear_port(&mut self, board: &AddOnBoardId, port: &str) {
        let now_empty = match self.selection.as_mut() {
            Some(selection) if selection.board() == board => {
                selection.clear(port);
                selection.is_empty()
            }
            _ => false,
        };
        if now_empty {
            self.selection = None;
        }
    }

    fn reset_to_top(&mut self) {
        self.stack.truncate(1);
        let top = self.current_mut();
        top.page = 0;
        top.row = 0;
    }

    fn commit(&mut self, reboot: bool) -> WizardOutcome {
        self.reset_to_top();
        match self.selection.take() {
            Some(selection) if !selection.is_empty() => {
                info!(
                    "Committing {} port(s) on {} (reboot: {})",
                    selection.len(),
                    selection.board().label(),
                    reboot
                );
                WizardOutcome::Commit(CommitRequest { selection, reboot })
            }
            _ => {
                self.status = Some("No camera port configured; nothing to save".to_string());
                WizardOutcome::Pending
            }
        }
    }

    fn discard_all(&mut self) {
        self.selection = None;
        self.reset_to_top();
        self.status = Some("All changes discarded".to_string());
        info!("Pending configuration discarded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConnectorKind;

    fn wizard(descriptors: &[&str]) -> Wizard {
        let topology = Topology::build(ConnectorKind::Wide, descriptors).expect("valid topology");
        Wizard::new(topology, 15)
    }

    fn e2e() -> Wizard {
        wizard(&["Tag FPA-1.2", "Tag imx900-p0-4Lane", "Tag GMSL-P0"])
    }

    fn board() -> AddOnBoardId {
        AddOnBoardId::new("1.2")
    }

    /// Walk to the link-booster menu of p0 / imx900 / 4 lanes.
    fn open_link_booster_menu(w: &mut Wizard) {
        for action in [
            Action::OpenBoard(board()),
            Action::OpenPort("p0".to_string()),
            Action::OpenSensor("imx900".to_string()),
            Action::OpenLanes(4),
        ] {
            assert_eq!(w.perform(action).expect("valid action"), WizardOutcome::Pending);
        }
    }

    fn labels(w: &Wizard) -> Vec<String> {
        w.view()
            .expect("renderable")
            .rows
            .into_iter()
            .map(|r| r.label)
            .collect()
    }

    #[test]
    fn test_choosing_link_booster_returns_to_port_menu() {
        let mut w = e2e();
        open_link_booster_menu(&mut w);
        assert_eq!(w.depth(), 5);

        w.perform(Action::Choose(LinkBooster::Present)).expect("available");
        assert_eq!(w.state(), &WizardState::PortMenu { board: board() });

        let selection = w.selection().expect("pending selection");
        assert_eq!(
            selection.get("p0"),
            Some(&PortSelection {
                sensor: "imx900".to_string(),
                lanes: 4,
                link_booster: LinkBooster::Present,
            })
        );
        assert_eq!(labels(&w)[0], "Re-configure p0: imx900, 4 lanes, GMSL");
    }

    #[test]
    fn test_back_does_not_touch_selection() {
        let mut w = e2e();
        open_link_booster_menu(&mut w);
        w.perform(Action::Choose(LinkBooster::None)).expect("available");
        let before = w.selection().cloned();

        w.perform(Action::OpenPort("p0".to_string())).expect("valid");
        w.perform(Action::OpenSensor("imx900".to_string())).expect("valid");
        w.perform(Action::OpenLanes(4)).expect("valid");
        w.perform(Action::Back).expect("valid");
        assert!(matches!(w.state(), WizardState::LaneMenu { .. }));
        w.perform(Action::Back).expect("valid");
        w.perform(Action::Back).expect("valid");

        assert_eq!(w.state(), &WizardState::PortMenu { board: board() });
        assert_eq!(w.selection().cloned(), before);
    }

    #[test]
    fn test_none_clears_port() {
        let mut w = e2e();
        open_link_booster_menu(&mut w);
        w.perform(Action::Choose(LinkBooster::Present)).expect("available");

        w.perform(Action::OpenPort("p0".to_string())).expect("valid");
        w.perform(Action::OpenSensor("imx900".to_string())).expect("valid");
        w.perform(Action::ClearPort).expect("valid");

        assert_eq!(w.depth(), 2);
        assert!(w.selection().is_none());
        assert_eq!(labels(&w)[0], "Configure p0");
    }

    #[test]
    fn test_commit_without_selection_is_noop() {
        let mut w = e2e();
        let outcome = w.perform(Action::SaveOnly).expect("valid at top level");
        assert_eq!(outcome, WizardOutcome::Pending);
        assert_eq!(w.state(), &WizardState::TopLevel);
        assert!(w.status().is_some_and(|s| s.contains("nothing to save")));
    }

    #[test]
    fn test_commit_hands_out_selection_and_resets() {
        let mut w = e2e();
        open_link_booster_menu(&mut w);
        w.perform(Action::Choose(LinkBooster::Present)).expect("available");
        w.perform(Action::Back).expect("valid");

        match w.perform(Action::SaveAndReboot).expect("valid") {
            WizardOutcome::Commit(request) => {
                assert!(request.reboot);
                assert_eq!(request.selection.board(), &board());
                assert_eq!(request.selection.len(), 1);
            }
            other => panic!("expected commit, got {other:?}"),
        }
        assert_eq!(w.state(), &WizardState::TopLevel);
        assert!(w.selection().is_none());
    }

    #[test]
    fn test_discard_all() {
        let mut w = e2e();
        open_link_booster_menu(&mut w);
        w.perform(Action::Choose(LinkBooster::None)).expect("available");
        w.perform(Action::Back).expect("valid");
        assert!(labels(&w).contains(&"Discard all changes".to_string()));

        w.perform(Action::DiscardAll).expect("valid");
        assert!(w.selection().is_none());
        assert!(!labels(&w).contains(&"Discard all changes".to_string()));
    }

    #[test]
    fn test_invalid_actions_are_rejected() {
        let mut w = e2e();
        let err = w.perform(Action::OpenPort("p0".to_string())).unwrap_err();
        assert!(matches!(
            err,
            crate::error::CamConfigError::Wizard(WizardError::InvalidAction { .. })
        ));
        // Back at the top level is not a transition
        assert!(w.perform(Action::Back).is_err());

        let err = w.perform(Action::OpenBoard(AddOnBoardId::new("9"))).unwrap_err();
        assert!(matches!(
            err,
            crate::error::CamConfigError::Wizard(WizardError::UnknownOption(_))
        ));
    }

    #[test]
    fn test_configuring_another_board_replaces_pending_selection() {
        let mut w = wizard(&["Tag FPA-1", "Tag FPA-2", "Tag imx900-P0-4Lane"]);
        for b in ["1", "2"] {
            w.perform(Action::Back).ok();
            w.perform(Action::Back).ok();
            w.perform(Action::OpenBoard(AddOnBoardId::new(b))).expect("valid");
            w.perform(Action::OpenPort("P0".to_string())).expect("valid");
            w.perform(Action::OpenSensor("imx900".to_string())).expect("valid");
            w.perform(Action::OpenLanes(4)).expect("valid");
            w.perform(Action::Choose(LinkBooster::None)).expect("valid");
        }
        assert_eq!(w.selection().map(Selection::board), Some(&AddOnBoardId::new("2")));
        assert!(w.status().is_some_and(|s| s.contains("FPA-1")));
    }

    #[test]
    fn test_keys_walk_to_a_commit() {
        let mut w = e2e();
        // Top level: FPA-1.2 highlighted first
        assert_eq!(w.view().expect("view").highlighted(), Some("FPA-1.2"));
        w.handle_key(Key::Enter).expect("open board");
        w.handle_key(Key::Enter).expect("open port");
        w.handle_key(Key::Enter).expect("open sensor");
        w.handle_key(Key::Enter).expect("open lanes");
        // GMSL menu: "No GMSL", "GMSL", "None", spacer, "Back"
        w.handle_key(Key::Down).expect("move");
        assert_eq!(w.view().expect("view").highlighted(), Some("GMSL"));
        w.handle_key(Key::Enter).expect("choose");
        assert_eq!(w.depth(), 2);

        w.handle_key(Key::Back).expect("back");
        assert_eq!(w.depth(), 1);
        // FPA-1.2 (modified), spacer, save+reboot, save, discard, exit
        w.handle_key(Key::Down).expect("move");
        w.handle_key(Key::Down).expect("move");
        assert_eq!(w.view().expect("view").highlighted(), Some("Save without rebooting"));
        match w.handle_key(Key::Enter).expect("save") {
            WizardOutcome::Commit(request) => assert!(!request.reboot),
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn test_none_on_link_booster_menu_clears_port() {
        let mut w = e2e();
        open_link_booster_menu(&mut w);
        w.perform(Action::Choose(LinkBooster::Present)).expect("available");
        w.perform(Action::OpenPort("p0".to_string())).expect("valid");
        w.perform(Action::OpenSensor("imx900".to_string())).expect("valid");
        w.perform(Action::OpenLanes(4)).expect("valid");
        assert!(labels(&w).contains(&"None".to_string()));

        w.perform(Action::ClearPort).expect("valid");
        assert_eq!(w.state(), &WizardState::PortMenu { board: board() });
        assert!(w.selection().is_none());
    }

    #[test]
    fn test_minimum_capacity_lays_out_pending_top_level() {
        let topology = Topology::build(
            ConnectorKind::Wide,
            &["Tag FPA-1", "Tag FPA-2", "Tag FPA-3", "Tag FPA-4", "Tag imx900-P0-4Lane"],
        )
        .expect("valid topology");
        let mut w = Wizard::new(topology, MIN_PAGE_CAPACITY);
        assert!(w.view().is_ok());

        for action in [
            Action::OpenBoard(AddOnBoardId::new("1")),
            Action::OpenPort("P0".to_string()),
            Action::OpenSensor("imx900".to_string()),
            Action::OpenLanes(4),
            Action::Choose(LinkBooster::None),
            Action::Back,
        ] {
            w.perform(action).expect("valid action");
            assert!(w.view().is_ok(), "menu must fit in {}", w.state());
        }

        // 4 boards + 5 footer rows: one board per page
        let view = w.view().expect("top level fits");
        assert_eq!(view.rows.len(), MIN_PAGE_CAPACITY);
        assert_eq!(view.highlighted(), Some("FPA-1 (modified)"));
        assert_eq!(view.rows[MIN_PAGE_CAPACITY - 1].label, "   1/4 ->");
        assert!(w.handle_key(Key::Right).is_ok());
    }

    #[test]
    fn test_interrupt_and_back_at_top() {
        let mut w = e2e();
        assert_eq!(w.handle_key(Key::Back).expect("noop"), WizardOutcome::Pending);
        assert_eq!(w.handle_key(Key::Other).expect("noop"), WizardOutcome::Pending);
        assert_eq!(w.handle_key(Key::Interrupt).expect("exit"), WizardOutcome::Exit);
    }

    #[test]
    fn test_paging_with_left_right() {
        let mut descriptors = vec!["Tag FPA-1".to_string()];
        descriptors.extend((0..20).map(|i| format!("Tag imx{i:03}-P0-2Lane")));
        let topology = Topology::build(ConnectorKind::Narrow, &descriptors).expect("valid");
        let mut w = Wizard::new(topology, 15);
        w.perform(Action::OpenBoard(AddOnBoardId::new("1"))).expect("valid");
        w.perform(Action::OpenPort("P0".to_string())).expect("valid");

        // 15 - 3 footer - 2 page footer = 10 sensors per page
        let first = w.view().expect("view");
        assert_eq!(first.rows.len(), 15);
        assert_eq!(first.rows[14].label, "   1/2 ->");

        w.handle_key(Key::Right).expect("next page");
        let second = w.view().expect("view");
        assert_eq!(second.rows[14].label, "<- 2/2   ");
        assert_eq!(second.highlighted(), Some("imx010"));

        w.handle_key(Key::Right).expect("no further page");
        assert_eq!(w.view().expect("view").highlighted(), Some("imx010"));
        w.handle_key(Key::Left).expect("previous page");
        assert_eq!(w.view().expect("view").highlighted(), Some("imx000"));
    }
}
