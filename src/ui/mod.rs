//! User interface module
//!
//! - `menu` - rendering of the wizard menu and message boxes
//! - [`Frontend`] - the seam between the application loop and a terminal
//!
//! The application loop only talks to [`Frontend`]; [`TerminalFrontend`] is
//! the crossterm/ratatui implementation.

mod menu;

pub use menu::{CHROME_ROWS, render_menu, render_message};

use std::io::{Stdout, stdout};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::error::{CamConfigError, Result};
use crate::wizard::{Key, MenuView};

/// Screen and keyboard used by the application loop.
pub trait Frontend {
    /// Draw the current menu.
    fn render(&mut self, view: &MenuView) -> Result<()>;

    /// Block until the next key press.
    fn read_key(&mut self) -> Result<Key>;

    /// Screen size as (width, height).
    fn geometry(&self) -> Result<(u16, u16)>;

    /// Show `lines` and wait for a key press.
    fn show_message(&mut self, lines: &[String]) -> Result<()>;
}

/// Map a terminal key event to a wizard key.
pub fn decode_key(event: KeyEvent) -> Key {
    if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
        return Key::Interrupt;
    }
    match event.code {
        KeyCode::Up | KeyCode::Char('k') => Key::Up,
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => Key::Down,
        KeyCode::Left | KeyCode::PageUp => Key::Left,
        KeyCode::Right | KeyCode::PageDown => Key::Right,
        KeyCode::Enter | KeyCode::Char(' ') => Key::Enter,
        KeyCode::Esc | KeyCode::Backspace => Key::Back,
        _ => Key::Other,
    }
}

/// Full-screen crossterm terminal.
///
/// Raw mode and the alternate screen are left when the value is dropped, so
/// an error path restores the terminal as well.
pub struct TerminalFrontend {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalFrontend {
    pub fn new() -> Result<Self> {
        debug!("Initializing terminal for TUI mode");
        enable_raw_mode()
            .map_err(|e| CamConfigError::terminal(format!("Failed to enable raw mode: {e}")))?;
        crossterm::execute!(stdout(), EnterAlternateScreen).map_err(|e| {
            let _ = disable_raw_mode();
            CamConfigError::terminal(format!("Failed to enter alternate screen: {e}"))
        })?;

        let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))
            .map_err(|e| CamConfigError::terminal(format!("Failed to create terminal: {e}")))?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(Self { terminal })
    }

    fn read_event_key() -> Result<Key> {
        loop {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(decode_key(key)),
                // Redraw at the new size
                Event::Resize(..) => return Ok(Key::Other),
                _ => {}
            }
        }
    }
}

impl Frontend for TerminalFrontend {
    fn render(&mut self, view: &MenuView) -> Result<()> {
        self.terminal.draw(|f| render_menu(f, view))?;
        Ok(())
    }

    fn read_key(&mut self) -> Result<Key> {
        Self::read_event_key()
    }

    fn geometry(&self) -> Result<(u16, u16)> {
        Ok(crossterm::terminal::size()?)
    }

    fn show_message(&mut self, lines: &[String]) -> Result<()> {
        self.terminal.draw(|f| render_message(f, lines))?;
        Self::read_event_key()?;
        Ok(())
    }
}

impl Drop for TerminalFrontend {
    fn drop(&mut self) {
        // Always attempt cleanup, even if the app failed
        let _ = disable_raw_mode();
        let _ = crossterm::execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
        debug!("Terminal restored");
    }
}
