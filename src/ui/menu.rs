//! Menu and message box rendering

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::theme::{Styles, UiText};
use crate::wizard::{MenuRow, MenuView};

/// Rows used around the menu list: title block, list borders, status, hints.
pub const CHROME_ROWS: u16 = 3 + 2 + 1 + 1;

/// Render the wizard menu full screen.
pub fn render_menu(f: &mut Frame, view: &MenuView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    let title = Paragraph::new(view.title.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border_active())
                .title(UiText::APP_TITLE),
        )
        .style(Styles::title());
    f.render_widget(title, chunks[0]);

    let items: Vec<ListItem> = view.rows.iter().map(menu_item).collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::border_active())
            .style(Styles::panel_bg()),
    );
    f.render_widget(list, chunks[1]);

    if let Some(status) = &view.status {
        f.render_widget(Paragraph::new(status.as_str()).style(Styles::warning()), chunks[2]);
    }

    let hints = Paragraph::new(UiText::NAV_HINTS)
        .style(Styles::nav_hint())
        .alignment(Alignment::Center);
    f.render_widget(hints, chunks[3]);
}

fn menu_item(row: &MenuRow) -> ListItem<'_> {
    let (marker, style) = if row.highlighted {
        ("> ", Styles::selected())
    } else if row.selectable {
        ("  ", Styles::unselected())
    } else {
        ("  ", Styles::text_muted())
    };
    ListItem::new(Line::from(Span::styled(format!("{marker}{}", row.label), style)))
}

/// Render a centered message box over the current screen.
pub fn render_message(f: &mut Frame, lines: &[String]) {
    let width = lines
        .iter()
        .map(|l| l.chars().count())
        .chain([UiText::PRESS_ANY_KEY.len()])
        .max()
        .unwrap_or_default() as u16
        + 4;
    let height = lines.len() as u16 + 4;
    let area = centered(f.area(), width, height);

    let mut text: Vec<Line> = lines
        .iter()
        .map(|l| Line::from(Span::styled(l.as_str(), Styles::text())))
        .collect();
    text.push(Line::default());
    text.push(Line::from(Span::styled(UiText::PRESS_ANY_KEY, Styles::nav_hint())));

    let message = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border_active())
                .style(Styles::panel_bg()),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, area);
    f.render_widget(message, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
