//! Help overlay showing all keybindings
//!
//! Two columns: the numbered dashboard tabs on the left, everything else on
//! the right. The box is sized from its content and shrinks to fit small
//! terminals.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::Tab;

const KEY_WIDTH: usize = 11;
const COLUMN_WIDTH: u16 = 30;

/// Keys that work on every tab
const GENERAL_KEYS: [(&str, &str); 7] = [
    ("Tab, l", "Next tab"),
    ("S-Tab, h", "Previous tab"),
    ("j / k", "Scroll rows"),
    ("g", "Back to top"),
    ("r", "Refresh now"),
    ("?", "Toggle help"),
    ("q, Esc", "Quit"),
];

/// Renders the help overlay on top of the current view
pub fn render(frame: &mut Frame) {
    let rows = GENERAL_KEYS.len().max(Tab::ALL.len()) as u16;
    // heading + blank + rows + blank + footer + borders
    let height = rows + 6;
    let width = COLUMN_WIDTH * 2 + 3;
    let overlay_area = centered(width, height, frame.area());

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let [body, footer] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);
    let [tabs_area, keys_area] =
        Layout::horizontal([Constraint::Length(COLUMN_WIDTH + 1), Constraint::Min(0)])
            .areas(body);

    let mut tab_lines = vec![heading("Tabs"), Line::from("")];
    tab_lines.extend(
        Tab::ALL
            .iter()
            .map(|tab| key_line(&(tab.index() + 1).to_string(), tab.title())),
    );

    let mut key_lines = vec![heading("Keys"), Line::from("")];
    key_lines.extend(
        GENERAL_KEYS
            .iter()
            .map(|(key, description)| key_line(key, description)),
    );

    frame.render_widget(Paragraph::new(tab_lines), tabs_area);
    frame.render_widget(Paragraph::new(key_lines), keys_area);
    frame.render_widget(
        Paragraph::new(Span::styled(
            " Esc or ? to close",
            Style::default().fg(Color::DarkGray),
        )),
        footer,
    );
}

fn heading(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!(" {}", title),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
}

fn key_line(key: &str, description: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!(" {:<width$}", key, width = KEY_WIDTH),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(description.to_string()),
    ])
}

/// `width` x `height` in the middle of `area`, clipped to it
fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
