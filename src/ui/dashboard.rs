//! Dashboard screen rendering
//!
//! Header with the deadline countdown, an optional warning banner, the tab
//! bar, and one table per tab.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs},
    Frame,
};

use crate::app::{App, Tab};
use crate::data::{format_delta, format_price};
use crate::refresh::DataSource;
use crate::views::{
    Dashboard, FixtureTicker, LiveCenter, MatchStatus, Prediction, PredictorRow, PriceChangeRow,
    TickerCell, TransferRow,
};

/// Colour for a fixture difficulty rating
fn difficulty_color(difficulty: u8) -> Color {
    match difficulty {
        1 => Color::Green,
        2 => Color::LightGreen,
        3 => Color::Gray,
        4 => Color::LightRed,
        _ => Color::Red,
    }
}

fn prediction_color(prediction: Prediction) -> Color {
    match prediction {
        Prediction::Rise => Color::Green,
        Prediction::LikelyRise => Color::LightGreen,
        Prediction::Stable => Color::Gray,
        Prediction::LikelyFall => Color::LightRed,
        Prediction::Fall => Color::Red,
    }
}

fn header_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

fn source_label(source: DataSource) -> &'static str {
    match source {
        DataSource::Network => "live",
        DataSource::FreshCache => "cached",
        DataSource::StaleCache => "stale",
        DataSource::Nothing => "no data",
    }
}

/// Renders the whole dashboard for `now`
pub fn render(frame: &mut Frame, app: &App, now: DateTime<Utc>) {
    let banner = app.banner();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(if banner.is_some() { 1 } else { 0 }),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, now, chunks[0]);
    if let Some(text) = banner {
        let warning = Paragraph::new(text)
            .style(Style::default().fg(Color::Black).bg(Color::Yellow))
            .alignment(Alignment::Center);
        frame.render_widget(warning, chunks[1]);
    }
    render_tabs(frame, app, chunks[2]);

    match &app.dashboard {
        Some(dashboard) => render_body(frame, app, dashboard, chunks[3]),
        None => {
            let empty = Paragraph::new("No data available. Press r to retry.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(empty, chunks[3]);
        }
    }

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("Tab/1-5", Style::default().fg(Color::Yellow)),
        Span::raw(" switch  "),
        Span::styled("j/k", Style::default().fg(Color::Yellow)),
        Span::raw(" scroll  "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" refresh  "),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::raw(" help  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" quit"),
    ]))
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[4]);
}

fn render_header(frame: &mut Frame, app: &App, now: DateTime<Utc>, area: Rect) {
    let mut spans = match app.countdown(now) {
        Some(c) => {
            let style = if c.is_passed() {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            };
            vec![
                Span::raw(format!("{} deadline ", c.event_name)),
                Span::styled(c.label(), style),
            ]
        }
        None => vec![Span::styled(
            "No upcoming deadline",
            Style::default().fg(Color::DarkGray),
        )],
    };

    if let Some(outcome) = &app.outcome {
        let updated = app
            .last_refresh
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_default();
        spans.push(Span::styled(
            format!("   {} {}", source_label(outcome.source), updated),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(" fplwatch ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(header, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| Line::from(format!("{} {}", i + 1, t.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn render_body(frame: &mut Frame, app: &App, dashboard: &Dashboard, area: Rect) {
    let skip = app.scroll_offset as usize;
    match app.tab {
        Tab::Prices => {
            let halves = split_halves(area);
            frame.render_widget(
                change_table(" Risers ", &dashboard.price_changes.risers, skip),
                halves[0],
            );
            frame.render_widget(
                change_table(" Fallers ", &dashboard.price_changes.fallers, skip),
                halves[1],
            );
        }
        Tab::Predictor => {
            frame.render_widget(predictor_table(&dashboard.predictor, skip), area);
        }
        Tab::Fixtures => {
            frame.render_widget(ticker_table(&dashboard.ticker, skip), area);
        }
        Tab::Live => {
            frame.render_widget(live_table(&dashboard.live, skip), area);
        }
        Tab::Transfers => {
            let halves = split_halves(area);
            frame.render_widget(
                transfer_table(" Most in ", &dashboard.transfers.most_in, skip),
                halves[0],
            );
            frame.render_widget(
                transfer_table(" Most out ", &dashboard.transfers.most_out, skip),
                halves[1],
            );
        }
    }
}

fn split_halves(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
}

fn titled(title: &str) -> Block<'static> {
    Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
}

fn change_table(title: &str, rows: &[PriceChangeRow], skip: usize) -> Table<'static> {
    let body: Vec<Row> = rows
        .iter()
        .skip(skip)
        .map(|r| {
            let color = if r.change > 0 { Color::Green } else { Color::Red };
            Row::new(vec![
                Cell::from(r.name.clone()),
                Cell::from(r.team.clone()),
                Cell::from(r.position.clone()),
                Cell::from(format_price(r.price)),
                Cell::from(format_delta(r.change)).style(Style::default().fg(color)),
            ])
        })
        .collect();

    Table::new(
        body,
        [
            Constraint::Min(12),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(7),
            Constraint::Length(5),
        ],
    )
    .header(Row::new(vec!["Player", "Team", "Pos", "Price", "+/-"]).style(header_style()))
    .block(titled(title))
}

fn predictor_table(rows: &[PredictorRow], skip: usize) -> Table<'static> {
    let body: Vec<Row> = rows
        .iter()
        .skip(skip)
        .map(|r| {
            let color = prediction_color(r.prediction);
            Row::new(vec![
                Cell::from(r.name.clone()),
                Cell::from(r.team.clone()),
                Cell::from(format_price(r.price)),
                Cell::from(format!("{:.1}%", r.ownership)),
                Cell::from(format!("{:+}", r.net_transfers)),
                Cell::from(format!("{:.0}%", r.progress)).style(Style::default().fg(color)),
                Cell::from(r.prediction.label()).style(Style::default().fg(color)),
            ])
        })
        .collect();

    Table::new(
        body,
        [
            Constraint::Min(12),
            Constraint::Length(4),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(9),
            Constraint::Length(6),
            Constraint::Length(11),
        ],
    )
    .header(
        Row::new(vec![
            "Player", "Team", "Price", "Owned", "Net", "Prog", "Prediction",
        ])
        .style(header_style()),
    )
    .block(titled(" Price predictor "))
}

fn ticker_cell(cell: &TickerCell) -> Cell<'static> {
    if cell.is_blank() {
        return Cell::from("-").style(Style::default().fg(Color::DarkGray));
    }
    let spans: Vec<Span> = cell
        .fixtures
        .iter()
        .map(|f| {
            Span::styled(
                format!("{} ", f.label()),
                Style::default().fg(difficulty_color(f.difficulty)),
            )
        })
        .collect();
    Cell::from(Line::from(spans))
}

fn ticker_table(ticker: &FixtureTicker, skip: usize) -> Table<'static> {
    let mut header = vec!["Team".to_string()];
    header.extend(ticker.events.iter().map(|id| format!("GW{}", id)));
    header.push("Avg".to_string());

    let body: Vec<Row> = ticker
        .rows
        .iter()
        .skip(skip)
        .map(|row| {
            let mut cells = vec![Cell::from(row.short_name.clone())];
            cells.extend(row.cells.iter().map(ticker_cell));
            cells.push(Cell::from(
                row.average_difficulty
                    .map(|a| format!("{:.2}", a))
                    .unwrap_or_else(|| "-".to_string()),
            ));
            Row::new(cells)
        })
        .collect();

    let mut widths = vec![Constraint::Length(5)];
    widths.extend(ticker.events.iter().map(|_| Constraint::Length(16)));
    widths.push(Constraint::Length(5));

    Table::new(body, widths)
        .header(Row::new(header).style(header_style()))
        .block(titled(" Fixture difficulty "))
}

fn live_table(live: &LiveCenter, skip: usize) -> Table<'static> {
    let body: Vec<Row> = live
        .matches
        .iter()
        .skip(skip)
        .map(|m| {
            let status_style = match m.status {
                MatchStatus::Live => Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
                MatchStatus::Finished => Style::default().fg(Color::Gray),
                MatchStatus::Upcoming => Style::default().fg(Color::DarkGray),
            };
            let scorers: Vec<String> = m
                .home_scorers
                .iter()
                .chain(m.away_scorers.iter())
                .map(|s| {
                    if s.goals > 1 {
                        format!("{} x{}", s.name, s.goals)
                    } else {
                        s.name.clone()
                    }
                })
                .collect();
            Row::new(vec![
                Cell::from(m.home.clone()),
                Cell::from(m.score_label()),
                Cell::from(m.away.clone()),
                Cell::from(m.clock_label()).style(status_style),
                Cell::from(scorers.join(", ")),
            ])
        })
        .collect();

    let title = if live.event_name.is_empty() {
        " Matches ".to_string()
    } else {
        format!(" {} ({} live) ", live.event_name, live.live_count())
    };

    Table::new(
        body,
        [
            Constraint::Length(5),
            Constraint::Length(7),
            Constraint::Length(5),
            Constraint::Length(10),
            Constraint::Min(10),
        ],
    )
    .header(Row::new(vec!["Home", "Score", "Away", "Time", "Scorers"]).style(header_style()))
    .block(Block::default().title(title).borders(Borders::ALL))
}

fn transfer_table(title: &str, rows: &[TransferRow], skip: usize) -> Table<'static> {
    let body: Vec<Row> = rows
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(i, r)| {
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(r.name.clone()),
                Cell::from(r.team.clone()),
                Cell::from(format_price(r.price)),
                Cell::from(format!("{}", r.transfers)),
            ])
        })
        .collect();

    Table::new(
        body,
        [
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(4),
            Constraint::Length(7),
            Constraint::Length(9),
        ],
    )
    .header(Row::new(vec!["#", "Player", "Team", "Price", "Transfers"]).style(header_style()))
    .block(titled(title))
}
