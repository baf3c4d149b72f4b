//! Plain-text rendering of the dashboard for `fplwatch summary`

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::data::{format_delta, format_price};
use crate::refresh::{DataSource, RefreshOutcome};
use crate::views::{Dashboard, PriceChangeRow, TransferRow};

fn source_label(source: DataSource) -> &'static str {
    match source {
        DataSource::Network => "live",
        DataSource::FreshCache => "cache",
        DataSource::StaleCache => "stale cache",
        DataSource::Nothing => "none",
    }
}

fn write_changes(out: &mut String, title: &str, rows: &[PriceChangeRow]) {
    let _ = writeln!(out, "{}", title);
    if rows.is_empty() {
        let _ = writeln!(out, "  (none)");
        return;
    }
    for row in rows {
        let _ = writeln!(
            out,
            "  {:<16} {:<4} {:<4} {:>7} {:>5}",
            row.name,
            row.team,
            row.position,
            format_price(row.price),
            format_delta(row.change)
        );
    }
}

fn write_transfers(out: &mut String, title: &str, rows: &[TransferRow]) {
    let _ = writeln!(out, "{}", title);
    if rows.is_empty() {
        let _ = writeln!(out, "  (none)");
        return;
    }
    for (i, row) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}. {:<16} {:<4} {:>7} {:>9}",
            i + 1,
            row.name,
            row.team,
            format_price(row.price),
            row.transfers
        );
    }
}

/// Header lines: data source, age and any warning banner
pub fn render_status(outcome: &RefreshOutcome) -> String {
    let mut out = String::new();
    match outcome.fetched_at {
        Some(at) => {
            let _ = writeln!(
                out,
                "Data: {} (updated {})",
                source_label(outcome.source),
                at.format("%Y-%m-%d %H:%M UTC")
            );
        }
        None => {
            let _ = writeln!(out, "Data: {}", source_label(outcome.source));
        }
    }
    if let Some(banner) = outcome.banner() {
        let _ = writeln!(out, "! {}", banner);
    }
    out
}

/// Every widget as plain text, in dashboard order
pub fn render_dashboard(dashboard: &Dashboard, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    match &dashboard.countdown {
        Some(c) => {
            let _ = writeln!(
                out,
                "{} deadline {}: {}",
                c.event_name,
                c.deadline.format("%a %d %b %H:%M UTC"),
                c.label()
            );
        }
        None => {
            let _ = writeln!(out, "No upcoming deadline");
        }
    }
    let _ = writeln!(out);

    write_changes(&mut out, "Price risers", &dashboard.price_changes.risers);
    write_changes(&mut out, "Price fallers", &dashboard.price_changes.fallers);
    let _ = writeln!(out);

    let _ = writeln!(out, "Price predictor");
    if dashboard.predictor.is_empty() {
        let _ = writeln!(out, "  (no movers)");
    }
    for row in &dashboard.predictor {
        let _ = writeln!(
            out,
            "  {:<16} {:<4} {:>7} {:>6.1}% {:>+8} {:>6.1}%  {}",
            row.name,
            row.team,
            format_price(row.price),
            row.ownership,
            row.net_transfers,
            row.progress,
            row.prediction.label()
        );
    }
    let _ = writeln!(out);

    let header: Vec<String> = dashboard
        .ticker
        .events
        .iter()
        .map(|id| format!("{:<14}", format!("GW{}", id)))
        .collect();
    let _ = writeln!(out, "Fixture ticker");
    let _ = writeln!(out, "  {:<5}{}", "", header.join(""));
    for row in &dashboard.ticker.rows {
        let cells: Vec<String> = row
            .cells
            .iter()
            .map(|cell| {
                let text = if cell.is_blank() {
                    "-".to_string()
                } else {
                    cell.fixtures
                        .iter()
                        .map(|f| f.label())
                        .collect::<Vec<_>>()
                        .join(" ")
                };
                format!("{:<14}", text)
            })
            .collect();
        let _ = writeln!(out, "  {:<5}{}", row.short_name, cells.join("").trim_end());
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Matches: {}", dashboard.live.event_name);
    if dashboard.live.matches.is_empty() {
        let _ = writeln!(out, "  (no fixtures)");
    }
    for card in &dashboard.live.matches {
        let _ = writeln!(
            out,
            "  {:<4} {:^7} {:<4} {}",
            card.home,
            card.score_label(),
            card.away,
            card.clock_label()
        );
        let scorers: Vec<String> = card
            .home_scorers
            .iter()
            .chain(card.away_scorers.iter())
            .map(|s| {
                if s.goals > 1 {
                    format!("{} x{}", s.name, s.goals)
                } else {
                    s.name.clone()
                }
            })
            .collect();
        if !scorers.is_empty() {
            let _ = writeln!(out, "       {}", scorers.join(", "));
        }
    }
    let _ = writeln!(out);

    write_transfers(&mut out, "Most transferred in", &dashboard.transfers.most_in);
    write_transfers(&mut out, "Most transferred out", &dashboard.transfers.most_out);

    let _ = writeln!(out);
    let _ = writeln!(out, "Generated {}", now.format("%Y-%m-%d %H:%M:%S UTC"));
    out
}
