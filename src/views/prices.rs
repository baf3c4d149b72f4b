//! Price changes and the price predictor
//!
//! Risers and fallers come straight from the upstream per-gameweek cost
//! change. The predictor is a heuristic: net transfers measured against a
//! share of the player's owner base.

use std::cmp::Ordering;

use crate::data::{Element, LeagueData};

/// Net transfers never need to exceed this to trigger a move
pub const MIN_THRESHOLD: f64 = 10_000.0;

/// Share of a player's owners that must move for a price change
pub const OWNER_SHARE: f64 = 0.05;

const RISE_AT: f64 = 100.0;
const LIKELY_AT: f64 = 70.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceChangeRow {
    pub id: u32,
    pub name: String,
    pub team: String,
    pub position: String,
    /// Current price in tenths
    pub price: i32,
    /// Change this gameweek in tenths
    pub change: i32,
    pub net_transfers: i64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceChanges {
    pub risers: Vec<PriceChangeRow>,
    pub fallers: Vec<PriceChangeRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prediction {
    Rise,
    LikelyRise,
    Stable,
    LikelyFall,
    Fall,
}

impl Prediction {
    pub fn from_progress(progress: f64) -> Self {
        if progress >= RISE_AT {
            Prediction::Rise
        } else if progress >= LIKELY_AT {
            Prediction::LikelyRise
        } else if progress <= -RISE_AT {
            Prediction::Fall
        } else if progress <= -LIKELY_AT {
            Prediction::LikelyFall
        } else {
            Prediction::Stable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Prediction::Rise => "Rise",
            Prediction::LikelyRise => "Likely rise",
            Prediction::Stable => "Stable",
            Prediction::LikelyFall => "Likely fall",
            Prediction::Fall => "Fall",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictorRow {
    pub id: u32,
    pub name: String,
    pub team: String,
    pub price: i32,
    pub ownership: f64,
    pub net_transfers: i64,
    /// Percent of the way to the next change; negative towards a fall
    pub progress: f64,
    pub prediction: Prediction,
}

fn change_row(data: &LeagueData, e: &Element) -> PriceChangeRow {
    PriceChangeRow {
        id: e.id,
        name: e.web_name.clone(),
        team: data.team_short_name(e.team).to_string(),
        position: data.position_name(e.element_type).to_string(),
        price: e.now_cost,
        change: e.cost_change_event,
        net_transfers: e.net_transfers(),
    }
}

/// Players whose price moved this gameweek
pub fn build_price_changes(data: &LeagueData) -> PriceChanges {
    let mut risers: Vec<PriceChangeRow> = data
        .elements
        .iter()
        .filter(|e| e.cost_change_event > 0)
        .map(|e| change_row(data, e))
        .collect();
    risers.sort_by(|a, b| {
        b.change
            .cmp(&a.change)
            .then(b.net_transfers.cmp(&a.net_transfers))
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut fallers: Vec<PriceChangeRow> = data
        .elements
        .iter()
        .filter(|e| e.cost_change_event < 0)
        .map(|e| change_row(data, e))
        .collect();
    fallers.sort_by(|a, b| {
        a.change
            .cmp(&b.change)
            .then(a.net_transfers.cmp(&b.net_transfers))
            .then_with(|| a.name.cmp(&b.name))
    });

    PriceChanges { risers, fallers }
}

/// Net transfers needed for a move, given ownership and the player base
pub fn transfer_threshold(total_players: u64, ownership_percent: f64) -> f64 {
    let owners = total_players as f64 * ownership_percent / 100.0;
    (owners * OWNER_SHARE).max(MIN_THRESHOLD)
}

/// Progress towards the next price change, in percent
pub fn price_progress(element: &Element, total_players: u64) -> f64 {
    let threshold = transfer_threshold(total_players, element.selected_by_percent);
    100.0 * element.net_transfers() as f64 / threshold
}

/// Players most likely to change price, strongest signal first
///
/// Stable players are left out; at most `limit` rows.
pub fn build_predictor(data: &LeagueData, limit: usize) -> Vec<PredictorRow> {
    let mut rows: Vec<PredictorRow> = data
        .elements
        .iter()
        .map(|e| {
            let progress = price_progress(e, data.total_players);
            PredictorRow {
                id: e.id,
                name: e.web_name.clone(),
                team: data.team_short_name(e.team).to_string(),
                price: e.now_cost,
                ownership: e.selected_by_percent,
                net_transfers: e.net_transfers(),
                progress,
                prediction: Prediction::from_progress(progress),
            }
        })
        .filter(|row| row.prediction != Prediction::Stable)
        .collect();

    rows.sort_by(|a, b| {
        b.progress
            .abs()
            .partial_cmp(&a.progress.abs())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    rows.truncate(limit);
    rows
}
