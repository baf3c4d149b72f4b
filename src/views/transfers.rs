//! Most transferred-in and transferred-out players this gameweek

use crate::data::{Element, LeagueData};

#[derive(Debug, Clone, PartialEq)]
pub struct TransferRow {
    pub id: u32,
    pub name: String,
    pub team: String,
    pub price: i32,
    pub transfers: i64,
    pub ownership: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransfersLeaderboard {
    pub most_in: Vec<TransferRow>,
    pub most_out: Vec<TransferRow>,
}

fn top_by<F>(data: &LeagueData, limit: usize, key: F) -> Vec<TransferRow>
where
    F: Fn(&Element) -> i64,
{
    let mut players: Vec<&Element> = data.elements.iter().filter(|e| key(e) > 0).collect();
    players.sort_by(|a, b| key(b).cmp(&key(a)).then_with(|| a.web_name.cmp(&b.web_name)));
    players
        .into_iter()
        .take(limit)
        .map(|e| TransferRow {
            id: e.id,
            name: e.web_name.clone(),
            team: data.team_short_name(e.team).to_string(),
            price: e.now_cost,
            transfers: key(e),
            ownership: e.selected_by_percent,
        })
        .collect()
}

/// Top `limit` players each way; players with no transfers are left out
pub fn build_transfers_leaderboard(data: &LeagueData, limit: usize) -> TransfersLeaderboard {
    TransfersLeaderboard {
        most_in: top_by(data, limit, |e| e.transfers_in_event),
        most_out: top_by(data, limit, |e| e.transfers_out_event),
    }
}
