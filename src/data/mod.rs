//! Core data models for fplwatch
//!
//! This module contains the upstream payload types shared by the refresh
//! controller, the views and the proxy. Field names follow the upstream JSON
//! so the types deserialize the API documents directly.

pub mod client;

pub use client::{FetchError, FplClient, Upstream, DEFAULT_API_BASE_URL};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Everything the dashboard needs, as cached after a successful fetch
///
/// The first five fields come from the bootstrap document, `fixtures` from
/// the fixtures document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LeagueData {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub element_types: Vec<ElementType>,
    #[serde(default)]
    pub total_players: u64,
    #[serde(default)]
    pub fixtures: Vec<Fixture>,
}

/// The bootstrap document as returned by upstream (no fixtures)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Bootstrap {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub element_types: Vec<ElementType>,
    #[serde(default)]
    pub total_players: u64,
}

impl LeagueData {
    /// Combines the bootstrap document with the fixture list
    pub fn from_parts(bootstrap: Bootstrap, fixtures: Vec<Fixture>) -> Self {
        Self {
            events: bootstrap.events,
            teams: bootstrap.teams,
            elements: bootstrap.elements,
            element_types: bootstrap.element_types,
            total_players: bootstrap.total_players,
            fixtures,
        }
    }

    pub fn team(&self, id: u32) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn element(&self, id: u32) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Short team code, or `???` for an unknown id
    pub fn team_short_name(&self, id: u32) -> &str {
        self.team(id).map(|t| t.short_name.as_str()).unwrap_or("???")
    }

    /// Position label (GKP/DEF/MID/FWD), or `-` for an unknown type
    pub fn position_name(&self, element_type: u32) -> &str {
        self.element_types
            .iter()
            .find(|t| t.id == element_type)
            .map(|t| t.singular_name_short.as_str())
            .unwrap_or("-")
    }

    /// The gameweek currently in progress
    pub fn current_event(&self) -> Option<&Event> {
        self.events.iter().find(|e| e.is_current)
    }

    /// The gameweek whose deadline is coming up
    pub fn next_event(&self) -> Option<&Event> {
        self.events.iter().find(|e| e.is_next)
    }
}

/// One gameweek
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Event {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    /// Transfer deadline; missing for events that have not been scheduled
    #[serde(default)]
    pub deadline_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_next: bool,
    #[serde(default)]
    pub is_previous: bool,
}

/// A club
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub short_name: String,
    #[serde(default)]
    pub strength: u8,
}

/// A player, called an "element" upstream
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Element {
    pub id: u32,
    pub web_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub second_name: String,
    pub team: u32,
    pub element_type: u32,
    /// Current price in tenths of a million
    pub now_cost: i32,
    /// Price change in the current gameweek, in tenths
    #[serde(default)]
    pub cost_change_event: i32,
    /// Price change since the start of the season, in tenths
    #[serde(default)]
    pub cost_change_start: i32,
    /// Ownership percentage; upstream sends it as a string
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub selected_by_percent: f64,
    #[serde(default)]
    pub transfers_in_event: i64,
    #[serde(default)]
    pub transfers_out_event: i64,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub form: f64,
    #[serde(default)]
    pub total_points: i32,
    #[serde(default)]
    pub event_points: i32,
    /// Availability flag: `a` available, `d` doubtful, `i` injured, ...
    #[serde(default)]
    pub status: String,
}

impl Element {
    /// Transfers in minus transfers out for the current gameweek
    pub fn net_transfers(&self) -> i64 {
        self.transfers_in_event - self.transfers_out_event
    }
}

/// A playing position
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementType {
    pub id: u32,
    pub singular_name_short: String,
}

/// A single match
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Fixture {
    pub id: u32,
    /// Gameweek; `None` for postponed fixtures that have not been rescheduled
    #[serde(default)]
    pub event: Option<u32>,
    #[serde(default)]
    pub kickoff_time: Option<DateTime<Utc>>,
    pub team_h: u32,
    pub team_a: u32,
    #[serde(default)]
    pub team_h_score: Option<u32>,
    #[serde(default)]
    pub team_a_score: Option<u32>,
    #[serde(default)]
    pub team_h_difficulty: u8,
    #[serde(default)]
    pub team_a_difficulty: u8,
    #[serde(default)]
    pub started: Option<bool>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub finished_provisional: bool,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub stats: Vec<FixtureStat>,
}

/// One stat line of a fixture, e.g. `goals_scored`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FixtureStat {
    pub identifier: String,
    #[serde(default)]
    pub h: Vec<StatValue>,
    #[serde(default)]
    pub a: Vec<StatValue>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatValue {
    pub element: u32,
    pub value: i32,
}

/// Accepts `"12.3"`, `12.3` or `null`
fn de_lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(f64),
        Str(String),
    }

    match Option::<NumOrStr>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(NumOrStr::Num(n)) => Ok(n),
        Some(NumOrStr::Str(s)) if s.trim().is_empty() => Ok(0.0),
        Some(NumOrStr::Str(s)) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Formats a price in tenths as `£7.5m`
pub fn format_price(tenths: i32) -> String {
    let sign = if tenths < 0 { "-" } else { "" };
    let abs = tenths.unsigned_abs();
    format!("{}£{}.{}m", sign, abs / 10, abs % 10)
}

/// Formats a price delta in tenths as `+0.1` / `-0.2`
pub fn format_delta(tenths: i32) -> String {
    let sign = if tenths < 0 { "-" } else { "+" };
    let abs = tenths.unsigned_abs();
    format!("{}{}.{}", sign, abs / 10, abs % 10)
}

#[cfg(test)]
pub(crate) mod sample {
    //! Small hand-built league used across the view tests

    use super::*;
    use chrono::TimeZone;

    pub fn team(id: u32, name: &str, short: &str) -> Team {
        Team {
            id,
            name: name.to_string(),
            short_name: short.to_string(),
            strength: 3,
        }
    }

    pub fn player(id: u32, web_name: &str, team: u32, now_cost: i32) -> Element {
        Element {
            id,
            web_name: web_name.to_string(),
            team,
            element_type: 3,
            now_cost,
            status: "a".to_string(),
            ..Default::default()
        }
    }

    pub fn event(id: u32, deadline: DateTime<Utc>) -> Event {
        Event {
            id,
            name: format!("Gameweek {}", id),
            deadline_time: Some(deadline),
            ..Default::default()
        }
    }

    pub fn fixture(id: u32, event: u32, team_h: u32, team_a: u32, dh: u8, da: u8) -> Fixture {
        Fixture {
            id,
            event: Some(event),
            team_h,
            team_a,
            team_h_difficulty: dh,
            team_a_difficulty: da,
            started: Some(false),
            ..Default::default()
        }
    }

    /// Three teams, gameweek 8 current and 9 next
    pub fn sample_league() -> LeagueData {
        let t0 = Utc.with_ymd_and_hms(2026, 10, 10, 10, 0, 0).unwrap();
        let mut gw8 = event(8, t0);
        gw8.is_current = true;
        let mut gw9 = event(9, t0 + chrono::Duration::days(7));
        gw9.is_next = true;
        let gw10 = event(10, t0 + chrono::Duration::days(14));

        LeagueData {
            events: vec![gw8, gw9, gw10],
            teams: vec![
                team(1, "Arsenal", "ARS"),
                team(2, "Brentford", "BRE"),
                team(3, "Chelsea", "CHE"),
            ],
            elements: vec![
                player(10, "Saka", 1, 100),
                player(20, "Mbeumo", 2, 78),
                player(30, "Palmer", 3, 105),
            ],
            element_types: vec![ElementType {
                id: 3,
                singular_name_short: "MID".to_string(),
            }],
            total_players: 10_000_000,
            fixtures: vec![
                fixture(1, 8, 1, 2, 2, 4),
                fixture(2, 9, 3, 1, 4, 4),
                fixture(3, 10, 2, 3, 3, 2),
            ],
        }
    }
}
