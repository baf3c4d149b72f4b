//! Live match center: the matches of the gameweek in play

use chrono::{DateTime, Utc};

use crate::data::{Fixture, FixtureStat, LeagueData, StatValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Upcoming,
    Live,
    Finished,
}

impl MatchStatus {
    pub fn of(fixture: &Fixture) -> Self {
        if fixture.finished || fixture.finished_provisional {
            MatchStatus::Finished
        } else if fixture.started == Some(true) {
            MatchStatus::Live
        } else {
            MatchStatus::Upcoming
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scorer {
    pub name: String,
    pub goals: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchCard {
    pub fixture_id: u32,
    pub kickoff: Option<DateTime<Utc>>,
    pub home: String,
    pub away: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub minutes: u32,
    pub status: MatchStatus,
    pub home_scorers: Vec<Scorer>,
    pub away_scorers: Vec<Scorer>,
}

impl MatchCard {
    /// `2 - 1`, or `vs` before kick-off
    pub fn score_label(&self) -> String {
        match (self.home_score, self.away_score) {
            (Some(h), Some(a)) => format!("{} - {}", h, a),
            _ => "vs".to_string(),
        }
    }

    /// `67'`, `FT` or the kick-off time
    pub fn clock_label(&self) -> String {
        match self.status {
            MatchStatus::Finished => "FT".to_string(),
            MatchStatus::Live => format!("{}'", self.minutes),
            MatchStatus::Upcoming => self
                .kickoff
                .map(|k| k.format("%a %H:%M").to_string())
                .unwrap_or_else(|| "TBC".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiveCenter {
    pub event_id: Option<u32>,
    pub event_name: String,
    pub matches: Vec<MatchCard>,
}

impl LiveCenter {
    pub fn live_count(&self) -> usize {
        self.matches
            .iter()
            .filter(|m| m.status == MatchStatus::Live)
            .count()
    }
}

fn stat<'a>(fixture: &'a Fixture, identifier: &str) -> Option<&'a FixtureStat> {
    fixture.stats.iter().find(|s| s.identifier == identifier)
}

fn scorers(data: &LeagueData, goals: &[StatValue], own_goals: &[StatValue]) -> Vec<Scorer> {
    let name = |id: u32| {
        data.element(id)
            .map(|e| e.web_name.clone())
            .unwrap_or_else(|| format!("#{}", id))
    };

    goals
        .iter()
        .map(|g| Scorer {
            name: name(g.element),
            goals: g.value,
        })
        .chain(own_goals.iter().map(|g| Scorer {
            name: format!("{} (OG)", name(g.element)),
            goals: g.value,
        }))
        .collect()
}

fn match_card(data: &LeagueData, fixture: &Fixture) -> MatchCard {
    let goals = stat(fixture, "goals_scored");
    let own_goals = stat(fixture, "own_goals");
    let empty: &[StatValue] = &[];

    // Own goals by home players count for the away side and vice versa
    let home_scorers = scorers(
        data,
        goals.map(|s| s.h.as_slice()).unwrap_or(empty),
        own_goals.map(|s| s.a.as_slice()).unwrap_or(empty),
    );
    let away_scorers = scorers(
        data,
        goals.map(|s| s.a.as_slice()).unwrap_or(empty),
        own_goals.map(|s| s.h.as_slice()).unwrap_or(empty),
    );

    MatchCard {
        fixture_id: fixture.id,
        kickoff: fixture.kickoff_time,
        home: data.team_short_name(fixture.team_h).to_string(),
        away: data.team_short_name(fixture.team_a).to_string(),
        home_score: fixture.team_h_score,
        away_score: fixture.team_a_score,
        minutes: fixture.minutes,
        status: MatchStatus::of(fixture),
        home_scorers,
        away_scorers,
    }
}

/// Match cards for the current gameweek, or the next one between gameweeks
pub fn build_live_center(data: &LeagueData) -> LiveCenter {
    let Some(event) = data.current_event().or_else(|| data.next_event()) else {
        return LiveCenter::default();
    };

    let mut fixtures: Vec<&Fixture> = data
        .fixtures
        .iter()
        .filter(|f| f.event == Some(event.id))
        .collect();
    fixtures.sort_by_key(|f| (f.kickoff_time, f.id));

    LiveCenter {
        event_id: Some(event.id),
        event_name: event.name.clone(),
        matches: fixtures.into_iter().map(|f| match_card(data, f)).collect(),
    }
}
