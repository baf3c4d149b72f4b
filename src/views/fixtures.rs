//! Fixture difficulty ticker
//!
//! One row per team, one cell per upcoming gameweek. A cell may be empty
//! (blank gameweek) or hold several fixtures (double gameweek).

use std::cmp::Ordering;

use crate::data::{Fixture, LeagueData};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerFixture {
    pub opponent: String,
    pub home: bool,
    /// 1 (easiest) to 5 (hardest), from this team's point of view
    pub difficulty: u8,
}

impl TickerFixture {
    /// `ARS (H)` / `che (a)` style label; away opponents in lower case
    pub fn label(&self) -> String {
        if self.home {
            format!("{} (H)", self.opponent.to_uppercase())
        } else {
            format!("{} (a)", self.opponent.to_lowercase())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerCell {
    pub event_id: u32,
    pub fixtures: Vec<TickerFixture>,
}

impl TickerCell {
    pub fn is_blank(&self) -> bool {
        self.fixtures.is_empty()
    }

    pub fn is_double(&self) -> bool {
        self.fixtures.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickerRow {
    pub team_id: u32,
    pub team_name: String,
    pub short_name: String,
    pub cells: Vec<TickerCell>,
    /// Mean difficulty over every fixture in the window; `None` if none
    pub average_difficulty: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FixtureTicker {
    /// Gameweek ids, in column order
    pub events: Vec<u32>,
    /// Easiest run first
    pub rows: Vec<TickerRow>,
}

/// First gameweek shown: the next one, or the one after the current
fn first_upcoming_event(data: &LeagueData) -> Option<u32> {
    data.next_event()
        .map(|e| e.id)
        .or_else(|| data.current_event().map(|e| e.id + 1))
}

fn ticker_fixture(data: &LeagueData, fixture: &Fixture, team_id: u32) -> TickerFixture {
    let home = fixture.team_h == team_id;
    let (opponent, difficulty) = if home {
        (fixture.team_a, fixture.team_h_difficulty)
    } else {
        (fixture.team_h, fixture.team_a_difficulty)
    };
    TickerFixture {
        opponent: data.team_short_name(opponent).to_string(),
        home,
        difficulty,
    }
}

/// Builds the ticker for the next `horizon` gameweeks
pub fn build_fixture_ticker(data: &LeagueData, horizon: usize) -> FixtureTicker {
    let Some(first) = first_upcoming_event(data) else {
        return FixtureTicker::default();
    };

    let mut events: Vec<u32> = data
        .events
        .iter()
        .map(|e| e.id)
        .filter(|id| *id >= first)
        .collect();
    events.sort_unstable();
    events.truncate(horizon);

    let mut rows: Vec<TickerRow> = data
        .teams
        .iter()
        .map(|team| {
            let cells: Vec<TickerCell> = events
                .iter()
                .map(|&event_id| {
                    let mut in_event: Vec<&Fixture> = data
                        .fixtures
                        .iter()
                        .filter(|f| f.event == Some(event_id))
                        .filter(|f| f.team_h == team.id || f.team_a == team.id)
                        .collect();
                    in_event.sort_by_key(|f| (f.kickoff_time, f.id));
                    TickerCell {
                        event_id,
                        fixtures: in_event
                            .into_iter()
                            .map(|f| ticker_fixture(data, f, team.id))
                            .collect(),
                    }
                })
                .collect();

            let difficulties: Vec<u8> = cells
                .iter()
                .flat_map(|c| c.fixtures.iter().map(|f| f.difficulty))
                .collect();
            let average_difficulty = if difficulties.is_empty() {
                None
            } else {
                let sum: u32 = difficulties.iter().map(|&d| u32::from(d)).sum();
                Some(f64::from(sum) / difficulties.len() as f64)
            };

            TickerRow {
                team_id: team.id,
                team_name: team.name.clone(),
                short_name: team.short_name.clone(),
                cells,
                average_difficulty,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        compare_average(a.average_difficulty, b.average_difficulty)
            .then_with(|| a.team_name.cmp(&b.team_name))
    });

    FixtureTicker { events, rows }
}

/// Ascending, teams without fixtures last
fn compare_average(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::{fixture, sample_league};

    fn row<'a>(ticker: &'a FixtureTicker, short: &str) -> &'a TickerRow {
        ticker
            .rows
            .iter()
            .find(|r| r.short_name == short)
            .expect("team row")
    }

    #[test]
    fn test_ticker_starts_after_current_gameweek() {
        let ticker = build_fixture_ticker(&sample_league(), 5);

        assert_eq!(ticker.events, vec![9, 10]);
        assert_eq!(ticker.rows.len(), 3);
    }

    #[test]
    fn test_ticker_uses_team_perspective_difficulty() {
        let ticker = build_fixture_ticker(&sample_league(), 5);

        // GW9: CHE (h) vs ARS (a), difficulty 4 for both
        let ars = row(&ticker, "ARS");
        assert_eq!(
            ars.cells[0].fixtures,
            vec![TickerFixture {
                opponent: "CHE".to_string(),
                home: false,
                difficulty: 4
            }]
        );
        assert!(ars.cells[1].is_blank());

        // GW10: BRE (h) vs CHE (a), 3 for BRE, 2 for CHE
        let che = row(&ticker, "CHE");
        assert_eq!(che.cells[1].fixtures[0].difficulty, 2);
        assert_eq!(che.cells[1].fixtures[0].label(), "bre (a)");
        assert_eq!(row(&ticker, "BRE").cells[1].fixtures[0].label(), "CHE (H)");
    }

    #[test]
    fn test_ticker_sorts_easiest_run_first() {
        let ticker = build_fixture_ticker(&sample_league(), 5);

        let order: Vec<&str> = ticker.rows.iter().map(|r| r.short_name.as_str()).collect();
        // CHE avg 3.0, BRE avg 3.0 (name tie-break), ARS avg 4.0
        assert_eq!(order, vec!["BRE", "CHE", "ARS"]);
        assert_eq!(row(&ticker, "ARS").average_difficulty, Some(4.0));
    }

    #[test]
    fn test_double_gameweek_cell() {
        let mut data = sample_league();
        data.fixtures.push(fixture(4, 9, 2, 1, 5, 2));

        let ticker = build_fixture_ticker(&data, 5);
        let ars = row(&ticker, "ARS");

        assert!(ars.cells[0].is_double());
        assert_eq!(ars.cells[0].fixtures.len(), 2);
    }

    #[test]
    fn test_horizon_limits_columns() {
        let ticker = build_fixture_ticker(&sample_league(), 1);

        assert_eq!(ticker.events, vec![9]);
        assert!(ticker.rows.iter().all(|r| r.cells.len() == 1));
    }

    #[test]
    fn test_teams_without_fixtures_sort_last() {
        let mut data = sample_league();
        data.teams.push(crate::data::sample::team(4, "Aston Villa", "AVL"));

        let ticker = build_fixture_ticker(&data, 5);

        assert_eq!(ticker.rows.last().map(|r| r.short_name.as_str()), Some("AVL"));
        assert!(ticker.rows.last().unwrap().average_difficulty.is_none());
    }

    #[test]
    fn test_empty_ticker_when_season_over() {
        let mut data = sample_league();
        for e in &mut data.events {
            e.is_current = false;
            e.is_next = false;
        }

        assert_eq!(build_fixture_ticker(&data, 5), FixtureTicker::default());
    }
}
