//! Pure view models derived from a [`LeagueData`] payload
//!
//! Every widget of the dashboard is a function from the payload (and the
//! current time, where it matters) to a plain struct. The terminal UI and the
//! plain-text summary only format these structs.

pub mod countdown;
pub mod fixtures;
pub mod live;
pub mod prices;
pub mod transfers;

pub use countdown::{build_countdown, Countdown};
pub use fixtures::{build_fixture_ticker, FixtureTicker, TickerCell, TickerRow};
pub use live::{build_live_center, LiveCenter, MatchCard, MatchStatus};
pub use prices::{
    build_predictor, build_price_changes, PredictorRow, PriceChangeRow, PriceChanges, Prediction,
};
pub use transfers::{build_transfers_leaderboard, TransferRow, TransfersLeaderboard};

use chrono::{DateTime, Utc};

use crate::data::LeagueData;

/// Row limits and horizons for the views
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    /// Gameweeks shown in the fixture ticker
    pub ticker_horizon: usize,
    /// Rows in the predictor and transfer tables
    pub leaderboard_size: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            ticker_horizon: 5,
            leaderboard_size: 10,
        }
    }
}

/// All widgets at once
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub countdown: Option<Countdown>,
    pub price_changes: PriceChanges,
    pub predictor: Vec<PredictorRow>,
    pub ticker: FixtureTicker,
    pub live: LiveCenter,
    pub transfers: TransfersLeaderboard,
}

/// Builds every view model from one payload
pub fn build_dashboard(data: &LeagueData, now: DateTime<Utc>, options: ViewOptions) -> Dashboard {
    Dashboard {
        countdown: build_countdown(data, now),
        price_changes: build_price_changes(data),
        predictor: build_predictor(data, options.leaderboard_size),
        ticker: build_fixture_ticker(data, options.ticker_horizon),
        live: build_live_center(data),
        transfers: build_transfers_leaderboard(data, options.leaderboard_size),
    }
}
