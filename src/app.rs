//! Application state for the terminal dashboard
//!
//! Holds the latest refresh outcome and the view models built from it, and
//! turns key presses into state changes. Fetching is driven by `main`, which
//! watches `refresh_requested`.

use chrono::{DateTime, Local, Utc};
use crossterm::event::{KeyCode, KeyEvent};

use crate::cli::StartupConfig;
use crate::refresh::RefreshOutcome;
use crate::views::{build_countdown, build_dashboard, Countdown, Dashboard, ViewOptions};

/// Application state enum representing the current view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Waiting for the first refresh to finish
    Loading,
    /// Showing the dashboard (possibly without data)
    Dashboard,
}

/// Dashboard tabs, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Prices,
    Predictor,
    Fixtures,
    Live,
    Transfers,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Prices,
        Tab::Predictor,
        Tab::Fixtures,
        Tab::Live,
        Tab::Transfers,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Prices => "Prices",
            Tab::Predictor => "Predictor",
            Tab::Fixtures => "Fixtures",
            Tab::Live => "Live",
            Tab::Transfers => "Transfers",
        }
    }

    pub fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    /// Parses a tab name or one of its aliases, case-insensitively
    pub fn from_name(s: &str) -> Option<Tab> {
        match s.to_lowercase().as_str() {
            "prices" | "price" | "changes" => Some(Tab::Prices),
            "predictor" | "predict" | "predictions" => Some(Tab::Predictor),
            "fixtures" | "ticker" | "fdr" => Some(Tab::Fixtures),
            "live" | "matches" | "scores" => Some(Tab::Live),
            "transfers" | "market" => Some(Tab::Transfers),
            _ => None,
        }
    }

    pub fn next(&self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn previous(&self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// Main application struct managing state and data
pub struct App {
    pub state: AppState,
    pub tab: Tab,
    /// Result of the most recent refresh
    pub outcome: Option<RefreshOutcome>,
    /// Views built from `outcome`'s data
    pub dashboard: Option<Dashboard>,
    pub options: ViewOptions,
    /// First visible row of the current tab's table
    pub scroll_offset: u16,
    pub should_quit: bool,
    pub refresh_requested: bool,
    pub show_help: bool,
    /// Local time the last refresh finished
    pub last_refresh: Option<DateTime<Local>>,
}

impl App {
    pub fn new(options: ViewOptions) -> Self {
        Self {
            state: AppState::Loading,
            tab: Tab::Prices,
            outcome: None,
            dashboard: None,
            options,
            scroll_offset: 0,
            should_quit: false,
            refresh_requested: false,
            show_help: false,
            last_refresh: None,
        }
    }

    /// Creates an App honouring CLI startup options such as `--tab`
    pub fn with_startup_config(config: StartupConfig, options: ViewOptions) -> Self {
        let mut app = Self::new(options);
        app.tab = config.initial_tab;
        app
    }

    /// Installs a refresh result and rebuilds the views
    pub fn apply_outcome(&mut self, outcome: RefreshOutcome, now: DateTime<Utc>) {
        self.dashboard = outcome
            .data
            .as_ref()
            .map(|data| build_dashboard(data, now, self.options));
        self.outcome = Some(outcome);
        self.state = AppState::Dashboard;
        self.refresh_requested = false;
        self.last_refresh = Some(Local::now());
    }

    /// Countdown recomputed for `now`, so the header ticks between refreshes
    pub fn countdown(&self, now: DateTime<Utc>) -> Option<Countdown> {
        self.outcome
            .as_ref()
            .and_then(|o| o.data.as_ref())
            .and_then(|data| build_countdown(data, now))
    }

    pub fn banner(&self) -> Option<String> {
        self.outcome.as_ref().and_then(|o| o.banner())
    }

    /// Handles keyboard input
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        match self.state {
            AppState::Loading => {
                if key_event.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }
            AppState::Dashboard => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                    self.select_tab(self.tab.next());
                }
                KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                    self.select_tab(self.tab.previous());
                }
                KeyCode::Char(c @ '1'..='5') => {
                    let index = c as usize - '1' as usize;
                    self.select_tab(Tab::ALL[index]);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.scroll_offset = self.scroll_offset.saturating_add(1);
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.scroll_offset = self.scroll_offset.saturating_sub(1);
                }
                KeyCode::Char('g') => {
                    self.scroll_offset = 0;
                }
                KeyCode::Char('r') => {
                    self.refresh_requested = true;
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }

    fn select_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.scroll_offset = 0;
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(ViewOptions::default())
    }
}
