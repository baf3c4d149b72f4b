//! Countdown to the next transfer deadline

use chrono::{DateTime, Duration, Utc};

use crate::data::LeagueData;

#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    pub event_id: u32,
    pub event_name: String,
    pub deadline: DateTime<Utc>,
    /// Negative once the deadline has passed
    pub remaining: Duration,
}

impl Countdown {
    pub fn is_passed(&self) -> bool {
        self.remaining <= Duration::zero()
    }

    /// (days, hours, minutes, seconds) left, all zero once passed
    pub fn parts(&self) -> (i64, i64, i64, i64) {
        if self.is_passed() {
            return (0, 0, 0, 0);
        }
        let total = self.remaining.num_seconds();
        (
            total / 86_400,
            (total % 86_400) / 3_600,
            (total % 3_600) / 60,
            total % 60,
        )
    }

    /// `2d 03h 15m 07s`, or `Deadline passed`
    pub fn label(&self) -> String {
        if self.is_passed() {
            return "Deadline passed".to_string();
        }
        let (d, h, m, s) = self.parts();
        format!("{}d {:02}h {:02}m {:02}s", d, h, m, s)
    }
}

/// Countdown for the upcoming gameweek
///
/// Uses the event flagged `is_next`; when upstream has not flagged one, the
/// earliest unfinished event with a deadline still ahead. `None` once the
/// season is over.
pub fn build_countdown(data: &LeagueData, now: DateTime<Utc>) -> Option<Countdown> {
    let event = data
        .next_event()
        .filter(|e| e.deadline_time.is_some())
        .or_else(|| {
            data.events
                .iter()
                .filter(|e| !e.finished)
                .filter(|e| e.deadline_time.is_some_and(|d| d > now))
                .min_by_key(|e| e.deadline_time)
        })?;

    let deadline = event.deadline_time?;
    Some(Countdown {
        event_id: event.id,
        event_name: event.name.clone(),
        deadline,
        remaining: deadline - now,
    })
}
