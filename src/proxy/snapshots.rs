//! Daily price snapshots
//!
//! One snapshot per UTC day, stored under `price-snapshot-YYYY-MM-DD`. The
//! first request of a day records it; later requests reuse it.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::Element;
use crate::store::{KeyValueStore, StoreError};

const KEY_PREFIX: &str = "price-snapshot-";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to (de)serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A player whose price moved since the previous snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceChange {
    pub id: u32,
    pub name: String,
    pub old_price: i32,
    pub new_price: i32,
    pub delta: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub taken_at: DateTime<Utc>,
    /// Player id to price in tenths
    pub prices: BTreeMap<u32, i32>,
    pub changes: Vec<PriceChange>,
}

impl Snapshot {
    /// Snapshot of `elements` at `now`
    ///
    /// Changes are measured against `previous` when there is one; otherwise
    /// upstream's own per-gameweek cost change is used.
    pub fn capture(elements: &[Element], now: DateTime<Utc>, previous: Option<&Snapshot>) -> Self {
        let prices: BTreeMap<u32, i32> = elements.iter().map(|e| (e.id, e.now_cost)).collect();

        let mut changes: Vec<PriceChange> = elements
            .iter()
            .filter_map(|e| {
                let old_price = match previous {
                    Some(prev) => *prev.prices.get(&e.id)?,
                    None => e.now_cost - e.cost_change_event,
                };
                (old_price != e.now_cost).then(|| PriceChange {
                    id: e.id,
                    name: e.web_name.clone(),
                    old_price,
                    new_price: e.now_cost,
                    delta: e.now_cost - old_price,
                })
            })
            .collect();
        changes.sort_by(|a, b| b.delta.cmp(&a.delta).then_with(|| a.name.cmp(&b.name)));

        Self {
            date: now.date_naive(),
            taken_at: now,
            prices,
            changes,
        }
    }
}

/// Today's snapshot and, when recorded, yesterday's
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPair {
    pub today: Snapshot,
    pub yesterday: Option<Snapshot>,
}

pub fn snapshot_key(date: NaiveDate) -> String {
    format!("{}{}", KEY_PREFIX, date.format("%Y-%m-%d"))
}

pub struct SnapshotStore<S> {
    store: S,
}

impl<S: KeyValueStore> SnapshotStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load(&self, date: NaiveDate) -> Result<Option<Snapshot>, SnapshotError> {
        match self.store.get(&snapshot_key(date))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let raw = serde_json::to_string(snapshot)?;
        self.store.set(&snapshot_key(snapshot.date), &raw)?;
        Ok(())
    }

    /// Snapshots for `today` and the day before, if both are recorded
    pub fn pair(&self, today: NaiveDate) -> Result<Option<SnapshotPair>, SnapshotError> {
        let Some(snapshot) = self.load(today)? else {
            return Ok(None);
        };
        Ok(Some(SnapshotPair {
            today: snapshot,
            yesterday: self.load(today - Duration::days(1))?,
        }))
    }

    /// Records today's snapshot from `elements` and returns the pair
    ///
    /// An existing snapshot for today is kept as-is.
    pub fn record(&self, elements: &[Element], now: DateTime<Utc>) -> Result<SnapshotPair, SnapshotError> {
        let date = now.date_naive();
        let yesterday = self.load(date - Duration::days(1))?;

        let today = match self.load(date)? {
            Some(existing) => existing,
            None => {
                let snapshot = Snapshot::capture(elements, now, yesterday.as_ref());
                self.save(&snapshot)?;
                tracing::info!(
                    date = %snapshot.date,
                    players = snapshot.prices.len(),
                    changes = snapshot.changes.len(),
                    "recorded price snapshot"
                );
                snapshot
            }
        };

        Ok(SnapshotPair { today, yesterday })
    }
}
