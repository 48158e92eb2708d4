use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::outcome::StatRecord;

/// One saved match rating. The history log is append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MprHistoryEntry {
    #[serde(default)]
    pub id: Option<i64>,
    pub player: String,
    pub match_label: String,
    #[serde(default)]
    pub match_id: Option<i64>,
    pub role: String,
    pub mpr: f64,
    pub timestamp: DateTime<Utc>,
    pub aqc: f64,
    pub his: f64,
    pub ec: f64,
    pub tii: f64,
    pub ibi: f64,
    pub sci: f64,
    pub om: f64,
    #[serde(default)]
    pub pi: Option<f64>,
}

/// Storage owned outside the scoring core: stat records and the rating log.
pub trait RatingStore {
    /// Insert or replace the stat record keyed by `(player, match_id)`.
    fn record_stats(&self, stats: &StatRecord) -> Result<()>;

    fn stats_for(&self, player: &str, match_id: i64) -> Result<Option<StatRecord>>;

    /// Append a rating and return its id.
    fn append_history(&self, entry: &MprHistoryEntry) -> Result<i64>;

    /// Ratings for a player, oldest first.
    fn history_for(
        &self,
        player: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<MprHistoryEntry>>;

    /// Players with at least one saved rating, sorted.
    fn players(&self) -> Result<Vec<String>>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    stats: HashMap<(String, i64), StatRecord>,
    history: Vec<MprHistoryEntry>,
}

/// In-process store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryInner>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

impl RatingStore for MemoryStore {
    fn record_stats(&self, stats: &StatRecord) -> Result<()> {
        let mut inner = self.lock()?;
        inner
            .stats
            .insert((stats.player.clone(), stats.match_id), stats.clone());
        Ok(())
    }

    fn stats_for(&self, player: &str, match_id: i64) -> Result<Option<StatRecord>> {
        let inner = self.lock()?;
        Ok(inner.stats.get(&(player.to_string(), match_id)).cloned())
    }

    fn append_history(&self, entry: &MprHistoryEntry) -> Result<i64> {
        let mut inner = self.lock()?;
        let id = inner.history.len() as i64 + 1;
        let mut row = entry.clone();
        row.id = Some(id);
        inner.history.push(row);
        Ok(id)
    }

    fn history_for(
        &self,
        player: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<MprHistoryEntry>> {
        let inner = self.lock()?;
        let mut rows: Vec<MprHistoryEntry> = inner
            .history
            .iter()
            .filter(|e| e.player == player)
            .filter(|e| since.is_none_or(|t| e.timestamp >= t))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    fn players(&self) -> Result<Vec<String>> {
        let inner = self.lock()?;
        let names: BTreeSet<String> = inner.history.iter().map(|e| e.player.clone()).collect();
        Ok(names.into_iter().collect())
    }
}
