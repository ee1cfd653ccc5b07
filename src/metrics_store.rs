// Day-keyed activity metrics. Last write wins; entries are never removed.
// Observers get the recomputed snapshot after every committed write.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::instrument;

use crate::config::MetricsConfig;
use crate::models::{DayEntry, DayKey, DayMetrics};

pub struct MetricsStore {
    /// Position of each key in `entries`.
    index: HashMap<DayKey, usize>,
    /// Insertion order. Overwrites keep the original position.
    entries: Vec<DayEntry>,
    snapshot: Arc<[DayEntry]>,
    tx: broadcast::Sender<Arc<[DayEntry]>>,
}

impl MetricsStore {
    pub fn new(broadcast_capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(broadcast_capacity.max(1));
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
            snapshot: Arc::from(Vec::new()),
            tx,
        }
    }

    /// Seeds `today` and each of the `days` preceding days, newest first.
    pub fn seeded(
        today: DayKey,
        days: u32,
        broadcast_capacity: usize,
        fixture: impl Fn(DayKey) -> DayMetrics,
    ) -> Self {
        let mut store = Self::new(broadcast_capacity);
        for offset in 0..=days {
            let day = today.previous(offset);
            store.add_day(day, fixture(day));
        }
        tracing::debug!(
            operation = "seed",
            today = %today,
            days_seeded = store.len(),
            "Metrics store seeded"
        );
        store
    }

    /// Zero-valued demo data for the local today and the configured number of
    /// previous days.
    pub fn with_demo_data(config: &MetricsConfig, broadcast_capacity: usize) -> Self {
        Self::seeded(
            DayKey::today(),
            config.seed_days,
            broadcast_capacity,
            |_| DayMetrics::default(),
        )
    }

    pub fn add_day(&mut self, day: DayKey, metrics: DayMetrics) {
        self.write(day, metrics, "add_day");
    }

    pub fn update_day(&mut self, day: DayKey, metrics: DayMetrics) {
        self.write(day, metrics, "update_day");
    }

    pub fn get_day(&self, day: DayKey) -> Option<DayMetrics> {
        self.index.get(&day).map(|&i| self.entries[i].metrics)
    }

    /// Record for the local today, if one exists.
    pub fn today(&self) -> Option<DayMetrics> {
        self.get_day(DayKey::today())
    }

    /// All entries in insertion order. The slice is shared and immutable; a new
    /// one replaces it on every write.
    pub fn snapshot(&self) -> Arc<[DayEntry]> {
        Arc::clone(&self.snapshot)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<[DayEntry]>> {
        self.tx.subscribe()
    }

    #[instrument(skip_all, fields(store = "metrics", day = %day))]
    fn write(&mut self, day: DayKey, metrics: DayMetrics, operation: &'static str) {
        match self.index.get(&day) {
            Some(&i) => self.entries[i].metrics = metrics,
            None => {
                self.index.insert(day, self.entries.len());
                self.entries.push(DayEntry { day, metrics });
            }
        }
        self.snapshot = Arc::from(self.entries.as_slice());
        tracing::debug!(operation, entries = self.entries.len(), "Day written");

        if self.tx.send(self.snapshot()).is_err() {
            tracing::trace!(operation, "No metrics subscribers");
        }
    }
}
