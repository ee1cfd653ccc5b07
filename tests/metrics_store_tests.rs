// MetricsStore tests: last-write-wins, ordered snapshot, seeding, change notifications

mod common;

use chrono::NaiveDate;
use common::metrics;
use fitbelt::config::MetricsConfig;
use fitbelt::metrics_store::MetricsStore;
use fitbelt::models::{DayKey, DayMetrics};

fn day(d: u32) -> DayKey {
    DayKey::from_date(NaiveDate::from_ymd_opt(2024, 5, d).unwrap())
}

#[test]
fn test_new_store_is_empty() {
    let store = MetricsStore::new(8);
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    assert!(store.snapshot().is_empty());
    assert_eq!(store.get_day(day(1)), None);
}

#[test]
fn test_last_write_wins() {
    let mut store = MetricsStore::new(8);
    store.add_day(day(1), metrics(1, 1, 1));
    store.update_day(day(1), metrics(2, 2, 2));
    assert_eq!(store.get_day(day(1)), Some(metrics(2, 2, 2)));
    store.add_day(day(1), metrics(3, 3, 3));
    assert_eq!(store.get_day(day(1)), Some(metrics(3, 3, 3)));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_update_day_inserts_missing_key() {
    let mut store = MetricsStore::new(8);
    store.update_day(day(9), metrics(5, 6, 7));
    assert_eq!(store.get_day(day(9)), Some(metrics(5, 6, 7)));
}

#[test]
fn test_snapshot_len_counts_distinct_keys_in_insertion_order() {
    let mut store = MetricsStore::new(8);
    store.add_day(day(3), metrics(3, 0, 0));
    store.add_day(day(1), metrics(1, 0, 0));
    store.add_day(day(2), metrics(2, 0, 0));
    store.update_day(day(3), metrics(30, 0, 0));

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 3);
    let days: Vec<DayKey> = snapshot.iter().map(|e| e.day).collect();
    assert_eq!(days, vec![day(3), day(1), day(2)]);
    assert_eq!(snapshot[0].metrics.breath_count, 30);
}

#[test]
fn test_snapshot_is_not_affected_by_later_writes() {
    let mut store = MetricsStore::new(8);
    store.add_day(day(1), metrics(1, 0, 0));
    let before = store.snapshot();
    store.update_day(day(1), metrics(9, 0, 0));
    store.add_day(day(2), metrics(2, 0, 0));

    assert_eq!(before.len(), 1);
    assert_eq!(before[0].metrics, metrics(1, 0, 0));
    assert_eq!(store.snapshot().len(), 2);
    assert_eq!(store.snapshot()[0].metrics, metrics(9, 0, 0));
}

#[test]
fn test_get_day_is_idempotent() {
    let mut store = MetricsStore::new(8);
    store.add_day(day(4), metrics(4, 40, 400));
    assert_eq!(store.get_day(day(4)), store.get_day(day(4)));
    assert_eq!(store.get_day(day(5)), store.get_day(day(5)));
}

#[test]
fn test_seeded_covers_today_and_previous_days_newest_first() {
    let today = day(10);
    let store = MetricsStore::seeded(today, 6, 8, |key| DayMetrics {
        step_count: key.days_since_epoch() as u32,
        ..DayMetrics::default()
    });

    assert_eq!(store.len(), 7);
    let snapshot = store.snapshot();
    assert_eq!(snapshot[0].day, today);
    assert_eq!(snapshot[6].day, day(4));
    assert_eq!(
        store.get_day(day(7)).map(|m| m.step_count),
        Some(day(7).days_since_epoch() as u32)
    );
    assert_eq!(store.get_day(day(3)), None);
    assert_eq!(store.get_day(day(11)), None);
}

#[test]
fn test_with_demo_data_seeds_zeroed_week() {
    let store = MetricsStore::with_demo_data(&MetricsConfig::default(), 8);
    assert_eq!(store.len(), 7);
    let today = DayKey::today();
    // Local midnight may pass between seeding and this lookup.
    if store.snapshot()[0].day == today {
        assert_eq!(store.today(), Some(DayMetrics::default()));
        assert_eq!(store.get_day(today.previous(6)), Some(DayMetrics::default()));
    }
}

#[test]
fn test_subscribers_receive_snapshot_after_each_write() {
    let mut store = MetricsStore::new(8);
    let mut rx = store.subscribe();

    store.add_day(day(1), metrics(1, 0, 0));
    store.update_day(day(1), metrics(2, 0, 0));
    store.add_day(day(2), metrics(3, 0, 0));

    let first = rx.try_recv().unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].metrics, metrics(1, 0, 0));
    let second = rx.try_recv().unwrap();
    assert_eq!(second[0].metrics, metrics(2, 0, 0));
    let third = rx.try_recv().unwrap();
    assert_eq!(third.len(), 2);
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_writes_without_subscribers_succeed() {
    let mut store = MetricsStore::new(1);
    for d in 1..=20 {
        store.add_day(day(d), metrics(d, 0, 0));
    }
    assert_eq!(store.len(), 20);
}
