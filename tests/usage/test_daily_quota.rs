// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Daily quota behaviour across days, tiers and storage states

use chrono::NaiveDate;
use sprite_generator::usage::{
    FileUsageStore, FixedClock, MemoryUsageStore, Remaining, UsageRecord, UsageStore, UsageTracker,
    DAILY_LIMIT,
};
use std::sync::Arc;

fn day(d: &str) -> NaiveDate {
    d.parse().unwrap()
}

fn tracker_on(store: Arc<dyn UsageStore>, today: &str) -> (UsageTracker, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(day(today)));
    (UsageTracker::with_clock(store, clock.clone()), clock)
}

#[tokio::test]
async fn test_fresh_client_has_full_quota() {
    let (tracker, _) = tracker_on(Arc::new(MemoryUsageStore::new()), "2024-01-02");
    let record = tracker.read().await;
    assert_eq!(record, UsageRecord::fresh(day("2024-01-02")));
    assert_eq!(tracker.remaining().await, Remaining::Limited(DAILY_LIMIT));
    assert!(tracker.can_generate().await);
}

#[tokio::test]
async fn test_limit_blocks_after_five_successes() {
    let (tracker, _) = tracker_on(Arc::new(MemoryUsageStore::new()), "2024-01-02");

    for used in 1..=DAILY_LIMIT {
        assert!(tracker.can_generate().await);
        let record = tracker.increment().await.unwrap();
        assert_eq!(record.count, used);
    }

    assert!(!tracker.can_generate().await);
    assert_eq!(tracker.remaining().await, Remaining::Limited(0));
}

#[tokio::test]
async fn test_previous_day_record_resets() {
    let stored = r#"{"count":5,"date":"2024-01-01","isPremium":false}"#;
    let (tracker, _) = tracker_on(Arc::new(MemoryUsageStore::with_value(stored)), "2024-01-02");

    let record = tracker.read().await;
    assert_eq!(record.count, 0);
    assert_eq!(record.date, day("2024-01-02"));
    assert!(tracker.can_generate().await);
}

#[tokio::test]
async fn test_rollover_while_running() {
    let (tracker, clock) = tracker_on(Arc::new(MemoryUsageStore::new()), "2024-01-01");
    for _ in 0..DAILY_LIMIT {
        tracker.increment().await.unwrap();
    }
    assert!(!tracker.can_generate().await);

    clock.set(day("2024-01-02"));
    assert!(tracker.can_generate().await);
    let record = tracker.increment().await.unwrap();
    assert_eq!((record.count, record.date), (1, day("2024-01-02")));
}

#[tokio::test]
async fn test_premium_is_unlimited_and_survives_rollover() {
    let stored = r#"{"count":40,"date":"2024-01-01","isPremium":true}"#;
    let (tracker, clock) = tracker_on(Arc::new(MemoryUsageStore::with_value(stored)), "2024-01-01");

    assert!(tracker.can_generate().await);
    assert_eq!(tracker.remaining().await, Remaining::Unlimited);
    assert_eq!(tracker.remaining().await.to_string(), "unlimited");

    clock.set(day("2024-01-05"));
    let record = tracker.read().await;
    assert!(record.is_premium);
    assert_eq!(record.count, 0);
}

#[tokio::test]
async fn test_downgrade_keeps_todays_count() {
    let (tracker, _) = tracker_on(Arc::new(MemoryUsageStore::new()), "2024-01-02");
    tracker.set_premium(true).await.unwrap();
    for _ in 0..7 {
        tracker.increment().await.unwrap();
    }

    let record = tracker.set_premium(false).await.unwrap();
    assert_eq!(record.count, 7);
    assert!(!tracker.can_generate().await);
}

#[tokio::test]
async fn test_corrupt_record_reads_as_fresh() {
    let store = Arc::new(MemoryUsageStore::with_value("{not json"));
    let (tracker, _) = tracker_on(store.clone(), "2024-01-02");

    assert_eq!(tracker.read().await.count, 0);
    tracker.increment().await.unwrap();

    let raw = store.read().await.unwrap().unwrap();
    let saved: UsageRecord = serde_json::from_str(&raw).unwrap();
    assert_eq!(saved.count, 1);
}

#[tokio::test]
async fn test_file_store_persists_across_trackers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("usage.json");

    {
        let (tracker, _) = tracker_on(Arc::new(FileUsageStore::new(&path)), "2024-03-10");
        tracker.increment().await.unwrap();
        tracker.increment().await.unwrap();
    }

    let (tracker, _) = tracker_on(Arc::new(FileUsageStore::new(&path)), "2024-03-10");
    assert_eq!(tracker.read().await.count, 2);
    assert_eq!(tracker.remaining().await, Remaining::Limited(DAILY_LIMIT - 2));
}

#[tokio::test]
async fn test_corrupt_file_is_replaced_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("usage.json");
    std::fs::write(&path, "garbage").unwrap();

    let (tracker, _) = tracker_on(Arc::new(FileUsageStore::new(&path)), "2024-03-10");
    assert!(tracker.can_generate().await);
    tracker.increment().await.unwrap();
    assert_eq!(tracker.read().await.count, 1);
}

#[tokio::test]
async fn test_unreadable_date_keeps_premium_tier() {
    let stored = r#"{"count":3,"date":"Tue Jan 02 2024","isPremium":true}"#;
    let (tracker, _) = tracker_on(Arc::new(MemoryUsageStore::with_value(stored)), "2024-01-02");

    let record = tracker.read().await;
    assert!(record.is_premium);
    assert_eq!(record.count, 0);
    assert_eq!(record.date, day("2024-01-02"));
    assert_eq!(tracker.remaining().await, Remaining::Unlimited);
}
