// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Daily quota policy over an injected store and clock

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use super::record::{Remaining, UsageRecord, DAILY_LIMIT};
use super::store::{UsageError, UsageStore};

/// Tier flag salvaged from a record whose other fields do not parse
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTier {
    #[serde(default)]
    is_premium: bool,
}

/// Gates whether a client may start a generation and records successes
pub struct UsageTracker {
    store: Arc<dyn UsageStore>,
    clock: Arc<dyn Clock>,
    daily_limit: u32,
}

impl UsageTracker {
    pub fn new(store: Arc<dyn UsageStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn UsageStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            daily_limit: DAILY_LIMIT,
        }
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    /// Current record, migrated to today.
    ///
    /// Missing, unreadable or corrupt storage yields a fresh record. A stored
    /// `isPremium` flag is kept whenever it can still be read.
    pub async fn read(&self) -> UsageRecord {
        let today = self.clock.today();
        let raw = match self.store.read().await {
            Ok(Some(raw)) => raw,
            Ok(None) => return UsageRecord::fresh(today),
            Err(e) => {
                warn!("Usage storage unreadable, starting fresh: {}", e);
                return UsageRecord::fresh(today);
            }
        };

        match serde_json::from_str::<UsageRecord>(&raw) {
            Ok(record) => record.for_day(today),
            Err(e) => {
                warn!("Stored usage record is corrupt, starting fresh: {}", e);
                // An unreadable date only resets the count; the tier survives
                let is_premium = serde_json::from_str::<StoredTier>(&raw)
                    .map(|t| t.is_premium)
                    .unwrap_or(false);
                UsageRecord::fresh(today).with_premium(is_premium)
            }
        }
    }

    pub async fn remaining(&self) -> Remaining {
        self.read().await.remaining(self.daily_limit)
    }

    pub async fn can_generate(&self) -> bool {
        self.read().await.can_generate(self.daily_limit)
    }

    /// Count one generation. Call only after the generation succeeded.
    pub async fn increment(&self) -> Result<UsageRecord, UsageError> {
        let record = self.read().await.incremented(self.clock.today());
        self.persist(&record).await?;
        debug!("Usage incremented: {}/{}", record.count, self.daily_limit);
        Ok(record)
    }

    /// Flip the tier; the day's count is left as is
    pub async fn set_premium(&self, is_premium: bool) -> Result<UsageRecord, UsageError> {
        let record = self.read().await.with_premium(is_premium);
        self.persist(&record).await?;
        debug!("Usage tier updated: premium={}", is_premium);
        Ok(record)
    }

    async fn persist(&self, record: &UsageRecord) -> Result<(), UsageError> {
        let raw = serde_json::to_string(record)?;
        self.store.write(&raw).await
    }
}
