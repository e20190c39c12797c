// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Client-side daily usage quota
//!
//! Independent of the server pipeline: the client checks `can_generate()`
//! before starting a request and calls `increment()` only after a confirmed
//! success, so failed or timed-out generations never consume quota.

pub mod clock;
pub mod record;
pub mod store;
pub mod tracker;

pub use clock::{Clock, FixedClock, SystemClock};
pub use record::{Remaining, UsageRecord, DAILY_LIMIT};
pub use store::{FileUsageStore, MemoryUsageStore, UsageError, UsageStore, USAGE_STORAGE_KEY};
pub use tracker::UsageTracker;
