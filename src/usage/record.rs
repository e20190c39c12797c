// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Persisted daily usage record and its pure transitions

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Free-tier generations allowed per calendar day
pub const DAILY_LIMIT: u32 = 5;

/// One client's usage, stored as `{"count":..,"date":"YYYY-MM-DD","isPremium":..}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub count: u32,
    pub date: NaiveDate,
    pub is_premium: bool,
}

/// Generations left today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Unlimited,
    Limited(u32),
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Remaining::Unlimited => write!(f, "unlimited"),
            Remaining::Limited(n) => write!(f, "{}", n),
        }
    }
}

impl UsageRecord {
    /// Record for a client with no stored usage
    pub fn fresh(today: NaiveDate) -> Self {
        Self {
            count: 0,
            date: today,
            is_premium: false,
        }
    }

    /// Lazily migrate to `today`: a stale record restarts at zero, keeping the tier
    pub fn for_day(self, today: NaiveDate) -> Self {
        if self.date == today {
            return self;
        }
        Self {
            count: 0,
            date: today,
            is_premium: self.is_premium,
        }
    }

    pub fn remaining(&self, daily_limit: u32) -> Remaining {
        if self.is_premium {
            Remaining::Unlimited
        } else {
            Remaining::Limited(daily_limit.saturating_sub(self.count))
        }
    }

    pub fn can_generate(&self, daily_limit: u32) -> bool {
        self.is_premium || self.count < daily_limit
    }

    /// Count one confirmed generation on `today`
    pub fn incremented(self, today: NaiveDate) -> Self {
        Self {
            count: self.count.saturating_add(1),
            date: today,
            is_premium: self.is_premium,
        }
    }

    pub fn with_premium(self, is_premium: bool) -> Self {
        Self { is_premium, ..self }
    }
}
