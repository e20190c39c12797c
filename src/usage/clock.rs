// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Calendar-day source for quota resets

use chrono::{NaiveDate, Utc};
use std::sync::RwLock;

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Current UTC calendar day
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Settable day for tests
#[derive(Debug)]
pub struct FixedClock {
    day: RwLock<NaiveDate>,
}

impl FixedClock {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day: RwLock::new(day),
        }
    }

    pub fn set(&self, day: NaiveDate) {
        if let Ok(mut guard) = self.day.write() {
            *guard = day;
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        match self.day.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
