//! Wall-clock abstraction shared by reminder and priority logic.
//!
//! # Responsibility
//! - Represent instants as Unix epoch milliseconds, matching storage columns.
//! - Let callers inject "now" so time-based rules stay deterministic in tests.
//!
//! # Invariants
//! - All `EpochMs` values are UTC milliseconds since the Unix epoch.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Unix epoch milliseconds.
pub type EpochMs = i64;

pub const SECOND_MS: EpochMs = 1_000;
pub const MINUTE_MS: EpochMs = 60 * SECOND_MS;
pub const HOUR_MS: EpochMs = 60 * MINUTE_MS;
pub const DAY_MS: EpochMs = 24 * HOUR_MS;

/// Source of the current instant.
pub trait Clock {
    fn now_ms(&self) -> EpochMs;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> EpochMs {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for tests and replay tools.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicI64,
}

impl FixedClock {
    pub fn new(now: EpochMs) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: EpochMs) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, delta: EpochMs) {
        self.now.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> EpochMs {
        self.now.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> EpochMs {
        (**self).now_ms()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_ms(&self) -> EpochMs {
        (**self).now_ms()
    }
}

/// Formats an instant as `YYYY-MM-DD` (UTC).
///
/// Returns `None` for instants outside chrono's representable range.
pub fn format_date(at: EpochMs) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(at).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Parses a `YYYY-MM-DD` day as midnight UTC.
pub fn parse_date(value: &str) -> Option<EpochMs> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Parses an RFC 3339 timestamp (`2026-02-13T10:00:00Z`).
pub fn parse_instant(value: &str) -> Option<EpochMs> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.timestamp_millis())
}

/// Formats an instant as RFC 3339 in UTC with second precision.
pub fn format_instant(at: EpochMs) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(at)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
}
