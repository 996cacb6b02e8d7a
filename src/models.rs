// ABOUTME: Canonical data model for glucose readings, target ranges, and fetch windows
// ABOUTME: All concentrations are stored in mmol/L; conversion happens exactly once at ingestion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Glucocheck

use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{FetchError, RangeError};

/// Conversion factor between mg/dL and mmol/L for glucose concentrations
pub const MGDL_PER_MMOL: f64 = 18.0;

/// Glucose concentration unit
///
/// mmol/L is the canonical unit used internally for all storage and
/// comparison. mg/dL values are converted at the ingestion or range
/// normalization boundary and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlucoseUnit {
    /// Millimoles per litre (canonical)
    #[serde(rename = "mmol")]
    MmolPerLitre,
    /// Milligrams per decilitre
    #[serde(rename = "mgdl")]
    MgPerDecilitre,
}

impl GlucoseUnit {
    /// Convert a value expressed in this unit to the canonical mmol/L
    #[must_use]
    pub fn to_mmol(self, value: f64) -> f64 {
        match self {
            Self::MmolPerLitre => value,
            Self::MgPerDecilitre => value / MGDL_PER_MMOL,
        }
    }
}

impl Display for GlucoseUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MmolPerLitre => write!(f, "mmol/L"),
            Self::MgPerDecilitre => write!(f, "mg/dL"),
        }
    }
}

/// A single glucose measurement in canonical units
///
/// Immutable once constructed. Produced only by the Nightscout mapper
/// (or an external file parser emitting the same shape).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlucoseReading {
    /// Instant the measurement was taken
    pub timestamp: DateTime<Utc>,
    /// Concentration in mmol/L, always positive
    pub value: f64,
}

impl GlucoseReading {
    /// Create a reading from a timestamp and a mmol/L concentration
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Target concentration range used for time-in-range classification
///
/// Input configuration only; [`normalized`](Self::normalized) converts to
/// mmol/L before any comparison. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlucoseRange {
    /// Lower bound, inclusive, in `unit`
    pub min: f64,
    /// Upper bound, inclusive, in `unit`
    pub max: f64,
    /// Unit both bounds are expressed in
    pub unit: GlucoseUnit,
}

impl Default for GlucoseRange {
    /// The widely used clinical default: 3.9-10.0 mmol/L (70-180 mg/dL)
    fn default() -> Self {
        Self {
            min: 3.9,
            max: 10.0,
            unit: GlucoseUnit::MmolPerLitre,
        }
    }
}

impl GlucoseRange {
    /// Create a range without validating it; see [`normalized`](Self::normalized)
    #[must_use]
    pub const fn new(min: f64, max: f64, unit: GlucoseUnit) -> Self {
        Self { min, max, unit }
    }

    /// Convert both bounds to mmol/L, rejecting a degenerate range
    ///
    /// # Errors
    ///
    /// Returns [`RangeError`] when `min >= max`. Callers must reject the
    /// configuration before any aggregation runs.
    pub fn normalized(&self) -> Result<(f64, f64), RangeError> {
        if self.min >= self.max {
            return Err(RangeError {
                min: self.min,
                max: self.max,
                unit: self.unit,
            });
        }
        Ok((self.unit.to_mmol(self.min), self.unit.to_mmol(self.max)))
    }
}

/// Per-day time-in-range statistic
///
/// Derived by the daily aggregator, never mutated after creation. Keyed
/// uniquely by calendar day within one aggregation result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Calendar day the statistic covers
    pub date: NaiveDate,
    /// Share of readings inside the target range, in `[0, 100]`
    pub in_range_percentage: f64,
}

/// Inclusive calendar-day window bounding which readings are retained
///
/// Both boundary days are included in full: the window spans from
/// 00:00:00.000 on `start` through 23:59:59.999 on `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl FetchWindow {
    /// Create a window from inclusive start and end days
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidWindow`] when `end` is before `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, FetchError> {
        if end < start {
            return Err(FetchError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// First day of the window, inclusive
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window, inclusive
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Instant bounds of the window in UTC
    ///
    /// Returns `(first, last)` where `first` is midnight on the start day
    /// and `last` is one millisecond before midnight after the end day,
    /// matching the millisecond resolution of Nightscout entry timestamps.
    #[must_use]
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let first = Utc.from_utc_datetime(&self.start.and_time(NaiveTime::MIN));
        let last = Utc.from_utc_datetime(&self.end.and_time(NaiveTime::MIN)) + Duration::days(1)
            - Duration::milliseconds(1);
        (first, last)
    }

    /// Whether an instant falls inside the window, boundaries included
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let (first, last) = self.bounds();
        instant >= first && instant <= last
    }
}

impl Display for FetchWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
