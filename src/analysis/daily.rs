// ABOUTME: Daily aggregation of glucose readings into time-in-range percentages
// ABOUTME: Groups by local calendar day and classifies against the normalized target range
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Glucocheck

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate, TimeZone};

use crate::errors::RangeError;
use crate::models::{DailyRecord, GlucoseReading, GlucoseRange};

/// Aggregate readings into per-day time-in-range records, local time
///
/// Convenience wrapper over [`aggregate_daily_in`] using the system
/// timezone, which is what a reading's "day" means to the person wearing
/// the sensor.
///
/// # Errors
///
/// Returns [`RangeError`] when the target range is degenerate
/// (`min >= max` after unit normalization).
pub fn aggregate_daily(
    readings: &[GlucoseReading],
    range: &GlucoseRange,
) -> Result<Vec<DailyRecord>, RangeError> {
    aggregate_daily_in(readings, range, &Local)
}

/// Aggregate readings into per-day time-in-range records
///
/// Readings with a positive value are grouped by their calendar day in
/// `tz`; a reading at 23:58 and one at 00:02 the next night land in
/// different groups. Each day's record is the percentage of its readings
/// inside the target range, both ends inclusive. Input order is
/// irrelevant; output is sorted by day, one record per distinct day.
///
/// # Errors
///
/// Returns [`RangeError`] when the target range is degenerate.
pub fn aggregate_daily_in<Tz: TimeZone>(
    readings: &[GlucoseReading],
    range: &GlucoseRange,
    tz: &Tz,
) -> Result<Vec<DailyRecord>, RangeError> {
    let (min, max) = range.normalized()?;

    let mut days: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();
    for reading in readings.iter().filter(|r| r.value > 0.0) {
        let day = reading.timestamp.with_timezone(tz).date_naive();
        let (in_range, total) = days.entry(day).or_insert((0, 0));
        *total += 1;
        if reading.value >= min && reading.value <= max {
            *in_range += 1;
        }
    }

    Ok(days
        .into_iter()
        .map(|(date, (in_range, total))| DailyRecord {
            date,
            in_range_percentage: 100.0 * in_range as f64 / total as f64,
        })
        .collect())
}
