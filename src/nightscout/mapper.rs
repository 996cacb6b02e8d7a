// ABOUTME: Maps raw Nightscout entries to canonical glucose readings
// ABOUTME: Applies the mg/dL to mmol/L conversion and window or year filtering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Glucocheck

use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;

use crate::models::{FetchWindow, GlucoseReading, MGDL_PER_MMOL};

/// A raw entry as returned by `GET /api/v1/entries.json`
///
/// Only the fields the pipeline consumes are modeled; everything else the
/// server includes is ignored. `sgv` is the sensor glucose value in mg/dL,
/// `date` the measurement instant in epoch milliseconds. Both are optional
/// on the wire: calibration and device-status entries omit `sgv`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NightscoutEntry {
    /// Measurement instant, epoch milliseconds
    #[serde(default)]
    pub date: Option<i64>,
    /// Sensor glucose value in mg/dL
    #[serde(default)]
    pub sgv: Option<f64>,
    /// Trend direction reported by the uploader
    #[serde(default)]
    pub direction: Option<String>,
    /// Uploading device identifier
    #[serde(default)]
    pub device: Option<String>,
}

impl NightscoutEntry {
    /// Parsed measurement instant, when `date` is present and in range
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.date.and_then(DateTime::from_timestamp_millis)
    }
}

/// Inclusion rule applied while mapping raw entries
#[derive(Debug, Clone, Copy)]
pub enum ReadingFilter {
    /// Keep entries whose timestamp falls inside the window, ends inclusive
    Window(FetchWindow),
    /// Keep entries from one calendar year (used by file-based ingestion)
    Year(i32),
    /// Keep everything
    All,
}

impl ReadingFilter {
    fn includes(&self, timestamp: DateTime<Utc>) -> bool {
        match self {
            Self::Window(window) => window.contains(timestamp),
            Self::Year(year) => timestamp.year() == *year,
            Self::All => true,
        }
    }
}

/// Convert raw entries to canonical readings
///
/// Entries with a missing or non-positive `sgv`, or an unparseable `date`,
/// are dropped. Surviving entries are converted to mmol/L with their
/// timestamps copied verbatim; output order matches input order.
#[must_use]
pub fn map_entries(entries: &[NightscoutEntry], filter: &ReadingFilter) -> Vec<GlucoseReading> {
    entries
        .iter()
        .filter_map(|entry| {
            let sgv = entry.sgv.filter(|value| *value > 0.0)?;
            let timestamp = entry.timestamp()?;
            filter
                .includes(timestamp)
                .then(|| GlucoseReading::new(timestamp, sgv / MGDL_PER_MMOL))
        })
        .collect()
}
