// ABOUTME: Integration tests for decile banding of daily records
// ABOUTME: Validates band edges and conservation of day counts across bands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Glucocheck

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use chrono::NaiveDate;

use glucocheck_core::analysis::{bucketize, RangeBand};
use glucocheck_core::models::DailyRecord;

fn record(day: u32, percentage: f64) -> DailyRecord {
    DailyRecord {
        date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        in_range_percentage: percentage,
    }
}

#[test]
fn counts_are_conserved_across_bands() {
    let records: Vec<DailyRecord> = (1..=31)
        .map(|d| record(d, f64::from(d - 1) * 100.0 / 30.0))
        .collect();

    let bands = bucketize(&records);
    assert_eq!(bands.len(), 10);
    let total: usize = bands.values().sum();
    assert_eq!(total, records.len());
}

#[test]
fn every_band_is_present_even_when_empty() {
    let bands = bucketize(&[]);
    assert_eq!(bands.len(), 10);
    assert!(bands.values().all(|count| *count == 0));
    assert!(RangeBand::ALL.iter().all(|band| bands.contains_key(band)));
}

#[test]
fn records_land_in_their_decile() {
    let records = vec![
        record(1, 0.0),
        record(2, 9.9),
        record(3, 10.0),
        record(4, 55.0),
        record(5, 89.9),
        record(6, 90.0),
        record(7, 100.0),
    ];

    let bands = bucketize(&records);
    assert_eq!(bands[&RangeBand::P0To10], 2);
    assert_eq!(bands[&RangeBand::P10To20], 1);
    assert_eq!(bands[&RangeBand::P50To60], 1);
    assert_eq!(bands[&RangeBand::P80To90], 1);
    assert_eq!(bands[&RangeBand::P90To100], 2);
}

#[test]
fn only_the_final_band_is_closed_at_the_top() {
    assert_eq!(RangeBand::for_percentage(100.0), RangeBand::P90To100);
    assert_eq!(RangeBand::for_percentage(89.999_999), RangeBand::P80To90);
}
