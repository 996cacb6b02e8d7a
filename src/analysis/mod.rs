// ABOUTME: Aggregation of canonical readings into per-day statistics
// ABOUTME: Daily time-in-range records and their decile-band distribution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Glucocheck

/// Per-day time-in-range aggregation
pub mod daily;
/// Decile banding of daily records for distribution charts
pub mod distribution;

pub use daily::{aggregate_daily, aggregate_daily_in};
pub use distribution::{bucketize, RangeBand};
