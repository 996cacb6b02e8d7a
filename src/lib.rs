// ABOUTME: Core library for Nightscout CGM ingestion and time-in-range analytics
// ABOUTME: Fetch pipeline, canonical reading model, daily aggregation, and distribution banding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Glucocheck

//! # Glucocheck Core
//!
//! Ingests continuous glucose monitor readings from a Nightscout-compatible
//! API and aggregates them into per-day time-in-range statistics for
//! visualization.
//!
//! The pipeline is a single-shot batch flow:
//!
//! 1. [`nightscout::fetch_glucose_history`] paginates backward in time over
//!    the entries endpoint, negotiating the authentication style the
//!    deployment accepts and filtering to an inclusive day window.
//! 2. [`analysis::aggregate_daily`] groups the canonical readings by
//!    calendar day and computes each day's time-in-range percentage.
//! 3. [`analysis::bucketize`] counts days per fixed percentage band for
//!    distribution rendering.
//!
//! Chart rendering, vendor CSV parsing, and localization live outside this
//! crate; file-based ingestion sources feed the same [`models::GlucoseReading`]
//! shape into the analysis layer.

/// Aggregation of canonical readings into per-day statistics
pub mod analysis;
/// Error taxonomy for fetching and range configuration
pub mod errors;
/// Shared HTTP client with pooled connections
pub mod http_client;
/// Canonical data model (readings, ranges, windows, daily records)
pub mod models;
/// Remote ingestion from a Nightscout-compatible API
pub mod nightscout;

pub use analysis::{aggregate_daily, aggregate_daily_in, bucketize, RangeBand};
pub use errors::{FetchError, RangeError, TransportError};
pub use http_client::{initialize_shared_client, shared_client};
pub use models::{
    DailyRecord, FetchWindow, GlucoseRange, GlucoseReading, GlucoseUnit, MGDL_PER_MMOL,
};
pub use nightscout::{
    fetch_glucose_history, fetch_glucose_history_with, map_entries, FetchConfig, NightscoutEntry,
    ReadingFilter,
};
