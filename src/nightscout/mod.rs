// ABOUTME: Nightscout remote ingestion: auth negotiation, pagination, and mapping
// ABOUTME: Entry point fetch_glucose_history drives the whole pipeline for one window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Glucocheck

//! Remote ingestion from a Nightscout-compatible API.
//!
//! The pipeline is a single-shot, client-initiated batch fetch: paginate
//! backward in time from the window end, negotiate whatever authentication
//! style the deployment accepts, filter to the requested window, then map
//! raw entries into canonical readings. No state is shared between
//! invocations.

use tracing::{debug, instrument};

use crate::errors::FetchError;
use crate::models::{FetchWindow, GlucoseReading};

/// Auth strategy negotiation
pub mod auth;
/// Pagination loop and its state machine
pub mod fetcher;
/// Raw entry to canonical reading conversion
pub mod mapper;
/// HTTP seam between the pipeline and the network
pub mod transport;

pub use auth::{fetch_with_auth, AuthSecrets};
pub use fetcher::{FetchConfig, StopReason, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};
pub use mapper::{map_entries, NightscoutEntry, ReadingFilter};
pub use transport::{EntriesRequest, EntriesResponse, EntriesTransport, HttpEntriesTransport};

/// Fetch canonical glucose readings for an inclusive day window
///
/// Uses the shared HTTP client and default pagination configuration; see
/// [`fetch_glucose_history_with`] for the injectable variant.
///
/// # Errors
///
/// Returns a [`FetchError`] describing the first fatal condition: auth
/// exhaustion, a failure status, the pagination ceiling, the wall-clock
/// budget, or a window with no (valid) data. Partial data is never
/// silently returned as success.
pub async fn fetch_glucose_history(
    base_url: &str,
    api_secret: &str,
    window: FetchWindow,
) -> Result<Vec<GlucoseReading>, FetchError> {
    fetch_glucose_history_with(
        &HttpEntriesTransport,
        base_url,
        api_secret,
        window,
        &FetchConfig::default(),
    )
    .await
}

/// Fetch canonical glucose readings through a caller-supplied transport
///
/// # Errors
///
/// See [`fetch_glucose_history`].
#[instrument(
    skip(transport, api_secret, config),
    fields(provider = "nightscout", window = %window)
)]
pub async fn fetch_glucose_history_with(
    transport: &dyn EntriesTransport,
    base_url: &str,
    api_secret: &str,
    window: FetchWindow,
    config: &FetchConfig,
) -> Result<Vec<GlucoseReading>, FetchError> {
    let base = normalize_base_url(base_url);
    let secrets = AuthSecrets::new(api_secret);

    let outcome = fetcher::fetch_entries(transport, &base, &secrets, window, config).await?;
    debug!(
        pages = outcome.pages,
        entries = outcome.entries.len(),
        stop = ?outcome.stop,
        "pagination complete"
    );

    let readings = map_entries(&outcome.entries, &ReadingFilter::Window(window));
    if readings.is_empty() {
        // Entries existed in the window but none carried a usable glucose
        // value; distinct from the server having no data at all.
        return Err(FetchError::NoValidReadings { window });
    }
    Ok(readings)
}

/// Normalize a user-entered base URL
///
/// Trims whitespace, strips a trailing slash, and defaults to `https://`
/// when no protocol is given.
#[must_use]
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_base_url;

    #[test]
    fn normalizes_user_entered_urls() {
        assert_eq!(
            normalize_base_url(" cgm.example.com/ "),
            "https://cgm.example.com"
        );
        assert_eq!(
            normalize_base_url("http://cgm.example.com"),
            "http://cgm.example.com"
        );
        assert_eq!(
            normalize_base_url("https://cgm.example.com/"),
            "https://cgm.example.com"
        );
    }
}
