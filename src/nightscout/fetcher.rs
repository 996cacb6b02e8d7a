// ABOUTME: Backward-in-time pagination loop over the Nightscout entries endpoint
// ABOUTME: Explicit state machine with named terminal states and a wall-clock budget
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Glucocheck

use std::time::{Duration, Instant};

use chrono::Datelike;
use tokio::time::timeout;
use tracing::debug;

use crate::errors::FetchError;
use crate::models::FetchWindow;
use crate::nightscout::auth::{fetch_with_auth, AuthSecrets};
use crate::nightscout::mapper::NightscoutEntry;
use crate::nightscout::transport::EntriesTransport;

/// Default entries per page, matching one day of one-minute readings
pub const DEFAULT_PAGE_SIZE: u32 = 1440;

/// Minimum page size to prevent excessive API calls
pub const MIN_PAGE_SIZE: u32 = 10;

/// Maximum page size the entries endpoint reliably serves
pub const MAX_PAGE_SIZE: u32 = 1440;

/// Safety ceiling on pagination requests per fetch
pub const DEFAULT_MAX_PAGES: u32 = 1000;

/// Default wall-clock budget for one whole fetch
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(300);

/// Configuration for the pagination loop
#[derive(Debug, Clone, Copy)]
pub struct FetchConfig {
    /// Entries requested per page
    pub page_size: u32,
    /// Hard ceiling on the number of page requests
    pub max_pages: u32,
    /// Wall-clock budget across the whole loop, covering every request
    pub budget: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            budget: DEFAULT_BUDGET,
        }
    }
}

impl FetchConfig {
    /// Set the page size, clamped to the supported range
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
        self
    }

    /// Set the pagination request ceiling
    #[must_use]
    pub const fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set the wall-clock budget for the whole fetch
    #[must_use]
    pub const fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }
}

/// Terminal states of the pagination loop that yield usable data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The server ran out of entries before the window start was reached
    Exhausted,
    /// The cursor crossed the window start; the window is fully covered
    WindowCovered,
}

/// Raw entries accumulated by a completed pagination loop
#[derive(Debug)]
pub(crate) struct FetchOutcome {
    /// In-window entries, newest-first as the server returned them
    pub entries: Vec<NightscoutEntry>,
    /// Why the loop stopped
    pub stop: StopReason,
    /// Pages actually requested
    pub pages: u32,
}

/// Outcome of folding one page into the accumulator
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum PageAction {
    /// Request the next older page from this cursor
    Continue {
        /// Oldest timestamp seen on this page, epoch milliseconds
        next_cursor: i64,
    },
    /// Terminate the loop successfully
    Stop(StopReason),
}

/// Fold one page of entries into the accumulator
///
/// `request_cursor` is the `$lte` bound the page was requested with. The
/// bound is inclusive, so every page after the first starts with entries
/// the previous page already delivered; those are skipped to keep the
/// accumulation duplicate-safe. Entries outside the window elsewhere in
/// the page are dropped without ending the loop.
pub(crate) fn apply_page(
    window_ms: (i64, i64),
    request_cursor: i64,
    first_page: bool,
    accumulator: &mut Vec<NightscoutEntry>,
    page: &[NightscoutEntry],
) -> PageAction {
    let Some(oldest) = page.last().and_then(|entry| entry.date) else {
        // Empty page, or the oldest entry has no usable timestamp.
        return PageAction::Stop(StopReason::Exhausted);
    };

    let (start_ms, end_ms) = window_ms;
    accumulator.extend(
        page.iter()
            .filter(|entry| {
                entry.date.is_some_and(|date| {
                    let fresh = first_page || date < request_cursor;
                    fresh && date >= start_ms && date <= end_ms
                })
            })
            .cloned(),
    );

    if oldest < start_ms {
        PageAction::Stop(StopReason::WindowCovered)
    } else if !first_page && oldest >= request_cursor {
        // No forward progress: the server has nothing older than the cursor.
        PageAction::Stop(StopReason::Exhausted)
    } else {
        PageAction::Continue {
            next_cursor: oldest,
        }
    }
}

/// Drive the pagination loop until a terminal state is reached
///
/// Requests pages of entries with timestamps at or before a moving cursor,
/// newest-first, starting from the window end. See [`StopReason`] for the
/// successful terminal states; fatal states surface as [`FetchError`].
pub(crate) async fn fetch_entries(
    transport: &dyn EntriesTransport,
    base_url: &str,
    secrets: &AuthSecrets,
    window: FetchWindow,
    config: &FetchConfig,
) -> Result<FetchOutcome, FetchError> {
    let (first_instant, last_instant) = window.bounds();
    let window_ms = (
        first_instant.timestamp_millis(),
        last_instant.timestamp_millis(),
    );
    let mut cursor = window_ms.1;
    let mut accumulator: Vec<NightscoutEntry> = Vec::new();
    let mut pages: u32 = 0;
    let deadline = Instant::now() + config.budget;

    loop {
        if pages >= config.max_pages {
            return Err(FetchError::PaginationLimitExceeded {
                max_pages: config.max_pages,
            });
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(FetchError::DeadlineExceeded {
                budget_secs: config.budget.as_secs(),
            });
        }

        let url = entries_url(base_url, config.page_size, cursor);
        let response = match timeout(remaining, fetch_with_auth(transport, &url, secrets)).await {
            Ok(result) => result.map_err(FetchError::from_transport)?,
            Err(_elapsed) => {
                return Err(FetchError::DeadlineExceeded {
                    budget_secs: config.budget.as_secs(),
                })
            }
        };
        if !response.is_success() {
            return Err(FetchError::from_status(response.status));
        }

        let page: Vec<NightscoutEntry> =
            serde_json::from_str(&response.body).map_err(|error| FetchError::ServerError {
                status: response.status,
                message: format!("response body was not valid JSON: {error}"),
            })?;

        let first_page = pages == 0;
        pages += 1;

        if page.is_empty() {
            if first_page {
                // Best-effort diagnostic so the error can name the year the
                // instance actually has data for. Probe failures are ignored.
                let available_year = probe_available_year(transport, base_url, secrets).await;
                return Err(FetchError::NoDataInWindow {
                    window,
                    available_year,
                });
            }
            return finish(accumulator, StopReason::Exhausted, pages, window);
        }

        match apply_page(window_ms, cursor, first_page, &mut accumulator, &page) {
            PageAction::Continue { next_cursor } => {
                debug!(
                    page = pages,
                    cursor = next_cursor,
                    accumulated = accumulator.len(),
                    "fetched entries page"
                );
                cursor = next_cursor;
            }
            PageAction::Stop(stop) => return finish(accumulator, stop, pages, window),
        }
    }
}

fn finish(
    entries: Vec<NightscoutEntry>,
    stop: StopReason,
    pages: u32,
    window: FetchWindow,
) -> Result<FetchOutcome, FetchError> {
    if entries.is_empty() {
        return Err(FetchError::NoDataInWindow {
            window,
            available_year: None,
        });
    }
    Ok(FetchOutcome {
        entries,
        stop,
        pages,
    })
}

fn entries_url(base_url: &str, count: u32, before_millis: i64) -> String {
    format!("{base_url}/api/v1/entries.json?count={count}&find[date][$lte]={before_millis}")
}

/// Ask for the single most recent entry and report its calendar year
///
/// Fire-and-forget UX aid: any failure here is logged and ignored so it
/// can never mask the primary no-data error.
async fn probe_available_year(
    transport: &dyn EntriesTransport,
    base_url: &str,
    secrets: &AuthSecrets,
) -> Option<i32> {
    let url = format!("{base_url}/api/v1/entries.json?count=1");
    let response = match fetch_with_auth(transport, &url, secrets).await {
        Ok(response) => response,
        Err(error) => {
            debug!(%error, "most-recent-entry probe failed");
            return None;
        }
    };
    if !response.is_success() {
        return None;
    }
    let entries: Vec<NightscoutEntry> = serde_json::from_str(&response.body).ok()?;
    entries
        .first()?
        .timestamp()
        .map(|timestamp| timestamp.year())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn entry(date: i64) -> NightscoutEntry {
        NightscoutEntry {
            date: Some(date),
            sgv: Some(100.0),
            direction: None,
            device: None,
        }
    }

    const WINDOW: (i64, i64) = (1_000, 2_000);

    #[test]
    fn first_page_accumulates_in_window_entries_and_continues() {
        let mut acc = Vec::new();
        let page = vec![entry(1_900), entry(1_500), entry(1_200)];
        let action = apply_page(WINDOW, 2_000, true, &mut acc, &page);
        assert_eq!(action, PageAction::Continue { next_cursor: 1_200 });
        assert_eq!(acc.len(), 3);
    }

    #[test]
    fn out_of_window_entries_are_filtered_not_truncating() {
        let mut acc = Vec::new();
        // A stray future entry inside the page must not end the loop.
        let page = vec![entry(2_500), entry(1_500), entry(1_100)];
        let action = apply_page(WINDOW, 2_000, true, &mut acc, &page);
        assert_eq!(action, PageAction::Continue { next_cursor: 1_100 });
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn crossing_the_window_start_stops_after_appending() {
        let mut acc = Vec::new();
        let page = vec![entry(1_400), entry(1_050), entry(900)];
        let action = apply_page(WINDOW, 1_500, false, &mut acc, &page);
        assert_eq!(action, PageAction::Stop(StopReason::WindowCovered));
        // 900 is before the window start and dropped; the rest kept.
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn boundary_entry_is_not_accumulated_twice() {
        let mut acc = Vec::new();
        let first = vec![entry(1_900), entry(1_500)];
        assert_eq!(
            apply_page(WINDOW, 2_000, true, &mut acc, &first),
            PageAction::Continue { next_cursor: 1_500 }
        );
        // The $lte bound is inclusive, so 1_500 comes back again.
        let second = vec![entry(1_500), entry(1_200)];
        assert_eq!(
            apply_page(WINDOW, 1_500, false, &mut acc, &second),
            PageAction::Continue { next_cursor: 1_200 }
        );
        let dates: Vec<i64> = acc.iter().filter_map(|e| e.date).collect();
        assert_eq!(dates, vec![1_900, 1_500, 1_200]);
    }

    #[test]
    fn no_progress_means_exhausted() {
        let mut acc = Vec::new();
        // Only the boundary entry remains on the server.
        let page = vec![entry(1_500)];
        let action = apply_page(WINDOW, 1_500, false, &mut acc, &page);
        assert_eq!(action, PageAction::Stop(StopReason::Exhausted));
        assert!(acc.is_empty());
    }

    #[test]
    fn empty_page_is_exhaustion() {
        let mut acc = Vec::new();
        let action = apply_page(WINDOW, 1_500, false, &mut acc, &[]);
        assert_eq!(action, PageAction::Stop(StopReason::Exhausted));
    }

    #[test]
    fn unparseable_oldest_timestamp_stops_the_loop() {
        let mut acc = Vec::new();
        let page = vec![
            entry(1_900),
            NightscoutEntry {
                date: None,
                sgv: Some(100.0),
                direction: None,
                device: None,
            },
        ];
        let action = apply_page(WINDOW, 2_000, true, &mut acc, &page);
        assert_eq!(action, PageAction::Stop(StopReason::Exhausted));
    }

    #[test]
    fn config_clamps_page_size() {
        assert_eq!(FetchConfig::default().with_page_size(1).page_size, MIN_PAGE_SIZE);
        assert_eq!(
            FetchConfig::default().with_page_size(10_000).page_size,
            MAX_PAGE_SIZE
        );
        assert_eq!(FetchConfig::default().with_page_size(500).page_size, 500);
    }

    #[test]
    fn entries_url_shape() {
        let url = entries_url("https://cgm.example.com", 1440, 1_704_239_999_999);
        assert_eq!(
            url,
            "https://cgm.example.com/api/v1/entries.json?count=1440&find[date][$lte]=1704239999999"
        );
    }
}
