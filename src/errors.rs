// ABOUTME: Error taxonomy for the Nightscout fetch pipeline and range configuration
// ABOUTME: Every variant carries a message suitable for surfacing verbatim to the end user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Glucocheck

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{FetchWindow, GlucoseUnit};

/// A network-level failure from the HTTP transport
///
/// Distinguishes failures to establish a connection (the request never
/// reached the server) from timeouts and other request errors, since the
/// fetch pipeline reports them differently.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    connect: bool,
    timeout: bool,
    #[source]
    source: Option<reqwest::Error>,
}

impl TransportError {
    /// Create a generic transport error
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            connect: false,
            timeout: false,
            source: None,
        }
    }

    /// Create an error for a connection that could not be established
    #[must_use]
    pub fn connect(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            connect: true,
            timeout: false,
            source: None,
        }
    }

    /// Create an error for a request that timed out
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            connect: false,
            timeout: true,
            source: None,
        }
    }

    /// Whether the connection itself could not be established
    #[must_use]
    pub const fn is_connect(&self) -> bool {
        self.connect
    }

    /// Whether the request timed out
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        self.timeout
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(source: reqwest::Error) -> Self {
        Self {
            message: format!("request to Nightscout failed: {source}"),
            connect: source.is_connect(),
            timeout: source.is_timeout(),
            source: Some(source),
        }
    }
}

/// Errors terminating a single fetch-and-map attempt
///
/// None of these are retried by the pipeline; the only built-in retry
/// behavior is the auth negotiator's fixed strategy list.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every authentication strategy failed at the network level
    #[error(
        "Unable to reach the Nightscout API: every authentication strategy \
         failed. Last error: {source}"
    )]
    AuthExhausted {
        /// Failure from the final (unauthenticated) strategy
        #[source]
        source: TransportError,
    },

    /// The server rejected the credentials (HTTP 401)
    #[error(
        "Authentication failed. Please verify your API secret is correct. The \
         API secret should be at least 12 characters and match the one \
         configured in your Nightscout instance. If using a token, ensure it \
         has \"readable\" permissions."
    )]
    Unauthorized,

    /// The credentials lack the required role (HTTP 403)
    #[error(
        "Access forbidden (HTTP {status}). Check that your API secret or token \
         has the correct permissions (readable role)."
    )]
    Forbidden {
        /// Status code returned by the server
        status: u16,
    },

    /// The request was blocked before reaching the server
    #[error(
        "The request to Nightscout was blocked before reaching the server. If \
         the instance sits behind a CORS-enforcing proxy, add this origin to \
         the ENABLE_CORS or CORS environment variable in your Nightscout \
         configuration and restart the server."
    )]
    CorsBlocked {
        /// Underlying connection failure
        #[source]
        source: TransportError,
    },

    /// The server answered with a failure status or an unreadable body
    #[error("Unable to fetch data from Nightscout API. Server returned {status}: {message}")]
    ServerError {
        /// Status code returned by the server
        status: u16,
        /// Short description of the failure
        message: String,
    },

    /// A request failed at the network level after reaching the server before
    #[error("Unable to fetch data from Nightscout API. Error: {source}")]
    NetworkFailed {
        /// Underlying transport failure
        #[source]
        source: TransportError,
    },

    /// The pagination safety ceiling was hit before the window was covered
    #[error("Exceeded max number of allowed calls to Nightscout ({max_pages}).")]
    PaginationLimitExceeded {
        /// Configured page ceiling
        max_pages: u32,
    },

    /// The whole pagination loop overran its wall-clock budget
    #[error("Fetching from Nightscout did not complete within {budget_secs} seconds.")]
    DeadlineExceeded {
        /// Configured budget in seconds
        budget_secs: u64,
    },

    /// The server had no entries at all inside the requested window
    #[error("{}", no_data_message(.window, .available_year.as_ref()))]
    NoDataInWindow {
        /// The requested window
        window: FetchWindow,
        /// Year of the most recent entry the instance holds, when the
        /// diagnostic probe succeeded
        available_year: Option<i32>,
    },

    /// Entries existed in the window but none survived mapping
    #[error("No valid glucose data found for the date range {window}.")]
    NoValidReadings {
        /// The requested window
        window: FetchWindow,
    },

    /// The requested window ends before it starts
    #[error("Invalid date range: end date {end} is before start date {start}.")]
    InvalidWindow {
        /// Requested start day
        start: NaiveDate,
        /// Requested end day
        end: NaiveDate,
    },
}

impl FetchError {
    /// Classify a transport failure left over after the auth negotiator
    /// exhausted its strategy list
    ///
    /// Connection-opaque failures get the CORS/proxy guidance, timeouts are
    /// plain network failures, and anything else is reported as the
    /// negotiator giving up.
    pub(crate) fn from_transport(source: TransportError) -> Self {
        if source.is_connect() {
            Self::CorsBlocked { source }
        } else if source.is_timeout() {
            Self::NetworkFailed { source }
        } else {
            Self::AuthExhausted { source }
        }
    }

    /// Classify a non-success HTTP status from the entries endpoint
    pub(crate) fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden { status },
            _ => Self::ServerError {
                status,
                message: "unexpected response".to_owned(),
            },
        }
    }
}

fn no_data_message(window: &FetchWindow, available_year: Option<&i32>) -> String {
    available_year.map_or_else(
        || {
            format!(
                "No data found for the date range {window}. Your Nightscout \
                 instance may not have data for this period."
            )
        },
        |year| {
            format!(
                "No data found for the date range {window}. Your Nightscout \
                 instance has data from {year}. Please adjust your date range."
            )
        },
    )
}

/// A degenerate target range configuration (`min >= max`)
///
/// Rejected before any aggregation runs; the aggregator itself assumes a
/// valid range.
#[derive(Debug, Clone, Copy, Error)]
#[error("Invalid glucose range: minimum {min} {unit} must be below maximum {max} {unit}.")]
pub struct RangeError {
    /// Configured lower bound
    pub min: f64,
    /// Configured upper bound
    pub max: f64,
    /// Unit the bounds were configured in
    pub unit: GlucoseUnit,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::models::FetchWindow;
    use chrono::NaiveDate;

    fn window() -> FetchWindow {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        FetchWindow::new(start, end).unwrap()
    }

    #[test]
    fn no_data_message_names_the_window() {
        let err = FetchError::NoDataInWindow {
            window: window(),
            available_year: None,
        };
        let message = err.to_string();
        assert!(message.contains("2024-01-01 to 2024-01-31"));
        assert!(!message.contains("has data from"));
    }

    #[test]
    fn no_data_message_includes_probed_year() {
        let err = FetchError::NoDataInWindow {
            window: window(),
            available_year: Some(2021),
        };
        assert!(err.to_string().contains("has data from 2021"));
    }

    #[test]
    fn transport_classification() {
        let cors = FetchError::from_transport(TransportError::connect("refused"));
        assert!(matches!(cors, FetchError::CorsBlocked { .. }));

        let timed_out = FetchError::from_transport(TransportError::timeout("deadline"));
        assert!(matches!(timed_out, FetchError::NetworkFailed { .. }));

        let other = FetchError::from_transport(TransportError::new("dns"));
        assert!(matches!(other, FetchError::AuthExhausted { .. }));
    }

    #[test]
    fn status_classification() {
        assert!(matches!(FetchError::from_status(401), FetchError::Unauthorized));
        assert!(matches!(
            FetchError::from_status(403),
            FetchError::Forbidden { status: 403 }
        ));
        assert!(matches!(
            FetchError::from_status(500),
            FetchError::ServerError { status: 500, .. }
        ));
    }
}
