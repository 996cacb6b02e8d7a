// ABOUTME: Minimal HTTP seam between the fetch pipeline and the network
// ABOUTME: One GET with an optional api-secret header, mockable for tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Glucocheck

use async_trait::async_trait;
use reqwest::header::ACCEPT;

use crate::errors::TransportError;
use crate::http_client::shared_client;

/// Header carrying the shared secret, hashed or plaintext
pub const API_SECRET_HEADER: &str = "api-secret";

/// A single GET request against the entries endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntriesRequest {
    /// Fully built URL including query parameters
    pub url: String,
    /// Value for the `api-secret` header, if this strategy sends one
    pub api_secret: Option<String>,
}

impl EntriesRequest {
    /// Request with an `api-secret` header
    #[must_use]
    pub fn with_secret(url: &str, secret: &str) -> Self {
        Self {
            url: url.to_owned(),
            api_secret: Some(secret.to_owned()),
        }
    }

    /// Request without custom headers
    #[must_use]
    pub fn bare(url: &str) -> Self {
        Self {
            url: url.to_owned(),
            api_secret: None,
        }
    }
}

/// An HTTP response that reached the server
///
/// Any status counts as a response; status interpretation belongs to the
/// pagination loop, not the transport or the auth negotiator.
#[derive(Debug, Clone)]
pub struct EntriesResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

impl EntriesResponse {
    /// Whether the status is in the 2xx range
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport abstraction over the Nightscout HTTP API
///
/// The production implementation wraps the shared `reqwest` client; tests
/// substitute a scripted implementation so the pagination and auth logic
/// run without a network.
#[async_trait]
pub trait EntriesTransport: Send + Sync {
    /// Issue one GET and return the response, or a network-level failure
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] only when no HTTP response was obtained
    /// at all (connection failure, timeout, unreadable body).
    async fn get(&self, request: &EntriesRequest) -> Result<EntriesResponse, TransportError>;
}

/// Production transport backed by the shared HTTP client
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpEntriesTransport;

#[async_trait]
impl EntriesTransport for HttpEntriesTransport {
    async fn get(&self, request: &EntriesRequest) -> Result<EntriesResponse, TransportError> {
        let mut builder = shared_client()
            .get(&request.url)
            .header(ACCEPT, "application/json");
        if let Some(ref secret) = request.api_secret {
            builder = builder.header(API_SECRET_HEADER, secret);
        }

        let response = builder.send().await.map_err(TransportError::from)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(TransportError::from)?;

        Ok(EntriesResponse { status, body })
    }
}
