// ABOUTME: Best-effort auth negotiation against Nightscout deployments
// ABOUTME: Tries hashed header, plaintext header, query token, then no auth, in that order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Glucocheck

use sha1::{Digest, Sha1};
use tracing::debug;

use crate::errors::TransportError;
use crate::nightscout::transport::{EntriesRequest, EntriesResponse, EntriesTransport};

/// The API secret in both forms Nightscout deployments accept
///
/// Nightscout's `api-secret` header historically carries the SHA-1 hex
/// digest of the configured secret; some deployments and tokens accept the
/// plaintext value instead.
#[derive(Debug, Clone)]
pub struct AuthSecrets {
    plaintext: String,
    hashed: String,
}

impl AuthSecrets {
    /// Derive both forms from the configured secret
    #[must_use]
    pub fn new(api_secret: &str) -> Self {
        let hashed = hex::encode(Sha1::digest(api_secret.as_bytes()));
        Self {
            plaintext: api_secret.to_owned(),
            hashed,
        }
    }

    /// SHA-1 hex digest of the secret
    #[must_use]
    pub fn hashed(&self) -> &str {
        &self.hashed
    }

    /// The secret as configured
    #[must_use]
    pub fn plaintext(&self) -> &str {
        &self.plaintext
    }
}

/// Fetch a URL, negotiating the authentication style the server accepts
///
/// Strategies, in order:
/// 1. `api-secret` header with the SHA-1 hashed secret (most common)
/// 2. `api-secret` header with the plaintext secret
/// 3. `token` query parameter (survives proxies that strip custom headers)
/// 4. no credentials at all (public instances)
///
/// A strategy succeeds as soon as any HTTP response comes back, whatever
/// its status; interpreting 401/403 is the caller's job. Network-level
/// failures of strategies 1-3 are logged and swallowed.
///
/// # Errors
///
/// Returns the final strategy's [`TransportError`] when no strategy
/// produced a response.
pub async fn fetch_with_auth(
    transport: &dyn EntriesTransport,
    url: &str,
    secrets: &AuthSecrets,
) -> Result<EntriesResponse, TransportError> {
    match transport
        .get(&EntriesRequest::with_secret(url, secrets.hashed()))
        .await
    {
        Ok(response) => return Ok(response),
        Err(error) => {
            debug!(strategy = "hashed-header", %error, "auth strategy failed, trying next");
        }
    }

    match transport
        .get(&EntriesRequest::with_secret(url, secrets.plaintext()))
        .await
    {
        Ok(response) => return Ok(response),
        Err(error) => {
            debug!(strategy = "plain-header", %error, "auth strategy failed, trying next");
        }
    }

    let separator = if url.contains('?') { '&' } else { '?' };
    let token_url = format!(
        "{url}{separator}token={}",
        urlencoding::encode(secrets.plaintext())
    );
    match transport.get(&EntriesRequest::bare(&token_url)).await {
        Ok(response) => return Ok(response),
        Err(error) => {
            debug!(strategy = "query-token", %error, "auth strategy failed, trying next");
        }
    }

    // Last resort for public instances; this one's failure propagates.
    transport.get(&EntriesRequest::bare(url)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_is_sha1_hex_encoded() {
        let secrets = AuthSecrets::new("hello");
        assert_eq!(secrets.hashed(), "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
        assert_eq!(secrets.plaintext(), "hello");
    }

    #[test]
    fn empty_secret_still_hashes() {
        let secrets = AuthSecrets::new("");
        assert_eq!(secrets.hashed(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }
}
