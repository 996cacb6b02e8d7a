// ABOUTME: Shared test helpers: scripted mock transport and entry builders
// ABOUTME: Lets pagination and auth tests run the full pipeline without a network
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Glucocheck

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use glucocheck_core::errors::TransportError;
use glucocheck_core::nightscout::{EntriesRequest, EntriesResponse, EntriesTransport};

/// Transport that replays a scripted sequence of responses in call order
/// and records every request it sees.
pub struct MockTransport {
    script: Mutex<VecDeque<Result<EntriesResponse, TransportError>>>,
    requests: Mutex<Vec<EntriesRequest>>,
}

impl MockTransport {
    pub fn new(script: Vec<Result<EntriesResponse, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<EntriesRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl EntriesTransport for MockTransport {
    async fn get(&self, request: &EntriesRequest) -> Result<EntriesResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted request: {}", request.url))
    }
}

/// A 200 response whose body is a JSON array of entries, each given as
/// `(date_millis, sgv)`. `sgv: None` models calibration entries.
pub fn page(entries: &[(i64, Option<f64>)]) -> Result<EntriesResponse, TransportError> {
    let body: Vec<_> = entries
        .iter()
        .map(|(date, sgv)| {
            let mut entry = json!({ "date": date, "device": "test-uploader" });
            if let Some(sgv) = sgv {
                entry["sgv"] = json!(sgv);
            }
            entry
        })
        .collect();
    Ok(EntriesResponse {
        status: 200,
        body: serde_json::to_string(&body).unwrap(),
    })
}

pub fn empty_page() -> Result<EntriesResponse, TransportError> {
    Ok(EntriesResponse {
        status: 200,
        body: "[]".to_owned(),
    })
}

pub fn status(status: u16) -> Result<EntriesResponse, TransportError> {
    Ok(EntriesResponse {
        status,
        body: String::new(),
    })
}
